use crate::core::{
    errors::ExchangeError,
    kernel::Session,
    types::{
        CancelOrderRequest, CancelOrderResponse, CorrectOrderRequest, CorrectOrderResponse,
        LoginRequest, LoginResponse, LogoutResponse, MarketPriceRequest, MarketPriceResponse,
        MasterDownloadRequest, MasterRecord, NewOrderRequest, NewOrderResponse, OrderListRequest,
        OrderListResponse,
    },
};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

// Every operation except login takes the session it runs on. Passing `None`
// fails with `ExchangeError::NilArgumentError` before anything is sent.

#[async_trait]
pub trait SessionManager {
    /// Authenticate and open a session. A refused login is `CanNotCreateSession`.
    async fn login(
        &self,
        ctx: &CancellationToken,
        request: LoginRequest,
    ) -> Result<(Session, LoginResponse), ExchangeError>;

    /// End the session server-side. The session must not be used afterwards.
    async fn logout(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
    ) -> Result<LogoutResponse, ExchangeError>;
}

#[async_trait]
pub trait OrderPlacer {
    async fn new_order(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        order: NewOrderRequest,
    ) -> Result<NewOrderResponse, ExchangeError>;

    async fn correct_order(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        order: CorrectOrderRequest,
    ) -> Result<CorrectOrderResponse, ExchangeError>;

    async fn cancel_order(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        order: CancelOrderRequest,
    ) -> Result<CancelOrderResponse, ExchangeError>;
}

#[async_trait]
pub trait OrderQuery {
    async fn order_list(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        request: OrderListRequest,
    ) -> Result<OrderListResponse, ExchangeError>;
}

#[async_trait]
pub trait MarketDataSource {
    /// Snapshot quotes for up to the service's per-request issue limit.
    async fn market_price(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        request: MarketPriceRequest,
    ) -> Result<MarketPriceResponse, ExchangeError>;
}

#[async_trait]
pub trait MasterDataSource {
    /// Download master tables. Runs alongside other operations on the same session.
    async fn download_master(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        request: MasterDownloadRequest,
    ) -> Result<Vec<MasterRecord>, ExchangeError>;
}

// Composite trait for callers that need the whole surface
#[async_trait]
pub trait BrokerConnector:
    SessionManager + OrderPlacer + OrderQuery + MarketDataSource + MasterDataSource
{
}
