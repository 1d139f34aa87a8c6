use crate::core::errors::ExchangeError;
use crate::core::traits::{
    BrokerConnector, MarketDataSource, MasterDataSource, OrderPlacer, OrderQuery, SessionManager,
};
use crate::core::types::{
    CancelOrderRequest, CancelOrderResponse, CorrectOrderRequest, CorrectOrderResponse,
    LoginRequest, LoginResponse, LogoutResponse, MarketPriceRequest, MarketPriceResponse,
    MasterDownloadRequest, MasterRecord, NewOrderRequest, NewOrderResponse, OrderListRequest,
    OrderListResponse,
};
use crate::core::{
    config::ClientConfig,
    kernel::{ApiClient, Requester, Session},
};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub mod auth;
pub mod market_data;
pub mod master;
pub mod trading;

pub use auth::Auth;
pub use market_data::MarketData;
pub use master::MasterData;
pub use trading::Trading;

/// e-shiten connector that composes all sub-trait implementations
pub struct EshitenConnector<R: Requester> {
    pub auth: Auth<R>,
    pub trading: Trading<R>,
    pub market: MarketData<R>,
    pub master: MasterData<R>,
    client: ApiClient<R>,
}

impl<R: Requester + Clone> EshitenConnector<R> {
    pub fn new(client: ApiClient<R>, config: &ClientConfig) -> Self {
        Self {
            auth: Auth::new(&client),
            trading: Trading::new(&client, config.second_password.clone()),
            market: MarketData::new(&client),
            master: MasterData::new(&client),
            client,
        }
    }

    pub fn client(&self) -> &ApiClient<R> {
        &self.client
    }
}

// Implement traits for the connector by delegating to sub-components

#[async_trait]
impl<R: Requester> SessionManager for EshitenConnector<R> {
    async fn login(
        &self,
        ctx: &CancellationToken,
        request: LoginRequest,
    ) -> Result<(Session, LoginResponse), ExchangeError> {
        self.auth.login(ctx, request).await
    }

    async fn logout(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
    ) -> Result<LogoutResponse, ExchangeError> {
        self.auth.logout(ctx, session).await
    }
}

#[async_trait]
impl<R: Requester> OrderPlacer for EshitenConnector<R> {
    async fn new_order(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        order: NewOrderRequest,
    ) -> Result<NewOrderResponse, ExchangeError> {
        self.trading.new_order(ctx, session, order).await
    }

    async fn correct_order(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        order: CorrectOrderRequest,
    ) -> Result<CorrectOrderResponse, ExchangeError> {
        self.trading.correct_order(ctx, session, order).await
    }

    async fn cancel_order(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        order: CancelOrderRequest,
    ) -> Result<CancelOrderResponse, ExchangeError> {
        self.trading.cancel_order(ctx, session, order).await
    }
}

#[async_trait]
impl<R: Requester> OrderQuery for EshitenConnector<R> {
    async fn order_list(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        request: OrderListRequest,
    ) -> Result<OrderListResponse, ExchangeError> {
        self.trading.order_list(ctx, session, request).await
    }
}

#[async_trait]
impl<R: Requester> MarketDataSource for EshitenConnector<R> {
    async fn market_price(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        request: MarketPriceRequest,
    ) -> Result<MarketPriceResponse, ExchangeError> {
        self.market.market_price(ctx, session, request).await
    }
}

#[async_trait]
impl<R: Requester> MasterDataSource for EshitenConnector<R> {
    async fn download_master(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        request: MasterDownloadRequest,
    ) -> Result<Vec<MasterRecord>, ExchangeError> {
        self.master.download_master(ctx, session, request).await
    }
}

impl<R: Requester> BrokerConnector for EshitenConnector<R> {}
