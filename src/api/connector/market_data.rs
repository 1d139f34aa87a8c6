use crate::api::conversions::{build_market_price_request, convert_market_price_response};
use crate::core::{
    errors::ExchangeError,
    kernel::{ApiClient, Requester, Session},
    traits::MarketDataSource,
    types::{MarketPriceRequest, MarketPriceResponse},
};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Snapshot quotes
#[derive(Debug)]
pub struct MarketData<R: Requester> {
    client: ApiClient<R>,
}

impl<R: Requester + Clone> MarketData<R> {
    pub fn new(client: &ApiClient<R>) -> Self {
        Self {
            client: client.clone(),
        }
    }
}

#[async_trait]
impl<R: Requester> MarketDataSource for MarketData<R> {
    #[instrument(
        skip(self, ctx, session, request),
        fields(exchange = "e-shiten", issues = request.issue_codes.len())
    )]
    async fn market_price(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        request: MarketPriceRequest,
    ) -> Result<MarketPriceResponse, ExchangeError> {
        let wire = build_market_price_request(&request);
        let response = self.client.invoke(ctx, session, &wire).await?;
        Ok(convert_market_price_response(response))
    }
}
