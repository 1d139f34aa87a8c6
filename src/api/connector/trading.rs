use crate::api::conversions::{
    build_cancel_order_request, build_correct_order_request, build_new_order_request,
    build_order_list_request, convert_cancel_order_response, convert_correct_order_response,
    convert_new_order_response, convert_order_list_response,
};
use crate::core::{
    errors::ExchangeError,
    kernel::{ApiClient, Requester, Session},
    traits::{OrderPlacer, OrderQuery},
    types::{
        CancelOrderRequest, CancelOrderResponse, CorrectOrderRequest, CorrectOrderResponse,
        NewOrderRequest, NewOrderResponse, OrderListRequest, OrderListResponse,
    },
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

/// Order entry and order inquiry
pub struct Trading<R: Requester> {
    client: ApiClient<R>,
    second_password: Secret<String>,
}

impl<R: Requester + Clone> Trading<R> {
    pub fn new(client: &ApiClient<R>, second_password: Secret<String>) -> Self {
        Self {
            client: client.clone(),
            second_password,
        }
    }
}

#[async_trait]
impl<R: Requester> OrderPlacer for Trading<R> {
    #[instrument(
        skip(self, ctx, session, order),
        fields(exchange = "e-shiten", issue_code = %order.issue_code, side = ?order.side)
    )]
    async fn new_order(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        order: NewOrderRequest,
    ) -> Result<NewOrderResponse, ExchangeError> {
        let wire = build_new_order_request(order, self.second_password.expose_secret());
        let response = convert_new_order_response(self.client.invoke(ctx, session, &wire).await?);

        if !response.result.is_success() {
            warn!(
                code = %response.result.code,
                "Order rejected: {}",
                response.result.text
            );
        }
        Ok(response)
    }

    #[instrument(
        skip(self, ctx, session, order),
        fields(exchange = "e-shiten", order_number = %order.order_number)
    )]
    async fn correct_order(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        order: CorrectOrderRequest,
    ) -> Result<CorrectOrderResponse, ExchangeError> {
        let wire = build_correct_order_request(order, self.second_password.expose_secret());
        let response = self.client.invoke(ctx, session, &wire).await?;
        Ok(convert_correct_order_response(response))
    }

    #[instrument(
        skip(self, ctx, session, order),
        fields(exchange = "e-shiten", order_number = %order.order_number)
    )]
    async fn cancel_order(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        order: CancelOrderRequest,
    ) -> Result<CancelOrderResponse, ExchangeError> {
        let wire = build_cancel_order_request(order, self.second_password.expose_secret());
        let response = self.client.invoke(ctx, session, &wire).await?;
        Ok(convert_cancel_order_response(response))
    }
}

#[async_trait]
impl<R: Requester> OrderQuery for Trading<R> {
    #[instrument(skip(self, ctx, session), fields(exchange = "e-shiten"))]
    async fn order_list(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        request: OrderListRequest,
    ) -> Result<OrderListResponse, ExchangeError> {
        let wire = build_order_list_request(request);
        let response = self.client.invoke(ctx, session, &wire).await?;
        Ok(convert_order_list_response(response))
    }
}
