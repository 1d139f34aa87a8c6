use crate::api::conversions::{
    build_login_request, convert_login_response, convert_logout_response, session_from_login,
};
use crate::api::types::WireLogoutRequest;
use crate::core::{
    errors::ExchangeError,
    kernel::{ApiClient, Requester, Session},
    traits::SessionManager,
    types::{LoginRequest, LoginResponse, LogoutResponse},
};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Login and logout
#[derive(Debug)]
pub struct Auth<R: Requester> {
    client: ApiClient<R>,
}

impl<R: Requester + Clone> Auth<R> {
    pub fn new(client: &ApiClient<R>) -> Self {
        Self {
            client: client.clone(),
        }
    }
}

#[async_trait]
impl<R: Requester> SessionManager for Auth<R> {
    #[instrument(skip(self, ctx, request), fields(exchange = "e-shiten"))]
    async fn login(
        &self,
        ctx: &CancellationToken,
        request: LoginRequest,
    ) -> Result<(Session, LoginResponse), ExchangeError> {
        let wire = build_login_request(&request);
        let response = self.client.login(ctx, &wire).await?;

        match session_from_login(&response) {
            Ok(session) => {
                debug!(
                    request_number = session.last_request_number(),
                    "Session created"
                );
                Ok((session, convert_login_response(&response)))
            }
            Err(e) => {
                warn!("Login refused: {}", e);
                Err(e)
            }
        }
    }

    #[instrument(skip(self, ctx, session), fields(exchange = "e-shiten"))]
    async fn logout(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
    ) -> Result<LogoutResponse, ExchangeError> {
        let response = self
            .client
            .invoke(ctx, session, &WireLogoutRequest::default())
            .await?;
        Ok(convert_logout_response(response))
    }
}
