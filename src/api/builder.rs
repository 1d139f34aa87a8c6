use crate::api::connector::EshitenConnector;
use crate::core::{
    config::ClientConfig,
    errors::ExchangeError,
    kernel::{ApiClient, ReqwestRequester, Requester, RequesterBuilder, RequesterConfig},
};

/// Create an e-shiten connector over HTTP
pub fn build_connector(
    config: &ClientConfig,
) -> Result<EshitenConnector<ReqwestRequester>, ExchangeError> {
    build_connector_with_config(config, RequesterConfig::new())
}

/// Create an e-shiten connector with custom transport settings
pub fn build_connector_with_config(
    config: &ClientConfig,
    requester_config: RequesterConfig,
) -> Result<EshitenConnector<ReqwestRequester>, ExchangeError> {
    let requester = RequesterBuilder::new(requester_config).build()?;
    Ok(build_connector_with_requester(config, requester))
}

/// Create an e-shiten connector on top of any transport
pub fn build_connector_with_requester<R: Requester + Clone>(
    config: &ClientConfig,
    requester: R,
) -> EshitenConnector<R> {
    let client = ApiClient::new(requester, config.endpoint());
    EshitenConnector::new(client, config)
}
