pub mod builder;
pub mod connector;
pub mod conversions;
pub mod types;

// Re-export main types for easier importing
pub use builder::{build_connector, build_connector_with_config, build_connector_with_requester};
pub use connector::EshitenConnector;
pub use types::{
    WireCancelOrderRequest, WireCorrectOrderRequest, WireLoginRequest, WireLogoutRequest,
    WireMarketPriceRequest, WireMasterDownloadRequest, WireMasterRecord, WireNewOrderRequest,
    WireOrderListRequest,
};
