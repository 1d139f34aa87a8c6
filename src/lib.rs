pub mod api;
pub mod core;

pub use api::{build_connector, EshitenConnector};
pub use crate::core::{
    errors::ExchangeError,
    kernel::{ApiClient, Session},
    traits::BrokerConnector,
    types::*,
};
