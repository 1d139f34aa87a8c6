/// Session and transport kernel shared by every business operation.
///
/// The kernel knows nothing about orders or prices. It owns:
///
/// ## Wire format
/// - `temporal`: the five date-time shapes carried as text
/// - `codec`: Shift_JIS transcoding, query escaping and event-stream record splitting
/// - `envelope`: request/response headers and the empty-string fix-up table
///
/// ## Conversation state
/// - `Session`: endpoint addresses, request counter and the mutual-exclusion gate
///
/// ## Transport
/// - `Requester`: single and streaming exchanges, with a reqwest implementation
/// - `ApiClient`: `invoke` / `invoke_stream` tying the pieces together
///
/// # Example
/// ```rust,no_run
/// use eshiten::core::config::{ApiVersion, Environment};
/// use eshiten::core::kernel::*;
///
/// # fn example() -> Result<(), eshiten::ExchangeError> {
/// let requester = RequesterBuilder::new(RequesterConfig::new().with_timeout(30)).build()?;
/// let client = ApiClient::new(requester, select_endpoint(Environment::Demo, ApiVersion::Latest));
/// assert!(client.auth_url().ends_with("/auth/"));
/// # Ok(())
/// # }
/// ```
pub mod client;
pub mod codec;
pub mod envelope;
pub mod requester;
pub mod session;
pub mod temporal;

// Re-export key types for convenience
pub use client::{select_endpoint, ApiClient, EventStream};
pub use codec::{decode_from_wire, encode_for_wire, RecordSplitter};
pub use envelope::{
    Fixup, RequestEnvelope, ResponseEnvelope, StreamRecord, WireRequest, WireResponse,
    EVENT_DOWNLOAD_COMPLETE,
};
pub use requester::{
    Outcome, RecordSink, RecordStream, ReqwestRequester, Requester, RequesterBuilder,
    RequesterConfig,
};
pub use session::{Endpoint, Session, SessionUrls};
pub use temporal::{
    exchange_zone, CompactDateTime, HourMinute, RequestTime, TimeError, Timestamp, WireDate,
    YearMonth,
};
