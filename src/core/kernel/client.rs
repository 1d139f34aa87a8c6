use crate::core::config::{ApiVersion, Environment};
use crate::core::errors::ExchangeError;
use crate::core::kernel::envelope::{
    RequestEnvelope, StreamRecord, WireRecord, WireRequest, WireResponse,
};
use crate::core::kernel::requester::{RecordStream, Requester};
use crate::core::kernel::session::{Endpoint, RequestSlot, Session};
use std::marker::PhantomData;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Request number carried by the login request; the session counter starts after it.
pub const LOGIN_REQUEST_NUMBER: i64 = 1;

/// Base address for an environment and protocol revision: `https://{host}/e_api_{version}/`.
pub fn select_endpoint(environment: Environment, api_version: ApiVersion) -> String {
    format!(
        "https://{}/e_api_{}/",
        environment.host(),
        api_version.path_segment()
    )
}

/// Ties sessions, the wire envelope and a [`Requester`] together.
///
/// Business code supplies only record shapes: a [`WireRequest`] with its operation
/// tag and endpoint, and a response implementing [`WireResponse`] or [`StreamRecord`].
#[derive(Debug, Clone)]
pub struct ApiClient<R: Requester> {
    requester: R,
    base_url: String,
}

impl<R: Requester> ApiClient<R> {
    pub fn new(requester: R, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            requester,
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_url(&self) -> String {
        format!("{}auth/", self.base_url)
    }

    pub fn requester(&self) -> &R {
        &self.requester
    }

    /// Send a request that needs no session. Only login is issued this way.
    #[instrument(skip(self, ctx, request), fields(clmid = %Q::CLMID))]
    pub async fn login<Q>(
        &self,
        ctx: &CancellationToken,
        request: &Q,
    ) -> Result<Q::Response, ExchangeError>
    where
        Q: WireRequest,
        Q::Response: WireResponse,
    {
        let payload = encode_record(LOGIN_REQUEST_NUMBER, request)?;
        let raw = self
            .requester
            .request(ctx, &self.auth_url(), &payload)
            .await?;
        Q::Response::decode(&raw)
    }

    /// One request/response exchange on `session`.
    ///
    /// Without a session this fails with [`ExchangeError::NilArgumentError`] before
    /// the counter or the network is touched.
    #[instrument(skip(self, ctx, session, request), fields(clmid = %Q::CLMID))]
    pub async fn invoke<Q>(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        request: &Q,
    ) -> Result<Q::Response, ExchangeError>
    where
        Q: WireRequest,
        Q::Response: WireResponse,
    {
        let session = session.ok_or(ExchangeError::NilArgumentError)?;
        let url = self.target_url(session, Q::ENDPOINT);

        let slot = session.begin(Q::ENDPOINT).await;
        debug!(request_number = slot.request_number, "Dispatching request");
        let payload = encode_record(slot.request_number, request)?;
        let raw = self.requester.request(ctx, &url, &payload).await?;
        drop(slot);

        Q::Response::decode(&raw)
    }

    /// Start an event download on `session` and hand back its records as they arrive.
    ///
    /// A gated download keeps the session gate until the returned stream is dropped.
    #[instrument(skip(self, ctx, session, request), fields(clmid = %Q::CLMID))]
    pub async fn open_stream<Q>(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        request: &Q,
    ) -> Result<EventStream<Q::Response>, ExchangeError>
    where
        Q: WireRequest,
        Q::Response: StreamRecord,
    {
        let session = session.ok_or(ExchangeError::NilArgumentError)?;
        let url = self.target_url(session, Q::ENDPOINT);

        let slot = session.begin(Q::ENDPOINT).await;
        debug!(request_number = slot.request_number, "Opening event download");
        let payload = encode_record(slot.request_number, request)?;
        let records = self.requester.stream(ctx, &url, &payload)?;

        Ok(EventStream {
            records,
            _slot: slot,
            _record: PhantomData,
        })
    }

    /// Drain an event download into a vector.
    ///
    /// Returns the records that preceded the completion record. The first transport
    /// or decode failure is returned instead. A download that closed without its
    /// completion record is [`ExchangeError::Cancelled`] when `ctx` was cancelled
    /// and [`ExchangeError::NetworkError`] otherwise, never a short result.
    pub async fn invoke_stream<Q>(
        &self,
        ctx: &CancellationToken,
        session: Option<&Session>,
        request: &Q,
    ) -> Result<Vec<Q::Response>, ExchangeError>
    where
        Q: WireRequest,
        Q::Response: StreamRecord,
    {
        let mut stream = self.open_stream(ctx, session, request).await?;
        let mut records = Vec::new();
        while let Some(record) = stream.next().await {
            records.push(record?);
        }

        if !stream.is_complete() {
            if ctx.is_cancelled() {
                return Err(ExchangeError::Cancelled);
            }
            return Err(ExchangeError::NetworkError(
                "Event download ended without its completion record".to_string(),
            ));
        }
        debug!(count = records.len(), "Event download drained");
        Ok(records)
    }

    fn target_url(&self, session: &Session, endpoint: Endpoint) -> String {
        session
            .url(endpoint)
            .map_or_else(|| self.auth_url(), str::to_string)
    }
}

fn encode_record<Q: WireRequest>(
    request_number: i64,
    request: &Q,
) -> Result<String, ExchangeError> {
    let record = WireRecord {
        envelope: RequestEnvelope::new(request_number, Q::CLMID),
        body: request,
    };
    serde_json::to_string(&record).map_err(|e| ExchangeError::SerializationError(e.to_string()))
}

/// Typed view over a running event download.
#[derive(Debug)]
pub struct EventStream<T> {
    records: RecordStream,
    _slot: RequestSlot,
    _record: PhantomData<fn() -> T>,
}

impl<T: StreamRecord> EventStream<T> {
    /// Next decoded record; `None` once the download has completed or was cancelled.
    pub async fn next(&mut self) -> Option<Result<T, ExchangeError>> {
        match self.records.next().await? {
            Ok(raw) => Some(T::decode_record(&raw)),
            Err(e) => Some(Err(e)),
        }
    }

    /// Whether the completion record was seen, as opposed to a cancelled download.
    pub fn is_complete(&self) -> bool {
        self.records.is_complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_endpoint() {
        assert_eq!(
            select_endpoint(Environment::Production, ApiVersion::Latest),
            "https://kabuka.e-shiten.jp/e_api_v4r5/"
        );
        assert_eq!(
            select_endpoint(Environment::Demo, ApiVersion::V4R3),
            "https://demo-kabuka.e-shiten.jp/e_api_v4r3/"
        );
        assert_eq!(
            select_endpoint(Environment::default(), ApiVersion::default()),
            select_endpoint(Environment::Production, ApiVersion::V4R5)
        );
    }
}
