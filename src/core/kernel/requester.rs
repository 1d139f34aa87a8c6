use crate::core::errors::ExchangeError;
use crate::core::kernel::codec::{decode_from_wire, encode_for_wire, RecordSplitter};
use crate::core::kernel::envelope::is_event_download_complete;
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace, warn};

/// Transport capability shared by the production client and test doubles.
///
/// `payload` is the serialized wire record as plain text; implementations own
/// transcoding and escaping.
#[async_trait]
pub trait Requester: Send + Sync {
    /// One request/response exchange. Returns the decoded response body.
    async fn request(
        &self,
        ctx: &CancellationToken,
        url: &str,
        payload: &str,
    ) -> Result<String, ExchangeError>;

    /// Open an event download.
    ///
    /// Fails synchronously only for problems detected before any I/O (such as an
    /// unencodable payload); everything later is delivered through the stream.
    fn stream(
        &self,
        ctx: &CancellationToken,
        url: &str,
        payload: &str,
    ) -> Result<RecordStream, ExchangeError>;
}

/// How an event download ended: `Ok` once the completion record was seen.
pub type Outcome = Result<(), ExchangeError>;

/// Receiving half of an event download: a record channel and a terminal outcome channel.
///
/// Both close together. The outcome carries either the completion signal or one
/// error; it is dropped unsent when the download was cancelled.
#[derive(Debug)]
pub struct RecordStream {
    records: mpsc::Receiver<String>,
    outcome: Option<oneshot::Receiver<Outcome>>,
    complete: bool,
}

/// Producing half of an event download.
#[derive(Debug)]
pub struct RecordSink {
    pub records: mpsc::Sender<String>,
    pub outcome: oneshot::Sender<Outcome>,
}

impl RecordStream {
    pub fn channel(buffer: usize) -> (RecordSink, Self) {
        let (records_tx, records_rx) = mpsc::channel(buffer.max(1));
        let (outcome_tx, outcome_rx) = oneshot::channel();
        (
            RecordSink {
                records: records_tx,
                outcome: outcome_tx,
            },
            Self {
                records: records_rx,
                outcome: Some(outcome_rx),
                complete: false,
            },
        )
    }

    /// Next raw record, then at most one error, then `None`.
    pub async fn next(&mut self) -> Option<Result<String, ExchangeError>> {
        if let Some(record) = self.records.recv().await {
            return Some(Ok(record));
        }
        let outcome = self.outcome.take()?;
        match outcome.await {
            Ok(Ok(())) => {
                self.complete = true;
                None
            }
            Ok(Err(e)) => Some(Err(e)),
            Err(_) => None,
        }
    }

    /// Whether the completion record was seen. Only meaningful once `next` returned `None`.
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

impl RecordSink {
    /// Signal that the completion record arrived; dropping `self` closes the record channel too.
    pub fn complete(self) {
        let _ = self.outcome.send(Ok(()));
    }

    /// Publish the terminal error.
    pub fn fail(self, error: ExchangeError) {
        let _ = self.outcome.send(Err(error));
    }
}

/// Configuration for the HTTP requester
#[derive(Clone, Debug)]
pub struct RequesterConfig {
    /// User agent string to include in requests
    pub user_agent: String,
    /// Optional whole-request timeout; by default callers bound requests through cancellation
    pub timeout_seconds: Option<u64>,
    /// Records buffered between the download task and its consumer
    pub stream_buffer: usize,
}

impl RequesterConfig {
    pub fn new() -> Self {
        Self {
            user_agent: "eshiten/0.1".to_string(),
            timeout_seconds: None,
            stream_buffer: 64,
        }
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn with_stream_buffer(mut self, stream_buffer: usize) -> Self {
        self.stream_buffer = stream_buffer;
        self
    }
}

impl Default for RequesterConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating requester instances
pub struct RequesterBuilder {
    config: RequesterConfig,
}

impl RequesterBuilder {
    pub fn new(config: RequesterConfig) -> Self {
        Self { config }
    }

    pub fn build(self) -> Result<ReqwestRequester, ExchangeError> {
        let mut builder = Client::builder().user_agent(&self.config.user_agent);
        if let Some(seconds) = self.config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder.build()?;

        Ok(ReqwestRequester {
            client,
            config: self.config,
        })
    }
}

/// Implementation of `Requester` using reqwest
#[derive(Clone)]
pub struct ReqwestRequester {
    client: Client,
    config: RequesterConfig,
}

impl std::fmt::Debug for ReqwestRequester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestRequester")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestRequester {
    pub fn new() -> Result<Self, ExchangeError> {
        RequesterBuilder::new(RequesterConfig::new()).build()
    }

    /// The protocol carries its record as the raw query string of a GET.
    fn build_url(url: &str, payload: &str) -> Result<String, ExchangeError> {
        Ok(format!("{}?{}", url, encode_for_wire(payload)?))
    }

    async fn send(client: &Client, target: &str) -> Result<Response, ExchangeError> {
        let response = client.get(target).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Non-success HTTP status");
            return Err(ExchangeError::StatusNotOk(status));
        }
        Ok(response)
    }

    async fn download(
        client: Client,
        target: String,
        sink: RecordSink,
    ) {
        let RecordSink { records, outcome } = sink;
        match Self::read_records(&client, &target, &records).await {
            Ok(true) => {
                let _ = outcome.send(Ok(()));
            }
            // Consumer went away; nobody is left to tell.
            Ok(false) => {}
            Err(e) => {
                warn!("Event download failed: {}", e);
                let _ = outcome.send(Err(e));
            }
        }
    }

    /// Returns `true` when the completion record was reached, `false` when the consumer left.
    async fn read_records(
        client: &Client,
        target: &str,
        records: &mpsc::Sender<String>,
    ) -> Result<bool, ExchangeError> {
        let mut response = tokio::select! {
            response = Self::send(client, target) => response?,
            () = records.closed() => {
                debug!("Event download consumer went away before the response");
                return Ok(false);
            }
        };
        let mut splitter = RecordSplitter::new();
        let mut published = 0usize;

        loop {
            let chunk = tokio::select! {
                chunk = response.chunk() => chunk?,
                () = records.closed() => {
                    debug!(published, "Event download consumer went away");
                    return Ok(false);
                }
            };

            let (batch, finished) = match chunk {
                Some(bytes) => (splitter.push(&bytes)?, false),
                None => (splitter.finish()?, true),
            };

            for record in batch {
                if is_event_download_complete(&record)? {
                    debug!(published, "Event download complete");
                    return Ok(true);
                }
                trace!("Event record: {}", record);
                if records.send(record).await.is_err() {
                    return Ok(false);
                }
                published += 1;
            }

            if finished {
                return Err(ExchangeError::NetworkError(
                    "Event stream closed before the completion record".to_string(),
                ));
            }
        }
    }
}

#[async_trait]
impl Requester for ReqwestRequester {
    #[instrument(skip(self, ctx, payload), fields(url = %url))]
    async fn request(
        &self,
        ctx: &CancellationToken,
        url: &str,
        payload: &str,
    ) -> Result<String, ExchangeError> {
        let target = Self::build_url(url, payload)?;

        let exchange = async {
            let response = Self::send(&self.client, &target).await?;
            let body = response.bytes().await?;
            let text = decode_from_wire(&body)?;
            trace!("Response body: {}", text);
            Ok(text)
        };

        tokio::select! {
            () = ctx.cancelled() => Err(ExchangeError::Cancelled),
            result = exchange => result,
        }
    }

    #[instrument(skip(self, ctx, payload), fields(url = %url))]
    fn stream(
        &self,
        ctx: &CancellationToken,
        url: &str,
        payload: &str,
    ) -> Result<RecordStream, ExchangeError> {
        let target = Self::build_url(url, payload)?;
        let (sink, stream) = RecordStream::channel(self.config.stream_buffer);
        let client = self.client.clone();
        let ctx = ctx.clone();

        // Cancelling drops the download future, which drops the response (closing the
        // connection) and both senders (closing the channels).
        tokio::spawn(async move {
            tokio::select! {
                () = ctx.cancelled() => debug!("Event download cancelled"),
                () = Self::download(client, target, sink) => {}
            }
        });

        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requester_creation() {
        let requester = RequesterBuilder::new(
            RequesterConfig::new()
                .with_timeout(10)
                .with_user_agent("test-agent".to_string()),
        )
        .build()
        .unwrap();

        assert_eq!(requester.config.timeout_seconds, Some(10));
        assert_eq!(requester.config.user_agent, "test-agent");
    }

    #[test]
    fn test_build_url_escapes_payload() {
        let url = ReqwestRequester::build_url("https://host/e_api_v4r5/auth/", r#"{"a":"b"}"#)
            .unwrap();
        assert_eq!(url, "https://host/e_api_v4r5/auth/?%7B%22a%22%3A%22b%22%7D");
    }

    #[tokio::test]
    async fn test_stream_rejects_unencodable_payload_before_io() {
        let requester = ReqwestRequester::new().unwrap();
        let ctx = CancellationToken::new();
        let result = requester.stream(&ctx, "http://127.0.0.1:1/", "☃ \u{1F600}");
        assert!(matches!(result, Err(ExchangeError::EncodeError(_))));
    }

    #[tokio::test]
    async fn test_record_stream_delivers_records_then_error() {
        let (sink, mut stream) = RecordStream::channel(4);
        sink.records.send("{}".to_string()).await.unwrap();
        sink.fail(ExchangeError::DecodeError);

        assert!(matches!(stream.next().await, Some(Ok(_))));
        assert!(matches!(
            stream.next().await,
            Some(Err(ExchangeError::DecodeError))
        ));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_record_stream_closes_cleanly_without_error() {
        let (sink, mut stream) = RecordStream::channel(1);
        drop(sink);
        assert!(stream.next().await.is_none());
        assert!(stream.next().await.is_none());
        assert!(!stream.is_complete());
    }

    #[tokio::test]
    async fn test_record_stream_reports_completion() {
        let (sink, mut stream) = RecordStream::channel(2);
        sink.records.send("{}".to_string()).await.unwrap();
        sink.complete();

        assert!(matches!(stream.next().await, Some(Ok(_))));
        assert!(!stream.is_complete());
        assert!(stream.next().await.is_none());
        assert!(stream.is_complete());
    }
}
