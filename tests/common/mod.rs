#![allow(dead_code)]

use async_trait::async_trait;
use encoding_rs::SHIFT_JIS;
use eshiten::core::errors::ExchangeError;
use eshiten::core::kernel::{RecordStream, Requester};
use percent_encoding::percent_decode_str;
use serde_json::Value;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

pub const REQUEST_URL: &str = "https://host/request/abc/";
pub const MASTER_URL: &str = "https://host/master/abc/";
pub const PRICE_URL: &str = "https://host/price/abc/";
pub const EVENT_URL: &str = "https://host/event/abc/";

/// A login acknowledgement carrying the scripted session URLs.
pub fn login_ack(request_number: i64) -> String {
    format!(
        r#"{{"p_no":"{}","p_sd_date":"2024.01.04-08:00:00.000","p_rv_date":"2024.01.04-08:00:00.010","p_errno":"0","p_err":"","sCLMID":"CLMAuthLoginAck","sResultCode":"0","sResultText":"","sZyoutoekiKazeiC":"1","sSecondPasswordOmit":"0","sLastLoginDate":"20240103170000","sSogoKouzaKubun":"1","sShinyouKouzaKubun":"1","sKinsyouhouMidokuFlg":"0","sUrlRequest":"{}","sUrlMaster":"{}","sUrlPrice":"{}","sUrlEvent":"{}"}}"#,
        request_number, REQUEST_URL, MASTER_URL, PRICE_URL, EVENT_URL
    )
}

/// A minimal successful reply echoing `p_no` for a request tagged `clmid`.
pub fn ack(call: &Call, clmid: &str) -> String {
    format!(
        r#"{{"p_no":"{}","p_errno":"0","p_err":"","sCLMID":"{}","sResultCode":"0","sResultText":""}}"#,
        call.request_number(),
        clmid
    )
}

pub fn empty_order_list(call: &Call) -> String {
    format!(
        r#"{{"p_no":"{}","p_errno":"0","sCLMID":"CLMOrderList","sResultCode":"0","sIssueCode":"","sOrderSyoukaiStatus":"","sSikkouDay":"","aOrderList":""}}"#,
        call.request_number()
    )
}

/// One request as seen by a test double.
#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    pub payload: Value,
}

impl Call {
    pub fn clmid(&self) -> &str {
        self.payload["sCLMID"].as_str().unwrap_or_default()
    }

    pub fn request_number(&self) -> i64 {
        self.payload["p_no"]
            .as_str()
            .and_then(|n| n.parse().ok())
            .unwrap_or_default()
    }
}

type Handler = dyn Fn(&Call) -> Result<String, ExchangeError> + Send + Sync;

/// What one scripted event download publishes.
struct ScriptedStream {
    records: Vec<String>,
    complete: bool,
    cancel_at_end: bool,
}

struct Script {
    handler: Box<Handler>,
    streams: Mutex<VecDeque<ScriptedStream>>,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
}

/// In-process `Requester` answering from a closure and recording every call.
#[derive(Clone)]
pub struct ScriptedRequester {
    script: Arc<Script>,
}

impl ScriptedRequester {
    pub fn new(handler: impl Fn(&Call) -> Result<String, ExchangeError> + Send + Sync + 'static) -> Self {
        Self::with_delay(Duration::ZERO, handler)
    }

    pub fn with_delay(
        delay: Duration,
        handler: impl Fn(&Call) -> Result<String, ExchangeError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Arc::new(Script {
                handler: Box::new(handler),
                streams: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                delay,
            }),
        }
    }

    /// Queue the records the next event download publishes, followed by completion.
    pub fn push_stream(&self, records: Vec<String>) {
        self.push_stream_with(records, true, false);
    }

    /// Queue a download that may stop short of completion, and may cancel the
    /// caller's token once its records are out.
    pub fn push_stream_with(&self, records: Vec<String>, complete: bool, cancel_at_end: bool) {
        self.script.streams.lock().unwrap().push_back(ScriptedStream {
            records,
            complete,
            cancel_at_end,
        });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.script.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, url: &str, payload: &str) -> Call {
        let call = Call {
            url: url.to_string(),
            payload: serde_json::from_str(payload).expect("payload must be JSON"),
        };
        self.script.calls.lock().unwrap().push(call.clone());
        call
    }
}

#[async_trait]
impl Requester for ScriptedRequester {
    async fn request(
        &self,
        ctx: &CancellationToken,
        url: &str,
        payload: &str,
    ) -> Result<String, ExchangeError> {
        let call = self.record(url, payload);

        let now = self.script.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.script.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let cancelled = tokio::select! {
            () = ctx.cancelled() => true,
            () = tokio::time::sleep(self.script.delay) => false,
        };
        self.script.in_flight.fetch_sub(1, Ordering::SeqCst);

        if cancelled {
            return Err(ExchangeError::Cancelled);
        }
        (self.script.handler)(&call)
    }

    fn stream(
        &self,
        ctx: &CancellationToken,
        url: &str,
        payload: &str,
    ) -> Result<RecordStream, ExchangeError> {
        self.record(url, payload);
        let script = self
            .script
            .streams
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ScriptedStream {
                records: Vec::new(),
                complete: true,
                cancel_at_end: false,
            });

        let (sink, stream) = RecordStream::channel(script.records.len().max(1));
        let ctx = ctx.clone();
        tokio::spawn(async move {
            for record in script.records {
                if sink.records.send(record).await.is_err() {
                    return;
                }
            }
            if script.cancel_at_end {
                ctx.cancel();
            }
            if script.complete {
                sink.complete();
            }
        });
        Ok(stream)
    }
}

/// How the mock server answers one route.
#[derive(Clone)]
pub enum Reply {
    /// Fixed-length response.
    Body { status: u16, body: Vec<u8> },
    /// Chunked response. With `hold_open` the terminating chunk is never sent.
    Chunked {
        chunks: Vec<Vec<u8>>,
        pause: Duration,
        hold_open: bool,
    },
    /// Read the request and never answer.
    Silent,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self::Body {
            status: 200,
            body: shift_jis(body),
        }
    }
}

pub fn shift_jis(text: &str) -> Vec<u8> {
    let (bytes, _, had_errors) = SHIFT_JIS.encode(text);
    assert!(!had_errors, "fixture must be representable in Shift_JIS");
    bytes.into_owned()
}

struct ServerState {
    routes: Mutex<Vec<(String, Reply)>>,
    queries: Mutex<Vec<Value>>,
    hits: AtomicUsize,
    disconnected: Notify,
}

/// Local HTTP/1.1 server speaking just enough of the protocol for reqwest.
pub struct MockServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
}

impl MockServer {
    /// Routes are matched by path prefix, first match wins.
    pub async fn start(routes: Vec<(&str, Reply)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(ServerState {
            routes: Mutex::new(
                routes
                    .into_iter()
                    .map(|(path, reply)| (path.to_string(), reply))
                    .collect(),
            ),
            queries: Mutex::new(Vec::new()),
            hits: AtomicUsize::new(0),
            disconnected: Notify::new(),
        });

        let accept_state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let state = Arc::clone(&accept_state);
                tokio::spawn(async move {
                    let _ = serve(socket, state).await;
                });
            }
        });

        Self { addr, state }
    }

    /// Add a route once the server address is known.
    pub fn route(&self, path: &str, reply: Reply) {
        self.state
            .routes
            .lock()
            .unwrap()
            .push((path.to_string(), reply));
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// Decoded JSON payloads in arrival order.
    pub fn queries(&self) -> Vec<Value> {
        self.state.queries.lock().unwrap().clone()
    }

    /// Resolves once a held-open or unanswered connection has been closed by the client.
    pub async fn wait_disconnect(&self) {
        self.state.disconnected.notified().await;
    }
}

async fn serve(mut socket: TcpStream, state: Arc<ServerState>) -> std::io::Result<()> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        head.extend_from_slice(&buf[..n]);
    }

    let head = String::from_utf8_lossy(&head).to_string();
    let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    let (path, query) = target.split_once('?').unwrap_or((target.as_str(), ""));

    state.hits.fetch_add(1, Ordering::SeqCst);
    let bytes: Vec<u8> = percent_decode_str(query).collect();
    let (text, _) = SHIFT_JIS.decode_without_bom_handling(&bytes);
    if let Ok(value) = serde_json::from_str(&text) {
        state.queries.lock().unwrap().push(value);
    }

    let reply = state
        .routes
        .lock()
        .unwrap()
        .iter()
        .find(|(prefix, _)| path.starts_with(prefix.as_str()))
        .map(|(_, reply)| reply.clone())
        .unwrap_or(Reply::Body {
            status: 404,
            body: Vec::new(),
        });

    match reply {
        Reply::Body { status, body } => {
            let header = format!(
                "HTTP/1.1 {} Mock\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            socket.write_all(header.as_bytes()).await?;
            socket.write_all(&body).await?;
            socket.flush().await?;
        }
        Reply::Chunked {
            chunks,
            pause,
            hold_open,
        } => {
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
                )
                .await?;
            for chunk in chunks {
                socket
                    .write_all(format!("{:x}\r\n", chunk.len()).as_bytes())
                    .await?;
                socket.write_all(&chunk).await?;
                socket.write_all(b"\r\n").await?;
                socket.flush().await?;
                tokio::time::sleep(pause).await;
            }

            if hold_open {
                // Wait for the client to go away.
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {}
                    }
                }
                state.disconnected.notify_one();
                return Ok(());
            }
            socket.write_all(b"0\r\n\r\n").await?;
            socket.flush().await?;
        }
        Reply::Silent => {
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                }
            }
            state.disconnected.notify_one();
        }
    }

    Ok(())
}
