use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Which address a request is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Login; the only endpoint reachable without a session.
    Auth,
    Request,
    Master,
    Price,
    Event,
}

impl Endpoint {
    /// Master/reference data may run alongside anything else on the same login.
    pub const fn is_gated(self) -> bool {
        !matches!(self, Self::Master)
    }
}

/// Per-login addresses issued by a successful login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUrls {
    pub request: String,
    pub event: String,
    pub master: String,
    pub price: String,
}

/// One authenticated conversation.
///
/// The upstream service rejects repeated or out-of-order request numbers, so every
/// gated operation holds the gate from the moment it takes its number until its
/// response has been read. The counter is never exposed for direct mutation.
#[derive(Debug)]
pub struct Session {
    urls: SessionUrls,
    last_request_number: AtomicI64,
    gate: Arc<Mutex<()>>,
}

impl Session {
    pub(crate) fn new(urls: SessionUrls, initial_request_number: i64) -> Self {
        Self {
            urls,
            last_request_number: AtomicI64::new(initial_request_number),
            gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn request_url(&self) -> &str {
        &self.urls.request
    }

    pub fn event_url(&self) -> &str {
        &self.urls.event
    }

    pub fn master_url(&self) -> &str {
        &self.urls.master
    }

    pub fn price_url(&self) -> &str {
        &self.urls.price
    }

    /// The number carried by the most recent request on this session.
    pub fn last_request_number(&self) -> i64 {
        self.last_request_number.load(Ordering::SeqCst)
    }

    /// Session address for `endpoint`; `None` for [`Endpoint::Auth`].
    pub fn url(&self, endpoint: Endpoint) -> Option<&str> {
        match endpoint {
            Endpoint::Auth => None,
            Endpoint::Request => Some(&self.urls.request),
            Endpoint::Event => Some(&self.urls.event),
            Endpoint::Master => Some(&self.urls.master),
            Endpoint::Price => Some(&self.urls.price),
        }
    }

    /// Increment the counter and return the new value.
    pub(crate) fn next_request_number(&self) -> i64 {
        self.last_request_number.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Take a request number, first waiting for the gate when `endpoint` is gated.
    ///
    /// The returned slot keeps the gate closed until it is dropped.
    pub(crate) async fn begin(&self, endpoint: Endpoint) -> RequestSlot {
        let gate = if endpoint.is_gated() {
            Some(Arc::clone(&self.gate).lock_owned().await)
        } else {
            None
        };

        RequestSlot {
            request_number: self.next_request_number(),
            _gate: gate,
        }
    }
}

/// A request number plus, for gated operations, exclusive use of the session.
#[derive(Debug)]
pub(crate) struct RequestSlot {
    pub request_number: i64,
    _gate: Option<OwnedMutexGuard<()>>,
}
