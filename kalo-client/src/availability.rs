use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Error message fragments that point at a connectivity problem rather than
/// a backend rejecting the request. Deployments fail in many shapes (proxy
/// 404s, CORS preflights, DNS), so the classification is deliberately fuzzy.
const CONNECTIVITY_HINTS: &[&str] = &[
    "cors",
    "network error",
    "failed to fetch",
    "fetch failed",
    "dns error",
    "failed to lookup",
    "connection refused",
    "connection reset",
    "error sending request",
];

/// Statuses that a sleeping or misrouted deployment answers with before the
/// application itself is reachable.
const UNAVAILABLE_STATUSES: &[u16] = &[404, 500, 503];

/// What we know about a failed request, collected at the transport boundary
/// so the fallback decision can be made without holding on to the client
/// library's error type.
#[derive(Debug, Clone)]
pub struct RequestFailure {
    pub status: Option<u16>,
    pub message: String,
    pub connect: bool,
    pub timeout: bool,
}

impl RequestFailure {
    pub fn from_transport(err: &reqwest::Error) -> Self {
        Self {
            status: None,
            message: error_chain(err),
            connect: err.is_connect(),
            timeout: err.is_timeout(),
        }
    }

    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            connect: false,
            timeout: false,
        }
    }
}

/// The useful detail ("dns error", "connection refused") usually sits a few
/// causes down the chain, so flatten it into one string.
fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Whether a failed request means the backend itself is unreachable, as
/// opposed to the backend rejecting this particular request.
pub fn is_unavailable(failure: &RequestFailure) -> bool {
    let Some(status) = failure.status else {
        return true;
    };

    if UNAVAILABLE_STATUSES.contains(&status) {
        return true;
    }

    if failure.connect || failure.timeout {
        return true;
    }

    let message = failure.message.to_lowercase();
    CONNECTIVITY_HINTS.iter().any(|hint| message.contains(hint))
}

/// Process-wide backend reachability state. `available` is a best-effort
/// liveness hint updated by every request outcome, `wake_attempted` latches
/// the one startup wake sequence.
pub struct Availability {
    available: AtomicBool,
    wake_attempted: AtomicBool,
}

impl Availability {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            wake_attempted: AtomicBool::new(false),
        }
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    pub fn mark_available(&self) {
        self.available.store(true, Ordering::SeqCst);
    }

    pub fn mark_unavailable(&self) {
        self.available.store(false, Ordering::SeqCst);
    }

    /// Claims the wake sequence. Returns false when some earlier call
    /// already ran it for this process.
    pub fn begin_wake(&self) -> bool {
        self.wake_attempted
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

impl Default for Availability {
    fn default() -> Self {
        Self::new()
    }
}

/// One reachability check: the dedicated health route first, the root path
/// as a fallback for deployments without one. True only on an HTTP success
/// status.
pub async fn probe(http: &reqwest::Client, base_url: &str, timeout: Duration) -> bool {
    let health = format!("{base_url}/health");
    match http.get(&health).timeout(timeout).send().await {
        Ok(res) if res.status().is_success() => return true,
        Ok(res) => debug!("health probe answered {}", res.status()),
        Err(err) => debug!("health probe failed: {err}"),
    }

    match http.get(base_url).timeout(timeout).send().await {
        Ok(res) if res.status().is_success() => true,
        Ok(res) => {
            debug!("root probe answered {}", res.status());
            false
        }
        Err(err) => {
            debug!("root probe failed: {err}");
            false
        }
    }
}

/// Repeatedly probes a backend that may be cold-starting on auto-sleeping
/// infrastructure. Returns true on the first successful probe.
pub async fn wake_up(
    http: &reqwest::Client,
    base_url: &str,
    attempts: u32,
    delay: Duration,
    probe_timeout: Duration,
) -> bool {
    for attempt in 1..=attempts {
        info!("waking backend, attempt {attempt}/{attempts}");
        if probe(http, base_url, probe_timeout).await {
            info!("backend is awake");
            return true;
        }
        if attempt < attempts {
            tokio::time::sleep(delay).await;
        }
    }

    warn!("backend did not wake up after {attempts} attempts");
    false
}
