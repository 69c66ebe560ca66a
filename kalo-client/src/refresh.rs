use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// The one pending token-refresh timer for this process. Scheduling always
/// cancels whatever was pending first, so refreshes cannot storm.
pub struct RefreshScheduler {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }

    pub fn schedule<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut guard = self.handle.lock().expect("refresh timer lock poisoned");

        if let Some(pending) = guard.take() {
            pending.abort();
        }

        debug!("scheduling token refresh in {delay:?}");
        *guard = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    pub fn cancel(&self) {
        let mut guard = self.handle.lock().expect("refresh timer lock poisoned");
        if let Some(pending) = guard.take() {
            debug!("cancelling pending token refresh");
            pending.abort();
        }
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}
