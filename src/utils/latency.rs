use crate::core::config::LatencyConfig;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

pub type DelayFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Injectable delay used to simulate network latency before each operation
#[derive(Clone)]
pub struct Latency {
    delay: Arc<dyn Fn(Duration) -> DelayFuture + Send + Sync>,
}

impl Latency {
    /// Real timed suspension on the tokio timer
    pub fn tokio() -> Self {
        Self::from_fn(|duration| Box::pin(tokio::time::sleep(duration)))
    }

    /// Resolve immediately regardless of the requested duration
    pub fn none() -> Self {
        Self::from_fn(|_| Box::pin(std::future::ready(())))
    }

    pub fn from_fn<F>(delay: F) -> Self
    where
        F: Fn(Duration) -> DelayFuture + Send + Sync + 'static,
    {
        Self {
            delay: Arc::new(delay),
        }
    }

    pub fn from_config(config: &LatencyConfig) -> Self {
        if config.enabled {
            Self::tokio()
        } else {
            Self::none()
        }
    }

    pub async fn wait(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        (self.delay)(duration).await;
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self::tokio()
    }
}

impl fmt::Debug for Latency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Latency").finish_non_exhaustive()
    }
}
