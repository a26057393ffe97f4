//! Shared plumbing for community mirror pools: per-invocation ordering,
//! short timeouts and first-success iteration.

use std::{future::Future, sync::Arc, sync::Mutex, time::Duration};

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::SourceError;

/// Decides the order in which mirrors are tried on each invocation
pub trait MirrorOrder: Send + Sync {
    fn arrange(&self, mirrors: &mut [String]);
}

/// Uniform shuffle from the thread-local generator
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomOrder;

impl MirrorOrder for RandomOrder {
    fn arrange(&self, mirrors: &mut [String]) {
        mirrors.shuffle(&mut rand::rng());
    }
}

/// Keeps the configured order
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedOrder;

impl MirrorOrder for FixedOrder {
    fn arrange(&self, _mirrors: &mut [String]) {}
}

/// Reproducible shuffle sequence for a given seed
#[derive(Debug)]
pub struct SeededOrder(Mutex<StdRng>);

impl SeededOrder {
    pub fn new(seed: u64) -> Self {
        Self(Mutex::new(StdRng::seed_from_u64(seed)))
    }
}

impl MirrorOrder for SeededOrder {
    fn arrange(&self, mirrors: &mut [String]) {
        let mut rng = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        mirrors.shuffle(&mut *rng);
    }
}

#[derive(Clone)]
pub struct MirrorPool {
    client: Client,
    instances: Vec<String>,
    order: Arc<dyn MirrorOrder>,
    lookup_timeout: Duration,
    download_timeout: Duration,
}

impl MirrorPool {
    pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);
    pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(client: Client, instances: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            client,
            instances: instances
                .into_iter()
                .map(|i| {
                    let base: String = i.into();
                    base.trim_end_matches('/').to_string()
                })
                .collect(),
            order: Arc::new(RandomOrder),
            lookup_timeout: Self::LOOKUP_TIMEOUT,
            download_timeout: Self::DOWNLOAD_TIMEOUT,
        }
    }

    pub fn with_order(mut self, order: impl MirrorOrder + 'static) -> Self {
        self.order = Arc::new(order);
        self
    }

    pub fn with_timeouts(mut self, lookup: Duration, download: Duration) -> Self {
        self.lookup_timeout = lookup;
        self.download_timeout = download;
        self
    }

    pub fn instances(&self) -> &[String] {
        &self.instances
    }

    /// Instances in the order they should be tried this time
    pub fn ordered(&self) -> Vec<String> {
        let mut mirrors = self.instances.clone();
        self.order.arrange(&mut mirrors);
        mirrors
    }

    /// Tries `attempt` against each mirror in turn and returns the first text it yields.
    pub async fn first_text<F, Fut>(&self, pool_name: &str, mut attempt: F) -> Result<String, SourceError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<String, SourceError>>,
    {
        for mirror in self.ordered() {
            match attempt(mirror.clone()).await {
                Ok(text) if !text.is_empty() => {
                    tracing::info!(%mirror, pool = pool_name, "Mirror returned captions");
                    return Ok(text);
                }
                Ok(_) => tracing::debug!(%mirror, pool = pool_name, "Mirror returned empty captions"),
                Err(e) => tracing::debug!(%mirror, pool = pool_name, error = %e, "Mirror failed"),
            }
        }

        Err(SourceError::Unavailable(format!(
            "none of the {} {pool_name} mirrors served captions",
            self.instances.len()
        )))
    }

    /// GET with the lookup timeout, decoding a JSON body. Non-success statuses fail.
    pub async fn lookup_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let resp = self
            .client
            .get(url)
            .timeout(self.lookup_timeout)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SourceError::Unavailable(format!(
                "{url} returned {}",
                resp.status()
            )));
        }

        Ok(resp.json::<T>().await?)
    }

    /// GET with the download timeout, returning the body as text. Non-success statuses fail.
    pub async fn download_text(&self, url: &str) -> Result<String, SourceError> {
        let resp = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SourceError::Unavailable(format!(
                "{url} returned {}",
                resp.status()
            )));
        }

        Ok(resp.text().await?)
    }
}
