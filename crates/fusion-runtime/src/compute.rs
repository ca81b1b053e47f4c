//! Handle to the backend compute service.
//!
//! Only the liveness probe lives here; workflow submission belongs to the
//! feature modules. The handle is optional in the shared context: when the
//! probe fails at startup the app runs degraded and modules decide for
//! themselves what to disable.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, ClientBuilder};
use tracing::debug;

pub struct ComputeClient {
    base_url: String,
    http: Client,
}

impl ComputeClient {
    pub fn new(base_url: &str) -> Self {
        let http = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Probe the backend and return a connected client.
    pub async fn connect(base_url: &str) -> Result<Self> {
        let client = Self::new(base_url);
        client.ping().await?;
        Ok(client)
    }

    /// Liveness check against the backend stats endpoint.
    pub async fn ping(&self) -> Result<()> {
        let url = format!("{}/system_stats", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Compute backend unreachable at {}", self.base_url))?;
        response
            .error_for_status()
            .context("Compute backend returned an error status")?;
        debug!(url = %self.base_url, "Compute backend reachable");
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
