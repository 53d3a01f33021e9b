//! Fetching the remote feed
//!
//! A [`Transport`] performs one GET; a [`RetryPolicy`] decides how many
//! times to try and how long to wait in between. Keeping the two apart lets
//! tests drive the retry loop with a fake transport and no real I/O.

use std::thread;
use std::time::Duration;

use crate::constants::catalog;
use crate::error::{CatalogError, Result};

/// A single blocking GET returning the response body
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// Returns [`CatalogError::Network`] or [`CatalogError::Status`].
    fn get(&self, url: &str) -> Result<String>;
}

/// HTTP transport over a `ureq` agent
#[derive(Debug, Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(catalog::USER_AGENT, catalog::FETCH_TIMEOUT)
    }
}

impl HttpTransport {
    /// Create a transport with the given identifying user agent and the
    /// same timeout for connecting and for reading
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(user_agent)
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .build();
        Self { agent }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String> {
        let response = self
            .agent
            .get(url)
            .set("Accept", "application/json")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(status, _) => CatalogError::Status {
                    url: url.to_string(),
                    status,
                },
                ureq::Error::Transport(transport) => CatalogError::network(url, transport),
            })?;

        if response.status() != 200 {
            return Err(CatalogError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }
        response
            .into_string()
            .map_err(|e| CatalogError::network(url, e))
    }
}

/// A transport that never reaches the network
///
/// Lets a catalog run purely from its snapshot, or from sets installed with
/// [`SwatchCatalog::replace`](super::SwatchCatalog::replace).
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineTransport;

impl Transport for OfflineTransport {
    fn get(&self, url: &str) -> Result<String> {
        Err(CatalogError::Network {
            url: url.to_string(),
            message: "offline mode".to_string(),
            source: None,
        })
    }
}

/// Bounded retry with a fixed pause between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; zero behaves like one
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: catalog::RETRY_ATTEMPTS,
            delay: catalog::RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Run `attempt` until it succeeds, fails with a non-recoverable error,
    /// or the attempt budget is spent
    ///
    /// The closure receives the 1-based attempt number. Sleeps between
    /// attempts, never after the last one.
    ///
    /// # Errors
    ///
    /// Returns the error of the final attempt.
    pub fn run<T, F>(&self, mut attempt: F) -> Result<T>
    where
        F: FnMut(u32) -> Result<T>,
    {
        let attempts = self.max_attempts.max(1);
        let mut number = 1;
        loop {
            match attempt(number) {
                Ok(value) => return Ok(value),
                Err(e) if number < attempts && e.is_recoverable() => {
                    log::warn!("Attempt {}/{} failed: {}", number, attempts, e);
                    if !self.delay.is_zero() {
                        thread::sleep(self.delay);
                    }
                    number += 1;
                }
                Err(e) => {
                    log::warn!("Attempt {}/{} failed: {}", number, attempts, e);
                    return Err(e);
                }
            }
        }
    }
}
