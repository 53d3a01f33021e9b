//! Swatch catalog: remote feed, local snapshot, and indices
//!
//! The catalog owns the authoritative set of known swatches. It refreshes
//! from the remote feed when the local snapshot is missing or stale, falls
//! back to the snapshot when the network is unavailable, and swaps in each
//! new generation atomically.
//!
//! [`SwatchCatalog::load`] performs blocking I/O with multi-second
//! timeouts and sleeps between retries; run it off any thread an
//! interactive caller is waiting on.

pub mod feed;
pub mod registry;
pub mod set;
pub mod snapshot;
pub mod swatch;
pub mod transport;

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

pub use registry::{resolve_material, MaterialKind, MaterialRegistry, StaticRegistry};
pub use set::{CatalogMeta, SwatchSet};
pub use snapshot::{read_snapshot, write_snapshot, SnapshotDocument};
pub use swatch::{Category, Material, Resolution, SwatchEntry};
pub use transport::{HttpTransport, OfflineTransport, RetryPolicy, Transport};

use crate::clock::{Clock, SystemClock};
use crate::config::CatalogConfig;
use crate::constants::catalog::SNAPSHOT_VERSION;
use crate::error::{CatalogError, Result};

/// The loaded swatch catalog
pub struct SwatchCatalog {
    config: CatalogConfig,
    transport: Box<dyn Transport>,
    registry: Arc<dyn MaterialRegistry>,
    clock: Arc<dyn Clock>,
    current: RwLock<Arc<SwatchSet>>,
}

impl SwatchCatalog {
    /// Create an empty catalog; nothing is loaded until [`load`](Self::load)
    pub fn new(
        config: CatalogConfig,
        transport: Box<dyn Transport>,
        registry: Arc<dyn MaterialRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            transport,
            registry,
            clock,
            current: RwLock::new(Arc::new(SwatchSet::empty())),
        }
    }

    /// Create an empty catalog that fetches over HTTP
    pub fn with_http(config: CatalogConfig, registry: Arc<dyn MaterialRegistry>) -> Self {
        if config.uses_placeholder_endpoint() {
            log::warn!(
                "Catalog endpoint is the placeholder {}; set catalog.api_url to fetch a real feed",
                config.api_url
            );
        }
        let transport = HttpTransport::new(&config.user_agent, config.timeout());
        Self::new(config, Box::new(transport), registry, Arc::new(SystemClock))
    }

    /// Create an empty catalog that never touches the network
    pub fn offline(
        config: CatalogConfig,
        registry: Arc<dyn MaterialRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(config, Box::new(OfflineTransport), registry, clock)
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.config.snapshot_path
    }

    /// The current generation; stays valid even if a reload swaps it out
    pub fn current(&self) -> Arc<SwatchSet> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Swap in a new generation
    pub fn replace(&self, set: SwatchSet) {
        let set = Arc::new(set);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = set;
    }

    pub fn len(&self) -> usize {
        self.current().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }

    pub fn usable_count(&self) -> usize {
        self.current().usable_count()
    }

    /// Epoch milliseconds of the fetch behind the current data, zero if empty
    pub fn last_update(&self) -> u64 {
        self.current().meta().last_update
    }

    pub fn version(&self) -> String {
        self.current().meta().version.clone()
    }

    pub fn api_source(&self) -> String {
        self.current().meta().api_source.clone()
    }

    /// Whether the snapshot is missing, unreadable, or older than the
    /// freshness window
    pub fn needs_refresh(&self) -> bool {
        read_snapshot(self.snapshot_path()).map_or(true, |document| !self.is_fresh(&document))
    }

    fn is_fresh(&self, document: &SnapshotDocument) -> bool {
        let age = self.clock.now_millis().saturating_sub(document.last_update);
        u128::from(age) <= self.config.freshness_window().as_millis()
    }

    /// Load the best available data
    ///
    /// A fresh snapshot is used as is. Otherwise the remote feed is fetched
    /// and, on success, persisted; if every attempt fails the existing
    /// snapshot is used even when stale. Returns `false` only when neither
    /// source yields data, in which case the current generation is kept.
    pub fn load(&self) -> bool {
        let local = match read_snapshot(self.snapshot_path()) {
            Ok(document) => Some(document),
            Err(CatalogError::MissingSnapshot { .. }) => None,
            Err(e) => {
                log::warn!("Ignoring unreadable snapshot: {}", e);
                None
            }
        };

        let local = match local {
            Some(document) if self.is_fresh(&document) => {
                let count = self.install_snapshot(document);
                log::info!("Loaded {} swatches from fresh snapshot", count);
                return true;
            }
            other => other,
        };

        match self.fetch_remote() {
            Ok(set) => {
                let count = set.len();
                self.replace(set);
                log::info!("Loaded {} swatches from {}", count, self.config.api_url);
                if let Err(e) = self.persist() {
                    log::warn!("Failed to persist catalog snapshot: {}", e);
                }
                true
            }
            Err(e) => {
                log::warn!("Catalog fetch failed: {}", e);
                match local {
                    Some(document) => {
                        let count = self.install_snapshot(document);
                        log::info!("Using stale snapshot with {} swatches", count);
                        true
                    }
                    None => {
                        log::error!("No catalog data available: fetch failed and no snapshot exists");
                        false
                    }
                }
            }
        }
    }

    fn install_snapshot(&self, document: SnapshotDocument) -> usize {
        let (set, rejected) = document.into_set(self.registry.as_ref());
        if !rejected.is_empty() {
            log::warn!("Skipped {} damaged snapshot records", rejected.len());
        }
        let count = set.len();
        self.replace(set);
        count
    }

    /// Fetch and parse the remote feed without installing it
    ///
    /// # Errors
    ///
    /// Returns the last transport error once retries are exhausted, a
    /// [`CatalogError::Parse`] if the body is not a feed document, or if it
    /// holds no acceptable record at all.
    pub fn fetch_remote(&self) -> Result<SwatchSet> {
        let url = self.config.api_url.as_str();
        let policy = self.config.retry_policy();
        let parsed = policy.run(|attempt| {
            log::debug!("Fetching catalog from {} (attempt {})", url, attempt);
            let body = self.transport.get(url)?;
            feed::parse_feed(&body, self.registry.as_ref())
        })?;

        if parsed.entries.is_empty() {
            return Err(CatalogError::Parse {
                message: format!("feed held no usable records ({} rejected)", parsed.rejected.len()),
                source: None,
            });
        }
        if !parsed.rejected.is_empty() {
            log::warn!("Skipped {} malformed catalog records", parsed.rejected.len());
        }

        let meta = CatalogMeta {
            version: SNAPSHOT_VERSION.to_string(),
            last_update: self.clock.now_millis(),
            api_source: self.config.api_url.clone(),
        };
        Ok(SwatchSet::new(parsed.entries, meta))
    }

    /// Replace the current generation with the snapshot on disk
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingSnapshot`] or
    /// [`CatalogError::Persistence`]; the current data is left untouched.
    pub fn load_from_snapshot(&self) -> Result<usize> {
        let document = read_snapshot(self.snapshot_path())?;
        Ok(self.install_snapshot(document))
    }

    /// Write the current generation to the snapshot file
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Persistence`] on I/O failure.
    pub fn persist(&self) -> Result<()> {
        let document = SnapshotDocument::from_set(&self.current());
        write_snapshot(self.snapshot_path(), &document)
    }
}

impl std::fmt::Debug for SwatchCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwatchCatalog")
            .field("api_url", &self.config.api_url)
            .field("snapshot_path", &self.config.snapshot_path)
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}
