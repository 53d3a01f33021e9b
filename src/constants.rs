//! Reference values and fixed defaults
//!
//! Colorimetric reference values and the operational defaults for catalog
//! refresh, match caching, and gradient interpolation. The operational values are the defaults of
//! [`EngineConfig`](crate::config::EngineConfig).

/// D65 Standard Illuminant Reference
///
/// CIE Standard Illuminant D65, the white point of sRGB.
pub mod d65 {
    /// D65 white point in CIE XYZ, scaled so that Y = 100
    pub const WHITE_POINT_XYZ: [f64; 3] = [95.047, 100.0, 108.883];
}

/// 25^7, the chroma pivot of the CIEDE2000 G and RC terms
pub const POW25_7: f64 = 6_103_515_625.0;

/// Catalog fetch and snapshot defaults
pub mod catalog {
    use std::time::Duration;

    /// Stand-in feed address on a reserved TLD that never resolves
    ///
    /// Deployments set `CatalogConfig::api_url`; until then remote fetches
    /// fail and the catalog falls back to its snapshot.
    pub const PLACEHOLDER_API_URL: &str = "https://catalog.invalid/v1/blocks.json";

    /// User agent sent with every catalog request
    pub const USER_AGENT: &str = "swatch-gradient/0.1 (catalog-sync)";

    /// Snapshot file name inside the data directory
    pub const SNAPSHOT_FILE: &str = "swatch_catalog.json";

    /// Snapshot document format version
    pub const SNAPSHOT_VERSION: &str = "1.0";

    /// Snapshots older than this trigger a remote refresh
    pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    /// Connect and read timeout per attempt
    pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

    /// Total attempts per fetch, including the first
    pub const RETRY_ATTEMPTS: u32 = 3;

    /// Pause between attempts
    pub const RETRY_DELAY: Duration = Duration::from_secs(2);
}

/// Match cache bounds
pub mod cache {
    use std::time::Duration;

    /// Distinct query colors kept at once
    pub const CAPACITY: usize = 500;

    /// Entries older than this are recomputed
    pub const TTL: Duration = Duration::from_secs(10 * 60);

    /// Similarity ceiling; similarity = max(0, 100 - ΔE)
    pub const MAX_SIMILARITY: f64 = 100.0;
}

/// Gradient interpolation parameters
pub mod gradient {
    /// Added to d² in the inverse-distance weight 1 / (d² + bias)
    pub const WEIGHT_BIAS: f64 = 0.1;

    /// Distances below this count as coincident with a seed
    pub const COINCIDENCE_EPSILON: f64 = 1e-3;

    /// Default minimum seed count for a valid configuration
    pub const MIN_SEEDS: usize = 2;
}
