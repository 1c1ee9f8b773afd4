//! Error types for Glyph Blaster

use thiserror::Error;

/// Errors surfaced by the simulation and its hosts
#[derive(Debug, Error)]
pub enum SimError {
    /// No canvas to paint on; the background does not start
    #[error("Rendering surface not found: {0}")]
    MissingSurface(String),

    #[error("Rendering context unavailable: {0}")]
    ContextUnavailable(String),

    /// Destructible target query failed (treated as zero targets)
    #[error("Target query failed: {0}")]
    TargetQuery(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias for Glyph Blaster operations
pub type Result<T> = std::result::Result<T, SimError>;
