// crates/gridwave-core/src/lib.rs
pub mod config;
pub mod generation;

pub use config::*;
pub use generation::*;

#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("Malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid column count {count} in {scope} configuration (must be at least 1)")]
    InvalidColumnCount { scope: ConfigScope, count: i64 },

    #[error("{scope} configuration uses dynamic columns but has no positive columnMinWidth")]
    MissingColumnMinWidth { scope: ConfigScope },

    #[error("Invalid gap ({x}, {y}) in {scope} configuration (must be non-negative)")]
    InvalidGap { scope: ConfigScope, x: f32, y: f32 },

    #[error("No render method found in {scope} configuration: set `columns` or `renderer`")]
    NoColumnStrategy { scope: ConfigScope },

    #[error("Renderer not registered: {0}")]
    UnknownRenderer(String),
}

pub type Result<T> = std::result::Result<T, GridError>;
