//! GridWave: responsive grid, masonry, filter and sort layout.
//!
//! The engine itself lives in the workspace crates; this package adds a
//! headless preview used by the `gridwave` binary.

pub mod report;

pub use report::{run_preview, ItemReport, PreviewOptions, Report};
