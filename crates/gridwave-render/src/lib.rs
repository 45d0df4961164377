// crates/gridwave-render/src/lib.rs

use std::time::Duration;

pub mod animation;
pub mod geometry;
pub mod headless;
pub mod placement;
pub mod selector;

pub use animation::*;
pub use geometry::*;
pub use headless::{HeadlessDocument, HeadlessNode, NodeId, Scene};
pub use placement::*;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Container element not found: {0}")]
    ContainerNotFound(String),
    #[error("Failed to write {target}: {reason}")]
    DomWrite { target: String, reason: String },
    #[error("Invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("Timer operation failed: {0}")]
    Timer(String),
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// The document a grid lives in: one container element, the items under it,
/// and the viewport around it.
///
/// Everything the engine reads from or writes to the page goes through this
/// trait. Writes take `None` to remove a style property or attribute.
pub trait GridHost {
    /// Handle to one tracked item.
    type Item: Clone;

    fn viewport_width(&self) -> f32;

    fn container_width(&self) -> f32;

    /// Whether the container's computed `position` is anything but `static`.
    fn container_is_positioned(&self) -> bool;

    /// Live item list: matches of `selector` under the container, or the
    /// container's children when `selector` is `None`.
    fn query_items(&self, selector: Option<&str>) -> Vec<Self::Item>;

    fn matches_selector(&self, item: &Self::Item, selector: &str) -> bool;

    /// Rendered height of `item`, or `None` when it cannot be measured.
    fn measure_height(&self, item: &Self::Item) -> Option<f32>;

    fn set_item_style(&mut self, item: &Self::Item, property: &str, value: Option<&str>) -> RenderResult<()>;

    fn set_item_attribute(&mut self, item: &Self::Item, name: &str, value: Option<&str>) -> RenderResult<()>;

    fn set_container_style(&mut self, property: &str, value: Option<&str>) -> RenderResult<()>;

    fn set_container_attribute(&mut self, name: &str, value: Option<&str>) -> RenderResult<()>;

    /// Add a document-wide stylesheet under `id` unless one is already
    /// present. Returns `true` if it was added by this call.
    fn install_stylesheet(&mut self, id: &str, css: &str) -> RenderResult<bool>;

    fn listen_resize(&mut self) -> RenderResult<()>;

    fn unlisten_resize(&mut self);
}

/// Identifies one scheduled single-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(pub u64);

/// Single-shot timers. When a timer elapses the host hands its token back to
/// the orchestrator.
pub trait TimerHost {
    fn set_timeout(&mut self, token: TimerToken, delay: Duration) -> RenderResult<()>;

    fn clear_timeout(&mut self, token: TimerToken);
}

/// Format a pixel length for an inline style.
pub fn px(value: f32) -> String {
    format!("{}px", value)
}
