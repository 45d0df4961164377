// crates/gridwave-render/src/animation.rs
//! Visibility state and transition properties.
//!
//! The engine never animates anything itself. It tags items as visible or
//! hidden and publishes timing as container-scoped custom properties; the
//! shared stylesheet turns those into CSS transitions.

use gridwave_core::LayoutSettings;
use tracing::debug;

use crate::{GridHost, RenderResult};

pub const STATUS_ATTRIBUTE: &str = "data-gridwave-status";
pub const ARIA_HIDDEN_ATTRIBUTE: &str = "aria-hidden";
pub const ANIMATIONS_ATTRIBUTE: &str = "data-gridwave-animations";
pub const DURATION_PROPERTY: &str = "--gridwave-transition-duration";
pub const TIMING_PROPERTY: &str = "--gridwave-transition-timing";
pub const STYLESHEET_ID: &str = "gridwave-styles";

pub const STYLESHEET: &str = r#"
[data-gridwave-animations="true"],
[data-gridwave-animations="true"] > [data-gridwave-status] {
    transition: all var(--gridwave-transition-duration, 500ms) var(--gridwave-transition-timing, ease);
}
[data-gridwave-status="hidden"] {
    transform: scale(0);
    opacity: 0;
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Visible => "visible",
            Visibility::Hidden => "hidden",
        }
    }
}

#[derive(Debug, Default)]
pub struct AnimationStateController;

impl AnimationStateController {
    pub fn new() -> Self {
        Self
    }

    /// Install the shared transition stylesheet once per document.
    pub fn install_styles<H: GridHost>(&self, host: &mut H) -> RenderResult<()> {
        if host.install_stylesheet(STYLESHEET_ID, STYLESHEET)? {
            debug!("installed gridwave stylesheet");
        }
        Ok(())
    }

    pub fn mark<H: GridHost>(&self, host: &mut H, item: &H::Item, visibility: Visibility) -> RenderResult<()> {
        host.set_item_attribute(item, STATUS_ATTRIBUTE, Some(visibility.as_str()))?;
        match visibility {
            Visibility::Visible => host.set_item_attribute(item, ARIA_HIDDEN_ATTRIBUTE, None),
            Visibility::Hidden => host.set_item_attribute(item, ARIA_HIDDEN_ATTRIBUTE, Some("true")),
        }
    }

    /// Re-publish transition settings after the resolved configuration changed.
    pub fn publish<H: GridHost>(&self, host: &mut H, settings: &LayoutSettings) -> RenderResult<()> {
        if !settings.transition.is_enabled() {
            host.set_container_attribute(ANIMATIONS_ATTRIBUTE, Some("false"))?;
            host.set_container_style(DURATION_PROPERTY, None)?;
            return host.set_container_style(TIMING_PROPERTY, None);
        }

        host.set_container_attribute(ANIMATIONS_ATTRIBUTE, Some("true"))?;
        host.set_container_style(DURATION_PROPERTY, settings.transition.css_duration().as_deref())?;
        host.set_container_style(TIMING_PROPERTY, settings.transition_method.as_deref())
    }

    /// Remove everything [`mark`](Self::mark) and [`publish`](Self::publish) wrote.
    pub fn clear<H: GridHost>(&self, host: &mut H, items: &[H::Item]) -> RenderResult<()> {
        for item in items {
            host.set_item_attribute(item, STATUS_ATTRIBUTE, None)?;
            host.set_item_attribute(item, ARIA_HIDDEN_ATTRIBUTE, None)?;
        }
        host.set_container_attribute(ANIMATIONS_ATTRIBUTE, None)?;
        host.set_container_style(DURATION_PROPERTY, None)?;
        host.set_container_style(TIMING_PROPERTY, None)
    }
}
