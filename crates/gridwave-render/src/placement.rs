// crates/gridwave-render/src/placement.rs
//! Writing computed layouts back into the document.

use gridwave_layout::{GridLayout, Measure};
use tracing::warn;

use crate::{px, GeometryProps, GridHost, RenderError, RenderResult};

/// [`Measure`] implementation that sizes real items before reading them.
///
/// Each call pins the item to `position: absolute` at the column width and
/// clears any inline height left over from a previous `sameHeight` pass, so
/// the reading reflects the item's natural height at its new width.
pub struct DomMeasure<'a, H: GridHost> {
    host: &'a mut H,
    items: &'a [H::Item],
}

impl<'a, H: GridHost> DomMeasure<'a, H> {
    pub fn new(host: &'a mut H, items: &'a [H::Item]) -> Self {
        Self { host, items }
    }
}

impl<H: GridHost> Measure for DomMeasure<'_, H> {
    type Error = RenderError;

    fn measure(&mut self, index: usize, width: f32) -> RenderResult<f32> {
        let Some(item) = self.items.get(index) else {
            warn!(index, "measured index outside the visible item list");
            return Ok(0.0);
        };

        self.host.set_item_style(item, "position", Some("absolute"))?;
        self.host.set_item_style(item, "width", Some(&px(width)))?;
        self.host.set_item_style(item, "height", None)?;

        match self.host.measure_height(item) {
            Some(height) if height.is_finite() => Ok(height.max(0.0)),
            _ => {
                warn!(index, "item height unavailable, treating as 0");
                Ok(0.0)
            }
        }
    }
}

/// Apply `layout` to `items` (pipeline order) and size the container.
pub fn apply_layout<H: GridHost>(host: &mut H, items: &[H::Item], layout: &GridLayout) -> RenderResult<()> {
    for placement in &layout.placements {
        let Some(item) = items.get(placement.index) else {
            continue;
        };

        host.set_item_style(item, "position", Some("absolute"))?;
        host.set_item_style(item, "width", Some(&px(placement.width)))?;
        host.set_item_style(item, "left", Some(&px(placement.position.x)))?;
        host.set_item_style(item, "top", Some(&px(placement.position.y)))?;
        if let Some(height) = placement.forced_height {
            host.set_item_style(item, "height", Some(&px(height)))?;
        }
    }

    host.set_container_style("height", Some(&px(layout.container_height)))
}

/// Remove the engine's inline geometry from `items`.
pub fn clear_geometry<H: GridHost>(host: &mut H, items: &[H::Item], props: GeometryProps) -> RenderResult<()> {
    for item in items {
        for property in props.css_names() {
            host.set_item_style(item, property, None)?;
        }
    }
    Ok(())
}
