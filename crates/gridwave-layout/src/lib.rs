// crates/gridwave-layout/src/lib.rs

use gridwave_core::{Columns, ConfigScope, Gap, GridError, LayoutSettings, MasonryPacking};
use glam::Vec2;
use tracing::debug;

pub mod columns;
pub mod grid;
pub mod masonry;

pub use columns::*;

/// Measures items during a layout pass.
///
/// `measure` is called once per visible item, in pipeline order, with the
/// width the item is about to receive. Implementations apply that width,
/// clear any previously forced height and report the rendered height.
pub trait Measure {
    type Error;

    fn measure(&mut self, index: usize, width: f32) -> Result<f32, Self::Error>;
}

/// Fixed heights, indexed by pipeline position. Mostly useful in tests and
/// headless previews where item height does not depend on width.
#[derive(Debug, Clone, Default)]
pub struct FixedHeights(pub Vec<f32>);

impl Measure for FixedHeights {
    type Error = std::convert::Infallible;

    fn measure(&mut self, index: usize, _width: f32) -> Result<f32, Self::Error> {
        Ok(self.0.get(index).copied().unwrap_or(0.0))
    }
}

/// Geometry assigned to one visible item.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Position of the item in pipeline order.
    pub index: usize,
    pub column: usize,
    /// Grid row, or the item's ordinal within its masonry column.
    pub row: usize,
    /// `(left, top)` relative to the container.
    pub position: Vec2,
    pub width: f32,
    /// Height as measured during the pass.
    pub measured_height: f32,
    /// Height forced onto the item (`sameHeight`), if any.
    pub forced_height: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub columns: usize,
    pub column_width: f32,
    pub placements: Vec<Placement>,
    pub container_height: f32,
}

/// How many columns a layout uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnPlan {
    Fixed(usize),
    Dynamic { min_width: f32 },
}

impl ColumnPlan {
    pub fn column_count(&self, container_width: f32, gap_x: f32) -> usize {
        match *self {
            ColumnPlan::Fixed(columns) => columns,
            ColumnPlan::Dynamic { min_width } => {
                dynamic_column_count(container_width, min_width, gap_x)
            }
        }
    }
}

/// Layout strategy selected once per resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutStrategy {
    Grid { plan: ColumnPlan, same_height: bool },
    Masonry { plan: ColumnPlan, packing: MasonryPacking },
    /// Rendering is delegated to the named renderer; nothing is placed.
    Custom { renderer: String },
}

impl LayoutStrategy {
    pub fn from_settings(settings: &LayoutSettings, scope: ConfigScope) -> Result<Self, GridError> {
        if let Some(renderer) = &settings.renderer {
            return Ok(LayoutStrategy::Custom {
                renderer: renderer.clone(),
            });
        }

        let plan = match settings.columns {
            Some(Columns::Fixed(0)) => {
                return Err(GridError::InvalidColumnCount { scope, count: 0 })
            }
            Some(Columns::Fixed(columns)) => ColumnPlan::Fixed(columns as usize),
            Some(Columns::Dynamic) => match settings.column_min_width {
                Some(min_width) if min_width > 0.0 => ColumnPlan::Dynamic { min_width },
                _ => return Err(GridError::MissingColumnMinWidth { scope }),
            },
            None => return Err(GridError::NoColumnStrategy { scope }),
        };

        Ok(if settings.masonry {
            LayoutStrategy::Masonry {
                plan,
                packing: settings.masonry_packing,
            }
        } else {
            LayoutStrategy::Grid {
                plan,
                same_height: settings.same_height,
            }
        })
    }

    /// Place `item_count` items inside a container of `container_width`.
    ///
    /// Returns `Ok(None)` for [`LayoutStrategy::Custom`].
    pub fn compute<M: Measure>(
        &self,
        container_width: f32,
        gap: Gap,
        item_count: usize,
        measure: &mut M,
    ) -> Result<Option<GridLayout>, M::Error> {
        let layout = match self {
            LayoutStrategy::Grid { plan, same_height } => {
                let columns = plan.column_count(container_width, gap.x);
                grid::layout_grid(columns, *same_height, container_width, gap, item_count, measure)?
            }
            LayoutStrategy::Masonry { plan, packing } => {
                let columns = plan.column_count(container_width, gap.x);
                masonry::layout_masonry(columns, *packing, container_width, gap, item_count, measure)?
            }
            LayoutStrategy::Custom { .. } => return Ok(None),
        };

        debug!(
            columns = layout.columns,
            column_width = layout.column_width,
            items = layout.placements.len(),
            height = layout.container_height,
            "computed grid layout"
        );

        Ok(Some(layout))
    }
}
