// crates/gridwave-layout/src/grid.rs
//! Row-aligned grid placement.

use gridwave_core::Gap;
use glam::Vec2;

use crate::{column_left, column_width, GridLayout, Measure, Placement};

/// Lay items out row by row: item `i` lands in row `i / columns`, column
/// `i % columns`. Each row is as tall as its tallest item; with
/// `same_height` every item in the row is forced to that height.
pub fn layout_grid<M: Measure>(
    columns: usize,
    same_height: bool,
    container_width: f32,
    gap: Gap,
    item_count: usize,
    measure: &mut M,
) -> Result<GridLayout, M::Error> {
    let columns = columns.max(1);
    let column_width = column_width(container_width, columns, gap.x);

    let mut row_heights: Vec<f32> = Vec::with_capacity(item_count.div_ceil(columns));
    let mut measured = Vec::with_capacity(item_count);

    for index in 0..item_count {
        let row = index / columns;
        let height = measure.measure(index, column_width)?;

        if row_heights.len() <= row {
            row_heights.push(height);
        } else if row_heights[row] < height {
            row_heights[row] = height;
        }
        measured.push(height);
    }

    let mut row_tops = Vec::with_capacity(row_heights.len());
    let mut top = 0.0;
    for height in &row_heights {
        row_tops.push(top);
        top += height + gap.y;
    }

    let placements = measured
        .into_iter()
        .enumerate()
        .map(|(index, measured_height)| {
            let row = index / columns;
            let column = index % columns;
            Placement {
                index,
                column,
                row,
                position: Vec2::new(column_left(column, column_width, gap.x), row_tops[row]),
                width: column_width,
                measured_height,
                forced_height: same_height.then(|| row_heights[row]),
            }
        })
        .collect();

    let container_height = if row_heights.is_empty() {
        0.0
    } else {
        row_heights.iter().sum::<f32>() + gap.y * (row_heights.len() - 1) as f32
    };

    Ok(GridLayout {
        columns,
        column_width,
        placements,
        container_height,
    })
}
