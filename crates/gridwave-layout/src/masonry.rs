// crates/gridwave-layout/src/masonry.rs
//! Column-packed (masonry) placement.
//!
//! All masonry items share one width, so heights are measured once up front
//! and column assignment works on plain numbers.

use gridwave_core::{Gap, MasonryPacking};
use glam::Vec2;

use crate::{column_left, column_width, GridLayout, Measure, Placement};

/// Partition `item_count` items over `columns` buckets by `index mod columns`,
/// keeping pipeline order within each bucket.
pub fn round_robin_buckets(item_count: usize, columns: usize) -> Vec<Vec<usize>> {
    let columns = columns.max(1);
    let mut buckets = vec![Vec::with_capacity(item_count / columns + 1); columns];
    for index in 0..item_count {
        buckets[index % columns].push(index);
    }
    buckets
}

/// Column for every item, in pipeline order.
pub fn assign_columns(packing: MasonryPacking, heights: &[f32], columns: usize, gap_y: f32) -> Vec<usize> {
    let columns = columns.max(1);
    match packing {
        MasonryPacking::RoundRobin => {
            let mut assignment = vec![0; heights.len()];
            for (column, bucket) in round_robin_buckets(heights.len(), columns).into_iter().enumerate() {
                for index in bucket {
                    assignment[index] = column;
                }
            }
            assignment
        }
        MasonryPacking::Balanced => {
            let mut totals = vec![0.0_f32; columns];
            heights
                .iter()
                .map(|height| {
                    let column = shortest_column(&totals);
                    totals[column] += height + gap_y;
                    column
                })
                .collect()
        }
    }
}

/// Index of the column with the smallest total; ties go to the leftmost.
fn shortest_column(totals: &[f32]) -> usize {
    let mut shortest = 0;
    for (column, total) in totals.iter().enumerate().skip(1) {
        if *total < totals[shortest] {
            shortest = column;
        }
    }
    shortest
}

/// Stack items into columns. An item's top is its column's running total
/// before it; afterwards the column grows by the item height plus `gap.y`.
/// The container is as tall as the largest running total.
pub fn layout_masonry<M: Measure>(
    columns: usize,
    packing: MasonryPacking,
    container_width: f32,
    gap: Gap,
    item_count: usize,
    measure: &mut M,
) -> Result<GridLayout, M::Error> {
    let columns = columns.max(1);
    let column_width = column_width(container_width, columns, gap.x);

    let heights = (0..item_count)
        .map(|index| measure.measure(index, column_width))
        .collect::<Result<Vec<f32>, M::Error>>()?;

    let assignment = assign_columns(packing, &heights, columns, gap.y);

    let mut totals = vec![0.0_f32; columns];
    let mut ordinals = vec![0_usize; columns];
    let placements = heights
        .iter()
        .zip(&assignment)
        .enumerate()
        .map(|(index, (&height, &column))| {
            let top = totals[column];
            totals[column] += height + gap.y;
            let row = ordinals[column];
            ordinals[column] += 1;

            Placement {
                index,
                column,
                row,
                position: Vec2::new(column_left(column, column_width, gap.x), top),
                width: column_width,
                measured_height: height,
                forced_height: None,
            }
        })
        .collect();

    let container_height = totals.iter().copied().fold(0.0, f32::max);

    Ok(GridLayout {
        columns,
        column_width,
        placements,
        container_height,
    })
}
