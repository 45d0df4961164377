// crates/gridwave-layout/src/columns.rs

/// Width of one column so that `columns` columns and their gaps exactly
/// fill `container_width`.
pub fn column_width(container_width: f32, columns: usize, gap_x: f32) -> f32 {
    let columns = columns.max(1);
    let usable_width = container_width - gap_x * (columns - 1) as f32;
    usable_width / columns as f32
}

/// Left edge of `column`.
pub fn column_left(column: usize, column_width: f32, gap_x: f32) -> f32 {
    column as f32 * (column_width + gap_x)
}

/// Number of columns that fit when each must be at least `min_width` wide.
///
/// `min_width` is capped at the container width. Containers narrower than
/// two minimum columns plus a gap get a single column.
pub fn dynamic_column_count(container_width: f32, min_width: f32, gap_x: f32) -> usize {
    let min_width = min_width.min(container_width);

    if container_width < min_width * 2.0 + gap_x {
        return 1;
    }

    let extension_width = min_width + gap_x;
    if extension_width <= 0.0 {
        return 1;
    }

    let extra_columns = ((container_width - min_width) / extension_width).floor();
    extra_columns as usize + 1
}
