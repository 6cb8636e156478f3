//! Placement of new steps relative to the current view.

/// Horizontal/vertical pitch of the generated-journey grid (card + 40px gap).
pub const GRID_COLUMN_SPACING: f64 = 320.0;
pub const GRID_ROW_SPACING: f64 = 200.0;
/// Cards per row, chosen so a generated journey fits in a typical viewport.
pub const GRID_MAX_PER_ROW: usize = 3;

const STAGGER_STEP: f64 = 24.0;
const STAGGER_CYCLE: usize = 8;

/// Top-left corner for a manually added step near the view centre.
///
/// Successive additions are staggered diagonally (within ±100 units of the
/// centre) so that repeated clicks don't stack cards exactly on top of each
/// other.
pub fn new_step_origin(view_center: (f64, f64), existing_steps: usize) -> (f64, f64) {
    let k = (existing_steps % STAGGER_CYCLE) as f64;
    let start = -(STAGGER_STEP * (STAGGER_CYCLE as f64 - 1.0)) / 2.0;
    (
        view_center.0 + start + k * STAGGER_STEP,
        view_center.1 + start + k * STAGGER_STEP,
    )
}

/// Top-left corners for `count` generated steps laid out row-major in a
/// grid of at most three columns, centred on `view_center`.
pub fn grid_origins(count: usize, view_center: (f64, f64)) -> Vec<(f64, f64)> {
    if count == 0 {
        return Vec::new();
    }
    let columns = count.min(GRID_MAX_PER_ROW) as f64;
    let rows = count.div_ceil(GRID_MAX_PER_ROW) as f64;
    let start_x = view_center.0 - (columns * GRID_COLUMN_SPACING) / 2.0;
    let start_y = view_center.1 - (rows * GRID_ROW_SPACING) / 2.0;

    (0..count)
        .map(|i| {
            let row = (i / GRID_MAX_PER_ROW) as f64;
            let col = (i % GRID_MAX_PER_ROW) as f64;
            (
                start_x + col * GRID_COLUMN_SPACING,
                start_y + row * GRID_ROW_SPACING,
            )
        })
        .collect()
}
