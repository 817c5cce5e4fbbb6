use crate::breakpoints::ColumnGeometry;
use crate::columns::ColumnTracker;

/// Where one item landed in a pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub column: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    /// Measured height, 0 when the measurement was unusable.
    pub height: f32,
}

/// Output of one completed placement pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementPass {
    pub geometry: ColumnGeometry,
    /// One entry per input item, in input order.
    pub placements: Vec<Placement>,
    pub container_height: f32,
    /// Items whose measured height was zero, negative or not finite.
    pub unmeasured: usize,
}

impl PlacementPass {
    pub fn column_heights(&self) -> Vec<f32> {
        let mut heights = vec![self.geometry.gutter; self.geometry.column_count];
        for placement in &self.placements {
            if placement.height > 0.0 {
                heights[placement.column] += placement.height + self.geometry.gutter;
            }
        }
        heights
    }
}

/// Shortest-column-first placement.
///
/// Items are walked once in order. Each item goes to the currently shortest
/// column, is measured at the column width, and that column grows by the
/// measured height plus the gutter before the next item is placed, so the
/// column chosen for item `i + 1` depends on the height of item `i`.
pub struct PlacementEngine {
    columns: ColumnTracker,
    passes: u64,
}

impl PlacementEngine {
    pub fn new() -> Self {
        Self {
            columns: ColumnTracker::new(),
            passes: 0,
        }
    }

    /// Place `items` into `geometry`. `measure` receives each item together
    /// with the width it was assigned and returns its rendered height.
    ///
    /// Returns `None` without measuring anything when the geometry has no
    /// columns (container not measured yet).
    pub fn place<T, F>(&mut self, geometry: &ColumnGeometry, items: &[T], mut measure: F) -> Option<PlacementPass>
    where
        F: FnMut(&T, f32) -> f32,
    {
        if geometry.is_empty() {
            tracing::debug!(width = geometry.container_width, "no columns, skipping placement");
            return None;
        }

        self.columns.reset(geometry.column_count, geometry.gutter);
        let mut placements = Vec::with_capacity(items.len());
        let mut unmeasured = 0;

        for (index, item) in items.iter().enumerate() {
            let Some(column) = self.columns.shortest_column() else {
                break;
            };
            let x = geometry.column_x(column);
            let y = self.columns.height(column).unwrap_or(geometry.gutter);

            let measured = measure(item, geometry.item_width);
            let height = if measured.is_finite() && measured > 0.0 {
                measured
            } else {
                unmeasured += 1;
                tracing::warn!(index, measured, "unusable item height, treating as 0");
                0.0
            };

            if height > 0.0 {
                self.columns.grow(column, height + geometry.gutter);
            }

            tracing::trace!(index, column, x, y, height, "placed item");
            placements.push(Placement {
                column,
                x,
                y,
                width: geometry.item_width,
                height,
            });
        }

        self.passes += 1;
        let container_height = if placements.is_empty() { 0.0 } else { self.columns.max_height() };

        tracing::debug!(
            items = placements.len(),
            columns = geometry.column_count,
            container_height,
            "placement pass complete"
        );

        Some(PlacementPass {
            geometry: *geometry,
            placements,
            container_height,
            unmeasured,
        })
    }

    /// Column state left by the last pass.
    pub fn columns(&self) -> &ColumnTracker {
        &self.columns
    }

    pub fn pass_count(&self) -> u64 {
        self.passes
    }
}

impl Default for PlacementEngine {
    fn default() -> Self {
        Self::new()
    }
}
