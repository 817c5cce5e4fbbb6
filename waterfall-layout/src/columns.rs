/// Running bottom edge of every column in the grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnTracker {
    heights: Vec<f32>,
}

impl ColumnTracker {
    pub fn new() -> Self {
        Self { heights: Vec::new() }
    }

    /// Start a new pass: `column_count` columns, all at `top_gutter`.
    pub fn reset(&mut self, column_count: usize, top_gutter: f32) {
        self.heights.clear();
        self.heights.resize(column_count, top_gutter);
    }

    /// Index of the shortest column. Ties go to the lowest index.
    pub fn shortest_column(&self) -> Option<usize> {
        let mut heights = self.heights.iter().enumerate();
        let (mut index, mut best) = heights.next().map(|(i, h)| (i, *h))?;
        for (i, height) in heights {
            if *height < best {
                best = *height;
                index = i;
            }
        }
        Some(index)
    }

    /// Grow a column by `amount`. Out-of-range indices and non-positive or NaN
    /// amounts leave the tracker untouched, so heights never decrease.
    pub fn grow(&mut self, index: usize, amount: f32) {
        if !(amount > 0.0) {
            return;
        }
        if let Some(height) = self.heights.get_mut(index) {
            *height += amount;
        }
    }

    pub fn height(&self, index: usize) -> Option<f32> {
        self.heights.get(index).copied()
    }

    /// Height of the tallest column, 0 when there are no columns.
    pub fn max_height(&self) -> f32 {
        self.heights.iter().copied().fold(0.0, f32::max)
    }

    pub fn min_height(&self) -> f32 {
        self.shortest_column()
            .and_then(|index| self.height(index))
            .unwrap_or(0.0)
    }

    pub fn column_count(&self) -> usize {
        self.heights.len()
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }
}
