use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::item::{GridItem, ItemId};

/// Reports the current inner width of the grid container. `None` means the
/// container has not been laid out yet.
pub trait ContainerProbe: Send {
    fn container_width(&self) -> Option<f32>;
}

impl<F> ContainerProbe for F
where
    F: Fn() -> Option<f32> + Send,
{
    fn container_width(&self) -> Option<f32> {
        self()
    }
}

/// Reports the rendered height of an item laid out at `width`.
pub trait ItemProbe: Send {
    fn measure_height(&mut self, item: &GridItem, width: f32) -> f32;
}

impl<F> ItemProbe for F
where
    F: FnMut(&GridItem, f32) -> f32 + Send,
{
    fn measure_height(&mut self, item: &GridItem, width: f32) -> f32 {
        self(item, width)
    }
}

/// Container width shared between the host and the engine.
#[derive(Debug, Clone, Default)]
pub struct SharedWidth {
    width: Arc<RwLock<Option<f32>>>,
}

impl SharedWidth {
    pub fn new(width: Option<f32>) -> Self {
        Self {
            width: Arc::new(RwLock::new(width)),
        }
    }

    pub fn set(&self, width: f32) {
        self.store(Some(width));
    }

    pub fn clear(&self) {
        self.store(None);
    }

    fn store(&self, width: Option<f32>) {
        let mut current = self.width.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = width;
    }
}

impl ContainerProbe for SharedWidth {
    fn container_width(&self) -> Option<f32> {
        match self.width.read() {
            Ok(width) => *width,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Heights known ahead of time, independent of width. Unknown ids measure as 0.
#[derive(Debug, Clone, Default)]
pub struct FixedHeights {
    heights: HashMap<ItemId, f32>,
}

impl FixedHeights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: ItemId, height: f32) -> Self {
        self.heights.insert(id, height);
        self
    }

    pub fn set(&mut self, id: ItemId, height: f32) {
        self.heights.insert(id, height);
    }
}

impl FromIterator<(ItemId, f32)> for FixedHeights {
    fn from_iter<I: IntoIterator<Item = (ItemId, f32)>>(iter: I) -> Self {
        Self {
            heights: iter.into_iter().collect(),
        }
    }
}

impl ItemProbe for FixedHeights {
    fn measure_height(&mut self, item: &GridItem, _width: f32) -> f32 {
        self.heights.get(&item.id).copied().unwrap_or(0.0)
    }
}
