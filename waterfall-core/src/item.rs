use serde::{Deserialize, Serialize};
use waterfall_layout::Placement;

pub type ItemId = u64;

/// An entry in the grid. The engine never looks at content, only at the id
/// (for reveal tracking) and at the height the host measures for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridItem {
    pub id: ItemId,
    /// Caller's position for the item, echoed back in its placement.
    pub order: u32,
}

impl GridItem {
    pub fn new(id: ItemId, order: u32) -> Self {
        Self { id, order }
    }

    /// Items for `ids` with `order` set to their index.
    pub fn sequence<I>(ids: I) -> Vec<GridItem>
    where
        I: IntoIterator<Item = ItemId>,
    {
        ids.into_iter()
            .enumerate()
            .map(|(order, id)| GridItem::new(id, order as u32))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemPlacement {
    pub id: ItemId,
    pub order: u32,
    pub placement: Placement,
}

impl ItemPlacement {
    pub fn column(&self) -> usize {
        self.placement.column
    }

    pub fn x(&self) -> f32 {
        self.placement.x
    }

    pub fn y(&self) -> f32 {
        self.placement.y
    }
}
