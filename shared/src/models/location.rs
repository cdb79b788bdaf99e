//! Storage location models

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A place where stock is kept (walk-in fridge, dry store, bar, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockLocation {
    pub id: Uuid,
    pub name: String,
    pub location_type: LocationType,
    /// Maximum number of distinct items the location holds
    pub capacity: u32,
    /// Always `items.len()`
    pub current_occupancy: u32,
    pub items: BTreeSet<Uuid>,
}

impl StockLocation {
    pub fn new(id: Uuid, name: String, location_type: LocationType, capacity: u32) -> Self {
        Self {
            id,
            name,
            location_type,
            capacity,
            current_occupancy: 0,
            items: BTreeSet::new(),
        }
    }

    pub fn contains(&self, item_id: Uuid) -> bool {
        self.items.contains(&item_id)
    }

    pub fn has_room(&self) -> bool {
        self.items.len() < self.capacity as usize
    }

    /// Returns false when the item was already present
    pub fn insert_item(&mut self, item_id: Uuid) -> bool {
        let inserted = self.items.insert(item_id);
        self.sync_occupancy();
        inserted
    }

    /// Returns false when the item was not present
    pub fn remove_item(&mut self, item_id: Uuid) -> bool {
        let removed = self.items.remove(&item_id);
        self.sync_occupancy();
        removed
    }

    fn sync_occupancy(&mut self) {
        self.current_occupancy = self.items.len() as u32;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LocationType {
    Refrigerator,
    Freezer,
    #[default]
    DryStorage,
    Bar,
    Kitchen,
    Other,
}
