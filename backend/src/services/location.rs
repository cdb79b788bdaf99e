//! Storage location service

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{LocationType, StockLocation};
use crate::services::store::LedgerStore;

/// Input for creating a storage location
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLocationInput {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[serde(default)]
    pub location_type: LocationType,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: u32,
}

/// Location service
#[derive(Clone)]
pub struct LocationService {
    store: LedgerStore,
}

impl LocationService {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: CreateLocationInput) -> AppResult<StockLocation> {
        input.validate()?;
        let location = StockLocation::new(
            Uuid::new_v4(),
            input.name.trim().to_string(),
            input.location_type,
            input.capacity,
        );

        let mut ledger = self.store.write().await;
        ledger.add_location(location.clone())?;
        self.store.persist_after_mutation(&ledger).await?;

        tracing::info!(
            "Created location {} ({}) with capacity {}",
            location.name,
            location.id,
            location.capacity
        );
        Ok(location)
    }

    pub async fn get(&self, location_id: Uuid) -> AppResult<StockLocation> {
        let ledger = self.store.read().await;
        ledger
            .location(location_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Location".to_string()))
    }

    /// All locations ordered by name
    pub async fn list(&self) -> AppResult<Vec<StockLocation>> {
        let ledger = self.store.read().await;
        let mut locations: Vec<StockLocation> = ledger.locations().cloned().collect();
        locations.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(locations)
    }
}
