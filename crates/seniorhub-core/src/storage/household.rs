use tracing::info;

use crate::models::HouseholdStatus;

use super::{StorageKey, StorageService};

#[derive(Clone)]
pub struct HouseholdStorage {
    storage: StorageService,
}

impl HouseholdStorage {
    pub fn new(storage: StorageService) -> Self {
        Self { storage }
    }

    pub fn mark_household_completed(&self) {
        if self
            .storage
            .save(StorageKey::HouseholdStatus, &HouseholdStatus::Completed)
        {
            info!("Household marked as completed");
        }
    }

    /// Stored status, `None` when absent or unreadable
    pub fn load_household_status(&self) -> HouseholdStatus {
        self.storage
            .load(StorageKey::HouseholdStatus)
            .unwrap_or_default()
    }

    pub fn clear_household_status(&self) {
        self.storage.remove(StorageKey::HouseholdStatus);
        info!("Household status cleared");
    }
}
