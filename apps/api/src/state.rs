use assetlens_application::{HealthEventService, InventoryService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub inventory_service: InventoryService,
    pub health_event_service: HealthEventService,
}
