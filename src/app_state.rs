use crate::cli::CommandLineArgs;
use crate::error::ClimateApiError;
use crate::resource_manager::ResourceManager;
use crate::store::Store;

use std::sync::Arc;
use std::time::Duration;

/// Shared application state passed to each request handler.
pub struct AppState {
    /// Resource manager.
    pub resource_manager: ResourceManager,

    /// Climate store.
    pub store: Store,
}

impl AppState {
    /// Create and return an [AppState].
    ///
    /// Fails if the climate store cannot be opened or does not match the declared schema.
    pub fn new(args: &CommandLineArgs) -> Result<Self, ClimateApiError> {
        let connection_limit = args.connection_limit.unwrap_or_else(num_cpus::get);
        let resource_manager = ResourceManager::new(connection_limit);
        let store = Store::new(
            &args.database,
            Duration::from_millis(args.busy_timeout_ms),
        )?;
        store.verify_schema()?;

        Ok(Self {
            resource_manager,
            store,
        })
    }
}

/// AppState wrapped in an Atomic Reference Count (Arc) to allow multiple references.
pub type SharedAppState = Arc<AppState>;
