//! Resource management

use crate::error::ClimateApiError;

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// [crate::resource_manager::ResourceManager] bounds the number of climate store connections open
/// at any one time. Resource management is performed using a Tokio Semaphore.
#[derive(Debug)]
pub struct ResourceManager {
    /// Semaphore for store connections.
    connections: Arc<Semaphore>,
}

impl ResourceManager {
    /// Returns a new ResourceManager object.
    ///
    /// `connection_limit` must be at least one, or every acquisition waits forever.
    pub fn new(connection_limit: usize) -> Self {
        Self {
            connections: Arc::new(Semaphore::new(connection_limit)),
        }
    }

    /// Acquire a store connection resource.
    ///
    /// The permit is owned so that it can move to the thread holding the connection.
    /// The connection must be closed before the returned permit is dropped.
    pub async fn connection(&self) -> Result<OwnedSemaphorePermit, ClimateApiError> {
        Ok(self.connections.clone().acquire_owned().await?)
    }
}
