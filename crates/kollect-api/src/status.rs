// Read endpoints
//
// Bulk inventory and per-platform connection status.

use tracing::debug;

use crate::client::KollectClient;
use crate::error::Error;
use crate::models::{InventoryPayload, PlatformStatusResponse};

impl KollectClient {
    /// Fetch the bulk inventory snapshot.
    ///
    /// `GET /api/data`
    ///
    /// The body must be a JSON object; anything else is a deserialization
    /// error. Category values are returned untouched.
    pub async fn fetch_inventory(&self) -> Result<InventoryPayload, Error> {
        debug!("fetching bulk inventory");
        let payload: InventoryPayload = self.get("data").await?;
        debug!(categories = payload.len(), "inventory received");
        Ok(payload)
    }

    /// Fetch one platform's connection status.
    ///
    /// `GET /api/{platform}/status`
    pub async fn platform_status(&self, platform: &str) -> Result<PlatformStatusResponse, Error> {
        debug!(platform, "fetching platform status");
        self.get(&format!("{platform}/status")).await
    }
}
