mod traits;
mod http;

pub use traits::CatalogClient;
pub use http::HttpCatalogClient;

use crate::config::CatalogConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create a catalog client from configuration
pub fn create_client(config: &CatalogConfig) -> Result<Arc<dyn CatalogClient>> {
    let client = HttpCatalogClient::new(config.endpoint.clone(), config.timeout_secs)?;

    Ok(Arc::new(client))
}
