pub mod state;
pub mod store;

use async_trait::async_trait;

use crate::domain::product::{Product, ProductId, ProductPayload};
use crate::errors::RemoteError;

pub use state::{CatalogState, DraftForm};
pub use store::{CatalogStore, DraftSlot, SubmitOutcome, SyncOutcome};

/// Remote collection of products. Implementations own identifier
/// assignment; the store only ever replaces or patches its list from what
/// these calls return.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, RemoteError>;
    async fn create(&self, product: &ProductPayload) -> Result<Product, RemoteError>;
    async fn update(
        &self,
        id: &ProductId,
        product: &ProductPayload,
    ) -> Result<Product, RemoteError>;
    async fn delete(&self, id: &ProductId) -> Result<(), RemoteError>;
}
