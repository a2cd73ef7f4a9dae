use async_trait::async_trait;
use tokio::sync::RwLock;

use prodcat_core::{CatalogClient, Product, ProductId, ProductPayload, RemoteError};

/// Process-local collection that assigns sequential numeric identifiers the
/// way a typical REST backend does.
#[derive(Debug)]
pub struct InMemoryCatalogClient {
    inner: RwLock<Collection>,
}

#[derive(Debug)]
struct Collection {
    products: Vec<Product>,
    last_id: i64,
}

impl Default for InMemoryCatalogClient {
    fn default() -> Self {
        Self::with_products(Vec::new())
    }
}

impl InMemoryCatalogClient {
    /// Seeds the collection; new identifiers continue after the largest
    /// numeric id present.
    pub fn with_products(products: Vec<Product>) -> Self {
        let last_id = products
            .iter()
            .filter_map(|product| match product.id {
                ProductId::Numeric(id) => Some(id),
                ProductId::Text(_) => None,
            })
            .max()
            .unwrap_or(0);
        Self { inner: RwLock::new(Collection { products, last_id }) }
    }

    pub async fn stored(&self) -> Vec<Product> {
        self.inner.read().await.products.clone()
    }
}

#[async_trait]
impl CatalogClient for InMemoryCatalogClient {
    async fn list(&self) -> Result<Vec<Product>, RemoteError> {
        Ok(self.inner.read().await.products.clone())
    }

    async fn create(&self, product: &ProductPayload) -> Result<Product, RemoteError> {
        let mut inner = self.inner.write().await;
        let next_id = inner.last_id.checked_add(1).ok_or_else(|| RemoteError::Status {
            status: 507,
            body: "no product identifiers left".to_owned(),
        })?;
        inner.last_id = next_id;
        let created = product.clone().into_product(ProductId::Numeric(next_id));
        inner.products.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: &ProductId,
        product: &ProductPayload,
    ) -> Result<Product, RemoteError> {
        let mut inner = self.inner.write().await;
        let existing = inner
            .products
            .iter_mut()
            .find(|existing| &existing.id == id)
            .ok_or_else(|| RemoteError::NotFound(id.clone()))?;
        *existing = product.clone().into_product(id.clone());
        Ok(existing.clone())
    }

    async fn delete(&self, id: &ProductId) -> Result<(), RemoteError> {
        let mut inner = self.inner.write().await;
        let before = inner.products.len();
        inner.products.retain(|product| &product.id != id);
        if inner.products.len() == before {
            return Err(RemoteError::NotFound(id.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use prodcat_core::{
        CatalogClient, CatalogStore, Product, ProductDraft, ProductId, ProductPayload,
        RemoteError, SubmitOutcome, SyncOutcome,
    };

    use super::InMemoryCatalogClient;

    fn product(id: i64, name: &str) -> Product {
        Product {
            id: ProductId::Numeric(id),
            name: name.to_owned(),
            description: "d".to_owned(),
            price: Decimal::new(10, 0),
        }
    }

    #[tokio::test]
    async fn create_continues_after_highest_seeded_id() {
        let client = InMemoryCatalogClient::with_products(vec![product(4, "A"), product(2, "B")]);

        let created = client
            .create(&ProductPayload {
                name: "C".to_owned(),
                description: "d".to_owned(),
                price: Decimal::new(1, 0),
            })
            .await
            .expect("create");

        assert_eq!(created.id, ProductId::Numeric(5));
        assert_eq!(client.stored().await.len(), 3);
    }

    #[tokio::test]
    async fn create_fails_instead_of_overflowing_identifiers() {
        let client = InMemoryCatalogClient::with_products(vec![product(i64::MAX, "A")]);
        let payload = ProductPayload {
            name: "B".to_owned(),
            description: "d".to_owned(),
            price: Decimal::new(1, 0),
        };

        let created = client.create(&payload).await;

        assert_eq!(
            created,
            Err(RemoteError::Status {
                status: 507,
                body: "no product identifiers left".to_owned()
            })
        );
        assert_eq!(client.stored().await.len(), 1);
    }

    #[tokio::test]
    async fn update_and_delete_reject_unknown_ids() {
        let client = InMemoryCatalogClient::default();
        let payload = ProductPayload {
            name: "A".to_owned(),
            description: "d".to_owned(),
            price: Decimal::new(1, 0),
        };

        let update = client.update(&ProductId::Numeric(1), &payload).await;
        let delete = client.delete(&ProductId::Numeric(1)).await;

        assert_eq!(update, Err(RemoteError::NotFound(ProductId::Numeric(1))));
        assert_eq!(delete, Err(RemoteError::NotFound(ProductId::Numeric(1))));
    }

    #[tokio::test]
    async fn store_and_collection_stay_in_step() {
        let store = CatalogStore::new(InMemoryCatalogClient::with_products(vec![product(1, "A")]));
        assert_eq!(store.load_all().await, SyncOutcome::Applied);

        let created = match store.submit_new(ProductDraft::new("B", "e", "5")).await {
            SubmitOutcome::Saved(created) => created,
            other => panic!("expected saved product, got {other:?}"),
        };
        store.begin_edit(&created).await;
        store.set_editing_field(prodcat_core::ProductField::Name, "B2").await;
        assert!(matches!(store.submit_editing_draft().await, SubmitOutcome::Saved(_)));
        assert_eq!(store.delete_one(&ProductId::Numeric(1)).await, SyncOutcome::Applied);

        assert_eq!(store.products().await, store.client().stored().await);
        assert_eq!(store.products().await[0].name, "B2");
    }
}
