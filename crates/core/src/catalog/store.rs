use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::catalog::state::CatalogState;
use crate::catalog::CatalogClient;
use crate::domain::product::{Product, ProductDraft, ProductField, ProductId, ProductPayload};
use crate::errors::RemoteError;
use crate::validation::{validate, ValidationErrors};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftSlot {
    New,
    Editing,
}

impl DraftSlot {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Editing => "editing",
        }
    }
}

/// Result of a submit. Every variant has already been applied to the store's
/// state by the time it is returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved(Product),
    Invalid(ValidationErrors),
    Failed(String),
    /// A submit for the same slot is still waiting on the remote store.
    Busy,
    NoDraft,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    Applied,
    Failed(String),
}

/// Marks a draft slot as submitting for as long as it lives, including when
/// the submitting future is dropped before the remote call resolves.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).ok()?;
        Some(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the product list, both drafts and their error maps, and keeps them
/// consistent with a [`CatalogClient`].
///
/// The state lock is never held across a remote call. Each branch of an
/// operation applies its list, draft and error changes in one critical
/// section.
pub struct CatalogStore<C> {
    client: C,
    state: RwLock<CatalogState>,
    new_in_flight: AtomicBool,
    editing_in_flight: AtomicBool,
}

impl<C: CatalogClient> CatalogStore<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            state: RwLock::new(CatalogState::default()),
            new_in_flight: AtomicBool::new(false),
            editing_in_flight: AtomicBool::new(false),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub async fn snapshot(&self) -> CatalogState {
        self.state.read().await.clone()
    }

    pub async fn products(&self) -> Vec<Product> {
        self.state.read().await.products().to_vec()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error().map(str::to_owned)
    }

    pub fn is_submitting(&self, slot: DraftSlot) -> bool {
        self.in_flight_flag(slot).load(Ordering::Acquire)
    }

    /// Replaces the list wholesale with the remote collection.
    pub async fn load_all(&self) -> SyncOutcome {
        match self.client.list().await {
            Ok(products) => {
                let product_count = products.len();
                let mut state = self.state.write().await;
                state.replace_products(products);
                state.clear_last_error();
                info!(event_name = "catalog.load.completed", product_count, "catalog loaded");
                SyncOutcome::Applied
            }
            Err(error) => {
                self.record_sync_failure("catalog.load.failed", "fetching products", error).await
            }
        }
    }

    pub async fn set_new_field(&self, field: ProductField, value: impl Into<String>) {
        self.state.write().await.new_product_mut().draft.set_field(field, value);
    }

    /// Records `draft` as the new-product draft and submits it.
    pub async fn submit_new(&self, draft: ProductDraft) -> SubmitOutcome {
        let Some(_in_flight) = InFlight::acquire(&self.new_in_flight) else {
            return busy(DraftSlot::New);
        };

        let payload = {
            let mut state = self.state.write().await;
            let form = state.new_product_mut();
            form.draft = draft;
            match checked_payload(&form.draft, &mut form.errors, DraftSlot::New) {
                Ok(payload) => payload,
                Err(outcome) => return outcome,
            }
        };

        match self.client.create(&payload).await {
            Ok(product) => {
                let mut state = self.state.write().await;
                state.append_product(product.clone());
                state.reset_new_product();
                state.clear_last_error();
                info!(
                    event_name = "catalog.create.completed",
                    product_id = %product.id,
                    "product created"
                );
                SubmitOutcome::Saved(product)
            }
            Err(error) => {
                self.record_submit_failure("catalog.create.failed", "adding product", error).await
            }
        }
    }

    /// Submits whatever the new-product draft currently holds.
    pub async fn submit_new_draft(&self) -> SubmitOutcome {
        let draft = self.state.read().await.new_product().draft.clone();
        self.submit_new(draft).await
    }

    pub async fn cancel_new(&self) {
        self.state.write().await.reset_new_product();
    }

    pub async fn delete_one(&self, id: &ProductId) -> SyncOutcome {
        match self.client.delete(id).await {
            Ok(()) => {
                let mut state = self.state.write().await;
                let removed = state.remove_product(id);
                state.clear_last_error();
                info!(
                    event_name = "catalog.delete.completed",
                    product_id = %id,
                    removed,
                    "product deleted"
                );
                SyncOutcome::Applied
            }
            Err(error) => {
                self.record_sync_failure("catalog.delete.failed", "deleting product", error).await
            }
        }
    }

    /// Starts editing a copy of `product`, discarding any other edit in
    /// progress.
    pub async fn begin_edit(&self, product: &Product) {
        self.state.write().await.begin_edit(ProductDraft::from(product));
    }

    /// No-op when nothing is being edited.
    pub async fn set_editing_field(&self, field: ProductField, value: impl Into<String>) {
        if let Some(form) = self.state.write().await.editing_mut() {
            form.draft.set_field(field, value);
        }
    }

    /// Records `draft` as the editing draft for `id` and submits it. `id` wins
    /// over whatever identifier the draft carries.
    pub async fn submit_edit(&self, id: &ProductId, mut draft: ProductDraft) -> SubmitOutcome {
        let Some(_in_flight) = InFlight::acquire(&self.editing_in_flight) else {
            return busy(DraftSlot::Editing);
        };

        draft.id = Some(id.clone());

        let payload = {
            let mut state = self.state.write().await;
            let form = state.record_editing_draft(draft);
            match checked_payload(&form.draft, &mut form.errors, DraftSlot::Editing) {
                Ok(payload) => payload,
                Err(outcome) => return outcome,
            }
        };

        match self.client.update(id, &payload).await {
            Ok(product) => {
                let mut state = self.state.write().await;
                let matched = state.replace_product(id, product.clone());
                // The user may have moved on to another product meanwhile.
                if state.editing_id() == Some(id) {
                    state.clear_editing();
                }
                state.clear_last_error();
                info!(
                    event_name = "catalog.update.completed",
                    product_id = %id,
                    matched,
                    "product updated"
                );
                SubmitOutcome::Saved(product)
            }
            Err(error) => {
                self.record_submit_failure("catalog.update.failed", "updating product", error)
                    .await
            }
        }
    }

    /// Submits whatever the editing draft currently holds.
    pub async fn submit_editing_draft(&self) -> SubmitOutcome {
        let draft = self.state.read().await.editing().map(|form| form.draft.clone());
        match draft {
            Some(draft) => match draft.id.clone() {
                Some(id) => self.submit_edit(&id, draft).await,
                None => SubmitOutcome::NoDraft,
            },
            None => SubmitOutcome::NoDraft,
        }
    }

    pub async fn cancel_edit(&self) {
        self.state.write().await.clear_editing();
    }

    pub async fn dismiss_error(&self) {
        self.state.write().await.clear_last_error();
    }

    fn in_flight_flag(&self, slot: DraftSlot) -> &AtomicBool {
        match slot {
            DraftSlot::New => &self.new_in_flight,
            DraftSlot::Editing => &self.editing_in_flight,
        }
    }

    async fn record_sync_failure(
        &self,
        event_name: &'static str,
        action: &str,
        error: RemoteError,
    ) -> SyncOutcome {
        SyncOutcome::Failed(self.record_failure(event_name, action, error).await)
    }

    async fn record_submit_failure(
        &self,
        event_name: &'static str,
        action: &str,
        error: RemoteError,
    ) -> SubmitOutcome {
        SubmitOutcome::Failed(self.record_failure(event_name, action, error).await)
    }

    async fn record_failure(
        &self,
        event_name: &'static str,
        action: &str,
        error: RemoteError,
    ) -> String {
        let message = format!("Error {action}: {error}");
        warn!(
            event_name,
            error_class = error.error_class(),
            error = %error,
            "remote operation failed"
        );
        self.state.write().await.set_last_error(message.clone());
        message
    }
}

/// Replaces `errors` with the outcome of validating `draft`.
fn checked_payload(
    draft: &ProductDraft,
    errors: &mut ValidationErrors,
    slot: DraftSlot,
) -> Result<ProductPayload, SubmitOutcome> {
    match validate(draft).into_payload() {
        Ok(payload) => {
            *errors = ValidationErrors::default();
            Ok(payload)
        }
        Err(rejected) => {
            info!(
                event_name = "catalog.submit.rejected",
                slot = slot.as_str(),
                error_count = rejected.len(),
                "draft failed validation"
            );
            *errors = rejected.clone();
            Err(SubmitOutcome::Invalid(rejected))
        }
    }
}

fn busy(slot: DraftSlot) -> SubmitOutcome {
    warn!(
        event_name = "catalog.submit.ignored",
        slot = slot.as_str(),
        "submit already in flight for this draft"
    );
    SubmitOutcome::Busy
}
