pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod validation;

pub use catalog::{
    CatalogClient, CatalogState, CatalogStore, DraftForm, DraftSlot, SubmitOutcome, SyncOutcome,
};
pub use domain::product::{Product, ProductDraft, ProductField, ProductId, ProductPayload};
pub use errors::RemoteError;
pub use validation::{validate, Validation, ValidationErrors};
