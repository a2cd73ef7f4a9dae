use serde::Serialize;

use crate::domain::product::{Product, ProductDraft, ProductId};
use crate::validation::ValidationErrors;

/// A draft together with the messages from its most recent submit attempt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DraftForm {
    pub draft: ProductDraft,
    pub errors: ValidationErrors,
}

impl DraftForm {
    fn editing(draft: ProductDraft) -> Self {
        Self { draft, errors: ValidationErrors::default() }
    }
}

/// Everything a presentation layer renders. Only [`crate::catalog::CatalogStore`]
/// mutates it; callers receive clones.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CatalogState {
    products: Vec<Product>,
    new_product: DraftForm,
    editing: Option<DraftForm>,
    last_error: Option<String>,
}

impl CatalogState {
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    pub fn new_product(&self) -> &DraftForm {
        &self.new_product
    }

    pub fn editing(&self) -> Option<&DraftForm> {
        self.editing.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub(crate) fn replace_products(&mut self, products: Vec<Product>) {
        self.products = products;
    }

    pub(crate) fn append_product(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Swaps the entry with a matching identifier for `product`. Returns
    /// whether an entry matched; other entries are untouched.
    pub(crate) fn replace_product(&mut self, id: &ProductId, product: Product) -> bool {
        match self.products.iter_mut().find(|existing| &existing.id == id) {
            Some(existing) => {
                *existing = product;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove_product(&mut self, id: &ProductId) -> bool {
        let before = self.products.len();
        self.products.retain(|product| &product.id != id);
        self.products.len() != before
    }

    pub(crate) fn new_product_mut(&mut self) -> &mut DraftForm {
        &mut self.new_product
    }

    pub(crate) fn reset_new_product(&mut self) {
        self.new_product = DraftForm::default();
    }

    pub(crate) fn begin_edit(&mut self, draft: ProductDraft) {
        self.editing = Some(DraftForm::editing(draft));
    }

    pub(crate) fn editing_mut(&mut self) -> Option<&mut DraftForm> {
        self.editing.as_mut()
    }

    /// Records the draft being submitted, keeping any messages from the
    /// previous attempt until validation replaces them.
    pub(crate) fn record_editing_draft(&mut self, draft: ProductDraft) -> &mut DraftForm {
        let form = self.editing.get_or_insert_with(DraftForm::default);
        form.draft = draft;
        form
    }

    pub(crate) fn clear_editing(&mut self) {
        self.editing = None;
    }

    pub(crate) fn editing_id(&self) -> Option<&ProductId> {
        self.editing.as_ref().and_then(|form| form.draft.id.as_ref())
    }

    pub(crate) fn set_last_error(&mut self, message: String) {
        self.last_error = Some(message);
    }

    pub(crate) fn clear_last_error(&mut self) {
        self.last_error = None;
    }
}
