use prodcat_core::{CatalogClient, CatalogStore, ProductField, ProductId};

use super::{startup, submit_result, CommandResult, EXIT_UNKNOWN_PRODUCT};

const COMMAND: &str = "edit";

/// Fields left as `None` keep the loaded product's value.
#[derive(Clone, Debug, Default)]
pub struct FieldChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
}

impl FieldChanges {
    fn into_pairs(self) -> impl Iterator<Item = (ProductField, String)> {
        [
            (ProductField::Name, self.name),
            (ProductField::Description, self.description),
            (ProductField::Price, self.price),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
    }
}

pub async fn run<C: CatalogClient>(
    store: &CatalogStore<C>,
    id: &ProductId,
    changes: FieldChanges,
) -> CommandResult {
    if let Err(result) = startup(store, COMMAND).await {
        return result;
    }

    let Some(product) = store.snapshot().await.find(id).cloned() else {
        return CommandResult::failure(
            COMMAND,
            "unknown_product",
            format!("no product with id {id} in the catalog"),
            EXIT_UNKNOWN_PRODUCT,
        );
    };

    store.begin_edit(&product).await;
    for (field, value) in changes.into_pairs() {
        store.set_editing_field(field, value).await;
    }

    let outcome = store.submit_editing_draft().await;
    submit_result(store, COMMAND, outcome).await
}
