use prodcat_core::{CatalogClient, CatalogStore, ProductDraft};

use super::{startup, submit_result, CommandResult};

const COMMAND: &str = "add";

pub async fn run<C: CatalogClient>(store: &CatalogStore<C>, draft: ProductDraft) -> CommandResult {
    if let Err(result) = startup(store, COMMAND).await {
        return result;
    }

    let outcome = store.submit_new(draft).await;
    submit_result(store, COMMAND, outcome).await
}
