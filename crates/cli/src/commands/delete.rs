use prodcat_core::{CatalogClient, CatalogStore, ProductId, SyncOutcome};

use super::{startup, CommandResult, EXIT_REMOTE};

const COMMAND: &str = "delete";

pub async fn run<C: CatalogClient>(store: &CatalogStore<C>, id: &ProductId) -> CommandResult {
    if let Err(result) = startup(store, COMMAND).await {
        return result;
    }

    match store.delete_one(id).await {
        SyncOutcome::Applied => CommandResult::success_with_products(
            COMMAND,
            format!("deleted product {id}"),
            store.products().await,
        ),
        SyncOutcome::Failed(message) => {
            CommandResult::failure(COMMAND, "remote_failure", message, EXIT_REMOTE)
        }
    }
}
