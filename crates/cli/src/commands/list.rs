use prodcat_core::{CatalogClient, CatalogStore};

use super::{startup, CommandResult};

const COMMAND: &str = "list";

pub async fn run<C: CatalogClient>(store: &CatalogStore<C>) -> CommandResult {
    if let Err(result) = startup(store, COMMAND).await {
        return result;
    }

    let products = store.products().await;
    CommandResult::success_with_products(
        COMMAND,
        format!("{} product(s) loaded", products.len()),
        products,
    )
}
