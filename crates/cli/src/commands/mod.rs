pub mod add;
pub mod config;
pub mod delete;
pub mod edit;
pub mod list;

use prodcat_core::{
    CatalogClient, CatalogStore, Product, SubmitOutcome, SyncOutcome, ValidationErrors,
};
use serde::Serialize;

use self::config::ConfigEntry;

pub const EXIT_OK: u8 = 0;
pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_VALIDATION: u8 = 3;
pub const EXIT_REMOTE: u8 = 4;
pub const EXIT_UNKNOWN_PRODUCT: u8 = 5;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    products: Option<Vec<Product>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<ValidationErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    settings: Option<Vec<ConfigEntry>>,
}

impl CommandResult {
    pub fn success_with_settings(
        command: &str,
        message: impl Into<String>,
        settings: Vec<ConfigEntry>,
    ) -> Self {
        let mut payload = outcome(command, None, message.into());
        payload.settings = Some(settings);
        Self::render(EXIT_OK, payload)
    }

    pub fn success_with_products(
        command: &str,
        message: impl Into<String>,
        products: Vec<Product>,
    ) -> Self {
        let mut payload = outcome(command, None, message.into());
        payload.products = Some(products);
        Self::render(EXIT_OK, payload)
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::render(exit_code, outcome(command, Some(error_class), message.into()))
    }

    pub fn rejected(command: &str, errors: ValidationErrors) -> Self {
        let mut payload = outcome(command, Some("validation"), "draft failed validation".into());
        payload.errors = Some(errors);
        Self::render(EXIT_VALIDATION, payload)
    }

    fn render(exit_code: u8, payload: CommandOutcome) -> Self {
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn outcome(command: &str, error_class: Option<&str>, message: String) -> CommandOutcome {
    CommandOutcome {
        command: command.to_string(),
        status: if error_class.is_some() { "error" } else { "ok" }.to_string(),
        error_class: error_class.map(str::to_string),
        message,
        products: None,
        errors: None,
        settings: None,
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Initial list load every catalog command starts from.
async fn startup<C: CatalogClient>(
    store: &CatalogStore<C>,
    command: &str,
) -> Result<(), CommandResult> {
    match store.load_all().await {
        SyncOutcome::Applied => Ok(()),
        SyncOutcome::Failed(message) => {
            Err(CommandResult::failure(command, "remote_failure", message, EXIT_REMOTE))
        }
    }
}

async fn submit_result<C: CatalogClient>(
    store: &CatalogStore<C>,
    command: &str,
    outcome: SubmitOutcome,
) -> CommandResult {
    match outcome {
        SubmitOutcome::Saved(product) => CommandResult::success_with_products(
            command,
            format!("saved product {}", product.id),
            store.products().await,
        ),
        SubmitOutcome::Invalid(errors) => CommandResult::rejected(command, errors),
        SubmitOutcome::Failed(message) => {
            CommandResult::failure(command, "remote_failure", message, EXIT_REMOTE)
        }
        SubmitOutcome::Busy => CommandResult::failure(
            command,
            "busy",
            "a submit for this draft is already in flight",
            EXIT_REMOTE,
        ),
        SubmitOutcome::NoDraft => CommandResult::failure(
            command,
            "no_draft",
            "there is no draft to submit",
            EXIT_VALIDATION,
        ),
    }
}
