pub mod http;
pub mod memory;

use thiserror::Error;

pub use http::HttpCatalogClient;
pub use memory::InMemoryCatalogClient;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL `{url}`: {source}")]
    BaseUrl { url: String, source: url::ParseError },
    #[error("base URL `{0}` cannot carry a collection path")]
    NotABase(String),
    #[error("could not build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}
