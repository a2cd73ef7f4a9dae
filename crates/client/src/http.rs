use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use prodcat_core::config::RemoteConfig;
use prodcat_core::{CatalogClient, Product, ProductId, ProductPayload, RemoteError};

use crate::ClientError;

const COLLECTION: &str = "products";

/// JSON-over-HTTP client for `{base_url}/products`.
#[derive(Clone, Debug)]
pub struct HttpCatalogClient {
    client: Client,
    collection: Url,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let collection = collection_url(base_url)?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self { client, collection })
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, ClientError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn user_agent() -> &'static str {
        concat!("prodcat/", env!("CARGO_PKG_VERSION"))
    }

    pub fn collection_url(&self) -> &Url {
        &self.collection
    }

    fn item_url(&self, id: &ProductId) -> Result<Url, RemoteError> {
        let mut url = self.collection.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::Transport(format!("cannot address product {id}")))?
            .push(&id.to_string());
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::Status { status: status.as_u16(), body })
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn list(&self) -> Result<Vec<Product>, RemoteError> {
        debug!(url = %self.collection, "listing products");
        let response = self.send(self.client.get(self.collection.clone())).await?;
        decode(response).await
    }

    async fn create(&self, product: &ProductPayload) -> Result<Product, RemoteError> {
        debug!(url = %self.collection, "creating product");
        let response = self.send(self.client.post(self.collection.clone()).json(product)).await?;
        decode(response).await
    }

    /// Servers that answer `204 No Content` are taken to have stored the
    /// payload as sent.
    async fn update(
        &self,
        id: &ProductId,
        product: &ProductPayload,
    ) -> Result<Product, RemoteError> {
        let url = self.item_url(id)?;
        debug!(url = %url, product_id = %id, "updating product");
        let response = self.send(self.client.put(url).json(product)).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(product.clone().into_product(id.clone()));
        }

        let bytes = response.bytes().await.map_err(transport)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(product.clone().into_product(id.clone()));
        }
        serde_json::from_slice(&bytes).map_err(|error| RemoteError::Decode(error.to_string()))
    }

    async fn delete(&self, id: &ProductId) -> Result<(), RemoteError> {
        let url = self.item_url(id)?;
        debug!(url = %url, product_id = %id, "deleting product");
        match self.send(self.client.delete(url)).await {
            Ok(_) => Ok(()),
            Err(RemoteError::Status { status: 404, .. }) => Err(RemoteError::NotFound(id.clone())),
            Err(error) => Err(error),
        }
    }
}

fn collection_url(base_url: &str) -> Result<Url, ClientError> {
    let trimmed = base_url.trim();
    let mut base = Url::parse(trimmed)
        .map_err(|source| ClientError::BaseUrl { url: trimmed.to_string(), source })?;
    if base.cannot_be_a_base() {
        return Err(ClientError::NotABase(trimmed.to_string()));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(COLLECTION)
        .map_err(|source| ClientError::BaseUrl { url: trimmed.to_string(), source })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    let bytes = response.bytes().await.map_err(transport)?;
    serde_json::from_slice(&bytes).map_err(|error| RemoteError::Decode(error.to_string()))
}

fn transport(error: reqwest::Error) -> RemoteError {
    RemoteError::Transport(error.to_string())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::MockServer;
    use rust_decimal::Decimal;
    use serde_json::json;

    use prodcat_core::{CatalogClient, Product, ProductId, ProductPayload, RemoteError};

    use super::HttpCatalogClient;
    use crate::ClientError;

    fn client(server: &MockServer) -> HttpCatalogClient {
        HttpCatalogClient::new(&server.url("/api"), Duration::from_secs(5)).expect("client")
    }

    fn payload(name: &str, description: &str, price: i64) -> ProductPayload {
        ProductPayload {
            name: name.to_owned(),
            description: description.to_owned(),
            price: Decimal::new(price, 0),
        }
    }

    #[test]
    fn collection_url_appends_products_segment() -> Result<(), ClientError> {
        let with_slash =
            HttpCatalogClient::new("http://localhost:5108/api/", Duration::from_secs(1))?;
        let without_slash =
            HttpCatalogClient::new("http://localhost:5108/api", Duration::from_secs(1))?;

        assert_eq!(with_slash.collection_url().as_str(), "http://localhost:5108/api/products");
        assert_eq!(with_slash.collection_url(), without_slash.collection_url());
        Ok(())
    }

    #[test]
    fn item_urls_escape_text_identifiers() -> Result<(), ClientError> {
        let client = HttpCatalogClient::new("http://localhost:5108/api", Duration::from_secs(1))?;

        let url = client.item_url(&ProductId::Text("a b/c".to_owned())).expect("item url");

        assert_eq!(url.as_str(), "http://localhost:5108/api/products/a%20b%2Fc");
        Ok(())
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let error = HttpCatalogClient::new("not a url", Duration::from_secs(1))
            .expect_err("invalid url should fail");
        assert!(matches!(error, ClientError::BaseUrl { .. }));
    }

    #[tokio::test]
    async fn list_decodes_products_in_server_order() -> Result<(), RemoteError> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("GET").path("/api/products");
                then.status(200).header("content-type", "application/json").json_body(json!([
                    {"id": 2, "name": "B", "description": "e", "price": 5},
                    {"id": 1, "name": "A", "description": "d", "price": 10.25}
                ]));
            })
            .await;

        let products = client(&server).list().await?;

        mock.assert_async().await;
        let ids: Vec<_> = products.iter().map(|product| product.id.clone()).collect();
        assert_eq!(ids, [ProductId::Numeric(2), ProductId::Numeric(1)]);
        assert_eq!(products[1].price, Decimal::new(1025, 2));
        Ok(())
    }

    #[tokio::test]
    async fn list_accepts_prices_encoded_as_strings() -> Result<(), RemoteError> {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("GET").path("/api/products");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"[{"id": "sku-1", "name": "A", "description": "d", "price": "10.5"}]"#);
            })
            .await;

        let products = client(&server).list().await?;

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, ProductId::Text("sku-1".to_owned()));
        assert_eq!(products[0].price, Decimal::new(105, 1));
        Ok(())
    }

    #[tokio::test]
    async fn create_posts_payload_and_returns_server_product() -> Result<(), RemoteError> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("POST")
                    .path("/api/products")
                    .json_body(json!({"name": "B", "description": "e", "price": 5.0}));
                then.status(201).header("content-type", "application/json").json_body(json!(
                    {"id": 7, "name": "B", "description": "e", "price": 5}
                ));
            })
            .await;

        let created = client(&server).create(&payload("B", "e", 5)).await?;

        mock.assert_async().await;
        assert_eq!(
            created,
            Product {
                id: ProductId::Numeric(7),
                name: "B".to_owned(),
                description: "e".to_owned(),
                price: Decimal::new(5, 0),
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn update_puts_to_item_path() -> Result<(), RemoteError> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("PUT").path("/api/products/7");
                then.status(200).header("content-type", "application/json").json_body(json!(
                    {"id": 7, "name": "B2", "description": "e", "price": 6}
                ));
            })
            .await;

        let updated =
            client(&server).update(&ProductId::Numeric(7), &payload("B2", "e", 6)).await?;

        mock.assert_async().await;
        assert_eq!(updated.name, "B2");
        assert_eq!(updated.id, ProductId::Numeric(7));
        Ok(())
    }

    #[tokio::test]
    async fn update_without_body_echoes_the_payload() -> Result<(), RemoteError> {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("PUT").path("/api/products/3");
                then.status(204);
            })
            .await;

        let updated = client(&server).update(&ProductId::Numeric(3), &payload("C", "f", 9)).await?;

        assert_eq!(updated, payload("C", "f", 9).into_product(ProductId::Numeric(3)));
        Ok(())
    }

    #[tokio::test]
    async fn delete_maps_404_to_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("DELETE").path("/api/products/42");
                then.status(404);
            })
            .await;

        let error = client(&server)
            .delete(&ProductId::Numeric(42))
            .await
            .expect_err("missing product should fail");

        assert_eq!(error, RemoteError::NotFound(ProductId::Numeric(42)));
    }

    #[tokio::test]
    async fn delete_accepts_no_content() -> Result<(), RemoteError> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("DELETE").path("/api/products/1");
                then.status(204);
            })
            .await;

        client(&server).delete(&ProductId::Numeric(1)).await?;

        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn server_errors_carry_status_and_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("GET").path("/api/products");
                then.status(500).body("database offline");
            })
            .await;

        let error = client(&server).list().await.expect_err("500 should fail");

        assert_eq!(
            error,
            RemoteError::Status { status: 500, body: "database offline".to_owned() }
        );
    }

    #[tokio::test]
    async fn malformed_bodies_are_decode_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("GET").path("/api/products");
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let error = client(&server).list().await.expect_err("html should fail to decode");

        assert!(matches!(error, RemoteError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() -> Result<(), ClientError> {
        let client = HttpCatalogClient::new("http://127.0.0.1:9/api", Duration::from_secs(2))?;

        let error = client.list().await.expect_err("closed port should fail");

        assert!(matches!(error, RemoteError::Transport(_)));
        Ok(())
    }
}
