//! REST client for the POS catalog, tax, vendor and inventory endpoints

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use shared::{AccessoryVariant, Brand, Category, ColorVariant, IntakePayload, ModelVariant, TaxRule, Unit, Vendor};

use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use crate::services::{CatalogService, InventoryService, TaxService, VendorService};

/// POS REST API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

/// Responses come either bare or wrapped in `{ "data": ... }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(data) => data,
        }
    }
}

impl ApiClient {
    /// Create a new ApiClient from configuration
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Self::with_client(client, &config.base_url, config.token.clone())
    }

    /// Create a client around an existing reqwest client (for testing)
    pub fn with_client(client: Client, base_url: &str, token: Option<String>) -> ClientResult<Self> {
        // A trailing slash keeps the last path segment when joining
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| ClientError::Configuration(format!("invalid api.base_url '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "api.base_url '{}' cannot be used as a base URL",
                base_url
            )));
        }
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Build `<base>/<segments...>`, percent-encoding each segment
    fn url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::Configuration("base URL cannot take path segments".into()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str], query: &[(&str, &str)]) -> ClientResult<T> {
        let url = self.url(segments)?;
        tracing::debug!("GET {}", url);
        let response = self.request(Method::GET, url).query(query).send().await?;
        Self::handle_response(response).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> ClientResult<T> {
        let url = self.url(segments)?;
        tracing::debug!("{} {}", method, url);
        let response = self.request(method, url).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::from_status(status, text));
        }

        serde_json::from_str::<Envelope<T>>(&text)
            .map(Envelope::into_inner)
            .map_err(|e| ClientError::InvalidResponse(format!("{} (status {})", e, status)))
    }

    fn inventory_segment(category: Category) -> &'static str {
        match category {
            Category::Mobile => "mobiles",
            Category::Accessory => "accessories",
        }
    }
}

#[async_trait]
impl CatalogService for ApiClient {
    async fn brands(&self) -> ClientResult<Vec<Brand>> {
        self.get(&["brands"], &[]).await
    }

    async fn models(&self, brand: &Brand) -> ClientResult<Vec<ModelVariant>> {
        self.get(&["brands", &brand.id, "models"], &[]).await
    }

    async fn colors(&self, brand: &Brand, model: &ModelVariant) -> ClientResult<Vec<ColorVariant>> {
        let memory = model.memory.as_deref().unwrap_or_default();
        self.get(&["brands", &brand.id, "models", &model.name, "colors"], &[("memory", memory)])
            .await
    }

    async fn accessories(&self, brand: &Brand) -> ClientResult<Vec<AccessoryVariant>> {
        self.get(&["brands", &brand.id, "accessories"], &[]).await
    }
}

#[async_trait]
impl TaxService for ApiClient {
    async fn active_tax_rules(&self) -> ClientResult<Vec<TaxRule>> {
        self.get(&["taxes"], &[("active", "true")]).await
    }
}

#[async_trait]
impl VendorService for ApiClient {
    async fn vendors(&self, owner_id: &str) -> ClientResult<Vec<Vendor>> {
        self.get(&["vendors"], &[("owner", owner_id)]).await
    }
}

#[async_trait]
impl InventoryService for ApiClient {
    async fn create_unit(&self, payload: &IntakePayload) -> ClientResult<Unit> {
        let kind = Self::inventory_segment(payload.category());
        self.send_json(Method::POST, &["inventory", kind], payload).await
    }

    async fn update_unit(&self, unit_id: &str, payload: &IntakePayload) -> ClientResult<Unit> {
        let kind = Self::inventory_segment(payload.category());
        self.send_json(Method::PUT, &["inventory", kind, unit_id], payload)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_client(Client::new(), base, None).unwrap()
    }

    #[test]
    fn test_url_keeps_base_path() {
        let api = client("https://pos.example.com/api/v1/");
        let url = api.url(&["brands", "b1", "models"]).unwrap();
        assert_eq!(url.as_str(), "https://pos.example.com/api/v1/brands/b1/models");
    }

    #[test]
    fn test_url_encodes_model_names() {
        let api = client("https://pos.example.com/api/v1");
        let url = api.url(&["brands", "b1", "models", "iPhone 15 Pro/Max", "colors"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://pos.example.com/api/v1/brands/b1/models/iPhone%2015%20Pro%2FMax/colors"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ApiClient::with_client(Client::new(), "not a url", None).unwrap_err();
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_envelope_accepts_both_shapes() {
        let wrapped: Envelope<Vec<Brand>> = serde_json::from_str(r#"{"data":[{"id":"b1","name":"Apple"}]}"#).unwrap();
        let bare: Envelope<Vec<Brand>> = serde_json::from_str(r#"[{"id":"b1","name":"Apple"}]"#).unwrap();
        assert_eq!(wrapped.into_inner(), bare.into_inner());
    }
}
