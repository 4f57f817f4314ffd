//! HTTP client implementation for openHAB REST API communication
//!
//! Speaks the `/rest` API with bearer-token or basic authentication.
//! GET requests retry transport-level failures with a short backoff;
//! writes are issued exactly once and their status mapped to the error
//! taxonomy (400 invalid input, 404 not found, 409 conflict, 5xx remote).

use crate::client::OpenHabClient;
use crate::config::OpenHabConfig;
use crate::error::{OpenHabError, Result};
use crate::models::{ConfigStatusMessage, Firmware, FirmwareStatus, Item, Link, Rule, Thing, ThingStatusInfo};
use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// HTTP client for an openHAB instance
pub struct OpenHabHttpClient {
    /// HTTP client instance
    client: Client,

    /// Base URL of the openHAB instance
    base_url: Url,

    /// Configuration
    config: OpenHabConfig,
}

impl OpenHabHttpClient {
    /// Create a new HTTP client
    pub fn new(config: OpenHabConfig) -> Result<Self> {
        let mut client_builder = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(format!("openhab-mcp-rust/{}", env!("CARGO_PKG_VERSION")));

        if !config.verify_ssl {
            warn!("SSL verification disabled - this is insecure for production use");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        // Token auth wins over basic auth when both are configured
        let auth_header = if let Some(token) = &config.api_token {
            Some(format!("Bearer {token}"))
        } else if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            Some(format!(
                "Basic {}",
                base64::engine::general_purpose::STANDARD.encode(format!("{user}:{pass}"))
            ))
        } else {
            None
        };

        if let Some(auth_header) = auth_header {
            let mut default_headers = reqwest::header::HeaderMap::new();
            let header_value =
                reqwest::header::HeaderValue::from_str(&auth_header).map_err(|e| {
                    OpenHabError::invalid_input(format!("Invalid authorization header: {e}"))
                })?;
            default_headers.insert(reqwest::header::AUTHORIZATION, header_value);
            client_builder = client_builder.default_headers(default_headers);
        }

        let client = client_builder
            .build()
            .map_err(|e| OpenHabError::connection(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.url.clone(),
            client,
            config,
        })
    }

    /// Build URL for a REST API path
    fn build_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| OpenHabError::connection(format!("Invalid URL path {path}: {e}")))
    }

    /// Link resource path with the channel UID percent-encoded as a single
    /// path segment (channel UIDs contain `:` and `#`)
    fn link_path(item_name: &str, channel_uid: &str) -> String {
        format!(
            "rest/links/{}/{}",
            urlencoding::encode(item_name),
            urlencoding::encode(channel_uid)
        )
    }

    /// Map a non-success response to the error taxonomy
    async fn status_error(response: Response) -> OpenHabError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = if body.is_empty() {
            status.to_string()
        } else {
            format!("{status}: {body}")
        };

        match status {
            StatusCode::BAD_REQUEST => OpenHabError::invalid_input(detail),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                OpenHabError::authentication(detail)
            }
            StatusCode::NOT_FOUND => OpenHabError::not_found(detail),
            StatusCode::CONFLICT => OpenHabError::conflict(detail),
            s if s.is_server_error() => OpenHabError::connection(format!("Server error: {detail}")),
            _ => OpenHabError::connection(detail),
        }
    }

    /// Map a transport failure to the error taxonomy
    fn transport_error(e: reqwest::Error) -> OpenHabError {
        if e.is_timeout() {
            OpenHabError::timeout(format!("HTTP request timed out: {e}"))
        } else if e.is_connect() {
            OpenHabError::connection(format!("HTTP request failed: {e}"))
        } else {
            OpenHabError::Http(e)
        }
    }

    /// Execute a GET with retry on transport-level failures
    async fn execute_get(&self, url: Url) -> Result<Response> {
        let mut last_error = None;

        for attempt in 1..=self.config.max_retries.max(1) {
            debug!("GET attempt {attempt} to {url}");

            match self.client.get(url.clone()).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        return Ok(response);
                    }
                    let error = Self::status_error(response).await;
                    if !error.is_retryable() {
                        return Err(error);
                    }
                    last_error = Some(error);
                }
                Err(e) => last_error = Some(Self::transport_error(e)),
            }

            if attempt < self.config.max_retries {
                let delay = Duration::from_millis(100 * u64::from(attempt));
                debug!("Retrying GET in {delay:?}");
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| OpenHabError::connection("GET failed with no response")))
    }

    /// Fetch and deserialize a JSON resource
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.build_url(path)?;
        let response = self.execute_get(url).await?;
        Ok(response.json::<T>().await.map_err(Self::transport_error)?)
    }

    /// Issue a single write request and check its status
    async fn execute_write(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(Self::transport_error)?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::status_error(response).await)
        }
    }

    /// Build a write request for a path
    fn write_request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.build_url(path)?;
        Ok(self.client.request(method, url))
    }
}

#[async_trait]
impl OpenHabClient for OpenHabHttpClient {
    async fn list_items(&self) -> Result<Vec<Item>> {
        self.get_json("rest/items").await
    }

    async fn get_item(&self, name: &str) -> Result<Item> {
        self.get_json(&format!("rest/items/{}", urlencoding::encode(name)))
            .await
    }

    async fn create_item(&self, item: &Item) -> Result<Item> {
        // openHAB creates items with PUT on the item path
        let request = self
            .write_request(Method::PUT, &format!("rest/items/{}", urlencoding::encode(&item.name)))?
            .json(item);
        self.execute_write(request).await?;
        self.get_item(&item.name).await
    }

    async fn update_item(&self, name: &str, item: &Item) -> Result<Item> {
        let request = self
            .write_request(Method::PUT, &format!("rest/items/{}", urlencoding::encode(name)))?
            .json(item);
        self.execute_write(request).await?;
        self.get_item(name).await
    }

    async fn delete_item(&self, name: &str) -> Result<()> {
        let request =
            self.write_request(Method::DELETE, &format!("rest/items/{}", urlencoding::encode(name)))?;
        self.execute_write(request).await?;
        Ok(())
    }

    async fn update_item_state(&self, name: &str, state: &str) -> Result<()> {
        let request = self
            .write_request(Method::POST, &format!("rest/items/{}", urlencoding::encode(name)))?
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(state.to_string());
        self.execute_write(request).await?;
        Ok(())
    }

    async fn list_things(&self) -> Result<Vec<Thing>> {
        self.get_json("rest/things").await
    }

    async fn get_thing(&self, uid: &str) -> Result<Thing> {
        self.get_json(&format!("rest/things/{}", urlencoding::encode(uid)))
            .await
    }

    async fn create_thing(&self, thing: &Thing) -> Result<Thing> {
        let request = self.write_request(Method::POST, "rest/things")?.json(thing);
        self.execute_write(request).await?;
        self.get_thing(&thing.uid).await
    }

    async fn update_thing(&self, uid: &str, thing: &Thing) -> Result<Thing> {
        let request = self
            .write_request(Method::PUT, &format!("rest/things/{}", urlencoding::encode(uid)))?
            .json(thing);
        self.execute_write(request).await?;
        self.get_thing(uid).await
    }

    async fn delete_thing(&self, uid: &str, force: bool) -> Result<()> {
        let mut url = self.build_url(&format!("rest/things/{}", urlencoding::encode(uid)))?;
        if force {
            url.query_pairs_mut().append_pair("force", "true");
        }
        self.execute_write(self.client.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn update_thing_config(
        &self,
        uid: &str,
        configuration: &Map<String, Value>,
    ) -> Result<Thing> {
        let request = self
            .write_request(
                Method::PUT,
                &format!("rest/things/{}/config", urlencoding::encode(uid)),
            )?
            .json(configuration);
        self.execute_write(request).await?;
        self.get_thing(uid).await
    }

    async fn set_thing_enabled(&self, uid: &str, enabled: bool) -> Result<Thing> {
        let request = self
            .write_request(
                Method::PUT,
                &format!("rest/things/{}/enable", urlencoding::encode(uid)),
            )?
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(if enabled { "true" } else { "false" }.to_string());
        self.execute_write(request).await?;
        self.get_thing(uid).await
    }

    async fn get_thing_status(&self, uid: &str) -> Result<ThingStatusInfo> {
        self.get_json(&format!("rest/things/{}/status", urlencoding::encode(uid)))
            .await
    }

    async fn get_thing_config_status(&self, uid: &str) -> Result<Vec<ConfigStatusMessage>> {
        self.get_json(&format!(
            "rest/things/{}/config/status",
            urlencoding::encode(uid)
        ))
        .await
    }

    async fn get_thing_firmware_status(&self, uid: &str) -> Result<Option<FirmwareStatus>> {
        let url = self.build_url(&format!(
            "rest/things/{}/firmware/status",
            urlencoding::encode(uid)
        ))?;
        let response = self.execute_get(url).await?;
        // 204: the binding provides no firmware status for this thing
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Ok(Some(response.json().await.map_err(Self::transport_error)?))
    }

    async fn get_available_firmwares(&self, uid: &str) -> Result<Vec<Firmware>> {
        let url = self.build_url(&format!(
            "rest/things/{}/firmwares",
            urlencoding::encode(uid)
        ))?;
        let response = self.execute_get(url).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        Ok(response.json().await.map_err(Self::transport_error)?)
    }

    async fn list_rules(&self, filter_tag: Option<&str>) -> Result<Vec<Rule>> {
        match filter_tag {
            Some(tag) => {
                let mut url = self.build_url("rest/rules")?;
                url.query_pairs_mut().append_pair("tags", tag);
                let response = self.execute_get(url).await?;
                Ok(response.json().await.map_err(Self::transport_error)?)
            }
            None => self.get_json("rest/rules").await,
        }
    }

    async fn get_rule(&self, uid: &str) -> Result<Rule> {
        self.get_json(&format!("rest/rules/{}", urlencoding::encode(uid)))
            .await
    }

    async fn create_rule(&self, rule: &Rule) -> Result<Rule> {
        let request = self.write_request(Method::POST, "rest/rules")?.json(rule);
        self.execute_write(request).await?;
        self.get_rule(&rule.uid).await
    }

    async fn update_rule(&self, uid: &str, rule: &Rule) -> Result<Rule> {
        let request = self
            .write_request(Method::PUT, &format!("rest/rules/{}", urlencoding::encode(uid)))?
            .json(rule);
        self.execute_write(request).await?;
        self.get_rule(uid).await
    }

    async fn delete_rule(&self, uid: &str) -> Result<()> {
        let request =
            self.write_request(Method::DELETE, &format!("rest/rules/{}", urlencoding::encode(uid)))?;
        self.execute_write(request).await?;
        Ok(())
    }

    async fn run_rule_now(&self, uid: &str) -> Result<()> {
        let request = self.write_request(
            Method::POST,
            &format!("rest/rules/{}/runnow", urlencoding::encode(uid)),
        )?;
        self.execute_write(request).await?;
        Ok(())
    }

    async fn list_links(&self) -> Result<Vec<Link>> {
        self.get_json("rest/links").await
    }

    async fn get_link(&self, item_name: &str, channel_uid: &str) -> Result<Link> {
        self.get_json(&Self::link_path(item_name, channel_uid)).await
    }

    async fn put_link(&self, link: &Link) -> Result<()> {
        let request = self
            .write_request(Method::PUT, &Self::link_path(&link.item_name, &link.channel_uid))?
            .json(link);
        self.execute_write(request).await?;
        Ok(())
    }

    async fn delete_link(&self, item_name: &str, channel_uid: &str) -> Result<()> {
        let request =
            self.write_request(Method::DELETE, &Self::link_path(item_name, channel_uid))?;
        self.execute_write(request).await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        let url = self.build_url("rest/")?;
        match self.client.get(url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => Err(Self::transport_error(e)),
        }
    }
}
