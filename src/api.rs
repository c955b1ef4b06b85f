use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

use crate::board::OrdersBackend;
use crate::error::{ConsoleError, Result};
use crate::models::{
    CustomersSummary, DashboardSummary, LogoUpload, Order, OrderStatus, RevenueSummary, Settings,
    UserMe, UserUpdate,
};
use crate::models::summary::summary_from_value;
use crate::session::Session;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REVENUE_DAYS: u32 = 8;

/// HTTP client for the catering backend.
///
/// Every request carries the bearer token of the attached [`Session`], if
/// any. Nothing is read from ambient storage.
#[derive(Clone)]
pub struct ConsoleApi {
    api_url: String,
    client: reqwest::Client,
    session: Option<Session>,
}

impl ConsoleApi {
    pub fn new(api_url: &str) -> Self {
        Self::with_timeout(api_url, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(api_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to build HTTP client");
        Self::with_client(api_url, client)
    }

    pub fn with_client(api_url: &str, client: reqwest::Client) -> Self {
        Self {
            api_url: crate::utils::remove_trailing_slash(api_url),
            client,
            session: None,
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn set_session(&mut self, session: Option<Session>) {
        self.session = session;
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.session.as_ref().and_then(|s| s.token.as_deref()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send, map a non-success status to [`ConsoleError::Status`], decode JSON.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        fallback: &str,
    ) -> Result<T> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!("{}: {}", fallback, e);
            ConsoleError::Transport(e)
        })?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!("{}: HTTP {}", fallback, status);
            return Err(ConsoleError::from_body(status.as_u16(), &body, fallback));
        }
        // some endpoints answer 204 or an empty body
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        Ok(serde_json::from_str(body)?)
    }

    /// Raw order records, exactly as the backend sent them.
    pub async fn fetch_orders(&self) -> Result<Vec<Value>> {
        let body: Value = self
            .send_json(self.request(Method::GET, "/orders"), "Failed to fetch orders")
            .await?;
        Ok(order_batch(body))
    }

    /// Fetch and normalize the order list.
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        let raw = self.fetch_orders().await?;
        let orders = crate::normalize::normalize_orders(&raw);
        tracing::info!("loaded {} orders ({} raw records)", orders.len(), raw.len());
        Ok(orders)
    }

    /// `PUT /orders/{id}/status?status=<token>`
    pub async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> Result<Value> {
        let path = format!("/orders/{}/status", urlencoding::encode(order_id));
        let token = status.backend_token();
        let builder = self
            .request(Method::PUT, &path)
            .query(&[("status", token.as_str())]);
        self.send_json(builder, "Failed to update status").await
    }

    pub async fn dashboard_summary(&self, day: Option<&str>) -> Result<DashboardSummary> {
        let mut builder = self.request(Method::GET, "/dashboard/summary");
        if let Some(day) = day {
            builder = builder.query(&[("day", day)]);
        }
        let body = self.send_json(builder, "Failed to fetch dashboard summary").await?;
        Ok(summary_from_value(body))
    }

    pub async fn revenue_summary(&self, days: u32) -> Result<RevenueSummary> {
        let builder = self
            .request(Method::GET, "/revenue/summary")
            .query(&[("days", days)]);
        let body = self.send_json(builder, "Failed to fetch revenue summary").await?;
        Ok(summary_from_value(body))
    }

    pub async fn customers_summary(&self) -> Result<CustomersSummary> {
        let body = self
            .send_json(
                self.request(Method::GET, "/customers/summary"),
                "Failed to fetch customers summary",
            )
            .await?;
        Ok(summary_from_value(body))
    }

    pub async fn settings(&self) -> Result<Settings> {
        self.send_json(self.request(Method::GET, "/settings"), "Failed to fetch settings")
            .await
    }

    /// Send only the fields set in `patch`; returns the stored settings.
    pub async fn update_settings(&self, patch: &Settings) -> Result<Settings> {
        let builder = self.request(Method::PUT, "/settings").json(patch);
        self.send_json(builder, "Failed to update settings").await
    }

    /// Upload a branding logo as multipart field `file`.
    pub async fn upload_logo(&self, path: &Path) -> Result<LogoUpload> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "logo".to_string());
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);
        let builder = self
            .request(Method::POST, "/settings/branding/logo")
            .multipart(form);
        let upload: LogoUpload = self.send_json(builder, "Logo upload failed").await?;
        tracing::info!("uploaded logo: {}", upload.logo_url);
        Ok(upload)
    }

    pub async fn me(&self) -> Result<UserMe> {
        self.send_json(self.request(Method::GET, "/users/me"), "Failed to fetch user")
            .await
    }

    pub async fn update_me(&self, patch: &UserUpdate) -> Result<UserMe> {
        let builder = self.request(Method::PUT, "/users/me").json(patch);
        self.send_json(builder, "Failed to update user").await
    }
}

/// `GET /orders` body → raw records; anything but an array is an empty batch.
pub fn order_batch(body: Value) -> Vec<Value> {
    match body {
        Value::Array(arr) => arr,
        _ => {
            tracing::warn!("GET /orders did not return an array");
            Vec::new()
        }
    }
}

#[async_trait]
impl OrdersBackend for ConsoleApi {
    async fn fetch_orders(&self) -> Result<Vec<Value>> {
        ConsoleApi::fetch_orders(self).await
    }

    async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> Result<()> {
        ConsoleApi::update_order_status(self, order_id, status).await?;
        Ok(())
    }
}
