use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::RwLock;
use tracing::debug;

use crate::config::RemoteConfig;
use crate::remote::RemoteError;

/// Equality predicate on a single column, the only filter shape the row API
/// supports.
#[derive(Debug, Clone)]
pub struct Eq {
    pub column: &'static str,
    pub value: String,
}

impl Eq {
    pub fn new(column: &'static str, value: impl ToString) -> Self {
        Self {
            column,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Order {
    pub column: &'static str,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: &'static str) -> Self {
        Self {
            column,
            ascending: true,
        }
    }

    pub fn desc(column: &'static str) -> Self {
        Self {
            column,
            ascending: false,
        }
    }
}

/// Typed client for the platform's three surfaces: row CRUD under `/rest/v1`,
/// identity under `/auth/v1`, server functions under `/functions/v1`.
///
/// Holds the caller's bearer token once signed in; before that, requests go
/// out under the publishable API key alone.
pub struct RemoteClient {
    http: Client,
    base_url: String,
    api_key: String,
    bearer: RwLock<Option<String>>,
}

impl RemoteClient {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            bearer: RwLock::new(None),
        }
    }

    /// Install or clear the signed-in access token. All subsequent row and
    /// function calls are made as that identity.
    pub fn set_bearer(&self, token: Option<String>) {
        *self.bearer.write().expect("bearer lock poisoned") = token;
    }

    fn bearer_token(&self) -> String {
        self.bearer
            .read()
            .expect("bearer lock poisoned")
            .clone()
            .unwrap_or_else(|| self.api_key.clone())
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn apply_filters(query: &mut Vec<(String, String)>, filters: &[Eq]) {
        for f in filters {
            query.push((f.column.to_string(), format!("eq.{}", f.value)));
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(RemoteError::classify(status.as_u16(), message))
    }

    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Eq],
        order: Option<Order>,
    ) -> Result<Vec<T>, RemoteError> {
        let mut query = vec![("select".to_string(), "*".to_string())];
        Self::apply_filters(&mut query, filters);
        if let Some(o) = order {
            let dir = if o.ascending { "asc" } else { "desc" };
            query.push(("order".to_string(), format!("{}.{}", o.column, dir)));
        }

        debug!(table, "select");
        let response = self
            .http
            .get(self.rest_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer_token())
            .query(&query)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        Self::check(response)
            .await?
            .json::<Vec<T>>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    pub async fn insert<B: Serialize + ?Sized>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<(), RemoteError> {
        debug!(table, "insert");
        let response = self
            .http
            .post(self.rest_url(table))
            .header("apikey", &self.api_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(self.bearer_token())
            .json(body)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        Self::check(response).await.map(|_| ())
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        table: &str,
        filters: &[Eq],
        body: &B,
    ) -> Result<(), RemoteError> {
        let mut query = Vec::new();
        Self::apply_filters(&mut query, filters);

        debug!(table, "update");
        let response = self
            .http
            .patch(self.rest_url(table))
            .header("apikey", &self.api_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(self.bearer_token())
            .query(&query)
            .json(body)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        Self::check(response).await.map(|_| ())
    }

    pub async fn delete(&self, table: &str, filters: &[Eq]) -> Result<(), RemoteError> {
        let mut query = Vec::new();
        Self::apply_filters(&mut query, filters);

        debug!(table, "delete");
        let response = self
            .http
            .delete(self.rest_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer_token())
            .query(&query)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        Self::check(response).await.map(|_| ())
    }

    /// Count-only query mode: no rows come back, just the exact total from
    /// the `content-range` header.
    pub async fn count(&self, table: &str, filters: &[Eq]) -> Result<u64, RemoteError> {
        let mut query = vec![("select".to_string(), "id".to_string())];
        Self::apply_filters(&mut query, filters);

        debug!(table, "count");
        let response = self
            .http
            .head(self.rest_url(table))
            .header("apikey", &self.api_key)
            .header("Prefer", "count=exact")
            .bearer_auth(self.bearer_token())
            .query(&query)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let response = Self::check(response).await?;
        let range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| RemoteError::Decode("missing content-range header".into()))?;

        // content-range arrives as "0-24/57" or "*/0"
        range
            .rsplit('/')
            .next()
            .and_then(|total| total.parse::<u64>().ok())
            .ok_or_else(|| RemoteError::Decode(format!("unparseable content-range: {range}")))
    }

    /// Invoke a named server-side function with a JSON body.
    pub async fn invoke<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        function: &str,
        body: &B,
    ) -> Result<T, RemoteError> {
        debug!(function, "invoke");
        let response = self
            .http
            .post(format!("{}/functions/v1/{}", self.base_url, function))
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer_token())
            .json(body)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        Self::check(response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    /// Raw call against the identity surface; the auth client owns the
    /// request/response shapes.
    pub async fn auth_call(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &Value,
    ) -> Result<Value, RemoteError> {
        let response = self
            .http
            .post(format!("{}/auth/v1/{}", self.base_url, path))
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer_token())
            .query(query)
            .json(body)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = response.status();
        let value: Value = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        if !status.is_success() {
            // The identity endpoints put the human-readable reason in
            // error_description or msg depending on the failure.
            let message = value
                .get("error_description")
                .or_else(|| value.get("msg"))
                .or_else(|| value.get("message"))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            return Err(RemoteError::classify(status.as_u16(), message));
        }

        Ok(value)
    }
}
