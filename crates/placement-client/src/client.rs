use std::time::{Duration, Instant};

use common::{
    AppConfig, Batch, Company, LoginRequest, LoginResponse, NewBatch, Offer, Student,
    StudentInput, User,
};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiError, error_message};

const X_CORRELATION_ID: &str = "x-correlation-id";

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    document_resource: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|err| ApiError::InvalidUrl {
            url: base_url.clone(),
            reason: err.to_string(),
        })?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Build)?;
        Ok(Self {
            http,
            base_url,
            token: None,
            document_resource: "companies".to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        let client = Self::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs.max(1)),
        )?
        .with_document_resource(&config.document_resource);
        Ok(match &config.api_token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        })
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_document_resource(mut self, resource: &str) -> Self {
        let resource = resource.trim_matches('/');
        if !resource.is_empty() {
            self.document_resource = resource.to_string();
        }
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn document_resource(&self) -> &str {
        &self.document_resource
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let req = self.request(Method::POST, "/auth/login", &[], false)?.json(&body);
        self.fetch_json(req, Method::POST, "/auth/login").await
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get_json("/auth/me", &[]).await
    }

    pub async fn list_batches(&self) -> Result<Vec<Batch>, ApiError> {
        self.get_json("/batches", &[]).await
    }

    pub async fn create_batch(&self, batch: &NewBatch) -> Result<Batch, ApiError> {
        self.send_json(Method::POST, "/batches", batch).await
    }

    pub async fn list_students(&self, batch_year: i32) -> Result<Vec<Student>, ApiError> {
        self.get_json("/students", &[("batch_year", batch_year.to_string())])
            .await
    }

    pub async fn create_student(&self, input: &StudentInput) -> Result<Student, ApiError> {
        self.send_json(Method::POST, "/students", input).await
    }

    pub async fn update_student(&self, id: i64, input: &StudentInput) -> Result<Student, ApiError> {
        self.send_json(Method::PUT, &format!("/students/{id}"), input)
            .await
    }

    pub async fn delete_student(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/students/{id}")).await
    }

    pub async fn list_companies(&self, batch_year: Option<i32>) -> Result<Vec<Company>, ApiError> {
        self.get_json("/companies", &batch_query(batch_year)).await
    }

    pub async fn get_company(&self, id: i64) -> Result<Company, ApiError> {
        self.get_json(&format!("/companies/{id}"), &[]).await
    }

    pub async fn create_company(&self, company: &Company) -> Result<Company, ApiError> {
        self.send_json(Method::POST, "/companies", company).await
    }

    pub async fn update_company(&self, id: i64, company: &Company) -> Result<Company, ApiError> {
        self.send_json(Method::PUT, &format!("/companies/{id}"), company)
            .await
    }

    pub async fn delete_company(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/companies/{id}")).await
    }

    pub async fn list_offers(&self, batch_year: Option<i32>) -> Result<Vec<Offer>, ApiError> {
        self.get_json("/offers", &batch_query(batch_year)).await
    }

    pub async fn create_offer(&self, offer: &Offer) -> Result<Offer, ApiError> {
        self.send_json(Method::POST, "/offers", offer).await
    }

    pub async fn delete_offer(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/offers/{id}")).await
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let req = self.request(Method::GET, path, query, true)?;
        self.fetch_json(req, Method::GET, path).await
    }

    pub(crate) async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let req = self.request(method.clone(), path, &[], true)?.json(body);
        self.fetch_json(req, method, path).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let req = self.request(Method::DELETE, path, &[], true)?;
        self.execute(req, Method::DELETE, path).await.map(drop)
    }

    /// Builds a request against the base url. Protected requests need a
    /// token and fail before any I/O without one.
    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        protected: bool,
    ) -> Result<RequestBuilder, ApiError> {
        let token = if protected {
            Some(self.token.as_deref().ok_or(ApiError::Unauthenticated)?)
        } else {
            None
        };
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut url = Url::parse(&raw).map_err(|err| ApiError::InvalidUrl {
            url: raw.clone(),
            reason: err.to_string(),
        })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        let mut req = self
            .http
            .request(method, url)
            .header(X_CORRELATION_ID, Uuid::new_v4().to_string());
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Ok(req)
    }

    pub(crate) async fn execute(
        &self,
        req: RequestBuilder,
        method: Method,
        path: &str,
    ) -> Result<Response, ApiError> {
        let started = Instant::now();
        let (client, request) = req.build_split();
        let request = request.map_err(|source| ApiError::Transport {
            method: method.to_string(),
            path: path.to_string(),
            source,
        })?;
        let correlation_id = request
            .headers()
            .get(X_CORRELATION_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let result = client.execute(request).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let res = match result {
            Ok(res) => res,
            Err(source) => {
                debug!(
                    correlation_id,
                    method = %method,
                    path,
                    elapsed_ms,
                    error = %source,
                    "request_failed"
                );
                return Err(ApiError::Transport {
                    method: method.to_string(),
                    path: path.to_string(),
                    source,
                });
            }
        };

        let status = res.status();
        debug!(
            correlation_id,
            method = %method,
            path,
            status = status.as_u16(),
            elapsed_ms,
            "request_complete"
        );
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().await.unwrap_or_default();
        Err(ApiError::Status {
            method: method.to_string(),
            path: path.to_string(),
            status: status.as_u16(),
            message: error_message(&body, status.canonical_reason()),
        })
    }

    pub(crate) async fn fetch_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        method: Method,
        path: &str,
    ) -> Result<T, ApiError> {
        let res = self.execute(req, method.clone(), path).await?;
        let body = res.text().await.map_err(|source| ApiError::Transport {
            method: method.to_string(),
            path: path.to_string(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

fn batch_query(batch_year: Option<i32>) -> Vec<(&'static str, String)> {
    batch_year
        .map(|year| vec![("batch_year", year.to_string())])
        .unwrap_or_default()
}
