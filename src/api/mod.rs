//! REST client for the Nutz backend

mod error;

pub use error::{ApiError, ErrorBody};

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};

use crate::config::Config;
use crate::feed::FeedScope;
use crate::models::{
    AuthResponse, ChangePasswordRequest, LoginRequest, Page, Post, PostDraft, RegisterRequest,
    guess_mime,
};

/// Nutz backend client.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url` (e.g. `http://localhost:8080/api`)
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from the configured base URL
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.api_base_url)
    }

    /// Base URL requests are made against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build API URL
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Send a request, attaching the bearer token if given, and turn
    /// non-success statuses into [`ApiError::Status`]
    async fn send(&self, request: RequestBuilder, token: Option<&str>) -> Result<Response, ApiError> {
        let request = match token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<ErrorBody>(&text).ok();
        tracing::debug!("Request failed with {}: {}", status, text);
        Err(ApiError::Status { status, body })
    }

    // ==================== Auth ====================

    /// `POST /auth/login`
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let response = self
            .send(self.client.post(self.api_url("/auth/login")).json(request), None)
            .await?;
        Ok(response.json().await?)
    }

    /// `POST /auth/register`
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let response = self
            .send(
                self.client.post(self.api_url("/auth/register")).json(request),
                None,
            )
            .await?;
        Ok(response.json().await?)
    }

    /// `POST /auth/changepassword`
    pub async fn change_password(
        &self,
        token: Option<&str>,
        request: &ChangePasswordRequest,
    ) -> Result<AuthResponse, ApiError> {
        let response = self
            .send(
                self.client
                    .post(self.api_url("/auth/changepassword"))
                    .json(request),
                token,
            )
            .await?;
        Ok(response.json().await?)
    }

    // ==================== Posts ====================

    /// Fetch one page of a feed
    pub async fn feed(
        &self,
        scope: FeedScope,
        token: Option<&str>,
        page: u32,
        size: u32,
    ) -> Result<Page<Post>, ApiError> {
        let url = self.api_url(&format!("{}?page={page}&size={size}", scope.path()));
        let response = self.send(self.client.get(&url), token).await?;
        Ok(response.json().await?)
    }

    /// `POST /posts`. Returns the created post when the response carries one.
    pub async fn create_post(
        &self,
        token: Option<&str>,
        draft: &PostDraft,
    ) -> Result<Option<Post>, ApiError> {
        let form = multipart(draft).await?;
        let response = self
            .send(self.client.post(self.api_url("/posts")).multipart(form), token)
            .await?;
        Ok(response.json().await.ok())
    }

    /// `PUT /posts/{id}`. Returns the updated post when the response carries one.
    pub async fn update_post(
        &self,
        token: Option<&str>,
        id: i64,
        draft: &PostDraft,
    ) -> Result<Option<Post>, ApiError> {
        let form = multipart(draft).await?;
        let response = self
            .send(
                self.client
                    .put(self.api_url(&format!("/posts/{id}")))
                    .multipart(form),
                token,
            )
            .await?;
        Ok(response.json().await.ok())
    }

    /// `DELETE /posts/{id}`
    pub async fn delete_post(&self, token: Option<&str>, id: i64) -> Result<(), ApiError> {
        self.send(
            self.client.delete(self.api_url(&format!("/posts/{id}"))),
            token,
        )
        .await?;
        Ok(())
    }
}

/// Build the multipart body, reading the attached file if any
async fn multipart(draft: &PostDraft) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for (name, value) in draft.text_fields() {
        form = form.text(name, value);
    }

    if let Some(path) = &draft.media {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Media {
            path: path.clone(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());

        let mut part = Part::bytes(bytes).file_name(file_name);
        if let Some(mime) = guess_mime(path) {
            part = part.mime_str(mime)?;
        }
        form = form.part("media", part);
    }

    Ok(form)
}
