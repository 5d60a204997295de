//! Client for the TV broadcast variant of Quizduell.
//!
//! The TV API lives on a different host and authenticates with a per-user
//! token (the `tt` field of a TV profile) in an `x-tv-authtoken` header
//! instead of cookies and request signatures. Its response shapes differ per
//! endpoint and are undocumented, so calls return loosely-typed JSON maps.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Method;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::client::Client;
use crate::error::ClientError;

const TV_BASE_URL: &str = "https://quizduell.mobilemassresponse.de";
const CORS_HEADER_TOKEN: &str = "grandc3ntr1xrul3z";

/// A connection to the TV quiz API for one TV profile.
#[derive(Debug)]
pub struct TvClient {
    http: reqwest::Client,
    base_url: String,
    user_id: i64,
    auth_token: String,
}

impl TvClient {
    /// Creates a TV client from a TV user id and auth token (`User.tt`).
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new(user_id: i64, auth_token: impl Into<String>) -> Self {
        Self::with_base_url(TV_BASE_URL, user_id, auth_token)
    }

    /// Creates a TV client against an explicit base URL, for tests.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_base_url(base_url: impl Into<String>, user_id: i64, auth_token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        let http = reqwest::Client::builder()
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self {
            http,
            base_url,
            user_id,
            auth_token: auth_token.into(),
        }
    }

    /// Promotes a logged-in [`Client`] to a TV client, creating the TV
    /// profile on the way when the user does not have one yet.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] when the response carries no usable TV
    /// profile, plus the usual transport and decode errors.
    pub async fn from_client(client: &Client) -> Result<Self, ClientError> {
        let user = client
            .create_tv_user()
            .await?
            .ok_or_else(|| ClientError::auth("server returned no TV user profile"))?;
        let user_id = user
            .id
            .ok_or_else(|| ClientError::auth("TV user profile has no user id"))?;
        let auth_token = user
            .tt
            .ok_or_else(|| ClientError::auth("TV user profile has no auth token"))?;
        Ok(Self::new(user_id, auth_token))
    }

    /// Returns the TV user id this client acts as.
    #[must_use]
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Agrees to the broadcaster's terms for this user.
    pub async fn agree_agbs(&self) -> Result<Map<String, Value>, ClientError> {
        let path = format!("/feousers/agbs/{}/true", self.user_id);
        self.request(&path, Vec::new(), None).await
    }

    /// Current state of the TV quiz for this user.
    pub async fn state(&self) -> Result<Map<String, Value>, ClientError> {
        self.request(&format!("/states/{}", self.user_id), Vec::new(), None)
            .await
    }

    /// This user's ranking.
    pub async fn rankings(&self) -> Result<Map<String, Value>, ClientError> {
        self.request(&format!("/users/myranking/{}", self.user_id), Vec::new(), None)
            .await
    }

    /// This user's TV profile.
    pub async fn my_profile(&self) -> Result<Map<String, Value>, ClientError> {
        self.profile(self.user_id).await
    }

    /// Any user's TV profile.
    pub async fn profile(&self, user_id: i64) -> Result<Map<String, Value>, ClientError> {
        self.request(&format!("/users/profiles/{user_id}"), Vec::new(), None)
            .await
    }

    /// Updates profile fields from the given key/value pairs.
    pub async fn post_profile(
        &self,
        profile: Vec<(String, String)>,
    ) -> Result<Map<String, Value>, ClientError> {
        self.request(&format!("/users/profiles/{}", self.user_id), profile, None)
            .await
    }

    /// Sets nickname and, when non-empty, the avatar code.
    pub async fn set_avatar_and_nickname(
        &self,
        nick: &str,
        avatar_code: Option<&str>,
    ) -> Result<Map<String, Value>, ClientError> {
        let mut params = Vec::new();
        if let Some(avatar_code) = avatar_code {
            params.push(("AvatarString".to_string(), avatar_code.to_string()));
        }
        params.push(("Nick".to_string(), nick.to_string()));
        self.request(&format!("/users/{}/avatarandnick", self.user_id), params, None)
            .await
    }

    /// Selects a quiz category.
    pub async fn select_category(
        &self,
        category_id: i64,
    ) -> Result<Map<String, Value>, ClientError> {
        self.request(
            &format!("/users/{}/category{category_id}", self.user_id),
            Vec::new(),
            None,
        )
        .await
    }

    /// Answers a question.
    pub async fn send_answer(
        &self,
        question_id: i64,
        answer_id: i64,
    ) -> Result<Map<String, Value>, ClientError> {
        self.request(
            &format!("/users/{}/response{question_id}/{answer_id}", self.user_id),
            Vec::new(),
            None,
        )
        .await
    }

    /// Uploads a JPEG profile image, sent base64-encoded in an `img` form
    /// field.
    pub async fn upload_profile_image(
        &self,
        image: &[u8],
    ) -> Result<Map<String, Value>, ClientError> {
        let params = vec![("img".to_string(), BASE64.encode(image))];
        self.request(&format!("/users/base64/{}/jpg", self.user_id), params, None)
            .await
    }

    /// Deletes this user's TV profile.
    pub async fn delete_user(&self) -> Result<Map<String, Value>, ClientError> {
        self.request(
            &format!("/users/profiles/{}", self.user_id),
            Vec::new(),
            Some(Method::DELETE),
        )
        .await
    }

    #[instrument(level = "debug", skip(self, params), fields(path = %path))]
    async fn request(
        &self,
        path: &str,
        params: Vec<(String, String)>,
        method: Option<Method>,
    ) -> Result<Map<String, Value>, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let method = method.unwrap_or(if params.is_empty() {
            Method::GET
        } else {
            Method::POST
        });

        let mut builder = self.http.request(method, &url);
        if !params.is_empty() {
            builder = builder.form(&params);
        }
        let response = builder
            .header("x-app-request", CORS_HEADER_TOKEN)
            .header("x-tv-authtoken", &self.auth_token)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded; charset=utf-8",
            )
            .send()
            .await
            .map_err(|error| ClientError::network(path, error))?;

        let body = response
            .text()
            .await
            .map_err(|error| ClientError::network(path, error))?;
        debug!(path, bytes = body.len(), "TV response received");

        serde_json::from_str(&body).map_err(|error| ClientError::decode(path, body, error))
    }
}
