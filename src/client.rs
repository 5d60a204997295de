//! Quizduell API client.
//!
//! One [`Client`] wraps one user session: a pooled HTTP client, the
//! immutable [`ApiConfig`] and the single tracked session cookie. Calls are
//! plain request/response with no retries; each call signs its parameters,
//! attaches the wire-escaped cookie, and captures any `Set-Cookie` from the
//! response before decoding the JSON envelope.
//!
//! Most endpoints do not populate all fields of the returned types; a game
//! list, for example, omits the question texts.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use reqwest::header::{ACCEPT_ENCODING, AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE, USER_AGENT};
use tracing::{debug, instrument, warn};

use crate::auth::{SessionCookie, decode_set_cookie, signer};
use crate::config::ApiConfig;
use crate::error::ClientError;
use crate::model::{
    Envelope, Game, GameStatistic, InGameMessage, Popup, Status, User, UserCategoryStatistics,
};

/// A single user's connection to Quizduell.
///
/// The session cookie lives outside any cookie store because the server's
/// cookie values are not valid under strict cookie grammar (see
/// [`crate::auth::cookie`]); it is attached and captured manually on every
/// request. Concurrent callers are serialized around the cookie by a mutex,
/// so a response's cookie update is never lost to a later request's read.
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    config: ApiConfig,
    cookie: Mutex<Option<SessionCookie>>,
}

impl Client {
    /// Creates a client with no session. Call [`login`](Self::login) before
    /// any endpoint that requires one.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self::with_cookie(config, None)
    }

    /// Creates a client with a previously established session cookie, e.g.
    /// one restored from the [`CookieVault`](crate::auth::CookieVault). No
    /// network round-trip is performed.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_cookie(config: ApiConfig, cookie: Option<SessionCookie>) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .danger_accept_invalid_certs(config.danger_accept_invalid_certs)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self {
            http,
            config,
            cookie: Mutex::new(cookie),
        }
    }

    /// Returns a copy of the current session cookie, if any.
    #[must_use]
    pub fn session_cookie(&self) -> Option<SessionCookie> {
        self.lock_cookie().clone()
    }

    /// Replaces the tracked session cookie.
    pub fn set_session_cookie(&self, cookie: SessionCookie) {
        *self.lock_cookie() = Some(cookie);
    }

    fn lock_cookie(&self) -> std::sync::MutexGuard<'_, Option<SessionCookie>> {
        // A poisoned lock only means a panic elsewhere while holding the
        // cookie; the cookie itself is still usable.
        self.cookie.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sends one signed request and decodes the response envelope.
    ///
    /// POST with a form-urlencoded body when parameters are present, GET
    /// otherwise. The first `Set-Cookie` header of the response replaces the
    /// tracked session cookie.
    #[instrument(level = "debug", skip(self, params), fields(path = %path))]
    async fn request(
        &self,
        path: &str,
        params: Vec<(String, String)>,
    ) -> Result<Envelope, ClientError> {
        let url = format!("{}{}", self.config.base_url, path);
        let client_date = signer::client_date_now();
        let signature = signer::sign(&self.config, path, &client_date, &params);

        let mut builder = if params.is_empty() {
            self.http.get(&url)
        } else {
            self.http.post(&url).form(&params)
        };
        builder = builder
            .header("dt", "a")
            .header(AUTHORIZATION, signature)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(USER_AGENT, &self.config.user_agent)
            .header("clientdate", client_date)
            .header(ACCEPT_ENCODING, "identity");

        let cookie_header = self.lock_cookie().as_ref().map(SessionCookie::encode_for_wire);
        if let Some(value) = cookie_header {
            builder = builder.header(COOKIE, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|error| ClientError::network(path, error))?;

        // headers().get returns the first value when the server sends
        // multiple Set-Cookie headers; the first one is authoritative.
        if let Some(raw) = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
        {
            match decode_set_cookie(raw) {
                Some(cookie) => *self.lock_cookie() = Some(cookie),
                None => warn!(path, "ignoring unparseable Set-Cookie header"),
            }
        }

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| ClientError::network(path, error))?;
        debug!(path, status = status.as_u16(), bytes = body.len(), "response received");

        serde_json::from_str(&body).map_err(|error| ClientError::decode(path, body, error))
    }

    /// Turns an envelope into a confirmed-login [`Status`] or an auth error.
    fn require_login(envelope: Envelope) -> Result<Status, ClientError> {
        let rejection = envelope.popup_message.clone();
        match envelope.into_status() {
            Some(status) if status.logged_in => Ok(status),
            _ => Err(ClientError::auth(
                rejection.unwrap_or_else(|| "server did not confirm login".to_string()),
            )),
        }
    }

    // ---- account calls ----

    /// Logs in and keeps the returned session cookie for subsequent calls.
    ///
    /// Not needed when the client was constructed with a restored cookie.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] when the server rejects the
    /// credentials, distinct from network and decode failures.
    pub async fn login(&self, username: &str, password: &str) -> Result<Status, ClientError> {
        let params = vec![
            param("name", username),
            param("pwd", signer::hash_password(&self.config, password)),
        ];
        let envelope = self.request("/users/login", params).await?;
        Self::require_login(envelope)
    }

    /// Registers a new user, who is logged in automatically. The email is
    /// omitted from the request when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] when the server refuses the account.
    pub async fn create_user(
        &self,
        username: &str,
        email: Option<&str>,
        password: &str,
    ) -> Result<Status, ClientError> {
        let mut params = vec![param("name", username)];
        if let Some(email) = email {
            params.push(param("email", email));
        }
        params.push(param("pwd", signer::hash_password(&self.config, password)));
        let envelope = self.request("/users/create", params).await?;
        Self::require_login(envelope)
    }

    /// Updates the user's attributes; `None` fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport or decode failure.
    pub async fn update_user(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<Option<Status>, ClientError> {
        let mut params = Vec::new();
        if let Some(username) = username {
            params.push(param("name", username));
        }
        if let Some(email) = email {
            params.push(param("email", email));
        }
        if let Some(password) = password {
            params.push(param("pwd", signer::hash_password(&self.config, password)));
        }
        let envelope = self.request("/users/update_user", params).await?;
        Ok(envelope.into_status())
    }

    /// Looks up a user by name.
    pub async fn find_user(&self, username: &str) -> Result<Option<User>, ClientError> {
        let envelope = self
            .request("/users/find_user", vec![param("opponent_name", username)])
            .await?;
        Ok(envelope.u)
    }

    /// Adds the user to the friends list.
    pub async fn add_friend(&self, user_id: i64) -> Result<Option<Popup>, ClientError> {
        let envelope = self
            .request("/users/add_friend", vec![param("friend_id", user_id)])
            .await?;
        Ok(envelope.into_popup())
    }

    /// Removes the user from the friends list.
    pub async fn remove_friend(&self, user_id: i64) -> Result<Option<Popup>, ClientError> {
        let envelope = self
            .request("/users/remove_friend", vec![param("friend_id", user_id)])
            .await?;
        Ok(envelope.into_popup())
    }

    /// Sets the avatar to the given code, e.g. `"0010999912"`.
    pub async fn update_avatar(&self, avatar_code: &str) -> Result<bool, ClientError> {
        let envelope = self
            .request("/users/update_avatar", vec![param("avatar_code", avatar_code)])
            .await?;
        Ok(envelope.t)
    }

    /// Requests a password-reset email.
    pub async fn send_forgot_password_email(
        &self,
        email: &str,
    ) -> Result<Option<Popup>, ClientError> {
        let envelope = self
            .request("/users/forgot_pwd", vec![param("email", email)])
            .await?;
        Ok(envelope.into_popup())
    }

    /// Adds the user to the blocked list; returns the updated list.
    pub async fn add_blocked(&self, user_id: i64) -> Result<Vec<User>, ClientError> {
        let envelope = self
            .request("/users/add_blocked", vec![param("blocked_id", user_id)])
            .await?;
        Ok(envelope.blocked.unwrap_or_default())
    }

    /// Removes the user from the blocked list; returns the updated list.
    pub async fn remove_blocked(&self, user_id: i64) -> Result<Vec<User>, ClientError> {
        let envelope = self
            .request("/users/remove_blocked", vec![param("blocked_id", user_id)])
            .await?;
        Ok(envelope.blocked.unwrap_or_default())
    }

    // ---- game calls ----

    /// Starts a game against a specific opponent.
    pub async fn start_game(&self, opponent_id: i64) -> Result<Option<Game>, ClientError> {
        let envelope = self
            .request("/games/create_game", vec![param("opponent_id", opponent_id)])
            .await?;
        Ok(envelope.game)
    }

    /// Starts a game against a server-chosen random opponent.
    pub async fn start_random_game(&self) -> Result<Option<Game>, ClientError> {
        let envelope = self.request("/games/start_random_game", Vec::new()).await?;
        Ok(envelope.game)
    }

    /// Fetches one game in full, including the questions of every round.
    pub async fn game(&self, game_id: i64) -> Result<Option<Game>, ClientError> {
        let envelope = self
            .request(&format!("/games/{game_id}"), Vec::new())
            .await?;
        Ok(envelope.game)
    }

    /// Fetches short forms of the given games (no question texts).
    pub async fn games(&self, game_ids: &[i64]) -> Result<Vec<Game>, ClientError> {
        let envelope = self
            .request(
                "/games/short_games",
                vec![param("gids", format_ids(game_ids))],
            )
            .await?;
        Ok(envelope.games.unwrap_or_default())
    }

    /// Gives up a game; points may be lost.
    pub async fn give_up(
        &self,
        game_id: i64,
    ) -> Result<(Option<Game>, Option<Popup>), ClientError> {
        let envelope = self
            .request("/games/give_up", vec![param("game_id", game_id)])
            .await?;
        let game = envelope.game.clone();
        Ok((game, envelope.into_popup()))
    }

    /// Accepts a pending game invite.
    pub async fn accept_game(&self, game_id: i64) -> Result<bool, ClientError> {
        let envelope = self
            .request(
                "/games/accept",
                vec![param("accept", "1"), param("game_id", game_id)],
            )
            .await?;
        Ok(envelope.t)
    }

    /// Declines a pending game invite.
    pub async fn decline_game(&self, game_id: i64) -> Result<bool, ClientError> {
        let envelope = self
            .request(
                "/games/accept",
                vec![param("accept", "0"), param("game_id", game_id)],
            )
            .await?;
        Ok(envelope.t)
    }

    /// Uploads the answers of a round.
    ///
    /// `answers` must include all answers given in previous rounds of the
    /// same game, followed by the new ones.
    pub async fn upload_round_answers(
        &self,
        game_id: i64,
        answers: &[i64],
        category_id: i64,
    ) -> Result<Option<Game>, ClientError> {
        let envelope = self
            .request(
                "/games/upload_round_answers",
                vec![
                    param("game_id", game_id),
                    param("cat_choice", category_id),
                    param("answers", format_ids(answers)),
                ],
            )
            .await?;
        Ok(envelope.game)
    }

    /// Returns the status update carrying the user's current games.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] when the session is no longer valid.
    pub async fn current_user_games(&self) -> Result<Status, ClientError> {
        let envelope = self.request("/users/current_user_games", Vec::new()).await?;
        Self::require_login(envelope)
    }

    /// Sends a chat message to the opponent of the given game.
    pub async fn send_message(
        &self,
        game_id: i64,
        text: &str,
    ) -> Result<Option<InGameMessage>, ClientError> {
        let envelope = self
            .request(
                "/games/send_message",
                vec![param("game_id", game_id), param("text", text)],
            )
            .await?;
        Ok(envelope.m)
    }

    // ---- statistics and lists ----

    /// Win/loss statistics per opponent.
    pub async fn game_statistics(&self) -> Result<Vec<GameStatistic>, ClientError> {
        let envelope = self.request("/stats/my_game_stats", Vec::new()).await?;
        Ok(envelope.game_stats.unwrap_or_default())
    }

    /// Users with the most accepted submitted questions.
    pub async fn top_writers(&self) -> Result<Vec<User>, ClientError> {
        let envelope = self.request("/users/top_list_writers", Vec::new()).await?;
        Ok(envelope.users.unwrap_or_default())
    }

    /// Users with the highest rating.
    pub async fn top_players(&self) -> Result<Vec<User>, ClientError> {
        let envelope = self.request("/users/top_list_rating", Vec::new()).await?;
        Ok(envelope.users.unwrap_or_default())
    }

    /// All question categories, keyed by id.
    pub async fn category_list(&self) -> Result<HashMap<i64, String>, ClientError> {
        let envelope = self.request("/web/cats", Vec::new()).await?;
        Ok(envelope.cats.unwrap_or_default())
    }

    /// Lifetime per-category performance of the logged-in user.
    pub async fn category_statistics(&self) -> Result<UserCategoryStatistics, ClientError> {
        let envelope = self.request("/stats/my_stats", Vec::new()).await?;
        Ok(envelope.statistics)
    }

    /// Creates a TV profile for the logged-in user.
    ///
    /// The returned user carries the TV auth token (`tt`) needed by
    /// [`TvClient`](crate::tv::TvClient).
    pub async fn create_tv_user(&self) -> Result<Option<User>, ClientError> {
        let envelope = self.request("/tv/create_tv_user", Vec::new()).await?;
        Ok(envelope.user)
    }
}

fn param(name: &str, value: impl ToString) -> (String, String) {
    (name.to_string(), value.to_string())
}

/// Renders an integer list in the bracketed wire format, e.g. `[1, 2, 3]`.
fn format_ids(ids: &[i64]) -> String {
    let mut out = String::from("[");
    for (index, id) in ids.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        out.push_str(&id.to_string());
    }
    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ids_wire_format() {
        assert_eq!(format_ids(&[1, 2, 3]), "[1, 2, 3]");
        assert_eq!(format_ids(&[42]), "[42]");
        assert_eq!(format_ids(&[]), "[]");
    }

    #[test]
    fn test_require_login_accepts_confirmed_session() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"logged_in": true, "user": {"name": "alice"}}"#).unwrap();
        let status = Client::require_login(envelope).unwrap();
        assert!(status.logged_in);
    }

    #[test]
    fn test_require_login_rejects_missing_status() {
        let envelope: Envelope = serde_json::from_str(r#"{"t": false}"#).unwrap();
        let error = Client::require_login(envelope).unwrap_err();
        assert!(matches!(error, ClientError::Auth { .. }), "got: {error}");
    }

    #[test]
    fn test_require_login_carries_server_rejection_text() {
        let envelope: Envelope = serde_json::from_str(
            r#"{"logged_in": false, "popup_mess": "Wrong name or password", "popup_title": "Oops"}"#,
        )
        .unwrap();
        let error = Client::require_login(envelope).unwrap_err();
        assert!(
            error.to_string().contains("Wrong name or password"),
            "got: {error}"
        );
    }
}
