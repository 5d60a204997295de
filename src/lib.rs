//! Client library for the Quizduell REST API.
//!
//! Supports the functionality of the mobile apps: account management, game
//! flow (invite, accept, answer, give up), statistics and top lists, plus
//! the TV broadcast variant. The interesting part is authentication: every
//! request carries an HMAC-SHA256 signature over its parameters, and the
//! session cookie needs a custom wire codec and its own persistence layer
//! because the server's cookie values are not valid under strict cookie
//! grammar.
//!
//! # Architecture
//!
//! - [`auth`] - request signing, cookie wire codec, cookie vault, session bootstrap
//! - [`client`] - the API client and its endpoint surface
//! - [`model`] - response envelope and payload types
//! - [`tv`] - client for the TV broadcast API
//! - [`bot`] - decision heuristics for the example player bot
//!
//! # Example
//!
//! ```no_run
//! use quizduell::{ApiConfig, CookieVault, Credentials, establish};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new("alice", "secret");
//! let vault = CookieVault::new("/tmp/quizduell-cookie.json");
//! let client = establish(ApiConfig::default(), &credentials, &vault).await?;
//!
//! let status = client.current_user_games().await?;
//! for game in status.user.map(|u| u.games).unwrap_or_default() {
//!     println!("vs {}: your turn = {}", game.opponent.name, game.your_turn);
//! }
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod bot;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod tv;

// Re-export commonly used types
pub use auth::{
    Credentials, CookieVault, SessionCookie, VaultError, decode_set_cookie, establish,
};
pub use client::Client;
pub use config::ApiConfig;
pub use error::ClientError;
pub use model::{Envelope, Game, GameState, Status, User};
pub use tv::TvClient;
