//! Response types for the Quizduell API.
//!
//! Every endpoint answers with one umbrella JSON object (the [`Envelope`])
//! whose populated fields depend on the endpoint. Most calls leave most
//! fields absent, and even the sub-objects that are present are rarely
//! complete (a game list, for example, omits question texts), so everything
//! here is optional or defaulted.
//!
//! Numeric identifiers (`user_id`, `facebook_id`, `removed_id`) arrive as
//! JSON strings; the deserializers accept either form.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

/// Lifecycle of a game as reported in the `state` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameState {
    /// Invite sent, not yet accepted.
    #[default]
    Waiting,
    /// Both players accepted, rounds in progress.
    Active,
    /// All rounds played.
    Finished,
    /// One player gave up.
    GivenUp,
}

impl TryFrom<i64> for GameState {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Waiting),
            1 => Ok(Self::Active),
            2 => Ok(Self::Finished),
            5 => Ok(Self::GivenUp),
            other => Err(format!("unknown game state {other}")),
        }
    }
}

impl<'de> Deserialize<'de> for GameState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// Accepts an integer either as a JSON number or as a string-wrapped number.
fn opt_stringly_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Str(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Int(value)) => Ok(Some(value)),
        Some(Raw::Str(s)) if s.is_empty() => Ok(None),
        Some(Raw::Str(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// A Quizduell user profile, fully or partially populated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(rename = "user_id", deserialize_with = "opt_stringly_i64")]
    pub id: Option<i64>,
    pub name: String,
    pub avatar_code: Option<String>,
    /// TV auth token, only present on TV profile responses.
    pub tt: Option<String>,
    pub qc: bool,
    #[serde(rename = "q_reviewer")]
    pub question_reviewer: i64,
    #[serde(rename = "n_approved_questions")]
    pub approved_questions: i64,
    pub key: i64,
    pub rating: i64,
    pub friends: Vec<User>,
    #[serde(deserialize_with = "opt_stringly_i64")]
    pub facebook_id: Option<i64>,
    pub games: Vec<Game>,
    pub email: Option<String>,
}

/// A single game against one opponent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Game {
    #[serde(rename = "game_id")]
    pub id: i64,
    #[serde(rename = "cat_choices")]
    pub category_choices: Vec<i64>,
    #[serde(rename = "elapsed_min")]
    pub elapsed_minutes: i64,
    pub messages: Vec<InGameMessage>,
    pub opponent: User,
    pub opponent_answers: Vec<i64>,
    pub your_answers: Vec<i64>,
    pub your_turn: bool,
    pub questions: Vec<Question>,
    pub rating_bonus: i64,
    pub state: GameState,
}

/// One quiz question with its answer options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub correct: String,
    pub wrong1: String,
    pub wrong2: String,
    pub wrong3: String,
    pub timestamp: String,
    #[serde(rename = "cat_name")]
    pub category_name: String,
    #[serde(rename = "cat_id")]
    pub category_id: i64,
    #[serde(rename = "q_id")]
    pub id: i64,
}

/// Win/loss record against a single opponent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameStatistic {
    pub avatar_code: Option<String>,
    #[serde(rename = "n_games_lost")]
    pub games_lost: i64,
    #[serde(rename = "n_games_tied")]
    pub games_tied: i64,
    #[serde(rename = "n_games_won")]
    pub games_won: i64,
    pub name: String,
    #[serde(deserialize_with = "opt_stringly_i64")]
    pub user_id: Option<i64>,
}

/// A chat message attached to a game.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InGameMessage {
    pub created_at: String,
    pub from: i64,
    pub id: String,
    pub text: String,
    pub to: i64,
}

/// Server-driven dialog text shown by the mobile apps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Popup {
    pub message: String,
    pub title: String,
}

/// Account status: whether the session is logged in, plus the current user
/// and server-pushed client settings.
#[derive(Debug, Clone, Default)]
pub struct Status {
    pub logged_in: bool,
    pub user: Option<User>,
    pub settings: Option<Settings>,
}

/// Client tuning pushed by the server on login and status calls.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub max_free_games: i64,
    pub give_up_point_loss: i64,
    pub fulmium: bool,
    pub feo: bool,
    pub feos: f64,
    pub ppf: f64,
    pub check_limbo_games: bool,
    pub refresh_table_freq: i64,
    pub refresh_freq: i64,
    pub splash_freq: f64,
}

/// Per-category correct-answer rate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryStatistic {
    pub percent: f64,
    #[serde(rename = "cat_name")]
    pub category_name: String,
}

/// Lifetime statistics of the logged-in user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserCategoryStatistics {
    #[serde(rename = "cat_stats")]
    pub category_statistics: Vec<CategoryStatistic>,
    #[serde(rename = "n_games_lost")]
    pub games_lost: i64,
    #[serde(rename = "n_games_played")]
    pub games_played: i64,
    #[serde(rename = "n_games_tied")]
    pub games_tied: i64,
    #[serde(rename = "n_games_won")]
    pub games_won: i64,
    #[serde(rename = "n_perfect_games")]
    pub perfect_games: i64,
    #[serde(rename = "n_questions_answered")]
    pub questions_answered: i64,
    #[serde(rename = "n_questions_correct")]
    pub questions_correct: i64,
    #[serde(rename = "n_users")]
    pub user_count: i64,
    pub rank: i64,
    pub rating: i64,
}

/// The umbrella response object shared by every endpoint.
///
/// Which fields are populated depends on the endpoint; absent fields are
/// tolerated everywhere. Fields the server writes at the top level on behalf
/// of a sub-payload (status, popup, category statistics) are exposed through
/// the `into_*` accessors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Envelope {
    /// Generic boolean acknowledgement (`accept`, `update_avatar`).
    pub t: bool,
    /// User payload of `find_user`.
    pub u: Option<User>,
    pub blocked: Option<Vec<User>>,
    pub users: Option<Vec<User>>,
    /// Category id to name mapping (`/web/cats`).
    pub cats: Option<HashMap<i64, String>>,
    pub game_stats: Option<Vec<GameStatistic>>,
    pub game: Option<Game>,
    pub games: Option<Vec<Game>>,
    /// In-game chat message payload.
    pub m: Option<InGameMessage>,
    pub access: bool,
    #[serde(deserialize_with = "opt_stringly_i64")]
    pub removed_id: Option<i64>,

    // Status fields, written at the top level of the response.
    pub logged_in: Option<bool>,
    pub user: Option<User>,
    pub settings: Option<Settings>,

    // Popup fields, written at the top level of the response.
    #[serde(rename = "popup_mess")]
    pub popup_message: Option<String>,
    pub popup_title: Option<String>,

    /// Lifetime statistics, written at the top level of `/stats/my_stats`.
    #[serde(flatten)]
    pub statistics: UserCategoryStatistics,
}

impl Envelope {
    /// Extracts the status sub-payload, present whenever the server reported
    /// a `logged_in` flag.
    #[must_use]
    pub fn into_status(self) -> Option<Status> {
        self.logged_in.map(|logged_in| Status {
            logged_in,
            user: self.user,
            settings: self.settings,
        })
    }

    /// Extracts the popup sub-payload, when the server sent one.
    #[must_use]
    pub fn into_popup(self) -> Option<Popup> {
        if self.popup_message.is_none() && self.popup_title.is_none() {
            return None;
        }
        Some(Popup {
            message: self.popup_message.unwrap_or_default(),
            title: self.popup_title.unwrap_or_default(),
        })
    }
}
