//! CLI argument definitions for the player bot using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Automated Quizduell player.
///
/// Runs one polling pass: accepts pending invites, gives up stale games,
/// answers open rounds, and tops up random games. Credentials come from
/// `QD_USERNAME`/`QD_PASSWORD` and the cookie file path from
/// `QD_COOKIE_FILE` unless given as flags.
#[derive(Parser, Debug)]
#[command(name = "quizduell-player")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Account name (falls back to QD_USERNAME)
    #[arg(long)]
    pub username: Option<String>,

    /// Account password (falls back to QD_PASSWORD)
    #[arg(long)]
    pub password: Option<String>,

    /// Cookie vault file path (falls back to QD_COOKIE_FILE)
    #[arg(long)]
    pub cookie_file: Option<PathBuf>,

    /// Number of random games to start unconditionally
    #[arg(long, default_value_t = 0)]
    pub rand_games: u32,

    /// How many active games to maintain
    #[arg(long, default_value_t = 20)]
    pub const_games: u32,

    /// Standard deviation of the answer sampler (0 = always correct)
    #[arg(long, default_value_t = 0.8)]
    pub ans_stddev: f64,

    /// Minutes to wait on the opponent before giving a game up
    #[arg(long, default_value_t = 360)]
    pub give_up_mins: i64,

    /// Comma-separated usernames that should not be played against
    #[arg(long, value_delimiter = ',')]
    pub no_play_names: Vec<String>,
}
