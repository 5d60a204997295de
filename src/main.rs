//! Entry point for the example player bot.
//!
//! One invocation is one polling pass over the user's games, mirroring how
//! the mobile app is played in bursts: accept invites, give up stale games,
//! answer whatever is pending, then top up random games.

use std::env;

use anyhow::{Context, Result, bail};
use clap::Parser;
use quizduell::{
    ApiConfig, Client, CookieVault, Credentials, bot, establish,
    model::{Game, GameState},
};
use tracing::{debug, info, warn};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let username = args
        .username
        .clone()
        .or_else(|| env::var("QD_USERNAME").ok())
        .context("no username; pass --username or set QD_USERNAME")?;
    let password = args
        .password
        .clone()
        .or_else(|| env::var("QD_PASSWORD").ok())
        .context("no password; pass --password or set QD_PASSWORD")?;
    let cookie_file = args
        .cookie_file
        .clone()
        .or_else(|| env::var("QD_COOKIE_FILE").ok().map(Into::into))
        .context("no cookie file; pass --cookie-file or set QD_COOKIE_FILE")?;

    let sampler = match bot::AnswerSampler::new(args.ans_stddev) {
        Ok(sampler) => sampler,
        Err(error) => bail!("invalid --ans-stddev {}: {error}", args.ans_stddev),
    };

    let credentials = Credentials::new(username, password);
    let vault = CookieVault::new(cookie_file);
    let client = establish(ApiConfig::default(), &credentials, &vault).await?;

    let active_games = play_pending_games(&client, &args, &sampler).await?;

    let stats = client.category_statistics().await?;
    info!(
        active_games,
        rank = stats.rank,
        users = stats.user_count,
        games_won = stats.games_won,
        "polling pass complete"
    );

    let mut games_to_start = args.rand_games;
    if active_games + games_to_start < args.const_games {
        games_to_start = args.const_games - active_games;
    }

    for _ in 0..games_to_start {
        match client.start_random_game().await? {
            Some(game) => info!(opponent = %game.opponent.name, "started random game"),
            None => warn!("random game request returned no game"),
        }
    }

    Ok(())
}

/// Handles every game of the current status poll; returns how many games are
/// still active afterwards.
async fn play_pending_games(
    client: &Client,
    args: &Args,
    sampler: &bot::AnswerSampler,
) -> Result<u32> {
    let status = client.current_user_games().await?;
    let games: Vec<Game> = status.user.map(|user| user.games).unwrap_or_default();

    let mut active_count: u32 = 0;

    for game in &games {
        if bot::is_no_play_name(&game.opponent.name, &args.no_play_names) {
            debug!(opponent = %game.opponent.name, "skipping no-play opponent");
            continue;
        }

        if game.state == GameState::Active {
            active_count += 1;

            if !game.your_turn && game.elapsed_minutes > args.give_up_mins {
                active_count -= 1;
                info!(opponent = %game.opponent.name, elapsed_min = game.elapsed_minutes, "giving up stale game");
                client.give_up(game.id).await?;
            }
        }

        if game.state == GameState::Waiting && game.your_turn {
            active_count += 1;
            info!(opponent = %game.opponent.name, "accepting invite");
            client.accept_game(game.id).await?;
        }

        if game.your_turn {
            let required = bot::required_answer_count(game);
            let category_id = bot::category_choice(game, required);

            // The third-round upload closes the game when the opponent has
            // already answered.
            if required == 3 && !game.opponent_answers.is_empty() {
                active_count = active_count.saturating_sub(1);
            }

            let new_answers = sampler.sample_round(&mut rand::thread_rng(), required);
            let correct = new_answers.iter().filter(|&&a| a == 0).count();
            info!(
                opponent = %game.opponent.name,
                answers = required,
                correct,
                "answering round"
            );

            let mut answers = game.your_answers.clone();
            answers.extend_from_slice(&new_answers);
            client
                .upload_round_answers(game.id, &answers, category_id)
                .await?;
        }
    }

    Ok(active_count)
}
