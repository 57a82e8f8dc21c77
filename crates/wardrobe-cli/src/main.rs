//! `wardrobe`: command-line client for the wardrobe API.
//!
//! # Usage
//!
//! ```text
//! wardrobe calendar --prev
//! wardrobe wear <outfit-id> --date 2024-05-05
//! wardrobe recommend --min-rating 4 --exclude-days 3
//! wardrobe --config ~/.config/wardrobe/config.toml stats
//! ```

mod client;
mod render;

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use wardrobe_core::{
  Error,
  calendar::MonthKey,
  history::HistoryClient,
  recommend::{RecommendationCriteria, Recommender, Started},
  store::DEFAULT_EXCLUDE_DAYS,
  wear::{RecordOutcome, WearDayManager, WearDayState},
};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "wardrobe", about = "Command-line client for the wardrobe API")]
struct Args {
  /// Path to a TOML config file (url, timeout_secs).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the wardrobe server (default: http://localhost:8080).
  #[arg(long, env = "WARDROBE_URL")]
  url: Option<String>,

  /// Per-request timeout in seconds.
  #[arg(long, env = "WARDROBE_TIMEOUT_SECS")]
  timeout_secs: Option<u64>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Show a month of wear history.
  Calendar {
    #[arg(long)]
    year:  Option<i32>,
    #[arg(long)]
    month: Option<u32>,
    /// Show the month before the selected one.
    #[arg(long, conflicts_with = "next")]
    prev:  bool,
    /// Show the month after the selected one.
    #[arg(long)]
    next:  bool,
  },
  /// List outfits with when they were last worn.
  Outfits,
  /// Record an outfit as worn.
  Wear {
    outfit_id: Uuid,
    /// Day to record (default: today).
    #[arg(long)]
    date:      Option<NaiveDate>,
  },
  /// Free a day so a different outfit can be recorded.
  ChangeToday {
    outfit_id: Uuid,
    #[arg(long)]
    date:      Option<NaiveDate>,
  },
  /// Whether an outfit is recorded for a day.
  Status {
    outfit_id: Uuid,
    #[arg(long)]
    date:      Option<NaiveDate>,
  },
  /// Wardrobe totals.
  Stats,
  /// Browse recommendations interactively and pick one to wear today.
  Recommend {
    #[arg(long, default_value_t = 3)]
    min_rating:    u8,
    #[arg(long, default_value_t = 3)]
    min_formality: u8,
    /// Skip outfits worn within this many days (0 disables).
    #[arg(long, default_value_t = DEFAULT_EXCLUDE_DAYS)]
    exclude_days:  u32,
    /// Only outfits containing this item.
    #[arg(long)]
    item:          Option<Uuid>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:          String,
  #[serde(default)]
  timeout_secs: Option<u64>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    timeout:  Duration::from_secs(args.timeout_secs.or(file_cfg.timeout_secs).unwrap_or(10)),
  };
  let timeout = api_config.timeout;

  let client = Arc::new(ApiClient::new(api_config).context("failed to build HTTP client")?);
  let manager = WearDayManager::new(HistoryClient::new(Arc::clone(&client), timeout));
  let today = Local::now().date_naive();

  match args.command {
    Command::Calendar {
      year,
      month,
      prev,
      next,
    } => {
      let mut key = match (year, month) {
        (Some(y), Some(m)) => MonthKey::new(y, m)?,
        (None, None) => MonthKey::containing(today),
        _ => bail!("--year and --month must be given together"),
      };
      if prev {
        key = key.previous();
      } else if next {
        key = key.next();
      }
      let view = client.calendar(key).await?;
      print!("{}", render::calendar(&view));
    }
    Command::Outfits => {
      for outfit in client.list_outfits().await? {
        println!("{}", render::outfit_line(&outfit, today));
      }
    }
    Command::Wear { outfit_id, date } => {
      let date = date.unwrap_or(today);
      match manager.record_today(outfit_id, date).await? {
        RecordOutcome::Recorded(r) => println!("Recorded {} for {date}", r.outfit.name),
        RecordOutcome::AlreadyRecorded(r) => {
          println!("{} is already recorded for {date}", r.outfit.name)
        }
      }
    }
    Command::ChangeToday { outfit_id, date } => {
      let date = date.unwrap_or(today);
      let removed = manager.change_today(outfit_id, date).await?;
      println!("Removed {} from {date}; pick another outfit", removed.outfit.name);
    }
    Command::Status { outfit_id, date } => {
      let date = date.unwrap_or(today);
      match manager.status(outfit_id, date).await? {
        WearDayState::WornToday { record } => println!("Worn on {date} ({})", record.record_id),
        WearDayState::NotWornToday => println!("Not worn on {date}"),
      }
    }
    Command::Stats => {
      let stats = client.stats().await?;
      println!("{} items", stats.item_count);
      println!("{} outfits", stats.outfit_count);
      println!("{} days recorded", stats.recorded_days);
    }
    Command::Recommend {
      min_rating,
      min_formality,
      exclude_days,
      item,
    } => {
      let criteria = RecommendationCriteria {
        min_rating,
        min_formality,
        exclude_recent_within_days: exclude_days,
        required_item_id: item,
      };
      recommend(Recommender::new(manager), criteria, today).await?;
    }
  }

  Ok(())
}

// ─── Recommendation prompt ────────────────────────────────────────────────────

async fn recommend(
  recommender: Recommender<ApiClient>,
  criteria: RecommendationCriteria,
  today: NaiveDate,
) -> Result<()> {
  let (candidates, first) = match recommender.start(criteria, today).await {
    Ok(Started::Active {
      candidates,
      current,
      ..
    }) => (candidates, current),
    Ok(Started::Superseded { .. }) => bail!("recommendation was superseded"),
    Err(Error::NoCandidates) => {
      println!("No outfits match these criteria.");
      return Ok(());
    }
    Err(e) => return Err(e.into()),
  };

  println!("{candidates} candidates\n");
  print!("{}", render::outfit_card(&first, today));

  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  let mut stdout = tokio::io::stdout();
  loop {
    stdout.write_all(b"[n]ext  [w]ear  [q]uit > ").await?;
    stdout.flush().await?;

    let Some(line) = lines.next_line().await? else {
      recommender.cancel().await;
      return Ok(());
    };
    match line.trim() {
      "n" | "next" => {
        let outfit = recommender.advance().await?;
        let unseen = recommender.unseen().await?;
        println!();
        print!("{}", render::outfit_card(&outfit, today));
        if unseen == 0 {
          println!("(all candidates shown)");
        }
      }
      "w" | "wear" => match recommender.commit().await {
        Ok(outcome) => {
          let verb = if outcome.is_new() { "Recorded" } else { "Already recorded" };
          println!("{verb}: {} for {today}", outcome.record().outfit.name);
          return Ok(());
        }
        Err(e @ Error::InvariantViolation { .. }) => {
          println!("{e}");
          println!("Use `wardrobe change-today` on that outfit first, or pick another.");
        }
        Err(e) => return Err(e.into()),
      },
      "q" | "quit" => {
        recommender.cancel().await;
        return Ok(());
      }
      "" => {}
      other => println!("unknown command {other:?}"),
    }
  }
}
