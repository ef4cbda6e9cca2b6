//! Command-line front end for the durable topic store.
//!
//! # Responsibility
//! - Resolve configuration from the optional TOML file and flag overrides.
//! - Drive add-topic, add-detail and toggle operations against SQLite.
//! - Render the topic list as text or JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flussab_core::db::open_db;
use flussab_core::{
    core_version, init_logging_from, AppConfig, DurableTopicStore, SqliteTopicRepository, Topic,
    TopicId,
};
use log::info;
use std::path::PathBuf;

/// Flussabwärts topic notes
#[derive(Parser, Debug)]
#[command(name = "flussab")]
#[command(about = "Collect topics and append detail lines to them", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides `storage.db_path`)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Absolute log directory (overrides `logging.dir`)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level (overrides `logging.level`)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Print topics as JSON records
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a new topic at the top of the list
    Topic {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Append a detail line to a topic
    Detail {
        id: TopicId,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Expand a topic, or collapse it when it is already expanded
    Toggle { id: TopicId },
    /// Show all topics, newest first
    List {
        /// Show details of every topic, not only the expanded one
        #[arg(long)]
        all: bool,
    },
    /// Print the core version
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::Version = cli.command {
        println!("flussab {}", core_version());
        return Ok(());
    }

    let config = resolve_config(&cli)?;
    init_logging_from(&config.logging).context("failed to initialize logging")?;

    let db_path = &config.storage.db_path;
    let mut conn =
        open_db(db_path).with_context(|| format!("failed to open `{}`", db_path.display()))?;
    let repo = SqliteTopicRepository::try_new(&mut conn)?;
    let mut store = DurableTopicStore::open(repo)?;

    let show_all = match cli.command {
        Command::Topic { name } => {
            match store.add_topic(&name.join(" "))? {
                Some(id) => eprintln!("added topic {id}"),
                None => eprintln!("blank topic name ignored"),
            }
            false
        }
        Command::Detail { id, text } => {
            if !store.add_detail(id, &text.join(" "))? {
                eprintln!("blank detail ignored");
            }
            false
        }
        Command::Toggle { id } => {
            match store.set_active(id)? {
                Some(active) => eprintln!("expanded topic {active}"),
                None => eprintln!("collapsed topic {id}"),
            }
            false
        }
        Command::List { all } => all,
        Command::Version => false,
    };

    info!(
        "event=cli_command module=cli status=ok topic_count={}",
        store.topics().len()
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(store.topics())?);
    } else {
        print!("{}", render_topics(store.topics(), show_all));
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match cli.config.as_deref() {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(db) = cli.db.clone() {
        config.storage.db_path = db;
    }
    if let Some(dir) = cli.log_dir.clone() {
        config.logging.dir = Some(dir);
    }
    if let Some(level) = cli.log_level.clone() {
        config.logging.level = level;
    }
    Ok(config)
}

fn render_topics(topics: &[Topic], show_all: bool) -> String {
    let mut out = String::new();
    if topics.is_empty() {
        out.push_str("(no topics)\n");
        return out;
    }
    for topic in topics {
        let marker = if topic.expanded { 'v' } else { '>' };
        out.push_str(&format!("{marker} [{}] {}\n", topic.id, topic.name));
        if topic.expanded || show_all {
            for detail in &topic.details {
                out.push_str(&format!("    - {detail}\n"));
            }
        }
    }
    out
}
