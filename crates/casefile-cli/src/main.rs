//! `casefile`: operator tooling for the casefile document store.
//!
//! Reads `casefile.toml` (or the path given with `--config`), opens the
//! SQLite store and runs one repository operation, printing results as JSON
//! lines. Ctrl-C cancels the running operation.
//!
//! # Usage
//!
//! ```text
//! casefile add-survivor "Olena Kovalenko"
//! casefile create-inquiry <survivor-id> --channel email --channel phone
//! casefile list <survivor-id>
//! casefile citizenships
//! ```

mod config;

use std::{path::PathBuf, str::FromStr, sync::Arc};

use anyhow::Context as _;
use casefile_core::{
  CancellationToken, Repository,
  document::NewInquiry,
  inquiry::{InquiryChannel, InquirySource},
  record::CitizenshipRecord,
  store::SurvivorStore,
  survivor::NewSurvivor,
};
use casefile_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "casefile", version, about = "Casefile document store tooling")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "casefile.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create the database file and schema if missing.
  Init,

  /// Register a survivor.
  AddSurvivor { name: String },

  /// Open an inquiry document for a survivor.
  CreateInquiry {
    survivor_id: Uuid,

    /// Self-inquiry channel; repeatable.
    #[arg(long = "channel", value_parser = parse_channel)]
    channels: Vec<InquiryChannel>,

    /// Forwarding organisation.
    #[arg(long)]
    organization: Option<String>,

    /// Forwarding person.
    #[arg(long)]
    person: Option<String>,

    /// Forwarding survivor.
    #[arg(long)]
    referred_by: Option<String>,

    #[arg(long)]
    working_experience: Option<String>,
  },

  /// Print one live document.
  Show { document_id: Uuid },

  /// Print every live document of a survivor.
  List { survivor_id: Uuid },

  /// Replace the working-experience note of an inquiry.
  SetWorkingExperience { document_id: Uuid, text: String },

  /// Soft-delete a document.
  Delete { document_id: Uuid },

  /// Attach a citizenship record to a document.
  AddCitizenship { document_id: Uuid, label: String },

  /// Print the records attached to a document.
  Records { document_id: Uuid },

  /// Print the distinct citizenship labels.
  Citizenships,
}

fn parse_channel(s: &str) -> Result<InquiryChannel, String> {
  InquiryChannel::from_str(s).map_err(|_| format!("unknown channel: {s}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = CliConfig::load(&cli.config)?;

  let store = SqliteStore::open_with(&cfg.store_path, cfg.store.clone())
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
  let repo = Repository::with_standard_mapper(Arc::new(store));

  let cancel = CancellationToken::new();
  {
    let cancel = cancel.clone();
    tokio::spawn(async move {
      if tokio::signal::ctrl_c().await.is_ok() {
        tracing::warn!("interrupted; cancelling");
        cancel.cancel();
      }
    });
  }

  run(cli.command, &repo, &cancel).await
}

async fn run(
  command: Command,
  repo: &Repository<SqliteStore>,
  cancel: &CancellationToken,
) -> anyhow::Result<()> {
  match command {
    Command::Init => {
      tracing::info!("store ready");
    }
    Command::AddSurvivor { name } => {
      let survivor = repo.store().add_survivor(NewSurvivor::new(name)).await?;
      print_json(&survivor)?;
    }
    Command::CreateInquiry {
      survivor_id,
      channels,
      organization,
      person,
      referred_by,
      working_experience,
    } => {
      let mut input = NewInquiry::new(survivor_id);
      input.working_experience = working_experience;
      if !channels.is_empty() {
        input = input.with_source(InquirySource::self_inquiry(channels));
      }
      if let Some(name) = organization {
        input = input.with_source(InquirySource::ForwardedByOrganization { name });
      }
      if let Some(name) = person {
        input = input.with_source(InquirySource::ForwardedByPerson { name });
      }
      if let Some(name) = referred_by {
        input = input.with_source(InquirySource::ForwardedBySurvivor { name });
      }
      let document = repo.create_inquiry(input, cancel).await?;
      print_json(&document)?;
    }
    Command::Show { document_id } => {
      print_json(&repo.get_single(document_id, cancel).await?)?;
    }
    Command::List { survivor_id } => {
      let mut stream = repo.get_all_by_survivor(survivor_id, cancel);
      while let Some(document) = stream.next().await? {
        print_json(&document)?;
      }
    }
    Command::SetWorkingExperience { document_id, text } => {
      repo.set_working_experience(document_id, text, cancel).await?;
    }
    Command::Delete { document_id } => {
      repo.soft_delete(document_id, cancel).await?;
    }
    Command::AddCitizenship { document_id, label } => {
      let record = CitizenshipRecord::new(label);
      repo.add_record(document_id, &record, cancel).await?;
      print_json(&record)?;
    }
    Command::Records { document_id } => {
      for record in repo.get_records(document_id, cancel).await? {
        print_json(&record)?;
      }
    }
    Command::Citizenships => {
      for label in repo.citizenship_completions(cancel).await? {
        println!("{label}");
      }
    }
  }
  Ok(())
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string(value)?);
  Ok(())
}
