//! cadastro command-line driver.
//!
//! Reads `cadastro.toml` (or the path given with `--config`), opens the
//! configured store backend, and exposes the registry operations: user
//! registration and login verification, person CRUD, reports, and HTML
//! export.
//!
//! # Password hash generation
//!
//! To print the argon2 PHC string for a password entered on stdin:
//!
//! ```text
//! cadastro hash-password
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cadastro_core::{
  directory::{Argon2Hasher, CredentialDirectory, PasswordHasher as _},
  record::PersonFields,
  store::{CredentialStore, PersonStore, StoreOptions},
};
use cadastro_report::{count_by, render, ChartImage, CountBy, ReportFilter};
use cadastro_store_sqlite::SqliteStore;
use cadastro_store_table::TableStore;

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Backend {
  Sqlite,
  Table,
}

#[derive(Debug, Clone, Deserialize)]
struct AppConfig {
  #[serde(default = "default_backend")]
  backend: Backend,
  /// SQLite file for the `sqlite` backend, directory for `table`.
  #[serde(default = "default_path")]
  path: PathBuf,
  #[serde(default)]
  unique_document_on_update: bool,
}

fn default_backend() -> Backend {
  Backend::Sqlite
}

fn default_path() -> PathBuf {
  PathBuf::from("cadastro.db")
}

// ─── CLI surface ─────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(author, version, about = "cadastro person registry")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "cadastro.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,
  /// Register a login; the password is read from stdin.
  RegisterUser { login: String },
  /// Check a login/password pair; prints `ok` or `denied`.
  Verify { login: String },
  /// Register a person.
  Add(FieldArgs),
  /// Print every live record as JSON, ascending by id.
  List,
  /// Replace every field of an existing record.
  Update {
    id: i64,
    #[command(flatten)]
    fields: FieldArgs,
  },
  /// Delete a record; deleting an absent id is a no-op.
  Delete { id: i64 },
  /// Print a filtered report, optionally aggregated, as JSON.
  Report {
    #[command(flatten)]
    filter: FilterArgs,
    /// Aggregate instead of listing rows.
    #[arg(long, value_enum)]
    count_by: Option<CountByArg>,
  },
  /// Render a filtered report to an HTML document.
  Export {
    #[command(flatten)]
    filter: FilterArgs,
    #[arg(long, default_value = "Relatório Geral")]
    title: String,
    /// Externally-rendered chart PNG to embed.
    #[arg(long)]
    chart: Option<PathBuf>,
    /// Output file.
    #[arg(long, default_value = "relatorio.html")]
    out: PathBuf,
  },
}

#[derive(Debug, Args)]
struct FieldArgs {
  #[arg(long)]
  name:                String,
  #[arg(long)]
  document_id:         Option<String>,
  /// YYYY-MM-DD.
  #[arg(long)]
  birthdate:           Option<String>,
  #[arg(long)]
  email:               Option<String>,
  #[arg(long)]
  phone:               Option<String>,
  #[arg(long)]
  kind:                Option<String>,
  #[arg(long)]
  registration_number: Option<String>,
  #[arg(long)]
  category:            Option<String>,
  #[arg(long)]
  room:                Option<String>,
  #[arg(long)]
  enrollment_year:     Option<String>,
  #[arg(long)]
  postal_code:         Option<String>,
  #[arg(long)]
  street:              Option<String>,
  #[arg(long)]
  number:              Option<String>,
  #[arg(long)]
  complement:          Option<String>,
  #[arg(long)]
  district:            Option<String>,
  #[arg(long)]
  city:                Option<String>,
  #[arg(long)]
  state:               Option<String>,
}

impl From<FieldArgs> for PersonFields {
  fn from(a: FieldArgs) -> Self {
    Self {
      name:                a.name,
      document_id:         a.document_id,
      birthdate:           a.birthdate,
      email:               a.email,
      phone:               a.phone,
      kind:                a.kind,
      registration_number: a.registration_number,
      category:            a.category,
      room:                a.room,
      enrollment_year:     a.enrollment_year,
      postal_code:         a.postal_code,
      street:              a.street,
      number:              a.number,
      complement:          a.complement,
      district:            a.district,
      city:                a.city,
      state:               a.state,
    }
  }
}

/// At most one filter may be selected; the `report_filter` group rejects
/// ambiguous combinations instead of silently picking one.
#[derive(Debug, Args)]
struct FilterArgs {
  #[arg(long, group = "report_filter")]
  category: Option<String>,
  #[arg(long, group = "report_filter")]
  enrollment_year: Option<String>,
  /// 1–12; birthdays in this month, any year.
  #[arg(long, group = "report_filter")]
  birth_month: Option<u32>,
  /// YYYY-MM-DD, inclusive; requires --registered-to.
  #[arg(long, group = "report_filter", requires = "registered_to")]
  registered_from: Option<chrono::NaiveDate>,
  #[arg(long, requires = "registered_from")]
  registered_to: Option<chrono::NaiveDate>,
}

impl FilterArgs {
  fn into_filter(self) -> anyhow::Result<ReportFilter> {
    Ok(match self {
      Self { category: Some(c), .. } => ReportFilter::Category(c),
      Self { enrollment_year: Some(y), .. } => ReportFilter::EnrollmentYear(y),
      Self { birth_month: Some(m), .. } => {
        anyhow::ensure!((1..=12).contains(&m), "--birth-month must be 1..=12");
        ReportFilter::BirthMonth(m)
      }
      Self { registered_from: Some(start), registered_to: Some(end), .. } => {
        ReportFilter::RegisteredBetween { start, end }
      }
      _ => ReportFilter::All,
    })
  }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CountByArg {
  Category,
  EnrollmentYear,
  RegistrationMonth,
}

impl From<CountByArg> for CountBy {
  fn from(a: CountByArg) -> Self {
    match a {
      CountByArg::Category => Self::Category,
      CountByArg::EnrollmentYear => Self::EnrollmentYear,
      CountByArg::RegistrationMonth => Self::RegistrationMonth,
    }
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit. No store needed.
  if matches!(cli.command, Command::HashPassword) {
    let password = read_password()?;
    println!("{}", Argon2Hasher.hash(&password)?);
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("CADASTRO"))
    .build()
    .context("failed to read config")?;
  let app_cfg: AppConfig = settings
    .try_deserialize()
    .context("failed to deserialise configuration")?;

  let options = StoreOptions {
    unique_document_on_update: app_cfg.unique_document_on_update,
  };

  match app_cfg.backend {
    Backend::Sqlite => {
      let store = SqliteStore::open_with(&app_cfg.path, options)
        .await
        .with_context(|| format!("failed to open store at {:?}", app_cfg.path))?;
      run(store, cli.command).await
    }
    Backend::Table => {
      let store = TableStore::open_with(&app_cfg.path, options)
        .await
        .with_context(|| format!("failed to open store at {:?}", app_cfg.path))?;
      run(store, cli.command).await
    }
  }
}

/// Dispatch a command against either backend — callers see no difference.
async fn run<S>(store: S, command: Command) -> anyhow::Result<()>
where
  S: PersonStore + CredentialStore,
{
  match command {
    Command::HashPassword => unreachable!("handled before store open"),

    Command::RegisterUser { login } => {
      let password = read_password()?;
      let directory = CredentialDirectory::new(store);
      let id = directory.register(&login, &password).await?;
      println!("registered {login} (id {id})");
    }

    Command::Verify { login } => {
      let password = read_password()?;
      let directory = CredentialDirectory::new(store);
      if directory.verify(&login, &password).await? {
        println!("ok");
      } else {
        println!("denied");
      }
    }

    Command::Add(fields) => {
      let id = store.create(fields.into()).await?;
      println!("{id}");
    }

    Command::List => {
      let all = store.read_all().await?;
      println!("{}", serde_json::to_string_pretty(&all)?);
    }

    Command::Update { id, fields } => {
      store.update(id, fields.into()).await?;
    }

    Command::Delete { id } => {
      store.delete(id).await?;
    }

    Command::Report { filter, count_by: group } => {
      let rows = filter.into_filter()?.apply(&store.read_all().await?);
      match group {
        Some(g) => {
          let counts = count_by(&rows, g.into());
          println!("{}", serde_json::to_string_pretty(&counts)?);
        }
        None => println!("{}", serde_json::to_string_pretty(&rows)?),
      }
    }

    Command::Export { filter, title, chart, out } => {
      let rows = filter.into_filter()?.apply(&store.read_all().await?);
      let chart = chart.map(ChartImage::Path);
      let document = render(&title, &rows, chart.as_ref())?;
      tokio::fs::write(&out, document.into_bytes())
        .await
        .with_context(|| format!("failed to write {out:?}"))?;
      tracing::info!(path = %out.display(), rows = rows.len(), "wrote export");
      println!("{}", out.display());
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::error::ErrorKind;

  #[test]
  fn single_filter_flag_parses() {
    Cli::try_parse_from(["cadastro", "report", "--category", "A"]).unwrap();
    Cli::try_parse_from(["cadastro", "report", "--birth-month", "3"]).unwrap();
    Cli::try_parse_from([
      "cadastro",
      "report",
      "--registered-from",
      "2024-01-01",
      "--registered-to",
      "2024-12-31",
    ])
    .unwrap();
  }

  #[test]
  fn conflicting_filter_flags_are_rejected() {
    let err = Cli::try_parse_from([
      "cadastro",
      "report",
      "--category",
      "A",
      "--birth-month",
      "3",
    ])
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArgumentConflict);

    let err = Cli::try_parse_from([
      "cadastro",
      "export",
      "--enrollment-year",
      "2024",
      "--registered-from",
      "2024-01-01",
      "--registered-to",
      "2024-12-31",
    ])
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
  }

  #[test]
  fn date_range_needs_both_ends() {
    let err = Cli::try_parse_from([
      "cadastro",
      "report",
      "--registered-from",
      "2024-01-01",
    ])
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
  }
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead as _, Write as _};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
