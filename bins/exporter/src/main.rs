//! Folio ledger exporter
//!
//! Reads a JSON bundle, renders the export artifact and either prints it
//! (`--preview`) or persists it when it has no validation errors.
//!
//! Usage: folio-export --input bundle.json [--layout basic] [--start 2024-01-01 --end 2024-01-31]

mod bundle;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_core::export::{ExportConfig, ExportInput, ExportService, KeyPair, LayoutKind, Period};
use folio_core::storage::{ArtifactStore, StorageError, StorageProvider};
use folio_shared::{AppConfig, AppError, AppResult, SigningSettings, StorageSettings};

use crate::bundle::ExportBundle;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LayoutArg {
    Ledger,
    Basic,
}

impl From<LayoutArg> for LayoutKind {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Ledger => Self::Ledger,
            LayoutArg::Basic => Self::Basic,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "folio-export", version, about = "Export journal lines to a signed text file")]
struct Cli {
    /// JSON bundle with profile, chart of accounts, journal lines and column specs
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Built-in layout for sections without column specs (overrides config)
    #[arg(long = "layout", value_enum)]
    layout: Option<LayoutArg>,

    /// First day of the period, YYYY-MM-DD
    #[arg(long = "start", requires = "end")]
    start: Option<NaiveDate>,

    /// Last day of the period, YYYY-MM-DD
    #[arg(long = "end", requires = "start")]
    end: Option<NaiveDate>,

    /// Print the artifact instead of persisting it
    #[arg(long = "preview")]
    preview: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, error_code = err.error_code(), "Export failed");
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = AppConfig::load()?;

    let bundle = ExportBundle::load(&cli.input)
        .map_err(|e| AppError::InvalidInput(format!("{e:#}")))?;

    let mut export_config = ExportConfig::from_settings(&config.export)
        .map_err(|e| AppError::Configuration(e.to_string()))?;
    if let Some(layout) = cli.layout {
        export_config = export_config.with_layout_kind(layout.into());
    }
    if let (Some(start), Some(end)) = (cli.start, cli.end) {
        export_config = export_config.with_period(Some(Period::new(start, end)));
    }

    let key_pair = key_pair(&config.signing);

    let input = ExportInput {
        organization_id: bundle.organization_id,
        profile: &bundle.profile,
        chart_accounts: &bundle.chart_accounts,
        journal_lines: &bundle.journal_lines,
        column_specs: &bundle.column_specs,
        config: &export_config,
    };
    let outcome = ExportService::export(&input, key_pair.as_ref()).await;

    for validation_error in &outcome.errors {
        warn!(
            export_id = %outcome.export_id,
            line = ?validation_error.line,
            "{validation_error}"
        );
    }

    if cli.preview {
        println!("{}", outcome.preview());
        return Ok(());
    }

    let store = ArtifactStore::from_provider(storage_provider(&config.storage)?)
        .map_err(|e| AppError::Storage(e.to_string()))?;

    match store.persist(&outcome).await {
        Ok(key) => {
            info!(
                export_id = %outcome.export_id,
                key = %key,
                location = %store.location(),
                "Export released"
            );
            Ok(())
        }
        Err(StorageError::ReleaseBlocked { count }) => Err(AppError::ReleaseBlocked(count)),
        Err(e) => Err(AppError::Storage(e.to_string())),
    }
}

/// Builds the environment-supplied key pair. Unusable material degrades to
/// digest signing.
fn key_pair(settings: &SigningSettings) -> Option<KeyPair> {
    if !settings.is_configured() {
        info!("No signing key configured, artifacts will carry a SHA-256 digest");
        return None;
    }
    let private_hex = settings.private_key_hex.as_deref()?;
    match KeyPair::from_hex(private_hex, settings.public_key_hex.as_deref()) {
        Ok(key_pair) => Some(key_pair),
        Err(e) => {
            warn!(error = %e, error_code = e.error_code(), "Ignoring signing key");
            None
        }
    }
}

/// Resolves the storage provider, creating the local output directory.
fn storage_provider(settings: &StorageSettings) -> AppResult<StorageProvider> {
    if settings.s3.is_some() {
        return Ok(StorageProvider::from_settings(settings));
    }
    let root = std::path::absolute(&settings.output_dir)
        .map_err(|e| AppError::Storage(format!("{}: {e}", settings.output_dir)))?;
    std::fs::create_dir_all(&root)
        .map_err(|e| AppError::Storage(format!("{}: {e}", root.display())))?;
    Ok(StorageProvider::local_fs(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_period_and_layout() {
        let cli = Cli::try_parse_from([
            "folio-export",
            "--input",
            "bundle.json",
            "--layout",
            "basic",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-31",
            "--preview",
        ])
        .unwrap();

        assert_eq!(cli.input, PathBuf::from("bundle.json"));
        assert!(matches!(cli.layout, Some(LayoutArg::Basic)));
        assert_eq!(cli.start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert!(cli.preview);
    }

    #[test]
    fn test_cli_requires_both_period_bounds() {
        assert!(
            Cli::try_parse_from(["folio-export", "-i", "b.json", "--start", "2024-01-01"]).is_err()
        );
    }

    #[test]
    fn test_key_pair_degrades_on_bad_hex() {
        let settings = SigningSettings {
            private_key_hex: Some("not-hex".to_string()),
            public_key_hex: None,
        };
        assert!(key_pair(&settings).is_none());
        assert!(key_pair(&SigningSettings::default()).is_none());
    }

    #[test]
    fn test_storage_provider_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("exports");
        let settings = StorageSettings {
            output_dir: output.display().to_string(),
            s3: None,
        };

        let provider = storage_provider(&settings).unwrap();
        assert_eq!(provider.name(), "local");
        assert!(output.is_dir());
    }
}
