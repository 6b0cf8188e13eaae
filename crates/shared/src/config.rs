//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Export layout defaults.
    #[serde(default)]
    pub export: ExportSettings,
    /// Artifact storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Optional signing key material.
    #[serde(default)]
    pub signing: SigningSettings,
}

/// Export layout defaults, overridable per invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportSettings {
    /// Built-in layout used when no column specs exist (`ledger` or `basic`).
    #[serde(default = "default_layout_kind")]
    pub layout_kind: String,
    /// Pad every cell to its declared width instead of delimiting.
    #[serde(default = "default_true")]
    pub fixed_width: bool,
    /// Render decimals with `,` instead of `.`.
    #[serde(default = "default_true")]
    pub decimal_comma: bool,
    /// Cell delimiter for non fixed-width output.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Account used for entry lines with a blank account code.
    #[serde(default = "default_entry_account")]
    pub entry_default_account: String,
    /// Account used for expense lines with a blank account code.
    #[serde(default = "default_expense_account")]
    pub expense_default_account: String,
}

fn default_layout_kind() -> String {
    "ledger".to_string()
}

fn default_true() -> bool {
    true
}

fn default_delimiter() -> String {
    "|".to_string()
}

fn default_entry_account() -> String {
    "1.1.1".to_string()
}

fn default_expense_account() -> String {
    "3.1.1".to_string()
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            layout_kind: default_layout_kind(),
            fixed_width: true,
            decimal_comma: true,
            delimiter: default_delimiter(),
            entry_default_account: default_entry_account(),
            expense_default_account: default_expense_account(),
        }
    }
}

/// Artifact storage configuration.
///
/// Artifacts go to `output_dir` unless an S3-compatible bucket is configured.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Directory released artifacts are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// S3-compatible bucket (R2, MinIO, AWS S3).
    #[serde(default)]
    pub s3: Option<S3Settings>,
}

/// S3-compatible bucket settings.
#[derive(Debug, Clone, Deserialize)]
pub struct S3Settings {
    /// Endpoint URL.
    pub endpoint: String,
    /// Bucket name.
    pub bucket: String,
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Region, `auto` for R2.
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    "auto".to_string()
}

fn default_output_dir() -> String {
    "./exports".to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            s3: None,
        }
    }
}

/// Signing key material supplied by the hosting environment.
///
/// Both fields are hex encoded. When `private_key_hex` is absent the export
/// falls back to a plain SHA-256 digest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SigningSettings {
    /// 32-byte P-256 private scalar.
    pub private_key_hex: Option<String>,
    /// SEC1-encoded public point matching the private key.
    pub public_key_hex: Option<String>,
}

impl SigningSettings {
    /// Returns true if a private key has been configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.private_key_hex
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("FOLIO")
                    .separator("__")
                    .try_parsing(false),
            )
            .build()?;

        config.try_deserialize()
    }
}
