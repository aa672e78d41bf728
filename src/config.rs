use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::RegistryError;
use crate::persistence::{FileGateway, MemoryGateway, PersistenceGateway};
use crate::schema::DuplicateScope;
use crate::sources::catalog::SchemaCatalog;

#[derive(Parser, Debug)]
#[command(name = "kg-schema", author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    /// Database connection the selection belongs to
    #[arg(long, global = true)]
    pub connection: Option<String>,

    /// Duplicate check for added patterns: "origin" or "combined"
    #[arg(long, global = true)]
    pub duplicate_scope: Option<String>,

    /// Log filter directive (overrides the config file, not RUST_LOG)
    #[arg(long, global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Parse patterns and print them as triples
    Parse {
        /// Patterns in arrow (`A -[:R]-> B`) or compact (`A-R->B`) form
        patterns: Vec<String>,
    },
    /// Merge pattern sources into one combined schema
    Merge(MergeArgs),
    /// List the predefined schemas
    Catalog,
}

#[derive(Args, Debug, Clone, Default)]
pub struct MergeArgs {
    /// Patterns drawn by the user
    #[arg(long)]
    pub user: Option<PathBuf>,
    /// Triplets introspected from the database
    #[arg(long)]
    pub database: Option<PathBuf>,
    /// Triplets extracted from text
    #[arg(long)]
    pub text: Option<PathBuf>,
    /// Graph-schema JSON document to import
    #[arg(long = "import")]
    pub import: Option<PathBuf>,
    /// Predefined schema to apply (repeatable)
    #[arg(long = "predefined")]
    pub predefined: Vec<String>,
    /// Start from the selection saved for this connection
    #[arg(long)]
    pub restore: bool,
    /// Save the resulting selection for this connection
    #[arg(long)]
    pub persist: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub registry: RegistryConfig,
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistryConfig {
    pub duplicate_scope: DuplicateScope,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceProvider {
    Memory,
    File,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PersistenceConfig {
    pub provider: PersistenceProvider,
    /// Directory used by the file provider.
    pub directory: String,
    /// Connection identifier stored alongside saved selections.
    pub connection: String,
}

impl PersistenceConfig {
    /// Open the configured gateway.
    pub fn open(&self) -> Result<Arc<dyn PersistenceGateway>, RegistryError> {
        let gateway: Arc<dyn PersistenceGateway> = match self.provider {
            PersistenceProvider::Memory => Arc::new(MemoryGateway::new()),
            PersistenceProvider::File => Arc::new(FileGateway::new(&self.directory)?),
        };
        Ok(gateway)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CatalogConfig {
    /// Catalog file (JSON or YAML); the bundled catalog when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl CatalogConfig {
    pub fn load(&self) -> Result<SchemaCatalog, RegistryError> {
        match &self.path {
            Some(path) => SchemaCatalog::from_path(path),
            None => SchemaCatalog::builtin(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    pub filter: String,
    pub json: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    /// Resolve configuration. Priority: CLI flag > `KGS_` env > config file > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("registry.duplicate_scope", "origin")?
            .set_default("persistence.provider", "file")?
            .set_default("persistence.directory", ".kg-schema")?
            .set_default("persistence.connection", "default")?
            .set_default("telemetry.filter", "info,kg_schema_registry=debug")?
            .set_default("telemetry.json", false)?;

        // An explicit file must exist; the working-directory one is optional.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None => builder.add_source(File::with_name("kg-schema").required(false)),
        };

        // E.g. KGS_REGISTRY__DUPLICATE_SCOPE=combined
        builder = builder.add_source(
            Environment::with_prefix("KGS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(connection) = &cli.connection {
            builder = builder.set_override("persistence.connection", connection.as_str())?;
        }
        if let Some(scope) = &cli.duplicate_scope {
            builder = builder.set_override("registry.duplicate_scope", scope.as_str())?;
        }
        if let Some(filter) = &cli.log_filter {
            builder = builder.set_override("telemetry.filter", filter.as_str())?;
        }

        builder.build()?.try_deserialize()
    }
}
