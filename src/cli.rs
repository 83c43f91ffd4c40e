//! Command definitions and dispatch
//!
//! Every command reads a host snapshot, builds a resolver over it and
//! prints JSON to stdout.

use anyhow::Context;
use clap::{Parser, Subcommand};
use libover_resolver::host::{job_folder, normalize};
use libover_resolver::{
    plan, HostSnapshot, InMemoryHost, LibraryRequest, Resolver, ResolverConfig,
    RetrieverRegistry, ScopeId, TrustLevel, Validator,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "libover",
    about = "Resolve and validate folder-scoped shared library version overrides"
)]
pub struct Cli {
    /// Host snapshot (TOML) with global libraries and folders
    #[arg(long, default_value = "libover-host.toml")]
    pub host: PathBuf,

    /// Resolver config (TOML); defaults apply when missing
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where a command runs: a folder path, or a job path whose folder is used.
#[derive(clap::Args, Debug, Clone)]
pub struct ScopeArgs {
    /// Folder path (e.g. "team/app")
    #[arg(short, long, conflicts_with = "job")]
    pub folder: Option<String>,
    /// Job path (e.g. "team/app/build"); its parent folder is used
    #[arg(short, long)]
    pub job: Option<String>,
}

impl ScopeArgs {
    fn scope(&self) -> ScopeId {
        match (&self.folder, &self.job) {
            (_, Some(job)) => job_folder(job),
            (Some(folder), None) => normalize(folder),
            (None, None) => ScopeId::root(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print override output for a scope
    Resolve {
        #[command(flatten)]
        scope: ScopeArgs,
        /// trusted or untrusted
        #[arg(short, long, default_value = "trusted")]
        trust: TrustLevel,
    },
    /// Print overrides merged ahead of defaults (all trust levels if omitted)
    Effective {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(short, long)]
        trust: Option<TrustLevel>,
    },
    /// Print the effective catalog
    Catalog {
        #[command(flatten)]
        scope: ScopeArgs,
        /// Leave out global libraries
        #[arg(long, default_value_t = false)]
        no_global: bool,
    },
    /// Print library names selectable at a scope
    Names {
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Validate a proposed override (exit 1 if it would block saving)
    Validate {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(short, long)]
        name: String,
        #[arg(long, default_value = "")]
        version: String,
    },
    /// Print the libraries a job would load for the given requests
    Plan {
        #[command(flatten)]
        scope: ScopeArgs,
        /// Requests as name or name@version
        requests: Vec<String>,
    },
    /// Print the active resolver config as TOML
    Config,
}

/// Rendered command output and process exit code.
#[derive(Debug)]
pub struct Outcome {
    pub output: String,
    pub exit_code: i32,
}

impl Outcome {
    fn json(value: &impl Serialize) -> anyhow::Result<Self> {
        Ok(Self {
            output: serde_json::to_string_pretty(value)?,
            exit_code: 0,
        })
    }
}

fn load_config(path: Option<&Path>) -> ResolverConfig {
    path.map(ResolverConfig::load).unwrap_or_default()
}

/// Run one command against the snapshot named in `cli`.
pub async fn execute(cli: &Cli) -> anyhow::Result<Outcome> {
    let config = load_config(cli.config.as_deref());
    tracing::debug!("running {:?}", cli.command);
    let build_resolver = || -> anyhow::Result<Resolver> {
        let snapshot = HostSnapshot::load(&cli.host)
            .with_context(|| format!("loading host snapshot {}", cli.host.display()))?;
        let host = Arc::new(InMemoryHost::from_snapshot(snapshot));
        Ok(Resolver::new(host.clone(), host, &config))
    };

    match &cli.command {
        Commands::Config => Ok(Outcome {
            output: config.to_toml(),
            exit_code: 0,
        }),
        Commands::Resolve { scope, trust } => {
            Outcome::json(&build_resolver()?.resolve(&scope.scope(), *trust))
        }
        Commands::Effective { scope, trust } => {
            let resolver = build_resolver()?;
            let scope = scope.scope();
            let configs = match trust {
                Some(trust) => resolver.effective(&scope, *trust),
                None => resolver.job_libraries(&scope),
            };
            Outcome::json(&configs)
        }
        Commands::Catalog { scope, no_global } => {
            let catalog = build_resolver()?.effective_catalog(&scope.scope(), !no_global);
            Outcome::json(&catalog.definitions())
        }
        Commands::Names { scope } => {
            Outcome::json(&build_resolver()?.library_names(&scope.scope()))
        }
        Commands::Validate { scope, name, version } => {
            let validator = Validator::new(
                build_resolver()?,
                Arc::new(RetrieverRegistry::with_builtins()),
                &config,
            );
            let result = validator.validate(name, version, &scope.scope()).await;
            let mut outcome = Outcome::json(&ValidateReport {
                messages: result.messages(),
                blocks_save: result.blocks_save(),
                result: &result,
            })?;
            if result.blocks_save() {
                outcome.exit_code = 1;
            }
            Ok(outcome)
        }
        Commands::Plan { scope, requests } => {
            let requests = requests
                .iter()
                .map(|r| LibraryRequest::parse(r))
                .collect::<Result<Vec<_>, _>>()?;
            let effective = build_resolver()?.job_libraries(&scope.scope());
            Outcome::json(&plan(&effective, &requests)?)
        }
    }
}

#[derive(Serialize)]
struct ValidateReport<'a> {
    result: &'a libover_resolver::ValidationResult,
    blocks_save: bool,
    messages: Vec<String>,
}
