mod add_locale;
mod check;
mod coverage;
mod dist;
mod import;
mod sync;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use keyspace_cli::{PolicyArg, Project, ReportFormat, config::CONFIG_FILE_NAME};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    add_locale::{AddLocaleOptions, run_add_locale_command},
    check::{ValidateOptions, run_validate_command},
    coverage::{CoverageOptions, run_coverage_command},
    dist::{BuildOptions, run_build_command},
    import::{ImportOptions, run_import_command},
    sync::{SyncOptions, run_sync_command},
};

/// Environment variable holding tracing directives, e.g. `KEYSPACE_LOG=keyspace=debug`.
const LOG_ENV: &str = "KEYSPACE_LOG";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the project configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Project root directory (default: current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build merged per-locale bundles and a manifest.
    Build {
        /// Build one locale only
        #[arg(short, long)]
        locale: Option<String>,

        /// Only include keys of this configured scope
        #[arg(short, long)]
        scope: Option<String>,

        /// Write flat key → value bundles instead of nested trees
        #[arg(long)]
        flat: bool,

        /// Output directory (default: `dist_dir` from the config)
        #[arg(short, long)]
        output: Option<String>,

        /// Version stamped on bundles (default: `version` from the config)
        #[arg(long)]
        bundle_version: Option<String>,
    },

    /// Reconcile target locales with the reference locale.
    Sync {
        /// Sync one locale only
        #[arg(short, long)]
        locale: Option<String>,

        /// What to do with keys the reference no longer has (default: config)
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,

        /// Show changes without writing files
        #[arg(long)]
        dry_run: bool,

        /// Write a JSON report of the changes to this path
        #[arg(long)]
        report_json: Option<String>,
    },

    /// Report translation coverage of target locales.
    Coverage {
        /// Report one locale only
        #[arg(short, long)]
        locale: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Validate category files.
    Validate {
        /// Validate one locale only
        #[arg(short, long)]
        locale: Option<String>,

        /// Exit with status 1 when any issue is found
        #[arg(long)]
        strict: bool,
    },

    /// Create a new locale from the reference locale.
    AddLocale {
        /// Locale to create (e.g. ja, zh-TW)
        locale: Option<String>,

        /// Copy reference values instead of leaving values empty
        #[arg(short = 'e', long)]
        use_reference_values: bool,

        /// List existing locales and their completion
        #[arg(long)]
        list: bool,
    },

    /// Import translations from a `{locale: {nested...}}` JSON document.
    Import {
        /// Override document to import
        #[arg(long)]
        from: String,

        /// Prefix prepended to every imported key (e.g. `cloud`)
        #[arg(long)]
        prefix: Option<String>,

        /// Show changes without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate shell completion script.
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn run(args: Args) -> Result<(), String> {
    if let Commands::Completions { shell } = args.commands {
        let mut command = Args::command();
        clap_complete::generate(shell, &mut command, "keyspace", &mut std::io::stdout());
        return Ok(());
    }

    let project = Project::open(args.root.as_deref(), &args.config)?;

    match args.commands {
        Commands::Build {
            locale,
            scope,
            flat,
            output,
            bundle_version,
        } => run_build_command(
            &project,
            BuildOptions {
                locale,
                scope,
                flat,
                output,
                bundle_version,
            },
        ),
        Commands::Sync {
            locale,
            policy,
            dry_run,
            report_json,
        } => run_sync_command(
            &project,
            SyncOptions {
                locale,
                policy,
                dry_run,
                report_json,
            },
        ),
        Commands::Coverage { locale, format } => {
            run_coverage_command(&project, CoverageOptions { locale, format })
        }
        Commands::Validate { locale, strict } => {
            run_validate_command(&project, ValidateOptions { locale, strict })
        }
        Commands::AddLocale {
            locale,
            use_reference_values,
            list,
        } => run_add_locale_command(
            &project,
            AddLocaleOptions {
                locale,
                use_reference_values,
                list,
            },
        ),
        Commands::Import {
            from,
            prefix,
            dry_run,
        } => run_import_command(
            &project,
            ImportOptions {
                from,
                prefix,
                dry_run,
            },
        ),
        Commands::Completions { .. } => Ok(()),
    }
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
