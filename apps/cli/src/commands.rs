//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use docconf_core::{ConfigBundle, configure, detect_llvm_version, parse_assignments, render};
use docconf_shared::{AppConfig, ToolVersion, init_config, load_config};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docconf: documentation build configuration bundle tool.
#[derive(Parser)]
#[command(
    name = "docconf",
    version,
    about = "Resolve links, versions and toolchain constraints from a documentation config bundle.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Bundle source file (defaults to `bundle_path` from the app config).
    #[arg(long, global = true, env = "DOCCONF_BUNDLE")]
    pub bundle: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Resolve a link template with an identifier.
    Link {
        /// Template name (e.g. ghc-ticket).
        name: String,

        /// Ticket or page identifier substituted into the template.
        id: String,

        /// Link text to use instead of the template's prefix + id.
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Print a library version, or the product version when no library is given.
    Version {
        /// Library identifier (e.g. base).
        library: Option<String>,
    },

    /// List all library versions.
    Libs {
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show the accepted toolchain range, optionally checking a version against it.
    Toolchain {
        /// Version to check (e.g. 13.0.1).
        #[arg(long, conflicts_with = "detect")]
        check: Option<String>,

        /// Run `<TOOL> --version` (e.g. llc) and check the reported version.
        #[arg(long, value_name = "TOOL")]
        detect: Option<PathBuf>,
    },

    /// Validate the bundle.
    Check {
        /// Do not fail on unresolved placeholder versions.
        #[arg(long)]
        allow_placeholders: bool,
    },

    /// Fill placeholder versions and emit the configured bundle.
    Configure {
        /// Placeholder assignment NAME=VALUE (repeatable).
        #[arg(long = "set", value_name = "NAME=VALUE")]
        assignments: Vec<String>,

        /// Write the configured bundle here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Fail if any placeholder is left unresolved.
        #[arg(long)]
        require_all: bool,
    },

    /// Expand link roles and version substitutions in a text file.
    Render {
        /// Input file.
        file: PathBuf,
    },

    /// Dump the loaded bundle.
    Show {
        /// Emit JSON instead of TOML.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docconf=warn",
        1 => "docconf=info",
        2 => "docconf=debug",
        _ => "docconf=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so command output stays pipeable.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config = load_config()?;
    let bundle_path = config.bundle_path(cli.bundle.as_deref());

    match cli.command {
        Command::Link { name, id, label } => cmd_link(&bundle_path, &name, &id, label.as_deref()),
        Command::Version { library } => cmd_version(&bundle_path, library.as_deref()),
        Command::Libs { json } => cmd_libs(&bundle_path, json),
        Command::Toolchain { check, detect } => {
            cmd_toolchain(&bundle_path, check.as_deref(), detect.as_deref())
        }
        Command::Check { allow_placeholders } => cmd_check(&config, &bundle_path, allow_placeholders),
        Command::Configure {
            assignments,
            out,
            require_all,
        } => cmd_configure(&bundle_path, &assignments, out.as_deref(), require_all),
        Command::Render { file } => cmd_render(&bundle_path, &file),
        Command::Show { json } => cmd_show(&bundle_path, json),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

fn load_bundle(path: &Path) -> Result<ConfigBundle> {
    let bundle = ConfigBundle::load(path)
        .wrap_err_with(|| format!("could not load bundle '{}'", path.display()))?;
    Ok(bundle)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_link(bundle_path: &Path, name: &str, id: &str, label: Option<&str>) -> Result<()> {
    let bundle = load_bundle(bundle_path)?;
    let link = bundle.resolve_link(name, id, label)?;
    info!(name, id, url = %link.url, "resolved link");

    println!("{}", link.url);
    println!("{}", link.label);
    Ok(())
}

fn cmd_version(bundle_path: &Path, library: Option<&str>) -> Result<()> {
    let bundle = load_bundle(bundle_path)?;
    match library {
        Some(lib) => {
            let version = bundle.get_version(lib)?;
            if version.is_placeholder() {
                warn!(library = lib, %version, "version is an unresolved placeholder");
            }
            println!("{version}");
        }
        None => println!("{}", bundle.product_version()),
    }
    Ok(())
}

fn cmd_libs(bundle_path: &Path, json: bool) -> Result<()> {
    let bundle = load_bundle(bundle_path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(bundle.lib_versions())?);
        return Ok(());
    }

    let width = bundle.library_ids().map(str::len).max().unwrap_or(0);
    for (lib, version) in bundle.lib_versions() {
        let marker = if version.is_placeholder() {
            "  (unresolved)"
        } else {
            ""
        };
        println!("  {lib:<width$}  {version}{marker}");
    }
    Ok(())
}

fn cmd_toolchain(bundle_path: &Path, check: Option<&str>, detect: Option<&Path>) -> Result<()> {
    let bundle = load_bundle(bundle_path)?;
    let (min, max) = bundle.get_tool_version_range();

    let detected = match (check, detect) {
        (Some(raw), _) => Some(ToolVersion::parse(raw)?),
        (None, Some(tool)) => Some(detect_llvm_version(tool)?),
        (None, None) => None,
    };

    match detected {
        Some(version) => {
            bundle.check_toolchain(&version)?;
            println!("LLVM {version} is supported (accepted: {min} to {max})");
        }
        None => println!("LLVM {min} to {max} (inclusive)"),
    }
    Ok(())
}

fn cmd_check(config: &AppConfig, bundle_path: &Path, allow_placeholders: bool) -> Result<()> {
    let bundle = load_bundle(bundle_path)?;
    bundle.validate_link_urls()?;

    let pending = bundle.unresolved_placeholders();
    if !pending.is_empty() {
        if config.defaults.strict_placeholders && !allow_placeholders {
            bundle.ensure_resolved()?;
        }
        for (library, token) in &pending {
            warn!(%library, %token, "unresolved placeholder allowed");
        }
    }

    let (min, max) = bundle.get_tool_version_range();
    println!("  Bundle OK: {}", bundle_path.display());
    println!("  Version:      {}", bundle.product_version());
    println!("  Templates:    {}", bundle.link_templates().len());
    println!("  Libraries:    {}", bundle.lib_versions().len());
    println!("  Placeholders: {}", pending.len());
    println!("  LLVM:         {min} to {max}");
    Ok(())
}

fn cmd_configure(
    bundle_path: &Path,
    assignments: &[String],
    out: Option<&Path>,
    require_all: bool,
) -> Result<()> {
    let bundle = load_bundle(bundle_path)?;

    let substitutions = parse_assignments(assignments)?;

    let outcome = configure(&bundle, &substitutions)?;
    if require_all {
        outcome.bundle.ensure_resolved()?;
    }

    let content = outcome.bundle.to_toml_string()?;
    match out {
        Some(path) => {
            std::fs::write(path, content)
                .wrap_err_with(|| format!("could not write '{}'", path.display()))?;
            info!(
                path = %path.display(),
                substituted = outcome.substituted.len(),
                unresolved = outcome.unresolved.len(),
                "wrote configured bundle"
            );
        }
        None => print!("{content}"),
    }
    Ok(())
}

fn cmd_render(bundle_path: &Path, file: &Path) -> Result<()> {
    let bundle = load_bundle(bundle_path)?;
    let text = std::fs::read_to_string(file)
        .wrap_err_with(|| format!("could not read '{}'", file.display()))?;

    print!("{}", render(&bundle, &text)?);
    Ok(())
}

fn cmd_show(bundle_path: &Path, json: bool) -> Result<()> {
    let bundle = load_bundle(bundle_path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
    } else {
        print!("{}", bundle.to_toml_string()?);
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_configure_assignments() {
        let cli = Cli::try_parse_from([
            "docconf",
            "--bundle",
            "ghc_config.toml",
            "configure",
            "--set",
            "LIBRARY_parallel_VERSION=3.2.2.0",
            "--set",
            "LIBRARY_stm_VERSION=2.5.1.0",
            "--require-all",
        ])
        .expect("parse");

        assert_eq!(cli.bundle, Some(PathBuf::from("ghc_config.toml")));
        match cli.command {
            Command::Configure {
                assignments,
                out,
                require_all,
            } => {
                assert_eq!(assignments.len(), 2);
                assert!(out.is_none());
                assert!(require_all);
            }
            _ => panic!("expected configure"),
        }
    }

    #[test]
    fn toolchain_check_and_detect_conflict() {
        let result = Cli::try_parse_from([
            "docconf",
            "toolchain",
            "--check",
            "13",
            "--detect",
            "llc",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn link_label_is_optional() {
        let cli = Cli::try_parse_from(["docconf", "link", "ghc-ticket", "12345"]).expect("parse");
        match cli.command {
            Command::Link { name, id, label } => {
                assert_eq!(name, "ghc-ticket");
                assert_eq!(id, "12345");
                assert!(label.is_none());
            }
            _ => panic!("expected link"),
        }
    }
}
