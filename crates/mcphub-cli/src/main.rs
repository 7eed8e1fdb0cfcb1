//! mcphub - project-local MCP server aliases
//!
//! Usage:
//!   mcphub init               # Create .mcphub.json in the current directory
//!   mcphub add <alias>        # Add a catalog server to the project
//!   mcphub run <alias> --sse  # Launch a server, optionally behind a gateway

mod interactive;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mcphub_core::commands::{
    AddCommand, AddOptions, HubContext, ListCommand, ListOptions, ListReport, RemoveCommand,
    RunCommand, RunOptions,
};
use mcphub_core::launch::GatewayOptions;
use mcphub_core::launch::gateway::{
    DEFAULT_BASE_URL, DEFAULT_MESSAGE_PATH, DEFAULT_PORT, DEFAULT_SSE_PATH,
};
use mcphub_core::resolve::{ResolvedServerConfig, ResolvedSource};
use mcphub_core::{Error, NOT_SET, missing_required_env};

use crate::interactive::EnvPrompt;

#[derive(Parser)]
#[command(name = "mcphub")]
#[command(about = "Manage project-local MCP server configurations", long_about = None)]
struct Cli {
    /// Catalog file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new .mcphub.json in the current directory
    Init,

    /// Add an MCP server to the project configuration
    Add(AddArgs),

    /// Remove an MCP server from the project configuration
    #[command(alias = "rm")]
    Remove {
        /// Alias of the server to remove
        alias: String,
    },

    /// List configured MCP servers
    List {
        /// Also show every server available in the catalog
        #[arg(short, long)]
        all: bool,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show the resolved configuration of a server
    Show {
        /// Alias of the server
        alias: String,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Run an MCP server, optionally exposed over SSE
    Run(RunArgs),
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[derive(Args)]
struct AddArgs {
    /// Alias to store the server under (also the catalog id unless --package is given)
    alias: String,
    /// Catalog package id
    #[arg(long, short)]
    package: Option<String>,
    /// Environment variable (KEY=VALUE)
    #[arg(long, value_name = "KEY=VALUE")]
    env: Vec<String>,
    /// Description stored with the alias
    #[arg(long)]
    description: Option<String>,
    /// Overwrite an existing alias
    #[arg(long, short)]
    force: bool,
    /// Don't prompt for environment variables
    #[arg(short, long)]
    non_interactive: bool,
    /// Inline stdio command, bypassing the catalog (after --)
    #[arg(last = true)]
    command: Vec<String>,
}

#[derive(Args)]
struct RunArgs {
    /// Alias of the server to run
    alias: String,
    /// Expose the server over SSE through the gateway
    #[arg(long)]
    sse: bool,
    /// Gateway port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
    /// Gateway base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,
    /// Path of the SSE endpoint
    #[arg(long, default_value = DEFAULT_SSE_PATH)]
    sse_path: String,
    /// Path of the message endpoint
    #[arg(long, default_value = DEFAULT_MESSAGE_PATH)]
    message_path: String,
    /// Working directory for the server process
    #[arg(long, value_name = "DIR")]
    cwd: Option<PathBuf>,
    /// Refuse to start when required environment variables are unset
    #[arg(long)]
    strict_env: bool,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcphub=info,mcphub_core=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let ctx = build_context(cli.catalog)?;

    match cli.command {
        Commands::Init => run_init(&ctx),
        Commands::Add(args) => run_add(&ctx, args),
        Commands::Remove { alias } => run_remove(&ctx, &alias),
        Commands::List { all, format } => run_list(&ctx, all, format),
        Commands::Show { alias, format } => run_show(&ctx, &alias, format),
        Commands::Run(args) => run_server(&ctx, args),
    }
}

fn build_context(catalog: Option<PathBuf>) -> Result<HubContext> {
    match catalog {
        Some(path) => {
            let project_root = std::env::current_dir()?;
            Ok(HubContext::with_catalog_path(project_root, Some(path)))
        }
        None => Ok(HubContext::with_defaults()?),
    }
}

fn run_init(ctx: &HubContext) -> Result<()> {
    let report = ctx.init()?;
    if report.created {
        println!("Created new configuration file at: {}", report.path.display());
    } else {
        println!("Configuration file already exists at: {}", report.path.display());
    }
    Ok(())
}

fn run_add(ctx: &HubContext, args: AddArgs) -> Result<()> {
    let mut options = AddOptions::new(&args.alias).with_overwrite(args.force);
    if let Some(package) = &args.package {
        options = options.with_package(package);
    }
    for pair in &args.env {
        let (key, value) = parse_env_pair(pair)?;
        options = options.with_env(key, value);
    }
    if let Some(description) = &args.description {
        options = options.with_description(description);
    }
    if !args.command.is_empty() {
        options = options.with_command(&args.command);
    }

    let cmd = AddCommand::new(ctx);
    let preview = match cmd.preview(&options) {
        Ok(preview) => preview,
        Err(err) => {
            if err.is_not_found() {
                print_available_catalog(ctx);
            }
            return Err(err.into());
        }
    };

    if !args.non_interactive {
        let missing = missing_required_env(&preview);
        for (key, value) in EnvPrompt::new().collect(&args.alias, &missing)? {
            options = options.with_env(key, value);
        }
    }

    let report = cmd.execute(&options)?;
    if report.changed {
        println!("Added configuration for '{}' to {}", report.alias, report.path.display());
    } else {
        println!("'{}' is already configured", report.alias);
    }

    if !report.missing_env.is_empty() {
        println!("\nWarning: The following environment variables are required but not set:");
        for var in &report.missing_env {
            println!("- {var}");
        }
        println!("\nYou can either:");
        println!("1. Set them in your environment before using this server");
        println!("2. Re-run 'mcphub add {} --force --env KEY=VALUE'", report.alias);
        println!("3. Edit {} manually to set the values", report.path.display());
    }

    Ok(())
}

fn run_remove(ctx: &HubContext, alias: &str) -> Result<()> {
    let report = RemoveCommand::new(ctx).execute(alias)?;
    if report.removed {
        println!("Removed configuration for '{}'", report.alias);
        return Ok(());
    }

    if !report.remaining.is_empty() {
        eprintln!("Currently configured servers:");
        for name in &report.remaining {
            eprintln!("- {name}");
        }
    }
    Err(Error::AliasNotFound {
        alias: report.alias,
    }
    .into())
}

fn run_list(ctx: &HubContext, all: bool, format: OutputFormat) -> Result<()> {
    let report = ListCommand::new(ctx).execute(&ListOptions::new().with_all(all))?;

    match format {
        OutputFormat::Table => print_list_table(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn print_list_table(report: &ListReport) {
    println!("Configured MCP servers:");
    if report.configured.is_empty() {
        println!("  No servers configured in local .mcphub.json");
    }
    for server in &report.configured {
        match (&server.package_id, &server.command) {
            (_, Some(command)) => println!("- {} (command: {})", server.alias, command),
            (Some(package), None) if *package != server.alias => {
                println!("- {} ({})", server.alias, package)
            }
            _ => println!("- {}", server.alias),
        }
    }

    if let Some(available) = &report.available {
        println!("\nAvailable preconfigured MCP servers:");
        if available.is_empty() {
            println!("  No preconfigured servers available");
        }
        for server in available {
            match &server.description {
                Some(description) => println!("- {}: {}", server.package_id, description),
                None => println!("- {}", server.package_id),
            }
        }
    }
}

fn run_show(ctx: &HubContext, alias: &str, format: OutputFormat) -> Result<()> {
    let resolved = resolve_or_suggest(ctx, alias)?;

    match format {
        OutputFormat::Table => print_resolved(&resolved),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resolved)?),
    }
    Ok(())
}

fn print_resolved(resolved: &ResolvedServerConfig) {
    println!("{}", resolved.alias());
    match resolved.source() {
        ResolvedSource::Catalog { package_id } => println!("  source:  catalog ({package_id})"),
        ResolvedSource::Inline => println!("  source:  inline"),
    }
    println!("  command: {}", resolved.command());
    if !resolved.args().is_empty() {
        println!("  args:    {}", resolved.args().join(" "));
    }
    if let Some(description) = resolved.description() {
        println!("  description: {description}");
    }
    if !resolved.tags().is_empty() {
        let tags: Vec<&str> = resolved.tags().iter().map(String::as_str).collect();
        println!("  tags:    {}", tags.join(", "));
    }
    if let Some(repo_url) = resolved.repo_url() {
        println!("  repo:    {repo_url}");
    }
    if let Some(setup_script) = resolved.setup_script() {
        println!("  setup:   {setup_script}");
    }
    if !resolved.env().is_empty() {
        println!("  env:");
        for (key, value) in resolved.env() {
            if value == NOT_SET {
                println!("    {key} = <not set>");
            } else {
                println!("    {key} = {value}");
            }
        }
    }
}

fn run_server(ctx: &HubContext, args: RunArgs) -> Result<()> {
    let mut options = RunOptions::new(&args.alias);
    if args.sse {
        options = options.with_gateway(GatewayOptions {
            port: args.port,
            base_url: args.base_url.clone(),
            sse_path: args.sse_path.clone(),
            message_path: args.message_path.clone(),
            ..GatewayOptions::default()
        });
    }
    if let Some(cwd) = &args.cwd {
        options = options.with_cwd(cwd);
    }

    let plan = match RunCommand::new(ctx).plan(&options) {
        Ok(plan) => plan,
        Err(err) => {
            if err.is_not_found() {
                print_configured(ctx);
            }
            return Err(err.into());
        }
    };

    if !plan.missing_env.is_empty() {
        let missing = plan.missing_env.join(", ");
        if args.strict_env {
            anyhow::bail!(
                "Required environment variables are not set for '{}': {}",
                args.alias,
                missing
            );
        }
        eprintln!("Warning: required environment variables are not set: {missing}");
    }

    tracing::debug!(alias = %args.alias, cwd = ?plan.launch.cwd, "spawning server");
    println!("Running command: {}", plan.launch.display());
    let status = plan
        .launch
        .to_command()
        .status()
        .with_context(|| format!("Failed to start '{}'", plan.launch.program))?;

    if !status.success() {
        anyhow::bail!("Server '{}' exited with {}", args.alias, status);
    }
    Ok(())
}

fn resolve_or_suggest(ctx: &HubContext, alias: &str) -> Result<ResolvedServerConfig> {
    ctx.resolve(alias).map_err(|err| {
        if err.is_not_found() {
            print_configured(ctx);
        }
        err.into()
    })
}

fn print_configured(ctx: &HubContext) {
    let Ok(store) = ctx.open_store() else {
        return;
    };
    let aliases = store.list();
    if aliases.is_empty() {
        return;
    }
    eprintln!("Currently configured servers:");
    for alias in aliases {
        eprintln!("- {alias}");
    }
}

fn print_available_catalog(ctx: &HubContext) {
    let catalog = match ctx.catalog() {
        Ok(catalog) => catalog,
        Err(err) => {
            tracing::debug!(error = %err, "catalog unavailable for suggestions");
            return;
        }
    };
    let ids = catalog.package_ids();
    if ids.is_empty() {
        eprintln!("No preconfigured servers available");
        return;
    }
    eprintln!("Available preconfigured servers:");
    for id in ids {
        eprintln!("- {id}");
    }
}

/// Parse a `KEY=VALUE` pair. The value may itself contain `=`.
fn parse_env_pair(pair: &str) -> Result<(String, String)> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Invalid env '{}', expected KEY=VALUE", pair))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Invalid env '{}', key must not be empty", pair);
    }
    Ok((key.to_string(), value.to_string()))
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
    fn parse_env_pair_splits_on_first_equals() {
        let (key, value) = parse_env_pair("URL=postgres://u:p@h/db?x=1").unwrap();
        assert_eq!(key, "URL");
        assert_eq!(value, "postgres://u:p@h/db?x=1");
    }

    #[test]
    fn parse_env_pair_allows_empty_value() {
        let (key, value) = parse_env_pair("EMPTY=").unwrap();
        assert_eq!(key, "EMPTY");
        assert_eq!(value, "");
    }

    #[test]
    fn parse_env_pair_rejects_malformed() {
        assert!(parse_env_pair("NOEQUALS").is_err());
        assert!(parse_env_pair("=value").is_err());
    }

    #[test]
    fn run_args_defaults() {
        let cli = Cli::try_parse_from(["mcphub", "run", "mytool"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert!(!args.sse);
        assert_eq!(args.port, 8000);
        assert_eq!(args.base_url, "http://localhost:8000");
        assert_eq!(args.sse_path, "/sse");
        assert_eq!(args.message_path, "/message");
    }

    #[test]
    fn add_args_take_inline_command() {
        let cli = Cli::try_parse_from([
            "mcphub", "add", "local", "-n", "--env", "A=1", "--", "python", "server.py",
        ])
        .unwrap();
        let Commands::Add(args) = cli.command else {
            panic!("expected add command");
        };
        assert!(args.non_interactive);
        assert_eq!(args.env, vec!["A=1"]);
        assert_eq!(args.command, vec!["python", "server.py"]);
    }
}
