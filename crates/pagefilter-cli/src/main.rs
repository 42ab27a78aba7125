//! pagefilter CLI: entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use serde_json::Value;
use uuid::Uuid;

use pagefilter::OrderDirection;
use pagefilter_cli::commands::{self, PageRequest};
use pagefilter_cli::config;

#[derive(Parser)]
#[command(
    name = "pagefilter",
    about = "Check filter expressions and page through tenant-scoped JSON records",
    version
)]
struct Cli {
    /// Path to the schema graph JSON (env: PAGEFILTER_SCHEMA).
    #[arg(short, long, global = true)]
    schema: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, resolve and coerce a filter; print the typed predicate.
    Check {
        /// Filter expression, e.g. 'name="soup" OR createdAt>2021-02-22'.
        filter: String,

        /// Root entity the filter applies to.
        #[arg(short, long)]
        entity: String,
    },

    /// Page through the records file and print the result.
    Page {
        /// Root entity of the records.
        #[arg(short, long)]
        entity: String,

        /// Tenant (group) id. Only its records are visible.
        #[arg(short, long)]
        tenant: Uuid,

        /// Records file, a JSON array (env: PAGEFILTER_DATA).
        #[arg(short, long)]
        data: Option<String>,

        /// Paginator config JSON (env: PAGEFILTER_CONFIG).
        #[arg(short, long)]
        config: Option<String>,

        /// Page number, -1 for the last page.
        #[arg(long, allow_negative_numbers = true)]
        page: Option<i64>,

        /// Page size, -1 for everything.
        #[arg(long, allow_negative_numbers = true)]
        per_page: Option<i64>,

        /// Attribute to sort by, e.g. createdAt or recipe.name.
        #[arg(long)]
        order_by: Option<String>,

        /// ASC or DESC.
        #[arg(long)]
        order_direction: Option<OrderDirection>,

        /// Filter expression.
        #[arg(short, long)]
        filter: Option<String>,

        /// Base route for next/previous links, e.g. /api/foods.
        #[arg(long)]
        route: Option<String>,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   pagefilter completions bash > ~/.local/share/bash-completion/completions/pagefilter
    ///   pagefilter completions zsh > ~/.zfunc/_pagefilter
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check { filter, entity } => {
            let schema = config::load_schema(&config::resolve_schema_path(cli.schema.as_deref()))?;
            match commands::check(&schema, &entity, &filter) {
                Ok(out) => print_json(&out)?,
                Err(e) => {
                    print_json(&commands::error_body(e.code(), &e.to_string()))?;
                    std::process::exit(2);
                }
            }
        }

        Commands::Page {
            entity,
            tenant,
            data,
            config: config_path,
            page,
            per_page,
            order_by,
            order_direction,
            filter,
            route,
        } => {
            let schema = config::load_schema(&config::resolve_schema_path(cli.schema.as_deref()))?;
            let source = config::load_records(&config::resolve_data_path(data.as_deref()))?;
            let paginator_config = config::load_config(
                config::resolve_config_path(config_path.as_deref()).as_deref(),
            )?;
            tracing::info!(entity = %entity, records = source.len(), "paging records");

            let request = PageRequest {
                entity,
                tenant,
                page,
                per_page,
                order_by,
                order_direction,
                filter,
                route,
            };
            match commands::page(&schema, &source, paginator_config, &request).await {
                Ok(out) => print_json(&out)?,
                Err(e) if e.status() < 500 => {
                    print_json(&commands::page_error_body(&e))?;
                    std::process::exit(2);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "pagefilter", &mut std::io::stdout());
        }
    }

    Ok(())
}
