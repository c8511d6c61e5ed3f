//! yashan-ddl CLI
//!
//! Command-line tool for generating and running YashanDB schema DDL.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use yashan_schema::prelude::*;

/// Schema DDL for YashanDB.
#[derive(Parser)]
#[command(name = "yashan-ddl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON connection configuration (DB_* environment variables otherwise).
    #[arg(short, long, env = "YASHAN_CONFIG")]
    config: Option<PathBuf>,

    /// Table prefix, overriding the configuration.
    #[arg(long)]
    prefix: Option<String>,

    /// Run statements against the server instead of printing them.
    #[arg(long)]
    execute: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a table from a JSON table definition.
    Create {
        /// Table definition file.
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Alter a table from a JSON table diff.
    Alter {
        /// Table diff file.
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Drop a table and its auto-increment sequence.
    Drop {
        /// Table name, without prefix.
        #[arg(short, long)]
        table: String,

        /// Do nothing if the table does not exist.
        #[arg(long)]
        if_exists: bool,
    },

    /// Rewrite a SELECT for ROWNUM pagination.
    Paginate {
        /// The query.
        query: String,

        /// Maximum number of rows.
        #[arg(short, long)]
        limit: Option<u64>,

        /// Rows to skip.
        #[arg(short, long)]
        offset: Option<u64>,
    },

    /// Show (or with --execute, run) a catalog query.
    Catalog {
        /// What to list.
        #[arg(value_enum)]
        kind: CatalogKind,

        /// Table name, for table-scoped queries.
        #[arg(short, long)]
        table: Option<String>,
    },

    /// Print the ODBC data source string.
    Dsn,
}

#[derive(Clone, Copy, ValueEnum)]
enum CatalogKind {
    Tables,
    Views,
    Sequences,
    Columns,
    Indexes,
    ForeignKeys,
    Constraints,
    Databases,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match cli.config {
        Some(ref path) => ConnectionConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ConnectionConfig::from_env()?,
    };
    if let Some(prefix) = cli.prefix {
        config.prefix = prefix;
    }

    let needs_server = !matches!(cli.command, Commands::Dsn | Commands::Paginate { .. });
    if cli.execute && needs_server {
        let conn = connect(&config)?;
        run(&*conn, &config, cli.command, true)
    } else {
        if needs_server {
            info!("Dry run mode - SQL will be printed but not executed.");
        }
        let conn = DryRunConnection::new(config.database.clone())
            .with_prefix(config.prefix.clone())
            .echo(true);
        run(&conn, &config, cli.command, false)
    }
}

#[cfg(feature = "odbc")]
fn connect(config: &ConnectionConfig) -> anyhow::Result<Box<dyn Connection>> {
    Ok(Box::new(OdbcConnection::connect(config)?))
}

#[cfg(not(feature = "odbc"))]
fn connect(_config: &ConnectionConfig) -> anyhow::Result<Box<dyn Connection>> {
    anyhow::bail!("--execute requires yashan-ddl to be built with the `odbc` feature")
}

fn run<C: Connection + ?Sized>(
    conn: &C,
    config: &ConnectionConfig,
    command: Commands,
    live: bool,
) -> anyhow::Result<()> {
    let platform = YashanPlatform::new();
    let schema = SchemaBuilder::new(conn);

    match command {
        Commands::Create { file } => {
            let table: TableSpec = serde_json::from_str(&std::fs::read_to_string(&file)?)?;
            schema.create(&table)?;
            info!(table = %table.name, "Table created");
        }

        Commands::Alter { file } => {
            let diff: TableDiff = serde_json::from_str(&std::fs::read_to_string(&file)?)?;
            schema.alter(&diff)?;
            info!(table = %diff.name, "Table altered");
        }

        Commands::Drop { table, if_exists } => {
            if if_exists {
                if !schema.drop_if_exists(&table)? {
                    info!(table = %table, "Table does not exist");
                }
            } else {
                schema.drop(&table)?;
            }
        }

        Commands::Paginate {
            query,
            limit,
            offset,
        } => {
            println!("{}", platform.modify_limit_query(&query, limit, offset));
        }

        Commands::Catalog { kind, table } => {
            let scoped = || {
                table
                    .as_deref()
                    .map(|t| conn.prefixed(t))
                    .context("--table is required for this catalog query")
            };
            let db = conn.database_name();

            let sql = match kind {
                CatalogKind::Tables => platform.list_tables_sql().to_string(),
                CatalogKind::Views => platform.list_views_sql().to_string(),
                CatalogKind::Sequences => platform.list_sequences_sql(db),
                CatalogKind::Columns => platform.list_table_columns_sql(&scoped()?, db),
                CatalogKind::Indexes => platform.list_table_indexes_sql(&scoped()?),
                CatalogKind::ForeignKeys => platform.list_table_foreign_keys_sql(&scoped()?),
                CatalogKind::Constraints => platform.list_table_constraints_sql(&scoped()?),
                CatalogKind::Databases => platform.list_databases_sql().to_string(),
            };

            if live {
                let rows = conn.select(&sql)?;
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("{sql};");
            }
        }

        Commands::Dsn => {
            println!("{}", config.dsn());
        }
    }

    Ok(())
}
