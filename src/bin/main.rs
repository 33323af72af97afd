//! dumpcat CLI - build a filter catalog for dump datasets
//!
//! Usage:
//!   dumpcat build --dataset <name>... [--meta-data <table>...] [--lm-meta-data <table>...]
//!                 [--re-meta-data <table>...] [--pw-meta-data <table>...]
//!   dumpcat probe <table-expr> [--column <name>...]
//!
//! Examples:
//!   dumpcat build --dataset d1 --dataset d2 --meta-data meta_d1 --meta-data meta_d2
//!   dumpcat build --dataset d1 --lm-meta-data "SELECT * FROM lm WHERE dump_name = 'd1'" --lenient
//!   dumpcat probe meta_d1 --column country

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dumpcat::catalog::{CatalogOptions, GroupCatalogLoader, GroupInput, GroupKind};
use dumpcat::config::Settings;
use dumpcat::sql;
use dumpcat::worker::{WorkerClient, WorkerQueryClient};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dumpcat")]
#[command(about = "dumpcat - build filter catalogs for perception-evaluation dump tables")]
#[command(version)]
struct Cli {
    /// Config file (default: DUMPCAT_CONFIG, ./dumpcat.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe every group's exemplar table and print the catalog as JSON
    Build {
        /// Dataset names, in order
        #[arg(short, long = "dataset", required = true)]
        datasets: Vec<String>,

        /// meta_data table per dataset, same order as --dataset
        #[arg(long = "meta-data")]
        meta_data: Vec<String>,

        /// lm_meta_data table per dataset
        #[arg(long = "lm-meta-data")]
        lm_meta_data: Vec<String>,

        /// re_meta_data table per dataset
        #[arg(long = "re-meta-data")]
        re_meta_data: Vec<String>,

        /// pw_meta_data table per dataset
        #[arg(long = "pw-meta-data")]
        pw_meta_data: Vec<String>,

        /// Data source to query (overrides catalog.data_source)
        #[arg(long)]
        data_source: Option<String>,

        /// Distinct values kept per column (overrides catalog.max_distinct_values)
        #[arg(long)]
        max_distinct: Option<usize>,

        /// Substitute empty metadata for failed groups instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Print the probe SQL for a table expression without running it
    Probe {
        /// Table name or sub-query
        table: String,

        /// String columns to include in the distinct-values probe
        #[arg(long = "column")]
        columns: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dumpcat=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            datasets,
            meta_data,
            lm_meta_data,
            re_meta_data,
            pw_meta_data,
            data_source,
            max_distinct,
            lenient,
        } => {
            let input = GroupInput::new(datasets)
                .with_group(GroupKind::MetaData, meta_data)
                .with_group(GroupKind::LmMetaData, lm_meta_data)
                .with_group(GroupKind::ReMetaData, re_meta_data)
                .with_group(GroupKind::PwMetaData, pw_meta_data);
            cmd_build(cli.config, input, data_source, max_distinct, lenient).await
        }
        Commands::Probe { table, columns } => cmd_probe(table, columns),
    }
}

fn load_settings(path: Option<PathBuf>) -> Result<Settings, ExitCode> {
    let result = match path {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    result.map_err(|e| {
        eprintln!("Config error: {}", e);
        ExitCode::FAILURE
    })
}

async fn cmd_build(
    config: Option<PathBuf>,
    input: GroupInput,
    data_source: Option<String>,
    max_distinct: Option<usize>,
    lenient: bool,
) -> ExitCode {
    let mut settings = match load_settings(config) {
        Ok(s) => s,
        Err(code) => return code,
    };
    if let Some(source) = data_source {
        settings.catalog.data_source = source;
    }
    if let Some(max) = max_distinct {
        settings.catalog.max_distinct_values = max;
    }

    let options = match CatalogOptions::from_settings(&settings.catalog) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let worker = match WorkerClient::spawn_with_settings(&settings).await {
        Ok(w) => Arc::new(w),
        Err(e) => {
            eprintln!("Worker error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let client = match WorkerQueryClient::from_settings(worker, &settings) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcomes = GroupCatalogLoader::new(client, options)
        .load_settled(&input)
        .await;

    let catalog = if lenient {
        let (catalog, failures) = outcomes.into_catalog_lenient();
        for failure in &failures {
            eprintln!("warning: {} replaced with empty metadata", failure);
        }
        catalog
    } else {
        match outcomes.into_catalog() {
            Ok(catalog) => catalog,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    };

    match serde_json::to_string_pretty(&catalog) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize catalog: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_probe(table: String, columns: Vec<String>) -> ExitCode {
    if table.trim().is_empty() {
        eprintln!("Error: table expression is empty");
        return ExitCode::FAILURE;
    }

    println!("-- schema probe");
    println!("{};", sql::schema_probe(&table));

    if !columns.is_empty() {
        let lowered: Vec<String> = columns.iter().map(|c| c.to_lowercase()).collect();
        let pairs = columns
            .iter()
            .zip(&lowered)
            .map(|(source, alias)| (source.as_str(), alias.as_str()));
        println!();
        println!("-- distinct-values probe");
        println!("{};", sql::distinct_probe(&table, pairs));
    }

    ExitCode::SUCCESS
}
