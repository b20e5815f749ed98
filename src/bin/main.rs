//! cubesql CLI - compile cube/query catalogs to SQL
//!
//! Usage:
//!   cubesql cubes [path]
//!   cubesql fields <cube_name> [path]
//!   cubesql query <query_json> [path]
//!
//! Examples:
//!   cubesql cubes ./catalog
//!   cubesql fields orders ./catalog
//!   cubesql query '{"fields": ["orders.revenue"], "limit": 10}' ./catalog

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cubesql::config::load_first_catalog_dir;
use cubesql::model::CubeCatalog;
use cubesql::{compile_query, Query, RandomAliasSource};

#[derive(Parser)]
#[command(name = "cubesql")]
#[command(about = "A semantic-layer SQL compiler: cubes, joins and queries in, fan-out-safe SQL out")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List cube names from the first catalog found in `path`
    Cubes {
        /// Directory to scan for catalog files (defaults to the current directory)
        path: Option<PathBuf>,
    },
    /// List the dimensions, metrics and window metrics of one cube
    Fields {
        /// Name of the cube
        cube_name: String,
        /// Directory to scan for catalog files (defaults to the current directory)
        path: Option<PathBuf>,
    },
    /// Compile a structured query to SQL
    Query {
        /// Query as a JSON object: {"fields": [...], "filters": [...], "sorts": [...], "limit": N}
        query_json: String,
        /// Directory to scan for catalog files (defaults to the current directory)
        path: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Cubes { path } => cmd_cubes(path),
        Commands::Fields { cube_name, path } => cmd_fields(cube_name, path),
        Commands::Query { query_json, path } => cmd_query(query_json, path),
    }
}

fn resolve_dir(path: Option<PathBuf>) -> PathBuf {
    path.unwrap_or_else(|| PathBuf::from("."))
}

fn load_catalog(path: Option<PathBuf>) -> Result<CubeCatalog, ExitCode> {
    let dir = resolve_dir(path);
    match load_first_catalog_dir(&dir) {
        Ok(Some(catalog)) => Ok(catalog),
        Ok(None) => {
            eprintln!("no cube catalog file found in '{}'", dir.display());
            Err(ExitCode::FAILURE)
        }
        Err(e) => {
            eprintln!("error loading catalog: {}", e);
            Err(ExitCode::FAILURE)
        }
    }
}

fn cmd_cubes(path: Option<PathBuf>) -> ExitCode {
    let catalog = match load_catalog(path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    for cube in &catalog.cubes {
        println!("{}", cube.name);
    }
    ExitCode::SUCCESS
}

fn cmd_fields(cube_name: String, path: Option<PathBuf>) -> ExitCode {
    let catalog = match load_catalog(path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let Some(cube) = catalog.cube(&cube_name) else {
        eprintln!("unknown cube '{}'", cube_name);
        return ExitCode::FAILURE;
    };
    for field in &cube.dimensions {
        println!("{} (dimension)", field.name);
    }
    for field in &cube.metrics {
        println!("{} (metric)", field.name);
    }
    for field in &cube.window_metrics {
        println!("{} (window_metric)", field.name);
    }
    ExitCode::SUCCESS
}

fn cmd_query(query_json: String, path: Option<PathBuf>) -> ExitCode {
    let catalog = match load_catalog(path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let query: Query = match serde_json::from_str(&query_json) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("error parsing query: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut alias_source = RandomAliasSource;
    match compile_query(&catalog, &query, &mut alias_source) {
        Ok(sql) => {
            println!("{}", sql);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("compile error: {}", e);
            ExitCode::FAILURE
        }
    }
}
