//! trackdb CLI - Normalize a flat track export into relational tables
//!
//! # Commands
//!
//! ```bash
//! trackdb normalize dataset.csv -o out     # CSV tables + SQL script
//! trackdb parse dataset.csv                # Parsed source rows as JSON
//! trackdb schema                           # DDL only
//! ```

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use trackdb::logs::RUN_LOG;
use trackdb::{normalize_file, parse_source_file, schema_ddl, RunOptions, DEFAULT_SQL_FILE};

#[derive(Parser)]
#[command(name = "trackdb")]
#[command(about = "Normalize a flat music catalog into relational tables and SQL", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a source CSV into six tables and a SQL load script
    Normalize {
        /// Input CSV file
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Separator between artist names in the `artists` column
        #[arg(short, long, default_value = ";")]
        artist_delimiter: char,

        /// CSV field delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Skip the CSV tables
        #[arg(long)]
        no_csv: bool,

        /// Skip the SQL script
        #[arg(long)]
        no_sql: bool,

        /// File name of the SQL script
        #[arg(long, default_value = DEFAULT_SQL_FILE)]
        sql_name: String,

        /// Write a JSON run report to this file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Only print errors
        #[arg(short, long)]
        quiet: bool,
    },

    /// Parse a source CSV and output its rows as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV field delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the CREATE TABLE/INDEX statements
    Schema {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Normalize {
            input,
            output_dir,
            artist_delimiter,
            delimiter,
            no_csv,
            no_sql,
            sql_name,
            report,
            quiet,
        } => {
            let options = RunOptions {
                input,
                output_dir,
                artist_delimiter,
                field_delimiter: delimiter,
                write_csv: !no_csv,
                write_sql: !no_sql,
                sql_file_name: sql_name,
            };
            cmd_normalize(&options, report.as_deref(), quiet)
        }

        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),

        Commands::Schema { output } => write_output(&schema_ddl(), output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_normalize(
    options: &RunOptions,
    report: Option<&Path>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    RUN_LOG.set_quiet(quiet);

    let summary = normalize_file(options)?;

    if let Some(path) = report {
        let json = serde_json::json!({
            "summary": summary,
            "log": RUN_LOG.take_entries(),
        });
        fs::write(path, serde_json::to_string_pretty(&json)?)?;
        if !quiet {
            eprintln!("📝 Report written to: {}", path.display());
        }
    }

    if !quiet {
        eprintln!("\n✨ Done!");
    }
    Ok(())
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let result = parse_source_file(input, delimiter)?;

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        match result.delimiter {
            '\t' => "\\t".to_string(),
            c => c.to_string(),
        },
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    eprintln!("   Columns: {}", result.headers.join(", "));
    if result.coerced_nulls > 0 {
        eprintln!("   ⚠️  {} unparseable values read as null", result.coerced_nulls);
    }
    eprintln!("✅ Parsed {} rows", result.rows.len());

    let json = serde_json::to_string_pretty(&result.rows)?;
    write_output(&json, output)
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
