//! pm-import CLI - Bulk property import for ENERGY STAR Portfolio Manager
//!
//! # Main Commands
//!
//! ```bash
//! pm-import validate properties.csv     # Check a CSV before importing
//! pm-import import properties.csv       # Create every row as a property
//! pm-import sample                      # Write a template CSV
//! ```
//!
//! # Account Commands
//!
//! ```bash
//! pm-import test                        # Check credentials
//! pm-import info                        # Show account information
//! pm-import list                        # List existing properties
//! pm-import export                      # Export existing properties to CSV
//! pm-import encode properties.csv       # Print the XML without sending it
//! ```
//!
//! Credentials are read from `PM_USERNAME` / `PM_PASSWORD` (or a `.env`
//! file). The test environment is used unless `--production` is given.

use clap::{Parser, Subcommand};
use portfolio_import::{
    encode_with, export_properties, export_results, is_known_field, load_csv, validate_csv,
    write_sample_csv, ClientConfig, EncodeOptions, Environment, ImportOptions, ImportSummary, Importer,
    LogBroadcaster, NotesMode, PortfolioManagerClient,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

type CmdResult = Result<(), Box<dyn Error>>;

const RULE_WIDTH: usize = 60;

#[derive(Parser)]
#[command(name = "pm-import")]
#[command(about = "Import property CSV files into ENERGY STAR Portfolio Manager", long_about = None)]
struct Cli {
    /// Use the production web service instead of the test one
    #[arg(long, global = true)]
    production: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a property CSV file
    Validate {
        /// Input CSV file
        input: PathBuf,
    },

    /// Print the XML documents for a CSV file (nothing is sent)
    Encode {
        /// Input CSV file
        input: PathBuf,

        /// Only encode this row (1-based)
        #[arg(short, long)]
        row: Option<usize>,

        /// How notes are written: legacy, cdata or text
        #[arg(long, default_value = "cdata")]
        notes_mode: NotesMode,
    },

    /// Create one property per CSV row
    Import {
        /// Input CSV file
        input: PathBuf,

        /// Target account (default: the authenticated account)
        #[arg(long)]
        account_id: Option<u64>,

        /// Seconds to wait between two submissions
        #[arg(long, default_value = "1.0")]
        delay: f64,

        /// Results file
        #[arg(short, long, default_value = "import_results.csv")]
        output: PathBuf,

        /// How notes are written: legacy, cdata or text
        #[arg(long, default_value = "cdata")]
        notes_mode: NotesMode,
    },

    /// Test the connection and credentials
    Test,

    /// Show account information
    Info,

    /// List the properties of an account
    List {
        /// Account to list (default: the authenticated account)
        #[arg(long)]
        account_id: Option<u64>,
    },

    /// Export existing properties to CSV
    Export {
        /// Output file
        #[arg(short, long, default_value = "existing_properties.csv")]
        output: PathBuf,
    },

    /// Write a sample CSV template
    Sample {
        /// Output file
        #[arg(short, long, default_value = "sample_properties.csv")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    let production = cli.production;

    let result = match cli.command {
        Commands::Validate { input } => cmd_validate(&input),

        Commands::Encode {
            input,
            row,
            notes_mode,
        } => cmd_encode(&input, row, notes_mode),

        Commands::Import {
            input,
            account_id,
            delay,
            output,
            notes_mode,
        } => cmd_import(production, &input, account_id, delay, &output, notes_mode),

        Commands::Test => cmd_test(production),

        Commands::Info => cmd_info(production),

        Commands::List { account_id } => cmd_list(production, account_id),

        Commands::Export { output } => cmd_export(production, &output),

        Commands::Sample { output } => cmd_sample(&output),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn client_config(production: bool) -> Result<ClientConfig, Box<dyn Error>> {
    let config = ClientConfig::from_env()?;
    if production {
        return Ok(config.with_environment(Environment::Production));
    }
    Ok(config)
}

fn connect(production: bool) -> Result<PortfolioManagerClient, Box<dyn Error>> {
    let client = PortfolioManagerClient::connect(client_config(production)?)?;
    eprintln!("🌐 Environment: {}", client.config().environment);
    Ok(client)
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn cmd_validate(input: &Path) -> CmdResult {
    let report = validate_csv(input);

    println!("{}", rule());
    println!("CSV VALIDATION RESULTS");
    println!("{}", rule());
    println!("File: {}", input.display());
    print!("{}", report);
    println!("{}", rule());

    if !report.valid {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_encode(input: &Path, row: Option<usize>, notes: NotesMode) -> CmdResult {
    eprintln!("📄 Encoding: {}", input.display());

    let table = load_csv(input)?;
    let options = EncodeOptions { notes };

    let ignored: Vec<&str> = table
        .headers
        .iter()
        .map(String::as_str)
        .filter(|h| !is_known_field(h))
        .collect();
    if !ignored.is_empty() {
        eprintln!("⚠️  Ignored columns: {}", ignored.join(", "));
    }

    let selected: Vec<usize> = match row {
        Some(n) if n >= 1 && n <= table.rows.len() => vec![n - 1],
        Some(n) => return Err(format!("Row {} out of range (1-{})", n, table.rows.len()).into()),
        None => (0..table.rows.len()).collect(),
    };

    let mut failed = 0;
    for idx in &selected {
        match encode_with(&table.rows[*idx], &options) {
            Ok(xml) => {
                println!("<!-- Row {} -->", idx + 1);
                println!("{}", xml);
            }
            Err(e) => {
                eprintln!("❌ Row {}: {}", idx + 1, e);
                failed += 1;
            }
        }
    }

    eprintln!("✅ Encoded {} of {} rows", selected.len() - failed, selected.len());
    Ok(())
}

fn cmd_import(
    production: bool,
    input: &Path,
    account_id: Option<u64>,
    delay: f64,
    output: &Path,
    notes: NotesMode,
) -> CmdResult {
    let delay = Duration::try_from_secs_f64(delay)?;
    let options = ImportOptions {
        delay,
        encode: EncodeOptions { notes },
    };

    let importer = Importer::new(connect(production)?, options);
    eprintln!("📄 Importing: {}", input.display());
    eprintln!(
        "   Delay: {:.1}s, notes: {}",
        importer.options().delay.as_secs_f64(),
        importer.options().encode.notes
    );

    let results = importer.import_csv(input, account_id);
    let summary = ImportSummary::from_results(&results);

    println!();
    println!("{}", rule());
    println!("IMPORT SUMMARY");
    println!("{}", rule());
    println!("Total properties: {}", summary.total);
    println!("Successful: {}", summary.succeeded);
    println!("Failed: {}", summary.failed);
    println!("{}", rule());

    if !results.is_empty() {
        export_results(&results, output)?;
        println!("💾 Results exported to {}", output.display());
    }

    Ok(())
}

fn cmd_test(production: bool) -> CmdResult {
    let client = connect(production)?;
    client.test_connection()?;
    println!("✓ Connection successful!");
    Ok(())
}

fn cmd_info(production: bool) -> CmdResult {
    let client = connect(production)?;
    let info = client.get_account_info()?;

    println!("Account Information:");
    if let serde_json::Value::Object(fields) = serde_json::to_value(&info)? {
        for (key, value) in fields {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            println!("  {}: {}", key, text);
        }
    }

    Ok(())
}

fn cmd_list(production: bool, account_id: Option<u64>) -> CmdResult {
    let client = connect(production)?;
    let account_id = match account_id {
        Some(id) => id,
        None => client.get_account_id()?,
    };

    let properties = client.list_properties(account_id)?;
    println!("Found {} properties:", properties.len());
    for property in &properties {
        println!(
            "  ID: {} - {}",
            property.property_id,
            property.name.as_deref().unwrap_or("Unknown")
        );
    }

    Ok(())
}

fn cmd_export(production: bool, output: &Path) -> CmdResult {
    let client = connect(production)?;
    let account_id = client.get_account_id()?;

    eprintln!("📦 Exporting properties to {}", output.display());
    export_properties(&client, account_id, output, &LogBroadcaster::new())?;

    Ok(())
}

fn cmd_sample(output: &Path) -> CmdResult {
    write_sample_csv(output)?;
    println!("Sample CSV created: {}", output.display());
    Ok(())
}
