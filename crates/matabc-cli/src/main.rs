mod commands;
mod logging;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "matabc",
    version,
    about = "Material classification and per-category ABC analysis"
)]
struct Cli {
    /// Log classifier decisions (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every row of a CSV or spreadsheet and rank each category
    Classify {
        /// Path to .csv, .xlsx, .xlsm, .xls or .ods file
        input_file: PathBuf,

        /// Worksheet name (default: uservo2000, then 分類物料, then the first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Product code column header
        #[arg(long, value_name = "HEADER")]
        product_col: Option<String>,

        /// Currency column header
        #[arg(long, value_name = "HEADER")]
        currency_col: Option<String>,

        /// Quantity column header
        #[arg(long, value_name = "HEADER")]
        qty_col: Option<String>,

        /// Unit price column header
        #[arg(long, value_name = "HEADER")]
        price_col: Option<String>,

        /// Custom JSON rule file (default: built-in rules)
        #[arg(short, long = "rules", value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write ranked records to a .csv or .json file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Print per-rule decisions for the first N records
        #[arg(long, value_name = "N", default_value_t = 0)]
        trace: usize,
    },
    /// List the worksheets of a spreadsheet
    Sheets {
        /// Path to spreadsheet file
        input_file: PathBuf,
    },
    /// Manage and inspect rule sets
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// Show the built-in rules
    List,
    /// Write the built-in rules as JSON (stdout unless --out)
    Export {
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Check a rule file for missing or unusable rules
    Validate {
        /// Path to JSON rule file
        file: PathBuf,
    },
    /// Classify a single product code / currency pair and explain the result
    Test {
        product_code: String,
        currency: String,

        /// Custom JSON rule file (default: built-in rules)
        #[arg(short, long = "rules", value_name = "FILE")]
        rules: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Classify {
            input_file,
            sheet,
            product_col,
            currency_col,
            qty_col,
            price_col,
            rules,
            output,
            out,
            trace,
        } => commands::classify::run(commands::classify::Args {
            input_file,
            sheet,
            columns: [product_col, currency_col, qty_col, price_col],
            rules,
            output,
            out,
            trace,
        }),
        Commands::Sheets { input_file } => commands::sheets::run(&input_file),
        Commands::Rules { action } => match action {
            RulesAction::List => commands::rules::list(),
            RulesAction::Export { out } => commands::rules::export(out.as_deref()),
            RulesAction::Validate { file } => commands::rules::validate(&file),
            RulesAction::Test {
                product_code,
                currency,
                rules,
            } => commands::rules::test(&product_code, &currency, rules.as_deref()),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
