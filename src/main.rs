use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use fintrack::cli::{
    handle_balances_command, handle_export_command, handle_import_command,
    handle_recurring_command, handle_transaction_command, materialize_due_today, ExportFormat,
    RecurringCommands, TransactionCommands,
};
use fintrack::config::paths::{FintrackPaths, DATA_DIR_ENV};
use fintrack::config::settings::Settings;
use fintrack::storage::Storage;

#[derive(Parser)]
#[command(
    name = "fintrack",
    version,
    about = "Track cash, bank and savings balances with recurring payments",
    long_about = "fintrack keeps three account balances in step with a log of \
                  income, expenses and transfers, and records recurring monthly \
                  and yearly payments automatically when they come due."
)]
struct Cli {
    /// Directory holding config and data (overrides the platform default)
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory, zero balances and default settings
    Init,

    /// Show current configuration and paths
    Config,

    /// Show account balances
    Balances,

    /// Transaction management commands
    #[command(subcommand, name = "txn", alias = "transaction")]
    Txn(TransactionCommands),

    /// Recurring income and expense commands
    #[command(subcommand)]
    Recurring(RecurringCommands),

    /// Export the ledger
    Export {
        /// Output format
        #[arg(value_enum, default_value = "json")]
        format: ExportFormat,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the ledger with a JSON or YAML export
    Import {
        /// Path to the export file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = match cli.data_dir {
        Some(dir) => FintrackPaths::with_base_dir(dir),
        None => FintrackPaths::new()?,
    };
    let settings = Settings::load_or_create(&paths)?;
    fintrack::init_tracing(&settings.log_filter);

    let Some(command) = cli.command else {
        println!("fintrack - cash, bank and savings in one ledger");
        println!();
        println!("Run 'fintrack --help' for usage information.");
        println!("Run 'fintrack init' to get started.");
        return Ok(());
    };

    match command {
        Commands::Init => {
            println!("Initializing fintrack at: {}", paths.base_dir().display());
            fintrack::storage::initialize_storage(&paths)?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("All balances start at zero. Record an opening balance with:");
            println!("  fintrack txn add income 100.00 --account bank --category \"Opening balance\"");
            return Ok(());
        }
        Commands::Config => {
            println!("fintrack Configuration");
            println!("======================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!("Initialized:      {}", paths.is_initialized());
            println!();
            println!("Settings:");
            println!("  Currency symbol:   {}", settings.currency_symbol);
            println!("  Date format:       {}", settings.date_format);
            println!("  Upcoming limit:    {}", settings.upcoming_limit);
            println!("  Auto-materialize:  {}", settings.auto_materialize);
            println!("  Detect duplicates: {}", settings.detect_duplicates);
            println!("  Log filter:        {}", settings.log_filter);
            return Ok(());
        }
        _ => {}
    }

    let storage = Storage::new(paths)?;
    storage.load_all()?;

    if settings.auto_materialize {
        materialize_due_today(&storage, &settings)?;
    }

    match command {
        Commands::Balances => handle_balances_command(&storage, &settings)?,
        Commands::Txn(cmd) => handle_transaction_command(&storage, &settings, cmd)?,
        Commands::Recurring(cmd) => handle_recurring_command(&storage, &settings, cmd)?,
        Commands::Export { format, output } => handle_export_command(&storage, format, output)?,
        Commands::Import { file } => handle_import_command(&storage, &file)?,
        Commands::Init | Commands::Config => {}
    }

    Ok(())
}
