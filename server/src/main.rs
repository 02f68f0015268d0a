use clap::ArgAction;
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use log::{error, warn};
use roombook_server::cli;
use roombook_server::cli_error::CliError;

fn main() {
    let args = CliArgs::parse();
    let dotenv_result = dotenv();

    let env = env_logger::Env::new().filter_or(
        "RUST_LOG",
        match args.global_opts.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        },
    );
    env_logger::Builder::from_env(env).init();
    if let Err(e) = dotenv_result {
        warn!("Could not read .env file: {}", e);
    }

    if let Err(e) = run(args.command) {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Serve => {
            cli::database_migration::check_migration_state()?;
            roombook_server::web::serve()
        }
        Command::MigrateDatabase => cli::database_migration::run_migrations(),
        Command::ListUsers => cli::manage_users::print_user_list(),
        Command::CreateUser => cli::manage_users::create_user(),
    }
}

/// Room and event booking web application
#[derive(Debug, Parser)]
#[clap(name = "roombook", version)]
pub struct CliArgs {
    #[clap(flatten)]
    global_opts: GlobalOpts,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the booking web application
    Serve,
    /// Create or upgrade the database schema
    MigrateDatabase,
    /// List all registered users
    ListUsers,
    /// Interactively create a new user account
    CreateUser,
}

#[derive(Debug, Args)]
struct GlobalOpts {
    /// Verbosity level (can be specified multiple times)
    #[clap(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,
}
