//! zpoolwatch - ZFS pool health checker
//!
//! Checks every ZFS pool once and mails a debounced alert for each pool
//! that is not in the expected state. Run it from cron or a systemd timer.

use clap::Parser;
use zpoolwatch::cli::args::{generate_completions, Cli, Commands};
use zpoolwatch::commands::{run_check, run_config, run_state, run_status};
use zpoolwatch::config::{Config, ConfigBuilder};
use zpoolwatch::error::{AppError, ConfigError, ZpoolError};

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Set log level based on verbose flag
    if cli.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    // Run the appropriate command
    let result = run(&cli);

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    if let Some(Commands::Completions { shell }) = &cli.command {
        generate_completions(*shell);
        return Ok(());
    }

    let config = load_config(cli)?;
    if config.general.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    match &cli.command {
        None | Some(Commands::Check) => run_check(&config, cli.format),

        Some(Commands::Status) => run_status(&config, cli.format),

        Some(Commands::State(args)) => run_state(args, &config, cli.format),

        Some(Commands::Config) => run_config(&config),

        Some(Commands::Completions { .. }) => Ok(()),
    }
}

fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    ConfigBuilder::new()
        .with_file(cli.config.as_deref())?
        .with_verbose(cli.verbose.then_some(true))
        .with_dry_run(cli.dry_run.then_some(true))
        .with_recipient(cli.recipient.clone())
        .with_window(cli.window)
        .with_expected_health(cli.expected_health.clone())
        .with_state_dir(cli.state_dir.clone())
        .build()
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Zpool(ZpoolError::BinaryNotFound(_)) => {
            eprintln!();
            eprintln!("Hint: Make sure ZFS is installed.");
            eprintln!("      Set zpool.path in the config file if zpool lives elsewhere.");
        }
        AppError::UnsupportedPlatform(_) => {
            eprintln!();
            eprintln!("Hint: Supported systems are Linux, FreeBSD, illumos, Solaris and macOS.");
        }
        AppError::Config(ConfigError::FileNotFound(_)) => {
            eprintln!();
            eprintln!("Hint: Check the --config path or the ZPOOLWATCH_CONFIG variable.");
        }
        _ => {}
    }
}
