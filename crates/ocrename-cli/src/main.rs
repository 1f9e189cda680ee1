//! OCRename - rename medication-delivery PDFs after the patient ID and acta number.

use clap::Parser;
use ocrename_cli::commands;
use ocrename_cli::{logging, AppConfig, Cli, CliError, CliFormat, Command, Formatter};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> ocrename_cli::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    config.validate()?;

    let format = cli.format.unwrap_or(CliFormat::Table);
    let formatter = Formatter::new(format, config.color);

    if let Some(Command::Config(args)) = cli.command {
        return commands::execute_config(args, &config, &formatter);
    }

    logging::init(&config.log_level, config.log_file.as_deref())?;

    if cli.files.is_empty() {
        return Err(CliError::InvalidInput(
            "no documents given; pass PDF files or directories".to_string(),
        ));
    }

    // Failed documents are reported in the summary, not through the exit code.
    commands::execute_run(&cli.files, &config, &formatter, format != CliFormat::Quiet)?;
    Ok(())
}
