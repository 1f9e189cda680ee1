//! Config command implementation.

use crate::cli::ConfigArgs;
use crate::config::AppConfig;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the config command.
pub fn execute_config(args: ConfigArgs, config: &AppConfig, formatter: &Formatter) -> Result<()> {
    if args.print {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    match AppConfig::default_path() {
        Some(path) if path.exists() => println!("{}", formatter.info(&format!("Config file: {}", path.display()))),
        Some(path) => println!("{}", formatter.info(&format!("No config file, defaults in use (looked for {})", path.display()))),
        None => println!("{}", formatter.warning("No configuration directory on this system")),
    }
    println!("  Mode:    {}", config.mode);
    println!("  Output:  {}", config.filer.output_base.display());
    println!(
        "  AI:      {}",
        if config.ai.is_usable() {
            "enabled"
        } else if config.ai.enabled {
            "no API key"
        } else {
            "disabled"
        }
    );
    Ok(())
}
