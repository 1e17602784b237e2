//! Config command - show or validate configuration

use std::path::Path;

use crate::cli::args::ConfigArgs;
use crate::config::{config_search_paths, load_config_or_default, Config};
use crate::{Error, Result};

/// Execute the config command
pub fn execute(args: ConfigArgs, config_path: Option<&Path>) -> Result<()> {
    if args.show_default {
        let rendered = toml::to_string_pretty(&Config::default())
            .map_err(|e| Error::Config(format!("cannot render default configuration: {e}")))?;
        print!("{rendered}");
        return Ok(());
    }

    let loaded = load_config_or_default(config_path)?;

    if args.validate {
        // Expansion catches bad paths, durations and prompt patterns that
        // deserialization alone lets through.
        let expanded = loaded.config.expand()?;
        crate::term::Scrubber::new(&expanded.prompt_pattern)?;
        if loaded.path.as_os_str().is_empty() {
            println!("No configuration file found; built-in defaults are valid.");
        } else {
            println!("Configuration file is valid: {}", loaded.path.display());
        }
        return Ok(());
    }

    if loaded.path.as_os_str().is_empty() {
        println!("# No configuration file found, showing built-in defaults.");
        println!("# Search locations (in priority order):");
        for path in config_search_paths() {
            println!("#   - {}", path.display());
        }
        println!();
    } else {
        println!("# Configuration from: {}", loaded.path.display());
        println!();
    }

    let rendered = toml::to_string_pretty(&loaded.config)
        .map_err(|e| Error::Config(format!("cannot render configuration: {e}")))?;
    print!("{rendered}");
    Ok(())
}
