//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, and `config path` commands
//! for viewing and modifying `~/.mapstitch/config.ini` from the command line.
//! The API key is masked whenever it is printed.

use clap::Subcommand;
use mapstitch::config::{config_file_path, ConfigFile, ConfigKey, API_KEY_ENV};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., build.parallel_fetches)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., build.parallel_fetches)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let key = parse_key(&key)?;
            let config = ConfigFile::load()?;
            println!("{}", display_value(key, &config));
        }
        ConfigCommands::Set { key, value } => {
            let key = parse_key(&key)?;
            let mut config = ConfigFile::load()?;
            key.set(&mut config, &value)
                .map_err(|e| CliError::Config(e.to_string()))?;
            config.save()?;
            println!("Set {} = {}", key.name(), display_value(key, &config));
        }
        ConfigCommands::List => {
            let config = ConfigFile::load()?;
            print!("{}", render_list(&config));
        }
        ConfigCommands::Path => println!("{}", config_file_path().display()),
    }
    Ok(())
}

/// Value as shown to the user: masked for the API key, `(not set)` when empty.
fn display_value(key: ConfigKey, config: &ConfigFile) -> String {
    let value = key.get(config);

    if key == ConfigKey::ProviderApiKey {
        if value.is_empty() {
            return match config.api_key() {
                Some(env_key) => format!("{} (from ${})", mask(&env_key), API_KEY_ENV),
                None => "(not set)".to_string(),
            };
        }
        return mask(&value);
    }

    if value.is_empty() {
        "(not set)".to_string()
    } else {
        value
    }
}

fn mask(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{}", tail)
}

/// All settings grouped by INI section.
fn render_list(config: &ConfigFile) -> String {
    let mut out = String::from("Configuration Settings\n======================\n");
    let mut current_section = "";

    for &key in ConfigKey::all() {
        let section = key.section();
        if section != current_section {
            out.push_str(&format!("\n[{}]\n", section));
            current_section = section;
        }
        out.push_str(&format!(
            "  {} = {}\n",
            key.key_name(),
            display_value(key, config)
        ));
    }

    out
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'mapstitch config list' to see available keys.",
            key
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_key() {
        assert_eq!(
            parse_key("build.max_dimension").unwrap(),
            ConfigKey::BuildMaxDimension
        );
    }

    #[test]
    fn test_parse_unknown_key() {
        let err = parse_key("build.nope").unwrap_err();
        assert!(err.to_string().contains("mapstitch config list"));
    }

    #[test]
    fn test_api_key_is_masked() {
        let mut config = ConfigFile::default();
        config.provider.api_key = Some("AIzaSyExample1234".to_string());

        assert_eq!(display_value(ConfigKey::ProviderApiKey, &config), "****1234");
        assert_eq!(mask("abc"), "****");
    }

    #[test]
    fn test_list_groups_sections() {
        let text = render_list(&ConfigFile::default());

        assert!(text.contains("[provider]\n"));
        assert!(text.contains("[build]\n  precision = 8\n"));
        assert!(text.contains("  max_dimension = 3000\n"));
        assert!(text.find("[build]").unwrap() < text.find("[cache]").unwrap());
    }
}
