//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::{ConfigFile, ConfigFileError};
use super::keys::{expand_tilde, parse_bool};
use crate::coord::MAX_PRECISION;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [provider] section
    if let Some(section) = ini.section(Some("provider")) {
        if let Some(v) = section.get("url_template") {
            let v = v.trim();
            if !v.starts_with("http://") && !v.starts_with("https://") {
                return Err(invalid(
                    "provider",
                    "url_template",
                    v,
                    "must be a URL starting with 'http://' or 'https://'",
                ));
            }
            config.provider.url_template = v.to_string();
        }
        if let Some(v) = section.get("api_key") {
            let v = v.trim();
            if !v.is_empty() {
                config.provider.api_key = Some(v.to_string());
            }
        }
        if let Some(v) = number::<u64>(
            section,
            "provider",
            "timeout",
            "must be a positive integer (seconds)",
        )? {
            if v == 0 {
                return Err(invalid(
                    "provider",
                    "timeout",
                    "0",
                    "must be at least 1 second",
                ));
            }
            config.provider.timeout = v;
        }
        if let Some(v) = number::<u32>(
            section,
            "provider",
            "max_retries",
            "must be a non-negative integer",
        )? {
            config.provider.max_retries = v;
        }
    }

    // [build] section
    if let Some(section) = ini.section(Some("build")) {
        if let Some(v) = number::<u32>(
            section,
            "build",
            "precision",
            "must be an integer between 0 and 15",
        )? {
            if v > MAX_PRECISION {
                return Err(invalid(
                    "build",
                    "precision",
                    &v.to_string(),
                    "must be an integer between 0 and 15",
                ));
            }
            config.build.precision = v;
        }
        if let Some(v) = number::<u32>(
            section,
            "build",
            "max_dimension",
            "must be a positive integer (pixels)",
        )? {
            if v == 0 {
                return Err(invalid(
                    "build",
                    "max_dimension",
                    "0",
                    "must be at least 1 pixel",
                ));
            }
            config.build.max_dimension = v;
        }
        if let Some(v) = number::<usize>(
            section,
            "build",
            "parallel_fetches",
            "must be a positive integer",
        )? {
            if v == 0 {
                return Err(invalid(
                    "build",
                    "parallel_fetches",
                    "0",
                    "must be at least 1",
                ));
            }
            config.build.parallel_fetches = v;
        }
    }

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.cache.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("keep_tiles") {
            config.cache.keep_tiles = parse_bool(v).ok_or_else(|| {
                invalid(
                    "cache",
                    "keep_tiles",
                    v,
                    "must be true/false, yes/no, 1/0, or on/off",
                )
            })?;
        }
    }

    // [output] section
    if let Some(section) = ini.section(Some("output")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.output.directory = expand_tilde(v);
            }
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

/// Parses an optional numeric key.
fn number<T: FromStr>(
    section: &Properties,
    section_name: &str,
    key: &str,
    reason: &str,
) -> Result<Option<T>, ConfigFileError> {
    match section.get(key) {
        None => Ok(None),
        Some(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(section_name, key, v, reason)),
    }
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(content).unwrap();
        parse_ini(&ini)
    }

    #[test]
    fn test_empty_ini_gives_defaults() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_parse_all_sections() {
        let config = parse(
            r#"
[provider]
url_template = http://localhost:8080/{zoom}/{lat}/{lon}.png
api_key = abc123
timeout = 10
max_retries = 2

[build]
precision = 6
max_dimension = 2000
parallel_fetches = 8

[cache]
directory = /var/cache/tiles
keep_tiles = yes

[output]
directory = /srv/maps

[logging]
file = /var/log/mapstitch.log
"#,
        )
        .unwrap();

        assert_eq!(
            config.provider.url_template,
            "http://localhost:8080/{zoom}/{lat}/{lon}.png"
        );
        assert_eq!(config.provider.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.provider.timeout, 10);
        assert_eq!(config.provider.max_retries, 2);
        assert_eq!(config.build.precision, 6);
        assert_eq!(config.build.max_dimension, 2000);
        assert_eq!(config.build.parallel_fetches, 8);
        assert_eq!(config.cache.directory, PathBuf::from("/var/cache/tiles"));
        assert!(config.cache.keep_tiles);
        assert_eq!(config.output.directory, PathBuf::from("/srv/maps"));
        assert_eq!(config.logging.file, PathBuf::from("/var/log/mapstitch.log"));
    }

    #[test]
    fn test_empty_api_key_stays_unset() {
        let config = parse("[provider]\napi_key =\n").unwrap();
        assert!(config.provider.api_key.is_none());
    }

    #[test]
    fn test_invalid_timeout() {
        let err = parse("[provider]\ntimeout = soon\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::InvalidValue { ref key, .. } if key == "timeout"
        ));
    }

    #[test]
    fn test_zero_parallel_fetches_rejected() {
        let err = parse("[build]\nparallel_fetches = 0\n").unwrap_err();
        assert!(err.to_string().contains("build.parallel_fetches"));
    }

    #[test]
    fn test_precision_upper_bound() {
        assert!(parse("[build]\nprecision = 15\n").is_ok());
        assert!(parse("[build]\nprecision = 16\n").is_err());
    }

    #[test]
    fn test_invalid_url_template() {
        let err = parse("[provider]\nurl_template = ftp://example.com\n").unwrap_err();
        assert!(err.to_string().contains("provider.url_template"));
    }

    #[test]
    fn test_invalid_keep_tiles() {
        assert!(parse("[cache]\nkeep_tiles = maybe\n").is_err());
    }
}
