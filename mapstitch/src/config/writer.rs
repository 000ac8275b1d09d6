//! INI serialization logic for converting `ConfigFile` → INI string.

use super::file::ConfigFile;
use super::keys::path_to_display;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let api_key = config.provider.api_key.as_deref().unwrap_or("");
    let keep_tiles = if config.cache.keep_tiles {
        "true"
    } else {
        "false"
    };

    format!(
        r#"[provider]
; Static map URL. Placeholders: {{lat}} {{lon}} {{zoom}} {{width}} {{height}} {{map_type}} {{api_key}}
url_template = {}
; API key for the map service. Falls back to $GMAP_KEY when empty.
api_key = {}
; Per-request timeout in seconds
timeout = {}
; Retries for failed requests (0 disables)
max_retries = {}

[build]
; Decimal places coordinates are rounded to
precision = {}
; Largest width or height of a stitched image, in pixels
max_dimension = {}
; Tiles fetched concurrently
parallel_fetches = {}

[cache]
; Directory fetched tiles are written to
directory = {}
; Keep tiles after they have been stitched
keep_tiles = {}

[output]
; Directory stitched images are saved to
directory = {}

[logging]
file = {}
"#,
        config.provider.url_template,
        api_key,
        config.provider.timeout,
        config.provider.max_retries,
        config.build.precision,
        config.build.max_dimension,
        config.build.parallel_fetches,
        path_to_display(&config.cache.directory),
        keep_tiles,
        path_to_display(&config.output.directory),
        path_to_display(&config.logging.file),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_config_has_all_sections() {
        let content = to_config_string(&ConfigFile::default());
        for section in ["[provider]", "[build]", "[cache]", "[output]", "[logging]"] {
            assert!(content.contains(section), "missing {}", section);
        }
        assert!(content.contains("max_dimension = 3000"));
        assert!(content.contains("keep_tiles = false"));
    }

    #[test]
    fn test_placeholder_comment_is_literal() {
        let content = to_config_string(&ConfigFile::default());
        assert!(content.contains("; Static map URL. Placeholders: {lat} {lon}"));
    }
}
