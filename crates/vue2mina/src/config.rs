//! Configuration loading.
//!
//! The configuration file is JSON with the option names of the original
//! tool. Every option is optional; an option that is present replaces the
//! built-in default as a whole.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use mina_transformer::{RatioUnitConverter, RegexUrlRewriter, TransformConfig};
use serde::Deserialize;
use smol_str::SmolStr;
use std::fs;
use std::sync::Arc;
use thiserror::Error;

/// The file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "vue2mina.json";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid configuration JSON.
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `imageUrl.pattern` is not a valid regular expression.
    #[error("invalid imageUrl pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// `cssUnit.ratio` is not a positive number.
    #[error("cssUnit ratio must be a positive number, got {0}")]
    InvalidRatio(f64),
}

/// The configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileConfig {
    /// Event name to binding attribute, e.g. `click` to `bindtap`.
    pub html_event_map: Option<IndexMap<String, String>>,
    /// Source tag to platform tag.
    pub html_dom_map: Option<IndexMap<String, String>>,
    /// Tags removed with their subtree.
    pub html_dom_need_to_be_drop: Option<Vec<String>>,
    /// Whether local image sources are rewritten.
    pub detected_image_file: Option<bool>,
    /// Style unit conversion.
    pub css_unit: Option<CssUnit>,
    /// Image source rewriting.
    pub image_url: Option<ImageUrl>,
    /// Lifecycle hooks removed from the page object.
    pub vue_life_method_need_to_be_drop: Option<Vec<String>>,
}

/// `cssUnit`: numbers in `from` units are multiplied by `ratio` into `to`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CssUnit {
    pub from: String,
    pub to: String,
    pub ratio: f64,
}

/// `imageUrl`: a regex replacement applied to image sources.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageUrl {
    pub pattern: String,
    pub replacement: String,
}

impl FileConfig {
    /// Loads `path`, or `vue2mina.json` in `cwd` when no path is given.
    ///
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&Utf8Path>, cwd: &Utf8Path) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = cwd.join(DEFAULT_CONFIG_FILE);
                if !candidate.is_file() {
                    log::debug!("no {DEFAULT_CONFIG_FILE} in {cwd}, using defaults");
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        log::info!("loaded configuration from {path}");
        Ok(config)
    }

    /// Parses configuration JSON.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Builds the transformer configuration over the defaults.
    pub fn into_transform_config(self) -> Result<TransformConfig, ConfigError> {
        let mut config = TransformConfig::default();

        if let Some(map) = self.html_event_map {
            config.event_map = to_smol_map(map);
        }
        if let Some(map) = self.html_dom_map {
            config.tag_map = to_smol_map(map);
        }
        if let Some(tags) = self.html_dom_need_to_be_drop {
            config.drop_tags = tags.into_iter().map(SmolStr::from).collect();
        }
        if let Some(detect) = self.detected_image_file {
            config.detect_image_files = detect;
        }
        if let Some(unit) = self.css_unit {
            if !(unit.ratio.is_finite() && unit.ratio > 0.0) {
                return Err(ConfigError::InvalidRatio(unit.ratio));
            }
            config.unit_converter = Arc::new(RatioUnitConverter::new(unit.from, unit.to, unit.ratio));
        }
        if let Some(image) = self.image_url {
            config.url_rewriter = Arc::new(RegexUrlRewriter::new(&image.pattern, image.replacement)?);
        }
        if let Some(hooks) = self.vue_life_method_need_to_be_drop {
            config.drop_hooks = hooks.into_iter().map(SmolStr::from).collect();
        }

        Ok(config)
    }
}

fn to_smol_map(map: IndexMap<String, String>) -> IndexMap<SmolStr, SmolStr> {
    map.into_iter()
        .map(|(k, v)| (SmolStr::from(k), SmolStr::from(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_is_default() {
        let config = FileConfig::parse("{}").unwrap();
        assert_eq!(config, FileConfig::default());

        let transform = config.into_transform_config().unwrap();
        assert_eq!(transform.map_tag("div"), "view");
        assert!(transform.drops_hook("beforeRouteEnter"));
    }

    #[test]
    fn test_full_config() {
        let config = FileConfig::parse(
            r#"{
                "htmlEventMap": { "click": "bindtap", "longpress": "bindlongpress" },
                "htmlDomMap": { "div": "view", "p": "text" },
                "htmlDomNeedToBeDrop": ["br", "hr"],
                "detectedImageFile": false,
                "cssUnit": { "from": "px", "to": "rpx", "ratio": 2 },
                "imageUrl": { "pattern": "^@/img", "replacement": "https://cdn.example.com" },
                "vueLifeMethodNeedToBeDrop": ["mounted"]
            }"#,
        )
        .unwrap();

        let transform = config.into_transform_config().unwrap();
        assert_eq!(transform.map_tag("p"), "text");
        assert!(!transform.is_known_tag("img"));
        assert!(transform.drops_tag("hr"));
        assert!(!transform.detect_image_files);
        assert_eq!(transform.unit_converter.source_unit(), "px");
        assert_eq!(transform.unit_converter.convert("12.5px"), "25rpx");
        assert_eq!(
            transform.url_rewriter.rewrite("@/img/a.png"),
            "https://cdn.example.com/a.png"
        );
        assert!(transform.drops_hook("mounted"));
        assert!(!transform.drops_hook("beforeRouteEnter"));
        assert_eq!(
            transform.event_map.get("longpress").map(SmolStr::as_str),
            Some("bindlongpress")
        );
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let err = FileConfig::parse(r#"{ "htmlDomMaps": {} }"#).unwrap_err();
        assert!(err.to_string().contains("unknown field `htmlDomMaps`"), "{err}");
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        assert!(FileConfig::parse(r#"{ "detectedImageFile": "yes" }"#).is_err());
        assert!(FileConfig::parse(r#"{ "cssUnit": { "from": "rem", "to": "rpx" } }"#).is_err());
    }

    #[test]
    fn test_invalid_ratio_and_pattern() {
        let config = FileConfig::parse(r#"{ "cssUnit": { "from": "rem", "to": "rpx", "ratio": 0 } }"#)
            .unwrap();
        assert!(matches!(
            config.into_transform_config(),
            Err(ConfigError::InvalidRatio(_))
        ));

        let config =
            FileConfig::parse(r#"{ "imageUrl": { "pattern": "(", "replacement": "" } }"#).unwrap();
        assert!(matches!(
            config.into_transform_config(),
            Err(ConfigError::Pattern(_))
        ));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();

        // No file: defaults.
        assert_eq!(FileConfig::load(None, &cwd).unwrap(), FileConfig::default());

        fs::write(cwd.join(DEFAULT_CONFIG_FILE), r#"{ "detectedImageFile": false }"#).unwrap();
        let config = FileConfig::load(None, &cwd).unwrap();
        assert_eq!(config.detected_image_file, Some(false));

        let missing = cwd.join("missing.json");
        assert!(matches!(
            FileConfig::load(Some(&missing), &cwd),
            Err(ConfigError::Read { .. })
        ));

        let broken = cwd.join("broken.json");
        fs::write(&broken, "{").unwrap();
        assert!(matches!(
            FileConfig::load(Some(&broken), &cwd),
            Err(ConfigError::Parse { .. })
        ));
    }
}
