//! Transformation configuration.
//!
//! The defaults reproduce the stock vue2mina setup: common HTML tags mapped
//! to their mini-program components, `click` bound with `bindtap`, `rem`
//! converted to `rpx` at a ratio of 100 and local `assets` URLs pointed at
//! the CDN.

use indexmap::IndexMap;
use regex::Regex;
use smol_str::SmolStr;
use std::fmt;
use std::sync::Arc;

/// Converts one unit token such as `1.5rem` into its target form.
pub trait UnitConverter: Send + Sync {
    /// The unit this converter handles, e.g. `rem`.
    fn source_unit(&self) -> &str;

    /// Converts a token made of a number immediately followed by
    /// [`source_unit`](Self::source_unit).
    fn convert(&self, token: &str) -> String;
}

/// Rewrites a local image URL.
pub trait UrlRewriter: Send + Sync {
    /// Returns the rewritten URL.
    fn rewrite(&self, url: &str) -> String;
}

impl<F> UrlRewriter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn rewrite(&self, url: &str) -> String {
        self(url)
    }
}

/// Scales a numeric unit into another unit, truncating toward zero.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioUnitConverter {
    /// The source unit.
    pub from: SmolStr,
    /// The target unit.
    pub to: SmolStr,
    /// The multiplier applied to the number.
    pub ratio: f64,
}

impl RatioUnitConverter {
    /// Creates a converter.
    pub fn new(from: impl Into<SmolStr>, to: impl Into<SmolStr>, ratio: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ratio,
        }
    }
}

impl Default for RatioUnitConverter {
    fn default() -> Self {
        Self::new("rem", "rpx", 100.0)
    }
}

impl UnitConverter for RatioUnitConverter {
    fn source_unit(&self) -> &str {
        &self.from
    }

    fn convert(&self, token: &str) -> String {
        let number = token.strip_suffix(self.from.as_str()).unwrap_or(token);
        match number.parse::<f64>() {
            Ok(value) => format!("{}{}", (value * self.ratio).trunc() as i64, self.to),
            Err(_) => token.to_string(),
        }
    }
}

/// Rewrites URLs with a regular expression replacement.
#[derive(Debug, Clone)]
pub struct RegexUrlRewriter {
    pattern: Regex,
    replacement: String,
}

/// The default local-asset pattern: any run of dots followed by `/assets`.
pub const DEFAULT_IMAGE_PATTERN: &str = r"\.*/assets";

/// The default base URL that replaces local asset directories.
pub const DEFAULT_IMAGE_BASE: &str = "http://s.xiaohongchun.com/lsj";

impl RegexUrlRewriter {
    /// Compiles a rewriter; `replacement` may refer to capture groups as `$1`.
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }
}

impl Default for RegexUrlRewriter {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_IMAGE_PATTERN).expect("default image pattern is valid"),
            replacement: DEFAULT_IMAGE_BASE.to_string(),
        }
    }
}

impl UrlRewriter for RegexUrlRewriter {
    fn rewrite(&self, url: &str) -> String {
        self.pattern
            .replace_all(url, self.replacement.as_str())
            .into_owned()
    }
}

/// Whether the markup is wrapped as a reusable template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Wrap the markup in `<template name="…">`.
    #[default]
    Component,
    /// Emit the markup as a page body.
    Page,
}

/// Everything the transformers need to know about the target platform.
#[derive(Clone)]
pub struct TransformConfig {
    /// Source tag name to mini-program tag name.
    pub tag_map: IndexMap<SmolStr, SmolStr>,
    /// Tags removed from the markup together with their subtree.
    pub drop_tags: Vec<SmolStr>,
    /// Source event name to mini-program binding attribute.
    pub event_map: IndexMap<SmolStr, SmolStr>,
    /// Whether local `src` URLs are passed through the URL rewriter.
    pub detect_image_files: bool,
    /// Converts style units.
    pub unit_converter: Arc<dyn UnitConverter>,
    /// Rewrites local image URLs.
    pub url_rewriter: Arc<dyn UrlRewriter>,
    /// Descriptor properties removed from the behavior script.
    pub drop_hooks: Vec<SmolStr>,
}

impl TransformConfig {
    /// Returns true if `tag` is a key or a value of the tag map.
    pub fn is_known_tag(&self, tag: &str) -> bool {
        tag == "template" || self.tag_map.contains_key(tag) || self.tag_map.values().any(|v| v == tag)
    }

    /// Resolves a known tag to its target name.
    pub fn map_tag<'a>(&'a self, tag: &'a str) -> &'a str {
        self.tag_map.get(tag).map_or(tag, SmolStr::as_str)
    }

    /// Returns true if elements named `tag` are dropped.
    pub fn drops_tag(&self, tag: &str) -> bool {
        self.drop_tags.iter().any(|t| t == tag)
    }

    /// Returns true if descriptor properties named `name` are dropped.
    pub fn drops_hook(&self, name: &str) -> bool {
        self.drop_hooks.iter().any(|h| h == name)
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        let pairs = |items: &[(&str, &str)]| -> IndexMap<SmolStr, SmolStr> {
            items
                .iter()
                .map(|(k, v)| (SmolStr::new(k), SmolStr::new(v)))
                .collect()
        };

        Self {
            tag_map: pairs(&[
                ("div", "view"),
                ("img", "image"),
                ("span", "text"),
                ("input", "input"),
                ("textarea", "textarea"),
                ("Swiper", "swiper"),
                ("SwiperItem", "swiper-item"),
            ]),
            drop_tags: vec![SmolStr::new("br")],
            event_map: pairs(&[("click", "bindtap")]),
            detect_image_files: true,
            unit_converter: Arc::new(RatioUnitConverter::default()),
            url_rewriter: Arc::new(RegexUrlRewriter::default()),
            drop_hooks: vec![
                SmolStr::new("beforeRouteEnter"),
                SmolStr::new("beforeRouteLeave"),
            ],
        }
    }
}

impl fmt::Debug for TransformConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformConfig")
            .field("tag_map", &self.tag_map)
            .field("drop_tags", &self.drop_tags)
            .field("event_map", &self.event_map)
            .field("detect_image_files", &self.detect_image_files)
            .field("source_unit", &self.unit_converter.source_unit())
            .field("drop_hooks", &self.drop_hooks)
            .finish_non_exhaustive()
    }
}

/// Per-file options.
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// The logical name of the component, normally the file stem. Used for
    /// the template name and as the style scope prefix.
    pub name: String,
    /// The output mode.
    pub mode: OutputMode,
}

impl TransformOptions {
    /// Options for a component called `name`.
    pub fn new(name: impl Into<String>, mode: OutputMode) -> Self {
        Self {
            name: name.into(),
            mode,
        }
    }
}
