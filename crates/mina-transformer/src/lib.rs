//! Vue single-file component to WeChat mini-program transformation.
//!
//! This crate rewrites a parsed component into the three files a
//! mini-program page needs. It handles:
//! - Extracting the sub-components a component imports and registers
//! - Rewriting template markup: tags, directives, events, classes and images
//! - Scoping style sheet selectors and converting units
//! - Rewriting the behavior script into a `Page({ … })` registration
//!
//! # Example
//!
//! ```
//! use mina_transformer::{transform, OutputMode, TransformConfig, TransformOptions};
//! use vue_parser::extract_segments;
//!
//! let source = r#"
//! <template><div class="box" @click="go">{{ title }}</div></template>
//! <script>export default { methods: { go() { this.title = 'hi' } } }</script>
//! <style scoped>.box { width: 1rem; }</style>
//! "#;
//!
//! let doc = extract_segments(source);
//! let options = TransformOptions::new("card", OutputMode::Component);
//! let result = transform(&doc, &TransformConfig::default(), &options).unwrap();
//! assert!(result.wxml.contains("bindtap=\"go\""));
//! assert!(result.wxss.contains(".card-box"));
//! assert!(result.js.contains("this.setData({ title: 'hi' })"));
//! ```

mod behavior;
mod binding;
mod config;
mod emit;
mod error;
mod markup;
mod references;
mod script;
mod style;
mod transform;

pub use behavior::{transform_behavior, DescriptorSection};
pub use binding::{
    rewrite_filters, BindingExpr, FilterCall, Interpolation, InterpolationPart, LoopSpec,
};
pub use config::{
    OutputMode, RatioUnitConverter, RegexUrlRewriter, TransformConfig, TransformOptions,
    UnitConverter, UrlRewriter, DEFAULT_IMAGE_BASE, DEFAULT_IMAGE_PATTERN,
};
pub use emit::{render_markup, render_stylesheet};
pub use error::{SegmentKind, TransformError};
pub use markup::{model_handler_name, transform_markup, MarkupOutput, ModelBindings};
pub use references::{extract_references, ComponentReference};
pub use script::{BehaviorTree, Descriptor};
pub use style::{scope_selector, transform_stylesheet, StyleOutput};
pub use transform::{transform, TransformResult};
