//! The conversion pipeline for one component.

use crate::behavior::transform_behavior;
use crate::config::{TransformConfig, TransformOptions};
use crate::emit::{render_markup, render_stylesheet};
use crate::error::{SegmentKind, TransformError};
use crate::markup::{transform_markup, ModelBindings};
use crate::references::{extract_references, ComponentReference};
use crate::script::BehaviorTree;
use crate::style::transform_stylesheet;
use vue_parser::{parse_markup, parse_stylesheet, Segment, SfcDocument, TextSize};

/// The three files produced for a component.
#[derive(Debug, Clone)]
pub struct TransformResult {
    /// The `.wxml` markup.
    pub wxml: String,
    /// The `.wxss` style sheet.
    pub wxss: String,
    /// The `.js` page script.
    pub js: String,
    /// The fields bound with `v-model`.
    pub model_fields: ModelBindings,
    /// The sub-components the component registers.
    pub references: Vec<ComponentReference>,
}

fn segment_base(segment: Option<&Segment>) -> TextSize {
    segment.map_or(TextSize::from(0), |s| s.content_span.start)
}

/// Converts a component.
///
/// Stages run in a fixed order: references are extracted from the script
/// first, markup runs before the behavior so that its `v-model` fields are
/// known. Error spans address the whole `.vue` file.
pub fn transform(
    doc: &SfcDocument,
    config: &TransformConfig,
    options: &TransformOptions,
) -> Result<TransformResult, TransformError> {
    let template_base = segment_base(doc.template.as_ref());
    let script_base = segment_base(doc.script.as_ref());
    let style_base = segment_base(doc.style.as_ref());

    let markup = parse_markup(doc.template_source());
    if !markup.errors.is_empty() {
        return Err(TransformError::Parse {
            segment: SegmentKind::Template,
            errors: markup.errors,
        }
        .shifted(template_base));
    }

    let style = parse_stylesheet(doc.style_source());
    if !style.errors.is_empty() {
        return Err(TransformError::Parse {
            segment: SegmentKind::Style,
            errors: style.errors,
        }
        .shifted(style_base));
    }

    let tree = BehaviorTree::parse(doc.script_source(), doc.script_lang)
        .map_err(|e| e.shifted(script_base))?;
    let references = extract_references(&tree);

    let markup = transform_markup(&markup.fragment, config, options, &references)
        .map_err(|e| e.shifted(template_base))?;
    let style = transform_stylesheet(
        &style.sheet,
        doc.style_scoped,
        config,
        options,
        &references,
    )
    .map_err(|e| e.shifted(style_base))?;
    let js = transform_behavior(&tree, config, &references, &markup.model_fields)
        .map_err(|e| e.shifted(script_base))?;

    log::debug!(
        "transformed `{}`: {} reference(s), {} model field(s)",
        options.name,
        references.len(),
        markup.model_fields.len()
    );

    Ok(TransformResult {
        wxml: render_markup(&markup),
        wxss: render_stylesheet(&style),
        js,
        model_fields: markup.model_fields,
        references,
    })
}
