//! Template markup transformation.
//!
//! Walks the parsed template once, pre-order, building a new tree in the
//! mini-program dialect and recording every `v-model` field on the way.

use crate::binding::{rewrite_filters, BindingExpr, LoopSpec};
use crate::config::{OutputMode, TransformConfig, TransformOptions};
use crate::error::TransformError;
use crate::references::ComponentReference;
use indexmap::IndexSet;
use smol_str::SmolStr;
use vue_parser::{Attribute, Element, Fragment, Node, Span, Text};

/// The fields bound with `v-model`, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelBindings {
    fields: IndexSet<String>,
}

impl ModelBindings {
    /// Records a field; repeated fields are kept once.
    pub fn insert(&mut self, field: impl Into<String>) -> bool {
        self.fields.insert(field.into())
    }

    /// Iterates over the fields.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ModelBindings {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// The name of the generated change handler for a model field.
///
/// Characters that cannot appear in an identifier become `_`, so
/// `form.name` is handled by `changeModel_form_name`.
pub fn model_handler_name(field: &str) -> String {
    let sanitized: String = field
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    format!("changeModel_{sanitized}")
}

/// The transformed template.
#[derive(Debug, Clone)]
pub struct MarkupOutput {
    /// `<import>` lines, one per referenced component.
    pub imports: Vec<String>,
    /// The rewritten markup, already wrapped in component mode.
    pub fragment: Fragment,
    /// The `v-model` fields found.
    pub model_fields: ModelBindings,
}

/// Rewrites a template fragment.
pub fn transform_markup(
    fragment: &Fragment,
    config: &TransformConfig,
    options: &TransformOptions,
    references: &[ComponentReference],
) -> Result<MarkupOutput, TransformError> {
    let mut transformer = MarkupTransformer {
        config,
        prefix: &options.name,
        model_fields: ModelBindings::default(),
    };

    let nodes = transformer.transform_children(&fragment.nodes)?;
    let fragment = match options.mode {
        OutputMode::Component => {
            let mut wrapper = Element::new("template").with_attribute("name", options.name.as_str());
            wrapper.children = nodes;
            Fragment {
                nodes: vec![Node::Element(wrapper)],
                span: fragment.span,
            }
        }
        OutputMode::Page => Fragment {
            nodes,
            span: fragment.span,
        },
    };

    let imports = references
        .iter()
        .map(|r| format!("<import src=\"{}.wxml\" />", r.stem()))
        .collect();

    log::debug!(
        "markup transformed: {} model field(s)",
        transformer.model_fields.len()
    );

    Ok(MarkupOutput {
        imports,
        fragment,
        model_fields: transformer.model_fields,
    })
}

struct MarkupTransformer<'a> {
    config: &'a TransformConfig,
    prefix: &'a str,
    model_fields: ModelBindings,
}

/// What an element becomes.
enum Target {
    /// A platform component, renamed.
    Known(SmolStr),
    /// A `<template is="…">` inclusion of a sub-component.
    Inclusion { data: Vec<String> },
}

impl MarkupTransformer<'_> {
    fn transform_children(&mut self, nodes: &[Node]) -> Result<Vec<Node>, TransformError> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Node::Element(el) if self.config.drops_tag(&el.name) => {
                    log::trace!("dropping <{}>", el.name);
                }
                Node::Element(el) => out.push(Node::Element(self.transform_element(el)?)),
                Node::Text(text) => out.push(Node::Text(Text {
                    data: rewrite_filters(&text.data),
                    span: text.span,
                })),
                Node::Comment(comment) => out.push(Node::Comment(comment.clone())),
            }
        }
        Ok(out)
    }

    fn transform_element(&mut self, el: &Element) -> Result<Element, TransformError> {
        let mut target = if self.config.is_known_tag(&el.name) {
            Target::Known(SmolStr::new(self.config.map_tag(&el.name)))
        } else {
            log::trace!("<{}> becomes a template inclusion", el.name);
            Target::Inclusion { data: Vec::new() }
        };

        let mut out = Element {
            name: match &target {
                Target::Known(name) => name.clone(),
                Target::Inclusion { .. } => SmolStr::new_static("template"),
            },
            attributes: Vec::new(),
            children: Vec::new(),
            span: el.span,
        };
        if matches!(target, Target::Inclusion { .. }) {
            out.set_attribute("is", el.name.as_str());
        }

        for attr in &el.attributes {
            self.transform_attribute(attr, &mut out, &mut target)?;
        }

        if let Target::Inclusion { data } = &target {
            out.set_attribute("data", moustache(&data.join(", ")));
        }

        out.children = self.transform_children(&el.children)?;
        Ok(out)
    }

    fn transform_attribute(
        &mut self,
        attr: &Attribute,
        out: &mut Element,
        target: &mut Target,
    ) -> Result<(), TransformError> {
        let name = attr.name.as_str();
        let value = attr.value.as_deref().unwrap_or("");

        if let Some(key) = name.strip_prefix(':').or_else(|| name.strip_prefix("v-bind:")) {
            let expr = BindingExpr::parse(value).to_string();
            match target {
                Target::Inclusion { data } => data.push(format!("{key}:{expr}")),
                Target::Known(_) => out.set_attribute(key, moustache(&expr)),
            }
            return Ok(());
        }

        if let Some(event) = name.strip_prefix('@').or_else(|| name.strip_prefix("v-on:")) {
            let binding = self.event_binding(event);
            out.set_attribute(binding, value);
            return Ok(());
        }

        match name {
            "v-if" => {
                out.set_attribute("wx:if", moustache(&BindingExpr::parse(value).to_string()));
            }
            "v-for" => {
                let loop_spec = LoopSpec::parse(value).ok_or_else(|| TransformError::InvalidLoop {
                    value: value.to_string(),
                    span: attr.span,
                })?;
                out.set_attribute(
                    "wx:for",
                    moustache(&BindingExpr::parse(&loop_spec.list).to_string()),
                );
                out.set_attribute("wx:for-item", loop_spec.item);
                if let Some(index) = loop_spec.index {
                    out.set_attribute("wx:for-index", index);
                }
            }
            "v-model" => {
                let field = value.trim();
                match out.name.as_str() {
                    "input" => out.set_attribute("bindinput", model_handler_name(field)),
                    "textarea" => out.set_attribute("bindblur", model_handler_name(field)),
                    _ => {}
                }
                if self.model_fields.insert(field) {
                    log::trace!("registered model field `{field}`");
                }
            }
            "class" => match &attr.value {
                Some(class) => out.set_attribute(
                    "class",
                    format!("{}_{}", self.prefix, rewrite_filters(class)),
                ),
                None => out.attributes.push(attr.clone()),
            },
            "src" if self.config.detect_image_files && !is_absolute_url(value) => {
                let rewritten = self.config.url_rewriter.rewrite(value);
                log::trace!("image url `{value}` -> `{rewritten}`");
                out.set_attribute("src", rewritten);
            }
            "is" | "data" if matches!(target, Target::Inclusion { .. }) => {}
            _ => match target {
                Target::Inclusion { data } if name != "src" => {
                    let literal = match &attr.value {
                        Some(v) => format!("'{}'", v.replace('\'', "\\'")),
                        None => "true".to_string(),
                    };
                    data.push(format!("{name}:{literal}"));
                }
                _ => match &attr.value {
                    Some(v) => out.set_attribute(name, rewrite_filters(v)),
                    None => {
                        out.attributes.retain(|a| a.name != name);
                        out.attributes.push(Attribute {
                            name: attr.name.clone(),
                            value: None,
                            span: Span::default(),
                        });
                    }
                },
            },
        }

        Ok(())
    }

    /// Maps `click.stop` style event names to a binding attribute.
    fn event_binding(&self, event: &str) -> String {
        let mut parts = event.split('.');
        let name = parts.next().unwrap_or_default();
        let stop = parts.any(|m| m == "stop");

        let binding = match self.config.event_map.get(name) {
            Some(mapped) => mapped.to_string(),
            None => format!("bind{name}"),
        };

        match binding.strip_prefix("bind") {
            Some(rest) if stop => format!("catch{rest}"),
            _ => binding,
        }
    }
}

fn moustache(expr: &str) -> String {
    format!("{{{{{expr}}}}}")
}

/// Returns true for URLs that point off the local project.
fn is_absolute_url(url: &str) -> bool {
    let url = url.trim_start();
    ["http://", "https://", "//", "data:"]
        .iter()
        .any(|prefix| url.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vue_parser::parse_markup;

    fn transform(source: &str, mode: OutputMode) -> MarkupOutput {
        let parsed = parse_markup(source);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        transform_markup(
            &parsed.fragment,
            &TransformConfig::default(),
            &TransformOptions::new("profile", mode),
            &[],
        )
        .unwrap()
    }

    fn page(source: &str) -> MarkupOutput {
        transform(source, OutputMode::Page)
    }

    fn first(output: &MarkupOutput) -> &Element {
        output.fragment.elements().next().unwrap()
    }

    fn attrs(el: &Element) -> Vec<(&str, Option<&str>)> {
        el.attributes
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_deref()))
            .collect()
    }

    #[test]
    fn test_tag_mapping() {
        let out = page("<div><span>a</span><img src=\"http://x/a.png\"></div>");
        let root = first(&out);
        assert_eq!(root.name, "view");
        let names: Vec<_> = root.child_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["text", "image"]);
    }

    #[test]
    fn test_tag_mapping_is_idempotent_on_target_names() {
        let out = page("<view><swiper-item></swiper-item></view>");
        let root = first(&out);
        assert_eq!(root.name, "view");
        assert_eq!(root.child_elements().next().unwrap().name, "swiper-item");
        assert!(root.attribute("is").is_none());
    }

    #[test]
    fn test_unknown_tag_becomes_inclusion() {
        let out = page(r#"<UserCard :user="current" title="Hi" v-if="shown"></UserCard>"#);
        let el = first(&out);
        assert_eq!(el.name, "template");
        assert_eq!(
            attrs(el),
            vec![
                ("is", Some("UserCard")),
                ("wx:if", Some("{{shown}}")),
                ("data", Some("{{user:current, title:'Hi'}}")),
            ]
        );
    }

    #[test]
    fn test_inclusion_without_bindings_has_empty_data() {
        let out = page("<Spinner />");
        assert_eq!(
            attrs(first(&out)),
            vec![("is", Some("Spinner")), ("data", Some("{{}}"))]
        );
    }

    #[test]
    fn test_one_way_binding() {
        let out = page(r#"<div :title="msg" v-bind:id="uid"></div>"#);
        assert_eq!(
            attrs(first(&out)),
            vec![("title", Some("{{msg}}")), ("id", Some("{{uid}}"))]
        );
    }

    #[test]
    fn test_loop_with_index_yields_three_attributes() {
        let out = page(r#"<div v-for="(item, idx) in list"></div>"#);
        assert_eq!(
            attrs(first(&out)),
            vec![
                ("wx:for", Some("{{list}}")),
                ("wx:for-item", Some("item")),
                ("wx:for-index", Some("idx")),
            ]
        );
    }

    #[test]
    fn test_loop_without_index_yields_two_attributes() {
        let out = page(r#"<div v-for="item in list"></div>"#);
        assert_eq!(first(&out).attributes.len(), 2);
    }

    #[test]
    fn test_invalid_loop_is_an_error() {
        let parsed = parse_markup(r#"<div v-for="list"></div>"#);
        let err = transform_markup(
            &parsed.fragment,
            &TransformConfig::default(),
            &TransformOptions::new("p", OutputMode::Page),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::InvalidLoop { .. }));
    }

    #[test]
    fn test_model_on_input() {
        let out = page(r#"<input v-model="username">"#);
        assert_eq!(
            attrs(first(&out)),
            vec![("bindinput", Some("changeModel_username"))]
        );
        assert_eq!(out.model_fields.iter().collect::<Vec<_>>(), ["username"]);
    }

    #[test]
    fn test_model_on_textarea_and_repeated_fields() {
        let out = page(
            r#"<div><textarea v-model="note"></textarea><input v-model="note"><div v-model="x"></div></div>"#,
        );
        let root = first(&out);
        let textarea = root.child_elements().next().unwrap();
        assert_eq!(textarea.attribute_value("bindblur"), Some("changeModel_note"));
        assert_eq!(out.model_fields.iter().collect::<Vec<_>>(), ["note", "x"]);
    }

    #[test]
    fn test_nested_model_path_handler_name() {
        assert_eq!(model_handler_name("form.name"), "changeModel_form_name");
    }

    #[test]
    fn test_class_prefix() {
        let out = page(r#"<div class="card"></div>"#);
        assert_eq!(first(&out).attribute_value("class"), Some("profile_card"));
    }

    #[test]
    fn test_filters_in_class_and_loop_list() {
        let out = page(r#"<div class="a {{ x | up }}" v-for="item in items | active"></div>"#);
        let el = first(&out);
        assert_eq!(el.attribute_value("class"), Some("profile_a {{up(x)}}"));
        assert_eq!(el.attribute_value("wx:for"), Some("{{active(items)}}"));
        assert_eq!(el.attribute_value("wx:for-item"), Some("item"));
    }

    #[test]
    fn test_local_image_is_rewritten() {
        let out = page(r#"<img src="../assets/a.png"><img src="https://cdn/b.png">"#);
        let images: Vec<_> = out
            .fragment
            .elements()
            .map(|e| e.attribute_value("src").unwrap())
            .collect();
        assert_eq!(
            images,
            ["http://s.xiaohongchun.com/lsj/a.png", "https://cdn/b.png"]
        );
    }

    #[test]
    fn test_image_detection_disabled() {
        let parsed = parse_markup(r#"<img src="../assets/a.png">"#);
        let config = TransformConfig {
            detect_image_files: false,
            ..TransformConfig::default()
        };
        let out = transform_markup(
            &parsed.fragment,
            &config,
            &TransformOptions::new("p", OutputMode::Page),
            &[],
        )
        .unwrap();
        assert_eq!(first(&out).attribute_value("src"), Some("../assets/a.png"));
    }

    #[test]
    fn test_events() {
        let out = page(r#"<div @click="go" @click.stop="stop" @longpress="hold" v-on:touchstart.prevent="t"></div>"#);
        assert_eq!(
            attrs(first(&out)),
            vec![
                ("bindtap", Some("go")),
                ("catchtap", Some("stop")),
                ("bindlongpress", Some("hold")),
                ("bindtouchstart", Some("t")),
            ]
        );
    }

    #[test]
    fn test_filters_in_text_and_attributes() {
        let out = page(r#"<span title="{{ t | upper }}">{{ price | currency }}</span>"#);
        let el = first(&out);
        assert_eq!(el.attribute_value("title"), Some("{{upper(t)}}"));
        assert!(matches!(&el.children[0], Node::Text(t) if t.data == "{{currency(price)}}"));
    }

    #[test]
    fn test_dropped_children_and_order() {
        let out = page("<div><span>a</span><br><img src=\"http://a\"><span>b</span></div>");
        let names: Vec<_> = first(&out)
            .child_elements()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, ["text", "image", "text"]);
    }

    #[test]
    fn test_component_mode_wraps_root() {
        let out = transform("<div></div>", OutputMode::Component);
        let wrapper = first(&out);
        assert_eq!(wrapper.name, "template");
        assert_eq!(wrapper.attribute_value("name"), Some("profile"));
        assert_eq!(wrapper.child_elements().next().unwrap().name, "view");
    }

    #[test]
    fn test_imports_follow_references() {
        let parsed = parse_markup("<div></div>");
        let references = vec![
            ComponentReference {
                local_name: "A".into(),
                source_path: "./A.vue".into(),
            },
            ComponentReference {
                local_name: "B".into(),
                source_path: "../b/B".into(),
            },
        ];
        let out = transform_markup(
            &parsed.fragment,
            &TransformConfig::default(),
            &TransformOptions::new("p", OutputMode::Page),
            &references,
        )
        .unwrap();
        assert_eq!(
            out.imports,
            ["<import src=\"./A.wxml\" />", "<import src=\"../b/B.wxml\" />"]
        );
    }

    #[test]
    fn test_element_without_attributes_only_renamed() {
        let out = page("<div></div>");
        assert_eq!(first(&out).attributes, Vec::new());
    }
}
