//! Whole-component parsing through the public API.

use pretty_assertions::assert_eq;
use vue_parser::{
    extract_segments, parse_markup, parse_stylesheet, AtRuleBlock, DeclarationItem, Node,
    ParseErrorKind, Rule, ScriptLang, TextSize,
};

const COMPONENT: &str = r#"<template>
  <div class="card" :title="name" @click.stop="open">
    <template v-if="ready"><span>{{ a < b ? a : b }}</span></template>
    <img src="./a.png"/>
    <input v-model="query">
  </div>
</template>
<script lang="ts">
export default { name: 'card' }
</script>
<style scoped>
/* card */
.card, .card > span { margin: 0.1rem 0; }
@media screen and (max-width: 320px) { .card { margin: 0; } }
</style>
"#;

#[test]
fn test_segments_and_offsets() {
    let doc = extract_segments(COMPONENT);
    assert!(doc.style_scoped);
    assert_eq!(doc.script_lang, ScriptLang::TypeScript);

    let script = doc.script.as_ref().unwrap();
    let start = u32::from(script.content_span.start) as usize;
    let end = u32::from(script.content_span.end) as usize;
    assert_eq!(&COMPONENT[start..end], script.content);
    assert!(doc.script_source().contains("export default"));
}

#[test]
fn test_nested_template_stays_in_segment() {
    let doc = extract_segments(COMPONENT);
    let markup = parse_markup(doc.template_source());
    assert!(markup.errors.is_empty(), "{:?}", markup.errors);

    let root = markup.fragment.elements().next().unwrap();
    assert_eq!(root.name, "div");
    assert_eq!(root.attribute_value(":title"), Some("name"));
    assert_eq!(root.attribute_value("@click.stop"), Some("open"));

    let children: Vec<_> = root.child_elements().map(|e| e.name.as_str()).collect();
    assert_eq!(children, ["template", "img", "input"]);

    let inner = root.child_elements().next().unwrap();
    let span = inner.child_elements().next().unwrap();
    let [Node::Text(text)] = span.children.as_slice() else {
        panic!("expected one text child, got {:?}", span.children);
    };
    assert_eq!(text.data, "{{ a < b ? a : b }}");
}

#[test]
fn test_style_rules() {
    let doc = extract_segments(COMPONENT);
    let style = parse_stylesheet(doc.style_source());
    assert!(style.errors.is_empty(), "{:?}", style.errors);
    assert_eq!(style.sheet.rules.len(), 3);

    let Rule::Qualified(rule) = &style.sheet.rules[1] else {
        panic!("expected a qualified rule");
    };
    assert_eq!(rule.selectors, [".card", ".card > span"]);
    let [DeclarationItem::Declaration(decl)] = rule.declarations.as_slice() else {
        panic!("expected one declaration");
    };
    assert_eq!((decl.property.as_str(), decl.value.as_str()), ("margin", "0.1rem 0"));

    let Rule::At(media) = &style.sheet.rules[2] else {
        panic!("expected an at-rule");
    };
    assert_eq!(media.name, "media");
    assert_eq!(media.prelude, "screen and (max-width: 320px)");
    assert!(matches!(&media.block, Some(AtRuleBlock::Rules(rules)) if rules.len() == 1));
}

#[test]
fn test_errors_shift_into_file_coordinates() {
    let source = "<template><div><span></div></template>";
    let doc = extract_segments(source);
    let markup = parse_markup(doc.template_source());
    let base = doc.template.as_ref().unwrap().content_span.start;
    assert_eq!(base, TextSize::from(10));

    let error = markup
        .errors
        .into_iter()
        .find(|e| matches!(e.kind, ParseErrorKind::MismatchedClosingTag { .. }))
        .expect("mismatched closing tag");
    let local = error.span;
    let shifted = error.shifted(base);
    assert_eq!(shifted.span.start, local.start + base);

    let start = u32::from(shifted.span.start) as usize;
    let closing = source.find("</div>").unwrap();
    assert!(
        (closing..closing + "</div>".len()).contains(&start),
        "{:?}",
        shifted.span
    );
}
