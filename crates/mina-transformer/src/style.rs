//! Style sheet transformation: selector scoping and unit conversion.

use crate::config::{TransformConfig, TransformOptions, UnitConverter};
use crate::error::TransformError;
use crate::references::ComponentReference;
use regex::Regex;
use vue_parser::{AtRule, AtRuleBlock, Declaration, DeclarationItem, QualifiedRule, Rule, StyleSheet};

/// The transformed style sheet.
#[derive(Debug, Clone)]
pub struct StyleOutput {
    /// `@import` lines, one per referenced component.
    pub imports: Vec<String>,
    /// The rewritten rules.
    pub sheet: StyleSheet,
}

/// Rewrites a style sheet.
///
/// With `scoped` set, the first class of every selector gets the component
/// name as prefix. Unit conversion applies everywhere, including keyframes.
pub fn transform_stylesheet(
    sheet: &StyleSheet,
    scoped: bool,
    config: &TransformConfig,
    options: &TransformOptions,
    references: &[ComponentReference],
) -> Result<StyleOutput, TransformError> {
    let transformer = StyleTransformer {
        scope: scoped.then_some(options.name.as_str()),
        units: UnitScanner::new(config.unit_converter.as_ref())?,
    };

    let rules = transformer.transform_rules(&sheet.rules, true);
    let imports = references
        .iter()
        .map(|r| format!("@import \"{}.wxss\";", r.stem()))
        .collect();

    log::debug!(
        "style transformed: {} rule(s), scoped: {}",
        rules.len(),
        scoped
    );

    Ok(StyleOutput {
        imports,
        sheet: StyleSheet { rules },
    })
}

struct StyleTransformer<'a> {
    scope: Option<&'a str>,
    units: UnitScanner<'a>,
}

impl StyleTransformer<'_> {
    fn transform_rules(&self, rules: &[Rule], scope_selectors: bool) -> Vec<Rule> {
        rules
            .iter()
            .map(|rule| match rule {
                Rule::Comment(comment) => Rule::Comment(comment.clone()),
                Rule::Qualified(rule) => Rule::Qualified(QualifiedRule {
                    selectors: match self.scope {
                        Some(prefix) if scope_selectors => rule
                            .selectors
                            .iter()
                            .map(|s| scope_selector(s, prefix))
                            .collect(),
                        _ => rule.selectors.clone(),
                    },
                    declarations: self.transform_declarations(&rule.declarations),
                    span: rule.span,
                }),
                Rule::At(at) => Rule::At(self.transform_at_rule(at, scope_selectors)),
            })
            .collect()
    }

    fn transform_at_rule(&self, at: &AtRule, scope_selectors: bool) -> AtRule {
        let block = at.block.as_ref().map(|block| match block {
            AtRuleBlock::Rules(rules) => {
                AtRuleBlock::Rules(self.transform_rules(rules, scope_selectors && !at.is_keyframes()))
            }
            AtRuleBlock::Declarations(items) => {
                AtRuleBlock::Declarations(self.transform_declarations(items))
            }
        });

        AtRule {
            name: at.name.clone(),
            prelude: at.prelude.clone(),
            block,
            span: at.span,
        }
    }

    fn transform_declarations(&self, items: &[DeclarationItem]) -> Vec<DeclarationItem> {
        items
            .iter()
            .map(|item| match item {
                DeclarationItem::Comment(comment) => DeclarationItem::Comment(comment.clone()),
                DeclarationItem::Declaration(decl) => DeclarationItem::Declaration(Declaration {
                    property: decl.property.clone(),
                    value: self.units.convert(&decl.value),
                    span: decl.span,
                }),
            })
            .collect()
    }
}

/// Prefixes the first class token of a selector: `.card` becomes `.{prefix}-card`.
///
/// Attribute selectors and strings are skipped; a selector without a class
/// is returned unchanged.
pub fn scope_selector(selector: &str, prefix: &str) -> String {
    let bytes = selector.as_bytes();
    let mut bracket = 0usize;
    let mut quote: Option<u8> = None;

    for (i, &b) in bytes.iter().enumerate() {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' => quote = Some(b),
            b'[' => bracket += 1,
            b']' => bracket = bracket.saturating_sub(1),
            b'.' if bracket == 0 && bytes.get(i + 1).is_some_and(|&n| starts_identifier(n)) => {
                // `\.` is an escaped dot inside a class name, not a new class.
                if i > 0 && bytes[i - 1] == b'\\' {
                    continue;
                }
                return format!("{}.{}-{}", &selector[..i], prefix, &selector[i + 1..]);
            }
            _ => {}
        }
    }

    selector.to_string()
}

fn starts_identifier(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'-' || b == b'\\' || b >= 0x80
}

/// Finds unit tokens (`1.5rem`, `.5rem`, `10rem`) in declaration values.
struct UnitScanner<'a> {
    pattern: Regex,
    converter: &'a dyn UnitConverter,
}

impl<'a> UnitScanner<'a> {
    fn new(converter: &'a dyn UnitConverter) -> Result<Self, TransformError> {
        let pattern = Regex::new(&format!(
            r"(?:\d+(?:\.\d+)?|\.\d+){}",
            regex::escape(converter.source_unit())
        ))?;
        Ok(Self { pattern, converter })
    }

    fn convert(&self, value: &str) -> String {
        let bytes = value.as_bytes();
        let mut out = String::with_capacity(value.len());
        let mut last = 0;

        for m in self.pattern.find_iter(value) {
            let before = m.start().checked_sub(1).map(|i| bytes[i]);
            let after = bytes.get(m.end()).copied();
            // Part of a longer word, e.g. `h1rem` or `2remx`, or of a hex color.
            let embedded = before.is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'#')
                || after.is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
            if embedded {
                continue;
            }
            out.push_str(&value[last..m.start()]);
            let converted = self.converter.convert(m.as_str());
            log::trace!("unit `{}` -> `{}`", m.as_str(), converted);
            out.push_str(&converted);
            last = m.end();
        }

        out.push_str(&value[last..]);
        out
    }
}
