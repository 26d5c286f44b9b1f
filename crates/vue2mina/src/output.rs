//! Output formatting: diagnostics for failed files and the run summary.

use camino::Utf8Path;
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, LabeledSpan, NamedSource};
use mina_transformer::{TransformError, TransformResult};
use thiserror::Error;
use vue_parser::Span;

/// A conversion failure with its source snippet.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(vue2mina::convert))]
pub struct ConversionDiagnostic {
    message: String,
    #[source_code]
    source_code: NamedSource<String>,
    #[label(collection)]
    labels: Vec<LabeledSpan>,
    #[help]
    help: Option<String>,
}

impl ConversionDiagnostic {
    /// Builds a diagnostic for `error`, whose spans address `source`.
    pub fn new(path: &Utf8Path, source: &str, error: &TransformError) -> Self {
        let labels = match error {
            TransformError::Parse { errors, .. } => errors
                .iter()
                .map(|e| label(Some(e.kind.to_string()), e.span, source))
                .collect(),
            other => other
                .span()
                .map(|span| label(None, span, source))
                .into_iter()
                .collect(),
        };

        Self {
            message: format!("{path}: {error}"),
            source_code: NamedSource::new(path.as_str(), source.to_string()),
            labels,
            help: help_for(error),
        }
    }

    /// The labelled spans, as `(offset, length)` pairs.
    #[cfg(test)]
    pub fn label_ranges(&self) -> Vec<(usize, usize)> {
        self.labels.iter().map(|l| (l.offset(), l.len())).collect()
    }

    /// Renders the diagnostic without colors.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
        if handler.render_report(&mut out, self).is_err() {
            return format!("{}\n", self.message);
        }
        out
    }
}

fn label(text: Option<String>, span: Span, source: &str) -> LabeledSpan {
    let start = (u32::from(span.start) as usize).min(source.len());
    let end = (u32::from(span.end) as usize).clamp(start, source.len());
    LabeledSpan::new_with_span(text, (start, end - start))
}

fn help_for(error: &TransformError) -> Option<String> {
    let help = match error {
        TransformError::MissingDefaultExport | TransformError::DescriptorNotObject { .. } => {
            "the script must `export default { … }` an object literal"
        }
        TransformError::InvalidData { .. } => {
            "write `data() { return { … } }` with the return as the only statement"
        }
        TransformError::InvalidLoop { .. } => "use `item in list` or `(item, index) in list`",
        _ => return None,
    };
    Some(help.to_string())
}

/// Formats the three converted files for `--stdout`.
pub fn format_result(path: &Utf8Path, stem: &str, result: &TransformResult) -> String {
    format!(
        "=== {path}: {stem}.wxml ===\n{}\n=== {path}: {stem}.wxss ===\n{}\n=== {path}: {stem}.js ===\n{}\n",
        result.wxml, result.wxss, result.js
    )
}

/// Totals for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Files converted and written.
    pub converted: usize,
    /// Files that failed to read, convert or write.
    pub failed: usize,
}

impl ConversionSummary {
    /// The one-line summary printed at the end of a run.
    pub fn line(&self) -> String {
        format!(
            "converted {} file(s), {} failed",
            self.converted, self.failed
        )
    }
}
