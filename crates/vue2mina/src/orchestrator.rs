//! Main orchestration logic.

use crate::cli::Args;
use crate::config::{ConfigError, FileConfig};
use crate::output::{format_result, ConversionDiagnostic, ConversionSummary};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use miette::Diagnostic;
use mina_transformer::{transform, OutputMode, TransformConfig, TransformOptions, TransformResult};
use rayon::prelude::*;
use std::fs;
use thiserror::Error;
use vue_parser::extract_segments;
use walkdir::WalkDir;

/// Orchestration errors.
#[derive(Debug, Error, Diagnostic)]
pub enum OrchestratorError {
    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    #[diagnostic(code(vue2mina::ignore))]
    InvalidGlob(String),

    /// An input path does not exist.
    #[error("input not found: {0}")]
    #[diagnostic(code(vue2mina::input))]
    MissingInput(Utf8PathBuf),

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(String),

    /// The working directory could not be determined.
    #[error("failed to read the working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    /// Configuration error.
    #[error(transparent)]
    #[diagnostic(code(vue2mina::config), help("see --config"))]
    Config(#[from] ConfigError),
}

/// One `.vue` file scheduled for conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// The file on disk.
    pub path: Utf8PathBuf,
    /// The directory, relative to the output directory, its files go to.
    pub out_subdir: Utf8PathBuf,
}

impl SourceFile {
    /// The file name without `.vue`; names the output files and the CSS scope.
    pub fn stem(&self) -> &str {
        self.path.file_stem().unwrap_or("index")
    }
}

/// What happened to one file.
enum Outcome {
    Written,
    Printed(String),
    Failed(String),
}

/// Converts every input and returns the totals.
pub fn run(args: &Args) -> Result<ConversionSummary, OrchestratorError> {
    let cwd = std::env::current_dir().map_err(OrchestratorError::WorkingDirectory)?;
    let cwd = Utf8PathBuf::try_from(cwd)
        .map_err(|e| OrchestratorError::NonUtf8Path(e.into_path_buf().display().to_string()))?;

    let config = FileConfig::load(args.config.as_deref(), &cwd)?.into_transform_config()?;
    log::debug!("{config:?}");

    let ignore = build_ignore_set(&args.ignore)?;
    let files = collect_files(&args.inputs, &ignore)?;
    log::info!("converting {} file(s)", files.len());

    let mode = OutputMode::from(args.mode);
    let outcomes: Vec<Outcome> = files
        .par_iter()
        .map(|file| convert_file(file, &config, mode, args))
        .collect();

    let mut summary = ConversionSummary::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Written => summary.converted += 1,
            Outcome::Printed(text) => {
                print!("{text}");
                summary.converted += 1;
            }
            Outcome::Failed(report) => {
                eprint!("{report}");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

/// Builds the ignore set from `--ignore` plus the default ignores.
pub fn build_ignore_set(patterns: &[String]) -> Result<GlobSet, OrchestratorError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }

    for pattern in ["**/node_modules/**", "**/dist/**"] {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }

    builder
        .build()
        .map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))
}

/// Expands the inputs into `.vue` files.
///
/// Files given directly are always converted. Directories are walked for
/// `.vue` files whose path relative to the directory is not ignored, and
/// keep that relative layout under the output directory.
pub fn collect_files(
    inputs: &[Utf8PathBuf],
    ignore: &GlobSet,
) -> Result<Vec<SourceFile>, OrchestratorError> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            files.push(SourceFile {
                path: input.clone(),
                out_subdir: Utf8PathBuf::new(),
            });
            continue;
        }
        if !input.is_dir() {
            return Err(OrchestratorError::MissingInput(input.clone()));
        }

        let mut found: Vec<SourceFile> = WalkDir::new(input)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
            .filter(|p| p.extension() == Some("vue"))
            .filter_map(|path| {
                let relative = path.strip_prefix(input).unwrap_or(&path).to_path_buf();
                if ignore.is_match(relative.as_str()) {
                    log::debug!("ignoring {path}");
                    return None;
                }
                let out_subdir = relative
                    .parent()
                    .map(Utf8Path::to_path_buf)
                    .unwrap_or_default();
                Some(SourceFile { path, out_subdir })
            })
            .collect();
        found.sort_by(|a, b| a.path.cmp(&b.path));
        files.extend(found);
    }

    files.dedup_by(|a, b| a.path == b.path);
    Ok(files)
}

fn convert_file(
    file: &SourceFile,
    config: &TransformConfig,
    mode: OutputMode,
    args: &Args,
) -> Outcome {
    let source = match fs::read_to_string(&file.path) {
        Ok(source) => source,
        Err(e) => return Outcome::Failed(format!("failed to read {}: {e}\n", file.path)),
    };

    let stem = file.stem();
    let doc = extract_segments(&source);
    let options = TransformOptions::new(stem, mode);
    let result = match transform(&doc, config, &options) {
        Ok(result) => result,
        Err(error) => {
            log::debug!("{} failed: {error}", file.path);
            return Outcome::Failed(ConversionDiagnostic::new(&file.path, &source, &error).render());
        }
    };

    if args.stdout {
        return Outcome::Printed(format_result(&file.path, stem, &result));
    }

    let out_dir = args.out_dir.join(&file.out_subdir);
    match write_outputs(&out_dir, stem, &result) {
        Ok(()) => {
            log::info!("{} -> {}/{stem}.{{wxml,wxss,js}}", file.path, out_dir);
            Outcome::Written
        }
        Err(e) => Outcome::Failed(format!("failed to write {out_dir}/{stem}: {e}\n")),
    }
}

/// Writes `{stem}.wxml`, `{stem}.wxss` and `{stem}.js` into `out_dir`.
pub fn write_outputs(
    out_dir: &Utf8Path,
    stem: &str,
    result: &TransformResult,
) -> std::io::Result<()> {
    fs::create_dir_all(out_dir)?;
    fs::write(out_dir.join(format!("{stem}.wxml")), &result.wxml)?;
    fs::write(out_dir.join(format!("{stem}.wxss")), &result.wxss)?;
    fs::write(out_dir.join(format!("{stem}.js")), &result.js)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn utf8(path: &std::path::Path) -> Utf8PathBuf {
        Utf8PathBuf::try_from(path.to_path_buf()).unwrap()
    }

    fn touch(path: &Utf8Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_collect_walks_directories_and_ignores() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(dir.path());
        touch(&root.join("App.vue"));
        touch(&root.join("pages/home/Home.vue"));
        touch(&root.join("pages/home/notes.md"));
        touch(&root.join("legacy/Old.vue"));
        touch(&root.join("node_modules/lib/Lib.vue"));

        let ignore = build_ignore_set(&["legacy/**".to_string()]).unwrap();
        let files = collect_files(&[root.clone()], &ignore).unwrap();
        let found: Vec<_> = files
            .iter()
            .map(|f| (f.path.strip_prefix(&root).unwrap().as_str(), f.out_subdir.as_str()))
            .collect();
        assert_eq!(found, vec![("App.vue", ""), ("pages/home/Home.vue", "pages/home")]);
    }

    #[test]
    fn test_direct_files_are_never_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let file = utf8(dir.path()).join("dist/Built.vue");
        touch(&file);

        let files = collect_files(&[file.clone(), file.clone()], &build_ignore_set(&[]).unwrap())
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].stem(), "Built");
        assert_eq!(files[0].out_subdir, Utf8PathBuf::new());
    }

    #[test]
    fn test_missing_input() {
        let err = collect_files(
            &[Utf8PathBuf::from("/definitely/not/here")],
            &build_ignore_set(&[]).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, OrchestratorError::MissingInput(_)));
    }

    #[test]
    fn test_invalid_glob() {
        assert!(matches!(
            build_ignore_set(&["a[".to_string()]),
            Err(OrchestratorError::InvalidGlob(_))
        ));
    }

    #[test]
    fn test_write_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let out = utf8(dir.path()).join("dist/pages");
        let result = TransformResult {
            wxml: "<view />\n".into(),
            wxss: String::new(),
            js: "Page({\n});\n".into(),
            model_fields: Default::default(),
            references: Vec::new(),
        };
        write_outputs(&out, "home", &result).unwrap();
        assert_eq!(fs::read_to_string(out.join("home.wxml")).unwrap(), "<view />\n");
        assert_eq!(fs::read_to_string(out.join("home.wxss")).unwrap(), "");
        assert_eq!(fs::read_to_string(out.join("home.js")).unwrap(), "Page({\n});\n");
    }
}
