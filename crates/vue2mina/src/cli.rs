//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, ValueEnum};
use mina_transformer::OutputMode;

/// Convert Vue single-file components into WeChat mini-program pages.
#[derive(Debug, Parser)]
#[command(name = "vue2mina")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// `.vue` files or directories to convert
    #[arg(required = true)]
    pub inputs: Vec<Utf8PathBuf>,

    /// Directory the converted files are written to
    #[arg(long = "out-dir", default_value = "dist")]
    pub out_dir: Utf8PathBuf,

    /// Whether the markup is wrapped in a named template
    #[arg(long, value_enum, default_value = "component")]
    pub mode: Mode,

    /// Path to a JSON configuration file (defaults to ./vue2mina.json if present)
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Glob patterns to ignore when walking directories
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Print the converted files instead of writing them
    #[arg(long)]
    pub stdout: bool,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Output mode.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum Mode {
    /// Wrap the markup in `<template name="…">` (default)
    #[default]
    Component,
    /// Emit the markup unwrapped
    Page,
}

impl From<Mode> for OutputMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Component => OutputMode::Component,
            Mode::Page => OutputMode::Page,
        }
    }
}

impl Args {
    /// Rejects file inputs that are not `.vue` components.
    ///
    /// Directories and missing paths pass; the orchestrator reports the latter.
    pub fn validate(&self) -> Result<(), String> {
        for input in &self.inputs {
            if input.is_file() && input.extension() != Some("vue") {
                return Err(format!("`{input}` is not a .vue file"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["vue2mina", "App.vue"]);
        assert_eq!(args.inputs, vec![Utf8PathBuf::from("App.vue")]);
        assert_eq!(args.out_dir.as_str(), "dist");
        assert_eq!(args.mode, Mode::Component);
        assert!(args.config.is_none());
        assert!(!args.stdout);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_inputs_are_required() {
        assert!(Args::try_parse_from(["vue2mina"]).is_err());
    }

    #[test]
    fn test_page_mode_and_options() {
        let args = Args::parse_from([
            "vue2mina",
            "src",
            "--mode",
            "page",
            "--out-dir",
            "build",
            "--ignore",
            "**/legacy/**",
            "--ignore",
            "**/*.test.vue",
            "-vv",
        ]);
        assert_eq!(args.mode, Mode::Page);
        assert_eq!(OutputMode::from(args.mode), OutputMode::Page);
        assert_eq!(args.out_dir.as_str(), "build");
        assert_eq!(args.ignore.len(), 2);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(Args::try_parse_from(["vue2mina", "a.vue", "--mode", "app"]).is_err());
    }

    #[test]
    fn test_validate_rejects_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().join("index.html")).unwrap();
        std::fs::write(&path, "<div></div>").unwrap();

        let args = Args::parse_from(["vue2mina", path.as_str()]);
        assert!(args.validate().unwrap_err().contains("index.html"));

        let args = Args::parse_from(["vue2mina", dir.path().to_str().unwrap()]);
        assert!(args.validate().is_ok());
    }
}
