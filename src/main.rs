//! mdview - preview a markdown file in the browser with live reload.

mod cli;
mod config;
mod content;
mod embed;
mod error;
mod logger;
mod reload;
mod render;
mod shell;
mod utils;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::PreviewConfig;
use content::ContentStore;
use error::PreviewError;
use owo_colors::OwoColorize;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let Some(file) = &cli.file else {
        return Err(PreviewError::Usage(Cli::usage()).into());
    };
    let store = Arc::new(open_document(file)?);
    let config = PreviewConfig::load(cli).map_err(PreviewError::from)?;
    debug!(
        "serve";
        "previewing {} ({} bytes)",
        store.path().display(),
        store.last().content.len()
    );

    cli::serve::serve(&config, store)
}

/// Open the document. Anything that is not a readable file is "not found".
fn open_document(file: &Path) -> Result<ContentStore, PreviewError> {
    if !file.is_file() {
        return Err(PreviewError::FileNotFound(file.to_path_buf()));
    }
    ContentStore::open(file).map_err(|e| match e {
        PreviewError::FileUnreadable(path, source) => {
            debug!("serve"; "{}: {}", path.display(), source);
            PreviewError::FileNotFound(path)
        }
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_document() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("notes.md");
        std::fs::write(&file, "# Notes").unwrap();

        let store = open_document(&file).unwrap();
        assert_eq!(store.last().content, "# Notes");
    }

    #[test]
    fn test_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = open_document(dir.path()).err().unwrap();
        assert!(matches!(err, PreviewError::FileNotFound(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_not_found() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let file = dir.path().join("locked.md");
        std::fs::write(&file, "# Locked").unwrap();
        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores file modes.
        if std::fs::read(&file).is_ok() {
            return;
        }

        let err = open_document(&file).err().unwrap();
        assert!(matches!(err, PreviewError::FileNotFound(_)));
        assert!(err.to_string().starts_with("file not found"));
    }
}
