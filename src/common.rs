//! Common functionality.

use std::path::{Path, PathBuf};

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Parse a run ID: non-empty and without whitespace, as it is matched as a
/// whole whitespace-separated token and used in file names.
pub fn parse_run_id(raw: &str) -> Result<String, String> {
    if raw.is_empty() {
        Err(String::from("run ID must not be empty"))
    } else if raw.chars().any(char::is_whitespace) {
        Err(format!("run ID {:?} must not contain whitespace", raw))
    } else {
        Ok(raw.to_string())
    }
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

/// List the regular files directly inside `dir`, sorted by path.
pub fn list_files_sorted<P>(dir: P) -> Result<Vec<PathBuf>, anyhow::Error>
where
    P: AsRef<Path>,
{
    let dir = dir.as_ref();
    let mut result = Vec::new();
    let entries = std::fs::read_dir(dir)
        .map_err(|e| anyhow::anyhow!("could not list directory {:?}: {}", dir, e))?;
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            result.push(entry.path());
        } else {
            tracing::debug!("skipping non-file entry {:?}", entry.path());
        }
    }
    result.sort();
    Ok(result)
}

/// Return the file name of `path` as a `String`, lossy for non-UTF-8 names.
pub fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Return the file stem of `path` as a `String`, lossy for non-UTF-8 names.
pub fn file_stem_string(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
