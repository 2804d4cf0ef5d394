//! Per-file orchestration: enumerates `.jack` inputs, runs one fresh
//! [`crate::engine::CompilationEngine`] per compilation unit, and writes
//! each unit's VM output to a sibling `.vm` file.
//!
//! Argument parsing and diagnostic printing live in `main.rs`; this module
//! is the reusable operation the binary (and tests) drive.

use std::fs;
use std::path::{Path, PathBuf};

use jack_core::JackError;
use thiserror::Error;

use crate::engine::compile_source;

#[derive(Debug, Error)]
enum DriverError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Jack(#[from] JackError),
}

/// The result of compiling one `.jack` file: its display name and either
/// success or a diagnostic message, matching the `Compiled: <name>` /
/// `Error in <name>: <message>` line the driver prints per unit.
pub struct CompileOutcome {
    pub name: String,
    pub result: Result<(), String>,
}

/// Compiles `path` (a single `.jack` file, or a directory scanned
/// non-recursively for `*.jack` siblings) and writes each unit's VM text
/// to `X.vm` next to `X.jack`.
pub fn compile_path(path: &Path) -> Vec<CompileOutcome> {
    collect_jack_files(path)
        .into_iter()
        .map(|file| compile_one(&file))
        .collect()
}

fn collect_jack_files(path: &Path) -> Vec<PathBuf> {
    if path.is_dir() {
        let mut files: Vec<PathBuf> = fs::read_dir(path)
            .into_iter()
            .flatten()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "jack"))
            .collect();
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    }
}

fn compile_one(path: &Path) -> CompileOutcome {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let result = compile_one_inner(path).map_err(|e| e.to_string());
    CompileOutcome { name, result }
}

fn compile_one_inner(path: &Path) -> Result<(), DriverError> {
    let source = fs::read_to_string(path)?;
    let vm_text = compile_source(&source)?;
    fs::write(path.with_extension("vm"), vm_text)?;
    Ok(())
}
