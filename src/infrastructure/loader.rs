use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::domain::source_file::SourceFile;

/// Read a single file; its display path becomes the artifact name.
pub fn load_file(path: &Path) -> Result<SourceFile> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read file {}", path.display()))?;
    Ok(SourceFile::from_bytes(path.display().to_string(), bytes))
}

/// Collect every file under `root` whose extension is in `extensions`.
/// `target` and `.git` subdirectories are skipped; `root` itself is always walked.
/// Returns (path relative to `root`, file), sorted by relative path.
pub fn collect_sources(root: &Path, extensions: &[String]) -> Result<Vec<(PathBuf, SourceFile)>> {
    let mut files = Vec::new();
    collect_recursive(root, root, extensions, &mut files)?;
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

fn collect_recursive(
    root: &Path,
    dir: &Path,
    extensions: &[String],
    out: &mut Vec<(PathBuf, SourceFile)>,
) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            if !is_skipped_dir(&path) {
                collect_recursive(root, &path, extensions, out)?;
            }
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| extensions.iter().any(|wanted| wanted == ext))
            .unwrap_or(false);
        if !matches {
            continue;
        }
        match load_file(&path) {
            Ok(file) => {
                let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                out.push((relative, file));
            }
            Err(e) => warn!("Skipping {}: {:#}", path.display(), e),
        }
    }
    Ok(())
}

fn is_skipped_dir(path: &Path) -> bool {
    matches!(
        path.file_name().and_then(|name| name.to_str()),
        Some("target") | Some(".git")
    )
}
