//! Embedded scaffold content for workspace initialization.

use std::path::Path;

use include_dir::{Dir, DirEntry, include_dir};

use crate::domain::AppError;

static SCAFFOLD_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/assets/scaffold");

/// A file embedded in the scaffold bundle.
#[derive(Debug, Clone)]
pub struct ScaffoldFile {
    /// Path relative to the scaffold root.
    pub path: String,
    /// File content as UTF-8 text.
    pub content: &'static str,
}

/// Returns all scaffold files (relative to `src/assets/scaffold/`).
pub fn scaffold_files() -> Vec<ScaffoldFile> {
    let mut files = Vec::new();
    collect_files(&SCAFFOLD_DIR, &mut files);

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}

/// Write the scaffold into `root`. Fails without touching anything when the
/// data directory is already present.
pub fn deploy_scaffold(root: &Path) -> Result<Vec<String>, AppError> {
    let data_dir = root.join("data");
    if data_dir.exists() {
        return Err(AppError::DataDirExists(data_dir));
    }

    let mut written = Vec::new();
    for file in scaffold_files() {
        let target = root.join(&file.path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, file.content)?;
        written.push(file.path);
    }
    std::fs::create_dir_all(root.join("reports"))?;
    Ok(written)
}

fn collect_files(dir: &'static Dir, files: &mut Vec<ScaffoldFile>) {
    for entry in dir.entries() {
        match entry {
            DirEntry::File(file) => {
                if let Some(content) = file.contents_utf8() {
                    files.push(ScaffoldFile {
                        path: file.path().to_string_lossy().to_string(),
                        content,
                    });
                }
            }
            DirEntry::Dir(subdir) => collect_files(subdir, files),
        }
    }
}
