//! Local resume folder: the bulk source the binary feeds the ranking engine.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// File extensions treated as plain-text resumes.
pub const RESUME_EXTENSIONS: &[&str] = &["txt", "md", "text"];

/// Plain-text resumes in one directory, yielded as `(file_name, text)`.
///
/// The listing is taken once when the folder is opened; file contents are
/// read only when the iterator reaches them. A file that cannot be read
/// yields empty text so the engine records it as a failed candidate.
#[derive(Debug)]
pub struct ResumeFolder {
    files: std::vec::IntoIter<PathBuf>,
}

impl ResumeFolder {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read resume directory '{}'", dir.display()))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to list resume directory '{}'", dir.display()))?
                .path();
            if path.is_file() && is_resume_file(&path) {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        debug!("Found {} resume files in {}", files.len(), dir.display());

        Ok(Self {
            files: files.into_iter(),
        })
    }

    /// Files not yet yielded.
    pub fn remaining(&self) -> usize {
        self.files.len()
    }
}

impl Iterator for ResumeFolder {
    type Item = (String, String);

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.next()?;
        let candidate_id = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let text = std::fs::read_to_string(&path).unwrap_or_else(|e| {
            warn!("Failed to read resume '{}': {}", path.display(), e);
            String::new()
        });

        Some((candidate_id, text))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.files.size_hint()
    }
}

fn is_resume_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            RESUME_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
