//! Document model with Rope-based text storage

use anyhow::{Context, Result};
use ropey::Rope;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::outline::{self, DocumentClass, StructureItem};

/// The main document structure
#[derive(Clone)]
pub struct Document {
    pub path: PathBuf,
    pub rope: Rope,
    pub class: DocumentClass,
    /// Recomputed fresh on every load/reload; items carry no identity
    /// across edits.
    pub outline: Vec<StructureItem>,
    pub loaded_mtime: Option<SystemTime>,
    pub rev: u64,
}

impl Document {
    /// Load a document from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let abs_path = path
            .canonicalize()
            .with_context(|| format!("Failed to canonicalize path: {}", path.display()))?;

        let content = fs::read_to_string(&abs_path)
            .with_context(|| format!("Failed to read file: {}", abs_path.display()))?;

        let class = DocumentClass::detect(&content);
        let outline = outline::extract_structure(&content);
        let rope = Rope::from_str(&content);

        let metadata = fs::metadata(&abs_path).ok();
        let mtime = metadata.and_then(|m| m.modified().ok());

        Ok(Self {
            path: abs_path,
            rope,
            class,
            outline,
            loaded_mtime: mtime,
            rev: 1,
        })
    }

    /// Reload the document from disk, recomputing the outline
    pub fn reload(&mut self) -> Result<()> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to reload file: {}", self.path.display()))?;

        self.class = DocumentClass::detect(&content);
        self.outline = outline::extract_structure(&content);
        self.rope = Rope::from_str(&content);

        let metadata = fs::metadata(&self.path).ok();
        self.loaded_mtime = metadata.and_then(|m| m.modified().ok());
        self.rev += 1;

        Ok(())
    }

    /// Get the number of lines in the document
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Extract a 0-based inclusive line range as text, clamped to the
    /// document and without a trailing newline
    pub fn lines(&self, start: usize, end_inclusive: usize) -> String {
        let line_count = self.line_count();

        let start = start.min(line_count.saturating_sub(1));
        let end = end_inclusive.min(line_count.saturating_sub(1));

        if start > end {
            return String::new();
        }

        let mut result = String::new();
        for line_idx in start..=end {
            let line = self.rope.line(line_idx);
            for chunk in line.chunks() {
                result.push_str(chunk);
            }
        }

        if result.ends_with('\n') {
            result.pop();
        }

        result
    }
}
