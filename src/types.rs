/// Core domain types for diaref references, edits, and file moves.
use std::ops::Range;
use std::path::PathBuf;

use crate::markup::SourceString;

/// All text replacements computed for one document, in ascending offset
/// order. Replacements never overlap; they are collected in full against the
/// unmodified document content before any is applied.
#[derive(Debug, Clone)]
pub struct DocumentEdit {
    /// Project-relative path of the document to edit.
    pub document: PathBuf,
    /// Ordered, non-overlapping replacements against the original content.
    pub replacements: Vec<Replacement>,
}

/// A pending file move, both endpoints project-relative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMove {
    /// Current location.
    pub from: PathBuf,
    /// Destination location.
    pub to: PathBuf,
}

/// One `<img>` reference found in a documentation comment.
/// Owned by a single scan pass; never persisted.
#[derive(Debug, Clone)]
pub struct ImageReference {
    /// Project-relative path of the document containing the tag.
    pub document: PathBuf,
    /// One-based line number of the tag in the document.
    pub line: u32,
    /// The positioned `src` attribute value (offsets into the document).
    pub src: SourceString,
}

/// A positioned span-and-string edit against one document's unmodified content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Byte range of the original content to replace.
    pub span: Range<usize>,
    /// Replacement text.
    pub text: String,
}

/// Everything a relocation implies: text edits plus file moves.
/// Computing the plan mutates nothing; applying it is the caller's job.
#[derive(Debug, Clone)]
pub struct RewritePlan {
    /// Per-document replacement sets, documents with zero replacements dropped.
    pub edits: Vec<DocumentEdit>,
    /// File and folder moves implied by the relocation.
    pub moves: Vec<FileMove>,
}

impl RewritePlan {
    /// True when the plan changes nothing at all.
    pub fn is_empty(&self) -> bool {
        return self.edits.is_empty() && self.moves.is_empty();
    }

    /// Total number of text replacements across all documents.
    pub fn replacement_count(&self) -> usize {
        return self.edits.iter().map(|e| return e.replacements.len()).sum();
    }
}
