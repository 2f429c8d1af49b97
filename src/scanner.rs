//! Scan documents for `<img>` references inside documentation comments.

use std::ops::Range;
use std::path::Path;

use crate::error::Error;
use crate::markup;
use crate::outline;
use crate::project::Project;
use crate::types::ImageReference;

/// Tag name carrying image references.
pub const IMG_TAG: &str = "img";

/// Attribute naming the referenced image.
pub const SRC_ATTR: &str = "src";

/// Extract image references from the given comment spans of one document.
///
/// Only `<img>` tags with a non-empty `src` value produce a reference;
/// malformed or valueless tags are silently skipped, as are tags of any
/// other name.
pub fn collect_references(
    document: &Path,
    source: &str,
    spans: &[Range<usize>],
) -> Vec<ImageReference> {
    let mut result = Vec::new();
    for span in spans {
        // Keep the comment terminator out of the scanned span so an
        // unterminated tag cannot swallow it as an attribute value.
        let text = source.get(span.clone()).unwrap_or("");
        let end = if text.ends_with("*/") { span.end - 2 } else { span.end };
        let comment = markup::scan(source, span.start..end);
        for tag in comment.tags() {
            if tag.name.text != IMG_TAG {
                continue;
            }
            let Some(src) = tag.attr(SRC_ATTR) else {
                continue;
            };
            if src.value.is_empty() {
                continue;
            }
            result.push(ImageReference {
                document: document.to_path_buf(),
                line: line_of(source, src.value.start),
                src: src.value.clone(),
            });
        }
    }
    return result;
}

/// Read and scan one document of the project.
///
/// # Errors
///
/// Returns `Error::Io` if the document cannot be read,
/// `Error::UnsupportedLanguage` for an unknown extension,
/// or `Error::ParseFailed` if the document cannot be parsed.
pub fn scan_document(project: &Project, document: &Path) -> Result<Vec<ImageReference>, Error> {
    let source = project.read_document(document)?;
    let language = outline::language_for_path(document)?;
    let spans = outline::doc_comment_spans(document, &source, &language)?;
    return Ok(collect_references(document, &source, &spans));
}

/// One-based line number of a byte offset.
pub(crate) fn line_of(source: &str, offset: usize) -> u32 {
    let newlines = source
        .get(..offset)
        .unwrap_or("")
        .bytes()
        .filter(|b| return *b == b'\n')
        .count();
    return u32::try_from(newlines).unwrap_or(u32::MAX).saturating_add(1);
}
