//! Document outline: locating documentation-comment spans in source files.
//!
//! Uses tree-sitter so comments inside string literals are never mistaken
//! for documentation. Only the comment byte ranges leave this module; all
//! downstream work happens on those spans in the original document text.

use std::ops::Range;
use std::path::Path;

use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::Error;

/// Collect the byte ranges of all documentation comments (`/** ... */`)
/// in a document, in source order.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if tree-sitter cannot parse the source.
pub fn doc_comment_spans(
    file_path: &Path,
    source: &str,
    language: &Language,
) -> Result<Vec<Range<usize>>, Error> {
    let tree = parse_source(file_path, source, language)?;
    let mut spans = Vec::new();
    collect_doc_comments(tree.root_node(), source, &mut spans);
    return Ok(spans);
}

/// Map a file extension to its tree-sitter language.
///
/// # Errors
///
/// Returns `Error::UnsupportedLanguage` for unknown extensions.
pub fn language_for_path(path: &Path) -> Result<Language, Error> {
    let ext = path.extension().and_then(|e| return e.to_str()).unwrap_or("");

    return match ext {
        "java" => Ok(tree_sitter_java::LANGUAGE.into()),
        _ => Err(Error::UnsupportedLanguage {
            ext: ext.to_string(),
        }),
    };
}

/// Recursively walk the CST and collect `/** ... */` block comments.
/// Comments are extras in the grammar, so they can appear anywhere.
fn collect_doc_comments(node: Node<'_>, source: &str, spans: &mut Vec<Range<usize>>) {
    if node.kind() == "block_comment" {
        let range = node.byte_range();
        if source.get(range.clone()).is_some_and(|text| return text.starts_with("/**")) {
            spans.push(range);
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_doc_comments(child, source, spans);
    }
}

/// Parse source into a tree-sitter tree.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if the language cannot be set or parsing fails.
fn parse_source(file_path: &Path, source: &str, language: &Language) -> Result<Tree, Error> {
    let mut parser = Parser::new();
    parser.set_language(language).map_err(|e| {
        return Error::ParseFailed {
            file: file_path.to_path_buf(),
            reason: e.to_string(),
        };
    })?;

    return parser.parse(source, None).ok_or_else(|| {
        return Error::ParseFailed {
            file: file_path.to_path_buf(),
            reason: "tree-sitter returned None".to_string(),
        };
    });
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{doc_comment_spans, language_for_path};

    /// Parse Java source and return the collected doc-comment texts.
    fn doc_comments(source: &str) -> Vec<String> {
        let language = language_for_path(Path::new("Doc.java")).expect("java language");
        let spans = doc_comment_spans(Path::new("Doc.java"), source, &language)
            .expect("parseable source");
        return spans
            .into_iter()
            .map(|span| return source[span].to_string())
            .collect();
    }

    #[test]
    fn finds_doc_comments_not_plain_comments() {
        let source = "\
package pkg;

/** Class doc. */
public class Doc {
    /* plain block */
    // line comment
    /** Field doc with <img src=\"img/a.png\">. */
    int x;
}
";
        let comments = doc_comments(source);
        assert_eq!(comments.len(), 2);
        assert!(comments[0].contains("Class doc"));
        assert!(comments[1].contains("img/a.png"));
    }

    #[test]
    fn ignores_doc_comment_lookalikes_in_strings() {
        let source = "\
public class Doc {
    String s = \"/** not a comment */\";
}
";
        assert!(doc_comments(source).is_empty());
    }

    #[test]
    fn spans_are_absolute_byte_ranges() {
        let source = "package pkg;\n/** doc */\nclass A {}\n";
        let language = language_for_path(Path::new("A.java")).expect("java language");
        let spans =
            doc_comment_spans(Path::new("A.java"), source, &language).expect("parseable");
        assert_eq!(spans.len(), 1);
        assert_eq!(&source[spans[0].clone()], "/** doc */");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(language_for_path(Path::new("notes.txt")).is_err());
    }
}
