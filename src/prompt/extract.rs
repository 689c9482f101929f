//! Reconstruction of literal text from string nodes.
//!
//! The extractor yields an ordered fragment sequence: `Static` fragments
//! carry compile-time-known characters, `Dynamic` fragments stand in for
//! interpolated sub-expressions whose runtime value is unknowable. Callers
//! that need a flat string concatenate only the static fragments; callers
//! that detect injection look for any dynamic fragment.

use crate::core::syntax::{NodeId, NodeKind, SyntaxTree};

#[derive(Clone, Debug, PartialEq)]
pub enum Fragment {
    /// Literal characters, escape sequences resolved.
    Static(String),
    /// Embedded sub-expression substituted at runtime.
    Dynamic(NodeId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExtractedText {
    pub fragments: Vec<Fragment>,
}

impl ExtractedText {
    /// Concatenation of the static fragments in order: the conservative,
    /// compile-time-known subset of the node's text.
    pub fn static_text(&self) -> String {
        self.fragments
            .iter()
            .filter_map(|f| match f {
                Fragment::Static(s) => Some(s.as_str()),
                Fragment::Dynamic(_) => None,
            })
            .collect()
    }

    pub fn has_dynamic(&self) -> bool {
        self.fragments
            .iter()
            .any(|f| matches!(f, Fragment::Dynamic(_)))
    }
}

/// Extract the fragment sequence of a string node.
///
/// Plain literals yield a single static fragment; composite strings yield
/// one fragment per child. Any other node kind, and any all-static result
/// whose text is blank, yields `None` ("nothing to check"). A result with a
/// dynamic fragment is never blank: its runtime text is unknowable rather
/// than empty.
pub fn extract_text(tree: &SyntaxTree, node: NodeId) -> Option<ExtractedText> {
    match tree.kind(node) {
        NodeKind::StringLiteral => {
            let value: String = tree
                .children(node)
                .iter()
                .filter(|&&c| tree.kind(c) == NodeKind::StringContent)
                .map(|&c| fragment_text(tree.text(c)))
                .collect();
            if value.trim().is_empty() {
                return None;
            }
            Some(ExtractedText {
                fragments: vec![Fragment::Static(value)],
            })
        }
        NodeKind::CompositeString => {
            let fragments: Vec<Fragment> = tree
                .children(node)
                .iter()
                .map(|&c| match tree.kind(c) {
                    NodeKind::StringContent => Fragment::Static(fragment_text(tree.text(c))),
                    _ => Fragment::Dynamic(c),
                })
                .collect();
            if fragments.is_empty() {
                return None;
            }
            let text = ExtractedText { fragments };
            if !text.has_dynamic() && text.static_text().trim().is_empty() {
                return None;
            }
            Some(text)
        }
        _ => None,
    }
}

/// Numeric value of an integer or float literal, flattened to `f64`.
pub fn numeric_value(tree: &SyntaxTree, node: NodeId) -> Option<f64> {
    match tree.kind(node) {
        NodeKind::IntLiteral | NodeKind::FloatLiteral => {
            tree.text(node).replace('_', "").parse().ok()
        }
        _ => None,
    }
}

fn fragment_text(raw: &str) -> String {
    if raw.starts_with('\\') {
        unescape(raw)
    } else {
        raw.to_string()
    }
}

/// Resolve the common escape sequences; anything unrecognized is kept raw.
fn unescape(raw: &str) -> String {
    let mut chars = raw.chars();
    let (Some('\\'), Some(escaped)) = (chars.next(), chars.next()) else {
        return raw.to_string();
    };
    match escaped {
        'n' => "\n".to_string(),
        't' => "\t".to_string(),
        'r' => "\r".to_string(),
        's' => " ".to_string(),
        '\\' | '"' | '\'' | '#' => escaped.to_string(),
        _ => raw.to_string(),
    }
}

/// Heredoc delimiter sniff: does the single raw source line preceding
/// `start` open a heredoc tagged `tag`?
///
/// The tree does not expose the author-chosen heredoc tag as data, so this
/// is a textual fallback. It is bounded to exactly one line; it never scans
/// the rest of the source buffer.
pub fn opens_heredoc_with_tag(source: &str, start: usize, tag: &str) -> bool {
    opening_line(source, start)
        .map(|line| line_declares_heredoc(line, tag))
        .unwrap_or(false)
}

fn opening_line(source: &str, start: usize) -> Option<&str> {
    let head = source.get(..start)?;
    let head = head.strip_suffix('\n').unwrap_or(head);
    let head = head.strip_suffix('\r').unwrap_or(head);
    if head.is_empty() {
        return None;
    }
    let begin = head.rfind('\n').map(|i| i + 1).unwrap_or(0);
    Some(&head[begin..])
}

fn line_declares_heredoc(line: &str, tag: &str) -> bool {
    let mut search = line;
    while let Some(idx) = search.find("<<") {
        let mut candidate = &search[idx + 2..];
        candidate = candidate.strip_prefix(['~', '-']).unwrap_or(candidate);
        let matched = match candidate.chars().next() {
            Some(quote @ ('\'' | '"' | '`')) => candidate[1..]
                .strip_prefix(tag)
                .map(|rest| rest.starts_with(quote))
                .unwrap_or(false),
            _ => candidate
                .strip_prefix(tag)
                .map(|rest| !rest.chars().next().map(is_ident_char).unwrap_or(false))
                .unwrap_or(false),
        };
        if matched {
            return true;
        }
        search = &search[idx + 2..];
    }
    false
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::ruby::parse_source;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn first_string(tree: &SyntaxTree) -> NodeId {
        tree.ids()
            .find(|&id| {
                matches!(
                    tree.kind(id),
                    NodeKind::StringLiteral | NodeKind::CompositeString
                )
            })
            .expect("source should contain a string")
    }

    #[test]
    fn plain_literal_is_one_static_fragment() {
        let tree = parse_source(r#"x = "You are an assistant.""#).unwrap();
        let text = extract_text(&tree, first_string(&tree)).unwrap();
        assert_eq!(
            text.fragments,
            vec![Fragment::Static("You are an assistant.".to_string())]
        );
        assert!(!text.has_dynamic());
    }

    #[test]
    fn composite_preserves_fragment_order() {
        let tree = parse_source(r#"x = "Hello #{name}, welcome to #{place}!""#).unwrap();
        let text = extract_text(&tree, first_string(&tree)).unwrap();
        assert!(text.has_dynamic());
        assert_eq!(text.static_text(), "Hello , welcome to !");
    }

    #[test]
    fn static_concatenation_reproduces_literal_portion() {
        let tree = parse_source(r#"x = "a\nb#{c}d\te""#).unwrap();
        let text = extract_text(&tree, first_string(&tree)).unwrap();
        assert_eq!(text.static_text(), "a\nbd\te");
    }

    #[test]
    fn blank_strings_extract_to_none() {
        let tree = parse_source(r#"x = "   ""#).unwrap();
        assert_eq!(extract_text(&tree, first_string(&tree)), None);

        let tree = parse_source(r#"x = """#).unwrap();
        assert_eq!(extract_text(&tree, first_string(&tree)), None);
    }

    #[test]
    fn all_dynamic_composite_still_extracts() {
        let tree = parse_source(r##"x = "#{content}""##).unwrap();
        let text = extract_text(&tree, first_string(&tree)).unwrap();
        assert!(text.has_dynamic());
        assert_eq!(text.static_text(), "");
    }

    #[test]
    fn non_string_nodes_extract_to_none() {
        let tree = parse_source("x = 42").unwrap();
        let int = tree
            .ids()
            .find(|&id| tree.kind(id) == NodeKind::IntLiteral)
            .unwrap();
        assert_eq!(extract_text(&tree, int), None);
        assert_eq!(numeric_value(&tree, int), Some(42.0));
    }

    #[test]
    fn heredoc_static_text_covers_all_lines() {
        let tree = parse_source(indoc! {r#"
            x = <<~SYSTEM
              # Role
              You are helpful.
            SYSTEM
        "#})
        .unwrap();
        let text = extract_text(&tree, first_string(&tree)).unwrap();
        assert!(text.static_text().contains("# Role"));
        assert!(text.static_text().contains("You are helpful."));
    }

    #[test]
    fn sniff_finds_tag_on_opening_line() {
        let source = indoc! {r#"
            prompt = <<~SYSTEM
              content
            SYSTEM
        "#};
        let tree = parse_source(source).unwrap();
        let node = first_string(&tree);
        let start = tree.span(node).start;
        assert!(opens_heredoc_with_tag(source, start, "SYSTEM"));
        assert!(!opens_heredoc_with_tag(source, start, "USER"));
    }

    #[test]
    fn sniff_matches_dashed_and_quoted_tags() {
        assert!(line_declares_heredoc("x = <<-SYSTEM", "SYSTEM"));
        assert!(line_declares_heredoc("x = <<~'SYSTEM'", "SYSTEM"));
        assert!(line_declares_heredoc("foo(<<~SYSTEM)", "SYSTEM"));
        assert!(!line_declares_heredoc("x = <<~SYSTEM_V2", "SYSTEM"));
        assert!(!line_declares_heredoc("x = a << b", "SYSTEM"));
    }
}
