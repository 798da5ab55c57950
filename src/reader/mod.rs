//! Configuration readers, one per descriptor dialect
//!
//! Readers parse one file at a time and write straight into the
//! [`ApplicationBuilder`](crate::model::ApplicationBuilder). A broken entry is
//! skipped with a diagnostic; a broken file fails only that file.

pub mod struts;
pub mod web_xml;

pub use struts::StrutsReader;
pub use web_xml::WebXmlReader;

use crate::diagnostics::Diagnostics;
use crate::error::DetectError;
use crate::model::{ApplicationBuilder, Component, MergeOutcome};
use regex::Regex;
use roxmltree::{Document, Node, ParsingOptions};
use std::borrow::Cow;
use std::sync::OnceLock;

/// Counts reported by a reader after one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadSummary {
    pub entries: usize,
    pub skipped: usize,
}

/// Parses descriptor text, allowing the DOCTYPE declarations older descriptors carry
pub(crate) fn parse_document<'input>(
    resource: &str,
    text: &'input str,
) -> Result<Document<'input>, DetectError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(text, options)
        .map_err(|e| DetectError::parse(resource, e.to_string()))
}

fn encoding_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"encoding\s*=\s*["']([A-Za-z0-9._-]+)["']"#).expect("valid regex")
    })
}

/// Encoding named in the `<?xml ...?>` declaration, lowercased
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if !bytes.starts_with(b"<?xml") {
        return None;
    }
    let end = bytes.windows(2).position(|w| w == b"?>")?;
    let prolog = String::from_utf8_lossy(&bytes[..end]);
    encoding_pattern()
        .captures(&prolog)
        .map(|c| c[1].to_ascii_lowercase())
}

/// Descriptor text in its declared encoding; anything but Latin-1 must be UTF-8
pub(crate) fn decode<'a>(resource: &str, bytes: &'a [u8]) -> Result<Cow<'a, str>, DetectError> {
    match declared_encoding(bytes).as_deref() {
        Some("iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "latin-1" | "l1") => {
            Ok(Cow::Owned(bytes.iter().map(|&b| b as char).collect()))
        }
        _ => std::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|e| DetectError::parse(resource, e.to_string())),
    }
}

/// Fails unless the root element has one of the given local names
pub(crate) fn expect_root<'a, 'input>(
    resource: &str,
    document: &'a Document<'input>,
    names: &[&str],
) -> Result<Node<'a, 'input>, DetectError> {
    let root = document.root_element();
    let name = root.tag_name().name();
    if names.contains(&name) {
        Ok(root)
    } else {
        Err(DetectError::parse(
            resource,
            format!("unexpected root element <{}>, expected <{}>", name, names.join("> or <")),
        ))
    }
}

/// Child elements with the given local name, ignoring namespaces
pub(crate) fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |c| c.is_element() && c.tag_name().name() == name)
}

/// Trimmed text of the first child element with the given name; blank counts as missing
pub(crate) fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Trimmed texts of every child element with the given name
pub(crate) fn child_texts(node: Node<'_, '_>, name: &str) -> Vec<String> {
    node.children()
        .filter(|c| c.is_element() && c.tag_name().name() == name)
        .filter_map(|c| c.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trimmed, non-blank attribute value
pub(crate) fn attribute(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.attribute(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Registers `component`, warning when it claims a kind unrelated to the stored one
pub(crate) fn register(
    app: &mut ApplicationBuilder,
    diagnostics: &mut Diagnostics,
    component: Component,
) -> MergeOutcome {
    let class_name = component.class_name().to_string();
    let outcome = app.register(component);
    if let MergeOutcome::Conflict { kept, rejected } = outcome {
        diagnostics.warn(
            format!(
                "{} is already registered as {}, ignoring its {} declaration",
                class_name, kept, rejected
            ),
            Some(&class_name),
        );
    }
    outcome
}

/// Human-readable position of a node for diagnostics
pub(crate) fn position(document: &Document<'_>, node: Node<'_, '_>) -> String {
    let pos = document.text_pos_at(node.range().start);
    format!("line {}", pos.row)
}
