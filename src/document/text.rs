//! Plain-text extraction

use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose text never counts as page content
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Collapses every whitespace run to a single space and trims the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized text of one element
pub fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Extracts page text
///
/// The primary path walks `<body>` (or the whole tree for fragments) and
/// skips non-content elements. If that yields nothing, every text node in
/// the tree is concatenated instead.
pub(crate) fn extract_text(html: &Html) -> String {
    let primary = visible_text(html);
    if !primary.is_empty() {
        return primary;
    }

    tracing::debug!("Primary text extraction was empty; concatenating all text nodes");
    leaf_text(html)
}

fn visible_text(html: &Html) -> String {
    let root = Selector::parse("body")
        .ok()
        .and_then(|body| html.select(&body).next())
        .unwrap_or_else(|| html.root_element());

    let mut words: Vec<&str> = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|el| NON_CONTENT_TAGS.contains(&el.name()))
                .unwrap_or(false)
        });
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }
    words.join(" ")
}

fn leaf_text(html: &Html) -> String {
    let mut words: Vec<&str> = Vec::new();
    for node in html.tree.root().descendants() {
        if let Node::Text(text) = node.value() {
            words.extend(text.split_whitespace());
        }
    }
    words.join(" ")
}
