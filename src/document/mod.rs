//! Parsed page model shared by every checker
//!
//! A [`Document`] wraps one parsed HTML body plus its derived plain text.
//! It is built once per run and is read-only afterwards. The underlying
//! `scraper::Html` is not thread-safe, so a document stays on the task that
//! created it.

mod jsonld;
mod text;

use crate::url::AnalysisTarget;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::fmt;
use thiserror::Error;
use url::Url;

pub use jsonld::{json_ld_nodes, node_types, JsonLdBlock};
pub use text::{element_text, normalize_whitespace};

/// Document construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("Failed to parse document: {0}")]
    Parse(String),
}

/// Parser strategies, tried in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// Full HTML document parse
    Document,
    /// Lenient fragment parse for markup without a document shell
    Fragment,
}

impl ParseStrategy {
    pub const ORDER: [ParseStrategy; 2] = [ParseStrategy::Document, ParseStrategy::Fragment];

    fn parse(self, markup: &str) -> Html {
        match self {
            Self::Document => Html::parse_document(markup),
            Self::Fragment => Html::parse_fragment(markup),
        }
    }
}

impl fmt::Display for ParseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => f.write_str("document"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// A hyperlink found on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Absolute URL after resolution against the page
    pub url: Url,
    /// The raw `href` attribute
    pub href: String,
    /// Normalized anchor text
    pub text: String,
    /// The `rel` attribute, if any
    pub rel: Option<String>,
}

/// Queryable, read-only parsed page
pub struct Document {
    html: Html,
    strategy: ParseStrategy,
    text: String,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("strategy", &self.strategy)
            .field("text_len", &self.text.len())
            .finish()
    }
}

impl Document {
    /// Parses markup, trying each [`ParseStrategy`] in turn
    ///
    /// A strategy is accepted when the resulting tree has real content: an
    /// element beyond the implied `html`/`head`/`body` shell, or some
    /// non-whitespace text.
    ///
    /// # Errors
    ///
    /// `DocumentError::Parse` for binary markup (NUL bytes) or when no
    /// strategy yields content (empty or whitespace-only input).
    ///
    /// # Example
    ///
    /// ```
    /// use llmo_audit::document::Document;
    ///
    /// let doc = Document::parse("<h1>Hello</h1><p>World</p>").unwrap();
    /// assert_eq!(doc.text(), "Hello World");
    /// assert!(Document::parse("   ").is_err());
    /// ```
    pub fn parse(markup: &str) -> Result<Self, DocumentError> {
        if markup.contains('\0') {
            return Err(DocumentError::Parse(
                "markup contains NUL bytes".to_string(),
            ));
        }

        for strategy in ParseStrategy::ORDER {
            let html = strategy.parse(markup);
            if has_content(&html) {
                tracing::debug!(
                    "Parsed markup with {} strategy ({} recoverable errors)",
                    strategy,
                    html.errors.len()
                );
                let text = text::extract_text(&html);
                return Ok(Self {
                    html,
                    strategy,
                    text,
                });
            }
            tracing::debug!("{} strategy produced no content", strategy);
        }

        Err(DocumentError::Parse(
            "no parser strategy produced any content".to_string(),
        ))
    }

    /// The strategy that produced this document
    pub fn strategy(&self) -> ParseStrategy {
        self.strategy
    }

    /// Plain text of the page with whitespace collapsed
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Elements matching a CSS selector, in document order
    ///
    /// An invalid selector matches nothing.
    pub fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.html.select(&selector).collect(),
            Err(e) => {
                tracing::debug!("Invalid selector {:?}: {}", css, e);
                Vec::new()
            }
        }
    }

    /// Elements whose tag name is one of `tags`, in document order
    pub fn find_by_tags(&self, tags: &[&str]) -> Vec<ElementRef<'_>> {
        self.elements()
            .filter(|el| tags.iter().any(|t| el.value().name().eq_ignore_ascii_case(t)))
            .collect()
    }

    /// Elements with a class matching `pattern`
    ///
    /// Restricted to `tags` unless `tags` is empty.
    pub fn find_by_class_pattern(&self, tags: &[&str], pattern: &Regex) -> Vec<ElementRef<'_>> {
        self.elements()
            .filter(|el| {
                tags.is_empty() || tags.iter().any(|t| el.value().name().eq_ignore_ascii_case(t))
            })
            .filter(|el| el.value().classes().any(|class| pattern.is_match(class)))
            .collect()
    }

    /// Content of the first `<meta>` whose `name` or `property` equals `key`
    ///
    /// Keys compare case-insensitively; blank content is ignored.
    pub fn meta_content(&self, key: &str) -> Option<String> {
        self.find_by_tags(&["meta"]).into_iter().find_map(|meta| {
            let el = meta.value();
            let matches = ["name", "property"]
                .iter()
                .filter_map(|attr| el.attr(attr))
                .any(|value| value.trim().eq_ignore_ascii_case(key));
            if !matches {
                return None;
            }
            el.attr("content")
                .map(str::trim)
                .filter(|content| !content.is_empty())
                .map(str::to_string)
        })
    }

    /// Every `<script type="application/ld+json">` block, parsed best-effort
    ///
    /// Blank blocks are skipped; malformed JSON yields [`JsonLdBlock::Invalid`].
    pub fn json_ld_blocks(&self) -> Vec<JsonLdBlock> {
        self.find_by_tags(&["script"])
            .into_iter()
            .filter(|script| {
                script
                    .value()
                    .attr("type")
                    .map(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
                    .unwrap_or(false)
            })
            .filter_map(|script| {
                let raw: String = script.text().collect();
                let raw = raw.trim();
                if raw.is_empty() {
                    None
                } else {
                    Some(JsonLdBlock::parse(raw))
                }
            })
            .collect()
    }

    /// Anchors with an `href`, resolved against the page URL
    ///
    /// Fragment-only and unresolvable hrefs are skipped. Non-HTTP schemes
    /// such as `mailto:` are kept.
    pub fn links(&self, base: &AnalysisTarget) -> Vec<Link> {
        self.find_by_tags(&["a"])
            .into_iter()
            .filter_map(|anchor| {
                let href = anchor.value().attr("href")?;
                let url = base.resolve(href)?;
                Some(Link {
                    url,
                    href: href.trim().to_string(),
                    text: element_text(anchor),
                    rel: anchor.value().attr("rel").map(str::to_string),
                })
            })
            .collect()
    }

    fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html.root_element().descendants().filter_map(ElementRef::wrap)
    }
}

/// True if the tree holds anything beyond the implied document shell
fn has_content(html: &Html) -> bool {
    html.tree.nodes().any(|node| match node.value() {
        Node::Element(el) => !matches!(el.name(), "html" | "head" | "body"),
        Node::Text(text) => !text.trim().is_empty(),
        _ => false,
    })
}
