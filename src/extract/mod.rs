//! HTML element extraction.
//!
//! Fetches documentation pages and converts every matched element into a
//! normalized [`RawElement`] record in document order. Anchors become
//! Markdown links (with relative hrefs resolved against the page URL), lists
//! collapse into one Markdown blob per list element, and fenced code blocks
//! are rebuilt from `<pre><code>` pairs. The resulting flat record stream is
//! the input to [`crate::group`].

use reqwest::Client;
use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::config::UrlProcessing;
use crate::types::PipelineError;

/// HTML tags the extractor knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    P,
    Pre,
    Code,
    Ul,
    Ol,
    Li,
    A,
}

impl Tag {
    /// Tags extracted when the configuration does not name any.
    pub const DEFAULT_SET: [Tag; 8] = [
        Tag::H1,
        Tag::H2,
        Tag::H3,
        Tag::H4,
        Tag::P,
        Tag::Pre,
        Tag::Li,
        Tag::Ul,
    ];

    /// Lowercase HTML name of the tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::H1 => "h1",
            Tag::H2 => "h2",
            Tag::H3 => "h3",
            Tag::H4 => "h4",
            Tag::H5 => "h5",
            Tag::H6 => "h6",
            Tag::P => "p",
            Tag::Pre => "pre",
            Tag::Code => "code",
            Tag::Ul => "ul",
            Tag::Ol => "ol",
            Tag::Li => "li",
            Tag::A => "a",
        }
    }

    fn from_name(name: &str) -> Option<Tag> {
        match name {
            "h1" => Some(Tag::H1),
            "h2" => Some(Tag::H2),
            "h3" => Some(Tag::H3),
            "h4" => Some(Tag::H4),
            "h5" => Some(Tag::H5),
            "h6" => Some(Tag::H6),
            "p" => Some(Tag::P),
            "pre" => Some(Tag::Pre),
            "code" => Some(Tag::Code),
            "ul" => Some(Tag::Ul),
            "ol" => Some(Tag::Ol),
            "li" => Some(Tag::Li),
            "a" => Some(Tag::A),
            _ => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized record per matched HTML element.
///
/// `length` counts Unicode scalar values of `text`, matching the persisted
/// artifact format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawElement {
    pub source: String,
    pub tag: Tag,
    pub text: String,
    pub length: usize,
}

impl RawElement {
    /// Builds a record, deriving `length` from the text.
    pub fn new(source: impl Into<String>, tag: Tag, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            source: source.into(),
            tag,
            length: text.chars().count(),
            text,
        }
    }
}

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches pages and extracts tagged records from them.
#[derive(Debug, Clone)]
pub struct Extractor {
    client: Client,
    options: UrlProcessing,
}

impl Extractor {
    /// Creates an extractor with its own HTTP client (rustls, fixed timeout).
    pub fn new(options: UrlProcessing) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .user_agent(concat!("docsmith/", env!("CARGO_PKG_VERSION")))
            .timeout(FETCH_TIMEOUT)
            .use_rustls_tls()
            .build()?;
        Ok(Self { client, options })
    }

    /// Creates an extractor around an existing client.
    pub fn with_client(client: Client, options: UrlProcessing) -> Self {
        Self { client, options }
    }

    /// URL-processing options in effect.
    pub fn options(&self) -> &UrlProcessing {
        &self.options
    }

    /// Fetches one page and extracts every matching element in document order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Fetch`] on transport failure or a non-2xx
    /// status; the caller decides whether to skip the URL.
    pub async fn scrape_page(
        &self,
        url: &str,
        tags: &[Tag],
    ) -> Result<Vec<RawElement>, PipelineError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| PipelineError::Fetch {
                url: url.to_string(),
                source,
            })?;
        let body = response.text().await.map_err(|source| PipelineError::Fetch {
            url: url.to_string(),
            source,
        })?;
        extract_elements(&body, url, tags, &self.options)
    }

    /// Scrapes every URL in order, skipping URLs that fail to fetch.
    ///
    /// Failures are logged and the loop continues; the aggregate keeps the
    /// input URL order, which the downstream grouper depends on.
    pub async fn scrape_urls(&self, urls: &[String], tags: &[Tag]) -> Vec<RawElement> {
        let mut data = Vec::new();
        tracing::info!(urls = urls.len(), "starting scrape");
        for (position, url) in urls.iter().enumerate() {
            tracing::info!(url = %url, page = position + 1, total = urls.len(), "scraping url");
            match self.scrape_page(url, tags).await {
                Ok(batch) => {
                    tracing::info!(url = %url, elements = batch.len(), "extracted elements");
                    data.extend(batch);
                }
                Err(err) => {
                    tracing::error!(url = %url, error = %err, "failed to scrape url, skipping");
                }
            }
        }
        tracing::info!(total = data.len(), "scrape complete");
        data
    }
}

/// Extracts tagged records from already-fetched HTML.
///
/// `li` elements nested inside an extracted `ul`/`ol` are skipped — the list
/// element already renders them — so only bare list items produce their own
/// record. Elements whose rendered text is empty are dropped.
pub fn extract_elements(
    html: &str,
    page_url: &str,
    tags: &[Tag],
    options: &UrlProcessing,
) -> Result<Vec<RawElement>, PipelineError> {
    if tags.is_empty() {
        return Ok(Vec::new());
    }

    let css = tags
        .iter()
        .map(|tag| tag.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let selector =
        Selector::parse(&css).map_err(|err| PipelineError::InvalidDocument(err.to_string()))?;
    let anchor_selector =
        Selector::parse("a").map_err(|err| PipelineError::InvalidDocument(err.to_string()))?;
    let code_selector =
        Selector::parse("code").map_err(|err| PipelineError::InvalidDocument(err.to_string()))?;

    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    let mut elements = Vec::new();
    for element in document.select(&selector) {
        if element.value().name() == "li" && inside_extracted_list(element, tags) {
            continue;
        }
        if let Some(record) = process_element(
            element,
            page_url,
            base.as_ref(),
            options,
            &anchor_selector,
            &code_selector,
        ) {
            elements.push(record);
        }
    }
    Ok(elements)
}

fn process_element(
    element: ElementRef,
    source: &str,
    base: Option<&Url>,
    options: &UrlProcessing,
    anchor_selector: &Selector,
    code_selector: &Selector,
) -> Option<RawElement> {
    let name = element.value().name();
    let (tag, text) = match name {
        "pre" => match element.select(code_selector).next() {
            // The fenced block carries the original code content; the
            // effective tag becomes `code`.
            Some(code) => (Tag::Code, format!("```\n{}\n```", raw_text(code))),
            None => (Tag::Pre, raw_text(element)),
        },
        "p" => {
            if element.select(anchor_selector).next().is_some() {
                (Tag::P, render_with_links(element, base, options))
            } else {
                (Tag::P, raw_text(element))
            }
        }
        "ul" | "ol" => {
            let tag = if name == "ul" { Tag::Ul } else { Tag::Ol };
            let mut lines = Vec::new();
            for item in element
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|child| child.value().name() == "li")
            {
                list_item_lines(item, base, options, anchor_selector, &mut lines);
            }
            (tag, lines.join("\n"))
        }
        "li" => {
            let mut lines = Vec::new();
            list_item_lines(element, base, options, anchor_selector, &mut lines);
            (Tag::Li, lines.join("\n"))
        }
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => (Tag::from_name(name)?, raw_text(element)),
        "a" => (Tag::A, render_anchor(element, base, options)),
        _ => (Tag::from_name(name)?, spaced_text(element)),
    };

    if text.is_empty() {
        return None;
    }
    Some(RawElement::new(source, tag, text))
}

/// One Markdown list line per anchor, or one plain-text line when the item
/// carries no anchors.
fn list_item_lines(
    item: ElementRef,
    base: Option<&Url>,
    options: &UrlProcessing,
    anchor_selector: &Selector,
    lines: &mut Vec<String>,
) {
    let anchors: Vec<ElementRef> = item.select(anchor_selector).collect();
    if anchors.is_empty() {
        lines.push(format!("- {}", spaced_text(item)));
        return;
    }
    for anchor in anchors {
        let link_text = anchor_text(anchor);
        let href = anchor.value().attr("href").map(str::trim).unwrap_or("");
        if href.is_empty() {
            lines.push(format!("- {link_text}"));
        } else {
            lines.push(format!(
                "- [{link_text}]({})",
                resolve_href(href, base, options)
            ));
        }
    }
}

fn render_anchor(element: ElementRef, base: Option<&Url>, options: &UrlProcessing) -> String {
    let link_text = anchor_text(element);
    let href = element.value().attr("href").map(str::trim).unwrap_or("");
    if href.is_empty() {
        link_text
    } else {
        format!("[{link_text}]({})", resolve_href(href, base, options))
    }
}

/// Rebuilds a paragraph left to right, replacing each anchor with Markdown
/// link syntax and keeping the intervening text whitespace-collapsed.
fn render_with_links(element: ElementRef, base: Option<&Url>, options: &UrlProcessing) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut buffer = String::new();
    collect_linked_parts(element, base, options, &mut parts, &mut buffer);
    flush_text(&mut parts, &mut buffer);
    parts.join(" ")
}

fn collect_linked_parts(
    element: ElementRef,
    base: Option<&Url>,
    options: &UrlProcessing,
    parts: &mut Vec<String>,
    buffer: &mut String,
) {
    for node in element.children() {
        match node.value() {
            Node::Text(text) => buffer.push_str(text),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(node) else {
                    continue;
                };
                if child.value().name() == "a" {
                    flush_text(parts, buffer);
                    parts.push(render_anchor(child, base, options));
                } else {
                    collect_linked_parts(child, base, options, parts, buffer);
                }
            }
            _ => {}
        }
    }
}

fn flush_text(parts: &mut Vec<String>, buffer: &mut String) {
    let collapsed = buffer.split_whitespace().collect::<Vec<_>>().join(" ");
    buffer.clear();
    if !collapsed.is_empty() {
        parts.push(collapsed);
    }
}

/// Resolution never fails: malformed hrefs and unparsable page URLs pass
/// through unchanged.
fn resolve_href(href: &str, base: Option<&Url>, options: &UrlProcessing) -> String {
    if !options.resolve_relative_urls {
        return href.to_string();
    }
    let Some(base) = base else {
        return href.to_string();
    };
    match base.join(href) {
        Ok(resolved) => {
            let resolved = String::from(resolved);
            if options.log_url_changes && resolved != href {
                tracing::debug!(original = href, resolved = %resolved, "resolved relative href");
            }
            resolved
        }
        Err(_) => href.to_string(),
    }
}

fn inside_extracted_list(element: ElementRef, tags: &[Tag]) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| match ancestor.value().name() {
            "ul" => tags.contains(&Tag::Ul),
            "ol" => tags.contains(&Tag::Ol),
            _ => false,
        })
}

/// Concatenated text content, trimmed at the ends only.
fn raw_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text fragments trimmed and joined with single spaces.
fn spaced_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Anchor label: fragments trimmed and concatenated.
fn anchor_text(element: ElementRef) -> String {
    element.text().map(str::trim).collect::<String>()
}
