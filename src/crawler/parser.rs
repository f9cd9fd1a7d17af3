//! HTML parser for quote listings, author pages and the tag cloud
//!
//! Everything here is synchronous and returns owned data, so no
//! `scraper::Html` value ever lives across an `.await`.

use crate::model::Tag;
use crate::HarvestError;
use scraper::{ElementRef, Html, Selector};

/// Number of leading characters ("in ") before the birth place text
const BORN_LOCATION_PREFIX_LEN: usize = 3;

/// One quote block as found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteBlock {
    /// The quotation text
    pub text: String,

    /// Tags in document order
    pub tags: Vec<Tag>,

    /// Author display name, used as the registry key
    pub author_name: String,

    /// Absolute URL of the author's detail page
    pub author_url: String,
}

/// Biography fields parsed from an author page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorDetails {
    pub born_date: String,
    pub born_location: String,
    pub description: String,
}

/// Parses all quote blocks (`div.quote`) of a listing page
///
/// Blocks missing their text, author name or author link are skipped with
/// a warning; the remaining blocks keep their document order.
///
/// # Example
///
/// ```
/// use quote_harvester::crawler::parse_quote_blocks;
///
/// let html = r#"<div class="quote">
///     <span class="text">“Hi.”</span>
///     <small class="author">Ann</small> <a href="/author/Ann">(about)</a>
///     <a class="tag" href="/tag/greeting/">greeting</a>
/// </div>"#;
/// let blocks = parse_quote_blocks(html, "https://quotes.example.com").unwrap();
/// assert_eq!(blocks[0].author_url, "https://quotes.example.com/author/Ann");
/// ```
pub fn parse_quote_blocks(html: &str, base_url: &str) -> Result<Vec<QuoteBlock>, HarvestError> {
    let document = Html::parse_document(html);

    let quote_selector = create_selector("div.quote")?;
    let text_selector = create_selector("span.text")?;
    let tag_selector = create_selector("a.tag")?;
    let author_selector = create_selector("small.author")?;
    let link_selector = create_selector("a[href]")?;

    let mut blocks = Vec::new();
    for (index, quote_div) in document.select(&quote_selector).enumerate() {
        let text = quote_div.select(&text_selector).next().map(element_text);
        let author_name = quote_div.select(&author_selector).next().map(element_text);
        let author_href = quote_div
            .select(&link_selector)
            .next()
            .and_then(|link| link.value().attr("href"));

        let (Some(text), Some(author_name), Some(author_href)) = (text, author_name, author_href)
        else {
            tracing::warn!("Skipping quote block {}: missing text, author or link", index);
            continue;
        };

        let tags = quote_div
            .select(&tag_selector)
            .map(|tag| Tag::from_name(base_url, element_text(tag).trim()))
            .collect();

        blocks.push(QuoteBlock {
            text,
            tags,
            author_name,
            author_url: resolve_href(base_url, author_href),
        });
    }

    Ok(blocks)
}

/// Parses birth date, birth place and description from an author page
///
/// Returns `Ok(None)` when any of the three elements is missing.
pub fn parse_author_details(html: &str) -> Result<Option<AuthorDetails>, HarvestError> {
    let document = Html::parse_document(html);

    let born_date_selector = create_selector("span.author-born-date")?;
    let born_location_selector = create_selector("span.author-born-location")?;
    let description_selector = create_selector("div.author-description")?;

    let born_date = document.select(&born_date_selector).next().map(element_text);
    let born_location = document
        .select(&born_location_selector)
        .next()
        .map(element_text);
    let description = document
        .select(&description_selector)
        .next()
        .map(element_text);

    let (Some(born_date), Some(born_location), Some(description)) =
        (born_date, born_location, description)
    else {
        return Ok(None);
    };

    Ok(Some(AuthorDetails {
        born_date,
        born_location: born_location
            .chars()
            .skip(BORN_LOCATION_PREFIX_LEN)
            .collect(),
        description: description.trim().to_string(),
    }))
}

/// Parses the landing page tag cloud (`div.tags-box a.tag`)
///
/// Returns `Ok(None)` when the tag cloud container is absent.
pub fn parse_top_tags(html: &str, base_url: &str) -> Result<Option<Vec<Tag>>, HarvestError> {
    let document = Html::parse_document(html);

    let box_selector = create_selector("div.tags-box")?;
    let tag_selector = create_selector("a.tag")?;

    let Some(tags_box) = document.select(&box_selector).next() else {
        return Ok(None);
    };

    let tags = tags_box
        .select(&tag_selector)
        .map(|tag| Tag::from_name(base_url, element_text(tag).trim()))
        .collect();

    Ok(Some(tags))
}

#[inline]
fn create_selector(css: &str) -> Result<Selector, HarvestError> {
    Selector::parse(css).map_err(|_| HarvestError::Selector(css.to_string()))
}

/// Concatenated text of an element and its descendants
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Site-relative hrefs are appended to the base URL; absolute ones are kept
fn resolve_href(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{}{}", base_url, href)
    }
}
