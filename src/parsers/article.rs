//! Article page parser.
//!
//! Article metadata comes from the `application/ld+json` structured-data
//! blocks embedded in the page; the block typed `NewsArticle` carries the
//! body text, author, publish date, description and keywords. The page may
//! embed the block as a single object or inside an array, and individual
//! fields vary in shape (author as string or object, keywords as array or
//! comma-joined string), so extraction is defensive per field.

use super::element_text;
use crate::error::{HarvestError, Result};
use crate::models::{ArticleRecord, FetchOutcome, LinkRecord};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::trace;

static LABEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.label.label--standard-primary").unwrap());
static LD_JSON: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

/// Extract an [`ArticleRecord`] from raw article markup.
///
/// Fails with [`HarvestError::EmptyArticle`] when no `NewsArticle` block is
/// present; the archive serves such pages intermittently under load, so the
/// caller treats this as retryable.
pub fn parse_article(html: &str, entry: &LinkRecord) -> Result<ArticleRecord> {
    let document = Html::parse_document(html);

    let label = document
        .select(&LABEL)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let news_article = document
        .select(&LD_JSON)
        .filter_map(|script| {
            let raw = script.text().collect::<String>();
            serde_json::from_str::<Value>(&raw).ok()
        })
        .find_map(|data| match data {
            Value::Array(items) => items.into_iter().find(is_news_article),
            value if is_news_article(&value) => Some(value),
            _ => None,
        })
        .ok_or_else(|| HarvestError::EmptyArticle {
            link: entry.link.clone(),
        })?;

    let record = ArticleRecord {
        link: entry.clone(),
        label,
        article_body: string_field(&news_article, "articleBody"),
        date_published: published_date(&news_article),
        author: author_text(news_article.get("author")),
        description: string_field(&news_article, "description"),
        taglist: keywords(news_article.get("keywords")),
        outcome: FetchOutcome::Success,
    };
    trace!(
        link = %entry.link,
        body_bytes = record.article_body.len(),
        tags = record.taglist.len(),
        "Parsed article page"
    );
    Ok(record)
}

fn is_news_article(value: &Value) -> bool {
    value.get("@type").and_then(Value::as_str) == Some("NewsArticle")
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// `datePublished` with a `dateModified` fallback; some archive pages only
/// carry the latter.
fn published_date(value: &Value) -> String {
    let published = string_field(value, "datePublished");
    if published.is_empty() {
        string_field(value, "dateModified")
    } else {
        published
    }
}

/// Author appears as a plain string, a `{"name": ..}` object, or an array
/// of either.
fn author_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(name)) => name.clone(),
        Some(Value::Object(map)) => map
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| author_text(Some(item)))
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}

/// Keywords appear as an array of strings or one comma-joined string.
fn keywords(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
