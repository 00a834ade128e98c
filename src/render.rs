//! Mapping from article lists to display fragments.
//!
//! [`Renderer::render`] is pure: it turns `&[Article]` into a
//! [`DisplayFragment`], substituting fallback text for missing fields. The
//! fragment can be painted by the terminal UI or serialized with
//! [`DisplayFragment::to_html`], which escapes every interpolated value.
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::article::Article;
use crate::util::{escape_html, validate_url_for_open};

/// en-US short date, e.g. `3/15/2024`.
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

pub const UNTITLED: &str = "Untitled";
pub const NO_CONTENT: &str = "No content available";
pub const NO_RESULTS: &str = "No news items found.";
pub const UNKNOWN_DATE: &str = "Unknown date";

/// One rendered article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleCard {
    pub title: String,
    /// Present only for http(s) image URLs.
    pub image_url: Option<String>,
    pub body: String,
    pub date: String,
    /// Present only for http(s) links.
    pub read_more_url: Option<String>,
}

/// What the article panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayFragment {
    Loading { message: String },
    NoResults,
    Articles(Vec<ArticleCard>),
    Error { headline: String, detail: String },
}

impl DisplayFragment {
    pub fn loading(message: impl Into<String>) -> Self {
        Self::Loading {
            message: message.into(),
        }
    }

    pub fn error(headline: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Error {
            headline: headline.into(),
            detail: detail.into(),
        }
    }

    /// Number of article cards (0 for every non-article state).
    pub fn item_count(&self) -> usize {
        match self {
            Self::Articles(cards) => cards.len(),
            _ => 0,
        }
    }

    pub fn cards(&self) -> &[ArticleCard] {
        match self {
            Self::Articles(cards) => cards,
            _ => &[],
        }
    }

    /// HTML for the `.news-list` container. All text and URLs are escaped.
    pub fn to_html(&self) -> String {
        match self {
            Self::Loading { message } => {
                format!(r#"<div class="loading">{}</div>"#, escape_html(message))
            }
            Self::NoResults => format!(r#"<div class="no-results">{}</div>"#, NO_RESULTS),
            Self::Error { headline, detail } => format!(
                r#"<div class="error-message">{}<br><small>{}</small></div>"#,
                escape_html(headline),
                escape_html(detail)
            ),
            Self::Articles(cards) => cards.iter().map(card_html).collect(),
        }
    }

    /// Plain-text rendering for non-interactive output.
    pub fn to_plain_text(&self) -> String {
        match self {
            Self::Loading { message } => message.clone(),
            Self::NoResults => NO_RESULTS.to_string(),
            Self::Error { headline, detail } => format!("{headline}\n{detail}"),
            Self::Articles(cards) => cards
                .iter()
                .map(|card| {
                    let mut block = format!("{}\n{}\n{}", card.title, card.body, card.date);
                    if let Some(url) = &card.read_more_url {
                        block.push_str(&format!("\nRead More: {url}"));
                    }
                    block
                })
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}

fn card_html(card: &ArticleCard) -> String {
    let title = escape_html(&card.title);
    let image = card
        .image_url
        .as_deref()
        .map(|src| {
            format!(
                r#"<div class="news-image"><img src="{}" alt="{}" onerror="this.style.display='none'"></div>"#,
                escape_html(src),
                title
            )
        })
        .unwrap_or_default();
    let read_more = card
        .read_more_url
        .as_deref()
        .map(|href| {
            format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer" class="read-more">Read More</a>"#,
                escape_html(href)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="news-item"><div class="news-title">{}</div>{}<div class="news-content">{}</div><div class="news-meta"><span>{}</span>{}</div></div>"#,
        title,
        image,
        escape_html(&card.body),
        escape_html(&card.date),
        read_more
    )
}

/// Keeps a URL only if it is a web link; `javascript:` and friends are dropped.
fn web_url(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    match validate_url_for_open(raw) {
        Ok(_) => Some(raw.trim().to_string()),
        Err(e) => {
            tracing::debug!(url = raw, error = %e, "Dropping non-web URL from article");
            None
        }
    }
}

/// Turns articles into display fragments.
#[derive(Debug, Clone)]
pub struct Renderer {
    date_format: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl Renderer {
    /// Creates a renderer with a chrono date format. An unparseable format
    /// falls back to [`DEFAULT_DATE_FORMAT`] (chrono panics when displaying
    /// an invalid format, so it is rejected up front).
    pub fn new(date_format: &str) -> Self {
        let valid = !date_format.is_empty()
            && !StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error));
        if !valid {
            tracing::warn!(
                date_format,
                "Invalid date format, using {}",
                DEFAULT_DATE_FORMAT
            );
            return Self::default();
        }
        Self {
            date_format: date_format.to_string(),
        }
    }

    /// Empty input yields [`DisplayFragment::NoResults`]; otherwise one card
    /// per article, in order.
    pub fn render(&self, articles: &[Article]) -> DisplayFragment {
        if articles.is_empty() {
            return DisplayFragment::NoResults;
        }
        DisplayFragment::Articles(articles.iter().map(|a| self.card(a)).collect())
    }

    pub fn card(&self, article: &Article) -> ArticleCard {
        ArticleCard {
            title: article.title().unwrap_or(UNTITLED).to_string(),
            image_url: web_url(article.image()),
            body: article.body().unwrap_or(NO_CONTENT).to_string(),
            date: self.format_date(article.published()),
            read_more_url: web_url(article.link()),
        }
    }

    /// Formats a published timestamp in the local timezone.
    ///
    /// Accepts RFC 3339, RFC 2822, naive `YYYY-MM-DDTHH:MM:SS` (local time),
    /// bare `YYYY-MM-DD` (UTC midnight) and epoch milliseconds.
    pub fn format_date(&self, raw: Option<&str>) -> String {
        match raw.and_then(parse_timestamp) {
            Some(ts) => ts
                .with_timezone(&Local)
                .format(&self.date_format)
                .to_string(),
            None => UNKNOWN_DATE.to_string(),
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    if let Ok(millis) = raw.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn local_date(rfc3339: &str) -> String {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Local)
            .format(DEFAULT_DATE_FORMAT)
            .to_string()
    }

    #[test]
    fn test_empty_input_is_no_results() {
        let fragment = Renderer::default().render(&[]);
        assert_eq!(fragment, DisplayFragment::NoResults);
        assert_eq!(fragment.item_count(), 0);
        assert!(fragment.to_html().contains("no-results"));
    }

    #[test]
    fn test_title_only_article_uses_fallbacks() {
        let fragment = Renderer::default().render(&[Article::titled("A")]);
        let cards = fragment.cards();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "A");
        assert_eq!(cards[0].body, NO_CONTENT);
        assert_eq!(cards[0].image_url, None);
        assert_eq!(cards[0].read_more_url, None);
        assert_eq!(cards[0].date, UNKNOWN_DATE);

        let html = fragment.to_html();
        assert!(!html.contains("news-image"));
        assert!(!html.contains("read-more"));
    }

    #[test]
    fn test_untitled_fallback() {
        let card = Renderer::default().card(&Article::default());
        assert_eq!(card.title, UNTITLED);
    }

    #[test]
    fn test_full_card() {
        let article = Article::from(json!({
            "title": "Rates hold",
            "description": "Unchanged.",
            "urlToImage": "https://img.example.com/a.jpg",
            "publishedAt": "2024-03-15T12:00:00Z",
            "url": "https://example.com/a"
        }));
        let card = Renderer::default().card(&article);
        assert_eq!(card.image_url.as_deref(), Some("https://img.example.com/a.jpg"));
        assert_eq!(card.read_more_url.as_deref(), Some("https://example.com/a"));
        assert_eq!(card.date, local_date("2024-03-15T12:00:00Z"));

        let html = DisplayFragment::Articles(vec![card]).to_html();
        assert!(html.contains(r#"onerror="this.style.display='none'""#));
        assert!(html.contains(r#"target="_blank""#));
    }

    #[test]
    fn test_untrusted_text_is_escaped() {
        let article = Article::from(json!({
            "title": "<script>alert('t')</script>",
            "description": "<img src=x onerror=alert(1)>",
            "url": "https://example.com/?a=1&b=\"2\""
        }));
        let html = Renderer::default().render(&[article]).to_html();
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<img src=x"));
        assert!(html.contains("&lt;script&gt;alert(&#39;t&#39;)&lt;/script&gt;"));
        assert!(html.contains("a=1&amp;b=&quot;2&quot;"));
    }

    #[test]
    fn test_script_urls_are_dropped() {
        let article = Article::from(json!({
            "title": "x",
            "urlToImage": "javascript:alert(1)",
            "url": "javascript:alert(2)"
        }));
        let card = Renderer::default().card(&article);
        assert_eq!(card.image_url, None);
        assert_eq!(card.read_more_url, None);
    }

    #[test]
    fn test_error_fragment_escapes_detail() {
        let html = DisplayFragment::error("Failed to load news.", "<b>boom</b>").to_html();
        assert!(html.contains("error-message"));
        assert!(html.contains("&lt;b&gt;boom&lt;/b&gt;"));
    }

    #[test]
    fn test_date_formats() {
        let renderer = Renderer::new("%Y-%m-%d");
        assert_eq!(renderer.format_date(Some("2024-01-02")).len(), 10);
        assert_eq!(
            renderer.format_date(Some("Fri, 15 Mar 2024 12:00:00 +0000")),
            DateTime::parse_from_rfc3339("2024-03-15T12:00:00Z")
                .unwrap()
                .with_timezone(&Local)
                .format("%Y-%m-%d")
                .to_string()
        );
        assert_eq!(
            renderer.format_date(Some("2024-03-15T12:00:00")),
            "2024-03-15"
        );
        assert_eq!(renderer.format_date(Some("1710504000000")).len(), 10);
        assert_eq!(renderer.format_date(Some("yesterday")), UNKNOWN_DATE);
        assert_eq!(renderer.format_date(None), UNKNOWN_DATE);
    }

    #[test]
    fn test_invalid_date_format_falls_back() {
        let renderer = Renderer::new("%Q%");
        assert_eq!(
            renderer.format_date(Some("2024-03-15T12:00:00Z")),
            local_date("2024-03-15T12:00:00Z")
        );
    }

    #[test]
    fn test_plain_text_includes_link() {
        let article = Article::from(json!({ "title": "T", "url": "https://e.example.com" }));
        let text = Renderer::default().render(&[article]).to_plain_text();
        assert!(text.starts_with("T\n"));
        assert!(text.contains("Read More: https://e.example.com"));
    }

    proptest! {
        #[test]
        fn prop_one_card_per_article(titles in proptest::collection::vec(proptest::option::of(".{0,20}"), 1..20)) {
            let articles: Vec<Article> = titles
                .into_iter()
                .map(|t| Article { title: t, ..Article::default() })
                .collect();
            let fragment = Renderer::default().render(&articles);
            prop_assert_eq!(fragment.item_count(), articles.len());
            prop_assert_eq!(fragment.to_html().matches(r#"class="news-item""#).count(), articles.len());
        }
    }
}
