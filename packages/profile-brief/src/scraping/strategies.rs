//! Ranked name-extraction strategies.
//!
//! Profile pages ship several header layouts. Each strategy knows one of
//! them; [`find_name`] tries them in order and keeps the first non-empty
//! result.

use scraper::{Html, Selector};

/// One way of finding the profile name in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStrategy {
    /// Text of the first element matching a CSS selector
    Element(&'static str),

    /// `og:title` meta content, up to the first `|`
    OpenGraphTitle,

    /// Document `<title>`, up to the first `|`. Only used when the title
    /// contains a `|`, since bare titles are site names.
    DocumentTitle,
}

/// Strategies in the order they are tried.
pub const NAME_STRATEGIES: &[NameStrategy] = &[
    NameStrategy::Element(r#"h1[data-test-id="hero-title"]"#),
    NameStrategy::Element("h1.text-heading-xlarge"),
    NameStrategy::Element(".text-heading-xlarge"),
    NameStrategy::Element("h1"),
    NameStrategy::OpenGraphTitle,
    NameStrategy::DocumentTitle,
    NameStrategy::Element(r#"section div span[dir="ltr"]"#),
];

impl NameStrategy {
    /// Run this strategy. Returns `None` unless it yields non-empty text.
    pub fn extract(&self, doc: &Html) -> Option<String> {
        let raw = match self {
            Self::Element(css) => first_text(doc, css)?,
            Self::OpenGraphTitle => {
                let selector = Selector::parse(r#"meta[property="og:title"]"#).ok()?;
                let content = doc.select(&selector).next()?.value().attr("content")?;
                before_pipe(content).to_string()
            }
            Self::DocumentTitle => {
                let title = first_text(doc, "title")?;
                if !title.contains('|') {
                    return None;
                }
                before_pipe(&title).to_string()
            }
        };

        let cleaned = clean(&raw);
        (!cleaned.is_empty()).then_some(cleaned)
    }
}

/// Find the profile name with the first strategy that succeeds.
pub fn find_name(doc: &Html) -> Option<String> {
    NAME_STRATEGIES.iter().find_map(|strategy| strategy.extract(doc))
}

/// Collapse runs of whitespace and trim.
pub fn clean(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleaned text of the first element matching `css`.
pub fn first_text(doc: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    let element = doc.select(&selector).next()?;
    Some(clean(&element.text().collect::<String>()))
}

fn before_pipe(text: &str) -> &str {
    text.split('|').next().unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Html {
        Html::parse_document(body)
    }

    #[test]
    fn test_hero_title_wins() {
        let html = doc(
            r#"<h1 class="text-heading-xlarge">Classic</h1>
               <h1 data-test-id="hero-title">  Jane   Doe </h1>"#,
        );
        assert_eq!(find_name(&html).as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_empty_heading_falls_through() {
        let html = doc(
            r#"<head><meta property="og:title" content="Jane Doe | Profile"></head>
               <body><h1>   </h1></body>"#,
        );
        assert_eq!(find_name(&html).as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_title_without_pipe_ignored() {
        let html = doc("<head><title>Profiles</title></head><body></body>");
        assert_eq!(find_name(&html), None);

        let html = doc("<head><title>Jane Doe | Profiles</title></head><body></body>");
        assert_eq!(find_name(&html).as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_small_screen_span() {
        let html = doc(r#"<section><div><span dir="ltr">Jane Doe</span></div></section>"#);
        assert_eq!(find_name(&html).as_deref(), Some("Jane Doe"));
    }
}
