//! Field extraction from a parsed profile document.

use scraper::{ElementRef, Html, Node, Selector};

use super::strategies::{clean, find_name, first_text};
use crate::types::profile::Profile;

const HEADLINE: &str = ".text-body-medium.break-words";
const LOCATION: &str = ".text-body-small.inline.t-black--light.break-words";
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript"];

/// Extract a profile from page HTML. Returns `None` when no name is found.
pub fn parse_profile(html: &str) -> Option<Profile> {
    let doc = Html::parse_document(html);
    let name = find_name(&doc)?;

    Some(Profile {
        name,
        headline: first_text(&doc, HEADLINE).unwrap_or_default(),
        location: first_text(&doc, LOCATION).unwrap_or_default(),
        education: section_items(&doc, "education"),
        experience: section_items(&doc, "experience"),
        patents: link_mentions(&doc, "patent"),
        activities: link_mentions(&doc, "activity"),
        full_text: visible_text(&doc),
    })
}

/// List item texts of the first `section[aria-label]` whose label contains `label`.
fn section_items(doc: &Html, label: &str) -> Vec<String> {
    let (Ok(sections), Ok(items)) = (Selector::parse("section[aria-label]"), Selector::parse("li"))
    else {
        return Vec::new();
    };

    let section = doc.select(&sections).find(|section| {
        section
            .value()
            .attr("aria-label")
            .is_some_and(|aria| aria.to_lowercase().contains(label))
    });

    section
        .map(|section| {
            section
                .select(&items)
                .map(|li| clean(&li.text().collect::<String>()))
                .filter(|text| !text.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Texts of anchors whose text or href mentions `keyword`.
fn link_mentions(doc: &Html, keyword: &str) -> Vec<String> {
    let Ok(anchors) = Selector::parse("a") else {
        return Vec::new();
    };

    doc.select(&anchors)
        .filter_map(|anchor| {
            let text = clean(&anchor.text().collect::<String>());
            let href = anchor.value().attr("href").unwrap_or_default();
            let mentions = text.to_lowercase().contains(keyword)
                || href.to_lowercase().contains(keyword);
            (mentions && !text.is_empty()).then_some(text)
        })
        .collect()
}

/// Whitespace-collapsed text of the body, skipping non-rendered content.
pub fn visible_text(doc: &Html) -> String {
    let root = Selector::parse("body")
        .ok()
        .and_then(|body| doc.select(&body).next())
        .unwrap_or_else(|| doc.root_element());

    let mut parts = Vec::new();
    collect_text(root, &mut parts);
    clean(&parts.join(" "))
}

fn collect_text<'a>(element: ElementRef<'a>, parts: &mut Vec<&'a str>) {
    let value = element.value();
    if SKIPPED_TAGS.contains(&value.name())
        || value.attr("hidden").is_some()
        || value.attr("aria-hidden") == Some("true")
    {
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => parts.push(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, parts);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
          <head><title>Jane Doe | Profiles</title><style>.x { color: red }</style></head>
          <body>
            <h1 class="text-heading-xlarge">Jane Doe</h1>
            <div class="text-body-medium break-words">Staff Engineer at Acme</div>
            <span class="text-body-small inline t-black--light break-words">Oslo, Norway</span>
            <section aria-label="Experience">
              <ul><li> Acme, 2019 -  now </li><li>Initech</li><li>  </li></ul>
            </section>
            <section aria-label="Education"><ul><li>NTNU</li></ul></section>
            <a href="/patents/123">Widget patent</a>
            <a href="/recent-activity/">See all</a>
            <a href="/in/other">Other person</a>
            <script>var secret = 1;</script>
            <div hidden>invisible</div>
            <span aria-hidden="true">decorative</span>
          </body>
        </html>
    "#;

    #[test]
    fn test_parses_all_fields() {
        let profile = parse_profile(PAGE).unwrap();

        assert_eq!(profile.name, "Jane Doe");
        assert_eq!(profile.headline, "Staff Engineer at Acme");
        assert_eq!(profile.location, "Oslo, Norway");
        assert_eq!(profile.experience, vec!["Acme, 2019 - now", "Initech"]);
        assert_eq!(profile.education, vec!["NTNU"]);
        assert_eq!(profile.patents, vec!["Widget patent"]);
        assert_eq!(profile.activities, vec!["See all"]);
    }

    #[test]
    fn test_visible_text_skips_hidden_content() {
        let profile = parse_profile(PAGE).unwrap();

        assert!(profile.full_text.starts_with("Jane Doe Staff Engineer at Acme"));
        assert!(!profile.full_text.contains("secret"));
        assert!(!profile.full_text.contains("invisible"));
        assert!(!profile.full_text.contains("decorative"));
        assert!(!profile.full_text.contains("color"));
    }

    #[test]
    fn test_no_name_is_none() {
        assert!(parse_profile("<html><body><p>Feed</p></body></html>").is_none());
    }
}
