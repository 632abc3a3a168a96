//! Display formatting for summary text.

use regex::Regex;
use std::sync::LazyLock;

static SECTION_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"###\s*(Achievements/Experience|Icebreaker Questions)")
        .expect("section heading pattern is valid")
});

/// Promote the known section headings to bold lines.
///
/// `### Icebreaker Questions` becomes `**Icebreaker Questions**`. Other
/// markdown is left alone.
pub fn format_summary(text: &str) -> String {
    SECTION_HEADING.replace_all(text, "**$1**").into_owned()
}
