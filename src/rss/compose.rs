//! Post text composition for feed entries.

use crate::constants::{ABSTRACT_MARKER, MAX_CONTENT_CHARS, POST_SUFFIX};
use crate::rss::FeedEntry;

/// Build the post text for a feed entry.
///
/// The text is the short title, the link and the abstract on separate lines,
/// cut to [`MAX_CONTENT_CHARS`] characters, followed by [`POST_SUFFIX`]. The
/// suffix is appended even when nothing was cut.
#[must_use]
pub fn compose_post_text(entry: &FeedEntry) -> String {
    let title = short_title(&entry.title);
    let link = entry.link.trim();
    let abstract_text = extract_abstract(&entry.description);

    let body = format!("{title}\n{link}\n{abstract_text}");
    let mut text = truncate_chars(&body, MAX_CONTENT_CHARS).to_string();
    text.push_str(POST_SUFFIX);
    text
}

/// Text of the post published when a run finds nothing new.
#[must_use]
pub fn no_new_papers_text(subject: &str) -> String {
    format!("No new {subject} papers today{POST_SUFFIX}")
}

/// Title up to its first period.
fn short_title(title: &str) -> &str {
    title.split('.').next().unwrap_or_default().trim()
}

/// Abstract portion of an item description with paragraph tags removed.
///
/// Falls back to the whole description when there is no abstract marker.
fn extract_abstract(description: &str) -> String {
    let stripped = description.replace("<p>", "").replace("</p>", "");
    stripped
        .split_once(ABSTRACT_MARKER)
        .map_or(stripped.as_str(), |(_, rest)| rest)
        .trim()
        .to_string()
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, link: &str, description: &str) -> FeedEntry {
        FeedEntry {
            id: link.to_string(),
            title: title.to_string(),
            link: link.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_compose_short_entry_still_gets_suffix() {
        let text = compose_post_text(&entry(
            "Foo bar. baz",
            "http://x",
            "<p>Abstract: hello world</p>",
        ));
        assert_eq!(text, "Foo bar\nhttp://x\nhello world...📈🤖");
    }

    #[test]
    fn test_compose_truncates_long_abstract() {
        let description = format!("<p>Abstract: {}</p>", "lorem ipsum ".repeat(60));
        let text = compose_post_text(&entry(
            "A long paper. (arXiv:2401.00001v1 [stat.ME])",
            "https://arxiv.org/abs/2401.00001",
            &description,
        ));

        let content = text.strip_suffix(POST_SUFFIX).unwrap();
        assert_eq!(content.chars().count(), MAX_CONTENT_CHARS);
        assert!(content.starts_with("A long paper\nhttps://arxiv.org/abs/2401.00001\nlorem ipsum"));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let description = format!("Abstract: {}", "é".repeat(400));
        let text = compose_post_text(&entry("Accents", "https://arxiv.org/abs/1", &description));
        let content = text.strip_suffix(POST_SUFFIX).unwrap();
        assert_eq!(content.chars().count(), MAX_CONTENT_CHARS);
    }

    #[test]
    fn test_body_at_limit_is_kept_whole() {
        // "T\nL\n" is four characters.
        let abstract_text = "a".repeat(MAX_CONTENT_CHARS - 4);
        let text = compose_post_text(&entry("T", "L", &format!("Abstract: {abstract_text}")));

        assert_eq!(text, format!("T\nL\n{abstract_text}{POST_SUFFIX}"));
    }

    #[test]
    fn test_body_one_over_limit_loses_last_char() {
        let abstract_text = format!("{}z", "a".repeat(MAX_CONTENT_CHARS - 4));
        let text = compose_post_text(&entry("T", "L", &format!("Abstract: {abstract_text}")));

        let content = text.strip_suffix(POST_SUFFIX).unwrap();
        assert_eq!(content.chars().count(), MAX_CONTENT_CHARS);
        assert!(content.ends_with('a'));
    }

    #[test]
    fn test_truncate_chars_boundary() {
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abcd", 3), "abc");
        assert_eq!(truncate_chars("日本語の", 3), "日本語");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_abstract_after_announce_header() {
        let description = "arXiv:2401.00002v1 Announce Type: new \nAbstract: Synthetic controls are popular.";
        assert_eq!(extract_abstract(description), "Synthetic controls are popular.");
    }

    #[test]
    fn test_abstract_without_marker_uses_description() {
        assert_eq!(extract_abstract("<p> Just a summary. </p>"), "Just a summary.");
    }

    #[test]
    fn test_short_title() {
        assert_eq!(short_title("  Title without period "), "Title without period");
        assert_eq!(short_title("Causal inference. Part 2"), "Causal inference");
        assert_eq!(short_title(""), "");
    }

    #[test]
    fn test_no_new_papers_text() {
        assert_eq!(no_new_papers_text("econ.EM"), "No new econ.EM papers today...📈🤖");
    }
}
