//! Display cleanup for assistant replies.

use std::sync::LazyLock;

use regex::Regex;

/// Glyph that replaces asterisk list markers.
pub const BULLET: char = '•';

static LIST_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\*").expect("static regex is valid"));

/// Strip emphasis markers and turn asterisk list items into bullets.
///
/// Every `**` is removed, each line starting (after whitespace) with `*` gets
/// a bullet instead, and one newline is inserted before the first bullet so
/// the list starts on its own line.
pub fn format_reply(content: &str) -> String {
    let cleaned = content.replace("**", "");
    let bulleted = LIST_MARKER_RE.replace_all(&cleaned, "•").into_owned();

    match bulleted.find(BULLET) {
        Some(idx) => {
            let mut out = String::with_capacity(bulleted.len() + 1);
            out.push_str(&bulleted[..idx]);
            out.push('\n');
            out.push_str(&bulleted[idx..]);
            out
        }
        None => bulleted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_emphasis_and_converts_bullets() {
        assert_eq!(format_reply("**Hi** \n* a\n* b"), "Hi \n\n• a\n• b");
    }

    #[test]
    fn clean_text_is_unchanged() {
        let text = "Average engagement is highest for reels.\nCarousels come second.";
        assert_eq!(format_reply(text), text);
        assert_eq!(format_reply(&format_reply(text)), text);
    }

    #[test]
    fn empty_input() {
        assert_eq!(format_reply(""), "");
    }

    #[test]
    fn indented_markers_lose_their_indent() {
        assert_eq!(format_reply("List:\n   * one"), "List:\n\n• one");
    }

    #[test]
    fn marker_at_start_gets_leading_newline() {
        assert_eq!(format_reply("* only"), "\n• only");
    }

    #[test]
    fn inline_asterisk_is_kept() {
        assert_eq!(format_reply("2 * 3 = 6"), "2 * 3 = 6");
    }

    #[test]
    fn existing_bullet_gets_newline() {
        assert_eq!(format_reply("Top: • a"), "Top: \n• a");
    }

    #[test]
    fn blank_line_before_marker_is_consumed() {
        // Leading whitespace matched by the marker pattern spans line breaks.
        assert_eq!(format_reply("Intro\n\n* a"), "Intro\n\n• a");
    }
}
