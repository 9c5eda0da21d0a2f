//! Skull emoji classification.
//!
//! A skull-class emoji is one of the unicode skull glyphs, or any emoji whose
//! name contains "skull" (case-insensitive) but not "jollyskull". The
//! jollyskull is the substitute and must never be treated as a skull.

use crate::types::EmojiDescriptor;

/// Unicode skull glyphs. The variation-selector form precedes the bare
/// glyph so stripping removes the whole sequence.
const SKULL_GLYPHS: [&str; 3] = ["💀", "☠️", "☠"];

const SKULL: &str = "skull";
const SUBSTITUTE: &str = "jollyskull";

impl EmojiDescriptor {
    /// Identifier used by reaction endpoints: `name:id` for custom emoji,
    /// the literal glyph for unicode emoji.
    pub fn api_string(&self) -> String {
        match self.id {
            Some(id) => format!("{}:{}", self.name, id),
            None => self.name.clone(),
        }
    }
}

/// Returns true if the emoji should be replaced with the jollyskull.
pub fn is_skull_emoji(emoji: &EmojiDescriptor) -> bool {
    SKULL_GLYPHS.contains(&emoji.name.as_str()) || is_skull_name(&emoji.name)
}

/// Returns true if `content` consists of nothing but skull emoji and
/// whitespace. Empty and whitespace-only content never qualifies.
pub fn is_skull_only_content(content: &str) -> bool {
    let mut remaining: String = content
        .chars()
        .filter(|c| !matches!(c, ' ' | '\t' | '\n'))
        .collect();
    if remaining.is_empty() {
        return false;
    }

    for glyph in SKULL_GLYPHS {
        remaining = remaining.replace(glyph, "");
    }

    filter_custom_emojis(&remaining, is_skull_tag).is_empty()
}

fn is_skull_name(name: &str) -> bool {
    let name = name.to_lowercase();
    name.contains(SKULL) && !name.contains(SUBSTITUTE)
}

/// Custom emoji tags look like `<:name:id>` or `<a:name:id>`; the name is
/// the second `:`-separated field.
fn is_skull_tag(tag: &str) -> bool {
    tag.split(':').nth(1).is_some_and(is_skull_name)
}

/// Walk `<`...`>` spans, dropping those for which `should_remove` returns
/// true and keeping everything else verbatim. Tag shape is not validated,
/// and an unterminated trailing `<` is kept as-is.
fn filter_custom_emojis(content: &str, should_remove: impl Fn(&str) -> bool) -> String {
    let mut result = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find('<') {
        result.push_str(&rest[..start]);
        rest = &rest[start..];

        let Some(end) = rest.find('>') else {
            break;
        };

        let tag = &rest[..=end];
        rest = &rest[end + 1..];

        if !should_remove(tag) {
            result.push_str(tag);
        }
    }

    result.push_str(rest);
    result
}
