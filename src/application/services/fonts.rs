//! Decorative Unicode fonts for reply text

use serde::{Deserialize, Serialize};

/// Alphabet used when styling outgoing text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontStyle {
    Plain,
    #[default]
    Monospace,
    SansBold,
    SmallCaps,
}

const SMALL_CAPS: [char; 26] = [
    'ᴀ', 'ʙ', 'ᴄ', 'ᴅ', 'ᴇ', 'ꜰ', 'ɢ', 'ʜ', 'ɪ', 'ᴊ', 'ᴋ', 'ʟ', 'ᴍ',
    'ɴ', 'ᴏ', 'ᴘ', 'ǫ', 'ʀ', 's', 'ᴛ', 'ᴜ', 'ᴠ', 'ᴡ', 'x', 'ʏ', 'ᴢ',
];

impl FontStyle {
    /// Code point bases for (uppercase, lowercase, digits)
    fn bases(&self) -> Option<(u32, u32, u32)> {
        match self {
            FontStyle::Monospace => Some((0x1D670, 0x1D68A, 0x1D7F6)),
            FontStyle::SansBold => Some((0x1D5D4, 0x1D5EE, 0x1D7EC)),
            FontStyle::Plain | FontStyle::SmallCaps => None,
        }
    }

    fn map_char(&self, c: char) -> char {
        if let FontStyle::SmallCaps = self {
            return match c {
                'a'..='z' => SMALL_CAPS[(c as u32 - 'a' as u32) as usize],
                _ => c,
            };
        }

        let Some((upper, lower, digit)) = self.bases() else {
            return c;
        };

        let mapped = match c {
            'A'..='Z' => char::from_u32(upper + (c as u32 - 'A' as u32)),
            'a'..='z' => char::from_u32(lower + (c as u32 - 'a' as u32)),
            '0'..='9' => char::from_u32(digit + (c as u32 - '0' as u32)),
            _ => None,
        };
        mapped.unwrap_or(c)
    }
}

/// Restyle `text`, leaving words that must stay machine-readable untouched:
/// mentions, URLs and command hints starting with `prefix`.
pub fn apply_font(style: FontStyle, text: &str, prefix: &str) -> String {
    if style == FontStyle::Plain {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() * 2);
    let mut word = String::new();

    let flush = |word: &mut String, out: &mut String| {
        let bare = word.trim_start_matches(['*', '_', '~', '(', '[']);
        let keep = bare.starts_with('@')
            || bare.contains("://")
            || (!prefix.is_empty() && bare.starts_with(prefix));
        if keep {
            out.push_str(word);
        } else {
            out.extend(word.chars().map(|c| style.map_char(c)));
        }
        word.clear();
    };

    for c in text.chars() {
        if c.is_whitespace() {
            flush(&mut word, &mut out);
            out.push(c);
        } else {
            word.push(c);
        }
    }
    flush(&mut word, &mut out);

    out
}
