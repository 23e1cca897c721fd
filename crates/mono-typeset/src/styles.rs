//! Unicode character styles: small capitals, circled and superscript digits

const SMALL_CAPS: [char; 26] = [
    'ᴀ', 'ʙ', 'ᴄ', 'ᴅ', 'ᴇ', 'ꜰ', 'ɢ', 'ʜ', 'ɪ', 'ᴊ', 'ᴋ', 'ʟ', 'ᴍ', 'ɴ', 'ᴏ', 'ᴘ', 'Q', 'ʀ', 'ꜱ',
    'ᴛ', 'ᴜ', 'ᴠ', 'ᴡ', 'x', 'ʏ', 'ᴢ',
];

const SUPERSCRIPT_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

/// Upper-case the text, then replace Latin capitals with small capitals.
///
/// Every character maps to exactly one character, so column counts are kept.
pub fn small_caps(text: &str) -> String {
    text.chars()
        .map(|c| {
            let mut upper = c.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(u), None) => u,
                _ => c,
            }
        })
        .map(|c| {
            if c.is_ascii_uppercase() {
                SMALL_CAPS[(c as u8 - b'A') as usize]
            } else {
                c
            }
        })
        .collect()
}

/// Circled form of a number: ① to ⑳, then ㉑ to ㊿.
///
/// Numbers without a circled glyph are written as `(n)`.
pub fn circled(n: usize) -> String {
    let glyph = match n {
        0 => Some('⓪'),
        1..=20 => char::from_u32(0x2460 + n as u32 - 1),
        21..=35 => char::from_u32(0x3251 + n as u32 - 21),
        36..=50 => char::from_u32(0x32B1 + n as u32 - 36),
        _ => None,
    };
    glyph.map_or_else(|| format!("({n})"), String::from)
}

/// Superscript digits for a number, as used for note marks.
pub fn superscript(n: usize) -> String {
    n.to_string()
        .bytes()
        .map(|digit| SUPERSCRIPT_DIGITS[(digit - b'0') as usize])
        .collect()
}

/// Identifier derived from a title: lower-case alphanumerics joined by `-`.
pub fn slug(title: &str) -> String {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
