use hyphenation::{Hyphenator, Language, Load, Standard};

use crate::types::{Result, TypesetError};

/// Source of permissible hyphenation points.
///
/// Break points are character offsets into `word`, strictly between its first
/// and last character, in ascending order.
pub trait Hyphenate: Send + Sync {
    fn break_points(&self, word: &str) -> Vec<usize>;
}

/// Pattern-based hyphenation backed by an embedded TeX dictionary
pub struct Dictionary {
    standard: Standard,
}

impl Dictionary {
    pub fn english() -> Result<Self> {
        Self::load(Language::EnglishUS)
    }

    pub fn load(language: Language) -> Result<Self> {
        let standard = Standard::from_embedded(language)
            .map_err(|e| TypesetError::Hyphenation(format!("{language:?}: {e:?}")))?;
        Ok(Self { standard })
    }
}

impl Hyphenate for Dictionary {
    fn break_points(&self, word: &str) -> Vec<usize> {
        let chars: Vec<char> = word.chars().collect();

        // Leading and trailing punctuation takes no part in the patterns.
        let Some(start) = chars.iter().position(|c| c.is_alphabetic()) else {
            return Vec::new();
        };
        let end = chars
            .iter()
            .rposition(|c| c.is_alphabetic())
            .map_or(start, |i| i + 1);

        let mut points = Vec::new();
        for (offset, segment) in segments(&chars[start..end]) {
            let lowered = segment.to_lowercase();
            if lowered.chars().count() != segment.chars().count() {
                continue;
            }
            let hyphenated = self.standard.hyphenate(&lowered);
            points.extend(
                hyphenated
                    .breaks
                    .iter()
                    .map(|&byte| start + offset + lowered[..byte].chars().count()),
            );
        }

        // Existing hard hyphens are always acceptable break points.
        points.extend(
            chars
                .iter()
                .enumerate()
                .filter(|&(i, &c)| c == '-' && i + 1 < chars.len() && i > 0)
                .map(|(i, _)| i + 1),
        );

        points.retain(|&p| p > 0 && p < chars.len());
        points.sort_unstable();
        points.dedup();
        points
    }
}

/// Alphabetic runs of a word with their character offsets.
fn segments(chars: &[char]) -> Vec<(usize, String)> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut begin = 0;
    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphabetic() {
            if current.is_empty() {
                begin = i;
            }
            current.push(c);
        } else if !current.is_empty() {
            result.push((begin, std::mem::take(&mut current)));
        }
    }
    if !current.is_empty() {
        result.push((begin, current));
    }
    result
}

/// Never breaks a word
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHyphenation;

impl Hyphenate for NoHyphenation {
    fn break_points(&self, _word: &str) -> Vec<usize> {
        Vec::new()
    }
}

/// Rightmost break point whose left part, plus a hyphen unless it already
/// ends in one, fits into `available` columns.
pub fn wrap_point(hyphenator: &dyn Hyphenate, word: &str, available: usize) -> Option<usize> {
    let chars: Vec<char> = word.chars().collect();
    hyphenator
        .break_points(word)
        .into_iter()
        .rev()
        .filter(|&p| p > 0 && p < chars.len())
        .find(|&p| {
            let needed = if chars[p - 1] == '-' { p } else { p + 1 };
            needed <= available
        })
}
