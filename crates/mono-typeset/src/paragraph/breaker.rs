use log::trace;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use super::hyphenate::{Dictionary, Hyphenate, NoHyphenation, wrap_point};
use super::token::{Inline, Marker, StyledToken, flatten};
use super::word::Word;
use crate::format::Formatter;
use crate::settings::Settings;
use crate::types::{Alignment, Result, TypesetError};

/// A laid-out line: text, padding and balanced markers, with exactly the
/// target width in visible characters unless a single word overflowed it.
pub type Line = Vec<StyledToken>;

/// Post-processing applied to every text fragment of a line before output
pub type TextFilter = fn(&str) -> String;

/// How finished lines are turned into strings
#[derive(Clone, Copy, Default)]
pub struct EmitOptions<'a> {
    /// Renders markers; without one markers are dropped
    pub formatter: Option<&'a dyn Formatter>,
    pub text_filter: Option<TextFilter>,
}

impl<'a> EmitOptions<'a> {
    pub fn formatter(formatter: &'a dyn Formatter) -> Self {
        Self {
            formatter: Some(formatter),
            text_filter: None,
        }
    }

    pub fn with_filter(mut self, filter: TextFilter) -> Self {
        self.text_filter = Some(filter);
        self
    }
}

/// Line item during wrapping: a token, or an inter-word gap with its
/// extra justification spaces.
#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Token(StyledToken),
    Gap(usize),
}

/// Breaks styled text into fixed-width lines.
///
/// The breaker owns its random source so that justification is reproducible:
/// two breakers built with the same seed produce identical output for the
/// same sequence of calls.
pub struct LineBreaker {
    hyphenator: Box<dyn Hyphenate>,
    rng: ChaCha8Rng,
}

impl LineBreaker {
    pub fn new(hyphenator: impl Hyphenate + 'static, seed: u64) -> Self {
        Self {
            hyphenator: Box::new(hyphenator),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// English hyphenation with the given justification seed
    pub fn english(seed: u64) -> Result<Self> {
        Ok(Self::new(Dictionary::english()?, seed))
    }

    pub fn without_hyphenation(seed: u64) -> Self {
        Self::new(NoHyphenation, seed)
    }

    /// Breaker configured by the document settings
    pub fn for_settings(settings: &Settings) -> Result<Self> {
        if settings.hyphenate {
            Self::english(settings.seed)
        } else {
            Ok(Self::without_hyphenation(settings.seed))
        }
    }

    /// Restart the justification sequence.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Lay out rich text and emit each line as a string.
    pub fn align(
        &mut self,
        elements: &[Inline],
        alignment: Alignment,
        width: usize,
        options: EmitOptions<'_>,
    ) -> Result<Vec<String>> {
        let lines = self.align_lines(elements, alignment, width)?;
        Ok(lines.iter().map(|line| emit(line, options)).collect())
    }

    /// Lay out rich text into token lines.
    pub fn align_lines(
        &mut self,
        elements: &[Inline],
        alignment: Alignment,
        width: usize,
    ) -> Result<Vec<Line>> {
        self.break_tokens(flatten(elements), alignment, width)
    }

    /// Lay out an already flattened token stream.
    pub fn break_tokens(
        &mut self,
        tokens: Vec<StyledToken>,
        alignment: Alignment,
        width: usize,
    ) -> Result<Vec<Line>> {
        if width == 0 {
            return Err(TypesetError::Config(
                "Line width must be greater than 0".to_string(),
            ));
        }

        let mut lines = self.wrap(Word::split_stream(tokens), width)?;
        trace!("Wrapped paragraph into {} lines at width {}", lines.len(), width);

        if alignment == Alignment::Justify {
            self.justify(&mut lines, width);
        }

        Ok(lines
            .into_iter()
            .map(|line| pad(line, alignment, width))
            .collect())
    }

    fn wrap(&self, words: Vec<Word>, width: usize) -> Result<Vec<Vec<Slot>>> {
        let mut wrapper = Wrapper::default();
        if words.is_empty() {
            return Ok(Vec::new());
        }

        for word in words {
            let mut pending = Some(word);
            while let Some(word) = pending.take() {
                let available = width.saturating_sub(wrapper.line_len());
                if word.len() <= available {
                    wrapper.append(word)?;
                    continue;
                }

                let text = word.text();
                if let Some(at) = wrap_point(self.hyphenator.as_ref(), &text, available) {
                    let (mut left, right) = word.split_at(at);
                    if !left.ends_with_hyphen() {
                        left.push_hyphen();
                    }
                    wrapper.append(left)?;
                    wrapper.end_line();
                    pending = Some(right);
                } else if wrapper.has_words() {
                    wrapper.end_line();
                    pending = Some(word);
                } else {
                    // Nothing fits and nothing can be split: let it overflow.
                    wrapper.append(word)?;
                }
            }
        }

        wrapper.finish()
    }

    /// Stretch every line but the last to the full width by widening
    /// randomly chosen inter-word gaps.
    fn justify(&mut self, lines: &mut [Vec<Slot>], width: usize) {
        let Some((_, body)) = lines.split_last_mut() else {
            return;
        };
        for line in body {
            let missing = width.saturating_sub(visible_len(line));
            let gaps: Vec<usize> = line
                .iter()
                .enumerate()
                .filter(|(_, slot)| matches!(slot, Slot::Gap(_)))
                .map(|(i, _)| i)
                .collect();
            if missing == 0 || gaps.is_empty() {
                continue;
            }

            let mut population = gaps.clone();
            while population.len() < missing {
                population.extend_from_slice(&gaps);
            }
            let chosen: Vec<usize> = population
                .choose_multiple(&mut self.rng, missing)
                .copied()
                .collect();
            for index in chosen {
                if let Slot::Gap(extra) = &mut line[index] {
                    *extra += 1;
                }
            }
        }
    }
}

/// Accumulates lines while words are appended, tracking open markers so
/// every line can be closed and the next one reopened.
#[derive(Default)]
struct Wrapper {
    lines: Vec<Vec<Slot>>,
    current: Vec<Slot>,
    open: Vec<Marker>,
}

impl Wrapper {
    fn line_len(&self) -> usize {
        self.current
            .iter()
            .map(|slot| match slot {
                Slot::Token(token) => token.len(),
                Slot::Gap(extra) => 1 + extra,
            })
            .sum()
    }

    fn has_words(&self) -> bool {
        self.current
            .iter()
            .any(|slot| matches!(slot, Slot::Token(StyledToken::Text(_))))
    }

    fn append(&mut self, word: Word) -> Result<()> {
        let visible = word.len();
        for token in word.tokens {
            match &token {
                StyledToken::Open(marker) => self.open.push(marker.clone()),
                StyledToken::Close(marker) => {
                    let kind = marker.kind();
                    let position = self
                        .open
                        .iter()
                        .rposition(|m| m.kind() == kind)
                        .ok_or_else(|| TypesetError::Structure {
                            kind,
                            detail: "close marker without a matching open marker".to_string(),
                        })?;
                    self.open.remove(position);
                }
                _ => {}
            }
            self.current.push(Slot::Token(token));
        }
        if visible > 0 {
            self.current.push(Slot::Gap(0));
        }
        Ok(())
    }

    fn end_line(&mut self) {
        if matches!(self.current.last(), Some(Slot::Gap(_))) {
            self.current.pop();
        }
        for marker in self.open.iter().rev() {
            self.current.push(Slot::Token(StyledToken::Close(marker.clone())));
        }
        let reopened = self
            .open
            .iter()
            .map(|marker| Slot::Token(StyledToken::Open(marker.clone())))
            .collect();
        self.lines.push(std::mem::replace(&mut self.current, reopened));
    }

    fn finish(mut self) -> Result<Vec<Vec<Slot>>> {
        if let Some(marker) = self.open.last() {
            return Err(TypesetError::Structure {
                kind: marker.kind(),
                detail: "open marker is never closed".to_string(),
            });
        }
        self.end_line();
        Ok(self.lines)
    }
}

fn visible_len(line: &[Slot]) -> usize {
    line.iter()
        .map(|slot| match slot {
            Slot::Token(token) => token.len(),
            Slot::Gap(extra) => 1 + extra,
        })
        .sum()
}

/// Resolve gaps into spaces and pad the line to `width`.
fn pad(line: Vec<Slot>, alignment: Alignment, width: usize) -> Line {
    let padding = width.saturating_sub(visible_len(&line));
    let mut tokens: Line = line
        .into_iter()
        .map(|slot| match slot {
            Slot::Token(token) => token,
            Slot::Gap(extra) => StyledToken::Text(" ".repeat(1 + extra)),
        })
        .collect();
    if padding == 0 {
        return tokens;
    }

    let spaces = |n: usize| StyledToken::Text(" ".repeat(n));
    match alignment {
        Alignment::Left | Alignment::Justify => tokens.push(spaces(padding)),
        Alignment::Right => tokens.insert(0, spaces(padding)),
        Alignment::Center => {
            let left = padding / 2;
            if left > 0 {
                tokens.insert(0, spaces(left));
            }
            tokens.push(spaces(padding - left));
        }
    }
    tokens
}

/// Turn a finished line into its output string.
pub fn emit(line: &[StyledToken], options: EmitOptions<'_>) -> String {
    let filtered: Vec<StyledToken>;
    let line = match options.text_filter {
        Some(filter) => {
            filtered = line
                .iter()
                .map(|token| match token {
                    StyledToken::Text(text) => StyledToken::Text(filter(text)),
                    other => other.clone(),
                })
                .collect();
            &filtered[..]
        }
        None => line,
    };

    match options.formatter {
        Some(formatter) => formatter.format_line(line),
        None => line
            .iter()
            .filter_map(|token| match token {
                StyledToken::Text(text) => Some(text.as_str()),
                StyledToken::WordBreak => Some(" "),
                _ => None,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<Inline> {
        Inline::words(text)
    }

    fn plain(breaker: &mut LineBreaker, text: &str, alignment: Alignment, width: usize) -> Vec<String> {
        breaker
            .align(&words(text), alignment, width, EmitOptions::default())
            .unwrap()
    }

    #[test]
    fn test_left_alignment_pads_right() {
        let mut breaker = LineBreaker::without_hyphenation(1);
        let lines = plain(&mut breaker, "one two three", Alignment::Left, 9);
        assert_eq!(lines, vec!["one two  ", "three    "]);
    }

    #[test]
    fn test_right_and_center_alignment() {
        let mut breaker = LineBreaker::without_hyphenation(1);
        assert_eq!(plain(&mut breaker, "ab", Alignment::Right, 5), vec!["   ab"]);
        assert_eq!(plain(&mut breaker, "ab", Alignment::Center, 5), vec![" ab  "]);
    }

    #[test]
    fn test_justify_fills_all_but_last_line() {
        let mut breaker = LineBreaker::without_hyphenation(7);
        let lines = plain(&mut breaker, "aa bb cc dd ee ff gg", Alignment::Justify, 10);
        assert_eq!(lines.len(), 3);
        for line in &lines[..2] {
            assert_eq!(line.chars().count(), 10);
            assert!(line.starts_with("aa") || line.starts_with("dd"));
            assert!(!line.ends_with(' '));
        }
        assert_eq!(lines[2], "gg        ");
    }

    #[test]
    fn test_justify_single_word_line_is_left_padded() {
        let mut breaker = LineBreaker::without_hyphenation(7);
        let lines = plain(&mut breaker, "abcdefgh ij", Alignment::Justify, 9);
        assert_eq!(lines, vec!["abcdefgh ", "ij       "]);
    }

    #[test]
    fn test_overlong_word_overflows_alone() {
        let mut breaker = LineBreaker::without_hyphenation(1);
        let lines = plain(&mut breaker, "a supercalifragilistic b", Alignment::Left, 6);
        assert_eq!(lines, vec!["a     ", "supercalifragilistic", "b     "]);
    }

    #[test]
    fn test_empty_input_has_no_lines() {
        let mut breaker = LineBreaker::without_hyphenation(1);
        assert!(plain(&mut breaker, "", Alignment::Left, 10).is_empty());
    }

    #[test]
    fn test_zero_width_is_rejected() {
        let mut breaker = LineBreaker::without_hyphenation(1);
        let result = breaker.align(&words("x"), Alignment::Left, 0, EmitOptions::default());
        match result {
            Err(TypesetError::Config(msg)) => assert!(msg.contains("width")),
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_unbalanced_close_is_rejected() {
        let mut breaker = LineBreaker::without_hyphenation(1);
        let tokens = vec![StyledToken::text("x"), StyledToken::Close(Marker::Bold)];
        match breaker.break_tokens(tokens, Alignment::Left, 10) {
            Err(TypesetError::Structure { kind, .. }) => {
                assert_eq!(kind, crate::paragraph::MarkerKind::Bold)
            }
            _ => panic!("Expected Structure error"),
        }
    }

    #[test]
    fn test_unclosed_open_is_rejected() {
        let mut breaker = LineBreaker::without_hyphenation(1);
        let tokens = vec![StyledToken::Open(Marker::Italic), StyledToken::text("x")];
        assert!(matches!(
            breaker.break_tokens(tokens, Alignment::Left, 10),
            Err(TypesetError::Structure { .. })
        ));
    }

    #[test]
    fn test_text_filter_applies_to_text() {
        let mut breaker = LineBreaker::without_hyphenation(1);
        let options = EmitOptions::default().with_filter(|s| s.to_uppercase());
        let lines = breaker
            .align(&words("loud"), Alignment::Left, 6, options)
            .unwrap();
        assert_eq!(lines, vec!["LOUD  "]);
    }

    #[test]
    fn test_markers_closed_and_reopened_per_line() {
        let mut breaker = LineBreaker::without_hyphenation(1);
        let elements = vec![Inline::bold(words("aaa bbb"))];
        let lines = breaker.align_lines(&elements, Alignment::Left, 4).unwrap();
        assert_eq!(
            lines[0],
            vec![
                StyledToken::Open(Marker::Bold),
                StyledToken::text("aaa"),
                StyledToken::Close(Marker::Bold),
                StyledToken::text(" "),
            ]
        );
        assert_eq!(lines[1][0], StyledToken::Open(Marker::Bold));
    }
}
