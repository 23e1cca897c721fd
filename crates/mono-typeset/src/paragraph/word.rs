use super::token::StyledToken;

/// Tokens between two word breaks: text fragments plus any markers inside
/// or around them, e.g. `<b>any</b>` or `trav<i>elling</i>.`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Word {
    pub tokens: Vec<StyledToken>,
}

impl Word {
    /// Group a token stream into words at its word breaks.
    ///
    /// Empty groups (consecutive breaks) are dropped; groups holding only
    /// markers are kept so that their markers reach the output.
    pub fn split_stream(tokens: Vec<StyledToken>) -> Vec<Word> {
        let mut words = Vec::new();
        let mut current = Vec::new();
        for token in tokens {
            if token == StyledToken::WordBreak {
                if !current.is_empty() {
                    words.push(Word {
                        tokens: std::mem::take(&mut current),
                    });
                }
            } else {
                current.push(token);
            }
        }
        if !current.is_empty() {
            words.push(Word { tokens: current });
        }
        words
    }

    /// Visible characters in the word
    pub fn len(&self) -> usize {
        self.tokens.iter().map(StyledToken::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visible text with markers stripped
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .filter_map(|token| match token {
                StyledToken::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Split before the visible character at `index`.
    ///
    /// Markers that precede the split character stay with the left part,
    /// so `trav<i>elling</i>` split at 4 gives `trav<i>` and `elling</i>`.
    pub fn split_at(&self, index: usize) -> (Word, Word) {
        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut seen = 0;
        let mut split = false;

        for token in &self.tokens {
            if split {
                right.push(token.clone());
                continue;
            }
            match token {
                StyledToken::Text(text) => {
                    let len = text.chars().count();
                    if index < seen + len {
                        let byte = text
                            .char_indices()
                            .nth(index - seen)
                            .map_or(text.len(), |(byte, _)| byte);
                        let (head, tail) = text.split_at(byte);
                        if !head.is_empty() {
                            left.push(StyledToken::text(head));
                        }
                        right.push(StyledToken::text(tail));
                        split = true;
                    } else {
                        left.push(token.clone());
                    }
                    seen += len;
                }
                _ => left.push(token.clone()),
            }
        }

        (Word { tokens: left }, Word { tokens: right })
    }

    /// Whether the visible text already ends in a hyphen
    pub fn ends_with_hyphen(&self) -> bool {
        self.tokens
            .iter()
            .rev()
            .find_map(|token| match token {
                StyledToken::Text(text) if !text.is_empty() => Some(text.ends_with('-')),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Append a hyphen to the last text fragment, inside any trailing markers.
    pub fn push_hyphen(&mut self) {
        let last_text = self
            .tokens
            .iter_mut()
            .rev()
            .find_map(|token| match token {
                StyledToken::Text(text) => Some(text),
                _ => None,
            });
        match last_text {
            Some(text) => text.push('-'),
            None => self.tokens.push(StyledToken::text("-")),
        }
    }
}
