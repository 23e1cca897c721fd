//! Rich text as a tree of inline elements and as a flat token stream
//!
//! Renderers describe styled text with [`Inline`] trees. The line breaker
//! works on the flattened form: a sequence of [`StyledToken`]s in which
//! every styled subtree becomes an open marker, its children, and a
//! matching close marker.

/// A style applied to a run of text, with whatever payload the output
/// formatter needs to render it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Marker {
    Bold,
    Italic,
    Code,
    /// Hex color such as `#aaaaaa`
    ForegroundColor(String),
    /// Hex color such as `#aaaaaa`
    BackgroundColor(String),
    /// Link target: `#identifier` for in-document references, or a URI
    CrossRef(String),
    /// Anchor identifier that cross references point at
    Anchor(String),
}

/// Payload-free discriminant of a [`Marker`]; open and close markers pair by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Bold,
    Italic,
    Code,
    ForegroundColor,
    BackgroundColor,
    CrossRef,
    Anchor,
}

impl Marker {
    pub fn kind(&self) -> MarkerKind {
        match self {
            Marker::Bold => MarkerKind::Bold,
            Marker::Italic => MarkerKind::Italic,
            Marker::Code => MarkerKind::Code,
            Marker::ForegroundColor(_) => MarkerKind::ForegroundColor,
            Marker::BackgroundColor(_) => MarkerKind::BackgroundColor,
            Marker::CrossRef(_) => MarkerKind::CrossRef,
            Marker::Anchor(_) => MarkerKind::Anchor,
        }
    }
}

/// One flattened unit of rich text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyledToken {
    /// Visible text; never contains whitespace when produced by [`flatten`]
    Text(String),
    Open(Marker),
    Close(Marker),
    /// Inter-word space that may be stretched or dropped at a line boundary
    WordBreak,
}

impl StyledToken {
    pub fn text(text: impl Into<String>) -> Self {
        StyledToken::Text(text.into())
    }

    /// Number of visible characters; markers and word breaks count as zero.
    pub fn len(&self) -> usize {
        match self {
            StyledToken::Text(text) => text.chars().count(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, StyledToken::Open(_) | StyledToken::Close(_))
    }
}

/// Rich-text tree handed to the line breaker by renderers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Space,
    Styled { marker: Marker, children: Vec<Inline> },
    /// Content the document processor could not translate; shown as `<kind>`
    Unprocessed(String),
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text(text.into())
    }

    pub fn styled(marker: Marker, children: Vec<Inline>) -> Self {
        Inline::Styled { marker, children }
    }

    pub fn bold(children: Vec<Inline>) -> Self {
        Self::styled(Marker::Bold, children)
    }

    pub fn italic(children: Vec<Inline>) -> Self {
        Self::styled(Marker::Italic, children)
    }

    /// Split running text at whitespace into words separated by [`Inline::Space`].
    pub fn words(text: &str) -> Vec<Inline> {
        let mut result = Vec::new();
        for word in text.split_whitespace() {
            if !result.is_empty() {
                result.push(Inline::Space);
            }
            result.push(Inline::text(word));
        }
        result
    }

    /// Plain text of the tree, markers dropped and spaces kept single.
    pub fn plain_text(elements: &[Inline]) -> String {
        plain_text(&flatten(elements))
    }
}

/// Flatten an inline tree depth-first into styled tokens.
pub fn flatten(elements: &[Inline]) -> Vec<StyledToken> {
    flatten_from(elements, 0).0
}

/// Flatten starting at logical column `cursor`.
///
/// Returns the tokens together with the column reached after them (visible
/// characters plus one per word break).
pub fn flatten_from(elements: &[Inline], cursor: usize) -> (Vec<StyledToken>, usize) {
    elements
        .iter()
        .fold((Vec::new(), cursor), |(mut tokens, cursor), element| {
            let (emitted, cursor) = flatten_element(element, cursor);
            tokens.extend(emitted);
            (tokens, cursor)
        })
}

fn flatten_element(element: &Inline, cursor: usize) -> (Vec<StyledToken>, usize) {
    match element {
        Inline::Text(text) => split_text(text, cursor),
        Inline::Space => (vec![StyledToken::WordBreak], cursor + 1),
        Inline::Unprocessed(kind) => split_text(&format!("<{kind}>"), cursor),
        Inline::Styled { marker, children } => {
            let (inner, cursor) = flatten_from(children, cursor);
            let mut tokens = Vec::with_capacity(inner.len() + 2);
            tokens.push(StyledToken::Open(marker.clone()));
            tokens.extend(inner);
            tokens.push(StyledToken::Close(marker.clone()));
            (tokens, cursor)
        }
    }
}

/// Text with embedded whitespace becomes words joined by word breaks.
fn split_text(text: &str, mut cursor: usize) -> (Vec<StyledToken>, usize) {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut pending_break = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if !word.is_empty() {
                cursor += word.chars().count();
                tokens.push(StyledToken::Text(std::mem::take(&mut word)));
            }
            pending_break = true;
        } else {
            if pending_break {
                tokens.push(StyledToken::WordBreak);
                cursor += 1;
                pending_break = false;
            }
            word.push(c);
        }
    }
    if !word.is_empty() {
        cursor += word.chars().count();
        tokens.push(StyledToken::Text(word));
    }
    if pending_break {
        tokens.push(StyledToken::WordBreak);
        cursor += 1;
    }

    (tokens, cursor)
}

/// Visible text of a token stream: markers dropped, word breaks as one space.
pub fn plain_text(tokens: &[StyledToken]) -> String {
    let mut result = String::new();
    for token in tokens {
        match token {
            StyledToken::Text(text) => result.push_str(text),
            StyledToken::WordBreak => {
                if !result.is_empty() && !result.ends_with(' ') {
                    result.push(' ');
                }
            }
            StyledToken::Open(_) | StyledToken::Close(_) => {}
        }
    }
    result.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_nested_styles() {
        let elements = vec![
            Inline::text("This"),
            Inline::Space,
            Inline::text("mixes"),
            Inline::Space,
            Inline::bold(vec![
                Inline::text("Hello,"),
                Inline::Space,
                Inline::italic(vec![Inline::text("World!")]),
            ]),
        ];

        let expected = vec![
            StyledToken::text("This"),
            StyledToken::WordBreak,
            StyledToken::text("mixes"),
            StyledToken::WordBreak,
            StyledToken::Open(Marker::Bold),
            StyledToken::text("Hello,"),
            StyledToken::WordBreak,
            StyledToken::Open(Marker::Italic),
            StyledToken::text("World!"),
            StyledToken::Close(Marker::Italic),
            StyledToken::Close(Marker::Bold),
        ];

        assert_eq!(flatten(&elements), expected);
    }

    #[test]
    fn test_flatten_reports_cursor() {
        let elements = Inline::words("ab cd");
        let (_, cursor) = flatten_from(&elements, 10);
        assert_eq!(cursor, 15);
    }

    #[test]
    fn test_text_with_whitespace_is_split() {
        let tokens = flatten(&[Inline::text("two  words")]);
        assert_eq!(
            tokens,
            vec![
                StyledToken::text("two"),
                StyledToken::WordBreak,
                StyledToken::text("words"),
            ]
        );
    }

    #[test]
    fn test_unprocessed_renders_kind() {
        let tokens = flatten(&[Inline::Unprocessed("Math".into())]);
        assert_eq!(tokens, vec![StyledToken::text("<Math>")]);
    }

    #[test]
    fn test_plain_text_ignores_markers() {
        let elements = vec![
            Inline::text("Hello,"),
            Inline::Space,
            Inline::bold(vec![Inline::text("World")]),
            Inline::text("!"),
        ];
        assert_eq!(Inline::plain_text(&elements), "Hello, World!");
    }

    #[test]
    fn test_marker_kind_ignores_payload() {
        assert_eq!(
            Marker::ForegroundColor("#fff".into()).kind(),
            Marker::ForegroundColor("#000".into()).kind()
        );
        assert_ne!(Marker::Bold.kind(), Marker::Italic.kind());
    }
}
