//! Backend-neutral cell content

/// Inline content of a cell, caption or table note
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// A word
    Str(String),
    /// Inter-word space
    Space,
    /// Strong emphasis
    Strong(Vec<Inline>),
    /// Backend-specific text, `` `text`{=format} ``
    Raw { format: String, text: String },
    /// Reference to a table note, `[^label]_`
    NoteRef(String),
}

impl Inline {
    pub fn str(text: impl Into<String>) -> Self {
        Inline::Str(text.into())
    }

    pub fn raw(format: impl Into<String>, text: impl Into<String>) -> Self {
        Inline::Raw {
            format: format.into(),
            text: text.into(),
        }
    }

    /// Tokenize plain text
    ///
    /// Whitespace runs become one [`Inline::Space`]; `**x**` is strong,
    /// `` `t`{=fmt} `` raw and `[^a]_` / `[^a,b]_` note references. Anything
    /// that does not close is kept as literal text.
    pub fn parse_text(text: &str) -> Vec<Inline> {
        let mut out = Vec::new();
        let mut word = String::new();
        let mut pos = 0;

        while pos < text.len() {
            let rest = &text[pos..];
            let Some(ch) = rest.chars().next() else { break };

            if ch.is_whitespace() {
                flush_word(&mut word, &mut out);
                if !out.is_empty() && out.last() != Some(&Inline::Space) {
                    out.push(Inline::Space);
                }
                pos += ch.len_utf8();
                continue;
            }

            if let Some(inner_end) = rest.strip_prefix("**").and_then(|r| r.find("**")) {
                let inner = &rest[2..2 + inner_end];
                if !inner.trim().is_empty() {
                    flush_word(&mut word, &mut out);
                    out.push(Inline::Strong(Inline::parse_text(inner)));
                    pos += inner_end + 4;
                    continue;
                }
            }

            if ch == '`' {
                if let Some((raw, consumed)) = parse_raw(rest) {
                    flush_word(&mut word, &mut out);
                    out.push(raw);
                    pos += consumed;
                    continue;
                }
            }

            if rest.starts_with("[^") {
                if let Some((refs, consumed)) = parse_note_refs(rest) {
                    flush_word(&mut word, &mut out);
                    out.extend(refs);
                    pos += consumed;
                    continue;
                }
            }

            word.push(ch);
            pos += ch.len_utf8();
        }

        flush_word(&mut word, &mut out);
        if out.last() == Some(&Inline::Space) {
            out.pop();
        }
        out
    }
}

fn flush_word(word: &mut String, out: &mut Vec<Inline>) {
    if !word.is_empty() {
        out.push(Inline::Str(std::mem::take(word)));
    }
}

/// `` `text`{=format} ``
fn parse_raw(rest: &str) -> Option<(Inline, usize)> {
    let close = rest[1..].find('`')? + 1;
    let after = rest[close + 1..].strip_prefix("{=")?;
    let end = after.find('}')?;
    let format = &after[..end];
    if format.is_empty() || format.contains(char::is_whitespace) {
        return None;
    }

    let consumed = close + 1 + 2 + end + 1;
    Some((Inline::raw(format, &rest[1..close]), consumed))
}

/// `[^a]_` or `[^a,b]_`
fn parse_note_refs(rest: &str) -> Option<(Vec<Inline>, usize)> {
    let end = rest.find(']')?;
    if !rest[end + 1..].starts_with('_') {
        return None;
    }

    let body = &rest[2..end];
    if body.is_empty() || body.contains(|c: char| c.is_whitespace() || c == '[') {
        return None;
    }

    let refs = body
        .split(',')
        .filter(|label| !label.is_empty())
        .map(|label| Inline::NoteRef(label.to_string()))
        .collect();
    Some((refs, end + 2))
}

/// Text without markup, used for titles and checks for empty cells
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Str(s) => out.push_str(s),
            Inline::Space => out.push(' '),
            Inline::Strong(inner) => out.push_str(&plain_text(inner)),
            Inline::Raw { .. } | Inline::NoteRef(_) => {}
        }
    }
    out
}

/// Whether content renders to nothing
pub fn is_blank(inlines: &[Inline]) -> bool {
    inlines.iter().all(|inline| match inline {
        Inline::Space => true,
        Inline::Str(s) => s.is_empty(),
        Inline::Strong(inner) => is_blank(inner),
        Inline::Raw { text, .. } => text.is_empty(),
        Inline::NoteRef(_) => false,
    })
}

/// Drop leading, trailing and doubled spaces left behind by removed tokens
pub fn normalize_spaces(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::with_capacity(inlines.len());
    for inline in inlines {
        if inline == Inline::Space && matches!(out.last(), None | Some(Inline::Space)) {
            continue;
        }
        out.push(inline);
    }
    if out.last() == Some(&Inline::Space) {
        out.pop();
    }
    out
}
