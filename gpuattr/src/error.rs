use std::fmt::Display;
use std::fmt::Formatter;
use thiserror::Error;

/// Byte range `start..end` into the source text that produced an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
    /// Span from the start of `self` to the end of `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start, other.end)
    }
    pub fn shift(self, offset: usize) -> Span {
        Span::new(self.start + offset, self.end + offset)
    }
    /// The text covered by the span (empty if out of bounds).
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        src.get(self.start..self.end).unwrap_or("")
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

fn at(span: &Option<Span>) -> String {
    match span {
        Some(span) => format!(" at {span}"),
        None => "".to_string(),
    }
}

/// Errors produced while parsing or printing attributes.
///
/// None of these are fatal: a failed parse or construction never hands out a
/// partially built value.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AttrError {
    #[error("malformed byte literal at {span}: {msg}")]
    MalformedLiteral { span: Span, msg: String },
    #[error("duplicate key `{key}`{}", at(.span))]
    DuplicateKey { key: String, span: Option<Span> },
    #[error("malformed properties at {span}: {msg}")]
    MalformedProperties { span: Span, msg: String },
    #[error("syntax error at {span}: {msg}")]
    SyntaxError { span: Span, msg: String },
    #[error("unknown attribute kind `#{name}` at {span}")]
    UnknownAttributeKind { name: String, span: Span },
}

impl AttrError {
    pub fn syntax(span: Span, msg: impl Into<String>) -> Self {
        AttrError::SyntaxError {
            span,
            msg: msg.into(),
        }
    }
    pub fn literal(span: Span, msg: impl Into<String>) -> Self {
        AttrError::MalformedLiteral {
            span,
            msg: msg.into(),
        }
    }
    pub fn properties(span: Span, msg: impl Into<String>) -> Self {
        AttrError::MalformedProperties {
            span,
            msg: msg.into(),
        }
    }
    pub fn span(&self) -> Option<Span> {
        match self {
            AttrError::MalformedLiteral { span, .. }
            | AttrError::MalformedProperties { span, .. }
            | AttrError::SyntaxError { span, .. }
            | AttrError::UnknownAttributeKind { span, .. } => Some(*span),
            AttrError::DuplicateKey { span, .. } => *span,
        }
    }
    /// Move the span by `offset` bytes.
    ///
    /// Used when a sub-string (such as a single byte literal) was decoded on
    /// its own and the error has to point into the enclosing source.
    pub fn shifted(self, offset: usize) -> Self {
        match self {
            AttrError::MalformedLiteral { span, msg } => AttrError::MalformedLiteral {
                span: span.shift(offset),
                msg,
            },
            AttrError::DuplicateKey { key, span } => AttrError::DuplicateKey {
                key,
                span: span.map(|span| span.shift(offset)),
            },
            AttrError::MalformedProperties { span, msg } => AttrError::MalformedProperties {
                span: span.shift(offset),
                msg,
            },
            AttrError::SyntaxError { span, msg } => AttrError::SyntaxError {
                span: span.shift(offset),
                msg,
            },
            AttrError::UnknownAttributeKind { name, span } => AttrError::UnknownAttributeKind {
                name,
                span: span.shift(offset),
            },
        }
    }
    /// Render the error with a caret pointing into `src`.
    ///
    /// The output is fenced with backticks and shows the offending line
    /// (plus the line before it, if any).
    pub fn render(&self, src: &str) -> String {
        let msg = self.to_string();
        match self.span() {
            Some(span) => point_at(src, span.start, &msg),
            None => msg,
        }
    }
}

fn point_at(src: &str, start: usize, msg: &str) -> String {
    let mut start = start.min(src.len());
    while !src.is_char_boundary(start) {
        start -= 1;
    }
    let before = &src[..start];
    let n = before.matches('\n').count();
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count();

    let lines = src.split('\n').collect::<Vec<&str>>();
    let prev_line = if n > 0 {
        format!("\n{}  | {}", n - 1, lines[n - 1])
    } else {
        "".to_string()
    };
    let line = lines.get(n).copied().unwrap_or("");
    let line_num_width = 4 + n.to_string().len();
    let err_indent = " ".repeat(column + line_num_width);
    format!("```{prev_line}\n{n}  | {line}\n{err_indent}^ {msg}\n```")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_points_at_span() {
        let src = "#gpu.object<\n  #nvvm.target \"\">";
        let err = AttrError::syntax(Span::new(28, 30), "expected `,`");
        let text = err.render(src);
        let lines = text.split('\n').collect::<Vec<&str>>();
        assert_eq!(lines[0], "```");
        assert_eq!(lines[1], "0  | #gpu.object<");
        assert_eq!(lines[2], "1  |   #nvvm.target \"\">");
        assert_eq!(lines[3], format!("{}^ {}", " ".repeat(15 + 5), err));
        assert_eq!(lines[4], "```");
    }

    #[test]
    fn duplicate_key_without_span() {
        let err = AttrError::DuplicateKey {
            key: "O".to_string(),
            span: None,
        };
        assert_eq!(err.to_string(), "duplicate key `O`");
        assert_eq!(err.render("ignored"), "duplicate key `O`");
        let err = AttrError::DuplicateKey {
            key: "O".to_string(),
            span: Some(Span::new(1, 2)),
        };
        assert_eq!(err.to_string(), "duplicate key `O` at 1..2");
        assert_eq!(err.shifted(3).span(), Some(Span::new(4, 5)));
    }
}
