//! Parser for the list literals stored in the `images` and `choices` columns.
//!
//! Accepted shapes: `[]`, `["a", "b"]`, `['a', 'b']`, `[1, 5]`, `[0, 10, 2]`,
//! with an optional trailing comma. Items are quoted strings or signed integers.

use std::fmt;

use thiserror::Error;

/// One item of a list literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Str(String),
    Int(i64),
}

impl Literal {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Literal::Int(value) => Some(*value),
            Literal::Str(_) => None,
        }
    }

    /// Label form of the item; integers are stringified.
    pub fn into_label(self) -> String {
        match self {
            Literal::Str(text) => text,
            Literal::Int(value) => value.to_string(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(text) => write!(f, "{:?}", text),
            Literal::Int(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("empty literal")]
    Empty,
    #[error("expected '[' at offset {0}")]
    MissingOpen(usize),
    #[error("unterminated list starting at offset {0}")]
    MissingClose(usize),
    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),
    #[error("unexpected character {found:?} at offset {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("integer out of range at offset {0}")]
    IntegerRange(usize),
    #[error("trailing input at offset {0}")]
    Trailing(usize),
}

/// Parse a bracketed list literal into its items.
pub fn parse_list(input: &str) -> Result<Vec<Literal>, LiteralError> {
    let mut parser = Parser {
        chars: input.char_indices().collect(),
        pos: 0,
    };
    parser.skip_ws();
    if parser.peek().is_none() {
        return Err(LiteralError::Empty);
    }
    let items = parser.list()?;
    parser.skip_ws();
    if let Some((offset, _)) = parser.current() {
        return Err(LiteralError::Trailing(offset));
    }
    Ok(items)
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser {
    fn current(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn peek(&self) -> Option<char> {
        self.current().map(|(_, ch)| ch)
    }

    fn offset(&self) -> usize {
        self.current()
            .map(|(offset, _)| offset)
            .or_else(|| self.chars.last().map(|(offset, ch)| offset + ch.len_utf8()))
            .unwrap_or(0)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn list(&mut self) -> Result<Vec<Literal>, LiteralError> {
        let start = self.offset();
        if self.peek() != Some('[') {
            return Err(LiteralError::MissingOpen(start));
        }
        self.pos += 1;

        let mut items = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                None => return Err(LiteralError::MissingClose(start)),
                Some(']') => {
                    self.pos += 1;
                    return Ok(items);
                }
                Some(_) => {}
            }

            items.push(self.item()?);

            self.skip_ws();
            match self.current() {
                None => return Err(LiteralError::MissingClose(start)),
                Some((_, ',')) => self.pos += 1,
                Some((_, ']')) => {}
                Some((offset, found)) => return Err(LiteralError::Unexpected { found, offset }),
            }
        }
    }

    fn item(&mut self) -> Result<Literal, LiteralError> {
        match self.current() {
            Some((_, quote @ ('"' | '\''))) => self.string(quote).map(Literal::Str),
            Some((_, ch)) if ch == '-' || ch == '+' || ch.is_ascii_digit() => self.integer(),
            Some((offset, found)) => Err(LiteralError::Unexpected { found, offset }),
            None => Err(LiteralError::MissingClose(self.offset())),
        }
    }

    fn string(&mut self, quote: char) -> Result<String, LiteralError> {
        let start = self.offset();
        self.pos += 1;
        let mut out = String::new();
        loop {
            let Some((_, ch)) = self.current() else {
                return Err(LiteralError::UnterminatedString(start));
            };
            self.pos += 1;
            match ch {
                '\\' => {
                    let Some((_, escaped)) = self.current() else {
                        return Err(LiteralError::UnterminatedString(start));
                    };
                    self.pos += 1;
                    out.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                }
                ch if ch == quote => return Ok(out),
                ch => out.push(ch),
            }
        }
    }

    fn integer(&mut self) -> Result<Literal, LiteralError> {
        let start = self.offset();
        let mut digits = String::new();
        if let Some(sign @ ('-' | '+')) = self.peek() {
            digits.push(sign);
            self.pos += 1;
        }
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.pos += 1;
            } else if ch == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if digits.trim_start_matches(['-', '+']).is_empty() {
            return match self.current() {
                Some((offset, found)) => Err(LiteralError::Unexpected { found, offset }),
                None => Err(LiteralError::MissingClose(start)),
            };
        }
        digits
            .parse::<i64>()
            .map(Literal::Int)
            .map_err(|_| LiteralError::IntegerRange(start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_empty_list() {
        assert_eq!(parse_list("[]").unwrap(), vec![]);
        assert_eq!(parse_list("  [ ]  ").unwrap(), vec![]);
    }

    #[test]
    fn parses_both_quote_styles() {
        let items = parse_list(r#"["A", 'B', "it's"]"#).unwrap();
        assert_eq!(
            items,
            vec![
                Literal::Str("A".into()),
                Literal::Str("B".into()),
                Literal::Str("it's".into()),
            ]
        );
    }

    #[test]
    fn parses_integers_and_trailing_comma() {
        let items = parse_list("[0, -10, +2,]").unwrap();
        assert_eq!(
            items,
            vec![Literal::Int(0), Literal::Int(-10), Literal::Int(2)]
        );
    }

    #[test]
    fn handles_escapes() {
        let items = parse_list(r#"["say \"hi\"", 'a\'b']"#).unwrap();
        assert_eq!(items[0], Literal::Str("say \"hi\"".into()));
        assert_eq!(items[1], Literal::Str("a'b".into()));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_list(""), Err(LiteralError::Empty));
        assert_eq!(parse_list("a, b"), Err(LiteralError::MissingOpen(0)));
        assert_eq!(parse_list("[1, 2"), Err(LiteralError::MissingClose(0)));
        assert_eq!(
            parse_list("['open]"),
            Err(LiteralError::UnterminatedString(1))
        );
        assert!(matches!(
            parse_list("[yes]"),
            Err(LiteralError::Unexpected { found: 'y', .. })
        ));
        assert_eq!(parse_list("[1] x"), Err(LiteralError::Trailing(4)));
        assert!(matches!(
            parse_list("[1 2]"),
            Err(LiteralError::Unexpected { found: '2', .. })
        ));
    }

    #[test]
    fn stringifies_integer_labels() {
        assert_eq!(Literal::Int(4).into_label(), "4");
        assert_eq!(Literal::Str("x".into()).into_label(), "x");
    }
}
