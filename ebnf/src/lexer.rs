use std::str::CharIndices;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'s> {
    pub origin: &'s str,
    pub offset: usize,
    pub kind: TokenKind<'s>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind<'s> {
    Name(&'s str),
    Literal(String),
    Not,
    Equals,
    Period,
    Ellipsis,
    Pipe,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
}

#[derive(Debug, Clone)]
pub(crate) struct Lexer<'s> {
    whole: &'s str,
    rest: &'s str,
    byte: usize,
    peeked: Option<Result<Token<'s>, TokenError>>,
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("Unexpected character '{1}' at offset {0}")]
    Unsupported(usize, char),
    #[error("Unterminated string starting at offset {0}")]
    UnterminatedString(usize),
    #[error("Unterminated comment starting at offset {0}")]
    UnterminatedComment(usize),
    #[error("Invalid escape sequence at offset {0}")]
    InvalidEscape(usize),
}

impl<'s> Lexer<'s> {
    pub fn new(input: &'s str) -> Self {
        Self {
            whole: input,
            rest: input,
            byte: 0,
            peeked: None,
        }
    }

    pub fn peek(&mut self) -> Option<&Result<Token<'s>, TokenError>> {
        if self.peeked.is_some() {
            return self.peeked.as_ref();
        }
        self.peeked = self.next();
        self.peeked.as_ref()
    }

    fn take(&mut self, kind: TokenKind<'s>, len: usize) -> Token<'s> {
        let offset = self.byte;
        self.byte += len;
        self.rest = &self.rest[len..];
        Token {
            origin: &self.whole[offset..self.byte],
            offset,
            kind,
        }
    }

    fn skip(&mut self, len: usize) {
        self.byte += len;
        self.rest = &self.rest[len..];
    }

    fn skip_trivia(&mut self) -> Result<(), TokenError> {
        loop {
            let trimmed = self.rest.trim_start();
            self.skip(self.rest.len() - trimmed.len());
            if self.rest.starts_with("//") {
                let len = self.rest.find('\n').map_or(self.rest.len(), |i| i + 1);
                self.skip(len);
            } else if self.rest.starts_with("/*") {
                let Some(end) = self.rest[2..].find("*/") else {
                    return Err(TokenError::UnterminatedComment(self.byte));
                };
                self.skip(end + 4);
            } else {
                return Ok(());
            }
        }
    }

    fn name(&mut self) -> Token<'s> {
        let rest = self.rest;
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        let name = &rest[..len];
        let kind = if name == "not" {
            TokenKind::Not
        } else {
            TokenKind::Name(name)
        };
        self.take(kind, len)
    }

    fn interpreted_string(&mut self) -> Result<Token<'s>, TokenError> {
        let start = self.byte;
        let rest = self.rest;
        let mut value = String::new();
        let mut chars = rest[1..].char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => return Ok(self.take(TokenKind::Literal(value), i + 2)),
                '\n' => break,
                '\\' => value.push(unescape(&mut chars, start + 1 + i)?),
                c => value.push(c),
            }
        }
        Err(TokenError::UnterminatedString(start))
    }

    fn raw_string(&mut self) -> Result<Token<'s>, TokenError> {
        let rest = self.rest;
        let Some(end) = rest[1..].find('`') else {
            return Err(TokenError::UnterminatedString(self.byte));
        };
        let value = rest[1..end + 1].to_string();
        Ok(self.take(TokenKind::Literal(value), end + 2))
    }
}

fn unescape(chars: &mut CharIndices<'_>, at: usize) -> Result<char, TokenError> {
    let Some((_, c)) = chars.next() else {
        return Err(TokenError::InvalidEscape(at));
    };
    let digits = match c {
        'a' => return Ok('\u{7}'),
        'b' => return Ok('\u{8}'),
        'f' => return Ok('\u{c}'),
        'n' => return Ok('\n'),
        'r' => return Ok('\r'),
        't' => return Ok('\t'),
        'v' => return Ok('\u{b}'),
        '\\' | '\'' | '"' => return Ok(c),
        'x' => 2,
        'u' => 4,
        'U' => 8,
        _ => return Err(TokenError::InvalidEscape(at)),
    };
    let mut code = 0;
    for _ in 0..digits {
        let digit = chars
            .next()
            .and_then(|(_, d)| d.to_digit(16))
            .ok_or(TokenError::InvalidEscape(at))?;
        code = code * 16 + digit;
    }
    char::from_u32(code).ok_or(TokenError::InvalidEscape(at))
}

impl<'s> Iterator for Lexer<'s> {
    type Item = Result<Token<'s>, TokenError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(next) = self.peeked.take() {
            return Some(next);
        }
        if let Err(e) = self.skip_trivia() {
            self.skip(self.rest.len());
            return Some(Err(e));
        }

        let c = self.rest.chars().next()?;
        let kind = match c {
            '=' => TokenKind::Equals,
            '|' => TokenKind::Pipe,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '…' => TokenKind::Ellipsis,
            '.' if self.rest.starts_with("...") => {
                return Some(Ok(self.take(TokenKind::Ellipsis, 3)));
            }
            '.' => TokenKind::Period,
            '"' | '`' => {
                let token = if c == '"' {
                    self.interpreted_string()
                } else {
                    self.raw_string()
                };
                // A broken string leaves nothing sensible to resume from.
                if token.is_err() {
                    self.skip(self.rest.len());
                }
                return Some(token);
            }
            c if c.is_alphabetic() || c == '_' => return Some(Ok(self.name())),
            c => {
                let at = self.byte;
                self.skip(c.len_utf8());
                return Some(Err(TokenError::Unsupported(at, c)));
            }
        };
        Some(Ok(self.take(kind, c.len_utf8())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn kinds(input: &str) -> Vec<TokenKind<'_>> {
        Lexer::new(input).map(|token| token.unwrap().kind).collect()
    }

    #[test]
    fn test_peek() {
        let mut lexer = Lexer::new("digit = \"0\" .");
        assert_eq!(
            lexer.peek(),
            Some(&Ok(Token {
                kind: TokenKind::Name("digit"),
                offset: 0,
                origin: "digit"
            }))
        );
        assert_eq!(
            lexer.next(),
            Some(Ok(Token {
                kind: TokenKind::Name("digit"),
                offset: 0,
                origin: "digit"
            }))
        );
        assert_eq!(
            lexer.next(),
            Some(Ok(Token {
                kind: TokenKind::Equals,
                offset: 6,
                origin: "="
            }))
        );
        assert_eq!(
            lexer.peek(),
            Some(&Ok(Token {
                kind: TokenKind::Literal("0".to_string()),
                offset: 8,
                origin: "\"0\""
            }))
        );
        lexer.next();
        assert_eq!(
            lexer.next(),
            Some(Ok(Token {
                kind: TokenKind::Period,
                offset: 12,
                origin: "."
            }))
        );
        assert_eq!(lexer.peek(), None);
    }

    #[test]
    fn test_lexer() {
        assert_eq!(
            kinds("a=|()[]{}….not"),
            [
                TokenKind::Name("a"),
                TokenKind::Equals,
                TokenKind::Pipe,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Ellipsis,
                TokenKind::Period,
                TokenKind::Not,
            ]
        );
    }

    #[test]
    fn ascii_ellipsis() {
        assert_eq!(
            kinds(r#""a"..."z"."#),
            [
                TokenKind::Literal("a".to_string()),
                TokenKind::Ellipsis,
                TokenKind::Literal("z".to_string()),
                TokenKind::Period,
            ]
        );
    }

    #[test]
    fn names() {
        assert_eq!(
            kinds("tag_value x1 _ notation not"),
            [
                TokenKind::Name("tag_value"),
                TokenKind::Name("x1"),
                TokenKind::Name("_"),
                TokenKind::Name("notation"),
                TokenKind::Not,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        let input = "// leading\na /* inner\n comment */ = b . // trailing";
        assert_eq!(
            kinds(input),
            [
                TokenKind::Name("a"),
                TokenKind::Equals,
                TokenKind::Name("b"),
                TokenKind::Period,
            ]
        );
    }

    #[test_case(r#""\n""#, "\n"; "newline")]
    #[test_case(r#""\\""#, "\\"; "backslash")]
    #[test_case(r#""\"""#, "\""; "quote")]
    #[test_case(r#""\x00""#, "\0"; "hex byte")]
    #[test_case(r#""\u00e9""#, "é"; "short unicode")]
    #[test_case(r#""\U0010FFFF""#, "\u{10FFFF}"; "long unicode")]
    #[test_case(r#""🦀""#, "🦀"; "multibyte")]
    #[test_case(r"`\n`", r"\n"; "raw string")]
    fn string_values(input: &str, expected: &str) {
        assert_eq!(kinds(input), [TokenKind::Literal(expected.to_string())]);
    }

    #[test_case("\"abc", TokenError::UnterminatedString(0); "missing quote")]
    #[test_case("\"a\nb\"", TokenError::UnterminatedString(0); "newline in string")]
    #[test_case("`abc", TokenError::UnterminatedString(0); "missing backquote")]
    #[test_case("\"\\q\"", TokenError::InvalidEscape(1); "unknown escape")]
    #[test_case("\"\\x4\"", TokenError::InvalidEscape(1); "short hex escape")]
    #[test_case("\"\\uD800\"", TokenError::InvalidEscape(1); "surrogate escape")]
    #[test_case("a /* open", TokenError::UnterminatedComment(2); "open comment")]
    #[test_case("a ; b", TokenError::Unsupported(2, ';'); "stray character")]
    fn errors(input: &str, expected: TokenError) {
        let error = Lexer::new(input).find_map(Result::err);
        assert_eq!(error, Some(expected));
    }
}
