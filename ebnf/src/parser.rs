use crate::Expression;
use crate::Grammar;
use crate::Production;
use crate::lexer::Lexer;
use crate::lexer::Token;
use crate::lexer::TokenError;
use crate::lexer::TokenKind;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub(crate) struct Parser<'s> {
    lexer: Lexer<'s>,
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),
    #[error("Expected {expected} at offset {offset}, got '{found}'")]
    Unexpected {
        expected: &'static str,
        found: String,
        offset: usize,
    },
    #[error("Unexpected EOF, expected {0}")]
    UnexpectedEOF(&'static str),
    #[error("Production '{name}' redefined at offset {offset}")]
    Redefined { name: String, offset: usize },
}

impl ParseError {
    fn unexpected(expected: &'static str, token: &Token<'_>) -> Self {
        ParseError::Unexpected {
            expected,
            found: token.origin.to_string(),
            offset: token.offset,
        }
    }
}

impl Parser<'_> {
    pub fn new(input: &str) -> Parser<'_> {
        Parser {
            lexer: Lexer::new(input),
        }
    }

    pub fn parse(&mut self) -> Result<Grammar, ParseError> {
        let mut productions = BTreeMap::new();
        while let Some(token) = self.lexer.next() {
            let token = token?;
            let TokenKind::Name(name) = token.kind else {
                return Err(ParseError::unexpected("production name", &token));
            };
            let production = self.parse_production(name)?;
            if productions.contains_key(name) {
                return Err(ParseError::Redefined {
                    name: name.to_string(),
                    offset: token.offset,
                });
            }
            productions.insert(name.to_string(), production);
        }
        Ok(Grammar { productions })
    }

    fn parse_production(&mut self, name: &str) -> Result<Production, ParseError> {
        self.expect(TokenKind::Equals, "'='")?;
        let expr = if self.peek_kind()? == Some(&TokenKind::Period) {
            Expression::Sequence(Vec::new())
        } else {
            self.parse_expression()?
        };
        self.expect(TokenKind::Period, "'.'")?;
        Ok(Production::new(name, expr))
    }

    fn peek_kind(&mut self) -> Result<Option<&TokenKind<'_>>, ParseError> {
        match self.lexer.peek() {
            Some(Ok(token)) => Ok(Some(&token.kind)),
            Some(Err(token_error)) => Err(ParseError::InvalidToken(token_error.clone())),
            None => Ok(None),
        }
    }

    fn expect(&mut self, kind: TokenKind<'_>, expected: &'static str) -> Result<(), ParseError> {
        match self.lexer.next() {
            Some(Ok(token)) if token.kind == kind => Ok(()),
            Some(Ok(token)) => Err(ParseError::unexpected(expected, &token)),
            Some(Err(token_error)) => Err(ParseError::InvalidToken(token_error)),
            None => Err(ParseError::UnexpectedEOF(expected)),
        }
    }

    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        let mut alternatives = vec![self.parse_sequence()?];
        while self.peek_kind()? == Some(&TokenKind::Pipe) {
            self.lexer.next();
            alternatives.push(self.parse_sequence()?);
        }
        if alternatives.len() == 1 {
            return Ok(alternatives.remove(0));
        }
        Ok(Expression::Alternative(alternatives))
    }

    fn parse_sequence(&mut self) -> Result<Expression, ParseError> {
        let mut terms = Vec::new();
        while let Some(term) = self.parse_term()? {
            terms.push(term);
        }
        match terms.len() {
            0 => Err(self.missing("term")),
            1 => Ok(terms.remove(0)),
            _ => Ok(Expression::Sequence(terms)),
        }
    }

    fn missing(&mut self, expected: &'static str) -> ParseError {
        match self.lexer.next() {
            Some(Ok(token)) => ParseError::unexpected(expected, &token),
            Some(Err(token_error)) => ParseError::InvalidToken(token_error),
            None => ParseError::UnexpectedEOF(expected),
        }
    }

    fn parse_term(&mut self) -> Result<Option<Expression>, ParseError> {
        let starts_term = matches!(
            self.peek_kind()?,
            Some(
                TokenKind::Name(_)
                    | TokenKind::Literal(_)
                    | TokenKind::Not
                    | TokenKind::LeftParen
                    | TokenKind::LeftBracket
                    | TokenKind::LeftBrace
            )
        );
        if !starts_term {
            return Ok(None);
        }
        let Some(Ok(token)) = self.lexer.next() else {
            unreachable!("peeked token vanished");
        };
        let term = match token.kind {
            TokenKind::Name(name) => Expression::Name(name.to_string()),
            TokenKind::Literal(begin) => {
                if self.peek_kind()? != Some(&TokenKind::Ellipsis) {
                    return Ok(Some(Expression::Literal(begin)));
                }
                self.lexer.next();
                match self.lexer.next() {
                    Some(Ok(Token {
                        kind: TokenKind::Literal(end),
                        ..
                    })) => Expression::Range { begin, end },
                    Some(Ok(token)) => return Err(ParseError::unexpected("range end", &token)),
                    Some(Err(token_error)) => return Err(ParseError::InvalidToken(token_error)),
                    None => return Err(ParseError::UnexpectedEOF("range end")),
                }
            }
            TokenKind::Not => match self.parse_term()? {
                Some(body) => Expression::Complement(Box::new(body)),
                None => return Err(self.missing("term after 'not'")),
            },
            TokenKind::LeftParen => {
                let body = self.parse_expression()?;
                self.expect(TokenKind::RightParen, "')'")?;
                Expression::Group(Box::new(body))
            }
            TokenKind::LeftBracket => {
                let body = self.parse_expression()?;
                self.expect(TokenKind::RightBracket, "']'")?;
                Expression::Option(Box::new(body))
            }
            TokenKind::LeftBrace => {
                let body = self.parse_expression()?;
                self.expect(TokenKind::RightBrace, "'}'")?;
                Expression::Repetition(Box::new(body))
            }
            _ => unreachable!("token cannot start a term"),
        };
        Ok(Some(term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn parse_one(input: &str) -> Result<Expression, ParseError> {
        let source = format!("start = {input} .");
        let grammar = Parser::new(&source).parse()?;
        Ok(grammar.get("start").unwrap().expr.clone())
    }

    fn lit(s: &str) -> Expression {
        Expression::Literal(s.to_string())
    }

    fn name(s: &str) -> Expression {
        Expression::Name(s.to_string())
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(parse_one(r#""hello""#), Ok(lit("hello")));
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(
            parse_one(r#""a" … "f""#),
            Ok(Expression::Range {
                begin: "a".to_string(),
                end: "f".to_string()
            })
        );
    }

    #[test]
    fn test_parse_alternative() {
        assert_eq!(
            parse_one(r#""a" | "b" | c"#),
            Ok(Expression::Alternative(vec![lit("a"), lit("b"), name("c")]))
        );
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(
            parse_one(r#"bar { bar } "x" | y"#),
            Ok(Expression::Alternative(vec![
                Expression::Sequence(vec![
                    name("bar"),
                    Expression::Repetition(Box::new(name("bar"))),
                    lit("x"),
                ]),
                name("y"),
            ]))
        );
    }

    #[test]
    fn test_parse_brackets() {
        assert_eq!(
            parse_one(r#"( a | b ) [ "-" ] { "0" … "9" }"#),
            Ok(Expression::Sequence(vec![
                Expression::Group(Box::new(Expression::Alternative(vec![
                    name("a"),
                    name("b")
                ]))),
                Expression::Option(Box::new(lit("-"))),
                Expression::Repetition(Box::new(Expression::Range {
                    begin: "0".to_string(),
                    end: "9".to_string()
                })),
            ]))
        );
    }

    #[test]
    fn test_parse_complement() {
        assert_eq!(
            parse_one(r#"not hex "x""#),
            Ok(Expression::Sequence(vec![
                Expression::Complement(Box::new(name("hex"))),
                lit("x"),
            ]))
        );
        assert_eq!(
            parse_one(r#"not ( "a" | "b" )"#),
            Ok(Expression::Complement(Box::new(Expression::Group(
                Box::new(Expression::Alternative(vec![lit("a"), lit("b")]))
            ))))
        );
    }

    #[test]
    fn test_parse_empty_production() {
        let grammar = Parser::new("empty = .").parse().unwrap();
        assert_eq!(
            grammar.get("empty").map(|p| &p.expr),
            Some(&Expression::Sequence(vec![]))
        );
    }

    #[test]
    fn test_parse_grammar() {
        let grammar = Parser::new(
            r#"
            start = not hex .
            hex = "a"…"f" | "0"…"9" .
            "#,
        )
        .parse()
        .unwrap();
        assert_eq!(grammar.len(), 2);
        assert_eq!(
            grammar.get("start").map(|p| &p.expr),
            Some(&Expression::Complement(Box::new(name("hex"))))
        );
    }

    #[test_case("start = a", ParseError::UnexpectedEOF("'.'"); "missing period")]
    #[test_case("start a .", ParseError::Unexpected { expected: "'='", found: "a".to_string(), offset: 6 }; "missing equals")]
    #[test_case("\"x\" = a .", ParseError::Unexpected { expected: "production name", found: "\"x\"".to_string(), offset: 0 }; "literal as name")]
    #[test_case("start = ( a .", ParseError::Unexpected { expected: "')'", found: ".".to_string(), offset: 12 }; "unclosed group")]
    #[test_case("start = a | .", ParseError::Unexpected { expected: "term", found: ".".to_string(), offset: 12 }; "empty alternative")]
    #[test_case("start = \"a\" … b .", ParseError::Unexpected { expected: "range end", found: "b".to_string(), offset: 16 }; "range to name")]
    #[test_case("start = not .", ParseError::Unexpected { expected: "term after 'not'", found: ".".to_string(), offset: 12 }; "dangling not")]
    #[test_case("a = \"x\" . a = \"y\" .", ParseError::Redefined { name: "a".to_string(), offset: 10 }; "redefinition")]
    #[test_case("start = \"x .", ParseError::InvalidToken(TokenError::UnterminatedString(8)); "bad token")]
    fn test_parse_errors(input: &str, expected: ParseError) {
        assert_eq!(Parser::new(input).parse(), Err(expected));
    }
}
