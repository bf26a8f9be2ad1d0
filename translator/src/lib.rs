//! Turns an EBNF grammar restricted to regular constructs into an anchored
//! regular expression.
//!
//! The grammar is walked from its start production into a [`Node`] tree,
//! which is then printed in the concrete syntax of a [`Dialect`].

mod char_class;
mod optimize;
mod serialize;
mod translate;

pub use char_class::CharClass;
pub use char_class::ClassRange;
pub use serialize::Dialect;
pub use serialize::Pattern;
pub use translate::ErrorKind;
pub use translate::TranslateError;
pub use translate::translate_production;
pub use translate::translate_start;

use ebnf::Grammar;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    CharClass(CharClass),
    AnyChar,
    Literal(String),
    Concat(Vec<Node>),
    Star(Box<Node>),
    Plus(Box<Node>),
    Quest(Box<Node>),
    Alternate(Vec<Node>),
    BeginText,
    EndText,
}

impl Node {
    pub fn class(class: CharClass) -> Self {
        if class.is_full() {
            Node::AnyChar
        } else {
            Node::CharClass(class)
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Node::CharClass(_) => "character class",
            Node::AnyChar => "any character",
            Node::Literal(_) => "literal",
            Node::Concat(_) => "concatenation",
            Node::Star(_) => "repetition",
            Node::Plus(_) => "one-or-more repetition",
            Node::Quest(_) => "option",
            Node::Alternate(_) => "alternation",
            Node::BeginText => "start of text",
            Node::EndText => "end of text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub start: String,
    pub dialect: Dialect,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start: "start".to_string(),
            dialect: Dialect::default(),
        }
    }
}

impl Config {
    pub fn with_start(self, start: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            ..self
        }
    }

    pub fn with_dialect(self, dialect: Dialect) -> Self {
        Self { dialect, ..self }
    }
}

/// Translates the configured start production and renders it as a pattern
/// that only matches whole strings.
pub fn translate(grammar: &Grammar, config: &Config) -> Result<String, TranslateError> {
    let node = translate_start(grammar, &config.start)?;
    Ok(node.pattern(config.dialect).to_string())
}
