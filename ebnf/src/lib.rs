mod lexer;
mod parser;
mod verify;

pub use lexer::TokenError;
pub use parser::ParseError;
pub use verify::VerifyError;

use parser::Parser;
use std::collections::BTreeMap;
use std::str::FromStr;

/// A set of productions keyed by name. Built once and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    productions: BTreeMap<String, Production>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub name: String,
    pub expr: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Range { begin: String, end: String },
    Literal(String),
    Sequence(Vec<Expression>),
    Alternative(Vec<Expression>),
    Repetition(Box<Expression>),
    Option(Box<Expression>),
    Group(Box<Expression>),
    Name(String),
    Complement(Box<Expression>),
}

impl Production {
    pub fn new(name: impl Into<String>, expr: Expression) -> Self {
        Self {
            name: name.into(),
            expr,
        }
    }
}

impl Grammar {
    pub fn get(&self, name: &str) -> Option<&Production> {
        self.productions.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Production> {
        self.productions.values()
    }

    pub fn len(&self) -> usize {
        self.productions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }
}

impl FromIterator<Production> for Grammar {
    fn from_iter<T: IntoIterator<Item = Production>>(iter: T) -> Self {
        Self {
            productions: iter
                .into_iter()
                .map(|production| (production.name.clone(), production))
                .collect(),
        }
    }
}

impl FromStr for Grammar {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s).parse()
    }
}
