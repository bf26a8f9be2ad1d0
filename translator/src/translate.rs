use crate::CharClass;
use crate::ClassRange;
use crate::Node;
use crate::optimize::collapse_repeats;
use ebnf::Expression;
use ebnf::Grammar;
use ebnf::Production;
use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("production '{0}' is not defined")]
    UndefinedProduction(String),
    #[error("range {begin:?} … {end:?} must run between two single characters in ascending order")]
    InvalidRange { begin: String, end: String },
    #[error("cannot negate {0}")]
    UnsupportedNegation(String),
    #[error("cannot negate literal {0:?}, it is not a single character")]
    InvalidLiteralNegation(String),
    #[error("production cycle {}", .0.join(" -> "))]
    CyclicGrammar(Vec<String>),
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("in production '{production}': {kind}")]
pub struct TranslateError {
    pub production: String,
    pub kind: ErrorKind,
}

pub(crate) struct Translator<'g> {
    grammar: &'g Grammar,
    active: Vec<&'g str>,
}

pub(crate) trait Translate {
    fn translate<'g>(&'g self, translator: &mut Translator<'g>) -> Result<Node, TranslateError>;

    fn translate_all<'g>(
        items: &'g [Self],
        translator: &mut Translator<'g>,
    ) -> Result<Vec<Node>, TranslateError>
    where
        Self: Sized,
    {
        items.iter().map(|item| item.translate(translator)).collect()
    }
}

impl<'g> Translator<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            active: Vec::new(),
        }
    }

    fn error(&self, kind: ErrorKind) -> TranslateError {
        TranslateError {
            production: self.active.last().copied().unwrap_or_default().to_string(),
            kind,
        }
    }

    fn resolve(&self, name: &str) -> Result<&'g Production, TranslateError> {
        self.grammar
            .get(name)
            .ok_or_else(|| self.error(ErrorKind::UndefinedProduction(name.to_string())))
    }
}

impl Translate for Production {
    fn translate<'g>(&'g self, translator: &mut Translator<'g>) -> Result<Node, TranslateError> {
        if let Some(first) = translator.active.iter().position(|&name| name == self.name) {
            let mut cycle: Vec<String> = translator.active[first..]
                .iter()
                .map(|name| name.to_string())
                .collect();
            cycle.push(self.name.clone());
            return Err(translator.error(ErrorKind::CyclicGrammar(cycle)));
        }
        translator.active.push(&self.name);
        let node = self.expr.translate(translator);
        translator.active.pop();
        node
    }
}

impl Translate for Expression {
    fn translate<'g>(&'g self, translator: &mut Translator<'g>) -> Result<Node, TranslateError> {
        match self {
            Expression::Range { begin, end } => {
                let bounds = single_char(begin).zip(single_char(end));
                let Some((lo, hi)) = bounds.filter(|(lo, hi)| lo <= hi) else {
                    return Err(translator.error(ErrorKind::InvalidRange {
                        begin: begin.clone(),
                        end: end.clone(),
                    }));
                };
                Ok(Node::class(ClassRange::new(lo, hi).into()))
            }
            Expression::Literal(text) => Ok(Node::Literal(text.clone())),
            Expression::Sequence(items) => {
                let nodes = Self::translate_all(items, translator)?;
                Ok(Node::Concat(collapse_repeats(nodes)))
            }
            Expression::Alternative(items) => {
                let nodes = Self::translate_all(items, translator)?;
                Ok(alternate(nodes))
            }
            Expression::Repetition(body) => Ok(Node::Star(Box::new(body.translate(translator)?))),
            Expression::Option(body) => Ok(Node::Quest(Box::new(body.translate(translator)?))),
            Expression::Group(body) => body.translate(translator),
            Expression::Name(name) => translator.resolve(name)?.translate(translator),
            Expression::Complement(body) => {
                let node = body.translate(translator)?;
                negate(node).map_err(|kind| translator.error(kind))
            }
        }
    }
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

fn as_class(node: &Node) -> Option<CharClass> {
    match node {
        Node::CharClass(class) => Some(class.clone()),
        Node::Literal(text) => single_char(text).map(CharClass::from),
        _ => None,
    }
}

fn alternate(nodes: Vec<Node>) -> Node {
    let classes: Option<Vec<CharClass>> = nodes.iter().map(as_class).collect();
    match classes {
        Some(classes) => Node::class(
            classes
                .iter()
                .fold(CharClass::default(), |union, class| union.union(class)),
        ),
        None => Node::Alternate(nodes),
    }
}

fn negate(node: Node) -> Result<Node, ErrorKind> {
    let class = match node {
        Node::CharClass(class) => class,
        Node::Literal(text) => match single_char(&text) {
            Some(c) => CharClass::from(c),
            None => return Err(ErrorKind::InvalidLiteralNegation(text)),
        },
        Node::AnyChar => {
            return Err(ErrorKind::UnsupportedNegation(
                "a class that already matches every character".to_string(),
            ));
        }
        other => {
            return Err(ErrorKind::UnsupportedNegation(format!(
                "{}, only single characters and classes can be negated",
                other.kind()
            )));
        }
    };
    match class.complement() {
        Some(complement) => Ok(Node::class(complement)),
        None => Err(ErrorKind::UnsupportedNegation(
            "a class that already matches every character".to_string(),
        )),
    }
}

/// Translates the production `name` without anchoring it.
pub fn translate_production(grammar: &Grammar, name: &str) -> Result<Node, TranslateError> {
    let Some(production) = grammar.get(name) else {
        return Err(TranslateError {
            production: name.to_string(),
            kind: ErrorKind::UndefinedProduction(name.to_string()),
        });
    };
    production.translate(&mut Translator::new(grammar))
}

/// Translates `start` and anchors the result to both ends of the text.
pub fn translate_start(grammar: &Grammar, start: &str) -> Result<Node, TranslateError> {
    let body = translate_production(grammar, start)?;
    Ok(Node::Concat(vec![Node::BeginText, body, Node::EndText]))
}
