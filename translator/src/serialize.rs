use crate::CharClass;
use crate::ClassRange;
use crate::Node;
use crate::char_class::increment;
use std::fmt;
use std::fmt::Write;

/// Concrete regular expression syntax a [`Node`] is printed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Dialect {
    #[default]
    Rust,
    EcmaScript,
}

impl Dialect {
    fn begin_text(self) -> &'static str {
        match self {
            Dialect::Rust => r"\A",
            Dialect::EcmaScript => "^",
        }
    }

    fn end_text(self) -> &'static str {
        match self {
            Dialect::Rust => r"\z",
            Dialect::EcmaScript => "$",
        }
    }

    fn any_char(self) -> &'static str {
        match self {
            Dialect::Rust => "(?s:.)",
            Dialect::EcmaScript => r"[\s\S]",
        }
    }

    fn no_char(self) -> &'static str {
        match self {
            Dialect::Rust => r"[^\x{0}-\x{10FFFF}]",
            Dialect::EcmaScript => "[]",
        }
    }

    fn is_meta(self, c: char) -> bool {
        match self {
            Dialect::Rust => matches!(
                c,
                '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
            ),
            Dialect::EcmaScript => matches!(
                c,
                '\\' | '.'
                    | '+'
                    | '*'
                    | '?'
                    | '('
                    | ')'
                    | '|'
                    | '['
                    | ']'
                    | '{'
                    | '}'
                    | '^'
                    | '$'
                    | '/'
            ),
        }
    }

    fn is_class_meta(self, c: char) -> bool {
        match self {
            Dialect::Rust => matches!(c, '\\' | ']' | '[' | '^' | '-' | '&' | '~'),
            Dialect::EcmaScript => matches!(c, '\\' | ']' | '[' | '^' | '-'),
        }
    }

    fn write_char(self, f: &mut fmt::Formatter<'_>, c: char, meta: bool) -> fmt::Result {
        match c {
            '\n' => f.write_str(r"\n"),
            '\r' => f.write_str(r"\r"),
            '\t' => f.write_str(r"\t"),
            c if c.is_control() => match self {
                Dialect::Rust => write!(f, r"\x{{{:X}}}", c as u32),
                Dialect::EcmaScript => write!(f, r"\u{{{:X}}}", c as u32),
            },
            c if meta => {
                f.write_char('\\')?;
                f.write_char(c)
            }
            c => f.write_char(c),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Pattern<'n> {
    node: &'n Node,
    dialect: Dialect,
}

impl Node {
    pub fn pattern(&self, dialect: Dialect) -> Pattern<'_> {
        Pattern {
            node: self,
            dialect,
        }
    }
}

impl fmt::Display for Pattern<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self.node, self.dialect)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self, Dialect::default())
    }
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &Node, dialect: Dialect) -> fmt::Result {
    match node {
        Node::CharClass(class) => write_class(f, class, dialect),
        Node::AnyChar => f.write_str(dialect.any_char()),
        Node::Literal(text) => text
            .chars()
            .try_for_each(|c| dialect.write_char(f, c, dialect.is_meta(c))),
        Node::Concat(items) => items.iter().try_for_each(|item| write_node(f, item, dialect)),
        Node::Star(body) => write_repeat(f, body, '*', dialect),
        Node::Plus(body) => write_repeat(f, body, '+', dialect),
        Node::Quest(body) => write_repeat(f, body, '?', dialect),
        Node::Alternate(items) => {
            f.write_str("(?:")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_char('|')?;
                }
                write_node(f, item, dialect)?;
            }
            f.write_char(')')
        }
        Node::BeginText => f.write_str(dialect.begin_text()),
        Node::EndText => f.write_str(dialect.end_text()),
    }
}

fn needs_group(node: &Node) -> bool {
    match node {
        Node::CharClass(_) | Node::AnyChar | Node::Alternate(_) => false,
        Node::Literal(text) => text.chars().count() != 1,
        Node::Concat(_)
        | Node::Star(_)
        | Node::Plus(_)
        | Node::Quest(_)
        | Node::BeginText
        | Node::EndText => true,
    }
}

fn write_repeat(
    f: &mut fmt::Formatter<'_>,
    body: &Node,
    operator: char,
    dialect: Dialect,
) -> fmt::Result {
    if needs_group(body) {
        f.write_str("(?:")?;
        write_node(f, body, dialect)?;
        f.write_char(')')?;
    } else {
        write_node(f, body, dialect)?;
    }
    f.write_char(operator)
}

fn write_class(f: &mut fmt::Formatter<'_>, class: &CharClass, dialect: Dialect) -> fmt::Result {
    let (Some(first), Some(last)) = (class.ranges().first(), class.ranges().last()) else {
        return f.write_str(dialect.no_char());
    };
    if first.start() == '\0' && last.end() == char::MAX {
        let Some(complement) = class.complement() else {
            return f.write_str(dialect.any_char());
        };
        f.write_str("[^")?;
        write_ranges(f, complement.ranges(), dialect)?;
    } else {
        f.write_char('[')?;
        write_ranges(f, class.ranges(), dialect)?;
    }
    f.write_char(']')
}

fn write_ranges(f: &mut fmt::Formatter<'_>, ranges: &[ClassRange], dialect: Dialect) -> fmt::Result {
    for range in ranges {
        let (start, end) = (range.start(), range.end());
        dialect.write_char(f, start, dialect.is_class_meta(start))?;
        if end == start {
            continue;
        }
        if increment(start) != Some(end) {
            f.write_char('-')?;
        }
        dialect.write_char(f, end, dialect.is_class_meta(end))?;
    }
    Ok(())
}
