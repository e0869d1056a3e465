//! Destructuring patterns
//!
//! A `Pattern` is parsed from source text and matched against a [`Term`].
//! The original text is kept so fault messages can quote exactly what the
//! caller wrote.
//!
//! # Syntax
//!
//! | Form | Meaning |
//! |------|---------|
//! | `_`, `_reason` | match anything, bind nothing |
//! | `name` | bind the value to `name` |
//! | `^name` | match the current value of an existing binding |
//! | `:atom`, `:"any text"`, `nil`, `true`, `false` | atom literal |
//! | `42`, `-1`, `2.5` | number literal |
//! | `"text"` | string literal |
//! | `{p1, p2}` | tuple of exactly that size |
//! | `[p1, p2]` | list of exactly that length |
//! | `[head \| tail]` | non-empty list, `tail` matched against the rest |
//!
//! A name used twice in one pattern only matches when both positions hold
//! equal values.
//!
//! # Examples
//!
//! ```
//! use sluice::{Bindings, Pattern, Term};
//!
//! let pattern = Pattern::parse("{:ok, [first | _]}").unwrap();
//! let value = Term::ok(Term::list([1, 2, 3]));
//!
//! let captured = pattern.matches(&value, &Bindings::new()).unwrap();
//! assert_eq!(captured["first"], Term::Int(1));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::term::{is_plain_atom, write_seq};
use crate::{Bindings, Term};

/// A parsed pattern together with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    source: String,
    node: Node,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Ignore(String),
    Var(String),
    Pin(String),
    Literal(Term),
    Tuple(Vec<Node>),
    List { items: Vec<Node>, tail: Option<Box<Node>> },
}

/// Error returned when pattern text cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError {
    /// The text that failed to parse
    pub input: String,
    /// Byte offset of the problem
    pub position: usize,
    /// What went wrong
    pub message: String,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid pattern `{}` at offset {}: {}",
            self.input, self.position, self.message
        )
    }
}

impl std::error::Error for PatternError {}

impl Pattern {
    /// Parse a pattern from source text.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice::Pattern;
    ///
    /// let p = Pattern::parse("{:error, reason}").unwrap();
    /// assert_eq!(p.source(), "{:error, reason}");
    /// assert_eq!(p.variables(), vec!["reason"]);
    ///
    /// assert!(Pattern::parse("{:ok,").is_err());
    /// ```
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let mut parser = Parser {
            input: source,
            pos: 0,
        };
        parser.skip_ws();
        let node = parser.node()?;
        parser.skip_ws();
        if parser.pos < source.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(Pattern {
            source: source.to_string(),
            node,
        })
    }

    /// The pattern exactly as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The pattern rendered in normalized form, independent of spacing.
    pub fn canonical(&self) -> String {
        self.node.to_string()
    }

    /// Returns `true` if the pattern matches every value.
    pub fn is_irrefutable(&self) -> bool {
        matches!(self.node, Node::Ignore(_) | Node::Var(_))
    }

    /// Names this pattern binds, in order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.node.collect_vars(&mut names);
        names
    }

    /// Match `term`, returning the bindings the pattern captures.
    ///
    /// `env` is only consulted for pinned names (`^name`); it is never
    /// modified. Returns `None` when the term does not match.
    pub fn matches(&self, term: &Term, env: &Bindings) -> Option<Bindings> {
        let mut captured = Bindings::new();
        if self.node.match_into(term, env, &mut captured) {
            Some(captured)
        } else {
            None
        }
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Node {
    fn match_into(&self, term: &Term, env: &Bindings, captured: &mut Bindings) -> bool {
        match self {
            Node::Ignore(_) => true,
            Node::Var(name) => match captured.get(name) {
                Some(existing) => existing == term,
                None => {
                    captured.insert(name.clone(), term.clone());
                    true
                }
            },
            Node::Pin(name) => env.get(name) == Some(term),
            Node::Literal(literal) => literal == term,
            Node::Tuple(nodes) => match term {
                Term::Tuple(items) if items.len() == nodes.len() => nodes
                    .iter()
                    .zip(items)
                    .all(|(node, item)| node.match_into(item, env, captured)),
                _ => false,
            },
            Node::List { items: nodes, tail } => {
                let Term::List(items) = term else {
                    return false;
                };
                match tail {
                    None if items.len() != nodes.len() => false,
                    Some(_) if items.len() < nodes.len() => false,
                    _ => {
                        let (head, rest) = items.split_at(nodes.len());
                        let head_ok = nodes
                            .iter()
                            .zip(head)
                            .all(|(node, item)| node.match_into(item, env, captured));
                        head_ok
                            && tail.as_ref().is_none_or(|tail| {
                                tail.match_into(&Term::List(rest.to_vec()), env, captured)
                            })
                    }
                }
            }
        }
    }

    fn collect_vars<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Node::Var(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name.as_str());
                }
            }
            Node::Tuple(nodes) => nodes.iter().for_each(|n| n.collect_vars(names)),
            Node::List { items, tail } => {
                items.iter().for_each(|n| n.collect_vars(names));
                if let Some(tail) = tail {
                    tail.collect_vars(names);
                }
            }
            Node::Ignore(_) | Node::Pin(_) | Node::Literal(_) => {}
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Ignore(name) | Node::Var(name) => f.write_str(name),
            Node::Pin(name) => write!(f, "^{}", name),
            Node::Literal(term) => write!(f, "{}", term),
            Node::Tuple(nodes) => write_seq(f, "{", nodes, "}"),
            Node::List { items, tail: None } => write_seq(f, "[", items, "]"),
            Node::List {
                items,
                tail: Some(tail),
            } => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, " | {}]", tail)
            }
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, message: impl Into<String>) -> PatternError {
        PatternError {
            input: self.input.to_string(),
            position: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn node(&mut self) -> Result<Node, PatternError> {
        match self.peek() {
            Some('{') => {
                self.bump();
                let (items, _) = self.elements('}', false)?;
                Ok(Node::Tuple(items))
            }
            Some('[') => {
                self.bump();
                let (items, tail) = self.elements(']', true)?;
                Ok(Node::List {
                    items,
                    tail: tail.map(Box::new),
                })
            }
            Some(':') => {
                self.bump();
                let name = if self.peek() == Some('"') {
                    self.string()?
                } else {
                    let name = self.ident();
                    if !is_plain_atom(&name) {
                        return Err(self.error("expected atom name after `:`"));
                    }
                    name
                };
                Ok(Node::Literal(Term::Atom(name)))
            }
            Some('"') => Ok(Node::Literal(Term::Str(self.string()?))),
            Some('^') => {
                self.bump();
                let name = self.ident();
                if name.is_empty() || name.starts_with('_') {
                    return Err(self.error("expected variable name after `^`"));
                }
                Ok(Node::Pin(name))
            }
            Some(c) if c == '-' || c.is_ascii_digit() => self.number(),
            Some(c) if c == '_' || c.is_ascii_lowercase() => {
                let name = self.ident();
                Ok(match name.as_str() {
                    "nil" | "true" | "false" => Node::Literal(Term::Atom(name)),
                    _ if name.starts_with('_') => Node::Ignore(name),
                    _ => Node::Var(name),
                })
            }
            Some(c) => Err(self.error(format!("unexpected character `{}`", c))),
            None => Err(self.error("unexpected end of pattern")),
        }
    }

    /// Comma separated patterns up to `close`, with an optional `| tail`.
    fn elements(
        &mut self,
        close: char,
        allow_tail: bool,
    ) -> Result<(Vec<Node>, Option<Node>), PatternError> {
        let mut items = Vec::new();
        self.skip_ws();
        if self.eat(close) {
            return Ok((items, None));
        }
        loop {
            self.skip_ws();
            items.push(self.node()?);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if allow_tail && self.eat('|') {
                self.skip_ws();
                let tail = self.node()?;
                self.skip_ws();
                if !self.eat(close) {
                    return Err(self.error(format!("expected `{}`", close)));
                }
                return Ok((items, Some(tail)));
            }
            if self.eat(close) {
                return Ok((items, None));
            }
            return Err(self.error(format!("expected `,` or `{}`", close)));
        }
    }

    fn ident(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.bump();
        }
        if matches!(self.peek(), Some('?') | Some('!')) {
            self.bump();
        }
        self.input[start..self.pos].to_string()
    }

    fn string(&mut self) -> Result<String, PatternError> {
        // opening quote
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('0') => out.push('\0'),
                    Some('u') => out.push(self.unicode_escape()?),
                    Some(c @ ('"' | '\\')) => out.push(c),
                    Some(c) => return Err(self.error(format!("unknown escape `\\{}`", c))),
                    None => return Err(self.error("unterminated string")),
                },
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    /// The `{hex}` part of a `\u{hex}` escape.
    fn unicode_escape(&mut self) -> Result<char, PatternError> {
        if !self.eat('{') {
            return Err(self.error("expected `{` after `\\u`"));
        }
        let input = self.input;
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.bump();
        }
        let digits = &input[start..self.pos];
        if digits.is_empty() || digits.len() > 6 || !self.eat('}') {
            return Err(self.error("malformed `\\u{..}` escape"));
        }
        u32::from_str_radix(digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(format!("invalid code point `{}`", digits)))
    }

    fn number(&mut self) -> Result<Node, PatternError> {
        let start = self.pos;
        self.eat('-');
        let digits_start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.pos == digits_start {
            return Err(self.error("expected digits"));
        }
        let mut is_float = false;
        if self.peek() == Some('.') {
            self.bump();
            let frac_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
            if self.pos == frac_start {
                return Err(self.error("expected digits after `.`"));
            }
            is_float = true;
        }
        let text = &self.input[start..self.pos];
        let term = if is_float {
            text.parse::<f64>().map(Term::Float).ok()
        } else {
            text.parse::<i64>().map(Term::Int).ok()
        };
        term.map(Node::Literal)
            .ok_or_else(|| self.error(format!("number `{}` out of range", text)))
    }
}
