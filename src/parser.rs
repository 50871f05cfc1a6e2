//! Field mask parsing.
//!
//! Accepts the partial-response syntax used by `fields=` / `excludes=`:
//!
//! ```text
//! title,author/username,comments(body,author/email)
//! ```
//!
//! `,` separates siblings, `/` steps into a nested field, and `(...)` groups
//! several nested siblings under one parent. Parsing never fails: stray
//! delimiters are dropped, unclosed groups close at end of input, and
//! nesting below [`MAX_FIELD_DEPTH`] names is cut off.

use crate::types::{FieldTree, MAX_FIELD_DEPTH};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Name(String),
    Comma,
    Slash,
    Open,
    Close,
}

/// Parse a field mask into a [`FieldTree`].
///
/// Absent or blank input yields an empty tree ("no constraint").
///
/// ```
/// use fieldmask::parse_fields;
///
/// let tree = parse_fields("title,author/username");
/// assert!(tree.contains("title"));
/// assert!(tree.get("author").unwrap().contains("username"));
/// assert!(parse_fields(None::<&str>).is_empty());
/// ```
pub fn parse_fields<'a>(spec: impl Into<Option<&'a str>>) -> FieldTree {
    let mut tree = FieldTree::new();
    let Some(spec) = spec.into() else {
        return tree;
    };

    let tokens = tokenize(spec);
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_list(&mut tree, 0, 0);
    tree
}

fn tokenize(spec: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut name = String::new();

    for c in spec.chars() {
        let delimiter = match c {
            ',' => Token::Comma,
            '/' => Token::Slash,
            '(' => Token::Open,
            ')' => Token::Close,
            _ => {
                name.push(c);
                continue;
            }
        };
        flush_name(&mut name, &mut tokens);
        tokens.push(delimiter);
    }
    flush_name(&mut name, &mut tokens);

    tokens
}

fn flush_name(name: &mut String, tokens: &mut Vec<Token>) {
    let trimmed = name.trim();
    if !trimmed.is_empty() {
        tokens.push(Token::Name(trimmed.to_string()));
    }
    name.clear();
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    /// Siblings up to the `)` closing this group (or end of input).
    ///
    /// `level` is how many names sit above `node`.
    fn parse_list(&mut self, node: &mut FieldTree, group: usize, level: usize) {
        while let Some(token) = self.advance() {
            match token {
                Token::Name(name) => self.parse_nested(node.entry(name), group, level + 1),
                Token::Close if group > 0 => return,
                // Stray separators and unmatched groups at this level.
                Token::Comma | Token::Slash | Token::Open | Token::Close => {}
            }
        }
    }

    /// Whatever follows a name: `/child...`, `(group)`, or nothing.
    fn parse_nested(&mut self, node: &mut FieldTree, group: usize, level: usize) {
        if level >= MAX_FIELD_DEPTH {
            self.skip_nested();
            return;
        }

        match self.peek() {
            Some(Token::Slash) => {
                while self.peek() == Some(&Token::Slash) {
                    self.pos += 1;
                }
                match self.peek() {
                    Some(Token::Name(_)) => {
                        if let Some(Token::Name(name)) = self.advance() {
                            self.parse_nested(node.entry(name), group, level + 1);
                        }
                    }
                    Some(Token::Open) => {
                        self.pos += 1;
                        self.parse_list(node, group + 1, level);
                    }
                    // Trailing slash
                    _ => {}
                }
            }
            Some(Token::Open) => {
                self.pos += 1;
                self.parse_list(node, group + 1, level);
            }
            _ => {}
        }
    }

    /// Consume what follows a name at the depth limit without building it.
    ///
    /// Stops where `parse_nested` would: at a sibling `,`, the `)` of an
    /// enclosing group, or right after its own group closes.
    fn skip_nested(&mut self) {
        let mut open = 0usize;
        while let Some(token) = self.peek() {
            let group_closed = match token {
                Token::Open => {
                    open += 1;
                    false
                }
                Token::Comma | Token::Close if open == 0 => return,
                Token::Close => {
                    open -= 1;
                    open == 0
                }
                Token::Name(_) | Token::Slash | Token::Comma => false,
            };
            self.pos += 1;
            if group_closed {
                return;
            }
        }
    }
}
