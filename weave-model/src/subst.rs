#![forbid(unsafe_code)]

use std::collections::BTreeMap;

/// Mapping from type parameter names to the type arguments replacing them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitution {
    map: BTreeMap<String, String>,
}

impl Substitution {
    /// Pairs `params` with `args`. Missing or identical arguments are skipped.
    pub fn new(params: &[String], args: &[String]) -> Self {
        let map = params
            .iter()
            .zip(args.iter())
            .filter(|(p, a)| p != a)
            .map(|(p, a)| (p.clone(), a.clone()))
            .collect();
        Substitution { map }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn apply(&self, text: &str) -> String {
        if self.map.is_empty() {
            return text.to_string();
        }
        substitute_idents(text, &self.map)
    }

    pub fn apply_all(&self, items: &[String]) -> Vec<String> {
        items.iter().map(|s| self.apply(s)).collect()
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Replaces whole identifiers found in `map`.
///
/// String and character literals are copied untouched, except for the holes
/// of interpolated strings, which are code. An identifier directly after `.`
/// is a member access, never a type parameter.
pub fn substitute_idents(text: &str, map: &BTreeMap<String, String>) -> String {
    let mut scanner = Scanner {
        chars: text.chars().collect(),
        pos: 0,
        out: String::with_capacity(text.len()),
        map,
        last_significant: None,
    };
    scanner.code(false);
    scanner.out
}

struct Scanner<'m> {
    chars: Vec<char>,
    pos: usize,
    out: String,
    map: &'m BTreeMap<String, String>,
    last_significant: Option<char>,
}

impl Scanner<'_> {
    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek(0) {
            self.out.push(c);
            self.pos += 1;
        }
    }

    /// Copies code up to the end of input or, inside an interpolation hole,
    /// up to (not including) the brace that closes it.
    fn code(&mut self, in_hole: bool) {
        let mut depth = 0usize;
        while let Some(c) = self.peek(0) {
            match c {
                '"' | '\'' => self.literal(c),
                '{' if in_hole => {
                    depth += 1;
                    self.last_significant = Some(c);
                    self.bump();
                }
                '}' if in_hole => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    self.last_significant = Some(c);
                    self.bump();
                }
                c if is_ident_start(c) => self.ident(),
                _ => {
                    if !c.is_whitespace() {
                        self.last_significant = Some(c);
                    }
                    self.bump();
                }
            }
        }
    }

    fn ident(&mut self) {
        let start = self.pos;
        while self.peek(0).is_some_and(is_ident_continue) {
            self.pos += 1;
        }
        let ident: String = self.chars[start..self.pos].iter().collect();
        match self.map.get(&ident) {
            Some(replacement) if self.last_significant != Some('.') => self.out.push_str(replacement),
            _ => self.out.push_str(&ident),
        }
        self.last_significant = Some('a');
    }

    /// `@` and `$` prefixes directly before the opening quote.
    fn prefixes(&self) -> (bool, bool) {
        let (mut verbatim, mut interpolated) = (false, false);
        for &c in self.chars[..self.pos].iter().rev() {
            match c {
                '@' if !verbatim => verbatim = true,
                '$' if !interpolated => interpolated = true,
                _ => break,
            }
        }
        (verbatim, interpolated)
    }

    fn literal(&mut self, quote: char) {
        let (verbatim, interpolated) = if quote == '"' { self.prefixes() } else { (false, false) };
        self.bump();
        while let Some(d) = self.peek(0) {
            if d == '\\' && !verbatim {
                self.bump();
                self.bump();
                continue;
            }
            if interpolated && d == '{' {
                if self.peek(1) == Some('{') {
                    self.bump();
                    self.bump();
                    continue;
                }
                self.bump();
                self.last_significant = Some(d);
                self.code(true);
                self.bump();
                continue;
            }
            self.bump();
            if d == quote {
                if verbatim && self.peek(0) == Some('"') {
                    self.bump();
                    continue;
                }
                break;
            }
        }
        self.last_significant = Some(quote);
    }
}
