//! Indentation-sensitive lexer for `.babel` source.
//!
//! Produces a flat token stream with explicit `Indent`/`Dedent`/`Newline`
//! tokens from an in-memory source buffer. The indent unit is four spaces,
//! tracked with an explicit level stack; synthetic `Dedent`s are emitted at
//! EOF so the parser never has to special-case truncated files.
//!
//! The lexer never aborts: illegal characters and misaligned indentation are
//! recorded as `(message, line)` pairs and lexing resumes on the next
//! character or line.

use std::fmt;

// ─── Tokens ──────────────────────────────────────────────────────────

/// Keywords of the Babel grammar. Built-in type names are ordinary
/// identifiers; the parser resolves them against the reserved set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Namespace,
    Import,
    Alias,
    Struct,
    Union,
    Route,
    Extends,
    Example,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Namespace => "namespace",
            Self::Import => "import",
            Self::Alias => "alias",
            Self::Struct => "struct",
            Self::Union => "union",
            Self::Route => "route",
            Self::Extends => "extends",
            Self::Example => "example",
        }
    }

    fn from_ident(s: &str) -> Option<Keyword> {
        match s {
            "namespace" => Some(Self::Namespace),
            "import" => Some(Self::Import),
            "alias" => Some(Self::Alias),
            "struct" => Some(Self::Struct),
            "union" => Some(Self::Union),
            "route" => Some(Self::Route),
            "extends" => Some(Self::Extends),
            "example" => Some(Self::Example),
            _ => None,
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare identifier
    Ident(String),
    /// Dotted qualified identifier, e.g. `ns2.S`
    Path(String),
    /// Integer literal. Wide accumulator; range checks against the target
    /// type happen during resolution.
    Int(i128),
    Float(f64),
    /// String literal with escapes applied and block indentation trimmed
    Str(String),
    Keyword(Keyword),
    Equals,
    Question,
    Star,
    LParen,
    RParen,
    Comma,
    Newline,
    Indent,
    Dedent,
    Eof,
}

impl Token {
    /// Human-readable description used in parse errors, e.g.
    /// `ID with value 'strct'`.
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("ID with value '{}'", s),
            Token::Path(s) => format!("PATH with value '{}'", s),
            Token::Int(n) => format!("INTEGER with value '{}'", n),
            Token::Float(v) => format!("FLOAT with value '{}'", v),
            Token::Str(_) => "STRING".to_string(),
            Token::Keyword(k) => format!("KEYWORD with value '{}'", k),
            Token::Equals => "'='".to_string(),
            Token::Question => "'?'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Newline => "NEWLINE".to_string(),
            Token::Indent => "INDENT".to_string(),
            Token::Dedent => "DEDENT".to_string(),
            Token::Eof => "EOF".to_string(),
        }
    }
}

/// A token with the 1-based source line it started on.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
}

/// A recoverable lexing error: `(message, line)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub msg: String,
    pub line: u32,
}

// ─── Lexer ───────────────────────────────────────────────────────────

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    indent_stack: Vec<u32>,
    tokens: Vec<Spanned>,
    errors: Vec<LexError>,
}

/// Tokenize a full source buffer. Returns every token lexed plus the
/// recoverable errors encountered along the way.
pub fn tokenize(source: &str) -> (Vec<Spanned>, Vec<LexError>) {
    let mut lexer = Lexer::new(source);
    lexer.run();
    (lexer.tokens, lexer.errors)
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            indent_stack: vec![0],
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn push(&mut self, token: Token) {
        self.tokens.push(Spanned {
            token,
            line: self.line,
        });
    }

    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(LexError {
            msg: msg.into(),
            line: self.line,
        });
    }

    fn run(&mut self) {
        while self.pos < self.chars.len() {
            self.lex_line();
        }
        // Close any open blocks so the parser sees balanced indentation.
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.push(Token::Dedent);
        }
        self.push(Token::Eof);
    }

    /// Lex one physical line: measure indentation, then the line body.
    /// Blank lines and full-line comments produce no tokens and leave the
    /// indent stack untouched.
    fn lex_line(&mut self) {
        let mut indent = 0u32;
        while self.peek() == Some(' ') {
            self.bump();
            indent += 1;
        }

        match self.peek() {
            None => return,
            Some('\n') => {
                self.bump();
                return;
            }
            Some('#') => {
                self.skip_to_line_end();
                return;
            }
            _ => {}
        }

        if indent % 4 != 0 {
            self.error("Indent is not divisible by 4.");
            self.skip_to_line_end();
            return;
        }

        let level = indent / 4;
        let current = *self.indent_stack.last().unwrap_or(&0);
        if level > current {
            for l in current + 1..=level {
                self.push(Token::Indent);
                self.indent_stack.push(l);
            }
        } else if level < current {
            while self
                .indent_stack
                .last()
                .is_some_and(|&top| top > level && top > 0)
            {
                self.indent_stack.pop();
                self.push(Token::Dedent);
            }
        }

        self.lex_line_body();
    }

    fn skip_to_line_end(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    /// Lex tokens until the end of the logical line, then emit `Newline`.
    fn lex_line_body(&mut self) {
        let mut produced = false;
        loop {
            match self.peek() {
                None => break,
                Some('\n') => {
                    self.bump();
                    break;
                }
                Some(' ') => {
                    self.bump();
                }
                Some('#') => {
                    self.skip_to_line_end();
                    break;
                }
                Some('"') => {
                    self.lex_string();
                    produced = true;
                }
                Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                    self.lex_word();
                    produced = true;
                }
                Some(c) if c.is_ascii_digit() => {
                    self.lex_number(false);
                    produced = true;
                }
                Some('-') if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                    self.bump();
                    self.lex_number(true);
                    produced = true;
                }
                Some(c) => {
                    let token = match c {
                        '=' => Some(Token::Equals),
                        '?' => Some(Token::Question),
                        '*' => Some(Token::Star),
                        '(' => Some(Token::LParen),
                        ')' => Some(Token::RParen),
                        ',' => Some(Token::Comma),
                        _ => None,
                    };
                    self.bump();
                    match token {
                        Some(t) => {
                            self.push(t);
                            produced = true;
                        }
                        None => self.error(format!("Illegal character '{}'.", c)),
                    }
                }
            }
        }
        if produced {
            self.push(Token::Newline);
        }
    }

    /// Identifier, keyword, or dotted path.
    fn lex_word(&mut self) {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                word.push(c);
                self.bump();
            } else if c == '.'
                && self
                    .peek_at(1)
                    .is_some_and(|n| n.is_ascii_alphabetic() || n == '_')
            {
                word.push(c);
                self.bump();
            } else {
                break;
            }
        }

        if word.contains('.') {
            self.push(Token::Path(word));
        } else if let Some(kw) = Keyword::from_ident(&word) {
            self.push(Token::Keyword(kw));
        } else {
            self.push(Token::Ident(word));
        }
    }

    /// Integer or float, with an optional already-consumed leading minus.
    fn lex_number(&mut self, negative: bool) {
        let mut text = String::new();
        if negative {
            text.push('-');
        }
        let mut is_float = false;

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            text.push(self.bump().unwrap());
        }
        if self.peek() == Some('.') {
            is_float = true;
            text.push(self.bump().unwrap());
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                text.push(self.bump().unwrap());
            }
        }
        if self.peek().is_some_and(|c| c == 'e' || c == 'E') {
            let sign_ok = matches!(self.peek_at(1), Some(c) if c.is_ascii_digit() || c == '-' || c == '+');
            if sign_ok {
                is_float = true;
                text.push(self.bump().unwrap());
                if matches!(self.peek(), Some('-') | Some('+')) {
                    text.push(self.bump().unwrap());
                }
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    text.push(self.bump().unwrap());
                }
            }
        }

        if is_float {
            match text.parse::<f64>() {
                Ok(v) => self.push(Token::Float(v)),
                Err(_) => self.error(format!("Malformed number '{}'.", text)),
            }
        } else {
            match text.parse::<i128>() {
                Ok(v) => self.push(Token::Int(v)),
                Err(_) => self.error(format!("Malformed number '{}'.", text)),
            }
        }
    }

    /// String literal. A literal may span lines; multi-line contents get the
    /// common leading indent of their continuation lines stripped.
    fn lex_string(&mut self) {
        let start_line = self.line;
        self.bump(); // opening quote
        let mut content = String::new();
        // Block trimming applies only to literals that physically span
        // source lines; an escaped \n is content, not layout.
        let mut spans_lines = false;
        loop {
            match self.bump() {
                None => {
                    self.errors.push(LexError {
                        msg: "Unterminated string.".to_string(),
                        line: start_line,
                    });
                    break;
                }
                Some('"') => break,
                Some('\\') => match self.bump() {
                    Some('\\') => content.push('\\'),
                    Some('"') => content.push('"'),
                    Some('n') => content.push('\n'),
                    Some('t') => content.push('\t'),
                    Some(other) => {
                        content.push('\\');
                        content.push(other);
                    }
                    None => {
                        self.errors.push(LexError {
                            msg: "Unterminated string.".to_string(),
                            line: start_line,
                        });
                        break;
                    }
                },
                Some(c) => {
                    if c == '\n' {
                        spans_lines = true;
                    }
                    content.push(c);
                }
            }
        }
        let processed = if spans_lines {
            trim_block_string(&content)
        } else {
            content
        };
        self.tokens.push(Spanned {
            token: Token::Str(processed),
            line: start_line,
        });
    }
}

/// Normalize a multi-line string literal: drop a whitespace-only first line,
/// strip the common leading indent of the remaining lines (whitespace-only
/// lines count as empty), keep a non-blank first line verbatim.
///
/// Single-line literals pass through unchanged.
fn trim_block_string(content: &str) -> String {
    if !content.contains('\n') {
        return content.to_string();
    }
    let lines: Vec<&str> = content.split('\n').collect();

    let common_indent = lines[1..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);

    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let first_blank = lines[0].trim().is_empty();
    if !first_blank {
        out.push(lines[0]);
    }
    for l in &lines[1..] {
        if l.trim().is_empty() {
            out.push("");
        } else {
            out.push(&l[common_indent..]);
        }
    }
    out.join("\n")
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "lexer_tests.rs"]
mod tests;
