//! Recursive-descent parser: token stream → per-file syntax tree.
//!
//! On an unexpected token the parser records `(message, line)` and
//! resynchronizes to the next top-level declaration; it never aborts. The
//! tower refuses to resolve when any parse (or lex) error was recorded.

pub mod ast;

use crate::lexer::{self, Keyword, Spanned, Token};
use ast::*;

// ─── Errors ──────────────────────────────────────────────────────────

/// A recoverable parse error: `(message, line)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub msg: String,
    pub line: u32,
}

/// Parse one file's source text. Lex errors are folded into the returned
/// error list so callers inspect a single stream of diagnostics in line
/// order.
pub fn parse(source: &str) -> (Vec<Decl>, Vec<ParseError>) {
    let (tokens, lex_errors) = lexer::tokenize(source);
    let mut parser = Parser::new(tokens);
    let decls = parser.parse_file();
    let mut errors: Vec<ParseError> = lex_errors
        .into_iter()
        .map(|e| ParseError {
            msg: e.msg,
            line: e.line,
        })
        .collect();
    errors.append(&mut parser.errors);
    errors.sort_by_key(|e| e.line);
    (decls, errors)
}

// ─── Parser ──────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    errors: Vec<ParseError>,
}

impl Parser {
    fn new(tokens: Vec<Spanned>) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map(|s| &s.token)
            .unwrap_or(&Token::Eof)
    }

    fn line(&self) -> u32 {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|s| s.line)
            .unwrap_or(0)
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.bump();
            true
        } else {
            false
        }
    }

    fn unexpected<T>(&mut self) -> Result<T, ()> {
        let msg = format!("Unexpected {}.", self.peek().describe());
        let line = self.line();
        self.errors.push(ParseError { msg, line });
        Err(())
    }

    fn expect(&mut self, token: &Token) -> Result<(), ()> {
        if self.eat(token) { Ok(()) } else { self.unexpected() }
    }

    fn expect_ident(&mut self) -> Result<String, ()> {
        match self.peek() {
            Token::Ident(_) => match self.bump() {
                Token::Ident(s) => Ok(s),
                _ => unreachable!(),
            },
            _ => self.unexpected(),
        }
    }

    fn expect_newline(&mut self) -> Result<(), ()> {
        self.expect(&Token::Newline)
    }

    // ─── File level ───────────────────────────────────────────────

    fn parse_file(&mut self) -> Vec<Decl> {
        let mut decls = Vec::new();
        loop {
            match self.peek() {
                Token::Eof => break,
                Token::Newline => {
                    self.bump();
                }
                Token::Keyword(Keyword::Namespace) => {
                    if let Ok(d) = self.parse_namespace() {
                        decls.push(Decl::Namespace(d));
                    } else {
                        self.recover();
                    }
                }
                Token::Keyword(Keyword::Import) => {
                    if let Ok(d) = self.parse_import() {
                        decls.push(Decl::Import(d));
                    } else {
                        self.recover();
                    }
                }
                Token::Keyword(Keyword::Alias) => {
                    if let Ok(d) = self.parse_alias() {
                        decls.push(Decl::Alias(d));
                    } else {
                        self.recover();
                    }
                }
                Token::Keyword(Keyword::Struct) => {
                    if let Ok(d) = self.parse_struct() {
                        decls.push(Decl::Struct(d));
                    } else {
                        self.recover();
                    }
                }
                Token::Keyword(Keyword::Union) => {
                    if let Ok(d) = self.parse_union() {
                        decls.push(Decl::Union(d));
                    } else {
                        self.recover();
                    }
                }
                Token::Keyword(Keyword::Route) => {
                    if let Ok(d) = self.parse_route() {
                        decls.push(Decl::Route(d));
                    } else {
                        self.recover();
                    }
                }
                _ => {
                    let _: Result<(), ()> = self.unexpected();
                    self.recover();
                }
            }
        }
        decls
    }

    /// Skip tokens until the stream is back at indentation level zero on a
    /// declaration boundary.
    fn recover(&mut self) {
        let mut depth = 0i32;
        loop {
            match self.peek() {
                Token::Eof => break,
                Token::Indent => {
                    depth += 1;
                    self.bump();
                }
                Token::Dedent => {
                    depth -= 1;
                    self.bump();
                }
                Token::Keyword(
                    Keyword::Namespace
                    | Keyword::Import
                    | Keyword::Alias
                    | Keyword::Struct
                    | Keyword::Route,
                ) if depth <= 0 => break,
                // `union` only starts a declaration at the top level; inside
                // a struct body it opens a subtypes block.
                Token::Keyword(Keyword::Union) if depth <= 0 => break,
                _ => {
                    self.bump();
                }
            }
        }
    }

    // ─── Declarations ─────────────────────────────────────────────

    fn parse_namespace(&mut self) -> Result<NamespaceDecl, ()> {
        let line = self.line();
        self.bump(); // namespace
        let name = self.expect_ident()?;
        self.expect_newline()?;
        let doc = self.parse_indented_doc()?;
        Ok(NamespaceDecl { name, doc, line })
    }

    fn parse_import(&mut self) -> Result<ImportDecl, ()> {
        let line = self.line();
        self.bump(); // import
        let name = self.expect_ident()?;
        self.expect_newline()?;
        Ok(ImportDecl { name, line })
    }

    fn parse_alias(&mut self) -> Result<AliasDecl, ()> {
        let line = self.line();
        self.bump(); // alias
        let name = self.expect_ident()?;
        self.expect(&Token::Equals)?;
        let type_ref = self.parse_type_ref()?;
        self.expect_newline()?;
        Ok(AliasDecl {
            name,
            type_ref,
            line,
        })
    }

    fn parse_struct(&mut self) -> Result<StructDecl, ()> {
        let line = self.line();
        self.bump(); // struct
        let name = self.expect_ident()?;
        let extends = if self.eat(&Token::Keyword(Keyword::Extends)) {
            Some(self.parse_type_ref()?)
        } else {
            None
        };
        self.expect_newline()?;
        self.expect(&Token::Indent)?;

        let doc = self.parse_doc_line()?;
        let subtypes = if *self.peek() == Token::Keyword(Keyword::Union) {
            Some(self.parse_subtypes()?)
        } else {
            None
        };

        let mut fields = Vec::new();
        while matches!(self.peek(), Token::Ident(_)) {
            fields.push(self.parse_field()?);
        }

        let mut examples = Vec::new();
        while *self.peek() == Token::Keyword(Keyword::Example) {
            examples.push(self.parse_example()?);
        }

        self.expect(&Token::Dedent)?;
        Ok(StructDecl {
            name,
            extends,
            doc,
            subtypes,
            fields,
            examples,
            line,
        })
    }

    fn parse_subtypes(&mut self) -> Result<SubtypesDecl, ()> {
        let line = self.line();
        self.bump(); // union
        let catch_all = self.eat(&Token::Star);
        self.expect_newline()?;
        self.expect(&Token::Indent)?;

        let mut fields = Vec::new();
        while matches!(self.peek(), Token::Ident(_)) {
            let field_line = self.line();
            let tag = self.expect_ident()?;
            let type_ref = self.parse_type_ref()?;
            self.expect_newline()?;
            fields.push(SubtypeField {
                tag,
                type_ref,
                line: field_line,
            });
        }
        if fields.is_empty() {
            return self.unexpected();
        }

        self.expect(&Token::Dedent)?;
        Ok(SubtypesDecl {
            catch_all,
            fields,
            line,
        })
    }

    fn parse_field(&mut self) -> Result<FieldDecl, ()> {
        let line = self.line();
        let name = self.expect_ident()?;
        let type_ref = self.parse_type_ref()?;
        let default = if self.eat(&Token::Equals) {
            Some(self.parse_literal()?)
        } else {
            None
        };
        self.expect_newline()?;
        let doc = self.parse_indented_doc()?;
        Ok(FieldDecl {
            name,
            type_ref,
            default,
            doc,
            line,
        })
    }

    fn parse_union(&mut self) -> Result<UnionDecl, ()> {
        let line = self.line();
        self.bump(); // union
        let name = self.expect_ident()?;
        let extends = if self.eat(&Token::Keyword(Keyword::Extends)) {
            Some(self.parse_type_ref()?)
        } else {
            None
        };
        self.expect_newline()?;
        self.expect(&Token::Indent)?;

        let doc = self.parse_doc_line()?;

        let mut fields = Vec::new();
        while matches!(self.peek(), Token::Ident(_)) {
            fields.push(self.parse_union_field()?);
        }

        self.expect(&Token::Dedent)?;
        Ok(UnionDecl {
            name,
            extends,
            doc,
            fields,
            line,
        })
    }

    fn parse_union_field(&mut self) -> Result<UnionFieldDecl, ()> {
        let line = self.line();
        let name = self.expect_ident()?;
        match self.peek() {
            // `tag*` or bare `tag`: void variant
            Token::Star | Token::Newline => {
                let catch_all = self.eat(&Token::Star);
                self.expect_newline()?;
                let doc = self.parse_indented_doc()?;
                Ok(UnionFieldDecl::Void(VoidFieldDecl {
                    name,
                    catch_all,
                    doc,
                    line,
                }))
            }
            _ => {
                let type_ref = self.parse_type_ref()?;
                self.expect_newline()?;
                let doc = self.parse_indented_doc()?;
                Ok(UnionFieldDecl::Typed(FieldDecl {
                    name,
                    type_ref,
                    default: None,
                    doc,
                    line,
                }))
            }
        }
    }

    fn parse_example(&mut self) -> Result<ExampleDecl, ()> {
        let line = self.line();
        self.bump(); // example
        let label = self.expect_ident()?;
        self.expect_newline()?;
        self.expect(&Token::Indent)?;

        let mut entries = Vec::new();
        while matches!(self.peek(), Token::Ident(_)) {
            let name = self.expect_ident()?;
            self.expect(&Token::Equals)?;
            let value = self.parse_literal()?;
            self.expect_newline()?;
            entries.push((name, value));
        }
        if entries.is_empty() {
            return self.unexpected();
        }

        self.expect(&Token::Dedent)?;
        Ok(ExampleDecl {
            label,
            entries,
            line,
        })
    }

    fn parse_route(&mut self) -> Result<RouteDecl, ()> {
        let line = self.line();
        self.bump(); // route
        let name = self.expect_ident()?;
        self.expect(&Token::LParen)?;
        let request = self.parse_type_ref()?;
        self.expect(&Token::Comma)?;
        let response = self.parse_type_ref()?;
        self.expect(&Token::Comma)?;
        let error = self.parse_type_ref()?;
        self.expect(&Token::RParen)?;
        self.expect_newline()?;

        let mut doc = None;
        let mut attrs = Vec::new();
        if self.eat(&Token::Indent) {
            doc = self.parse_doc_line()?;
            while matches!(self.peek(), Token::Ident(_)) {
                let name = self.expect_ident()?;
                self.expect(&Token::Equals)?;
                let value = self.parse_literal()?;
                self.expect_newline()?;
                attrs.push((name, value));
            }
            self.expect(&Token::Dedent)?;
        }

        Ok(RouteDecl {
            name,
            request,
            response,
            error,
            doc,
            attrs,
            line,
        })
    }

    // ─── Shared pieces ────────────────────────────────────────────

    /// `STRING NEWLINE` at the current level, if present.
    fn parse_doc_line(&mut self) -> Result<Option<String>, ()> {
        if let Token::Str(_) = self.peek() {
            let doc = match self.bump() {
                Token::Str(s) => s,
                _ => unreachable!(),
            };
            self.expect_newline()?;
            Ok(Some(doc))
        } else {
            Ok(None)
        }
    }

    /// `INDENT STRING NEWLINE DEDENT`, if present. Used for field and
    /// namespace docstrings that hang below their owner's line.
    fn parse_indented_doc(&mut self) -> Result<Option<String>, ()> {
        if *self.peek() != Token::Indent {
            return Ok(None);
        }
        // Only consume the block when it actually holds a docstring;
        // an INDENT followed by anything else belongs to the caller.
        match self.tokens.get(self.pos + 1).map(|s| &s.token) {
            Some(Token::Str(_)) => {}
            _ => return Ok(None),
        }
        self.bump(); // Indent
        let doc = match self.bump() {
            Token::Str(s) => s,
            _ => unreachable!(),
        };
        self.expect_newline()?;
        self.expect(&Token::Dedent)?;
        Ok(Some(doc))
    }

    fn parse_type_ref(&mut self) -> Result<TypeRef, ()> {
        let line = self.line();
        let (ns, name) = match self.peek() {
            Token::Ident(_) => match self.bump() {
                Token::Ident(s) => (None, s),
                _ => unreachable!(),
            },
            Token::Path(_) => match self.bump() {
                Token::Path(p) => {
                    let mut parts = p.splitn(2, '.');
                    let ns = parts.next().unwrap_or_default().to_string();
                    let name = parts.next().unwrap_or_default().to_string();
                    (Some(ns), name)
                }
                _ => unreachable!(),
            },
            _ => return self.unexpected(),
        };

        let mut args = Vec::new();
        let mut kwargs = Vec::new();
        if self.eat(&Token::LParen) {
            if *self.peek() != Token::RParen {
                loop {
                    self.parse_type_arg(&mut args, &mut kwargs)?;
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
            }
            self.expect(&Token::RParen)?;
        }

        let nullable = self.eat(&Token::Question);
        Ok(TypeRef {
            name,
            ns,
            args,
            kwargs,
            nullable,
            line,
        })
    }

    fn parse_type_arg(
        &mut self,
        args: &mut Vec<TypeArg>,
        kwargs: &mut Vec<(String, LiteralNode)>,
    ) -> Result<(), ()> {
        match self.peek() {
            // `name=literal` keyword argument, or a bare type reference
            Token::Ident(_) => {
                if self.tokens.get(self.pos + 1).map(|s| &s.token) == Some(&Token::Equals) {
                    let name = self.expect_ident()?;
                    self.bump(); // =
                    let value = self.parse_literal()?;
                    kwargs.push((name, value));
                } else {
                    args.push(TypeArg::Type(self.parse_type_ref()?));
                }
            }
            Token::Path(_) => {
                args.push(TypeArg::Type(self.parse_type_ref()?));
            }
            Token::Int(_) | Token::Float(_) | Token::Str(_) => {
                args.push(TypeArg::Literal(self.parse_literal()?));
            }
            _ => return self.unexpected(),
        }
        Ok(())
    }

    fn parse_literal(&mut self) -> Result<LiteralNode, ()> {
        match self.peek() {
            Token::Int(_) => match self.bump() {
                Token::Int(n) => Ok(LiteralNode::Int(n)),
                _ => unreachable!(),
            },
            Token::Float(_) => match self.bump() {
                Token::Float(v) => Ok(LiteralNode::Float(v)),
                _ => unreachable!(),
            },
            Token::Str(_) => match self.bump() {
                Token::Str(s) => Ok(LiteralNode::Str(s)),
                _ => unreachable!(),
            },
            Token::Ident(_) => match self.bump() {
                Token::Ident(s) => Ok(match s.as_str() {
                    "true" => LiteralNode::Bool(true),
                    "false" => LiteralNode::Bool(false),
                    "null" => LiteralNode::Null,
                    _ => LiteralNode::TagRef(s),
                }),
                _ => unreachable!(),
            },
            _ => self.unexpected(),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
