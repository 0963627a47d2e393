//! Recursive-descent parser for Go declarations.
//!
//! Only the shape of each top-level declaration is parsed. Function bodies and initializer
//! expressions are located by bracket matching and kept as raw source text.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::ast::{
    ChanDir, Decl, Expr, Field, FuncDecl, FuncType, Import, InterfaceElem, SourceFile, TypeRef,
    TypeSpec, ValueSpec,
};
use crate::lexer::{Token, TokenKind, tokenize};

/// Matches the marker described at <https://go.dev/s/generatedcode>.
static GENERATED_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^// Code generated .* DO NOT EDIT\.\r?$").expect("generated marker regex")
});

/// A syntax error with a 1-based source position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{line}:{column}: {message}")]
pub struct SyntaxError {
    /// 1-based line.
    pub line: usize,
    /// 1-based column, in characters.
    pub column: usize,
    /// What was expected and what was found.
    pub message: String,
}

impl SyntaxError {
    /// Build an error for the byte `offset` of `src`.
    pub fn at(src: &str, offset: usize, message: impl Into<String>) -> Self {
        let before = src.get(..offset.min(src.len())).unwrap_or(src);
        let line = before.matches('\n').count() + 1;
        let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Parse a complete Go source file.
pub fn parse_file(src: &str) -> Result<SourceFile, SyntaxError> {
    let tokens = tokenize(src)?;
    Parser {
        src,
        tokens,
        pos: 0,
    }
    .file()
}

type PResult<T> = Result<T, SyntaxError>;

struct Parser<'src> {
    src: &'src str,
    tokens: Vec<Token<'src>>,
    pos: usize,
}

impl<'src> Parser<'src> {
    fn file(&mut self) -> PResult<SourceFile> {
        let package_start = self.offset();
        self.expect(TokenKind::Package, "package clause")?;
        let package = self.ident()?;
        self.end_of_decl()?;

        let mut imports = Vec::new();
        let mut decls = Vec::new();
        while let Some(kind) = self.peek() {
            match kind {
                TokenKind::Semi => {
                    self.pos += 1;
                    continue;
                }
                TokenKind::Import => {
                    self.pos += 1;
                    imports.extend(self.group(Self::import_spec)?);
                }
                TokenKind::Const => {
                    self.pos += 1;
                    decls.push(Decl::Const(self.group(Self::value_spec)?));
                }
                TokenKind::Var => {
                    self.pos += 1;
                    decls.push(Decl::Var(self.group(Self::value_spec)?));
                }
                TokenKind::Type => {
                    self.pos += 1;
                    decls.push(Decl::Type(self.group(Self::type_spec)?));
                }
                TokenKind::Func => decls.push(Decl::Func(self.func_decl()?)),
                _ => return Err(self.error("expected declaration")),
            }
            self.end_of_decl()?;
        }

        Ok(SourceFile {
            package,
            imports,
            decls,
            generated: GENERATED_MARKER.is_match(&self.src[..package_start]),
        })
    }

    /// A single spec, or a parenthesized, semicolon-separated list of them.
    fn group<T>(&mut self, mut spec: impl FnMut(&mut Self) -> PResult<T>) -> PResult<Vec<T>> {
        if !self.eat(TokenKind::LParen) {
            return Ok(vec![spec(self)?]);
        }
        let mut specs = Vec::new();
        while !self.eat(TokenKind::RParen) {
            if self.eat(TokenKind::Semi) {
                continue;
            }
            specs.push(spec(self)?);
            if !self.at(TokenKind::RParen) {
                self.expect(TokenKind::Semi, "';' or ')'")?;
            }
        }
        Ok(specs)
    }

    fn import_spec(&mut self) -> PResult<Import> {
        let alias = match self.peek() {
            Some(TokenKind::Ident) => Some(self.ident()?),
            Some(TokenKind::Dot) => {
                self.pos += 1;
                Some(".".to_string())
            }
            _ => None,
        };
        match self.tokens.get(self.pos) {
            Some(token) if matches!(token.kind, TokenKind::String | TokenKind::RawString) => {
                self.pos += 1;
                Ok(Import {
                    alias,
                    path: unquote(token.text).to_string(),
                })
            }
            _ => Err(self.error("expected import path")),
        }
    }

    fn value_spec(&mut self) -> PResult<ValueSpec> {
        let names = self.ident_list()?;
        let ty = match self.peek() {
            None | Some(TokenKind::Assign | TokenKind::Semi | TokenKind::RParen) => None,
            Some(_) => Some(self.parse_type()?),
        };
        let values = if self.eat(TokenKind::Assign) {
            self.expr_list()?
        } else {
            Vec::new()
        };
        Ok(ValueSpec { names, ty, values })
    }

    fn type_spec(&mut self) -> PResult<TypeSpec> {
        let name = self.ident()?;
        let type_params = if self.at(TokenKind::LBrack) && self.opens_type_params() {
            self.type_params()?
        } else {
            Vec::new()
        };
        let alias = self.eat(TokenKind::Assign);
        let ty = self.parse_type()?;
        Ok(TypeSpec {
            name,
            type_params,
            alias,
            ty,
        })
    }

    /// After `type Name`, at `[`: type parameters (`[T any]`) rather than an array length.
    fn opens_type_params(&self) -> bool {
        use TokenKind::*;
        self.peek_at(1) == Some(Ident)
            && matches!(
                self.peek_at(2),
                Some(Ident | Comma | Tilde | Interface | LBrack | Func | Map | Chan | Struct)
            )
    }

    fn func_decl(&mut self) -> PResult<FuncDecl> {
        self.expect(TokenKind::Func, "'func'")?;
        let recv = if self.at(TokenKind::LParen) {
            Some(self.params()?)
        } else {
            None
        };
        let name = self.ident()?;
        let type_params = if self.at(TokenKind::LBrack) {
            self.type_params()?
        } else {
            Vec::new()
        };
        let params = self.params()?;
        let results = self.results()?;
        let body = if self.at(TokenKind::LBrace) {
            Some(self.body()?)
        } else {
            None
        };
        Ok(FuncDecl {
            recv,
            name,
            signature: FuncType {
                type_params,
                params,
                results,
            },
            body,
        })
    }

    fn body(&mut self) -> PResult<String> {
        let open = self.pos;
        let close = self
            .matching_close(open)
            .ok_or_else(|| self.error("unterminated function body"))?;
        let text = self.src[self.tokens[open].end..self.tokens[close].start].to_string();
        self.pos = close + 1;
        Ok(text)
    }

    fn type_params(&mut self) -> PResult<Vec<Field>> {
        self.expect(TokenKind::LBrack, "'['")?;
        let mut fields = Vec::new();
        let mut pending = Vec::new();
        while !self.eat(TokenKind::RBrack) {
            pending.push(self.ident()?);
            if self.eat(TokenKind::Comma) {
                continue;
            }
            let constraint = self.type_elem()?;
            fields.push(Field::new(std::mem::take(&mut pending), constraint));
            if !self.at(TokenKind::RBrack) {
                self.expect(TokenKind::Comma, "',' or ']'")?;
            }
        }
        if !pending.is_empty() {
            return Err(self.error("missing type constraint"));
        }
        Ok(fields)
    }

    fn signature(&mut self) -> PResult<FuncType> {
        let params = self.params()?;
        let results = self.results()?;
        Ok(FuncType {
            type_params: Vec::new(),
            params,
            results,
        })
    }

    fn results(&mut self) -> PResult<Option<Vec<Field>>> {
        match self.peek() {
            Some(TokenKind::LParen) => Ok(Some(self.params()?)),
            Some(kind) if kind.starts_type() => {
                Ok(Some(vec![Field::anonymous(self.parse_type()?)]))
            }
            _ => Ok(None),
        }
    }

    fn params(&mut self) -> PResult<Vec<Field>> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut entries = Vec::new();
        while !self.eat(TokenKind::RParen) {
            entries.push(self.param_entry()?);
            if !self.at(TokenKind::RParen) {
                self.expect(TokenKind::Comma, "',' or ')'")?;
            }
        }
        group_params(entries).map_err(|message| self.error(message))
    }

    fn param_entry(&mut self) -> PResult<(Option<String>, TypeRef)> {
        let name = if self.at(TokenKind::Ident) && self.param_is_named() {
            Some(self.ident()?)
        } else {
            None
        };
        let ty = if self.eat(TokenKind::Ellipsis) {
            TypeRef::Ellipsis(Box::new(self.parse_type()?))
        } else {
            self.parse_type()?
        };
        Ok((name, ty))
    }

    /// At an identifier in a parameter list: is it a name followed by its type?
    fn param_is_named(&self) -> bool {
        match self.peek_at(1) {
            Some(TokenKind::LBrack) => {
                self.bracket_follows_name(self.pos + 1, &[TokenKind::Comma, TokenKind::RParen])
            }
            Some(TokenKind::Ellipsis) => true,
            Some(kind) => kind.starts_type(),
            None => false,
        }
    }

    /// At an identifier in a struct: does it start a named field (as opposed to an embedded one)?
    fn field_is_named(&self) -> bool {
        use TokenKind::*;
        match self.peek_at(1) {
            Some(Comma) => true,
            Some(LBrack) => self.bracket_follows_name(self.pos + 1, &[Semi, RBrace, String, RawString]),
            Some(Dot | Semi | RBrace | String | RawString) | None => false,
            Some(kind) => kind.starts_type(),
        }
    }

    /// `ident [ ... ]`: true when the brackets start an array or slice type following a name,
    /// false when they hold the type arguments of a generic type. Type arguments are followed by
    /// one of `terminators`, an array length by the element type.
    fn bracket_follows_name(&self, open: usize, terminators: &[TokenKind]) -> bool {
        if self.tokens.get(open + 1).map(|t| t.kind) == Some(TokenKind::RBrack) {
            return true;
        }
        self.matching_close(open)
            .and_then(|close| self.tokens.get(close + 1))
            .is_some_and(|next| !terminators.contains(&next.kind))
    }

    fn struct_type(&mut self) -> PResult<TypeRef> {
        self.expect(TokenKind::Struct, "'struct'")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut fields = Vec::new();
        while !self.eat(TokenKind::RBrace) {
            if self.eat(TokenKind::Semi) {
                continue;
            }
            let field = if self.at(TokenKind::Ident) && self.field_is_named() {
                let names = self.ident_list()?;
                Field::new(names, self.parse_type()?)
            } else {
                Field::anonymous(self.parse_type()?)
            };
            fields.push(field);
            // Tags are not part of the stubbed API.
            if matches!(self.peek(), Some(TokenKind::String | TokenKind::RawString)) {
                self.pos += 1;
            }
            if !self.at(TokenKind::RBrace) {
                self.expect(TokenKind::Semi, "';' or '}'")?;
            }
        }
        Ok(TypeRef::Struct(fields))
    }

    fn interface_type(&mut self) -> PResult<TypeRef> {
        self.expect(TokenKind::Interface, "'interface'")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut elems = Vec::new();
        while !self.eat(TokenKind::RBrace) {
            if self.eat(TokenKind::Semi) {
                continue;
            }
            if self.at(TokenKind::Ident) && self.peek_at(1) == Some(TokenKind::LParen) {
                let name = self.ident()?;
                let signature = self.signature()?;
                elems.push(InterfaceElem::Method { name, signature });
            } else {
                elems.push(InterfaceElem::Embedded(self.type_elem()?));
            }
            if !self.at(TokenKind::RBrace) {
                self.expect(TokenKind::Semi, "';' or '}'")?;
            }
        }
        Ok(TypeRef::Interface(elems))
    }

    /// A constraint element: `~T | U | ...`.
    fn type_elem(&mut self) -> PResult<TypeRef> {
        let mut terms = vec![self.type_term()?];
        while self.eat(TokenKind::Pipe) {
            terms.push(self.type_term()?);
        }
        if terms.len() == 1 {
            Ok(terms.remove(0))
        } else {
            Ok(TypeRef::Union(terms))
        }
    }

    fn type_term(&mut self) -> PResult<TypeRef> {
        if self.eat(TokenKind::Tilde) {
            Ok(TypeRef::Tilde(Box::new(self.parse_type()?)))
        } else {
            self.parse_type()
        }
    }

    fn parse_type(&mut self) -> PResult<TypeRef> {
        let Some(kind) = self.peek() else {
            return Err(self.error("expected type"));
        };
        match kind {
            TokenKind::Ident => self.type_name(),
            TokenKind::Star => {
                self.pos += 1;
                Ok(TypeRef::pointer(self.parse_type()?))
            }
            TokenKind::LBrack => self.array_type(),
            TokenKind::LParen => {
                self.pos += 1;
                let inner = self.parse_type()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Func => {
                self.pos += 1;
                Ok(TypeRef::Func(self.signature()?))
            }
            TokenKind::Map => {
                self.pos += 1;
                self.expect(TokenKind::LBrack, "'['")?;
                let key = self.parse_type()?;
                self.expect(TokenKind::RBrack, "']'")?;
                let value = self.parse_type()?;
                Ok(TypeRef::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                })
            }
            TokenKind::Chan => {
                self.pos += 1;
                let dir = if self.eat(TokenKind::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Ok(TypeRef::Chan {
                    dir,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Arrow => {
                self.pos += 1;
                self.expect(TokenKind::Chan, "'chan'")?;
                Ok(TypeRef::Chan {
                    dir: ChanDir::Recv,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Struct => self.struct_type(),
            TokenKind::Interface => self.interface_type(),
            _ => self.unsupported_type(),
        }
    }

    fn type_name(&mut self) -> PResult<TypeRef> {
        let first = self.ident()?;
        let base = if self.eat(TokenKind::Dot) {
            TypeRef::qualified(first, self.ident()?)
        } else {
            TypeRef::Ident(first)
        };
        if !self.eat(TokenKind::LBrack) {
            return Ok(base);
        }
        let mut args = Vec::new();
        while !self.eat(TokenKind::RBrack) {
            args.push(self.parse_type()?);
            if !self.at(TokenKind::RBrack) {
                self.expect(TokenKind::Comma, "',' or ']'")?;
            }
        }
        Ok(TypeRef::Instantiated {
            base: Box::new(base),
            args,
        })
    }

    fn array_type(&mut self) -> PResult<TypeRef> {
        let open = self.pos;
        self.expect(TokenKind::LBrack, "'['")?;
        if self.eat(TokenKind::RBrack) {
            return Ok(TypeRef::slice(self.parse_type()?));
        }
        let close = self
            .matching_close(open)
            .ok_or_else(|| self.error("unbalanced '['"))?;
        let len = self.src[self.tokens[open].end..self.tokens[close].start].trim();
        let len = TypeRef::Literal(len.to_string());
        self.pos = close + 1;
        Ok(TypeRef::Array {
            len: Some(Box::new(len)),
            elem: Box::new(self.parse_type()?),
        })
    }

    /// Consume a balanced run of tokens up to the next list delimiter and keep its text.
    fn unsupported_type(&mut self) -> PResult<TypeRef> {
        let first = self.pos;
        let end = self.scan_balanced(&[TokenKind::Comma, TokenKind::Semi, TokenKind::Pipe]);
        if end == first {
            return Err(self.error("expected type"));
        }
        self.pos = end;
        Ok(TypeRef::Unsupported(self.text(first, end)))
    }

    fn expr_list(&mut self) -> PResult<Vec<Expr>> {
        let mut exprs = vec![self.expr()?];
        while self.eat(TokenKind::Comma) {
            exprs.push(self.expr()?);
        }
        Ok(exprs)
    }

    fn expr(&mut self) -> PResult<Expr> {
        let first = self.pos;
        let end = self.scan_balanced(&[TokenKind::Comma, TokenKind::Semi]);
        if end == first {
            return Err(self.error("expected expression"));
        }
        self.pos = end;
        let literal = match &self.tokens[first..end] {
            [token] => token.kind.is_literal(),
            [sign, token] => {
                matches!(sign.kind, TokenKind::Plus | TokenKind::Minus)
                    && token.kind == TokenKind::Number
            }
            _ => false,
        };
        Ok(Expr {
            text: self.text(first, end),
            literal,
        })
    }

    /// Index of the first token at bracket depth zero that is a closing bracket or one of
    /// `delimiters`, starting at the current position.
    fn scan_balanced(&self, delimiters: &[TokenKind]) -> usize {
        let mut depth = 0usize;
        let mut i = self.pos;
        while let Some(token) = self.tokens.get(i) {
            match token.kind {
                TokenKind::LParen | TokenKind::LBrack | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBrack | TokenKind::RBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                kind if depth == 0 && delimiters.contains(&kind) => break,
                _ => {}
            }
            i += 1;
        }
        i
    }

    /// Index of the bracket closing the one at token index `open`.
    fn matching_close(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (i, token) in self.tokens.iter().enumerate().skip(open) {
            match token.kind {
                TokenKind::LParen | TokenKind::LBrack | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBrack | TokenKind::RBrace => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Source text covering tokens `first..end`.
    fn text(&self, first: usize, end: usize) -> String {
        self.src[self.tokens[first].start..self.tokens[end - 1].end].to_string()
    }

    fn ident_list(&mut self) -> PResult<Vec<String>> {
        let mut names = vec![self.ident()?];
        while self.eat(TokenKind::Comma) {
            names.push(self.ident()?);
        }
        Ok(names)
    }

    fn ident(&mut self) -> PResult<String> {
        Ok(self.expect(TokenKind::Ident, "identifier")?.text.to_string())
    }

    fn end_of_decl(&mut self) -> PResult<()> {
        if self.peek().is_none() || self.eat(TokenKind::Semi) {
            Ok(())
        } else {
            Err(self.error("expected ';' after declaration"))
        }
    }

    fn peek(&self) -> Option<TokenKind> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        let hit = self.at(kind);
        if hit {
            self.pos += 1;
        }
        hit
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token<'src>> {
        match self.tokens.get(self.pos) {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                Ok(*token)
            }
            _ => Err(self.error(format!("expected {what}"))),
        }
    }

    /// Start of the current token; at end of input, the end of the last token.
    fn offset(&self) -> usize {
        match self.tokens.get(self.pos) {
            Some(token) => token.start,
            None => self.tokens.last().map_or(0, |t| t.end),
        }
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        let found = match self.tokens.get(self.pos) {
            Some(token) if token.text.is_empty() => "newline".to_string(),
            Some(token) => format!("{:?}", token.text),
            None => "end of file".to_string(),
        };
        SyntaxError::at(
            self.src,
            self.offset(),
            format!("{}, found {found}", message.into()),
        )
    }
}

/// Resolve Go's parameter grouping: either every entry is a type, or every entry is named and
/// bare identifiers share the type of the next named entry (`a, b int`).
fn group_params(entries: Vec<(Option<String>, TypeRef)>) -> Result<Vec<Field>, &'static str> {
    if entries.iter().all(|(name, _)| name.is_none()) {
        return Ok(entries
            .into_iter()
            .map(|(_, ty)| Field::anonymous(ty))
            .collect());
    }
    let mut fields = Vec::new();
    let mut pending = Vec::new();
    for entry in entries {
        match entry {
            (Some(name), ty) => {
                pending.push(name);
                fields.push(Field::new(std::mem::take(&mut pending), ty));
            }
            (None, TypeRef::Ident(name)) => pending.push(name),
            (None, _) => return Err("mixed named and unnamed parameters"),
        }
    }
    if !pending.is_empty() {
        return Err("mixed named and unnamed parameters");
    }
    Ok(fields)
}

fn unquote(literal: &str) -> &str {
    literal
        .get(1..literal.len().saturating_sub(1))
        .unwrap_or(literal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ident(name: &str) -> TypeRef {
        TypeRef::ident(name)
    }

    fn named(names: &[&str], ty: TypeRef) -> Field {
        Field::new(names.iter().map(|n| n.to_string()).collect(), ty)
    }

    fn func(src: &str) -> FuncDecl {
        let file = parse_file(&format!("package p\n{src}\n")).unwrap();
        match file.decls.into_iter().next() {
            Some(Decl::Func(decl)) => decl,
            other => panic!("expected func, got {other:?}"),
        }
    }

    fn type_spec(src: &str) -> TypeSpec {
        let file = parse_file(&format!("package p\n{src}\n")).unwrap();
        match file.decls.into_iter().next() {
            Some(Decl::Type(mut specs)) => specs.remove(0),
            other => panic!("expected type, got {other:?}"),
        }
    }

    #[test]
    fn test_imports() {
        let file = parse_file(
            r#"package types

import "fmt"
import (
	"io"
	corev1 "k8s.io/api/core/v1"
	. "strings"
	_ `embed`
)
"#,
        )
        .unwrap();
        assert_eq!(file.package, "types");
        let imports: Vec<_> = file
            .imports
            .iter()
            .map(|i| (i.alias.as_deref(), i.path.as_str()))
            .collect();
        assert_eq!(
            imports,
            vec![
                (None, "fmt"),
                (None, "io"),
                (Some("corev1"), "k8s.io/api/core/v1"),
                (Some("."), "strings"),
                (Some("_"), "embed"),
            ]
        );
        assert!(file.decls.is_empty());
        assert!(!file.generated);
    }

    #[test]
    fn test_generated_marker() {
        let file =
            parse_file("// Code generated by mockery v2.20.0. DO NOT EDIT.\n\npackage mocks\n")
                .unwrap();
        assert!(file.generated);
        let file = parse_file("package mocks\n\n// Code generated by hand. DO NOT EDIT.\n")
            .unwrap();
        assert!(!file.generated);
    }

    #[test]
    fn test_value_specs() {
        let file = parse_file(
            r#"package main
var (
	var1 = "somevalue"
	Var2 = "someOtherValue"
)
const Const1, const2 = 0, 1
var x, y int
const (
	A Kind = iota
	B
)
var f = func() int { return 1 }()
const neg = -1
"#,
        )
        .unwrap();
        let specs: Vec<_> = file
            .decls
            .iter()
            .flat_map(|decl| match decl {
                Decl::Const(specs) | Decl::Var(specs) => specs.clone(),
                _ => Vec::new(),
            })
            .collect();
        assert_eq!(specs.len(), 8);
        assert_eq!(specs[0].values[0].text, r#""somevalue""#);
        assert!(specs[0].values[0].literal);
        assert_eq!(specs[2].names, vec!["Const1", "const2"]);
        assert_eq!(specs[2].values.len(), 2);
        assert_eq!(specs[3].ty, Some(ident("int")));
        assert!(specs[3].values.is_empty());
        assert_eq!(specs[4].ty, Some(ident("Kind")));
        assert!(!specs[4].values[0].literal);
        assert_eq!(specs[5].names, vec!["B"]);
        assert_eq!(specs[5].ty, None);
        assert_eq!(specs[6].values[0].text, "func() int { return 1 }()");
        assert!(!specs[6].values[0].literal);
        assert_eq!(specs[7].values[0].text, "-1");
        assert!(specs[7].values[0].literal);
    }

    #[test]
    fn test_struct_fields() {
        let spec = type_spec(
            r#"type MyStruct struct {
	MyEmbeddedStruct
	corev1.PodSpec
	*Base
	List[int]
	Name, Alias string `json:"name"`
	Buf [16]byte
	Items []Item
	Pod      corev1.Pod
}"#,
        );
        let TypeRef::Struct(fields) = spec.ty else {
            panic!("expected struct");
        };
        assert_eq!(
            fields,
            vec![
                Field::anonymous(ident("MyEmbeddedStruct")),
                Field::anonymous(TypeRef::qualified("corev1", "PodSpec")),
                Field::anonymous(TypeRef::pointer(ident("Base"))),
                Field::anonymous(TypeRef::Instantiated {
                    base: Box::new(ident("List")),
                    args: vec![ident("int")],
                }),
                named(&["Name", "Alias"], ident("string")),
                named(
                    &["Buf"],
                    TypeRef::Array {
                        len: Some(Box::new(TypeRef::Literal("16".into()))),
                        elem: Box::new(ident("byte")),
                    }
                ),
                named(&["Items"], TypeRef::slice(ident("Item"))),
                named(&["Pod"], TypeRef::qualified("corev1", "Pod")),
            ]
        );
    }

    #[test]
    fn test_interface_elements() {
        let spec = type_spec(
            "type RW interface {\n\tio.Reader\n\tWrite(p []byte) (n int, err error)\n\t~int | string\n}",
        );
        let TypeRef::Interface(elems) = spec.ty else {
            panic!("expected interface");
        };
        assert_eq!(elems.len(), 3);
        assert_eq!(
            elems[0],
            InterfaceElem::Embedded(TypeRef::qualified("io", "Reader"))
        );
        assert_eq!(
            elems[1],
            InterfaceElem::Method {
                name: "Write".into(),
                signature: FuncType {
                    type_params: Vec::new(),
                    params: vec![named(&["p"], TypeRef::slice(ident("byte")))],
                    results: Some(vec![named(&["n"], ident("int")), named(&["err"], ident("error"))]),
                },
            }
        );
        assert_eq!(
            elems[2],
            InterfaceElem::Embedded(TypeRef::Union(vec![
                TypeRef::Tilde(Box::new(ident("int"))),
                ident("string"),
            ]))
        );
    }

    #[test]
    fn test_type_params_vs_array_length() {
        let generic = type_spec("type List[T any] struct{ items []T }");
        assert_eq!(generic.type_params, vec![named(&["T"], ident("any"))]);

        let pair = type_spec("type Pair[K comparable, V any] struct{}");
        assert_eq!(pair.type_params.len(), 2);

        let grouped = type_spec("type Pair[K, V any] struct{}");
        assert_eq!(grouped.type_params, vec![named(&["K", "V"], ident("any"))]);

        let array = type_spec("type Block [N]byte");
        assert!(array.type_params.is_empty());
        assert_eq!(
            array.ty,
            TypeRef::Array {
                len: Some(Box::new(TypeRef::Literal("N".into()))),
                elem: Box::new(ident("byte")),
            }
        );

        let alias = type_spec("type Reader = io.Reader");
        assert!(alias.alias);
    }

    #[test]
    fn test_function_signature() {
        let decl = func("func Bar[T1 any, T2 int](t1 []T1, t2 T2) T2 {\n\treturn t2\n}");
        assert_eq!(decl.name, "Bar");
        assert!(decl.recv.is_none());
        assert_eq!(
            decl.signature.type_params,
            vec![named(&["T1"], ident("any")), named(&["T2"], ident("int"))]
        );
        assert_eq!(
            decl.signature.params,
            vec![
                named(&["t1"], TypeRef::slice(ident("T1"))),
                named(&["t2"], ident("T2"))
            ]
        );
        assert_eq!(
            decl.signature.results,
            Some(vec![Field::anonymous(ident("T2"))])
        );
        assert_eq!(decl.body.as_deref(), Some("\n\treturn t2\n"));
    }

    #[test]
    fn test_parameter_grouping() {
        let decl = func("func F(a, b int, opts ...Option) (int, error) {}");
        assert_eq!(
            decl.signature.params,
            vec![
                named(&["a", "b"], ident("int")),
                named(&["opts"], TypeRef::Ellipsis(Box::new(ident("Option")))),
            ]
        );
        assert_eq!(
            decl.signature.results,
            Some(vec![
                Field::anonymous(ident("int")),
                Field::anonymous(ident("error"))
            ])
        );

        let unnamed = func("func G(int, string, pkg.T, List[int]) {}");
        assert_eq!(
            unnamed.signature.params,
            vec![
                Field::anonymous(ident("int")),
                Field::anonymous(ident("string")),
                Field::anonymous(TypeRef::qualified("pkg", "T")),
                Field::anonymous(TypeRef::Instantiated {
                    base: Box::new(ident("List")),
                    args: vec![ident("int")],
                }),
            ]
        );

        let arrays = func("func H(buf [4]byte, rest []byte) {}");
        assert_eq!(arrays.signature.params.len(), 2);
        assert_eq!(arrays.signature.params[0].names, vec!["buf"]);
    }

    #[test]
    fn test_method_receivers() {
        let decl = func("func (s *MyStruct) GetPodName(pod *corev1.Pod) string {\n\treturn pod.Name\n}");
        assert_eq!(
            decl.recv,
            Some(vec![named(&["s"], TypeRef::pointer(ident("MyStruct")))])
        );

        let generic = func("func (l *List[T]) Len() int { return len(l.items) }");
        let recv = generic.recv.unwrap();
        assert_eq!(recv[0].ty.receiver_base_name(), Some("List"));

        let unnamed = func("func (MyStruct) Kind() string { return \"\" }");
        assert_eq!(unnamed.recv, Some(vec![Field::anonymous(ident("MyStruct"))]));
    }

    #[test]
    fn test_function_types_and_channels() {
        let decl = func(
            "func Run(cb func(int) error, done <-chan struct{}, out chan<- string, m map[string][]int) {}",
        );
        let types: Vec<_> = decl.signature.params.into_iter().map(|f| f.ty).collect();
        assert_eq!(
            types[0],
            TypeRef::Func(FuncType {
                type_params: Vec::new(),
                params: vec![Field::anonymous(ident("int"))],
                results: Some(vec![Field::anonymous(ident("error"))]),
            })
        );
        assert_eq!(
            types[1],
            TypeRef::Chan {
                dir: ChanDir::Recv,
                elem: Box::new(TypeRef::Struct(Vec::new())),
            }
        );
        assert_eq!(
            types[2],
            TypeRef::Chan {
                dir: ChanDir::Send,
                elem: Box::new(ident("string")),
            }
        );
        assert!(matches!(types[3], TypeRef::Map { .. }));
    }

    #[test]
    fn test_body_with_nested_braces() {
        let file = parse_file(
            "package p\nfunc F() {\n\tif x {\n\t\ty := map[string]int{\"a\": 1}\n\t}\n}\nfunc G() {}\n",
        )
        .unwrap();
        assert_eq!(file.decls.len(), 2);
    }

    #[test]
    fn test_syntax_error_position() {
        let err = parse_file("package p\n\nfunc (\n").unwrap_err();
        assert_eq!((err.line, err.column), (3, 7));
        assert!(err.message.ends_with("found end of file"), "{}", err.message);
        let err = parse_file("func main() {}").unwrap_err();
        assert_eq!((err.line, err.column), (1, 1));
        assert!(err.message.starts_with("expected package clause"));
    }
}
