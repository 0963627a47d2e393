//! Go tokenizer with automatic semicolon insertion.
//!
//! Comments and whitespace are dropped. A newline (or a block comment spanning one) after a
//! token that can end a statement produces a [`TokenKind::Semi`] with empty text, following the
//! Go language rules. The parser never has to look at line structure.

use logos::{Lexer as LogosLexer, Logos};

use crate::parser::SyntaxError;

/// Token classes. Operators the parser never inspects share [`TokenKind::Operator`].
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\f\r\u{FEFF}]+")]
#[rustfmt::skip]
pub enum TokenKind {
    #[token("\n")] Newline,
    #[token("//", line_comment)] LineComment,
    #[token("/*", block_comment)] BlockComment,

    #[token("break")] Break,
    #[token("case")] Case,
    #[token("chan")] Chan,
    #[token("const")] Const,
    #[token("continue")] Continue,
    #[token("default")] Default,
    #[token("defer")] Defer,
    #[token("else")] Else,
    #[token("fallthrough")] Fallthrough,
    #[token("for")] For,
    #[token("func")] Func,
    #[token("go")] Go,
    #[token("goto")] Goto,
    #[token("if")] If,
    #[token("import")] Import,
    #[token("interface")] Interface,
    #[token("map")] Map,
    #[token("package")] Package,
    #[token("range")] Range,
    #[token("return")] Return,
    #[token("select")] Select,
    #[token("struct")] Struct,
    #[token("switch")] Switch,
    #[token("type")] Type,
    #[token("var")] Var,

    #[regex(r"[_\p{L}][_\p{L}\p{Nd}]*")] Ident,
    #[regex(r"[0-9]", number)]
    #[regex(r"\.[0-9]", number)]
    Number,
    #[token("\"", interpreted_string)] String,
    #[token("`", raw_string)] RawString,
    #[token("'", rune)] Rune,

    #[token("...")] Ellipsis,
    #[token(".")] Dot,
    #[token(",")] Comma,
    #[token(";")] Semi,
    #[token(":")] Colon,
    #[token("(")] LParen,
    #[token(")")] RParen,
    #[token("[")] LBrack,
    #[token("]")] RBrack,
    #[token("{")] LBrace,
    #[token("}")] RBrace,
    #[token("*")] Star,
    #[token("<-")] Arrow,
    #[token("=")] Assign,
    #[token("|")] Pipe,
    #[token("~")] Tilde,
    #[token("+")] Plus,
    #[token("-")] Minus,
    #[token("++")] Inc,
    #[token("--")] Dec,

    #[token("/")] #[token("%")] #[token("&")] #[token("^")] #[token("<<")] #[token(">>")]
    #[token("&^")] #[token("+=")] #[token("-=")] #[token("*=")] #[token("/=")] #[token("%=")]
    #[token("&=")] #[token("|=")] #[token("^=")] #[token("<<=")] #[token(">>=")] #[token("&^=")]
    #[token("&&")] #[token("||")] #[token("==")] #[token("!=")] #[token("<")] #[token("<=")]
    #[token(">")] #[token(">=")] #[token(":=")] #[token("!")]
    Operator,
}

impl TokenKind {
    /// Whether a newline directly after this token terminates the statement.
    pub fn inserts_semicolon(self) -> bool {
        matches!(
            self,
            Self::Ident
                | Self::Number
                | Self::String
                | Self::RawString
                | Self::Rune
                | Self::Break
                | Self::Continue
                | Self::Fallthrough
                | Self::Return
                | Self::Inc
                | Self::Dec
                | Self::RParen
                | Self::RBrack
                | Self::RBrace
        )
    }

    /// Whether this token can begin a type expression.
    pub fn starts_type(self) -> bool {
        matches!(
            self,
            Self::Ident
                | Self::Star
                | Self::LBrack
                | Self::LParen
                | Self::Func
                | Self::Map
                | Self::Chan
                | Self::Struct
                | Self::Interface
                | Self::Arrow
        )
    }

    /// Literal tokens whose text is preserved verbatim in constant initializers.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::Number | Self::String | Self::RawString | Self::Rune
        )
    }
}

/// A single token borrowed from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    /// Token class.
    pub kind: TokenKind,
    /// Exact source text; empty for inserted semicolons.
    pub text: &'src str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

/// Tokenize `src`, dropping comments and inserting semicolons.
pub fn tokenize(src: &str) -> Result<Vec<Token<'_>>, SyntaxError> {
    let mut lexer = TokenKind::lexer(src);
    let mut tokens = Vec::new();
    let mut pending_semi = false;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let kind = result.map_err(|()| {
            SyntaxError::at(src, span.start, format!("unexpected {:?}", lexer.slice()))
        })?;

        let ends_line = match kind {
            TokenKind::Newline => true,
            TokenKind::BlockComment => lexer.slice().contains('\n'),
            TokenKind::LineComment => false,
            _ => {
                tokens.push(Token {
                    kind,
                    text: lexer.slice(),
                    start: span.start,
                    end: span.end,
                });
                pending_semi = kind.inserts_semicolon();
                continue;
            }
        };

        if ends_line && pending_semi {
            tokens.push(inserted_semi(span.start));
            pending_semi = false;
        }
    }

    if pending_semi {
        tokens.push(inserted_semi(src.len()));
    }

    Ok(tokens)
}

fn inserted_semi<'src>(at: usize) -> Token<'src> {
    Token {
        kind: TokenKind::Semi,
        text: "",
        start: at,
        end: at,
    }
}

fn line_comment(lex: &mut LogosLexer<'_, TokenKind>) -> bool {
    let rem = lex.remainder();
    lex.bump(rem.find('\n').unwrap_or(rem.len()));
    true
}

fn block_comment(lex: &mut LogosLexer<'_, TokenKind>) -> bool {
    let rem = lex.remainder();
    match rem.find("*/") {
        Some(pos) => {
            lex.bump(pos + 2);
            true
        }
        None => {
            lex.bump(rem.len());
            false
        }
    }
}

fn raw_string(lex: &mut LogosLexer<'_, TokenKind>) -> bool {
    match lex.remainder().find('`') {
        Some(pos) => {
            lex.bump(pos + 1);
            true
        }
        None => false,
    }
}

/// Scan to the closing `quote`, honouring backslash escapes. Newlines are not allowed.
fn quoted(lex: &mut LogosLexer<'_, TokenKind>, quote: u8) -> bool {
    let bytes = lex.remainder().as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return false,
            b if b == quote => {
                lex.bump(i + 1);
                return true;
            }
            _ => i += 1,
        }
    }
    false
}

fn interpreted_string(lex: &mut LogosLexer<'_, TokenKind>) -> bool {
    quoted(lex, b'"')
}

fn rune(lex: &mut LogosLexer<'_, TokenKind>) -> bool {
    quoted(lex, b'\'')
}

/// Munch the rest of a numeric literal. Signs are only part of the literal directly after an
/// exponent marker (`e` for decimal, `p` for hexadecimal mantissas).
fn number(lex: &mut LogosLexer<'_, TokenKind>) -> bool {
    let rem = lex.remainder().as_bytes();
    let hex = lex.slice() == "0" && matches!(rem.first(), Some(b'x' | b'X'));
    let mut prev = lex.slice().as_bytes().last().copied().unwrap_or(b'0');
    let mut i = 0;
    while let Some(&b) = rem.get(i) {
        let exponent_sign = matches!(b, b'+' | b'-')
            && if hex {
                matches!(prev, b'p' | b'P')
            } else {
                matches!(prev, b'e' | b'E')
            };
        if !(b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || exponent_sign) {
            break;
        }
        prev = b;
        i += 1;
    }
    lex.bump(i);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn texts(src: &str) -> Vec<&str> {
        tokenize(src).unwrap().into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_semicolon_insertion() {
        use TokenKind::*;
        assert_eq!(
            kinds("package main\nfunc f() {\n\treturn\n}\n"),
            vec![
                Package, Ident, Semi, Func, Ident, LParen, RParen, LBrace, Return, Semi, RBrace,
                Semi
            ]
        );
    }

    #[test]
    fn test_no_semicolon_after_operator() {
        use TokenKind::*;
        assert_eq!(
            kinds("x = 1 +\n2\n"),
            vec![Ident, Assign, Number, Plus, Number, Semi]
        );
    }

    #[test]
    fn test_comments() {
        use TokenKind::*;
        assert_eq!(kinds("a // trailing\nb"), vec![Ident, Semi, Ident, Semi]);
        assert_eq!(kinds("a /* one line */ b"), vec![Ident, Ident, Semi]);
        assert_eq!(kinds("a /* two\nlines */ b"), vec![Ident, Semi, Ident, Semi]);
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            texts(r#"x "a\"b" `raw
text` 'c' '\n' 0x1p-2 1e+10 .5 3.14i 1_000"#),
            vec![
                "x",
                r#""a\"b""#,
                "`raw\ntext`",
                "'c'",
                r"'\n'",
                "0x1p-2",
                "1e+10",
                ".5",
                "3.14i",
                "1_000",
                ""
            ]
        );
    }

    #[test]
    fn test_number_does_not_eat_binary_minus() {
        assert_eq!(texts("10-2"), vec!["10", "-", "2", ""]);
    }

    #[test]
    fn test_ellipsis_and_arrow() {
        use TokenKind::*;
        assert_eq!(
            kinds("...T <-chan chan<- x"),
            vec![Ellipsis, Ident, Arrow, Chan, Chan, Arrow, Ident, Semi]
        );
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let err = tokenize("x := \"abc\ny").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_unicode_identifier() {
        assert_eq!(texts("Größe"), vec!["Größe", ""]);
    }
}
