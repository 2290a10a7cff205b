//! Lexer: source bytes → token stream.
//!
//! Fail-fast: the first lexical error aborts scanning, since the parser
//! cannot do anything useful with a truncated token stream.

use std::fmt;

use crate::error::{Diagnostic, ErrorCode, SourceSpan};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords
    Scene,
    LibraryImports,
    Entity,
    Components,
    Constraint,
    Motion,
    Timeline,
    Event,
    Kind,

    // Literals
    Identifier(String),
    Integer(i64),
    Number(f64),
    Str(String),

    // Punctuation
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    Colon,        // :
    Comma,        // ,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Scene => write!(f, "'scene'"),
            TokenKind::LibraryImports => write!(f, "'library_imports'"),
            TokenKind::Entity => write!(f, "'entity'"),
            TokenKind::Components => write!(f, "'components'"),
            TokenKind::Constraint => write!(f, "'constraint'"),
            TokenKind::Motion => write!(f, "'motion'"),
            TokenKind::Timeline => write!(f, "'timeline'"),
            TokenKind::Event => write!(f, "'event'"),
            TokenKind::Kind => write!(f, "'kind'"),
            TokenKind::Identifier(name) => write!(f, "identifier '{name}'"),
            TokenKind::Integer(v) => write!(f, "integer {v}"),
            TokenKind::Number(v) => write!(f, "number {v}"),
            TokenKind::Str(s) => write!(f, "string \"{s}\""),
            TokenKind::LeftBrace => write!(f, "'{{'"),
            TokenKind::RightBrace => write!(f, "'}}'"),
            TokenKind::LeftBracket => write!(f, "'['"),
            TokenKind::RightBracket => write!(f, "']'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: SourceSpan,
}

/// Tokenize SDL source. Returns the full token stream (terminated by
/// `Eof`) or the first lexical error.
pub fn lex(source: &str, file: &str) -> Result<Vec<Token>, Diagnostic> {
    Lexer::new(source, file).tokenize()
}

struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    file: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str, file: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            file,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, Diagnostic> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();
            if self.pos >= self.bytes.len() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    span: SourceSpan::point(self.pos, self.line, self.column),
                });
                return Ok(tokens);
            }

            let start = self.mark();
            let ch = self.bytes[self.pos];

            let kind = match ch {
                b'{' => self.single(TokenKind::LeftBrace),
                b'}' => self.single(TokenKind::RightBrace),
                b'[' => self.single(TokenKind::LeftBracket),
                b']' => self.single(TokenKind::RightBracket),
                b':' => self.single(TokenKind::Colon),
                b',' => self.single(TokenKind::Comma),
                b'"' => self.lex_string(start)?,
                b'0'..=b'9' => self.lex_number(start),
                b'-' if self.peek_next().is_some_and(|b| b.is_ascii_digit()) => {
                    self.lex_number(start)
                }
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.lex_identifier(start)?,
                _ => {
                    let ch = self.source[self.pos..].chars().next().unwrap_or('\u{FFFD}');
                    return Err(Diagnostic::new(
                        ErrorCode::UnexpectedCharacter,
                        format!("Unexpected character '{ch}'"),
                        SourceSpan::new(self.pos, ch.len_utf8(), self.line, self.column),
                        self.file,
                    ));
                }
            };

            tokens.push(Token {
                kind,
                span: self.span_from(start),
            });
        }
    }

    // ── Scanners ─────────────────────────────────────────────────

    fn lex_identifier(&mut self, start: Mark) -> Result<TokenKind, Diagnostic> {
        while self.pos < self.bytes.len()
            && (self.bytes[self.pos].is_ascii_alphanumeric() || self.bytes[self.pos] == b'_')
        {
            self.advance();
        }
        let word = &self.source[start.pos..self.pos];

        // NaN cannot be written as a number literal, and letting it through
        // as an identifier would smuggle it into numeric positions.
        if word == "nan" {
            return Err(Diagnostic::new(
                ErrorCode::UnexpectedCharacter,
                "'nan' is not a valid number literal",
                self.span_from(start),
                self.file,
            )
            .with_help("only finite decimal literals are accepted"));
        }

        Ok(match word {
            "scene" => TokenKind::Scene,
            "library_imports" => TokenKind::LibraryImports,
            "entity" => TokenKind::Entity,
            "components" => TokenKind::Components,
            "constraint" => TokenKind::Constraint,
            "motion" => TokenKind::Motion,
            "timeline" => TokenKind::Timeline,
            "event" => TokenKind::Event,
            "kind" => TokenKind::Kind,
            _ => TokenKind::Identifier(word.to_string()),
        })
    }

    /// Grammar: `-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?`. An integer token
    /// is produced when there is no fractional or exponent part.
    fn lex_number(&mut self, start: Mark) -> TokenKind {
        if self.bytes[self.pos] == b'-' {
            self.advance();
        }
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
            self.advance();
        }

        let mut is_float = false;

        // Fractional part: the dot is only consumed when a digit follows.
        if self.bytes.get(self.pos) == Some(&b'.')
            && self.peek_next().is_some_and(|b| b.is_ascii_digit())
        {
            is_float = true;
            self.advance();
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
                self.advance();
            }
        }

        // Exponent part.
        if matches!(self.bytes.get(self.pos), Some(b'e') | Some(b'E')) {
            let mut lookahead = self.pos + 1;
            if matches!(self.bytes.get(lookahead), Some(b'+') | Some(b'-')) {
                lookahead += 1;
            }
            if self.bytes.get(lookahead).is_some_and(|b| b.is_ascii_digit()) {
                is_float = true;
                while self.pos < lookahead {
                    self.advance();
                }
                while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
                    self.advance();
                }
            }
        }

        let text = &self.source[start.pos..self.pos];
        if !is_float {
            if let Ok(v) = text.parse::<i64>() {
                return TokenKind::Integer(v);
            }
        }
        // Grammar-valid digit strings always parse as f64 (possibly ±inf on
        // overflow, which the validators reject as non-finite).
        TokenKind::Number(text.parse::<f64>().unwrap_or(f64::INFINITY))
    }

    fn lex_string(&mut self, start: Mark) -> Result<TokenKind, Diagnostic> {
        self.advance(); // opening quote
        let content_start = self.pos;

        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'"' {
            self.advance();
        }

        if self.pos >= self.bytes.len() {
            return Err(Diagnostic::new(
                ErrorCode::UnterminatedString,
                "Unterminated string literal",
                self.span_from(start),
                self.file,
            )
            .with_help("add a closing '\"'"));
        }

        let content = self.source[content_start..self.pos].to_string();
        self.advance(); // closing quote
        Ok(TokenKind::Str(content))
    }

    fn skip_whitespace_and_comments(&mut self) {
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b' ' | b'\t' | b'\r' | b'\n' => self.advance(),
                b'/' if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                    while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    // ── Cursor helpers ───────────────────────────────────────────

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn advance(&mut self) {
        if self.bytes[self.pos] == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.pos += 1;
    }

    fn peek_next(&self) -> Option<u8> {
        self.bytes.get(self.pos + 1).copied()
    }

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn span_from(&self, start: Mark) -> SourceSpan {
        SourceSpan::new(start.pos, self.pos - start.pos, start.line, start.column)
    }
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: usize,
    line: usize,
    column: usize,
}
