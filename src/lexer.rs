use logos::Logos;
use std::fmt;
use std::iter::Peekable;
use std::vec::IntoIter;
use thiserror::Error;

use crate::source::Span;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")] // Skip whitespace
#[logos(skip r";[^\n\r]*")] // Skip comments
#[logos(error = LexerErrorKind)]
pub enum TokenKind {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LSquare,
    #[token("]")]
    RSquare,
    #[token("{")]
    LCurly,
    #[token("}")]
    RCurly,
    #[token(".")]
    Dot,
    #[token("'")]
    Quote,
    #[token("`")]
    Backtick,
    #[token("~")]
    Tilde,
    #[token("~@")]
    TildeAt,
    #[regex(r"[a-zA-Z!$%&*/:<=>?^_+\-][a-zA-Z0-9!$%&*/:<=>?^_+\-.#]*", |lex| lex.slice().to_string())]
    Symbol(String),
    #[token("true", |lex| lex.slice().to_string())]
    #[token("false", |lex| lex.slice().to_string())]
    Bool(String),
    #[regex(r"-?[0-9]+", |lex| lex.slice().to_string(), priority = 10)]
    Decimal(String),
    #[regex(r"-?0x[0-9a-fA-F]+", |lex| strip_radix_prefix(lex.slice(), "0x"), priority = 12)]
    Hex(String),
    // Digits outside 0-7 are kept so the reader can reject them.
    #[regex(r"-?0[0-9]+", |lex| strip_radix_prefix(lex.slice(), "0"), priority = 11)]
    Oct(String),
    #[regex(r"-?0b[01]+", |lex| strip_radix_prefix(lex.slice(), "0b"), priority = 12)]
    Binary(String),
    #[regex(r"#\\(newline|space|tab|return|.)", decode_char)]
    Char(char),
    #[regex(r#""([^"\\]|\\.)*.?"#, |lex| {
        let slice = lex.slice();
        let len = slice.len();
        // make sure string was terminated
        if len == 1 || &slice[len-1..] != "\"" {
            return Err(LexerErrorKind::UnterminatedString);
        }
        unescape::unescape(&slice[1..len - 1])
    })]
    Str(String),
    #[regex(r"-?([0-9]+\.[0-9]*|\.[0-9]+)([eE][-+]?[0-9]+)?", |lex| lex.slice().to_string(), priority = 10)]
    #[regex(r"-?[0-9]+[eE][-+]?[0-9]+", |lex| lex.slice().to_string(), priority = 10)]
    Float(String),
    /// Never produced by logos; token sources yield it once input runs out.
    End,
}

fn strip_radix_prefix(slice: &str, prefix: &str) -> String {
    match slice.strip_prefix('-') {
        Some(rest) => format!("-{}", &rest[prefix.len()..]),
        None => slice[prefix.len()..].to_string(),
    }
}

fn decode_char(lex: &mut logos::Lexer<TokenKind>) -> Option<char> {
    let name = &lex.slice()[2..];
    match name {
        "newline" => Some('\n'),
        "space" => Some(' '),
        "tab" => Some('\t'),
        "return" => Some('\r'),
        _ => name.chars().next(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }

    pub fn end(offset: usize) -> Self {
        Token::new(TokenKind::End, Span::point(offset))
    }
}

mod unescape {
    use super::LexerErrorKind;

    pub fn unescape(s: &str) -> Result<String, LexerErrorKind> {
        // un-escaping should only ever reduce the length of the string.
        let mut result = String::with_capacity(s.len());
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some('n') => result.push('\n'),
                    Some('r') => result.push('\r'),
                    Some('t') => result.push('\t'),
                    Some('\\') => result.push('\\'),
                    Some('"') => result.push('"'),
                    Some(c) => return Err(LexerErrorKind::UnknownEscapeSequence(c)),
                    None => return Err(LexerErrorKind::UnterminatedString),
                }
            } else {
                result.push(c);
            }
        }
        Ok(result)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LSquare => write!(f, "["),
            TokenKind::RSquare => write!(f, "]"),
            TokenKind::LCurly => write!(f, "{{"),
            TokenKind::RCurly => write!(f, "}}"),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Quote => write!(f, "'"),
            TokenKind::Backtick => write!(f, "`"),
            TokenKind::Tilde => write!(f, "~"),
            TokenKind::TildeAt => write!(f, "~@"),
            TokenKind::Symbol(s) | TokenKind::Bool(s) | TokenKind::Decimal(s) => write!(f, "{}", s),
            TokenKind::Hex(s) => write!(f, "hex {}", s),
            TokenKind::Oct(s) => write!(f, "octal {}", s),
            TokenKind::Binary(s) => write!(f, "binary {}", s),
            TokenKind::Char(c) => write!(f, "#\\{}", c.escape_debug()),
            TokenKind::Str(s) => write!(f, "\"{}\"", s.escape_debug()),
            TokenKind::Float(s) => write!(f, "{}", s),
            TokenKind::End => write!(f, "end of input"),
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Error)]
pub enum LexerErrorKind {
    #[error("Unterminated string literal")]
    UnterminatedString,
    #[error("Unknown escape sequence: '\\{0}'")]
    UnknownEscapeSequence(char),
    #[default]
    #[error("Invalid Token")]
    InvalidToken,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error}")]
pub struct LexerError {
    pub error: LexerErrorKind,
    pub span: Span,
}

/// A pull-based supply of tokens with one token of lookahead.
///
/// Once the input is exhausted every call yields a [`TokenKind::End`] token.
pub trait TokenSource {
    /// Returns the next token without consuming it. Repeated calls return the
    /// same token until [`TokenSource::next_token`] is called.
    fn peek_token(&mut self) -> Result<&Token, LexerError>;

    /// Consumes and returns the next token.
    fn next_token(&mut self) -> Result<Token, LexerError>;
}

/// Lexes source text on demand.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    peeked: Option<Result<Token, LexerError>>,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src str) -> Self {
        Lexer {
            inner: TokenKind::lexer(input),
            peeked: None,
        }
    }

    fn advance(&mut self) -> Result<Token, LexerError> {
        match self.inner.next() {
            Some(result) => {
                let span = Span::from(self.inner.span());
                result
                    .map(|kind| Token::new(kind, span))
                    .map_err(|error| LexerError { error, span })
            }
            None => Ok(Token::end(self.inner.source().len())),
        }
    }
}

impl TokenSource for Lexer<'_> {
    fn peek_token(&mut self) -> Result<&Token, LexerError> {
        let peeked = match self.peeked.take() {
            Some(peeked) => peeked,
            None => self.advance(),
        };
        self.peeked.insert(peeked).as_ref().map_err(Clone::clone)
    }

    fn next_token(&mut self) -> Result<Token, LexerError> {
        self.peeked.take().unwrap_or_else(|| self.advance())
    }
}

/// Replays an already tokenized input.
pub struct TokenStream {
    tokens: Peekable<IntoIter<Token>>,
    end: Token,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        let end = Token::end(tokens.last().map_or(0, |token| token.span.end));
        TokenStream {
            tokens: tokens.into_iter().peekable(),
            end,
        }
    }
}

impl TokenSource for TokenStream {
    fn peek_token(&mut self) -> Result<&Token, LexerError> {
        Ok(self.tokens.peek().unwrap_or(&self.end))
    }

    fn next_token(&mut self) -> Result<Token, LexerError> {
        Ok(self.tokens.next().unwrap_or_else(|| self.end.clone()))
    }
}

// Helper function to tokenize a string directly (useful for tests and the REPL)
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexerError> {
    TokenKind::lexer(input)
        .spanned()
        .map(|(result, range)| {
            let span = Span::from(range);
            match result {
                Ok(kind) => Ok(Token::new(kind, span)),
                Err(error) => Err(LexerError { error, span }),
            }
        })
        .collect()
}
