use crate::environment::Interner;
use crate::lexer::{Lexer, LexerError, Token, TokenKind, TokenSource};
use crate::list::make_list;
use crate::source::Span;
use crate::types::Sexp;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Failure of the token source itself, passed through unchanged.
    #[error(transparent)]
    Source(#[from] LexerError),
    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str, span: Span },
    #[error("{message}: `{}` at {}", .found.kind, .found.span)]
    Syntax { found: Token, message: &'static str },
    #[error("Cannot convert `{text}` to a number")]
    NumericConversion {
        text: String,
        span: Span,
        #[source]
        cause: NumberError,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumberError {
    #[error("invalid base-{radix} integer: {source}")]
    Int { radix: u32, source: ParseIntError },
    #[error("invalid float: {0}")]
    Float(#[from] ParseFloatError),
}

impl ParseError {
    /// Where in the input the error was detected.
    pub fn span(&self) -> Span {
        match self {
            ParseError::Source(err) => err.span,
            ParseError::UnexpectedEnd { span, .. } => *span,
            ParseError::Syntax { found, .. } => found.span,
            ParseError::NumericConversion { span, .. } => *span,
        }
    }
}

// Result type alias for convenience
pub type ParseResult<T> = Result<T, ParseError>;

/// Recursive-descent reader over a [`TokenSource`].
///
/// Symbols are interned through the borrowed symbol table, so every form read
/// by one parser shares identities with the rest of the session.
pub struct Parser<'env, S, I: ?Sized> {
    tokens: S,
    symbols: &'env mut I,
}

impl<'env, S, I> Parser<'env, S, I>
where
    S: TokenSource,
    I: Interner + ?Sized,
{
    pub fn new(tokens: S, symbols: &'env mut I) -> Self {
        Parser { tokens, symbols }
    }

    /// Gives back the token source, positioned after the last consumed token.
    pub fn into_inner(self) -> S {
        self.tokens
    }

    /// Parses one top-level form.
    ///
    /// Returns [`Sexp::End`] once the token source is exhausted; that is not
    /// an error.
    pub fn parse_expression(&mut self) -> ParseResult<Sexp> {
        let token = self.tokens.next_token()?;
        self.parse_expr_with_token(token)
    }

    fn parse_expr_with_token(&mut self, token: Token) -> ParseResult<Sexp> {
        let Token { kind, span } = token;
        match kind {
            TokenKind::LParen => self.parse_list(span),
            TokenKind::LSquare => self.parse_array(span),
            TokenKind::LCurly => self.parse_hash(span),
            TokenKind::Quote => self.parse_quoted_expr("quote"),
            TokenKind::Backtick => self.parse_quoted_expr("syntax-quote"),
            TokenKind::Tilde => self.parse_quoted_expr("unquote"),
            TokenKind::TildeAt => self.parse_quoted_expr("unquote-splicing"),
            TokenKind::Symbol(name) => Ok(Sexp::Symbol(self.symbols.intern(&name))),
            TokenKind::Bool(text) => Ok(Sexp::Bool(text == "true")),
            TokenKind::Decimal(text) => parse_int(text, 10, span),
            TokenKind::Hex(text) => parse_int(text, 16, span),
            TokenKind::Oct(text) => parse_int(text, 8, span),
            TokenKind::Binary(text) => parse_int(text, 2, span),
            TokenKind::Char(c) => Ok(Sexp::Char(c)),
            TokenKind::Str(s) => Ok(Sexp::Str(s)),
            TokenKind::Float(text) => match text.parse::<f64>() {
                Ok(n) => Ok(Sexp::Float(n)),
                Err(err) => Err(ParseError::NumericConversion {
                    text,
                    span,
                    cause: err.into(),
                }),
            },
            TokenKind::End => Ok(Sexp::End),
            TokenKind::RParen | TokenKind::RSquare | TokenKind::RCurly | TokenKind::Dot => {
                Err(ParseError::Syntax {
                    found: Token::new(kind, span),
                    message: "Unexpected token",
                })
            }
        }
    }

    /// Parses an expression that must be present, e.g. the operand of a
    /// quote marker or the tail of a dotted pair.
    fn parse_required(&mut self, expected: &'static str) -> ParseResult<Sexp> {
        let next = self.tokens.peek_token()?;
        if next.kind == TokenKind::End {
            return Err(ParseError::UnexpectedEnd {
                expected,
                span: next.span,
            });
        }
        self.parse_expression()
    }

    /// Parses the rest of a list after its `(`. Handles `()`, proper lists
    /// and dotted tails. `open` is the span of the `(`, so an unclosed list
    /// is reported from there to the end of input.
    fn parse_list(&mut self, open: Span) -> ParseResult<Sexp> {
        let mut heads = Vec::new();
        loop {
            let next = self.tokens.peek_token()?;
            match next.kind {
                TokenKind::End => {
                    return Err(ParseError::UnexpectedEnd {
                        expected: "')'",
                        span: open.merge(next.span),
                    });
                }
                TokenKind::RParen => {
                    self.tokens.next_token()?;
                    return Ok(make_list(heads));
                }
                _ => {}
            }

            heads.push(self.parse_expression()?);

            if self.tokens.peek_token()?.kind == TokenKind::Dot {
                self.tokens.next_token()?;
                let tail = self.parse_required("an expression after '.'")?;
                self.expect_dotted_close(open)?;
                return Ok(heads
                    .into_iter()
                    .rev()
                    .fold(tail, |tail, head| Sexp::cons(head, tail)));
            }
        }
    }

    fn expect_dotted_close(&mut self, open: Span) -> ParseResult<()> {
        let token = self.tokens.next_token()?;
        match token.kind {
            TokenKind::RParen => Ok(()),
            TokenKind::End => Err(ParseError::UnexpectedEnd {
                expected: "')' after dotted pair",
                span: open.merge(token.span),
            }),
            _ => Err(ParseError::Syntax {
                found: token,
                message: "Extra value in dotted pair",
            }),
        }
    }

    fn parse_array(&mut self, open: Span) -> ParseResult<Sexp> {
        self.parse_sequence(open, TokenKind::RSquare, "']'").map(Sexp::Array)
    }

    /// `{a b ...}` reads as `(hash a b ...)`; building the map is left to the
    /// evaluator.
    fn parse_hash(&mut self, open: Span) -> ParseResult<Sexp> {
        let items = self.parse_sequence(open, TokenKind::RCurly, "'}'")?;
        let hash = Sexp::Symbol(self.symbols.intern("hash"));
        Ok(Sexp::cons(hash, make_list(items)))
    }

    fn parse_sequence(
        &mut self,
        open: Span,
        close: TokenKind,
        expected: &'static str,
    ) -> ParseResult<Vec<Sexp>> {
        let mut items = Vec::new();
        loop {
            let next = self.tokens.peek_token()?;
            if next.kind == TokenKind::End {
                return Err(ParseError::UnexpectedEnd {
                    expected,
                    span: open.merge(next.span),
                });
            }
            if next.kind == close {
                self.tokens.next_token()?;
                return Ok(items);
            }
            items.push(self.parse_expression()?);
        }
    }

    /// Wraps the next expression as `(quote_symbol expr)`.
    fn parse_quoted_expr(&mut self, quote_symbol: &str) -> ParseResult<Sexp> {
        let quoted_expr = self.parse_required("an expression to quote")?;
        let head = Sexp::Symbol(self.symbols.intern(quote_symbol));
        Ok(make_list([head, quoted_expr]))
    }
}

fn parse_int(text: String, radix: u32, span: Span) -> ParseResult<Sexp> {
    match i64::from_str_radix(&text, radix) {
        Ok(n) => Ok(Sexp::Int(n)),
        Err(source) => Err(ParseError::NumericConversion {
            text,
            span,
            cause: NumberError::Int { radix, source },
        }),
    }
}

/// Lexes and parses exactly one expression, rejecting empty input and any
/// trailing tokens.
pub fn parse_str<I: Interner + ?Sized>(input: &str, symbols: &mut I) -> ParseResult<Sexp> {
    let mut parser = Parser::new(Lexer::new(input), symbols);
    let expr = parser.parse_required("an expression")?;

    let mut tokens = parser.into_inner();
    let found = tokens.next_token()?;
    if found.kind == TokenKind::End {
        Ok(expr)
    } else {
        Err(ParseError::Syntax {
            found,
            message: "Expected end of input",
        })
    }
}
