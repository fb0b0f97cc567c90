// Declare modules publicly so they are part of the library interface
pub mod environment;
pub mod lexer;
pub mod list;
pub mod loader;
pub mod parser;
pub mod pretty_print;
pub mod source;
pub mod types;

pub use environment::{Environment, Interner, Symbol};
pub use lexer::{Lexer, LexerError, Token, TokenKind, TokenSource, TokenStream, tokenize};
pub use list::{NotAList, concat_list, is_list, list_to_sequence, make_list, map_list};
pub use loader::{LoadError, load_str, parse_all};
pub use parser::{ParseError, Parser, parse_str};
pub use source::Span;
pub use types::{Pair, Sexp};
