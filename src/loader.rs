use thiserror::Error;

use crate::environment::Interner;
use crate::lexer::{Lexer, TokenSource};
use crate::parser::{ParseError, Parser};
use crate::types::Sexp;

/// A program stopped parsing part way through.
///
/// `forms` holds every top-level form read before the failure, so the caller
/// can decide whether to run them anyway.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Parsing stopped after {} top-level form(s)", .forms.len())]
pub struct LoadError {
    pub forms: Vec<Sexp>,
    #[source]
    pub error: ParseError,
}

/// Reads top-level forms until the token source is exhausted.
pub fn parse_all<S, I>(parser: &mut Parser<'_, S, I>) -> Result<Vec<Sexp>, LoadError>
where
    S: TokenSource,
    I: Interner + ?Sized,
{
    let mut forms = Vec::new();
    loop {
        match parser.parse_expression() {
            Ok(expr) if expr.is_end() => return Ok(forms),
            Ok(expr) => forms.push(expr),
            Err(error) => return Err(LoadError { forms, error }),
        }
    }
}

/// Lexes and reads every top-level form in `input`.
pub fn load_str<I>(input: &str, symbols: &mut I) -> Result<Vec<Sexp>, LoadError>
where
    I: Interner + ?Sized,
{
    parse_all(&mut Parser::new(Lexer::new(input), symbols))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::list::list_to_sequence;
    use crate::source::Span;

    #[test]
    fn test_load_multiple_forms() {
        let mut env = Environment::new();
        let forms = load_str("(def x 10) ; set x\n'x [1 2]", &mut env).unwrap();
        let printed: Vec<String> = forms
            .iter()
            .map(|form| form.display(&env).to_string())
            .collect();
        assert_eq!(printed, vec!["(def x 10)", "(quote x)", "[1 2]"]);
    }

    #[test]
    fn test_load_empty_input() {
        let mut env = Environment::new();
        assert_eq!(load_str("", &mut env), Ok(vec![]));
        assert_eq!(load_str("  ; just a comment", &mut env), Ok(vec![]));
    }

    #[test]
    fn test_load_keeps_forms_before_failure() {
        let mut env = Environment::new();
        let err = load_str("1 (2 3) (4 . 5 6) 7", &mut env).unwrap_err();
        assert_eq!(err.forms.len(), 2);
        assert_eq!(err.forms[0], Sexp::Int(1));
        assert!(matches!(err.error, ParseError::Syntax { .. }));
        assert_eq!(err.to_string(), "Parsing stopped after 2 top-level form(s)");
    }

    #[test]
    fn test_load_unterminated_last_form() {
        let mut env = Environment::new();
        let err = load_str("a (b", &mut env).unwrap_err();
        assert_eq!(err.forms.len(), 1);
        assert_eq!(
            err.error,
            ParseError::UnexpectedEnd {
                expected: "')'",
                span: Span::new(2, 4),
            }
        );
    }

    #[test]
    fn test_load_nested_long_list() {
        let mut env = Environment::new();
        let input = format!("(({}) x)", "1 ".repeat(200_000));
        let forms = load_str(&input, &mut env).unwrap();
        let items = list_to_sequence(&forms[0]).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].iter().count(), 200_000);
        assert_eq!(forms.clone(), forms);
    }

    #[test]
    fn test_symbols_shared_across_forms() {
        let mut env = Environment::new();
        let forms = load_str("foo 'foo", &mut env).unwrap();
        let Sexp::Pair(quoted) = &forms[1] else {
            panic!("expected a quote form, got {:?}", forms[1]);
        };
        assert_eq!(quoted.tail, Sexp::cons(forms[0].clone(), Sexp::Null));
    }
}
