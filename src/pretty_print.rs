use std::io;
use std::ops::Range;

use ariadne::{Label, Report, ReportKind, Source};

use crate::loader::LoadError;
use crate::parser::{NumberError, ParseError};
use crate::source::Span;

// ariadne can't point at an empty range, so widen end-of-input spans by one.
fn label_range(span: Span) -> Range<usize> {
    span.start..span.end.max(span.start + 1)
}

impl ParseError {
    /// Renders the error against the input it came from, on stderr.
    pub fn pretty_print(&self, source_name: &str, input: &str) -> io::Result<()> {
        let range = label_range(self.span());
        let report = Report::build(ReportKind::Error, (source_name, range.clone()));
        let report = match self {
            ParseError::Source(lex_err) => report.with_message("Lexer Error").with_label(
                Label::new((source_name, range)).with_message(lex_err.error.to_string()),
            ),
            ParseError::UnexpectedEnd { expected, .. } => report
                .with_message("Unexpected end of input")
                .with_label(
                    Label::new((source_name, range)).with_message(format!("Expected {expected}")),
                ),
            ParseError::Syntax { found, message } => report
                .with_message(format!("Unexpected token: {}", found.kind))
                .with_label(Label::new((source_name, range)).with_message(*message)),
            ParseError::NumericConversion { text, cause, .. } => {
                let note = match cause {
                    NumberError::Int { radix, .. } => {
                        format!("Literals must fit a signed 64-bit base-{radix} integer")
                    }
                    NumberError::Float(_) => "Not a valid floating point literal".to_string(),
                };
                report
                    .with_message(format!("Invalid number `{text}`"))
                    .with_label(Label::new((source_name, range)).with_message(cause.to_string()))
                    .with_note(note)
            }
        };
        report.finish().eprint((source_name, Source::from(input)))
    }
}

impl LoadError {
    /// Renders the underlying parse error; the forms read before it are not shown.
    pub fn pretty_print(&self, source_name: &str, input: &str) -> io::Result<()> {
        self.error.pretty_print(source_name, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_range_widens_points() {
        assert_eq!(label_range(Span::point(4)), 4..5);
        assert_eq!(label_range(Span::new(2, 6)), 2..6);
    }
}
