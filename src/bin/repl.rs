use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use glisp::lexer::LexerErrorKind;
use glisp::{Environment, TokenKind, load_str, tokenize};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Cmd, Completer, Context, Editor, EventHandler, KeyCode, KeyEvent, Modifiers};
use rustyline::{Helper, Highlighter, Hinter, Validator};

const HISTORY_FILE: &str = "glisp_history.txt";

/// Completes symbol names the session has already read.
struct GlispCompleter {
    env: Rc<RefCell<Environment>>,
}

impl rustyline::completion::Completer for GlispCompleter {
    type Candidate = String;
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let last = tokenize(&line[..pos])
            .ok()
            .and_then(|tokens| tokens.into_iter().last());
        match last {
            Some(token) if token.span.end == pos => match token.kind {
                TokenKind::Symbol(prefix) => Ok((
                    token.span.start,
                    self.env
                        .borrow()
                        .identifiers()
                        .filter(|name| name.starts_with(&prefix) && *name != prefix)
                        .map(str::to_string)
                        .collect(),
                )),
                _ => Ok((pos, vec![])),
            },
            _ => Ok((pos, vec![])),
        }
    }
}

#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
struct InputHelper {
    #[rustyline(Validator)]
    validator: GlispValidator,
    #[rustyline(Highlighter)]
    highlighter: GlispHighlighter,
    #[rustyline(Completer)]
    completer: GlispCompleter,
}

/// Keeps reading lines while a delimiter or string is still open.
struct GlispValidator;

impl Validator for GlispValidator {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let tokens = match tokenize(ctx.input()) {
            Ok(tokens) => tokens,
            Err(e) if e.error == LexerErrorKind::UnterminatedString => {
                return Ok(ValidationResult::Incomplete);
            }
            // let the reader report it with context
            Err(_) => return Ok(ValidationResult::Valid(None)),
        };

        let mut open = Vec::new();
        for token in &tokens {
            match token.kind {
                TokenKind::LParen => open.push(TokenKind::RParen),
                TokenKind::LSquare => open.push(TokenKind::RSquare),
                TokenKind::LCurly => open.push(TokenKind::RCurly),
                TokenKind::RParen | TokenKind::RSquare | TokenKind::RCurly => {
                    if open.pop().as_ref() != Some(&token.kind) {
                        return Ok(ValidationResult::Invalid(Some(format!(
                            "  - Unmatched '{}' at position {}",
                            token.kind, token.span.start
                        ))));
                    }
                }
                _ => {}
            }
        }

        let dangling_quote = matches!(
            tokens.last().map(|token| &token.kind),
            Some(TokenKind::Quote | TokenKind::Backtick | TokenKind::Tilde | TokenKind::TildeAt)
        );
        if open.is_empty() && !dangling_quote {
            Ok(ValidationResult::Valid(None))
        } else {
            Ok(ValidationResult::Incomplete)
        }
    }
}

struct GlispHighlighter;

fn color(kind: &TokenKind) -> Option<&'static str> {
    match kind {
        TokenKind::Str(_) => Some("32"), // green
        TokenKind::Decimal(_)
        | TokenKind::Hex(_)
        | TokenKind::Oct(_)
        | TokenKind::Binary(_)
        | TokenKind::Float(_) => Some("33"), // yellow
        TokenKind::Bool(_) | TokenKind::Char(_) => Some("35"), // magenta
        TokenKind::Quote | TokenKind::Backtick | TokenKind::Tilde | TokenKind::TildeAt => {
            Some("36") // cyan
        }
        _ => None,
    }
}

impl Highlighter for GlispHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let Ok(tokens) = tokenize(line) else {
            return Cow::Borrowed(line);
        };

        let mut highlighted = String::with_capacity(line.len());
        let mut last = 0;
        for token in tokens {
            let range = token.span.to_range();
            // whitespace and comments between tokens
            highlighted.push_str(&line[last..range.start]);
            let text = &line[range.clone()];
            match color(&token.kind) {
                Some(code) => highlighted.push_str(&format!("\x1b[{}m{}\x1b[0m", code, text)),
                None => highlighted.push_str(text),
            }
            last = range.end;
        }
        highlighted.push_str(&line[last..]);
        Cow::Owned(highlighted)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

fn main() -> rustyline::Result<()> {
    println!("glisp reader v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl-D to quit.");

    let session = Rc::new(RefCell::new(Environment::new()));
    let helper = InputHelper {
        validator: GlispValidator,
        highlighter: GlispHighlighter,
        completer: GlispCompleter {
            env: session.clone(),
        },
    };
    let config = rustyline::config::Config::builder()
        .edit_mode(rustyline::EditMode::Vi)
        .build();
    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(helper));
    rl.bind_sequence(
        KeyEvent(KeyCode::Char('s'), Modifiers::CTRL),
        EventHandler::Simple(Cmd::Newline),
    );
    if rl.load_history(HISTORY_FILE).is_err() {
        println!("No previous history.");
    }

    loop {
        match rl.readline("glisp> ") {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if input.eq_ignore_ascii_case("exit") {
                    break;
                }

                let result = load_str(input, &mut *session.borrow_mut());
                let env = session.borrow();
                match result {
                    Ok(forms) => {
                        for form in &forms {
                            println!("{}", form.display(&*env));
                        }
                    }
                    Err(err) => {
                        for form in &err.forms {
                            println!("{}", form.display(&*env));
                        }
                        if err.error.pretty_print("REPL", input).is_err() {
                            eprintln!("Parse Error: {}", err.error);
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C
                println!("Interrupted. Type 'exit' or Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D
                println!("\nExiting.");
                break;
            }
            Err(err) => {
                eprintln!("Readline Error: {:?}", err);
                break;
            }
        }
    }
    rl.save_history(HISTORY_FILE)
}
