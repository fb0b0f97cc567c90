use std::io::{self, Read};
use std::process::ExitCode;

use glisp::{Environment, load_str, tokenize};

fn usage() {
    println!("Usage: glisp [FILE]");
    println!();
    println!("Reads every top-level form from FILE (or stdin) and prints it back.");
    println!();
    println!("Environment variables:");
    println!("  GLISP_TRACE=1    Print each token before parsing");
}

fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let path = match args.as_slice() {
        [] => None,
        [flag] if flag == "--help" || flag == "-h" => {
            usage();
            return ExitCode::SUCCESS;
        }
        [path] => Some(path.as_str()),
        _ => {
            eprintln!("Too many arguments.");
            eprintln!("Try 'glisp --help' for usage information.");
            return ExitCode::FAILURE;
        }
    };
    let source_name = path.unwrap_or("<stdin>");

    let input = match read_input(path) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Cannot read {}: {}", source_name, e);
            return ExitCode::FAILURE;
        }
    };

    let trace = std::env::var("GLISP_TRACE").is_ok_and(|v| v == "1");
    if trace {
        match tokenize(&input) {
            Ok(tokens) => {
                for token in tokens {
                    eprintln!("  {:?}", token);
                }
            }
            // The reader reports the same error below with context.
            Err(e) => eprintln!("  lexing stopped at {}: {}", e.span, e),
        }
    }

    let mut env = Environment::new();
    let loaded = load_str(&input, &mut env);
    if trace {
        eprintln!("  {} distinct symbol(s) interned", env.len());
    }
    match loaded {
        Ok(forms) => {
            for form in &forms {
                println!("{}", form.display(&env));
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            for form in &err.forms {
                println!("{}", form.display(&env));
            }
            if let Err(e) = err.pretty_print(source_name, &input) {
                eprintln!("Parse Error: {} ({})", err.error, e);
            }
            ExitCode::FAILURE
        }
    }
}
