//! REPL (Read-Eval-Print Loop) for TraceLang
//!
//! Every line runs against the same root scope, function registry and trace
//! recorder, so declarations and traced names carry over between lines.

use crate::interp::{EnvRef, Environment, Interpreter, RuntimeError, Value};
use crate::lexer::tokenize;
use crate::parser::{parse, parse_expr};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const PROMPT: &str = "> ";
const HISTORY_FILE: &str = ".tracelang_history";
const SOURCE_NAME: &str = "<repl>";

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    interpreter: Interpreter,
    env: EnvRef,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Create a new REPL
    pub fn new() -> RlResult<Self> {
        let editor = DefaultEditor::new()?;
        let history_path = dirs_home().map(|h| h.join(HISTORY_FILE));

        let mut repl = Repl {
            editor,
            interpreter: Interpreter::new(),
            env: Environment::new().into_ref(),
            history_path,
        };

        if let Some(ref path) = repl.history_path {
            let _ = repl.editor.load_history(path);
        }

        Ok(repl)
    }

    /// Run the REPL
    pub fn run(&mut self) -> RlResult<()> {
        println!("TraceLang REPL v{}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for help, :quit to exit.\n");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let _ = self.editor.add_history_entry(line);

                    if line.starts_with(':') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    if let Err(err) = self.eval_input(line) {
                        eprintln!("{err}");
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }

    /// Handle REPL commands (starting with :). Returns true to quit.
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":quit" | ":q" | ":exit" => {
                println!("Goodbye!");
                true
            }
            ":help" | ":h" | ":?" => {
                print_help();
                false
            }
            ":trace" | ":t" => {
                match self.interpreter.trace().report() {
                    Some(report) => print!("{report}"),
                    None => println!("(no traced variables)"),
                }
                false
            }
            ":clear" => {
                print!("\x1B[2J\x1B[1;1H");
                false
            }
            _ => {
                println!("Unknown command: {cmd}");
                println!("Type :help for help.");
                false
            }
        }
    }

    /// Evaluate one line of input.
    ///
    /// A bare expression (no trailing `;`) is evaluated and its value echoed;
    /// anything else runs as statements. Diagnostics come back as text.
    fn eval_input(&mut self, input: &str) -> Result<Option<Value>, String> {
        let lexed = tokenize(input);
        if let Some(err) = lexed.errors.first() {
            return Err(err.to_string());
        }

        if !input.ends_with(';') && !input.ends_with('}') {
            if let Ok(expr) = parse_expr(input, lexed.tokens.clone()) {
                let value = self
                    .interpreter
                    .eval_expr(&expr, &self.env)
                    .map_err(|e| describe(&e))?;
                println!("{value}");
                return Ok(Some(value));
            }
        }

        let program = parse(SOURCE_NAME, input, lexed.tokens).map_err(|e| e.to_string())?;
        self.interpreter
            .run(&program, &self.env)
            .map_err(|e| describe(&e))?;
        Ok(None)
    }
}

fn describe(err: &RuntimeError) -> String {
    format!("Runtime error: {err}")
}

fn print_help() {
    println!("TraceLang REPL Commands:");
    println!("  :help, :h, :?   Show this help");
    println!("  :trace, :t      Show the trace report so far");
    println!("  :quit, :q       Exit the REPL");
    println!("  :clear          Clear the screen");
    println!();
    println!("You can enter:");
    println!("  - Statements: trace int x = 1; x += 2;");
    println!("  - Function definitions: function int sq(int n) {{ return n * n; }}");
    println!("  - Expressions: sq(x) + 1");
}

/// Get home directory
fn dirs_home() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}
