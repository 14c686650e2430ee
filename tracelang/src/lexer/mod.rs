//! Lexer implementation using logos

mod token;

pub use token::{LexErrorKind, Token};

use crate::ast::{LineIndex, Span};
use crate::error::CompileError;
use logos::Logos;

/// A token with its byte range and 1-based line
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
    pub line: usize,
}

/// Output of [`tokenize`]: every token that could be recognized, plus one
/// diagnostic per skipped character or rejected literal.
#[derive(Debug, Default)]
pub struct Lexed {
    pub tokens: Vec<SpannedToken>,
    pub errors: Vec<CompileError>,
}

impl Lexed {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Tokenize source code.
///
/// Lexing never stops early: an unrecognized character is recorded as a
/// diagnostic, exactly that one character is skipped and scanning resumes.
pub fn tokenize(source: &str) -> Lexed {
    let lines = LineIndex::new(source);
    let mut out = Lexed::default();
    let mut base = 0;
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let start = base + lexer.span().start;
        let end = base + lexer.span().end;
        let line = lines.line_of(start);

        match result {
            Ok(token) => out.tokens.push(SpannedToken {
                token,
                span: Span::new(start, end),
                line,
            }),
            Err(LexErrorKind::IntegerOverflow) => {
                let message = format!("integer literal {} out of range at line {line}", &source[start..end]);
                log::debug!("{message}");
                out.errors
                    .push(CompileError::lexer(message, Span::new(start, end), line));
            }
            Err(LexErrorKind::UnexpectedCharacter) => {
                let Some(ch) = source[start..].chars().next() else {
                    break;
                };
                let resume = start + ch.len_utf8();
                let message = format!("unexpected character '{ch}' at line {line}");
                log::debug!("{message}");
                out.errors
                    .push(CompileError::lexer(message, Span::new(start, resume), line));

                // A failed partial match (e.g. an unterminated string) may have
                // consumed more than one character; restart right after it.
                if end != resume {
                    base = resume;
                    lexer = Token::lexer(&source[resume..]);
                }
            }
        }
    }

    out
}
