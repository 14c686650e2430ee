//! Parser implementation using lalrpop

use crate::ast::{Expr, LineIndex, Program, Span};
use crate::error::{CompileError, Result};
use crate::lexer::{SpannedToken, Token};
use lalrpop_util::ParseError;


lalrpop_util::lalrpop_mod!(
    #[allow(clippy::all)]
    grammar,
    "/parser/grammar.rs"
);

/// Parse tokens into a program.
///
/// The first grammar violation aborts the parse; no partial AST is returned.
pub fn parse(_filename: &str, source: &str, tokens: Vec<SpannedToken>) -> Result<Program> {
    grammar::ProgramParser::new()
        .parse(triples(tokens))
        .map_err(|e| syntax_error(source, e))
}

/// Parse a single expression.
pub fn parse_expr(source: &str, tokens: Vec<SpannedToken>) -> Result<Expr> {
    grammar::ExprParser::new()
        .parse(triples(tokens))
        .map_err(|e| syntax_error(source, e))
}

fn triples(tokens: Vec<SpannedToken>) -> impl Iterator<Item = (usize, Token, usize)> {
    tokens
        .into_iter()
        .map(|t| (t.span.start, t.token, t.span.end))
}

fn syntax_error<E>(source: &str, err: ParseError<usize, Token, E>) -> CompileError {
    let lines = LineIndex::new(source);
    let (message, span) = match err {
        ParseError::InvalidToken { location } => {
            ("invalid token".to_string(), Span::new(location, location + 1))
        }
        ParseError::UnrecognizedEof { location, expected } => (
            format!("unexpected end of input{}", expected_suffix(&expected)),
            Span::new(location, location),
        ),
        ParseError::UnrecognizedToken {
            token: (start, token, end),
            expected,
        } => (
            format!("unexpected token `{token}`{}", expected_suffix(&expected)),
            Span::new(start, end),
        ),
        ParseError::ExtraToken {
            token: (start, token, end),
        } => (format!("extra token `{token}`"), Span::new(start, end)),
        ParseError::User { .. } => ("invalid input".to_string(), Span::new(0, 0)),
    };
    let line = lines.line_of(span.start);
    log::debug!("parse aborted at line {line}: {message}");
    CompileError::parser(message, span, line)
}

fn expected_suffix(expected: &[String]) -> String {
    if expected.is_empty() {
        String::new()
    } else {
        format!(", expected one of: {}", expected.join(", "))
    }
}
