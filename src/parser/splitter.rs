//! Statement splitting and comment stripping using the sqlparser tokenizer
//!
//! Splitting happens on top-level semicolons only: the tokenizer already
//! treats quoted strings, dollar-quoted bodies (`$$ … $$`) and comments as
//! single tokens, so semicolons inside them never terminate a statement.

use std::fmt;

use sqlparser::dialect::SnowflakeDialect;
use sqlparser::tokenizer::{Location, Token, TokenWithSpan, Tokenizer, Whitespace};

/// The tokenizer rejected the input (e.g. an unterminated literal)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitError {
    pub message: String,
}

impl fmt::Display for SplitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SplitError {}

fn tokenize(sql: &str) -> Result<Vec<TokenWithSpan>, SplitError> {
    let dialect = SnowflakeDialect {};
    Tokenizer::new(&dialect, sql)
        .tokenize_with_location()
        .map_err(|e| SplitError {
            message: e.to_string(),
        })
}

fn is_comment(token: &Token) -> bool {
    matches!(
        token,
        Token::Whitespace(Whitespace::SingleLineComment { .. })
            | Token::Whitespace(Whitespace::MultiLineComment(_))
    )
}

/// Maps tokenizer locations (1-based line, 1-based char column) back to
/// byte offsets in the source.
struct SourceIndex<'a> {
    sql: &'a str,
    line_offsets: Vec<usize>,
}

impl<'a> SourceIndex<'a> {
    fn new(sql: &'a str) -> Self {
        let mut line_offsets = vec![0]; // Line 1 starts at offset 0
        for (i, ch) in sql.char_indices() {
            if ch == '\n' {
                line_offsets.push(i + 1);
            }
        }
        Self { sql, line_offsets }
    }

    fn byte_offset(&self, location: Location) -> usize {
        if location.line == 0 || location.line as usize > self.line_offsets.len() {
            return self.sql.len();
        }
        let line_start = self.line_offsets[(location.line - 1) as usize];
        let chars = location.column.saturating_sub(1) as usize;
        self.sql[line_start..]
            .char_indices()
            .nth(chars)
            .map(|(i, _)| line_start + i)
            .unwrap_or(self.sql.len())
    }

    /// Source text covered by a token, exactly as written
    fn text(&self, token: &TokenWithSpan) -> &'a str {
        let start = self.byte_offset(token.span.start);
        let end = self.byte_offset(token.span.end).max(start);
        &self.sql[start..end]
    }
}

/// Split SQL source into statements.
///
/// Statements are sliced from the source rather than re-rendered from
/// tokens, so literals keep their original quoting (`'IT''S'`). Each
/// statement keeps its terminating semicolon. Chunks that contain only
/// whitespace are dropped; comment-only chunks are kept (they strip to empty
/// later and are skipped by the classifier).
pub fn split_statements(sql: &str) -> Result<Vec<String>, SplitError> {
    let tokens = tokenize(sql)?;
    let index = SourceIndex::new(sql);
    let mut statements = Vec::new();
    let mut start = 0;

    for token in tokens.iter().filter(|t| t.token == Token::SemiColon) {
        let end = index.byte_offset(token.span.end).max(start);
        push_statement(&mut statements, &sql[start..end]);
        start = end;
    }
    push_statement(&mut statements, &sql[start..]);

    Ok(statements)
}

fn push_statement(statements: &mut Vec<String>, chunk: &str) {
    let trimmed = chunk.trim();
    if !trimmed.is_empty() && trimmed != ";" {
        statements.push(trimmed.to_string());
    }
}

/// Split without failing: tokenizer split when possible, otherwise a plain
/// scan that only respects single quotes.
///
/// Used for procedure bodies and SQL recovered from literals, where a
/// tokenizer failure should degrade instead of aborting the file.
pub fn split_statements_lenient(sql: &str) -> Vec<String> {
    match split_statements(sql) {
        Ok(statements) => statements,
        Err(e) => {
            tracing::debug!(error = %e, "falling back to plain semicolon split");
            split_on_semicolons(sql)
        }
    }
}

fn split_on_semicolons(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;

    for (i, c) in sql.char_indices() {
        match c {
            '\'' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                push_statement(&mut statements, &sql[start..=i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    push_statement(&mut statements, &sql[start..]);
    statements
}

/// Remove line and block comments from a statement.
///
/// Only the comment spans are removed; everything else is copied from the
/// source as written. A line comment leaves its newline behind, a block
/// comment leaves a space. Falls back to dropping lines that start with `--`
/// when the statement cannot be tokenized.
pub fn strip_comments(statement: &str) -> String {
    match tokenize(statement) {
        Ok(tokens) => {
            let index = SourceIndex::new(statement);
            let mut cleaned = String::with_capacity(statement.len());
            for token in &tokens {
                match &token.token {
                    Token::Whitespace(Whitespace::SingleLineComment { comment, .. }) => {
                        if comment.ends_with('\n') {
                            cleaned.push('\n');
                        }
                    }
                    t if is_comment(t) => cleaned.push(' '),
                    _ => cleaned.push_str(index.text(token)),
                }
            }
            cleaned.trim().to_string()
        }
        Err(_) => statement
            .lines()
            .filter(|line| !line.trim_start().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string(),
    }
}
