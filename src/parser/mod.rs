//! Parser module
//!
//! The parser reads a ledger file line by line. A record starts on a line without indentation and
//! is one of:
//! - A blank line
//! - A comment, starting with `#`
//! - A trigger, starting with `=`
//! - A transaction, starting with its date
//!
//! The first error aborts the whole file.

use std::convert::TryFrom;
use std::fs::read_to_string;
use std::path::PathBuf;

use log::{debug, warn};

use crate::models::{Transaction, Trigger};
use crate::{Error, ParseError, ParseErrorKind};

pub mod expressions;
mod tokenizers;
pub(crate) mod utils;

use utils::{indentation, is_blank, is_comment, is_indented};

#[derive(Debug, Clone)]
pub struct ParsedLedger {
    pub triggers: Vec<Trigger>,
    pub transactions: Vec<Transaction>,
}

impl ParsedLedger {
    pub fn new() -> Self {
        ParsedLedger {
            triggers: vec![],
            transactions: vec![],
        }
    }

    pub fn len(&self) -> usize {
        self.triggers.len() + self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ParsedLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// A struct for holding data about the string being parsed
#[derive(Debug, Clone)]
pub struct Tokenizer {
    file: Option<PathBuf>,
    lines: Vec<String>,
    line_index: usize,
}

impl<'a> From<&'a str> for Tokenizer {
    fn from(content: &'a str) -> Self {
        Tokenizer {
            file: None,
            lines: content.lines().map(String::from).collect(),
            line_index: 0,
        }
    }
}

impl From<String> for Tokenizer {
    fn from(content: String) -> Self {
        Tokenizer::from(content.as_str())
    }
}

impl<'a> TryFrom<&'a PathBuf> for Tokenizer {
    type Error = Error;
    fn try_from(file: &'a PathBuf) -> Result<Self, Self::Error> {
        let content = read_to_string(file)
            .map_err(|e| Error::from(format!("Can't read {}: {}", file.display(), e)))?;
        let mut tokenizer = Tokenizer::from(content);
        tokenizer.file = Some(file.clone());
        Ok(tokenizer)
    }
}

impl Tokenizer {
    /// Parses the whole input into triggers and transactions
    pub fn parse(&mut self) -> Result<ParsedLedger, ParseError> {
        let mut ledger = ParsedLedger::new();
        self.line_index = 0;
        while let Some(line) = self.lines.get(self.line_index) {
            if is_blank(line) || is_comment(line) {
                self.line_index += 1;
            } else if is_indented(line) {
                return Err(self.error(ParseErrorKind::UnexpectedIndent, indentation(line)));
            } else if line.starts_with('=') {
                let trigger = self.parse_trigger(ledger.triggers.len() + 1)?;
                ledger.triggers.push(trigger);
            } else {
                let transaction = self.parse_transaction()?;
                ledger.transactions.push(transaction);
            }
        }
        match &self.file {
            Some(file) if ledger.is_empty() => warn!("{} has nothing in it", file.display()),
            Some(file) => debug!(
                "{}: {} triggers, {} transactions",
                file.display(),
                ledger.triggers.len(),
                ledger.transactions.len()
            ),
            None => {}
        }
        Ok(ledger)
    }

    /// An error in the current line, `offset` is in bytes from the start of the line.
    /// Past the end of the input it points after the last line.
    fn error(&self, kind: ParseErrorKind, offset: usize) -> ParseError {
        let (index, text, offset) = match self.lines.get(self.line_index) {
            Some(line) => (self.line_index, line.as_str(), offset),
            None => match self.lines.last() {
                Some(line) => (self.lines.len() - 1, line.as_str(), line.len()),
                None => (0, "", 0),
            },
        };
        let column = match text.get(..offset) {
            Some(before) => before.chars().count(),
            None => text.chars().count(),
        };
        ParseError {
            kind,
            file: self.file.clone(),
            line: index + 1,
            column: column + 1,
            text: text.to_string(),
        }
    }
}
