use colored::{ColoredString, Colorize};
use std::error::Error as StdError;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use crate::models::Amount;

/// What went wrong while reading the ledger text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidDate(String),
    InvalidAmount(String),
    WrongFieldCount(usize),
    UnmatchedBracket(char),
    EmptyAccount,
    MissingMultiplier,
    InvalidMatcherHeader(String),
    InvalidRegex(String),
    InvalidScript(String),
    UnterminatedTrigger,
    UnexpectedIndent,
}

impl Display for ParseErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::InvalidDate(x) => write!(f, "invalid date {:?}, expected YYYY-MM-DD", x),
            ParseErrorKind::InvalidAmount(x) => write!(f, "invalid amount {:?}", x),
            ParseErrorKind::WrongFieldCount(n) => {
                write!(f, "wrong number of fields: expected one or two, found {}", n)
            }
            ParseErrorKind::UnmatchedBracket(c) => write!(f, "unmatched bracket '{}'", c),
            ParseErrorKind::EmptyAccount => write!(f, "empty account name"),
            ParseErrorKind::MissingMultiplier => write!(f, "trigger action needs a multiplier"),
            ParseErrorKind::InvalidMatcherHeader(x) => {
                write!(f, "couldn't parse trigger header {:?}", x)
            }
            ParseErrorKind::InvalidRegex(x) => write!(f, "invalid regular expression: {}", x),
            ParseErrorKind::InvalidScript(x) => write!(f, "invalid script: {}", x),
            ParseErrorKind::UnterminatedTrigger => write!(f, "trigger has no actions"),
            ParseErrorKind::UnexpectedIndent => write!(f, "unexpected indented line"),
        }
    }
}

/// A parse error, annotated with where it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub file: Option<PathBuf>,
    /// 1-based
    pub line: usize,
    /// 1-based
    pub column: usize,
    pub text: String,
}

impl StdError for ParseError {}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", "error: ".bold().bright_red())?;
        write!(f, "{}\n", self.kind)?;
        match &self.file {
            Some(file) => write!(f, "while parsing {} ", format!("{:?}", file).bold())?,
            None => write!(f, "while parsing ")?,
        }
        write!(f, "at position {}:{}\n", self.line, self.column)?;
        write!(f, "{}\n", self.text.cyan())?;
        let marker: String = (1..=self.text.chars().count().max(self.column))
            .map(|i| if i == self.column { '^' } else { '-' })
            .collect();
        write!(f, "{}", marker.bold())
    }
}

/// A trigger rule that could not be evaluated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The script failed while running
    Evaluation { script: String, message: String },
    /// The script returned something that is neither a boolean, an object nor null
    UnsupportedReturn { script: String, found: String },
}

impl StdError for RuleError {}

impl Display for RuleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::Evaluation { script, message } => {
                write!(f, "error evaluating {}: {}", script.bold(), message)
            }
            RuleError::UnsupportedReturn { script, found } => write!(
                f,
                "can't interpret return type {} of {}",
                found.bold(),
                script.bold()
            ),
        }
    }
}

/// The posting count of a transaction went past the limit while applying triggers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    pub limit: usize,
    pub transaction: String,
}

impl StdError for CycleError {}

impl Display for CycleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (more than {} postings)\n\n{}",
            "posting cycle detected".bold().bright_red(),
            self.limit,
            self.transaction
        )
    }
}

/// Fatal problems while applying triggers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerError {
    Rule(RuleError),
    Cycle(CycleError),
    /// A trigger matched a posting whose amount is still elided
    ElidedSource { trigger: usize, account: String },
}

impl StdError for TriggerError {}

impl Display for TriggerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TriggerError::Rule(e) => write!(f, "{}", e),
            TriggerError::Cycle(e) => write!(f, "{}", e),
            TriggerError::ElidedSource { trigger, account } => write!(
                f,
                "trigger {} matched {} which has no amount yet",
                trigger,
                account.bold()
            ),
        }
    }
}

impl From<RuleError> for TriggerError {
    fn from(error: RuleError) -> Self {
        TriggerError::Rule(error)
    }
}

impl From<CycleError> for TriggerError {
    fn from(error: CycleError) -> Self {
        TriggerError::Cycle(error)
    }
}

/// A transaction that can't be balanced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    TooManyEmptyPostings(usize),
    TransactionIsNotBalanced(Amount),
    MissingAmount(String),
}

impl StdError for LedgerError {}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::TooManyEmptyPostings(n) => write!(
                f,
                "AutoBalance: a transaction may only have one elided value, found {}",
                n
            ),
            LedgerError::TransactionIsNotBalanced(residual) => write!(
                f,
                "Balance: transactions must balance to zero; instead got {}",
                residual
            ),
            LedgerError::MissingAmount(account) => {
                write!(f, "Balance: posting to {} has no amount", account)
            }
        }
    }
}

#[derive(Debug)]
pub enum MissingFileError {
    ConfigFileDoesNotExistError(PathBuf),
    JournalFileDoesNotExistError(PathBuf),
}

impl StdError for MissingFileError {}

impl Display for MissingFileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (title, file) = match self {
            MissingFileError::ConfigFileDoesNotExistError(x) => ("Configuration", x),
            MissingFileError::JournalFileDoesNotExistError(x) => ("Journal", x),
        };
        write!(
            f,
            "{} file does not exist: {}",
            title,
            file.display().to_string().red().bold()
        )
    }
}

/// The error every command ends up returning
#[derive(Debug)]
pub struct Error {
    pub message: Vec<ColoredString>,
}

impl StdError for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", ColoredStrings(&self.message))
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Error {
            message: vec![ColoredString::from(message.as_str())],
        }
    }
}

impl From<ParseError> for Error {
    fn from(error: ParseError) -> Self {
        Error::from(error.to_string())
    }
}

impl From<TriggerError> for Error {
    fn from(error: TriggerError) -> Self {
        Error::from(error.to_string())
    }
}

impl From<MissingFileError> for Error {
    fn from(error: MissingFileError) -> Self {
        Error::from(error.to_string())
    }
}

// https://medium.com/apolitical-engineering/how-do-you-impl-display-for-vec-b8dbb21d814f
struct ColoredStrings<'a>(pub &'a Vec<ColoredString>);

impl<'a> fmt::Display for ColoredStrings<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.iter().fold(Ok(()), |result, partial| {
            result.and_then(|_| write!(f, "{}", partial))
        })
    }
}
