//! A plain text double entry ledger whose triggers generate postings
extern crate pest;
#[macro_use]
extern crate pest_derive;

mod app;
pub mod commands;
mod error;
pub mod filter;
pub mod ledger;
pub mod models;
pub mod parser;

pub use app::{date_parser, run_app, CommonOpts};
pub use error::{
    CycleError, Error, LedgerError, MissingFileError, ParseError, ParseErrorKind, RuleError,
    TriggerError,
};
