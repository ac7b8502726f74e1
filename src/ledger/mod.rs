//! From a parsed ledger to a processed one
//!
//! 1. Sort the transactions by date (stable, so same day transactions keep the file order)
//! 2. Apply the triggers
//! 3. Fill elided amounts and check that every transaction balances
use std::convert::TryFrom;
use std::path::PathBuf;

use log::info;

use crate::models::{Transaction, Trigger};
use crate::parser::{ParsedLedger, Tokenizer};
use crate::{CommonOpts, Error, MissingFileError};

mod balancer;
mod rewrite;

pub use balancer::{balance, BalanceFailure, FailureReport};
pub use rewrite::apply_triggers;

/// How many postings a transaction can reach before the triggers are considered to be looping
pub const DEFAULT_CYCLE_LIMIT: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceOptions {
    pub auto_balance: bool,
    pub check_balance: bool,
}

impl BalanceOptions {
    pub fn is_enabled(&self) -> bool {
        self.auto_balance || self.check_balance
    }
}

impl Default for BalanceOptions {
    fn default() -> Self {
        BalanceOptions {
            auto_balance: true,
            check_balance: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOptions {
    pub sort: bool,
    pub triggers: bool,
    pub balance: BalanceOptions,
    pub cycle_limit: usize,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        ProcessOptions {
            sort: true,
            triggers: true,
            balance: BalanceOptions::default(),
            cycle_limit: DEFAULT_CYCLE_LIMIT,
        }
    }
}

impl From<&CommonOpts> for ProcessOptions {
    fn from(options: &CommonOpts) -> Self {
        ProcessOptions {
            sort: !options.no_sort,
            triggers: !options.no_triggers,
            balance: BalanceOptions {
                auto_balance: !options.no_balance,
                check_balance: !options.no_balance,
            },
            cycle_limit: options.cycle_limit,
        }
    }
}

/// A ledger whose transactions have been through the triggers and the balancer
#[derive(Debug, Clone)]
pub struct Ledger {
    pub triggers: Vec<Trigger>,
    pub transactions: Vec<Transaction>,
}

impl TryFrom<&CommonOpts> for Ledger {
    type Error = Error;
    fn try_from(options: &CommonOpts) -> Result<Self, Self::Error> {
        let path: PathBuf = options.input_file.clone();
        if !path.exists() {
            return Err(MissingFileError::JournalFileDoesNotExistError(path).into());
        }
        let mut tokenizer = Tokenizer::try_from(&path)?;
        let items = tokenizer.parse()?;
        items.to_ledger(&ProcessOptions::from(options))
    }
}

impl ParsedLedger {
    /// Processes the parsed ledger, every balance failure is reported in the error
    pub fn to_ledger(mut self, options: &ProcessOptions) -> Result<Ledger, Error> {
        if options.sort {
            self.transactions.sort_by_key(|t| t.date);
        }
        if options.triggers {
            apply_triggers(&self.triggers, &mut self.transactions, options.cycle_limit)?;
            let generated = self
                .transactions
                .iter()
                .flat_map(|t| t.postings.iter())
                .filter(|p| p.is_generated())
                .count();
            info!(
                "{} triggers generated {} postings",
                self.triggers.len(),
                generated
            );
        }
        if options.balance.is_enabled() {
            let report = balance(&mut self.transactions, &options.balance);
            if !report.is_empty() {
                return Err(report.into());
            }
        }
        Ok(Ledger {
            triggers: self.triggers,
            transactions: self.transactions,
        })
    }
}
