use std::fmt;
use std::fmt::{Display, Formatter};

use colored::Colorize;
use log::info;

use super::BalanceOptions;
use crate::models::Transaction;
use crate::{Error, LedgerError};

/// A transaction that failed one of the balance phases
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceFailure {
    /// Position in the processed list of transactions
    pub index: usize,
    pub error: LedgerError,
    /// The transaction as it was when the check failed
    pub transaction: String,
}

/// Every balance failure of a run, in order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FailureReport {
    pub failures: Vec<BalanceFailure>,
}

impl FailureReport {
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
    pub fn len(&self) -> usize {
        self.failures.len()
    }
}

impl Display for FailureReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for failure in self.failures.iter() {
            writeln!(f, "{}\n\n{}", failure.error, failure.transaction)?;
        }
        Ok(())
    }
}

impl From<FailureReport> for Error {
    fn from(report: FailureReport) -> Self {
        let mut message = vec![];
        for failure in report.failures.iter() {
            message.push(format!("{}", failure.error).bold().bright_red());
            message.push(format!("\n\n{}\n", failure.transaction).normal());
        }
        message.push(
            format!("{} balance errors", report.len())
                .bold()
                .red(),
        );
        Error { message }
    }
}

/// Fills elided amounts and checks that transactions add up to zero.
///
/// Nothing stops at the first failure: both phases run on every transaction and the failures are
/// collected, the caller decides what to do with them.
pub fn balance(transactions: &mut [Transaction], options: &BalanceOptions) -> FailureReport {
    let mut report = FailureReport::default();
    for (index, transaction) in transactions.iter_mut().enumerate() {
        let mut errors = vec![];
        if options.auto_balance {
            if let Err(e) = transaction.auto_balance() {
                errors.push(e);
            }
        }
        if options.check_balance {
            if let Err(e) = transaction.check_balance() {
                errors.push(e);
            }
        }
        for error in errors {
            report.failures.push(BalanceFailure {
                index,
                error,
                transaction: transaction.to_string(),
            });
        }
    }
    info!(
        "balanced {} transactions, {} failures",
        transactions.len(),
        report.len()
    );
    report
}
