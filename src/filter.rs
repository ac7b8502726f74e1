use std::convert::TryFrom;

use chrono::NaiveDate;
use colored::Colorize;
use regex::Regex;

use crate::models::{Amount, Posting, PostingType, Transaction};
use crate::{CommonOpts, Error};

/// What the reports show, built from the command line options
#[derive(Debug, Clone, Default)]
pub struct Filter {
    account: Option<Regex>,
    transaction: Option<Regex>,
    pub show_zero: bool,
    pub real: bool,
    pub begin: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub depth: Option<usize>,
}

fn build_regex(pattern: &Option<String>) -> Result<Option<Regex>, Error> {
    match pattern {
        None => Ok(None),
        Some(pattern) => match Regex::new(pattern) {
            Ok(regex) => Ok(Some(regex)),
            Err(e) => Err(Error {
                message: vec![
                    format!("Invalid regular expression {}\n", pattern)
                        .bold()
                        .bright_red(),
                    e.to_string().normal(),
                ],
            }),
        },
    }
}

impl TryFrom<&CommonOpts> for Filter {
    type Error = Error;
    fn try_from(options: &CommonOpts) -> Result<Self, Self::Error> {
        Ok(Filter {
            account: build_regex(&options.account)?,
            transaction: build_regex(&options.transaction)?,
            show_zero: options.show_zero,
            real: options.real,
            begin: options.begin,
            end: options.end,
            depth: options.depth,
        })
    }
}

impl Filter {
    /// Dates and the transaction regex, against the description or the id
    pub fn transaction(&self, transaction: &Transaction) -> bool {
        if let Some(date) = self.begin {
            if transaction.date < date {
                return false;
            }
        }
        if let Some(date) = self.end {
            if transaction.date >= date {
                return false;
            }
        }
        match &self.transaction {
            Some(regex) => transaction.is_match(regex),
            None => true,
        }
    }

    /// Whether a posting counts for the reports. Postings without an amount never do.
    pub fn posting(&self, posting: &Posting) -> bool {
        if self.real && posting.kind != PostingType::Real {
            return false;
        }
        match &posting.amount {
            Some(amount) => self.amount(amount),
            None => false,
        }
    }

    /// Zero amounts are only shown with `--show-zero`
    pub fn amount(&self, amount: &Amount) -> bool {
        self.show_zero || !amount.is_zero()
    }

    pub fn account(&self, name: &str) -> bool {
        match &self.account {
            Some(regex) => regex.is_match(name),
            None => true,
        }
    }

    /// The name of the account at the report depth, `Assets:Bank:Checking` at depth 2 is
    /// `Assets:Bank`
    pub fn collapse<'a>(&self, name: &'a str) -> &'a str {
        match self.depth {
            Some(depth) => match name.match_indices(':').nth(depth.saturating_sub(1)) {
                Some((i, _)) if depth > 0 => &name[..i],
                _ => name,
            },
            None => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Tokenizer;

    fn filter() -> Filter {
        Filter::default()
    }

    #[test]
    fn postings() {
        let t = &Tokenizer::from(
            "2024-03-01 <R-03> Rent\n\tExpenses:Rent\t100\n\t(Budget)\t0\n\t[Savings]\t-100\n\tNothing\n",
        )
        .parse()
        .unwrap()
        .transactions[0];
        let shown = |f: &Filter| t.postings.iter().filter(|p| f.posting(p)).count();
        assert_eq!(shown(&filter()), 2);
        let mut f = filter();
        f.show_zero = true;
        assert_eq!(shown(&f), 3);
        f.real = true;
        assert_eq!(shown(&f), 1);
    }

    #[test]
    fn transactions() {
        let t = &Tokenizer::from("2024-03-01 <R-03> Rent\n\tA\t1\n\tB\n")
            .parse()
            .unwrap()
            .transactions[0];
        let mut f = filter();
        f.transaction = Some(Regex::new("^R-").unwrap());
        assert!(f.transaction(t));
        f.transaction = Some(Regex::new("(?i)rent").unwrap());
        assert!(f.transaction(t));
        f.transaction = Some(Regex::new("Food").unwrap());
        assert!(!f.transaction(t));

        let mut f = filter();
        f.begin = Some(NaiveDate::from_ymd(2024, 3, 1));
        f.end = Some(NaiveDate::from_ymd(2024, 3, 2));
        assert!(f.transaction(t));
        f.end = Some(NaiveDate::from_ymd(2024, 3, 1));
        assert!(!f.transaction(t));
    }

    #[test]
    fn depth() {
        let mut f = filter();
        assert_eq!(f.collapse("Assets:Bank:Checking"), "Assets:Bank:Checking");
        f.depth = Some(2);
        assert_eq!(f.collapse("Assets:Bank:Checking"), "Assets:Bank");
        assert_eq!(f.collapse("Assets"), "Assets");
        f.depth = Some(1);
        assert_eq!(f.collapse("Assets:Bank:Checking"), "Assets");
    }

    #[test]
    fn invalid_regex() {
        assert!(build_regex(&Some("(".to_string())).is_err());
        assert!(build_regex(&None).unwrap().is_none());
    }
}
