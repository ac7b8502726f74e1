use std::fmt;
use std::fmt::{Display, Formatter};

use chrono::NaiveDate;

use crate::models::Amount;
use crate::LedgerError;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PostingType {
    Real,
    /// `(account)`, left out of the balance check
    Virtual,
    /// `[account]`, checked together with the real postings
    VirtualMustBalance,
}

impl PostingType {
    /// Writes the account name with the brackets of its kind
    pub fn wrap(&self, account: &str) -> String {
        match self {
            PostingType::Real => account.to_string(),
            PostingType::Virtual => format!("({})", account),
            PostingType::VirtualMustBalance => format!("[{}]", account),
        }
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            PostingType::Real => "real",
            PostingType::Virtual => "virtual",
            PostingType::VirtualMustBalance => "balanced_virtual",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub kind: PostingType,
    pub account: String,
    pub amount: Option<Amount>,
    pub comment: String,
    /// Id of the trigger that created this posting
    pub generated_by: Option<usize>,
    /// 1-based index of the posting that fired the trigger
    pub generated_from: Option<usize>,
}

impl Posting {
    pub fn new(account: &str, kind: PostingType) -> Posting {
        Posting {
            kind,
            account: account.to_string(),
            amount: None,
            comment: String::new(),
            generated_by: None,
            generated_from: None,
        }
    }
    pub fn set_amount(&mut self, amount: Amount) {
        self.amount = Some(amount)
    }
    pub fn is_generated(&self) -> bool {
        self.generated_by.is_some()
    }
}

impl Display for Posting {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.wrap(&self.account))?;
        if let Some(amount) = &self.amount {
            write!(f, "\t{}", amount)?;
        }
        if !self.comment.is_empty() {
            write!(f, "; {}", self.comment)?;
        }
        if let (Some(trigger), Some(from)) = (self.generated_by, self.generated_from) {
            write!(f, "; GeneratedBy={} From={}", trigger, from)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub secondary_date: Option<NaiveDate>,
    pub id: Option<String>,
    pub description: String,
    pub postings: Vec<Posting>,
}

impl Transaction {
    pub fn new(date: NaiveDate) -> Transaction {
        Transaction {
            date,
            secondary_date: None,
            id: None,
            description: String::new(),
            postings: vec![],
        }
    }

    pub fn num_empty_postings(&self) -> usize {
        self.postings.iter().filter(|p| p.amount.is_none()).count()
    }

    /// Fills the elided amount, if there is one, with whatever makes all the postings add up to
    /// zero. Virtual postings count here, they only stay out of [`check_balance`].
    ///
    /// Nothing is modified when there is more than one elided amount.
    ///
    /// [`check_balance`]: Transaction::check_balance
    pub fn auto_balance(&mut self) -> Result<(), LedgerError> {
        let empties = self.num_empty_postings();
        if empties > 1 {
            return Err(LedgerError::TooManyEmptyPostings(empties));
        }
        let total: Amount = self.postings.iter().filter_map(|p| p.amount.as_ref()).sum();
        if let Some(p) = self.postings.iter_mut().find(|p| p.amount.is_none()) {
            p.set_amount(-total);
        }
        Ok(())
    }

    /// Real and balanced virtual postings must add up to exactly zero
    ///
    /// Balanced virtual postings are not checked as a group of their own.
    pub fn check_balance(&self) -> Result<(), LedgerError> {
        let mut total = Amount::new();
        for p in self.postings.iter() {
            if p.kind == PostingType::Virtual {
                continue;
            }
            match &p.amount {
                Some(amount) => total = total + amount,
                None => return Err(LedgerError::MissingAmount(p.account.clone())),
            }
        }
        match total.is_zero() {
            true => Ok(()),
            false => Err(LedgerError::TransactionIsNotBalanced(total)),
        }
    }

    /// Whether the description or the id match a regular expression
    pub fn is_match(&self, regex: &regex::Regex) -> bool {
        regex.is_match(&self.description)
            || self.id.as_ref().map_or(false, |id| regex.is_match(id))
    }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d"))?;
        if let Some(date) = self.secondary_date {
            write!(f, "={}", date.format("%Y-%m-%d"))?;
        }
        if let Some(id) = &self.id {
            write!(f, " <{}>", id)?;
        }
        writeln!(f, " {}", self.description)?;
        for p in self.postings.iter() {
            writeln!(f, "\t{}", p)?;
        }
        Ok(())
    }
}
