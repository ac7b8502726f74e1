use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

use chrono::{Datelike, NaiveDate};
use num::{BigRational, Zero};
use regex::Regex;

use crate::models::{Amount, Posting, Transaction};

#[derive(Debug, Clone)]
pub enum EvalResult<'a> {
    Null,
    Boolean(bool),
    Number(BigRational),
    String(String),
    Date(NaiveDate),
    Regex(Regex),
    Object(Vec<(String, EvalResult<'a>)>),
    Transaction(&'a Transaction),
    Posting(&'a Posting),
}

impl<'a> EvalResult<'a> {
    pub fn type_name(&self) -> &'static str {
        match self {
            EvalResult::Null => "null",
            EvalResult::Boolean(_) => "boolean",
            EvalResult::Number(_) => "number",
            EvalResult::String(_) => "string",
            EvalResult::Date(_) => "date",
            EvalResult::Regex(_) => "regex",
            EvalResult::Object(_) => "object",
            EvalResult::Transaction(_) => "transaction",
            EvalResult::Posting(_) => "posting",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            EvalResult::Null => false,
            EvalResult::Boolean(b) => *b,
            EvalResult::Number(n) => !n.is_zero(),
            EvalResult::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Looks up `field`, missing optional values are null
    pub fn member(&self, field: &str) -> Result<EvalResult<'a>, String> {
        let maybe_string = |x: &Option<String>| match x {
            Some(s) => EvalResult::String(s.clone()),
            None => EvalResult::Null,
        };
        let maybe_number = |x: Option<usize>| match x {
            Some(n) => EvalResult::Number(BigRational::from_integer(n.into())),
            None => EvalResult::Null,
        };
        let found = match (self, field) {
            (EvalResult::Transaction(t), "date") => Some(EvalResult::Date(t.date)),
            (EvalResult::Transaction(t), "secondary_date") => Some(match t.secondary_date {
                Some(d) => EvalResult::Date(d),
                None => EvalResult::Null,
            }),
            (EvalResult::Transaction(t), "id") => Some(maybe_string(&t.id)),
            (EvalResult::Transaction(t), "description") => {
                Some(EvalResult::String(t.description.clone()))
            }
            (EvalResult::Transaction(t), "postings") => Some(maybe_number(Some(t.postings.len()))),
            (EvalResult::Posting(p), "account") => Some(EvalResult::String(p.account.clone())),
            (EvalResult::Posting(p), "amount") => Some(match &p.amount {
                Some(amount) => EvalResult::Number(amount.get_value().clone()),
                None => EvalResult::Null,
            }),
            (EvalResult::Posting(p), "comment") => Some(EvalResult::String(p.comment.clone())),
            (EvalResult::Posting(p), "kind") => {
                Some(EvalResult::String(p.kind.as_str().to_string()))
            }
            (EvalResult::Posting(p), "generated_by") => Some(maybe_number(p.generated_by)),
            (EvalResult::Date(d), "year") => Some(EvalResult::Number(BigRational::from_integer(
                d.year().into(),
            ))),
            (EvalResult::Date(d), "month") => Some(maybe_number(Some(d.month() as usize))),
            (EvalResult::Date(d), "day") => Some(maybe_number(Some(d.day() as usize))),
            (EvalResult::String(s), "length") => Some(maybe_number(Some(s.chars().count()))),
            (EvalResult::Object(entries), key) => Some(
                entries
                    .iter()
                    .rev()
                    .find(|(k, _)| k == key)
                    .map_or(EvalResult::Null, |(_, v)| v.clone()),
            ),
            (EvalResult::Null, _) => {
                return Err(format!("can't read {} of null", field));
            }
            _ => None,
        };
        found.ok_or_else(|| format!("{} has no member {}", self.type_name(), field))
    }
}

/// Only use this for >, <, >=, <=
impl<'a> PartialOrd for EvalResult<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (EvalResult::Number(left), EvalResult::Number(right)) => Some(left.cmp(right)),
            (EvalResult::String(left), EvalResult::String(right)) => Some(left.cmp(right)),
            (EvalResult::Date(left), EvalResult::Date(right)) => Some(left.cmp(right)),
            _ => None,
        }
    }
}

/// Strict equality: values of different types are never equal
impl<'a> PartialEq for EvalResult<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EvalResult::Null, EvalResult::Null) => true,
            (EvalResult::Boolean(left), EvalResult::Boolean(right)) => left == right,
            (EvalResult::Number(left), EvalResult::Number(right)) => left == right,
            (EvalResult::String(left), EvalResult::String(right)) => left == right,
            (EvalResult::Date(left), EvalResult::Date(right)) => left == right,
            (EvalResult::Regex(left), EvalResult::Regex(right)) => left.as_str() == right.as_str(),
            (EvalResult::Transaction(left), EvalResult::Transaction(right)) => {
                std::ptr::eq(*left, *right)
            }
            (EvalResult::Posting(left), EvalResult::Posting(right)) => std::ptr::eq(*left, *right),
            _ => false,
        }
    }
}

impl<'a> Display for EvalResult<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EvalResult::Null => write!(f, "null"),
            EvalResult::Boolean(b) => write!(f, "{}", b),
            EvalResult::Number(n) => write!(f, "{}", Amount::from(n.clone())),
            EvalResult::String(s) => write!(f, "{}", s),
            EvalResult::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            EvalResult::Regex(r) => write!(f, "/{}/", r.as_str()),
            EvalResult::Object(entries) => {
                let entries: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v))
                    .collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
            EvalResult::Transaction(t) => write!(f, "{}", t.description),
            EvalResult::Posting(p) => write!(f, "{}", p.account),
        }
    }
}
