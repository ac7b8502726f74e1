use std::collections::HashMap;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

use regex::Regex;

use crate::models::{Posting, Transaction};
use crate::RuleError;

/// Strings extracted by a matcher, available to the account templates of the actions
pub type Captures = HashMap<String, String>;

/// The answer of a matcher for a posting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    NoMatch,
    Match(Captures),
}

/// A predicate backed by some embedded scripting runtime
///
/// This is everything the rewrite engine knows about scripts: it hands over the transaction and
/// the candidate posting and gets a verdict back.
pub trait Predicate: Debug {
    fn evaluate(&self, transaction: &Transaction, posting: &Posting) -> Result<Verdict, RuleError>;
    /// The source, as written in the ledger
    fn source(&self) -> &str;
}

#[derive(Debug, Clone)]
pub enum Matcher {
    /// Tested against the account name, capture groups are keyed by their index.
    /// A group that did not take part in the match captures the empty string.
    Regex(Regex),
    Script(Rc<dyn Predicate>),
}

impl Matcher {
    pub fn matches(
        &self,
        transaction: &Transaction,
        posting: &Posting,
    ) -> Result<Verdict, RuleError> {
        match self {
            Matcher::Regex(regex) => Ok(match regex.captures(&posting.account) {
                None => Verdict::NoMatch,
                Some(caps) => Verdict::Match(
                    caps.iter()
                        .enumerate()
                        .map(|(i, m)| (i.to_string(), m.map_or("", |m| m.as_str()).to_string()))
                        .collect(),
                ),
            }),
            Matcher::Script(predicate) => predicate.evaluate(transaction, posting),
        }
    }
}

impl Display for Matcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Regex(regex) => write!(f, "/{}/", regex.as_str()),
            Matcher::Script(predicate) => write!(f, "JS {}", predicate.source()),
        }
    }
}
