use std::fmt;
use std::fmt::{Display, Formatter};

use lazy_static::lazy_static;
use regex::{Captures as RegexCaptures, Regex};

use crate::models::{Amount, Captures, Matcher, Posting, PostingType, Transaction, Verdict};
use crate::RuleError;

/// A rule: when every matcher accepts a posting, each action adds a posting
#[derive(Debug, Clone)]
pub struct Trigger {
    /// 1-based, in the order of the file
    pub id: usize,
    pub matchers: Vec<Matcher>,
    pub actions: Vec<Action>,
}

impl Trigger {
    /// Runs the matchers in order and stops at the first one that rejects the posting.
    /// Captures of later matchers overwrite those of earlier ones.
    pub fn matches(
        &self,
        transaction: &Transaction,
        posting: &Posting,
    ) -> Result<Verdict, RuleError> {
        let mut captures = Captures::new();
        for matcher in self.matchers.iter() {
            match matcher.matches(transaction, posting)? {
                Verdict::NoMatch => return Ok(Verdict::NoMatch),
                Verdict::Match(found) => captures.extend(found),
            }
        }
        Ok(Verdict::Match(captures))
    }
}

impl Display for Trigger {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for m in self.matchers.iter() {
            writeln!(f, "= {}", m)?;
        }
        for a in self.actions.iter() {
            writeln!(f, "\t{}", a)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub kind: PostingType,
    /// May contain `${name}` placeholders
    pub account: String,
    pub multiplier: Amount,
    pub comment: String,
}

impl Action {
    /// Builds the posting this action generates for `posting`
    ///
    /// Returns `None` when the source posting has no amount yet.
    pub fn execute(&self, posting: &Posting, captures: &Captures) -> Option<Posting> {
        let amount = posting.amount.as_ref()? * &self.multiplier;
        Some(Posting {
            kind: self.kind,
            account: self.expand_account(posting, captures),
            amount: Some(amount),
            comment: self.comment.clone(),
            generated_by: None,
            generated_from: None,
        })
    }

    /// Replaces `${account}` with the account of the posting and any other `${name}` with the
    /// capture of that name, or nothing
    pub fn expand_account(&self, posting: &Posting, captures: &Captures) -> String {
        lazy_static! {
            static ref RE_PLACEHOLDER: Regex = Regex::new(r"\$\{([A-Za-z0-9_]+)\}").unwrap();
        }
        RE_PLACEHOLDER
            .replace_all(&self.account, |caps: &RegexCaptures| match &caps[1] {
                "account" => posting.account.clone(),
                name => captures.get(name).cloned().unwrap_or_default(),
            })
            .into_owned()
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.kind.wrap(&self.account), self.multiplier)?;
        if !self.comment.is_empty() {
            write!(f, "; {}", self.comment)?;
        }
        Ok(())
    }
}
