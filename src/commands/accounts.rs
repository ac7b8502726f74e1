use std::collections::BTreeSet;
use std::convert::TryFrom;

use crate::filter::Filter;
use crate::ledger::Ledger;
use crate::models::PostingType;
use crate::{CommonOpts, Error};

/// Lists the accounts used in the postings
pub fn execute(options: &CommonOpts, maybe_ledger: Option<Ledger>) -> Result<(), Error> {
    let ledger = match maybe_ledger {
        Some(ledger) => ledger,
        None => Ledger::try_from(options)?,
    };
    let filter = Filter::try_from(options)?;
    for account in report(&ledger, &filter) {
        println!("{}", account);
    }
    Ok(())
}

pub fn report<'a>(ledger: &'a Ledger, filter: &Filter) -> BTreeSet<&'a str> {
    ledger
        .transactions
        .iter()
        .filter(|t| filter.transaction(t))
        .flat_map(|t| t.postings.iter())
        .filter(|p| !filter.real || p.kind == PostingType::Real)
        .map(|p| filter.collapse(&p.account))
        .filter(|name| filter.account(name))
        .collect()
}
