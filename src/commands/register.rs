use std::convert::TryFrom;

use colored::Colorize;

use super::money;
use crate::filter::Filter;
use crate::ledger::Ledger;
use crate::models::Accounts;
use crate::{CommonOpts, Error};

/// Register report
pub fn execute(options: &CommonOpts, maybe_ledger: Option<Ledger>) -> Result<(), Error> {
    let ledger = match maybe_ledger {
        Some(ledger) => ledger,
        None => Ledger::try_from(options)?,
    };
    let filter = Filter::try_from(options)?;
    for line in report(&ledger, &filter) {
        println!("{}", line);
    }
    Ok(())
}

/// One line per posting with the running balance of its account.
///
/// Balances run over every posting that passes the posting filters, the account and transaction
/// filters only decide what is displayed.
pub fn report(ledger: &Ledger, filter: &Filter) -> Vec<String> {
    let mut lines = vec![];
    let mut accounts = Accounts::new();
    for t in ledger.transactions.iter() {
        let mut first = true;
        for p in t.postings.iter() {
            let amount = match &p.amount {
                Some(amount) if filter.posting(p) => amount,
                _ => continue,
            };
            let name = filter.collapse(&p.account);
            let account = accounts.get(name);
            account.add(amount);
            if !filter.account(name) || !filter.transaction(t) {
                continue;
            }
            let prefix = match first {
                true => {
                    first = false;
                    format!("{} {:<30}", t.date.format("%y-%b-%d"), t.description)
                }
                false => String::new(),
            };
            let balance = format!("{:>14}", money(&account.balance));
            let balance = match account.balance.is_negative() {
                true => balance.red(),
                false => balance.normal(),
            };
            lines.push(format!(
                "{:<42} {} {:>14} {}",
                prefix,
                format!("{:<40}", name).blue(),
                money(amount),
                balance
            ));
        }
    }
    lines
}
