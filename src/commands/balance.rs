use std::convert::TryFrom;

use colored::Colorize;

use super::money;
use crate::filter::Filter;
use crate::ledger::Ledger;
use crate::models::Accounts;
use crate::{CommonOpts, Error};

/// Balance report
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

/// One line per account in alphabetical order, then the total of every account.
/// The account regex only hides lines, the total doesn't change.
pub fn report(ledger: &Ledger, filter: &Filter) -> Vec<String> {
    let mut accounts = Accounts::new();
    for t in ledger.transactions.iter().filter(|t| filter.transaction(t)) {
        for p in t.postings.iter().filter(|p| filter.posting(p)) {
            if let Some(amount) = &p.amount {
                accounts.get(filter.collapse(&p.account)).add(amount);
            }
        }
    }

    let mut lines = vec![];
    for account in accounts.iter() {
        if !filter.amount(&account.balance) || !filter.account(account.get_name()) {
            continue;
        }
        let amount = format!("{:>16}", money(&account.balance));
        let amount = match account.balance.is_negative() {
            true => amount.red(),
            false => amount.normal(),
        };
        lines.push(format!("{} {}", amount, account.get_name().blue()));
    }
    lines.push("---------------- Total".to_string());
    lines.push(format!("{:>16}", money(&accounts.balance())));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::ledger;
    use structopt::StructOpt;

    fn line(amount: &str, account: &str) -> String {
        format!("{:>16} {}", amount, account)
    }

    fn run(args: &[&str]) -> Vec<String> {
        colored::control::set_override(false);
        let mut all = vec!["", "-f", "unused.ledger"];
        all.extend_from_slice(args);
        let options = CommonOpts::from_iter(all.iter());
        report(&ledger(), &Filter::try_from(&options).unwrap())
    }

    #[test]
    fn balance_report() {
        assert_eq!(
            run(&[]),
            vec![
                line("$400.00", "Assets:Bank"),
                line("$600.00", "Expenses:Rent"),
                line("$-1000.00", "Income:Salary"),
                line("$-60.00", "Tax:Owed"),
                line("$60.00", "Tax:Rent"),
                "---------------- Total".to_string(),
                format!("{:>16}", "$0.00"),
            ]
        );
    }

    #[test]
    fn filters() {
        // the total is still the total of every account
        assert_eq!(
            run(&["-a", "^Tax", "--real"]),
            vec!["---------------- Total".to_string(), format!("{:>16}", "$0.00")]
        );
        let lines = run(&["--show-zero", "--depth", "1"]);
        assert_eq!(lines[0], line("$400.00", "Assets"));
        assert_eq!(lines[3], line("$0.00", "Tax"));
        assert_eq!(lines.len(), 6);
        let lines = run(&["-t", "R-01"]);
        assert_eq!(lines[0], line("$-600.00", "Assets:Bank"));
    }
}
