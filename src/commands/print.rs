use std::convert::TryFrom;

use crate::filter::Filter;
use crate::ledger::Ledger;
use crate::{CommonOpts, Error};

/// Prints the triggers and the transactions back in the ledger format
pub fn execute(options: &CommonOpts, maybe_ledger: Option<Ledger>) -> Result<(), Error> {
    let ledger = match maybe_ledger {
        Some(ledger) => ledger,
        None => Ledger::try_from(options)?,
    };
    let filter = Filter::try_from(options)?;
    print!("{}", report(&ledger, &filter));
    Ok(())
}

pub fn report(ledger: &Ledger, filter: &Filter) -> String {
    let mut output = String::new();
    for trigger in ledger.triggers.iter() {
        output.push_str(&format!("{}\n", trigger));
    }
    for t in ledger.transactions.iter().filter(|t| filter.transaction(t)) {
        output.push_str(&format!("{}\n", t));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{ledger, LEDGER};
    use crate::ledger::ProcessOptions;
    use crate::parser::Tokenizer;

    #[test]
    fn print_report() {
        let output = report(&ledger(), &Filter::default());
        assert!(output.starts_with("= /^Expenses:Rent$/\n\t(Tax:Rent)\t0.1\n\t(Tax:Owed)\t-0.1\n\n"));
        assert!(output.contains(
            "2024-01-15 <R-01> Rent
\tExpenses:Rent\t600.005
\tAssets:Bank\t-600.005
\t(Tax:Rent)\t60.0005; GeneratedBy=1 From=1
\t(Tax:Owed)\t-60.0005; GeneratedBy=1 From=1
"
        ));
    }

    #[test]
    fn unprocessed_output_parses_back() {
        let options = ProcessOptions {
            triggers: false,
            ..ProcessOptions::default()
        };
        let first = Tokenizer::from(LEDGER).parse().unwrap().to_ledger(&options).unwrap();
        let printed = report(&first, &Filter::default());
        let second = Tokenizer::from(printed.as_str())
            .parse()
            .unwrap()
            .to_ledger(&options)
            .unwrap();
        assert_eq!(first.transactions, second.transactions);
        assert_eq!(printed, report(&second, &Filter::default()));
    }
}
