use log::debug;

use crate::models::{Transaction, Trigger, Verdict};
use crate::{CycleError, TriggerError};

/// Runs every trigger against every posting, including the postings the triggers generate.
///
/// Postings are visited by index and the length is read again on every step, so whatever gets
/// appended while walking a transaction is visited too. A trigger never looks at the postings it
/// generated itself. A transaction that goes over `cycle_limit` postings because of a trigger
/// stops everything, the check only runs after a posting made some trigger fire.
pub fn apply_triggers(
    triggers: &[Trigger],
    transactions: &mut [Transaction],
    cycle_limit: usize,
) -> Result<(), TriggerError> {
    if triggers.is_empty() {
        return Ok(());
    }
    for transaction in transactions.iter_mut() {
        let mut i = 0;
        while i < transaction.postings.len() {
            let before = transaction.postings.len();
            for trigger in triggers.iter() {
                let posting = &transaction.postings[i];
                if posting.generated_by == Some(trigger.id) {
                    continue;
                }
                let captures = match trigger.matches(transaction, posting)? {
                    Verdict::NoMatch => continue,
                    Verdict::Match(captures) => captures,
                };
                let source = posting.clone();
                debug!(
                    "trigger {} fired on {} ({})",
                    trigger.id, source.account, transaction.description
                );
                for action in trigger.actions.iter() {
                    let mut generated =
                        action
                            .execute(&source, &captures)
                            .ok_or_else(|| TriggerError::ElidedSource {
                                trigger: trigger.id,
                                account: source.account.clone(),
                            })?;
                    generated.generated_by = Some(trigger.id);
                    generated.generated_from = Some(i + 1);
                    transaction.postings.push(generated);
                }
            }
            if transaction.postings.len() > before && transaction.postings.len() > cycle_limit {
                return Err(CycleError {
                    limit: cycle_limit,
                    transaction: transaction.to_string(),
                }
                .into());
            }
            i += 1;
        }
    }
    Ok(())
}
