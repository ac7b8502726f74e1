//! The reports
pub mod accounts;
pub mod balance;
pub mod print;
pub mod register;

use crate::models::Amount;

/// Dollars with two decimals, rounded half to even
fn money(amount: &Amount) -> String {
    format!("${}", amount.to_fixed(2))
}
