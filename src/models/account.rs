use std::collections::BTreeMap;

use crate::models::Amount;

/// An account and its running balance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    name: String,
    pub balance: Amount,
}

impl Account {
    pub fn get_name(&self) -> &str {
        self.name.as_str()
    }
    pub fn add(&mut self, amount: &Amount) {
        self.balance = self.balance.clone() + amount;
    }
}

impl From<&str> for Account {
    fn from(name: &str) -> Self {
        Account {
            name: String::from(name),
            balance: Amount::new(),
        }
    }
}

/// Accounts by name, created the first time they are asked for
#[derive(Debug, Clone, Default)]
pub struct Accounts {
    list: BTreeMap<String, Account>,
}

impl Accounts {
    pub fn new() -> Self {
        Accounts {
            list: BTreeMap::new(),
        }
    }

    pub fn get(&mut self, name: &str) -> &mut Account {
        self.list
            .entry(name.to_string())
            .or_insert_with(|| Account::from(name))
    }

    /// Sum of every balance
    pub fn balance(&self) -> Amount {
        self.list.values().map(|a| &a.balance).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.list.values()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}
