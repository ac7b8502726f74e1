//! Tokenizers for the two kinds of blocks in a ledger file
pub(super) mod transaction;
pub(super) mod trigger;

use super::utils::{get_comment, indentation, parse_kind_and_account, split_fields};
use super::Tokenizer;
use crate::models::{Amount, PostingType};
use crate::{ParseError, ParseErrorKind};

/// The fields of a posting or trigger action line
#[derive(Debug, Clone, PartialEq)]
pub(super) struct RawPosting {
    pub kind: PostingType,
    pub account: String,
    pub amount: Option<Amount>,
    pub comment: String,
    /// Where the content ends, for errors about something missing
    pub end: usize,
}

impl Tokenizer {
    /// Parses `ACCOUNT[<TAB>AMOUNT][; comment]`
    pub(super) fn parse_raw_posting(&self, line: &str) -> Result<RawPosting, ParseError> {
        let (content, comment) = get_comment(line);
        let base = indentation(line);
        let fields = split_fields(content);
        if fields.len() > 2 {
            return Err(self.error(
                ParseErrorKind::WrongFieldCount(fields.len()),
                base + fields[2].0,
            ));
        }
        let (account_at, account_field) = fields[0];
        let (kind, account) =
            parse_kind_and_account(account_field).map_err(|e| self.error(e, base + account_at))?;
        let amount = match fields.get(1) {
            Some((at, field)) => Some(
                field
                    .parse::<Amount>()
                    .map_err(|e| self.error(e, base + at))?,
            ),
            None => None,
        };
        Ok(RawPosting {
            kind,
            account: account.to_string(),
            amount,
            comment: comment.to_string(),
            end: base + content.len(),
        })
    }
}
