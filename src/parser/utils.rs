//! Helpers for the line grammar shared by postings and trigger actions

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::models::PostingType;
use crate::ParseErrorKind;

pub(super) fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

pub(super) fn is_indented(line: &str) -> bool {
    line.starts_with(|c: char| c == ' ' || c == '\t')
}

pub(super) fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Byte length of the leading whitespace
pub(super) fn indentation(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Splits a line on the first `;`, returns the trimmed content and comment
pub(super) fn get_comment(line: &str) -> (&str, &str) {
    match line.split_once(';') {
        Some((content, comment)) => (content.trim(), comment.trim()),
        None => (line.trim(), ""),
    }
}

/// Splits on tabs or runs of at least two spaces, every field comes with its byte offset
pub(super) fn split_fields(content: &str) -> Vec<(usize, &str)> {
    lazy_static! {
        static ref RE_SEPARATOR: Regex = Regex::new(r"[ \t]*\t[ \t]*| {2,}").unwrap();
    }
    let mut fields = vec![];
    let mut start = 0;
    for separator in RE_SEPARATOR.find_iter(content) {
        fields.push((start, &content[start..separator.start()]));
        start = separator.end();
    }
    fields.push((start, &content[start..]));
    fields
}

/// Reads the posting kind from the brackets around the account
pub(super) fn parse_kind_and_account(field: &str) -> Result<(PostingType, &str), ParseErrorKind> {
    let (kind, name) = match field.chars().next() {
        Some('(') => match field.strip_suffix(')') {
            Some(inner) => (PostingType::Virtual, &inner[1..]),
            None => return Err(ParseErrorKind::UnmatchedBracket('(')),
        },
        Some('[') => match field.strip_suffix(']') {
            Some(inner) => (PostingType::VirtualMustBalance, &inner[1..]),
            None => return Err(ParseErrorKind::UnmatchedBracket('[')),
        },
        _ => {
            for (open, close) in [('(', ')'), ('[', ']')].iter() {
                if field.ends_with(*close) && !field.contains(*open) {
                    return Err(ParseErrorKind::UnmatchedBracket(*close));
                }
            }
            (PostingType::Real, field)
        }
    };
    let name = name.trim();
    match name.is_empty() {
        true => Err(ParseErrorKind::EmptyAccount),
        false => Ok((kind, name)),
    }
}

pub(crate) fn parse_date(date: &str) -> Result<NaiveDate, ParseErrorKind> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ParseErrorKind::InvalidDate(date.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments() {
        assert_eq!(get_comment("\tAssets:Bank\t$10 ; pay; day "), ("Assets:Bank\t$10", "pay; day"));
        assert_eq!(get_comment("  Assets:Bank  "), ("Assets:Bank", ""));
    }

    #[test]
    fn fields() {
        assert_eq!(split_fields("Assets:Bank\t$10"), vec![(0, "Assets:Bank"), (12, "$10")]);
        assert_eq!(split_fields("Assets:My Bank  -3"), vec![(0, "Assets:My Bank"), (16, "-3")]);
        assert_eq!(split_fields("Assets:Bank \t 1"), vec![(0, "Assets:Bank"), (14, "1")]);
        assert_eq!(split_fields("Expenses:Food"), vec![(0, "Expenses:Food")]);
        assert_eq!(split_fields("a\t1\t2").len(), 3);
    }

    #[test]
    fn kinds() {
        assert_eq!(
            parse_kind_and_account("(Budget:Food)"),
            Ok((PostingType::Virtual, "Budget:Food"))
        );
        assert_eq!(
            parse_kind_and_account("[Savings]"),
            Ok((PostingType::VirtualMustBalance, "Savings"))
        );
        assert_eq!(
            parse_kind_and_account("Expenses:Food (Misc)"),
            Ok((PostingType::Real, "Expenses:Food (Misc)"))
        );
        assert_eq!(
            parse_kind_and_account("(Budget"),
            Err(ParseErrorKind::UnmatchedBracket('('))
        );
        assert_eq!(
            parse_kind_and_account("Budget]"),
            Err(ParseErrorKind::UnmatchedBracket(']'))
        );
        assert_eq!(parse_kind_and_account("[ ]"), Err(ParseErrorKind::EmptyAccount));
    }

    #[test]
    fn dates() {
        assert_eq!(parse_date("2024-02-29"), Ok(NaiveDate::from_ymd(2024, 2, 29)));
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("2024/01/01").is_err());
    }
}
