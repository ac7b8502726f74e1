use log::debug;

use crate::models::{Posting, Transaction};
use crate::parser::utils::{is_blank, is_comment, is_indented, parse_date};
use crate::parser::Tokenizer;
use crate::ParseError;

impl Tokenizer {
    /// Parses a transaction: the header line and the indented postings below it
    pub(crate) fn parse_transaction(&mut self) -> Result<Transaction, ParseError> {
        let header = self.lines[self.line_index].trim_end();

        //
        // DATE[=DATE2] [<ID>] DESCRIPTION
        //
        let (dates, rest) = match header.find(char::is_whitespace) {
            Some(i) => (&header[..i], header[i..].trim()),
            None => (header, ""),
        };
        let mut transaction = match dates.split_once('=') {
            Some((date, secondary)) => {
                let mut t = Transaction::new(parse_date(date).map_err(|e| self.error(e, 0))?);
                t.secondary_date =
                    Some(parse_date(secondary).map_err(|e| self.error(e, date.len() + 1))?);
                t
            }
            None => Transaction::new(parse_date(dates).map_err(|e| self.error(e, 0))?),
        };
        match rest.strip_prefix('<').and_then(|x| x.split_once('>')) {
            Some((id, description)) if !id.is_empty() => {
                transaction.id = Some(id.to_string());
                transaction.description = description.trim().to_string();
            }
            _ => transaction.description = rest.to_string(),
        }
        self.line_index += 1;

        //
        // Go for the indented part
        //
        while let Some(line) = self.lines.get(self.line_index) {
            if is_blank(line) || !is_indented(line) {
                break;
            }
            if is_comment(line) {
                self.line_index += 1;
                break;
            }
            let raw = self.parse_raw_posting(line)?;
            let mut posting = Posting::new(&raw.account, raw.kind);
            posting.amount = raw.amount;
            posting.comment = raw.comment;
            transaction.postings.push(posting);
            self.line_index += 1;
        }
        debug!(
            "transaction {} {:?} with {} postings",
            transaction.date,
            transaction.description,
            transaction.postings.len()
        );
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::models::{Amount, PostingType};
    use crate::parser::Tokenizer;
    use crate::ParseErrorKind;

    #[test]
    fn full_header() {
        let mut tokenizer = Tokenizer::from(
            "2024-03-01=2024-03-05 <R-03> Rent for March
\tExpenses:Rent\t$1200 ; landlord
\t(Budget:Housing)\t-1200
\tAssets:Bank
",
        );
        let parsed = tokenizer.parse().unwrap();
        let t = &parsed.transactions[0];
        assert_eq!(t.date, NaiveDate::from_ymd(2024, 3, 1));
        assert_eq!(t.secondary_date, Some(NaiveDate::from_ymd(2024, 3, 5)));
        assert_eq!(t.id, Some("R-03".to_string()));
        assert_eq!(t.description, "Rent for March");
        assert_eq!(t.postings.len(), 3);
        assert_eq!(t.postings[0].comment, "landlord");
        assert_eq!(t.postings[0].amount, Some(Amount::from(1200)));
        assert_eq!(t.postings[1].kind, PostingType::Virtual);
        assert_eq!(t.postings[2].amount, None);
    }

    #[test]
    fn bare_header() {
        let mut tokenizer = Tokenizer::from("2024-01-01\n  Assets:Cash  5\n  Equity\n");
        let t = &tokenizer.parse().unwrap().transactions[0];
        assert_eq!(t.description, "");
        assert_eq!(t.id, None);
        assert_eq!(t.postings.len(), 2);
    }

    #[test]
    fn id_without_space() {
        let mut tokenizer = Tokenizer::from("2024-01-01 <7>Coffee\n");
        let t = &tokenizer.parse().unwrap().transactions[0];
        assert_eq!(t.id, Some("7".to_string()));
        assert_eq!(t.description, "Coffee");
    }

    #[test]
    fn block_ends_at_comment() {
        let mut tokenizer = Tokenizer::from(
            "2024-01-01 One\n\tA\t1\n\t# end\n\tB\t-1\n",
        );
        let err = tokenizer.parse().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedIndent);
        assert_eq!(err.line, 4);
    }

    #[test]
    fn invalid_dates() {
        let err = Tokenizer::from("2024-13-01 Nope\n").parse().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidDate("2024-13-01".to_string()));
        assert_eq!(err.column, 1);

        let err = Tokenizer::from("2024-01-01=2024-02-30 Nope\n").parse().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidDate("2024-02-30".to_string()));
        assert_eq!(err.column, 12);
    }
}
