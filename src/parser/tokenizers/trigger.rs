use std::rc::Rc;

use log::debug;
use regex::Regex;

use crate::models::{Action, Matcher, Trigger};
use crate::parser::expressions::Script;
use crate::parser::utils::{indentation, is_blank, is_comment, is_indented};
use crate::parser::Tokenizer;
use crate::{ParseError, ParseErrorKind};

impl Tokenizer {
    /// Parses a trigger: one or more `= MATCHER` lines followed by the indented actions
    pub(crate) fn parse_trigger(&mut self, id: usize) -> Result<Trigger, ParseError> {
        let mut matchers = vec![];
        while let Some(line) = self.lines.get(self.line_index) {
            if let Some(header) = line.strip_prefix('=') {
                matchers.push(self.parse_matcher(header)?);
            } else if !line.starts_with('#') {
                break;
            }
            self.line_index += 1;
        }

        let mut actions = vec![];
        while let Some(line) = self.lines.get(self.line_index) {
            if is_blank(line) || !is_indented(line) {
                break;
            }
            if is_comment(line) {
                if !actions.is_empty() {
                    self.line_index += 1;
                }
                break;
            }
            let raw = self.parse_raw_posting(line)?;
            let end = raw.end;
            let multiplier = raw
                .amount
                .ok_or_else(|| self.error(ParseErrorKind::MissingMultiplier, end))?;
            actions.push(Action {
                kind: raw.kind,
                account: raw.account,
                multiplier,
                comment: raw.comment,
            });
            self.line_index += 1;
        }
        if actions.is_empty() {
            return Err(self.error(ParseErrorKind::UnterminatedTrigger, 0));
        }

        debug!(
            "trigger {} with {} matchers and {} actions",
            id,
            matchers.len(),
            actions.len()
        );
        Ok(Trigger {
            id,
            matchers,
            actions,
        })
    }

    /// `/regex/` or `JS <expression>`, `header` is what follows the `=`
    fn parse_matcher(&self, header: &str) -> Result<Matcher, ParseError> {
        let at = 1 + indentation(header);
        let header = header.trim();
        if header.len() >= 2 && header.starts_with('/') && header.ends_with('/') {
            return Regex::new(&header[1..header.len() - 1])
                .map(Matcher::Regex)
                .map_err(|e| self.error(ParseErrorKind::InvalidRegex(e.to_string()), at + 1));
        }
        match header.strip_prefix("JS") {
            Some(source) if source.is_empty() || source.starts_with(char::is_whitespace) => {
                let source = source.trim();
                let script = Script::compile(source).map_err(|e| {
                    self.error(ParseErrorKind::InvalidScript(e), at + header.len() - source.len())
                })?;
                Ok(Matcher::Script(Rc::new(script)))
            }
            _ => Err(self.error(
                ParseErrorKind::InvalidMatcherHeader(header.to_string()),
                at,
            )),
        }
    }
}
