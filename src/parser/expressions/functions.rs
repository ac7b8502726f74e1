use chrono::{Datelike, NaiveDate};

use super::EvalResult;

/// Fiscal year label of a date, the fiscal year starts in July.
///
/// `2024-03-31` is in `FY2324`, `2024-07-01` in `FY2425`.
pub(super) fn fy(args: &[EvalResult]) -> Result<EvalResult<'static>, String> {
    let date = match args {
        [EvalResult::Date(d)] => *d,
        [EvalResult::String(s)] => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| format!("fy: invalid date {:?}", s))?,
        [x] => return Err(format!("fy: expected a date, found {}", x.type_name())),
        _ => return Err(format!("fy: expected one argument, found {}", args.len())),
    };
    let year = date.year();
    let start = if date.month() <= 6 { year - 1 } else { year };
    Ok(EvalResult::String(format!(
        "FY{:02}{:02}",
        start.rem_euclid(100),
        (start + 1).rem_euclid(100)
    )))
}
