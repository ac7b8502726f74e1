use assert_cmd::Command;
use common::{test_args, test_err};
mod common;

const DEMO: &str = "tests/example_files/demo.ledger";

fn run(args: &[&str]) -> (String, String, Option<i32>) {
    let assert = Command::cargo_bin("tally")
        .unwrap()
        .args(args)
        .arg("--args-only")
        .assert();
    let output = assert.get_output();
    (
        String::from_utf8(output.stdout.to_owned()).unwrap(),
        String::from_utf8(output.stderr.to_owned()).unwrap(),
        output.status.code(),
    )
}

#[test]
fn balance() {
    let (output, _, code) = run(&["bal", "-f", DEMO]);
    assert_eq!(code, Some(0));
    let expected = vec![
        "         $400.00 Assets:Bank",
        "         $-50.50 Assets:Cash",
        "        $-600.00 Budget:FY2324",
        "         $-50.50 Budget:FY2425",
        "          $50.50 Expenses:Food",
        "         $600.00 Expenses:Rent",
        "       $-1000.00 Income:Salary",
        "        $-200.00 Tax:Payable",
        "         $200.00 Tax:Withheld",
        "---------------- Total",
        "        $-650.50",
    ];
    assert_eq!(output.lines().collect::<Vec<&str>>(), expected);
}

#[test]
fn real_postings_balance_to_zero() {
    let (output, _, _) = run(&["balance", "-f", DEMO, "--real"]);
    assert_eq!(output.lines().count(), 7);
    assert_eq!(output.lines().last(), Some("           $0.00"));
}

#[test]
fn date_filters() {
    let (output, _, _) = run(&[
        "bal",
        "-f",
        DEMO,
        "-b",
        "2024-02-01",
        "-e",
        "2024-08-01",
        "--force-color",
    ]);
    assert_eq!(output.lines().count(), 5);
}

#[test]
fn register() {
    let (output, _, code) = run(&["reg", "-f", DEMO, "-a", "Bank"]);
    assert_eq!(code, Some(0));
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("24-Jan-01 Paycheck"));
    assert!(lines[1].starts_with("24-Feb-01 Rent"));
    assert!(lines[1].ends_with("$-600.00        $400.00"));
}

#[test]
fn print_shows_generated_postings() {
    let (output, _, code) = run(&["print", "-f", DEMO]);
    assert_eq!(code, Some(0));
    assert!(output.starts_with("= /^Income:Salary$/\n\t(Tax:Withheld)\t-0.2\n"));
    assert!(output.contains("= JS p.account =~ /^Expenses:/ && { year: fy(tx.date) }\n"));
    assert!(output.contains("2024-02-01=2024-02-03 <R-02> Rent\n"));
    assert!(output.contains("\t(Budget:FY2324)\t-600; GeneratedBy=2 From=1\n"));
    assert!(output.contains("\t(Tax:Payable)\t-200; GeneratedBy=1 From=2\n"));
}

#[test]
fn print_without_triggers() {
    let (output, _, _) = run(&["print", "-f", DEMO, "--no-triggers"]);
    assert!(!output.contains("GeneratedBy"));
    let (output, _, _) = run(&["print", "-f", DEMO, "--no-balance", "--no-sort"]);
    assert!(output.contains("<P-01> Paycheck\n\tAssets:Bank\n"));
    assert!(output.find("Groceries").unwrap() < output.find("Paycheck").unwrap());
}

#[test]
fn accounts() {
    let (output, _, _) = run(&["accounts", "-f", DEMO]);
    assert_eq!(output.lines().count(), 9);
    let (output, _, _) = run(&["accounts", "-f", DEMO, "--depth", "1"]);
    assert_eq!(
        output.lines().collect::<Vec<&str>>(),
        vec!["Assets", "Budget", "Expenses", "Income", "Tax"]
    );
    let (output, _, _) = run(&["accounts", "-f", DEMO, "--real", "-a", "^(Assets|Income)"]);
    assert_eq!(output.lines().count(), 3);
}

#[test]
fn cycles_exit_with_an_error() {
    let (output, error, code) = run(&["bal", "-f", "tests/example_files/cycle.ledger"]);
    assert_eq!(code, Some(1));
    assert!(output.is_empty());
    assert!(error.contains("posting cycle detected (more than 1000 postings)"));
    let (_, error, _) = run(&[
        "bal",
        "-f",
        "tests/example_files/cycle.ledger",
        "--cycle-limit",
        "10",
    ]);
    assert!(error.contains("(more than 10 postings)"));
    assert!(error.contains("2024-01-01 Ping pong"));
}

#[test]
fn parse_errors_point_at_the_line() {
    let (_, error, code) = run(&["bal", "-f", "tests/example_files/bad_date.ledger"]);
    assert_eq!(code, Some(1));
    assert!(error.contains("invalid date \"2024-13-01\""));
    assert!(error.contains("at position 5:1"));
}

#[test]
fn every_balance_error_is_reported() {
    let (_, error, code) = run(&["bal", "-f", "tests/example_files/unbalanced.ledger"]);
    assert_eq!(code, Some(1));
    assert!(error.contains("only one elided value"));
    assert!(error.contains("instead got 1"));
    assert!(error.contains("3 balance errors"));
    let (_, _, code) = run(&[
        "bal",
        "-f",
        "tests/example_files/unbalanced.ledger",
        "--no-balance",
    ]);
    assert_eq!(code, Some(0));
}

#[test]
fn missing_file() {
    let (_, error, code) = run(&["bal", "-f", "tests/example_files/nope.ledger"]);
    assert_eq!(code, Some(1));
    assert!(error.contains("Journal file does not exist"));
}

#[test]
fn run_app_from_the_library() {
    test_args(&["bal", "-f", DEMO, "--args-only"]);
    test_args(&["reg", "-f", DEMO, "--args-only", "-t", "^R-"]);
    test_args(&[
        "bal",
        "-f",
        DEMO,
        "--init-file",
        "tests/example_files/example_tallyrc",
    ]);
    test_err(&[
        "bal",
        "--init-file",
        "tests/example_files/example_bad_tallyrc",
    ]);
    test_err(&["bal", "-f", DEMO, "--args-only", "-a", "("]);
}
