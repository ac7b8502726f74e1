//! Document the command line interface
use std::collections::HashMap;
use std::env;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use colored::Colorize;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use structopt::StructOpt;

use crate::commands::{accounts, balance, print, register};
use crate::ledger::DEFAULT_CYCLE_LIMIT;
use crate::{Error, MissingFileError};

#[derive(Debug, StructOpt)]
enum Command {
    /// Balance report
    #[structopt(alias = "bal")]
    Balance(CommonOpts),
    /// Register report, with running balances
    #[structopt(alias = "reg")]
    Register(CommonOpts),
    /// Print the triggers and the transactions in the ledger format
    Print(CommonOpts),
    /// List the accounts
    Accounts(CommonOpts),
}

#[derive(Debug, StructOpt)]
#[structopt(about = "Plain text accounting with triggers",
version = env ! ("CARGO_PKG_VERSION"),
author = env ! ("CARGO_PKG_AUTHORS"),
name = "tally"
)]
struct Opt {
    #[structopt(subcommand)]
    cmd: Command,
}

/// Command line options
#[derive(Debug, StructOpt, Clone)]
pub struct CommonOpts {
    /// Input file
    #[structopt(name = "FILE", short = "f", long = "file", parse(from_os_str))]
    pub input_file: PathBuf,

    /// Ignore init file if it exists
    #[structopt(long = "args-only")]
    args_only: bool,

    /// Init file
    #[structopt(long = "init-file", parse(from_os_str))]
    init_file: Option<PathBuf>,

    /// Show only accounts matching this regular expression
    #[structopt(short = "a", long = "account")]
    pub account: Option<String>,

    /// Show only transactions whose description or id match this regular expression
    #[structopt(short = "t", long = "transaction")]
    pub transaction: Option<String>,

    /// Depth
    #[structopt(short = "d", long = "depth")]
    pub depth: Option<usize>,

    /// Show zero amounts and balances
    #[structopt(long = "show-zero")]
    pub show_zero: bool,

    /// Use only real postings rather than real and virtual
    #[structopt(long = "real")]
    pub real: bool,

    #[structopt(short = "b", long = "begin", parse(try_from_str = date_parser))]
    pub begin: Option<NaiveDate>,
    #[structopt(short = "e", long = "end", parse(try_from_str = date_parser))]
    pub end: Option<NaiveDate>,

    /// Don't fill elided amounts nor check that transactions balance
    #[structopt(long = "no-balance")]
    pub no_balance: bool,

    /// Don't run the triggers
    #[structopt(long = "no-triggers")]
    pub no_triggers: bool,

    /// Keep the transactions in file order
    #[structopt(long = "no-sort")]
    pub no_sort: bool,

    /// Number of postings in a single transaction at which the triggers are considered to loop
    #[structopt(long = "cycle-limit", default_value = "1000")]
    pub cycle_limit: usize,

    #[structopt(long = "force-color")]
    pub force_color: bool,
}

impl CommonOpts {
    pub fn new(input_file: PathBuf) -> Self {
        CommonOpts {
            input_file,
            args_only: false,
            init_file: None,
            account: None,
            transaction: None,
            depth: None,
            show_zero: false,
            real: false,
            begin: None,
            end: None,
            no_balance: false,
            no_triggers: false,
            no_sort: false,
            cycle_limit: DEFAULT_CYCLE_LIMIT,
            force_color: false,
        }
    }
}

const INIT_FILE_FLAG: &str = "--init-file";
const NO_INIT_FILE_FLAG: &str = "--args-only";
const INIT_FILE_UNDER_HOME: &str = "~/.tallyrc";
const INIT_FILE_HERE: &str = ".tallyrc";

/// Where to look for the init file, in order
fn init_paths(args: &[String]) -> Result<Vec<PathBuf>, Error> {
    if args.iter().any(|x| x == NO_INIT_FILE_FLAG) {
        return Ok(vec![]);
    }
    if let Some(i) = args.iter().position(|x| x == INIT_FILE_FLAG) {
        return match args.get(i + 1) {
            Some(file) => {
                let file = PathBuf::from(file);
                match file.exists() {
                    true => Ok(vec![file]),
                    false => Err(MissingFileError::ConfigFileDoesNotExistError(file).into()),
                }
            }
            None => Err(Error::from(format!("{} needs a file", INIT_FILE_FLAG))),
        };
    }
    Ok(vec![
        PathBuf::from(shellexpand::tilde(INIT_FILE_UNDER_HOME).to_string()),
        PathBuf::from(INIT_FILE_HERE),
    ])
}

/// Adds the options of the init file that are not in the command line already
fn load_init_file(file: &Path, args: &mut Vec<String>) -> Result<(), Error> {
    let mut aliases = HashMap::new();
    aliases.insert("-f", "--file");
    aliases.insert("-a", "--account");
    aliases.insert("-t", "--transaction");
    aliases.insert("-d", "--depth");
    aliases.insert("-b", "--begin");
    aliases.insert("-e", "--end");

    let bad_line = |line: &str| Error {
        message: vec![
            format!("Bad config file {:?}\n", file).bold().bright_red(),
            line.normal(),
        ],
    };
    let contents = read_to_string(file).map_err(|e| Error::from(e.to_string()))?;
    for line in contents.lines() {
        let option = line.trim();
        match option.chars().next() {
            Some('-') => {
                if !option.starts_with("--") {
                    return Err(bad_line(line));
                }
                let mut iter = option.split_whitespace();
                let name = iter.next().ok_or_else(|| bad_line(line))?;
                let given = args
                    .iter()
                    .any(|x| x == name || aliases.get(x.as_str()) == Some(&name));
                if !given {
                    args.push(name.to_string());
                    let rest = iter.collect::<Vec<&str>>().join(" ");
                    if !rest.is_empty() {
                        args.push(rest);
                    }
                }
            }
            Some(';') | Some('#') | Some('!') | Some('%') => (), // a comment
            Some(_) => return Err(bad_line(line)),
            None => (),
        }
    }
    Ok(())
}

/// Entry point for the command line app
///
/// Load the options from the init file, add them to the supplied command line options
/// and call the command accordingly.
pub fn run_app(mut args: Vec<String>) -> Result<(), ()> {
    if let Err(e) = add_init_file_options(&mut args) {
        eprintln!("{}", e);
        return Err(());
    }

    // Build options from the argument vector
    let opt: Opt = Opt::from_iter(args.iter());
    let result = match opt.cmd {
        Command::Balance(options) => {
            force_color(&options);
            balance::execute(&options, None)
        }
        Command::Register(options) => {
            force_color(&options);
            register::execute(&options, None)
        }
        Command::Print(options) => {
            force_color(&options);
            print::execute(&options, None)
        }
        Command::Accounts(options) => {
            force_color(&options);
            accounts::execute(&options, None)
        }
    };
    if let Err(e) = result {
        let err_str = format!("{}", e);
        if !err_str.is_empty() {
            eprintln!("{}", err_str);
        }
        return Err(());
    }
    Ok(())
}

fn add_init_file_options(args: &mut Vec<String>) -> Result<(), Error> {
    let config_file = init_paths(args)?.into_iter().find(|x| x.exists());
    if let Some(file) = config_file {
        debug!("reading options from {}", file.display());
        load_init_file(&file, args)?;
    }
    Ok(())
}

fn force_color(options: &CommonOpts) {
    if options.force_color {
        env::set_var("CLICOLOR_FORCE", "1");
    }
}

/// A parser for date expressions
pub fn date_parser(date: &str) -> Result<NaiveDate, Error> {
    lazy_static! {
        static ref RE_MONTH: Regex = Regex::new(r"^(\d{4})[/-](\d\d?)$").unwrap();
        static ref RE_DATE: Regex = Regex::new(r"^(\d{4})[/-](\d\d?)[/-](\d\d?)$").unwrap();
    }
    let invalid = || Error {
        message: vec![format!("Invalid date {}", date).bold().bright_red()],
    };
    let number = |x: &str| x.parse::<u32>().map_err(|_| invalid());
    if let Some(captures) = RE_DATE.captures(date) {
        NaiveDate::from_ymd_opt(
            number(&captures[1])? as i32,
            number(&captures[2])?,
            number(&captures[3])?,
        )
        .ok_or_else(invalid)
    } else if let Some(captures) = RE_MONTH.captures(date) {
        NaiveDate::from_ymd_opt(number(&captures[1])? as i32, number(&captures[2])?, 1)
            .ok_or_else(invalid)
    } else {
        match two_timer::parse(date, None) {
            Ok((t1, _t2, _b)) => Ok(t1.date()),
            Err(e) => {
                debug!("{:?}", e);
                Err(invalid())
            }
        }
    }
}
