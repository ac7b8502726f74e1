//! Scripts for trigger matchers
//!
//! A script is an expression evaluated with the transaction (`tx`) and the candidate posting
//! (`p`) in scope. Its value decides the match:
//! - `null` or `undefined`: no match
//! - a boolean: match if true, without captures
//! - an object: match, with its entries as captures
//!
//! Anything else is an error. The only function available to a script is `fy`, registered in the
//! [`Sandbox`] when the script is compiled.
mod functions;
mod node;
mod result;

pub use node::Node;
pub use result::EvalResult;

use std::collections::HashMap;
use std::fmt;

use log::debug;
use num::Zero;
use pest::Parser;

use crate::models::{Captures, Posting, Predicate, Transaction, Verdict};
use crate::RuleError;
use node::build_ast_from_expr;

#[derive(Parser)]
#[grammar = "grammar/script.pest"]
pub struct ScriptParser;

/// A function the host makes available to scripts
pub type HostFunction = fn(&[EvalResult]) -> Result<EvalResult<'static>, String>;

/// The global scope of a script
#[derive(Clone)]
pub struct Sandbox {
    globals: HashMap<&'static str, HostFunction>,
}

impl Sandbox {
    pub fn new() -> Self {
        let mut sandbox = Sandbox {
            globals: HashMap::new(),
        };
        sandbox.register("fy", functions::fy);
        sandbox
    }

    pub fn register(&mut self, name: &'static str, function: HostFunction) {
        self.globals.insert(name, function);
    }

    fn call<'a>(&self, name: &str, args: &[EvalResult<'a>]) -> Result<EvalResult<'a>, String> {
        match self.globals.get(name) {
            Some(function) => function(args),
            None => Err(format!("{} is not defined", name)),
        }
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Sandbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&&str> = self.globals.keys().collect();
        names.sort();
        f.debug_struct("Sandbox").field("globals", &names).finish()
    }
}

/// A compiled script
#[derive(Debug, Clone)]
pub struct Script {
    source: String,
    root: Node,
    sandbox: Sandbox,
}

impl Script {
    /// Compiles `source`, the error is a human readable description of the problem
    pub fn compile(source: &str) -> Result<Script, String> {
        let mut parsed = ScriptParser::parse(Rule::script, source).map_err(|e| {
            e.renamed_rules(|rule| format!("{:?}", rule))
                .to_string()
                .replace('\n', " ")
        })?;
        let expr = parsed
            .next()
            .and_then(|script| script.into_inner().next())
            .ok_or_else(|| "empty script".to_string())?;

        // Build the abstract syntax tree
        let root = build_ast_from_expr(expr)?;
        debug!("compiled script {:?}", source);
        Ok(Script {
            source: source.to_string(),
            root,
            sandbox: Sandbox::new(),
        })
    }

    pub fn eval<'a>(
        &self,
        transaction: &'a Transaction,
        posting: &'a Posting,
    ) -> Result<EvalResult<'a>, String> {
        let context = Context {
            transaction,
            posting,
            sandbox: &self.sandbox,
        };
        eval(&self.root, &context)
    }
}

impl Predicate for Script {
    fn evaluate(&self, transaction: &Transaction, posting: &Posting) -> Result<Verdict, RuleError> {
        let result = self
            .eval(transaction, posting)
            .map_err(|message| RuleError::Evaluation {
                script: self.source.clone(),
                message,
            })?;
        match result {
            EvalResult::Null => Ok(Verdict::NoMatch),
            EvalResult::Boolean(true) => Ok(Verdict::Match(Captures::new())),
            EvalResult::Boolean(false) => Ok(Verdict::NoMatch),
            EvalResult::Object(entries) => Ok(Verdict::Match(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, v.to_string()))
                    .collect(),
            )),
            x => Err(RuleError::UnsupportedReturn {
                script: self.source.clone(),
                found: x.type_name().to_string(),
            }),
        }
    }

    fn source(&self) -> &str {
        self.source.as_str()
    }
}

struct Context<'a, 's> {
    transaction: &'a Transaction,
    posting: &'a Posting,
    sandbox: &'s Sandbox,
}

#[derive(Clone, Debug)]
pub enum Unary {
    Not,
    Neg,
}

#[derive(Clone, Debug)]
pub enum Binary {
    Add,
    Subtract,
    Mult,
    Div,
    Or,
    And,
    Eq,
    Ne,
    Match,
    NotMatch,
    Ge,
    Gt,
    Le,
    Lt,
}

fn eval<'a>(node: &Node, context: &Context<'a, '_>) -> Result<EvalResult<'a>, String> {
    let res = match node {
        Node::Null => EvalResult::Null,
        Node::Boolean(b) => EvalResult::Boolean(*b),
        Node::Number(n) => EvalResult::Number(n.clone()),
        Node::String(s) => EvalResult::String(s.clone()),
        Node::Regex(r) => EvalResult::Regex(r.clone()),
        Node::Variable(name) => match name.as_str() {
            "tx" => EvalResult::Transaction(context.transaction),
            "p" => EvalResult::Posting(context.posting),
            unknown => return Err(format!("{} is not defined", unknown)),
        },
        Node::Member { object, field } => eval(object, context)?.member(field)?,
        Node::Function { name, args } => {
            let args = args
                .iter()
                .map(|x| eval(x, context))
                .collect::<Result<Vec<EvalResult>, String>>()?;
            context.sandbox.call(name, &args)?
        }
        Node::Object(entries) => {
            let mut values = Vec::with_capacity(entries.len());
            for (key, value) in entries.iter() {
                values.push((key.clone(), eval(value, context)?));
            }
            EvalResult::Object(values)
        }
        Node::Ternary {
            condition,
            then,
            otherwise,
        } => match eval(condition, context)?.is_truthy() {
            true => eval(then, context)?,
            false => eval(otherwise, context)?,
        },
        Node::UnaryExpr { op, child } => {
            let res = eval(child, context)?;
            match op {
                Unary::Not => EvalResult::Boolean(!res.is_truthy()),
                Unary::Neg => match res {
                    EvalResult::Number(n) => EvalResult::Number(-n),
                    x => return Err(format!("can't negate {}", x.type_name())),
                },
            }
        }
        Node::BinaryExpr { op, lhs, rhs } => {
            let left = eval(lhs, context)?;
            // the right hand side of a logical operator is only evaluated when needed
            match op {
                Binary::Or if left.is_truthy() => return Ok(left),
                Binary::And if !left.is_truthy() => return Ok(left),
                Binary::Or | Binary::And => return eval(rhs, context),
                _ => {}
            }
            let right = eval(rhs, context)?;
            eval_binary(op, left, right)?
        }
    };
    Ok(res)
}

fn eval_binary<'a>(
    op: &Binary,
    left: EvalResult<'a>,
    right: EvalResult<'a>,
) -> Result<EvalResult<'a>, String> {
    let mismatch = |left: &EvalResult, right: &EvalResult| {
        format!(
            "can't apply {:?} to {} and {}",
            op,
            left.type_name(),
            right.type_name()
        )
    };
    Ok(match op {
        Binary::Eq => EvalResult::Boolean(left == right),
        Binary::Ne => EvalResult::Boolean(left != right),
        Binary::Match | Binary::NotMatch => {
            let found = match (&left, &right) {
                (EvalResult::String(s), EvalResult::Regex(r)) => r.is_match(s),
                (EvalResult::Null, EvalResult::Regex(_)) => false,
                _ => return Err(mismatch(&left, &right)),
            };
            EvalResult::Boolean(match op {
                Binary::Match => found,
                _ => !found,
            })
        }
        Binary::Lt | Binary::Gt | Binary::Le | Binary::Ge => {
            let ordering = left
                .partial_cmp(&right)
                .ok_or_else(|| mismatch(&left, &right))?;
            EvalResult::Boolean(match op {
                Binary::Lt => ordering.is_lt(),
                Binary::Gt => ordering.is_gt(),
                Binary::Le => ordering.is_le(),
                _ => ordering.is_ge(),
            })
        }
        Binary::Add => match (left, right) {
            (EvalResult::Number(l), EvalResult::Number(r)) => EvalResult::Number(l + r),
            (EvalResult::String(l), r) => EvalResult::String(format!("{}{}", l, r)),
            (l, EvalResult::String(r)) => EvalResult::String(format!("{}{}", l, r)),
            (l, r) => return Err(mismatch(&l, &r)),
        },
        Binary::Subtract | Binary::Mult | Binary::Div => match (left, right) {
            (EvalResult::Number(l), EvalResult::Number(r)) => EvalResult::Number(match op {
                Binary::Subtract => l - r,
                Binary::Mult => l * r,
                _ => {
                    if r.is_zero() {
                        return Err("division by zero".to_string());
                    }
                    l / r
                }
            }),
            (l, r) => return Err(mismatch(&l, &r)),
        },
        Binary::Or | Binary::And => unreachable!("logical operators are short circuited"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Amount, PostingType};
    use chrono::NaiveDate;

    fn transaction() -> Transaction {
        let mut t = Transaction::new(NaiveDate::from_ymd(2024, 3, 15));
        t.description = "Rent March".to_string();
        t.id = Some("R-03".to_string());
        let mut p = Posting::new("Expenses:Rent", PostingType::Real);
        p.set_amount(Amount::from(1200));
        t.postings.push(p);
        t.postings
            .push(Posting::new("Assets:Bank", PostingType::Real));
        t
    }

    fn verdict(source: &str) -> Result<Verdict, RuleError> {
        let t = transaction();
        Script::compile(source).unwrap().evaluate(&t, &t.postings[0])
    }

    fn captures(source: &str) -> Captures {
        match verdict(source).unwrap() {
            Verdict::Match(caps) => caps,
            Verdict::NoMatch => panic!("{} should match", source),
        }
    }

    #[test]
    fn booleans() {
        assert_eq!(captures("true"), Captures::new());
        assert_eq!(verdict("false").unwrap(), Verdict::NoMatch);
        assert_eq!(captures("p.account =~ /^Expenses:/"), Captures::new());
        assert_eq!(verdict("p.account !~ /^Expenses:/").unwrap(), Verdict::NoMatch);
        assert_eq!(
            captures("p.amount > 1000 && tx.date.month <= 6 && p.kind == 'real'"),
            Captures::new()
        );
        assert_eq!(verdict("p.amount >= 1200.01").unwrap(), Verdict::NoMatch);
        assert_eq!(captures("not (p.amount < 0) and tx.postings === 2"), Captures::new());
    }

    #[test]
    fn null_means_no_match() {
        assert_eq!(verdict("null").unwrap(), Verdict::NoMatch);
        assert_eq!(verdict("undefined").unwrap(), Verdict::NoMatch);
        assert_eq!(verdict("tx.secondary_date").unwrap(), Verdict::NoMatch);
    }

    #[test]
    fn objects_become_captures() {
        let caps = captures(r#"{ year: fy(tx.date), "who": tx.id + "/" + p.account, n: p.amount * 0.5 }"#);
        assert_eq!(caps["year"], "FY2324");
        assert_eq!(caps["who"], "R-03/Expenses:Rent");
        assert_eq!(caps["n"], "600");
        assert_eq!(captures("{}"), Captures::new());
    }

    #[test]
    fn logical_operators_return_operands() {
        let caps = captures("p.account =~ /Rent/ && { kind: 'rent' }");
        assert_eq!(caps["kind"], "rent");
        assert_eq!(verdict("p.account =~ /Food/ && { kind: 'food' }").unwrap(), Verdict::NoMatch);
        assert_eq!(captures("null || {a: 1}")["a"], "1");
        assert_eq!(captures("tx.date.day > 10 ? {half: 'second'} : null")["half"], "second");
    }

    #[test]
    fn unsupported_return_types() {
        for source in &["1", "'a string'", "tx.date", "/x/", "p"] {
            match verdict(source) {
                Err(RuleError::UnsupportedReturn { .. }) => {}
                x => panic!("{} returned {:?}", source, x),
            }
        }
    }

    #[test]
    fn evaluation_errors() {
        for source in &[
            "nope",
            "p.nope",
            "tx.secondary_date.year",
            "p.amount / 0 > 1",
            "p.account > 1",
            "missing(1)",
            "-p.account",
            "fy(p.account)",
        ] {
            match verdict(source) {
                Err(RuleError::Evaluation { script, .. }) => assert_eq!(script, *source),
                x => panic!("{} returned {:?}", source, x),
            }
        }
    }

    #[test]
    fn elided_amount_is_null() {
        let t = transaction();
        let script = Script::compile("p.amount == null").unwrap();
        assert_eq!(
            script.evaluate(&t, &t.postings[1]).unwrap(),
            Verdict::Match(Captures::new())
        );
    }

    #[test]
    fn syntax_errors() {
        assert!(Script::compile("").is_err());
        assert!(Script::compile("p.account ==").is_err());
        assert!(Script::compile("{ a: }").is_err());
        assert!(Script::compile("p.account =~ /(/").is_err());
    }

    #[test]
    fn precedence() {
        let t = transaction();
        let p = &t.postings[0];
        let value = |source: &str| Script::compile(source).unwrap().eval(&t, p).unwrap().to_string();
        assert_eq!(value("1 + 2 * 3"), "7");
        assert_eq!(value("(1 + 2) * 3"), "9");
        assert_eq!(value("10 - 4 - 3"), "3");
        assert_eq!(value("-2 * -3"), "6");
        assert_eq!(value("1 / 4"), "0.25");
        assert_eq!(value("'a' + 1"), "a1");
        assert_eq!(value("tx.description.length"), "10");
        assert_eq!(value("!''"), "true");
    }
}
