use num::BigRational;
use pest::iterators::{Pair, Pairs};
use regex::Regex;

use super::{Binary, Rule, Unary};
use crate::models::Amount;

#[derive(Clone, Debug)]
pub enum Node {
    Null,
    Boolean(bool),
    Number(BigRational),
    String(String),
    Regex(Regex),
    Variable(String),
    Member {
        object: Box<Node>,
        field: String,
    },
    Function {
        name: String,
        args: Vec<Node>,
    },
    Object(Vec<(String, Node)>),
    UnaryExpr {
        op: Unary,
        child: Box<Node>,
    },
    BinaryExpr {
        op: Binary,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    Ternary {
        condition: Box<Node>,
        then: Box<Node>,
        otherwise: Box<Node>,
    },
}

fn next<'i>(pairs: &mut Pairs<'i, Rule>) -> Result<Pair<'i, Rule>, String> {
    pairs
        .next()
        .ok_or_else(|| "unexpected end of expression".to_string())
}

/// Strips the delimiters of a string or regex literal
fn unquote(literal: &str) -> &str {
    &literal[1..literal.len() - 1]
}

/// Build an abstract syntax tree from an expression
pub(super) fn build_ast_from_expr(pair: Pair<Rule>) -> Result<Node, String> {
    let rule = pair.as_rule();
    match rule {
        Rule::expr | Rule::primary => build_ast_from_expr(next(&mut pair.into_inner())?),
        Rule::ternary_expr => {
            let mut inner = pair.into_inner();
            let condition = build_ast_from_expr(next(&mut inner)?)?;
            match inner.next() {
                None => Ok(condition),
                Some(then) => Ok(Node::Ternary {
                    condition: Box::new(condition),
                    then: Box::new(build_ast_from_expr(then)?),
                    otherwise: Box::new(build_ast_from_expr(next(&mut inner)?)?),
                }),
            }
        }
        Rule::comparison_expr
        | Rule::or_expr
        | Rule::and_expr
        | Rule::additive_expr
        | Rule::multiplicative_expr => {
            // left associative
            let mut inner = pair.into_inner();
            let mut lhs = build_ast_from_expr(next(&mut inner)?)?;
            while let Some(op) = inner.next() {
                let rhs = build_ast_from_expr(next(&mut inner)?)?;
                lhs = Node::BinaryExpr {
                    op: parse_binary(op.as_str())?,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
            }
            Ok(lhs)
        }
        Rule::unary_expr => {
            let mut ops = vec![];
            let mut child = None;
            for part in pair.into_inner() {
                match part.as_rule() {
                    Rule::unary => ops.push(match part.as_str() {
                        "-" => Unary::Neg,
                        _ => Unary::Not,
                    }),
                    _ => child = Some(build_ast_from_expr(part)?),
                }
            }
            let mut node = child.ok_or_else(|| "missing operand".to_string())?;
            for op in ops.into_iter().rev() {
                node = Node::UnaryExpr {
                    op,
                    child: Box::new(node),
                };
            }
            Ok(node)
        }
        Rule::postfix_expr => {
            let mut inner = pair.into_inner();
            let mut node = build_ast_from_expr(next(&mut inner)?)?;
            for member in inner {
                node = Node::Member {
                    object: Box::new(node),
                    field: next(&mut member.into_inner())?.as_str().to_string(),
                };
            }
            Ok(node)
        }
        Rule::call => {
            let mut inner = pair.into_inner();
            let name = next(&mut inner)?.as_str().to_string();
            let args = inner
                .map(build_ast_from_expr)
                .collect::<Result<Vec<Node>, String>>()?;
            Ok(Node::Function { name, args })
        }
        Rule::object => {
            let mut entries = vec![];
            for entry in pair.into_inner() {
                let mut inner = entry.into_inner();
                let key = next(&mut inner)?;
                let key = match key.as_rule() {
                    Rule::string => unquote(key.as_str()).to_string(),
                    _ => key.as_str().to_string(),
                };
                entries.push((key, build_ast_from_expr(next(&mut inner)?)?));
            }
            Ok(Node::Object(entries))
        }
        Rule::number => {
            let amount: Amount = pair.as_str().parse().map_err(|e| format!("{}", e))?;
            Ok(Node::Number(amount.get_value().clone()))
        }
        Rule::string => Ok(Node::String(unquote(pair.as_str()).to_string())),
        Rule::regex => {
            let pattern = unquote(pair.as_str()).replace("\\/", "/");
            Regex::new(&pattern)
                .map(Node::Regex)
                .map_err(|e| e.to_string())
        }
        Rule::boolean => Ok(Node::Boolean(pair.as_str() == "true")),
        Rule::null => Ok(Node::Null),
        Rule::identifier => Ok(Node::Variable(pair.as_str().to_string())),
        unknown => Err(format!("unexpected {:?}", unknown)),
    }
}

fn parse_binary(op: &str) -> Result<Binary, String> {
    Ok(match op {
        "||" | "or" => Binary::Or,
        "&&" | "and" => Binary::And,
        "==" | "===" => Binary::Eq,
        "!=" | "!==" => Binary::Ne,
        "=~" => Binary::Match,
        "!~" => Binary::NotMatch,
        "<" => Binary::Lt,
        ">" => Binary::Gt,
        "<=" => Binary::Le,
        ">=" => Binary::Ge,
        "+" => Binary::Add,
        "-" => Binary::Subtract,
        "*" => Binary::Mult,
        "/" => Binary::Div,
        x => return Err(format!("unknown operator {}", x)),
    })
}
