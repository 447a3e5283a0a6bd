//! FILTER expressions.

use std::fmt;

use super::entity::{Entity, Variable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Regex,
    Lang,
    LangMatches,
    Str,
    Bound,
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::Regex => "regex",
            Function::Lang => "lang",
            Function::LangMatches => "langMatches",
            Function::Str => "str",
            Function::Bound => "BOUND",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    Entity(Entity),
    Compare {
        left: Box<Expression>,
        op: CompareOp,
        right: Box<Expression>,
    },
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
    Call {
        function: Function,
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn entity(entity: impl Into<Entity>) -> Self {
        Expression::Entity(entity.into())
    }

    pub fn compare(left: Expression, op: CompareOp, right: Expression) -> Self {
        Expression::Compare {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Expression::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Expression::Or(Box::new(left), Box::new(right))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Expression) -> Self {
        Expression::Not(Box::new(inner))
    }

    pub fn call(function: Function, args: Vec<Expression>) -> Self {
        Expression::Call { function, args }
    }

    pub fn bound(variable: Variable) -> Self {
        Expression::call(Function::Bound, vec![Expression::entity(variable)])
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Expression::Entity(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Entity(e) => write!(f, "{e}"),
            Expression::Compare { left, op, right } => {
                write!(f, "{left} {} {right}", op.as_str())
            }
            Expression::And(l, r) => write!(f, "({l} && {r})"),
            Expression::Or(l, r) => write!(f, "({l} || {r})"),
            Expression::Not(inner) => write!(f, "!{inner}"),
            Expression::Call { function, args } => {
                write!(f, "{}(", function.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}
