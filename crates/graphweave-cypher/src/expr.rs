//! Expression and boolean-predicate algebra
//!
//! Expressions are immutable values combined by pure constructors. The
//! boolean side (comparisons, AND/OR/NOT, existential subqueries, list
//! predicates) always parenthesizes n-ary connectives, so composed
//! predicates never change meaning through precedence.

use crate::pattern::Pattern;
use crate::scope::{Param, Variable};
use graphweave_core::CypherValue;
use std::fmt;

/// Comparison operators between two expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Contains,
    StartsWith,
    EndsWith,
}

impl Comparator {
    fn symbol(&self) -> &'static str {
        match self {
            Comparator::Eq => "=",
            Comparator::Lt => "<",
            Comparator::Lte => "<=",
            Comparator::Gt => ">",
            Comparator::Gte => ">=",
            Comparator::In => "IN",
            Comparator::Contains => "CONTAINS",
            Comparator::StartsWith => "STARTS WITH",
            Comparator::EndsWith => "ENDS WITH",
        }
    }
}

/// List predicate functions over a collected list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPredicateKind {
    All,
    Any,
    Single,
    None,
}

impl ListPredicateKind {
    fn function(&self) -> &'static str {
        match self {
            ListPredicateKind::All => "all",
            ListPredicateKind::Any => "any",
            ListPredicateKind::Single => "single",
            ListPredicateKind::None => "none",
        }
    }
}

/// An entry of a map projection: `.title` or `alias: expr`
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionItem {
    /// `.field` shorthand
    Property(String),
    /// `alias: <expr>`
    Aliased(String, Expr),
}

/// A Cypher expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Bound variable reference
    Variable(Variable),
    /// Parameter reference
    Param(Param),
    /// Inline literal
    Literal(CypherValue),
    /// Property access: `<base>.<name>`
    Property { base: Box<Expr>, name: String },
    /// Function call, including dotted names like `point.distance`
    Function { name: String, args: Vec<Expr> },
    /// Addition, used for temporal offset comparisons
    Add(Box<Expr>, Box<Expr>),
    /// Map literal: `{ key: expr, ... }`
    Map(Vec<(String, Expr)>),
    /// Map projection: `this0 { .title, alias: expr }`
    MapProjection {
        variable: Variable,
        items: Vec<ProjectionItem>,
    },
    /// List literal
    List(Vec<Expr>),
    /// List comprehension: `[x IN <list> | <projection>]`
    ListComprehension {
        variable: String,
        list: Box<Expr>,
        projection: Box<Expr>,
    },
    /// Pattern comprehension: `[<pattern> WHERE <filter> | <projection>]`
    PatternComprehension {
        pattern: Pattern,
        filter: Option<Box<Expr>>,
        projection: Box<Expr>,
    },
    /// Binary comparison
    Comparison {
        left: Box<Expr>,
        comparator: Comparator,
        right: Box<Expr>,
    },
    /// N-ary conjunction; constructors guarantee at least two operands
    And(Vec<Expr>),
    /// N-ary disjunction; constructors guarantee at least two operands
    Or(Vec<Expr>),
    /// Negation
    Not(Box<Expr>),
    /// Existential subquery: `EXISTS { MATCH <pattern> WHERE <filter> }`
    Exists {
        pattern: Pattern,
        filter: Option<Box<Expr>>,
    },
    /// List predicate: `single(x IN <list> WHERE <filter>)`
    ListPredicate {
        kind: ListPredicateKind,
        variable: Variable,
        list: Box<Expr>,
        filter: Box<Expr>,
    },
}

impl Expr {
    /// Variable reference
    pub fn variable(variable: &Variable) -> Self {
        Expr::Variable(variable.clone())
    }

    /// Parameter reference
    pub fn param(param: &Param) -> Self {
        Expr::Param(param.clone())
    }

    /// Inline literal
    pub fn literal<V: Into<CypherValue>>(value: V) -> Self {
        Expr::Literal(value.into())
    }

    /// Property access on a variable
    pub fn property(variable: &Variable, name: &str) -> Self {
        Expr::Variable(variable.clone()).dot(name)
    }

    /// Property access on any base expression
    pub fn dot(self, name: &str) -> Self {
        Expr::Property {
            base: Box::new(self),
            name: name.to_string(),
        }
    }

    /// Function call
    pub fn function<S: Into<String>>(name: S, args: Vec<Expr>) -> Self {
        Expr::Function {
            name: name.into(),
            args,
        }
    }

    /// `collect(<expr>)`
    pub fn collect(expr: Expr) -> Self {
        Expr::function("collect", vec![expr])
    }

    /// `size(<expr>)`
    pub fn size(expr: Expr) -> Self {
        Expr::function("size", vec![expr])
    }

    /// `head(<expr>)`
    pub fn head(expr: Expr) -> Self {
        Expr::function("head", vec![expr])
    }

    /// `id(<expr>)`
    pub fn id(expr: Expr) -> Self {
        Expr::function("id", vec![expr])
    }

    /// Binary comparison
    pub fn compare(left: Expr, comparator: Comparator, right: Expr) -> Self {
        Expr::Comparison {
            left: Box::new(left),
            comparator,
            right: Box::new(right),
        }
    }

    /// Conjunction. An empty operand list compiles to the always-true
    /// guard; a single operand is returned unwrapped.
    pub fn and(mut operands: Vec<Expr>) -> Self {
        match operands.len() {
            0 => Expr::literal(true),
            1 => operands.remove(0),
            _ => Expr::And(operands),
        }
    }

    /// Disjunction. An empty operand list compiles to the always-false
    /// guard; a single operand is returned unwrapped.
    pub fn or(mut operands: Vec<Expr>) -> Self {
        match operands.len() {
            0 => Expr::literal(false),
            1 => operands.remove(0),
            _ => Expr::Or(operands),
        }
    }

    /// Negation
    pub fn not(operand: Expr) -> Self {
        Expr::Not(Box::new(operand))
    }

    /// Existential subquery over a pattern
    pub fn exists(pattern: Pattern, filter: Option<Expr>) -> Self {
        Expr::Exists {
            pattern,
            filter: filter.map(Box::new),
        }
    }

    /// List predicate over a collected list
    pub fn list_predicate(
        kind: ListPredicateKind,
        variable: Variable,
        list: Expr,
        filter: Expr,
    ) -> Self {
        Expr::ListPredicate {
            kind,
            variable,
            list: Box::new(list),
            filter: Box::new(filter),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Variable(variable) => write!(f, "{variable}"),
            Expr::Param(param) => write!(f, "{param}"),
            Expr::Literal(value) => write!(f, "{value}"),
            Expr::Property { base, name } => write!(f, "{base}.{name}"),
            Expr::Function { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Expr::Add(left, right) => write!(f, "{left} + {right}"),
            Expr::Map(entries) => {
                if entries.is_empty() {
                    return write!(f, "{{ }}");
                }
                write!(f, "{{ ")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, " }}")
            }
            Expr::MapProjection { variable, items } => {
                write!(f, "{variable} {{ ")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match item {
                        ProjectionItem::Property(name) => write!(f, ".{name}")?,
                        ProjectionItem::Aliased(alias, expr) => write!(f, "{alias}: {expr}")?,
                    }
                }
                write!(f, " }}")
            }
            Expr::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Expr::ListComprehension {
                variable,
                list,
                projection,
            } => write!(f, "[{variable} IN {list} | {projection}]"),
            Expr::PatternComprehension {
                pattern,
                filter,
                projection,
            } => {
                write!(f, "[{pattern}")?;
                if let Some(filter) = filter {
                    write!(f, " WHERE {filter}")?;
                }
                write!(f, " | {projection}]")
            }
            Expr::Comparison {
                left,
                comparator,
                right,
            } => write!(f, "{left} {} {right}", comparator.symbol()),
            Expr::And(operands) => {
                write!(f, "(")?;
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, " AND ")?;
                    }
                    write!(f, "{operand}")?;
                }
                write!(f, ")")
            }
            Expr::Or(operands) => {
                write!(f, "(")?;
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, " OR ")?;
                    }
                    write!(f, "{operand}")?;
                }
                write!(f, ")")
            }
            Expr::Not(operand) => write!(f, "NOT ({operand})"),
            Expr::Exists { pattern, filter } => {
                write!(f, "EXISTS {{ MATCH {pattern}")?;
                if let Some(filter) = filter {
                    write!(f, " WHERE {filter}")?;
                }
                write!(f, " }}")
            }
            Expr::ListPredicate {
                kind,
                variable,
                list,
                filter,
            } => write!(
                f,
                "{}({variable} IN {list} WHERE {filter})",
                kind.function()
            ),
        }
    }
}
