//! Clause algebra and program rendering
//!
//! A compiled program is a flat list of clauses rendered one per line;
//! CALL subquery bodies indent by four spaces. Clauses are immutable values
//! built by pure composition, so sub-programs can be rendered and tested in
//! isolation before concatenation.

use crate::expr::Expr;
use crate::pattern::Pattern;
use crate::scope::{Param, Variable};
use std::fmt::Write as _;

/// Sort order of an ORDER BY item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// One projected item of a WITH or RETURN clause
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Pass a variable through unchanged
    Variable(Variable),
    /// `<expr> AS <variable>`
    Aliased(Expr, Variable),
}

impl Item {
    fn render(&self) -> String {
        match self {
            Item::Variable(variable) => variable.to_string(),
            Item::Aliased(expr, variable) => format!("{expr} AS {variable}"),
        }
    }
}

/// A WITH clause; ORDER BY / SKIP / LIMIT render on following lines
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WithClause {
    pub wildcard: bool,
    pub items: Vec<Item>,
    pub order_by: Vec<(Expr, SortOrder)>,
    pub skip: Option<Param>,
    pub limit: Option<Param>,
}

impl WithClause {
    /// `WITH <items>`
    pub fn items(items: Vec<Item>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// `WITH *`
    pub fn wildcard() -> Self {
        Self {
            wildcard: true,
            ..Self::default()
        }
    }

    /// Append ORDER BY items
    pub fn order_by(mut self, order_by: Vec<(Expr, SortOrder)>) -> Self {
        self.order_by = order_by;
        self
    }

    /// Attach a SKIP parameter
    pub fn skip(mut self, skip: Option<Param>) -> Self {
        self.skip = skip;
        self
    }

    /// Attach a LIMIT parameter
    pub fn limit(mut self, limit: Option<Param>) -> Self {
        self.limit = limit;
        self
    }
}

/// A single program clause
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// `MATCH <pattern>` / `OPTIONAL MATCH <pattern>` with optional WHERE
    Match {
        pattern: Pattern,
        optional: bool,
        predicate: Option<Expr>,
    },
    /// `WITH ...`
    With(WithClause),
    /// `UNWIND <list> AS <variable>`
    Unwind { list: Expr, alias: Variable },
    /// `RETURN <items>`
    Return { items: Vec<Item> },
    /// `CALL { WITH <imports> ... }`
    Call {
        imports: Vec<Variable>,
        body: Vec<Clause>,
    },
}

impl Clause {
    /// Plain MATCH without a predicate
    pub fn match_pattern(pattern: Pattern) -> Self {
        Clause::Match {
            pattern,
            optional: false,
            predicate: None,
        }
    }

    /// MATCH with an optional WHERE predicate
    pub fn match_where(pattern: Pattern, predicate: Option<Expr>) -> Self {
        Clause::Match {
            pattern,
            optional: false,
            predicate,
        }
    }

    /// RETURN a single aliased expression
    pub fn return_aliased(expr: Expr, variable: Variable) -> Self {
        Clause::Return {
            items: vec![Item::Aliased(expr, variable)],
        }
    }

    fn render(&self, out: &mut String, indent: usize) {
        let pad = "    ".repeat(indent);
        match self {
            Clause::Match {
                pattern,
                optional,
                predicate,
            } => {
                let keyword = if *optional { "OPTIONAL MATCH" } else { "MATCH" };
                let _ = writeln!(out, "{pad}{keyword} {pattern}");
                if let Some(predicate) = predicate {
                    let _ = writeln!(out, "{pad}WHERE {predicate}");
                }
            }
            Clause::With(with) => {
                let rendered: Vec<String> = with.items.iter().map(Item::render).collect();
                if with.wildcard {
                    let _ = writeln!(out, "{pad}WITH *");
                } else {
                    let _ = writeln!(out, "{pad}WITH {}", rendered.join(", "));
                }
                if !with.order_by.is_empty() {
                    let order: Vec<String> = with
                        .order_by
                        .iter()
                        .map(|(expr, order)| format!("{expr} {}", order.keyword()))
                        .collect();
                    let _ = writeln!(out, "{pad}ORDER BY {}", order.join(", "));
                }
                if let Some(skip) = &with.skip {
                    let _ = writeln!(out, "{pad}SKIP {skip}");
                }
                if let Some(limit) = &with.limit {
                    let _ = writeln!(out, "{pad}LIMIT {limit}");
                }
            }
            Clause::Unwind { list, alias } => {
                let _ = writeln!(out, "{pad}UNWIND {list} AS {alias}");
            }
            Clause::Return { items } => {
                let rendered: Vec<String> = items.iter().map(Item::render).collect();
                let _ = writeln!(out, "{pad}RETURN {}", rendered.join(", "));
            }
            Clause::Call { imports, body } => {
                let _ = writeln!(out, "{pad}CALL {{");
                if !imports.is_empty() {
                    let names: Vec<String> =
                        imports.iter().map(ToString::to_string).collect();
                    let _ = writeln!(out, "{pad}    WITH {}", names.join(", "));
                }
                for clause in body {
                    clause.render(out, indent + 1);
                }
                let _ = writeln!(out, "{pad}}}");
            }
        }
    }
}

/// Render a clause list into final program text.
///
/// Deterministic given the input: no counters, no environment, no trailing
/// newline.
pub fn render_program(clauses: &[Clause]) -> String {
    let mut out = String::new();
    for clause in clauses {
        clause.render(&mut out, 0);
    }
    if out.ends_with('\n') {
        out.pop();
    }
    out
}
