//! Request-scoped variable and parameter allocation
//!
//! Each compilation owns exactly one [`Scope`]. Variable and parameter names
//! are allocated monotonically and never reused, so no generated name shadows
//! another anywhere in the program, however deep the nesting. Nothing here is
//! process-global; reentrancy falls out of each request owning its scope.

use graphweave_core::CypherValue;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A bound graph variable
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Variable {
    /// Allocator-generated variable, rendered as `this<n>`
    Indexed(usize),
    /// Fixed-name variable (`this`, `edge`, `edges`, `totalCount`)
    Named(String),
}

impl Variable {
    /// Create a fixed-name variable
    pub fn named<S: Into<String>>(name: S) -> Self {
        Variable::Named(name.into())
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Indexed(n) => write!(f, "this{n}"),
            Variable::Named(name) => write!(f, "{name}"),
        }
    }
}

/// A named parameter reference, rendered as `$param<n>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param(pub(crate) String);

impl Param {
    /// The bare parameter name, without the `$` sigil
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Allocator for one compilation request
#[derive(Debug, Default)]
pub struct Scope {
    next_variable: usize,
    next_param: usize,
    params: BTreeMap<String, CypherValue>,
}

impl Scope {
    /// Create a fresh scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next variable (`this0`, `this1`, ...)
    pub fn variable(&mut self) -> Variable {
        let variable = Variable::Indexed(self.next_variable);
        self.next_variable += 1;
        variable
    }

    /// Intern a literal value as the next parameter (`param0`, `param1`, ...)
    pub fn param(&mut self, value: CypherValue) -> Param {
        let name = format!("param{}", self.next_param);
        self.next_param += 1;
        self.params.insert(name.clone(), value);
        Param(name)
    }

    /// Number of parameters interned so far
    pub fn param_count(&self) -> usize {
        self.next_param
    }

    /// Consume the scope, yielding the flat parameter map
    pub fn into_params(self) -> BTreeMap<String, CypherValue> {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_are_monotonic() {
        let mut scope = Scope::new();
        assert_eq!(scope.variable().to_string(), "this0");
        assert_eq!(scope.variable().to_string(), "this1");
        assert_eq!(scope.variable().to_string(), "this2");
    }

    #[test]
    fn test_params_are_interned() {
        let mut scope = Scope::new();
        let p0 = scope.param("Ada".into());
        let p1 = scope.param(CypherValue::Integer(3));
        assert_eq!(p0.to_string(), "$param0");
        assert_eq!(p1.to_string(), "$param1");

        let params = scope.into_params();
        assert_eq!(params["param0"], "Ada".into());
        assert_eq!(params["param1"], CypherValue::Integer(3));
    }

    #[test]
    fn test_scopes_are_independent() {
        let mut a = Scope::new();
        let mut b = Scope::new();
        a.variable();
        assert_eq!(b.variable().to_string(), "this0");
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_names_never_collide(vars in 0usize..64, params in 0usize..64) {
            let mut scope = Scope::new();
            let mut names = std::collections::HashSet::new();
            for _ in 0..vars {
                prop_assert!(names.insert(scope.variable().to_string()));
            }
            for _ in 0..params {
                prop_assert!(names.insert(scope.param(CypherValue::Null).to_string()));
            }
            prop_assert_eq!(scope.into_params().len(), params);
        }
    }
}
