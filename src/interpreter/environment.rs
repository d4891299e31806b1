use crate::value::{Value, ValueType};
use std::collections::HashMap;
use std::rc::Rc;

/// A variable slot. The slot owns its value outright, so storing a string
/// copies it.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub declared: ValueType,
    pub value: Value,
}

/// Represents a single scope level in the environment.
type Scope = HashMap<Rc<str>, Variable>;

/// Stack of scopes. The bottom scope is the program's global scope and is
/// never popped. Lookups walk every scope from the innermost outwards.
#[derive(Debug, Clone)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        let mut scopes = Vec::with_capacity(8);
        scopes.push(HashMap::new());
        Self { scopes }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pops the innermost scope, dropping its variables. The global scope
    /// stays in place.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Declares `name` in the innermost scope, replacing any variable of the
    /// same name there. An initial value of another type becomes the
    /// declared type's default.
    pub fn declare(&mut self, name: Rc<str>, declared: ValueType, value: Value) {
        let value = value.coerce_to(declared);
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, Variable { declared, value });
        }
    }

    /// Binds a parameter: its type is whatever the argument turned out to be.
    pub fn bind(&mut self, name: Rc<str>, value: Value) {
        let declared = value.value_type();
        self.declare(name, declared, value);
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.scopes.iter_mut().rev().find_map(|scope| scope.get_mut(name))
    }

    /// Stores into the nearest variable called `name`.
    /// Returns false if no scope has it.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        let Some(variable) = self.get_mut(name) else {
            return false;
        };
        if variable.declared == ValueType::None {
            variable.declared = value.value_type();
            variable.value = value;
        } else {
            variable.value = value.coerce_to(variable.declared);
        }
        true
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Rc<str> {
        Rc::from(s)
    }

    #[test]
    fn test_declare_and_get() {
        let mut env = Environment::new();
        env.declare(name("x"), ValueType::Int, Value::Int(42));
        assert_eq!(env.get("x").map(|v| &v.value), Some(&Value::Int(42)));
        assert!(env.get("y").is_none());
    }

    #[test]
    fn test_declare_mismatch_uses_default() {
        let mut env = Environment::new();
        env.declare(name("s"), ValueType::String, Value::Int(1));
        assert_eq!(env.get("s").map(|v| &v.value), Some(&Value::from("")));
    }

    #[test]
    fn test_scope_push_pop() {
        let mut env = Environment::new();
        env.declare(name("x"), ValueType::Int, Value::Int(1));

        env.push_scope();
        env.declare(name("x"), ValueType::Int, Value::Int(2));
        env.declare(name("inner"), ValueType::Bool, Value::Bool(true));
        assert_eq!(env.get("x").map(|v| &v.value), Some(&Value::Int(2)));

        env.pop_scope();
        assert_eq!(env.get("x").map(|v| &v.value), Some(&Value::Int(1)));
        assert!(env.get("inner").is_none());
    }

    #[test]
    fn test_global_scope_is_never_popped() {
        let mut env = Environment::new();
        env.declare(name("g"), ValueType::Int, Value::Int(7));
        env.pop_scope();
        assert_eq!(env.depth(), 1);
        assert!(env.get("g").is_some());
    }

    #[test]
    fn test_assign_in_outer_scope() {
        let mut env = Environment::new();
        env.declare(name("x"), ValueType::Int, Value::Int(1));

        env.push_scope();
        assert!(env.assign("x", Value::Int(2)));
        env.pop_scope();

        assert_eq!(env.get("x").map(|v| &v.value), Some(&Value::Int(2)));
        assert!(!env.assign("missing", Value::Int(0)));
    }

    #[test]
    fn test_assign_coerces_to_declared_type() {
        let mut env = Environment::new();
        env.declare(name("n"), ValueType::Int, Value::Int(5));
        env.assign("n", Value::from("five"));
        assert_eq!(env.get("n").map(|v| &v.value), Some(&Value::Int(0)));
    }

    #[test]
    fn test_none_parameter_adopts_assigned_type() {
        let mut env = Environment::new();
        env.bind(name("p"), Value::None);
        env.assign("p", Value::from("hi"));
        let variable = env.get("p").expect("bound");
        assert_eq!(variable.declared, ValueType::String);
        assert_eq!(variable.value, Value::from("hi"));
    }

    #[test]
    fn test_assignment_copies_strings() {
        let mut env = Environment::new();
        env.declare(name("a"), ValueType::String, Value::from("one"));
        let copy = env.get("a").expect("a").value.clone();
        env.declare(name("b"), ValueType::String, copy);
        env.assign("a", Value::from("two"));
        assert_eq!(env.get("b").map(|v| &v.value), Some(&Value::from("one")));
    }
}
