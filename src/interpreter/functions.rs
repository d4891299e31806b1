use indexmap::IndexMap;
use std::rc::Rc;

use crate::ast::FunctionDecl;

/// Declared functions, in registration order. Bodies are borrowed from the
/// program, which therefore has to outlive the interpreter.
#[derive(Debug, Default)]
pub struct FunctionTable<'p> {
    functions: IndexMap<Rc<str>, &'p FunctionDecl>,
}

impl<'p> FunctionTable<'p> {
    pub fn new() -> Self {
        Self {
            functions: IndexMap::new(),
        }
    }

    /// Registers `decl`. A later declaration with the same name wins.
    /// Returns true when an earlier declaration was replaced.
    pub fn register(&mut self, decl: &'p FunctionDecl) -> bool {
        self.functions.insert(decl.name.clone(), decl).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&'p FunctionDecl> {
        self.functions.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::parser::parse_program;

    #[test]
    fn test_most_recent_declaration_wins() {
        let program = parse_program(
            "func f(): int { return 1; } func g(): int { return 2; } func f(a: int): int { return a; }",
        )
        .expect("parse");

        let mut table = FunctionTable::new();
        let replaced: Vec<bool> = program.functions().map(|decl| table.register(decl)).collect();

        assert_eq!(replaced, vec![false, false, true]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("f").map(|decl| decl.params.len()), Some(1));
        assert!(table.get("h").is_none());
    }
}
