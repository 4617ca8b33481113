//! Name resolution during parsing
//!
//! [`ScopeChain`] maps identifiers to the declaration they name. The outermost
//! scope holds the stage's built-in variables, the next one the shader's
//! globals; every compound statement, function body and loop pushes another.
//! Lookups search innermost first, so user declarations shadow built-ins.
//!
//! Functions live in their own [`FunctionTable`] since they may be overloaded
//! and prototyped any number of times.

use super::ast::{StructId, TypeRef, VariableId};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// What an identifier resolves to
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Symbol {
    Variable(VariableId),
    Struct(StructId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("redeclaration of '{name}'")]
pub struct Redeclaration {
    pub name: String,
    pub previous: Symbol,
}

/// Stack of lexical scopes
#[derive(Debug)]
pub struct ScopeChain {
    scopes: Vec<FxHashMap<String, Symbol>>,
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeChain {
    const BUILTIN_DEPTH: usize = 1;
    const GLOBAL_DEPTH: usize = 2;

    /// Creates a chain holding the built-in and global scopes.
    pub fn new() -> Self {
        ScopeChain {
            scopes: vec![FxHashMap::default(), FxHashMap::default()],
        }
    }

    pub fn begin_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn end_scope(&mut self) {
        if self.scopes.len() <= Self::GLOBAL_DEPTH {
            unreachable!("cannot pop the global scope");
        }
        self.scopes.pop();
    }

    /// Declares a built-in; later built-ins of the same name replace earlier ones.
    pub fn declare_builtin(&mut self, name: &str, symbol: Symbol) {
        self.scopes[Self::BUILTIN_DEPTH - 1].insert(name.to_string(), symbol);
    }

    /// Declares `name` in the innermost scope.
    pub fn declare(&mut self, name: &str, symbol: Symbol) -> Result<(), Redeclaration> {
        let scope = self
            .scopes
            .last_mut()
            .unwrap_or_else(|| unreachable!("scope chain is never empty"));

        if let Some(previous) = scope.get(name) {
            return Err(Redeclaration {
                name: name.to_string(),
                previous: *previous,
            });
        }

        scope.insert(name.to_string(), symbol);
        Ok(())
    }

    /// Resolves `name`, innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name)).copied()
    }

    /// Resolves `name` to a structure type.
    pub fn lookup_struct(&self, name: &str) -> Option<StructId> {
        match self.lookup(name) {
            Some(Symbol::Struct(id)) => Some(id),
            _ => None,
        }
    }
}

/// A parameter type as far as overload identity is concerned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSignature {
    pub ty: TypeRef,
    pub array_dimensions: usize,
}

#[derive(Debug)]
struct Overload {
    parameters: Vec<ParameterSignature>,
    has_body: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("redefinition of function '{name}'")]
pub struct Redefinition {
    pub name: String,
}

/// User functions declared so far, by name
#[derive(Debug, Default)]
pub struct FunctionTable {
    functions: FxHashMap<String, Vec<Overload>>,
}

impl FunctionTable {
    /// Records a prototype or definition.
    ///
    /// Prototypes may repeat freely; a second body for the same parameter
    /// types is an error.
    pub fn declare(
        &mut self,
        name: &str,
        parameters: Vec<ParameterSignature>,
        has_body: bool,
    ) -> Result<(), Redefinition> {
        let overloads = self.functions.entry(name.to_string()).or_default();

        match overloads
            .iter_mut()
            .find(|overload| overload.parameters == parameters)
        {
            Some(existing) if existing.has_body && has_body => Err(Redefinition {
                name: name.to_string(),
            }),
            Some(existing) => {
                existing.has_body |= has_body;
                Ok(())
            }
            None => {
                overloads.push(Overload {
                    parameters,
                    has_body,
                });
                Ok(())
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexemes::BuiltinType;

    #[test]
    fn test_lookup_innermost_first() {
        let mut scopes = ScopeChain::new();
        scopes.declare("x", Symbol::Variable(VariableId(0))).unwrap();
        scopes.begin_scope();
        scopes.declare("x", Symbol::Variable(VariableId(1))).unwrap();

        assert_eq!(scopes.lookup("x"), Some(Symbol::Variable(VariableId(1))));
        scopes.end_scope();
        assert_eq!(scopes.lookup("x"), Some(Symbol::Variable(VariableId(0))));
        assert_eq!(scopes.lookup("y"), None);
    }

    #[test]
    fn test_redeclaration_in_same_scope() {
        let mut scopes = ScopeChain::new();
        scopes.declare("x", Symbol::Variable(VariableId(0))).unwrap();
        let err = scopes.declare("x", Symbol::Variable(VariableId(1))).unwrap_err();
        assert_eq!(err.previous, Symbol::Variable(VariableId(0)));
        assert_eq!(err.to_string(), "redeclaration of 'x'");
    }

    #[test]
    fn test_user_declaration_shadows_builtin() {
        let mut scopes = ScopeChain::new();
        scopes.declare_builtin("gl_Position", Symbol::Variable(VariableId(0)));
        assert!(scopes.declare("gl_Position", Symbol::Variable(VariableId(1))).is_ok());
        assert_eq!(scopes.lookup("gl_Position"), Some(Symbol::Variable(VariableId(1))));
    }

    #[test]
    #[should_panic]
    fn test_cannot_pop_global_scope() {
        let mut scopes = ScopeChain::new();
        scopes.end_scope();
    }

    #[test]
    fn test_function_redefinition() {
        let float = || {
            vec![ParameterSignature {
                ty: TypeRef::Builtin(BuiltinType::Float),
                array_dimensions: 0,
            }]
        };
        let int = || {
            vec![ParameterSignature {
                ty: TypeRef::Builtin(BuiltinType::Int),
                array_dimensions: 0,
            }]
        };

        let mut functions = FunctionTable::default();
        functions.declare("f", float(), false).unwrap();
        functions.declare("f", float(), false).unwrap();
        functions.declare("f", float(), true).unwrap();
        functions.declare("f", int(), true).unwrap();
        assert!(functions.declare("f", float(), true).is_err());
        assert!(functions.contains("f"));
        assert!(!functions.contains("g"));
    }
}
