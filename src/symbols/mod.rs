//! Symbol tables consulted and mutated by the parser
//!
//! Three namespaces share one identifier space: variables, functions and
//! packages (record types). A name may belong to at most one of them at a
//! time, and a variable name may be visible only once.
//!
//! Variables live in a stack of scope frames. The bottom frame (depth 0) holds
//! globals and is never popped; every compound block pushes a frame and
//! popping it forgets exactly the variables declared in it, so sibling blocks
//! may reuse names.

use crate::parser::types::{ReturnType, VarType};
use rustc_hash::FxHashMap;
use std::fmt;

/// The namespace a name was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Package,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Variable => write!(f, "variable"),
            SymbolKind::Function => write!(f, "function"),
            SymbolKind::Package => write!(f, "package"),
        }
    }
}

/// Rejected symbol table mutation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("Cannot redefine {kind} [{name}]")]
    Redefined { kind: SymbolKind, name: String },

    #[error("Cannot define {declaring} with same name as {existing} [{name}]")]
    NameClash {
        declaring: SymbolKind,
        existing: SymbolKind,
        name: String,
    },

    #[error("Cannot have same identifier for two package items [{field}] in package [{package}]")]
    FieldRedefined { package: String, field: String },

    #[error("Unknown {kind} [{name}]")]
    Unknown { kind: SymbolKind, name: String },
}

/// A declared variable, argument or record instance
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub var_type: VarType,
    /// Scope depth the variable was declared at
    pub depth: usize,
}

/// A function signature
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub args: Vec<VarType>,
    pub return_type: ReturnType,
}

impl Function {
    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

/// A package (record type) and its fields in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub name: String,
    fields: FxHashMap<String, VarType>,
    field_order: Vec<String>,
}

impl Package {
    fn new(name: String) -> Self {
        Self {
            name,
            fields: FxHashMap::default(),
            field_order: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&VarType> {
        self.fields.get(name)
    }

    /// Fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &VarType)> {
        self.field_order
            .iter()
            .filter_map(|name| self.fields.get(name).map(|ty| (name.as_str(), ty)))
    }

    pub fn field_count(&self) -> usize {
        self.field_order.len()
    }
}

#[derive(Debug, Clone, Default)]
struct ScopeFrame {
    declared: Vec<String>,
}

/// Variable, function and package tables for one translation unit
#[derive(Debug, Clone)]
pub struct SymbolTable {
    variables: FxHashMap<String, Variable>,
    scopes: Vec<ScopeFrame>,
    functions: FxHashMap<String, Function>,
    packages: FxHashMap<String, Package>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            variables: FxHashMap::default(),
            scopes: vec![ScopeFrame::default()],
            functions: FxHashMap::default(),
            packages: FxHashMap::default(),
        }
    }

    /// Current scope depth; 0 is the global scope
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Enter a new scope and return its depth
    pub fn enter_scope(&mut self) -> usize {
        self.scopes.push(ScopeFrame::default());
        self.depth()
    }

    /// Exit the current scope, returning the names of the variables it held
    ///
    /// The global scope is never exited; calling this at depth 0 returns an
    /// empty list.
    pub fn exit_scope(&mut self) -> Vec<String> {
        if self.scopes.len() == 1 {
            return Vec::new();
        }

        let Some(scope) = self.scopes.pop() else {
            return Vec::new();
        };
        for name in &scope.declared {
            self.variables.remove(name);
        }
        scope.declared
    }

    /// Which namespace currently owns `name`, if any
    pub fn kind_of(&self, name: &str) -> Option<SymbolKind> {
        if self.variables.contains_key(name) {
            Some(SymbolKind::Variable)
        } else if self.functions.contains_key(name) {
            Some(SymbolKind::Function)
        } else if self.packages.contains_key(name) {
            Some(SymbolKind::Package)
        } else {
            None
        }
    }

    fn ensure_free(&self, name: &str, declaring: SymbolKind) -> Result<(), SymbolError> {
        match self.kind_of(name) {
            None => Ok(()),
            Some(existing) if existing == declaring => Err(SymbolError::Redefined {
                kind: declaring,
                name: name.to_string(),
            }),
            Some(existing) => Err(SymbolError::NameClash {
                declaring,
                existing,
                name: name.to_string(),
            }),
        }
    }

    // ===== Variables =====

    /// Declare a variable in the innermost scope
    pub fn declare_variable(
        &mut self,
        name: &str,
        var_type: VarType,
    ) -> Result<&Variable, SymbolError> {
        self.ensure_free(name, SymbolKind::Variable)?;

        let depth = self.depth();
        if let Some(scope) = self.scopes.last_mut() {
            scope.declared.push(name.to_string());
        }
        tracing::debug!(name, %var_type, depth, "declare variable");

        let variable = self
            .variables
            .entry(name.to_string())
            .or_insert(Variable {
                name: name.to_string(),
                var_type,
                depth,
            });
        Ok(&*variable)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Number of currently visible variables
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    // ===== Functions =====

    /// Register a function with no arguments and a `void` return type;
    /// [`add_argument`](Self::add_argument) and
    /// [`set_return_type`](Self::set_return_type) complete the signature.
    pub fn declare_function(&mut self, name: &str) -> Result<(), SymbolError> {
        self.ensure_free(name, SymbolKind::Function)?;
        tracing::debug!(name, "declare function");

        self.functions.insert(
            name.to_string(),
            Function {
                name: name.to_string(),
                args: Vec::new(),
                return_type: ReturnType::Void,
            },
        );
        Ok(())
    }

    pub fn add_argument(&mut self, function: &str, arg_type: VarType) -> Result<(), SymbolError> {
        self.function_mut(function)?.args.push(arg_type);
        Ok(())
    }

    pub fn set_return_type(
        &mut self,
        function: &str,
        return_type: ReturnType,
    ) -> Result<(), SymbolError> {
        self.function_mut(function)?.return_type = return_type;
        Ok(())
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    fn function_mut(&mut self, name: &str) -> Result<&mut Function, SymbolError> {
        self.functions.get_mut(name).ok_or_else(|| SymbolError::Unknown {
            kind: SymbolKind::Function,
            name: name.to_string(),
        })
    }

    // ===== Packages =====

    pub fn declare_package(&mut self, name: &str) -> Result<(), SymbolError> {
        self.ensure_free(name, SymbolKind::Package)?;
        tracing::debug!(name, "declare package");

        self.packages
            .insert(name.to_string(), Package::new(name.to_string()));
        Ok(())
    }

    pub fn add_field(
        &mut self,
        package: &str,
        field: &str,
        field_type: VarType,
    ) -> Result<(), SymbolError> {
        let pack = self
            .packages
            .get_mut(package)
            .ok_or_else(|| SymbolError::Unknown {
                kind: SymbolKind::Package,
                name: package.to_string(),
            })?;

        if pack.fields.contains_key(field) {
            return Err(SymbolError::FieldRedefined {
                package: package.to_string(),
                field: field.to_string(),
            });
        }

        pack.fields.insert(field.to_string(), field_type);
        pack.field_order.push(field.to_string());
        Ok(())
    }

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
