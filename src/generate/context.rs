// Registries of generated types and functions
//
// Both maps are append-only and keep insertion order, which is the order the
// manifest lists entities in.

use crate::error::{Error, Result};
use crate::model::{Function, ValueType};
use indexmap::IndexMap;

/// Outcome of registering a type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// First time this name was seen
    Added,
    /// An identical type was already registered under this name
    Existing,
}

/// Accumulated types and functions for one generation run
#[derive(Debug, Default)]
pub struct GenerationContext {
    types: IndexMap<String, ValueType>,
    functions: IndexMap<String, Function>,
}

impl GenerationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type under its class name.
    ///
    /// Re-registering a structurally identical type converges on the existing
    /// entry. A different type claiming the same name is a conflict.
    pub fn register_type(&mut self, ty: ValueType) -> Result<Registration> {
        let name = ty.class_name();
        match self.types.get(&name) {
            Some(existing) if *existing == ty => Ok(Registration::Existing),
            Some(_) => Err(Error::TypeConflict { name }),
            None => {
                self.types.insert(name, ty);
                Ok(Registration::Added)
            }
        }
    }

    /// Register a function under its symbol name. Duplicates are rejected.
    pub fn register_function(&mut self, function: Function) -> Result<()> {
        let name = function.name();
        if self.functions.contains_key(&name) {
            return Err(Error::DuplicateFunction(name));
        }
        self.functions.insert(name, function);
        Ok(())
    }

    pub fn get_type(&self, name: &str) -> Option<&ValueType> {
        self.types.get(name)
    }

    pub fn contains_type(&self, ty: &ValueType) -> bool {
        self.types.get(&ty.class_name()) == Some(ty)
    }

    /// Registered types in registration order
    pub fn types(&self) -> impl Iterator<Item = &ValueType> {
        self.types.values()
    }

    /// Registered functions in registration order
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}
