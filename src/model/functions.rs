// Function model
//
// Arguments, overload interfaces, functions and batch function groups built
// on top of the value type model.

use crate::error::{Error, Result};
use crate::model::types::ValueType;
use crate::naming::upper_camel_case;
use indexmap::{IndexMap, IndexSet};
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// Whether a function argument is read-only or writable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Mutability {
    Const,
    Mutable,
}

impl Mutability {
    pub fn qualifier(self) -> &'static str {
        match self {
            Mutability::Const => "const",
            Mutability::Mutable => "",
        }
    }

    /// Parameter name prefix: `i_` for inputs, `o_` for outputs
    pub fn prefix(self) -> &'static str {
        match self {
            Mutability::Const => "i_",
            Mutability::Mutable => "o_",
        }
    }
}

/// A single function parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionArg {
    key: String,
    ty: ValueType,
    mutability: Mutability,
}

impl FunctionArg {
    pub fn new(key: impl Into<String>, ty: ValueType, mutability: Mutability) -> Self {
        Self {
            key: key.into(),
            ty,
            mutability,
        }
    }

    /// Read-only argument
    pub fn input(key: impl Into<String>, ty: ValueType) -> Self {
        Self::new(key, ty, Mutability::Const)
    }

    /// Writable argument
    pub fn output(key: impl Into<String>, ty: ValueType) -> Self {
        Self::new(key, ty, Mutability::Mutable)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ty(&self) -> &ValueType {
        &self.ty
    }

    pub fn mutability(&self) -> Mutability {
        self.mutability
    }

    /// Parameter name as it appears in generated signatures.
    ///
    /// Always the mutability prefix followed by the key, exactly once.
    pub fn name(&self) -> String {
        format!("{}{}", self.mutability.prefix(), self.key)
    }

    /// `const Vec3f& i_vector` or `Vec3f& o_vector`
    pub fn typed(&self) -> String {
        match self.mutability {
            Mutability::Const => format!(
                "{} {}& {}",
                self.mutability.qualifier(),
                self.ty.class_name(),
                self.name()
            ),
            Mutability::Mutable => format!("{}& {}", self.ty.class_name(), self.name()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FunctionArgView<'a> {
    key: &'a str,
    name: String,
    class_name: String,
    const_qualifier: &'static str,
    mutability: Mutability,
    is_mutable: bool,
    #[serde(rename = "type")]
    ty: &'a ValueType,
}

impl Serialize for FunctionArg {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        FunctionArgView {
            key: &self.key,
            name: self.name(),
            class_name: self.ty.class_name(),
            const_qualifier: self.mutability.qualifier(),
            mutability: self.mutability,
            is_mutable: self.mutability == Mutability::Mutable,
            ty: &self.ty,
        }
        .serialize(serializer)
    }
}

/// One concrete overload: ordered, key-unique arguments and an optional return type
#[derive(Debug, Clone)]
pub struct FunctionInterface {
    arguments: IndexMap<String, FunctionArg>,
    return_type: Option<ValueType>,
}

impl FunctionInterface {
    /// Create an interface. A `None` return type means the function returns void.
    pub fn new(arguments: Vec<FunctionArg>, return_type: Option<ValueType>) -> Result<Self> {
        let mut map = IndexMap::with_capacity(arguments.len());
        for arg in arguments {
            if arg.key.is_empty() {
                return Err(Error::declaration("function argument key must not be empty"));
            }
            if map.contains_key(&arg.key) {
                return Err(Error::declaration(format!(
                    "argument key {:?} is declared more than once in one interface",
                    arg.key
                )));
            }
            map.insert(arg.key.clone(), arg);
        }

        Ok(Self {
            arguments: map,
            return_type,
        })
    }

    /// Arguments in declaration order
    pub fn arguments(&self) -> impl Iterator<Item = &FunctionArg> {
        self.arguments.values()
    }

    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    /// Look up an argument by key
    pub fn arg(&self, key: &str) -> Option<&FunctionArg> {
        self.arguments.get(key)
    }

    pub fn return_type(&self) -> Option<&ValueType> {
        self.return_type.as_ref()
    }

    /// Return type class name, `void` when absent
    pub fn return_type_name(&self) -> String {
        match &self.return_type {
            Some(ty) => ty.class_name(),
            None => "void".to_string(),
        }
    }

    /// Typed, named parameter list for a declaration
    pub fn typed_args(&self) -> String {
        self.arguments
            .values()
            .map(FunctionArg::typed)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Bare parameter names for a call site
    pub fn named_args(&self) -> String {
        self.arguments
            .values()
            .map(FunctionArg::name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Every type used by this interface, embedded element types included
    pub fn collect_types(&self, out: &mut IndexSet<ValueType>) {
        for arg in self.arguments.values() {
            arg.ty.collect_types(out);
        }
        if let Some(ty) = &self.return_type {
            ty.collect_types(out);
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FunctionInterfaceView<'a> {
    args: &'a IndexMap<String, FunctionArg>,
    arguments: Vec<&'a FunctionArg>,
    typed_args: String,
    named_args: String,
    return_type: String,
    return_value_type: Option<&'a ValueType>,
    has_return: bool,
}

impl Serialize for FunctionInterface {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        FunctionInterfaceView {
            args: &self.arguments,
            arguments: self.arguments.values().collect(),
            typed_args: self.typed_args(),
            named_args: self.named_args(),
            return_type: self.return_type_name(),
            return_value_type: self.return_type.as_ref(),
            has_return: self.return_type.is_some(),
        }
        .serialize(serializer)
    }
}

/// Documentation grouping of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum FunctionCategory {
    #[default]
    Basic,
    LinearAlgebra,
    RayTracing,
}

/// A named operation and its overloads
#[derive(Debug, Clone)]
pub struct Function {
    key: String,
    interfaces: Arc<Vec<FunctionInterface>>,
    category: FunctionCategory,
}

impl Function {
    /// Create a function from a lowerCamelCase key
    pub fn new(
        key: impl Into<String>,
        interfaces: Vec<FunctionInterface>,
        category: FunctionCategory,
    ) -> Result<Self> {
        Self::with_shared_interfaces(key.into(), Arc::new(interfaces), category)
    }

    fn with_shared_interfaces(
        key: String,
        interfaces: Arc<Vec<FunctionInterface>>,
        category: FunctionCategory,
    ) -> Result<Self> {
        if key.is_empty() {
            return Err(Error::declaration("function name must not be empty"));
        }
        if interfaces.is_empty() {
            return Err(Error::declaration(format!(
                "function {} has no interfaces",
                key
            )));
        }

        Ok(Self {
            key,
            interfaces,
            category,
        })
    }

    /// The lowerCamelCase declaration key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The C++ symbol name
    pub fn name(&self) -> String {
        upper_camel_case(&self.key)
    }

    pub fn header_file_name(&self) -> String {
        format!("{}.h", self.key)
    }

    pub fn interfaces(&self) -> &[FunctionInterface] {
        &self.interfaces
    }

    /// The interface list, shared with any group siblings
    pub fn shared_interfaces(&self) -> &Arc<Vec<FunctionInterface>> {
        &self.interfaces
    }

    pub fn category(&self) -> FunctionCategory {
        self.category
    }

    /// Union of every type touched by any interface, embedded element types included.
    ///
    /// Order is first appearance across interfaces; there are no duplicates.
    pub fn types(&self) -> IndexSet<ValueType> {
        let mut types = IndexSet::new();
        for interface in self.interfaces.iter() {
            interface.collect_types(&mut types);
        }
        types
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FunctionView<'a> {
    name: String,
    key: &'a str,
    header_file_name: String,
    category: FunctionCategory,
    interfaces: &'a [FunctionInterface],
    types: Vec<ValueType>,
}

impl Serialize for Function {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        FunctionView {
            name: self.name(),
            key: &self.key,
            header_file_name: self.header_file_name(),
            category: self.category,
            interfaces: &self.interfaces,
            types: self.types().into_iter().collect(),
        }
        .serialize(serializer)
    }
}

/// Functions declared together over one shared interface list
#[derive(Debug, Clone)]
pub struct FunctionGroup {
    functions: Vec<Function>,
    interfaces: Arc<Vec<FunctionInterface>>,
    category: FunctionCategory,
}

impl FunctionGroup {
    /// Expand `names` into one function each, all sharing `interfaces`
    pub fn new(
        names: &[&str],
        interfaces: Vec<FunctionInterface>,
        category: FunctionCategory,
    ) -> Result<Self> {
        if names.is_empty() {
            return Err(Error::declaration("function group has no names"));
        }

        let interfaces = Arc::new(interfaces);
        let functions = names
            .iter()
            .map(|name| {
                Function::with_shared_interfaces(
                    name.to_string(),
                    Arc::clone(&interfaces),
                    category,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            functions,
            interfaces,
            category,
        })
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn interfaces(&self) -> &Arc<Vec<FunctionInterface>> {
        &self.interfaces
    }

    pub fn category(&self) -> FunctionCategory {
        self.category
    }
}
