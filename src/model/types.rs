// Value type model
//
// The closed set of data types the generator knows about, together with the
// identifiers derived from them (class names, header file names, literals).
// Every derived identifier is computed on access from the immutable value.

use crate::error::{Error, Result};
use crate::naming::{lower_camel_case, upper_camel_case};
use indexmap::IndexSet;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// Primitive element category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    Double,
}

impl ScalarKind {
    /// The C++ type name
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
        }
    }

    /// Whether values of this kind support arithmetic
    pub fn is_numeric(self) -> bool {
        !matches!(self, ScalarKind::Bool)
    }

    /// Render a numeric value as a C++ literal of this kind.
    ///
    /// Integers truncate toward zero, floats carry an explicit `f` suffix and
    /// doubles carry none. Output never depends on the process locale.
    /// NaN and infinities have no literal form and are rejected.
    pub fn cpp_number(self, value: f64) -> Result<String> {
        let value = self.finite(value)?;
        Ok(match self {
            ScalarKind::Int => format!("{}", value.trunc() as i64),
            ScalarKind::Float => format!("{}f", float_literal(value)),
            ScalarKind::Double => float_literal(value),
            ScalarKind::Bool => (value != 0.0).to_string(),
        })
    }

    /// Render a numeric value as a Python literal of this kind.
    pub fn py_number(self, value: f64) -> Result<String> {
        let value = self.finite(value)?;
        Ok(match self {
            ScalarKind::Int => format!("{}", value.trunc() as i64),
            ScalarKind::Float | ScalarKind::Double => float_literal(value),
            ScalarKind::Bool => {
                if value != 0.0 {
                    "True".to_string()
                } else {
                    "False".to_string()
                }
            }
        })
    }

    fn finite(self, value: f64) -> Result<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Error::declaration(format!(
                "{} has no {} literal",
                value,
                self.name()
            )))
        }
    }
}

/// `Debug` formatting of f64 always keeps a decimal point or exponent.
fn float_literal(value: f64) -> String {
    format!("{:?}", value)
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bool" => Ok(ScalarKind::Bool),
            "int" => Ok(ScalarKind::Int),
            "float" => Ok(ScalarKind::Float),
            "double" => Ok(ScalarKind::Double),
            other => Err(Error::declaration(format!("unknown scalar type {:?}", other))),
        }
    }
}

/// Fixed-shape container of scalars.
///
/// A one-dimensional shape belongs to the vector family (`Vec3f`), a
/// two-dimensional shape to the matrix family (`Mat4f`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VectorType {
    shape: Vec<usize>,
    element: ScalarKind,
}

impl VectorType {
    /// Create a vector (one dimension) or matrix (two dimensions) type
    pub fn new(shape: &[usize], element: ScalarKind) -> Result<Self> {
        if shape.is_empty() {
            return Err(Error::declaration("vector shape must not be empty"));
        }
        if shape.len() > 2 {
            return Err(Error::declaration(format!(
                "vector shape {:?} has {} dimensions, at most 2 are supported",
                shape,
                shape.len()
            )));
        }
        if shape.contains(&0) {
            return Err(Error::declaration(format!(
                "vector shape {:?} must only contain positive dimensions",
                shape
            )));
        }

        Ok(Self {
            shape: shape.to_vec(),
            element,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn element(&self) -> ScalarKind {
        self.element
    }

    pub fn is_matrix(&self) -> bool {
        self.shape.len() == 2
    }

    /// Total number of scalar elements
    pub fn element_size(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn class_name(&self) -> String {
        let prefix = if self.is_matrix() { "Mat" } else { "Vec" };
        format!(
            "{}{}{}",
            prefix,
            self.shape[0],
            &self.element.name()[..1]
        )
    }

    pub fn header_file_name(&self) -> String {
        format!("{}.h", lower_camel_case(&self.class_name()))
    }

    pub fn variable_prefix(&self) -> &'static str {
        if self.is_matrix() {
            "matrix"
        } else {
            "vector"
        }
    }
}

/// Closed interval (min, max) over a scalar or vector
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RangeType {
    element: Box<ValueType>,
}

impl RangeType {
    pub fn new(element: ValueType) -> Result<Self> {
        match &element {
            ValueType::Scalar(kind) if kind.is_numeric() => {}
            ValueType::Vector(_) => {}
            other => {
                return Err(Error::declaration(format!(
                    "range element must be a numeric scalar or a vector, got {}",
                    other.class_name()
                )))
            }
        }
        Ok(Self {
            element: Box::new(element),
        })
    }

    pub fn element(&self) -> &ValueType {
        &self.element
    }
}

/// Dynamically sized homogeneous sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayType {
    element: Box<ValueType>,
}

impl ArrayType {
    pub fn new(element: ValueType) -> Self {
        Self {
            element: Box::new(element),
        }
    }

    pub fn element(&self) -> &ValueType {
        &self.element
    }
}

/// A labelled member of a composite type.
///
/// `default_value` is a C++ expression assigned to the member, supplied by
/// the declaration rather than computed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeElement {
    pub name: String,
    pub ty: ValueType,
    pub default_value: Option<String>,
}

impl CompositeElement {
    pub fn new(name: impl Into<String>, ty: ValueType, default_value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            ty,
            default_value: default_value.map(str::to_string),
        }
    }

    pub fn accessor_name(&self) -> String {
        upper_camel_case(&self.name)
    }
}

/// Named aggregate of labelled elements
#[derive(Debug, Clone)]
pub struct CompositeType {
    name: String,
    elements: Vec<CompositeElement>,
    extra_includes: Vec<String>,
}

impl CompositeType {
    pub fn new(name: impl Into<String>, elements: Vec<CompositeElement>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::declaration("composite type name must not be empty"));
        }
        if elements.is_empty() {
            return Err(Error::declaration(format!(
                "composite type {} must have at least one element",
                name
            )));
        }

        let mut seen = HashSet::new();
        for element in &elements {
            if element.name.is_empty() {
                return Err(Error::declaration(format!(
                    "composite type {} has an element without a name",
                    name
                )));
            }
            if !seen.insert(element.name.as_str()) {
                return Err(Error::declaration(format!(
                    "composite type {} declares element {:?} more than once",
                    name, element.name
                )));
            }
        }

        Ok(Self {
            name,
            elements,
            extra_includes: Vec::new(),
        })
    }

    /// Extra `#include` targets emitted near the top of the generated header
    pub fn with_extra_includes(mut self, includes: Vec<String>) -> Self {
        self.extra_includes = includes;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elements(&self) -> &[CompositeElement] {
        &self.elements
    }

    pub fn extra_includes(&self) -> &[String] {
        &self.extra_includes
    }
}

// Identity is the name and the ordered element list; includes are presentation only.
impl PartialEq for CompositeType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.elements == other.elements
    }
}

impl Eq for CompositeType {}

impl Hash for CompositeType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.elements.hash(state);
    }
}

/// Broad family of a value type, selecting its template set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Scalar,
    Vector,
    Range,
    Array,
    Composite,
}

impl TypeCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeCategory::Scalar => "scalar",
            TypeCategory::Vector => "vector",
            TypeCategory::Range => "range",
            TypeCategory::Array => "array",
            TypeCategory::Composite => "composite",
        }
    }
}

/// Any data type that can appear in a generated signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Scalar(ScalarKind),
    Vector(VectorType),
    Range(RangeType),
    Array(ArrayType),
    Composite(Arc<CompositeType>),
}

impl ValueType {
    pub fn scalar(kind: ScalarKind) -> Self {
        ValueType::Scalar(kind)
    }

    pub fn vector(shape: &[usize], element: ScalarKind) -> Result<Self> {
        VectorType::new(shape, element).map(ValueType::Vector)
    }

    pub fn range(element: ValueType) -> Result<Self> {
        RangeType::new(element).map(ValueType::Range)
    }

    pub fn array(element: ValueType) -> Self {
        ValueType::Array(ArrayType::new(element))
    }

    pub fn composite(composite: CompositeType) -> Self {
        ValueType::Composite(Arc::new(composite))
    }

    pub fn category(&self) -> TypeCategory {
        match self {
            ValueType::Scalar(_) => TypeCategory::Scalar,
            ValueType::Vector(_) => TypeCategory::Vector,
            ValueType::Range(_) => TypeCategory::Range,
            ValueType::Array(_) => TypeCategory::Array,
            ValueType::Composite(_) => TypeCategory::Composite,
        }
    }

    /// Canonical C++ class (or primitive) name
    pub fn class_name(&self) -> String {
        match self {
            ValueType::Scalar(kind) => kind.name().to_string(),
            ValueType::Vector(vector) => vector.class_name(),
            ValueType::Range(range) => {
                format!("{}Range", upper_camel_case(&range.element().class_name()))
            }
            ValueType::Array(array) => {
                format!("{}Array", upper_camel_case(&array.element().class_name()))
            }
            ValueType::Composite(composite) => upper_camel_case(composite.name()),
        }
    }

    /// Header file hosting the type. Scalars are built in and have none.
    pub fn header_file_name(&self) -> Option<String> {
        match self {
            ValueType::Scalar(_) => None,
            ValueType::Vector(vector) => Some(vector.header_file_name()),
            ValueType::Range(_) => Some(format!("{}.h", lower_camel_case(&self.class_name()))),
            ValueType::Array(array) => match array.element() {
                ValueType::Vector(vector) => {
                    let header = vector.header_file_name();
                    let stem = header.trim_end_matches(".h");
                    Some(format!("{}Array.h", stem))
                }
                element => Some(format!(
                    "{}Array.h",
                    lower_camel_case(&element.class_name())
                )),
            },
            ValueType::Composite(composite) => {
                Some(format!("{}.h", lower_camel_case(composite.name())))
            }
        }
    }

    /// Meaningful prefix for naming variables of this type
    pub fn variable_prefix(&self) -> String {
        match self {
            ValueType::Scalar(_) => "value".to_string(),
            ValueType::Vector(vector) => vector.variable_prefix().to_string(),
            ValueType::Range(_) => "range".to_string(),
            ValueType::Array(_) => "array".to_string(),
            ValueType::Composite(composite) => lower_camel_case(composite.name()),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, ValueType::Scalar(_))
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, ValueType::Vector(_))
    }

    pub fn is_matrix(&self) -> bool {
        matches!(self, ValueType::Vector(vector) if vector.is_matrix())
    }

    pub fn is_range(&self) -> bool {
        matches!(self, ValueType::Range(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ValueType::Array(_))
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, ValueType::Composite(_))
    }

    /// Directly wrapped element type, if any
    pub fn element_type(&self) -> Option<ValueType> {
        match self {
            ValueType::Scalar(_) | ValueType::Composite(_) => None,
            ValueType::Vector(vector) => Some(ValueType::Scalar(vector.element())),
            ValueType::Range(range) => Some(range.element().clone()),
            ValueType::Array(array) => Some(array.element().clone()),
        }
    }

    /// Innermost scalar kind, following ranges and arrays down to their elements
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            ValueType::Scalar(kind) => Some(*kind),
            ValueType::Vector(vector) => Some(vector.element()),
            ValueType::Range(range) => range.element().scalar_kind(),
            ValueType::Array(array) => array.element().scalar_kind(),
            ValueType::Composite(_) => None,
        }
    }

    /// Render a numeric value as a C++ literal matching the element type
    pub fn cpp_number(&self, value: f64) -> Result<String> {
        self.literal_kind()?.cpp_number(value)
    }

    /// Render a numeric value as a Python literal matching the element type
    pub fn py_number(&self, value: f64) -> Result<String> {
        self.literal_kind()?.py_number(value)
    }

    fn literal_kind(&self) -> Result<ScalarKind> {
        self.scalar_kind().ok_or_else(|| {
            Error::declaration(format!("{} has no scalar element type", self.class_name()))
        })
    }

    /// Add this type and every type embedded in it to `out`.
    ///
    /// Insertion order is outermost first, then elements in declaration order.
    pub fn collect_types(&self, out: &mut IndexSet<ValueType>) {
        out.insert(self.clone());
        match self {
            ValueType::Scalar(_) => {}
            ValueType::Vector(vector) => {
                out.insert(ValueType::Scalar(vector.element()));
            }
            ValueType::Range(range) => range.element().collect_types(out),
            ValueType::Array(array) => array.element().collect_types(out),
            ValueType::Composite(composite) => {
                for element in composite.elements() {
                    element.ty.collect_types(out);
                }
            }
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.class_name())
    }
}

/// Template-facing projection of a value type
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueTypeView<'a> {
    class_name: String,
    header_file_name: Option<String>,
    category: &'static str,
    is_scalar: bool,
    is_vector: bool,
    is_matrix: bool,
    is_range: bool,
    is_array: bool,
    is_composite: bool,
    variable_prefix: String,
    scalar_type: Option<&'static str>,
    shape: Option<&'a [usize]>,
    element_size: Option<usize>,
    element_type: Option<ValueType>,
    elements: Option<Vec<CompositeElementView<'a>>>,
    extra_includes: Option<&'a [String]>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompositeElementView<'a> {
    name: &'a str,
    accessor_name: String,
    #[serde(rename = "type")]
    ty: &'a ValueType,
    default_value: Option<&'a str>,
}

impl Serialize for ValueType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let (shape, element_size) = match self {
            ValueType::Vector(vector) => (Some(vector.shape()), Some(vector.element_size())),
            ValueType::Composite(composite) => (None, Some(composite.elements().len())),
            _ => (None, None),
        };

        let (elements, extra_includes) = match self {
            ValueType::Composite(composite) => (
                Some(
                    composite
                        .elements()
                        .iter()
                        .map(|element| CompositeElementView {
                            name: &element.name,
                            accessor_name: element.accessor_name(),
                            ty: &element.ty,
                            default_value: element.default_value.as_deref(),
                        })
                        .collect(),
                ),
                Some(composite.extra_includes()),
            ),
            _ => (None, None),
        };

        ValueTypeView {
            class_name: self.class_name(),
            header_file_name: self.header_file_name(),
            category: self.category().as_str(),
            is_scalar: self.is_scalar(),
            is_vector: self.is_vector(),
            is_matrix: self.is_matrix(),
            is_range: self.is_range(),
            is_array: self.is_array(),
            is_composite: self.is_composite(),
            variable_prefix: self.variable_prefix(),
            scalar_type: self.scalar_kind().map(ScalarKind::name),
            shape,
            element_size,
            element_type: self.element_type(),
            elements,
            extra_includes,
        }
        .serialize(serializer)
    }
}
