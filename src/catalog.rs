// Built-in declaration catalog
//
// The full set of types and function groups generated for the graphics math
// library. Everything here is static data; the driver consumes it.

use crate::error::{Error, Result};
use crate::model::{
    CompositeType, FunctionArg, FunctionCategory, FunctionGroup, FunctionInterface, ScalarKind,
    ValueType,
};

/// Types to generate, grouped by family
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    pub vectors: Vec<ValueType>,
    pub ranges: Vec<ValueType>,
    pub arrays: Vec<ValueType>,
    pub composites: Vec<CompositeType>,
}

impl TypeCatalog {
    /// Vector, range and array types in generation order. Composites are
    /// registered separately before emission.
    pub fn declared(&self) -> impl Iterator<Item = &ValueType> {
        self.vectors
            .iter()
            .chain(self.ranges.iter())
            .chain(self.arrays.iter())
    }
}

/// Complete declaration set: types plus function groups
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub types: TypeCatalog,
    pub groups: Vec<FunctionGroup>,
}

impl Catalog {
    pub fn new(types: TypeCatalog, groups: Vec<FunctionGroup>) -> Self {
        Self { types, groups }
    }

    /// Number of functions across all groups
    pub fn function_count(&self) -> usize {
        self.groups.iter().map(|g| g.functions().len()).sum()
    }

    /// The graphics math declaration set
    pub fn graphics_math() -> Result<Self> {
        let decls = Declarations::new()?;
        let types = TypeCatalog {
            vectors: decls.vectors(),
            ranges: decls.ranges.clone(),
            arrays: decls.arrays(),
            composites: Vec::new(),
        };
        let groups = function_groups(&decls)?;
        Ok(Self::new(types, groups))
    }
}

/// Shared type lists the function interfaces are declared over
struct Declarations {
    float: ValueType,
    int: ValueType,
    bool: ValueType,
    vec2f: ValueType,
    vec3f: ValueType,
    mat4f: ValueType,
    float_vectors: Vec<ValueType>,
    int_vectors: Vec<ValueType>,
    matrices: Vec<ValueType>,
    ranges: Vec<ValueType>,
    vector_ranges: Vec<ValueType>,
    float_ranges: Vec<ValueType>,
}

impl Declarations {
    fn new() -> Result<Self> {
        let float = ValueType::scalar(ScalarKind::Float);
        let int = ValueType::scalar(ScalarKind::Int);
        let bool = ValueType::scalar(ScalarKind::Bool);

        let float_vectors = (2..=4)
            .map(|n| ValueType::vector(&[n], ScalarKind::Float))
            .collect::<Result<Vec<_>>>()?;
        let int_vectors = (2..=4)
            .map(|n| ValueType::vector(&[n], ScalarKind::Int))
            .collect::<Result<Vec<_>>>()?;
        let matrices = vec![
            ValueType::vector(&[3, 3], ScalarKind::Float)?,
            ValueType::vector(&[4, 4], ScalarKind::Float)?,
        ];

        let numeric_scalars = [float.clone(), int.clone()];
        let single_index: Vec<ValueType> = float_vectors
            .iter()
            .chain(int_vectors.iter())
            .cloned()
            .collect();

        let ranges = numeric_scalars
            .iter()
            .chain(single_index.iter())
            .cloned()
            .map(ValueType::range)
            .collect::<Result<Vec<_>>>()?;
        let vector_ranges = single_index
            .iter()
            .cloned()
            .map(ValueType::range)
            .collect::<Result<Vec<_>>>()?;
        let float_ranges = float_vectors
            .iter()
            .cloned()
            .chain(std::iter::once(float.clone()))
            .map(ValueType::range)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            vec2f: float_vectors[0].clone(),
            vec3f: float_vectors[1].clone(),
            mat4f: matrices[1].clone(),
            float,
            int,
            bool,
            float_vectors,
            int_vectors,
            matrices,
            ranges,
            vector_ranges,
            float_ranges,
        })
    }

    fn numeric_scalars(&self) -> Vec<ValueType> {
        vec![self.float.clone(), self.int.clone()]
    }

    fn scalars(&self) -> Vec<ValueType> {
        vec![self.float.clone(), self.int.clone(), self.bool.clone()]
    }

    /// Float and int vectors followed by matrices
    fn vectors(&self) -> Vec<ValueType> {
        self.float_vectors
            .iter()
            .chain(self.int_vectors.iter())
            .chain(self.matrices.iter())
            .cloned()
            .collect()
    }

    fn arrays(&self) -> Vec<ValueType> {
        self.numeric_scalars()
            .into_iter()
            .chain(self.float_vectors.iter().cloned())
            .map(ValueType::array)
            .collect()
    }

    /// float, then the float vectors, then the matrices
    fn float_values(&self) -> Vec<ValueType> {
        std::iter::once(self.float.clone())
            .chain(self.float_vectors.iter().cloned())
            .chain(self.matrices.iter().cloned())
            .collect()
    }

    /// Vector with `n` elements of the same scalar kind as `ty`
    fn vector_like(&self, n: usize, ty: &ValueType) -> Result<ValueType> {
        ValueType::vector(&[n], scalar_of(ty)?)
    }

    /// The vector one dimension smaller than a square matrix
    fn matrix_vector(&self, matrix: &ValueType) -> Result<ValueType> {
        match matrix {
            ValueType::Vector(m) if m.is_matrix() => {
                ValueType::vector(&[m.shape()[0] - 1], m.element())
            }
            other => Err(Error::declaration(format!(
                "{} is not a matrix type",
                other.class_name()
            ))),
        }
    }
}

fn scalar_of(ty: &ValueType) -> Result<ScalarKind> {
    ty.scalar_kind().ok_or_else(|| {
        Error::declaration(format!("{} has no scalar element type", ty.class_name()))
    })
}

/// Innermost scalar of `ty` as a value type
fn element_scalar(ty: &ValueType) -> Result<ValueType> {
    scalar_of(ty).map(ValueType::scalar)
}

fn interface(args: Vec<FunctionArg>, ret: Option<ValueType>) -> Result<FunctionInterface> {
    FunctionInterface::new(args, ret)
}

fn input(key: &str, ty: &ValueType) -> FunctionArg {
    FunctionArg::input(key, ty.clone())
}

fn output(key: &str, ty: &ValueType) -> FunctionArg {
    FunctionArg::output(key, ty.clone())
}

/// Interfaces taking two values of one type and returning that type
fn binary_over(types: &[ValueType], lhs: &str, rhs: &str) -> Result<Vec<FunctionInterface>> {
    types
        .iter()
        .map(|ty| interface(vec![input(lhs, ty), input(rhs, ty)], Some(ty.clone())))
        .collect()
}

/// Interfaces taking one value of a type and returning that type
fn unary_over(types: &[ValueType], key: &str) -> Result<Vec<FunctionInterface>> {
    types
        .iter()
        .map(|ty| interface(vec![input(key, ty)], Some(ty.clone())))
        .collect()
}

fn function_groups(d: &Declarations) -> Result<Vec<FunctionGroup>> {
    use FunctionCategory::{Basic, LinearAlgebra, RayTracing};

    let float = &d.float;
    let vec2f = &d.vec2f;
    let vec3f = &d.vec3f;
    let mat4f = &d.mat4f;
    let bool_ty = &d.bool;
    let int_ty = &d.int;

    let unary_ops = unary_over(&d.float_values(), "value")?;

    let range_unary_ops = d
        .ranges
        .iter()
        .map(|range| interface(vec![input("range", range)], Some(element_scalar(range)?)))
        .collect::<Result<Vec<_>>>()?;

    let scalars_and_vectors: Vec<ValueType> =
        d.scalars().into_iter().chain(d.vectors()).collect();
    let comparison_ops = binary_over(&scalars_and_vectors, "valueA", "valueB")?;

    let vector_product_ops = d
        .float_vectors
        .iter()
        .map(|v| interface(vec![input("lhs", v), input("rhs", v)], Some(element_scalar(v)?)))
        .collect::<Result<Vec<_>>>()?;

    let cross_product_ops = binary_over(std::slice::from_ref(vec3f), "lhs", "rhs")?;

    let coordinate_system_ops = vec![interface(
        vec![
            input("vectorA", vec3f),
            output("vectorB", vec3f),
            output("vectorC", vec3f),
        ],
        None,
    )?];

    let vector_reduction_ops = d
        .float_vectors
        .iter()
        .map(|v| interface(vec![input("vector", v)], Some(element_scalar(v)?)))
        .collect::<Result<Vec<_>>>()?;

    let vector_ops = unary_over(&d.float_vectors, "vector")?;

    let set_matrix_ops = d
        .matrices
        .iter()
        .map(|m| interface(vec![output("matrix", m)], None))
        .collect::<Result<Vec<_>>>()?;

    let check_matrix_ops = d
        .matrices
        .iter()
        .map(|m| interface(vec![input("matrix", m)], Some(bool_ty.clone())))
        .collect::<Result<Vec<_>>>()?;

    let matrix_unary_ops = unary_over(&d.matrices, "matrix")?;
    let matrix_binary_ops = binary_over(&d.matrices, "lhs", "rhs")?;

    let set_vector_transform_ops = d
        .matrices
        .iter()
        .map(|m| interface(vec![input("vector", &d.matrix_vector(m)?), output("matrix", m)], None))
        .collect::<Result<Vec<_>>>()?;

    let set_rotate_xyz_ops = vec![interface(
        vec![input("angle", float), output("matrix", mat4f)],
        None,
    )?];

    let set_rotate_ops = vec![interface(
        vec![
            input("angle", float),
            input("axis", &d.matrix_vector(mat4f)?),
            output("matrix", mat4f),
        ],
        None,
    )?];

    let angle_ops = unary_over(std::slice::from_ref(float), "angle")?;

    let point_reduction_ops = [vec2f, vec3f]
        .into_iter()
        .map(|v| {
            interface(
                vec![input("pointA", v), input("pointB", v)],
                Some(element_scalar(v)?),
            )
        })
        .collect::<Result<Vec<_>>>()?;

    let linear_interpolation_ops = std::iter::once(float.clone())
        .chain(d.matrices.iter().cloned())
        .chain(d.float_vectors.iter().cloned())
        .chain(d.float_ranges.iter().cloned())
        .map(|ty| {
            interface(
                vec![
                    input("source", &ty),
                    input("target", &ty),
                    input("weight", &element_scalar(&ty)?),
                ],
                Some(ty.clone()),
            )
        })
        .collect::<Result<Vec<_>>>()?;

    let interpolation_values: Vec<ValueType> = std::iter::once(float.clone())
        .chain(d.matrices.iter().cloned())
        .chain(d.float_vectors.iter().cloned())
        .collect();

    let bilinear_interpolation_ops = interpolation_values
        .iter()
        .map(|ty| {
            let mut args: Vec<FunctionArg> = ["corner00", "corner10", "corner01", "corner11"]
                .iter()
                .map(|key| input(key, ty))
                .collect();
            args.push(input("weight", &d.vector_like(2, ty)?));
            interface(args, Some(ty.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    let trilinear_interpolation_ops = interpolation_values
        .iter()
        .map(|ty| {
            let mut args: Vec<FunctionArg> = [
                "corner000",
                "corner100",
                "corner010",
                "corner110",
                "corner001",
                "corner101",
                "corner011",
                "corner111",
            ]
            .iter()
            .map(|key| input(key, ty))
            .collect();
            args.push(input("weight", &d.vector_like(3, ty)?));
            interface(args, Some(ty.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    let map_ops = interpolation_values
        .iter()
        .map(|ty| {
            let range = ValueType::range(element_scalar(ty)?)?;
            interface(
                vec![
                    input("sourceValue", ty),
                    input("sourceRange", &range),
                    input("targetRange", &range),
                ],
                Some(ty.clone()),
            )
        })
        .collect::<Result<Vec<_>>>()?;

    let clamp_ops = d
        .numeric_scalars()
        .into_iter()
        .chain(d.vectors())
        .map(|ty| {
            let range = ValueType::range(element_scalar(&ty)?)?;
            interface(
                vec![input("value", &ty), input("range", &range)],
                Some(ty.clone()),
            )
        })
        .collect::<Result<Vec<_>>>()?;

    let ray_ops = [vec2f, vec3f]
        .into_iter()
        .map(|v| {
            interface(
                vec![
                    input("origin", v),
                    input("direction", v),
                    input("magnitude", &element_scalar(v)?),
                ],
                Some(v.clone()),
            )
        })
        .collect::<Result<Vec<_>>>()?;

    let range_ops = binary_over(&d.ranges, "lhs", "rhs")?;

    let mut expand_ops = Vec::new();
    for range in &d.ranges {
        let element = range
            .element_type()
            .ok_or_else(|| Error::declaration("range without element type"))?;
        expand_ops.push(interface(
            vec![input("lhs", range), input("rhs", range)],
            Some(range.clone()),
        )?);
        expand_ops.push(interface(
            vec![input("lhs", range), input("rhs", &element)],
            Some(range.clone()),
        )?);
    }

    let mut container_ops = Vec::new();
    for range in &d.ranges {
        let element = range
            .element_type()
            .ok_or_else(|| Error::declaration("range without element type"))?;
        container_ops.push(interface(
            vec![input("container", range), input("containee", &element)],
            Some(bool_ty.clone()),
        )?);
        container_ops.push(interface(
            vec![input("container", range), input("containee", range)],
            Some(bool_ty.clone()),
        )?);
    }

    let quadratic_ops = vec![interface(
        vec![
            input("a", float),
            input("b", float),
            input("c", float),
            output("roots", vec2f),
        ],
        Some(int_ty.clone()),
    )?];

    let float_range = ValueType::range(float.clone())?;

    let ray_sphere_intersection_ops = vec![interface(
        vec![
            input("sphereOrigin", vec3f),
            input("sphereRadius", float),
            input("rayOrigin", vec3f),
            input("rayDirection", vec3f),
            output("intersections", &float_range),
        ],
        Some(int_ty.clone()),
    )?];

    let ray_aabb_intersection_ops = d
        .float_vectors
        .iter()
        .map(|v| {
            interface(
                vec![
                    input("rayOrigin", v),
                    input("rayDirection", v),
                    input("aabb", &ValueType::range(v.clone())?),
                    output("intersections", &float_range),
                ],
                Some(bool_ty.clone()),
            )
        })
        .collect::<Result<Vec<_>>>()?;

    let random_ops = d
        .numeric_scalars()
        .iter()
        .map(|ty| interface(vec![input("range", &ValueType::range(ty.clone())?)], Some(ty.clone())))
        .collect::<Result<Vec<_>>>()?;

    let longest_axis_ops = d
        .vector_ranges
        .iter()
        .map(|range| interface(vec![input("range", range)], Some(int_ty.clone())))
        .collect::<Result<Vec<_>>>()?;

    let face_forward_ops = binary_over(&d.float_vectors, "normal", "guide")?;

    let transform_vector_ops = d
        .matrices
        .iter()
        .map(|m| {
            let v = d.matrix_vector(m)?;
            interface(vec![input("matrix", m), input("vector", &v)], Some(v.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    let transform_point_ops = vec![interface(
        vec![input("matrix", mat4f), input("point", vec3f)],
        Some(vec3f.clone()),
    )?];

    let vec3f_range = ValueType::range(d.matrix_vector(mat4f)?)?;
    let transform_aabb_ops = vec![interface(
        vec![input("matrix", mat4f), input("aabb", &vec3f_range)],
        Some(vec3f_range.clone()),
    )?];

    let look_at_ops = vec![interface(
        vec![input("position", vec3f), input("look", vec3f), input("up", vec3f)],
        Some(mat4f.clone()),
    )?];

    let matrix_inverse_ops = vec![interface(
        vec![input("matrix", mat4f), output("inverse", mat4f)],
        Some(bool_ty.clone()),
    )?];

    let frustum_args = || {
        ["left", "right", "bottom", "top", "near", "far"]
            .iter()
            .map(|key| input(key, float))
            .collect::<Vec<_>>()
    };

    let orthographic_projection_ops = vec![interface(frustum_args(), Some(mat4f.clone()))?];

    let perspective_projection_ops = vec![
        interface(frustum_args(), Some(mat4f.clone()))?,
        interface(
            vec![
                input("fieldOfView", float),
                input("aspectRatio", float),
                input("near", float),
                input("far", float),
            ],
            Some(mat4f.clone()),
        )?,
    ];

    let viewport_transform_ops = vec![interface(
        vec![input("dimensions", vec2f), input("offset", vec2f)],
        Some(mat4f.clone()),
    )?];

    let groups = vec![
        // Basic.
        FunctionGroup::new(&["floor", "ceil", "abs"], unary_ops, Basic)?,
        FunctionGroup::new(&["content"], range_unary_ops, Basic)?,
        FunctionGroup::new(&["min", "max"], comparison_ops, Basic)?,
        FunctionGroup::new(&["quadraticRoots"], quadratic_ops, Basic)?,
        FunctionGroup::new(&["degrees", "radians"], angle_ops, Basic)?,
        FunctionGroup::new(&["randomNumber"], random_ops, Basic)?,
        FunctionGroup::new(&["linearInterpolation"], linear_interpolation_ops, Basic)?,
        FunctionGroup::new(&["bilinearInterpolation"], bilinear_interpolation_ops, Basic)?,
        FunctionGroup::new(&["trilinearInterpolation"], trilinear_interpolation_ops, Basic)?,
        FunctionGroup::new(&["linearMap"], map_ops, Basic)?,
        FunctionGroup::new(&["clamp"], clamp_ops, Basic)?,
        FunctionGroup::new(&["intersection"], range_ops, Basic)?,
        FunctionGroup::new(&["expand"], expand_ops, Basic)?,
        FunctionGroup::new(&["contains"], container_ops, Basic)?,
        FunctionGroup::new(&["longestAxis"], longest_axis_ops, Basic)?,
        // Linear algebra.
        FunctionGroup::new(&["isIdentity", "hasScale"], check_matrix_ops, LinearAlgebra)?,
        FunctionGroup::new(&["setIdentity"], set_matrix_ops, LinearAlgebra)?,
        FunctionGroup::new(&["transpose"], matrix_unary_ops, LinearAlgebra)?,
        FunctionGroup::new(&["matrixProduct"], matrix_binary_ops, LinearAlgebra)?,
        FunctionGroup::new(&["normalize"], vector_ops, LinearAlgebra)?,
        FunctionGroup::new(&["length", "lengthSquared"], vector_reduction_ops, LinearAlgebra)?,
        FunctionGroup::new(&["dotProduct"], vector_product_ops, LinearAlgebra)?,
        FunctionGroup::new(&["crossProduct"], cross_product_ops, LinearAlgebra)?,
        FunctionGroup::new(&["distance"], point_reduction_ops, LinearAlgebra)?,
        FunctionGroup::new(&["setTranslate", "setScale"], set_vector_transform_ops, LinearAlgebra)?,
        FunctionGroup::new(&["setRotateX", "setRotateY", "setRotateZ"], set_rotate_xyz_ops, LinearAlgebra)?,
        FunctionGroup::new(&["setRotate"], set_rotate_ops, LinearAlgebra)?,
        FunctionGroup::new(&["coordinateSystem"], coordinate_system_ops, LinearAlgebra)?,
        FunctionGroup::new(&["faceForward"], face_forward_ops, LinearAlgebra)?,
        FunctionGroup::new(&["transformVector"], transform_vector_ops, LinearAlgebra)?,
        FunctionGroup::new(&["transformPoint"], transform_point_ops, LinearAlgebra)?,
        FunctionGroup::new(&["transformAABB"], transform_aabb_ops, LinearAlgebra)?,
        FunctionGroup::new(&["lookAt"], look_at_ops, LinearAlgebra)?,
        FunctionGroup::new(&["inverse"], matrix_inverse_ops, LinearAlgebra)?,
        FunctionGroup::new(&["orthographicProjection"], orthographic_projection_ops, LinearAlgebra)?,
        FunctionGroup::new(&["perspectiveProjection"], perspective_projection_ops, LinearAlgebra)?,
        FunctionGroup::new(&["viewportTransform"], viewport_transform_ops, LinearAlgebra)?,
        // Ray tracing.
        FunctionGroup::new(&["rayPosition"], ray_ops, RayTracing)?,
        FunctionGroup::new(&["raySphereIntersection"], ray_sphere_intersection_ops, RayTracing)?,
        FunctionGroup::new(&["rayAABBIntersection"], ray_aabb_intersection_ops, RayTracing)?,
    ];

    Ok(groups)
}
