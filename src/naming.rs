// Case conversion helpers shared by the type and function models

/// Return the UpperCamelCase variant of a lowerCamelCase string.
///
/// Only the leading character changes; the remainder is kept verbatim.
pub fn upper_camel_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Return the lowerCamelCase variant of an UpperCamelCase string.
pub fn lower_camel_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_camel_case() {
        assert_eq!(upper_camel_case("floor"), "Floor");
        assert_eq!(upper_camel_case("linearInterpolation"), "LinearInterpolation");
        assert_eq!(upper_camel_case("vec3f"), "Vec3f");
        assert_eq!(upper_camel_case("AABB"), "AABB");
    }

    #[test]
    fn test_lower_camel_case() {
        assert_eq!(lower_camel_case("FloatRange"), "floatRange");
        assert_eq!(lower_camel_case("Vec3f"), "vec3f");
        assert_eq!(lower_camel_case("float"), "float");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(upper_camel_case(""), "");
        assert_eq!(lower_camel_case(""), "");
    }

    #[test]
    fn test_round_trip_preserves_tail() {
        let name = "rayAABBIntersection";
        assert_eq!(lower_camel_case(&upper_camel_case(name)), name);
    }
}
