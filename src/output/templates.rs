// Template engine for generating source artifacts
//
// Wraps Tera. Every rendered artifact gets an "auto-generated" banner whose
// comment syntax follows the output file extension, and every context gets
// the math helpers below.

use crate::error::{Error, Result};
use crate::model::ScalarKind;
use crate::naming::{lower_camel_case, upper_camel_case};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tera::{Context, Tera, Value};
use tracing::debug;
use walkdir::WalkDir;

/// Text of the banner's middle line
pub const BANNER_TEXT: &str = "This file is auto-generated, please do not modify directly!";

/// Comment syntax family of a generated artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `//` for C and C++ sources and headers
    Slash,
    /// `#` for Python sources
    Hash,
}

impl CommentStyle {
    /// Select the comment style from an artifact's file extension
    pub fn for_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("h") | Some("hpp") | Some("cpp") | Some("cc") => Ok(CommentStyle::Slash),
            Some("py") => Ok(CommentStyle::Hash),
            _ => Err(Error::UnknownExtension(path.to_path_buf())),
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            CommentStyle::Slash => "//",
            CommentStyle::Hash => "#",
        }
    }

    /// The banner, followed by one blank line
    pub fn banner(self) -> String {
        let prefix = self.prefix();
        format!("{prefix}\n{prefix} {BANNER_TEXT}\n{prefix}\n\n")
    }
}

/// Constants exposed to every template as `math`
#[derive(Debug, Serialize)]
struct MathConstants {
    pi: f64,
    e: f64,
    tau: f64,
}

const MATH: MathConstants = MathConstants {
    pi: std::f64::consts::PI,
    e: std::f64::consts::E,
    tau: std::f64::consts::TAU,
};

/// Template engine wrapping Tera with codegen filters and functions
pub struct TemplateEngine {
    tera: Tera,
    sources: IndexMap<String, String>,
}

impl TemplateEngine {
    /// Create an engine from in-memory `(name, source)` pairs
    pub fn from_templates<I, N, S>(templates: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let sources: IndexMap<String, String> = templates
            .into_iter()
            .map(|(name, source)| (name.into(), source.into()))
            .collect();

        let mut tera = Tera::default();
        tera.add_raw_templates(
            sources
                .iter()
                .map(|(name, source)| (name.as_str(), source.as_str())),
        )?;
        register_helpers(&mut tera);

        Ok(Self { tera, sources })
    }

    /// Load every file under `template_dir`, keyed by its `/`-separated relative path
    pub fn from_dir(template_dir: &Path) -> Result<Self> {
        if !template_dir.is_dir() {
            return Err(Error::PathNotFound(template_dir.to_path_buf()));
        }

        let mut templates = Vec::new();
        for entry in WalkDir::new(template_dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(template_dir)
                .map_err(|e| Error::other(e.to_string()))?;
            let name = template_name(relative);
            let source = std::fs::read_to_string(entry.path())?;
            debug!("Loaded template {}", name);
            templates.push((name, source));
        }

        Self::from_templates(templates)
    }

    /// Whether a template with this name is loaded
    pub fn has_template(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// Names of all loaded templates
    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    /// Render `template` for the artifact at `output`.
    ///
    /// The banner is prepended to the template source before substitution,
    /// so the result never depends on the template remembering to add it.
    pub fn render(&mut self, template: &str, output: &Path, context: &Context) -> Result<String> {
        let style = CommentStyle::for_path(output)?;
        let source = self
            .sources
            .get(template)
            .ok_or_else(|| Error::TemplateNotFound(PathBuf::from(template)))?;

        let text = format!("{}{}", style.banner(), source);

        let mut context = context.clone();
        context.insert("math", &MATH);

        self.tera
            .render_str(&text, &context)
            .map_err(|e| Error::Render {
                template: template.to_string(),
                message: error_chain(&e),
            })
    }
}

/// `/`-separated name for a path relative to the template root
fn template_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Tera nests the useful message in the error's sources
fn error_chain(err: &tera::Error) -> String {
    let mut messages = vec![err.to_string()];
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        messages.push(inner.to_string());
        source = std::error::Error::source(inner);
    }
    messages.join(": ")
}

/// Math filters return plain numbers, which Tera prints without a trailing
/// `.0` for whole values (`{{ 4 | sqrt }}` renders `2`). Route results meant
/// for generated source through `cpp_value` or `py_value`.
fn register_helpers(tera: &mut Tera) {
    tera.register_filter("upper_camel", upper_camel_filter);
    tera.register_filter("lower_camel", lower_camel_filter);

    tera.register_filter("sqrt", |v: &Value, _: &HashMap<String, Value>| {
        unary_math(v, "sqrt", f64::sqrt)
    });
    tera.register_filter("radians", |v: &Value, _: &HashMap<String, Value>| {
        unary_math(v, "radians", f64::to_radians)
    });
    tera.register_filter("degrees", |v: &Value, _: &HashMap<String, Value>| {
        unary_math(v, "degrees", f64::to_degrees)
    });
    tera.register_filter("sin", |v: &Value, _: &HashMap<String, Value>| {
        unary_math(v, "sin", f64::sin)
    });
    tera.register_filter("cos", |v: &Value, _: &HashMap<String, Value>| {
        unary_math(v, "cos", f64::cos)
    });
    tera.register_filter("tan", |v: &Value, _: &HashMap<String, Value>| {
        unary_math(v, "tan", f64::tan)
    });
    tera.register_filter("floor", |v: &Value, _: &HashMap<String, Value>| {
        unary_math(v, "floor", f64::floor)
    });
    tera.register_filter("ceil", |v: &Value, _: &HashMap<String, Value>| {
        unary_math(v, "ceil", f64::ceil)
    });
    tera.register_filter("pow", pow_filter);

    tera.register_function("cpp_value", cpp_value);
    tera.register_function("py_value", py_value);
}

fn number(value: &Value, what: &str) -> tera::Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| tera::Error::msg(format!("{} expects a number, got {}", what, value)))
}

fn unary_math(value: &Value, name: &str, op: fn(f64) -> f64) -> tera::Result<Value> {
    finite_result(name, op(number(value, name)?))
}

/// JSON has no NaN or infinity, so such results become an error instead of `null`
fn finite_result(name: &str, result: f64) -> tera::Result<Value> {
    if result.is_finite() {
        Ok(Value::from(result))
    } else {
        Err(tera::Error::msg(format!("{} produced non-finite value {}", name, result)))
    }
}

/// `{{ 2 | pow(exp=3) }}`
fn pow_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let base = number(value, "pow")?;
    let exp = args
        .get("exp")
        .ok_or_else(|| tera::Error::msg("pow requires an `exp` argument"))
        .and_then(|v| number(v, "pow exp"))?;
    finite_result("pow", base.powf(exp))
}

fn upper_camel_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = tera::try_get_value!("upper_camel", "value", String, value);
    Ok(Value::String(upper_camel_case(&s)))
}

fn lower_camel_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = tera::try_get_value!("lower_camel", "value", String, value);
    Ok(Value::String(lower_camel_case(&s)))
}

/// Resolve the `type` and `value` arguments of a literal helper.
///
/// `type` is either a serialized value type or a scalar name such as `"float"`.
fn literal_args(name: &str, args: &HashMap<String, Value>) -> tera::Result<(ScalarKind, f64)> {
    let kind_name = match args.get("type") {
        Some(Value::String(s)) => s.as_str(),
        Some(Value::Object(obj)) => obj
            .get("scalarType")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                tera::Error::msg(format!("{}: `type` has no scalar element type", name))
            })?,
        Some(other) => {
            return Err(tera::Error::msg(format!(
                "{}: `type` must be a value type or scalar name, got {}",
                name, other
            )))
        }
        None => return Err(tera::Error::msg(format!("{} requires a `type` argument", name))),
    };

    let kind: ScalarKind = kind_name
        .parse()
        .map_err(|e: Error| tera::Error::msg(format!("{}: {}", name, e)))?;

    let value = args
        .get("value")
        .ok_or_else(|| tera::Error::msg(format!("{} requires a `value` argument", name)))
        .and_then(|v| number(v, name))?;

    Ok((kind, value))
}

/// `{{ cpp_value(type=valueType, value=2) }}` renders `2.0f` for float types
fn cpp_value(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let (kind, value) = literal_args("cpp_value", args)?;
    kind.cpp_number(value)
        .map(Value::String)
        .map_err(|e| tera::Error::msg(format!("cpp_value: {}", e)))
}

/// `{{ py_value(type=valueType, value=2) }}` renders `2.0` for float types
fn py_value(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let (kind, value) = literal_args("py_value", args)?;
    kind.py_number(value)
        .map(Value::String)
        .map_err(|e| tera::Error::msg(format!("py_value: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ValueType;
    use std::fs;
    use tempfile::TempDir;

    fn engine(templates: &[(&str, &str)]) -> TemplateEngine {
        TemplateEngine::from_templates(templates.iter().copied()).unwrap()
    }

    #[test]
    fn test_comment_style_for_path() {
        assert_eq!(
            CommentStyle::for_path(Path::new("types/vec3f.h")).unwrap(),
            CommentStyle::Slash
        );
        assert_eq!(
            CommentStyle::for_path(Path::new("python/module.cpp")).unwrap(),
            CommentStyle::Slash
        );
        assert_eq!(
            CommentStyle::for_path(Path::new("python/types/tests/testVec3f.py")).unwrap(),
            CommentStyle::Hash
        );
        assert!(CommentStyle::for_path(Path::new("README.md")).is_err());
        assert!(CommentStyle::for_path(Path::new("Makefile")).is_err());
    }

    #[test]
    fn test_render_slash_banner() {
        let mut engine = engine(&[("functions/floor.h", "{{ name }}();\n")]);
        let mut context = Context::new();
        context.insert("name", "Floor");

        let text = engine
            .render("functions/floor.h", Path::new("functions/floor.h"), &context)
            .unwrap();
        assert_eq!(
            text,
            "//\n// This file is auto-generated, please do not modify directly!\n//\n\nFloor();\n"
        );
    }

    #[test]
    fn test_render_hash_banner() {
        let mut engine = engine(&[("test.py", "import gm\n")]);
        let text = engine
            .render("test.py", Path::new("python/tests/testVec3f.py"), &Context::new())
            .unwrap();
        assert!(text.starts_with("#\n# This file is auto-generated, please do not modify directly!\n#\n\n"));
        assert!(text.ends_with("import gm\n"));
    }

    #[test]
    fn test_render_unknown_extension_fails() {
        let mut engine = engine(&[("notes.txt", "hello")]);
        let err = engine
            .render("notes.txt", Path::new("notes.txt"), &Context::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownExtension(ref p) if p == Path::new("notes.txt")));
    }

    #[test]
    fn test_render_missing_template() {
        let mut engine = engine(&[]);
        let err = engine
            .render("functions/nope.h", Path::new("functions/nope.h"), &Context::new())
            .unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound(_)));
    }

    #[test]
    fn test_render_error_names_template() {
        let mut engine = engine(&[("broken.h", "{{ missing.field }}")]);
        let err = engine
            .render("broken.h", Path::new("broken.h"), &Context::new())
            .unwrap_err();
        assert!(err.to_string().contains("broken.h"));
    }

    #[test]
    fn test_math_helpers_available() {
        let mut engine = engine(&[(
            "math.h",
            "{{ 4 | sqrt }} {{ 180 | radians | round(precision=4) }} {{ math.pi | round(precision=2) }} {{ 2 | pow(exp=3) }}",
        )]);
        let text = engine
            .render("math.h", Path::new("math.h"), &Context::new())
            .unwrap();
        assert!(text.ends_with("2 3.1416 3.14 8"), "got {:?}", text);
    }

    #[test]
    fn test_math_results_as_literals() {
        let mut engine = engine(&[(
            "math.h",
            "{{ cpp_value(type=\"float\", value=4 | sqrt) }} {{ cpp_value(type=\"double\", value=2 | pow(exp=3)) }}",
        )]);
        let text = engine
            .render("math.h", Path::new("math.h"), &Context::new())
            .unwrap();
        assert!(text.ends_with("2.0f 8.0"), "got {:?}", text);
    }

    #[test]
    fn test_non_finite_math_fails_render() {
        let mut engine = engine(&[
            ("nan.h", "{{ cpp_value(type=\"float\", value=-1 | sqrt) }}"),
            ("inf.h", "{{ 10 | pow(exp=400) }}"),
        ]);

        let err = engine
            .render("nan.h", Path::new("nan.h"), &Context::new())
            .unwrap_err();
        assert!(matches!(err, Error::Render { ref template, .. } if template == "nan.h"));
        assert!(err.to_string().contains("sqrt produced non-finite value NaN"), "got {}", err);

        let err = engine
            .render("inf.h", Path::new("inf.h"), &Context::new())
            .unwrap_err();
        assert!(err.to_string().contains("pow produced non-finite value inf"), "got {}", err);
    }

    #[test]
    fn test_cpp_value_with_type_object() {
        let mut engine = engine(&[(
            "value.h",
            "{{ cpp_value(type=valueType, value=2) }} {{ cpp_value(type=\"int\", value=2.9) }}",
        )]);
        let mut context = Context::new();
        context.insert(
            "valueType",
            &ValueType::vector(&[3], crate::model::ScalarKind::Float).unwrap(),
        );
        let text = engine
            .render("value.h", Path::new("value.h"), &context)
            .unwrap();
        assert!(text.ends_with("2.0f 2"), "got {:?}", text);
    }

    #[test]
    fn test_py_value() {
        let mut engine = engine(&[("value.py", "{{ py_value(type=\"float\", value=3) }}")]);
        let text = engine
            .render("value.py", Path::new("value.py"), &Context::new())
            .unwrap();
        assert!(text.ends_with("3.0"));
    }

    #[test]
    fn test_camel_filters() {
        let mut engine = engine(&[(
            "names.h",
            "{{ \"floatRange\" | upper_camel }} {{ \"Vec3f\" | lower_camel }}",
        )]);
        let text = engine
            .render("names.h", Path::new("names.h"), &Context::new())
            .unwrap();
        assert!(text.ends_with("FloatRange vec3f"));
    }

    #[test]
    fn test_from_dir_uses_relative_names() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("functions/tests")).unwrap();
        fs::write(dir.path().join("functions/function.h"), "x").unwrap();
        fs::write(dir.path().join("functions/tests/testFloor.cpp"), "y").unwrap();

        let engine = TemplateEngine::from_dir(dir.path()).unwrap();
        assert!(engine.has_template("functions/function.h"));
        assert!(engine.has_template("functions/tests/testFloor.cpp"));
        assert!(!engine.has_template("functions/tests/testCeil.cpp"));
        assert_eq!(engine.template_names().count(), 2);
    }

    #[test]
    fn test_from_dir_missing() {
        let result = TemplateEngine::from_dir(Path::new("/nonexistent/templates"));
        assert!(matches!(result, Err(Error::PathNotFound(_))));
    }
}
