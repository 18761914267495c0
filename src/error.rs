use std::path::PathBuf;
use thiserror::Error;

/// Code generation error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    ConfigValidation(String),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Failed to render template {template}: {message}")]
    Render { template: String, message: String },

    #[error("Template not found: {0}")]
    TemplateNotFound(PathBuf),

    #[error("Unknown codegen artifact extension: {0}")]
    UnknownExtension(PathBuf),

    #[error("Invalid declaration: {0}")]
    Declaration(String),

    #[error("Type {name} is already registered with a different structure")]
    TypeConflict { name: String },

    #[error("Duplicate function declaration: {0}")]
    DuplicateFunction(String),

    #[error("Duplicate function declarations: {}", .0.join(", "))]
    DuplicateFunctions(Vec<String>),

    #[error("Function {function} references unregistered type {type_name}")]
    UnresolvedType { function: String, type_name: String },

    #[error("Composite {composite} has element of unregistered type {type_name}")]
    UnresolvedElement { composite: String, type_name: String },

    #[error("Formatter {tool} failed: {message}")]
    Format { tool: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for code generation operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config validation error
    pub fn config_validation(msg: impl Into<String>) -> Self {
        Error::ConfigValidation(msg.into())
    }

    /// Create a declaration error
    pub fn declaration(msg: impl Into<String>) -> Self {
        Error::Declaration(msg.into())
    }

    /// Create a formatter error
    pub fn format(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Format {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_path_not_found_display() {
        let err = Error::PathNotFound(PathBuf::from("/some/path"));
        assert_eq!(err.to_string(), "Path not found: /some/path");
    }

    #[test]
    fn test_unknown_extension_names_path() {
        let err = Error::UnknownExtension(PathBuf::from("types/vec3f.txt"));
        assert_eq!(
            err.to_string(),
            "Unknown codegen artifact extension: types/vec3f.txt"
        );
    }

    #[test]
    fn test_duplicate_functions_lists_all() {
        let err = Error::DuplicateFunctions(vec!["Normalize".to_string(), "Floor".to_string()]);
        assert_eq!(
            err.to_string(),
            "Duplicate function declarations: Normalize, Floor"
        );
    }

    #[test]
    fn test_declaration_display() {
        let err = Error::declaration("vector shape must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid declaration: vector shape must not be empty"
        );
    }

    #[test]
    fn test_unresolved_type_display() {
        let err = Error::UnresolvedType {
            function: "Length".to_string(),
            type_name: "Vec5f".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Function Length references unregistered type Vec5f"
        );
    }

    #[test]
    fn test_unresolved_element_display() {
        let err = Error::UnresolvedElement {
            composite: "Bounds".to_string(),
            type_name: "Vec5f".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Composite Bounds has element of unregistered type Vec5f"
        );
    }

    #[test]
    fn test_format_error() {
        let err = Error::format("clang-format", "exit status 1");
        assert_eq!(err.to_string(), "Formatter clang-format failed: exit status 1");
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("something went wrong");
        assert_eq!(err.to_string(), "something went wrong");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
