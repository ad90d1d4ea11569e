use crate::utils::error::{DeployError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[&str],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        match std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(extension) if allowed_set.contains(extension) => {}
            Some(extension) => {
                return Err(DeployError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(DeployError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Kubernetes object names: lowercase alphanumerics, `-` and `.`, starting
/// and ending with an alphanumeric, at most 253 characters.
pub fn validate_object_name(field_name: &str, value: &str) -> Result<()> {
    check_dns_name(field_name, value, 253, true)
}

/// Namespaces are DNS labels: like object names but without dots and at most 63 characters.
pub fn validate_namespace(field_name: &str, value: &str) -> Result<()> {
    check_dns_name(field_name, value, 63, false)
}

fn check_dns_name(field_name: &str, value: &str, max_len: usize, allow_dots: bool) -> Result<()> {
    let invalid = |reason: String| DeployError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason,
    };

    if value.is_empty() || value.len() > max_len {
        return Err(invalid(format!("Must be 1 to {} characters long", max_len)));
    }

    let allowed_char = |c: char| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || (allow_dots && c == '.')
    };
    if !value.chars().all(allowed_char) {
        let allowed = if allow_dots {
            "lowercase letters, digits, '-' and '.'"
        } else {
            "lowercase letters, digits and '-'"
        };
        return Err(invalid(format!("May only contain {}", allowed)));
    }

    let alphanumeric = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
    if !alphanumeric(value.chars().next()) || !alphanumeric(value.chars().last()) {
        return Err(invalid("Must start and end with a letter or digit".to_string()));
    }

    Ok(())
}

pub fn validate_unique<'a>(
    field_name: &str,
    values: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(DeployError::ConfigValidationError {
                field: field_name.to_string(),
                message: format!("Duplicate entry '{}'", value),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_file_extensions() {
        let allowed = ["yaml", "yml", "json"];
        assert!(validate_file_extensions("steps", &["config.yaml", "svc.yml"], &allowed).is_ok());
        assert!(validate_file_extensions("steps", &["notes.txt"], &allowed).is_err());
        assert!(validate_file_extensions("manifests.steps", &["Makefile"], &["yaml"]).is_err());
    }

    #[test]
    fn test_validate_object_name() {
        assert!(validate_object_name("resource", "spire-demo-config").is_ok());
        assert!(validate_object_name("resource", "spire.example.org").is_ok());
        assert!(validate_object_name("resource", "Frontend").is_err());
        assert!(validate_object_name("resource", "-frontend").is_err());
        assert!(validate_object_name("resource", "").is_err());
    }

    #[test]
    fn test_validate_namespace() {
        assert!(validate_namespace("namespace", "spire-demo").is_ok());
        assert!(validate_namespace("namespace", "spire.demo").is_err());
        assert!(validate_namespace("namespace", &"a".repeat(64)).is_err());
    }

    #[test]
    fn test_validate_unique() {
        assert!(validate_unique("steps", ["a", "b"]).is_ok());
        assert!(validate_unique("steps", ["a", "b", "a"]).is_err());
    }
}
