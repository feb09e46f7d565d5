use crate::domain::error::DomainError;

/// Longest username MySQL accepts.
pub const MAX_DB_USER_LEN: usize = 32;

/// Longest database name MySQL accepts.
pub const MAX_DB_NAME_LEN: usize = 64;

/// Centralized domain validation.
///
/// All validation and identifier derivation lives here, not scattered across
/// entities.
pub struct DomainValidator;

impl DomainValidator {
    /// Project names become directory names, domain labels, and (after
    /// sanitising) database identifiers.
    pub fn validate_project_name(name: &str) -> Result<(), DomainError> {
        let invalid = |reason: &str| DomainError::InvalidProjectName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if name.trim().is_empty() {
            return Err(invalid("name cannot be empty"));
        }
        if name.starts_with('.') || name.starts_with('-') {
            return Err(invalid("name cannot start with '.' or '-'"));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(invalid("name cannot contain path separators"));
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')))
        {
            return Err(invalid(&format!("character '{c}' is not allowed")));
        }
        Ok(())
    }

    /// Validate a DNS name of dot-separated labels.
    pub fn validate_domain(domain: &str) -> Result<(), DomainError> {
        let invalid = |reason: String| DomainError::InvalidDomain {
            domain: domain.to_string(),
            reason,
        };

        if domain.is_empty() {
            return Err(invalid("domain cannot be empty".into()));
        }
        if domain.len() > 253 {
            return Err(invalid("domain longer than 253 characters".into()));
        }
        for label in domain.split('.') {
            if label.is_empty() || label.len() > 63 {
                return Err(invalid(format!("label '{label}' must be 1-63 characters")));
            }
            if label.starts_with('-') || label.ends_with('-') {
                return Err(invalid(format!("label '{label}' cannot start or end with '-'")));
            }
            if !label
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            {
                return Err(invalid(format!(
                    "label '{label}' may only contain a-z, 0-9 and '-'"
                )));
            }
        }
        Ok(())
    }

    /// `<name>.local`, with the name folded into a valid DNS label.
    pub fn default_domain(name: &str) -> String {
        let label: String = name
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        format!("{}.local", label.trim_matches('-'))
    }

    /// Reduce a project name to a database identifier matching `[a-z0-9_]*`.
    ///
    /// ASCII-lowercases, turns whitespace and `-` into `_`, then drops every
    /// other character outside the allowed set.
    pub fn sanitize_identifier(input: &str) -> Result<String, DomainError> {
        let identifier: String = input
            .chars()
            .map(|c| c.to_ascii_lowercase())
            .map(|c| if c.is_whitespace() || c == '-' { '_' } else { c })
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
            .take(MAX_DB_NAME_LEN)
            .collect();

        if identifier.is_empty() {
            return Err(DomainError::EmptyIdentifier {
                input: input.to_string(),
            });
        }
        Ok(identifier)
    }

    /// Username derived from a sanitised identifier.
    pub fn database_user(identifier: &str) -> String {
        identifier.chars().take(MAX_DB_USER_LEN).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::DomainValidator as v;
    use super::*;

    #[test]
    fn sanitizer_matches_documented_example() {
        assert_eq!(v::sanitize_identifier("My Cool App!").unwrap(), "my_cool_app");
    }

    #[test]
    fn sanitizer_output_only_contains_allowed_chars() {
        for input in ["blog", "Shop-2024", "a.b.c", "ÜBER app", "x__y", "  spaced  "] {
            let id = v::sanitize_identifier(input).unwrap();
            assert!(
                id.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
                "{input} -> {id}"
            );
        }
    }

    #[test]
    fn sanitizer_is_non_empty_when_input_has_alphanumerics() {
        assert_eq!(v::sanitize_identifier("!!a!!").unwrap(), "a");
        assert_eq!(v::sanitize_identifier("9").unwrap(), "9");
    }

    #[test]
    fn sanitizer_rejects_inputs_without_alphanumerics() {
        assert!(matches!(
            v::sanitize_identifier("!!!"),
            Err(DomainError::EmptyIdentifier { .. })
        ));
        assert!(v::sanitize_identifier("").is_err());
    }

    #[test]
    fn sanitizer_caps_identifier_length() {
        let long = "a".repeat(200);
        assert_eq!(v::sanitize_identifier(&long).unwrap().len(), MAX_DB_NAME_LEN);
        assert_eq!(v::database_user(&long).len(), MAX_DB_USER_LEN);
    }

    #[test]
    fn default_domain_appends_local() {
        assert_eq!(v::default_domain("blog"), "blog.local");
        assert_eq!(v::default_domain("My_Shop"), "my-shop.local");
    }

    #[test]
    fn domain_validation() {
        assert!(v::validate_domain("blog.local").is_ok());
        assert!(v::validate_domain("api.my-shop.test").is_ok());
        assert!(v::validate_domain("").is_err());
        assert!(v::validate_domain("bad..local").is_err());
        assert!(v::validate_domain("-bad.local").is_err());
        assert!(v::validate_domain("Upper.local").is_err());
    }

    #[test]
    fn project_name_validation() {
        for ok in ["blog", "my-shop", "api_v2", "site.v1", "App9"] {
            assert!(v::validate_project_name(ok).is_ok(), "{ok}");
        }
        for bad in ["", " ", ".hidden", "-flag", "a/b", "a\\b", "my app"] {
            assert!(v::validate_project_name(bad).is_err(), "{bad:?}");
        }
    }
}
