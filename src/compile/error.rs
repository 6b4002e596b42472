//! Errors raised while building render trees and drawing records

use thiserror::Error;

/// Failure while compiling a template tree or drawing one of its definitions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// A definition points at a section that is never declared
    #[error("section '{section}' referenced by '{definition}' does not exist in template '{template}'")]
    MissingSection {
        template: String,
        definition: String,
        section: String,
    },

    /// A named image or document resource was not loaded for the template
    #[error("{kind} resource '{name}' not found")]
    MissingResource { kind: &'static str, name: String },

    /// A font family was requested that the run never loaded
    #[error("font '{family}' is not loaded")]
    MissingFont { family: String },

    /// A record value cannot be drawn by the definition it is bound to
    #[error("bad value for '{definition}': {message}")]
    BadFieldValue { definition: String, message: String },
}

impl RenderError {
    pub fn missing_image(name: impl Into<String>) -> Self {
        Self::MissingResource {
            kind: "image",
            name: name.into(),
        }
    }

    pub fn missing_document(name: impl Into<String>) -> Self {
        Self::MissingResource {
            kind: "pdf",
            name: name.into(),
        }
    }

    pub fn missing_font(family: impl Into<String>) -> Self {
        Self::MissingFont {
            family: family.into(),
        }
    }

    pub fn bad_value(definition: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadFieldValue {
            definition: definition.into(),
            message: message.into(),
        }
    }

    /// Whether this error comes from template structure rather than record data
    pub fn is_structural(&self) -> bool {
        matches!(self, RenderError::MissingSection { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            RenderError::missing_image("logo").to_string(),
            "image resource 'logo' not found"
        );
        assert_eq!(
            RenderError::missing_font("arial").to_string(),
            "font 'arial' is not loaded"
        );
        assert!(!RenderError::missing_font("arial").is_structural());
    }
}
