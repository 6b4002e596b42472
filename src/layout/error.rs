//! Error types for page layout and group placement

use thiserror::Error;

/// Errors that can occur while computing cells or group positions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    /// Layout mode string or cell list could not be understood
    #[error("invalid layout mode '{mode}'")]
    InvalidLayoutMode { mode: String },

    /// Cell index past the end of the layout
    #[error("cell {index} out of range (layout has {count} cells)")]
    CellOutOfRange { index: usize, count: usize },

    /// No fixed template declares the requested group area
    #[error("group '{name}' not found in any fixed layout")]
    GroupNotFound { name: String },

    /// Positioning strategy is not one of linear, auto or grid
    #[error("unknown positioning strategy '{strategy}' (valid strategies: {valid})")]
    UnknownPositioning { strategy: String, valid: String },
}

impl LayoutError {
    pub fn invalid_mode(mode: impl Into<String>) -> Self {
        Self::InvalidLayoutMode { mode: mode.into() }
    }

    pub fn out_of_range(index: usize, count: usize) -> Self {
        Self::CellOutOfRange { index, count }
    }

    pub fn group_not_found(name: impl Into<String>) -> Self {
        Self::GroupNotFound { name: name.into() }
    }

    pub fn unknown_positioning(strategy: impl Into<String>, valid: &[&str]) -> Self {
        Self::UnknownPositioning {
            strategy: strategy.into(),
            valid: valid.join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_display() {
        let err = LayoutError::out_of_range(4, 4);
        assert_eq!(err.to_string(), "cell 4 out of range (layout has 4 cells)");
    }

    #[test]
    fn test_unknown_positioning_display() {
        let err = LayoutError::unknown_positioning("spiral", &["linear", "auto", "grid"]);
        assert!(err.to_string().contains("linear, auto, grid"));
    }
}
