//! Parser configuration.

use serde::{Deserialize, Serialize};

/// Options for a single parse run, matching the `parser` section of a
/// `limitc` JSON config file. Missing keys take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserOptions {
    /// Build the lossless CST alongside the AST.
    pub cst_mode: bool,
    /// Give every expression production its own CST node instead of only
    /// statements, declarations, types and patterns.
    pub detailed_expression_nodes: bool,
    /// Error diagnostics after which the parse stops.
    pub max_errors: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            cst_mode: false,
            detailed_expression_nodes: false,
            max_errors: 100,
        }
    }
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cst_mode(mut self, enabled: bool) -> Self {
        self.cst_mode = enabled;
        self
    }

    pub fn with_detailed_expression_nodes(mut self, enabled: bool) -> Self {
        self.detailed_expression_nodes = enabled;
        self
    }

    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParserOptions::default();
        assert!(!options.cst_mode);
        assert!(!options.detailed_expression_nodes);
        assert_eq!(options.max_errors, 100);
    }

    #[test]
    fn test_builder() {
        let options = ParserOptions::new()
            .with_cst_mode(true)
            .with_detailed_expression_nodes(true)
            .with_max_errors(5);
        assert!(options.cst_mode);
        assert!(options.detailed_expression_nodes);
        assert_eq!(options.max_errors, 5);
    }

    #[test]
    fn test_partial_json() {
        let options: ParserOptions = serde_json::from_str(r#"{ "cstMode": true }"#).unwrap();
        assert!(options.cst_mode);
        assert_eq!(options.max_errors, 100);

        let options: ParserOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, ParserOptions::default());
    }
}
