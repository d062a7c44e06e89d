//! Value-shape labels for the general preview pass.

use regex::Regex;
use std::sync::OnceLock;

/// Shape labels in precedence order, each with its detector.
struct ShapePatterns {
    shapes: Vec<(&'static str, Regex)>,
}

impl ShapePatterns {
    /// Gets the singleton instance of pre-compiled shape patterns.
    ///
    /// Patterns are literals; a compile failure leaves that shape out.
    fn instance() -> &'static Self {
        static PATTERNS: OnceLock<ShapePatterns> = OnceLock::new();
        PATTERNS.get_or_init(Self::compile)
    }

    fn compile() -> Self {
        let shapes = [
            ("Numeric", r"^\d+$"),
            ("Alphabetic", r"^[a-zA-Z]+$"),
            ("Alphanumeric", r"^[a-zA-Z0-9]+$"),
            ("Date (ISO)", r"^\d{4}-\d{2}-\d{2}"),
            ("Email-like", r"@"),
        ]
        .into_iter()
        .filter_map(|(label, pattern)| Regex::new(pattern).ok().map(|regex| (label, regex)))
        .collect();

        Self { shapes }
    }

    /// First matching label for one value.
    fn classify(&self, value: &str) -> Option<usize> {
        self.shapes
            .iter()
            .position(|(_, regex)| regex.is_match(value))
    }
}

/// Labels the shapes present in `sample`.
///
/// Each non-empty value gets the first matching label; the distinct labels
/// are returned in the fixed order Numeric, Alphabetic, Alphanumeric,
/// Date (ISO), Email-like.
///
/// # Example
/// ```rust
/// use pattern_analyzer_core::analysis::detect_value_shapes;
///
/// let sample = ["42", "2024-01-31", "ops@example.com", "42"].map(String::from);
/// assert_eq!(detect_value_shapes(&sample), vec!["Numeric", "Date (ISO)", "Email-like"]);
/// ```
pub fn detect_value_shapes(sample: &[String]) -> Vec<String> {
    let patterns = ShapePatterns::instance();
    let mut seen = vec![false; patterns.shapes.len()];

    for value in sample.iter().filter(|v| !v.is_empty()) {
        if let Some(index) = patterns.classify(value) {
            seen[index] = true;
        }
    }

    patterns
        .shapes
        .iter()
        .zip(seen)
        .filter(|(_, present)| *present)
        .map(|((label, _), _)| (*label).to_string())
        .collect()
}
