use std::fmt;

use serde_json::Value;

/// One segment of a `ValidationIssue`'s path: a property name for object
/// descent, or an index for array descent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Property(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Property(name) => write!(f, ".{name}"),
            PathSegment::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// A sequence of path segments, renderable as e.g. `.user[0].email`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path(pub Vec<PathSegment>);

impl Path {
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn child_property(&self, name: impl Into<String>) -> Path {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Property(name.into()));
        Path(segments)
    }

    pub fn child_index(&self, index: usize) -> Path {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Path(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(root)");
        }
        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                PathSegment::Property(name) if i == 0 => write!(f, "{name}")?,
                other => write!(f, "{other}")?,
            }
        }
        Ok(())
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub path: Path,
    pub code: &'static str,
    pub message: String,
    pub value: Option<Value>,
    pub expected: Option<String>,
    pub suggestion: Option<String>,
    pub context: Option<Value>,
}

impl ValidationIssue {
    pub fn new(path: Path, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            path,
            code,
            message: message.into(),
            value: None,
            expected: None,
            suggestion: None,
            context: None,
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }
}

/// The outcome of validating one value against one schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub metadata: Option<Value>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            metadata: None,
        }
    }

    pub fn single_error(issue: ValidationIssue) -> Self {
        Self {
            valid: false,
            errors: vec![issue],
            metadata: None,
        }
    }

    pub fn from_errors(errors: Vec<ValidationIssue>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// ANDs `valid` and concatenates `errors`. `metadata` is
    /// taken from whichever side carries it, preferring `self`'s if both do —
    /// merge never silently drops diagnostic metadata.
    pub fn merge(self, other: ValidationResult) -> ValidationResult {
        let mut errors = self.errors;
        errors.extend(other.errors);
        ValidationResult {
            valid: self.valid && other.valid,
            errors,
            metadata: self.metadata.or(other.metadata),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_with_ok_is_identity() {
        let r = ValidationResult::single_error(ValidationIssue::new(
            Path::root(),
            "type_mismatch",
            "bad",
        ));
        assert_eq!(r.clone().merge(ValidationResult::ok()), r);
        assert_eq!(ValidationResult::ok().merge(r.clone()), r);
    }

    #[test]
    fn merge_is_associative() {
        let a = ValidationResult::single_error(ValidationIssue::new(Path::root(), "a", "a"));
        let b = ValidationResult::single_error(ValidationIssue::new(Path::root(), "b", "b"));
        let c = ValidationResult::single_error(ValidationIssue::new(Path::root(), "c", "c"));

        let left = a.clone().merge(b.clone()).merge(c.clone());
        let right = a.merge(b.merge(c));
        assert_eq!(left, right);
    }

    #[test]
    fn path_display_uses_dot_and_bracket_segments() {
        let path = Path::root().child_property("user").child_index(0).child_property("email");
        assert_eq!(path.to_string(), "user[0].email");
    }
}
