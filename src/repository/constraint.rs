//! Opaque version constraints.

use std::fmt;
use std::sync::Arc;

type Predicate = dyn Fn(&str) -> bool + Send + Sync;

/// A version-matching predicate supplied by the caller.
///
/// The pool never interprets a constraint; it is handed to each
/// repository, which asks it whether a candidate version is allowed.
#[derive(Clone)]
pub struct Constraint {
    repr: String,
    predicate: Option<Arc<Predicate>>,
}

impl Constraint {
    /// A constraint that allows every version.
    pub fn any() -> Self {
        Self {
            repr: "*".to_string(),
            predicate: None,
        }
    }

    /// A constraint that allows exactly `version`.
    pub fn exact(version: impl Into<String>) -> Self {
        let version = version.into();
        let expected = version.clone();
        Self {
            repr: format!("=={}", version),
            predicate: Some(Arc::new(move |candidate| candidate == expected)),
        }
    }

    /// Wrap an arbitrary predicate. `repr` is used for display only.
    pub fn new<F>(repr: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            repr: repr.into(),
            predicate: Some(Arc::new(predicate)),
        }
    }

    pub fn allows(&self, version: &str) -> bool {
        self.predicate.as_ref().is_none_or(|p| p(version))
    }

    pub fn is_any(&self) -> bool {
        self.predicate.is_none()
    }

    /// Whether the constraint pins exactly this version.
    pub fn is_exact(&self, version: &str) -> bool {
        self.repr.strip_prefix("==") == Some(version)
    }
}

impl Default for Constraint {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr)
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Constraint").field(&self.repr).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_allows_everything() {
        let c = Constraint::any();
        assert!(c.is_any());
        assert!(c.allows("1.0"));
        assert!(c.allows("2.0rc1"));
        assert_eq!(c.to_string(), "*");
    }

    #[test]
    fn test_exact() {
        let c = Constraint::exact("1.2.3");
        assert!(!c.is_any());
        assert!(c.allows("1.2.3"));
        assert!(!c.allows("1.2.4"));
        assert!(c.is_exact("1.2.3"));
        assert!(!c.is_exact("1.2"));
        assert_eq!(c.to_string(), "==1.2.3");
    }

    #[test]
    fn test_custom_predicate() {
        let c = Constraint::new("^1", |v| v.starts_with("1."));
        assert!(c.allows("1.4"));
        assert!(!c.allows("2.0"));
        assert_eq!(format!("{:?}", c), "Constraint(\"^1\")");
    }

    #[test]
    fn test_default_is_any() {
        assert!(Constraint::default().is_any());
    }
}
