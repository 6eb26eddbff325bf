//! Resolution queries.
//!
//! A [`ResolutionQuery`] describes the context rules are being resolved
//! for. It is a read-only value object: the engine never mutates it, and
//! accessors expose the normalized values the matcher compares against.

use rulestore_core::util::ids::normalize_segment;
use rulestore_core::{Error, Result};
use serde::Serialize;

/// The context a caller wants rules for.
///
/// `language` is required; everything else is optional. A `structure`
/// without a `framework` is rejected by [`validate`](Self::validate),
/// since structure variants only exist beneath a framework.
///
/// # Example
///
/// ```
/// use rulestore_engine::ResolutionQuery;
///
/// let query = ResolutionQuery::new("go")
///     .with_framework("gin")
///     .with_structure("modular")
///     .with_file_path("internal/api/handler_test.go");
///
/// assert_eq!(query.language(), "go");
/// assert_eq!(query.framework(), Some("gin"));
/// query.validate().unwrap();
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolutionQuery {
    language: String,
    framework: Option<String>,
    structure: Option<String>,
    process: Option<String>,
    file_path: Option<String>,
}

impl ResolutionQuery {
    /// Creates a query for the given language.
    pub fn new(language: impl AsRef<str>) -> Self {
        Self {
            language: normalize_segment(language.as_ref()),
            framework: None,
            structure: None,
            process: None,
            file_path: None,
        }
    }

    /// Sets the framework dimension.
    pub fn with_framework(mut self, framework: impl AsRef<str>) -> Self {
        self.framework = Some(normalize_segment(framework.as_ref()));
        self
    }

    /// Sets the structure-variant dimension.
    pub fn with_structure(mut self, structure: impl AsRef<str>) -> Self {
        self.structure = Some(normalize_segment(structure.as_ref()));
        self
    }

    /// Sets the process dimension.
    pub fn with_process(mut self, process: impl AsRef<str>) -> Self {
        self.process = Some(normalize_segment(process.as_ref()));
        self
    }

    /// Sets the file path used for glob-based scope refinement.
    ///
    /// Kept verbatim — glob matching is path-literal, not normalized.
    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// The (normalized) language.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// The framework, if set.
    pub fn framework(&self) -> Option<&str> {
        self.framework.as_deref()
    }

    /// The structure variant, if set.
    pub fn structure(&self) -> Option<&str> {
        self.structure.as_deref()
    }

    /// The process id, if set.
    pub fn process(&self) -> Option<&str> {
        self.process.as_deref()
    }

    /// The file path, if set.
    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    /// Checks structural validity.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidQuery`] when the language is empty or a structure
    /// variant is given without a framework.
    pub fn validate(&self) -> Result<()> {
        if self.language.is_empty() {
            return Err(Error::invalid_query("language must not be empty"));
        }
        if self.structure.is_some() && self.framework.is_none() {
            return Err(Error::invalid_query(
                "structure variant given without a framework",
            ));
        }
        Ok(())
    }

    /// Short human-readable description for warnings and logs.
    pub fn describe(&self) -> String {
        let mut parts = vec![format!("lang={}", self.language)];
        if let Some(fw) = &self.framework {
            parts.push(format!("framework={fw}"));
        }
        if let Some(st) = &self.structure {
            parts.push(format!("structure={st}"));
        }
        if let Some(p) = &self.process {
            parts.push(format!("process={p}"));
        }
        if let Some(f) = &self.file_path {
            parts.push(format!("file={f}"));
        }
        parts.join(" ")
    }
}
