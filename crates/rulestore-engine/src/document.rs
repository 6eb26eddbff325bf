//! The rule document model.
//!
//! A [`RuleDocument`] is the engine's view of one markdown file: a stable
//! path-derived id, a [`ScopeSelector`] saying which query contexts it
//! applies to, an optional `extends` parent, override semantics, and an
//! ordered list of opaque [`Section`]s.
//!
//! Frontmatter schema:
//!
//! ```markdown
//! ---
//! scope:
//!   language: go
//!   framework: gin
//!   structure: modular
//!   process: code-review
//!   file: "**/*_test.go"
//! extends: rules/go/frameworks/gin
//! overrides: [layout]      # or `overrides: true` for every section
//! precedence: 10
//! ---
//! ```

use std::path::{Path, PathBuf};

use rulestore_content::{split_front_matter, split_sections};
use rulestore_core::util::ids::normalize_segment;
use rulestore_core::{Error, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// ScopeSelector
// ============================================================================

/// The context dimensions a document declares itself applicable to.
///
/// An unset dimension is a wildcard. A declared dimension must equal the
/// query's value for the document to match; there is no partial or fuzzy
/// inclusion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopeSelector {
    /// Source language id (e.g. `go`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Framework id (e.g. `gin`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    /// Structure variant id (e.g. `modular`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,
    /// Process id (e.g. `code-review`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<String>,
    /// File glob (standard `*` / `**` semantics) matched against the
    /// query's file path.
    #[serde(default, rename = "file", skip_serializing_if = "Option::is_none")]
    pub file_glob: Option<String>,
}

impl ScopeSelector {
    /// A selector matching every query.
    pub fn wildcard() -> Self {
        Self::default()
    }

    /// Sets the language dimension.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the framework dimension.
    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = Some(framework.into());
        self
    }

    /// Sets the structure-variant dimension.
    pub fn with_structure(mut self, structure: impl Into<String>) -> Self {
        self.structure = Some(structure.into());
        self
    }

    /// Sets the process dimension.
    pub fn with_process(mut self, process: impl Into<String>) -> Self {
        self.process = Some(process.into());
        self
    }

    /// Sets the file-glob dimension.
    pub fn with_file_glob(mut self, pattern: impl Into<String>) -> Self {
        self.file_glob = Some(pattern.into());
        self
    }

    /// True if no dimension is declared.
    pub fn is_wildcard(&self) -> bool {
        self.language.is_none()
            && self.framework.is_none()
            && self.structure.is_none()
            && self.process.is_none()
            && self.file_glob.is_none()
    }

    /// Normalize every declared non-glob dimension value in place.
    fn normalize(&mut self) {
        for dim in [
            &mut self.language,
            &mut self.framework,
            &mut self.structure,
            &mut self.process,
        ] {
            if let Some(value) = dim.take() {
                *dim = Some(normalize_segment(&value));
            }
        }
    }
}

// ============================================================================
// OverrideSpec
// ============================================================================

/// Which of a document's sections replace, rather than append to, content
/// contributed by documents earlier in resolution order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideSpec {
    /// `overrides: true` — every declared section replaces. `false` (the
    /// default) makes every section additive.
    All(bool),
    /// `overrides: [layout, testing]` — only the named sections replace.
    Sections(Vec<String>),
}

impl Default for OverrideSpec {
    fn default() -> Self {
        OverrideSpec::All(false)
    }
}

impl OverrideSpec {
    /// Does the named section get replace semantics?
    pub fn replaces(&self, section: &str) -> bool {
        match self {
            OverrideSpec::All(all) => *all,
            OverrideSpec::Sections(names) => names.iter().any(|n| n == section),
        }
    }

    /// Normalize listed section names in place.
    fn normalize(&mut self) {
        if let OverrideSpec::Sections(names) = self {
            for name in names.iter_mut() {
                *name = normalize_segment(name);
            }
        }
    }
}

// ============================================================================
// Section
// ============================================================================

/// One named content block of a document. Content is opaque to the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Kebab-case section name.
    pub name: String,
    /// The section's markdown content.
    pub content: String,
}

impl Section {
    /// Creates a section.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

// ============================================================================
// RuleDocument
// ============================================================================

/// Frontmatter as written by document authors.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocMeta {
    #[serde(default)]
    scope: ScopeSelector,
    #[serde(default)]
    extends: Option<String>,
    #[serde(default)]
    overrides: OverrideSpec,
    #[serde(default, rename = "precedence")]
    precedence_hint: Option<i64>,
}

/// A parsed, immutable rule document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    /// Stable path-derived id (e.g. `rules/go/frameworks/gin`).
    pub id: String,
    /// Source file path, kept for diagnostics.
    pub path: PathBuf,
    /// Scope predicate.
    pub scope: ScopeSelector,
    /// Parent document id, if this document refines another.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    /// Replace-vs-append semantics per section.
    pub overrides: OverrideSpec,
    /// Explicit rank for same-specificity tie-breaking; higher wins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precedence_hint: Option<i64>,
    /// Ordered sections split from the body.
    pub sections: Vec<Section>,
}

impl RuleDocument {
    /// Parse raw file content into a document.
    ///
    /// `id` is the store-relative id already derived by the loader; `path`
    /// is the absolute source path used in error messages. Fails with
    /// [`Error::MalformedDocument`] when the frontmatter is missing,
    /// unparsable, violates the schema, or declares an invalid file glob.
    pub fn parse(id: impl Into<String>, path: impl Into<PathBuf>, content: &str) -> Result<Self> {
        let id = id.into();
        let path = path.into();

        let fm = split_front_matter(content)
            .map_err(|e| Error::malformed(&path, e.to_string()))?;
        let mut meta: DocMeta = fm
            .deserialize()
            .map_err(|e| Error::malformed(&path, e.to_string()))?;

        meta.scope.normalize();
        meta.overrides.normalize();
        let extends = meta.extends.as_deref().map(normalize_doc_ref);

        if let Some(pattern) = &meta.scope.file_glob {
            glob::Pattern::new(pattern)
                .map_err(|e| Error::malformed(&path, format!("invalid file glob: {e}")))?;
        }
        if extends.as_deref() == Some(id.as_str()) {
            // Report the degenerate self-cycle here rather than waiting for
            // the store-wide graph check.
            return Err(Error::CyclicExtends {
                chain: vec![id.clone(), id],
            });
        }

        let sections = split_sections(fm.body())
            .into_iter()
            .map(|raw| Section::new(raw.name, raw.content))
            .collect();

        Ok(Self {
            id,
            path,
            scope: meta.scope,
            extends,
            overrides: meta.overrides,
            precedence_hint: meta.precedence_hint,
            sections,
        })
    }

    /// Creates an empty document for programmatic construction.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let path = PathBuf::from(format!("{id}.md"));
        Self {
            id,
            path,
            scope: ScopeSelector::default(),
            extends: None,
            overrides: OverrideSpec::default(),
            precedence_hint: None,
            sections: Vec::new(),
        }
    }

    /// Sets the scope selector.
    pub fn with_scope(mut self, scope: ScopeSelector) -> Self {
        self.scope = scope;
        self
    }

    /// Sets the parent document.
    pub fn with_extends(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    /// Sets the override spec.
    pub fn with_overrides(mut self, overrides: OverrideSpec) -> Self {
        self.overrides = overrides;
        self
    }

    /// Sets the precedence hint.
    pub fn with_precedence_hint(mut self, hint: i64) -> Self {
        self.precedence_hint = Some(hint);
        self
    }

    /// Appends a section.
    pub fn with_section(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.sections.push(Section::new(name, content));
        self
    }

    /// Looks up a section by name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Does this document declare the named section?
    pub fn declares_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Does this document declare the named section with replace semantics?
    pub fn replaces_section(&self, name: &str) -> bool {
        self.declares_section(name) && self.overrides.replaces(name)
    }
}

/// Normalize an author-written document reference into id form.
fn normalize_doc_ref(reference: &str) -> String {
    Path::new(reference)
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .map(normalize_segment)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

// ============================================================================
// Tests
// ============================================================================
