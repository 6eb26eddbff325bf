//! Strict YAML frontmatter extraction.
//!
//! Every rule document must start with a frontmatter block delimited by
//! `---` lines:
//!
//! ```markdown
//! ---
//! scope:
//!   language: go
//! extends: rules/go/base
//! ---
//!
//! ## Layout
//!
//! Body content.
//! ```
//!
//! Unlike content stores where metadata is optional decoration, a rule
//! document without parsable metadata cannot be scoped or ordered, so a
//! missing block, an unclosed block, or invalid YAML is an error here
//! rather than a warning.

use rulestore_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde_yaml::Value;

/// A document split into parsed frontmatter and the remaining body.
#[derive(Debug, Clone)]
pub struct FrontMatter<'a> {
    /// Parsed YAML metadata. An empty block parses as an empty mapping.
    value: Value,
    /// Body content after the closing delimiter.
    body: &'a str,
}

impl<'a> FrontMatter<'a> {
    /// The raw YAML value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The body content following the frontmatter block.
    pub fn body(&self) -> &'a str {
        self.body
    }

    /// Deserialize the metadata into a concrete type.
    ///
    /// # Example
    ///
    /// ```
    /// use rulestore_content::split_front_matter;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Meta {
    ///     extends: Option<String>,
    /// }
    ///
    /// let doc = "---\nextends: rules/go/base\n---\n\nBody";
    /// let fm = split_front_matter(doc).unwrap();
    /// let meta: Meta = fm.deserialize().unwrap();
    /// assert_eq!(meta.extends.as_deref(), Some("rules/go/base"));
    /// ```
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_yaml::from_value(self.value.clone())
            .map_err(|e| Error::parse(format!("frontmatter does not match schema: {e}")))
    }
}

/// Split a document into its frontmatter metadata and body.
///
/// The content must begin with `---` on the first line, contain valid
/// YAML up to a closing `---` line, and may be followed by any body. An
/// empty block (`---` immediately followed by `---`) yields an empty
/// mapping, which deserializes into all-default metadata.
///
/// # Errors
///
/// [`Error::Parse`] when the opening delimiter is missing, the block is
/// never closed, or the YAML fails to parse. Callers that know the file
/// path wrap this into `Error::MalformedDocument`.
pub fn split_front_matter(content: &str) -> Result<FrontMatter<'_>> {
    if !content.starts_with("---") {
        return Err(Error::parse("document does not start with a frontmatter block"));
    }

    let after_open = match content[3..].find('\n') {
        Some(pos) => &content[3 + pos + 1..],
        None => return Err(Error::parse("frontmatter block is never closed")),
    };

    let (yaml, after_close) = if let Some(rest) = after_open.strip_prefix("---") {
        // Empty block: the closing delimiter follows immediately
        ("", rest)
    } else if let Some(close) = after_open.find("\n---") {
        (&after_open[..close], &after_open[close + 4..])
    } else {
        return Err(Error::parse("frontmatter block is never closed"));
    };

    let body = after_close.strip_prefix('\n').unwrap_or(after_close);

    let value = match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Null) => Value::Mapping(serde_yaml::Mapping::new()),
        Ok(value @ Value::Mapping(_)) => value,
        Ok(other) => {
            return Err(Error::parse(format!(
                "frontmatter must be a YAML mapping, got {}",
                yaml_kind(&other)
            )));
        }
        Err(e) => return Err(Error::parse(format!("invalid frontmatter YAML: {e}"))),
    };

    Ok(FrontMatter { value, body })
}

fn yaml_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

// ============================================================================
// Tests
// ============================================================================
