/// Quote and tag records
///
/// Both are immutable once built: a quote is appended to its author exactly
/// once and never edited afterwards.
use serde::{Deserialize, Serialize};

/// A quote tag with the URL of its listing page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub url: String,
}

impl Tag {
    /// Builds a tag whose URL follows the site's `/tag/{name}/` template
    ///
    /// `base_url` must not end with a slash.
    pub fn from_name(base_url: &str, name: impl Into<String>) -> Self {
        let name = name.into();
        let url = format!("{}/tag/{}/", base_url, name);
        Self { name, url }
    }
}

/// A quotation with its tags in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub tags: Vec<Tag>,
}

impl Quote {
    pub fn new(text: impl Into<String>, tags: Vec<Tag>) -> Self {
        Self {
            text: text.into(),
            tags,
        }
    }
}
