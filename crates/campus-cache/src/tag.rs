//! Dependency tags.

use serde::{Deserialize, Serialize};

/// A dependency label. Reads provide tags, writes invalidate them.
///
/// A tag without an `id` stands for the whole collection of `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag {
    /// Resource kind, e.g. `"Events"`.
    pub kind: String,
    /// Specific resource, or `None` for the collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Tag {
    /// Collection-level tag.
    pub fn collection(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
        }
    }

    /// Item-level tag.
    pub fn item(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: Some(id.into()),
        }
    }

    /// Whether this is a collection-level tag.
    pub fn is_collection(&self) -> bool {
        self.id.is_none()
    }

    /// Whether invalidating `self` affects an entry that provides
    /// `provided`.
    ///
    /// `{kind}` hits every `kind` entry. `{kind, id}` hits `{kind, id}` and
    /// the `{kind}` collection.
    pub fn invalidates(&self, provided: &Tag) -> bool {
        if self.kind != provided.kind {
            return false;
        }
        match (&self.id, &provided.id) {
            (None, _) | (Some(_), None) => true,
            (Some(a), Some(b)) => a == b,
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}:{}", self.kind, id),
            None => f.write_str(&self.kind),
        }
    }
}

/// Whether any tag in `invalidated` affects an entry providing `provided`.
pub fn intersects<'a>(
    invalidated: &[Tag],
    provided: impl IntoIterator<Item = &'a Tag> + Clone,
) -> bool {
    invalidated
        .iter()
        .any(|inv| provided.clone().into_iter().any(|p| inv.invalidates(p)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_hits_everything_of_kind() {
        let inv = Tag::collection("Events");
        assert!(inv.invalidates(&Tag::collection("Events")));
        assert!(inv.invalidates(&Tag::item("Events", "42")));
        assert!(!inv.invalidates(&Tag::collection("Placements")));
    }

    #[test]
    fn test_item_hits_same_item_and_collection() {
        let inv = Tag::item("Events", "42");
        assert!(inv.invalidates(&Tag::item("Events", "42")));
        assert!(inv.invalidates(&Tag::collection("Events")));
        assert!(!inv.invalidates(&Tag::item("Events", "7")));
        assert!(!inv.invalidates(&Tag::item("Complaints", "42")));
    }

    #[test]
    fn test_intersects() {
        let provided = vec![Tag::item("Events", "7")];
        assert!(intersects(&[Tag::collection("Events")], &provided));
        assert!(!intersects(&[Tag::item("Events", "8")], &provided));
        assert!(!intersects(&[], &provided));
    }

    #[test]
    fn test_display() {
        assert_eq!(Tag::collection("Notifications").to_string(), "Notifications");
        assert_eq!(Tag::item("Events", "42").to_string(), "Events:42");
    }
}
