use thiserror::Error;

use crate::schema::VocabularyType;

/// Everything that can abort the compilation of a single vocabulary.
///
/// None of these are recovered from internally; the caller decides whether a failed vocabulary
/// is skipped or ends the batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("no registered namespace prefix matches {input:?}")]
    UnknownNamespace { input: String },

    #[error("malformed qualified name {input:?}")]
    MalformedName { input: String },

    #[error("the output schema has no tag for label {label:?}")]
    UnknownLabel { label: String },

    #[error("namespace prefix {prefix:?} is bound to both {first:?} and {second:?}")]
    NamespaceConflict {
        prefix: String,
        first: String,
        second: String,
    },

    #[error("mapping of tag {tag} declares target attribute {attribute} without a source attribute")]
    DanglingAttribute { tag: String, attribute: String },

    #[error("vocabulary {vocabulary:?} maps to more than one entity type: {types:?}")]
    AmbiguousType {
        vocabulary: String,
        types: Vec<VocabularyType>,
    },

    #[error("vocabulary {vocabulary:?} has no mappings")]
    NoMappings { vocabulary: String },

    #[error("vocabulary {vocabulary:?} maps both {first} and {second} to the main tag")]
    DuplicateParent {
        vocabulary: String,
        first: String,
        second: String,
    },

    #[error("vocabulary {vocabulary:?} has no mapping to the main tag {main_tag}")]
    MissingParent {
        vocabulary: String,
        main_tag: String,
    },

    #[error("failed to write the stylesheet: {0}")]
    Emission(String),
}

impl MappingError {
    pub(crate) fn emission(error: impl std::fmt::Display) -> Self {
        Self::Emission(error.to_string())
    }
}
