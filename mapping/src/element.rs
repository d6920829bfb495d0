use std::cmp::Ordering;
use std::fmt;

use super::{
    error::MappingError,
    namespace::{Namespace, NamespaceRegistry},
};

/// Separator between the prefix and the local name of a qualified name.
pub const PREFIX_SEPARATOR: &str = ":";

/// A qualified tag or attribute name, printed as `prefix:localName`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Element {
    namespace: Namespace,
    local_name: String,
}

impl Element {
    pub fn new(namespace: Namespace, local_name: impl Into<String>) -> Self {
        Self {
            namespace,
            local_name: local_name.into(),
        }
    }

    /// Parse `prefix:localName`, resolving the prefix against `namespaces`.
    pub fn parse(source: &str, namespaces: &NamespaceRegistry) -> Result<Self, MappingError> {
        let source = source.trim();
        let namespace = namespaces.resolve_prefix(source, PREFIX_SEPARATOR)?;
        let local_name = &source[namespace.prefix().len() + PREFIX_SEPARATOR.len()..];
        if local_name.is_empty() {
            return Err(MappingError::MalformedName {
                input: source.to_string(),
            });
        }
        Ok(Self::new(namespace.clone(), local_name))
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Whether both parts of the name are legal NCNames, i.e. the name can be written as an
    /// element or attribute name.
    pub fn is_valid_xml_name(&self) -> bool {
        is_ncname(self.namespace.prefix()) && is_ncname(&self.local_name)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{PREFIX_SEPARATOR}{}",
            self.namespace.prefix(),
            self.local_name
        )
    }
}

// Namespaces in XML 1.0, §3: NCName ::= Name - (Char* ':' Char*)
fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '\u{B7}'))
}

/// A source name mapped to a target name, used for tags and attributes alike.
///
/// Ordered by target first so that emission follows the target schema.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementMapping {
    pub from: Element,
    pub to: Element,
}

impl ElementMapping {
    pub fn new(from: Element, to: Element) -> Self {
        Self { from, to }
    }

    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }
}

impl Ord for ElementMapping {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to
            .cmp(&other.to)
            .then_with(|| self.from.cmp(&other.from))
    }
}

impl PartialOrd for ElementMapping {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ElementMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
