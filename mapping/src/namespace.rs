use std::fmt;

use lazy_static::lazy_static;

use super::error::MappingError;

// The xml prefix is bound by definition and never declared (Namespaces in XML 1.0, §3)
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
pub const XSL_NAMESPACE: &str = "http://www.w3.org/1999/XSL/Transform";
pub const RDF_NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NAMESPACE: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const EDM_NAMESPACE: &str = "http://www.europeana.eu/schemas/edm/";
pub const OWL_NAMESPACE: &str = "http://www.w3.org/2002/07/owl#";
pub const SKOS_NAMESPACE: &str = "http://www.w3.org/2004/02/skos/core#";
pub const FOAF_NAMESPACE: &str = "http://xmlns.com/foaf/0.1/";
pub const WGS84_POS_NAMESPACE: &str = "http://www.w3.org/2003/01/geo/wgs84_pos#";
pub const RDAGR2_NAMESPACE: &str = "http://rdvocab.info/ElementsGr2/";
pub const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";
pub const DCTERMS_NAMESPACE: &str = "http://purl.org/dc/terms/";
pub const ORE_NAMESPACE: &str = "http://www.openarchives.org/ore/terms/";
pub const GN_NAMESPACE: &str = "http://www.geonames.org/ontology#";

lazy_static! {
    pub static ref XML: Namespace = Namespace::builtin("xml", XML_NAMESPACE);
    pub static ref XSL: Namespace = Namespace::builtin("xsl", XSL_NAMESPACE);
    pub static ref RDF: Namespace = Namespace::builtin("rdf", RDF_NAMESPACE);
    pub static ref RDFS: Namespace = Namespace::builtin("rdfs", RDFS_NAMESPACE);
    pub static ref EDM: Namespace = Namespace::builtin("edm", EDM_NAMESPACE);
    pub static ref OWL: Namespace = Namespace::builtin("owl", OWL_NAMESPACE);
    pub static ref SKOS: Namespace = Namespace::builtin("skos", SKOS_NAMESPACE);
    pub static ref FOAF: Namespace = Namespace::builtin("foaf", FOAF_NAMESPACE);
    pub static ref WGS84_POS: Namespace = Namespace::builtin("wgs84_pos", WGS84_POS_NAMESPACE);
    pub static ref RDAGR2: Namespace = Namespace::builtin("rdagr2", RDAGR2_NAMESPACE);
    pub static ref DC: Namespace = Namespace::builtin("dc", DC_NAMESPACE);
    pub static ref DCTERMS: Namespace = Namespace::builtin("dcterms", DCTERMS_NAMESPACE);
    pub static ref ORE: Namespace = Namespace::builtin("ore", ORE_NAMESPACE);
    pub static ref GN: Namespace = Namespace::builtin("gn", GN_NAMESPACE);
}

/// A namespace prefix bound to its URI.
///
/// Equality covers both the prefix and the URI.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Namespace {
    prefix: String,
    uri: String,
}

impl Namespace {
    pub fn new(prefix: impl AsRef<str>, uri: impl AsRef<str>) -> Result<Self, MappingError> {
        let prefix = prefix.as_ref().trim();
        let uri = uri.as_ref().trim();
        if prefix.is_empty() || uri.is_empty() {
            return Err(MappingError::MalformedName {
                input: format!("{prefix}={uri}"),
            });
        }
        Ok(Self::builtin(prefix, uri))
    }

    fn builtin(prefix: &str, uri: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xmlns:{}=\"{}\"", self.prefix, self.uri)
    }
}

/// A fixed catalogue of namespaces used to interpret prefixed names.
///
/// Input strings and output labels are resolved against separate registries, so the same prefix
/// can mean different things depending on which side of the mapping is being read.
#[derive(Clone, Debug, Default)]
pub struct NamespaceRegistry {
    namespaces: Vec<Namespace>,
}

impl NamespaceRegistry {
    pub fn new(namespaces: impl IntoIterator<Item = Namespace>) -> Result<Self, MappingError> {
        let mut registry = Self::default();
        for namespace in namespaces {
            registry.register(namespace)?;
        }
        Ok(registry)
    }

    fn register(&mut self, namespace: Namespace) -> Result<(), MappingError> {
        match self.get(namespace.prefix()) {
            Some(existing) if existing.uri() == namespace.uri() => Ok(()),
            Some(existing) => Err(MappingError::NamespaceConflict {
                prefix: namespace.prefix.clone(),
                first: existing.uri.clone(),
                second: namespace.uri,
            }),
            None => {
                self.namespaces.push(namespace);
                Ok(())
            }
        }
    }

    pub fn get(&self, prefix: &str) -> Option<&Namespace> {
        self.namespaces.iter().find(|ns| ns.prefix == prefix)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.iter()
    }

    /// Find the namespace whose prefix, followed by `separator`, starts `input`.
    ///
    /// Prefixes are not prefix-free (`a` and `ab` may both be registered), so the longest match
    /// wins.
    pub fn resolve_prefix(&self, input: &str, separator: &str) -> Result<&Namespace, MappingError> {
        self.namespaces
            .iter()
            .filter(|ns| {
                input
                    .strip_prefix(ns.prefix.as_str())
                    .is_some_and(|rest| rest.starts_with(separator))
            })
            .max_by_key(|ns| ns.prefix.len())
            .ok_or_else(|| MappingError::UnknownNamespace {
                input: input.to_string(),
            })
    }
}

/// The namespaces legacy vocabulary source strings may use.
pub fn input_namespaces() -> NamespaceRegistry {
    NamespaceRegistry {
        namespaces: vec![
            XML.clone(),
            RDF.clone(),
            RDFS.clone(),
            SKOS.clone(),
            OWL.clone(),
            FOAF.clone(),
            WGS84_POS.clone(),
            RDAGR2.clone(),
            DC.clone(),
            DCTERMS.clone(),
            EDM.clone(),
            GN.clone(),
        ],
    }
}

/// The namespaces of the Europeana Data Model contextual entities.
pub fn output_namespaces() -> NamespaceRegistry {
    NamespaceRegistry {
        namespaces: vec![
            XML.clone(),
            RDF.clone(),
            EDM.clone(),
            SKOS.clone(),
            OWL.clone(),
            FOAF.clone(),
            WGS84_POS.clone(),
            RDAGR2.clone(),
            DC.clone(),
            DCTERMS.clone(),
            ORE.clone(),
        ],
    }
}
