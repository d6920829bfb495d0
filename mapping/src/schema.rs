use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::{
    element::Element,
    error::MappingError,
    namespace::{input_namespaces, output_namespaces, NamespaceRegistry, RDF},
};

/// The kind of contextual entity a vocabulary describes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VocabularyType {
    Concept,
    Place,
    Agent,
    Timespan,
}

impl VocabularyType {
    pub const ALL: [VocabularyType; 4] = [
        VocabularyType::Concept,
        VocabularyType::Place,
        VocabularyType::Agent,
        VocabularyType::Timespan,
    ];

    /// Short code prefixed to the field labels of this type in the EDM label table.
    fn label_code(self) -> &'static str {
        match self {
            Self::Concept => "cc",
            Self::Place => "pl",
            Self::Agent => "ag",
            Self::Timespan => "ts",
        }
    }
}

impl fmt::Display for VocabularyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Concept => "Concept",
            Self::Place => "Place",
            Self::Agent => "Agent",
            Self::Timespan => "Timespan",
        };
        f.write_str(name)
    }
}

/// The schema of the documents the generated stylesheet is applied to.
#[derive(Clone, Debug)]
pub struct InputSchema {
    pub namespaces: NamespaceRegistry,
    /// Root element wrapping every record, matched by the stylesheet template.
    pub envelope_tag: Element,
    /// Attribute carrying a record's identifier.
    pub identifier_attribute: Element,
    /// Tag declaring a record's type, never mapped.
    pub type_tag: Element,
}

impl InputSchema {
    /// RDF/XML as served by vocabulary endpoints.
    pub fn rdf() -> Self {
        Self {
            namespaces: input_namespaces(),
            envelope_tag: Element::new(RDF.clone(), "RDF"),
            identifier_attribute: Element::new(RDF.clone(), "about"),
            type_tag: Element::new(RDF.clone(), "type"),
        }
    }

    /// Tags that carry no vocabulary content and are dropped from the mapping tree.
    pub fn is_ignored(&self, tag: &Element) -> bool {
        *tag == self.type_tag || *tag == self.envelope_tag
    }
}

/// Lookup of the target schema's tags by their legacy labels.
pub trait OutputSchema {
    /// Namespaces target attribute names are resolved against.
    fn namespaces(&self) -> &NamespaceRegistry;

    fn label_to_tag(&self, label: &str) -> Option<(Element, VocabularyType)>;

    /// The element representing a whole entity of the given type.
    fn main_tag(&self, vocabulary_type: VocabularyType) -> Option<Element>;
}

/// An [`OutputSchema`] backed by in-memory tables.
#[derive(Clone, Debug)]
pub struct TableSchema {
    namespaces: NamespaceRegistry,
    labels: HashMap<String, (Element, VocabularyType)>,
    main_tags: BTreeMap<VocabularyType, Element>,
}

impl TableSchema {
    pub fn new(namespaces: NamespaceRegistry) -> Self {
        Self {
            namespaces,
            labels: HashMap::new(),
            main_tags: BTreeMap::new(),
        }
    }

    /// Declare `tag` as the main tag of `vocabulary_type`, reachable through `label`.
    pub fn with_main_tag(
        mut self,
        label: impl Into<String>,
        vocabulary_type: VocabularyType,
        tag: &str,
    ) -> Result<Self, MappingError> {
        let tag = Element::parse(tag, &self.namespaces)?;
        self.main_tags.insert(vocabulary_type, tag.clone());
        self.labels.insert(label.into(), (tag, vocabulary_type));
        Ok(self)
    }

    pub fn with_label(
        mut self,
        label: impl Into<String>,
        vocabulary_type: VocabularyType,
        tag: &str,
    ) -> Result<Self, MappingError> {
        let tag = Element::parse(tag, &self.namespaces)?;
        self.labels.insert(label.into(), (tag, vocabulary_type));
        Ok(self)
    }
}

impl OutputSchema for TableSchema {
    fn namespaces(&self) -> &NamespaceRegistry {
        &self.namespaces
    }

    fn label_to_tag(&self, label: &str) -> Option<(Element, VocabularyType)> {
        self.labels.get(label).cloned()
    }

    fn main_tag(&self, vocabulary_type: VocabularyType) -> Option<Element> {
        self.main_tags.get(&vocabulary_type).cloned()
    }
}

const EDM_MAIN_TAGS: [(VocabularyType, &str); 4] = [
    (VocabularyType::Concept, "skos:Concept"),
    (VocabularyType::Place, "edm:Place"),
    (VocabularyType::Agent, "edm:Agent"),
    (VocabularyType::Timespan, "edm:TimeSpan"),
];

const EDM_CONCEPT_FIELDS: &[&str] = &[
    "skos:prefLabel",
    "skos:altLabel",
    "skos:hiddenLabel",
    "skos:note",
    "skos:notation",
    "skos:broader",
    "skos:narrower",
    "skos:related",
    "skos:broadMatch",
    "skos:narrowMatch",
    "skos:relatedMatch",
    "skos:exactMatch",
    "skos:closeMatch",
    "skos:inScheme",
];

const EDM_PLACE_FIELDS: &[&str] = &[
    "skos:prefLabel",
    "skos:altLabel",
    "skos:note",
    "wgs84_pos:lat",
    "wgs84_pos:long",
    "wgs84_pos:alt",
    "dcterms:isPartOf",
    "dcterms:hasPart",
    "owl:sameAs",
];

const EDM_AGENT_FIELDS: &[&str] = &[
    "skos:prefLabel",
    "skos:altLabel",
    "skos:note",
    "dc:date",
    "dc:identifier",
    "edm:begin",
    "edm:end",
    "edm:hasMet",
    "edm:isRelatedTo",
    "foaf:name",
    "rdagr2:dateOfBirth",
    "rdagr2:dateOfDeath",
    "rdagr2:placeOfBirth",
    "rdagr2:placeOfDeath",
    "rdagr2:gender",
    "rdagr2:professionOrOccupation",
    "rdagr2:biographicalInformation",
    "owl:sameAs",
];

const EDM_TIMESPAN_FIELDS: &[&str] = &[
    "skos:prefLabel",
    "skos:altLabel",
    "skos:note",
    "edm:begin",
    "edm:end",
    "dcterms:isPartOf",
    "owl:sameAs",
];

fn edm_fields(vocabulary_type: VocabularyType) -> &'static [&'static str] {
    match vocabulary_type {
        VocabularyType::Concept => EDM_CONCEPT_FIELDS,
        VocabularyType::Place => EDM_PLACE_FIELDS,
        VocabularyType::Agent => EDM_AGENT_FIELDS,
        VocabularyType::Timespan => EDM_TIMESPAN_FIELDS,
    }
}

/// The Europeana Data Model contextual entity schema.
///
/// Main tags are labelled after the tag itself (`skos_concept`, `edm_timespan`), fields after the
/// entity code and the tag (`cc_skos_prefLabel`, `pl_wgs84_pos_lat`).
pub fn edm_schema() -> Result<TableSchema, MappingError> {
    let mut schema = TableSchema::new(output_namespaces());
    for (vocabulary_type, main_tag) in EDM_MAIN_TAGS {
        let label = main_tag.replace(':', "_").to_lowercase();
        schema = schema.with_main_tag(label, vocabulary_type, main_tag)?;
        for field in edm_fields(vocabulary_type) {
            let label = format!("{}_{}", vocabulary_type.label_code(), field.replace(':', "_"));
            schema = schema.with_label(label, vocabulary_type, field)?;
        }
    }
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{EDM, SKOS, WGS84_POS};

    #[test]
    fn test_edm_main_tags() {
        let schema = edm_schema().unwrap();
        for vocabulary_type in VocabularyType::ALL {
            assert!(schema.main_tag(vocabulary_type).is_some());
        }
        assert_eq!(
            schema.main_tag(VocabularyType::Timespan),
            Some(Element::new(EDM.clone(), "TimeSpan"))
        );
        assert_eq!(
            schema.label_to_tag("skos_concept"),
            Some((Element::new(SKOS.clone(), "Concept"), VocabularyType::Concept))
        );
    }

    #[test]
    fn test_edm_field_labels() {
        let schema = edm_schema().unwrap();
        assert_eq!(
            schema.label_to_tag("cc_skos_prefLabel"),
            Some((Element::new(SKOS.clone(), "prefLabel"), VocabularyType::Concept))
        );
        assert_eq!(
            schema.label_to_tag("pl_wgs84_pos_lat"),
            Some((Element::new(WGS84_POS.clone(), "lat"), VocabularyType::Place))
        );
        assert_eq!(schema.label_to_tag("prefLabel"), None);
    }

    #[test]
    fn test_rdf_ignored_tags() {
        let input = InputSchema::rdf();
        assert!(input.is_ignored(&Element::new(RDF.clone(), "type")));
        assert!(input.is_ignored(&Element::new(RDF.clone(), "RDF")));
        assert!(!input.is_ignored(&Element::new(RDF.clone(), "about")));
    }

    #[test]
    fn test_table_schema_rejects_unknown_prefix() {
        let result = TableSchema::new(output_namespaces()).with_label(
            "x",
            VocabularyType::Concept,
            "gn:name",
        );
        assert!(matches!(result, Err(MappingError::UnknownNamespace { .. })));
    }
}
