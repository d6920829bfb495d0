use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use super::{
    element::{Element, ElementMapping},
    error::MappingError,
    flat::FlatElementMapping,
    schema::{InputSchema, OutputSchema, VocabularyType},
};

/// A tag mapping together with the attribute mappings that apply to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HierarchicalElementMapping {
    tag_mapping: ElementMapping,
    attribute_mappings: BTreeSet<ElementMapping>,
    include_tag_value: bool,
    copy_whole_node: bool,
}

impl HierarchicalElementMapping {
    fn new(
        tag_mapping: ElementMapping,
        attribute_mappings: BTreeSet<ElementMapping>,
        include_tag_value: bool,
        copy_whole_node: bool,
    ) -> Self {
        Self {
            tag_mapping,
            attribute_mappings,
            include_tag_value,
            copy_whole_node,
        }
    }

    pub fn tag_mapping(&self) -> &ElementMapping {
        &self.tag_mapping
    }

    /// Attribute mappings, ordered by target name.
    pub fn attribute_mappings(&self) -> &BTreeSet<ElementMapping> {
        &self.attribute_mappings
    }

    /// Whether the text content of the source element is carried over.
    pub fn include_tag_value(&self) -> bool {
        self.include_tag_value
    }

    /// Whether the source element is copied verbatim instead of being rebuilt.
    pub fn copy_whole_node(&self) -> bool {
        self.copy_whole_node
    }
}

/// The mapping tree of one vocabulary: the entity's main tag and the fields below it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementMappings {
    parent_mapping: HierarchicalElementMapping,
    child_mappings: Vec<HierarchicalElementMapping>,
    vocabulary_type: VocabularyType,
}

type MappingTable = BTreeMap<ElementMapping, BTreeSet<ElementMapping>>;

impl ElementMappings {
    /// Assemble the flat mappings of a vocabulary into a tree.
    ///
    /// Exactly one tag mapping must target the main tag of the detected type; it becomes the
    /// parent. Every other non-ignored tag becomes a child, sorted by target name. A child whose
    /// tag only appears in attribute rules does not carry its text content over. Identity
    /// children whose target is listed in `passthrough_tags` are copied verbatim.
    pub fn build(
        vocabulary_id: &str,
        flat_mappings: impl IntoIterator<Item = FlatElementMapping>,
        input_schema: &InputSchema,
        output_schema: &dyn OutputSchema,
        passthrough_tags: &BTreeSet<Element>,
    ) -> Result<Self, MappingError> {
        let flat_mappings: BTreeSet<FlatElementMapping> = flat_mappings.into_iter().collect();

        let types: Vec<VocabularyType> = flat_mappings
            .iter()
            .map(|flat| flat.vocabulary_type)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if types.len() > 1 {
            return Err(MappingError::AmbiguousType {
                vocabulary: vocabulary_id.to_string(),
                types,
            });
        }
        let vocabulary_type =
            types
                .first()
                .copied()
                .ok_or_else(|| MappingError::NoMappings {
                    vocabulary: vocabulary_id.to_string(),
                })?;

        let main_tag =
            output_schema
                .main_tag(vocabulary_type)
                .ok_or_else(|| MappingError::MissingParent {
                    vocabulary: vocabulary_id.to_string(),
                    main_tag: format!("<undeclared {vocabulary_type} tag>"),
                })?;

        let (with_content, without_content) = partition(&flat_mappings)?;

        let mut parent_mapping: Option<HierarchicalElementMapping> = None;
        let mut child_mappings = Vec::new();
        for (include_tag_value, table) in [(true, with_content), (false, without_content)] {
            for (tag_mapping, attribute_mappings) in table {
                if input_schema.is_ignored(&tag_mapping.from) {
                    debug!("{vocabulary_id}: discarding mapping of ignored tag {tag_mapping}");
                    continue;
                }

                if tag_mapping.to == main_tag {
                    if let Some(existing) = &parent_mapping {
                        return Err(MappingError::DuplicateParent {
                            vocabulary: vocabulary_id.to_string(),
                            first: existing.tag_mapping.from.to_string(),
                            second: tag_mapping.from.to_string(),
                        });
                    }
                    parent_mapping = Some(HierarchicalElementMapping::new(
                        tag_mapping,
                        attribute_mappings,
                        include_tag_value,
                        false,
                    ));
                } else {
                    let copy_whole_node = passthrough_tags.contains(&tag_mapping.to)
                        && tag_mapping.is_identity()
                        && attribute_mappings.iter().all(ElementMapping::is_identity);
                    child_mappings.push(HierarchicalElementMapping::new(
                        tag_mapping,
                        attribute_mappings,
                        include_tag_value,
                        copy_whole_node,
                    ));
                }
            }
        }

        let parent_mapping = parent_mapping.ok_or_else(|| MappingError::MissingParent {
            vocabulary: vocabulary_id.to_string(),
            main_tag: main_tag.to_string(),
        })?;
        child_mappings.sort_by(|a, b| a.tag_mapping.cmp(&b.tag_mapping));

        debug!(
            "{vocabulary_id}: built {vocabulary_type} mapping tree under {} with {} children",
            parent_mapping.tag_mapping,
            child_mappings.len()
        );

        Ok(Self {
            parent_mapping,
            child_mappings,
            vocabulary_type,
        })
    }

    pub fn parent_mapping(&self) -> &HierarchicalElementMapping {
        &self.parent_mapping
    }

    /// Children ordered by target tag, then source tag.
    pub fn child_mappings(&self) -> &[HierarchicalElementMapping] {
        &self.child_mappings
    }

    pub fn vocabulary_type(&self) -> VocabularyType {
        self.vocabulary_type
    }

    /// Every mapping of the tree, parent first.
    pub fn iter(&self) -> impl Iterator<Item = &HierarchicalElementMapping> {
        std::iter::once(&self.parent_mapping).chain(self.child_mappings.iter())
    }
}

/// Split the attribute rules between tags that also have a plain tag rule (and so carry content)
/// and tags that are only mentioned for their attributes.
fn partition(
    flat_mappings: &BTreeSet<FlatElementMapping>,
) -> Result<(MappingTable, MappingTable), MappingError> {
    let mut with_content = MappingTable::new();
    let mut without_content = MappingTable::new();

    for flat in flat_mappings.iter().filter(|flat| flat.is_tag_mapping()) {
        with_content
            .entry(ElementMapping::new(flat.from_tag.clone(), flat.to_tag.clone()))
            .or_default();
    }

    for flat in flat_mappings {
        let attribute_mapping = match (&flat.from_attribute, &flat.to_attribute) {
            (None, None) => continue,
            (Some(from), to) => {
                ElementMapping::new(from.clone(), to.as_ref().unwrap_or(from).clone())
            }
            (None, Some(to)) => {
                return Err(MappingError::DanglingAttribute {
                    tag: flat.from_tag.to_string(),
                    attribute: to.to_string(),
                })
            }
        };

        let key = ElementMapping::new(flat.from_tag.clone(), flat.to_tag.clone());
        let table = if with_content.contains_key(&key) {
            &mut with_content
        } else {
            &mut without_content
        };
        table.entry(key).or_default().insert(attribute_mapping);
    }

    Ok((with_content, without_content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flat::MappingRule;
    use crate::namespace::{RDF, SKOS, XML};
    use crate::schema::{edm_schema, TableSchema};

    fn build_with(
        rules: &[MappingRule],
        passthrough_tags: &BTreeSet<Element>,
    ) -> Result<ElementMappings, MappingError> {
        let input = InputSchema::rdf();
        let output = edm_schema()?;
        let flat = rules
            .iter()
            .map(|rule| FlatElementMapping::from_rule(&input.namespaces, &output, rule))
            .collect::<Result<Vec<_>, _>>()?;
        ElementMappings::build("test", flat, &input, &output, passthrough_tags)
    }

    fn build(rules: &[MappingRule]) -> Result<ElementMappings, MappingError> {
        build_with(rules, &BTreeSet::new())
    }

    fn skos(local_name: &str) -> Element {
        Element::new(SKOS.clone(), local_name)
    }

    #[test]
    fn test_parent_and_children() {
        let mappings = build(&[
            MappingRule::new("skos:Concept", "skos_concept"),
            MappingRule::new("skos:prefLabel", "cc_skos_prefLabel"),
            MappingRule::new("skos:altLabel", "cc_skos_altLabel"),
        ])
        .unwrap();

        assert_eq!(mappings.vocabulary_type(), VocabularyType::Concept);
        assert_eq!(mappings.parent_mapping().tag_mapping().to, skos("Concept"));
        let targets: Vec<_> = mappings
            .child_mappings()
            .iter()
            .map(|child| child.tag_mapping().to.local_name())
            .collect();
        assert_eq!(targets, ["altLabel", "prefLabel"]);
        assert!(mappings
            .child_mappings()
            .iter()
            .all(|child| child.include_tag_value() && !child.copy_whole_node()));
    }

    #[test]
    fn test_attribute_defaults_to_source_name() {
        let mappings = build(&[
            MappingRule::new("skos:Concept", "skos_concept"),
            MappingRule::new("skos:prefLabel", "cc_skos_prefLabel"),
            MappingRule::new("skos:prefLabel_xml:lang", "cc_skos_prefLabel"),
        ])
        .unwrap();

        let child = &mappings.child_mappings()[0];
        let lang = Element::new(XML.clone(), "lang");
        assert_eq!(
            child.attribute_mappings().iter().collect::<Vec<_>>(),
            [&ElementMapping::new(lang.clone(), lang)]
        );
        assert!(child.include_tag_value());
    }

    #[test]
    fn test_attribute_only_tag_has_no_content() {
        let mappings = build(&[
            MappingRule::new("skos:Concept", "skos_concept"),
            MappingRule::new("skos:broader_rdf:resource", "cc_skos_broader")
                .with_attribute("rdf:resource"),
        ])
        .unwrap();

        let child = &mappings.child_mappings()[0];
        assert_eq!(child.tag_mapping().to, skos("broader"));
        assert!(!child.include_tag_value());
        assert_eq!(child.attribute_mappings().len(), 1);
    }

    #[test]
    fn test_parent_attributes() {
        let mappings = build(&[
            MappingRule::new("skos:Concept", "skos_concept"),
            MappingRule::new("skos:Concept_rdf:about", "skos_concept"),
        ])
        .unwrap();

        let about = Element::new(RDF.clone(), "about");
        assert_eq!(
            mappings.parent_mapping().attribute_mappings().first(),
            Some(&ElementMapping::new(about.clone(), about))
        );
        assert!(mappings.child_mappings().is_empty());
    }

    #[test]
    fn test_ignored_tags_are_dropped() {
        let mappings = build(&[
            MappingRule::new("skos:Concept", "skos_concept"),
            MappingRule::new("rdf:type", "cc_skos_note"),
            MappingRule::new("rdf:RDF", "cc_skos_related"),
            MappingRule::new("skos:note", "cc_skos_note"),
        ])
        .unwrap();

        assert!(mappings
            .iter()
            .all(|mapping| mapping.tag_mapping().from.namespace() != &*RDF));
        assert_eq!(mappings.child_mappings().len(), 1);
    }

    #[test]
    fn test_empty_rule_set() {
        assert_eq!(
            build(&[]).unwrap_err(),
            MappingError::NoMappings {
                vocabulary: "test".into()
            }
        );
    }

    #[test]
    fn test_ambiguous_type() {
        let err = build(&[
            MappingRule::new("skos:Concept", "skos_concept"),
            MappingRule::new("skos:prefLabel", "pl_skos_prefLabel"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            MappingError::AmbiguousType {
                vocabulary: "test".into(),
                types: vec![VocabularyType::Concept, VocabularyType::Place],
            }
        );
    }

    #[test]
    fn test_dangling_attribute() {
        let err = build(&[
            MappingRule::new("skos:Concept", "skos_concept"),
            MappingRule::new("skos:prefLabel", "cc_skos_prefLabel").with_attribute("xml:lang"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            MappingError::DanglingAttribute {
                tag: "skos:prefLabel".into(),
                attribute: "xml:lang".into(),
            }
        );
    }

    #[test]
    fn test_duplicate_parent() {
        let err = build(&[
            MappingRule::new("skos:Concept", "skos_concept"),
            MappingRule::new("owl:Thing", "skos_concept"),
        ])
        .unwrap_err();
        assert!(matches!(err, MappingError::DuplicateParent { .. }));
    }

    #[test]
    fn test_missing_parent() {
        let err = build(&[MappingRule::new("skos:prefLabel", "cc_skos_prefLabel")]).unwrap_err();
        assert_eq!(
            err,
            MappingError::MissingParent {
                vocabulary: "test".into(),
                main_tag: "skos:Concept".into(),
            }
        );
    }

    #[test]
    fn test_undeclared_main_tag() {
        let input = InputSchema::rdf();
        let output = TableSchema::new(crate::namespace::output_namespaces())
            .with_label("label", VocabularyType::Agent, "skos:prefLabel")
            .unwrap();
        let flat = FlatElementMapping::parse(
            &input.namespaces,
            &output,
            "skos:prefLabel",
            "label",
            None,
        )
        .unwrap();
        let err = ElementMappings::build("test", [flat], &input, &output, &BTreeSet::new())
            .unwrap_err();
        assert!(matches!(err, MappingError::MissingParent { .. }));
    }

    #[test]
    fn test_passthrough_copies_identity_children() {
        let passthrough = BTreeSet::from([skos("note"), skos("altLabel")]);
        let mappings = build_with(
            &[
                MappingRule::new("skos:Concept", "skos_concept"),
                MappingRule::new("skos:note", "cc_skos_note"),
                MappingRule::new("skos:hiddenLabel", "cc_skos_altLabel"),
                MappingRule::new("skos:prefLabel", "cc_skos_prefLabel"),
            ],
            &passthrough,
        )
        .unwrap();

        let copied: Vec<_> = mappings
            .child_mappings()
            .iter()
            .filter(|child| child.copy_whole_node())
            .map(|child| child.tag_mapping().to.local_name())
            .collect();
        // hiddenLabel -> altLabel is renamed, so it still needs rebuilding
        assert_eq!(copied, ["note"]);
    }

    #[test]
    fn test_order_independent_of_input_order() {
        let rules = [
            MappingRule::new("skos:Concept", "skos_concept"),
            MappingRule::new("skos:prefLabel", "cc_skos_prefLabel"),
            MappingRule::new("skos:prefLabel_xml:lang", "cc_skos_prefLabel"),
            MappingRule::new("skos:note", "cc_skos_note"),
            MappingRule::new("skos:altLabel", "cc_skos_altLabel"),
        ];
        let mut reversed = rules.clone();
        reversed.reverse();
        assert_eq!(build(&rules).unwrap(), build(&reversed).unwrap());
    }
}
