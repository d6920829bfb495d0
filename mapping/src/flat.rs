use super::{
    element::{Element, PREFIX_SEPARATOR},
    error::MappingError,
    namespace::NamespaceRegistry,
    schema::{OutputSchema, VocabularyType},
};

/// Separates the source tag from the source attribute in a legacy source string, as in
/// `skos:prefLabel_xml:lang`.
pub const ATTRIBUTE_SEPARATOR: char = '_';

/// One raw rule of a legacy vocabulary: a source string, the label of the target field and an
/// optional target attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappingRule {
    pub from: String,
    pub to_label: String,
    pub to_attribute: Option<String>,
}

impl MappingRule {
    pub fn new(from: impl Into<String>, to_label: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to_label: to_label.into(),
            to_attribute: None,
        }
    }

    pub fn with_attribute(mut self, to_attribute: impl Into<String>) -> Self {
        self.to_attribute = Some(to_attribute.into());
        self
    }
}

/// A single parsed rule, before it is placed in the mapping tree.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlatElementMapping {
    pub from_tag: Element,
    pub from_attribute: Option<Element>,
    pub to_tag: Element,
    pub to_attribute: Option<Element>,
    pub vocabulary_type: VocabularyType,
}

impl FlatElementMapping {
    pub fn parse(
        input_namespaces: &NamespaceRegistry,
        output_schema: &dyn OutputSchema,
        from: &str,
        to_label: &str,
        to_attribute: Option<&str>,
    ) -> Result<Self, MappingError> {
        let from = from.trim();
        let namespace = input_namespaces.resolve_prefix(from, PREFIX_SEPARATOR)?;
        let rest = &from[namespace.prefix().len() + PREFIX_SEPARATOR.len()..];

        // The prefix itself may contain the separator (wgs84_pos), so only look past it
        let (tag_name, from_attribute) = match rest.split_once(ATTRIBUTE_SEPARATOR) {
            Some((tag_name, attribute)) => {
                (tag_name, Some(Element::parse(attribute, input_namespaces)?))
            }
            None => (rest, None),
        };
        if tag_name.is_empty() {
            return Err(MappingError::MalformedName {
                input: from.to_string(),
            });
        }
        let from_tag = Element::new(namespace.clone(), tag_name);

        let (to_tag, vocabulary_type) =
            output_schema
                .label_to_tag(to_label.trim())
                .ok_or_else(|| MappingError::UnknownLabel {
                    label: to_label.to_string(),
                })?;

        let to_attribute = to_attribute
            .filter(|attribute| !attribute.trim().is_empty())
            .map(|attribute| Element::parse(attribute, output_schema.namespaces()))
            .transpose()?;

        Ok(Self {
            from_tag,
            from_attribute,
            to_tag,
            to_attribute,
            vocabulary_type,
        })
    }

    pub fn from_rule(
        input_namespaces: &NamespaceRegistry,
        output_schema: &dyn OutputSchema,
        rule: &MappingRule,
    ) -> Result<Self, MappingError> {
        Self::parse(
            input_namespaces,
            output_schema,
            &rule.from,
            &rule.to_label,
            rule.to_attribute.as_deref(),
        )
    }

    /// A rule without attributes maps the tag and its text content.
    pub fn is_tag_mapping(&self) -> bool {
        self.from_attribute.is_none() && self.to_attribute.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{input_namespaces, SKOS, WGS84_POS, XML};
    use crate::schema::edm_schema;

    #[test]
    fn test_tag_rule() {
        let schema = edm_schema().unwrap();
        let flat = FlatElementMapping::parse(
            &input_namespaces(),
            &schema,
            "skos:prefLabel",
            "cc_skos_prefLabel",
            None,
        )
        .unwrap();
        assert_eq!(flat.from_tag, Element::new(SKOS.clone(), "prefLabel"));
        assert_eq!(flat.to_tag, Element::new(SKOS.clone(), "prefLabel"));
        assert_eq!(flat.from_attribute, None);
        assert_eq!(flat.to_attribute, None);
        assert_eq!(flat.vocabulary_type, VocabularyType::Concept);
        assert!(flat.is_tag_mapping());
    }

    #[test]
    fn test_attribute_rule() {
        let schema = edm_schema().unwrap();
        let flat = FlatElementMapping::parse(
            &input_namespaces(),
            &schema,
            "skos:prefLabel_xml:lang",
            "cc_skos_prefLabel",
            Some("xml:lang"),
        )
        .unwrap();
        assert_eq!(flat.from_tag, Element::new(SKOS.clone(), "prefLabel"));
        assert_eq!(flat.from_attribute, Some(Element::new(XML.clone(), "lang")));
        assert_eq!(flat.to_attribute, Some(Element::new(XML.clone(), "lang")));
        assert!(!flat.is_tag_mapping());
    }

    #[test]
    fn test_underscore_in_prefix_is_not_a_separator() {
        let schema = edm_schema().unwrap();
        let flat = FlatElementMapping::parse(
            &input_namespaces(),
            &schema,
            "wgs84_pos:lat",
            "pl_wgs84_pos_lat",
            Some("  "),
        )
        .unwrap();
        assert_eq!(flat.from_tag, Element::new(WGS84_POS.clone(), "lat"));
        assert_eq!(flat.from_attribute, None);
        assert_eq!(flat.to_attribute, None);
        assert_eq!(flat.vocabulary_type, VocabularyType::Place);
    }

    #[test]
    fn test_unknown_prefix_names_the_input() {
        let schema = edm_schema().unwrap();
        let err = FlatElementMapping::parse(
            &input_namespaces(),
            &schema,
            "zzz:label",
            "cc_skos_prefLabel",
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            MappingError::UnknownNamespace {
                input: "zzz:label".into()
            }
        );
    }

    #[test]
    fn test_unknown_attribute_prefix() {
        let schema = edm_schema().unwrap();
        let err = FlatElementMapping::parse(
            &input_namespaces(),
            &schema,
            "skos:prefLabel_zzz:lang",
            "cc_skos_prefLabel",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, MappingError::UnknownNamespace { input } if input == "zzz:lang"));
    }

    #[test]
    fn test_unknown_label() {
        let schema = edm_schema().unwrap();
        let rule = MappingRule::new("skos:prefLabel", "nope");
        let err = FlatElementMapping::from_rule(&input_namespaces(), &schema, &rule).unwrap_err();
        assert_eq!(err, MappingError::UnknownLabel { label: "nope".into() });
    }

    #[test]
    fn test_target_attribute_uses_output_namespaces() {
        let schema = edm_schema().unwrap();
        // gn is only known on the input side
        let rule = MappingRule::new("gn:name", "pl_skos_prefLabel").with_attribute("gn:lang");
        let err = FlatElementMapping::from_rule(&input_namespaces(), &schema, &rule).unwrap_err();
        assert!(matches!(err, MappingError::UnknownNamespace { .. }));
    }
}
