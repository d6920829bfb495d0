use std::collections::{btree_map::Entry, BTreeMap};

use log::trace;
use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};

use super::{
    element::{Element, ElementMapping},
    error::MappingError,
    namespace::{Namespace, XML, XSL},
    schema::InputSchema,
    tree::{ElementMappings, HierarchicalElementMapping},
};

/// Name of the stylesheet parameter selecting a single record by identifier.
pub const TARGET_ID_PARAM: &str = "targetId";

const XSL_STYLESHEET: &str = "xsl:stylesheet";
const XSL_PARAM: &str = "xsl:param";
const XSL_OUTPUT: &str = "xsl:output";
const XSL_TEMPLATE: &str = "xsl:template";
const XSL_FOR_EACH: &str = "xsl:for-each";
const XSL_IF: &str = "xsl:if";
const XSL_ATTRIBUTE: &str = "xsl:attribute";
const XSL_VALUE_OF: &str = "xsl:value-of";
const XSL_COPY_OF: &str = "xsl:copy-of";
const XSL_TEXT: &str = "xsl:text";

/// How child elements are looked up below a record.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ChildAxis {
    /// Direct children of the record only (`./name`).
    #[default]
    Child,
    /// Any descendant of the record (`.//name`).
    DescendantOrSelf,
}

impl ChildAxis {
    fn select(self, name: &Element) -> String {
        match self {
            Self::Child => format!("./{name}"),
            Self::DescendantOrSelf => format!(".//{name}"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WriterOptions {
    pub child_axis: ChildAxis,
    /// Emit the identifier parameter and only transform the record it names.
    pub identifier_guard: bool,
    pub indent: usize,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            child_axis: ChildAxis::Child,
            identifier_guard: true,
            indent: 2,
        }
    }
}

type XmlWriter = Writer<Vec<u8>>;

/// Serializes a mapping tree as an XSLT 1.0 stylesheet.
pub struct XslWriter<'a> {
    input_schema: &'a InputSchema,
    options: WriterOptions,
}

impl<'a> XslWriter<'a> {
    pub fn new(input_schema: &'a InputSchema, options: WriterOptions) -> Self {
        Self {
            input_schema,
            options,
        }
    }

    /// Write the whole stylesheet, UTF-8 encoded. Nothing is returned unless every part of the
    /// document could be written.
    pub fn write(&self, mappings: &ElementMappings) -> Result<Vec<u8>, MappingError> {
        let declarations = self.namespace_declarations(mappings)?;

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', self.options.indent);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(MappingError::emission)?;

        let mut stylesheet = BytesStart::new(XSL_STYLESHEET);
        stylesheet.push_attribute(("version", "1.0"));
        for (prefix, uri) in &declarations {
            stylesheet.push_attribute((format!("xmlns:{prefix}").as_str(), uri.as_str()));
        }
        writer
            .write_event(Event::Start(stylesheet))
            .map_err(MappingError::emission)?;

        if self.options.identifier_guard {
            empty(&mut writer, XSL_PARAM, &[("name", TARGET_ID_PARAM)])?;
        }
        empty(
            &mut writer,
            XSL_OUTPUT,
            &[("indent", "yes"), ("encoding", "UTF-8")],
        )?;

        let envelope = format!("/{}", self.input_schema.envelope_tag);
        start(&mut writer, XSL_TEMPLATE, &[("match", envelope.as_str())])?;
        self.write_parent(&mut writer, mappings)?;
        end(&mut writer, XSL_TEMPLATE)?;

        end(&mut writer, XSL_STYLESHEET)?;
        Ok(writer.into_inner())
    }

    /// Every namespace the stylesheet refers to, keyed by prefix. The xml namespace is bound
    /// implicitly and left out.
    fn namespace_declarations(
        &self,
        mappings: &ElementMappings,
    ) -> Result<BTreeMap<String, String>, MappingError> {
        let mut names = vec![&self.input_schema.envelope_tag];
        if self.options.identifier_guard {
            names.push(&self.input_schema.identifier_attribute);
        }
        for mapping in mappings.iter() {
            let tag_mapping = mapping.tag_mapping();
            names.extend([&tag_mapping.from, &tag_mapping.to]);
            for attribute_mapping in mapping.attribute_mappings() {
                names.extend([&attribute_mapping.from, &attribute_mapping.to]);
            }
        }

        let mut declarations = BTreeMap::new();
        declare(&mut declarations, &XSL)?;
        for name in names {
            if !name.is_valid_xml_name() {
                return Err(MappingError::Emission(format!(
                    "{name} is not a valid XML name"
                )));
            }
            declare(&mut declarations, name.namespace())?;
        }
        Ok(declarations)
    }

    fn write_parent(
        &self,
        writer: &mut XmlWriter,
        mappings: &ElementMappings,
    ) -> Result<(), MappingError> {
        let parent = mappings.parent_mapping();
        let tag_mapping = parent.tag_mapping();

        let select = ChildAxis::Child.select(&tag_mapping.from);
        start(writer, XSL_FOR_EACH, &[("select", select.as_str())])?;
        if self.options.identifier_guard {
            let test = format!(
                "@{}=${TARGET_ID_PARAM}",
                self.input_schema.identifier_attribute
            );
            start(writer, XSL_IF, &[("test", test.as_str())])?;
        }

        let target = tag_mapping.to.to_string();
        start(writer, &target, &[])?;
        write_attributes(writer, parent.attribute_mappings())?;
        for child in mappings.child_mappings() {
            self.write_child(writer, child)?;
        }
        end(writer, &target)?;

        if self.options.identifier_guard {
            end(writer, XSL_IF)?;
        }
        end(writer, XSL_FOR_EACH)
    }

    fn write_child(
        &self,
        writer: &mut XmlWriter,
        child: &HierarchicalElementMapping,
    ) -> Result<(), MappingError> {
        let tag_mapping = child.tag_mapping();
        trace!("writing child mapping {tag_mapping}");

        if child.copy_whole_node() {
            let select = self.options.child_axis.select(&tag_mapping.to);
            return empty(writer, XSL_COPY_OF, &[("select", select.as_str())]);
        }

        let select = self.options.child_axis.select(&tag_mapping.from);
        start(writer, XSL_FOR_EACH, &[("select", select.as_str())])?;
        let target = tag_mapping.to.to_string();
        start(writer, &target, &[])?;
        write_attributes(writer, child.attribute_mappings())?;
        if child.include_tag_value() {
            write_text_value(writer)?;
        }
        end(writer, &target)?;
        end(writer, XSL_FOR_EACH)
    }
}

fn declare(
    declarations: &mut BTreeMap<String, String>,
    namespace: &Namespace,
) -> Result<(), MappingError> {
    if namespace.prefix() == XML.prefix() {
        return Ok(());
    }
    match declarations.entry(namespace.prefix().to_string()) {
        Entry::Occupied(entry) if entry.get() != namespace.uri() => {
            Err(MappingError::NamespaceConflict {
                prefix: namespace.prefix().to_string(),
                first: entry.get().clone(),
                second: namespace.uri().to_string(),
            })
        }
        Entry::Occupied(_) => Ok(()),
        Entry::Vacant(entry) => {
            entry.insert(namespace.uri().to_string());
            Ok(())
        }
    }
}

/// Copy each attribute that is present on the source element.
fn write_attributes<'m>(
    writer: &mut XmlWriter,
    attribute_mappings: impl IntoIterator<Item = &'m ElementMapping>,
) -> Result<(), MappingError> {
    for mapping in attribute_mappings {
        let source = format!("@{}", mapping.from);
        let target = mapping.to.to_string();
        start(writer, XSL_IF, &[("test", source.as_str())])?;
        start(writer, XSL_ATTRIBUTE, &[("name", target.as_str())])?;
        empty(writer, XSL_VALUE_OF, &[("select", source.as_str())])?;
        end(writer, XSL_ATTRIBUTE)?;
        end(writer, XSL_IF)?;
    }
    Ok(())
}

/// Concatenate the non-blank text nodes of the source element, normalized and separated by a
/// single space.
fn write_text_value(writer: &mut XmlWriter) -> Result<(), MappingError> {
    start(writer, XSL_FOR_EACH, &[("select", "text()[normalize-space()]")])?;
    start(writer, XSL_IF, &[("test", "position() > 1")])?;
    start(writer, XSL_TEXT, &[])?;
    writer
        .write_event(Event::Text(BytesText::new(" ")))
        .map_err(MappingError::emission)?;
    end(writer, XSL_TEXT)?;
    end(writer, XSL_IF)?;
    empty(writer, XSL_VALUE_OF, &[("select", "normalize-space(.)")])?;
    end(writer, XSL_FOR_EACH)
}

fn start(
    writer: &mut XmlWriter,
    name: &str,
    attributes: &[(&str, &str)],
) -> Result<(), MappingError> {
    let mut element = BytesStart::new(name);
    element.extend_attributes(attributes.iter().copied());
    writer
        .write_event(Event::Start(element))
        .map_err(MappingError::emission)
}

fn empty(
    writer: &mut XmlWriter,
    name: &str,
    attributes: &[(&str, &str)],
) -> Result<(), MappingError> {
    let mut element = BytesStart::new(name);
    element.extend_attributes(attributes.iter().copied());
    writer
        .write_event(Event::Empty(element))
        .map_err(MappingError::emission)
}

fn end(writer: &mut XmlWriter, name: &str) -> Result<(), MappingError> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(MappingError::emission)
}
