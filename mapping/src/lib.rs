//! Compiler from legacy vocabulary field mappings to XSLT 1.0 stylesheets.
//!
//! A vocabulary is a set of [`MappingRule`]s. Each rule is parsed into a [`FlatElementMapping`],
//! the flat mappings are assembled into an [`ElementMappings`] tree, and the tree is written out
//! by the [`XslWriter`] as a stylesheet that turns the vocabulary's RDF/XML into the target
//! schema.

pub mod element;
pub mod error;
pub mod flat;
pub mod namespace;
pub mod schema;
pub mod tree;
pub mod xsl_writer;

use std::collections::BTreeSet;

use log::info;

pub use element::{Element, ElementMapping};
pub use error::MappingError;
pub use flat::{FlatElementMapping, MappingRule};
pub use namespace::{Namespace, NamespaceRegistry};
pub use schema::{edm_schema, InputSchema, OutputSchema, TableSchema, VocabularyType};
pub use tree::{ElementMappings, HierarchicalElementMapping};
pub use xsl_writer::{ChildAxis, WriterOptions, XslWriter};

#[derive(Clone, Debug, Default)]
pub struct CompileOptions {
    pub writer: WriterOptions,
    /// Target tags copied verbatim when they are mapped onto themselves.
    pub passthrough_tags: BTreeSet<Element>,
}

/// The result of compiling one vocabulary.
#[derive(Clone, Debug)]
pub struct CompiledVocabulary {
    pub vocabulary_type: VocabularyType,
    pub mappings: ElementMappings,
    /// The UTF-8 encoded stylesheet.
    pub stylesheet: Vec<u8>,
}

pub fn compile_vocabulary(
    vocabulary_id: &str,
    rules: &[MappingRule],
    input_schema: &InputSchema,
    output_schema: &dyn OutputSchema,
    options: &CompileOptions,
) -> Result<CompiledVocabulary, MappingError> {
    let flat_mappings = rules
        .iter()
        .map(|rule| FlatElementMapping::from_rule(&input_schema.namespaces, output_schema, rule))
        .collect::<Result<Vec<_>, _>>()?;

    let mappings = ElementMappings::build(
        vocabulary_id,
        flat_mappings,
        input_schema,
        output_schema,
        &options.passthrough_tags,
    )?;
    let stylesheet = XslWriter::new(input_schema, options.writer).write(&mappings)?;

    info!(
        "compiled {} vocabulary {vocabulary_id:?} from {} rules",
        mappings.vocabulary_type(),
        rules.len()
    );
    Ok(CompiledVocabulary {
        vocabulary_type: mappings.vocabulary_type(),
        mappings,
        stylesheet,
    })
}
