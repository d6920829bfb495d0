use vx_mapping::{compile_vocabulary, CompileOptions, InputSchema, OutputSchema, VocabularyType};

use crate::{error::CompilerError, legacy::LegacyVocabulary};

/// A vocabulary ready to be stored for dereferencing: its compiled stylesheet plus the rules that
/// decide which resources it applies to.
#[derive(Clone, Debug)]
pub struct Vocabulary {
    pub name: String,
    pub uri: Option<String>,
    pub suffix: Option<String>,
    /// Carried over from the legacy record untouched.
    pub url_rules: Vec<String>,
    /// Carried over from the legacy record untouched.
    pub type_rules: Vec<String>,
    pub vocabulary_type: VocabularyType,
    pub xslt: String,
}

impl Vocabulary {
    pub fn compile(
        legacy: LegacyVocabulary,
        input_schema: &InputSchema,
        output_schema: &dyn OutputSchema,
        options: &CompileOptions,
    ) -> Result<Self, CompilerError> {
        let rules = legacy.rules();
        let compiled =
            compile_vocabulary(&legacy.name, &rules, input_schema, output_schema, options)?;

        Ok(Self {
            name: legacy.name,
            uri: legacy.uri,
            suffix: legacy.suffix,
            url_rules: legacy.url_rules,
            type_rules: legacy.type_rules,
            vocabulary_type: compiled.vocabulary_type,
            xslt: String::from_utf8(compiled.stylesheet)?,
        })
    }
}
