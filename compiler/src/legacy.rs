use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use vx_mapping::MappingRule;

lazy_static! {
    static ref ENTRY: Regex = Regex::new(r"^([a-z][a-z-]*)\s*:\s*(.*?)\s*$").unwrap();
    static ref ELEMENT: Regex = Regex::new(r"^(\S+)\s*=>\s*(.+)$").unwrap();
    static ref FIELD: Regex = Regex::new(r"^([A-Za-z0-9_]+)(?:@(\S+))?$").unwrap();
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LegacyError {
    #[error("line {line}: expected `key: value`")]
    Syntax { line: usize },
    #[error("line {line}: unknown key {key:?}")]
    UnknownKey { line: usize, key: String },
    #[error("line {line}: key {key:?} given more than once")]
    DuplicateKey { line: usize, key: String },
    #[error("line {line}: malformed element {value:?}, expected `source => label[@attribute], ...`")]
    MalformedElement { line: usize, value: String },
    #[error("missing required key {0:?}")]
    MissingKey(&'static str),
}

/// A target field of a legacy element entry, written `label` or `label@attribute`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappedField {
    pub label: String,
    pub attribute: Option<String>,
}

/// One `element` entry: a source string and the fields it feeds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyElement {
    pub from: String,
    pub fields: Vec<MappedField>,
}

/// A controlled vocabulary record in its legacy text form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LegacyVocabulary {
    pub name: String,
    pub uri: Option<String>,
    pub suffix: Option<String>,
    pub url_rules: Vec<String>,
    pub type_rules: Vec<String>,
    pub elements: Vec<LegacyElement>,
}

impl LegacyVocabulary {
    pub fn parse(source: &str) -> Result<Self, LegacyError> {
        let mut name = None;
        let mut vocabulary = Self::default();

        for (index, line) in source.lines().enumerate() {
            let line_number = index + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let captures = ENTRY
                .captures(line)
                .ok_or(LegacyError::Syntax { line: line_number })?;
            let key = &captures[1];
            let value = captures[2].to_string();

            match key {
                "name" => set_once(&mut name, value, key, line_number)?,
                "uri" => set_once(&mut vocabulary.uri, value, key, line_number)?,
                "suffix" => set_once(&mut vocabulary.suffix, value, key, line_number)?,
                "url-rule" => vocabulary.url_rules.push(value),
                "type-rule" => vocabulary.type_rules.push(value),
                "element" => vocabulary
                    .elements
                    .push(parse_element(&value, line_number)?),
                _ => {
                    return Err(LegacyError::UnknownKey {
                        line: line_number,
                        key: key.to_string(),
                    })
                }
            }
        }

        vocabulary.name = name.ok_or(LegacyError::MissingKey("name"))?;
        Ok(vocabulary)
    }

    /// Expand the element entries into one rule per mapped field.
    pub fn rules(&self) -> Vec<MappingRule> {
        self.elements
            .iter()
            .flat_map(|element| {
                element.fields.iter().map(|field| MappingRule {
                    from: element.from.clone(),
                    to_label: field.label.clone(),
                    to_attribute: field.attribute.clone(),
                })
            })
            .collect()
    }
}

fn set_once(
    slot: &mut Option<String>,
    value: String,
    key: &str,
    line: usize,
) -> Result<(), LegacyError> {
    if slot.is_some() {
        return Err(LegacyError::DuplicateKey {
            line,
            key: key.to_string(),
        });
    }
    *slot = Some(value);
    Ok(())
}

fn parse_element(value: &str, line: usize) -> Result<LegacyElement, LegacyError> {
    let malformed = || LegacyError::MalformedElement {
        line,
        value: value.to_string(),
    };

    let captures = ELEMENT.captures(value).ok_or_else(malformed)?;
    let fields = captures[2]
        .split(',')
        .map(|field| {
            let field = FIELD.captures(field.trim()).ok_or_else(malformed)?;
            Ok(MappedField {
                label: field[1].to_string(),
                attribute: field.get(2).map(|attribute| attribute.as_str().to_string()),
            })
        })
        .collect::<Result<Vec<_>, LegacyError>>()?;

    Ok(LegacyElement {
        from: captures[1].to_string(),
        fields,
    })
}
