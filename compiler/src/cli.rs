use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use vx_mapping::{ChildAxis, CompileOptions, Element, MappingError, NamespaceRegistry, WriterOptions};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Axis {
    Child,
    DescendantOrSelf,
}

impl From<Axis> for ChildAxis {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::Child => ChildAxis::Child,
            Axis::DescendantOrSelf => ChildAxis::DescendantOrSelf,
        }
    }
}

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[arg(help = "The legacy vocabulary file or URL")]
    pub input: String,

    #[arg(short, long, help = "Write the stylesheet to this file instead of stdout")]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        value_enum,
        default_value = "child",
        help = "How field elements are looked up below a record"
    )]
    pub axis: Axis,

    #[arg(
        long,
        help = "Transform every record instead of only the one named by the targetId parameter"
    )]
    pub no_identifier_guard: bool,

    #[arg(long, default_value_t = 2, help = "Indentation width of the stylesheet")]
    pub indent: usize,

    #[arg(
        long,
        value_name = "QNAME",
        help = "Copy this target tag verbatim when it is mapped onto itself (repeatable)"
    )]
    pub passthrough: Vec<String>,
}

impl Cli {
    pub fn compile_options(
        &self,
        output_namespaces: &NamespaceRegistry,
    ) -> Result<CompileOptions, MappingError> {
        let passthrough_tags = self
            .passthrough
            .iter()
            .map(|tag| Element::parse(tag, output_namespaces))
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(CompileOptions {
            writer: WriterOptions {
                child_axis: self.axis.into(),
                identifier_guard: !self.no_identifier_guard,
                indent: self.indent,
            },
            passthrough_tags,
        })
    }
}
