use clap::{Args, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use tf_pcf::{AttributeValue, Graph};

use super::Source;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct DumpArgs {
    #[command(flatten)]
    source: Source,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

/// Short rendering of a value, element references as `#index`
fn describe(value: &AttributeValue) -> String {
    fn reference(handle: &Option<tf_pcf::ElementHandle>) -> String {
        handle.map_or("null".to_string(), |handle| handle.to_string())
    }

    match value {
        AttributeValue::Element(handle) => reference(handle),
        AttributeValue::ElementArray(handles) => {
            format!("[{}]", handles.iter().map(reference).collect::<Vec<_>>().join(", "))
        }
        AttributeValue::String(value) => format!("{value:?}"),
        AttributeValue::Binary(value) => format!("<{} bytes>", value.len()),
        AttributeValue::Int(value) | AttributeValue::Time(value) => value.to_string(),
        AttributeValue::Float(value) => value.to_string(),
        AttributeValue::ObjectId(id) => id.to_string(),
        AttributeValue::Bool(value) => value.to_string(),
        other => format!("{other:?}")
            .split_once('(')
            .map(|(_, rest)| rest.trim_end_matches(')').to_string())
            .unwrap_or_default(),
    }
}

fn print_text(name: &str, graph: &Graph) {
    println!("{} {}", name.bold(), graph.header());
    for (handle, element) in graph.iter() {
        println!(
            "{} {} {:?} {}",
            handle.blue(),
            element.type_name,
            element.name,
            element.id.dimmed()
        );
        for attribute in &element.attributes {
            println!(
                "    {} {} = {}",
                attribute.value.kind().dimmed(),
                attribute.name,
                describe(&attribute.value)
            );
        }
    }
}

impl DumpArgs {
    pub fn handle(&self) -> Result<()> {
        for (name, bytes) in self.source.load()? {
            let graph = tf_pcf::decode(&bytes).context(format!("decoding {name}"))?;
            match self.format {
                Format::Text => print_text(&name, &graph),
                Format::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&graph)
                        .into_diagnostic()
                        .context(format!("serializing {name}"))?
                ),
            }
        }

        Ok(())
    }
}
