use clap::Args;
use miette::Result;
use std::path::PathBuf;
use tf_pcf::{AttributeKind, AttributeValue, Graph};
use tf_vpk::ArchiveOptions;

use crate::{error::Error, hooks::Processor, pipeline::ModSession};

#[derive(Args)]
pub struct SetArgs {
    /// An input `_dir.vpk` file
    #[arg(short, long, value_name = "FILE")]
    archive: PathBuf,

    /// Logical path or bare file name of the particle file
    #[arg(short, long, value_name = "PATH")]
    entry: String,

    /// Name of the element to change, every element of that name is changed
    #[arg(long)]
    element: String,

    /// Name of the attribute, which has to exist already
    #[arg(long)]
    attribute: String,

    /// New value, vectors and colors as space separated components
    #[arg(long, allow_hyphen_values = true)]
    value: String,

    /// Skip saving the original bytes
    #[arg(long, default_value_t = false)]
    no_backup: bool,
}

fn floats<const N: usize>(text: &str) -> Option<[f32; N]> {
    let parts = text
        .split_whitespace()
        .map(|part| part.parse::<f32>().ok())
        .collect::<Option<Vec<_>>>()?;
    parts.try_into().ok()
}

/// Parse `text` as a value of the given kind. Arrays and element references are not supported.
pub fn parse_value(kind: AttributeKind, text: &str) -> Option<AttributeValue> {
    let value = match kind {
        AttributeKind::Int => AttributeValue::Int(text.trim().parse().ok()?),
        AttributeKind::Time => AttributeValue::Time(text.trim().parse().ok()?),
        AttributeKind::Float => AttributeValue::Float(text.trim().parse().ok()?),
        AttributeKind::Bool => match text.trim() {
            "1" | "true" => AttributeValue::Bool(true),
            "0" | "false" => AttributeValue::Bool(false),
            _ => return None,
        },
        AttributeKind::String => AttributeValue::String(text.to_owned()),
        AttributeKind::Color => {
            let parts = text
                .split_whitespace()
                .map(|part| part.parse::<u8>().ok())
                .collect::<Option<Vec<_>>>()?;
            AttributeValue::Color(parts.try_into().ok()?)
        }
        AttributeKind::Vector2 => AttributeValue::Vector2(floats(text)?),
        AttributeKind::Vector3 => AttributeValue::Vector3(floats(text)?),
        AttributeKind::Vector4 => AttributeValue::Vector4(floats(text)?),
        AttributeKind::QAngle => AttributeValue::QAngle(floats(text)?),
        AttributeKind::Quaternion => AttributeValue::Quaternion(floats(text)?),
        _ => return None,
    };
    Some(value)
}

impl SetArgs {
    fn apply(&self, graph: &mut Graph) -> crate::error::Result<()> {
        let mut changed = 0usize;
        for (_, element) in graph.iter_mut() {
            if element.name != self.element {
                continue;
            }
            let Some(current) = element.attribute_mut(&self.attribute) else {
                continue;
            };
            let kind = current.kind();
            *current = parse_value(kind, &self.value).ok_or_else(|| {
                Error::mutation(
                    &self.entry,
                    format!("{:?} is not a valid {kind} value", self.value),
                )
            })?;
            changed += 1;
        }

        if changed == 0 {
            return Err(Error::mutation(
                &self.entry,
                format!(
                    "no element {:?} with an attribute {:?}",
                    self.element, self.attribute
                ),
            ));
        }
        Ok(())
    }

    pub fn handle(&self) -> Result<()> {
        let session = ModSession::open(&self.archive, ArchiveOptions::default())?;
        let outcome = session.process(
            &self.entry,
            Processor::graph(|graph: &mut Graph| self.apply(graph)),
            !self.no_backup,
        )?;

        println!(
            "patched {} ({} bytes, {} bytes of padding)",
            outcome.path,
            outcome.original_size,
            outcome.padding()
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tf_pcf::{AttributeKind, AttributeValue};

    use super::parse_value;

    #[test]
    fn parse_scalars() {
        assert_eq!(parse_value(AttributeKind::Int, " 12 "), Some(AttributeValue::Int(12)));
        assert_eq!(
            parse_value(AttributeKind::Float, "-0.5"),
            Some(AttributeValue::Float(-0.5))
        );
        assert_eq!(parse_value(AttributeKind::Bool, "true"), Some(AttributeValue::Bool(true)));
        assert_eq!(
            parse_value(AttributeKind::String, "effects/fire.vmt"),
            Some(AttributeValue::String("effects/fire.vmt".into()))
        );
        assert_eq!(parse_value(AttributeKind::Int, "1.5"), None);
        assert_eq!(parse_value(AttributeKind::Bool, "yes"), None);
    }

    #[test]
    fn parse_aggregates() {
        assert_eq!(
            parse_value(AttributeKind::Color, "255 128 0 255"),
            Some(AttributeValue::Color([255, 128, 0, 255]))
        );
        assert_eq!(
            parse_value(AttributeKind::Vector3, "0 1 -2.5"),
            Some(AttributeValue::Vector3([0.0, 1.0, -2.5]))
        );
        assert_eq!(parse_value(AttributeKind::Vector3, "0 1"), None);
        assert_eq!(parse_value(AttributeKind::Color, "256 0 0 0"), None);
    }

    #[test]
    fn parse_unsupported_kinds() {
        assert_eq!(parse_value(AttributeKind::Element, "0"), None);
        assert_eq!(parse_value(AttributeKind::IntArray, "1 2"), None);
    }
}
