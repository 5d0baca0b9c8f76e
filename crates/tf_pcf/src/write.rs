//! Encoding a [`Graph`] back into binary DMX bytes

use tf_cursor::ByteWriter;
use tracing::{debug, instrument};

use crate::{
    error::{CodecError, Result},
    graph::Graph,
    pool::{check_storable, PoolLayout, StringPool},
    types::{AttributeValue, ElementHandle},
};

/// Encode a graph with the header it carries.
///
/// The string table is rebuilt from the names and string values in the order they are written.
/// Elements and attributes keep their order.
#[instrument(skip_all, fields(elements = graph.len()))]
pub fn encode(graph: &Graph) -> Result<Vec<u8>> {
    let version = graph.header().binary_version()?;
    graph.validate()?;

    let layout = PoolLayout::for_version(version);
    let pool = collect_strings(graph, &layout)?;

    let mut encoder = Encoder {
        writer: ByteWriter::new(),
        version,
        layout,
        pool,
    };
    encoder.write_str(&format!("{}\n", graph.header()))?;
    encoder.write_string_table();
    encoder.write_elements(graph)?;

    let bytes = encoder.writer.into_inner();
    debug!(version, strings = encoder.pool.len(), size = bytes.len(), "encoded");
    Ok(bytes)
}

/// Intern every pooled string in the order the encoder will reference it.
fn collect_strings(graph: &Graph, layout: &PoolLayout) -> Result<StringPool> {
    let mut pool = StringPool::default();
    for (_, element) in graph.iter() {
        pool.intern(&element.type_name)?;
        if layout.pooled_values {
            pool.intern(&element.name)?;
        }
    }
    for (_, element) in graph.iter() {
        for attribute in &element.attributes {
            pool.intern(&attribute.name)?;
            if let (true, AttributeValue::String(value)) = (layout.pooled_values, &attribute.value)
            {
                pool.intern(value)?;
            }
        }
    }
    pool.check_limit(layout)?;
    Ok(pool)
}

struct Encoder {
    writer: ByteWriter,
    version: u32,
    layout: PoolLayout,
    pool: StringPool,
}

impl Encoder {
    fn write_str(&mut self, value: &str) -> Result<()> {
        check_storable(value)?;
        self.writer.write_nul_terminated_str(value);
        Ok(())
    }

    fn write_string_table(&mut self) {
        self.layout
            .count
            .write(&mut self.writer, self.pool.len() as u32);
        for value in self.pool.iter() {
            self.writer.write_nul_terminated_str(value);
        }
    }

    fn write_index(&mut self, value: &str) -> Result<()> {
        let index = self.pool.index_of(value)?;
        self.layout.index.write(&mut self.writer, index);
        Ok(())
    }

    fn write_value_string(&mut self, value: &str) -> Result<()> {
        if self.layout.pooled_values {
            self.write_index(value)
        } else {
            self.write_str(value)
        }
    }

    fn write_elements(&mut self, graph: &Graph) -> Result<()> {
        self.writer.write_u32_le(graph.len() as u32);
        for (_, element) in graph.iter() {
            self.write_index(&element.type_name)?;
            self.write_value_string(&element.name)?;
            self.writer.write_bytes(&element.id.0);
        }

        for (_, element) in graph.iter() {
            self.writer.write_u32_le(element.attributes.len() as u32);
            for attribute in &element.attributes {
                self.write_index(&attribute.name)?;
                let kind = attribute.value.kind();
                if !kind.exists_in(self.version) {
                    return Err(CodecError::MalformedAttribute {
                        offset: self.writer.position(),
                        reason: format!(
                            "{kind} value {:?} cannot be stored in binary version {}",
                            attribute.name, self.version
                        ),
                    });
                }
                self.writer.write_u8(kind.tag());
                self.write_value(&attribute.value)?;
            }
        }
        Ok(())
    }

    fn write_value(&mut self, value: &AttributeValue) -> Result<()> {
        let writer = &mut self.writer;
        match value {
            AttributeValue::Element(handle) => write_reference(writer, *handle),
            AttributeValue::Int(value) | AttributeValue::Time(value) => writer.write_i32_le(*value),
            AttributeValue::Float(value) => writer.write_f32_le(*value),
            AttributeValue::Bool(value) => writer.write_u8(*value as u8),
            AttributeValue::String(value) => return self.write_value_string(value),
            AttributeValue::Binary(value) => write_binary(writer, value)?,
            AttributeValue::Color(value) => writer.write_bytes(value),
            AttributeValue::Vector2(value) => write_floats(writer, value),
            AttributeValue::Vector3(value) | AttributeValue::QAngle(value) => {
                write_floats(writer, value)
            }
            AttributeValue::Vector4(value) | AttributeValue::Quaternion(value) => {
                write_floats(writer, value)
            }
            AttributeValue::Matrix(value) => write_floats(writer, value),
            AttributeValue::ObjectId(value) => writer.write_bytes(&value.0),
            AttributeValue::ElementArray(values) => {
                write_array(writer, values, |w, handle| write_reference(w, *handle))
            }
            AttributeValue::IntArray(values) | AttributeValue::TimeArray(values) => {
                write_array(writer, values, |w, value| w.write_i32_le(*value))
            }
            AttributeValue::FloatArray(values) => {
                write_array(writer, values, |w, value| w.write_f32_le(*value))
            }
            AttributeValue::BoolArray(values) => {
                write_array(writer, values, |w, value| w.write_u8(*value as u8))
            }
            AttributeValue::StringArray(values) => {
                for value in values {
                    check_storable(value)?;
                }
                write_array(writer, values, |w, value| w.write_nul_terminated_str(value))
            }
            AttributeValue::BinaryArray(values) => {
                writer.write_u32_le(values.len() as u32);
                for value in values {
                    write_binary(writer, value)?;
                }
            }
            AttributeValue::ColorArray(values) => {
                write_array(writer, values, |w, value| w.write_bytes(value))
            }
            AttributeValue::Vector2Array(values) => {
                write_array(writer, values, |w, value| write_floats(w, value))
            }
            AttributeValue::Vector3Array(values) | AttributeValue::QAngleArray(values) => {
                write_array(writer, values, |w, value| write_floats(w, value))
            }
            AttributeValue::Vector4Array(values) | AttributeValue::QuaternionArray(values) => {
                write_array(writer, values, |w, value| write_floats(w, value))
            }
            AttributeValue::MatrixArray(values) => {
                write_array(writer, values, |w, value| write_floats(w, value))
            }
            AttributeValue::ObjectIdArray(values) => {
                write_array(writer, values, |w, value| w.write_bytes(&value.0))
            }
        }
        Ok(())
    }
}

fn write_reference(writer: &mut ByteWriter, handle: Option<ElementHandle>) {
    let index = handle.map_or(-1, |handle| handle.index() as i32);
    writer.write_i32_le(index);
}

fn write_floats(writer: &mut ByteWriter, values: &[f32]) {
    for value in values {
        writer.write_f32_le(*value);
    }
}

fn write_binary(writer: &mut ByteWriter, value: &[u8]) -> Result<()> {
    let offset = writer.position();
    writer
        .write_u32_prefixed_bytes(value)
        .map_err(|_| CodecError::MalformedAttribute {
            offset,
            reason: format!("binary value of {} bytes is too large", value.len()),
        })
}

fn write_array<T>(writer: &mut ByteWriter, values: &[T], mut item: impl FnMut(&mut ByteWriter, &T)) {
    writer.write_u32_le(values.len() as u32);
    for value in values {
        item(writer, value);
    }
}
