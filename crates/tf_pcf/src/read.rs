//! Decoding binary DMX bytes into a [`Graph`]

use tf_cursor::ByteCursor;
use tracing::{debug, instrument};

use crate::{
    error::{CodecError, Result},
    graph::Graph,
    header::DmxHeader,
    pool::PoolLayout,
    types::{Attribute, AttributeKind, AttributeValue, Element, ElementHandle, ElementId},
};

const NULL_REFERENCE: i32 = -1;
const EXTERNAL_REFERENCE: i32 = -2;

/// Decode a binary DMX file.
///
/// Decoding is all or nothing: any structural problem fails the whole call.
#[instrument(skip_all, fields(size = bytes.len()))]
pub fn decode(bytes: &[u8]) -> Result<Graph> {
    let mut cursor = ByteCursor::new(bytes);
    let header = DmxHeader::parse(cursor.read_nul_terminated_str()?)?;
    let version = header.binary_version()?;

    let mut decoder = Decoder {
        cursor,
        version,
        layout: PoolLayout::for_version(version),
        strings: Vec::new(),
        element_count: 0,
    };
    decoder.read_string_table()?;
    let elements = decoder.read_elements()?;

    if decoder.cursor.remaining() > 0 {
        debug!(
            remaining = decoder.cursor.remaining(),
            "ignoring bytes after last element"
        );
    }
    debug!(version, elements = elements.len(), strings = decoder.strings.len(), "decoded");

    Ok(Graph::from_parts(header, elements))
}

struct Decoder<'a> {
    cursor: ByteCursor<&'a [u8]>,
    version: u32,
    layout: PoolLayout,
    strings: Vec<String>,
    element_count: usize,
}

impl Decoder<'_> {
    fn read_string_table(&mut self) -> Result<()> {
        let count = self.layout.count.read(&mut self.cursor)? as usize;
        self.strings = Vec::with_capacity(count.min(self.cursor.remaining()));
        for _ in 0..count {
            let value = self.cursor.read_nul_terminated_str()?.to_owned();
            self.strings.push(value);
        }
        Ok(())
    }

    fn read_elements(&mut self) -> Result<Vec<Element>> {
        let count = self.cursor.read_u32_le()? as usize;
        self.element_count = count;

        let mut elements = Vec::with_capacity(count.min(self.cursor.remaining()));
        for _ in 0..count {
            let type_name = self.read_pooled_string()?;
            let name = self.read_value_string()?;
            let id = ElementId(self.cursor.read_array::<16>()?);
            elements.push(Element::new(type_name, name, id));
        }

        for (index, element) in elements.iter_mut().enumerate() {
            let attribute_count = self.cursor.read_u32_le()? as usize;
            element.attributes = Vec::with_capacity(attribute_count.min(self.cursor.remaining()));
            for _ in 0..attribute_count {
                let attribute = self.read_attribute(index)?;
                element.attributes.push(attribute);
            }
        }

        Ok(elements)
    }

    fn read_attribute(&mut self, element: usize) -> Result<Attribute> {
        let name = self.read_pooled_string()?;
        let offset = self.cursor.position();
        let tag = self.cursor.read_u8()?;
        let kind = AttributeKind::from_tag(tag, self.version).ok_or_else(|| CodecError::MalformedAttribute {
            offset,
            reason: format!("unknown type tag {tag} for {name:?}"),
        })?;

        let value = self.read_value(kind, element, &name)?;
        Ok(Attribute { name, value })
    }

    fn read_value(&mut self, kind: AttributeKind, element: usize, name: &str) -> Result<AttributeValue> {
        let value = match kind {
            AttributeKind::Element => AttributeValue::Element(self.read_reference(element, name)?),
            AttributeKind::Int => AttributeValue::Int(self.cursor.read_i32_le()?),
            AttributeKind::Float => AttributeValue::Float(self.cursor.read_f32_le()?),
            AttributeKind::Bool => AttributeValue::Bool(self.cursor.read_u8()? != 0),
            AttributeKind::String => AttributeValue::String(self.read_value_string()?),
            AttributeKind::Binary => AttributeValue::Binary(self.cursor.read_u32_prefixed_bytes()?.to_vec()),
            AttributeKind::Time => AttributeValue::Time(self.cursor.read_i32_le()?),
            AttributeKind::ObjectId => {
                AttributeValue::ObjectId(ElementId(self.cursor.read_array::<16>()?))
            }
            AttributeKind::Color => AttributeValue::Color(self.cursor.read_array::<4>()?),
            AttributeKind::Vector2 => AttributeValue::Vector2(self.read_floats()?),
            AttributeKind::Vector3 => AttributeValue::Vector3(self.read_floats()?),
            AttributeKind::Vector4 => AttributeValue::Vector4(self.read_floats()?),
            AttributeKind::QAngle => AttributeValue::QAngle(self.read_floats()?),
            AttributeKind::Quaternion => AttributeValue::Quaternion(self.read_floats()?),
            AttributeKind::Matrix => AttributeValue::Matrix(self.read_floats()?),
            AttributeKind::ElementArray => AttributeValue::ElementArray(
                self.read_array(4, |d| d.read_reference(element, name))?,
            ),
            AttributeKind::IntArray => {
                AttributeValue::IntArray(self.read_array(4, |d| Ok(d.cursor.read_i32_le()?))?)
            }
            AttributeKind::FloatArray => {
                AttributeValue::FloatArray(self.read_array(4, |d| Ok(d.cursor.read_f32_le()?))?)
            }
            AttributeKind::BoolArray => {
                AttributeValue::BoolArray(self.read_array(1, |d| Ok(d.cursor.read_u8()? != 0))?)
            }
            AttributeKind::StringArray => AttributeValue::StringArray(
                self.read_array(1, |d| Ok(d.cursor.read_nul_terminated_str()?.to_owned()))?,
            ),
            AttributeKind::BinaryArray => AttributeValue::BinaryArray(
                self.read_array(4, |d| Ok(d.cursor.read_u32_prefixed_bytes()?.to_vec()))?,
            ),
            AttributeKind::TimeArray => {
                AttributeValue::TimeArray(self.read_array(4, |d| Ok(d.cursor.read_i32_le()?))?)
            }
            AttributeKind::ColorArray => {
                AttributeValue::ColorArray(self.read_array(4, |d| Ok(d.cursor.read_array::<4>()?))?)
            }
            AttributeKind::Vector2Array => {
                AttributeValue::Vector2Array(self.read_array(8, Self::read_floats)?)
            }
            AttributeKind::Vector3Array => {
                AttributeValue::Vector3Array(self.read_array(12, Self::read_floats)?)
            }
            AttributeKind::Vector4Array => {
                AttributeValue::Vector4Array(self.read_array(16, Self::read_floats)?)
            }
            AttributeKind::QAngleArray => {
                AttributeValue::QAngleArray(self.read_array(12, Self::read_floats)?)
            }
            AttributeKind::QuaternionArray => {
                AttributeValue::QuaternionArray(self.read_array(16, Self::read_floats)?)
            }
            AttributeKind::MatrixArray => {
                AttributeValue::MatrixArray(self.read_array(64, Self::read_floats)?)
            }
            AttributeKind::ObjectIdArray => AttributeValue::ObjectIdArray(
                self.read_array(16, |d| Ok(ElementId(d.cursor.read_array::<16>()?)))?,
            ),
        };
        Ok(value)
    }

    /// Read a `u32` count followed by that many items of at least `item_size` bytes.
    fn read_array<T>(
        &mut self,
        item_size: usize,
        mut item: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let offset = self.cursor.position();
        let count = self.cursor.read_u32_le()? as usize;
        if count.saturating_mul(item_size) > self.cursor.remaining() {
            return Err(CodecError::MalformedAttribute {
                offset,
                reason: format!(
                    "array of {count} values overruns the remaining {} bytes",
                    self.cursor.remaining()
                ),
            });
        }

        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(item(self)?);
        }
        Ok(values)
    }

    fn read_floats<const N: usize>(&mut self) -> Result<[f32; N]> {
        let mut values = [0f32; N];
        for value in &mut values {
            *value = self.cursor.read_f32_le()?;
        }
        Ok(values)
    }

    fn read_reference(&mut self, element: usize, name: &str) -> Result<Option<ElementHandle>> {
        let offset = self.cursor.position();
        match self.cursor.read_i32_le()? {
            NULL_REFERENCE => Ok(None),
            EXTERNAL_REFERENCE => Err(CodecError::MalformedAttribute {
                offset,
                reason: format!("{name:?} references an element in another file"),
            }),
            index if index >= 0 && (index as usize) < self.element_count => {
                Ok(Some(ElementHandle::from(index as usize)))
            }
            index => Err(CodecError::DanglingReference {
                element,
                attribute: name.to_owned(),
                target: index as i64,
            }),
        }
    }

    fn read_pooled_string(&mut self) -> Result<String> {
        let index = self.layout.index.read(&mut self.cursor)?;
        self.strings
            .get(index as usize)
            .cloned()
            .ok_or(CodecError::BadStringIndex {
                index,
                len: self.strings.len(),
            })
    }

    /// Element names and single string values, pooled from version 4 on.
    fn read_value_string(&mut self) -> Result<String> {
        if self.layout.pooled_values {
            self.read_pooled_string()
        } else {
            Ok(self.cursor.read_nul_terminated_str()?.to_owned())
        }
    }
}
