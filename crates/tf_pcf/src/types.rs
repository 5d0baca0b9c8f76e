//! Elements, attributes and the values they hold

use std::fmt;

use derive_more::derive::{Display, From, Into};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index of an element inside its [`crate::Graph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
#[display("#{_0}")]
pub struct ElementHandle(usize);

impl ElementHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// 16 byte identifier stored with every element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, From)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElementId(pub [u8; 16]);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if matches!(i, 4 | 6 | 8 | 10) {
                f.write_str("-")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Wire type tag of an attribute value
///
/// Tags 7 and 21 changed meaning in binary version 3. Up to version 2 they hold object ids,
/// from version 3 on they hold times. [`AttributeKind::ObjectId`] and
/// [`AttributeKind::ObjectIdArray`] carry discriminants past the tag range for that reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum AttributeKind {
    Element = 1,
    Int,
    Float,
    Bool,
    String,
    Binary,
    Time,
    Color,
    Vector2,
    Vector3,
    Vector4,
    QAngle,
    Quaternion,
    Matrix,
    ElementArray,
    IntArray,
    FloatArray,
    BoolArray,
    StringArray,
    BinaryArray,
    TimeArray,
    ColorArray,
    Vector2Array,
    Vector3Array,
    Vector4Array,
    QAngleArray,
    QuaternionArray,
    MatrixArray,
    ObjectId,
    ObjectIdArray,
}

impl AttributeKind {
    const ALL: [AttributeKind; 28] = [
        AttributeKind::Element,
        AttributeKind::Int,
        AttributeKind::Float,
        AttributeKind::Bool,
        AttributeKind::String,
        AttributeKind::Binary,
        AttributeKind::Time,
        AttributeKind::Color,
        AttributeKind::Vector2,
        AttributeKind::Vector3,
        AttributeKind::Vector4,
        AttributeKind::QAngle,
        AttributeKind::Quaternion,
        AttributeKind::Matrix,
        AttributeKind::ElementArray,
        AttributeKind::IntArray,
        AttributeKind::FloatArray,
        AttributeKind::BoolArray,
        AttributeKind::StringArray,
        AttributeKind::BinaryArray,
        AttributeKind::TimeArray,
        AttributeKind::ColorArray,
        AttributeKind::Vector2Array,
        AttributeKind::Vector3Array,
        AttributeKind::Vector4Array,
        AttributeKind::QAngleArray,
        AttributeKind::QuaternionArray,
        AttributeKind::MatrixArray,
    ];

    /// Kind for a wire tag in binary `version`, `None` for tags outside `1..=28`.
    pub fn from_tag(tag: u8, version: u32) -> Option<Self> {
        let kind = tag
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index as usize))
            .copied()?;
        Some(match kind {
            AttributeKind::Time if version < 3 => AttributeKind::ObjectId,
            AttributeKind::TimeArray if version < 3 => AttributeKind::ObjectIdArray,
            kind => kind,
        })
    }

    pub fn tag(self) -> u8 {
        match self {
            AttributeKind::ObjectId => AttributeKind::Time as u8,
            AttributeKind::ObjectIdArray => AttributeKind::TimeArray as u8,
            kind => kind as u8,
        }
    }

    /// Whether binary `version` has a wire tag for this kind.
    pub fn exists_in(self, version: u32) -> bool {
        match self {
            AttributeKind::Time | AttributeKind::TimeArray => version >= 3,
            AttributeKind::ObjectId | AttributeKind::ObjectIdArray => version < 3,
            _ => true,
        }
    }

    pub fn is_array(self) -> bool {
        self.tag() >= AttributeKind::ElementArray.tag()
    }

    /// Kind of a single item, the kind itself for scalars.
    pub fn item_kind(self) -> Self {
        if self == AttributeKind::ObjectIdArray {
            AttributeKind::ObjectId
        } else if self.is_array() {
            Self::ALL[(self.tag() - AttributeKind::ElementArray.tag()) as usize]
        } else {
            self
        }
    }
}

/// Value of an attribute, one variant per wire type
///
/// Element references hold `None` for the null reference.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(tag = "type", content = "value"))]
pub enum AttributeValue {
    Element(Option<ElementHandle>),
    Int(i32),
    Float(f32),
    Bool(bool),
    String(String),
    Binary(Vec<u8>),
    /// Ticks of 1/10000 of a second
    Time(i32),
    /// Only in binary version 2 and older, where it takes the tag of [`AttributeValue::Time`]
    ObjectId(ElementId),
    Color([u8; 4]),
    Vector2([f32; 2]),
    Vector3([f32; 3]),
    Vector4([f32; 4]),
    QAngle([f32; 3]),
    Quaternion([f32; 4]),
    Matrix([f32; 16]),
    ElementArray(Vec<Option<ElementHandle>>),
    IntArray(Vec<i32>),
    FloatArray(Vec<f32>),
    BoolArray(Vec<bool>),
    StringArray(Vec<String>),
    BinaryArray(Vec<Vec<u8>>),
    TimeArray(Vec<i32>),
    ColorArray(Vec<[u8; 4]>),
    Vector2Array(Vec<[f32; 2]>),
    Vector3Array(Vec<[f32; 3]>),
    Vector4Array(Vec<[f32; 4]>),
    QAngleArray(Vec<[f32; 3]>),
    QuaternionArray(Vec<[f32; 4]>),
    MatrixArray(Vec<[f32; 16]>),
    ObjectIdArray(Vec<ElementId>),
}

impl AttributeValue {
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeValue::Element(_) => AttributeKind::Element,
            AttributeValue::Int(_) => AttributeKind::Int,
            AttributeValue::Float(_) => AttributeKind::Float,
            AttributeValue::Bool(_) => AttributeKind::Bool,
            AttributeValue::String(_) => AttributeKind::String,
            AttributeValue::Binary(_) => AttributeKind::Binary,
            AttributeValue::Time(_) => AttributeKind::Time,
            AttributeValue::Color(_) => AttributeKind::Color,
            AttributeValue::Vector2(_) => AttributeKind::Vector2,
            AttributeValue::Vector3(_) => AttributeKind::Vector3,
            AttributeValue::Vector4(_) => AttributeKind::Vector4,
            AttributeValue::QAngle(_) => AttributeKind::QAngle,
            AttributeValue::Quaternion(_) => AttributeKind::Quaternion,
            AttributeValue::Matrix(_) => AttributeKind::Matrix,
            AttributeValue::ElementArray(_) => AttributeKind::ElementArray,
            AttributeValue::IntArray(_) => AttributeKind::IntArray,
            AttributeValue::FloatArray(_) => AttributeKind::FloatArray,
            AttributeValue::BoolArray(_) => AttributeKind::BoolArray,
            AttributeValue::StringArray(_) => AttributeKind::StringArray,
            AttributeValue::BinaryArray(_) => AttributeKind::BinaryArray,
            AttributeValue::TimeArray(_) => AttributeKind::TimeArray,
            AttributeValue::ColorArray(_) => AttributeKind::ColorArray,
            AttributeValue::Vector2Array(_) => AttributeKind::Vector2Array,
            AttributeValue::Vector3Array(_) => AttributeKind::Vector3Array,
            AttributeValue::Vector4Array(_) => AttributeKind::Vector4Array,
            AttributeValue::QAngleArray(_) => AttributeKind::QAngleArray,
            AttributeValue::QuaternionArray(_) => AttributeKind::QuaternionArray,
            AttributeValue::MatrixArray(_) => AttributeKind::MatrixArray,
            AttributeValue::ObjectId(_) => AttributeKind::ObjectId,
            AttributeValue::ObjectIdArray(_) => AttributeKind::ObjectIdArray,
        }
    }

    /// Elements this value points at, skipping null references.
    pub fn references(&self) -> impl Iterator<Item = ElementHandle> + '_ {
        let handles: &[Option<ElementHandle>] = match self {
            AttributeValue::Element(handle) => std::slice::from_ref(handle),
            AttributeValue::ElementArray(handles) => handles,
            _ => &[],
        };
        handles.iter().flatten().copied()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(value) => Some(value),
            _ => None,
        }
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<f32> for AttributeValue {
    fn from(value: f32) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<ElementHandle> for AttributeValue {
    fn from(value: ElementHandle) -> Self {
        AttributeValue::Element(Some(value))
    }
}

/// Named value of an element
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

/// Node of the element graph
///
/// Attributes keep the order they were decoded or added in, which is also the order they are
/// encoded in.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Element {
    pub type_name: String,
    pub name: String,
    pub id: ElementId,
    pub attributes: Vec<Attribute>,
}

impl Element {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>, id: ElementId) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            id,
            attributes: Vec::new(),
        }
    }

    /// Builder style [`Element::set_attribute`].
    pub fn with_attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// First attribute called `name`.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| &attribute.value)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut AttributeValue> {
        self.attributes
            .iter_mut()
            .find(|attribute| attribute.name == name)
            .map(|attribute| &mut attribute.value)
    }

    /// Replace the value of `name` in place, or append a new attribute.
    ///
    /// Returns the previous value.
    pub fn set_attribute(
        &mut self,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> Option<AttributeValue> {
        let value = value.into();
        match self.attribute_mut(name) {
            Some(current) => Some(std::mem::replace(current, value)),
            None => {
                self.attributes.push(Attribute {
                    name: name.to_owned(),
                    value,
                });
                None
            }
        }
    }

    /// Remove the first attribute called `name`, keeping the order of the rest.
    pub fn remove_attribute(&mut self, name: &str) -> Option<AttributeValue> {
        let index = self
            .attributes
            .iter()
            .position(|attribute| attribute.name == name)?;
        Some(self.attributes.remove(index).value)
    }
}
