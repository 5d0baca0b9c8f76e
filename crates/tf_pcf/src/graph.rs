//! Arena holding every element of a decoded file

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{CodecError, Result},
    header::DmxHeader,
    types::{Element, ElementHandle},
};

/// Decoded element graph
///
/// Elements live in a flat table and refer to each other through [`ElementHandle`]s, so shared
/// and cyclic references need no special handling. Element order is kept through encoding.
///
/// ```
/// use tf_pcf::{DmxHeader, Element, ElementId, Graph};
///
/// let mut graph = Graph::new(DmxHeader::binary(2, "pcf", 1));
/// let root = graph.push(Element::new("DmElement", "untitled", ElementId::default()));
/// let fire = graph.push(
///     Element::new("DmeParticleSystemDefinition", "fire", ElementId::default())
///         .with_attribute("max_particles", 64),
/// );
/// graph.element_mut(root).unwrap().set_attribute("particleSystemDefinitions", fire);
///
/// let bytes = tf_pcf::encode(&graph)?;
/// assert_eq!(tf_pcf::decode(&bytes)?, graph);
/// # Ok::<(), tf_pcf::CodecError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Graph {
    header: DmxHeader,
    elements: Vec<Element>,
}

impl Graph {
    pub fn new(header: DmxHeader) -> Self {
        Self {
            header,
            elements: Vec::new(),
        }
    }

    pub(crate) fn from_parts(header: DmxHeader, elements: Vec<Element>) -> Self {
        Self { header, elements }
    }

    /// Header the graph was decoded with and will be encoded with
    pub fn header(&self) -> &DmxHeader {
        &self.header
    }

    /// Number of elements in the graph
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Append an element, returning its handle.
    pub fn push(&mut self, element: Element) -> ElementHandle {
        self.elements.push(element);
        ElementHandle::from(self.elements.len() - 1)
    }

    pub fn element(&self, handle: ElementHandle) -> Option<&Element> {
        self.elements.get(handle.index())
    }

    pub fn element_mut(&mut self, handle: ElementHandle) -> Option<&mut Element> {
        self.elements.get_mut(handle.index())
    }

    /// Handles of all elements, in table order.
    pub fn handles(&self) -> impl Iterator<Item = ElementHandle> {
        (0..self.elements.len()).map(ElementHandle::from)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementHandle, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(index, element)| (ElementHandle::from(index), element))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ElementHandle, &mut Element)> {
        self.elements
            .iter_mut()
            .enumerate()
            .map(|(index, element)| (ElementHandle::from(index), element))
    }

    /// First element called `name`.
    pub fn find_by_name(&self, name: &str) -> Option<ElementHandle> {
        self.iter()
            .find(|(_, element)| element.name == name)
            .map(|(handle, _)| handle)
    }

    /// Elements whose type is `type_name`, in table order.
    pub fn elements_of_type<'a>(
        &'a self,
        type_name: &'a str,
    ) -> impl Iterator<Item = ElementHandle> + 'a {
        self.iter()
            .filter(move |(_, element)| element.type_name == type_name)
            .map(|(handle, _)| handle)
    }

    /// The first element, which the file's consumers treat as the root
    pub fn root(&self) -> Option<ElementHandle> {
        self.handles().next()
    }

    /// Elements referenced by the attributes of `handle`.
    pub fn references(&self, handle: ElementHandle) -> impl Iterator<Item = ElementHandle> + '_ {
        self.element(handle)
            .into_iter()
            .flat_map(|element| element.attributes.iter())
            .flat_map(|attribute| attribute.value.references())
    }

    /// Check that every element reference resolves inside the table.
    pub fn validate(&self) -> Result<()> {
        for (handle, element) in self.iter() {
            for attribute in &element.attributes {
                if let Some(target) = attribute
                    .value
                    .references()
                    .find(|target| target.index() >= self.elements.len())
                {
                    return Err(CodecError::DanglingReference {
                        element: handle.index(),
                        attribute: attribute.name.clone(),
                        target: target.index() as i64,
                    });
                }
            }
        }
        Ok(())
    }
}
