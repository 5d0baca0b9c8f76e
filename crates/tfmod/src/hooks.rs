//! Mutations applied to entries between reading and patching
//!
//! Particle files are handed to a [`GraphMutation`] after decoding, text files to a
//! [`BytesMutation`] as they are. Closures implement both traits, so most callers never name
//! them:
//!
//! ```
//! use tfmod::hooks::Processor;
//!
//! let uppercase = Processor::bytes(|bytes: Vec<u8>| -> tfmod::error::Result<Vec<u8>> {
//!     Ok(bytes.to_ascii_uppercase())
//! });
//! assert_eq!(uppercase.kind(), "bytes");
//! ```

use tf_pcf::{AttributeValue, Graph};

use crate::error::{Error, Result};

/// Changes a decoded element graph in place
pub trait GraphMutation {
    fn mutate(&mut self, graph: &mut Graph) -> Result<()>;
}

impl<F> GraphMutation for F
where
    F: FnMut(&mut Graph) -> Result<()>,
{
    fn mutate(&mut self, graph: &mut Graph) -> Result<()> {
        self(graph)
    }
}

/// Turns the raw bytes of an entry into replacement bytes
pub trait BytesMutation {
    fn mutate(&mut self, bytes: Vec<u8>) -> Result<Vec<u8>>;
}

impl<F> BytesMutation for F
where
    F: FnMut(Vec<u8>) -> Result<Vec<u8>>,
{
    fn mutate(&mut self, bytes: Vec<u8>) -> Result<Vec<u8>> {
        self(bytes)
    }
}

/// The mutation handed to [`crate::pipeline::ModSession::process`]
pub enum Processor<'a> {
    Graph(Box<dyn GraphMutation + 'a>),
    Bytes(Box<dyn BytesMutation + 'a>),
}

impl<'a> Processor<'a> {
    pub fn graph(mutation: impl GraphMutation + 'a) -> Self {
        Processor::Graph(Box::new(mutation))
    }

    pub fn bytes(mutation: impl BytesMutation + 'a) -> Self {
        Processor::Bytes(Box::new(mutation))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Processor::Graph(_) => "graph",
            Processor::Bytes(_) => "bytes",
        }
    }
}

impl std::fmt::Debug for Processor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Processor").field(&self.kind()).finish()
    }
}

/// Graph mutation setting `attribute` on every element called `element`.
///
/// Fails when no element of that name exists.
pub fn set_attribute(
    element: impl Into<String>,
    attribute: impl Into<String>,
    value: AttributeValue,
) -> impl GraphMutation {
    let element = element.into();
    let attribute = attribute.into();
    move |graph: &mut Graph| -> Result<()> {
        let mut found = false;
        for (_, target) in graph.iter_mut().filter(|(_, e)| e.name == element) {
            target.set_attribute(&attribute, value.clone());
            found = true;
        }
        if found {
            Ok(())
        } else {
            Err(Error::mutation(format!("element {element:?}"), "no element with that name"))
        }
    }
}

/// Bytes mutation replacing every occurrence of `from` with `to`.
pub fn replace_text(from: impl Into<String>, to: impl Into<String>) -> impl BytesMutation {
    let from = from.into().into_bytes();
    let to = to.into().into_bytes();
    move |bytes: Vec<u8>| -> Result<Vec<u8>> {
        if from.is_empty() {
            return Ok(bytes);
        }
        let mut out = Vec::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();
        while let Some(at) = rest.windows(from.len()).position(|window| window == from) {
            out.extend_from_slice(&rest[..at]);
            out.extend_from_slice(&to);
            rest = &rest[at + from.len()..];
        }
        out.extend_from_slice(rest);
        Ok(out)
    }
}
