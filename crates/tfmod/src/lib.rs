//! Patches particle and material files of Team Fortress 2 VPK archives in place.
//!
//! [`pipeline::ModSession`] ties the archive reader of [`tf_vpk`] to the particle codec of
//! [`tf_pcf`]: an entry is read, handed to a mutation from [`hooks`], and written back into the
//! space it already occupies.

pub mod commands;
pub mod error;
pub mod hooks;
pub mod pipeline;

pub use error::Error;
pub use hooks::Processor;
pub use pipeline::{ModSession, ProcessOutcome};
