//! The text line that opens every DMX file

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use winnow::ascii::{digit1, multispace0, space1};
use winnow::combinator::seq;
use winnow::prelude::*;
use winnow::token::{literal, take_while};

use crate::error::{CodecError, Result};

/// Encoding this codec reads and writes
pub const BINARY_ENCODING: &str = "binary";

/// Oldest and newest binary encoding versions understood
pub const SUPPORTED_VERSIONS: std::ops::RangeInclusive<u32> = 2..=5;

/// Parsed `<!-- dmx encoding binary 2 format pcf 1 -->` line
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DmxHeader {
    pub encoding: String,
    pub encoding_version: u32,
    pub format: String,
    pub format_version: u32,
}

fn word<'s>(input: &mut &'s str) -> PResult<&'s str> {
    take_while(1.., |c: char| !c.is_whitespace()).parse_next(input)
}

fn dmx_header(input: &mut &str) -> PResult<DmxHeader> {
    seq!(DmxHeader {
        _: literal("<!--"),
        _: space1,
        _: literal("dmx"),
        _: space1,
        _: literal("encoding"),
        _: space1,
        encoding: word.map(str::to_owned),
        _: space1,
        encoding_version: digit1.parse_to(),
        _: space1,
        _: literal("format"),
        _: space1,
        format: word.map(str::to_owned),
        _: space1,
        format_version: digit1.parse_to(),
        _: space1,
        _: literal("-->"),
        _: multispace0,
    })
    .parse_next(input)
}

impl DmxHeader {
    /// Header of a binary file with the given versions.
    pub fn binary(version: u32, format: impl Into<String>, format_version: u32) -> Self {
        Self {
            encoding: BINARY_ENCODING.to_owned(),
            encoding_version: version,
            format: format.into(),
            format_version,
        }
    }

    /// Parse the header line, without its NUL terminator.
    pub fn parse(line: &str) -> Result<Self> {
        dmx_header
            .parse(line)
            .map_err(|_| CodecError::UnsupportedVersion {
                header: line.trim_end().to_owned(),
            })
    }

    /// Binary encoding version, if this codec can handle it.
    pub fn binary_version(&self) -> Result<u32> {
        if self.encoding == BINARY_ENCODING && SUPPORTED_VERSIONS.contains(&self.encoding_version)
        {
            Ok(self.encoding_version)
        } else {
            Err(CodecError::UnsupportedVersion {
                header: self.to_string(),
            })
        }
    }
}

impl fmt::Display for DmxHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<!-- dmx encoding {} {} format {} {} -->",
            self.encoding, self.encoding_version, self.format, self.format_version
        )
    }
}
