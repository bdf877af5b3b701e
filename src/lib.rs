//! Classic BPF program generation for DNS query-name matching.
//!
//! Compiles a list of domain match patterns into a classic Berkeley
//! Packet Filter program, emitted as `bpf_asm`-dialect assembly text.
//! Attached to a filter point that sees the packet from its network
//! layer onward, the program inspects the first query name of a DNS
//! message carried over UDP and returns the accept value when any
//! pattern matches.
//!
//! Pattern language: literal labels (`example.com`), `?` for exactly one
//! byte, `*` for exactly one label (optionally bounded: `*{4-255}`), and
//! a trailing `**` matching any remaining suffix.
//!
//! ```no_run
//! let config = bpfgen::CompileConfig::default();
//! let patterns = vec!["*.www.fint.me".to_string()];
//! let mut out = Vec::new();
//! let name = bpfgen::compile(&patterns, &config, &mut out)?;
//! assert!(!name.is_empty());
//! # Ok::<(), bpfgen::CompileError>(())
//! ```

pub mod cli;
pub mod emit;
pub mod error;
pub mod lower;
pub mod name;
pub mod pattern;

use std::io::Write;

pub use error::CompileError;

/// IP version the generated prolog decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// Validate a raw version number. Anything but 4 or 6 is refused.
    pub fn from_number(version: u8) -> Result<Self, CompileError> {
        match version {
            4 => Ok(Self::V4),
            6 => Ok(Self::V6),
            other => Err(CompileError::UnsupportedIpVersion(other)),
        }
    }
}

/// Compile-wide settings, immutable for one compilation.
#[derive(Debug, Clone)]
pub struct CompileConfig {
    /// Byte offset of the network layer within the packet, e.g. 14 when
    /// an Ethernet header precedes it.
    pub l3_off: u32,
    pub ip_version: IpVersion,
    /// Mask the ASCII case bit on letters so `A` and `a` compare equal.
    pub ignore_case: bool,
    /// Swap the accept and reject return values.
    pub negate: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            l3_off: 0,
            ip_version: IpVersion::V4,
            ignore_case: false,
            negate: false,
        }
    }
}

/// Compile `patterns` into a filter program written to `out`.
///
/// Returns the derived artifact name. All patterns are parsed before
/// anything is written, so a bad pattern never leaves a partial program
/// in the sink; the same inputs always produce byte-identical output.
pub fn compile(
    patterns: &[String],
    config: &CompileConfig,
    out: &mut impl Write,
) -> Result<String, CompileError> {
    if patterns.is_empty() {
        return Err(CompileError::InvalidPatternSyntax {
            pattern: String::new(),
            detail: "no patterns given".to_string(),
        });
    }

    let parsed = patterns
        .iter()
        .map(|p| pattern::parse_pattern(p))
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!("parsed {} patterns", parsed.len());

    let blocks: Vec<Vec<lower::Step>> = parsed
        .iter()
        .map(|p| lower::lower_pattern(p, config.ignore_case))
        .collect();

    emit::emit_program(&blocks, config, out)?;
    log::debug!("emitted {} blocks", blocks.len() + 1);

    Ok(name::derive_name(patterns))
}
