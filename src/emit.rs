// Instruction emission.
//
// Writes the compiled program as `bpf_asm` text: label lines flush-left
// (`lb_0:`), instructions indented four spaces, comments starting with
// `;`. The prolog computes the offset of the first DNS query label and
// stores it in scratch slot M[0]; every block reloads its cursor from
// there, so blocks match independently and chain by failure jumps.

use std::io::Write;

use crate::lower::{ByteRun, Step};
use crate::{CompileConfig, CompileError, IpVersion};

/// Filter return values: snap length on accept, 0 on reject. Swapped as a
/// pair when the configuration negates the match.
const ACCEPT: u32 = 65535;
const REJECT: u32 = 0;

/// Fixed header sizes past the network layer.
const UDP_HEADER: u32 = 8;
const DNS_HEADER: u32 = 12;
const IPV6_HEADER: u32 = 40;

/// Emit the whole program: prolog, one block per pattern, terminal reject.
pub fn emit_program(
    blocks: &[Vec<Step>],
    config: &CompileConfig,
    out: &mut impl Write,
) -> Result<(), CompileError> {
    let (accept, reject) = if config.negate {
        (REJECT, ACCEPT)
    } else {
        (ACCEPT, REJECT)
    };

    emit_prolog(config, blocks.len() > 1, out)?;

    for (i, steps) in blocks.iter().enumerate() {
        writeln!(out, "lb_{i}:")?;
        // Block 0 inherits the cursor straight from the prolog.
        writeln!(out, "    {}ldx M[0]", if i == 0 { "; " } else { "" })?;
        let fail = format!("lb_{}", i + 1);
        for (j, step) in steps.iter().enumerate() {
            let last = j + 1 == steps.len();
            match step {
                Step::Run(run) => emit_run(run, &fail, last, out)?,
                Step::Star { min, max } => emit_star(*min, *max, &fail, out)?,
            }
        }
        writeln!(out, "    ret #{accept}")?;
        writeln!(out)?;
    }

    writeln!(out, "lb_{}:", blocks.len())?;
    writeln!(out, "    ret #{reject}")?;
    Ok(())
}

/// Compute the byte offset of the first query label and park it in M[0].
///
/// IPv4 headers are variable-length, so the length nibble is scaled by 4
/// and added. IPv6 assumes UDP directly follows the fixed 40-byte header;
/// extension chains are the caller's problem.
fn emit_prolog(
    config: &CompileConfig,
    multi: bool,
    out: &mut impl Write,
) -> Result<(), CompileError> {
    let l3 = config.l3_off;
    match config.ip_version {
        IpVersion::V4 => {
            writeln!(out, "    ldx 4*([{l3}]&0xf)")?;
            writeln!(out, "    ; l3_off({l3}) + 8 of udp + 12 of dns")?;
            writeln!(out, "    ld #{}", l3 + UDP_HEADER + DNS_HEADER)?;
            writeln!(out, "    add x")?;
        }
        IpVersion::V6 => {
            writeln!(out, "    ; l3_off({l3}) + 40 of ipv6 + 8 of udp + 12 of dns")?;
            writeln!(out, "    ld #{}", l3 + IPV6_HEADER + UDP_HEADER + DNS_HEADER)?;
        }
    }
    writeln!(out, "    tax")?;
    writeln!(out, "    ; a = x = M[0] = offset of first dns query byte")?;
    // A single block never reloads the cursor, so the store is only
    // emitted when a later block will need it.
    writeln!(out, "    {}st M[0]", if multi { "" } else { "; " })?;
    writeln!(out)?;
    Ok(())
}

/// Compare one byte run against the packet at the cursor.
///
/// Uses the widest load that still fits the remaining run (4, then 2,
/// then 1 bytes). Where the mask word is non-zero it is ORed into the
/// loaded value and folded into the expected immediate, making masked
/// bit positions compare equal no matter what the packet holds. All but
/// the block's final step advance the cursor past the compared bytes.
fn emit_run(
    run: &ByteRun,
    fail: &str,
    last: bool,
    out: &mut impl Write,
) -> Result<(), CompileError> {
    writeln!(
        out,
        "    ; match: {} {}  mask={}",
        hex(&run.values),
        printable(&run.values),
        hex(&run.mask)
    )?;

    let mut off = 0;
    while off < run.len() {
        let width = match run.len() - off {
            4.. => 4,
            2..=3 => 2,
            _ => 1,
        };
        let value = be_value(&run.values[off..off + width]);
        let mask = be_value(&run.mask[off..off + width]);
        let digits = width * 2;
        match width {
            4 => writeln!(out, "    ld [x + {off}]")?,
            2 => writeln!(out, "    ldh [x + {off}]")?,
            _ => writeln!(out, "    ldb [x + {off}]")?,
        }
        if mask != 0 {
            writeln!(out, "    or #0x{mask:0digits$x}")?;
        }
        writeln!(out, "    jneq #0x{:0digits$x}, {fail}", value | mask)?;
        off += width;
    }

    if !last {
        writeln!(out, "    txa")?;
        writeln!(out, "    add #{}", run.len())?;
        writeln!(out, "    tax")?;
    }
    Ok(())
}

/// Check one label's length byte against `[min, max]`, then advance the
/// cursor past the length byte and the label it counts.
fn emit_star(min: u8, max: u8, fail: &str, out: &mut impl Write) -> Result<(), CompileError> {
    if min == 0 && max == 255 {
        writeln!(out, "    ; match: *")?;
    } else {
        writeln!(out, "    ; match: *{{{min}-{max}}}")?;
    }
    writeln!(out, "    ldb [x + 0]")?;
    if min == max && min > 0 && max < 255 {
        writeln!(out, "    jneq #{min}, {fail}")?;
    } else {
        if min > 0 {
            writeln!(out, "    jlt #{min}, {fail}")?;
        }
        if max < 255 {
            writeln!(out, "    jgt #{max}, {fail}")?;
        }
    }
    writeln!(out, "    add x")?;
    writeln!(out, "    add #1")?;
    writeln!(out, "    tax")?;
    Ok(())
}

/// Big-endian integer value of up to 4 bytes.
fn be_value(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0, |acc, &b| acc << 8 | u32::from(b))
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Quoted rendering of the run for the comment line, with non-printable
/// bytes as `\xNN` escapes.
fn printable(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() + 2);
    s.push('"');
    for &b in bytes {
        if (0x20..0x7f).contains(&b) && b != b'"' && b != b'\\' {
            s.push(b as char);
        } else {
            use std::fmt::Write as _;
            let _ = write!(s, "\\x{b:02x}");
        }
    }
    s.push('"');
    s
}
