// Lowering from parsed segments to match steps.
//
// Literal labels become length + character bytes; consecutive literal
// bytes coalesce into `ByteRun`s so the emitter can compare them with as
// few loads as possible. Whole-label wildcards stay standalone steps and
// break runs on both sides.

use crate::pattern::{Pattern, Segment};

/// A contiguous masked-equality comparison unit.
///
/// `mask` parallels `values`; a set mask bit means "don't care" at that
/// bit position. The emitter ORs the mask into both the loaded packet
/// bytes and the expected value, so masked positions always compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteRun {
    pub values: Vec<u8>,
    pub mask: Vec<u8>,
}

impl ByteRun {
    fn push(&mut self, value: u8, mask: u8) {
        self.values.push(value);
        self.mask.push(mask);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One match step of a compiled block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Compare the next `run.len()` packet bytes under the run's mask.
    Run(ByteRun),
    /// Check the label length byte at the cursor against `[min, max]`,
    /// then skip the whole label. Bounds are already defaulted to the
    /// extremes of `0..=255`.
    Star { min: u8, max: u8 },
}

/// Case bit distinguishing upper and lower ASCII letters.
const CASE_BIT: u8 = 0x20;

/// Wildcard mask covering a whole byte.
const ANY_BYTE: u8 = 0xff;

/// Lower one pattern into its ordered match steps.
///
/// Every literal label contributes its length byte followed by its
/// characters; a `?` character is fully masked. When the pattern has no
/// free suffix a zero length byte is appended, pinning the end of the
/// query name the same way the wire format's root label does. Under a
/// non-exact free suffix the final label's length byte is masked instead
/// of checked, so the literal prefix need not end on a label boundary.
pub fn lower_pattern(pattern: &Pattern, ignore_case: bool) -> Vec<Step> {
    let n = pattern.segments.len();
    // Index of the label whose length byte is masked: the literal right
    // before a non-exact free-suffix marker, if any.
    let open_len_at = match pattern.free_suffix() {
        Some(false) if n >= 2 && matches!(pattern.segments[n - 2], Segment::Literal(_)) => {
            Some(n - 2)
        }
        _ => None,
    };

    let mut steps = Vec::new();
    let mut pending = ByteRun::default();

    for (i, segment) in pattern.segments.iter().enumerate() {
        match segment {
            Segment::Literal(bytes) => {
                let len_mask = if open_len_at == Some(i) { ANY_BYTE } else { 0 };
                pending.push(bytes.len() as u8, len_mask);
                for &b in bytes {
                    if b == b'?' {
                        pending.push(b, ANY_BYTE);
                    } else if ignore_case && b.is_ascii_alphabetic() {
                        pending.push(b, CASE_BIT);
                    } else {
                        pending.push(b, 0);
                    }
                }
            }
            Segment::Star { min, max } => {
                flush(&mut steps, &mut pending);
                steps.push(Step::Star {
                    min: min.unwrap_or(0),
                    max: max.unwrap_or(255),
                });
            }
            Segment::FreeSuffix { .. } => {}
        }
    }

    if pattern.free_suffix().is_none() {
        // Root terminator: the query name must end here.
        pending.push(0, 0);
    }
    flush(&mut steps, &mut pending);

    steps
}

fn flush(steps: &mut Vec<Step>, pending: &mut ByteRun) {
    if !pending.is_empty() {
        steps.push(Step::Run(std::mem::take(pending)));
    }
}
