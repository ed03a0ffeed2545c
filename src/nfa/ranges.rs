use std::fmt::{Display, Formatter};

use itertools::Itertools;
use smallvec::SmallVec;

/// A set of inclusive codepoint intervals, optionally negated. Used as the
/// payload of class arcs, both for `.` and for the shorthand classes.
///
/// Immutable once built. [`ClassRanges::contains`] is the only operation
/// the matcher needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClassRanges {
    ranges: SmallVec<[(u32, u32); 3]>,
    negated: bool,
}

impl ClassRanges {
    pub fn new(ranges: &[(u32, u32)], negated: bool) -> Self {
        Self { ranges: SmallVec::from_slice(ranges), negated }
    }

    /// The class behind `.`: every codepoint.
    pub fn any() -> Self {
        Self::new(&[(0, char::MAX as u32)], false)
    }

    /// `\d` / `\D`: the ASCII digits.
    pub fn digit(negated: bool) -> Self {
        Self::new(&[('0' as u32, '9' as u32)], negated)
    }

    /// `\w` / `\W`: the ASCII letters.
    pub fn word(negated: bool) -> Self {
        Self::new(&[('A' as u32, 'Z' as u32), ('a' as u32, 'z' as u32)], negated)
    }

    /// `\s` / `\S`: backspace through newline, carriage return, and space.
    pub fn space(negated: bool) -> Self {
        Self::new(&[(0x08, 0x0A), (0x0D, 0x0D), (0x20, 0x20)], negated)
    }

    /// True if codepoint `c` belongs to the class.
    pub fn contains(&self, c: u32) -> bool {
        let in_ranges = self.ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi);
        in_ranges != self.negated
    }
}

impl Display for ClassRanges {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.negated {
            write!(f, "!")?;
        }
        write!(
            f,
            "[{}]",
            self.ranges
                .iter()
                .map(|&(lo, hi)| {
                    if lo == hi {
                        format!("{:#04X}", lo)
                    } else {
                        format!("{:#04X}-{:#04X}", lo, hi)
                    }
                })
                .join(" ")
        )
    }
}
