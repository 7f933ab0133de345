//! Typed grouping keys shared by the map and reduce stages.

use std::fmt;

/// Identifier under which the runtime groups emitted values.
///
/// Keys are compile-time constants so both stages of a job refer to the same
/// value rather than repeating a string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey(&'static str);

impl GroupKey {
    /// Creates a key from a static label.
    pub const fn new(label: &'static str) -> Self {
        Self(label)
    }

    /// Returns the label carried on the wire.
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The single key every partition summary is emitted under.
pub const SUMMARY_KEY: GroupKey = GroupKey::new("COUNT|SUM|MIN|MAX|SQUARE");
