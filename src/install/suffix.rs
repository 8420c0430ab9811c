//! Per-install namespace suffix

use std::fmt;
use uuid::Uuid;

/// Random token appended to the internal namespace so that several installed
/// copies of another-elm can share a machine without clashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Suffix(String);

impl Suffix {
    /// 16 uppercase hex digits of fresh randomness
    pub fn generate() -> Self {
        let (hi, lo) = Uuid::new_v4().as_u64_pair();
        // Each half of a v4 UUID has a few fixed bits; folding them cancels that out
        Self(format!("{:016X}", hi ^ lo.rotate_left(32)))
    }

    /// Accept a previously generated suffix (e.g. from the run stamp)
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = raw.len() >= 8 && raw.chars().all(|c| c.is_ascii_hexdigit());
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
