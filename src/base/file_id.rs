/// A compact identifier for a file within one analysis unit.
///
/// Assigned in insertion order by the owning `PathContext`; never reused
/// within a unit. Cheap to copy and compare, so it appears in every range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a new file ID from a raw index.
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw index.
    pub fn raw(self) -> u32 {
        self.0
    }
}
