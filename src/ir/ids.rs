//! Newtype IDs for type-safe identification of dataset elements.
//!
//! Category and instance ids live in the raster domain (they end up packed
//! into pixel values), so they are 32-bit. Image and annotation ids are
//! output-side counters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A category identifier as stored in the source dataset.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u32);

impl CategoryId {
    /// Creates a new CategoryId.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying value.
    #[inline]
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CategoryId({})", self.0)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CategoryId {
    fn from(id: u32) -> Self {
        CategoryId::new(id)
    }
}

/// An instance identifier: the non-zero value an instance occupies in a
/// label raster.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub u32);

impl InstanceId {
    /// Creates a new InstanceId.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying value.
    #[inline]
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({})", self.0)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for InstanceId {
    fn from(id: u32) -> Self {
        InstanceId::new(id)
    }
}

/// A 1-based image identifier in an exported COCO document.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub u64);

impl ImageId {
    /// Image id for the sample at `index` in dataset order.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self(index as u64 + 1)
    }

    /// Returns the underlying u64 value.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageId({})", self.0)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 1-based annotation identifier in an exported COCO document.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(pub u64);

impl AnnotationId {
    /// The first id handed out in an export.
    pub const FIRST: AnnotationId = AnnotationId(1);

    /// Returns the id following this one.
    #[inline]
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the underlying u64 value.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnnotationId({})", self.0)
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_id_is_one_based() {
        assert_eq!(ImageId::from_index(0), ImageId(1));
        assert_eq!(ImageId::from_index(9).as_u64(), 10);
    }

    #[test]
    fn test_annotation_id_sequence() {
        let first = AnnotationId::FIRST;
        assert_eq!(first.as_u64(), 1);
        assert_eq!(first.next().next(), AnnotationId(3));
    }

    #[test]
    fn test_id_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(InstanceId(1));
        set.insert(InstanceId(2));
        set.insert(InstanceId(1)); // duplicate
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&CategoryId(7)).unwrap();
        assert_eq!(json, "7");
        let parsed: InstanceId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, InstanceId(42));
    }
}
