use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};

use anyhow::anyhow;

/// Capacity of an [InlineString] in bytes
pub const INLINE_CAPACITY: usize = 10;

/// A short byte string stored inline, without a heap allocation.
///
/// Content shorter than [INLINE_CAPACITY] is followed by a NUL terminator and zero padding,
/// content of exactly [INLINE_CAPACITY] bytes fills the buffer. Content containing a NUL byte
/// can not be represented.
///
/// Ordering and equality compare the content bytes.
///
/// # Examples
/// ```
/// use grouped_text_sort::inline_string::InlineString;
/// let tail = InlineString::new(b"NY").unwrap();
/// assert_eq!(tail.as_bytes(), b"NY");
/// assert!(tail < InlineString::new(b"NYC").unwrap());
/// ```
#[derive(Clone, Copy, Default)]
pub struct InlineString {
    bytes: [u8; INLINE_CAPACITY],
}

impl InlineString {
    /// Create a new [InlineString]. Fails when `data` is longer than [INLINE_CAPACITY] or
    /// contains a NUL byte.
    pub fn new(data: &[u8]) -> Result<InlineString, anyhow::Error> {
        if data.len() > INLINE_CAPACITY {
            return Err(
                anyhow!(
                    "Inline string capacity is {} bytes, got {} bytes: {}",
                    INLINE_CAPACITY,
                    data.len(),
                    String::from_utf8_lossy(data)
                )
            );
        }
        if memchr::memchr(0, data).is_some() {
            return Err(anyhow!("Inline string can not hold a NUL byte: {}", String::from_utf8_lossy(data)));
        }
        let mut bytes = [0u8; INLINE_CAPACITY];
        bytes[..data.len()].copy_from_slice(data);
        Ok(
            InlineString {
                bytes
            }
        )
    }

    pub fn len(&self) -> usize {
        memchr::memchr(0, &self.bytes).unwrap_or(INLINE_CAPACITY)
    }

    pub fn is_empty(&self) -> bool {
        self.bytes[0] == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }
}

impl Eq for InlineString {}

impl PartialEq<Self> for InlineString {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialOrd<Self> for InlineString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InlineString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Debug for InlineString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(self.as_bytes()))
    }
}

impl Display for InlineString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use crate::inline_string::{InlineString, INLINE_CAPACITY};

    #[test]
    fn test_short_content() -> Result<(), anyhow::Error> {
        let s = InlineString::new(b"NY")?;
        assert_eq!(s.len(), 2);
        assert_eq!(s.as_bytes(), b"NY");
        assert!(!s.is_empty());
        Ok(())
    }

    #[test]
    fn test_full_content() -> Result<(), anyhow::Error> {
        let s = InlineString::new(b"0123456789")?;
        assert_eq!(s.len(), INLINE_CAPACITY);
        assert_eq!(s.as_bytes(), b"0123456789");
        Ok(())
    }

    #[test]
    fn test_empty_content() -> Result<(), anyhow::Error> {
        let s = InlineString::new(b"")?;
        assert!(s.is_empty());
        assert_eq!(s.as_bytes(), b"");
        assert_eq!(s, InlineString::default());
        Ok(())
    }

    #[test]
    fn test_rejects_oversized_and_nul() {
        assert!(InlineString::new(b"0123456789A").is_err());
        assert!(InlineString::new(b"A\0B").is_err());
    }

    #[test]
    fn test_ordering_is_byte_wise() -> Result<(), anyhow::Error> {
        let a = InlineString::new(b"CA")?;
        let b = InlineString::new(b"CAT")?;
        let c = InlineString::new(b"NY")?;
        assert!(a < b);
        assert!(b < c);
        assert_eq!(a, InlineString::new(b"CA")?);
        assert_ne!(a, b);
        let mut v = vec![c, a, b];
        v.sort();
        assert_eq!(v, vec![a, b, c]);
        Ok(())
    }
}
