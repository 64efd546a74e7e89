//! Collation strategies used to rank keys.
//!
//! A [Collator] turns every unique key into a sort key once and then compares sort keys. The
//! ranking code is agnostic to the backend; [Collation] selects one from configuration.

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Selects the [Collator] used for ranking keys.
///
/// # Examples
/// ```
/// use grouped_text_sort::collation::Collation;
/// let collation = Collation::Locale("en_US.UTF-8".to_string());
/// assert_eq!(Collation::default(), Collation::Natural);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Collation {
    /// Raw byte order, see [ByteCollator]
    Bytes,
    /// Base letters first, then accents, then lower case before upper case, see [NaturalCollator]
    #[default]
    Natural,
    /// Collation rules of an installed system locale, for example "en_US.UTF-8"
    Locale(String),
}

/// Compares key texts for ranking.
pub trait Collator {
    /// Precomputed comparison form of a key
    type SortKey;

    fn sort_key(&self, text: &str) -> Result<Self::SortKey, anyhow::Error>;

    /// Compare two sort keys. Must be a total order, distinct texts never compare equal.
    fn compare(&self, a: &Self::SortKey, b: &Self::SortKey) -> Ordering;
}

/// Raw byte order
#[derive(Clone, Copy, Debug, Default)]
pub struct ByteCollator;

impl Collator for ByteCollator {
    type SortKey = Box<[u8]>;

    fn sort_key(&self, text: &str) -> Result<Self::SortKey, anyhow::Error> {
        Ok(Box::from(text.as_bytes()))
    }

    fn compare(&self, a: &Self::SortKey, b: &Self::SortKey) -> Ordering {
        a.cmp(b)
    }
}

/// Alphabetic order that does not depend on installed locales.
///
/// Comparison runs in levels, each one only breaking ties left by the previous one:
/// 1. base letters: canonical decomposition with combining marks removed, lower cased, so
///    "Émile" sorts with the "e" words and "ёж" before "Жук",
/// 2. accents: "cote" before "coté",
/// 3. case: lower case before upper case,
/// 4. raw bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct NaturalCollator;

#[derive(Debug)]
pub struct NaturalSortKey {
    base: Box<[char]>,
    accented: Box<[char]>,
    upper: Box<[bool]>,
    text: Box<str>,
}

/// Letters without a canonical decomposition that sort with a basic Latin base.
fn push_base(base: &mut Vec<char>, lower: char) {
    match lower {
        'ø' => base.push('o'),
        'æ' => base.extend(['a', 'e']),
        'œ' => base.extend(['o', 'e']),
        'ß' => base.extend(['s', 's']),
        'ł' => base.push('l'),
        'đ' | 'ð' => base.push('d'),
        'þ' => base.extend(['t', 'h']),
        other => base.push(other),
    }
}

impl Collator for NaturalCollator {
    type SortKey = NaturalSortKey;

    fn sort_key(&self, text: &str) -> Result<Self::SortKey, anyhow::Error> {
        let mut base = Vec::with_capacity(text.len());
        let mut accented = Vec::with_capacity(text.len());
        let mut upper = Vec::with_capacity(text.len());
        for c in text.nfd() {
            if is_combining_mark(c) {
                accented.push(c);
                continue;
            }
            for lower in c.to_lowercase() {
                accented.push(lower);
                if !is_combining_mark(lower) {
                    push_base(&mut base, lower);
                }
            }
            upper.push(c.is_uppercase());
        }
        Ok(
            NaturalSortKey {
                base: base.into_boxed_slice(),
                accented: accented.into_boxed_slice(),
                upper: upper.into_boxed_slice(),
                text: Box::from(text),
            }
        )
    }

    fn compare(&self, a: &Self::SortKey, b: &Self::SortKey) -> Ordering {
        a.base.cmp(&b.base)
            .then_with(|| a.accented.cmp(&b.accented))
            .then_with(|| a.upper.cmp(&b.upper))
            .then_with(|| a.text.as_bytes().cmp(b.text.as_bytes()))
    }
}

#[cfg(target_os = "linux")]
pub use locale::{LocaleCollator, LocaleSortKey};

#[cfg(target_os = "linux")]
mod locale {
    use std::cmp::Ordering;
    use std::ffi::CString;

    use anyhow::{anyhow, Context};

    use crate::collation::Collator;

    /// Collation rules of a system locale.
    ///
    /// The locale is loaded with `newlocale` and installed for the calling thread only while
    /// `strxfrm` transforms a key. Transformed keys compare as bytes with the same result as
    /// `strcoll`, keys equal in the locale are ordered by their raw bytes.
    #[derive(Debug)]
    pub struct LocaleCollator {
        name: String,
        locale: libc::locale_t,
    }

    impl LocaleCollator {
        pub fn new(name: &str) -> Result<LocaleCollator, anyhow::Error> {
            let c_name = CString::new(name)
                .with_context(|| anyhow!("locale: {}", name))?;
            let locale = unsafe {
                libc::newlocale(libc::LC_COLLATE_MASK, c_name.as_ptr(), std::ptr::null_mut())
            };
            if locale.is_null() {
                Err(anyhow!("Locale is not available: {}", name))
            } else {
                Ok(
                    LocaleCollator {
                        name: name.to_string(),
                        locale,
                    }
                )
            }
        }

        pub fn name(&self) -> &String {
            &self.name
        }
    }

    impl Drop for LocaleCollator {
        fn drop(&mut self) {
            unsafe { libc::freelocale(self.locale) };
        }
    }

    #[derive(Debug)]
    pub struct LocaleSortKey {
        transformed: Box<[u8]>,
        text: Box<str>,
    }

    impl LocaleCollator {
        fn transform(&self, text: &CString) -> Box<[u8]> {
            unsafe {
                let previous = libc::uselocale(self.locale);
                let length = libc::strxfrm(std::ptr::null_mut(), text.as_ptr(), 0);
                let mut transformed = vec![0u8; length + 1];
                let written = libc::strxfrm(
                    transformed.as_mut_ptr() as *mut libc::c_char,
                    text.as_ptr(),
                    transformed.len(),
                );
                libc::uselocale(previous);
                transformed.truncate(written.min(length));
                transformed.into_boxed_slice()
            }
        }
    }

    impl Collator for LocaleCollator {
        type SortKey = LocaleSortKey;

        fn sort_key(&self, text: &str) -> Result<Self::SortKey, anyhow::Error> {
            let c_text = CString::new(text)
                .with_context(|| anyhow!("key can not be collated, it contains a NUL byte: {}", text))?;
            Ok(
                LocaleSortKey {
                    transformed: self.transform(&c_text),
                    text: Box::from(text),
                }
            )
        }

        fn compare(&self, a: &Self::SortKey, b: &Self::SortKey) -> Ordering {
            a.transformed.cmp(&b.transformed)
                .then_with(|| a.text.as_bytes().cmp(b.text.as_bytes()))
        }
    }
}
