use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::ranking::KeyRanking;

/// Interns key texts into dense integer ids.
///
/// The first occurrence of a key text receives the id `len()`, later occurrences resolve to
/// the same id. Each distinct text is stored once and shared between the lookup map and the
/// id indexed list. Keys are short strings, the map hashes them with `FxHashMap` rather than
/// SipHash.
///
/// # Examples
/// ```
/// use grouped_text_sort::key_dictionary::KeyDictionary;
/// let mut dictionary = KeyDictionary::new();
/// let smith = dictionary.intern("Smith");
/// let adams = dictionary.intern("Adams");
/// assert_eq!(dictionary.intern("Smith"), smith);
/// assert_eq!(dictionary.text_of(adams), "Adams");
/// assert_eq!(dictionary.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct KeyDictionary {
    ids: FxHashMap<Rc<str>, u64>,
    texts: Vec<Rc<str>>,
}

impl KeyDictionary {
    pub fn new() -> KeyDictionary {
        KeyDictionary {
            ids: FxHashMap::default(),
            texts: Vec::new(),
        }
    }

    /// Return the id of `text`, assigning the next free id on first sight.
    pub fn intern(&mut self, text: &str) -> u64 {
        if let Some(id) = self.ids.get(text) {
            return *id;
        }
        let id = self.texts.len() as u64;
        let owned: Rc<str> = Rc::from(text);
        self.ids.insert(owned.clone(), id);
        self.texts.push(owned);
        id
    }

    pub fn get(&self, text: &str) -> Option<u64> {
        self.ids.get(text).copied()
    }

    /// Text of a key id. Panics when `id` was never assigned.
    pub fn text_of(&self, id: u64) -> &str {
        &self.texts[id as usize]
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.texts.iter().map(|t| t.as_ref())
    }

    /// Renumber the keys so that the id of every key equals its rank in `ranking`.
    pub(crate) fn renumber(&mut self, ranking: &KeyRanking) {
        let inverse = ranking.inverse();
        self.texts = ranking
            .order()
            .iter()
            .map(|id| self.texts[*id as usize].clone())
            .collect();
        for id in self.ids.values_mut() {
            *id = inverse[*id as usize];
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::collation::ByteCollator;
    use crate::key_dictionary::KeyDictionary;
    use crate::order::Order;
    use crate::ranking::KeyRanking;

    #[test]
    fn test_ids_are_dense_and_stable() {
        let mut dictionary = KeyDictionary::new();
        let keys = ["Smith", "Adams", "Smith", "Dr. Jones", "Adams", "Zeta"];
        let ids: Vec<u64> = keys.iter().map(|k| dictionary.intern(k)).collect();
        assert_eq!(ids, vec![0, 1, 0, 2, 1, 3]);
        assert_eq!(dictionary.len(), 4);
        for key in keys {
            let id = dictionary.intern(key);
            assert_eq!(dictionary.text_of(id), key);
        }
        assert_eq!(dictionary.len(), 4);
    }

    #[test]
    fn test_lookup_by_borrowed_text() {
        let mut dictionary = KeyDictionary::new();
        assert!(dictionary.is_empty());
        let line = String::from("Smith. NY03");
        let id = dictionary.intern(&line[0..5]);
        assert_eq!(dictionary.get("Smith"), Some(id));
        assert_eq!(dictionary.get("Adams"), None);
    }

    #[test]
    fn test_many_short_keys() -> Result<(), anyhow::Error> {
        let mut dictionary = KeyDictionary::new();
        for round in 0..2 {
            for i in 0..10_000u64 {
                assert_eq!(dictionary.intern(&format!("Key {}", i)), i, "round: {}", round);
            }
        }
        assert_eq!(dictionary.len(), 10_000);
        assert_eq!(dictionary.get("Key 9999"), Some(9_999));
        assert_eq!(dictionary.get("Key 10000"), None);

        let ranking = KeyRanking::new(&dictionary, &ByteCollator, &Order::Desc)?;
        dictionary.renumber(&ranking);
        // "Key 9999" is the byte-wise largest key, "Key 0" the smallest
        assert_eq!(dictionary.get("Key 9999"), Some(0));
        assert_eq!(dictionary.get("Key 0"), Some(9_999));
        for (id, text) in dictionary.texts().enumerate() {
            assert_eq!(dictionary.get(text), Some(id as u64));
        }
        Ok(())
    }

    #[test]
    fn test_renumber_by_rank() -> Result<(), anyhow::Error> {
        let mut dictionary = KeyDictionary::new();
        dictionary.intern("c");
        dictionary.intern("a");
        dictionary.intern("b");
        let ranking = KeyRanking::new(&dictionary, &ByteCollator, &Order::Asc)?;
        dictionary.renumber(&ranking);
        assert_eq!(dictionary.texts().collect::<Vec<&str>>(), vec!["a", "b", "c"]);
        assert_eq!(dictionary.get("a"), Some(0));
        assert_eq!(dictionary.get("b"), Some(1));
        assert_eq!(dictionary.get("c"), Some(2));
        assert_eq!(dictionary.intern("d"), 3);
        Ok(())
    }
}
