use anyhow::Context;

use crate::collation::Collator;
use crate::key_dictionary::KeyDictionary;
use crate::order::Order;

/// Permutation of key ids in output order.
///
/// `order()[rank]` is the id of the key at `rank`, [KeyRanking::inverse] maps ids back to
/// ranks.
#[derive(Debug)]
pub struct KeyRanking {
    order: Vec<u64>,
}

impl KeyRanking {
    /// Rank all keys of `dictionary` with `collator`. Sort keys are computed once per key.
    pub fn new<C: Collator>(dictionary: &KeyDictionary, collator: &C, order: &Order) -> Result<KeyRanking, anyhow::Error> {
        let mut sort_keys = Vec::with_capacity(dictionary.len());
        for (id, text) in dictionary.texts().enumerate() {
            let sort_key = collator.sort_key(text)
                .with_context(|| format!("key id: {}", id))?;
            sort_keys.push(sort_key);
        }

        let mut ids: Vec<u64> = (0..dictionary.len() as u64).collect();
        match order {
            Order::Asc => {
                ids.sort_by(|i, j| collator.compare(&sort_keys[*i as usize], &sort_keys[*j as usize]))
            }
            Order::Desc => {
                ids.sort_by(|i, j| collator.compare(&sort_keys[*j as usize], &sort_keys[*i as usize]))
            }
        }
        Ok(
            KeyRanking {
                order: ids
            }
        )
    }

    pub fn order(&self) -> &[u64] {
        &self.order
    }

    /// Rank of every key id
    pub fn inverse(&self) -> Vec<u64> {
        let mut ranks = vec![0u64; self.order.len()];
        for (rank, id) in self.order.iter().enumerate() {
            ranks[*id as usize] = rank as u64;
        }
        ranks
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
