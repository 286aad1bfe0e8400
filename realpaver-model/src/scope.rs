//! [`Scope`]: an ordered, deduplicated set of variables, shared
//! process-wide through [`ScopeBank`] so that the same variable set
//! constructed twice resolves to the same cheap-to-clone handle.

use crate::var::VarId;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};

/// The ordered list of variable ids backing a [`Scope`]; always sorted and
/// deduplicated. Stored behind an `Arc` so cloning a `Scope` is O(1).
type ScopeData = Arc<Vec<VarId>>;

static BANK: Lazy<Mutex<FxHashMap<Vec<VarId>, ScopeData>>> = Lazy::new(|| Mutex::new(FxHashMap::default()));

/// Process-wide cache mapping canonical variable-id lists to a shared
/// representation, so that scopes built from the same variable set never
/// proliferate duplicate allocations.
pub struct ScopeBank;

impl ScopeBank {
    fn intern(ids: Vec<VarId>) -> ScopeData {
        let mut bank = BANK.lock().unwrap();
        if let Some(existing) = bank.get(&ids) {
            return existing.clone();
        }
        let data: ScopeData = Arc::new(ids.clone());
        bank.insert(ids, data.clone());
        data
    }

    /// Clears the process-wide cache. Exposed only for test isolation.
    #[cfg(test)]
    pub fn clear() {
        BANK.lock().unwrap().clear();
    }
}

/// An ordered set of variables, shared copy-on-write through
/// [`ScopeBank`]. Mutating operations (`union`, `insert`, …) return a new
/// `Scope`; existing handles remain valid and unaffected.
#[derive(Debug, Clone)]
pub struct Scope {
    ids: ScopeData,
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.ids, &other.ids) || *self.ids == *other.ids
    }
}
impl Eq for Scope {}

impl Scope {
    pub fn empty() -> Self {
        Scope { ids: ScopeBank::intern(Vec::new()) }
    }

    pub fn from_ids(mut ids: Vec<VarId>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Scope { ids: ScopeBank::intern(ids) }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: VarId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// O(1) (amortized `O(log n)` lookup) mapping from a variable id to
    /// its contiguous position `0..len()` in this scope's dense storage.
    pub fn index(&self, id: VarId) -> Option<usize> {
        self.ids.binary_search(&id).ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = VarId> + '_ {
        self.ids.iter().copied()
    }

    pub fn ids(&self) -> &[VarId] {
        &self.ids
    }

    pub fn union(&self, other: &Scope) -> Scope {
        let mut ids: Vec<VarId> = self.ids.iter().chain(other.ids.iter()).copied().collect();
        ids.sort_unstable();
        ids.dedup();
        Scope { ids: ScopeBank::intern(ids) }
    }

    pub fn intersection(&self, other: &Scope) -> Scope {
        let ids: Vec<VarId> = self.ids.iter().copied().filter(|id| other.contains(*id)).collect();
        Scope { ids: ScopeBank::intern(ids) }
    }

    pub fn is_disjoint(&self, other: &Scope) -> bool {
        self.ids.iter().all(|id| !other.contains(*id))
    }

    pub fn is_subset_of(&self, other: &Scope) -> bool {
        self.ids.iter().all(|id| other.contains(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_id_sets_share_representation() {
        ScopeBank::clear();
        let a = Scope::from_ids(vec![VarId::new(2), VarId::new(1)]);
        let b = Scope::from_ids(vec![VarId::new(1), VarId::new(2)]);
        assert!(Arc::ptr_eq(&a.ids, &b.ids));
    }

    #[test]
    fn index_is_contiguous_in_sorted_order() {
        let s = Scope::from_ids(vec![VarId::new(5), VarId::new(1), VarId::new(3)]);
        assert_eq!(s.index(VarId::new(1)), Some(0));
        assert_eq!(s.index(VarId::new(3)), Some(1));
        assert_eq!(s.index(VarId::new(5)), Some(2));
        assert_eq!(s.index(VarId::new(9)), None);
    }

    #[test]
    fn union_and_intersection() {
        let a = Scope::from_ids(vec![VarId::new(1), VarId::new(2)]);
        let b = Scope::from_ids(vec![VarId::new(2), VarId::new(3)]);
        let u = a.union(&b);
        assert_eq!(u.len(), 3);
        let i = a.intersection(&b);
        assert_eq!(i.ids(), &[VarId::new(2)]);
    }
}
