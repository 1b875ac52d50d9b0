//! Fixed-capacity symbol sets.
//!
//! Availability tracking touches a set per column on every placement, so the
//! sets are plain 256-bit masks rather than hash sets. Membership order is
//! ascending, which keeps seeded generation reproducible.

/// A set of symbols in `0..=255`, backed by four 64-bit words.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct SymbolSet {
    bits: [u64; 4],
}

impl SymbolSet {
    /// Creates an empty set.
    pub fn empty() -> Self {
        Self { bits: [0; 4] }
    }

    /// Creates the set `{0, .., n-1}`.
    pub fn full(n: usize) -> Self {
        debug_assert!(n <= 256);
        let mut bits = [0u64; 4];
        for (b, word) in bits.iter_mut().enumerate() {
            let lo = b * 64;
            if n >= lo + 64 {
                *word = u64::MAX;
            } else if n > lo {
                *word = (1u64 << (n - lo)) - 1;
            }
        }
        Self { bits }
    }

    #[inline]
    pub fn insert(&mut self, v: u8) {
        self.bits[(v >> 6) as usize] |= 1u64 << (v & 63);
    }

    #[inline]
    pub fn remove(&mut self, v: u8) {
        self.bits[(v >> 6) as usize] &= !(1u64 << (v & 63));
    }

    #[inline]
    pub fn contains(&self, v: u8) -> bool {
        self.bits[(v >> 6) as usize] & (1u64 << (v & 63)) != 0
    }

    pub fn len(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }

    /// Returns the `i`-th smallest member, or `None` if `i >= len`.
    pub fn nth(&self, mut i: usize) -> Option<u8> {
        for (b, &word) in self.bits.iter().enumerate() {
            let count = word.count_ones() as usize;
            if i < count {
                let mut w = word;
                for _ in 0..i {
                    w &= w - 1; // clear lowest set bit
                }
                return Some((b * 64 + w.trailing_zeros() as usize) as u8);
            }
            i -= count;
        }
        None
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let mut bits = self.bits;
        for (w, o) in bits.iter_mut().zip(other.bits.iter()) {
            *w &= o;
        }
        Self { bits }
    }

    pub fn difference(&self, other: &Self) -> Self {
        let mut bits = self.bits;
        for (w, o) in bits.iter_mut().zip(other.bits.iter()) {
            *w &= !o;
        }
        Self { bits }
    }

    /// Iterates members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..4).flat_map(move |b| {
            let word = self.bits[b];
            (0..64)
                .filter(move |i| word & (1u64 << i) != 0)
                .map(move |i| (b * 64 + i) as u8)
        })
    }
}

impl std::fmt::Debug for SymbolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_has_expected_members() {
        for n in [0usize, 1, 5, 63, 64, 65, 200, 255, 256] {
            let set = SymbolSet::full(n);
            assert_eq!(set.len(), n, "wrong cardinality for n={}", n);
            for v in 0..=255u8 {
                assert_eq!(set.contains(v), (v as usize) < n, "n={} v={}", n, v);
            }
        }
    }

    #[test]
    fn insert_remove_roundtrip() {
        let mut set = SymbolSet::empty();
        assert!(set.is_empty());
        set.insert(7);
        set.insert(200);
        assert!(set.contains(7) && set.contains(200));
        assert_eq!(set.len(), 2);
        set.remove(7);
        assert!(!set.contains(7));
        // removing an absent member is a no-op
        set.remove(7);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn nth_returns_ascending_members() {
        let mut set = SymbolSet::empty();
        for v in [3u8, 64, 65, 130, 255] {
            set.insert(v);
        }
        assert_eq!(set.nth(0), Some(3));
        assert_eq!(set.nth(1), Some(64));
        assert_eq!(set.nth(2), Some(65));
        assert_eq!(set.nth(3), Some(130));
        assert_eq!(set.nth(4), Some(255));
        assert_eq!(set.nth(5), None);
    }

    #[test]
    fn iter_matches_nth() {
        let set = SymbolSet::full(100);
        let via_iter: Vec<u8> = set.iter().collect();
        let via_nth: Vec<u8> = (0..set.len()).map(|i| set.nth(i).unwrap()).collect();
        assert_eq!(via_iter, via_nth);
    }

    #[test]
    fn intersection_and_difference() {
        let a = SymbolSet::full(10);
        let mut b = SymbolSet::empty();
        for v in [2u8, 5, 9, 11] {
            b.insert(v);
        }
        let both = a.intersection(&b);
        assert_eq!(both.iter().collect::<Vec<_>>(), vec![2, 5, 9]);
        let only_a = a.difference(&b);
        assert_eq!(only_a.len(), 7);
        assert!(!only_a.contains(2) && only_a.contains(0));
    }
}
