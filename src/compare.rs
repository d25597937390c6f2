use std::cmp::Ordering;
use std::fmt;

/// Strict total order used by [`OrderedMap`](crate::gb::OrderedMap) to place keys.
///
/// `compare(a, a)` must be `Equal`, `compare(a, b)` must be the reverse of `compare(b, a)`,
/// and the relation must be transitive. A comparator that breaks these rules is a
/// programming error; [`OrderedMap::check`](crate::gb::OrderedMap::check) reports it as
/// [`MapError::InvalidComparator`](crate::MapError::InvalidComparator).
pub trait Compare<Q: ?Sized> {
    /// Compare two keys.
    fn compare(&self, a: &Q, b: &Q) -> Ordering;
}

/// Order given by the key type's [`Ord`] implementation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Natural;

impl<Q: Ord + ?Sized> Compare<Q> for Natural {
    #[inline]
    fn compare(&self, a: &Q, b: &Q) -> Ordering {
        a.cmp(b)
    }
}

/// Order given by a closure.
///
/// ```
///     use btree_ordmap::{ByFn, OrderedMap};
///     let mut m: OrderedMap<i64, &str, _> = OrderedMap::with_comparator(ByFn(|a: &i64, b: &i64| b.cmp(a)));
///     m.insert(1, "one");
///     m.insert(2, "two");
///     assert_eq!(m.keys().copied().collect::<Vec<_>>(), [2, 1]);
/// ```
#[derive(Clone, Copy, Default)]
pub struct ByFn<F>(pub F);

impl<K, F> Compare<K> for ByFn<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.0)(a, b)
    }
}

impl<F> fmt::Debug for ByFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ByFn")
    }
}
