/// `OrderedMap` is an ordered map where the node capacity (B) is a generic constant and the key
/// order is supplied by a comparator `C`. B must be odd and at least 11, a good value is 39.
///
/// General guide to implementation:
///
/// [`OrderedMap`] has a length, a comparator and a `Tree`, where `Tree` is an enum that can be
/// `Leaf` or `NonLeaf`. Every node holds at most B key-value pairs, and every node except the
/// root holds at least B/2.
///
/// Insertion splits overflowing nodes bottom-up, promoting the median into the parent.
/// Removal (including the [`Drain`] iterator) repairs underflow by borrowing from a sibling,
/// or by merging with it when the sibling has nothing to spare.
///
/// [`OrderedMap::set_default`] descends once, splitting full nodes on the way down, so it can
/// hand back a reference to the value it finds or inserts.
pub struct OrderedMap<K, V, C, const B: usize> {
    len: usize,
    tree: Tree<K, V, B>,
    cmp: C,
}
impl<K, V, C: Default, const B: usize> Default for OrderedMap<K, V, C, B> {
    fn default() -> Self {
        Self::new()
    }
}
impl<K, V, C, const B: usize> OrderedMap<K, V, C, B> {
    /// This should produce a compile-time error if B is unsuitable.
    const CHECK_B: usize = {
        assert!(B >= 11 && B % 2 == 1);
        0
    };

    /// Returns a new, empty map using the default comparator.
    #[must_use]
    pub fn new() -> Self
    where
        C: Default,
    {
        Self::with_comparator(C::default())
    }

    /// Returns a new, empty map ordered by `cmp`.
    #[must_use]
    pub fn with_comparator(cmp: C) -> Self {
        Self {
            len: Self::CHECK_B,
            tree: Tree::default(),
            cmp,
        }
    }

    /// Get the comparator.
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Clear the map.
    pub fn clear(&mut self) {
        if self.len > 0 {
            debug!(discarded = self.len, "clearing map");
        }
        self.len = 0;
        self.tree = Tree::default();
    }

    /// Get number of key-value pairs in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is the map empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert key-value pair into map, or if key is already in map, replaces value and returns old value.
    /// The key already in the map is kept.
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        C: Compare<K>,
    {
        debug_assert!(
            self.cmp.compare(&key, &key) == Ordering::Equal,
            "{}",
            MapError::InvalidComparator
        );
        let mut x = InsertCtx {
            value: Some(value),
            split: None,
        };
        self.tree.insert(key, &mut x, &self.cmp);
        if let Some(split) = x.split {
            self.tree.new_root(split);
            trace!(height = self.tree.height(), len = self.len, "root split");
        }
        if x.value.is_none() {
            self.len += 1;
        }
        x.value
    }

    /// Subscript write: same as [`insert`](Self::insert), discarding any previous value.
    pub fn set(&mut self, key: K, value: V)
    where
        C: Compare<K>,
    {
        self.insert(key, value);
    }

    /// Get mutable reference to the value for key, first inserting `default` if the key is absent.
    /// An existing value is left unchanged.
    pub fn set_default(&mut self, key: K, default: V) -> &mut V
    where
        C: Compare<K>,
    {
        if self.tree.get_key_value(&key, &self.cmp).is_some() {
            match self.tree.get_mut(&key, &self.cmp) {
                Some((_k, v)) => return v,
                None => unreachable!("key vanished between lookups"),
            }
        }
        if self.tree.len() == B {
            let split = self.tree.split();
            self.tree.new_root(split);
            trace!(height = self.tree.height(), len = self.len, "root split");
        }
        self.len += 1;
        self.tree.insert_presplit(key, default, &self.cmp)
    }

    /// Does the map have an entry for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.get_key_value(key).is_some()
    }

    /// Get reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.get_key_value(key).map(|(_k, v)| v)
    }

    /// Subscript read: like [`get`](Self::get), but an absent key is an error.
    pub fn item<Q>(&self, key: &Q) -> Result<&V, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.get(key).ok_or(MapError::KeyNotFound)
    }

    /// Get a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.tree.get_mut(key, &self.cmp).map(|(_k, v)| v)
    }

    /// Get references to the corresponding key and value.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.tree.get_key_value(key, &self.cmp)
    }

    /// Get references to first key and value.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.iter().next()
    }

    /// Gets references to last key and value.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.last()
    }

    /// Remove key-value pair from map, returning just the value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.remove_entry(key).map(|(_k, v)| v)
    }

    /// Remove key-value pair from map.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        let result = self.tree.remove(key, &self.cmp);
        self.removed(result)
    }

    /// Remove first key-value pair from map.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let result = self.tree.pop_first();
        self.removed(result)
    }

    /// Remove last key-value pair from map.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let result = self.tree.pop_last();
        self.removed(result)
    }

    fn removed(&mut self, result: Option<(K, V)>) -> Option<(K, V)> {
        if result.is_some() {
            self.len -= 1;
            if let Tree::NL(nl) = &mut self.tree {
                if nl.v.is_empty() {
                    if let Some(child) = nl.c.pop() {
                        self.tree = child;
                        trace!(height = self.tree.height(), len = self.len, "root collapsed");
                    }
                }
            }
        }
        result
    }

    /// Get iterator of references to key-value pairs, in ascending key order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, B> {
        Iter::new(&self.tree, self.len)
    }

    /// Get iterator of references to keys, in ascending order.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V, B> {
        Keys(self.iter())
    }

    /// Get iterator of references to values, in ascending key order.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V, B> {
        Values(self.iter())
    }

    /// Get iterator that removes and returns the key-value pairs in ascending key order.
    ///
    /// If the iterator is dropped early, the map keeps exactly the pairs not yet returned.
    pub fn drain(&mut self) -> Drain<'_, K, V, C, B> {
        Drain { map: self }
    }

    /// Like [`drain`](Self::drain), returning just the keys.
    pub fn drain_keys(&mut self) -> DrainKeys<'_, K, V, C, B> {
        DrainKeys(self.drain())
    }

    /// Like [`drain`](Self::drain), returning just the values.
    pub fn drain_values(&mut self) -> DrainValues<'_, K, V, C, B> {
        DrainValues(self.drain())
    }

    /// Verify the structural invariants of the map.
    ///
    /// Keys must be strictly ascending under the comparator (with `compare(b, a)` the reverse
    /// of `compare(a, b)`), leaves must all be at the same depth, node sizes must be within
    /// bounds and the length must match the number of reachable entries.
    pub fn check(&self) -> Result<(), MapError>
    where
        C: Compare<K>,
    {
        let mut leaf_depth = None;
        let found = self
            .tree
            .check(&self.cmp, None, None, 0, true, &mut leaf_depth)?;
        if found != self.len {
            return Err(MapError::LenMismatch {
                expected: self.len,
                found,
            });
        }
        Ok(())
    }
} // End impl OrderedMap

impl<K, V, C, const B: usize> Clone for OrderedMap<K, V, C, B>
where
    K: Clone,
    V: Clone,
    C: Clone,
{
    fn clone(&self) -> Self {
        Self {
            len: self.len,
            tree: self.tree.clone(),
            cmp: self.cmp.clone(),
        }
    }
}
impl<K: PartialEq, V: PartialEq, C, const B: usize> PartialEq for OrderedMap<K, V, C, B> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}
impl<K: Eq, V: Eq, C, const B: usize> Eq for OrderedMap<K, V, C, B> {}

impl<K, V, C, const B: usize> IntoIterator for OrderedMap<K, V, C, B> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, C, B>;

    /// Convert `OrderedMap` to [`IntoIter`].
    fn into_iter(self) -> IntoIter<K, V, C, B> {
        IntoIter(self)
    }
}
impl<'a, K, V, C, const B: usize> IntoIterator for &'a OrderedMap<K, V, C, B> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, B>;
    fn into_iter(self) -> Iter<'a, K, V, B> {
        self.iter()
    }
}
impl<K, V, C, const B: usize> FromIterator<(K, V)> for OrderedMap<K, V, C, B>
where
    C: Compare<K> + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}
impl<K, V, C, const B: usize, const N: usize> From<[(K, V); N]> for OrderedMap<K, V, C, B>
where
    C: Compare<K> + Default,
{
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}
impl<K, V, C, const B: usize> Extend<(K, V)> for OrderedMap<K, V, C, B>
where
    C: Compare<K>,
{
    fn extend<T>(&mut self, iter: T)
    where
        T: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}
impl<K, Q, V, C, const B: usize> std::ops::Index<&Q> for OrderedMap<K, V, C, B>
where
    K: Borrow<Q>,
    Q: ?Sized,
    C: Compare<Q>,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// Panics if the key is not present in the `OrderedMap`, see [`OrderedMap::item`] for a
    /// non-panicking version.
    fn index(&self, key: &Q) -> &V {
        match self.item(key) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}
impl<K: Debug, V: Debug, C, const B: usize> Debug for OrderedMap<K, V, C, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(feature = "serde")]
use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize,
};

#[cfg(feature = "serde")]
impl<K, V, C, const B: usize> Serialize for OrderedMap<K, V, C, B>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct OrderedMapVisitor<K, V, C, const B: usize> {
    marker: std::marker::PhantomData<fn() -> OrderedMap<K, V, C, B>>,
}

#[cfg(feature = "serde")]
impl<'de, K, V, C, const B: usize> Visitor<'de> for OrderedMapVisitor<K, V, C, B>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
    C: Compare<K> + Default,
{
    type Value = OrderedMap<K, V, C, B>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("OrderedMap")
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut map = OrderedMap::new();
        while let Some((k, v)) = access.next_entry()? {
            map.insert(k, v);
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, C, const B: usize> Deserialize<'de> for OrderedMap<K, V, C, B>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
    C: Compare<K> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedMapVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

use crate::{compare::Compare, error::MapError};
use std::{borrow::Borrow, cmp::Ordering, fmt, fmt::Debug, iter::FusedIterator, mem};
use tracing::{debug, trace};

// Vector types.
type StkVec<T> = arrayvec::ArrayVec<T, 15>;

type PairVec<K, V> = Vec<(K, V)>;
type TreeVec<K, V, const B: usize> = Vec<Tree<K, V, B>>;

type Split<K, V, const B: usize> = ((K, V), Tree<K, V, B>);

struct InsertCtx<K, V, const B: usize> {
    value: Option<V>,
    split: Option<Split<K, V, B>>,
}

/// Binary search of the keys of a node.
fn search<K, V, Q, C>(v: &[(K, V)], key: &Q, cmp: &C) -> Result<usize, usize>
where
    K: Borrow<Q>,
    Q: ?Sized,
    C: Compare<Q>,
{
    let (mut i, mut j) = (0, v.len());
    while i < j {
        let m = (i + j) / 2;
        match cmp.compare(v[m].0.borrow(), key) {
            Ordering::Equal => {
                return Ok(m);
            }
            Ordering::Less => i = m + 1,
            Ordering::Greater => j = m,
        }
    }
    Err(i)
}

/// Checks `a < b` in both directions.
fn strictly_less<K, C: Compare<K>>(cmp: &C, a: &K, b: &K) -> Result<(), MapError> {
    if cmp.compare(a, b) == Ordering::Less && cmp.compare(b, a) == Ordering::Greater {
        Ok(())
    } else {
        Err(MapError::InvalidComparator)
    }
}

#[derive(Clone)]
enum Tree<K, V, const B: usize> {
    L(Leaf<K, V, B>),
    NL(NonLeaf<K, V, B>),
}
impl<K, V, const B: usize> Default for Tree<K, V, B> {
    fn default() -> Self {
        Tree::L(Leaf(PairVec::new()))
    }
}
impl<K, V, const B: usize> Tree<K, V, B> {
    fn len(&self) -> usize {
        self.entries().len()
    }

    fn height(&self) -> usize {
        match self {
            Tree::L(_) => 1,
            Tree::NL(nl) => 1 + nl.c[0].height(),
        }
    }

    fn entries(&self) -> &[(K, V)] {
        match self {
            Tree::L(leaf) => &leaf.0,
            Tree::NL(nl) => &nl.v,
        }
    }

    fn entries_mut(&mut self) -> &mut PairVec<K, V> {
        match self {
            Tree::L(leaf) => &mut leaf.0,
            Tree::NL(nl) => &mut nl.v,
        }
    }

    fn children_mut(&mut self) -> Option<&mut TreeVec<K, V, B>> {
        match self {
            Tree::L(_) => None,
            Tree::NL(nl) => Some(&mut nl.c),
        }
    }

    fn into_parts(self) -> (PairVec<K, V>, TreeVec<K, V, B>) {
        match self {
            Tree::L(leaf) => (leaf.0, TreeVec::new()),
            Tree::NL(nl) => {
                let nl = *nl;
                (nl.v, nl.c)
            }
        }
    }

    fn insert<C: Compare<K>>(&mut self, key: K, x: &mut InsertCtx<K, V, B>, cmp: &C) {
        match self {
            Tree::L(leaf) => leaf.insert(key, x, cmp),
            Tree::NL(nonleaf) => nonleaf.insert(key, x, cmp),
        }
    }

    /// Insert a key known to be absent, into a tree that is not full.
    fn insert_presplit<C: Compare<K>>(&mut self, key: K, value: V, cmp: &C) -> &mut V {
        match self {
            Tree::L(leaf) => {
                let (Ok(i) | Err(i)) = search(&leaf.0, &key, cmp);
                leaf.0.insert(i, (key, value));
                &mut leaf.0[i].1
            }
            Tree::NL(nl) => {
                let (Ok(mut i) | Err(mut i)) = search(&nl.v, &key, cmp);
                if nl.c[i].len() == B {
                    let (med, right) = nl.c[i].split();
                    let go_right = cmp.compare(&key, &med.0) == Ordering::Greater;
                    nl.v.insert(i, med);
                    nl.c.insert(i + 1, right);
                    if go_right {
                        i += 1;
                    }
                }
                nl.c[i].insert_presplit(key, value, cmp)
            }
        }
    }

    fn split(&mut self) -> Split<K, V, B> {
        match self {
            Tree::L(leaf) => leaf.split(),
            Tree::NL(nonleaf) => nonleaf.split(),
        }
    }

    fn new_root(&mut self, (med, right): Split<K, V, B>) {
        let mut nl = NonLeafInner::new();
        nl.v.push(med);
        nl.c.push(mem::take(self));
        nl.c.push(right);
        *self = Tree::NL(nl);
    }

    fn remove<Q, C>(&mut self, key: &Q, cmp: &C) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        match self {
            Tree::L(leaf) => leaf.remove(key, cmp),
            Tree::NL(nonleaf) => nonleaf.remove(key, cmp),
        }
    }

    fn get_key_value<Q, C>(&self, key: &Q, cmp: &C) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        match self {
            Tree::L(leaf) => leaf.get_key_value(key, cmp),
            Tree::NL(nonleaf) => nonleaf.get_key_value(key, cmp),
        }
    }

    fn get_mut<Q, C>(&mut self, key: &Q, cmp: &C) -> Option<&mut (K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        match self {
            Tree::L(leaf) => leaf.get_mut(key, cmp),
            Tree::NL(nonleaf) => nonleaf.get_mut(key, cmp),
        }
    }

    fn last(&self) -> Option<(&K, &V)> {
        match self {
            Tree::L(leaf) => leaf.0.last().map(|(k, v)| (k, v)),
            Tree::NL(nonleaf) => nonleaf.c.last()?.last(),
        }
    }

    fn pop_first(&mut self) -> Option<(K, V)> {
        match self {
            Tree::L(leaf) => leaf.pop_first(),
            Tree::NL(nonleaf) => nonleaf.pop_first(),
        }
    }

    fn pop_last(&mut self) -> Option<(K, V)> {
        match self {
            Tree::L(leaf) => leaf.0.pop(),
            Tree::NL(nonleaf) => nonleaf.pop_last(),
        }
    }

    /// Check the subtree, returning the number of entries in it.
    fn check<'a, C: Compare<K>>(
        &'a self,
        cmp: &C,
        lo: Option<&'a K>,
        hi: Option<&'a K>,
        depth: usize,
        is_root: bool,
        leaf_depth: &mut Option<usize>,
    ) -> Result<usize, MapError> {
        let entries = self.entries();
        let min = match (is_root, self) {
            (false, _) => B / 2,
            (true, Tree::NL(_)) => 1,
            (true, Tree::L(_)) => 0,
        };
        if entries.len() < min || entries.len() > B {
            return Err(MapError::FanOut {
                entries: entries.len(),
                min,
                max: B,
            });
        }
        for (k, _) in entries {
            if cmp.compare(k, k) != Ordering::Equal {
                return Err(MapError::InvalidComparator);
            }
        }
        for w in entries.windows(2) {
            strictly_less(cmp, &w[0].0, &w[1].0)?;
        }
        if let (Some(lo), Some((first, _))) = (lo, entries.first()) {
            strictly_less(cmp, lo, first)?;
        }
        if let (Some(hi), Some((last, _))) = (hi, entries.last()) {
            strictly_less(cmp, last, hi)?;
        }
        match self {
            Tree::L(_) => {
                match *leaf_depth {
                    None => *leaf_depth = Some(depth),
                    Some(d) if d != depth => return Err(MapError::Unbalanced(d, depth)),
                    Some(_) => {}
                }
                Ok(entries.len())
            }
            Tree::NL(nl) => {
                if nl.c.len() != nl.v.len() + 1 {
                    return Err(MapError::FanOut {
                        entries: nl.v.len(),
                        min: nl.c.len().saturating_sub(1),
                        max: nl.c.len().saturating_sub(1),
                    });
                }
                let mut total = entries.len();
                for (i, child) in nl.c.iter().enumerate() {
                    let clo = if i == 0 { lo } else { Some(&nl.v[i - 1].0) };
                    let chi = nl.v.get(i).map(|kv| &kv.0).or(hi);
                    total += child.check(cmp, clo, chi, depth + 1, false, leaf_depth)?;
                }
                Ok(total)
            }
        }
    }
} // End impl Tree

#[derive(Clone)]
struct Leaf<K, V, const B: usize>(PairVec<K, V>);
impl<K, V, const B: usize> Leaf<K, V, B> {
    fn split(&mut self) -> Split<K, V, B> {
        let mut right = self.0.split_off(B / 2);
        let med = right.remove(0);
        right.reserve(B + 1 - right.len());
        (med, Tree::L(Leaf(right)))
    }

    fn insert<C: Compare<K>>(&mut self, key: K, x: &mut InsertCtx<K, V, B>, cmp: &C) {
        let Some(value) = x.value.take() else {
            return;
        };
        match search(&self.0, &key, cmp) {
            Ok(i) => {
                x.value = Some(mem::replace(&mut self.0[i].1, value));
            }
            Err(i) => {
                if self.0.capacity() == 0 {
                    self.0.reserve(B + 1);
                }
                self.0.insert(i, (key, value));
                if self.0.len() > B {
                    x.split = Some(self.split());
                }
            }
        }
    }

    fn remove<Q, C>(&mut self, key: &Q, cmp: &C) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        match search(&self.0, key, cmp) {
            Ok(i) => Some(self.0.remove(i)),
            Err(_i) => None,
        }
    }

    fn get_key_value<Q, C>(&self, key: &Q, cmp: &C) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        match search(&self.0, key, cmp) {
            Ok(i) => {
                let x = &self.0[i];
                Some((&x.0, &x.1))
            }
            Err(_i) => None,
        }
    }

    fn get_mut<Q, C>(&mut self, key: &Q, cmp: &C) -> Option<&mut (K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        match search(&self.0, key, cmp) {
            Ok(i) => Some(&mut self.0[i]),
            Err(_i) => None,
        }
    }

    fn pop_first(&mut self) -> Option<(K, V)> {
        if self.0.is_empty() {
            return None;
        }
        Some(self.0.remove(0))
    }
} // End impl Leaf

/* Boxing NonLeaf saves some memory by reducing size of Tree enum */
type NonLeaf<K, V, const B: usize> = Box<NonLeafInner<K, V, B>>;

#[derive(Clone)]
struct NonLeafInner<K, V, const B: usize> {
    v: PairVec<K, V>,
    c: TreeVec<K, V, B>,
}
impl<K, V, const B: usize> NonLeafInner<K, V, B> {
    fn new() -> Box<Self> {
        Box::new(Self {
            v: PairVec::with_capacity(B + 1),
            c: TreeVec::with_capacity(B + 2),
        })
    }

    fn split(&mut self) -> Split<K, V, B> {
        let mut v = self.v.split_off(B / 2);
        let med = v.remove(0);
        let mut c = self.c.split_off(B / 2 + 1);
        v.reserve(B + 1 - v.len());
        c.reserve(B + 2 - c.len());
        (med, Tree::NL(Box::new(Self { v, c })))
    }

    fn insert<C: Compare<K>>(&mut self, key: K, x: &mut InsertCtx<K, V, B>, cmp: &C) {
        match search(&self.v, &key, cmp) {
            Ok(i) => {
                if let Some(value) = x.value.take() {
                    x.value = Some(mem::replace(&mut self.v[i].1, value));
                }
            }
            Err(i) => {
                self.c[i].insert(key, x, cmp);
                if let Some((med, right)) = x.split.take() {
                    self.v.insert(i, med);
                    self.c.insert(i + 1, right);
                    if self.v.len() > B {
                        x.split = Some(self.split());
                    }
                }
            }
        }
    }

    fn remove<Q, C>(&mut self, key: &Q, cmp: &C) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        match search(&self.v, key, cmp) {
            Ok(i) => Some(self.remove_at(i)),
            Err(i) => {
                let result = self.c[i].remove(key, cmp);
                if result.is_some() {
                    self.fix(i);
                }
                result
            }
        }
    }

    /// Remove the ith key-value pair, replacing it with its in-order predecessor.
    fn remove_at(&mut self, i: usize) -> (K, V) {
        match self.c[i].pop_last() {
            Some(pred) => {
                let kv = mem::replace(&mut self.v[i], pred);
                self.fix(i);
                kv
            }
            None => unreachable!("empty child below non-leaf"),
        }
    }

    fn get_key_value<Q, C>(&self, key: &Q, cmp: &C) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        match search(&self.v, key, cmp) {
            Ok(i) => {
                let kv = &self.v[i];
                Some((&kv.0, &kv.1))
            }
            Err(i) => self.c[i].get_key_value(key, cmp),
        }
    }

    fn get_mut<Q, C>(&mut self, key: &Q, cmp: &C) -> Option<&mut (K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        match search(&self.v, key, cmp) {
            Ok(i) => Some(&mut self.v[i]),
            Err(i) => self.c[i].get_mut(key, cmp),
        }
    }

    fn pop_first(&mut self) -> Option<(K, V)> {
        let result = self.c[0].pop_first();
        if result.is_some() {
            self.fix(0);
        }
        result
    }

    fn pop_last(&mut self) -> Option<(K, V)> {
        let i = self.c.len() - 1;
        let result = self.c[i].pop_last();
        if result.is_some() {
            self.fix(i);
        }
        result
    }

    /// Restore the minimum size of child i after a removal below it.
    fn fix(&mut self, i: usize) {
        let min = B / 2;
        if self.c[i].len() >= min {
            return;
        }
        if i > 0 && self.c[i - 1].len() > min {
            self.rotate_right(i);
        } else if i + 1 < self.c.len() && self.c[i + 1].len() > min {
            self.rotate_left(i);
        } else if i > 0 {
            self.merge(i - 1);
        } else {
            self.merge(i);
        }
    }

    /// Move the last pair of child i-1 up into the separator, and the separator down into child i.
    fn rotate_right(&mut self, i: usize) {
        let (lo, hi) = self.c.split_at_mut(i);
        let (left, right) = (&mut lo[i - 1], &mut hi[0]);
        if let Some(kv) = left.entries_mut().pop() {
            let sep = mem::replace(&mut self.v[i - 1], kv);
            right.entries_mut().insert(0, sep);
        }
        if let (Some(lc), Some(rc)) = (left.children_mut(), right.children_mut()) {
            if let Some(ct) = lc.pop() {
                rc.insert(0, ct);
            }
        }
    }

    /// Move the first pair of child i+1 up into the separator, and the separator down into child i.
    fn rotate_left(&mut self, i: usize) {
        let (lo, hi) = self.c.split_at_mut(i + 1);
        let (left, right) = (&mut lo[i], &mut hi[0]);
        if !right.entries_mut().is_empty() {
            let kv = right.entries_mut().remove(0);
            let sep = mem::replace(&mut self.v[i], kv);
            left.entries_mut().push(sep);
        }
        if let (Some(lc), Some(rc)) = (left.children_mut(), right.children_mut()) {
            if !rc.is_empty() {
                lc.push(rc.remove(0));
            }
        }
    }

    /// Merge child i+1 and the separator between them into child i.
    fn merge(&mut self, i: usize) {
        let sep = self.v.remove(i);
        let (v, c) = self.c.remove(i + 1).into_parts();
        let left = &mut self.c[i];
        let lv = left.entries_mut();
        lv.push(sep);
        lv.extend(v);
        if let Some(lc) = left.children_mut() {
            lc.extend(c);
        }
    }
} // End impl NonLeafInner

// Reference iteration.

/// Iterator returned by [`OrderedMap::iter`].
pub struct Iter<'a, K, V, const B: usize> {
    len: usize,
    leaf: Option<std::slice::Iter<'a, (K, V)>>,
    stk: StkVec<Stk<'a, K, V, B>>,
}

struct Stk<'a, K, V, const B: usize> {
    v: std::slice::Iter<'a, (K, V)>,
    c: std::slice::Iter<'a, Tree<K, V, B>>,
}

/* Manual Clone impls, derive would require K: Clone and V: Clone */
impl<'a, K, V, const B: usize> Clone for Stk<'a, K, V, B> {
    fn clone(&self) -> Self {
        Self {
            v: self.v.clone(),
            c: self.c.clone(),
        }
    }
}
impl<'a, K, V, const B: usize> Clone for Iter<'a, K, V, B> {
    fn clone(&self) -> Self {
        Self {
            len: self.len,
            leaf: self.leaf.clone(),
            stk: self.stk.clone(),
        }
    }
}

impl<'a, K, V, const B: usize> Iter<'a, K, V, B> {
    fn new(tree: &'a Tree<K, V, B>, len: usize) -> Self {
        let mut x = Self {
            len,
            leaf: None,
            stk: StkVec::new(),
        };
        x.push_tree(tree);
        x
    }

    /// Descend the leftmost path of tree, stacking the non-leaf positions.
    fn push_tree(&mut self, tree: &'a Tree<K, V, B>) {
        match tree {
            Tree::L(leaf) => {
                self.leaf = Some(leaf.0.iter());
            }
            Tree::NL(nl) => {
                let (v, mut c) = (nl.v.iter(), nl.c.iter());
                let ct = c.next();
                self.stk.push(Stk { v, c });
                if let Some(ct) = ct {
                    self.push_tree(ct);
                }
            }
        }
    }
}
impl<'a, K, V, const B: usize> Iterator for Iter<'a, K, V, B> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(f) = &mut self.leaf {
                if let Some((k, v)) = f.next() {
                    self.len -= 1;
                    return Some((k, v));
                }
                self.leaf = None;
            } else if let Some(s) = self.stk.last_mut() {
                if let Some((k, v)) = s.v.next() {
                    if let Some(ct) = s.c.next() {
                        self.push_tree(ct);
                    }
                    self.len -= 1;
                    return Some((k, v));
                }
                self.stk.pop();
            } else {
                return None;
            }
        }
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}
impl<'a, K, V, const B: usize> ExactSizeIterator for Iter<'a, K, V, B> {
    fn len(&self) -> usize {
        self.len
    }
}
impl<'a, K, V, const B: usize> FusedIterator for Iter<'a, K, V, B> {}
impl<'a, K: Debug, V: Debug, const B: usize> Debug for Iter<'a, K, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Iterator returned by [`OrderedMap::keys`].
#[derive(Clone, Debug)]
pub struct Keys<'a, K, V, const B: usize>(Iter<'a, K, V, B>);
impl<'a, K, V, const B: usize> Iterator for Keys<'a, K, V, B> {
    type Item = &'a K;
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, _)| k)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}
impl<'a, K, V, const B: usize> ExactSizeIterator for Keys<'a, K, V, B> {
    fn len(&self) -> usize {
        self.0.len()
    }
}
impl<'a, K, V, const B: usize> FusedIterator for Keys<'a, K, V, B> {}

/// Iterator returned by [`OrderedMap::values`].
#[derive(Clone, Debug)]
pub struct Values<'a, K, V, const B: usize>(Iter<'a, K, V, B>);
impl<'a, K, V, const B: usize> Iterator for Values<'a, K, V, B> {
    type Item = &'a V;
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, v)| v)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}
impl<'a, K, V, const B: usize> ExactSizeIterator for Values<'a, K, V, B> {
    fn len(&self) -> usize {
        self.0.len()
    }
}
impl<'a, K, V, const B: usize> FusedIterator for Values<'a, K, V, B> {}

// Draining iteration.

/// Draining iterator returned by [`OrderedMap::drain`].
///
/// Each call to `next` removes the smallest remaining pair from the map.
pub struct Drain<'a, K, V, C, const B: usize> {
    map: &'a mut OrderedMap<K, V, C, B>,
}
impl<'a, K, V, C, const B: usize> Iterator for Drain<'a, K, V, C, B> {
    type Item = (K, V);
    fn next(&mut self) -> Option<Self::Item> {
        self.map.pop_first()
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.map.len, Some(self.map.len))
    }
}
impl<'a, K, V, C, const B: usize> ExactSizeIterator for Drain<'a, K, V, C, B> {
    fn len(&self) -> usize {
        self.map.len
    }
}
impl<'a, K, V, C, const B: usize> FusedIterator for Drain<'a, K, V, C, B> {}
impl<'a, K, V, C, const B: usize> Drop for Drain<'a, K, V, C, B> {
    fn drop(&mut self) {
        if !self.map.is_empty() {
            debug!(remaining = self.map.len, "drain dropped before exhaustion");
        }
    }
}
impl<'a, K: Debug, V: Debug, C, const B: usize> Debug for Drain<'a, K, V, C, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Drain").field(&self.map).finish()
    }
}

/// Draining iterator returned by [`OrderedMap::drain_keys`].
#[derive(Debug)]
pub struct DrainKeys<'a, K, V, C, const B: usize>(Drain<'a, K, V, C, B>);
impl<'a, K, V, C, const B: usize> Iterator for DrainKeys<'a, K, V, C, B> {
    type Item = K;
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.0.next()?.0)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}
impl<'a, K, V, C, const B: usize> ExactSizeIterator for DrainKeys<'a, K, V, C, B> {}
impl<'a, K, V, C, const B: usize> FusedIterator for DrainKeys<'a, K, V, C, B> {}

/// Draining iterator returned by [`OrderedMap::drain_values`].
#[derive(Debug)]
pub struct DrainValues<'a, K, V, C, const B: usize>(Drain<'a, K, V, C, B>);
impl<'a, K, V, C, const B: usize> Iterator for DrainValues<'a, K, V, C, B> {
    type Item = V;
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.0.next()?.1)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}
impl<'a, K, V, C, const B: usize> ExactSizeIterator for DrainValues<'a, K, V, C, B> {}
impl<'a, K, V, C, const B: usize> FusedIterator for DrainValues<'a, K, V, C, B> {}

// Consuming iteration.

/// Consuming iterator returned by [`OrderedMap::into_iter`].
pub struct IntoIter<K, V, C, const B: usize>(OrderedMap<K, V, C, B>);
impl<K, V, C, const B: usize> Iterator for IntoIter<K, V, C, B> {
    type Item = (K, V);
    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop_first()
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len, Some(self.0.len))
    }
}
impl<K, V, C, const B: usize> DoubleEndedIterator for IntoIter<K, V, C, B> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.pop_last()
    }
}
impl<K, V, C, const B: usize> ExactSizeIterator for IntoIter<K, V, C, B> {
    fn len(&self) -> usize {
        self.0.len
    }
}
impl<K, V, C, const B: usize> FusedIterator for IntoIter<K, V, C, B> {}
impl<K: Debug, V: Debug, C, const B: usize> Debug for IntoIter<K, V, C, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.0).finish()
    }
}
