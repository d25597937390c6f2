//! Front doors for the supported key domains. Each is the one generic engine with a fixed key type.

use crate::OrderedMap;
use std::cmp::Ordering;

/// Map with signed integer keys, ordered by value.
pub type IntMap<V> = OrderedMap<i64, V>;

/// Map with text keys, ordered lexically (by byte value of the UTF-8 encoding).
pub type StrMap<V> = OrderedMap<String, V>;

/// Map with byte-string keys, ordered lexically.
pub type BytesMap<V> = OrderedMap<Vec<u8>, V>;

/// Map with floating point keys, see [`TotalF64`] for the order.
pub type FloatMap<V> = OrderedMap<TotalF64, V>;

/// `f64` with a total order, so it can be used as a map key.
///
/// The order is `-inf < finite values < NaN < +inf`. All NaNs are equal to each other, and
/// `-0.0` is equal to `0.0`.
///
/// ```
///     use btree_ordmap::TotalF64;
///     assert!(TotalF64(f64::NAN) > TotalF64(f64::MAX));
///     assert!(TotalF64(f64::NAN) < TotalF64(f64::INFINITY));
///     assert!(TotalF64(f64::NAN) == TotalF64(-f64::NAN));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct TotalF64(pub f64);

impl TotalF64 {
    /// Get the wrapped value.
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl From<f64> for TotalF64 {
    fn from(x: f64) -> Self {
        Self(x)
    }
}

impl From<TotalF64> for f64 {
    fn from(x: TotalF64) -> Self {
        x.0
    }
}

impl Ord for TotalF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (self.0, other.0);
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) if b == f64::INFINITY => Ordering::Less,
            (true, false) => Ordering::Greater,
            (false, true) if a == f64::INFINITY => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                if a < b {
                    Ordering::Less
                } else if a > b {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            }
        }
    }
}

impl PartialOrd for TotalF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TotalF64 {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TotalF64 {}

#[cfg(feature = "serde")]
impl serde::Serialize for TotalF64 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TotalF64 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_order_is_total() {
        let xs = [
            f64::NEG_INFINITY,
            -1.5,
            -0.0,
            1e-300,
            f64::MAX,
            f64::NAN,
            f64::INFINITY,
        ];
        for (i, a) in xs.iter().enumerate() {
            for (j, b) in xs.iter().enumerate() {
                assert_eq!(TotalF64(*a).cmp(&TotalF64(*b)), i.cmp(&j), "{a} vs {b}");
            }
        }
        assert_eq!(TotalF64(0.0), TotalF64(-0.0));
    }

    #[test]
    fn float_map_keys_ascend() {
        let mut m = FloatMap::new();
        for x in [f64::INFINITY, 2.0, f64::NAN, -3.0, f64::NEG_INFINITY] {
            m.insert(TotalF64(x), x.to_string());
        }
        m.insert(TotalF64(-f64::NAN), "nan again".to_string());
        assert_eq!(m.len(), 5);
        let keys: Vec<String> = m.keys().map(|k| k.get().to_string()).collect();
        assert_eq!(keys, ["-inf", "-3", "2", "NaN", "inf"]);
        assert_eq!(m[&TotalF64(f64::NAN)], "nan again");
        m.check().unwrap();
    }
}
