use crate::*;
use serde_json::{json, Value};
use std::cmp::Ordering;

/// Small node capacity, so modest key counts build trees several levels deep.
type SmallMap<K, V> = gb::OrderedMap<K, V, Natural, 11>;

#[test]
fn int_map_example() {
    let mut map = IntMap::<Value>::new();
    map.set(1, json!("pierogi"));
    map.set(23, json!("gyoza"));
    map.set(-10, json!({"name": "coco"}));

    assert_eq!(map.len(), 3);
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), [-10, 1, 23]);
    assert_eq!(
        map.iter().map(|(k, v)| (*k, v.clone())).collect::<Vec<_>>(),
        [
            (-10, json!({"name": "coco"})),
            (1, json!("pierogi")),
            (23, json!("gyoza"))
        ]
    );
    assert_eq!(map.get(&9), None);
    assert_eq!(map.item(&1), Ok(&json!("pierogi")));

    map.set(1, json!("sammy"));
    assert_eq!(map.len(), 3);
    assert_eq!(map[&1], json!("sammy"));

    assert_eq!(
        map.drain().collect::<Vec<_>>(),
        [
            (-10, json!({"name": "coco"})),
            (1, json!("sammy")),
            (23, json!("gyoza"))
        ]
    );
    assert_eq!(map.len(), 0);

    assert_eq!(*map.set_default(9, json!(23)), json!(23));
    assert_eq!(map.len(), 1);
}

#[test]
fn str_map_example() {
    let mut map = StrMap::<Value>::new();
    map.set("abc".to_string(), json!("123"));
    map.set("aaaa".to_string(), json!("foo"));
    map.set("zzz".to_string(), json!({"1": "bar"}));

    assert_eq!(map.keys().collect::<Vec<_>>(), ["aaaa", "abc", "zzz"]);

    map.set("abc".to_string(), json!(7));
    assert_eq!(map.len(), 3);
    assert_eq!(map.get("abc"), Some(&json!(7)));
    assert_eq!(map.item("missing"), Err(MapError::KeyNotFound));

    assert_eq!(map.drain().count(), 3);
    assert!(map.is_empty());

    assert_eq!(
        *map.set_default("new".to_string(), json!("something")),
        json!("something")
    );
    assert_eq!(map.len(), 1);
}

#[test]
#[should_panic(expected = "no entry found for key")]
fn index_missing_key_panics() {
    let map = IntMap::<i32>::new();
    let _v = map[&5];
}

#[test]
fn insert_fwd_rev_and_overwrite() {
    let n = 5000;
    let mut fwd = SmallMap::<usize, usize>::new();
    let mut rev = SmallMap::<usize, usize>::new();
    for i in 0..n {
        assert_eq!(fwd.insert(i, i), None);
        assert_eq!(rev.insert(n - 1 - i, n - 1 - i), None);
    }
    fwd.check().unwrap();
    rev.check().unwrap();
    assert!(fwd == rev);

    for i in 0..n {
        assert_eq!(fwd.insert(i, i * 2), Some(i));
    }
    assert_eq!(fwd.len(), n);
    fwd.check().unwrap();
    for i in 0..n {
        assert_eq!(fwd.get(&i), Some(&(i * 2)));
    }
    assert_eq!(fwd.get(&n), None);
}

#[test]
fn iter_is_ascending_and_restartable() {
    let mut m = SmallMap::<u64, u64>::new();
    // Scatter the keys so they arrive out of order.
    for i in 0..3000u64 {
        let k = (i * 7919) % 3001;
        m.insert(k, k + 1);
    }
    m.check().unwrap();
    for _rep in 0..2 {
        let mut it = m.iter();
        assert_eq!(it.len(), 3000);
        let mut prev = None;
        for (k, v) in &mut it {
            assert_eq!(*v, k + 1);
            if let Some(p) = prev {
                assert!(p < *k);
            }
            prev = Some(*k);
        }
        assert_eq!(it.len(), 0);
        assert_eq!(it.next(), None);
    }
    assert_eq!(m.keys().count(), m.len());
    assert_eq!(
        m.values().copied().sum::<u64>(),
        m.keys().map(|k| k + 1).sum::<u64>()
    );
}

#[test]
fn drain_in_order_and_partial() {
    let n = 2000;
    let mut m: SmallMap<i64, String> = (0..n).rev().map(|i| (i, i.to_string())).collect();
    m.check().unwrap();

    {
        let mut d = m.drain();
        for i in 0..700 {
            assert_eq!(d.next(), Some((i, i.to_string())));
        }
        assert_eq!(d.len(), (n - 700) as usize);
    }
    assert_eq!(m.len(), (n - 700) as usize);
    m.check().unwrap();
    assert_eq!(m.first_key_value(), Some((&700, &"700".to_string())));
    assert_eq!(m.get(&699), None);

    let rest: Vec<i64> = m.drain_keys().collect();
    assert_eq!(rest, (700..n).collect::<Vec<_>>());
    assert!(m.is_empty());
    m.check().unwrap();
    assert_eq!(m.drain().next(), None);
}

#[test]
fn drain_values_empties_map() {
    let mut m = StrMap::<usize>::new();
    for w in ["pear", "apple", "fig"] {
        m.insert(w.to_string(), w.len());
    }
    assert_eq!(m.drain_values().collect::<Vec<_>>(), [5, 3, 4]);
    assert!(m.is_empty());
}

#[test]
fn set_default_idempotent() {
    let mut m = SmallMap::<usize, usize>::new();
    for i in 0..1000 {
        assert_eq!(*m.set_default(i, i), i);
        assert_eq!(m.len(), i + 1);
        assert_eq!(*m.set_default(i, 0), i);
        assert_eq!(m.len(), i + 1);
    }
    m.check().unwrap();

    // Descending keys split nodes on the left-hand path.
    let mut m = SmallMap::<usize, usize>::new();
    for i in (0..1000).rev() {
        *m.set_default(i % 250, 0) += 1;
        m.check().unwrap();
    }
    assert_eq!(m.len(), 250);
    assert!(m.values().all(|v| *v == 4));
}

#[test]
fn remove_keeps_balance() {
    let n = 3000;
    let mut m = SmallMap::<usize, usize>::new();
    for i in 0..n {
        m.insert(i, i);
    }
    for i in (0..n).filter(|i| i % 3 != 0) {
        assert_eq!(m.remove(&i), Some(i));
        assert_eq!(m.remove(&i), None);
    }
    m.check().unwrap();
    assert_eq!(m.len(), n / 3);
    assert!(m.keys().all(|k| k % 3 == 0));
    assert!(m.contains_key(&2997));
    assert!(!m.contains_key(&2998));

    while m.len() > 10 {
        let (k, _) = m.pop_last().unwrap();
        assert_eq!(k % 3, 0);
    }
    m.check().unwrap();
    assert_eq!(m.last_key_value(), Some((&27, &27)));
    m.clear();
    assert!(m.is_empty());
    m.check().unwrap();
}

#[test]
fn into_iter_both_ends() {
    let m: SmallMap<u32, char> = (0..26u32).map(|i| (i, (b'a' + i as u8) as char)).collect();
    let mut it = m.into_iter();
    assert_eq!(it.next(), Some((0, 'a')));
    assert_eq!(it.next_back(), Some((25, 'z')));
    assert_eq!(it.len(), 24);
    assert_eq!(it.map(|(_, c)| c).collect::<String>(), "bcdefghijklmnopqrstuvwxy");
}

#[test]
fn clone_is_independent() {
    let mut a = IntMap::from([(3, "c"), (1, "a"), (2, "b")]);
    let b = a.clone();
    a.set(4, "d");
    assert_eq!(b.len(), 3);
    assert_eq!(a.len(), 4);
    assert_eq!(format!("{b:?}"), r#"{1: "a", 2: "b", 3: "c"}"#);
}

#[test]
fn custom_comparator() {
    let mut m: gb::OrderedMap<String, usize, _, 11> =
        gb::OrderedMap::with_comparator(ByFn(|a: &String, b: &String| {
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        }));
    for w in ["ccc", "a", "bb", "aa", "b"] {
        m.insert(w.to_string(), w.len());
    }
    assert_eq!(m.keys().collect::<Vec<_>>(), ["a", "b", "aa", "bb", "ccc"]);
    assert_eq!(m.get(&"bb".to_string()), Some(&2));
    m.check().unwrap();
}

#[test]
fn broken_comparator_detected() {
    // Claims every distinct pair is "less", in both directions.
    let mut m: gb::OrderedMap<i32, (), _, 11> =
        gb::OrderedMap::with_comparator(ByFn(|a: &i32, b: &i32| {
            if a == b {
                Ordering::Equal
            } else {
                Ordering::Less
            }
        }));
    for i in 0..5 {
        m.insert(i, ());
    }
    assert_eq!(m.check(), Err(MapError::InvalidComparator));
}

#[test]
fn test_is_this_ub() {
    let mut m = IntMap::new();
    *m.set_default(0, 'a') = 'b';
    assert_eq!(m.item(&0), Ok(&'b'));
    assert_eq!(m.remove(&0), Some('b'));
    assert!(m.is_empty());
}
