use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;

use remotemap::{
    decode, encode, in_memory, Entry, Error, KvStore, MemoryStore, RemoteMap, Shape, Slice,
    StoreError, Value,
};

fn abcd() -> Value {
    let fields: BTreeMap<String, i64> = [("a", 0), ("b", 1), ("c", 2), ("d", 3)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    Value::from(fields)
}

fn golden_values() -> BTreeMap<String, Value> {
    [
        ("a", Value::from("hello")),
        ("b", Value::from(true)),
        ("c", Value::from(1i64)),
        ("d", Value::Null),
        ("e", Value::from(1.25)),
        ("f", Value::from(vec![0i64, 1, 2, 3, 4])),
        ("g", abcd()),
        ("h", Value::set_of(["a", "b", "c"])),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn golden() -> RemoteMap {
    let map = in_memory("test");
    map.update(golden_values()).unwrap();
    map
}

fn vals<const N: usize>(items: [Value; N]) -> Vec<Value> {
    items.to_vec()
}

fn scalar(map: &RemoteMap, key: &str) -> Value {
    map.get(key).unwrap().into_scalar().unwrap()
}

fn seq_value(map: &RemoteMap, key: &str) -> Vec<Value> {
    map.get(key).unwrap().into_sequence().unwrap().to_vec().unwrap()
}

// === Root mapping ===

#[test]
fn test_keys_are_prefixed() {
    let map = golden();
    for key in "abcdefgh".chars() {
        assert!(map.store().exists(&format!("test.{}", key)).unwrap());
        assert!(map.contains(&key.to_string()).unwrap());
    }
}

#[test]
fn test_get_item() {
    let map = golden();
    assert_eq!(scalar(&map, "d"), Value::Null);
    assert_eq!(scalar(&map, "a"), Value::from("hello"));
    assert_eq!(scalar(&map, "e"), Value::from(1.25));
    assert!(matches!(map.get("z"), Err(Error::KeyNotFound(ref k)) if k == "z"));
}

#[test]
fn test_materialized_entries_match_golden() {
    let map = golden();
    assert_eq!(map.entries().unwrap(), golden_values());
}

#[test]
fn test_keys() {
    let map = golden();
    let mut keys: Vec<String> = map.keys().unwrap().collect();
    keys.sort();
    assert_eq!(keys, ["a", "b", "c", "d", "e", "f", "g", "h"]);
    assert_eq!(map.len().unwrap(), 8);
}

#[test]
fn test_set_item() {
    let map = golden();
    map.set("a", "hello michael").unwrap();
    assert_eq!(scalar(&map, "a"), Value::from("hello michael"));

    let inserted = map.get_or_insert("i", 1.2).unwrap();
    assert_eq!(inserted.into_scalar().unwrap(), Value::from(1.2));
    assert!(map.contains("i").unwrap());
}

#[test]
fn test_existence_and_double_delete() {
    let map = in_memory("test");
    map.set("z", 1i64).unwrap();
    assert!(map.contains("z").unwrap());

    map.delete("z").unwrap();
    assert!(!map.contains("z").unwrap());
    assert!(matches!(map.delete("z"), Err(Error::KeyNotFound(_))));
}

#[test]
fn test_shape_change_overwrite() {
    let map = golden();

    map.set("g", vec![1i64, 2, 3]).unwrap();
    assert!(matches!(map.get("g").unwrap(), Entry::Sequence(_)));

    map.set("b", vec![1i64, 2, 3]).unwrap();
    assert_eq!(map.get("b").unwrap().shape(), Shape::Sequence);

    map.set("f", "hello").unwrap();
    assert_eq!(scalar(&map, "f"), Value::from("hello"));

    map.set("g", Value::set_of([1i64, 2, 3])).unwrap();
    assert!(matches!(map.get("g").unwrap(), Entry::Set(_)));
}

#[test]
fn test_attribute_access() {
    let map = golden();
    assert_eq!(
        map.attribute("f").unwrap().into_value().unwrap(),
        Value::from(vec![0i64, 1, 2, 3, 4])
    );

    map.set("get", 1i64).unwrap();
    assert_eq!(map.attribute("get").unwrap().into_scalar().unwrap(), Value::from(1i64));

    assert!(matches!(
        map.attribute("other"),
        Err(Error::AttributeNotFound(_))
    ));
}

#[test]
fn test_iteration_is_prefix_scoped() {
    let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
    let test = RemoteMap::new(Arc::clone(&store), "test");
    let testing = RemoteMap::new(Arc::clone(&store), "testing");
    let other = RemoteMap::new(Arc::clone(&store), "other");

    test.update([("a", 1i64), ("b", 2)]).unwrap();
    testing.set("c", 3i64).unwrap();
    other.set("a", 4i64).unwrap();
    store.put("bare", "x".into()).unwrap();

    let mut keys: Vec<String> = test.keys().unwrap().collect();
    keys.sort();
    assert_eq!(keys, ["a", "b"]);
    assert_eq!(test.len().unwrap(), 2);
    assert_eq!(testing.keys().unwrap().collect::<Vec<_>>(), ["c"]);

    // Keys are restartable: a second listing sees later writes.
    test.set("z", 0i64).unwrap();
    assert_eq!(test.keys().unwrap().count(), 3);
}

#[test]
fn test_pop_and_clear() {
    let map = golden();
    assert_eq!(map.pop("g").unwrap(), abcd());
    assert!(!map.contains("g").unwrap());

    map.clear().unwrap();
    assert!(map.is_empty().unwrap());
}

// === Sequences ===

#[test]
fn test_list_get_item() {
    let map = golden();
    let data = map.get("f").unwrap().into_sequence().unwrap();
    assert_eq!(data.get(1).unwrap(), Value::from(1i64));
    assert_eq!(data.get(-1).unwrap(), Value::from(4i64));
    assert!(matches!(
        data.get(10),
        Err(Error::IndexOutOfRange { index: 10, len: 5 })
    ));
}

#[test]
fn test_list_get_slice() {
    let map = golden();
    let data = map.get("f").unwrap().into_sequence().unwrap();
    assert_eq!(data.get_slice(2..).unwrap(), ints(&[2, 3, 4]));
    assert_eq!(data.get_slice(..-2).unwrap(), ints(&[0, 1, 2]));
    assert_eq!(
        data.get_slice(Slice::new(1, 4).with_step(2)).unwrap(),
        ints(&[1, 3])
    );
}

#[test]
fn test_list_contains() {
    let map = golden();
    let data = map.get("f").unwrap().into_sequence().unwrap();
    assert!(data.contains(&Value::from(1i64)).unwrap());
    assert!(!data.contains(&Value::from("a")).unwrap());
}

#[test]
fn test_list_set_item() {
    let map = golden();
    let data = map.get("f").unwrap().into_sequence().unwrap();

    data.set(1, 4i64).unwrap();
    assert_eq!(seq_value(&map, "f"), ints(&[0, 4, 2, 3, 4]));

    data.set(-1, 1i64).unwrap();
    assert_eq!(seq_value(&map, "f"), ints(&[0, 4, 2, 3, 1]));

    assert!(matches!(data.set(10, 10i64), Err(Error::IndexOutOfRange { .. })));
}

#[test]
fn test_list_set_slice() {
    let map = golden();
    let data = map.get("f").unwrap().into_sequence().unwrap();
    let (a, b, c, d) = (
        Value::from("a"),
        Value::from("b"),
        Value::from("c"),
        Value::from("d"),
    );
    let int = |i: i64| Value::from(i);

    data.set_slice(1..3, ["a", "b"]).unwrap();
    assert_eq!(
        seq_value(&map, "f"),
        vals([int(0), a.clone(), b.clone(), int(3), int(4)])
    );

    data.set_slice(1..1, ["c", "d"]).unwrap();
    assert_eq!(
        seq_value(&map, "f"),
        vals([int(0), c, d, a.clone(), b.clone(), int(3), int(4)])
    );

    data.set_slice(.., [1i64, 2, 3]).unwrap();
    assert_eq!(seq_value(&map, "f"), vals([int(1), int(2), int(3)]));

    data.set_slice(Slice::full().with_step(2), ["a", "b"]).unwrap();
    assert_eq!(seq_value(&map, "f"), vals([a, int(2), b]));

    for replacement in [vec![1i64], vec![1, 3, 5]] {
        assert!(matches!(
            data.set_slice(Slice::full().with_step(2), replacement),
            Err(Error::ValueMismatch { expected: 2, .. })
        ));
    }
    assert!(matches!(
        data.set_slice(Slice::full().with_step(-1), [1i64, 3]),
        Err(Error::ValueMismatch {
            expected: 3,
            actual: 2
        })
    ));
    // A rejected strided assignment writes nothing.
    assert_eq!(data.len().unwrap(), 3);
}

#[test]
fn test_list_del_item() {
    let map = golden();
    let data = map.get("f").unwrap().into_sequence().unwrap();

    data.delete(1).unwrap();
    assert_eq!(data.len().unwrap(), 4);

    data.delete(-1).unwrap();
    assert_eq!(seq_value(&map, "f"), ints(&[0, 2, 3]));

    data.delete(0).unwrap();
    assert_eq!(seq_value(&map, "f"), ints(&[2, 3]));

    assert!(matches!(data.delete(10), Err(Error::IndexOutOfRange { .. })));
}

#[test]
fn test_list_del_middle_keeps_order() {
    let map = in_memory("test");
    map.set("l", vec!["a", "b", "c", "d", "e", "f"]).unwrap();
    let data = map.get("l").unwrap().into_sequence().unwrap();

    data.delete(2).unwrap();
    data.delete(-3).unwrap();
    assert_eq!(
        seq_value(&map, "l"),
        vec![Value::from("a"), Value::from("b"), Value::from("e"), Value::from("f")]
    );
}

#[test]
fn test_list_del_slice() {
    let map = golden();
    let data = map.get("f").unwrap().into_sequence().unwrap();

    data.delete_slice(1..1).unwrap();
    assert_eq!(data.len().unwrap(), 5);

    data.delete_slice(Slice::new(1, 5).with_step(2)).unwrap();
    assert_eq!(seq_value(&map, "f"), ints(&[0, 2, 4]));

    data.delete_slice(..).unwrap();
    assert!(!map.contains("f").unwrap());
}

#[test]
fn test_list_insert() {
    let map = golden();
    let data = map.get("f").unwrap().into_sequence().unwrap();
    let int = |i: i64| Value::from(i);
    let s = |x: &str| Value::from(x);

    data.insert(0, "a").unwrap();
    assert!(data
        .equals(&[s("a"), int(0), int(1), int(2), int(3), int(4)])
        .unwrap());

    data.insert(2, "b").unwrap();
    assert!(data
        .equals(&[s("a"), int(0), s("b"), int(1), int(2), int(3), int(4)])
        .unwrap());

    data.insert(10, "c").unwrap();
    assert!(data
        .equals(&[s("a"), int(0), s("b"), int(1), int(2), int(3), int(4), s("c")])
        .unwrap());
}

#[test]
fn test_list_append_pop() {
    let map = golden();
    let data = map.get("f").unwrap().into_sequence().unwrap();
    data.append("a").unwrap();
    assert_eq!(data.pop(-1).unwrap(), Value::from("a"));
    assert_eq!(data.pop(0).unwrap(), Value::from(0i64));
    assert_eq!(data.len().unwrap(), 4);
}

#[test]
fn test_list_lazy_iteration() {
    let map = golden();
    let data = map.get("f").unwrap().into_sequence().unwrap();
    let items: Vec<Value> = data.iter().collect::<Result<_, _>>().unwrap();
    assert_eq!(items, ints(&[0, 1, 2, 3, 4]));

    let mut count = 0;
    for item in &data {
        item.unwrap();
        count += 1;
    }
    assert_eq!(count, 5);
}

// === Mappings ===

#[test]
fn test_hash_contains_and_get() {
    let map = golden();
    let g = map.get("g").unwrap().into_mapping().unwrap();
    assert!(g.contains("a").unwrap());
    assert!(!g.contains("2").unwrap());
    assert_eq!(g.get("b").unwrap(), Value::from(1i64));
    assert_eq!(g.get_opt("c").unwrap(), Some(Value::from(2i64)));
    assert!(matches!(g.get("5"), Err(Error::FieldNotFound(_))));
}

#[test]
fn test_hash_set_item() {
    let map = golden();
    let g = map.get("g").unwrap().into_mapping().unwrap();

    g.set("1", true).unwrap();
    assert_eq!(g.get("1").unwrap(), Value::Bool(true));

    g.set("c", "c").unwrap();
    assert_eq!(g.get("c").unwrap(), Value::from("c"));

    g.set("other", vec![1i64, 2]).unwrap();
    assert_eq!(g.get("other").unwrap(), Value::from(vec![1i64, 2]));
}

#[test]
fn test_hash_del_item() {
    let map = golden();
    let g = map.get("g").unwrap().into_mapping().unwrap();
    g.delete("d").unwrap();
    assert!(!map.get("g").unwrap().into_mapping().unwrap().contains("d").unwrap());
    assert!(matches!(g.delete("5"), Err(Error::FieldNotFound(_))));
}

#[test]
fn test_hash_representation() {
    let map = golden();
    let g = map.get("g").unwrap().into_mapping().unwrap();
    assert_eq!(Value::Map(g.to_map().unwrap()), abcd());

    let mut fields: Vec<String> = g.fields().unwrap().collect();
    fields.sort();
    assert_eq!(fields, ["a", "b", "c", "d"]);
    assert_eq!(g.len().unwrap(), 4);
}

#[test]
fn test_hash_attribute() {
    let map = golden();
    let g = map.get("g").unwrap().into_mapping().unwrap();
    assert_eq!(g.attribute("c").unwrap(), Value::from(2i64));
    assert!(matches!(
        g.attribute("other"),
        Err(Error::AttributeNotFound(_))
    ));
}

// === Sets ===

#[test]
fn test_set_contains() {
    let map = golden();
    let h = map.get("h").unwrap().into_set().unwrap();
    assert!(h.contains(&Value::from("a")).unwrap());
    assert!(!h.contains(&Value::from(5i64)).unwrap());
}

#[test]
fn test_set_representation() {
    let map = golden();
    let h = map.get("h").unwrap().into_set().unwrap();
    assert_eq!(Value::Set(h.to_vec().unwrap()), Value::set_of(["a", "b", "c"]));
}

#[test]
fn test_set_add_and_discard() {
    let map = golden();
    let h = map.get("h").unwrap().into_set().unwrap();

    h.add("a").unwrap();
    assert_eq!(h.len().unwrap(), 3);
    h.add("d").unwrap();
    assert!(h.contains(&Value::from("d")).unwrap());

    h.discard(&Value::from("z")).unwrap();
    assert_eq!(h.len().unwrap(), 4);
    h.discard(&Value::from("b")).unwrap();
    assert_eq!(h.len().unwrap(), 3);
}

#[test]
fn test_set_algebra() {
    let map = golden();
    let h = map.get("h").unwrap().into_set().unwrap();
    let strs = |items: &[&str]| items.iter().map(|s| Value::from(*s)).collect::<Vec<_>>();

    assert!(h.set_equals(&strs(&["a", "b", "c"])).unwrap());
    assert!(h.is_proper_subset(&strs(&["a", "b", "c", "d", "e"])).unwrap());
    assert_eq!(
        Value::Set(h.intersection(&strs(&["a"])).unwrap()),
        Value::set_of(["a"])
    );
    assert_eq!(
        Value::Set(h.union(&strs(&["a", "e"])).unwrap()),
        Value::set_of(["a", "b", "c", "e"])
    );
}

#[test]
fn test_set_pop_and_symmetric_difference() {
    let map = golden();
    let h = map.get("h").unwrap().into_set().unwrap();
    assert_eq!(
        Value::Set(h.symmetric_difference(&[Value::from("a"), Value::from("z")]).unwrap()),
        Value::set_of(["b", "c", "z"])
    );

    let popped = h.pop().unwrap().unwrap();
    assert!(!h.contains(&popped).unwrap());
    h.pop().unwrap();
    h.pop().unwrap();
    assert_eq!(h.pop().unwrap(), None);
    assert!(!map.contains("h").unwrap());
}

#[test]
fn test_reordered_sets_inside_collections() {
    let map = in_memory("test");
    map.set("f", vec![Value::set_of([1i64, 2, 3])]).unwrap();
    map.set("h", Value::set_of([Value::set_of(["x", "y"])])).unwrap();

    let f = map.get("f").unwrap().into_sequence().unwrap();
    assert!(f.contains(&Value::set_of([3i64, 2, 1])).unwrap());

    let h = map.get("h").unwrap().into_set().unwrap();
    assert!(h.contains(&Value::set_of(["y", "x"])).unwrap());
    h.add(Value::set_of(["y", "x"])).unwrap();
    assert_eq!(h.len().unwrap(), 1);
}

#[test]
fn test_views_display_current_contents() {
    let map = golden();
    let f = map.get("f").unwrap().into_sequence().unwrap();
    assert_eq!(f.to_string(), "[0, 1, 2, 3, 4]");
    f.append(5i64).unwrap();
    assert_eq!(f.to_string(), "[0, 1, 2, 3, 4, 5]");

    let g = map.get("g").unwrap().into_mapping().unwrap();
    assert_eq!(g.to_string(), abcd().to_string());
}

// === Store and codec interplay ===

#[test]
fn test_store_errors_propagate_verbatim() {
    let map = golden();
    let bogus = remotemap::SetView::new(map.physical_key("f"), Arc::clone(map.store()));
    match bogus.len() {
        Err(Error::Store(StoreError::WrongType {
            key,
            expected,
            found,
        })) => {
            assert_eq!(key, "test.f");
            assert_eq!(expected, Shape::Set);
            assert_eq!(found, Shape::Sequence);
        }
        other => panic!("expected a wrong-type store error, got {:?}", other),
    }
}

#[test]
fn test_externally_written_scalars_decode_as_is() {
    let map = in_memory("test");
    map.store().put("test.raw", "{not encoded}".into()).unwrap();
    map.store().put("test.bin", vec![0xffu8, 0x00].into()).unwrap();

    assert_eq!(scalar(&map, "raw"), Value::from("{not encoded}"));
    assert_eq!(scalar(&map, "bin"), Value::Bytes(vec![0xff, 0x00]));
}

#[test]
fn test_collection_elements_use_the_codec() {
    let map = in_memory("test");
    map.set("l", vec![Value::from("text"), Value::from(7i64)]).unwrap();

    let raw = map.store().list_range("test.l", 0, -1).unwrap();
    assert_eq!(&raw[0][..], b"text");
    assert_eq!(decode(&raw[1]), Value::from(7i64));
    assert_eq!(raw[1], encode(&Value::from(7i64)));
}

// === Model checks against a local Vec ===

fn slice_strategy() -> impl Strategy<Value = Slice> {
    (
        proptest::option::of(-8i64..8),
        proptest::option::of(-8i64..8),
        prop_oneof![-3i64..0, 1i64..4],
    )
        .prop_map(|(start, stop, step)| Slice {
            start,
            stop,
            step: Some(step),
        })
}

fn seeded(items: &[i64]) -> (RemoteMap, remotemap::SequenceView) {
    let map = in_memory("model");
    let view = remotemap::SequenceView::new(map.physical_key("l"), Arc::clone(map.store()));
    view.extend(items.iter().copied()).unwrap();
    (map, view)
}

fn ints(items: &[i64]) -> Vec<Value> {
    items.iter().copied().map(Value::from).collect()
}

proptest! {
    #[test]
    fn prop_get_slice_matches_local(
        items in prop::collection::vec(any::<i64>(), 0..8),
        slice in slice_strategy(),
    ) {
        let (_map, view) = seeded(&items);
        let expected: Vec<Value> = slice
            .indices(items.len())
            .unwrap()
            .iter()
            .map(|i| Value::from(items[i as usize]))
            .collect();
        prop_assert_eq!(view.get_slice(slice).unwrap(), expected);
    }

    #[test]
    fn prop_contiguous_set_slice_matches_splice(
        items in prop::collection::vec(0i64..100, 0..8),
        start in proptest::option::of(-8i64..8),
        stop in proptest::option::of(-8i64..8),
        replacement in prop::collection::vec(100i64..200, 0..5),
    ) {
        let (_map, view) = seeded(&items);
        let slice = Slice { start, stop, step: None };
        let indices = slice.indices(items.len()).unwrap();

        let mut expected = items.clone();
        let lo = indices.start as usize;
        let hi = indices.stop.max(indices.start) as usize;
        expected.splice(lo..hi, replacement.iter().copied());

        view.set_slice(slice, replacement).unwrap();
        prop_assert_eq!(view.to_vec().unwrap(), ints(&expected));
    }

    #[test]
    fn prop_delete_slice_matches_local(
        items in prop::collection::vec(0i64..100, 0..8),
        slice in slice_strategy(),
    ) {
        let (_map, view) = seeded(&items);
        let doomed: Vec<usize> = slice
            .indices(items.len())
            .unwrap()
            .iter()
            .map(|i| i as usize)
            .collect();
        let expected: Vec<i64> = items
            .iter()
            .enumerate()
            .filter(|(i, _)| !doomed.contains(i))
            .map(|(_, v)| *v)
            .collect();

        view.delete_slice(slice).unwrap();
        prop_assert_eq!(view.to_vec().unwrap(), ints(&expected));
    }

    #[test]
    fn prop_insert_matches_local(
        items in prop::collection::vec(0i64..100, 0..8),
        index in -10i64..10,
    ) {
        let (_map, view) = seeded(&items);
        let len = items.len() as i64;
        let at = if index < 0 { (index + len).max(0) } else { index.min(len) };

        let mut expected = items.clone();
        expected.insert(at as usize, -1);

        view.insert(index, -1i64).unwrap();
        prop_assert_eq!(view.to_vec().unwrap(), ints(&expected));
    }
}
