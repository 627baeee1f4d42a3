use super::*;

#[test]
fn columns_are_independent_per_type() {
    let mut store = SignalStore::default();
    let n = store.create(1.5);
    let c = store.create(Color::WHITE);
    let t = store.create("hello".to_string());

    assert_eq!(n.index(), 0);
    assert_eq!(c.index(), 0);
    assert_eq!(*store.get(n).unwrap(), 1.5);
    assert_eq!(*store.get(c).unwrap(), Color::WHITE);
    assert_eq!(store.get(t).unwrap(), "hello");
}

#[test]
fn set_replaces_value() {
    let mut store = SignalStore::default();
    let v = store.create(Vec2::new(1.0, 2.0));
    store.set(v, Vec2::new(3.0, 4.0)).unwrap();
    assert_eq!(*store.get(v).unwrap(), Vec2::new(3.0, 4.0));
}

#[test]
fn foreign_handles_are_rejected() {
    let mut a = SignalStore::default();
    let b = SignalStore::default();
    let n = a.create(0.0);
    assert!(b.get(n).is_err());
}
