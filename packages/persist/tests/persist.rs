use depot_core::{define_setup_store, define_store, Members, Options, Registry};
use depot_persist::{Bytes, DiskKv, KvStore, MemoryKv, PersistPlugin};
use depot_value::Value;
use serde_json::json;

fn counter() -> depot_core::StoreDefinition {
    define_store(
        "counter",
        Options::new().state(|| json!({"count": 0, "label": "fresh"})),
    )
}

fn saved(kv: &MemoryKv, key: &str) -> Option<serde_json::Value> {
    let mut kv = kv.clone();
    kv.get(key)
        .unwrap()
        .map(|data| serde_json::from_slice(&data).unwrap())
}

#[test]
fn saves_on_change_not_on_build() {
    let kv = MemoryKv::new();
    let registry = Registry::new();
    registry.use_plugin(PersistPlugin::new(kv.clone()));

    let store = counter().use_store(&registry).unwrap();
    assert!(kv.is_empty());

    store.patch(json!({"count": 5})).unwrap();
    assert_eq!(saved(&kv, "counter"), Some(json!({"count": 5, "label": "fresh"})));
}

#[test]
fn restores_into_a_new_registry() {
    let kv = MemoryKv::new();
    {
        let registry = Registry::new();
        registry.use_plugin(PersistPlugin::new(kv.clone()));
        let store = counter().use_store(&registry).unwrap();
        store.set("count", 9).unwrap();
    }

    let registry = Registry::new();
    registry.use_plugin(PersistPlugin::new(kv.clone()));
    let store = counter().use_store(&registry).unwrap();
    assert_eq!(store.get("count"), Some(Value::Integer(9)));
    assert_eq!(store.get("label"), Some(Value::from("fresh")));
}

#[test]
fn restore_does_not_rewrite_snapshot() {
    let mut kv = MemoryKv::new();
    kv.set("counter", Bytes::from_static(br#"{"count": 4}"#)).unwrap();

    let registry = Registry::new();
    registry.use_plugin(PersistPlugin::new(kv.clone()));
    let store = counter().use_store(&registry).unwrap();

    assert_eq!(store.get("count"), Some(Value::Integer(4)));
    // Still the hand-written bytes: loading happened before subscribing.
    assert_eq!(
        kv.get("counter").unwrap(),
        Some(Bytes::from_static(br#"{"count": 4}"#))
    );
}

#[test]
fn corrupt_snapshot_leaves_store_usable() {
    let mut kv = MemoryKv::new();
    kv.set("counter", Bytes::from_static(b"{broken")).unwrap();

    let registry = Registry::new();
    registry.use_plugin(PersistPlugin::new(kv.clone()));
    let store = counter().use_store(&registry).unwrap();
    assert_eq!(store.get("count"), Some(Value::Integer(0)));

    store.set("count", 1).unwrap();
    assert_eq!(saved(&kv, "counter"), Some(json!({"count": 1, "label": "fresh"})));
}

#[test]
fn setup_stores_persist_too() {
    let kv = MemoryKv::new();
    let registry = Registry::new();
    registry.use_plugin(PersistPlugin::new(kv.clone()).with_prefix("depot_"));

    let store = define_setup_store("prefs", || Members::new().state("theme", "light"))
        .use_store(&registry)
        .unwrap();
    store.set("theme", "dark").unwrap();
    assert_eq!(saved(&kv, "depot_prefs"), Some(json!({"theme": "dark"})));
}

#[test]
fn disk_snapshots_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let registry = Registry::new();
        registry.use_plugin(PersistPlugin::new(DiskKv::new(dir.path()).unwrap()));
        counter()
            .use_store(&registry)
            .unwrap()
            .patch(json!({"label": "saved"}))
            .unwrap();
    }

    let registry = Registry::new();
    registry.use_plugin(PersistPlugin::new(DiskKv::new(dir.path()).unwrap()));
    let store = counter().use_store(&registry).unwrap();
    assert_eq!(store.get("label"), Some(Value::from("saved")));
}

#[test]
fn hyphenated_ids_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let settings = || {
        define_store(
            "user-settings",
            Options::new().state(|| json!({"theme": "light"})),
        )
    };
    {
        let registry = Registry::new();
        registry.use_plugin(PersistPlugin::new(DiskKv::new(dir.path()).unwrap()));
        settings()
            .use_store(&registry)
            .unwrap()
            .patch(json!({"theme": "dark"}))
            .unwrap();
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

    let registry = Registry::new();
    registry.use_plugin(PersistPlugin::new(DiskKv::new(dir.path()).unwrap()));
    let store = settings().use_store(&registry).unwrap();
    assert_eq!(store.get("theme"), Some(Value::from("dark")));
}
