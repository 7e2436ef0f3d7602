//! Contract tests: resolution against an etag-reporting backend, and the
//! hit / miss rules of the cache over both shipped stores.

use std::sync::Arc;

use logcache_core::{
    get_cached, put_cached, Filesystems, KvStore, LogCache, LogResolver, MemoryFileSystem,
    MemoryStore, Scalar, SqliteStore, Table,
};
use serde_json::json;

fn results_table() -> Table {
    Table::new(["sample_id", "epoch", "score", "model"])
        .with_row(vec!["q1".into(), 1i64.into(), 0.75.into(), "m".into()])
        .unwrap()
        .with_row(vec!["q2".into(), 1i64.into(), Scalar::Null, "m".into()])
        .unwrap()
}

async fn bucket() -> (Arc<MemoryFileSystem>, LogResolver) {
    let mem = Arc::new(MemoryFileSystem::new());
    for name in [
        "2024-05-01T10-00-00_mmlu_a1.eval",
        "2024-05-01T11-00-00_gsm8k_b2.eval",
        "nested/2024-05-02T09-00-00_arc_c3.json",
    ] {
        mem.put_object(&format!("s3://evals/run1/{}", name), 100, None)
            .await;
    }
    for name in ["notes.md", "logs.json", "nested/plot.png"] {
        mem.put_object(&format!("s3://evals/run1/{}", name), 1, None)
            .await;
    }
    let resolver = LogResolver::new(Filesystems::new().with_scheme("s3", mem.clone()));
    (mem, resolver)
}

#[tokio::test]
async fn test_resolve_is_idempotent() {
    let (_mem, resolver) = bucket().await;
    let first = resolver.resolve(["s3://evals/run1"]).await.unwrap();
    let second = resolver.resolve(["s3://evals/run1"]).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_directory_expansion_keeps_only_logs_with_their_etags() {
    let (mem, resolver) = bucket().await;
    let resolved = resolver.resolve(["s3://evals/run1/"]).await.unwrap();
    assert_eq!(resolved.len(), 3);

    for log in &resolved {
        let info = logcache_core::FileSystem::info(mem.as_ref(), &log.path)
            .await
            .unwrap();
        assert_eq!(log.etag, info.etag, "etag mismatch for {}", log.path);
        assert!(log.etag.is_some());
    }
}

#[tokio::test]
async fn test_overwritten_object_changes_resolved_etag_and_invalidates() {
    let (mem, resolver) = bucket().await;
    let store = MemoryStore::new();
    let path = "s3://evals/run1/2024-05-01T10-00-00_mmlu_a1.eval";

    let before = resolver.resolve([path]).await.unwrap().remove(0);
    put_cached(&store, &before.path, before.etag.as_deref(), &results_table()).await;
    assert!(get_cached(&store, &before.path, before.etag.as_deref())
        .await
        .is_some());

    mem.put_object(path, 120, None).await;
    let after = resolver.resolve([path]).await.unwrap().remove(0);
    assert_ne!(before.etag, after.etag);
    assert!(get_cached(&store, &after.path, after.etag.as_deref())
        .await
        .is_none());
}

async fn check_store_contract<S: KvStore>(store: &S) {
    let table = results_table();

    // round trip
    put_cached(store, "a.log", Some("E1"), &table).await;
    let cached = get_cached(store, "a.log", Some("E1")).await.unwrap();
    assert_eq!(cached, table);

    // invalidation on change
    assert!(get_cached(store, "a.log", Some("E2")).await.is_none());

    // stale entries are ignored, not removed
    assert!(get_cached(store, "a.log", Some("E1")).await.is_some());

    // absent key
    assert!(get_cached(store, "never-written.log", Some("E1")).await.is_none());
    assert!(get_cached(store, "never-written.log", None).await.is_none());

    // corruption tolerance
    store.put("corrupt.log", "not json at all {").await.unwrap();
    assert!(get_cached(store, "corrupt.log", Some("E1")).await.is_none());
    store.put("wrong-shape.log", "[1, 2, 3]").await.unwrap();
    assert!(get_cached(store, "wrong-shape.log", None).await.is_none());

    // empty tables read back as misses
    put_cached(store, "empty.log", Some("E1"), &Table::new(["a", "b"])).await;
    assert!(store.get("empty.log").await.unwrap().is_some());
    assert!(get_cached(store, "empty.log", Some("E1")).await.is_none());

    // unserializable values never raise and leave the prior entry intact
    let bad = Table::new(["score"]).with_row(vec![f64::NAN.into()]).unwrap();
    put_cached(store, "a.log", Some("E3"), &bad).await;
    assert_eq!(get_cached(store, "a.log", Some("E1")).await, Some(table));
}

#[tokio::test]
async fn test_memory_store_contract() {
    check_store_contract(&MemoryStore::new()).await;
}

#[tokio::test]
async fn test_sqlite_store_contract() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let store = SqliteStore::open(&temp_dir.path().join("cache.db")).unwrap();
    check_store_contract(&store).await;
}

#[tokio::test]
async fn test_heterogeneous_records_fill_nulls() {
    let store = MemoryStore::new();
    let blob = json!({
        "etag": "E1",
        "records": [
            {"id": 1, "score": 0.5},
            {"id": 2, "error": "timeout"}
        ]
    });
    store.put("mixed.log", &blob.to_string()).await.unwrap();

    let table = get_cached(&store, "mixed.log", Some("E1")).await.unwrap();
    assert_eq!(table.columns(), &["id", "score", "error"]);
    assert_eq!(
        table.rows(),
        &[
            vec![Scalar::Int(1), Scalar::Float(0.5), Scalar::Null],
            vec![Scalar::Int(2), Scalar::Null, Scalar::Text("timeout".into())],
        ]
    );
}

#[tokio::test]
async fn test_resolve_then_load_through_cache() {
    let (_mem, resolver) = bucket().await;
    let cache = LogCache::new(SqliteStore::memory().unwrap());

    let logs = resolver.resolve(["s3://evals/run1"]).await.unwrap();
    for _ in 0..2 {
        for log in &logs {
            let table = cache
                .get_or_load(&log.path, log.etag.as_deref(), || async {
                    Ok::<_, String>(results_table())
                })
                .await
                .unwrap();
            assert_eq!(table.num_rows(), 2);
        }
    }

    let stats = cache.stats();
    assert_eq!(stats.misses, 3);
    assert_eq!(stats.hits, 3);
    assert_eq!(stats.writes, 3);
}

#[tokio::test]
async fn test_duplicate_column_table_is_not_cached() {
    let store = MemoryStore::new();
    let table = Table::new(["a", "a"])
        .with_row(vec![1i64.into(), 2i64.into()])
        .unwrap();

    put_cached(&store, "dup.log", Some("E1"), &table).await;
    assert!(store.get("dup.log").await.unwrap().is_none());
    assert!(get_cached(&store, "dup.log", Some("E1")).await.is_none());
}

#[tokio::test]
async fn test_floats_survive_the_cache_bit_for_bit() {
    let store = MemoryStore::new();
    let values = [
        1.0715660391465826e-75,
        0.1 + 0.2,
        f64::MIN_POSITIVE,
        f64::MAX,
        -2.2250738585072014e-308,
        5e-324,
    ];
    let mut table = Table::new(["x"]);
    for v in values {
        table.push_row(vec![v.into()]).unwrap();
    }

    put_cached(&store, "floats.log", Some("E1"), &table).await;
    let cached = get_cached(&store, "floats.log", Some("E1")).await.unwrap();
    for (row, v) in cached.rows().iter().zip(values) {
        match &row[0] {
            Scalar::Float(f) => assert_eq!(f.to_bits(), v.to_bits(), "{} reloaded as {}", v, f),
            other => panic!("expected float for {}, got {:?}", v, other),
        }
    }
}

#[tokio::test]
async fn test_json_scalar_cells_reload_equal() {
    let store = MemoryStore::new();
    let table = Table::new(["n", "s", "z", "nested"])
        .with_row(vec![
            Scalar::Json(json!(5)),
            Scalar::Json(json!("s")),
            Scalar::Json(serde_json::Value::Null),
            Scalar::Json(json!({"k": [1, 2]})),
        ])
        .unwrap();

    put_cached(&store, "json.log", Some("E1"), &table).await;
    let cached = get_cached(&store, "json.log", Some("E1")).await.unwrap();
    assert_eq!(cached, table);
    assert_eq!(cached.rows()[0][0], Scalar::Int(5));
}
