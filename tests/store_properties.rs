//! Store property tests
//!
//! End-to-end properties of the paste store:
//! - ids are unique across the store's lifetime
//! - concurrent creations are never lost
//! - readers never observe a partial record
//! - acknowledged records survive a restart

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;

use pastebox::store::{PasteStore, StoreError, Upload};
use tempfile::TempDir;

fn open_store(temp: &TempDir) -> PasteStore {
    PasteStore::open(temp.path(), 10 * 1024 * 1024).unwrap()
}

fn upload(name: &str, mime: &str, data: &[u8]) -> Upload {
    Upload {
        data: data.to_vec(),
        original_name: name.to_string(),
        mime_type: mime.to_string(),
    }
}

// =============================================================================
// Uniqueness
// =============================================================================

#[test]
fn test_ids_unique_across_lifetime() {
    let temp = TempDir::new().unwrap();
    let store = open_store(&temp);

    let mut ids = HashSet::new();
    for i in 0..200 {
        let id = store.create(Some(format!("paste {}", i)), None).unwrap();
        assert!(ids.insert(id), "duplicate id returned");
    }
}

// =============================================================================
// No lost updates
// =============================================================================

#[test]
fn test_concurrent_creates_none_lost() {
    const WRITERS: usize = 100;

    let temp = TempDir::new().unwrap();
    let store = Arc::new(open_store(&temp));

    let mut handles = Vec::new();
    for i in 0..WRITERS {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            store.create(Some(format!("payload {}", i)), None).unwrap()
        }));
    }

    let ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let distinct: HashSet<_> = ids.iter().cloned().collect();
    assert_eq!(distinct.len(), WRITERS);
    assert_eq!(store.record_count(), WRITERS);

    // Every acknowledged creation is retrievable with its own payload
    let mut payloads = HashSet::new();
    for id in &ids {
        let record = store.get(id).unwrap();
        assert_eq!(&record.id, id);
        payloads.insert(record.text.unwrap());
    }
    assert_eq!(payloads.len(), WRITERS);
}

// =============================================================================
// Atomic visibility
// =============================================================================

#[test]
fn test_concurrent_readers_see_whole_records_only() {
    const WRITERS: usize = 20;
    const READERS: usize = 4;

    let temp = TempDir::new().unwrap();
    let store = Arc::new(open_store(&temp));
    let committed: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    // Seed one record so readers always have work
    committed
        .lock()
        .unwrap()
        .push(store.create(Some("seed".to_string()), None).unwrap());

    let mut handles = Vec::new();

    for i in 0..WRITERS {
        let store = Arc::clone(&store);
        let committed = Arc::clone(&committed);
        handles.push(thread::spawn(move || {
            let id = store
                .create(
                    Some(format!("text {}", i)),
                    Some(upload("blob.bin", "application/octet-stream", &[i as u8; 32])),
                )
                .unwrap();
            committed.lock().unwrap().push(id);
        }));
    }

    for _ in 0..READERS {
        let store = Arc::clone(&store);
        let committed = Arc::clone(&committed);
        handles.push(thread::spawn(move || {
            for _ in 0..200 {
                let snapshot: Vec<String> = committed.lock().unwrap().clone();
                for id in snapshot {
                    // An id only enters the list after its create returned,
                    // so the lookup must succeed and the record must be whole
                    let record = store.get(&id).unwrap();
                    assert_eq!(record.id, id);
                    assert!(record.text.is_some() || record.blob.is_some());
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.record_count(), WRITERS + 1);
}

// =============================================================================
// Durability
// =============================================================================

#[test]
fn test_records_survive_restart() {
    let temp = TempDir::new().unwrap();

    let (text_id, blob_id, storage_key) = {
        let store = open_store(&temp);
        let text_id = store.create(Some("survives".to_string()), None).unwrap();
        let blob_id = store
            .create(None, Some(upload("photo.png", "image/png", b"PNGDATA")))
            .unwrap();
        let storage_key = store.get(&blob_id).unwrap().blob.unwrap().storage_key;
        (text_id, blob_id, storage_key)
    };

    // Fresh store instance over the same data directory
    let store = open_store(&temp);

    let text_record = store.get(&text_id).unwrap();
    assert_eq!(text_record.text.as_deref(), Some("survives"));

    let blob_record = store.get(&blob_id).unwrap();
    let blob = blob_record.blob.unwrap();
    assert_eq!(blob.storage_key, storage_key);
    assert_eq!(blob.original_name, "photo.png");
    assert_eq!(store.read_blob(&storage_key).unwrap(), b"PNGDATA");
}

// =============================================================================
// Round trips and rejections
// =============================================================================

#[test]
fn test_text_round_trip() {
    let temp = TempDir::new().unwrap();
    let store = open_store(&temp);

    let id = store.create(Some("hello".to_string()), None).unwrap();
    let record = store.get(&id).unwrap();

    assert_eq!(record.text.as_deref(), Some("hello"));
    assert!(record.blob.is_none());
}

#[test]
fn test_attachment_round_trip() {
    let temp = TempDir::new().unwrap();
    let store = open_store(&temp);

    let payload: Vec<u8> = (0u16..512).map(|i| (i % 251) as u8).collect();
    let id = store
        .create(None, Some(upload("data.bin", "application/x-custom", &payload)))
        .unwrap();

    let blob = store.get(&id).unwrap().blob.unwrap();
    assert_eq!(blob.mime_type, "application/x-custom");
    assert_eq!(blob.original_name, "data.bin");
    assert_eq!(blob.size_bytes, payload.len() as u64);
    assert_eq!(store.read_blob(&blob.storage_key).unwrap(), payload);
}

#[test]
fn test_empty_submission_commits_nothing() {
    let temp = TempDir::new().unwrap();
    let store = open_store(&temp);

    assert!(matches!(
        store.create(None, None),
        Err(StoreError::EmptyContent)
    ));
    assert_eq!(store.record_count(), 0);

    // A restart still sees an empty store
    drop(store);
    let store = open_store(&temp);
    assert_eq!(store.record_count(), 0);
}

#[test]
fn test_unknown_id_not_found() {
    let temp = TempDir::new().unwrap();
    let store = open_store(&temp);

    assert!(matches!(
        store.get("nonexistent"),
        Err(StoreError::NotFound(_))
    ));
}
