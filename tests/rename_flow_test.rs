//! End-to-end tests for the rename flow against the real filesystem:
//! session state machine plus scratch-space download/rename/cleanup.

use pretty_assertions::assert_eq;
use std::sync::Arc;

use renamebot::rename::{ConfirmOutcome, ScratchStore, SessionStore};

/// Drives one confirmed rename the way the Confirm handler does: allocate
/// scratch, "download" the given bytes, rename, read the result back.
async fn confirm_and_deliver(
    store: &SessionStore,
    scratch: &ScratchStore,
    user_id: i64,
    bytes: &[u8],
) -> (String, Vec<u8>) {
    let session = match store.take_confirmed(user_id) {
        ConfirmOutcome::Ready(s) => s,
        other => panic!("expected a confirmed session, got {:?}", other),
    };
    let new_name = session.new_name().unwrap().to_string();

    let space = scratch.begin(user_id, &session.extension).await.unwrap();
    fs_err::tokio::write(space.download_path(), bytes).await.unwrap();
    let final_path = space.rename_to(&new_name).await.unwrap();

    let delivered = fs_err::tokio::read(&final_path).await.unwrap();
    (new_name, delivered)
}

#[tokio::test]
async fn round_trip_preserves_name_and_bytes() {
    let tmp = tempfile::tempdir().unwrap();
    let scratch = ScratchStore::init(tmp.path()).await.unwrap();
    let store = SessionStore::new();

    let session = store.begin(1, "file-id-1".into(), Some("report.pdf".into()));
    assert_eq!(session.extension, ".pdf");

    let full = store.choose_name(1, "final version").unwrap();
    assert_eq!(full, "final version.pdf");

    let payload = b"%PDF-1.4 original bytes".to_vec();
    let (name, delivered) = confirm_and_deliver(&store, &scratch, 1, &payload).await;

    assert_eq!(name, "final version.pdf");
    assert_eq!(delivered, payload);
    assert!(store.is_empty());
}

#[tokio::test]
async fn second_confirm_after_success_is_expired() {
    let tmp = tempfile::tempdir().unwrap();
    let scratch = ScratchStore::init(tmp.path()).await.unwrap();
    let store = SessionStore::new();

    store.begin(1, "file-id-1".into(), Some("notes.txt".into()));
    store.choose_name(1, "renamed").unwrap();
    confirm_and_deliver(&store, &scratch, 1, b"content").await;

    assert!(matches!(store.take_confirmed(1), ConfirmOutcome::Expired));
    assert!(!store.cancel(1));
}

#[tokio::test]
async fn text_without_document_creates_no_session() {
    let store = SessionStore::new();
    assert_eq!(store.choose_name(99, "a name"), None);
    assert!(store.is_empty());
}

#[tokio::test]
async fn concurrent_same_extension_confirms_do_not_cross_contaminate() {
    let tmp = tempfile::tempdir().unwrap();
    let scratch = Arc::new(ScratchStore::init(tmp.path()).await.unwrap());
    let store = Arc::new(SessionStore::new());

    // Users A and B both upload a .txt and pick the same new name.
    store.begin(1, "file-a".into(), Some("a.txt".into()));
    store.begin(2, "file-b".into(), Some("b.txt".into()));
    store.choose_name(1, "notes").unwrap();
    store.choose_name(2, "notes").unwrap();

    let task = |user_id: i64, payload: &'static [u8]| {
        let store = Arc::clone(&store);
        let scratch = Arc::clone(&scratch);
        tokio::spawn(async move { confirm_and_deliver(&store, &scratch, user_id, payload).await })
    };

    let (a, b) = tokio::join!(task(1, b"payload of user A"), task(2, b"payload of user B"));
    let (name_a, bytes_a) = a.unwrap();
    let (name_b, bytes_b) = b.unwrap();

    assert_eq!(name_a, "notes.txt");
    assert_eq!(name_b, "notes.txt");
    assert_eq!(bytes_a, b"payload of user A");
    assert_eq!(bytes_b, b"payload of user B");
}

#[tokio::test]
async fn double_tap_confirm_processes_once() {
    let store = Arc::new(SessionStore::new());
    store.begin(1, "file-id".into(), Some("a.txt".into()));
    store.choose_name(1, "b").unwrap();

    let pop = || {
        let store = Arc::clone(&store);
        tokio::spawn(async move { matches!(store.take_confirmed(1), ConfirmOutcome::Ready(_)) })
    };

    let (first, second) = tokio::join!(pop(), pop());
    let winners = [first.unwrap(), second.unwrap()].iter().filter(|&&won| won).count();
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn scratch_directories_are_cleaned_after_delivery() {
    let tmp = tempfile::tempdir().unwrap();
    let scratch = ScratchStore::init(tmp.path().join("downloads")).await.unwrap();
    let store = SessionStore::new();

    store.begin(7, "file-id".into(), Some("data.bin".into()));
    store.choose_name(7, "renamed").unwrap();
    confirm_and_deliver(&store, &scratch, 7, b"\x00\x01\x02").await;

    // The per-request subdirectory is gone once delivery finished.
    let mut entries = fs_err::read_dir(scratch.root()).unwrap();
    assert!(entries.next().is_none());
}
