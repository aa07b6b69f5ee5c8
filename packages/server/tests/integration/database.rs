use ::common::storage::{ChunkStore, FileState, NewFile, StorageError};
use chrono::Utc;
use futures::TryStreamExt;
use uuid::Uuid;

use jobquest_server::store::DatabaseChunkStore;

use crate::common::{PDF, TestApp, routes, sqlite_db};

fn new_file(owner: &str) -> NewFile {
    NewFile {
        owner: owner.into(),
        filename: "1700000000000-cv.pdf".into(),
        original_name: "cv.pdf".into(),
        content_type: PDF.into(),
        chunk_size: 4,
        upload_date: Utc::now(),
    }
}

async fn store() -> DatabaseChunkStore {
    DatabaseChunkStore::new(sqlite_db().await)
}

mod chunk_store {
    use super::*;

    #[tokio::test]
    async fn pending_file_is_invisible_until_completed() {
        let store = store().await;
        let meta = store.begin_upload(new_file("jane@example.com")).await.unwrap();
        store.write_chunk(meta.id, 0, b"abcd".to_vec()).await.unwrap();
        store.write_chunk(meta.id, 1, b"ef".to_vec()).await.unwrap();

        assert!(store.find_file(meta.id).await.unwrap().is_none());
        assert!(store.list_files("jane@example.com").await.unwrap().is_empty());
        assert!(matches!(
            store.read_chunks_ordered(meta.id).await,
            Err(StorageError::NotFound(_))
        ));

        let done = store.complete_upload(meta.id, 6, "abc123").await.unwrap();
        assert_eq!(done.state, FileState::Complete);
        assert_eq!(done.length, 6);
        assert_eq!(done.chunk_size, 4);
        assert_eq!(done.checksum.as_deref(), Some("abc123"));
        assert_eq!(store.find_file(meta.id).await.unwrap(), Some(done));
    }

    #[tokio::test]
    async fn completing_twice_fails() {
        let store = store().await;
        let meta = store.begin_upload(new_file("jane@example.com")).await.unwrap();
        store.write_chunk(meta.id, 0, b"ab".to_vec()).await.unwrap();
        store.complete_upload(meta.id, 2, "x").await.unwrap();

        assert!(matches!(
            store.complete_upload(meta.id, 2, "x").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.complete_upload(Uuid::now_v7(), 2, "x").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn disallowed_type_creates_nothing() {
        let store = store().await;
        let mut file = new_file("jane@example.com");
        file.content_type = "application/zip".into();

        assert!(matches!(
            store.begin_upload(file).await,
            Err(StorageError::InvalidContentType(_))
        ));
    }

    #[tokio::test]
    async fn chunks_stream_in_order() {
        let store = store().await;
        let meta = store.begin_upload(new_file("jane@example.com")).await.unwrap();
        let content = b"0123456789";
        // Written out of order; reads follow the sequence number.
        for n in [2u32, 0, 1] {
            let start = n as usize * 4;
            let end = (start + 4).min(content.len());
            store
                .write_chunk(meta.id, n, content[start..end].to_vec())
                .await
                .unwrap();
        }
        store.complete_upload(meta.id, 10, "x").await.unwrap();

        let chunks: Vec<_> = store
            .read_chunks_ordered(meta.id)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(chunks.iter().map(|c| c.n).collect::<Vec<_>>(), vec![0, 1, 2]);
        let joined: Vec<u8> = chunks.into_iter().flat_map(|c| c.data).collect();
        assert_eq!(joined, content);
    }

    #[tokio::test]
    async fn list_is_scoped_to_owner_and_ordered() {
        let store = store().await;
        let mut ids = Vec::new();
        for owner in ["jane@example.com", "john@example.com", "jane@example.com"] {
            let meta = store.begin_upload(new_file(owner)).await.unwrap();
            store.write_chunk(meta.id, 0, b"cv".to_vec()).await.unwrap();
            store.complete_upload(meta.id, 2, "x").await.unwrap();
            ids.push(meta.id);
        }

        let listed: Vec<Uuid> = store
            .list_files("jane@example.com")
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();

        assert_eq!(listed, vec![ids[0], ids[2]]);
    }

    #[tokio::test]
    async fn delete_removes_chunks_and_record() {
        let store = store().await;
        let meta = store.begin_upload(new_file("jane@example.com")).await.unwrap();
        store.write_chunk(meta.id, 0, b"abcd".to_vec()).await.unwrap();
        store.write_chunk(meta.id, 1, b"e".to_vec()).await.unwrap();
        store.complete_upload(meta.id, 5, "x").await.unwrap();

        store.delete_file(meta.id).await.unwrap();

        assert!(store.find_file(meta.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete_file(meta.id).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_during_read_truncates_stream() {
        let store = store().await;
        let meta = store.begin_upload(new_file("jane@example.com")).await.unwrap();
        store.write_chunk(meta.id, 0, b"abcd".to_vec()).await.unwrap();
        store.write_chunk(meta.id, 1, b"efgh".to_vec()).await.unwrap();
        store.complete_upload(meta.id, 8, "x").await.unwrap();

        let mut stream = store.read_chunks_ordered(meta.id).await.unwrap();
        assert_eq!(stream.try_next().await.unwrap().unwrap().n, 0);

        store.delete_file(meta.id).await.unwrap();

        assert!(matches!(
            stream.try_next().await,
            Err(StorageError::NotFound(_))
        ));
    }
}

mod api {
    use super::*;

    #[tokio::test]
    async fn upload_view_delete_round_trip() {
        let app = TestApp::spawn_with_database().await;
        let token = app.token_for("jane@example.com");
        let content = vec![42u8; 300 * 1024];

        let id = app.upload_pdf(&token, &content).await;

        let listed = app.get(routes::RESUMES, &token).await;
        assert_eq!(listed.body["data"][0]["_id"], id.as_str());
        assert_eq!(listed.body["data"][0]["length"], 300 * 1024);

        let view = app.get(&routes::download(&id), &token).await;
        assert_eq!(view.status, 200);
        assert_eq!(view.bytes, content);

        let other = app.token_for("john@example.com");
        assert_eq!(app.get(&routes::view(&id), &other).await.status, 404);

        assert_eq!(app.delete(&routes::resume(&id), &token).await.status, 200);
        assert_eq!(app.get(&routes::view(&id), &token).await.status, 404);
    }
}
