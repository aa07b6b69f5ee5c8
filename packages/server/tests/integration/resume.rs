use ::common::config::StorageAppConfig;
use reqwest::multipart::{Form, Part};

use crate::common::{PDF, TestApp, routes};

const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

mod auth {
    use super::*;

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app.get_anonymous(routes::RESUMES).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["success"], false);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn invalid_token_is_forbidden() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::RESUMES, "not.a.jwt").await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_forbidden() {
        let app = TestApp::spawn().await;
        let forged = jobquest_server::utils::jwt::sign(
            "someone-else",
            "jane@example.com",
            "jobseeker",
            chrono::Duration::hours(1),
        )
        .unwrap();

        let res = app.get(routes::RESUMES, &forged).await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn bearer_header_is_accepted() {
        let app = TestApp::spawn().await;
        let token = app.token_for("jane@example.com");

        let res = app.get_bearer(routes::RESUMES, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["success"], true);
    }
}

mod upload {
    use super::*;

    #[tokio::test]
    async fn pdf_upload_returns_summary() {
        let app = TestApp::spawn().await;
        let token = app.token_for("jane@example.com");

        let res = app
            .upload(&token, "jane cv.pdf", b"%PDF-1.7 body".to_vec(), PDF)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["message"], "Resume uploaded successfully");
        let data = &res.body["data"];
        assert!(data["_id"].as_str().is_some());
        assert_eq!(data["originalName"], "jane cv.pdf");
        assert!(data["filename"].as_str().unwrap().ends_with("-jane cv.pdf"));
        assert_eq!(data["length"], 13);
        assert_eq!(data["contentType"], PDF);
        assert!(data["uploadDate"].as_str().is_some());
    }

    #[tokio::test]
    async fn word_documents_are_accepted() {
        let app = TestApp::spawn().await;
        let token = app.token_for("jane@example.com");

        let doc = app
            .upload(&token, "cv.doc", b"DOC".to_vec(), "application/msword")
            .await;
        let docx = app.upload(&token, "cv.docx", b"DOCX".to_vec(), DOCX).await;

        assert_eq!(doc.status, 200);
        assert_eq!(docx.status, 200);
        assert_eq!(docx.body["data"]["contentType"], DOCX);
    }

    #[tokio::test]
    async fn zip_is_rejected_without_a_record() {
        let app = TestApp::spawn().await;
        let token = app.token_for("jane@example.com");

        let res = app
            .upload(&token, "cv.zip", b"PK\x03\x04".to_vec(), "application/zip")
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(app.memory.as_ref().unwrap().record_counts(), (0, 0));
    }

    #[tokio::test]
    async fn form_without_resume_field_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.token_for("jane@example.com");
        let part = Part::bytes(b"%PDF".to_vec())
            .file_name("cv.pdf")
            .mime_str(PDF)
            .unwrap();

        let res = app
            .upload_form(&token, Form::new().part("document", part))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "No file uploaded");
    }

    #[tokio::test]
    async fn untyped_part_takes_type_from_extension() {
        let app = TestApp::spawn().await;
        let token = app.token_for("jane@example.com");
        let part = Part::bytes(b"%PDF-1.7".to_vec()).file_name("cv.pdf");

        let res = app
            .upload_form(&token, Form::new().part("resume", part))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"]["contentType"], PDF);
    }

    #[tokio::test]
    async fn empty_file_input_is_no_file() {
        let app = TestApp::spawn().await;
        let token = app.token_for("jane@example.com");
        let part = Part::bytes(Vec::new())
            .file_name("")
            .mime_str("application/octet-stream")
            .unwrap();

        let res = app
            .upload_form(&token, Form::new().part("resume", part))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "No file uploaded");
        assert_eq!(app.memory.as_ref().unwrap().record_counts(), (0, 0));
    }

    #[tokio::test]
    async fn empty_file_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.token_for("jane@example.com");

        let res = app.upload(&token, "cv.pdf", Vec::new(), PDF).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "No file uploaded");
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_and_never_listed() {
        let app = TestApp::spawn_with(StorageAppConfig {
            chunk_size: 16 * 1024,
            max_file_size: 64 * 1024,
            ..Default::default()
        })
        .await;
        let token = app.token_for("jane@example.com");

        let res = app
            .upload(&token, "big.pdf", vec![b'x'; 100 * 1024], PDF)
            .await;

        assert_eq!(res.status, 413);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
        let listed = app.get(routes::RESUMES, &token).await;
        assert_eq!(listed.body["data"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn body_over_request_limit_is_payload_too_large() {
        let app = TestApp::spawn_with(StorageAppConfig {
            max_file_size: 16 * 1024,
            ..Default::default()
        })
        .await;
        let token = app.token_for("jane@example.com");

        let res = app
            .upload(&token, "big.pdf", vec![b'x'; 200 * 1024], PDF)
            .await;

        assert_eq!(res.status, 413);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
    }
}

mod list {
    use super::*;

    #[tokio::test]
    async fn lists_only_own_resumes_oldest_first() {
        let app = TestApp::spawn().await;
        let jane = app.token_for("jane@example.com");
        let john = app.token_for("john@example.com");

        let first = app.upload_pdf(&jane, b"first").await;
        let second = app.upload_pdf(&jane, b"second").await;
        app.upload_pdf(&john, b"john's").await;

        let res = app.get(routes::RESUMES, &jane).await;

        assert_eq!(res.status, 200);
        let ids: Vec<&str> = res.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec![first.as_str(), second.as_str()]);
    }
}

mod stream {
    use super::*;

    #[tokio::test]
    async fn view_streams_inline_with_metadata_headers() {
        let app = TestApp::spawn_with(StorageAppConfig {
            chunk_size: 5,
            ..Default::default()
        })
        .await;
        let token = app.token_for("jane@example.com");
        let content = b"%PDF-1.7 spread over several chunks".to_vec();
        let id = app.upload_pdf(&token, &content).await;

        let res = app.get(&routes::view(&id), &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.bytes, content);
        assert_eq!(res.header("content-type"), Some(PDF));
        assert_eq!(
            res.header("content-length"),
            Some(content.len().to_string().as_str())
        );
        assert_eq!(
            res.header("content-disposition"),
            Some("inline; filename=\"cv.pdf\"; filename*=UTF-8''cv.pdf")
        );
        assert!(res.header("etag").is_some());
    }

    #[tokio::test]
    async fn download_is_an_attachment() {
        let app = TestApp::spawn().await;
        let token = app.token_for("jane@example.com");
        let res = app.upload(&token, "cv.docx", b"DOCX".to_vec(), DOCX).await;
        let id = res.body["data"]["_id"].as_str().unwrap().to_string();

        let res = app.get(&routes::download(&id), &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.bytes, b"DOCX");
        assert_eq!(res.header("content-type"), Some(DOCX));
        assert!(
            res.header("content-disposition")
                .unwrap()
                .starts_with("attachment; filename=\"cv.docx\"")
        );
    }

    #[tokio::test]
    async fn matching_etag_is_not_modified() {
        let app = TestApp::spawn().await;
        let token = app.token_for("jane@example.com");
        let id = app.upload_pdf(&token, b"cached").await;

        let first = app.get(&routes::view(&id), &token).await;
        let etag = first.header("etag").unwrap().to_string();
        let second = app
            .get_with_headers(&routes::view(&id), &token, &[("If-None-Match", etag.as_str())])
            .await;

        assert_eq!(second.status, 304);
        assert!(second.bytes.is_empty());
    }

    #[tokio::test]
    async fn foreign_and_missing_ids_look_the_same() {
        let app = TestApp::spawn().await;
        let jane = app.token_for("jane@example.com");
        let john = app.token_for("john@example.com");
        let id = app.upload_pdf(&jane, b"private").await;

        let foreign = app.get(&routes::download(&id), &john).await;
        let missing = app
            .get(&routes::download(&uuid::Uuid::now_v7().to_string()), &john)
            .await;
        let malformed = app.get(&routes::download("not-an-id"), &john).await;

        for res in [&foreign, &missing, &malformed] {
            assert_eq!(res.status, 404);
            assert_eq!(res.body["message"], "File not found or unauthorized.");
        }
        assert_eq!(foreign.body, missing.body);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn delete_then_view_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.token_for("jane@example.com");
        let id = app.upload_pdf(&token, b"to be removed").await;

        let res = app.delete(&routes::resume(&id), &token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["message"], "Resume deleted successfully.");

        let res = app.get(&routes::view(&id), &token).await;
        assert_eq!(res.status, 404);
        assert_eq!(app.memory.as_ref().unwrap().record_counts(), (0, 0));
    }

    #[tokio::test]
    async fn cannot_delete_someone_elses_resume() {
        let app = TestApp::spawn().await;
        let jane = app.token_for("jane@example.com");
        let john = app.token_for("john@example.com");
        let id = app.upload_pdf(&jane, b"keep me").await;

        let res = app.delete(&routes::resume(&id), &john).await;
        assert_eq!(res.status, 404);

        let res = app.get(&routes::view(&id), &jane).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.bytes, b"keep me");
    }
}

mod concurrency {
    use super::*;

    #[tokio::test]
    async fn parallel_uploads_by_one_owner_stay_separate() {
        let app = TestApp::spawn_with(StorageAppConfig {
            chunk_size: 7,
            ..Default::default()
        })
        .await;
        let token = app.token_for("jane@example.com");
        let a = vec![b'a'; 500];
        let b = vec![b'b'; 501];

        let (id_a, id_b) = tokio::join!(app.upload_pdf(&token, &a), app.upload_pdf(&token, &b));

        assert_ne!(id_a, id_b);
        assert_eq!(app.get(&routes::view(&id_a), &token).await.bytes, a);
        assert_eq!(app.get(&routes::view(&id_b), &token).await.bytes, b);
    }
}
