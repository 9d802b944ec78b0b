use std::time::Duration;

use lesson_server::config::LessonConfig;

use crate::common::{TestApp, routes};

const LESSON_TEXT: &str = "hello world";

mod create {
    use super::*;

    #[tokio::test]
    async fn owner_can_upload_a_text_lesson() {
        let app = TestApp::spawn().await;
        let token = app.token_for("U1");

        let res = app
            .upload_with_token("abc.txt", LESSON_TEXT.into(), Some("text/plain"), &token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["id"].is_string());
        assert_eq!(res.body["title"], "abc.txt");
        assert_eq!(res.body["total_words"], 2);
        assert!(res.body["created_at"].is_string());
        assert_eq!(app.blob_count(), 1);
        assert_eq!(app.repo.len(), 1);
    }

    #[tokio::test]
    async fn content_type_parameters_and_missing_types_are_accepted() {
        let app = TestApp::spawn().await;
        let token = app.token_for("U1");

        let res = app
            .upload_with_token(
                "a.txt",
                LESSON_TEXT.into(),
                Some("text/plain; charset=utf-8"),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let res = app
            .upload_with_token("b.txt", LESSON_TEXT.into(), None, &token)
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    #[tokio::test]
    async fn requests_without_a_token_are_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::LESSONS).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn cannot_upload_with_a_forged_token() {
        let app = TestApp::spawn().await;
        let forged = lesson_server::utils::jwt::sign("U1", "wrong-secret", chrono::Duration::hours(1))
            .unwrap();

        let res = app
            .upload_with_token("abc.txt", LESSON_TEXT.into(), Some("text/plain"), &forged)
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
        assert_eq!(app.blob_count(), 0);
    }

    #[tokio::test]
    async fn cannot_upload_an_empty_file() {
        let app = TestApp::spawn().await;
        let token = app.token_for("U1");

        let res = app
            .upload_with_token("abc.txt", Vec::new(), Some("text/plain"), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(app.blob_count(), 0);
    }

    #[tokio::test]
    async fn cannot_upload_a_disallowed_content_type() {
        let app = TestApp::spawn().await;
        let token = app.token_for("U1");

        let res = app
            .upload_with_token("slides.pdf", b"%PDF-1.4".to_vec(), Some("application/pdf"), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.repo.is_empty());
    }

    #[tokio::test]
    async fn cannot_upload_a_hidden_or_nested_file_name() {
        let app = TestApp::spawn().await;
        let token = app.token_for("U1");

        for name in [".secret.txt", "dir/abc.txt"] {
            let res = app
                .upload_with_token(name, LESSON_TEXT.into(), Some("text/plain"), &token)
                .await;
            assert_eq!(res.status, 400, "{name}: {}", res.text);
        }
    }

    #[tokio::test]
    async fn cannot_upload_a_file_over_the_size_limit() {
        let app = TestApp::spawn_with(LessonConfig {
            max_upload_size: 16,
            ..Default::default()
        })
        .await;
        let token = app.token_for("U1");

        let res = app
            .upload_with_token("big.txt", vec![b'a'; 17], Some("text/plain"), &token)
            .await;

        assert_eq!(res.status, 413);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(app.blob_count(), 0);
    }

    #[tokio::test]
    async fn invalid_utf8_is_rejected_and_its_blob_removed() {
        let app = TestApp::spawn().await;
        let token = app.token_for("U1");

        let res = app
            .upload_with_token("bad.txt", vec![0xff, 0xfe, 0xfd], Some("text/plain"), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(app.blob_count(), 0);
        assert!(app.repo.is_empty());
    }
}

mod read {
    use super::*;

    #[tokio::test]
    async fn owner_can_fetch_a_lesson() {
        let app = TestApp::spawn().await;
        let token = app.token_for("U1");
        let id = app.create_lesson("abc.txt", LESSON_TEXT, &token).await;

        let res = app.get_with_token(&routes::lesson(&id), &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], id.as_str());
        assert_eq!(res.body["total_words"], 2);
    }

    #[tokio::test]
    async fn other_users_are_forbidden() {
        let app = TestApp::spawn().await;
        let id = app
            .create_lesson("abc.txt", LESSON_TEXT, &app.token_for("U1"))
            .await;
        let intruder = app.token_for("U2");

        let res = app.get_with_token(&routes::lesson(&id), &intruder).await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");

        let res = app
            .get_with_token(&routes::lesson_content(&id), &intruder)
            .await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn hidden_foreign_lessons_look_missing() {
        let app = TestApp::spawn_with(LessonConfig {
            hide_foreign_lessons: true,
            ..Default::default()
        })
        .await;
        let id = app
            .create_lesson("abc.txt", LESSON_TEXT, &app.token_for("U1"))
            .await;

        let res = app
            .get_with_token(&routes::lesson(&id), &app.token_for("U2"))
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids() {
        let app = TestApp::spawn().await;
        let token = app.token_for("U1");

        let res = app
            .get_with_token(
                &routes::lesson("01936f0e-7a4c-7b1e-9d0f-3c2a1b0e9f88"),
                &token,
            )
            .await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");

        let res = app.get_with_token(&routes::lesson("42"), &token).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod list {
    use super::*;

    #[tokio::test]
    async fn lists_only_own_lessons_with_zero_based_pages() {
        let app = TestApp::spawn().await;
        let token = app.token_for("U1");
        for name in ["a.txt", "b.txt", "c.txt"] {
            app.create_lesson(name, LESSON_TEXT, &token).await;
        }
        app.create_lesson("x.txt", LESSON_TEXT, &app.token_for("U2"))
            .await;

        let res = app
            .get_with_token(&format!("{}?page=0&per_page=2", routes::LESSONS), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 2);
        assert_eq!(res.body["pagination"]["page"], 0);
        assert_eq!(res.body["pagination"]["per_page"], 2);
        assert_eq!(res.body["pagination"]["total"], 3);
        assert_eq!(res.body["pagination"]["total_pages"], 2);

        let res = app
            .get_with_token(&format!("{}?page=1&per_page=2", routes::LESSONS), &token)
            .await;
        assert_eq!(res.body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn out_of_range_page_is_empty() {
        let app = TestApp::spawn().await;
        let token = app.token_for("U1");
        app.create_lesson("a.txt", LESSON_TEXT, &token).await;

        for query in ["page=50", "page=100000000000000000&per_page=100"] {
            let res = app
                .get_with_token(&format!("{}?{query}", routes::LESSONS), &token)
                .await;

            assert_eq!(res.status, 200, "{query}: {}", res.text);
            assert!(res.body["data"].as_array().unwrap().is_empty());
            assert_eq!(res.body["pagination"]["total"], 1);
        }
    }

    #[tokio::test]
    async fn invalid_paging_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.token_for("U1");

        for query in ["page=-1", "per_page=0", "per_page=101", "page=abc"] {
            let res = app
                .get_with_token(&format!("{}?{query}", routes::LESSONS), &token)
                .await;
            assert_eq!(res.status, 400, "{query}: {}", res.text);
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
    }
}

mod content {
    use ::common::storage::BlobStore;
    use lesson_server::lesson::LessonRepository;

    use super::*;

    #[tokio::test]
    async fn pages_respect_word_boundaries() {
        let app = TestApp::spawn().await;
        let token = app.token_for("U1");
        let id = app.create_lesson("abc.txt", LESSON_TEXT, &token).await;

        let res = app
            .get_with_token(
                &format!("{}?page=0&per_page=5", routes::lesson_content(&id)),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["chunk"], "hello");
        assert_eq!(res.body["page"], 0);
        assert_eq!(res.body["per_page"], 5);
        assert_eq!(res.body["total_length"], 11);
        assert_eq!(res.body["total_pages"], 3);
        assert_eq!(res.body["is_last"], false);
        assert_eq!(res.body["total_words"], 2);
    }

    #[tokio::test]
    async fn default_page_holds_short_lessons_entirely() {
        let app = TestApp::spawn().await;
        let token = app.token_for("U1");
        let id = app.create_lesson("abc.txt", LESSON_TEXT, &token).await;

        let res = app
            .get_with_token(&routes::lesson_content(&id), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["chunk"], LESSON_TEXT);
        assert_eq!(res.body["per_page"], 1000);
        assert_eq!(res.body["is_last"], true);
    }

    #[tokio::test]
    async fn zero_page_size_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.token_for("U1");
        let id = app.create_lesson("abc.txt", LESSON_TEXT, &token).await;

        let res = app
            .get_with_token(
                &format!("{}?per_page=0", routes::lesson_content(&id)),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn missing_blob_is_reported_as_storage_failure() {
        let app = TestApp::spawn().await;
        let token = app.token_for("U1");
        let id = app.create_lesson("abc.txt", LESSON_TEXT, &token).await;

        let lesson = app
            .repo
            .find_by_id(id.parse().unwrap())
            .await
            .unwrap()
            .unwrap();
        app.blobs
            .delete(&lesson.content.unwrap().storage_key)
            .await
            .unwrap();

        let res = app
            .get_with_token(&routes::lesson_content(&id), &token)
            .await;

        assert_eq!(res.status, 502);
        assert_eq!(res.body["code"], "STORAGE_UNAVAILABLE");
    }
}

mod delete {
    use super::*;

    async fn wait_for_blobs(app: &TestApp, expected: usize) {
        for _ in 0..50 {
            if app.blob_count() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!(
            "expected {expected} blobs, found {}",
            app.blob_count()
        );
    }

    #[tokio::test]
    async fn owner_can_delete_and_blob_is_cleaned_up() {
        let app = TestApp::spawn().await;
        let token = app.token_for("U1");
        let id = app.create_lesson("abc.txt", LESSON_TEXT, &token).await;
        assert_eq!(app.blob_count(), 1);

        let res = app.delete_with_token(&routes::lesson(&id), &token).await;
        assert_eq!(res.status, 204);

        let res = app.get_with_token(&routes::lesson(&id), &token).await;
        assert_eq!(res.status, 404);

        wait_for_blobs(&app, 0).await;
    }

    #[tokio::test]
    async fn other_users_cannot_delete() {
        let app = TestApp::spawn().await;
        let id = app
            .create_lesson("abc.txt", LESSON_TEXT, &app.token_for("U1"))
            .await;

        let res = app
            .delete_with_token(&routes::lesson(&id), &app.token_for("U2"))
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(app.repo.len(), 1);
        assert_eq!(app.blob_count(), 1);
    }

    #[tokio::test]
    async fn deleting_twice_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.token_for("U1");
        let id = app.create_lesson("abc.txt", LESSON_TEXT, &token).await;

        assert_eq!(
            app.delete_with_token(&routes::lesson(&id), &token).await.status,
            204
        );
        let res = app.delete_with_token(&routes::lesson(&id), &token).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod docs {
    use super::*;

    #[tokio::test]
    async fn openapi_document_lists_lesson_routes() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token("/api-docs/openapi.json").await;

        assert_eq!(res.status, 200);
        let paths = res.body["paths"].as_object().unwrap();
        assert!(paths.keys().any(|p| p.starts_with("/api/v1/lessons")));
    }
}
