//! HTTP listener for push notifications.

use super::deploy::DeployRunner;
use super::dispatcher::dispatch;
use super::errors::{DaemonError, Result};
use super::repo_config::Registry;
use super::validator::{validate, PushNotification};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use log::{info, warn};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub runner: Arc<dyn DeployRunner>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(reject_get).post(receive_push))
        .with_state(state)
}

pub async fn serve(port: u16, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|source| DaemonError::Bind { port, source })?;

    info!("Server started on port {port}");
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}

/// GET /
async fn reject_get() -> Response {
    warn!("ERROR: GET requests not supported");
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": "None shall pass." })),
    )
        .into_response()
}

/// POST /
/// Answers 204 once the payload checks out; the deploy runs after.
async fn receive_push(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: PushNotification = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(error) => {
            warn!("ERROR: could not decode request body - {error}");
            return bad_request();
        }
    };

    let repo = match validate(&payload, &state.registry) {
        Ok(repo) => repo,
        Err(error) => {
            warn!("ERROR: {error}");
            return bad_request();
        }
    };

    info!(
        "user {} pushed to {}",
        payload.pusher_name().as_deref().unwrap_or("<unknown>"),
        repo.url
    );
    dispatch(repo, state.runner.as_ref());

    StatusCode::NO_CONTENT.into_response()
}

fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, "Bad request.").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::deploy::ShellRunner;
    use crate::daemon::repo_config::RepoCfg;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};
    use tower::ServiceExt;

    const URL: &str = "https://example.com/r.git";

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(PathBuf, String)>>);

    impl DeployRunner for Recorder {
        fn run(&self, directory: PathBuf, command: String) {
            self.0.lock().unwrap().push((directory, command));
        }
    }

    impl Recorder {
        fn calls(&self) -> usize {
            self.0.lock().unwrap().len()
        }
    }

    fn registry(path: PathBuf, deploy: &str) -> Arc<Registry> {
        Arc::new(Registry::new(&[RepoCfg {
            url: URL.to_string(),
            path,
            deploy: deploy.to_string(),
            secret: String::new(),
        }]))
    }

    fn app(recorder: &Arc<Recorder>) -> Router {
        create_router(AppState {
            registry: registry(PathBuf::from("/srv/r"), "git pull"),
            runner: recorder.clone(),
        })
    }

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    const VALID: &str = r#"{"repository": {"url": "https://example.com/r.git", "name": "r"}, "pusher": {"name": "ada"}, "ref": "refs/heads/main"}"#;

    #[tokio::test]
    async fn get_is_rejected_without_deploy() {
        let recorder = Arc::new(Recorder::default());
        let response = app(&recorder)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "None shall pass." }));
        assert_eq!(recorder.calls(), 0);
    }

    #[tokio::test]
    async fn valid_push_is_accepted_and_dispatched() {
        let recorder = Arc::new(Recorder::default());
        let response = app(&recorder).oneshot(post(VALID)).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(body_text(response).await.is_empty());
        let calls = recorder.0.lock().unwrap();
        assert_eq!(calls.as_slice(), &[(PathBuf::from("/srv/r"), "git pull".to_string())]);
    }

    #[tokio::test]
    async fn back_to_back_pushes_both_deploy() {
        let recorder = Arc::new(Recorder::default());
        let router = app(&recorder);

        for _ in 0..2 {
            let response = router.clone().oneshot(post(VALID)).await.unwrap();
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
        }
        assert_eq!(recorder.calls(), 2);
    }

    #[tokio::test]
    async fn pusher_shape_does_not_matter() {
        let recorder = Arc::new(Recorder::default());
        let router = app(&recorder);

        for pusher in [r#""ada""#, r#"{"name": 42}"#, r#"{"name": null}"#, "[]"] {
            let body = format!(r#"{{"repository": {{"url": "{URL}"}}, "pusher": {pusher}}}"#);
            let response = router.clone().oneshot(post(&body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::NO_CONTENT, "pusher: {pusher}");
        }
        assert_eq!(recorder.calls(), 4);
    }

    #[tokio::test]
    async fn content_type_is_not_required() {
        let recorder = Arc::new(Recorder::default());
        let router = app(&recorder);

        let bare = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(VALID))
            .unwrap();
        let response = router.clone().oneshot(bare).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let text = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "text/plain")
            .body(Body::from(VALID))
            .unwrap();
        let response = router.oneshot(text).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        assert_eq!(recorder.calls(), 2);
    }

    #[tokio::test]
    async fn unconfigured_repository_is_bad_request() {
        let recorder = Arc::new(Recorder::default());
        let response = app(&recorder)
            .oneshot(post(r#"{"repository": {"url": "https://example.com/x.git"}, "pusher": {"name": "ada"}}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Bad request.");
        assert_eq!(recorder.calls(), 0);
    }

    #[tokio::test]
    async fn malformed_payloads_are_bad_request() {
        let recorder = Arc::new(Recorder::default());
        let router = app(&recorder);

        for body in ["not json", "{\"pusher\": {\"name\": \"ada\"}}", "{\"repository\": \"r\"}", ""] {
            let response = router.clone().oneshot(post(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body:?}");
            assert_eq!(body_text(response).await, "Bad request.");
        }
        assert_eq!(recorder.calls(), 0);
    }

    #[tokio::test]
    async fn response_does_not_wait_for_deploy() {
        let dir = tempfile::tempdir().unwrap();
        let router = create_router(AppState {
            registry: registry(dir.path().to_path_buf(), "sleep 3 && touch done"),
            runner: Arc::new(ShellRunner),
        });

        let started = Instant::now();
        let response = router.oneshot(post(VALID)).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!dir.path().join("done").exists());
    }
}
