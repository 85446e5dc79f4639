use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use assert_matches::assert_matches;
use fitpal::{
    error::TrainerError,
    trainer::{HttpTrainer, Trainer},
    types::ExerciseKind,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

/// One-shot HTTP/1.1 responder: every request gets `status` and `body`, and
/// its request path is recorded.
struct StubService {
    addr: String,
    paths: Arc<Mutex<Vec<String>>>,
}

impl StubService {
    async fn serve(status: u16, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let paths = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&paths);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut head = Vec::new();
                let mut chunk = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    head.extend_from_slice(&chunk[..n]);
                }

                let request = String::from_utf8_lossy(&head);
                let path = request.split_whitespace().nth(1).unwrap_or("").to_string();
                seen.lock().unwrap().push(path);

                let reply = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
        });

        Self { addr, paths }
    }

    fn url(&self, prefix: &str) -> String {
        format!("http://{}{}", self.addr, prefix)
    }

    fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

const REPORT_BODY: &str = r#"{"message":"Great job","reps":12,"duration":95.5,"calories":8.25}"#;

fn trainer(base_url: &str) -> HttpTrainer {
    HttpTrainer::new(base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn requests_hit_the_service_routes() {
    let stub = StubService::serve(200, REPORT_BODY).await;
    let trainer = trainer(&stub.url("/"));

    for kind in ExerciseKind::ALL {
        trainer.start(kind).await.unwrap();
        trainer.end(kind).await.unwrap();
        trainer.generate_report(kind).await.unwrap();
    }

    assert_eq!(
        stub.paths(),
        vec![
            "/start-squats",
            "/end-squats",
            "/generate-squats-report",
            "/start-pushups",
            "/end-pushups",
            "/generate-pushups-report",
            "/start-bicep-curls",
            "/end-bicep-curls",
            "/generate-bicep-curls-report",
        ]
    );
}

#[tokio::test]
async fn base_path_is_kept_when_joining_routes() {
    let stub = StubService::serve(200, r#"{"message":"Trainer started"}"#).await;
    let trainer = trainer(&stub.url("/api/v1/"));

    let resp = trainer.start(ExerciseKind::Pushup).await.unwrap();

    assert_eq!(resp.message, "Trainer started");
    assert_eq!(stub.paths(), vec!["/api/v1/start-pushups"]);
}

#[tokio::test]
async fn report_body_is_decoded() {
    let stub = StubService::serve(200, REPORT_BODY).await;

    let report = trainer(&stub.url(""))
        .generate_report(ExerciseKind::BicepCurl)
        .await
        .unwrap();

    assert_eq!(report.message, "Great job");
    assert_eq!(report.reps, 12);
    assert_eq!(report.duration, 95.5);
    assert_eq!(report.calories, 8.25);
}

#[tokio::test]
async fn server_error_becomes_status() {
    let stub = StubService::serve(500, r#"{"error":"camera busy"}"#).await;

    let err = trainer(&stub.url("")).start(ExerciseKind::Squat).await.unwrap_err();

    assert_matches!(err, TrainerError::Status { status: 500, ref url } if url.ends_with("/start-squats"));
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let stub = StubService::serve(200, "<html>not json</html>").await;

    let err = trainer(&stub.url("")).end(ExerciseKind::Squat).await.unwrap_err();

    assert_matches!(err, TrainerError::Malformed(_));
}

#[tokio::test]
async fn report_missing_fields_is_malformed() {
    let stub = StubService::serve(200, r#"{"message":"Trainer ended"}"#).await;

    let err = trainer(&stub.url(""))
        .generate_report(ExerciseKind::Pushup)
        .await
        .unwrap_err();

    assert_matches!(err, TrainerError::Malformed(_));
}

#[tokio::test]
async fn closed_port_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = trainer(&format!("http://{addr}"))
        .start(ExerciseKind::Squat)
        .await
        .unwrap_err();

    assert_matches!(err, TrainerError::Transport(_));
}
