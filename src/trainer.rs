use std::{future::Future, time::Duration};

use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{error::TrainerError, types::ExerciseKind};

/// Body of the start/end responses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrainerMessage {
    pub message: String,
}

/// Body of the generate-report response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportResponse {
    pub message: String,
    pub reps: u32,
    pub duration: f64,
    pub calories: f64,
}

impl ReportResponse {
    /// Duration and calories must be finite and non-negative.
    pub fn validate(&self) -> Result<(), TrainerError> {
        for (field, value) in [("duration", self.duration), ("calories", self.calories)] {
            if !value.is_finite() || value < 0.0 {
                return Err(TrainerError::Malformed(format!(
                    "`{field}` must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// The remote pose-estimation service.
pub trait Trainer: Send + Sync {
    fn start(
        &self,
        exercise: ExerciseKind,
    ) -> impl Future<Output = Result<TrainerMessage, TrainerError>> + Send;

    fn end(
        &self,
        exercise: ExerciseKind,
    ) -> impl Future<Output = Result<TrainerMessage, TrainerError>> + Send;

    fn generate_report(
        &self,
        exercise: ExerciseKind,
    ) -> impl Future<Output = Result<ReportResponse, TrainerError>> + Send;

    /// Location of the live MJPEG stream. Never fetched by this crate.
    fn video_feed_url(&self, exercise: ExerciseKind) -> String;
}

/// `Trainer` over the service's JSON-over-GET API.
#[derive(Clone)]
pub struct HttpTrainer {
    base_url: String,
    client: Client,
}

impl HttpTrainer {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TrainerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TrainerError::Transport)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TrainerError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "trainer request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(TrainerError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrainerError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| TrainerError::Malformed(e.to_string()))
    }
}

impl Trainer for HttpTrainer {
    async fn start(&self, exercise: ExerciseKind) -> Result<TrainerMessage, TrainerError> {
        self.get_json(&format!("start-{}", exercise.route_slug())).await
    }

    async fn end(&self, exercise: ExerciseKind) -> Result<TrainerMessage, TrainerError> {
        self.get_json(&format!("end-{}", exercise.route_slug())).await
    }

    async fn generate_report(&self, exercise: ExerciseKind) -> Result<ReportResponse, TrainerError> {
        self.get_json(&format!("generate-{}-report", exercise.route_slug()))
            .await
    }

    fn video_feed_url(&self, exercise: ExerciseKind) -> String {
        format!("{}/video_feed/{}", self.base_url, exercise.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_feed_uses_storage_name() {
        let trainer = HttpTrainer::new("http://127.0.0.1:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            trainer.video_feed_url(ExerciseKind::BicepCurl),
            "http://127.0.0.1:5000/video_feed/bicep_curls"
        );
    }

    #[test]
    fn report_body_decodes() {
        let body = r#"{"message":"Report ready","reps":30,"duration":1200,"calories":150}"#;
        let report: ReportResponse = serde_json::from_str(body).unwrap();
        assert_eq!(report.reps, 30);
        assert_eq!(report.duration, 1200.0);
        assert!(report.validate().is_ok());
    }

    #[test]
    fn negative_calories_are_rejected() {
        let report = ReportResponse {
            message: String::new(),
            reps: 3,
            duration: 10.0,
            calories: -1.0,
        };
        assert!(matches!(report.validate(), Err(TrainerError::Malformed(_))));
    }
}
