use async_trait::async_trait;
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;
use vg_core::{ApiError, ValidationApi};
use vg_types::{Coverage, DeleteOutcome, EventNames, LogsPage, StatsSummary, ValidationResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed implementation of the dashboard endpoints for one app.
#[derive(Clone)]
pub struct HttpApi {
    http: reqwest::Client,
    base: Url,
    app_id: String,
}

impl HttpApi {
    pub fn new(mut base: Url, app_id: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(transport)?;
        // Url::join drops the last path segment unless the base ends in a
        // slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http,
            base,
            app_id: app_id.into(),
        })
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    fn endpoint(&self, tail: &str) -> Result<Url, ApiError> {
        self.base
            .join(&format!("app/{}/{}", self.app_id, tail))
            .map_err(|err| ApiError::Endpoint {
                message: err.to_string(),
            })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        tail: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .http
            .get(self.endpoint(tail)?)
            .query(query)
            .send()
            .await
            .map_err(transport)?;
        decode_json(response).await
    }

    async fn post_csv(
        &self,
        tail: &str,
        results: &[ValidationResult],
    ) -> Result<Vec<u8>, ApiError> {
        let response = self
            .http
            .post(self.endpoint(tail)?)
            .json(&serde_json::json!({ "results": results }))
            .send()
            .await
            .map_err(transport)?;
        let response = check_status(response).await?;
        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(transport)
    }
}

#[async_trait]
impl ValidationApi for HttpApi {
    async fn fetch_logs(&self, page: u32, limit: u32) -> Result<LogsPage, ApiError> {
        self.get_json(
            "logs",
            &[("page", page.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    async fn fetch_stats(&self) -> Result<StatsSummary, ApiError> {
        self.get_json("stats", &[]).await
    }

    async fn fetch_coverage(&self) -> Result<Coverage, ApiError> {
        self.get_json("coverage", &[]).await
    }

    async fn fetch_event_names(&self) -> Result<Vec<String>, ApiError> {
        let names: EventNames = self.get_json("event-names", &[]).await?;
        Ok(names.event_names)
    }

    async fn download_report(&self, results: &[ValidationResult]) -> Result<Vec<u8>, ApiError> {
        self.post_csv("download-report", results).await
    }

    async fn download_valid_events(
        &self,
        results: &[ValidationResult],
    ) -> Result<Vec<u8>, ApiError> {
        self.post_csv("download-valid-events", results).await
    }

    async fn delete_logs(&self) -> Result<DeleteOutcome, ApiError> {
        let response = self
            .http
            .post(self.endpoint("delete-logs")?)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        if status.is_success() {
            return serde_json::from_str(&body).map_err(|err| ApiError::Decode {
                message: err.to_string(),
            });
        }
        // Failure bodies still carry the backend's error detail when the
        // endpoint got far enough to produce one.
        match serde_json::from_str::<DeleteOutcome>(&body) {
            Ok(outcome) if outcome.error.is_some() => Ok(outcome),
            _ => Err(ApiError::Status {
                status: status.as_u16(),
                detail: body.trim().to_string(),
            }),
        }
    }
}

fn transport(err: reqwest::Error) -> ApiError {
    ApiError::Transport {
        message: err.to_string(),
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = check_status(response).await?;
    let body = response.text().await.map_err(transport)?;
    serde_json::from_str(&body).map_err(|err| ApiError::Decode {
        message: err.to_string(),
    })
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        detail: detail.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpApi {
        HttpApi::new(Url::parse(base).unwrap(), "app-7").unwrap()
    }

    #[test]
    fn endpoints_nest_under_the_app() {
        let api = api("http://localhost:5000");
        assert_eq!(
            api.endpoint("logs").unwrap().as_str(),
            "http://localhost:5000/app/app-7/logs"
        );
    }

    #[test]
    fn base_path_prefix_is_preserved() {
        let api = api("http://localhost:5000/api");
        assert_eq!(
            api.endpoint("stats").unwrap().as_str(),
            "http://localhost:5000/api/app/app-7/stats"
        );
    }
}
