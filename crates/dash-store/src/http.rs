//! Dashboard HTTP API backend.
//!
//! Endpoints, relative to the configured base URL:
//!
//! | operation | request |
//! |---|---|
//! | fetch one study | `GET /study/get/{id}` |
//! | fetch all studies | `GET /study/all` |
//! | write metadata | `POST /study/upload` with the study document |
//! | upload asset | `POST /study/upload-base64-image` with `{path, image_data}` |
//! | delete asset | `POST /study/delete-image` with `{path}` |
//! | delete metadata | `DELETE /study/delete/{id}` |
//! | set enabled flag | `PUT /study/enable` with `{id, enabled, last_modified_time}` |
//! | fetch results | `POST /result/get_all/{id}` |
//!
//! The dashboard API lists no image delete route; `delete-image` is the
//! assumed counterpart of `upload-base64-image`. Only a 404 that carries a
//! JSON body counts as "image already gone". Any other 404 means the route
//! is not served and is reported as [`StoreError::Rejected`].

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dash_config::ApiConfig;
use dash_core::Asset;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use crate::adapter::{RemoteStore, document_id};
use crate::error::StoreError;

#[derive(Serialize)]
struct ImageUpload<'a> {
    path: &'a str,
    image_data: String,
}

#[derive(Serialize)]
struct ImageDelete<'a> {
    path: &'a str,
}

#[derive(Serialize)]
struct EnabledUpdate<'a> {
    id: &'a str,
    enabled: bool,
    last_modified_time: i64,
}

/// Remote store backed by the dashboard HTTP API.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStore {
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the `api` section is unusable.
    pub fn from_config(config: &ApiConfig) -> Result<Self, StoreError> {
        Self::new(config.normalized_base_url()?, config.timeout())
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/study/{endpoint}", self.base_url)
    }

    fn study_url(&self, endpoint: &str, id: &str) -> String {
        self.url(&format!("{endpoint}/{}", urlencoding::encode(id)))
    }

    fn results_url(&self, study_id: &str) -> String {
        format!(
            "{}/result/get_all/{}",
            self.base_url,
            urlencoding::encode(study_id)
        )
    }
}

/// Turn a non-success status into [`StoreError::Rejected`].
///
/// Returns the response unchanged on success.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    if !resp.status().is_success() {
        return Err(StoreError::Rejected {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

/// Accept either a JSON array of studies or an object keyed by study id.
fn study_list(value: serde_json::Value) -> Result<Vec<serde_json::Value>, StoreError> {
    match value {
        serde_json::Value::Array(items) => Ok(items),
        serde_json::Value::Object(map) => Ok(map.into_values().collect()),
        other => Err(StoreError::Parse(format!(
            "expected a list of studies, got {}",
            json_kind(&other)
        ))),
    }
}

/// Accept either a JSON array of results or `{"data": [...]}`.
fn result_list(value: serde_json::Value) -> Result<Vec<serde_json::Value>, StoreError> {
    match value {
        serde_json::Value::Array(items) => Ok(items),
        serde_json::Value::Object(mut map) => match map.remove("data") {
            Some(serde_json::Value::Array(items)) => Ok(items),
            Some(serde_json::Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(StoreError::Parse(format!(
                "expected 'data' to be a list of results, got {}",
                json_kind(&other)
            ))),
        },
        other => Err(StoreError::Parse(format!(
            "expected a list of results, got {}",
            json_kind(&other)
        ))),
    }
}

/// A 404 the API answered with a JSON body: the object itself is missing.
fn is_missing_object(resp: &reqwest::Response) -> bool {
    resp.status() == StatusCode::NOT_FOUND
        && resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"))
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl RemoteStore for HttpStore {
    async fn upload_asset(&self, asset: &Asset) -> Result<(), StoreError> {
        debug!(path = %asset.path, bytes = asset.payload.len(), "http: upload asset");
        let body = ImageUpload {
            path: &asset.path,
            image_data: STANDARD.encode(&asset.payload),
        };
        let resp = self
            .client
            .post(self.url("upload-base64-image"))
            .json(&body)
            .send()
            .await?;
        check_response(resp).await?;
        Ok(())
    }

    async fn delete_asset(&self, path: &str) -> Result<(), StoreError> {
        debug!(path, "http: delete asset");
        let resp = self
            .client
            .post(self.url("delete-image"))
            .json(&ImageDelete { path })
            .send()
            .await?;
        if is_missing_object(&resp) {
            debug!(path, "http: image already absent");
            return Ok(());
        }
        check_response(resp).await?;
        Ok(())
    }

    async fn fetch_study(&self, id: &str) -> Result<serde_json::Value, StoreError> {
        debug!(id, "http: fetch study");
        let resp = self.client.get(self.study_url("get", id)).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let resp = check_response(resp).await?;
        let value: serde_json::Value = resp.json().await?;
        if value.is_null() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(value)
    }

    async fn fetch_all_studies(&self) -> Result<Vec<serde_json::Value>, StoreError> {
        debug!("http: fetch all studies");
        let resp = self.client.get(self.url("all")).send().await?;
        let resp = check_response(resp).await?;
        study_list(resp.json().await?)
    }

    async fn write_study_metadata(&self, document: &serde_json::Value) -> Result<(), StoreError> {
        let id = document_id(document)?;
        debug!(id, "http: write study metadata");
        let resp = self
            .client
            .post(self.url("upload"))
            .json(document)
            .send()
            .await?;
        check_response(resp).await?;
        Ok(())
    }

    async fn delete_study_metadata(&self, id: &str) -> Result<(), StoreError> {
        debug!(id, "http: delete study metadata");
        let resp = self
            .client
            .delete(self.study_url("delete", id))
            .send()
            .await?;
        check_response(resp).await?;
        Ok(())
    }

    async fn update_study_enabled(
        &self,
        id: &str,
        enabled: bool,
        last_modified_time: i64,
    ) -> Result<(), StoreError> {
        debug!(id, enabled, "http: update study enabled");
        let body = EnabledUpdate {
            id,
            enabled,
            last_modified_time,
        };
        let resp = self.client.put(self.url("enable")).json(&body).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.to_string()));
        }
        check_response(resp).await?;
        Ok(())
    }

    async fn fetch_results(&self, study_id: &str) -> Result<Vec<serde_json::Value>, StoreError> {
        debug!(study_id, "http: fetch results");
        let resp = self.client.post(self.results_url(study_id)).send().await?;
        let resp = check_response(resp).await?;
        result_list(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mock_response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    fn json_response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .header("content-type", "application/json; charset=utf-8")
                .body(body)
                .unwrap(),
        )
    }

    fn store() -> HttpStore {
        HttpStore::new("http://localhost:8080/", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn urls_are_built_from_trimmed_base() {
        let store = store();
        assert_eq!(store.base_url(), "http://localhost:8080");
        assert_eq!(store.url("all"), "http://localhost:8080/study/all");
        assert_eq!(
            store.study_url("get", "a b/c"),
            "http://localhost:8080/study/get/a%20b%2Fc"
        );
        assert_eq!(store.url("enable"), "http://localhost:8080/study/enable");
        assert_eq!(
            store.results_url("study 1"),
            "http://localhost:8080/result/get_all/study%201"
        );
    }

    #[test]
    fn enabled_update_body_uses_wire_names() {
        let body = EnabledUpdate {
            id: "study-1",
            enabled: false,
            last_modified_time: 1_700_000_000_000,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "id": "study-1",
                "enabled": false,
                "last_modified_time": 1_700_000_000_000_i64
            })
        );
    }

    #[test]
    fn only_a_json_404_means_the_image_is_gone() {
        assert!(is_missing_object(&json_response(404, r#"{"error": "no such image"}"#)));
        assert!(!is_missing_object(&mock_response(404, "<h1>Not Found</h1>")));
        assert!(!is_missing_object(&json_response(500, "{}")));
    }

    #[tokio::test]
    async fn unserved_route_404_is_rejected() {
        let err = check_response(mock_response(404, "Not Found")).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Rejected {
                status: 404,
                message: "Not Found".into()
            }
        );
    }

    #[test]
    fn result_list_accepts_array_and_data_wrapper() {
        let wrapped = result_list(serde_json::json!({"data": [{"id": "r1"}]})).unwrap();
        assert_eq!(wrapped, vec![serde_json::json!({"id": "r1"})]);
        assert_eq!(result_list(serde_json::json!([{}, {}])).unwrap().len(), 2);
        assert!(result_list(serde_json::json!({"data": null})).unwrap().is_empty());
        assert!(matches!(
            result_list(serde_json::json!({"data": 3})),
            Err(StoreError::Parse(_))
        ));
    }

    #[test]
    fn from_config_rejects_empty_base_url() {
        let config = ApiConfig {
            base_url: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            HttpStore::from_config(&config),
            Err(StoreError::Config(_))
        ));
    }

    #[test]
    fn image_upload_body_uses_wire_names() {
        let body = ImageUpload {
            path: "s/p-1.png",
            image_data: STANDARD.encode(b"abc"),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"path": "s/p-1.png", "image_data": "YWJj"})
        );
    }

    #[tokio::test]
    async fn check_response_passes_success() {
        let resp = check_response(mock_response(200, "{}")).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn check_response_maps_failure_with_body() {
        let err = check_response(mock_response(500, "boom")).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Rejected {
                status: 500,
                message: "boom".into()
            }
        );
    }

    #[test]
    fn study_list_accepts_array_and_keyed_object() {
        let list = study_list(serde_json::json!([{"id": "a"}, {"id": "b"}])).unwrap();
        assert_eq!(list.len(), 2);
        let keyed = study_list(serde_json::json!({"a": {"id": "a"}})).unwrap();
        assert_eq!(keyed, vec![serde_json::json!({"id": "a"})]);
        let err = study_list(serde_json::json!("nope")).unwrap_err();
        assert_eq!(
            err,
            StoreError::Parse("expected a list of studies, got a string".into())
        );
    }
}
