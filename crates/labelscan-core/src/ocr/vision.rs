//! Google Cloud Vision text detection over REST.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::TextRecognizer;

/// Recognizer backed by the Cloud Vision `images:annotate` endpoint.
pub struct VisionRecognizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl VisionRecognizer {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Build from configuration. Requires `vision_api_key`.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        let api_key = config
            .vision_api_key
            .clone()
            .ok_or_else(|| OcrError::ModelLoad("vision_api_key is not set".to_string()))?;
        Self::new(
            config.vision_endpoint.clone(),
            api_key,
            Duration::from_secs(config.request_timeout_secs),
        )
    }
}

#[derive(Serialize)]
struct AnnotateRequest<'a> {
    requests: [AnnotateImageRequest<'a>; 1],
}

#[derive(Serialize)]
struct AnnotateImageRequest<'a> {
    image: ImageContent,
    features: [Feature<'a>; 1],
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
struct Feature<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    error: Option<Status>,
}

#[derive(Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct Status {
    #[serde(default)]
    message: String,
}

/// Turn an annotate response body into recognized text.
///
/// The first annotation carries the whole detected text block.
fn text_from_response(body: AnnotateResponse) -> Result<Option<String>, OcrError> {
    let Some(response) = body.responses.into_iter().next() else {
        return Err(OcrError::Response("empty responses array".to_string()));
    };

    if let Some(status) = response.error {
        return Err(OcrError::Recognition(status.message));
    }

    Ok(response
        .text_annotations
        .into_iter()
        .next()
        .map(|a| a.description.trim().to_string())
        .filter(|text| !text.is_empty()))
}

#[async_trait]
impl TextRecognizer for VisionRecognizer {
    fn name(&self) -> &str {
        "cloud-vision"
    }

    async fn recognize(&self, image: &[u8]) -> Result<Option<String>, OcrError> {
        info!("Sending {} byte image to Cloud Vision", image.len());

        let request = AnnotateRequest {
            requests: [AnnotateImageRequest {
                image: ImageContent {
                    content: STANDARD.encode(image),
                },
                features: [Feature {
                    kind: "TEXT_DETECTION",
                }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Request(format!("HTTP {}: {}", status, body)));
        }

        let body: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| OcrError::Response(e.to_string()))?;

        let text = text_from_response(body)?;
        debug!(
            "Cloud Vision returned {} characters",
            text.as_ref().map_or(0, |t| t.len())
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Option<String>, OcrError> {
        text_from_response(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_first_annotation_is_full_text() {
        let text = parse(
            r#"{"responses":[{"textAnnotations":[
                {"description":"  OS: Windows 10\nSerial: ABC123\n"},
                {"description":"OS:"}
            ]}]}"#,
        )
        .unwrap();

        assert_eq!(text.as_deref(), Some("OS: Windows 10\nSerial: ABC123"));
    }

    #[test]
    fn test_no_annotations_means_no_text() {
        assert_eq!(parse(r#"{"responses":[{}]}"#).unwrap(), None);
    }

    #[test]
    fn test_per_image_error_is_reported() {
        let err = parse(r#"{"responses":[{"error":{"code":3,"message":"Bad image data."}}]}"#)
            .unwrap_err();

        assert!(matches!(err, OcrError::Recognition(ref m) if m == "Bad image data."));
    }

    #[test]
    fn test_empty_responses_is_an_error() {
        assert!(matches!(parse(r#"{}"#), Err(OcrError::Response(_))));
    }

    #[test]
    fn test_request_body_shape() {
        let request = AnnotateRequest {
            requests: [AnnotateImageRequest {
                image: ImageContent {
                    content: STANDARD.encode(b"img"),
                },
                features: [Feature {
                    kind: "TEXT_DETECTION",
                }],
            }],
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "requests": [{
                    "image": { "content": "aW1n" },
                    "features": [{ "type": "TEXT_DETECTION" }]
                }]
            })
        );
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = OcrConfig::default();
        assert!(matches!(
            VisionRecognizer::from_config(&config),
            Err(OcrError::ModelLoad(_))
        ));
    }
}
