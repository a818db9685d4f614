//! Gemini Image Client
//!
//! `BouquetGenerator` backed by the Gemini `generateContent` REST call. Each
//! sketch travels as an inline PNG part, followed by the composition brief.
//! The first inline image in the first candidate is the bouquet; a response
//! without one is a failure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::error::{ConfigError, GenerationError};
use crate::generator::BouquetGenerator;
use crate::prompt::{composition_brief, SYSTEM_PROMPT};
use crate::sketch::{EncodedImage, Sketch};

/// Error bodies are cut to this many characters before they reach the user
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: [&'static str; 2],
    image_config: ImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(alias = "mime_type", default)]
    mime_type: String,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(rename = "inlineData", alias = "inline_data", default)]
    inline_data: Option<InlineData>,
}

/// Build the request body for one bouquet
pub(crate) fn build_request(
    config: &GeneratorConfig,
    sketches: &[Sketch],
    sender: &str,
    recipient: &str,
) -> GenerateContentRequest {
    let mut parts: Vec<RequestPart> = sketches
        .iter()
        .map(|sketch| RequestPart::Inline {
            inline_data: InlineData {
                mime_type: sketch.image().mime_type().to_string(),
                data: sketch.image().to_base64(),
            },
        })
        .collect();
    parts.push(RequestPart::Text {
        text: composition_brief(sketches.len(), sender, recipient),
    });

    GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![RequestPart::Text {
                text: SYSTEM_PROMPT.to_string(),
            }],
        },
        contents: vec![Content {
            role: Some("user"),
            parts,
        }],
        generation_config: GenerationConfig {
            response_modalities: ["TEXT", "IMAGE"],
            image_config: ImageConfig {
                aspect_ratio: config.aspect_ratio.clone(),
            },
        },
    }
}

/// Pull the bouquet out of a `generateContent` response body
pub fn parse_response(body: &str) -> Result<EncodedImage, GenerationError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|err| GenerationError::InvalidPayload(format!("malformed response: {err}")))?;
    extract_image(response)
}

pub(crate) fn extract_image(response: GenerateContentResponse) -> Result<EncodedImage, GenerationError> {
    let inline = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.inline_data))
        .ok_or(GenerationError::NoImage)?;

    let mime_type = if inline.mime_type.is_empty() {
        crate::sketch::PNG_MIME.to_string()
    } else {
        inline.mime_type
    };
    if !mime_type.starts_with("image/") {
        return Err(GenerationError::InvalidPayload(format!("unexpected mime type {mime_type}")));
    }

    let image = EncodedImage::from_base64(&inline.data, mime_type)
        .map_err(|err| GenerationError::InvalidPayload(format!("bad base64: {err}")))?;
    if image.is_empty() {
        return Err(GenerationError::NoImage);
    }
    Ok(image)
}

fn truncate_body(mut body: String) -> String {
    if let Some((idx, _)) = body.char_indices().nth(MAX_ERROR_BODY) {
        body.truncate(idx);
        body.push('…');
    }
    body
}

/// Image-service client; build one at startup and pass it to the wizard
pub struct GeminiGenerator {
    client: reqwest::Client,
    config: GeneratorConfig,
}

impl GeminiGenerator {
    /// Create a client; fails if no API key is configured
    pub fn new(config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.require_api_key()?;
        let client = reqwest::Client::builder().build()?;
        log::info!("Generator ready (model {})", config.model);
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

#[async_trait(?Send)]
impl BouquetGenerator for GeminiGenerator {
    async fn generate_bouquet(
        &self,
        sketches: &[Sketch],
        sender: &str,
        recipient: &str,
    ) -> Result<EncodedImage, GenerationError> {
        let body = build_request(&self.config, sketches, sender, recipient);
        let response = self
            .client
            .post(self.config.generate_url())
            .header("x-goog-api-key", self.config.api_key.trim())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: truncate_body(text),
            });
        }

        let image = parse_response(&text)?;
        log::debug!("Service returned {} bytes of {}", image.len(), image.mime_type());
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn sketches() -> Vec<Sketch> {
        vec![
            Sketch::new(0, EncodedImage::png(vec![1, 2, 3])),
            Sketch::new(1, EncodedImage::png(vec![4, 5, 6])),
        ]
    }

    #[test]
    fn test_request_body_layout() {
        let body = build_request(&GeneratorConfig::default(), &sketches(), "Mia", "Sam");
        let value = serde_json::to_value(&body).expect("serializable");

        assert_eq!(value["systemInstruction"]["parts"][0]["text"], json!(SYSTEM_PROMPT));
        assert!(value["systemInstruction"].get("role").is_none());

        let parts = value["contents"][0]["parts"].as_array().expect("parts array");
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], json!({"inlineData": {"mimeType": "image/png", "data": "AQID"}}));
        assert_eq!(parts[1]["inlineData"]["data"], json!("BAUG"));
        let brief = parts[2]["text"].as_str().expect("text part");
        assert!(brief.contains("for Sam from Mia"));
        assert!(brief.contains("provided 2 specific"));

        assert_eq!(value["contents"][0]["role"], json!("user"));
        assert_eq!(
            value["generationConfig"],
            json!({"responseModalities": ["TEXT", "IMAGE"], "imageConfig": {"aspectRatio": "4:5"}})
        );
    }

    #[test]
    fn test_parse_first_inline_image() {
        let body = json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "Here is your bouquet"},
                    {"inlineData": {"mimeType": "image/png", "data": "AQID"}},
                    {"inlineData": {"mimeType": "image/png", "data": "BAUG"}}
                ]}
            }]
        });
        let image = parse_response(&body.to_string()).expect("image part");
        assert_eq!(image.bytes(), &[1, 2, 3]);
        assert_eq!(image.mime_type(), "image/png");
    }

    #[test]
    fn test_parse_accepts_snake_case_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"inline_data":{"mime_type":"image/jpeg","data":"AQID"}}]}}]}"#;
        let image = parse_response(body).expect("image part");
        assert_eq!(image.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_text_only_response_is_no_image() {
        let body = json!({"candidates": [{"content": {"parts": [{"text": "Sorry"}]}}]});
        assert_eq!(parse_response(&body.to_string()), Err(GenerationError::NoImage));
    }

    #[test]
    fn test_empty_responses_are_no_image() {
        assert_eq!(parse_response("{}"), Err(GenerationError::NoImage));
        assert_eq!(parse_response(r#"{"candidates": []}"#), Err(GenerationError::NoImage));
        assert_eq!(
            parse_response(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#),
            Err(GenerationError::NoImage)
        );
        let empty_data = json!({"candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": ""}}]}}]});
        assert_eq!(parse_response(&empty_data.to_string()), Err(GenerationError::NoImage));
    }

    #[test]
    fn test_only_first_candidate_is_considered() {
        let body = json!({
            "candidates": [
                {"content": {"parts": [{"text": "no image here"}]}},
                {"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "AQID"}}]}}
            ]
        });
        assert_eq!(parse_response(&body.to_string()), Err(GenerationError::NoImage));
    }

    #[test]
    fn test_bad_payloads_are_invalid() {
        assert!(matches!(parse_response("not json"), Err(GenerationError::InvalidPayload(_))));

        let bad_base64 = json!({"candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "@@@"}}]}}]});
        assert!(matches!(
            parse_response(&bad_base64.to_string()),
            Err(GenerationError::InvalidPayload(_))
        ));

        let not_image = json!({"candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "audio/wav", "data": "AQID"}}]}}]});
        assert!(matches!(
            parse_response(&not_image.to_string()),
            Err(GenerationError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_error_body_is_truncated() {
        let long = "x".repeat(MAX_ERROR_BODY + 10);
        let cut = truncate_body(long);
        assert_eq!(cut.chars().count(), MAX_ERROR_BODY + 1);
        assert_eq!(truncate_body("short".into()), "short");
    }

    #[test]
    fn test_client_requires_api_key() {
        assert!(matches!(
            GeminiGenerator::new(GeneratorConfig::default()),
            Err(ConfigError::MissingApiKey)
        ));
        let generator = GeminiGenerator::new(GeneratorConfig::with_api_key("k")).expect("client");
        assert_eq!(generator.config().model, crate::config::DEFAULT_MODEL);
    }

    #[test]
    fn test_request_without_sketches_has_only_brief() {
        let value: Value = serde_json::to_value(build_request(&GeneratorConfig::default(), &[], "a", "b"))
            .expect("serializable");
        assert_eq!(value["contents"][0]["parts"].as_array().map(Vec::len), Some(1));
    }
}
