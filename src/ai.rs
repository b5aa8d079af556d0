//! Example sentences and sentence checking through a generative model.
//!
//! The model is asked for JSON, but its answer is only trusted after it
//! deserializes into the expected shape. Anything else, including transport
//! errors, is replaced with a fixed fallback so the study loop never sees an
//! AI error.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{LinguaError, Result};
use crate::model::Word;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub trait TextGenerator {
    /// Sends `prompt` and returns the raw text of the model's answer.
    fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordContext {
    pub definition: String,
    pub sentence: String,
    pub translation: String,
}

impl WordContext {
    pub fn fallback() -> Self {
        Self {
            definition: "AI service unavailable.".into(),
            sentence: "...".into(),
            translation: "...".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceCheck {
    pub is_correct: bool,
    pub feedback: String,
    #[serde(default)]
    pub correction: Option<String>,
}

impl SentenceCheck {
    pub fn fallback() -> Self {
        Self {
            is_correct: false,
            feedback: "An error occurred while checking the sentence.".into(),
            correction: None,
        }
    }
}

/// Prompts the model in the learner's languages.
pub struct Tutor<G: TextGenerator> {
    generator: G,
    source_language: String,
    target_language: String,
}

impl<G: TextGenerator> Tutor<G> {
    pub fn new(
        generator: G,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }

    pub fn generate_word_context(&self, word: &Word) -> WordContext {
        let prompt = format!(
            r#"I am learning {src}.
The word is "{word}" (which means "{meaning}" in {tgt}).

Please provide:
1. A simple {src} definition.
2. A simple example sentence in {src} using this word.
3. The {tgt} translation of that example sentence.

Format the output strictly as JSON:
{{
  "definition": "...",
  "sentence": "...",
  "translation": "..."
}}"#,
            src = self.source_language,
            tgt = self.target_language,
            word = word.source_text,
            meaning = word.target_text,
        );

        self.ask(&prompt).unwrap_or_else(|e| {
            warn!(word = %word.id, error = %e, "word context unavailable");
            WordContext::fallback()
        })
    }

    pub fn validate_user_sentence(&self, word: &str, sentence: &str) -> SentenceCheck {
        let prompt = format!(
            r#"I am learning the {src} word "{word}".
I wrote this sentence using it: "{sentence}"

Please check:
1. Is the grammar correct?
2. Did I use the word "{word}" correctly?

If it is correct, congratulate me briefly in {tgt}.
If it is incorrect, explain the mistake in {tgt} and provide the corrected {src} sentence.

Format the output strictly as JSON:
{{
  "isCorrect": boolean,
  "feedback": "{tgt} explanation...",
  "correction": "Corrected {src} sentence (if needed, otherwise null)"
}}"#,
            src = self.source_language,
            tgt = self.target_language,
        );

        self.ask(&prompt).unwrap_or_else(|e| {
            warn!(word, error = %e, "sentence check unavailable");
            SentenceCheck::fallback()
        })
    }

    fn ask<T: for<'de> Deserialize<'de>>(&self, prompt: &str) -> Result<T> {
        let text = self.generator.generate(prompt)?;
        debug!(chars = text.len(), "model answered");
        Ok(serde_json::from_str(extract_json(&text))?)
    }
}

/// Strips a Markdown code fence if the model wrapped its JSON in one.
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`, `JSON`, ...) up to the first newline.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LinguaError::Ai(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.api_key()?,
            config.model.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);
        let body = GeminiRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| LinguaError::Ai(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LinguaError::Ai(format!("HTTP {}", status)));
        }

        let response: GeminiResponse = resp.json().map_err(|e| LinguaError::Ai(e.to_string()))?;
        response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| LinguaError::Ai("empty response".into()))
    }
}
