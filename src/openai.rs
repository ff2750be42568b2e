//! OpenAI chat-completions client for the AI fallback path.
//!
//! One request per invocation: a fixed tutor system instruction (plus an
//! optional remembered-topic hint) and a single user turn. No
//! conversation history is kept across calls.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o-mini";
const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 400;

const SYSTEM_PROMPT: &str = "You are a friendly Portuguese grammar tutor for English speakers. \
Answer the student's question concisely, in English, with short Portuguese examples where helpful.";

pub struct Client {
    api_key: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct ApiRequest {
    model: &'static str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ApiMessage>,
}

#[derive(Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl Client {
    pub fn new(api_key: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self { api_key, http }
    }

    /// Ask one grammar question. The topic hint, when present, is
    /// appended to the system instruction with underscores spaced out.
    pub async fn ask(&self, question: &str, topic_hint: Option<&str>) -> Result<String, Error> {
        let mut system = SYSTEM_PROMPT.to_string();
        if let Some(topic) = topic_hint {
            system.push_str(&format!(
                " The student was recently asking about {}.",
                topic.replace('_', " ")
            ));
        }

        let request = ApiRequest {
            model: MODEL,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            messages: vec![
                ApiMessage {
                    role: "system",
                    content: system,
                },
                ApiMessage {
                    role: "user",
                    content: question.to_string(),
                },
            ],
        };

        let response = self
            .http
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout
                } else {
                    Error::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(Error::Quota(body));
            }
            return Err(Error::Api(format!("{status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        api_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(Error::Empty)
    }
}

/// Failure kinds for the fallback call. The user sees one fixed apology
/// regardless; the kind is for logs.
#[derive(Debug)]
pub enum Error {
    Timeout,
    Quota(String),
    Http(String),
    Api(String),
    Parse(String),
    Empty,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Timeout => write!(f, "request timed out"),
            Error::Quota(e) => write!(f, "quota exhausted: {e}"),
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::Api(e) => write!(f, "API error: {e}"),
            Error::Parse(e) => write!(f, "Parse error: {e}"),
            Error::Empty => write!(f, "Empty response"),
        }
    }
}

impl std::error::Error for Error {}
