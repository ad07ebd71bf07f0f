// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Minimal SparkPost Transmissions API client.
//!
//! Only the request shape the `sparks` binary needs is modeled; delivery
//! semantics are entirely the hosted API's concern.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.sparkpost.com";
const TRANSMISSIONS_PATH: &str = "/api/v1/transmissions";

#[derive(Debug, Error)]
pub enum SparkPostError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request rejected with {status}: {messages:?}")]
    Api {
        status: StatusCode,
        messages: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

// --- Request types ---

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Address {
    pub email: String,
    /// Address shown in the To header when it differs from the envelope
    /// recipient (cc/bcc routing).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_to: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recipient {
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitution_data: Option<Value>,
}

/// SparkPost accepts recipients either as bare email strings or as
/// structured objects; both shapes are used by the CLI.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum RecipientList {
    Emails(Vec<String>),
    Detailed(Vec<Recipient>),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InlineImage {
    #[serde(rename = "type")]
    pub mime_type: String,
    pub name: String,
    pub data: String,
}

impl InlineImage {
    /// Builds an inline image, base64-encoding the raw file bytes.
    pub fn new(mime_type: impl Into<String>, name: impl Into<String>, data: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            name: name.into(),
            data: BASE64.encode(data),
        }
    }
}

#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct Content {
    pub from: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inline_images: Vec<InlineImage>,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct TxOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_css: Option<bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Transmission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<TxOptions>,
    pub recipients: RecipientList,
    pub content: Content,
}

/// Expands to/cc/bcc into the recipient list, attaching substitution data
/// to every recipient. Returns the list plus the value for the literal `cc`
/// header, which must be set when a cc address is present (bcc is routed
/// the same way but never surfaced in a header).
pub fn expand_recipients(
    to: &str,
    cc: Option<&str>,
    bcc: Option<&str>,
    substitution_data: Option<&Value>,
) -> (RecipientList, Option<String>) {
    let recipient = |email: &str, header_to: Option<&str>| Recipient {
        address: Address {
            email: email.to_string(),
            header_to: header_to.map(str::to_string),
        },
        substitution_data: substitution_data.cloned(),
    };

    match (cc, bcc) {
        (Some(cc), bcc) => {
            let mut recipients = vec![recipient(to, None), recipient(cc, Some(to))];
            if let Some(bcc) = bcc {
                recipients.push(recipient(bcc, Some(to)));
            }
            (RecipientList::Detailed(recipients), Some(cc.to_string()))
        }
        (None, Some(bcc)) => (
            RecipientList::Detailed(vec![recipient(to, None), recipient(bcc, Some(to))]),
            None,
        ),
        (None, None) => {
            if substitution_data.is_none() {
                (RecipientList::Emails(vec![to.to_string()]), None)
            } else {
                (RecipientList::Detailed(vec![recipient(to, None)]), None)
            }
        }
    }
}

// --- Response types ---

#[derive(Debug, Deserialize)]
struct TransmissionResponse {
    results: TransmissionResults,
}

#[derive(Debug, Deserialize)]
struct TransmissionResults {
    id: String,
    #[serde(default)]
    total_accepted_recipients: u32,
    #[serde(default)]
    total_rejected_recipients: u32,
}

#[derive(Debug, Deserialize, Default)]
struct ApiErrorBody {
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(default)]
    description: Option<String>,
}

/// Outcome of an accepted transmission.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub status: StatusCode,
    pub id: String,
    pub total_accepted: u32,
    pub total_rejected: u32,
}

// --- Client ---

pub struct Client {
    http: reqwest::Client,
    config: Config,
}

impl Client {
    pub fn new(config: Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// POSTs the transmission, returning the assigned id on success.
    pub async fn send(&self, transmission: &Transmission) -> Result<SendReceipt, SparkPostError> {
        let url = format!("{}{}", self.config.base_url, TRANSMISSIONS_PATH);
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.config.api_key.as_str())
            .json(transmission)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: ApiErrorBody = response.json().await.unwrap_or_default();
            let messages = body
                .errors
                .into_iter()
                .map(|e| match e.description {
                    Some(description) => format!("{}: {}", e.message, description),
                    None => e.message,
                })
                .collect();
            return Err(SparkPostError::Api { status, messages });
        }

        let body: TransmissionResponse = response.json().await?;
        Ok(SendReceipt {
            status,
            id: body.results.id,
            total_accepted: body.results.total_accepted_recipients,
            total_rejected: body.results.total_rejected_recipients,
        })
    }
}
