//! PostgREST-backed shared correction source.

use std::sync::atomic::{AtomicU8, Ordering};

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use url::Url;

use crate::config::SharedConfig;
use crate::corrections::CorrectionEntry;
use crate::error::CestaError;
use crate::shared::{clamp_limit, SharedCorrectionRow, SharedCorrectionSource};

/// Column whose absence means the backend predates correction sharing.
const KEY_COLUMN: &str = "normalized_name";

const SUPPORT_UNKNOWN: u8 = 0;
const SUPPORT_YES: u8 = 1;
const SUPPORT_NO: u8 = 2;

/// Error body returned by PostgREST.
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// Shared corrections stored in a PostgREST table.
///
/// The first request probes whether the table exists with the expected
/// columns. The answer is remembered; a backend without the table is treated
/// as having no shared corrections rather than as an error.
pub struct RestCorrectionSource {
    http: Client,
    endpoint: Url,
    api_key: String,
    table: String,
    support: AtomicU8,
}

impl RestCorrectionSource {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self, CestaError> {
        let mut base =
            Url::parse(base_url).map_err(|e| CestaError::Config(format!("base_url: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join(&format!("rest/v1/{table}"))
            .map_err(|e| CestaError::Config(format!("table: {e}")))?;

        Ok(Self {
            http: Client::new(),
            endpoint,
            api_key: api_key.to_string(),
            table: table.to_string(),
            support: AtomicU8::new(SUPPORT_UNKNOWN),
        })
    }

    /// Build a source from config, or `None` when sharing is disabled.
    pub fn from_config(config: &SharedConfig) -> Result<Option<Self>, CestaError> {
        if !config.enabled {
            return Ok(None);
        }
        let Some(base_url) = config.base_url.as_deref() else {
            return Err(CestaError::Config(
                "shared.enabled is set but shared.base_url is missing".into(),
            ));
        };
        let api_key = config.api_key.as_deref().unwrap_or("");
        Self::new(base_url, api_key, &config.table).map(Some)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        if self.api_key.is_empty() {
            return req;
        }
        req.header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Check the HTTP response for errors, decoding the PostgREST error body.
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, CestaError> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let parsed: PostgrestError = serde_json::from_str(&body).unwrap_or_default();
        let message = parsed
            .message
            .filter(|m| !m.trim().is_empty())
            .or(parsed.details.filter(|d| !d.trim().is_empty()))
            .unwrap_or(body);
        tracing::warn!(status, code = ?parsed.code, "Shared corrections API error");
        Err(CestaError::Remote {
            status,
            code: parsed.code,
            message,
        })
    }

    /// Whether an error means the table or key column does not exist.
    fn is_missing_schema(&self, err: &CestaError) -> bool {
        let CestaError::Remote { code, message, .. } = err else {
            return false;
        };
        let code = code.as_deref().unwrap_or("").to_uppercase();
        let message = message.to_lowercase();

        let missing_table = (code == "42P01" || message.contains("relation"))
            && message.contains(&self.table.to_lowercase());
        let missing_column =
            (code == "42703" || message.contains("column")) && message.contains(KEY_COLUMN);
        missing_table || missing_column
    }

    fn mark_unsupported(&self) {
        if self.support.swap(SUPPORT_NO, Ordering::Relaxed) != SUPPORT_NO {
            tracing::info!(table = %self.table, "Shared corrections not supported by backend");
        }
    }

    async fn probe(&self) -> Result<bool, CestaError> {
        let req = self
            .http
            .get(self.endpoint.clone())
            .query(&[("select", KEY_COLUMN), ("limit", "1")]);
        let resp = self.authorized(req).send().await?;

        match Self::check_response(resp).await {
            Ok(_) => {
                self.support.store(SUPPORT_YES, Ordering::Relaxed);
                Ok(true)
            }
            Err(e) if self.is_missing_schema(&e) => {
                self.mark_unsupported();
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Whether the backend can hold shared corrections.
    ///
    /// The probe runs once; a failed probe is not remembered and reads as
    /// unsupported for this call only.
    pub async fn is_supported(&self) -> bool {
        match self.support.load(Ordering::Relaxed) {
            SUPPORT_YES => true,
            SUPPORT_NO => false,
            _ => match self.probe().await {
                Ok(supported) => supported,
                Err(e) => {
                    tracing::warn!(error = %e, "Shared corrections probe failed");
                    false
                }
            },
        }
    }
}

impl SharedCorrectionSource for RestCorrectionSource {
    type Error = CestaError;

    async fn fetch(&self, limit: u32) -> Result<Vec<SharedCorrectionRow>, CestaError> {
        if !self.is_supported().await {
            return Ok(Vec::new());
        }

        let limit = clamp_limit(limit).to_string();
        let req = self.http.get(self.endpoint.clone()).query(&[
            ("select", "normalized_name,categoria"),
            ("order", "updated_at.desc"),
            ("limit", limit.as_str()),
        ]);
        let resp = self.authorized(req).send().await?;

        let resp = match Self::check_response(resp).await {
            Ok(resp) => resp,
            Err(e) if self.is_missing_schema(&e) => {
                self.mark_unsupported();
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let rows: Vec<SharedCorrectionRow> = resp.json().await?;
        tracing::debug!(rows = rows.len(), "Fetched shared corrections");
        Ok(rows)
    }

    async fn upsert(&self, entry: &CorrectionEntry) -> Result<bool, CestaError> {
        if !self.is_supported().await {
            return Ok(false);
        }

        let req = self
            .http
            .post(self.endpoint.clone())
            .query(&[("on_conflict", KEY_COLUMN)])
            .header("Prefer", "resolution=merge-duplicates")
            .json(entry);
        let resp = self.authorized(req).send().await?;

        match Self::check_response(resp).await {
            Ok(_) => Ok(true),
            Err(e) if self.is_missing_schema(&e) => {
                self.mark_unsupported();
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
