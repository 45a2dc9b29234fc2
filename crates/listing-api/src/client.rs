//! HTTP client for the listing backend.

use listing_model::{FormRecord, OpaqueId, OptionRecord, Tier};
use reqwest::Url;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::multipart::{Form, Part};

use crate::config::ApiSettings;
use crate::error::{ApiError, Result};
use crate::payload::{DraftReceipt, decode_options, decode_receipt};
use crate::traits::{DraftStore, OptionSource, PublishStore};

/// User agent string for API requests.
const USER_AGENT_VALUE: &str = concat!("listing-form/", env!("CARGO_PKG_VERSION"));

/// Multipart field carrying the JSON record.
const PAYLOAD_FIELD: &str = "payload";

/// Multipart field carrying the existing draft id.
const DRAFT_ID_FIELD: &str = "id";

/// Multipart field repeated once per attachment.
const ATTACHMENT_FIELD: &str = "images[]";

/// REST client implementing every backend contract.
#[derive(Debug, Clone)]
pub struct ListingClient {
    client: reqwest::Client,
    base: Url,
    settings: ApiSettings,
}

impl ListingClient {
    /// Create a client for the configured backend.
    pub fn new(settings: ApiSettings) -> Result<Self> {
        let base = parse_base_url(&settings.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()
            .map_err(|e| ApiError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base,
            settings,
        })
    }

    /// The settings this client was built from.
    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// URL of an option-list request.
    pub fn options_url<T: Tier>(&self, tier: T, parent: Option<OpaqueId>) -> Result<Url> {
        let path = format!(
            "{}/{}",
            self.settings.options_path.trim_end_matches('/'),
            tier.endpoint()
        );
        let mut url = self.endpoint(&path)?;
        if let Some(parent) = parent {
            url.query_pairs_mut()
                .append_pair(&self.settings.parent_param, &parent.to_string());
        }
        Ok(url)
    }

    /// URL of the draft upsert endpoint.
    pub fn draft_url(&self) -> Result<Url> {
        self.endpoint(&self.settings.draft_path)
    }

    /// URL of the publish endpoint.
    pub fn publish_url(&self) -> Result<Url> {
        self.endpoint(&self.settings.publish_path)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Build the multipart body shared by draft and publish requests.
fn record_form(record: &FormRecord, remote_id: Option<OpaqueId>) -> Result<Form> {
    let mut form = Form::new().text(PAYLOAD_FIELD, serde_json::to_string(record)?);

    if let Some(id) = remote_id {
        form = form.text(DRAFT_ID_FIELD, id.to_string());
    }

    for attachment in &record.attachments {
        let part = Part::bytes(attachment.bytes.to_vec())
            .file_name(attachment.file_name.clone())
            .mime_str(&attachment.content_type)?;
        form = form.part(ATTACHMENT_FIELD, part);
    }

    Ok(form)
}

/// Parse the base URL, making sure relative joins keep its last segment.
fn parse_base_url(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
}

impl<T: Tier> OptionSource<T> for ListingClient {
    async fn fetch_options(&self, tier: T, parent: Option<OpaqueId>) -> Result<Vec<OptionRecord>> {
        let url = self.options_url(tier, parent)?;
        tracing::debug!("Fetching {} options from {}", tier.label(), url);

        let body = self.send(self.client.get(url)).await?;
        decode_options(&body)
    }
}

impl DraftStore for ListingClient {
    async fn upsert_draft(
        &self,
        record: &FormRecord,
        remote_id: Option<OpaqueId>,
    ) -> Result<DraftReceipt> {
        let url = self.draft_url()?;
        let form = record_form(record, remote_id)?;
        tracing::debug!(
            "Upserting draft {} ({} attachment bytes)",
            remote_id.map_or_else(|| "<new>".to_string(), |id| id.to_string()),
            record.attachment_bytes()
        );

        let body = self.send(self.client.post(url).multipart(form)).await?;
        decode_receipt(&body)
    }
}

impl PublishStore for ListingClient {
    async fn publish(&self, record: &FormRecord) -> Result<()> {
        let url = self.publish_url()?;
        let form = record_form(record, None)?;
        tracing::info!(
            "Publishing listing with {} attachment(s)",
            record.attachments.len()
        );

        self.send(self.client.post(url).multipart(form)).await?;
        Ok(())
    }
}
