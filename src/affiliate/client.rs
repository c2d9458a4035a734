use crate::affiliate::models::SavedAffiliate;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),
    #[error("{0}")]
    Rejected(String),
    #[error("not found")]
    NotFound,
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// Remote operations the pipeline page needs.
#[async_trait]
pub trait AffiliateService: Send + Sync {
    async fn list_saved(&self) -> Result<Vec<SavedAffiliate>, ApiError>;

    async fn delete(&self, id: u64) -> Result<(), ApiError>;

    /// Looks up a contact address; `Ok(None)` means the lookup ran but found
    /// nothing.
    async fn find_email(&self, affiliate: &SavedAffiliate) -> Result<Option<String>, ApiError>;

    async fn generate_outreach(&self, affiliate: &SavedAffiliate) -> Result<String, ApiError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FindEmailRequest<'a> {
    affiliate_id: u64,
    domain: &'a str,
}

#[derive(Deserialize)]
struct FindEmailResponse {
    email: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutreachRequest<'a> {
    affiliate_id: u64,
    email: Option<&'a str>,
    link: &'a str,
}

#[derive(Deserialize)]
struct OutreachResponse {
    message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// REST client for the pipeline backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }

        let body = response.text().await.unwrap_or_default();
        Err(error_from_body(status, &body))
    }
}

fn error_from_body(status: StatusCode, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error }) if !error.trim().is_empty() => ApiError::Rejected(error),
        _ => ApiError::RequestFailed(format!("HTTP error: {}", status)),
    }
}

#[async_trait]
impl AffiliateService for ApiClient {
    async fn list_saved(&self) -> Result<Vec<SavedAffiliate>, ApiError> {
        let url = self.endpoint("api/affiliates/saved");
        debug!(%url, "loading saved affiliates");
        let response = self.send(self.http.get(&url)).await?;
        response
            .json::<Vec<SavedAffiliate>>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    async fn delete(&self, id: u64) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("api/affiliates/{}", id));
        debug!(%url, "deleting affiliate");
        self.send(self.http.delete(&url)).await?;
        Ok(())
    }

    async fn find_email(&self, affiliate: &SavedAffiliate) -> Result<Option<String>, ApiError> {
        let url = self.endpoint("api/email/find");
        debug!(%url, id = affiliate.id, "looking up email");
        let body = FindEmailRequest {
            affiliate_id: affiliate.id,
            domain: &affiliate.domain,
        };
        let response = self.send(self.http.post(&url).json(&body)).await?;
        let found = response
            .json::<FindEmailResponse>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        Ok(found.email.filter(|email| !email.trim().is_empty()))
    }

    async fn generate_outreach(&self, affiliate: &SavedAffiliate) -> Result<String, ApiError> {
        let url = self.endpoint("api/ai/outreach");
        debug!(%url, id = affiliate.id, "generating outreach message");
        let body = OutreachRequest {
            affiliate_id: affiliate.id,
            email: affiliate.email.as_deref(),
            link: &affiliate.link,
        };
        let response = self.send(self.http.post(&url).json(&body)).await?;
        let generated = response
            .json::<OutreachResponse>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        Ok(generated.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slashes() {
        let client = ApiClient::new("https://app.example.com/", None);
        assert_eq!(
            client.endpoint("/api/affiliates/saved"),
            "https://app.example.com/api/affiliates/saved"
        );
        assert_eq!(
            client.endpoint("api/email/find"),
            "https://app.example.com/api/email/find"
        );
    }

    #[test]
    fn test_error_body_becomes_business_rejection() {
        let error = error_from_body(
            StatusCode::PAYMENT_REQUIRED,
            r#"{"error": "Insufficient credits"}"#,
        );
        assert!(matches!(&error, ApiError::Rejected(message) if message == "Insufficient credits"));
        assert_eq!(error.to_string(), "Insufficient credits");
    }

    #[test]
    fn test_unstructured_error_body_keeps_status() {
        let error = error_from_body(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(error.to_string(), "HTTP request failed: HTTP error: 502 Bad Gateway");
    }

    #[test]
    fn test_request_bodies_are_camel_case() {
        let body = FindEmailRequest {
            affiliate_id: 3,
            domain: "shop.io",
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"affiliateId":3,"domain":"shop.io"}"#
        );

        let body = OutreachRequest {
            affiliate_id: 3,
            email: None,
            link: "https://shop.io",
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"affiliateId":3,"email":null,"link":"https://shop.io"}"#
        );
    }
}
