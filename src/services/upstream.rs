use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

use crate::config::EntriConfig;

use super::{
    DeploymentClient, DomainClient, DomainStatus, EntriClient, EntriToken, PublishRequest,
    PublishResponse, StoreError,
};

/// Minimal tRPC-over-HTTP mutation client authenticated with the service secret
#[derive(Debug, Clone)]
struct TrpcHttpClient {
    http: reqwest::Client,
    base_url: String,
    service_secret: String,
    service: &'static str,
}

#[derive(Debug, Deserialize)]
struct TrpcEnvelope<T> {
    result: TrpcResult<T>,
}

#[derive(Debug, Deserialize)]
struct TrpcResult<T> {
    data: T,
}

impl TrpcHttpClient {
    async fn mutate<I, O>(&self, path: &str, input: &I) -> Result<O, StoreError>
    where
        I: Serialize + Sync,
        O: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, &self.service_secret)
            .json(input)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Upstream {
                service: self.service,
                status: response.status().as_u16(),
            });
        }

        let envelope: TrpcEnvelope<O> = response.json().await?;
        Ok(envelope.result.data)
    }
}

/// Domain verification service
#[derive(Debug, Clone)]
pub struct HttpDomainClient {
    client: TrpcHttpClient,
}

impl HttpDomainClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, service_secret: impl Into<String>) -> Self {
        Self {
            client: TrpcHttpClient {
                http,
                base_url: base_url.into(),
                service_secret: service_secret.into(),
                service: "domain",
            },
        }
    }
}

#[async_trait]
impl DomainClient for HttpDomainClient {
    async fn verify(&self, project_id: &str, domain: &str) -> Result<DomainStatus, StoreError> {
        self.client
            .mutate("domain.verify", &json!({ "projectId": project_id, "domain": domain }))
            .await
    }
}

/// Publishing (deployment) service
#[derive(Debug, Clone)]
pub struct HttpDeploymentClient {
    client: TrpcHttpClient,
}

impl HttpDeploymentClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, service_secret: impl Into<String>) -> Self {
        Self {
            client: TrpcHttpClient {
                http,
                base_url: base_url.into(),
                service_secret: service_secret.into(),
                service: "deployment",
            },
        }
    }
}

#[async_trait]
impl DeploymentClient for HttpDeploymentClient {
    async fn publish(&self, request: &PublishRequest) -> Result<PublishResponse, StoreError> {
        self.client.mutate("deployment.publish", request).await
    }
}

/// Entri DNS-setup token issuer
#[derive(Debug, Clone)]
pub struct HttpEntriClient {
    http: reqwest::Client,
    config: EntriConfig,
}

#[derive(Debug, Deserialize)]
struct EntriTokenResponse {
    auth_token: String,
}

impl HttpEntriClient {
    pub fn new(http: reqwest::Client, config: EntriConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl EntriClient for HttpEntriClient {
    async fn entri_token(&self) -> Result<EntriToken, StoreError> {
        let url = format!("{}/token", self.config.api_url.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .json(&json!({
                "applicationId": self.config.application_id,
                "secret": self.config.secret,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Upstream {
                service: "entri",
                status: response.status().as_u16(),
            });
        }

        let body: EntriTokenResponse = response.json().await?;
        Ok(EntriToken {
            token: body.auth_token,
            application_id: self.config.application_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_trpc_envelope() {
        let body = r#"{"result":{"data":{"success":true,"error":null}}}"#;
        let envelope: TrpcEnvelope<PublishResponse> = serde_json::from_str(body).unwrap();
        assert!(envelope.result.data.success);
    }

    #[test]
    fn publish_request_uses_camel_case() {
        let request = PublishRequest {
            build_id: "build-1".into(),
            builder_origin: "https://studio.example.com".into(),
            github_ref: Some("main".into()),
            github_sha: None,
            destination: "saas".into(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["buildId"], "build-1");
        assert_eq!(value["builderOrigin"], "https://studio.example.com");
        assert_eq!(value["githubRef"], "main");
    }
}
