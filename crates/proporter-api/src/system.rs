// Backend system endpoints
//
// Health probe, credential check, and the prompt-generation pair
// (generate + cookbook) that sit outside the export flow.

use tracing::debug;

use crate::client::ProporterClient;
use crate::credentials::Credentials;
use crate::error::Error;
use crate::models::{
    CookbookData, CredentialsOnlyRequest, Envelope, GenerateRequest, GenerateResponse,
    VerifyAuthResponse,
};

impl ProporterClient {
    /// Probe backend liveness.
    ///
    /// `GET /healthz`
    ///
    /// Any failure (transport, non-2xx) reads as unhealthy; this never
    /// returns an error.
    pub async fn health_check(&self) -> bool {
        let Ok(url) = self.endpoint("healthz") else {
            return false;
        };
        debug!("GET {}", url);
        match self.http().get(url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!(error = %e, "health probe failed");
                false
            }
        }
    }

    /// Check credentials against the Jamf instance through the backend.
    ///
    /// `POST /api/jamf/verify-auth`
    ///
    /// Malformed credentials (blank fields, URL without an http(s) scheme)
    /// fail locally and nothing is sent.
    pub async fn verify_credentials(&self, credentials: &Credentials) -> Result<(), Error> {
        let body = CredentialsOnlyRequest {
            credentials: credentials.body()?,
        };
        debug!(username = credentials.username(), "verifying credentials");
        let resp: VerifyAuthResponse = self.post_json("api/jamf/verify-auth", &body).await?;
        resp.into_result().map(|_| ())
    }

    /// Turn a natural-language prompt into HCL.
    ///
    /// `POST /api/generate`
    pub async fn generate_hcl(
        &self,
        prompt: &str,
        context: Option<&str>,
    ) -> Result<GenerateResponse, Error> {
        let body = GenerateRequest { prompt, context };
        debug!(prompt_len = prompt.len(), "generating HCL");
        let resp: GenerateResponse = self.post_json("api/generate", &body).await?;
        resp.into_result()
    }

    /// List the prompt recipes the backend ships.
    ///
    /// `GET /api/cookbook`
    pub async fn cookbook(&self) -> Result<CookbookData, Error> {
        self.get_json("api/cookbook").await
    }
}
