//! HTTP client for a remote prover/verifier.
//!
//! API contract:
//! - `POST {base}/prove`  `{"choice": "yes", "secret": "<hex>"}` -> `{"proof": ZkProof}`
//! - `POST {base}/verify` `{"proof": ZkProof, "commitment": "<hex>"}` -> `{"valid": bool}`
//!
//! `prove` transmits the secret, so the prover is expected to run on the
//! voter's own machine or another trusted host.

use crate::{ProofError, ProofService, ZkProof};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use umbra_types::{CommitmentHash, Secret, VoteChoice};

/// Proving can be slow; verification is bounded by the same limit.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct ProveRequest {
    choice: VoteChoice,
    secret: String,
}

#[derive(Deserialize)]
struct ProveResponse {
    proof: ZkProof,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    proof: &'a ZkProof,
    commitment: String,
}

#[derive(Deserialize)]
struct VerifyResponse {
    valid: bool,
}

/// Proof service reached over HTTP.
pub struct RemoteProofService {
    base_url: String,
    http_client: reqwest::Client,
}

impl RemoteProofService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ProofError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProofError::Unreachable(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    ProofError::Unreachable(format!("connection failed: {e}"))
                } else {
                    ProofError::RequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ProofError::RequestFailed(format!(
                "HTTP status {} from {}",
                response.status(),
                url
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ProofError::InvalidResponse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ProofService for RemoteProofService {
    async fn prove_choice(
        &self,
        choice: VoteChoice,
        secret: &Secret,
    ) -> Result<ZkProof, ProofError> {
        let request = ProveRequest {
            choice,
            secret: hex::encode(secret.as_bytes()),
        };
        let response: ProveResponse = self.post_json("prove", &request).await?;
        if response.proof.is_empty() {
            return Err(ProofError::Malformed("empty proof".into()));
        }
        Ok(response.proof)
    }

    async fn verify(
        &self,
        proof: &ZkProof,
        commitment: &CommitmentHash,
    ) -> Result<bool, ProofError> {
        if proof.is_empty() {
            return Err(ProofError::Malformed("empty proof".into()));
        }
        let request = VerifyRequest {
            proof,
            commitment: commitment.to_string(),
        };
        let response: VerifyResponse = self.post_json("verify", &request).await?;
        tracing::debug!(valid = response.valid, backend = %self.base_url, "remote proof verified");
        Ok(response.valid)
    }

    fn name(&self) -> &str {
        "remote"
    }
}
