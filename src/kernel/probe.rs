use async_trait::async_trait;
use reqwest::{header::LOCATION, redirect, Client};
use std::time::Duration;

use crate::error::{Result, WatchError};

/// Immediate response of a redirect probe, before any redirect is followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub location: Option<String>,
}

/// Network seam for the status monitor and the redirect verifier.
#[async_trait]
pub trait HttpProbe: Send + Sync {
    /// `GET url`, returning the status code of the completed response.
    async fn health(&self, url: &str, timeout: Duration) -> Result<u16>;

    /// `HEAD url` with redirect-following disabled.
    async fn head_no_redirect(&self, url: &str, timeout: Duration) -> Result<ProbeResponse>;
}

/// reqwest-backed probe. Two clients: the redirect client must never follow.
#[derive(Clone)]
pub struct ReqwestProbe {
    client: Client,
    no_redirect: Client,
}

impl ReqwestProbe {
    /// Honors the system proxy settings.
    pub fn new() -> Result<Self> {
        Self::build(true)
    }

    /// Connects directly, ignoring `HTTP_PROXY` and friends.
    pub fn direct() -> Result<Self> {
        Self::build(false)
    }

    fn build(use_proxy: bool) -> Result<Self> {
        let mut client = Client::builder();
        let mut no_redirect = Client::builder().redirect(redirect::Policy::none());
        if !use_proxy {
            client = client.no_proxy();
            no_redirect = no_redirect.no_proxy();
        }
        Ok(Self {
            client: client
                .build()
                .map_err(|e| WatchError::Config(format!("http client: {}", e)))?,
            no_redirect: no_redirect
                .build()
                .map_err(|e| WatchError::Config(format!("http client: {}", e)))?,
        })
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn health(&self, url: &str, timeout: Duration) -> Result<u16> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        Ok(response.status().as_u16())
    }

    async fn head_no_redirect(&self, url: &str, timeout: Duration) -> Result<ProbeResponse> {
        let response = self.no_redirect.head(url).timeout(timeout).send().await?;
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(ProbeResponse {
            status: response.status().as_u16(),
            location,
        })
    }
}
