use std::time::Duration;

use super::client::HttpClient;
use async_trait::async_trait;

/// Plain `reqwest` transport with request and connect timeouts.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> reqwest::Result<Self> {
        Self::builder().build().map(Self)
    }

    /// Same as [`new`](Self::new) but identifies itself with `user_agent`,
    /// which public geocoding services require.
    pub fn with_user_agent(user_agent: &str) -> reqwest::Result<Self> {
        Self::builder().user_agent(user_agent).build().map(Self)
    }

    fn builder() -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
