//! Common test utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, Response, header::SET_COOKIE};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use webca_server::{AppState, Server, ServerConfig, UserAccount};

/// Password of the `admin` test account.
pub const ADMIN_PASSWORD: &str = "admin";

/// A test server that runs in the background.
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// HTTP client configured for this server.
    pub client: Client,
    /// Shared state, for inspecting the registry.
    pub state: AppState,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server with one `admin` account.
    pub async fn start() -> Result<Self> {
        Self::start_with(ServerConfig::new()).await
    }

    /// Start a test server from a base config; the `admin` account is added.
    pub async fn start_with(config: ServerConfig) -> Result<Self> {
        let config = config
            .with_user(UserAccount::from_password(
                "admin",
                "Administrator",
                "admin@example.com",
                ADMIN_PASSWORD,
            ))
            .with_request_logging(false);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state = AppState::new(config);
        let server = Server::from_state(state.clone());
        let shutdown = CancellationToken::new();
        let signal = shutdown.clone();
        let handle = tokio::spawn(async move {
            let _ = server
                .serve(listener, async move { signal.cancelled().await })
                .await;
        });

        let client = Client::new();
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            client,
            state,
            shutdown,
            handle,
        })
    }

    /// Get the base URL for the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// GET request builder.
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(format!("{}{}", self.base_url(), path))
    }

    /// POST request builder.
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(format!("{}{}", self.base_url(), path))
    }

    /// PUT request builder.
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.put(format!("{}{}", self.base_url(), path))
    }

    /// DELETE request builder.
    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.delete(format!("{}{}", self.base_url(), path))
    }

    /// Log `admin` in on the given session cookie.
    pub async fn login(&self, session_id: &str) -> Result<Response> {
        Ok(self
            .post("/login")
            .header("Cookie", format!("goSessionId={session_id}"))
            .json(&serde_json::json!({
                "username": "admin",
                "password": ADMIN_PASSWORD,
            }))
            .send()
            .await?)
    }

    /// Stop the server and wait for it to finish.
    pub async fn stop(self) -> Result<()> {
        self.shutdown.cancel();
        timeout(Duration::from_secs(5), self.handle).await??;
        Ok(())
    }
}

/// All `Set-Cookie` header values of a response.
pub fn set_cookies(resp: &Response) -> Vec<String> {
    resp.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Session identifier issued by a response, if any.
pub fn issued_session_id(resp: &Response) -> Option<String> {
    set_cookies(resp).into_iter().find_map(|cookie| {
        let pair = cookie.split(';').next()?;
        pair.strip_prefix("goSessionId=").map(str::to_string)
    })
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(resp) = client.get(&url).send().await
                && resp.status().is_success()
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .map_err(|_| anyhow::anyhow!("Server did not start in time"))?;

    Ok(())
}
