//! Minimal REST client over the configured transport.

use std::future::Future;

use reqwest::{Client, Request, Response};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{CrsError, TransportError};

/// HTTP client bound to a base URL.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    base_url: Url,
}

impl RestClient {
    pub fn new(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Resolve `path` against the base URL.
    pub fn url(&self, path: &str) -> Result<Url, CrsError> {
        self.base_url
            .join(path)
            .map_err(|e| CrsError::configuration(format!("invalid request path '{}': {}", path, e)))
    }

    /// GET `path` and return the body. Non-success statuses are errors.
    pub async fn get_string(&self, path: &str, cancel: &CancellationToken) -> Result<String, CrsError> {
        let url = self.url(path)?;
        tracing::debug!(%url, "GET");

        let http = &self.http;
        cancellable(cancel, async move {
            let response = http
                .get(url)
                .send()
                .await
                .and_then(Response::error_for_status)
                .map_err(TransportError::from)?;
            Ok::<_, CrsError>(response.text().await.map_err(TransportError::from)?)
        })
        .await
    }

    /// Send a prepared request as-is.
    pub async fn send(&self, request: Request, cancel: &CancellationToken) -> Result<Response, CrsError> {
        tracing::debug!(method = %request.method(), url = %request.url(), "Sending request");
        let http = &self.http;
        cancellable(cancel, async move {
            Ok::<_, CrsError>(http.execute(request).await.map_err(TransportError::from)?)
        })
        .await
    }
}

async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, CrsError>
where
    F: Future<Output = Result<T, CrsError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CrsError::Cancelled),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer every connection with `status_line` and an empty body.
    async fn start_status_backend(status_line: &'static str) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = socket.read(&mut buf).await;
                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                        status_line
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        addr
    }

    fn client_for(addr: SocketAddr) -> RestClient {
        RestClient::new(Client::new(), Url::parse(&format!("http://{}/", addr)).unwrap())
    }

    #[test]
    fn test_url_joins_relative_path() {
        let client = RestClient::new(Client::new(), Url::parse("https://crs.example/api/").unwrap());
        assert_eq!(
            client.url("people/9").unwrap().as_str(),
            "https://crs.example/api/people/9"
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_communication_failure() {
        let client = RestClient::new(Client::new(), Url::parse("http://127.0.0.1:1/").unwrap());
        let err = client.get_string("health", &CancellationToken::new()).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_not_found_is_not_transient() {
        let addr = start_status_backend("404 Not Found").await;
        let err = client_for(addr)
            .get_string("people/9", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.label(), "protocol");
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_service_unavailable_is_transient() {
        let addr = start_status_backend("503 Service Unavailable").await;
        let err = client_for(addr)
            .get_string("people/9", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.label(), "communication");
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_success_returns_body() {
        let addr = start_status_backend("200 OK").await;
        let body = client_for(addr)
            .get_string("health", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(body, "");
    }

    #[tokio::test]
    async fn test_cancelled_request_is_cancelled() {
        // Accepts connections but never answers.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let client = client_for(addr);
        let request = client.http().get(client.url("slow").unwrap()).build().unwrap();
        let err = client.send(request, &cancel).await.unwrap_err();
        assert!(matches!(err, CrsError::Cancelled));
    }
}
