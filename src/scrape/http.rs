use std::time::Duration;

use rand::Rng;
use reqwest::{Client, StatusCode};
use url::Url;

use super::{html, PageFetcher, RosterEntry, TeamLink};
use crate::config::CrawlerConfig;
use crate::error::{Result, SquadError};

/// Fetches pages from the live source over HTTP.
///
/// Each request is preceded by a random politeness delay. Network errors,
/// 429 and 5xx responses are retried with exponential backoff.
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
    max_retries: usize,
    retry_backoff: Duration,
    min_delay: Duration,
    max_delay: Duration,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("squadgraph/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SquadError::Fetch(format!("Failed to build HTTP client: {}", e)))?;

        // Url::join replaces the last segment unless the base ends with '/'.
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)
            .map_err(|e| SquadError::Config(format!("Invalid base_url '{}': {}", base, e)))?;

        Ok(Self {
            client,
            base_url,
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            min_delay: Duration::from_millis(config.min_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        })
    }

    fn url(&self, locator: &str) -> Result<Url> {
        self.base_url
            .join(locator.trim_start_matches('/'))
            .map_err(|e| SquadError::InvalidInput(format!("Bad locator '{}': {}", locator, e)))
    }

    fn politeness_delay(&self) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    async fn get_once(&self, url: &Url) -> std::result::Result<String, (bool, SquadError)> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| (true, SquadError::Fetch(format!("Network error for {}: {}", url, e))))?;

        let status = response.status();
        if !status.is_success() {
            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            return Err((
                retryable,
                SquadError::Fetch(format!("HTTP {} for {}", status, url)),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| (true, SquadError::Fetch(format!("Failed to read {}: {}", url, e))))
    }

    /// GET a page body, retrying transient failures.
    pub async fn get_page(&self, locator: &str) -> Result<String> {
        let url = self.url(locator)?;
        let mut attempt = 0;
        let mut delay = self.retry_backoff;

        tokio::time::sleep(self.politeness_delay()).await;

        loop {
            let start = std::time::Instant::now();
            match self.get_once(&url).await {
                Ok(body) => {
                    log::debug!("GET {} took {:?} (attempt {})", url, start.elapsed(), attempt + 1);
                    return Ok(body);
                }
                Err((true, e)) if attempt < self.max_retries => {
                    log::warn!("Retry {}/{} after error: {}", attempt + 1, self.max_retries, e);
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err((_, e)) => return Err(e),
            }
        }
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch_league_teams(&self, locator: &str) -> Result<Vec<TeamLink>> {
        let body = self.get_page(locator).await?;
        Ok(html::parse_league_teams(&body))
    }

    async fn fetch_team_roster(&self, locator: &str) -> Result<Vec<RosterEntry>> {
        let body = self.get_page(locator).await?;
        html::parse_team_roster(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn config(base_url: &str) -> CrawlerConfig {
        CrawlerConfig {
            base_url: base_url.to_string(),
            min_delay_ms: 0,
            max_delay_ms: 0,
            retry_backoff_ms: 1,
            ..CrawlerConfig::default()
        }
    }

    fn response(status: &str, content_type: &str, body: &[u8]) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            content_type,
            body.len()
        )
        .into_bytes();
        out.extend_from_slice(body);
        out
    }

    fn text(status: &str, body: &str) -> Vec<u8> {
        response(status, "text/html; charset=utf-8", body.as_bytes())
    }

    /// Serve the scripted responses in order, repeating the last one.
    /// Returns the base URL and the number of requests received.
    async fn serve(responses: Vec<Vec<u8>>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = requests.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let reply = &responses[n.min(responses.len() - 1)];
                let _ = socket.write_all(reply).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}", addr), requests)
    }

    #[tokio::test]
    async fn test_transient_statuses_are_retried() {
        let (base, requests) = serve(vec![
            text("503 Service Unavailable", "busy"),
            text("429 Too Many Requests", "slow down"),
            text("200 OK", "ok"),
        ])
        .await;
        let fetcher = HttpFetcher::new(&config(&base)).unwrap();

        let body = fetcher.get_page("eng/2003-2004/faprem.htm").await.unwrap();
        assert_eq!(body, "ok");
        assert_eq!(requests.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_error_fails_without_retry() {
        let (base, requests) = serve(vec![text("404 Not Found", "missing")]).await;
        let fetcher = HttpFetcher::new(&config(&base)).unwrap();

        let err = fetcher.get_page("eng/1850-1851/faprem.htm").await.unwrap_err();
        assert!(matches!(err, SquadError::Fetch(_)));
        assert!(err.to_string().contains("404"));
        assert_eq!(requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let (base, requests) = serve(vec![text("503 Service Unavailable", "busy")]).await;
        let mut cfg = config(&base);
        cfg.max_retries = 2;
        let fetcher = HttpFetcher::new(&cfg).unwrap();

        assert!(fetcher.get_page("eng/2003-2004/faprem.htm").await.is_err());
        assert_eq!(requests.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_body_decoded_with_declared_charset() {
        let (base, _) = serve(vec![response(
            "200 OK",
            "text/html; charset=windows-1252",
            b"<td>Kak\xe1</td>",
        )])
        .await;
        let fetcher = HttpFetcher::new(&config(&base)).unwrap();

        let body = fetcher.get_page("brazil/2008/saopaulo.htm").await.unwrap();
        assert_eq!(body, "<td>Kak\u{e1}</td>");
    }

    #[test]
    fn test_locator_joins_base_url() {
        let fetcher = HttpFetcher::new(&config("https://www.footballsquads.co.uk")).unwrap();
        let url = fetcher.url("eng/2003-2004/faprem.htm").unwrap();
        assert_eq!(url.as_str(), "https://www.footballsquads.co.uk/eng/2003-2004/faprem.htm");

        let fetcher = HttpFetcher::new(&config("https://example.org/mirror/")).unwrap();
        let url = fetcher.url("/spain/2008-2009/spalali.htm").unwrap();
        assert_eq!(url.as_str(), "https://example.org/mirror/spain/2008-2009/spalali.htm");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HttpFetcher::new(&config("not a url")).is_err());
    }

    #[test]
    fn test_politeness_delay_within_bounds() {
        let mut cfg = config("https://example.org");
        cfg.min_delay_ms = 10;
        cfg.max_delay_ms = 20;
        let fetcher = HttpFetcher::new(&cfg).unwrap();
        for _ in 0..20 {
            let d = fetcher.politeness_delay();
            assert!(d >= Duration::from_millis(10) && d <= Duration::from_millis(20));
        }
    }
}
