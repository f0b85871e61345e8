//! HTTP-fetch collaborator seam

/// Dereferences imported URLs so their transactions land in the capture store
///
/// The engine only requires "visit happened or was skipped"; response
/// handling belongs to the transaction capture collaborator.
#[async_trait::async_trait]
pub trait UrlVisitor: Send + Sync {
    async fn visit(&self, url: &str);
}

/// Default visitor issuing a plain GET and discarding the response
pub struct HttpUrlVisitor {
    client: reqwest::Client,
}

impl HttpUrlVisitor {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpUrlVisitor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl UrlVisitor for HttpUrlVisitor {
    async fn visit(&self, url: &str) {
        match self.client.get(url).send().await {
            Ok(response) => log::debug!("Visited {} ({})", url, response.status()),
            Err(e) => log::debug!("Visit failed for {}: {}", url, e),
        }
    }
}

/// Visitor that does nothing; used when dereferencing is disabled
pub struct NullVisitor;

#[async_trait::async_trait]
impl UrlVisitor for NullVisitor {
    async fn visit(&self, _url: &str) {}
}
