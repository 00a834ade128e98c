use url::Url;

/// Query parameter carrying a user-supplied alternate news source.
pub const SOURCE_PARAM: &str = "api_url";

/// A single article fetch. Built per request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub category: String,
    pub custom_source_url: Option<String>,
    pub search_term: Option<String>,
}

impl FetchRequest {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            custom_source_url: None,
            search_term: None,
        }
    }

    /// Adds a search term. Blank terms are dropped, so the request stays a
    /// plain category fetch.
    pub fn with_search(mut self, term: &str) -> Self {
        let term = term.trim();
        self.search_term = (!term.is_empty()).then(|| term.to_string());
        self
    }

    /// Adds an alternate source URL. Blank URLs are dropped.
    pub fn with_source(mut self, url: &str) -> Self {
        let url = url.trim();
        self.custom_source_url = (!url.is_empty()).then(|| url.to_string());
        self
    }

    pub fn is_search(&self) -> bool {
        self.search_term.is_some()
    }

    /// Query pairs in wire order: `category`, then `search`, then the source.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![("category", self.category.as_str())];
        if let Some(term) = self.search_term.as_deref().filter(|t| !t.trim().is_empty()) {
            pairs.push(("search", term));
        }
        if let Some(url) = self.custom_source_url.as_deref() {
            pairs.push((SOURCE_PARAM, url));
        }
        pairs
    }

    /// `endpoint` with this request's query string (form-urlencoded).
    pub fn to_url(&self, endpoint: &Url) -> Url {
        let mut url = endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(self.query_pairs());
        url
    }
}
