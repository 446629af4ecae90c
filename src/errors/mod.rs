use anyhow::Context as _;

/// Why a results supplier could not hand back a swimmer's results
#[derive(Debug, thiserror::Error)]
pub enum SupplyError {
    /// The link is neither a USMS SwimmerID nor a usable URL / path.
    #[error("Invalid results link: {0}")]
    InvalidLink(String),

    /// The source answered but listed no results.
    #[error("No results found for {0}")]
    NoResults(String),

    /// The source could not be reached or read.
    #[error("Results source unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The source answered with something we could not understand.
    #[error("Malformed results data: {0}")]
    Malformed(String),
}

impl SupplyError {
    /// Failures worth retrying against a fallback supplier
    pub fn allows_fallback(&self) -> bool {
        matches!(self, SupplyError::NoResults(_) | SupplyError::UpstreamUnavailable(_))
    }

    pub fn upstream(err: anyhow::Error) -> Self {
        SupplyError::UpstreamUnavailable(format!("{:#}", err))
    }
}

/// Add context to fetch errors
pub fn fetch_context(url: &str) -> String {
    format!("Failed to fetch from: {}", url)
}

/// Add context to parse errors
pub fn parse_context(data_type: &str) -> String {
    format!("Failed to parse {}", data_type)
}

/// Add context to cache errors
pub fn cache_context(operation: &str, key: &str) -> String {
    format!("Failed to {} cache for key: {}", operation, key)
}

/// Wrap result with fetch context
pub fn with_fetch_context<T, E>(result: Result<T, E>, url: &str) -> anyhow::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    result.context(fetch_context(url))
}

/// Wrap result with parse context
pub fn with_parse_context<T, E>(result: Result<T, E>, data_type: &str) -> anyhow::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    result.context(parse_context(data_type))
}
