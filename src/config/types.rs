use serde::Deserialize;

/// Main configuration structure
///
/// Every section and key has a built-in default so a partial (or absent)
/// file still yields a complete configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub reseed: ReseedConfig,
    pub summarizer: SummarizerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub search: SearchConfig,
    pub output: OutputConfig,
}

/// Crawl budget and seed configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum link depth followed from a depth-0 entry
    pub max_depth: u32,

    /// Maximum number of frontier pops per run
    pub max_pages: u32,

    /// Newline-delimited seed URL file
    pub seed_file: String,

    /// Extra seeds appended after the seed file's entries
    pub seed_urls: Vec<String>,

    /// Number of body characters kept in a document snippet
    pub snippet_length: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_pages: 100,
            seed_file: "config/seeds.txt".to_string(),
            seed_urls: Vec::new(),
            snippet_length: 200,
        }
    }
}

/// What the re-seed policy queries with when no page context is available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReseedFallback {
    /// Use the first configured seed URL as the query
    FirstSeed,
    /// Skip the cycle
    #[serde(rename = "none")]
    Skip,
}

/// Search-driven frontier re-seeding configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ReseedConfig {
    pub enabled: bool,

    /// Re-seed every N processed pages
    pub interval_pages: u32,

    /// Results requested from each engine per cycle
    pub results_per_engine: usize,

    /// Query with the latest page summary when one exists
    pub prefer_summary: bool,

    pub fallback: ReseedFallback,

    /// Engine names, queried in order
    pub engines: Vec<String>,
}

impl Default for ReseedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_pages: 20,
            results_per_engine: 2,
            prefer_summary: true,
            fallback: ReseedFallback::FirstSeed,
            engines: vec!["google".to_string(), "duckduckgo".to_string()],
        }
    }
}

/// LLM summarization configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SummarizerConfig {
    pub enabled: bool,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Disable summarization when the API key is absent
    pub require_api_key: bool,

    /// OpenAI-compatible API root
    pub base_url: String,

    /// Model name; `OPENROUTER_DEFAULT_MODEL` overrides it when set
    pub model: String,

    pub max_tokens: u32,

    /// Number of body characters sent to the model
    pub prompt_chars: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            require_api_key: true,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "gryphe/mythomist-7b:free".to_string(),
            max_tokens: 150,
            prompt_chars: 2000,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    pub crawler_name: String,
    pub crawler_version: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "AISANS-Crawler".to_string(),
            crawler_version: "0.1".to_string(),
            timeout_secs: 10,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

/// External search engine credentials
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SearchConfig {
    pub google_api_key_env: String,
    pub google_cse_id_env: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            google_api_key_env: "GOOGLE_API_KEY".to_string(),
            google_cse_id_env: "GOOGLE_CSE_ID".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite full-text index
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "aisans_index.db".to_string(),
        }
    }
}
