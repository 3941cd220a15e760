use serde::Deserialize;

/// Main configuration structure for crane
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub site: SiteConfig,
    pub login: LoginConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of concurrent crawl workers
    #[serde(rename = "max-concurrent-pages")]
    pub max_concurrent_pages: u32,

    /// Maximum retry attempts for a failed page fetch
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base backoff delay between retries (milliseconds, doubles per attempt)
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,

    /// Timeout for a single page fetch/render (seconds)
    #[serde(rename = "fetch-timeout-secs")]
    pub fetch_timeout_secs: u64,

    /// How slide indices behave when one lesson title spans several pages
    #[serde(rename = "slide-numbering", default)]
    pub slide_numbering: SlideNumbering,
}

/// Slide index policy for lesson titles that repeat across pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlideNumbering {
    /// Each fetched page numbers its slides from 1
    #[default]
    PerPage,

    /// Numbering continues across pages that share a title
    Continuous,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// The lesson-list page that seeds the crawl
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// URL path fragment identifying the login boundary
    #[serde(rename = "login-path")]
    pub login_path: String,

    /// Selector that only appears once the session is established
    #[serde(rename = "success-marker")]
    pub success_marker: String,
}

/// Login flow configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoginConfig {
    /// Which login strategy to run at the session boundary
    #[serde(default)]
    pub mode: LoginMode,

    /// Account email (credentials mode)
    #[serde(default)]
    pub email: String,

    /// Account password (credentials mode)
    #[serde(default)]
    pub password: String,

    /// How long to wait for the post-login marker (seconds)
    #[serde(rename = "login-timeout-secs", default = "default_login_timeout")]
    pub login_timeout_secs: u64,

    /// Anchor that starts the external sign-in flow
    #[serde(rename = "entry-link", default = "default_entry_link")]
    pub entry_link: String,

    /// Selector for the email input field
    #[serde(rename = "email-field", default = "default_email_field")]
    pub email_field: String,

    /// Selector for the button advancing past the email step
    #[serde(rename = "email-next", default = "default_email_next")]
    pub email_next: String,

    /// Selector for the password input field
    #[serde(rename = "password-field", default = "default_password_field")]
    pub password_field: String,

    /// Selector for the final submit button
    #[serde(rename = "password-next", default = "default_password_next")]
    pub password_next: String,
}

/// Login strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoginMode {
    /// Fill stored credentials into the rendered form
    #[default]
    Credentials,

    /// Suspend and wait for an operator to finish login by hand
    Assisted,
}

fn default_login_timeout() -> u64 {
    120
}

fn default_entry_link() -> String {
    "a#googlelogin_check".to_string()
}

fn default_email_field() -> String {
    "input[type='email']".to_string()
}

fn default_email_next() -> String {
    "#identifierNext".to_string()
}

fn default_password_field() -> String {
    "input[type='password']".to_string()
}

fn default_password_next() -> String {
    "#passwordNext".to_string()
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the export file
    pub path: String,

    /// Serialization format for the export stage
    pub format: crate::export::ExportFormat,

    /// Remove literal delimiter characters from extracted text before storage
    #[serde(rename = "strip-delimiters", default = "default_strip_delimiters")]
    pub strip_delimiters: bool,
}

fn default_strip_delimiters() -> bool {
    true
}
