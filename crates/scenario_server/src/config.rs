//! Server configuration management
//!
//! Handles loading configuration from TOML files, `SCENARIO_*` environment
//! variables and CLI arguments.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use scenario_core::baseline::{EBITDA, FX_RATE, NET_INCOME, REVENUE, TAX_RATE};
use scenario_core::quality::{Anomaly, CheckStatus, Severity, ValidationResult};
use scenario_core::{FiscalQuarter, ImpactConfig, MetricsSnapshot, QualityReport};
use scenario_narrative::{GeneratorConfig, Provider};

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid port number: {0}. Must be between 1 and 65535")]
    InvalidPort(String),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: text, json")]
    InvalidLogFormat(String),

    #[error("Invalid socket address: {0}")]
    InvalidAddress(String),

    #[error("Invalid impact configuration: {0}")]
    InvalidImpact(String),

    #[error("Invalid baseline configuration: {0}")]
    InvalidBaseline(String),

    #[error("Invalid quality report: {0}")]
    InvalidQuality(String),

    #[error("Invalid forms configuration: {0}")]
    InvalidForms(String),

    #[error("Invalid generator configuration: {0}")]
    InvalidGenerator(String),

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),
}

/// Log levels supported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Every level, most verbose first
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    /// Directive understood by `EnvFilter`
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_filter_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::InvalidLogLevel(s.to_string()))
    }
}

impl TryFrom<String> for LogLevel {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, <LogLevel as TryFrom<String>>::Error> {
        value.parse()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

impl TryFrom<String> for LogFormat {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, <LogLevel as TryFrom<String>>::Error> {
        value.parse()
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        })
    }
}

/// Baseline metrics served when a request does not carry its own baseline.
///
/// `current` must hold revenue, EBITDA and net income; tax and FX rates
/// default when absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    /// Label of the current period; forecasts start with the next quarter
    pub period: FiscalQuarter,
    /// Current period metrics
    pub current: BTreeMap<String, f64>,
    /// Same period one year earlier
    pub previous: BTreeMap<String, f64>,
    /// Market conditions note passed to narratives
    pub market_conditions: Option<String>,
    /// Best performing segment
    pub top_segment: Option<String>,
    /// Worst performing segment
    pub bottom_segment: Option<String>,
}

/// Last reported quarter of the bundled baseline.
const DEFAULT_BASELINE_PERIOD: FiscalQuarter = match FiscalQuarter::new(2023, 2) {
    Some(period) => period,
    None => FiscalQuarter::first_of(2023),
};

impl Default for BaselineConfig {
    fn default() -> Self {
        let current = [
            (REVENUE, 100_000_000.0),
            (EBITDA, 17_000_000.0),
            (NET_INCOME, 11_050_000.0),
            (TAX_RATE, 25.0),
            (FX_RATE, 1.10),
        ];
        let previous = [
            (REVENUE, 93_300_000.0),
            (EBITDA, 16_400_000.0),
            (NET_INCOME, 10_700_000.0),
        ];
        Self {
            period: DEFAULT_BASELINE_PERIOD,
            current: current.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            previous: previous.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            market_conditions: Some(
                "Moderate demand growth with rising input costs".to_string(),
            ),
            top_segment: Some("Enterprise Software".to_string()),
            bottom_segment: Some("Legacy Hardware".to_string()),
        }
    }
}

impl BaselineConfig {
    /// Snapshot handed to the baseline source.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            current: self.current.clone(),
            previous: self.previous.clone(),
            market_conditions: self.market_conditions.clone(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let baseline = self
            .snapshot()
            .to_baseline()
            .map_err(|e| ConfigError::InvalidBaseline(e.to_string()))?;
        baseline
            .ensure_finite()
            .map_err(|e| ConfigError::InvalidBaseline(e.to_string()))
    }
}

/// Data quality report served when no other source is wired in.
///
/// A `[quality]` table replaces this report as a whole; omitted keys in it
/// are zero or empty.
pub fn default_quality_report() -> QualityReport {
    let anomaly =
        |[entity, field, value, expected]: [&str; 4], severity: Severity, description: &str| {
            Anomaly {
                entity: entity.to_string(),
                field: field.to_string(),
                value: value.to_string(),
                expected: expected.to_string(),
                severity,
                description: description.to_string(),
            }
        };
    let check = |name: &str, status: CheckStatus, description: &str| ValidationResult {
        check: name.to_string(),
        status,
        description: description.to_string(),
    };

    QualityReport {
        overall_score: 92.0,
        previous_score: 87.0,
        completeness: 95.0,
        accuracy: 90.0,
        consistency: 89.0,
        timeliness: 94.0,
        critical_issues: 2,
        data_sources: vec!["ERP".to_string(), "Planning".to_string(), "Spreadsheets".to_string()],
        anomalies: vec![
            anomaly(
                ["Revenue", "Amount", "1,000", "1,000,000"],
                Severity::High,
                "Amount is three orders of magnitude below the trend",
            ),
            anomaly(
                ["FX Rates", "EUR/USD", "1.02, 1.08", "Single rate"],
                Severity::High,
                "Departments translate with different rates",
            ),
            anomaly(
                ["Cost of Sales", "Category", "Missing", "COGS"],
                Severity::Medium,
                "Cost category missing for some regional entries",
            ),
        ],
        validation_results: vec![
            check(
                "Revenue Completeness",
                CheckStatus::Passed,
                "All revenue entries present for the period",
            ),
            check(
                "Cost Allocation",
                CheckStatus::Warning,
                "Some cost entries lack a department",
            ),
            check(
                "Intercompany Eliminations",
                CheckStatus::Failed,
                "Intercompany balances not fully eliminated",
            ),
        ],
    }
}

/// Limits for the subscription and contact form endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Stored subscriptions before new ones are refused
    pub max_subscriptions: usize,
    /// Stored contact messages before new ones are refused
    pub max_messages: usize,
    /// Longest accepted contact message, in characters
    pub max_message_chars: usize,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            max_subscriptions: 10_000,
            max_messages: 10_000,
            max_message_chars: 5_000,
        }
    }
}

impl FormsConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_message_chars == 0 {
            return Err(ConfigError::InvalidForms(
                "max_message_chars must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Server configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Log format
    pub log_format: LogFormat,
    /// Shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
    /// Calculator constants and risk thresholds
    pub impact: ImpactConfig,
    /// Default baseline
    pub baseline: BaselineConfig,
    /// Data quality report
    pub quality: QualityReport,
    /// Form endpoint limits
    pub forms: FormsConfig,
    /// Text generator
    pub generator: GeneratorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: LogLevel::Info,
            log_format: LogFormat::Text,
            shutdown_timeout_secs: 30,
            impact: ImpactConfig::default(),
            baseline: BaselineConfig::default(),
            quality: default_quality_report(),
            forms: FormsConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvError(format!("{}: cannot parse '{}'", name, value)))
}

impl ServerConfig {
    /// Create a new ServerConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML configuration
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Override fields from `SCENARIO_*` variables returned by `lookup`.
    ///
    /// Only variables that are present override; everything else is left as is.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SCENARIO_SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("SCENARIO_SERVER_PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        if let Some(level) = lookup("SCENARIO_LOG_LEVEL") {
            self.log_level = LogLevel::from_str(&level)?;
        }
        if let Some(format) = lookup("SCENARIO_LOG_FORMAT") {
            self.log_format = LogFormat::from_str(&format)?;
        }
        if let Some(timeout) = lookup("SCENARIO_SHUTDOWN_TIMEOUT_SECS") {
            self.shutdown_timeout_secs = parse_env("SCENARIO_SHUTDOWN_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(ratio) = lookup("SCENARIO_INTERNATIONAL_EXPOSURE") {
            self.impact.international_exposure =
                parse_env("SCENARIO_INTERNATIONAL_EXPOSURE", &ratio)?;
        }
        if let Some(provider) = lookup("SCENARIO_GENERATOR_PROVIDER") {
            self.generator.provider = Provider::from_str(&provider)
                .map_err(ConfigError::InvalidGenerator)?;
        }
        if let Some(url) = lookup("SCENARIO_GENERATOR_BASE_URL") {
            self.generator.base_url = Some(url);
        }
        if let Some(model) = lookup("SCENARIO_GENERATOR_MODEL") {
            self.generator.model = Some(model);
        }
        if let Some(timeout) = lookup("SCENARIO_GENERATOR_TIMEOUT_MS") {
            self.generator.timeout_ms = parse_env("SCENARIO_GENERATOR_TIMEOUT_MS", &timeout)?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate port range
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port.to_string()));
        }

        self.impact
            .validate()
            .map_err(|e| ConfigError::InvalidImpact(e.to_string()))?;
        self.baseline.validate()?;
        self.quality
            .validate()
            .map_err(|e| ConfigError::InvalidQuality(e.to_string()))?;
        self.forms.validate()?;
        self.generator
            .validate()
            .map_err(ConfigError::InvalidGenerator)?;

        Ok(())
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parse the socket address
    pub fn parsed_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = self.socket_addr();
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(host) = &cli.host {
            self.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = LogLevel::from_str(log_level)?;
        }
        if let Some(log_format) = &cli.log_format {
            self.log_format = LogFormat::from_str(log_format)?;
        }
        if let Some(provider) = &cli.provider {
            self.generator.provider =
                Provider::from_str(provider).map_err(ConfigError::InvalidGenerator)?;
        }
        Ok(())
    }
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Host address override
    pub host: Option<String>,
    /// Port override
    pub port: Option<u16>,
    /// Log level override
    pub log_level: Option<String>,
    /// Log format override
    pub log_format: Option<String>,
    /// Generator provider override
    pub provider: Option<String>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<ServerConfig, ConfigError> {
    build_config_with_env(cli, |name| std::env::var(name).ok())
}

/// [`build_config`] with an explicit environment lookup.
pub fn build_config_with_env<F>(cli: &CliArgs, lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // Start with defaults or file config
    let mut config = if let Some(config_path) = &cli.config_file {
        ServerConfig::from_file(config_path)?
    } else {
        ServerConfig::default()
    };

    config.apply_env(lookup)?;
    config.merge_with_cli(cli)?;

    // Final validation
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.shutdown_timeout_secs, 30);
        assert_eq!(config.impact, ImpactConfig::default());
        assert_eq!(config.generator.provider, Provider::Disabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_baseline_is_reference_case() {
        let baseline = BaselineConfig::default().snapshot().to_baseline().unwrap();
        assert_eq!(baseline.revenue, 100_000_000.0);
        assert_eq!(baseline.ebitda, 17_000_000.0);
        assert_eq!(baseline.net_income, 11_050_000.0);
        assert_eq!(baseline.tax_rate, 25.0);
        assert_eq!(baseline.fx_rate, 1.10);
    }

    #[test]
    fn test_log_level_parsing() {
        for level in LogLevel::ALL {
            let upper = level.as_filter_str().to_uppercase();
            assert_eq!(LogLevel::from_str(&upper).unwrap(), level);
            assert_eq!(level.to_string().parse::<LogLevel>().unwrap(), level);
        }
        assert!(LogLevel::from_str("verbose").is_err());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("TEXT").unwrap(), LogFormat::Text);
        assert!(LogFormat::from_str("xml").is_err());
        assert_eq!(format!("{}", LogFormat::Json), "json");
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            ..Default::default()
        };
        assert_eq!(config.socket_addr(), "127.0.0.1:3000");
        assert_eq!(config.parsed_socket_addr().unwrap().port(), 3000);

        let config = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.parsed_socket_addr(),
            Err(ConfigError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_validate_port() {
        let mut config = ServerConfig::default();
        config.port = 0;
        assert!(config.validate().is_err());

        config.port = 65535;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_impact_and_baseline() {
        let mut config = ServerConfig::default();
        config.impact.international_exposure = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidImpact(_))
        ));

        let mut config = ServerConfig::default();
        config.baseline.current.remove(EBITDA);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseline(_))
        ));
    }

    #[test]
    fn test_validate_quality_and_forms() {
        let mut config = ServerConfig::default();
        config.quality.consistency = 140.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidQuality(_))
        ));

        let mut config = ServerConfig::default();
        config.forms.max_message_chars = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidForms(_))));
    }

    #[test]
    fn test_quality_table_replaces_default_report() {
        let toml_str = r#"
            [quality]
            overall_score = 70.0
            previous_score = 75.0

            [[quality.validation_results]]
            check = "Ledger Balance"
            status = "Failed"
            description = "Trial balance out by 12"

            [forms]
            max_subscriptions = 5
        "#;

        let config = ServerConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.quality.metrics().overall_score_change, -5.0);
        assert!(config.quality.anomalies.is_empty());
        assert_eq!(config.quality.validation_results[0].status, CheckStatus::Failed);
        assert_eq!(config.forms.max_subscriptions, 5);
        assert_eq!(config.forms.max_messages, 10_000);
    }

    #[test]
    fn test_cli_args_merge() {
        let mut config = ServerConfig::default();
        let cli = CliArgs {
            host: Some("192.168.1.1".to_string()),
            port: Some(9000),
            log_level: Some("debug".to_string()),
            log_format: Some("json".to_string()),
            provider: Some("ollama".to_string()),
            config_file: None,
        };

        config.merge_with_cli(&cli).unwrap();

        assert_eq!(config.host, "192.168.1.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.generator.provider, Provider::Ollama);
    }

    #[test]
    fn test_cli_rejects_bad_log_level() {
        let mut config = ServerConfig::default();
        let cli = CliArgs {
            log_level: Some("loud".to_string()),
            ..Default::default()
        };
        assert!(config.merge_with_cli(&cli).is_err());
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
            host = "127.0.0.1"
            port = 3000
            log_level = "debug"
            log_format = "json"
            shutdown_timeout_secs = 60

            [impact]
            international_exposure = 0.25

            [impact.thresholds.fx]
            high = 2000000.0
            medium = 750000.0

            [baseline]
            period = "2024-Q1"
            market_conditions = "Recovering demand"

            [baseline.current]
            revenue = 50000000.0
            ebitda = 8000000.0
            net_income = 5000000.0

            [generator]
            provider = "openai"
            model = "gpt-4o-mini"
            timeout_ms = 10000
        "#;

        let config = ServerConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.shutdown_timeout_secs, 60);
        assert_eq!(config.impact.international_exposure, 0.25);
        assert_eq!(config.impact.thresholds.fx.high, 2_000_000.0);
        // Unspecified categories keep their defaults
        assert_eq!(config.impact.thresholds.overall.high, -10.0);
        assert_eq!(config.baseline.period.to_string(), "2024-Q1");
        assert_eq!(config.baseline.current[REVENUE], 50_000_000.0);
        // Missing sections fall back to the defaults
        assert_eq!(config.baseline.previous, BaselineConfig::default().previous);
        assert_eq!(config.generator.provider, Provider::OpenAi);
        assert_eq!(config.generator.effective_model(), "gpt-4o-mini");
        assert_eq!(config.generator.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_partial_toml_deserialization() {
        let toml_str = r#"
            port = 9000
        "#;

        let config: ServerConfig = toml::from_str(toml_str).unwrap();
        // Should use defaults for unspecified fields
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.baseline, BaselineConfig::default());
        assert_eq!(config.quality, default_quality_report());
    }

    #[test]
    fn test_invalid_toml_threshold_order() {
        let toml_str = r#"
            [impact.thresholds.execution]
            high = 2.0
            medium = 5.0
        "#;
        assert!(matches!(
            ServerConfig::from_toml_str(toml_str),
            Err(ConfigError::InvalidImpact(_))
        ));
    }

    #[test]
    fn test_apply_env_overrides_only_present_variables() {
        let env: HashMap<&str, &str> = [
            ("SCENARIO_SERVER_PORT", "9090"),
            ("SCENARIO_LOG_FORMAT", "json"),
            ("SCENARIO_GENERATOR_PROVIDER", "ollama"),
            ("SCENARIO_GENERATOR_MODEL", "mistral"),
            ("SCENARIO_INTERNATIONAL_EXPOSURE", "0.3"),
        ]
        .into_iter()
        .collect();

        let mut config = ServerConfig::default();
        config
            .apply_env(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9090);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.generator.provider, Provider::Ollama);
        assert_eq!(config.generator.model.as_deref(), Some("mistral"));
        assert_eq!(config.impact.international_exposure, 0.3);
    }

    #[test]
    fn test_apply_env_rejects_bad_values() {
        let mut config = ServerConfig::default();
        let result = config.apply_env(|name| {
            (name == "SCENARIO_SERVER_PORT").then(|| "eighty".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidPort(_))));

        let result = config.apply_env(|name| {
            (name == "SCENARIO_GENERATOR_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(ConfigError::EnvError(_))));
    }

    #[test]
    fn test_build_config_priority() {
        let cli = CliArgs {
            port: Some(7000),
            ..Default::default()
        };
        let config = build_config_with_env(&cli, |name| match name {
            "SCENARIO_SERVER_PORT" => Some("9090".to_string()),
            "SCENARIO_SERVER_HOST" => Some("127.0.0.1".to_string()),
            _ => None,
        })
        .unwrap();

        // CLI beats env, env beats defaults
        assert_eq!(config.port, 7000);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn test_build_config_with_defaults() {
        let config = build_config_with_env(&CliArgs::default(), no_env).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidPort("0".to_string());
        assert!(err.to_string().contains("Invalid port"));

        let err = ConfigError::InvalidLogLevel("bad".to_string());
        assert!(err.to_string().contains("Invalid log level"));

        let err = ConfigError::InvalidGenerator("bad".to_string());
        assert!(err.to_string().contains("Invalid generator"));
    }
}
