use std::{env, path::PathBuf, str::FromStr};

use log::LevelFilter;
use thiserror::Error;

use crate::bop::BalanceOfPower;

const DEFAULT_OUTPUT_DIR: &str = ".rendered";
const DEFAULT_DATABASE_URL: &str = "sqlite:results.db";
const ACCEPTED_PARTIES: &[&str] = &["Dem", "GOP", "Yes", "No"];
const DISPLAY_SLOTS: usize = 2;
const WORKERS_PER_CORE: usize = 4;

// Curated "key race" list for the national house board
const SELECTED_HOUSE_RACES: &[&str] = &[
    "15038", "47019", "10031", "10019", "10041", "11586", "15999", "20645", "30015", "31211",
    "39015", "3004", "6618", "17009", "23805", "23811", "24028", "24010", "24013", "28385",
    "36581", "36604", "36599", "36602", "45893", "50068", "17073", "17071", "30155", "30992",
    "49548", "5715", "8514", "5741", "5697", "39023", "5711", "2015", "3006", "5714", "6615",
    "10025", "16001", "36603", "36583", "39013", "47007", "47009",
];

/// Deployment target selected at process start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
    Test,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "" | "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(ConfigError::UnknownEnvironment {
                value: other.to_string(),
            }),
        }
    }
}

impl Environment {
    pub fn from_env() -> Result<Self, ConfigError> {
        env::var("DEPLOYMENT_TARGET")
            .unwrap_or_default()
            .parse()
    }

    pub fn log_level(&self) -> LevelFilter {
        match self {
            Environment::Production => LevelFilter::Warn,
            _ => LevelFilter::Debug,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

/// What happens to the rest of a worker batch when one unit fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    FailFast,
    Collect,
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "fail-fast" | "failfast" => Ok(FailurePolicy::FailFast),
            "collect" => Ok(FailurePolicy::Collect),
            other => Err(ConfigError::Invalid {
                key: "RENDER_FAILURE_POLICY",
                value: other.to_string(),
            }),
        }
    }
}

/// Immutable settings for one render invocation, built once and shared.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    pub env: Environment,
    pub database_url: String,
    pub output_dir: PathBuf,
    pub accepted_parties: Vec<String>,
    pub display_slots: usize,
    pub senate_seed: BalanceOfPower,
    pub house_seed: BalanceOfPower,
    pub selected_house_races: Vec<String>,
    pub workers: usize,
    pub failure_policy: FailurePolicy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::for_env(Environment::Development)
    }
}

impl RenderConfig {
    pub fn for_env(env: Environment) -> Self {
        let database_url = match env {
            Environment::Test => "sqlite:results_test.db".to_string(),
            _ => DEFAULT_DATABASE_URL.to_string(),
        };
        Self {
            env,
            database_url,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            accepted_parties: ACCEPTED_PARTIES.iter().map(|p| p.to_string()).collect(),
            display_slots: DISPLAY_SLOTS,
            senate_seed: BalanceOfPower::senate_seed(),
            house_seed: BalanceOfPower::house_seed(),
            selected_house_races: SELECTED_HOUSE_RACES.iter().map(|r| r.to_string()).collect(),
            workers: default_workers(),
            failure_policy: FailurePolicy::FailFast,
        }
    }

    // Environment defaults, then any overrides from the shell
    pub fn load(target: Environment) -> Result<Self, ConfigError> {
        let mut config = Self::for_env(target);
        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = url;
        }
        if let Ok(dir) = env::var("RESULTS_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Ok(raw) = env::var("RENDER_WORKERS") {
            config.workers = parse_workers(&raw)?;
        }
        if let Ok(raw) = env::var("RENDER_FAILURE_POLICY") {
            config.failure_policy = raw.parse()?;
        }
        Ok(config)
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        * WORKERS_PER_CORE
}

fn parse_workers(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid {
            key: "RENDER_WORKERS",
            value: raw.to_string(),
        }),
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown deployment target '{value}' (expected development, staging, production or test)")]
    UnknownEnvironment { value: String },
    #[error("invalid value '{value}' for {key}")]
    Invalid { key: &'static str, value: String },
}
