use anyhow::{Context, Result, anyhow};

pub const DEFAULT_COMMAND_TOPIC: &str = "product.commands";
pub const DEFAULT_REPLY_TOPIC: &str = "product.replies";
pub const DEFAULT_CONSUMER_GROUP: &str = "product-service-group";
pub const DEFAULT_OTEL_ENDPOINT: &str = "http://otel-collector:4317";

#[derive(Debug, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
    pub command_topic: String,
    pub reply_topic: String,
    pub consumer_group: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_conn: u32,
    pub run_migrations: bool,
    pub metric_port: u16,
    pub kafka: KafkaConfig,
    pub otel_endpoint: String,
    pub is_dev: bool,
}

impl Config {
    pub fn init() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key).with_context(|| format!("Missing environment variable: {key}"))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());

        let database_url = required("DATABASE_URL")?;
        let brokers = required("KAFKA")?;

        let run_migrations = parse_bool("RUN_MIGRATIONS", &or_default("RUN_MIGRATIONS", "true"))?;
        let is_dev = parse_bool("DEV_MODE", &or_default("DEV_MODE", "false"))?;

        let metric_port = or_default("PRODUCT_METRIC_PORT", "8080")
            .parse::<u16>()
            .context("PRODUCT_METRIC_PORT must be a valid u16 integer")?;

        let db_max_conn = or_default("DB_MAX_CONN", "5")
            .parse::<u32>()
            .context("DB_MAX_CONN must be a valid u32 integer")?;

        Ok(Self {
            database_url,
            db_max_conn,
            run_migrations,
            metric_port,
            kafka: KafkaConfig {
                brokers,
                command_topic: or_default("PRODUCT_COMMAND_TOPIC", DEFAULT_COMMAND_TOPIC),
                reply_topic: or_default("PRODUCT_REPLY_TOPIC", DEFAULT_REPLY_TOPIC),
                consumer_group: or_default("PRODUCT_CONSUMER_GROUP", DEFAULT_CONSUMER_GROUP),
            },
            otel_endpoint: or_default("OTEL_ENDPOINT", DEFAULT_OTEL_ENDPOINT),
            is_dev,
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(anyhow!("{key} must be 'true' or 'false', got '{other}'")),
    }
}
