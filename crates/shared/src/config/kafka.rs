use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaResult;
use rdkafka::producer::{BaseProducer, BaseRecord, Producer};
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{error, info, warn};

use crate::abstract_trait::KafkaTrait;
use crate::errors::ServiceError;

const FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

pub struct Kafka {
    producer: Arc<BaseProducer>,
}

impl Kafka {
    pub fn new(brokers: &str) -> KafkaResult<Self> {
        let producer: BaseProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "6000")
            .set("allow.auto.create.topics", "true")
            .create()?;

        info!("Kafka producer connected successfully");

        Ok(Kafka {
            producer: Arc::new(producer),
        })
    }

    /// Enqueues a message. Delivery continues in the background once this
    /// returns `Ok`.
    pub fn send_message(&self, topic: &str, key: &str, value: &[u8]) -> KafkaResult<()> {
        if let Err((kafka_error, _record)) = self
            .producer
            .send(BaseRecord::to(topic).key(key).payload(value))
        {
            error!(topic, key, "Failed to enqueue message: {kafka_error}");
            return Err(kafka_error);
        }

        info!(topic, key, "Message enqueued");
        Ok(())
    }

    // A flush timeout leaves the message queued, so it is only logged.
    async fn flush(&self) {
        let producer = Arc::clone(&self.producer);

        match tokio::task::spawn_blocking(move || producer.flush(FLUSH_TIMEOUT)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Kafka flush did not complete: {e}"),
            Err(e) => warn!("Kafka flush task failed: {e}"),
        }
    }
}

#[async_trait]
impl KafkaTrait for Kafka {
    async fn publish(&self, topic: &str, key: &str, value: &[u8]) -> Result<(), ServiceError> {
        self.send_message(topic, key, value)?;
        self.flush().await;
        Ok(())
    }
}
