use crate::handler::{CommandEnvelope, CommandReply, ProductCommandHandler};
use anyhow::Result;
use rdkafka::{
    Message,
    config::ClientConfig,
    consumer::{Consumer, StreamConsumer},
    error::KafkaResult,
};
use shared::abstract_trait::DynKafka;
use tokio::{
    sync::broadcast,
    time::{Duration, sleep},
};
use tracing::{debug, error, info, warn};

/// Consumes command envelopes and publishes one reply per command.
pub struct KafkaCommandConsumer {
    consumer: StreamConsumer,
    responder: CommandResponder,
    command_topic: String,
}

/// Everything needed to answer a message once it has left the broker.
#[derive(Clone)]
pub struct CommandResponder {
    handler: ProductCommandHandler,
    producer: DynKafka,
    reply_topic: String,
}

impl CommandResponder {
    pub fn new(
        handler: ProductCommandHandler,
        producer: DynKafka,
        reply_topic: impl Into<String>,
    ) -> Self {
        Self {
            handler,
            producer,
            reply_topic: reply_topic.into(),
        }
    }

    /// Handles one raw message. Returns the reply that was published, or
    /// `None` when the message could not be decoded.
    pub async fn handle_message(&self, key: Option<&str>, payload: &[u8]) -> Option<CommandReply> {
        let envelope: CommandEnvelope = match serde_json::from_slice(payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                error!(key = ?key, "Failed to deserialize command envelope: {e}");
                return None;
            }
        };

        let correlation_id = envelope
            .correlation_id
            .clone()
            .or_else(|| key.map(str::to_string));

        debug!(cmd = %envelope.cmd, correlation_id = ?correlation_id, "Command received");

        let result = self.handler.dispatch(&envelope.cmd, envelope.payload).await;
        if let Err(e) = &result {
            warn!(cmd = %envelope.cmd, kind = e.kind(), "Command failed: {e}");
        }

        let reply = CommandReply::from_result(correlation_id.clone(), result);

        let body = match serde_json::to_vec(&reply) {
            Ok(body) => body,
            Err(e) => {
                error!(cmd = %envelope.cmd, "Failed to serialize reply: {e}");
                return None;
            }
        };

        let topic = envelope.reply_to.as_deref().unwrap_or(&self.reply_topic);
        let reply_key = correlation_id.as_deref().unwrap_or_default();

        match self.producer.publish(topic, reply_key, &body).await {
            Ok(()) => info!(cmd = %envelope.cmd, topic, "✅ Reply published"),
            Err(e) => error!(cmd = %envelope.cmd, topic, "Failed to publish reply: {e}"),
        }

        Some(reply)
    }
}

impl KafkaCommandConsumer {
    pub fn new(
        brokers: &str,
        group_id: &str,
        command_topic: impl Into<String>,
        responder: CommandResponder,
    ) -> KafkaResult<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.partition.eof", "false")
            .set("session.timeout.ms", "6000")
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "latest")
            .create()?;

        Ok(Self {
            consumer,
            responder,
            command_topic: command_topic.into(),
        })
    }

    pub async fn start_with_shutdown(self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        self.consumer.subscribe(&[self.command_topic.as_str()])?;

        info!(
            "✅ Kafka consumer started, subscribed to {}",
            self.command_topic
        );

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("🛑 Kafka consumer received shutdown signal");
                    break;
                }

                message_result = self.consumer.recv() => {
                    let message = match message_result {
                        Ok(message) => message,
                        Err(e) => {
                            error!("Kafka receive error: {e}");
                            sleep(Duration::from_secs(5)).await;
                            continue;
                        }
                    };

                    let topic = message.topic().to_string();

                    let Some(payload) = message.payload() else {
                        error!(topic, "Empty message payload");
                        continue;
                    };
                    debug!(topic, payload_len = payload.len(), "Payload received");

                    let key = message.key().and_then(|k| std::str::from_utf8(k).ok());
                    if key.is_none() {
                        debug!(topic, "Message has no key");
                    }

                    self.responder.handle_message(key, payload).await;
                }
            }
        }

        info!("✅ Kafka consumer stopped gracefully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        repository::memory::InMemoryProductRepository,
        service::{command::ProductCommandService, query::ProductQueryService},
    };
    use async_trait::async_trait;
    use prometheus_client::registry::Registry;
    use serde_json::json;
    use shared::{abstract_trait::KafkaTrait, errors::ServiceError};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingProducer {
        sent: Mutex<Vec<(String, String, Vec<u8>)>>,
    }

    #[async_trait]
    impl KafkaTrait for RecordingProducer {
        async fn publish(&self, topic: &str, key: &str, value: &[u8]) -> Result<(), ServiceError> {
            self.sent
                .lock()
                .unwrap()
                .push((topic.to_string(), key.to_string(), value.to_vec()));
            Ok(())
        }
    }

    fn responder(producer: Arc<RecordingProducer>) -> CommandResponder {
        let repo = InMemoryProductRepository::new();
        let mut registry = Registry::default();
        let query = ProductQueryService::new(Arc::new(repo.clone()), &mut registry);
        let command =
            ProductCommandService::new(Arc::new(repo.clone()), Arc::new(repo), &mut registry);

        CommandResponder::new(
            ProductCommandHandler::new(Arc::new(query), Arc::new(command)),
            producer,
            "product.replies",
        )
    }

    #[tokio::test]
    async fn reply_goes_to_reply_to_topic() {
        let producer = Arc::new(RecordingProducer::default());
        let responder = responder(producer.clone());

        let body = serde_json::to_vec(&json!({
            "cmd": "create_product",
            "payload": { "name": "Pen", "price": 1.5 },
            "correlation_id": "req-1",
            "reply_to": "gateway.replies"
        }))
        .unwrap();

        let reply = responder.handle_message(None, &body).await.unwrap();
        assert!(reply.is_success());

        let sent = producer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "gateway.replies");
        assert_eq!(sent[0].1, "req-1");
    }

    #[tokio::test]
    async fn failures_reply_on_default_topic_keyed_by_message_key() {
        let producer = Arc::new(RecordingProducer::default());
        let responder = responder(producer.clone());

        let body = serde_json::to_vec(&json!({
            "cmd": "find_one_product",
            "payload": { "id": 9 }
        }))
        .unwrap();

        let reply = responder.handle_message(Some("k-9"), &body).await.unwrap();

        let CommandReply::Error {
            correlation_id,
            error,
        } = reply
        else {
            panic!("expected an error reply");
        };
        assert_eq!(correlation_id.as_deref(), Some("k-9"));
        assert_eq!(error.code, 404);

        let sent = producer.sent.lock().unwrap();
        assert_eq!(sent[0].0, "product.replies");
        assert_eq!(sent[0].1, "k-9");
    }

    #[tokio::test]
    async fn undecodable_envelope_is_skipped() {
        let producer = Arc::new(RecordingProducer::default());
        let responder = responder(producer.clone());

        assert!(responder.handle_message(None, b"not json").await.is_none());
        assert!(producer.sent.lock().unwrap().is_empty());
    }
}
