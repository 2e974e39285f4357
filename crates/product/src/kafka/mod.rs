mod consumer;

pub use self::consumer::{CommandResponder, KafkaCommandConsumer};
