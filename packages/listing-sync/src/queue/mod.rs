//! Queue transport: NATS publisher and the consumer loop.

pub mod consumer;
pub mod nats;

pub use consumer::{run_consumer, ConsumerStats};
pub use nats::NatsQueue;
