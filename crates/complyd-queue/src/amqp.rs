//! RabbitMQ-backed queue implementation.

use async_trait::async_trait;
use lapin::{
    options::*, types::FieldTable, BasicProperties, Channel, Connection, ConnectionProperties,
    Consumer,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{QueueError, Result};
use crate::message::GenerationJob;
use crate::queue::ReportQueue;

/// AMQP connection holding a dedicated publisher-confirm channel.
///
/// Liveness is read straight off the connection status, so a dropped broker
/// flips [`ReportQueue::is_live`] to `false` without any bookkeeping here.
pub struct AmqpReportQueue {
    connection: Connection,
    publish_channel: Channel,
    queue_name: String,
}

impl AmqpReportQueue {
    /// Connect to the broker and declare the durable job queue.
    pub async fn connect(url: &str, queue_name: &str) -> Result<Self> {
        info!(queue = %queue_name, "connecting to AMQP broker");
        let connection = Connection::connect(url, ConnectionProperties::default()).await?;

        let publish_channel = connection.create_channel().await?;
        // Publisher confirms let a failed publish surface as an error the
        // dispatcher can downgrade to the inline path.
        publish_channel
            .confirm_select(ConfirmSelectOptions::default())
            .await?;
        declare_queue(&publish_channel, queue_name).await?;

        info!(queue = %queue_name, "AMQP broker connected");
        Ok(Self {
            connection,
            publish_channel,
            queue_name: queue_name.to_string(),
        })
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// Open a consumer on its own channel with the given prefetch.
    ///
    /// Acking stays with the caller — the worker owns the
    /// exactly-once-per-delivery ack discipline.
    pub async fn consumer(&self, prefetch: u16) -> Result<Consumer> {
        let channel = self.connection.create_channel().await?;
        channel
            .basic_qos(prefetch, BasicQosOptions::default())
            .await?;
        // Idempotent: the consumer process may start before any publisher.
        declare_queue(&channel, &self.queue_name).await?;

        let consumer_tag = format!("complyd-worker-{}", Uuid::new_v4());
        let consumer = channel
            .basic_consume(
                &self.queue_name,
                &consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;
        info!(queue = %self.queue_name, consumer_tag = %consumer_tag, "consumer registered");
        Ok(consumer)
    }

    /// Close the broker connection.
    pub async fn close(&self) -> Result<()> {
        self.connection.close(200, "shutdown").await?;
        Ok(())
    }
}

async fn declare_queue(channel: &Channel, name: &str) -> Result<()> {
    channel
        .queue_declare(
            name,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;
    debug!(queue = name, "queue declared");
    Ok(())
}

#[async_trait]
impl ReportQueue for AmqpReportQueue {
    fn is_live(&self) -> bool {
        self.connection.status().connected()
    }

    async fn publish(&self, job: &GenerationJob) -> Result<()> {
        let payload = serde_json::to_vec(job)?;
        debug!(report_id = %job.report_id, queue = %self.queue_name, "publishing generation job");

        let confirm = self
            .publish_channel
            .basic_publish(
                "",
                &self.queue_name,
                BasicPublishOptions::default(),
                &payload,
                // Delivery mode 2: persisted by the broker, survives restarts.
                BasicProperties::default()
                    .with_delivery_mode(2)
                    .with_content_type("application/json".into()),
            )
            .await?;
        confirm
            .await
            .map_err(|e| QueueError::Publish(e.to_string()))?;
        Ok(())
    }
}
