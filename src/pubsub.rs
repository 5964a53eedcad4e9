//! Pub/Sub Client - Pull subscriptions over the Cloud Pub/Sub v1 REST API
//!
//! DLP publishes a message to the job's topic when the job finishes. The
//! completion watcher consumes those messages through a pull subscription
//! bound to that topic.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;
use crate::http;
use crate::watcher::NotificationChannel;

/// A message as delivered by Pub/Sub
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PubsubMessage {
    /// Base64-encoded payload
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub publish_time: Option<String>,
}

impl PubsubMessage {
    /// Look up an attribute by key
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// A pulled message together with the id used to acknowledge it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedMessage {
    pub ack_id: String,
    #[serde(default)]
    pub message: PubsubMessage,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PullRequest {
    max_messages: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullResponse {
    #[serde(default)]
    received_messages: Vec<ReceivedMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AcknowledgeRequest<'a> {
    ack_ids: &'a [String],
}

/// Subscription metadata returned by `GET subscriptions/{name}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub name: String,
    #[serde(default)]
    pub topic: String,
}

/// Client bound to a single pull subscription
#[derive(Clone)]
pub struct PubSubClient {
    client: Client,
    endpoint: String,
    access_token: Option<String>,
    /// `projects/{project}/subscriptions/{subscription}`
    subscription: String,
}

impl PubSubClient {
    /// Create a client for `subscription` served by `endpoint`
    pub fn with_endpoint(
        endpoint: String,
        subscription: String,
        access_token: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: http::build_client()?,
            endpoint,
            access_token,
            subscription,
        })
    }

    /// Fetch subscription metadata
    pub async fn get_subscription(&self) -> Result<Subscription, RemoteError> {
        let url = http::join_url(&self.endpoint, &format!("v1/{}", self.subscription));
        let request = http::authorize(self.client.get(&url), self.access_token.as_deref());
        http::send_json(request, &url).await
    }

    /// Pull up to `max_messages` messages
    pub async fn pull(&self, max_messages: u32) -> Result<Vec<ReceivedMessage>, RemoteError> {
        let url = http::join_url(&self.endpoint, &format!("v1/{}:pull", self.subscription));
        let request = http::authorize(
            self.client.post(&url).json(&PullRequest { max_messages }),
            self.access_token.as_deref(),
        );
        let response: PullResponse = http::send_json(request, &url).await?;
        Ok(response.received_messages)
    }

    /// Acknowledge messages so they are not redelivered
    pub async fn acknowledge(&self, ack_ids: &[String]) -> Result<(), RemoteError> {
        if ack_ids.is_empty() {
            return Ok(());
        }
        let url = http::join_url(
            &self.endpoint,
            &format!("v1/{}:acknowledge", self.subscription),
        );
        let request = http::authorize(
            self.client.post(&url).json(&AcknowledgeRequest { ack_ids }),
            self.access_token.as_deref(),
        );
        http::send(request, &url).await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for PubSubClient {
    fn name(&self) -> &str {
        &self.subscription
    }

    async fn open(&self) -> Result<(), RemoteError> {
        let subscription = self.get_subscription().await?;
        tracing::debug!(
            subscription = %subscription.name,
            topic = %subscription.topic,
            "subscription ready"
        );
        Ok(())
    }

    async fn pull(&self, max_messages: u32) -> Result<Vec<ReceivedMessage>, RemoteError> {
        PubSubClient::pull(self, max_messages).await
    }

    async fn acknowledge(&self, ack_ids: &[String]) -> Result<(), RemoteError> {
        PubSubClient::acknowledge(self, ack_ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_PUBSUB_ENDPOINT;
    use anyhow::Result;

    #[test]
    fn test_received_message_shape() -> Result<()> {
        let received: ReceivedMessage = serde_json::from_value(serde_json::json!({
            "ackId": "ack-1",
            "message": {
                "data": "ZG9uZQ==",
                "attributes": {"DlpJobName": "projects/p/dlpJobs/i-1"},
                "messageId": "42",
                "publishTime": "2024-01-01T00:00:00Z"
            }
        }))?;
        assert_eq!(received.ack_id, "ack-1");
        assert_eq!(
            received.message.attribute("DlpJobName"),
            Some("projects/p/dlpJobs/i-1")
        );
        assert_eq!(received.message.data.as_deref(), Some("ZG9uZQ=="));
        Ok(())
    }

    #[test]
    fn test_message_without_attributes() -> Result<()> {
        let received: ReceivedMessage =
            serde_json::from_value(serde_json::json!({"ackId": "ack-2", "message": {}}))?;
        assert!(received.message.attribute("DlpJobName").is_none());
        assert!(received.message.data.is_none());
        Ok(())
    }

    #[test]
    fn test_client_name_is_subscription() -> Result<()> {
        let client = PubSubClient::with_endpoint(
            DEFAULT_PUBSUB_ENDPOINT.to_string(),
            "projects/p/subscriptions/s".to_string(),
            None,
        )?;
        assert_eq!(NotificationChannel::name(&client), "projects/p/subscriptions/s");
        Ok(())
    }
}
