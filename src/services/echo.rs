use super::{Payload, Service, ServiceClient};
use crate::errors::GridError;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// One post as returned by `GET /api/feed`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FeedItem {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
}

impl fmt::Display for FeedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match &self.id {
            Value::String(s) => s.clone(),
            Value::Null => "?".to_string(),
            other => other.to_string(),
        };
        write!(f, "POST (ID: {}): {} by {}", id, self.title, self.author)
    }
}

impl ServiceClient {
    pub async fn echo_feed(&self, limit: u32) -> Result<Payload, GridError> {
        let req = self
            .get(Service::Echo, "/api/feed", None)
            .query(&[("limit", limit)]);
        self.send(Service::Echo, req).await
    }

    /// The feed decoded into [`FeedItem`]s.
    pub async fn recent_posts(&self, limit: u32) -> Result<Vec<FeedItem>, GridError> {
        let req = self
            .get(Service::Echo, "/api/feed", None)
            .query(&[("limit", limit)]);
        let body = self.send_json(Service::Echo, req).await?;
        serde_json::from_value(body).map_err(|e| GridError::Backend {
            service: Service::Echo.name().to_string(),
            status: 200,
            message: format!("unexpected feed shape: {e}"),
        })
    }

    pub async fn echo_frequencies(&self) -> Result<Payload, GridError> {
        let req = self.get(Service::Echo, "/api/frequencies", None);
        self.send(Service::Echo, req).await
    }

    /// The social service still calls a frequency a `subreddit`.
    pub async fn echo_post(
        &self,
        token: &str,
        title: &str,
        content: &str,
        frequency: &str,
    ) -> Result<Payload, GridError> {
        let req = self.post(Service::Echo, "/api/post", Some(token)).query(&[
            ("title", title),
            ("content", content),
            ("subreddit", frequency),
        ]);
        self.send(Service::Echo, req).await
    }

    pub async fn echo_comment(
        &self,
        token: &str,
        post_id: i64,
        content: &str,
        parent_id: Option<i64>,
    ) -> Result<Payload, GridError> {
        let mut params = vec![
            ("post_id", post_id.to_string()),
            ("content", content.to_string()),
        ];
        if let Some(parent) = parent_id {
            params.push(("parent_id", parent.to_string()));
        }
        let req = self
            .post(Service::Echo, "/api/comment", Some(token))
            .query(&params);
        self.send(Service::Echo, req).await
    }

    pub async fn echo_resonate(
        &self,
        token: &str,
        item_type: &str,
        item_id: i64,
        value: i64,
    ) -> Result<Payload, GridError> {
        let req = self
            .post(Service::Echo, "/api/resonate", Some(token))
            .query(&[
                ("item_type", item_type.to_string()),
                ("item_id", item_id.to_string()),
                ("value", value.to_string()),
            ]);
        self.send(Service::Echo, req).await
    }

    pub async fn echo_create_frequency(
        &self,
        token: &str,
        name: &str,
        description: &str,
    ) -> Result<Payload, GridError> {
        let req = self
            .post(Service::Echo, "/api/create_frequency", Some(token))
            .query(&[("name", name), ("description", description)]);
        self.send(Service::Echo, req).await
    }

    pub async fn echo_notifications(&self, token: &str) -> Result<Payload, GridError> {
        let req = self.get(Service::Echo, "/api/notifications", Some(token));
        self.send(Service::Echo, req).await
    }
}
