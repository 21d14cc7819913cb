use super::{Payload, Service, ServiceClient};
use crate::errors::GridError;
use serde_json::Value;

impl ServiceClient {
    /// POST /api/register
    pub async fn register(&self, username: &str, password: &str) -> Result<Payload, GridError> {
        let req = self
            .post(Service::Identity, "/api/register", None)
            .query(&[("username", username), ("password", password)]);
        self.send(Service::Identity, req).await
    }

    /// POST /api/login, the hub-facing password login.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        client_id: &str,
    ) -> Result<String, GridError> {
        let req = self.post(Service::Identity, "/api/login", None).form(&[
            ("grant_type", "password"),
            ("username", username),
            ("password", password),
            ("client_id", client_id),
        ]);
        let body = self.send_json(Service::Identity, req).await?;
        access_token(&body)
    }

    /// POST /token with the OAuth password grant.
    pub async fn password_token(
        &self,
        username: &str,
        password: &str,
        client_id: &str,
    ) -> Result<String, GridError> {
        let req = self.post(Service::Identity, "/token", None).form(&[
            ("grant_type", "password"),
            ("username", username),
            ("password", password),
            ("client_id", client_id),
        ]);
        let body = self.send_json(Service::Identity, req).await?;
        access_token(&body)
    }

    /// POST /api/system/token, issued against the shared system secret.
    pub async fn system_token(&self, username: &str, secret: &str) -> Result<String, GridError> {
        let req = self
            .post(Service::Identity, "/api/system/token", None)
            .query(&[("username", username), ("secret", secret)]);
        let body = self.send_json(Service::Identity, req).await?;
        access_token(&body)
    }

    pub async fn userinfo(&self, token: &str) -> Result<Value, GridError> {
        let req = self.get(Service::Identity, "/userinfo", Some(token));
        self.send_json(Service::Identity, req).await
    }
}

fn access_token(body: &Value) -> Result<String, GridError> {
    body.get("access_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| GridError::Backend {
            service: Service::Identity.name().to_string(),
            status: 200,
            message: "response carried no access_token".to_string(),
        })
}
