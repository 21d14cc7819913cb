use super::{Payload, Service, ServiceClient};
use crate::errors::GridError;

impl ServiceClient {
    pub async fn mail_inbox(&self, token: &str, limit: Option<u32>) -> Result<Payload, GridError> {
        let mut req = self.get(Service::Mail, "/api/inbox", Some(token));
        if let Some(limit) = limit {
            req = req.query(&[("limit", limit)]);
        }
        self.send(Service::Mail, req).await
    }

    pub async fn mail_read(&self, token: &str, email_id: i64) -> Result<Payload, GridError> {
        let path = format!("/api/read/{email_id}");
        let req = self.get(Service::Mail, &path, Some(token));
        self.send(Service::Mail, req).await
    }

    pub async fn mail_send(
        &self,
        token: &str,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<Payload, GridError> {
        let req = self.post(Service::Mail, "/api/send", Some(token)).query(&[
            ("recipient", recipient),
            ("subject", subject),
            ("body", body),
        ]);
        self.send(Service::Mail, req).await
    }
}
