use super::{Payload, Service, ServiceClient};
use crate::errors::GridError;
use serde_json::json;

impl ServiceClient {
    pub async fn bank_balance(&self, token: &str) -> Result<Payload, GridError> {
        let req = self.get(Service::Bank, "/api/balance", Some(token));
        self.send(Service::Bank, req).await
    }

    /// POST /api/pay with a JSON `{recipient, amount, note}` body.
    pub async fn bank_pay(
        &self,
        token: &str,
        recipient: &str,
        amount: f64,
        note: Option<&str>,
    ) -> Result<Payload, GridError> {
        let req = self
            .post(Service::Bank, "/api/pay", Some(token))
            .json(&json!({"recipient": recipient, "amount": amount, "note": note}));
        self.send(Service::Bank, req).await
    }
}
