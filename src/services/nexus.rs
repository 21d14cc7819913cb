use super::{Payload, Service, ServiceClient};
use crate::errors::GridError;

impl ServiceClient {
    pub async fn search(&self, query: &str) -> Result<Payload, GridError> {
        let req = self
            .get(Service::Nexus, "/api/search", None)
            .query(&[("q", query)]);
        self.send(Service::Nexus, req).await
    }
}
