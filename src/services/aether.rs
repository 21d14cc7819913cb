use super::{Payload, Service, ServiceClient};
use crate::errors::GridError;

impl ServiceClient {
    pub async fn purchase_domain(&self, token: &str, domain: &str) -> Result<Payload, GridError> {
        let req = self
            .post(Service::Aether, "/api/domains/purchase", Some(token))
            .query(&[("domain", domain)]);
        self.send(Service::Aether, req).await
    }

    /// Deploy `repo` as site `name` behind an owned domain.
    pub async fn deploy_site(
        &self,
        token: &str,
        name: &str,
        repo: &str,
        domain_id: i64,
    ) -> Result<Payload, GridError> {
        let req = self
            .post(Service::Aether, "/api/deploy", Some(token))
            .query(&[
                ("name", name.to_string()),
                ("repo", repo.to_string()),
                ("domain_id", domain_id.to_string()),
            ]);
        self.send(Service::Aether, req).await
    }
}
