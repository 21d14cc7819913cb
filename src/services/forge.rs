use super::{Payload, Service, ServiceClient};
use crate::errors::GridError;
use serde_json::json;
use url::Url;

impl ServiceClient {
    pub async fn forge_create_repo(
        &self,
        token: &str,
        name: &str,
        description: Option<&str>,
        private: bool,
    ) -> Result<Payload, GridError> {
        let req = self
            .post(Service::Forge, "/api/v1/user/repos", Some(token))
            .json(&json!({
                "name": name,
                "description": description.unwrap_or_default(),
                "private": private,
            }));
        self.send(Service::Forge, req).await
    }

    pub async fn forge_list_repos(&self, token: &str) -> Result<Payload, GridError> {
        let req = self.get(Service::Forge, "/api/v1/user/repos", Some(token));
        self.send(Service::Forge, req).await
    }

    /// Smart-HTTP remote with the bearer token as the userinfo part,
    /// e.g. `http://{token}@forge.psx/{owner}/{repo}.git`.
    pub fn forge_remote(&self, token: &str, owner: &str, repo: &str) -> Result<Url, GridError> {
        let mut url = Url::parse(self.base(Service::Forge))
            .map_err(|e| GridError::Config(format!("services.forge is not a valid URL: {e}")))?;
        url.set_username(token)
            .map_err(|()| GridError::Config("services.forge cannot carry credentials".into()))?;
        url.path_segments_mut()
            .map_err(|()| GridError::Config("services.forge cannot be a base URL".into()))?
            .pop_if_empty()
            .push(owner)
            .push(&format!("{repo}.git"));
        Ok(url)
    }
}
