//! Minds API.

use serde_json::{Map, Value};

use crate::api::collection::{Collection, Resource};
use crate::api::completions::CompletionStream;
use crate::client::MindsClient;
use crate::error::{Error, Result};
use crate::types::{
    AttachDatasource, CreateMind, DatasourceRef, MindBody, MindInfo, MindPatch, MindUpdate,
};

impl Resource for MindInfo {
    const KIND: &'static str = "mind";

    fn collection_path(project: &str) -> Vec<String> {
        vec!["projects".to_string(), project.to_string(), "minds".to_string()]
    }
}

fn mind_path(project: &str, name: &str) -> Vec<String> {
    let mut path = MindInfo::collection_path(project);
    path.push(name.to_string());
    path
}

/// Minds API client.
pub struct MindsApi {
    client: MindsClient,
    collection: Collection<MindInfo>,
}

impl MindsApi {
    pub(crate) fn new(client: MindsClient) -> Self {
        Self {
            collection: Collection::new(client.clone()),
            client,
        }
    }

    fn wrap(&self, info: MindInfo) -> Mind {
        Mind {
            client: self.client.clone(),
            info,
        }
    }

    /// Create a mind.
    ///
    /// Datasources given as specs are provisioned before the mind is sent.
    /// They are not removed again if creating the mind itself fails.
    pub async fn create(&self, mind: CreateMind) -> Result<Mind> {
        let datasources = self
            .client
            .datasources()
            .resolve_all(&mind.datasources)
            .await?;

        let body = MindBody {
            name: &mind.name,
            model_name: mind.model_name.as_deref(),
            provider: mind.provider.as_deref(),
            parameters: &mind.parameters,
            datasources,
        };

        let info = self
            .collection
            .create(&mind.name, &body, mind.replace)
            .await?;
        Ok(self.wrap(info))
    }

    /// Get a mind by name.
    pub async fn get(&self, name: &str) -> Result<Mind> {
        Ok(self.wrap(self.collection.get(name).await?))
    }

    /// List all minds.
    pub async fn list(&self) -> Result<Vec<Mind>> {
        let minds = self.collection.list().await?;
        Ok(minds.into_iter().map(|info| self.wrap(info)).collect())
    }

    /// Delete a mind.
    pub async fn drop(&self, name: &str) -> Result<()> {
        self.collection.drop(name).await
    }

    /// Delete a mind if it exists.
    pub async fn drop_if_exists(&self, name: &str) -> Result<bool> {
        self.collection.drop_if_exists(name).await
    }
}

/// A mind snapshot bound to the client it was fetched with.
///
/// Mutating methods apply the change on the service and return a fresh
/// snapshot; the handle they are called on is left as it was.
#[derive(Debug, Clone)]
pub struct Mind {
    client: MindsClient,
    info: MindInfo,
}

impl Mind {
    /// Mind name.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Model used by the mind.
    pub fn model_name(&self) -> Option<&str> {
        self.info.model_name.as_deref()
    }

    /// Inference provider.
    pub fn provider(&self) -> Option<&str> {
        self.info.provider.as_deref()
    }

    /// Parameter bag.
    pub fn parameters(&self) -> &Map<String, Value> {
        &self.info.parameters
    }

    /// Prompt template override, if any.
    pub fn prompt_template(&self) -> Option<&str> {
        self.info.prompt_template()
    }

    /// Names of attached datasources.
    pub fn datasources(&self) -> &[String] {
        &self.info.datasources
    }

    /// The underlying snapshot.
    pub fn info(&self) -> &MindInfo {
        &self.info
    }

    /// Unwrap into the plain snapshot.
    pub fn into_info(self) -> MindInfo {
        self.info
    }

    fn path(&self) -> Vec<String> {
        mind_path(self.client.project(), &self.info.name)
    }

    /// Fetch the current state of this mind.
    pub async fn refresh(&self) -> Result<Mind> {
        self.client.minds().get(&self.info.name).await
    }

    /// Apply a partial update.
    ///
    /// Only the fields set on `update` change. A supplied datasource list
    /// replaces the membership instead of extending it. After a rename the
    /// old name no longer resolves.
    pub async fn update(&self, update: MindUpdate) -> Result<Mind> {
        if update.is_empty() {
            return self.refresh().await;
        }

        let datasources = match &update.datasources {
            Some(references) => Some(
                self.client
                    .datasources()
                    .resolve_all(references)
                    .await?,
            ),
            None => None,
        };

        let patch = MindPatch {
            name: update.name.as_deref(),
            model_name: update.model_name.as_deref(),
            provider: update.provider.as_deref(),
            parameters: update.parameters.as_ref(),
            datasources,
        };
        self.client.patch_unit(&self.path(), &patch).await?;

        let name = update.name.as_deref().unwrap_or(self.info.name.as_str());
        if name != self.info.name {
            tracing::debug!(from = %self.info.name, to = %name, "renamed mind");
        }
        self.client.minds().get(name).await
    }

    /// Attach a datasource, provisioning it first when given as a spec.
    ///
    /// Attaching a datasource that is already a member sends nothing to the
    /// mind and returns the current snapshot.
    pub async fn add_datasource(&self, datasource: impl Into<DatasourceRef>) -> Result<Mind> {
        let reference = datasource.into();
        let name = self.client.datasources().resolve(&reference).await?;

        if self.info.datasources.contains(&name) {
            tracing::debug!(mind = %self.info.name, datasource = %name, "already attached");
            return Ok(self.clone());
        }

        let mut path = self.path();
        path.push("datasources".to_string());
        self.client
            .post_unit(&path, &AttachDatasource { name: &name })
            .await?;
        self.refresh().await
    }

    /// Detach a datasource by name.
    ///
    /// Membership is checked by the service, so a stale snapshot does not
    /// stop the call. Detaching a datasource that is not attached fails with
    /// [`Error::NotFound`].
    pub async fn del_datasource(&self, name: &str) -> Result<Mind> {
        let mut path = self.path();
        path.push("datasources".to_string());
        path.push(name.to_string());
        self.client.delete(&path).await.map_err(|e| {
            if e.is_not_found() {
                Error::NotFound(format!(
                    "datasource '{}' is not attached to mind '{}'",
                    name, self.info.name
                ))
            } else {
                e
            }
        })?;
        self.refresh().await
    }

    /// Ask the mind and wait for the complete answer.
    pub async fn completion(&self, message: impl Into<String>) -> Result<String> {
        self.client
            .completions()
            .complete(&self.info.name, message)
            .await
    }

    /// Ask the mind and stream the answer in chunks.
    pub async fn completion_stream(&self, message: impl Into<String>) -> Result<CompletionStream> {
        self.client
            .completions()
            .stream(&self.info.name, message)
            .await
    }
}
