//! Datasources API.

use crate::api::collection::{Collection, Resource};
use crate::client::MindsClient;
use crate::error::{Error, Result};
use crate::types::{Datasource, DatasourceRef};

impl Resource for Datasource {
    const KIND: &'static str = "datasource";

    fn collection_path(_project: &str) -> Vec<String> {
        vec!["datasources".to_string()]
    }

    /// File uploads show up in the listing without an engine; they are not
    /// external connections.
    fn listed(raw: &serde_json::Value) -> bool {
        raw.get("engine").is_some_and(|engine| !engine.is_null())
    }
}

/// Datasources API client.
pub struct DatasourcesApi {
    collection: Collection<Datasource>,
}

impl DatasourcesApi {
    pub(crate) fn new(client: MindsClient) -> Self {
        Self {
            collection: Collection::new(client),
        }
    }

    /// Create a datasource, optionally replacing a same-named one.
    pub async fn create(&self, datasource: &Datasource, replace: bool) -> Result<Datasource> {
        self.collection
            .create(&datasource.name, datasource, replace)
            .await
    }

    /// Get a datasource by name.
    pub async fn get(&self, name: &str) -> Result<Datasource> {
        self.collection.get(name).await
    }

    /// List all datasources.
    pub async fn list(&self) -> Result<Vec<Datasource>> {
        self.collection.list().await
    }

    /// Delete a datasource.
    pub async fn drop(&self, name: &str) -> Result<()> {
        self.collection.drop(name).await
    }

    /// Delete a datasource if it exists.
    pub async fn drop_if_exists(&self, name: &str) -> Result<bool> {
        self.collection.drop_if_exists(name).await
    }

    /// Turn a reference into a datasource name, provisioning specs on the way.
    ///
    /// A name must refer to an existing datasource. A spec without `replace`
    /// reuses an identical existing datasource and refuses one whose
    /// configuration differs.
    pub async fn resolve(&self, reference: &DatasourceRef) -> Result<String> {
        let (datasource, replace) = match reference {
            DatasourceRef::ByName(name) => {
                self.get(name).await?;
                return Ok(name.clone());
            }
            DatasourceRef::BySpec {
                datasource,
                replace,
            } => (datasource, *replace),
        };

        if replace {
            self.create(datasource, true).await?;
            return Ok(datasource.name.clone());
        }

        match self.get(&datasource.name).await {
            Ok(existing) if existing.same_config(datasource) => {
                tracing::debug!(name = %datasource.name, "reusing existing datasource");
            }
            Ok(_) => {
                return Err(Error::AlreadyExists(format!(
                    "datasource '{}' exists with a different configuration",
                    datasource.name
                )));
            }
            Err(e) if e.is_not_found() => {
                self.create(datasource, false).await?;
            }
            Err(e) => return Err(e),
        }

        Ok(datasource.name.clone())
    }

    /// Resolve a list of references in order, dropping repeated names.
    pub async fn resolve_all(&self, references: &[DatasourceRef]) -> Result<Vec<String>> {
        let mut names: Vec<String> = Vec::with_capacity(references.len());
        for reference in references {
            let name = self.resolve(reference).await?;
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(names)
    }
}
