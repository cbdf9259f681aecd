//! Generic create/get/list/drop surface shared by every resource family.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::MindsClient;
use crate::error::{Error, Result};

/// A named resource family exposed as a REST collection.
pub trait Resource: DeserializeOwned {
    /// Human-readable kind, used in errors and logs.
    const KIND: &'static str;

    /// Path segments of the collection below `<base>/api/`.
    fn collection_path(project: &str) -> Vec<String>;

    /// Whether a raw list entry belongs in `list` results.
    fn listed(_raw: &serde_json::Value) -> bool {
        true
    }
}

/// CRUD operations over one resource family.
pub struct Collection<R> {
    client: MindsClient,
    _kind: PhantomData<fn() -> R>,
}

impl<R: Resource> Collection<R> {
    pub(crate) fn new(client: MindsClient) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }

    fn path(&self) -> Vec<String> {
        R::collection_path(self.client.project())
    }

    fn item_path(&self, name: &str) -> Vec<String> {
        let mut path = self.path();
        path.push(name.to_string());
        path
    }

    /// Name the resource in a bare not-found error.
    fn not_found(&self, name: &str, err: Error) -> Error {
        if err.is_not_found() {
            Error::NotFound(format!("{} '{}' does not exist", R::KIND, name))
        } else {
            err
        }
    }

    /// Fetch a resource by name.
    pub async fn get(&self, name: &str) -> Result<R> {
        self.client
            .get(&self.item_path(name))
            .await
            .map_err(|e| self.not_found(name, e))
    }

    /// List every resource visible to the caller. Order is unspecified.
    pub async fn list(&self) -> Result<Vec<R>> {
        let raw: Vec<serde_json::Value> = self.client.get(&self.path()).await?;
        raw.into_iter()
            .filter(R::listed)
            .map(|item| serde_json::from_value(item).map_err(Error::from))
            .collect()
    }

    /// Delete a resource by name.
    pub async fn drop(&self, name: &str) -> Result<()> {
        self.client
            .delete(&self.item_path(name))
            .await
            .map_err(|e| self.not_found(name, e))?;
        tracing::debug!(kind = R::KIND, name, "dropped");
        Ok(())
    }

    /// Delete a resource if it exists. Returns whether anything was removed.
    pub async fn drop_if_exists(&self, name: &str) -> Result<bool> {
        match self.drop(name).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Create a resource from a request body and return the stored result.
    ///
    /// With `replace` an existing resource of the same name is dropped first,
    /// so nothing of the previous version survives. Without it a duplicate
    /// name fails with [`Error::AlreadyExists`].
    pub async fn create<B>(&self, name: &str, body: &B, replace: bool) -> Result<R>
    where
        B: Serialize + ?Sized,
    {
        if replace && self.drop_if_exists(name).await? {
            tracing::debug!(kind = R::KIND, name, "replacing existing resource");
        }

        self.client.post_unit(&self.path(), body).await?;
        tracing::debug!(kind = R::KIND, name, "created");
        self.get(name).await
    }
}
