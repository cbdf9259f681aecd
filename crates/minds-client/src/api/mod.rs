//! API endpoint implementations.

mod collection;
mod completions;
mod datasources;
mod minds;

pub use collection::{Collection, Resource};
pub use completions::{CompletionStream, CompletionsApi};
pub use datasources::DatasourcesApi;
pub use minds::{Mind, MindsApi};
