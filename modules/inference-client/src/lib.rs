pub mod client;
pub mod error;
pub mod schema;
pub(crate) mod types;

pub use client::InferenceClient;
pub use error::{InferenceError, Result};
pub use schema::StructuredOutput;

use async_trait::async_trait;

/// One structured call: a prompt pair plus the contract the reply must match.
#[derive(Debug, Clone)]
pub struct SchemaRequest {
    pub name: String,
    pub schema: serde_json::Value,
    pub system: String,
    pub user: String,
}

/// The inference service boundary. Implementations return the raw JSON
/// payload claimed to match the request's schema; [`extract`] turns it into
/// a typed contract.
#[async_trait]
pub trait Inference: Send + Sync {
    async fn structured(&self, request: SchemaRequest) -> Result<String>;
}

/// Issue a structured call for contract `T` and deserialize the reply.
/// A payload that does not satisfy `T` is a schema-validation fault, which
/// callers treat the same as any other transient call fault.
pub async fn extract<T, I>(client: &I, system: &str, user: &str) -> Result<T>
where
    T: StructuredOutput,
    I: Inference + ?Sized,
{
    let request = SchemaRequest {
        name: T::contract_name(),
        schema: T::strict_schema(),
        system: system.to_string(),
        user: user.to_string(),
    };
    let payload = client.structured(request).await?;
    serde_json::from_str(&payload)
        .map_err(|e| InferenceError::Schema(format!("{}: {e}", T::contract_name())))
}
