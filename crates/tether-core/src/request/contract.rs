//! The request transport contract.

use async_trait::async_trait;

use super::options::{Method, RequestOptions};
use super::response::Response;
use crate::error::RequestResult;

/// A one-shot request/response client.
///
/// Each call resolves to exactly one [`Response`] or exactly one
/// [`RequestError`](crate::RequestError). No retries happen at this layer.
#[async_trait]
pub trait RequestTransport: Send + Sync {
    /// Performs one request against `path`.
    async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> RequestResult<Response>;

    /// `GET path`.
    async fn get(&self, path: &str, options: RequestOptions) -> RequestResult<Response> {
        self.request(Method::Get, path, options).await
    }

    /// `POST path`.
    async fn post(&self, path: &str, options: RequestOptions) -> RequestResult<Response> {
        self.request(Method::Post, path, options).await
    }

    /// `PUT path`.
    async fn put(&self, path: &str, options: RequestOptions) -> RequestResult<Response> {
        self.request(Method::Put, path, options).await
    }

    /// `DELETE path`.
    async fn del(&self, path: &str, options: RequestOptions) -> RequestResult<Response> {
        self.request(Method::Delete, path, options).await
    }
}
