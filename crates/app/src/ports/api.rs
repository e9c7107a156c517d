//! API client port: raw calls against the remote API.

use std::collections::BTreeMap;
use std::future::Future;

use badger_domain::error::BadgerError;

/// Issues HTTP requests on behalf of `api` actions.
pub trait ApiClient {
    /// Send `method endpoint` with `data` as the body and return the raw
    /// response body.
    fn raw_request(
        &self,
        method: &str,
        endpoint: &str,
        data: &BTreeMap<String, String>,
    ) -> impl Future<Output = Result<Vec<u8>, BadgerError>> + Send;
}

impl<T: ApiClient + Send + Sync> ApiClient for std::sync::Arc<T> {
    fn raw_request(
        &self,
        method: &str,
        endpoint: &str,
        data: &BTreeMap<String, String>,
    ) -> impl Future<Output = Result<Vec<u8>, BadgerError>> + Send {
        (**self).raw_request(method, endpoint, data)
    }
}
