//! In-memory fakes for the ports, shared by the unit tests.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Mutex;

use badger_domain::action::DbRequest;
use badger_domain::error::BadgerError;

use crate::ports::{ApiClient, DatabaseRunner};

/// Records every request and optionally fails them all.
#[derive(Debug, Default)]
pub struct RecordingDatabase {
    pub requests: Mutex<Vec<DbRequest>>,
    pub fail_with: Option<String>,
}

impl RecordingDatabase {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<DbRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl DatabaseRunner for RecordingDatabase {
    fn run_action(
        &self,
        request: DbRequest,
    ) -> impl Future<Output = Result<(), BadgerError>> + Send {
        self.requests.lock().unwrap().push(request);
        let result = match &self.fail_with {
            Some(message) => Err(BadgerError::Database(message.clone().into())),
            None => Ok(()),
        };
        async { result }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: String,
    pub endpoint: String,
    pub data: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
pub struct RecordingApi {
    pub calls: Mutex<Vec<RecordedCall>>,
    pub fail_with: Option<String>,
}

impl RecordingApi {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl ApiClient for RecordingApi {
    fn raw_request(
        &self,
        method: &str,
        endpoint: &str,
        data: &BTreeMap<String, String>,
    ) -> impl Future<Output = Result<Vec<u8>, BadgerError>> + Send {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            endpoint: endpoint.to_string(),
            data: data.clone(),
        });
        let result = match &self.fail_with {
            Some(message) => Err(BadgerError::Api(message.clone().into())),
            None => Ok(b"{}".to_vec()),
        };
        async { result }
    }
}
