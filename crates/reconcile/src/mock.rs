//! Scripted in-memory provider for handler tests
//!
//! Each API method pops its next response from a queue. The last queued
//! response repeats, so a test can script "fails forever" with one entry.
//! Every call is recorded by method name.

use crate::client::{
    CreateEnvironmentInput, Environment, EnvironmentApi, EnvironmentPage, LastUpdate,
    UpdateEnvironmentInput, UpdateError,
};
use crate::error::ApiResult;
use crate::types::Tags;
use std::cell::RefCell;
use std::collections::VecDeque;

#[derive(Default)]
pub struct MockEnvironmentApi {
    creates: RefCell<VecDeque<ApiResult<String>>>,
    gets: RefCell<VecDeque<ApiResult<Environment>>>,
    updates: RefCell<VecDeque<ApiResult<String>>>,
    deletes: RefCell<VecDeque<ApiResult<()>>>,
    lists: RefCell<VecDeque<ApiResult<EnvironmentPage>>>,
    tag_results: RefCell<VecDeque<ApiResult<()>>>,
    calls: RefCell<Vec<&'static str>>,
    pub tagged: RefCell<Vec<(String, Tags)>>,
    pub untagged: RefCell<Vec<(String, Vec<String>)>>,
    pub list_tokens: RefCell<Vec<Option<String>>>,
}

fn next<T: Clone>(queue: &RefCell<VecDeque<ApiResult<T>>>, method: &str) -> ApiResult<T> {
    let mut queue = queue.borrow_mut();
    match queue.len() {
        0 => panic!("unexpected {method} call"),
        1 => queue[0].clone(),
        _ => queue.pop_front().unwrap(),
    }
}

impl MockEnvironmentApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_create(self, response: ApiResult<String>) -> Self {
        self.creates.borrow_mut().push_back(response);
        self
    }

    pub fn with_get(self, response: ApiResult<Environment>) -> Self {
        self.gets.borrow_mut().push_back(response);
        self
    }

    pub fn with_update(self, response: ApiResult<String>) -> Self {
        self.updates.borrow_mut().push_back(response);
        self
    }

    pub fn with_delete(self, response: ApiResult<()>) -> Self {
        self.deletes.borrow_mut().push_back(response);
        self
    }

    pub fn with_list(self, response: ApiResult<EnvironmentPage>) -> Self {
        self.lists.borrow_mut().push_back(response);
        self
    }

    /// Response for both tag and untag calls; defaults to success
    pub fn with_tag_result(self, response: ApiResult<()>) -> Self {
        self.tag_results.borrow_mut().push_back(response);
        self
    }

    /// All calls in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|c| **c == method).count()
    }

    fn record(&self, method: &'static str) {
        self.calls.borrow_mut().push(method);
    }

    fn tag_result(&self) -> ApiResult<()> {
        if self.tag_results.borrow().is_empty() {
            return Ok(());
        }
        next(&self.tag_results, "tag")
    }
}

impl EnvironmentApi for MockEnvironmentApi {
    fn create_environment(&self, _input: &CreateEnvironmentInput) -> ApiResult<String> {
        self.record("create");
        next(&self.creates, "create")
    }

    fn get_environment(&self, _name: &str) -> ApiResult<Environment> {
        self.record("get");
        next(&self.gets, "get")
    }

    fn update_environment(&self, _input: &UpdateEnvironmentInput) -> ApiResult<String> {
        self.record("update");
        next(&self.updates, "update")
    }

    fn delete_environment(&self, _name: &str) -> ApiResult<()> {
        self.record("delete");
        next(&self.deletes, "delete")
    }

    fn list_environments(&self, next_token: Option<&str>) -> ApiResult<EnvironmentPage> {
        self.record("list");
        self.list_tokens
            .borrow_mut()
            .push(next_token.map(str::to_string));
        next(&self.lists, "list")
    }

    fn tag_resource(&self, arn: &str, tags: &Tags) -> ApiResult<()> {
        self.record("tag");
        self.tagged.borrow_mut().push((arn.to_string(), tags.clone()));
        self.tag_result()
    }

    fn untag_resource(&self, arn: &str, keys: &[String]) -> ApiResult<()> {
        self.record("untag");
        self.untagged
            .borrow_mut()
            .push((arn.to_string(), keys.to_vec()));
        self.tag_result()
    }
}

/// An environment with the given status and a derived ARN
pub fn environment(name: &str, status: &str) -> Environment {
    Environment {
        name: name.to_string(),
        arn: format!("arn:aws:airflow:us-east-1:123456789012:environment/{name}"),
        status: status.to_string(),
        ..Environment::default()
    }
}

impl Environment {
    pub fn with_last_error(mut self, message: &str) -> Self {
        self.last_update = Some(LastUpdate {
            status: Some("FAILED".to_string()),
            error: Some(UpdateError {
                error_code: Some("ERR".to_string()),
                error_message: Some(message.to_string()),
            }),
        });
        self
    }

    pub fn with_tags(mut self, pairs: &[(&str, &str)]) -> Self {
        self.tags = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), Some((*v).to_string())))
            .collect();
        self
    }
}
