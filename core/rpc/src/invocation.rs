// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{RpcError, ServiceException};

/// One call: the target method, its arguments and the attachments carried
/// along with it. A fresh invocation is created for every call; attachments
/// written by a filter are seen by every filter after it and by the terminal
/// invoker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    method_name: String,
    #[serde(default)]
    parameter_types: Vec<String>,
    #[serde(default)]
    arguments: Vec<Value>,
    #[serde(default)]
    attachments: HashMap<String, String>,
}

impl Invocation {
    pub fn new(method_name: impl Into<String>, arguments: Vec<Value>) -> Self {
        Invocation {
            method_name: method_name.into(),
            arguments,
            ..Default::default()
        }
    }

    pub fn with_parameter_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameter_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_attachment(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attachment(key, value);
        self
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn parameter_types(&self) -> &[String] {
        &self.parameter_types
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn attachments(&self) -> &HashMap<String, String> {
        &self.attachments
    }

    pub fn attachment(&self, key: &str) -> Option<&str> {
        self.attachments.get(key).map(|v| v.as_str())
    }

    pub fn attachment_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.attachment(key) {
            Some(v) if !v.is_empty() => v,
            _ => default,
        }
    }

    pub fn set_attachment(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attachments.insert(key.into(), value.into());
    }

    pub fn set_attachment_if_absent(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attachments
            .entry(key.into())
            .or_insert_with(|| value.into());
    }

    pub fn add_attachments<I, K, V>(&mut self, attachments: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in attachments {
            self.set_attachment(k, v);
        }
    }

    pub fn remove_attachment(&mut self, key: &str) -> Option<String> {
        self.attachments.remove(key)
    }
}

/// Outcome of a call that reached the service: either a value or the
/// business exception raised by the service, plus response attachments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcResult {
    #[serde(default)]
    value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exception: Option<ServiceException>,
    #[serde(default)]
    attachments: HashMap<String, String>,
}

impl RpcResult {
    pub fn new(value: Value) -> Self {
        RpcResult {
            value,
            ..Default::default()
        }
    }

    pub fn from_exception(exception: ServiceException) -> Self {
        RpcResult {
            exception: Some(exception),
            ..Default::default()
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn exception(&self) -> Option<&ServiceException> {
        self.exception.as_ref()
    }

    pub fn has_exception(&self) -> bool {
        self.exception.is_some()
    }

    pub fn attachments(&self) -> &HashMap<String, String> {
        &self.attachments
    }

    pub fn attachment(&self, key: &str) -> Option<&str> {
        self.attachments.get(key).map(|v| v.as_str())
    }

    pub fn set_attachment(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attachments.insert(key.into(), value.into());
    }

    pub fn set_attachment_if_absent(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attachments
            .entry(key.into())
            .or_insert_with(|| value.into());
    }

    pub fn with_attachment(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attachment(key, value);
        self
    }

    /// Replace the returned value, keeping attachments.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    /// Hand the outcome to the end caller: the value, or the business
    /// exception turned into [`RpcError::Biz`].
    pub fn recreate(self) -> Result<Value, RpcError> {
        match self.exception {
            Some(e) => Err(RpcError::Biz(e)),
            None => Ok(self.value),
        }
    }
}
