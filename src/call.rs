// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Timing and outcome reporting for arbitrary async operations.
//!
//! [`CallTracker`] runs an operation, measures it, and reports a `tool_call`
//! or `tool_error` event through a shared [`BackendTracker`]. Reports are
//! spawned onto the Tokio runtime and never awaited: the operation's value or
//! error reaches the caller unchanged and without waiting on the network.
//!
//! ```rust,ignore
//! let calls = CallTracker::new(Arc::new(BackendTracker::new(config)?));
//!
//! let hits = calls
//!     .track("search", || search_index(&query), TrackOptions::default().with_parameters(json!({"q": query})))
//!     .await?;
//!
//! let fetch = calls.wrap("fetch_page", |(url, depth): (String, u32)| fetch_page(url, depth), None);
//! let page = fetch.call(("https://example.com".to_string(), 2)).await?;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tracing::{trace, warn};

use crate::backend::{BackendTracker, ErrorOptions, SuccessOptions};
use crate::classify::{infer_error_type, DescribeError, ToolErrorType};
use crate::ids::generate_call_id;

/// Options for [`CallTracker::track`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackOptions {
    /// Correlation id; generated when absent.
    pub call_id: Option<String>,
    /// Recorded as a JSON string on the event.
    pub parameters: Option<Value>,
    /// Overrides inference from the error's name and message.
    pub error_type: Option<ToolErrorType>,
}

impl TrackOptions {
    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = Some(call_id.into());
        self
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_error_type(mut self, error_type: ToolErrorType) -> Self {
        self.error_type = Some(error_type);
        self
    }
}

/// A successful result with its timing and correlation id.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedCall<T> {
    pub result: T,
    pub duration_ms: u64,
    pub call_id: String,
}

/// Wraps operations with automatic success/error reporting.
#[derive(Debug, Clone)]
pub struct CallTracker {
    tracker: Arc<BackendTracker>,
}

impl CallTracker {
    pub fn new(tracker: Arc<BackendTracker>) -> Self {
        Self { tracker }
    }

    pub fn tracker(&self) -> &Arc<BackendTracker> {
        &self.tracker
    }

    /// Run `operation` and report its outcome.
    ///
    /// Returns the operation's own result; errors are re-raised untouched.
    pub async fn track<T, E, F, Fut>(
        &self,
        tool_name: &str,
        operation: F,
        options: TrackOptions,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Serialize,
        E: DescribeError,
    {
        self.track_with_metadata(tool_name, operation, options)
            .await
            .map(|call| call.result)
    }

    /// Like [`track`](Self::track), also returning duration and call id.
    pub async fn track_with_metadata<T, E, F, Fut>(
        &self,
        tool_name: &str,
        operation: F,
        options: TrackOptions,
    ) -> Result<TrackedCall<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Serialize,
        E: DescribeError,
    {
        let call_id = options.call_id.unwrap_or_else(generate_call_id);
        let parameters = options
            .parameters
            .as_ref()
            .and_then(|p| serde_json::to_string(p).ok());

        let start = Instant::now();
        let outcome = operation().await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => {
                // Character count of the JSON text, not its UTF-8 byte length.
                let response_size_bytes = serde_json::to_string(&result)
                    .ok()
                    .map(|json| json.chars().count() as u64);

                let report = SuccessOptions {
                    call_id: Some(call_id.clone()),
                    parameters,
                    response_size_bytes,
                };
                let tracker = Arc::clone(&self.tracker);
                let tool = tool_name.to_string();
                self.spawn_report(tool_name, async move {
                    tracker.track_success(&tool, duration_ms, report).await;
                });

                Ok(TrackedCall {
                    result,
                    duration_ms,
                    call_id,
                })
            }
            Err(err) => {
                let described = err.describe();
                let error_type = options
                    .error_type
                    .unwrap_or_else(|| infer_error_type(&described));

                let report = ErrorOptions {
                    call_id: Some(call_id),
                    parameters,
                    error_type: Some(error_type),
                    error_code: None,
                    duration_ms: Some(duration_ms),
                };
                let tracker = Arc::clone(&self.tracker);
                let tool = tool_name.to_string();
                self.spawn_report(tool_name, async move {
                    tracker.track_error(&tool, described, report).await;
                });

                Err(err)
            }
        }
    }

    /// Wrap a function so every call through it is tracked.
    ///
    /// Arguments are passed as a tuple. A single argument `(x,)` is recorded
    /// as `parameters = x`; any other arity is recorded as the list of
    /// arguments.
    pub fn wrap<F>(
        &self,
        tool_name: impl Into<String>,
        func: F,
        error_type: Option<ToolErrorType>,
    ) -> TrackedFn<F> {
        TrackedFn {
            calls: self.clone(),
            tool_name: tool_name.into(),
            error_type,
            func,
        }
    }

    fn spawn_report<R>(&self, tool_name: &str, report: R)
    where
        R: Future<Output = ()> + Send + 'static,
    {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                trace!(tool = %tool_name, "Dispatching call report");
                // Detached; the report's outcome is deliberately ignored.
                drop(handle.spawn(report));
            }
            Err(_) => warn!(tool = %tool_name, "No Tokio runtime, call report dropped"),
        }
    }
}

/// A function wrapped by [`CallTracker::wrap`].
#[derive(Debug, Clone)]
pub struct TrackedFn<F> {
    calls: CallTracker,
    tool_name: String,
    error_type: Option<ToolErrorType>,
    func: F,
}

impl<F> TrackedFn<F> {
    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// Invoke the wrapped function with tracking.
    pub async fn call<A, T, E, Fut>(&self, args: A) -> Result<T, E>
    where
        A: CallArgs,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Serialize,
        E: DescribeError,
    {
        let options = TrackOptions {
            call_id: None,
            parameters: args.to_parameters(),
            error_type: self.error_type,
        };

        self.calls
            .track(&self.tool_name, || (self.func)(args), options)
            .await
    }
}

/// Argument tuples accepted by [`TrackedFn::call`].
pub trait CallArgs {
    /// JSON form recorded as the call's parameters.
    fn to_parameters(&self) -> Option<Value>;
}

impl CallArgs for () {
    fn to_parameters(&self) -> Option<Value> {
        Some(Value::Array(Vec::new()))
    }
}

impl<A: Serialize> CallArgs for (A,) {
    fn to_parameters(&self) -> Option<Value> {
        serde_json::to_value(&self.0).ok()
    }
}

macro_rules! impl_call_args_list {
    ($($name:ident),+) => {
        impl<$($name: Serialize),+> CallArgs for ($($name,)+) {
            fn to_parameters(&self) -> Option<Value> {
                // Tuples serialize as JSON arrays.
                serde_json::to_value(self).ok()
            }
        }
    };
}

impl_call_args_list!(A, B);
impl_call_args_list!(A, B, C);
impl_call_args_list!(A, B, C, D);
impl_call_args_list!(A, B, C, D, E);
impl_call_args_list!(A, B, C, D, E, G);
