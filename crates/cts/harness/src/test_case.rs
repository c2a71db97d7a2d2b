//! Test cases and the probes that drive them.
//!
//! A [`Probe`] is the pluggable body of a test case: it talks to the target
//! through the [`RepositoryClient`], reads what earlier probes discovered and
//! records evidence of its own. A [`TestCase`] wraps one probe for one
//! workbench run and turns whatever the probe does (success, assertion
//! failure, client error, panic, hang) into exactly one terminal [`Status`].

use crate::context::DiscoveryContext;
use crate::error::{HarnessError, HarnessResult};
use async_trait::async_trait;
use cts_client::{ClientError, RepositoryClient};
use cts_types::{DiscoveredProperty, Status, TestCaseResult};
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Why a probe body stopped short of success.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// A discovery key the probe relies on is absent.
    #[error("required discovery '{0}' is not available")]
    MissingDiscovery(String),

    /// The probe decided it cannot meaningfully run.
    #[error("skipped: {0}")]
    Skipped(String),

    /// The target answered, but not the way the protocol requires.
    #[error("assertion failed: {0}")]
    Assertion(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// Evidence could not be converted to or from JSON.
    #[error("evidence error: {0}")]
    Evidence(String),
}

impl ProbeError {
    /// The terminal status this error stands for.
    pub fn status(&self) -> Status {
        match self {
            ProbeError::MissingDiscovery(_) | ProbeError::Skipped(_) => Status::Skipped,
            ProbeError::Client(err) if err.is_not_supported() => Status::NotSupported,
            _ => Status::Failed,
        }
    }
}

pub type ProbeResult<T> = Result<T, ProbeError>;

/// Fail the probe with `message` unless `condition` holds.
pub fn ensure(condition: bool, message: impl Into<String>) -> ProbeResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ProbeError::Assertion(message.into()))
    }
}

/// The body of a test case.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Unique code within the workbench.
    fn code(&self) -> &'static str;

    fn name(&self) -> &'static str;

    /// Discovery keys that must be present before the probe runs.
    fn prerequisites(&self) -> &'static [&'static str] {
        &[]
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()>;
}

/// What a probe can see and touch while it runs.
///
/// Discoveries are staged here and reach the shared context only when the
/// body returns. A body that panics or times out publishes nothing.
pub struct ProbeContext<'a> {
    client: &'a dyn RepositoryClient,
    discovery: &'a DiscoveryContext,
    staged: BTreeMap<String, Value>,
    messages: Vec<String>,
    discovered: Vec<DiscoveredProperty>,
}

impl<'a> ProbeContext<'a> {
    pub fn new(client: &'a dyn RepositoryClient, discovery: &'a DiscoveryContext) -> Self {
        Self {
            client,
            discovery,
            staged: BTreeMap::new(),
            messages: Vec::new(),
            discovered: Vec::new(),
        }
    }

    pub fn client(&self) -> &'a dyn RepositoryClient {
        self.client
    }

    /// A discovery made by this probe or published by an earlier one.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.staged.get(key).or_else(|| self.discovery.get(key))
    }

    /// A string discovery, or a skip if it is absent.
    pub fn require_str(&self, key: &str) -> ProbeResult<String> {
        match self.get(key) {
            Some(Value::String(value)) => Ok(value.clone()),
            Some(other) => Err(ProbeError::Evidence(format!(
                "discovery '{}' is not a string: {}",
                key, other
            ))),
            None => Err(ProbeError::MissingDiscovery(key.to_string())),
        }
    }

    /// A structured discovery, or a skip if it is absent.
    pub fn require<T: DeserializeOwned>(&self, key: &str) -> ProbeResult<T> {
        let value = self
            .get(key)
            .ok_or_else(|| ProbeError::MissingDiscovery(key.to_string()))?;
        serde_json::from_value(value.clone())
            .map_err(|e| ProbeError::Evidence(format!("discovery '{}': {}", key, e)))
    }

    /// Stage a discovery for later test cases and record it as evidence.
    pub fn discover(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        self.staged.insert(key.to_string(), value.clone());
        self.discovered.push(DiscoveredProperty {
            key: key.to_string(),
            value,
        });
    }

    pub fn discover_json<T: Serialize>(&mut self, key: &str, value: &T) -> ProbeResult<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| ProbeError::Evidence(format!("discovery '{}': {}", key, e)))?;
        self.discover(key, value);
        Ok(())
    }

    /// Append a diagnostic message.
    pub fn note(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    fn into_parts(self) -> (BTreeMap<String, Value>, Vec<String>, Vec<DiscoveredProperty>) {
        (self.staged, self.messages, self.discovered)
    }
}

/// One probe bound to its place in a workbench schedule.
///
/// Status starts as `UNKNOWN` and becomes terminal exactly once.
pub struct TestCase {
    probe: Arc<dyn Probe>,
    requirements: Vec<String>,
    mandatory: bool,
    status: Status,
    messages: Vec<String>,
    discovered: Vec<DiscoveredProperty>,
    duration_ms: u64,
    executed: bool,
}

impl TestCase {
    pub fn new(probe: Arc<dyn Probe>, requirements: Vec<String>, mandatory: bool) -> Self {
        Self {
            probe,
            requirements,
            mandatory,
            status: Status::Unknown,
            messages: Vec::new(),
            discovered: Vec::new(),
            duration_ms: 0,
            executed: false,
        }
    }

    pub fn code(&self) -> &'static str {
        self.probe.code()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Run the probe once against the target.
    ///
    /// Probe outcomes are returned as a status. The only error is a second
    /// call on the same instance.
    pub async fn execute(
        &mut self,
        discovery: &mut DiscoveryContext,
        client: &dyn RepositoryClient,
        timeout: Duration,
    ) -> HarnessResult<Status> {
        if self.executed {
            return Err(HarnessError::AlreadyExecuted {
                code: self.code().to_string(),
            });
        }
        self.executed = true;
        let started = Instant::now();

        let missing: Vec<&str> = self
            .probe
            .prerequisites()
            .iter()
            .copied()
            .filter(|key| !discovery.contains(key))
            .collect();

        let status = if missing.is_empty() {
            let probe = Arc::clone(&self.probe);
            let mut cx = ProbeContext::new(client, discovery);
            let outcome = tokio::time::timeout(
                timeout,
                AssertUnwindSafe(probe.run(&mut cx)).catch_unwind(),
            )
            .await;

            let (status, completed) = match outcome {
                Ok(Ok(Ok(()))) => (Status::Success, true),
                Ok(Ok(Err(err))) => {
                    cx.note(err.to_string());
                    (err.status(), true)
                }
                Ok(Err(payload)) => {
                    cx.note(format!("probe panicked: {}", panic_message(payload.as_ref())));
                    (Status::Failed, false)
                }
                Err(_) => {
                    cx.note(format!("probe timed out after {:?}", timeout));
                    (Status::Failed, false)
                }
            };
            let (staged, messages, discovered) = cx.into_parts();
            if completed {
                for (key, value) in staged {
                    discovery.insert(key, value);
                }
                self.discovered.extend(discovered);
            }
            self.messages.extend(messages);
            status
        } else {
            for key in &missing {
                self.messages
                    .push(format!("prerequisite discovery '{}' is not available", key));
            }
            Status::Skipped
        };

        self.status = status;
        self.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match status {
            Status::Failed => tracing::warn!(
                test_case = self.code(),
                messages = ?self.messages,
                "Test case failed"
            ),
            _ => tracing::debug!(
                test_case = self.code(),
                status = %status,
                duration_ms = self.duration_ms,
                "Test case finished"
            ),
        }
        Ok(status)
    }

    /// Snapshot of this test case for the result tree.
    pub fn to_result(&self) -> TestCaseResult {
        TestCaseResult {
            code: self.code().to_string(),
            name: self.probe.name().to_string(),
            requirements: self.requirements.clone(),
            mandatory: self.mandatory,
            status: self.status,
            messages: self.messages.clone(),
            prerequisites: self
                .probe
                .prerequisites()
                .iter()
                .map(|k| k.to_string())
                .collect(),
            discovered: self.discovered.clone(),
            duration_ms: self.duration_ms,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
