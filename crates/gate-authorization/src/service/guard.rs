//! Fault isolation around a single policy evaluation.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::runtime::Handle;

use crate::error::PolicyFault;

/// How a policy evaluation is wrapped
#[derive(Clone, Copy, Debug)]
pub(crate) struct Guard {
    pub(crate) timeout: Option<Duration>,
    pub(crate) catch_panics: bool,
}

impl Guard {
    /// Run one evaluation, converting panics and overruns into faults.
    ///
    /// A timeout requires a tokio runtime with the time driver enabled.
    /// Outside any tokio runtime the evaluation is skipped and reported as
    /// `PolicyFault::NoRuntime`.
    pub(crate) async fn run<T, F>(self, evaluation: F) -> Result<T, PolicyFault>
    where
        F: Future<Output = Result<T, PolicyFault>>,
    {
        if let Some(limit) = self.timeout {
            if Handle::try_current().is_err() {
                return Err(PolicyFault::NoRuntime(limit));
            }
        }

        let bounded = async move {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, evaluation)
                    .await
                    .unwrap_or(Err(PolicyFault::TimedOut(limit))),
                None => evaluation.await,
            }
        };

        if !self.catch_panics {
            return bounded.await;
        }

        match AssertUnwindSafe(bounded).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(PolicyFault::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
