//! Blocking API for [`SpryngClient`].
//!
//! Provides synchronous wrappers for callers that are not running async code.

use std::future::Future;

use tokio::runtime::{Handle, RuntimeFlavor};

use crate::client::{SpryngClient, SpryngError};
use crate::domain::SmsRequest;

/// Blocking view of a [`SpryngClient`].
///
/// Every call drives the async implementation to completion and returns the very same
/// [`SpryngError`] the async method would have returned.
///
/// ```rust,no_run
/// use spryng::{SmsRequest, SpryngClient};
///
/// fn main() -> Result<(), spryng::SpryngError> {
///     let client = SpryngClient::with_password("username", "password")?;
///     println!("credits: {}", client.blocking().credit_amount()?);
///
///     let request = SmsRequest::new(["31612345678"], "Spryng", "hello");
///     client.blocking().send_sms(&request)?;
///     Ok(())
/// }
/// ```
pub struct BlockingClient<'a> {
    inner: &'a SpryngClient,
}

impl<'a> BlockingClient<'a> {
    pub(crate) const fn new(inner: &'a SpryngClient) -> Self {
        Self { inner }
    }

    /// Blocking form of [`SpryngClient::credit_amount`].
    pub fn credit_amount(&self) -> Result<f64, SpryngError> {
        block_on(self.inner.credit_amount())
    }

    /// Blocking form of [`SpryngClient::send_sms`].
    pub fn send_sms(&self, request: &SmsRequest) -> Result<(), SpryngError> {
        block_on(self.inner.send_sms(request))
    }
}

fn block_on<F, T>(future: F) -> Result<T, SpryngError>
where
    F: Future<Output = Result<T, SpryngError>> + Send,
    T: Send,
{
    match Handle::try_current() {
        // A current-thread runtime cannot give up its only worker, so the future runs on
        // a scoped thread with a runtime of its own.
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::CurrentThread => {
            std::thread::scope(|scope| {
                scope
                    .spawn(|| block_on_new_runtime(future))
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
        }
        // Inside a multi-thread runtime: park this worker while the future runs.
        Ok(handle) => tokio::task::block_in_place(|| handle.block_on(future)),
        Err(_) => block_on_new_runtime(future),
    }
}

fn block_on_new_runtime<F, T>(future: F) -> Result<T, SpryngError>
where
    F: Future<Output = Result<T, SpryngError>>,
{
    tracing::trace!("starting current-thread runtime for blocking call");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(SpryngError::Runtime)?;
    runtime.block_on(future)
}
