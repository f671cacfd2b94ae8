pub(crate) mod openai;
pub(crate) mod replicate;

use tokio_util::sync::CancellationToken;

use crate::error::ProviderError;

/// Drive a reqwest send under the request's cancellation token
///
/// Cancellation and transport timeouts both surface as
/// [`ProviderError::Timeout`] so the public classification does not
/// depend on which side gave up first.
pub(crate) async fn send_cancellable(
    builder: reqwest::RequestBuilder,
    cancel: &CancellationToken,
) -> Result<reqwest::Response, ProviderError> {
    match cancel.run_until_cancelled(builder.send()).await {
        None => Err(ProviderError::Timeout),
        Some(Err(e)) if e.is_timeout() => Err(ProviderError::Timeout),
        Some(Err(e)) => Err(ProviderError::Connection(e.to_string())),
        Some(Ok(response)) => Ok(response),
    }
}
