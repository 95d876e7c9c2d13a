//! The unit of work wrapped by the orchestrator.

use std::future::Future;

/// A repeatable asynchronous call to an external provider.
///
/// The orchestrator may invoke [`call`](Upstream::call) several times for a
/// single request (once per retry), so implementors must be able to produce a
/// fresh future on every invocation.
///
/// Any `FnMut() -> impl Future<Output = Result<T, E>>` closure is an
/// `Upstream`:
///
/// ```
/// use pulse_core::Upstream;
///
/// # async fn demo() {
/// let mut calls = 0;
/// let mut work = move || {
///     calls += 1;
///     let n = calls;
///     async move { Ok::<_, std::io::Error>(n) }
/// };
/// assert_eq!(Upstream::call(&mut work).await.unwrap(), 1);
/// assert_eq!(Upstream::call(&mut work).await.unwrap(), 2);
/// # }
/// ```
pub trait Upstream {
    /// Successful payload.
    type Response;

    /// Failure returned by the provider.
    type Error;

    /// Future resolving to the outcome of one attempt.
    type Future: Future<Output = Result<Self::Response, Self::Error>> + Send;

    /// Starts one attempt.
    fn call(&mut self) -> Self::Future;
}

impl<F, Fut, T, E> Upstream for F
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>> + Send,
{
    type Response = T;
    type Error = E;
    type Future = Fut;

    fn call(&mut self) -> Self::Future {
        self()
    }
}
