//! Shared HTTP client and runtime.
//!
//! Requests use async reqwest, but every call site blocks on the shared
//! current-thread runtime, so the pipeline stays strictly sequential.

use std::sync::LazyLock;
use std::time::Duration;

/// Connect timeout; there is no overall request timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(concat!("tabline/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared single-threaded tokio runtime for HTTP operations.
///
/// Drive futures with `SHARED_RUNTIME.block_on(..)`; a current-thread
/// runtime only makes I/O progress inside `Runtime::block_on`.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});
