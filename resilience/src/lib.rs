//! Retry/backoff and soft-timeout helpers shared by every upstream-facing
//! tool and every graph node.

pub mod retry;
pub mod timeout;

pub use retry::{retry, RetryConfig};
pub use timeout::{with_soft_timeout, DEFAULT_NODE_TIMEOUT, DEFAULT_REQUEST_BUDGET};
