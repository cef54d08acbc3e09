//! kafkaflow core
//!
//! Leaf crate of the workspace: the error taxonomy every layer reports
//! through, the [`ErrorHandler`] that classifies and presents those errors,
//! and the [`CommandResult`] value commands return.

pub mod error;
pub mod handler;
pub mod result;

pub use error::{ErrorKind, KafkaflowError, Severity};
pub use handler::{DEFAULT_CRITICAL_EXIT_CODE, Disposition, ErrorHandler, SubscriptionId};
pub use result::CommandResult;

pub type Result<T> = std::result::Result<T, KafkaflowError>;
