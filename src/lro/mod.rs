//! Long-running operation handling.
//!
//! Every mutating control-plane call returns an [`Operation`]. The
//! [`OperationWaiter`] drives it to a terminal state by repeatedly asking
//! an [`OperationPoller`] for its status, sleeping between polls as the
//! [`PollPolicy`] and the control plane's `Retry-After` hints dictate.
//!
//! Waiting is an ordinary future: dropping it abandons the poll loop
//! without leaving anything running in the background.

mod operation;
mod policy;
mod waiter;


pub use operation::{NoContent, Operation, OperationPoller, PollMode, PollStatus, PollTarget};
pub use policy::PollPolicy;
pub use waiter::OperationWaiter;
