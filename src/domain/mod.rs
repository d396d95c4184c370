mod kind;
mod outcome;
mod package;
mod trace;
mod user;

pub use kind::*;
pub use outcome::*;
pub use package::*;
pub use trace::*;
pub use user::*;

use futures::Future;
use std::pin::Pin;

pub type Unit = ();

/// Deferred non-critical work a procedure hands back alongside its outcome.
/// The handler spawns it after the response is rendered; its failures are
/// logged and never alter the already-sent response.
pub type FollowUp = Pin<Box<dyn Future<Output = Unit> + Send>>;
