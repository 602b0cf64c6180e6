//! Map viewport contract used by the reveal orchestration.
//!
//! The map widget itself lives outside this workspace. Anything that can move
//! a camera implements [`ViewportController`]; the orchestration talks to it
//! through a [`ViewportSlot`], which models the widget being mounted,
//! unmounted and becoming ready.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use viewport_client::ViewportSlot;
//!
//! # async fn run() -> Result<(), viewport_client::ViewportError> {
//! let slot = ViewportSlot::new();
//! // ... the widget calls `slot.attach(..)` once it mounts ...
//! let viewport = slot.wait_ready(Duration::from_secs(3)).await?;
//! # let _ = viewport;
//! # Ok(())
//! # }
//! ```

mod error;
mod slot;
mod traits;

#[cfg(any(test, feature = "mock"))]
mod mock;

pub use error::{ViewportError, ViewportResult};
pub use slot::ViewportSlot;
pub use traits::ViewportController;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockViewport, ViewportCall};
