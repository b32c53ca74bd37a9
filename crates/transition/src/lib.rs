//! Load-then-blend texture transitions driven by timeline moves.
//!
//! [`TransitionController`] is a sans-IO state machine: it hands out
//! [`LoadTicket`]s and is told when loads finish. [`TransitionDriver`] wires it
//! to an [`AssetLoader`] and a [`RenderTarget`] on a single-threaded event loop.

pub mod blend;
pub mod cache;
pub mod controller;
pub mod driver;
pub mod loader;
pub mod request;
pub mod residency;
pub mod target;

#[cfg(test)]
pub(crate) mod testing;

pub use blend::*;
pub use cache::*;
pub use controller::*;
pub use driver::*;
pub use loader::*;
pub use request::*;
pub use residency::*;
pub use target::*;
