//! Data loading
//!
//! - **handler**: the [`Loader`] trait and the arguments loaders receive
//! - **outcome**: [`LoaderOutcome`], [`LoaderSignal`], and the per-navigation [`OutcomeMap`]
//! - **cancel**: [`NavigationToken`] threaded through every loader
//! - **pipeline**: [`LoaderPipeline`] running loaders parent-to-child
//! - **manager**: [`NavigationManager`] superseding in-flight navigations

mod cancel;
pub(crate) mod handler;
mod manager;
mod outcome;
mod pipeline;

pub use cancel::{CancellationSignal, NavigationToken};
pub use handler::{Loader, LoaderArgs};
pub use manager::NavigationManager;
pub use outcome::{LoaderOutcome, LoaderResult, LoaderSignal, OutcomeMap};
pub use pipeline::{LoaderPipeline, PipelineOutcome};
