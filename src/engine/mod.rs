pub mod adapter;
pub mod capture;
pub mod consent;
pub mod extract;
pub mod form;
pub mod locator;
pub mod outcome;
pub mod pipeline;
pub mod stabilize;

#[cfg(test)]
pub mod testkit;

pub use adapter::ProviderAdapter;
pub use capture::{Checkpoint, DirSink, InlineSink, ScreenshotRef, ScreenshotSink};
pub use locator::{Scope, SelectorStrategy};
pub use outcome::{AutomationResult, Outcome, Screenshots};
pub use pipeline::{CheckEngine, EngineTimeouts};
