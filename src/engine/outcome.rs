use crate::engine::adapter::ProviderAdapter;
use crate::engine::capture::ScreenshotRef;
use crate::engine::extract::Extraction;
use thiserror::Error;

/// Terminal classification of one check. `Pending` exists for callers that
/// poll before the pipeline completes; the engine never returns it as a
/// final result.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Pending,
    Due {
        amount_minor: Option<i64>,
        currency: String,
        result_url: String,
        pay_url: String,
    },
    NoDue,
    Error {
        message: String,
    },
}

/// Failure conditions the pipeline can hit on its critical path. Display
/// strings are the wire-visible error messages.
#[derive(Debug, Error)]
pub enum CheckFailure {
    #[error("element not found")]
    ElementNotFound,

    #[error("submission failed")]
    SubmissionFailed,

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("{0}")]
    Unexpected(String),
}

#[derive(Debug, Clone, Default)]
pub struct Screenshots {
    pub before: Option<ScreenshotRef>,
    pub after: Option<ScreenshotRef>,
    pub error: Option<ScreenshotRef>,
}

/// Created once per query, immutable after return.
#[derive(Debug, Clone)]
pub struct AutomationResult {
    pub outcome: Outcome,
    pub screenshots: Screenshots,
}

/// Priority order is fixed: critical-path failures outrank extraction
/// evidence, the no-trip signal outranks stray numerics, and an ambiguous
/// page (nothing extracted at all) defaults to NoDue rather than Error.
pub fn classify(
    result: Result<&Extraction, &CheckFailure>,
    adapter: &ProviderAdapter,
) -> Outcome {
    let extraction = match result {
        Err(failure) => {
            return Outcome::Error {
                message: failure.to_string(),
            }
        }
        Ok(extraction) => extraction,
    };

    if extraction.no_trip || (extraction.amount_minor.is_none() && extraction.pay_url.is_none()) {
        return Outcome::NoDue;
    }

    let pay_url = extraction
        .pay_url
        .clone()
        .or_else(|| adapter.fallback_pay_url.map(|u| u.to_string()))
        .unwrap_or_else(|| extraction.result_url.clone());

    Outcome::Due {
        amount_minor: extraction.amount_minor,
        currency: extraction
            .currency
            .clone()
            .unwrap_or_else(|| "EUR".to_string()),
        result_url: extraction.result_url.clone(),
        pay_url,
    }
}
