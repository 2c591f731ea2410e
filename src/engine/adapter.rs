use crate::engine::locator::SelectorStrategy;
use regex::Regex;

/// Static per-site configuration. Built once at startup, never mutated
/// during a query. The whole check pipeline is parameterized by this, so
/// new portals are configuration, not new code.
pub struct ProviderAdapter {
    pub id: &'static str,
    pub entry_url: &'static str,
    pub locale: &'static str,
    pub timezone: &'static str,

    /// Consent/cookie dismissal controls, most specific first.
    pub consent_strategies: Vec<SelectorStrategy>,
    /// Textual form of the accept control, for the coordinate-click tier.
    pub consent_text_pattern: Regex,

    /// Controls to click before the plate input exists (mode toggles on
    /// multi-step forms). Best-effort.
    pub pre_fill_strategies: Vec<SelectorStrategy>,
    pub plate_input_strategies: Vec<SelectorStrategy>,
    pub submit_strategies: Vec<SelectorStrategy>,
    /// Dialogs to dismiss after submitting (account popins, "continue"
    /// interstitials). Best-effort.
    pub post_submit_dismiss_strategies: Vec<SelectorStrategy>,

    /// Candidate regions scanned for a due amount, before the free-text
    /// fallback.
    pub amount_region_selectors: Vec<&'static str>,
    /// A region only counts when its text matches one of these.
    pub amount_patterns: Vec<Regex>,
    /// "No trip found for this plate" signal.
    pub no_trip_pattern: Regex,
    /// Payment-intent anchors; non-hyperlink matches are skipped.
    pub link_strategies: Vec<SelectorStrategy>,
    /// Used when a due is detected but no payment link was extracted.
    pub fallback_pay_url: Option<&'static str>,
}
