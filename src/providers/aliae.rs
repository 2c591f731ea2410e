use crate::engine::adapter::ProviderAdapter;
use crate::engine::locator::SelectorStrategy;
use regex::Regex;

/// Aliae free-flow payment form (Angular Material). The form is
/// multi-step: a "Plaque d'immatriculation" toggle first, then the
/// text box, then Valider and a Continuer interstitial.
pub fn adapter() -> ProviderAdapter {
    ProviderAdapter {
        id: "aliae",
        entry_url: "https://paiement.aliae.com/fr/form/payment",
        locale: "fr-FR",
        timezone: "Europe/Paris",

        consent_strategies: vec![
            SelectorStrategy::document("text=/autoriser tous les cookies/i", 3_000),
            SelectorStrategy::document("#onetrust-accept-btn-handler", 1_500),
        ],
        consent_text_pattern: Regex::new("(?i)autoriser tous les cookies").unwrap(),

        pre_fill_strategies: vec![SelectorStrategy::document(
            "text=/plaque d'immatriculation/i",
            3_000,
        )],
        plate_input_strategies: vec![
            SelectorStrategy::document("input[placeholder*='immatriculation' i]", 6_000),
            SelectorStrategy::document("mat-form-field input[type='text']", 3_000),
            SelectorStrategy::document("input[type='text']", 3_000),
            SelectorStrategy::frames("input[type='text']", 2_000),
        ],
        submit_strategies: vec![
            SelectorStrategy::document("text=/valider/i", 3_000),
            SelectorStrategy::document("button[type='submit']", 2_000),
        ],
        post_submit_dismiss_strategies: vec![SelectorStrategy::document(
            "text=/continuer/i",
            3_000,
        )],

        amount_region_selectors: vec![
            "[class*='amount']",
            "[class*='total']",
            "[data-testid*='amount']",
        ],
        amount_patterns: vec![Regex::new(r"[0-9][.,][0-9]{1,2}").unwrap()],
        no_trip_pattern: Regex::new("(?i)n'avons pas trouvé de trajet associé à cette plaque")
            .unwrap(),
        link_strategies: vec![
            SelectorStrategy::document(
                "a[href*='pay'], a[href*='paiement'], a[href*='checkout']",
                1_500,
            ),
            SelectorStrategy::document("text=/payer|paiement|régler/i", 1_500),
        ],
        fallback_pay_url: None,
    }
}
