use crate::engine::adapter::ProviderAdapter;
use crate::engine::locator::SelectorStrategy;
use regex::Regex;

/// Sanef "péages à payer" basket. Plate input and submit live in the top
/// document; the submit pops an account-creation modal that has to be
/// cancelled before the result renders.
pub fn adapter() -> ProviderAdapter {
    ProviderAdapter {
        id: "sanef",
        entry_url: "https://www.sanef.com/client/index.html?lang=fr#basket",
        locale: "fr-FR",
        timezone: "Europe/Paris",

        consent_strategies: vec![
            SelectorStrategy::document("#didomi-notice-agree-button", 2_000),
            SelectorStrategy::document("text=/tout accepter/i", 2_500),
        ],
        consent_text_pattern: Regex::new("(?i)tout accepter").unwrap(),

        pre_fill_strategies: vec![],
        plate_input_strategies: vec![
            SelectorStrategy::document(r#"input[placeholder="XX123XX"]"#, 8_000),
            SelectorStrategy::document(r#"[data-test-id="page-basket-plate-input"] input"#, 3_000),
            SelectorStrategy::frames(r#"input[placeholder="XX123XX"]"#, 3_000),
            SelectorStrategy::shadow(r#"input[placeholder="XX123XX"]"#, 2_000),
        ],
        submit_strategies: vec![
            SelectorStrategy::document(r#"[data-test-id="page-basket-submit-button"]"#, 5_000),
            SelectorStrategy::document("text=/vérifier mes péages/i", 3_000),
            SelectorStrategy::document("button[type='submit']", 2_000),
        ],
        post_submit_dismiss_strategies: vec![SelectorStrategy::document(
            r#"[data-test-id="account-modal-cancel-button"]"#,
            3_000,
        )],

        amount_region_selectors: vec![
            "[class*='amount']",
            "[class*='total']",
            "[data-test-id*='amount']",
        ],
        amount_patterns: vec![Regex::new(r"[0-9][.,][0-9]{1,2}").unwrap()],
        no_trip_pattern: Regex::new("(?i)aucun (péage|trajet) (à payer|en attente)").unwrap(),
        link_strategies: vec![
            SelectorStrategy::document("a[href*='pay'], a[href*='paiement']", 1_500),
            SelectorStrategy::document("text=/payer|régler/i", 1_500),
        ],
        fallback_pay_url: Some("https://www.sanef.com/client/index.html?lang=fr#basket"),
    }
}
