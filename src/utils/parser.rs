use regex::Regex;

/// Parsed monetary amount in integer minor units (cents).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAmount {
    pub minor_units: i64,
    pub currency: Option<String>,
}

/// Parses a French-formatted amount into cents.
/// Examples: "23,50 €", "1 234,56 EUR", "5.9", "0,05"
///
/// Only decimal amounts count: a bare integer ("2024") is not an amount,
/// which keeps years and counters on result pages from matching.
pub fn parse_amount_minor(text: &str) -> Option<ParsedAmount> {
    if text.is_empty() {
        return None;
    }

    let currency = if text.contains('€') || text.to_lowercase().contains("eur") {
        Some("EUR".to_string())
    } else {
        None
    };

    // Strip currency markers and the assorted spaces French sites put
    // inside numbers (narrow no-break space included).
    let cleaned = text
        .replace('€', "")
        .replace("EUR", "")
        .replace("eur", "")
        .replace('\u{a0}', " ")
        .replace('\u{202f}', " ");

    // Integer part with optional dot/space thousands grouping, then a comma
    // or dot decimal separator and 1-2 fraction digits. The guards stop the
    // fraction from eating into a grouped block ("300.000" is not 300.00).
    let re = Regex::new(
        r"(?:^|[^0-9])([0-9]{1,3}(?:[ .][0-9]{3})*|[0-9]+)[.,]([0-9]{1,2})(?:[^0-9]|$)",
    )
    .unwrap();

    let caps = re.captures(&cleaned)?;
    let int_part: i64 = caps[1]
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .ok()?;
    let frac_str = &caps[2];
    // Single fraction digit is tenths: right-pad, never left-pad.
    let frac: i64 = if frac_str.len() == 1 {
        frac_str.parse::<i64>().ok()? * 10
    } else {
        frac_str.parse().ok()?
    };

    Some(ParsedAmount {
        minor_units: int_part * 100 + frac,
        currency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_french_format() {
        assert_eq!(parse_amount_minor("12,34").unwrap().minor_units, 1234);
        assert_eq!(parse_amount_minor("5.9").unwrap().minor_units, 590);
        assert_eq!(parse_amount_minor("0,05").unwrap().minor_units, 5);
        assert_eq!(parse_amount_minor("23,50 €").unwrap().minor_units, 2350);
        assert_eq!(parse_amount_minor("1 234,56 €").unwrap().minor_units, 123456);
        assert_eq!(parse_amount_minor("1.234,56").unwrap().minor_units, 123456);
    }

    #[test]
    fn test_currency_marker() {
        assert_eq!(
            parse_amount_minor("23,50 €").unwrap().currency.as_deref(),
            Some("EUR")
        );
        assert_eq!(
            parse_amount_minor("23,50 EUR").unwrap().currency.as_deref(),
            Some("EUR")
        );
        assert_eq!(parse_amount_minor("23,50").unwrap().currency, None);
    }

    #[test]
    fn test_rejects_non_amounts() {
        assert!(parse_amount_minor("").is_none());
        assert!(parse_amount_minor("abc").is_none());
        // Bare integers and grouped thousands without decimals do not count.
        assert!(parse_amount_minor("2024").is_none());
        assert!(parse_amount_minor("300.000").is_none());
    }

    #[test]
    fn test_first_amount_wins() {
        assert_eq!(
            parse_amount_minor("Total : 7,20 € dont TVA 1,20 €")
                .unwrap()
                .minor_units,
            720
        );
    }
}
