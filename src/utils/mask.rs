/// Masks a plate for logs. Plates are personal data; keep the first and
/// last two characters so operators can still correlate requests.
pub fn mask_plate(value: &str) -> String {
    if value.is_empty() {
        return "".to_string();
    }

    let len = value.chars().count();
    if len <= 4 {
        return "*".repeat(len);
    }

    let chars: Vec<char> = value.chars().collect();
    format!(
        "{}{}{}",
        chars[..2].iter().collect::<String>(),
        "*".repeat(len - 4),
        chars[len - 2..].iter().collect::<String>()
    )
}
