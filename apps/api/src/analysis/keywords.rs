//! High-intent search phrases tracked for every practice.

const CITY_PLACEHOLDER: &str = "{city}";

/// Ordered template list. `{city}` is replaced with the practice's city.
pub const KEYWORD_TEMPLATES: [&str; 20] = [
    "dentist near me",
    "dental office near me",
    "local dentist",
    "dentist in {city}",
    "emergency dentist near me",
    "walk-in dentist",
    "dentist open on weekends",
    "tooth pain relief",
    "affordable dentist near me",
    "family dentist near me",
    "pediatric dentist near me",
    "cosmetic dentist near me",
    "dental implant dentist",
    "teeth whitening",
    "teeth cleaning",
    "root canal",
    "dental emergency dentist near me",
    "children's dentist",
    "best dentist near me",
    "best dentist in {city}",
];

/// Pulls the city out of a free-form street address.
///
/// "123 Main St, Austin TX" → "Austin". With fewer than two comma-separated
/// parts the whole trimmed address is used.
pub fn extract_city(address: &str) -> String {
    let parts: Vec<&str> = address.split(',').map(str::trim).collect();

    if parts.len() < 2 {
        return parts.first().copied().unwrap_or_default().to_string();
    }

    let words: Vec<&str> = parts[1].split_whitespace().collect();
    match words.split_last() {
        Some((last, rest)) if !rest.is_empty() && is_state_abbreviation(last) => rest.join(" "),
        _ => parts[1].to_string(),
    }
}

fn is_state_abbreviation(token: &str) -> bool {
    token.len() == 2 && token.chars().all(|c| c.is_ascii_uppercase())
}

/// Builds the keyword set for `city`, preserving template order.
pub fn build_keyword_set(city: &str) -> Vec<String> {
    KEYWORD_TEMPLATES
        .iter()
        .map(|template| template.replace(CITY_PLACEHOLDER, city))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_with_state_abbreviation_stripped() {
        assert_eq!(extract_city("123 Main St, Austin TX"), "Austin");
    }

    #[test]
    fn test_city_without_state() {
        assert_eq!(extract_city("123 Main St, Austin"), "Austin");
    }

    #[test]
    fn test_city_with_separate_state_part() {
        assert_eq!(extract_city("500 Oak Ave, San Antonio, TX 78205"), "San Antonio");
    }

    #[test]
    fn test_multi_word_city_with_state() {
        assert_eq!(extract_city("9 Elm Rd, Round Rock TX"), "Round Rock");
    }

    #[test]
    fn test_lowercase_state_not_stripped() {
        assert_eq!(extract_city("9 Elm Rd, Austin tx"), "Austin tx");
    }

    #[test]
    fn test_no_comma_uses_whole_address() {
        assert_eq!(extract_city("  Downtown Austin  "), "Downtown Austin");
    }

    #[test]
    fn test_keyword_set_has_twenty_in_order() {
        let keywords = build_keyword_set("Austin");
        assert_eq!(keywords.len(), 20);
        assert_eq!(keywords[0], "dentist near me");
        assert_eq!(keywords[3], "dentist in Austin");
        assert_eq!(keywords[19], "best dentist in Austin");
    }

    #[test]
    fn test_templates_without_placeholder_unchanged() {
        let keywords = build_keyword_set("Austin");
        for (template, keyword) in KEYWORD_TEMPLATES.iter().zip(&keywords) {
            if !template.contains(CITY_PLACEHOLDER) {
                assert_eq!(*template, keyword.as_str());
            } else {
                assert!(!keyword.contains(CITY_PLACEHOLDER));
            }
        }
    }
}
