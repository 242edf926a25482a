// src/utils.rs
use chrono::{Datelike, NaiveDate, Utc};

/// Whole years between `date_of_birth` and `today`, counting the birthday itself.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    if date_of_birth > today {
        return None;
    }
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    u32::try_from(age).ok()
}

pub fn age_today(date_of_birth: Option<NaiveDate>) -> Option<u32> {
    date_of_birth.and_then(|dob| age_on(dob, Utc::now().date_naive()))
}

/// Up to two uppercase initials from the first letters of the name's words
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Case-insensitive substring match; an absent field never matches.
pub fn contains_ci(haystack: Option<&str>, needle_lower: &str) -> bool {
    haystack
        .map(|text| text.to_lowercase().contains(needle_lower))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_on() {
        assert_eq!(age_on(date(1990, 6, 15), date(2024, 6, 14)), Some(33));
        assert_eq!(age_on(date(1990, 6, 15), date(2024, 6, 15)), Some(34));
        assert_eq!(age_on(date(2000, 1, 1), date(1999, 12, 31)), None);
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("ana maria petrova"), "AM");
        assert_eq!(initials("Sam"), "S");
        assert_eq!(initials("  "), "");
    }

    #[test]
    fn test_contains_ci() {
        assert!(contains_ci(Some("Berlin"), "berl"));
        assert!(!contains_ci(None, "berl"));
        assert!(!contains_ci(Some("Munich"), "berl"));
    }
}
