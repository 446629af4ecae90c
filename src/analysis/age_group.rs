pub const YOUNGEST_GROUP: &str = "18-24";
pub const UNKNOWN_GROUP: &str = "Unknown";

const FIRST_FIVE_YEAR_BRACKET: u32 = 25;

/// Map an age to its USMS 5-year bracket, e.g. `37 -> "35-39"`.
///
/// Everyone under 25 swims in the single 18-24 bracket.
pub fn resolve(age: u32) -> String {
    if age < FIRST_FIVE_YEAR_BRACKET {
        return YOUNGEST_GROUP.to_string();
    }

    let (lower, upper) = bracket_bounds(age);
    format!("{}-{}", lower, upper)
}

fn bracket_bounds(age: u32) -> (u32, u32) {
    let lower = (age / 5) * 5;
    (lower, lower + 4)
}

/// Interpret the age column of a results table.
///
/// The column holds either a bracket (`"35-39"`) or a plain age (`"37"`).
pub fn from_column(text: &str) -> String {
    let text = text.trim();

    if is_bracket(text) {
        return text.to_string();
    }

    match text.parse::<u32>() {
        Ok(age) => resolve(age),
        Err(_) => UNKNOWN_GROUP.to_string(),
    }
}

fn is_bracket(text: &str) -> bool {
    match text.split_once('-') {
        Some((lower, upper)) => lower.parse::<u32>().is_ok() && upper.parse::<u32>().is_ok(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_young_swimmers_share_one_bracket() {
        assert_eq!(resolve(18), "18-24");
        assert_eq!(resolve(24), "18-24");
        assert_eq!(resolve(0), "18-24");
    }

    #[test]
    fn test_five_year_brackets() {
        assert_eq!(resolve(25), "25-29");
        assert_eq!(resolve(29), "25-29");
        assert_eq!(resolve(37), "35-39");
        assert_eq!(resolve(80), "80-84");
    }

    #[test]
    fn test_from_column() {
        assert_eq!(from_column("35-39"), "35-39");
        assert_eq!(from_column(" 42 "), "40-44");
        assert_eq!(from_column("n/a"), "Unknown");
        assert_eq!(from_column("-"), "Unknown");
    }

    proptest! {
        #[test]
        fn prop_bracket_contains_age(age in 25u32..150) {
            let (lower, upper) = bracket_bounds(age);
            prop_assert_eq!(lower % 5, 0);
            prop_assert!(lower <= age && age <= upper);
            prop_assert_eq!(resolve(age), format!("{}-{}", lower, upper));
        }
    }
}
