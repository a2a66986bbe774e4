//! Suggested recovery timelines per injury type.
//!
//! These are informational defaults shown to parents, not medical advice;
//! the create flow uses them when the payload omits a timeline.

/// Fallback when the injury type is not recognised.
pub const DEFAULT_TIMELINE_DAYS: i32 = 7;

const TIMELINES: &[(&str, i32)] = &[
    ("Ankle Sprain", 14),
    ("Knee Injury", 28),
    ("Concussion", 21),
    ("Shoulder Injury", 21),
    ("Wrist Sprain", 14),
    ("Muscle Strain", 10),
    ("Shin Splints", 14),
    ("Growth Plate Injury", 42),
];

/// Every known injury type with its suggested recovery days.
pub fn all() -> impl Iterator<Item = (&'static str, i32)> {
    TIMELINES.iter().copied()
}

/// Suggested recovery days for a given injury type (case-insensitive).
pub fn suggested_days(kind: &str) -> i32 {
    TIMELINES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(kind.trim()))
        .map(|(_, days)| *days)
        .unwrap_or(DEFAULT_TIMELINE_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types() {
        assert_eq!(suggested_days("Ankle Sprain"), 14);
        assert_eq!(suggested_days("Concussion"), 21);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(suggested_days("ankle sprain"), 14);
        assert_eq!(suggested_days("  KNEE INJURY "), 28);
    }

    #[test]
    fn test_unknown_type_gets_default() {
        assert_eq!(suggested_days("Stubbed toe"), DEFAULT_TIMELINE_DAYS);
    }
}
