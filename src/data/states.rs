//! Static state registry for the 50 U.S. states and the District of Columbia
//!
//! This module contains the static FIPS / USPS-abbreviation / name table that
//! scopes county fetches and stamps `state_abbrev` onto records. Rows from the
//! remote source whose state FIPS is not in this table (Puerto Rico and other
//! territories) are outside the system's coverage and get skipped during
//! normalization.

use super::State;

/// Static array of the 50 states plus DC, ordered by FIPS code
pub static STATES: [State; 51] = [
    State { fips: "01", abbrev: "AL", name: "Alabama" },
    State { fips: "02", abbrev: "AK", name: "Alaska" },
    State { fips: "04", abbrev: "AZ", name: "Arizona" },
    State { fips: "05", abbrev: "AR", name: "Arkansas" },
    State { fips: "06", abbrev: "CA", name: "California" },
    State { fips: "08", abbrev: "CO", name: "Colorado" },
    State { fips: "09", abbrev: "CT", name: "Connecticut" },
    State { fips: "10", abbrev: "DE", name: "Delaware" },
    State { fips: "11", abbrev: "DC", name: "District of Columbia" },
    State { fips: "12", abbrev: "FL", name: "Florida" },
    State { fips: "13", abbrev: "GA", name: "Georgia" },
    State { fips: "15", abbrev: "HI", name: "Hawaii" },
    State { fips: "16", abbrev: "ID", name: "Idaho" },
    State { fips: "17", abbrev: "IL", name: "Illinois" },
    State { fips: "18", abbrev: "IN", name: "Indiana" },
    State { fips: "19", abbrev: "IA", name: "Iowa" },
    State { fips: "20", abbrev: "KS", name: "Kansas" },
    State { fips: "21", abbrev: "KY", name: "Kentucky" },
    State { fips: "22", abbrev: "LA", name: "Louisiana" },
    State { fips: "23", abbrev: "ME", name: "Maine" },
    State { fips: "24", abbrev: "MD", name: "Maryland" },
    State { fips: "25", abbrev: "MA", name: "Massachusetts" },
    State { fips: "26", abbrev: "MI", name: "Michigan" },
    State { fips: "27", abbrev: "MN", name: "Minnesota" },
    State { fips: "28", abbrev: "MS", name: "Mississippi" },
    State { fips: "29", abbrev: "MO", name: "Missouri" },
    State { fips: "30", abbrev: "MT", name: "Montana" },
    State { fips: "31", abbrev: "NE", name: "Nebraska" },
    State { fips: "32", abbrev: "NV", name: "Nevada" },
    State { fips: "33", abbrev: "NH", name: "New Hampshire" },
    State { fips: "34", abbrev: "NJ", name: "New Jersey" },
    State { fips: "35", abbrev: "NM", name: "New Mexico" },
    State { fips: "36", abbrev: "NY", name: "New York" },
    State { fips: "37", abbrev: "NC", name: "North Carolina" },
    State { fips: "38", abbrev: "ND", name: "North Dakota" },
    State { fips: "39", abbrev: "OH", name: "Ohio" },
    State { fips: "40", abbrev: "OK", name: "Oklahoma" },
    State { fips: "41", abbrev: "OR", name: "Oregon" },
    State { fips: "42", abbrev: "PA", name: "Pennsylvania" },
    State { fips: "44", abbrev: "RI", name: "Rhode Island" },
    State { fips: "45", abbrev: "SC", name: "South Carolina" },
    State { fips: "46", abbrev: "SD", name: "South Dakota" },
    State { fips: "47", abbrev: "TN", name: "Tennessee" },
    State { fips: "48", abbrev: "TX", name: "Texas" },
    State { fips: "49", abbrev: "UT", name: "Utah" },
    State { fips: "50", abbrev: "VT", name: "Vermont" },
    State { fips: "51", abbrev: "VA", name: "Virginia" },
    State { fips: "53", abbrev: "WA", name: "Washington" },
    State { fips: "54", abbrev: "WV", name: "West Virginia" },
    State { fips: "55", abbrev: "WI", name: "Wisconsin" },
    State { fips: "56", abbrev: "WY", name: "Wyoming" },
];

/// Get a state by its 2-digit FIPS code
///
/// # Arguments
///
/// * `fips` - The zero-padded state FIPS code (e.g., "06", "36")
///
/// # Returns
///
/// Returns `Some(&State)` if found, `None` for territories and unknown codes
pub fn state_by_fips(fips: &str) -> Option<&'static State> {
    STATES.iter().find(|state| state.fips == fips)
}

/// Get a state by its USPS abbreviation (case-insensitive)
pub fn state_by_abbrev(abbrev: &str) -> Option<&'static State> {
    STATES
        .iter()
        .find(|state| state.abbrev.eq_ignore_ascii_case(abbrev.trim()))
}

/// Get all covered states (50 states + DC)
pub fn all_states() -> &'static [State] {
    &STATES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_array_has_51_entries() {
        // 50 states plus the District of Columbia
        assert_eq!(STATES.len(), 51);
        assert_eq!(all_states().len(), 51);
    }

    #[test]
    fn test_all_fips_codes_are_two_digit_numeric() {
        for state in all_states() {
            assert_eq!(state.fips.len(), 2, "{} FIPS is not 2 digits", state.name);
            assert!(
                state.fips.chars().all(|c| c.is_ascii_digit()),
                "{} FIPS is not numeric",
                state.name
            );
        }
    }

    #[test]
    fn test_all_fips_codes_are_unique() {
        let mut codes: Vec<&str> = all_states().iter().map(|s| s.fips).collect();
        codes.sort();
        let original_len = codes.len();
        codes.dedup();
        assert_eq!(codes.len(), original_len, "State FIPS codes are not unique");
    }

    #[test]
    fn test_all_abbreviations_are_unique() {
        let mut abbrevs: Vec<&str> = all_states().iter().map(|s| s.abbrev).collect();
        abbrevs.sort();
        let original_len = abbrevs.len();
        abbrevs.dedup();
        assert_eq!(
            abbrevs.len(),
            original_len,
            "State abbreviations are not unique"
        );
    }

    #[test]
    fn test_states_are_ordered_by_fips() {
        let codes: Vec<&str> = all_states().iter().map(|s| s.fips).collect();
        let mut sorted = codes.clone();
        sorted.sort();
        assert_eq!(codes, sorted, "STATES is not in FIPS order");
    }

    #[test]
    fn test_state_by_fips_returns_correct_state() {
        let california = state_by_fips("06").unwrap();
        assert_eq!(california.abbrev, "CA");
        assert_eq!(california.name, "California");

        let dc = state_by_fips("11").unwrap();
        assert_eq!(dc.abbrev, "DC");
        assert_eq!(dc.name, "District of Columbia");
    }

    #[test]
    fn test_state_by_fips_rejects_territories() {
        // Puerto Rico, Guam, Virgin Islands, American Samoa
        assert!(state_by_fips("72").is_none());
        assert!(state_by_fips("66").is_none());
        assert!(state_by_fips("78").is_none());
        assert!(state_by_fips("60").is_none());
    }

    #[test]
    fn test_state_by_fips_rejects_unpadded_codes() {
        assert!(state_by_fips("6").is_none());
        assert!(state_by_fips("").is_none());
    }

    #[test]
    fn test_state_by_abbrev_is_case_insensitive() {
        assert_eq!(state_by_abbrev("ny").unwrap().fips, "36");
        assert_eq!(state_by_abbrev("NY").unwrap().fips, "36");
        assert_eq!(state_by_abbrev(" wa ").unwrap().fips, "53");
    }

    #[test]
    fn test_state_by_abbrev_returns_none_for_invalid() {
        assert!(state_by_abbrev("PR").is_none());
        assert!(state_by_abbrev("XX").is_none());
        assert!(state_by_abbrev("").is_none());
    }
}
