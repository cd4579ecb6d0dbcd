use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Unit a key's validity period is measured in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DurationUnit {
    Days,
    Weeks,
    Months,
    Years,
}

impl DurationUnit {
    /// Fixed day multiplier used by the key store's approximate expiry.
    pub fn approx_days(self) -> i64 {
        match self {
            Self::Days => 1,
            Self::Weeks => 7,
            Self::Months => 30,
            Self::Years => 365,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(DurationUnit::from_str("Weeks").unwrap(), DurationUnit::Weeks);
        assert_eq!(DurationUnit::from_str("YEARS").unwrap(), DurationUnit::Years);
        assert!(DurationUnit::from_str("fortnights").is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&DurationUnit::Months).unwrap(), "\"months\"");
        assert_eq!(DurationUnit::Days.to_string(), "days");
        assert_eq!(DurationUnit::Years.as_ref(), "years");
    }
}
