//! Relationship intensity on a 1-10 scale.

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Strength of a directed relationship, always within `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Intensity(u8);

impl Intensity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: i64) -> Result<Self, DomainError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(DomainError::validation(format!(
                "Relationship intensity must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// Intensity assumed when a relationship edit does not state one.
impl Default for Intensity {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<i64> for Intensity {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Intensity> for i64 {
    fn from(value: Intensity) -> Self {
        i64::from(value.0)
    }
}

impl std::fmt::Display for Intensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds() {
        assert_eq!(Intensity::new(1).expect("min").value(), 1);
        assert_eq!(Intensity::new(10).expect("max").value(), 10);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(Intensity::new(0).is_err());
        assert!(Intensity::new(11).is_err());
        assert!(serde_json::from_str::<Intensity>("42").is_err());
    }

    #[test]
    fn default_is_three() {
        assert_eq!(Intensity::default().value(), 3);
    }
}
