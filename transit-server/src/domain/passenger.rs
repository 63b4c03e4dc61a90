//! Passenger fare classes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DomainError;

/// Fare class of the traveller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassengerClass {
    #[default]
    Regular,
    Student,
    Elderly,
}

impl PassengerClass {
    /// Parse a class name, falling back to `Regular` for anything unknown.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PassengerClass::Regular => "regular",
            PassengerClass::Student => "student",
            PassengerClass::Elderly => "elderly",
        }
    }
}

impl FromStr for PassengerClass {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" => Ok(PassengerClass::Regular),
            "student" => Ok(PassengerClass::Student),
            "elderly" => Ok(PassengerClass::Elderly),
            other => Err(DomainError::InvalidPassengerClass(other.to_string())),
        }
    }
}

impl fmt::Display for PassengerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known() {
        assert_eq!("student".parse::<PassengerClass>().unwrap(), PassengerClass::Student);
        assert_eq!(" Elderly ".parse::<PassengerClass>().unwrap(), PassengerClass::Elderly);
        assert_eq!("REGULAR".parse::<PassengerClass>().unwrap(), PassengerClass::Regular);
    }

    #[test]
    fn parse_unknown_is_error() {
        assert!("tourist".parse::<PassengerClass>().is_err());
    }

    #[test]
    fn lenient_falls_back_to_regular() {
        assert_eq!(PassengerClass::parse_lenient("tourist"), PassengerClass::Regular);
        assert_eq!(PassengerClass::parse_lenient("student"), PassengerClass::Student);
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(PassengerClass::Elderly.to_string(), "elderly");
    }
}
