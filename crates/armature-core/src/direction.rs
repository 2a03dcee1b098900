//! Data-flow direction for diagrams and container scopes.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::error::ValueError;

/// Rank direction understood by the layout engine.
///
/// Parsed case-insensitively from the four `rankdir` values. Any other
/// string fails with [`ValueError::InvalidDirection`].
///
/// # Examples
///
/// ```
/// use armature_core::direction::Direction;
///
/// let lr: Direction = "lr".parse().unwrap();
/// assert_eq!(lr, Direction::LeftRight);
/// assert_eq!(lr.as_str(), "LR");
///
/// assert!("diagonal".parse::<Direction>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Top to bottom.
    TopBottom,
    /// Bottom to top.
    BottomTop,
    /// Left to right (the diagram default).
    #[default]
    LeftRight,
    /// Right to left.
    RightLeft,
}

impl Direction {
    /// Returns the `rankdir` value for this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::TopBottom => "TB",
            Direction::BottomTop => "BT",
            Direction::LeftRight => "LR",
            Direction::RightLeft => "RL",
        }
    }
}

impl FromStr for Direction {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TB" => Ok(Direction::TopBottom),
            "BT" => Ok(Direction::BottomTop),
            "LR" => Ok(Direction::LeftRight),
            "RL" => Ok(Direction::RightLeft),
            _ => Err(ValueError::InvalidDirection(s.to_string())),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_parse_uppercase() {
        assert_eq!("TB".parse::<Direction>().unwrap(), Direction::TopBottom);
        assert_eq!("BT".parse::<Direction>().unwrap(), Direction::BottomTop);
        assert_eq!("LR".parse::<Direction>().unwrap(), Direction::LeftRight);
        assert_eq!("RL".parse::<Direction>().unwrap(), Direction::RightLeft);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("tb".parse::<Direction>().unwrap(), Direction::TopBottom);
        assert_eq!("Lr".parse::<Direction>().unwrap(), Direction::LeftRight);
        assert_eq!("rL".parse::<Direction>().unwrap(), Direction::RightLeft);
    }

    #[test]
    fn test_parse_rejects_unknown_values() {
        let err = "DIAGONAL".parse::<Direction>().unwrap_err();
        assert_eq!(err, ValueError::InvalidDirection("DIAGONAL".to_string()));
    }

    #[test]
    fn test_display_round_trips() {
        for direction in [
            Direction::TopBottom,
            Direction::BottomTop,
            Direction::LeftRight,
            Direction::RightLeft,
        ] {
            assert_eq!(
                direction.to_string().parse::<Direction>().unwrap(),
                direction
            );
        }
    }

    proptest! {
        #[test]
        fn test_any_casing_of_valid_directions_parses(
            base in prop::sample::select(vec!["TB", "BT", "LR", "RL"]),
            flips in prop::collection::vec(any::<bool>(), 2),
        ) {
            let cased: String = base
                .chars()
                .zip(flips.iter())
                .map(|(c, flip)| {
                    if *flip {
                        c.to_ascii_lowercase()
                    } else {
                        c
                    }
                })
                .collect();
            prop_assert!(cased.parse::<Direction>().is_ok());
        }

        #[test]
        fn test_unknown_strings_fail(s in "[a-z0-9]{3,8}") {
            prop_assert!(s.parse::<Direction>().is_err());
        }
    }
}
