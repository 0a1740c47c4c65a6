//! Selecting a board variant at runtime.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::free::{DEFAULT_RUN_LENGTH, MAX_RUN_LENGTH, MIN_RUN_LENGTH};
use crate::{Board, BoardError, ClassicBoard, FreeBoard};

/// Which board a room plays on.
///
/// Serialized with a `kind` tag so clients can send
/// `{"kind": "classic"}` or `{"kind": "gomoku", "run_length": 5}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoardVariant {
    /// 3x3, three in a row, draws when full.
    Classic,
    /// Unbounded sparse grid, `run_length` in a row, never draws.
    Gomoku {
        #[serde(default = "default_run_length")]
        run_length: u32,
    },
}

fn default_run_length() -> u32 {
    DEFAULT_RUN_LENGTH
}

impl Default for BoardVariant {
    fn default() -> Self {
        Self::Gomoku {
            run_length: DEFAULT_RUN_LENGTH,
        }
    }
}

impl BoardVariant {
    /// Builds an empty board of this variant.
    pub fn build(self) -> Box<dyn Board> {
        match self {
            Self::Classic => Box::new(ClassicBoard::new()),
            Self::Gomoku { run_length } => Box::new(FreeBoard::new(run_length)),
        }
    }

    /// Checks that the variant can be played.
    ///
    /// # Errors
    /// [`BoardError::InvalidRunLength`] for a gomoku run length outside
    /// `MIN_RUN_LENGTH..=MAX_RUN_LENGTH`.
    pub fn validate(self) -> Result<Self, BoardError> {
        match self {
            Self::Gomoku { run_length }
                if !(MIN_RUN_LENGTH..=MAX_RUN_LENGTH).contains(&run_length) =>
            {
                Err(BoardError::InvalidRunLength(run_length))
            }
            _ => Ok(self),
        }
    }
}

impl fmt::Display for BoardVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classic => write!(f, "classic"),
            Self::Gomoku { run_length } => write!(f, "gomoku({run_length})"),
        }
    }
}

/// Parses `classic`, `gomoku`, or `gomoku:<run length>`.
impl FromStr for BoardVariant {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.split_once(':') {
            None if s == "classic" || s == "tictactoe" => Ok(Self::Classic),
            None if s == "gomoku" => Ok(Self::default()),
            Some(("gomoku", n)) => n
                .parse()
                .map_err(|_| BoardError::UnknownVariant(s.clone()))
                .and_then(|run_length| Self::Gomoku { run_length }.validate()),
            _ => Err(BoardError::UnknownVariant(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_five_in_a_row() {
        assert_eq!(BoardVariant::default(), BoardVariant::Gomoku { run_length: 5 });
    }

    #[test]
    fn test_build_matches_variant() {
        assert_eq!(BoardVariant::Classic.build().variant(), BoardVariant::Classic);
        let b = BoardVariant::Gomoku { run_length: 4 }.build();
        assert_eq!(b.run_length(), 4);
        assert_eq!(b.variant(), BoardVariant::Gomoku { run_length: 4 });
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(BoardVariant::Classic).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "classic"}));

        let v: BoardVariant = serde_json::from_str(r#"{"kind":"gomoku"}"#).unwrap();
        assert_eq!(v, BoardVariant::Gomoku { run_length: 5 });
    }

    #[test]
    fn test_from_str() {
        assert_eq!("classic".parse::<BoardVariant>().unwrap(), BoardVariant::Classic);
        assert_eq!(" Gomoku ".parse::<BoardVariant>().unwrap(), BoardVariant::default());
        assert_eq!(
            "gomoku:6".parse::<BoardVariant>().unwrap(),
            BoardVariant::Gomoku { run_length: 6 }
        );
        assert!(matches!(
            "chess".parse::<BoardVariant>(),
            Err(BoardError::UnknownVariant(_))
        ));
        assert!("gomoku:many".parse::<BoardVariant>().is_err());
    }

    #[test]
    fn test_validate_run_length_bounds() {
        assert!(BoardVariant::Classic.validate().is_ok());
        assert!(BoardVariant::default().validate().is_ok());
        for run_length in [MIN_RUN_LENGTH, MAX_RUN_LENGTH] {
            assert!(BoardVariant::Gomoku { run_length }.validate().is_ok());
        }
        for run_length in [0, 1, MIN_RUN_LENGTH - 1, MAX_RUN_LENGTH + 1, u32::MAX] {
            assert_eq!(
                BoardVariant::Gomoku { run_length }.validate(),
                Err(BoardError::InvalidRunLength(run_length))
            );
        }
    }

    #[test]
    fn test_from_str_rejects_out_of_range_run_length() {
        assert_eq!(
            "gomoku:0".parse::<BoardVariant>(),
            Err(BoardError::InvalidRunLength(0))
        );
        assert_eq!(
            "gomoku:4294967295".parse::<BoardVariant>(),
            Err(BoardError::InvalidRunLength(u32::MAX))
        );
    }
}
