//! Rotation kinds: two single rotations and their two compositions

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Rebalancing rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum RotationKind {
    /// Promote the right child
    Left,

    /// Promote the left child
    Right,

    /// Left on the left child, then right on the node
    LeftRight,

    /// Right on the right child, then left on the node
    RightLeft,
}

/// Unrecognised rotation name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown rotation '{0}' (expected left, right, left-right or right-left)")]
pub struct ParseRotationKindError(pub String);

impl RotationKind {
    /// All kinds, singles first
    pub const ALL: [RotationKind; 4] = [
        RotationKind::Left,
        RotationKind::Right,
        RotationKind::LeftRight,
        RotationKind::RightLeft,
    ];

    /// Check if composed of two single rotations
    pub fn is_double(&self) -> bool {
        matches!(self, RotationKind::LeftRight | RotationKind::RightLeft)
    }

    /// Single rotations making up a double one, in application order
    ///
    /// The first half applies to the child on the heavy side, the second to
    /// the node itself.
    pub fn half_steps(&self) -> Option<[RotationKind; 2]> {
        match self {
            RotationKind::LeftRight => Some([RotationKind::Left, RotationKind::Right]),
            RotationKind::RightLeft => Some([RotationKind::Right, RotationKind::Left]),
            RotationKind::Left | RotationKind::Right => None,
        }
    }

    /// Lowercase name, as typed by the user
    pub fn name(&self) -> &'static str {
        match self {
            RotationKind::Left => "left",
            RotationKind::Right => "right",
            RotationKind::LeftRight => "left-right",
            RotationKind::RightLeft => "right-left",
        }
    }

    /// Textbook case label (which side of which child is too tall)
    pub fn case_label(&self) -> &'static str {
        match self {
            RotationKind::Right => "Left-Left case",
            RotationKind::Left => "Right-Right case",
            RotationKind::LeftRight => "Left-Right case",
            RotationKind::RightLeft => "Right-Left case",
        }
    }
}

impl fmt::Display for RotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RotationKind {
    type Err = ParseRotationKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(RotationKind::Left),
            "right" | "r" => Ok(RotationKind::Right),
            "left-right" | "leftright" | "lr" => Ok(RotationKind::LeftRight),
            "right-left" | "rightleft" | "rl" => Ok(RotationKind::RightLeft),
            other => Err(ParseRotationKindError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_names() {
        for kind in RotationKind::ALL {
            assert_eq!(kind.name().parse::<RotationKind>(), Ok(kind));
        }
        assert_eq!("LR".parse::<RotationKind>(), Ok(RotationKind::LeftRight));
        assert!("sideways".parse::<RotationKind>().is_err());
    }

    #[test]
    fn test_half_steps() {
        assert_eq!(
            RotationKind::LeftRight.half_steps(),
            Some([RotationKind::Left, RotationKind::Right])
        );
        assert_eq!(RotationKind::Left.half_steps(), None);
        assert!(RotationKind::RightLeft.is_double());
        assert!(!RotationKind::Right.is_double());
    }
}
