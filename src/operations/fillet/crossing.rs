use serde::{Deserialize, Serialize};

use crate::error::{FilletError, FilletResult, PersistError};
use crate::operations::offset::OffsetSide;
use crate::operations::query::IntersectionConfig;

/// Sidedness of curve 0 relative to curve 1 at the fillet's center.
///
/// Persisted as an integer code: 1 for [`CrossingType::LeftToRight`], 0 for
/// [`CrossingType::RightToLeft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum CrossingType {
    /// Curve 0's offset passes curve 1's offset from left to right.
    #[default]
    LeftToRight,
    /// Curve 0's offset passes curve 1's offset from right to left.
    RightToLeft,
}

impl CrossingType {
    /// Persisted integer code.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::LeftToRight => 1,
            Self::RightToLeft => 0,
        }
    }

    /// Decodes a persisted integer code.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnknownCrossingType`] for any code other than
    /// 0 or 1.
    pub fn from_code(code: i32) -> Result<Self, PersistError> {
        match code {
            1 => Ok(Self::LeftToRight),
            0 => Ok(Self::RightToLeft),
            other => Err(PersistError::UnknownCrossingType(other)),
        }
    }

    /// Derives the crossing type at a chosen intersection.
    ///
    /// Crossing configurations decide directly. Touching configurations
    /// carry no sense of their own, so the incoming flags decide.
    pub(crate) fn from_configs(
        configs: [IntersectionConfig; 2],
        incoming: [bool; 2],
    ) -> FilletResult<Self> {
        use IntersectionConfig::{LeftLeft, LeftRight, RightLeft, RightRight};

        let [inc0, inc1] = incoming;
        let left_to_right = match configs {
            [LeftRight, _] => true,
            [RightLeft, _] => false,
            [LeftLeft, LeftLeft] => inc0 && !inc1,
            [LeftLeft, RightRight] => inc0 && inc1,
            [RightRight, LeftLeft] => !inc0 && !inc1,
            [RightRight, RightRight] => !inc0 && inc1,
            other => {
                tracing::debug!(?other, "unclassifiable intersection");
                return Err(FilletError::InvalidGeometry(format!(
                    "cannot derive a crossing from configurations {other:?}"
                )));
            }
        };
        Ok(if left_to_right {
            Self::LeftToRight
        } else {
            Self::RightToLeft
        })
    }

    /// Whether an intersection with curve 0 in `config` matches this type.
    pub(crate) fn accepts(self, config: IntersectionConfig) -> bool {
        match config {
            IntersectionConfig::LeftRight => self == Self::LeftToRight,
            IntersectionConfig::RightLeft => self == Self::RightToLeft,
            IntersectionConfig::LeftLeft | IntersectionConfig::RightRight => true,
            IntersectionConfig::Unknown => false,
        }
    }

    /// Sides on which each curve is offset to find the fillet center.
    pub(crate) fn offset_sides(self, incoming: [bool; 2]) -> [OffsetSide; 2] {
        let [inc0, inc1] = incoming;
        let left = match self {
            Self::LeftToRight => [!inc1, inc0],
            Self::RightToLeft => [inc1, !inc0],
        };
        left.map(OffsetSide::from_left)
    }
}

impl From<CrossingType> for i32 {
    fn from(crossing: CrossingType) -> Self {
        crossing.code()
    }
}

impl TryFrom<i32> for CrossingType {
    type Error = PersistError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use IntersectionConfig::{LeftLeft, LeftRight, RightLeft, RightRight, Unknown};

    #[test]
    fn codes_round_trip() {
        for crossing in [CrossingType::LeftToRight, CrossingType::RightToLeft] {
            assert_eq!(CrossingType::from_code(crossing.code()).unwrap(), crossing);
        }
        assert_eq!(
            CrossingType::from_code(7),
            Err(PersistError::UnknownCrossingType(7))
        );
        assert_eq!(serde_json::to_string(&CrossingType::LeftToRight).unwrap(), "1");
    }

    #[test]
    fn crossing_configs_decide_directly() {
        let any = [true, false];
        assert_eq!(
            CrossingType::from_configs([LeftRight, RightLeft], any).unwrap(),
            CrossingType::LeftToRight
        );
        assert_eq!(
            CrossingType::from_configs([RightLeft, LeftRight], any).unwrap(),
            CrossingType::RightToLeft
        );
    }

    #[test]
    fn touching_configs_use_incoming_flags() {
        let ltr = CrossingType::LeftToRight;
        let rtl = CrossingType::RightToLeft;
        assert_eq!(CrossingType::from_configs([LeftLeft, LeftLeft], [true, false]).unwrap(), ltr);
        assert_eq!(CrossingType::from_configs([LeftLeft, LeftLeft], [true, true]).unwrap(), rtl);
        assert_eq!(CrossingType::from_configs([LeftLeft, RightRight], [true, true]).unwrap(), ltr);
        assert_eq!(CrossingType::from_configs([RightRight, LeftLeft], [false, false]).unwrap(), ltr);
        assert_eq!(CrossingType::from_configs([RightRight, RightRight], [false, true]).unwrap(), ltr);
        assert_eq!(CrossingType::from_configs([RightRight, RightRight], [true, true]).unwrap(), rtl);
    }

    #[test]
    fn unknown_config_is_rejected() {
        assert!(CrossingType::from_configs([Unknown, LeftRight], [true, true]).is_err());
        assert!(CrossingType::from_configs([LeftLeft, Unknown], [true, true]).is_err());
        assert!(!CrossingType::LeftToRight.accepts(Unknown));
    }

    #[test]
    fn filter_matches_crossing_sense() {
        assert!(CrossingType::LeftToRight.accepts(LeftRight));
        assert!(!CrossingType::LeftToRight.accepts(RightLeft));
        assert!(CrossingType::RightToLeft.accepts(RightLeft));
        assert!(CrossingType::RightToLeft.accepts(RightRight));
    }

    #[test]
    fn opposite_sense_swaps_sides() {
        let incoming = [false, true];
        let sides = CrossingType::LeftToRight.offset_sides(incoming);
        let opposite = CrossingType::RightToLeft.offset_sides(incoming);
        assert_eq!(sides, [OffsetSide::Right, OffsetSide::Right]);
        assert_eq!(opposite, [OffsetSide::Left, OffsetSide::Left]);
    }
}
