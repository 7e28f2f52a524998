//! Fixed index table for the 68-point facial landmark layout.
//!
//! Right/left are from the subject's point of view, so the "right eye"
//! appears on the left side of an unmirrored image.

use std::ops::Range;

/// Anatomical groups of the 68-point layout, in index order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LandmarkGroup {
    Jaw,
    RightBrow,
    LeftBrow,
    NoseBridge,
    NoseBase,
    RightEye,
    LeftEye,
    OuterMouth,
    InnerMouth,
}

impl LandmarkGroup {
    pub const ALL: [LandmarkGroup; 9] = [
        LandmarkGroup::Jaw,
        LandmarkGroup::RightBrow,
        LandmarkGroup::LeftBrow,
        LandmarkGroup::NoseBridge,
        LandmarkGroup::NoseBase,
        LandmarkGroup::RightEye,
        LandmarkGroup::LeftEye,
        LandmarkGroup::OuterMouth,
        LandmarkGroup::InnerMouth,
    ];

    /// Indices belonging to this group.
    pub fn indices(self) -> Range<usize> {
        match self {
            LandmarkGroup::Jaw => 0..17,
            LandmarkGroup::RightBrow => 17..22,
            LandmarkGroup::LeftBrow => 22..27,
            LandmarkGroup::NoseBridge => 27..31,
            LandmarkGroup::NoseBase => 31..36,
            LandmarkGroup::RightEye => 36..42,
            LandmarkGroup::LeftEye => 42..48,
            LandmarkGroup::OuterMouth => 48..60,
            LandmarkGroup::InnerMouth => 60..68,
        }
    }

    /// Whether the contour wraps around (last point joins the first).
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            LandmarkGroup::RightEye
                | LandmarkGroup::LeftEye
                | LandmarkGroup::OuterMouth
                | LandmarkGroup::InnerMouth
        )
    }
}

/// Named single points used to anchor and scale overlays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FacialFeature {
    RightJawCorner,
    Chin,
    LeftJawCorner,
    BrowCenter,
    NoseTip,
    NoseBase,
    RightEyeOuterCorner,
    RightEyeUpperLid,
    RightEyeInnerCorner,
    RightEyeLowerLid,
    LeftEyeInnerCorner,
    LeftEyeUpperLid,
    LeftEyeOuterCorner,
    LeftEyeLowerLid,
}

impl FacialFeature {
    pub const fn index(self) -> usize {
        match self {
            FacialFeature::RightJawCorner => 0,
            FacialFeature::Chin => 8,
            FacialFeature::LeftJawCorner => 16,
            // Top of the nose bridge sits between the brows.
            FacialFeature::BrowCenter => 27,
            FacialFeature::NoseTip => 30,
            // Center of the nose base, directly above the philtrum.
            FacialFeature::NoseBase => 33,
            FacialFeature::RightEyeOuterCorner => 36,
            FacialFeature::RightEyeUpperLid => 37,
            FacialFeature::RightEyeInnerCorner => 39,
            FacialFeature::RightEyeLowerLid => 41,
            FacialFeature::LeftEyeInnerCorner => 42,
            FacialFeature::LeftEyeUpperLid => 43,
            FacialFeature::LeftEyeOuterCorner => 45,
            FacialFeature::LeftEyeLowerLid => 47,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::LANDMARK_COUNT;
    use rstest::rstest;

    #[test]
    fn test_groups_partition_the_layout() {
        let mut covered = Vec::new();
        for group in LandmarkGroup::ALL {
            covered.extend(group.indices());
        }
        assert_eq!(covered, (0..LANDMARK_COUNT).collect::<Vec<_>>());
    }

    #[rstest]
    #[case::jaw(LandmarkGroup::Jaw, 0, 16)]
    #[case::right_brow(LandmarkGroup::RightBrow, 17, 21)]
    #[case::left_brow(LandmarkGroup::LeftBrow, 22, 26)]
    #[case::nose_bridge(LandmarkGroup::NoseBridge, 27, 30)]
    #[case::nose_base(LandmarkGroup::NoseBase, 31, 35)]
    #[case::right_eye(LandmarkGroup::RightEye, 36, 41)]
    #[case::left_eye(LandmarkGroup::LeftEye, 42, 47)]
    #[case::outer_mouth(LandmarkGroup::OuterMouth, 48, 59)]
    #[case::inner_mouth(LandmarkGroup::InnerMouth, 60, 67)]
    fn test_group_bounds(#[case] group: LandmarkGroup, #[case] first: usize, #[case] last: usize) {
        let range = group.indices();
        assert_eq!(range.start, first);
        assert_eq!(range.end - 1, last);
    }

    #[test]
    fn test_only_eyes_and_mouth_are_closed() {
        let closed: Vec<_> = LandmarkGroup::ALL
            .into_iter()
            .filter(|g| g.is_closed())
            .collect();
        assert_eq!(
            closed,
            vec![
                LandmarkGroup::RightEye,
                LandmarkGroup::LeftEye,
                LandmarkGroup::OuterMouth,
                LandmarkGroup::InnerMouth
            ]
        );
    }

    #[rstest]
    #[case(FacialFeature::RightEyeOuterCorner, LandmarkGroup::RightEye)]
    #[case(FacialFeature::LeftEyeOuterCorner, LandmarkGroup::LeftEye)]
    #[case(FacialFeature::NoseBase, LandmarkGroup::NoseBase)]
    #[case(FacialFeature::Chin, LandmarkGroup::Jaw)]
    fn test_features_fall_in_expected_groups(
        #[case] feature: FacialFeature,
        #[case] group: LandmarkGroup,
    ) {
        assert!(group.indices().contains(&feature.index()));
    }
}
