use std::fmt;

use serde::{Deserialize, Serialize};

/// Overlay selected for the next cycle.
///
/// Names that do not match a mode fall back to [`RenderMode::DefaultMesh`],
/// both when parsing and when deserializing settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum RenderMode {
    #[default]
    DefaultMesh,
    FaceIndex,
    DottedEyes,
    CuteEyes,
    Moustache,
    Glasses,
    RedEye,
    HeadSticker,
}

impl RenderMode {
    pub const ALL: &[RenderMode] = &[
        RenderMode::DefaultMesh,
        RenderMode::FaceIndex,
        RenderMode::DottedEyes,
        RenderMode::CuteEyes,
        RenderMode::Moustache,
        RenderMode::Glasses,
        RenderMode::RedEye,
        RenderMode::HeadSticker,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RenderMode::DefaultMesh => "default-mesh",
            RenderMode::FaceIndex => "face-index",
            RenderMode::DottedEyes => "dotted-eyes",
            RenderMode::CuteEyes => "cute-eyes",
            RenderMode::Moustache => "moustache",
            RenderMode::Glasses => "glasses",
            RenderMode::RedEye => "red-eye",
            RenderMode::HeadSticker => "head-sticker",
        }
    }

    /// Lenient lookup; unknown names select the default mesh.
    pub fn from_name(name: &str) -> RenderMode {
        let normalized = name.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.name() == normalized)
            .unwrap_or_default()
    }

    /// Every mode except the default mesh anchors to landmarks, so
    /// landmarks are requested regardless of the landmark toggle.
    pub fn needs_landmarks(self) -> bool {
        self != RenderMode::DefaultMesh
    }
}

impl From<String> for RenderMode {
    fn from(name: String) -> Self {
        RenderMode::from_name(&name)
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
