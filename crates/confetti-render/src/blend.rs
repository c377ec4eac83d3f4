use confetti_platform::{BlendFactor, BlendState};
use serde::{Deserialize, Serialize};

/// Compositing rule for one draw session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Opaque, blending off.
    #[default]
    Default,
    /// `src * alpha + dst`. Order-independent glow.
    Add,
    /// `src * alpha + dst * (1 - alpha)`. Needs back-to-front order.
    Alpha,
}

impl BlendMode {
    pub fn blend_state(self) -> Option<BlendState> {
        match self {
            BlendMode::Default => None,
            BlendMode::Add => Some(BlendState {
                src_factor: BlendFactor::SrcAlpha,
                dst_factor: BlendFactor::One,
            }),
            BlendMode::Alpha => Some(BlendState {
                src_factor: BlendFactor::SrcAlpha,
                dst_factor: BlendFactor::OneMinusSrcAlpha,
            }),
        }
    }

    pub fn is_order_dependent(self) -> bool {
        self == BlendMode::Alpha
    }
}
