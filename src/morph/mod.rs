mod expression_driver;
mod morph_targets;

pub use expression_driver::ExpressionDriver;
pub use morph_targets::MorphTargets;

use std::{collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::AvatarMotionError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Expression {
    #[default]
    Idle,
    Happy,
    Sad,
    Thinking,
    Listening,
}

impl Expression {
    pub const ALL: [Expression; 5] = [
        Expression::Idle,
        Expression::Happy,
        Expression::Sad,
        Expression::Thinking,
        Expression::Listening,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Expression::Idle => "idle",
            Expression::Happy => "happy",
            Expression::Sad => "sad",
            Expression::Thinking => "thinking",
            Expression::Listening => "listening",
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Expression {
    type Err = AvatarMotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expression::ALL
            .into_iter()
            .find(|expression| s.eq_ignore_ascii_case(expression.name()))
            .ok_or_else(|| AvatarMotionError::InvalidExpression(s.to_string()))
    }
}

fn default_expressions() -> HashMap<Expression, HashMap<String, f32>> {
    let weights = |entries: &[(&str, f32)]| {
        entries
            .iter()
            .map(|(name, weight)| (name.to_string(), *weight))
            .collect::<HashMap<_, _>>()
    };

    HashMap::from([
        (Expression::Idle, HashMap::new()),
        (Expression::Happy, weights(&[("smile", 0.7)])),
        (Expression::Sad, weights(&[("frown", 0.5)])),
        (Expression::Thinking, weights(&[("browRaise", 0.35)])),
        (Expression::Listening, weights(&[("smile", 0.25)])),
    ])
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct MorphConfig {
    /// Lower case substrings identifying eyelid morph targets
    pub blink_tokens: Vec<String>,
    /// Lower case names, or substrings, of mouth open morph targets
    pub mouth_candidates: Vec<String>,
    /// Lower case substrings of mesh names scaled as a blink fallback
    pub eye_mesh_tokens: Vec<String>,
    pub eye_squash: f32,
    /// Morph target weights per expression, names are matched exactly
    pub expressions: HashMap<Expression, HashMap<String, f32>>,
    pub expression_smoothness: f32,
}

impl Default for MorphConfig {
    fn default() -> Self {
        let strings = |values: &[&str]| values.iter().map(|s| s.to_string()).collect();
        Self {
            blink_tokens: strings(&["blink", "eye_close", "eyeclose"]),
            mouth_candidates: strings(&[
                "mouthopen",
                "mouth_open",
                "jawopen",
                "jaw_open",
                "viseme_aa",
                "viseme_ah",
                "aa",
                "ah",
                "vrc.v_aa",
                "fcl_mth_a",
                "fcl_mth_aa",
                "fcl_mth_open",
            ]),
            eye_mesh_tokens: strings(&["eye", "lid", "blink"]),
            eye_squash: 0.9,
            expressions: default_expressions(),
            expression_smoothness: 0.3,
        }
    }
}

impl MorphConfig {
    pub fn is_blink_target(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.blink_tokens
            .iter()
            .any(|token| lower.contains(token.as_str()))
    }

    pub fn is_mouth_target(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.mouth_candidates
            .iter()
            .any(|candidate| lower == *candidate || lower.contains(candidate.as_str()))
    }

    pub fn is_eye_mesh(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.eye_mesh_tokens
            .iter()
            .any(|token| lower.contains(token.as_str()))
    }

    /// Y scale factor for an eye mesh at the given eyelid closure.
    pub fn eye_scale(&self, closure: f32) -> f32 {
        1.0 - self.eye_squash * closure.clamp(0.0, 1.0)
    }

    /// Write one frame of facial animation. Expression first, then the mouth,
    /// then the eyelids, so blink and speech win over an expression sharing a
    /// morph target.
    pub fn apply(
        &self,
        targets: &mut MorphTargets,
        expression: &ExpressionDriver,
        mouth_open: f32,
        blink: f32,
    ) {
        for (name, weight) in expression.weights() {
            targets.set_influence(name, weight);
        }
        targets.set_matching(|name| self.is_mouth_target(name), mouth_open);
        targets.set_matching(|name| self.is_blink_target(name), blink);
    }
}
