use std::collections::HashMap;

use enum_map::EnumMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    error::AvatarMotionError,
    skeleton::{detect_side, BodySide, BoneRole, BoneRoleMap},
};

/// Node name pattern. When `regex` is set it replaces the substring lists,
/// `side` is checked in both cases.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NamePattern {
    /// Lower case substrings, at least one must be present
    pub any_of: Vec<String>,
    /// Lower case substrings that must not be present
    pub none_of: Vec<String>,
    pub side: Option<BodySide>,
    pub regex: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct BoneRule {
    pub role: BoneRole,
    #[serde(flatten)]
    pub pattern: NamePattern,
    /// Later matching nodes overwrite an earlier assignment
    #[serde(default)]
    pub replace: bool,
}

impl BoneRule {
    fn new(role: BoneRole, any_of: &[&str], none_of: &[&str], replace: bool) -> Self {
        Self {
            role,
            pattern: NamePattern {
                any_of: any_of.iter().map(|s| s.to_string()).collect(),
                none_of: none_of.iter().map(|s| s.to_string()).collect(),
                side: None,
                regex: None,
            },
            replace,
        }
    }

    fn with_side(mut self, side: BodySide) -> Self {
        self.pattern.side = Some(side);
        self
    }
}

lazy_static! {
    static ref DEFAULT_BONE_RULES: Vec<BoneRule> = vec![
        BoneRule::new(BoneRole::Hips, &["hip", "root", "pelvis"], &[], false),
        BoneRule::new(BoneRole::Spine, &["spine"], &["layer"], false),
        BoneRule::new(BoneRole::Head, &["head"], &[], false),
        BoneRule::new(BoneRole::Neck, &["neck"], &[], false),
        BoneRule::new(BoneRole::RightArm, &["arm", "shoulder"], &["fore"], true)
            .with_side(BodySide::Right),
        BoneRule::new(BoneRole::LeftArm, &["arm", "shoulder"], &["fore"], true)
            .with_side(BodySide::Left),
        BoneRule::new(BoneRole::RightForearm, &["fore"], &[], true).with_side(BodySide::Right),
        BoneRule::new(BoneRole::LeftForearm, &["fore"], &[], true).with_side(BodySide::Left),
    ];
}

pub fn default_bone_rules() -> Vec<BoneRule> {
    DEFAULT_BONE_RULES.clone()
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SkeletonConfig {
    /// Evaluated in order, the first matching rule claims a node
    pub rules: Vec<BoneRule>,
    /// Exact node names that always take a role, ahead of every rule
    pub overrides: HashMap<BoneRole, String>,
}

impl Default for SkeletonConfig {
    fn default() -> Self {
        Self {
            rules: default_bone_rules(),
            overrides: HashMap::new(),
        }
    }
}

pub struct CompiledBoneRule {
    rule: BoneRule,
    regex: Option<Regex>,
}

impl CompiledBoneRule {
    pub fn compile(rule: BoneRule) -> Result<Self, AvatarMotionError> {
        let regex = match rule.pattern.regex.as_deref() {
            Some(pattern) => Some(Regex::new(pattern).map_err(|source| {
                AvatarMotionError::InvalidBonePattern {
                    role: rule.role,
                    pattern: pattern.to_string(),
                    source,
                }
            })?),
            None => None,
        };
        Ok(Self { rule, regex })
    }

    pub fn role(&self) -> BoneRole {
        self.rule.role
    }

    pub fn rule(&self) -> &BoneRule {
        &self.rule
    }

    pub fn regex(&self) -> Option<&Regex> {
        self.regex.as_ref()
    }
}

/// Decides whether a node name satisfies a rule.
pub trait BoneNameMatcher: Send + Sync {
    fn matches(&self, rule: &CompiledBoneRule, name: &str) -> bool;
}

impl<F> BoneNameMatcher for F
where
    F: Fn(&CompiledBoneRule, &str) -> bool + Send + Sync,
{
    fn matches(&self, rule: &CompiledBoneRule, name: &str) -> bool {
        self(rule, name)
    }
}

/// Case-insensitive substring matching with token based side detection.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicMatcher;

impl BoneNameMatcher for HeuristicMatcher {
    fn matches(&self, rule: &CompiledBoneRule, name: &str) -> bool {
        let pattern = &rule.rule.pattern;

        let name_matches = if let Some(regex) = rule.regex.as_ref() {
            regex.is_match(name)
        } else {
            let lower = name.to_lowercase();
            pattern
                .any_of
                .iter()
                .any(|token| lower.contains(token.as_str()))
                && !pattern
                    .none_of
                    .iter()
                    .any(|token| lower.contains(token.as_str()))
        };

        name_matches
            && pattern
                .side
                .map_or(true, |side| detect_side(name) == Some(side))
    }
}

pub struct SkeletonDiscovery {
    rules: Vec<CompiledBoneRule>,
    overrides: HashMap<String, BoneRole>,
    matcher: Box<dyn BoneNameMatcher>,
}

impl Default for SkeletonDiscovery {
    fn default() -> Self {
        Self {
            rules: DEFAULT_BONE_RULES
                .iter()
                .cloned()
                .map(|rule| CompiledBoneRule { rule, regex: None })
                .collect(),
            overrides: HashMap::new(),
            matcher: Box::new(HeuristicMatcher),
        }
    }
}

impl SkeletonDiscovery {
    pub fn new(config: &SkeletonConfig) -> Result<Self, AvatarMotionError> {
        let rules = config
            .rules
            .iter()
            .cloned()
            .map(CompiledBoneRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        let overrides = config
            .overrides
            .iter()
            .map(|(role, name)| (name.clone(), *role))
            .collect();

        Ok(Self {
            rules,
            overrides,
            matcher: Box::new(HeuristicMatcher),
        })
    }

    pub fn with_matcher(mut self, matcher: impl BoneNameMatcher + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    /// Assign roles to `nodes`, which must be given in traversal order.
    pub fn discover<'a, N: Copy>(
        &self,
        nodes: impl IntoIterator<Item = (N, &'a str)>,
    ) -> BoneRoleMap<N> {
        let mut bones = BoneRoleMap::default();
        let mut pinned: EnumMap<BoneRole, bool> = EnumMap::default();

        for (node, name) in nodes {
            if let Some(&role) = self.overrides.get(name) {
                if !pinned[role] {
                    bones.set(role, node);
                    pinned[role] = true;
                }
                continue;
            }

            let rule = match self
                .rules
                .iter()
                .find(|rule| self.matcher.matches(rule, name))
            {
                Some(rule) => rule,
                None => continue,
            };

            let role = rule.role();
            if pinned[role] {
                continue;
            }
            if !bones.contains(role) || rule.rule.replace {
                bones.set(role, node);
            }
        }

        bones
    }
}
