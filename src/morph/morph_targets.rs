use std::collections::HashMap;

use bevy::ecs::component::Component;

/// Blend shape weights of one mesh node, indexed through its name dictionary.
#[derive(Component, Clone, Debug, Default)]
pub struct MorphTargets {
    dictionary: HashMap<String, usize>,
    influences: Vec<f32>,
}

impl MorphTargets {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        let dictionary: HashMap<String, usize> = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| (name.into(), index))
            .collect();
        let influences = vec![0.0; dictionary.len()];
        Self {
            dictionary,
            influences,
        }
    }

    /// Build from a loader provided dictionary. Influences are padded so every
    /// dictionary index is addressable.
    pub fn from_parts(dictionary: HashMap<String, usize>, mut influences: Vec<f32>) -> Self {
        let required = dictionary.values().map(|index| index + 1).max().unwrap_or(0);
        if influences.len() < required {
            influences.resize(required, 0.0);
        }
        for influence in influences.iter_mut() {
            *influence = influence.clamp(0.0, 1.0);
        }
        Self {
            dictionary,
            influences,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dictionary.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dictionary.keys().map(|name| name.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.dictionary.get(name).copied()
    }

    pub fn influence(&self, name: &str) -> Option<f32> {
        self.index_of(name)
            .and_then(|index| self.influences.get(index).copied())
    }

    pub fn influences(&self) -> &[f32] {
        &self.influences
    }

    /// Unknown names are ignored, values are clamped to [0, 1].
    pub fn set_influence(&mut self, name: &str, value: f32) {
        if let Some(index) = self.index_of(name) {
            if let Some(influence) = self.influences.get_mut(index) {
                *influence = value.clamp(0.0, 1.0);
            }
        }
    }

    pub fn set_matching(&mut self, mut predicate: impl FnMut(&str) -> bool, value: f32) {
        let value = value.clamp(0.0, 1.0);
        for (name, &index) in self.dictionary.iter() {
            if predicate(name) {
                if let Some(influence) = self.influences.get_mut(index) {
                    *influence = value;
                }
            }
        }
    }

    pub fn any_matching(&self, mut predicate: impl FnMut(&str) -> bool) -> bool {
        self.dictionary.keys().any(|name| predicate(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn influences_are_clamped_and_unknown_names_ignored() {
        let mut targets = MorphTargets::new(["smile", "blink"]);
        targets.set_influence("smile", 1.7);
        targets.set_influence("blink", -0.5);
        targets.set_influence("missing", 0.5);
        assert_eq!(targets.influence("smile"), Some(1.0));
        assert_eq!(targets.influence("blink"), Some(0.0));
        assert_eq!(targets.influence("missing"), None);
        assert_eq!(targets.influences().len(), 2);
    }

    #[test]
    fn from_parts_pads_missing_influences() {
        let targets = MorphTargets::from_parts(
            HashMap::from([("jawOpen".to_string(), 3)]),
            vec![0.2, 2.0],
        );
        assert_eq!(targets.influences(), &[0.2, 1.0, 0.0, 0.0]);
        assert_eq!(targets.influence("jawOpen"), Some(0.0));
    }

    #[test]
    fn set_matching() {
        let mut targets = MorphTargets::new(["eyeBlinkLeft", "eyeBlinkRight", "jawOpen"]);
        targets.set_matching(|name| name.starts_with("eyeBlink"), 0.5);
        assert_eq!(targets.influence("eyeBlinkLeft"), Some(0.5));
        assert_eq!(targets.influence("eyeBlinkRight"), Some(0.5));
        assert_eq!(targets.influence("jawOpen"), Some(0.0));
    }
}
