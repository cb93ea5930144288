use crate::{
    morph::{Expression, MorphConfig},
    motion::ExpSmoothed,
};

/// Smoothly blends morph target weights between expressions.
///
/// Every name used by any expression is tracked. Selecting an expression sets
/// its own entries as targets and every other name to zero, so nothing is left
/// behind when switching back to idle.
pub struct ExpressionDriver {
    names: Vec<String>,
    table: Vec<(Expression, Vec<(usize, f32)>)>,
    targets: Vec<f32>,
    weights: Vec<ExpSmoothed<f32>>,
    smoothness: f32,
    current: Option<Expression>,
}

impl ExpressionDriver {
    pub fn new(config: &MorphConfig) -> Self {
        let mut names: Vec<String> = config
            .expressions
            .values()
            .flat_map(|weights| weights.keys().cloned())
            .collect();
        names.sort();
        names.dedup();

        let table = config
            .expressions
            .iter()
            .map(|(expression, weights)| {
                let entries = weights
                    .iter()
                    .filter_map(|(name, weight)| {
                        names
                            .binary_search(name)
                            .ok()
                            .map(|index| (index, weight.clamp(0.0, 1.0)))
                    })
                    .collect();
                (*expression, entries)
            })
            .collect();

        Self {
            targets: vec![0.0; names.len()],
            weights: vec![ExpSmoothed::new(0.0); names.len()],
            names,
            table,
            smoothness: config.expression_smoothness,
            current: None,
        }
    }

    pub fn current(&self) -> Option<Expression> {
        self.current
    }

    pub fn set_expression(&mut self, expression: Expression) {
        if self.current == Some(expression) {
            return;
        }
        self.current = Some(expression);

        for target in self.targets.iter_mut() {
            *target = 0.0;
        }
        if let Some((_, entries)) = self.table.iter().find(|(e, _)| *e == expression) {
            for &(index, weight) in entries.iter() {
                self.targets[index] = weight;
            }
        }
    }

    pub fn update(&mut self, delta: f32) {
        for (weight, target) in self.weights.iter_mut().zip(self.targets.iter()) {
            weight.exp_smooth_towards(target, self.smoothness, delta);
        }
    }

    pub fn weight(&self, name: &str) -> Option<f32> {
        let index = self.names.iter().position(|n| n == name)?;
        self.weights[index].value()
    }

    pub fn weights(&self) -> impl Iterator<Item = (&str, f32)> {
        self.names
            .iter()
            .zip(self.weights.iter())
            .map(|(name, weight)| (name.as_str(), weight.value().unwrap_or(0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn settle(driver: &mut ExpressionDriver) {
        for _ in 0..120 {
            driver.update(FRAME);
        }
    }

    #[test]
    fn blends_towards_selected_expression() {
        let mut driver = ExpressionDriver::new(&MorphConfig::default());
        driver.set_expression(Expression::Happy);
        driver.update(FRAME);
        let first = driver.weight("smile").unwrap();
        assert!(first > 0.0 && first < 0.7);

        settle(&mut driver);
        assert!((driver.weight("smile").unwrap() - 0.7).abs() < 1e-3);
        assert_eq!(driver.weight("frown"), Some(0.0));
    }

    #[test]
    fn returning_to_idle_clears_every_weight() {
        let mut driver = ExpressionDriver::new(&MorphConfig::default());
        driver.set_expression(Expression::Thinking);
        settle(&mut driver);
        assert!(driver.weight("browRaise").unwrap() > 0.3);

        driver.set_expression(Expression::Idle);
        settle(&mut driver);
        for (_, weight) in driver.weights() {
            assert!(weight < 1e-3);
        }
    }

    #[test]
    fn unknown_names_have_no_weight() {
        let driver = ExpressionDriver::new(&MorphConfig::default());
        assert_eq!(driver.weight("tongueOut"), None);
        assert_eq!(driver.current(), None);
    }
}
