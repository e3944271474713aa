//! Tree-based classifiers decoded from exported model artifacts.

use serde::Deserialize;

use crate::{
    error::InferenceError,
    model::types::{ColumnKind, FEATURE_COLUMNS, FeatureRow, FeatureValue},
};

/// Capability shared by every loaded model: turn one feature row into a label.
pub trait Classifier: Send + Sync {
    fn predict(&self, row: &FeatureRow) -> Result<String, InferenceError>;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "split", rename_all = "lowercase")]
pub enum Split {
    /// Left when `value <= threshold`.
    Numeric {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Left when the value is one of `categories`, right otherwise.
    Categorical {
        feature: usize,
        categories: Vec<String>,
        left: usize,
        right: usize,
    },
}

impl Split {
    fn feature(&self) -> usize {
        match self {
            Split::Numeric { feature, .. } | Split::Categorical { feature, .. } => *feature,
        }
    }

    fn children(&self) -> (usize, usize) {
        match self {
            Split::Numeric { left, right, .. } | Split::Categorical { left, right, .. } => {
                (*left, *right)
            }
        }
    }

    fn expected_kind(&self) -> ColumnKind {
        match self {
            Split::Numeric { .. } => ColumnKind::Numeric,
            Split::Categorical { .. } => ColumnKind::Categorical,
        }
    }

    fn next(&self, row: &FeatureRow) -> Result<usize, InferenceError> {
        let feature = self.feature();
        match (self, row.value(feature)) {
            (
                Split::Numeric {
                    threshold,
                    left,
                    right,
                    ..
                },
                Some(FeatureValue::Numeric(value)),
            ) => Ok(if *value <= *threshold { *left } else { *right }),
            (
                Split::Categorical {
                    categories,
                    left,
                    right,
                    ..
                },
                Some(FeatureValue::Categorical(value)),
            ) => Ok(if categories.iter().any(|c| c == value) {
                *left
            } else {
                *right
            }),
            _ => Err(InferenceError::ColumnType {
                column: column_name(feature),
                expected: self.expected_kind().as_str(),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Leaf { leaf: Vec<f64> },
    Split(Split),
}

/// Nodes in pre-order; node 0 is the root and children follow their parent.
#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    fn leaf(&self, row: &FeatureRow) -> Result<&[f64], InferenceError> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf { leaf }) => return Ok(leaf.as_slice()),
                Some(Node::Split(split)) => index = split.next(row)?,
                None => {
                    return Err(InferenceError::Empty(format!(
                        "node {index} is out of range"
                    )));
                }
            }
        }
    }

    pub(crate) fn validate(&self, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { leaf } => {
                    if leaf.len() != n_classes {
                        return Err(format!(
                            "leaf {index} has {} weights, expected {n_classes}",
                            leaf.len()
                        ));
                    }
                    if leaf.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(format!("leaf {index} has a negative or non-finite weight"));
                    }
                    if leaf.iter().sum::<f64>() <= 0.0 {
                        return Err(format!("leaf {index} carries no weight"));
                    }
                }
                Node::Split(split) => {
                    let feature = split.feature();
                    let Some(&(column, kind)) = FEATURE_COLUMNS.get(feature) else {
                        return Err(format!("node {index} splits on unknown feature {feature}"));
                    };
                    if kind != split.expected_kind() {
                        return Err(format!(
                            "node {index} applies a {} split to {kind_name} column '{column}'",
                            split.expected_kind().as_str(),
                            kind_name = kind.as_str(),
                        ));
                    }
                    if let Split::Numeric { threshold, .. } = split {
                        if !threshold.is_finite() {
                            return Err(format!("node {index} has a non-finite threshold"));
                        }
                    }
                    let (left, right) = split.children();
                    for child in [left, right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(format!("node {index} has invalid child {child}"));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn column_name(feature: usize) -> &'static str {
    FEATURE_COLUMNS
        .get(feature)
        .map(|(name, _)| *name)
        .unwrap_or("<unknown>")
}

// First maximum wins, matching numpy's argmax.
fn argmax(weights: &[f64]) -> Option<usize> {
    weights
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &w)| match best {
            Some((_, top)) if top >= w => best,
            _ => Some((i, w)),
        })
        .map(|(i, _)| i)
}

fn label_for(classes: &[String], weights: &[f64]) -> Result<String, InferenceError> {
    argmax(weights)
        .and_then(|i| classes.get(i))
        .cloned()
        .ok_or_else(|| InferenceError::Empty("no class weights".into()))
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    classes: Vec<String>,
    tree: Tree,
}

impl DecisionTree {
    pub fn new(classes: Vec<String>, tree: Tree) -> Result<Self, String> {
        validate_classes(&classes)?;
        tree.validate(classes.len())?;
        Ok(Self { classes, tree })
    }
}

impl Classifier for DecisionTree {
    fn predict(&self, row: &FeatureRow) -> Result<String, InferenceError> {
        let weights = self.tree.leaf(row)?;
        label_for(&self.classes, weights)
    }

    fn name(&self) -> &str {
        "decision_tree"
    }
}

#[derive(Debug, Clone)]
pub struct RandomForest {
    classes: Vec<String>,
    trees: Vec<Tree>,
}

impl RandomForest {
    pub fn new(classes: Vec<String>, trees: Vec<Tree>) -> Result<Self, String> {
        validate_classes(&classes)?;
        if trees.is_empty() {
            return Err("forest has no trees".into());
        }
        for (i, tree) in trees.iter().enumerate() {
            tree.validate(classes.len())
                .map_err(|reason| format!("tree {i}: {reason}"))?;
        }
        Ok(Self { classes, trees })
    }
}

impl Classifier for RandomForest {
    /// Averages each tree's normalised leaf distribution, then takes the argmax.
    fn predict(&self, row: &FeatureRow) -> Result<String, InferenceError> {
        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let leaf = tree.leaf(row)?;
            let total: f64 = leaf.iter().sum();
            for (acc, w) in proba.iter_mut().zip(leaf) {
                *acc += w / total;
            }
        }
        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);

        label_for(&self.classes, &proba)
    }

    fn name(&self) -> &str {
        "random_forest"
    }
}

fn validate_classes(classes: &[String]) -> Result<(), String> {
    if classes.is_empty() {
        return Err("no classes declared".into());
    }
    if classes.iter().any(|c| c.trim().is_empty()) {
        return Err("class labels must not be empty".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::types::PenguinFeatures;

    fn classes() -> Vec<String> {
        vec!["Adelie".into(), "Chinstrap".into(), "Gentoo".into()]
    }

    fn tree(value: serde_json::Value) -> Tree {
        serde_json::from_value(value).expect("tree json")
    }

    fn row(island: &str, flipper: f64) -> FeatureRow {
        FeatureRow::from_features(&PenguinFeatures {
            island: island.into(),
            bill_length_mm: 39.1,
            bill_depth_mm: 18.7,
            flipper_length_mm: flipper,
            body_mass_g: 3750.0,
            sex: "male".into(),
            year: 2007,
            model: "DT".into(),
        })
    }

    // flipper <= 206.5 ? (island in [Dream] ? Chinstrap : Adelie) : Gentoo
    fn flipper_tree() -> Tree {
        tree(json!({
            "nodes": [
                {"split": "numeric", "feature": 3, "threshold": 206.5, "left": 1, "right": 4},
                {"split": "categorical", "feature": 0, "categories": ["Dream"], "left": 2, "right": 3},
                {"leaf": [1.0, 9.0, 0.0]},
                {"leaf": [40.0, 0.0, 1.0]},
                {"leaf": [0.0, 1.0, 50.0]}
            ]
        }))
    }

    #[test]
    fn decision_tree_walks_numeric_and_categorical_splits() {
        let model = DecisionTree::new(classes(), flipper_tree()).unwrap();

        assert_eq!(model.predict(&row("Torgersen", 181.0)).unwrap(), "Adelie");
        assert_eq!(model.predict(&row("Dream", 195.0)).unwrap(), "Chinstrap");
        assert_eq!(model.predict(&row("Biscoe", 220.0)).unwrap(), "Gentoo");
        // threshold is inclusive on the left
        assert_eq!(model.predict(&row("Biscoe", 206.5)).unwrap(), "Adelie");
    }

    #[test]
    fn unknown_category_takes_right_branch() {
        let model = DecisionTree::new(classes(), flipper_tree()).unwrap();
        assert_eq!(model.predict(&row("Atlantis", 181.0)).unwrap(), "Adelie");
    }

    #[test]
    fn forest_averages_normalised_votes() {
        // Two small trees lean Adelie; one confident tree says Gentoo.
        let weak = tree(json!({"nodes": [{"leaf": [6.0, 0.0, 4.0]}]}));
        let strong = tree(json!({"nodes": [{"leaf": [0.0, 0.0, 100.0]}]}));
        let forest = RandomForest::new(classes(), vec![weak.clone(), weak, strong]).unwrap();

        // Adelie: (0.6 + 0.6 + 0) / 3 = 0.4, Gentoo: (0.4 + 0.4 + 1) / 3 = 0.6
        assert_eq!(forest.predict(&row("Torgersen", 181.0)).unwrap(), "Gentoo");
    }

    #[test]
    fn ties_resolve_to_first_class() {
        assert_eq!(argmax(&[0.5, 0.5, 0.0]), Some(0));
        assert_eq!(argmax(&[0.1, 0.7, 0.7]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn validation_rejects_backward_children() {
        let cyclic = tree(json!({
            "nodes": [
                {"split": "numeric", "feature": 1, "threshold": 40.0, "left": 0, "right": 1},
                {"leaf": [1.0, 0.0, 0.0]}
            ]
        }));
        let err = DecisionTree::new(classes(), cyclic).unwrap_err();
        assert!(err.contains("invalid child 0"), "{err}");
    }

    #[test]
    fn validation_rejects_kind_mismatch() {
        let mismatched = tree(json!({
            "nodes": [
                {"split": "numeric", "feature": 0, "threshold": 1.0, "left": 1, "right": 2},
                {"leaf": [1.0, 0.0, 0.0]},
                {"leaf": [0.0, 1.0, 0.0]}
            ]
        }));
        let err = DecisionTree::new(classes(), mismatched).unwrap_err();
        assert!(err.contains("categorical column 'island'"), "{err}");
    }

    #[test]
    fn validation_rejects_bad_leaves_and_empty_forests() {
        let short_leaf = tree(json!({"nodes": [{"leaf": [1.0, 0.0]}]}));
        assert!(DecisionTree::new(classes(), short_leaf).is_err());

        let zero_leaf = tree(json!({"nodes": [{"leaf": [0.0, 0.0, 0.0]}]}));
        assert!(DecisionTree::new(classes(), zero_leaf).is_err());

        assert!(RandomForest::new(classes(), Vec::new()).is_err());
        assert!(DecisionTree::new(Vec::new(), flipper_tree()).is_err());
    }
}
