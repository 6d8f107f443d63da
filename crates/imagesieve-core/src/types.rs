//! Shared types for classification results

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Two-class probability mapping keyed by class name.
///
/// Entry order follows the model's output tensor index order (index 0 first),
/// which is model-specific rather than a universal convention. The mapping
/// serializes to a JSON object with keys in that same order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProbabilities {
    entries: [(&'static str, f32); 2],
}

impl ClassProbabilities {
    /// Pair a model's class names with its output scores, index for index.
    pub fn from_scores(class_names: [&'static str; 2], scores: [f32; 2]) -> Self {
        Self {
            entries: [(class_names[0], scores[0]), (class_names[1], scores[1])],
        }
    }

    /// Look up the probability for a class name.
    pub fn probability(&self, class_name: &str) -> Option<f32> {
        self.entries
            .iter()
            .find(|(name, _)| *name == class_name)
            .map(|(_, p)| *p)
    }

    /// Class names in output index order.
    pub fn class_names(&self) -> [&'static str; 2] {
        [self.entries[0].0, self.entries[1].0]
    }

    /// Entries in output index order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        self.entries.iter().copied()
    }

    /// Sum of the two probabilities. ~1.0 for normalized output.
    pub fn total(&self) -> f32 {
        self.entries[0].1 + self.entries[1].1
    }
}

impl Serialize for ClassProbabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, probability) in &self.entries {
            map.serialize_entry(name, probability)?;
        }
        map.end()
    }
}
