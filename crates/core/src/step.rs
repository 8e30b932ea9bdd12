//! Step model - the ordered stages of a hand-washing procedure.

use serde::{Deserialize, Serialize};
use crate::error::{CoreError, Result};
use crate::id::StepIndex;

/// One stage of the washing procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Display name
    pub name: String,

    /// Short technique hint shown alongside the name
    #[serde(default)]
    pub technique: String,
}

impl Step {
    /// Create a new step.
    pub fn new(name: impl Into<String>, technique: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            technique: technique.into(),
        }
    }
}

/// Fixed, ordered list of steps for a tracking session.
///
/// A catalog always holds at least one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Step>", into = "Vec<Step>")]
pub struct StepCatalog {
    steps: Vec<Step>,
}

impl StepCatalog {
    /// Build a catalog from an ordered list of steps.
    pub fn new(steps: Vec<Step>) -> Result<Self> {
        if steps.is_empty() {
            return Err(CoreError::EmptyCatalog);
        }
        Ok(Self { steps })
    }

    /// The six WHO stages used by the detector.
    pub fn who_default() -> Self {
        Self {
            steps: vec![
                Step::new("Palma con palma", "Frote las palmas de las manos entre sí."),
                Step::new("Palma sobre dorso", "Palma sobre dorso con dedos entrelazados."),
                Step::new("Entre los dedos", "Entrelazar dedos y frotar palmas."),
                Step::new(
                    "El Cepillado",
                    "Frotar el dorso de los dedos de una mano con la palma de la mano opuesta.",
                ),
                Step::new("Pulgares", "Frote cada pulgar con un movimiento de rotación."),
                Step::new(
                    "Uñas y yemas",
                    "Frotar yemas y uñas contra palma con movimientos circulares.",
                ),
            ],
        }
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the catalog has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Get a step by index.
    pub fn get(&self, index: StepIndex) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Name of the step at `index`, if any.
    pub fn name(&self, index: StepIndex) -> Option<&str> {
        self.steps.get(index).map(|s| s.name.as_str())
    }

    /// Index of the final step.
    pub fn last_index(&self) -> StepIndex {
        self.steps.len() - 1
    }

    /// Whether `index` names a step in this catalog.
    pub fn contains(&self, index: StepIndex) -> bool {
        index < self.steps.len()
    }

    /// Iterate over steps in order.
    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }
}

impl Default for StepCatalog {
    fn default() -> Self {
        Self::who_default()
    }
}

impl TryFrom<Vec<Step>> for StepCatalog {
    type Error = CoreError;

    fn try_from(steps: Vec<Step>) -> Result<Self> {
        Self::new(steps)
    }
}

impl From<StepCatalog> for Vec<Step> {
    fn from(catalog: StepCatalog) -> Self {
        catalog.steps
    }
}
