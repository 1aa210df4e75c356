use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkinType {
    Dry,
    Oily,
    Combination,
    Sensitive,
    Normal,
}

impl SkinType {
    pub const ALL: [SkinType; 5] = [
        SkinType::Dry,
        SkinType::Oily,
        SkinType::Combination,
        SkinType::Sensitive,
        SkinType::Normal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SkinType::Dry => "Dry",
            SkinType::Oily => "Oily",
            SkinType::Combination => "Combination",
            SkinType::Sensitive => "Sensitive",
            SkinType::Normal => "Normal",
        }
    }
}

impl fmt::Display for SkinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Goal {
    Glow,
    #[value(alias = "acne")]
    AcneControl,
    #[value(alias = "anti-ageing")]
    AntiAging,
    Hydration,
    EvenTone,
}

impl Goal {
    pub const ALL: [Goal; 5] = [
        Goal::Glow,
        Goal::AcneControl,
        Goal::AntiAging,
        Goal::Hydration,
        Goal::EvenTone,
    ];

    /// Label as shown on the form ("Acne Control", "Anti-Aging", ...).
    pub fn label(self) -> &'static str {
        match self {
            Goal::Glow => "Glow",
            Goal::AcneControl => "Acne Control",
            Goal::AntiAging => "Anti-Aging",
            Goal::Hydration => "Hydration",
            Goal::EvenTone => "Even Tone",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One form submission. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinProfile {
    pub skin_type: SkinType,
    pub goal: Goal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
}

impl SkinProfile {
    pub fn new(skin_type: SkinType, goal: Goal, ingredients: Option<String>) -> Self {
        let ingredients = ingredients
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self { skin_type, goal, ingredients }
    }

    pub fn ingredients_or_none(&self) -> &str {
        self.ingredients.as_deref().unwrap_or("none")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineResult {
    pub text: String,
}

impl RoutineResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ingredients_are_absent() {
        let p = SkinProfile::new(SkinType::Oily, Goal::Glow, Some("   ".into()));
        assert_eq!(p.ingredients, None);
        assert_eq!(p.ingredients_or_none(), "none");
    }

    #[test]
    fn labels_match_form() {
        assert_eq!(Goal::AcneControl.to_string(), "Acne Control");
        assert_eq!(Goal::EvenTone.to_string(), "Even Tone");
        assert_eq!(SkinType::Combination.to_string(), "Combination");
    }

    #[test]
    fn goals_parse_from_cli_values() {
        assert_eq!(Goal::from_str("anti-aging", true).unwrap(), Goal::AntiAging);
        assert_eq!(Goal::from_str("acne", true).unwrap(), Goal::AcneControl);
    }
}
