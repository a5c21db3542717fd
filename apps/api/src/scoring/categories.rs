//! Category enumeration — the two fixed, ordered rating dimensions lists.
//!
//! The order of these slices is the persisted-row column contract: the
//! spreadsheet columns downstream reporting reads are positional, so adding,
//! removing, or reordering a category is a breaking schema change.

use serde::{Deserialize, Serialize};

/// Whether a category's points add to or subtract from its stream subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    Normal,
    Inverted,
}

/// One rating dimension.
pub struct Category {
    /// Canonical label, used in prompts, payload validation, and breakdowns.
    pub name: &'static str,
    /// Short labels the free-text parser also accepts ("Industry" for
    /// "Industry Experience"). The canonical name always matches too.
    pub aliases: &'static [&'static str],
    pub polarity: Polarity,
}

impl Category {
    /// All labels this category answers to, canonical name first.
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }
}

/// Categories scored by the automated rater, in persisted column order.
pub const MODEL_CATEGORIES: &[Category] = &[
    Category {
        name: "Education",
        aliases: &[],
        polarity: Polarity::Normal,
    },
    Category {
        name: "Industry Experience",
        aliases: &["Industry"],
        polarity: Polarity::Normal,
    },
    Category {
        name: "Range of Experience",
        aliases: &["Range"],
        polarity: Polarity::Normal,
    },
    Category {
        name: "Benchmark of Career Exposure",
        aliases: &["Benchmark"],
        polarity: Polarity::Normal,
    },
    Category {
        name: "Average Length of Stay at Firms",
        aliases: &["Length", "Average Length of Stay"],
        polarity: Polarity::Normal,
    },
    Category {
        name: "Within Firm Alignment",
        aliases: &["Within", "Within Firm"],
        polarity: Polarity::Normal,
    },
];

/// Categories selected by the human reviewer, in persisted column order.
pub const CONSULTANT_CATEGORIES: &[Category] = &[
    Category {
        name: "Extracurricular Activities",
        aliases: &[],
        polarity: Polarity::Normal,
    },
    Category {
        name: "Challenges in Starting Base",
        aliases: &[],
        polarity: Polarity::Normal,
    },
    Category {
        name: "Industry Experience",
        aliases: &[],
        polarity: Polarity::Normal,
    },
    Category {
        name: "Level of Experience",
        aliases: &[],
        polarity: Polarity::Normal,
    },
    Category {
        name: "Geographic Experience",
        aliases: &[],
        polarity: Polarity::Normal,
    },
    Category {
        name: "Speed of Career Progression",
        aliases: &[],
        polarity: Polarity::Normal,
    },
    Category {
        name: "Internal Career Progression",
        aliases: &[],
        polarity: Polarity::Normal,
    },
    Category {
        name: "Recent Career Progression",
        aliases: &[],
        polarity: Polarity::Normal,
    },
    Category {
        name: "Career Moves Facilitated by Prior Colleagues",
        aliases: &[],
        polarity: Polarity::Normal,
    },
    Category {
        name: "Regretted Career Choices",
        aliases: &[],
        polarity: Polarity::Inverted,
    },
    Category {
        name: "Regretted Personal Choices",
        aliases: &[],
        polarity: Polarity::Inverted,
    },
];

/// Finds an automated-rater category by canonical name, case-insensitively.
pub fn model_category(name: &str) -> Option<&'static Category> {
    MODEL_CATEGORIES
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
}

/// Finds a consultant category by canonical name, case-insensitively.
pub fn consultant_category(name: &str) -> Option<&'static Category> {
    CONSULTANT_CATEGORIES
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_contract_counts() {
        assert_eq!(MODEL_CATEGORIES.len(), 6);
        assert_eq!(CONSULTANT_CATEGORIES.len(), 11);
    }

    #[test]
    fn test_only_regretted_categories_are_inverted() {
        let inverted: Vec<&str> = CONSULTANT_CATEGORIES
            .iter()
            .filter(|c| c.polarity == Polarity::Inverted)
            .map(|c| c.name)
            .collect();
        assert_eq!(
            inverted,
            vec!["Regretted Career Choices", "Regretted Personal Choices"]
        );
        assert!(MODEL_CATEGORIES
            .iter()
            .all(|c| c.polarity == Polarity::Normal));
    }

    #[test]
    fn test_model_column_order_is_fixed() {
        let names: Vec<&str> = MODEL_CATEGORIES.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec![
                "Education",
                "Industry Experience",
                "Range of Experience",
                "Benchmark of Career Exposure",
                "Average Length of Stay at Firms",
                "Within Firm Alignment",
            ]
        );
    }

    #[test]
    fn test_consultant_column_order_ends_with_inverted_pair() {
        let names: Vec<&str> = CONSULTANT_CATEGORIES.iter().map(|c| c.name).collect();
        assert_eq!(names[0], "Extracurricular Activities");
        assert_eq!(names[9], "Regretted Career Choices");
        assert_eq!(names[10], "Regretted Personal Choices");
    }

    #[test]
    fn test_lookup_by_name_is_case_insensitive() {
        assert!(model_category("education").is_some());
        assert!(model_category(" WITHIN FIRM ALIGNMENT ").is_some());
        assert!(consultant_category("regretted career choices").is_some());
        assert!(consultant_category("Unknown Category").is_none());
    }

    #[test]
    fn test_labels_start_with_canonical_name() {
        let cat = model_category("Industry Experience").unwrap();
        let labels: Vec<&str> = cat.labels().collect();
        assert_eq!(labels[0], "Industry Experience");
        assert!(labels.contains(&"Industry"));
    }
}
