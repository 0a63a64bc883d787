//! Keyword-based feature type and priority classification

use std::sync::Arc;

use casegen_domain::Priority;

use crate::taxonomy::{FeatureCategory, Taxonomy};

/// Maps text to feature categories and a priority
///
/// Matching is plain substring membership with no normalisation or word
/// segmentation.
#[derive(Debug, Clone)]
pub struct FeatureClassifier {
    taxonomy: Arc<Taxonomy>,
}

impl FeatureClassifier {
    /// Create a classifier over a taxonomy
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self { taxonomy }
    }

    /// Categories with at least one keyword in `text`, in taxonomy order
    pub fn detect<'a>(&'a self, text: &str) -> Vec<&'a FeatureCategory> {
        self.taxonomy
            .categories
            .iter()
            .filter(|category| category.matches(text))
            .collect()
    }

    /// First priority level with a keyword in `text`, checked high → medium → low
    pub fn priority(&self, text: &str) -> Priority {
        let priorities = &self.taxonomy.priorities;
        let levels = [
            (Priority::High, &priorities.high),
            (Priority::Medium, &priorities.medium),
            (Priority::Low, &priorities.low),
        ];
        levels
            .into_iter()
            .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k.as_str())))
            .map(|(priority, _)| priority)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> FeatureClassifier {
        FeatureClassifier::new(Arc::new(Taxonomy::default()))
    }

    fn names(categories: &[&FeatureCategory]) -> Vec<String> {
        categories.iter().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn test_detect_memory() {
        let classifier = classifier();
        let detected = classifier.detect("支持记忆和存储");
        assert_eq!(names(&detected), vec!["记忆功能"]);
    }

    #[test]
    fn test_detect_multiple_in_taxonomy_order() {
        let classifier = classifier();
        let detected = classifier.detect("座椅通风与加热，靠背可调");
        assert_eq!(names(&detected), vec!["电动调节", "加热功能", "通风功能"]);
    }

    #[test]
    fn test_detect_nothing() {
        let classifier = classifier();
        assert!(classifier.detect("外观颜色为黑色").is_empty());
        assert!(classifier.detect("").is_empty());
    }

    #[test]
    fn test_priority_high() {
        let classifier = classifier();
        assert_eq!(classifier.priority("这是重要需求"), Priority::High);
        assert_eq!(classifier.priority("核心功能"), Priority::High);
        assert_eq!(classifier.priority("必须支持"), Priority::High);
    }

    #[test]
    fn test_priority_high_beats_low() {
        let classifier = classifier();
        assert_eq!(classifier.priority("可选项，但关键"), Priority::High);
    }

    #[test]
    fn test_priority_low_and_default() {
        let classifier = classifier();
        assert_eq!(classifier.priority("次要功能"), Priority::Low);
        assert_eq!(classifier.priority("普通功能"), Priority::Medium);
        assert_eq!(classifier.priority("座椅加热"), Priority::Medium);
    }

    #[test]
    fn test_substituted_taxonomy() {
        let taxonomy = Taxonomy {
            categories: vec![FeatureCategory::new("灯光功能", &["灯"])],
            ..Taxonomy::default()
        };
        let classifier = FeatureClassifier::new(Arc::new(taxonomy));
        assert_eq!(names(&classifier.detect("氛围灯")), vec!["灯光功能"]);
        assert!(classifier.detect("座椅加热").is_empty());
    }
}
