//! Keyword taxonomy driving feature and priority detection
//!
//! The taxonomy is plain data. A built-in seat-control vocabulary ships as
//! the [`Default`], and a deployment can replace any part of it through
//! configuration. Components receive it as an `Arc<Taxonomy>` instead of
//! reading a global, so tests can swap in their own vocabulary.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Version of the built-in vocabulary
pub const BUILTIN_TAXONOMY_VERSION: &str = "1";

/// A feature category and the keywords that trigger it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureCategory {
    /// Category name, also used as the feature type
    pub name: String,
    /// Trigger keywords, matched as case-sensitive substrings
    pub keywords: Vec<String>,
}

impl FeatureCategory {
    /// Create a category from string slices
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: to_strings(keywords),
        }
    }

    /// Whether any keyword occurs in `text`
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

/// Priority trigger keywords, checked high → medium → low
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityKeywords {
    /// Keywords marking high priority
    pub high: Vec<String>,
    /// Keywords marking medium priority
    pub medium: Vec<String>,
    /// Keywords marking low priority
    pub low: Vec<String>,
}

impl Default for PriorityKeywords {
    fn default() -> Self {
        Self {
            high: to_strings(&["重要", "关键", "核心", "必须", "紧急"]),
            medium: to_strings(&["一般", "普通", "常规", "标准"]),
            low: to_strings(&["次要", "可选", "建议", "补充"]),
        }
    }
}

/// Complete keyword vocabulary for requirement parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Taxonomy {
    /// Vocabulary version
    pub version: String,
    /// Feature categories in detection order
    pub categories: Vec<FeatureCategory>,
    /// Priority keywords
    pub priorities: PriorityKeywords,
    /// Units recognised after a number
    pub units: Vec<String>,
    /// Units that turn a number into a time limit
    pub time_units: Vec<String>,
    /// Words that mark a safety prohibition
    pub safety_words: Vec<String>,
    /// Words that mark concurrent operation
    pub concurrency_words: Vec<String>,
    /// Words that introduce a dependency
    pub dependency_cues: Vec<String>,
    /// Suffixes that close a dependency name (功能, 系统 ...)
    pub dependency_suffixes: Vec<String>,
    /// Verbs that close an action phrase used as a feature name
    pub action_suffixes: Vec<String>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            version: BUILTIN_TAXONOMY_VERSION.to_string(),
            categories: vec![
                FeatureCategory::new("电动调节", &["电动", "调节", "靠背", "角度", "高度"]),
                FeatureCategory::new("记忆功能", &["记忆", "存储", "位置", "用户", "设置", "自动"]),
                FeatureCategory::new("加热功能", &["加热", "温度", "控制", "调温", "保温"]),
                FeatureCategory::new("通风功能", &["通风", "风扇", "换气", "散热", "吹风"]),
                FeatureCategory::new("按摩功能", &["按摩", "震动", "模式", "强度", "节奏"]),
                FeatureCategory::new("安全功能", &["安全", "保护", "防夹", "过载", "故障", "检测"]),
            ],
            priorities: PriorityKeywords::default(),
            units: to_strings(&["°", "%", "秒", "分钟", "小时", "毫米", "厘米"]),
            time_units: to_strings(&["秒", "分钟", "小时"]),
            safety_words: to_strings(&["不能", "禁止", "不允许", "不得"]),
            concurrency_words: to_strings(&["同时", "并发", "冲突"]),
            dependency_cues: to_strings(&["依赖", "需要", "要求", "基于", "前提"]),
            dependency_suffixes: to_strings(&["功能", "系统", "模块"]),
            action_suffixes: to_strings(&["调节", "控制", "设置", "操作"]),
        }
    }
}

impl Taxonomy {
    /// Look up a category by name
    pub fn category(&self, name: &str) -> Option<&FeatureCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Check the vocabulary for empty or duplicated entries
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.categories.is_empty() {
            return Err(ParseError::InvalidTaxonomy(
                "at least one feature category is required".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(ParseError::InvalidTaxonomy(
                    "feature category name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(category.name.as_str()) {
                return Err(ParseError::InvalidTaxonomy(format!(
                    "duplicate feature category: {}",
                    category.name
                )));
            }
            if category.keywords.is_empty() {
                return Err(ParseError::InvalidTaxonomy(format!(
                    "feature category {} has no keywords",
                    category.name
                )));
            }
        }

        let word_lists = [
            ("category keyword", self.categories.iter().flat_map(|c| &c.keywords).collect::<Vec<_>>()),
            ("priority keyword", self.priority_words()),
            ("unit", self.units.iter().collect()),
            ("time unit", self.time_units.iter().collect()),
            ("safety word", self.safety_words.iter().collect()),
            ("concurrency word", self.concurrency_words.iter().collect()),
            ("dependency cue", self.dependency_cues.iter().collect()),
            ("dependency suffix", self.dependency_suffixes.iter().collect()),
            ("action suffix", self.action_suffixes.iter().collect()),
        ];
        for (kind, words) in word_lists {
            if words.iter().any(|w| w.is_empty()) {
                return Err(ParseError::InvalidTaxonomy(format!("empty {}", kind)));
            }
        }

        Ok(())
    }

    fn priority_words(&self) -> Vec<&String> {
        self.priorities
            .high
            .iter()
            .chain(&self.priorities.medium)
            .chain(&self.priorities.low)
            .collect()
    }
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}
