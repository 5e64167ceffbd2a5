//! Deterministic category rules mapping a merchant name + item description
//! to one of the eight expense categories.
//!
//! Rules are checked in a fixed order and the first hit wins. Keywords are
//! matched as case-insensitive substrings, not whole words.

use crate::expense::Category;

/// One classification rule
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub category: Category,
    /// Substrings matched against the lower-cased merchant
    pub merchant: &'static [&'static str],
    /// Substrings matched against the lower-cased description
    pub description: &'static [&'static str],
}

impl Rule {
    fn matches(&self, merchant: &str, description: &str) -> bool {
        self.merchant.iter().any(|k| merchant.contains(k))
            || self.description.iter().any(|k| description.contains(k))
    }
}

/// Rules in priority order. Keywords must be lower-case.
pub const RULES: &[Rule] = &[
    // Convenience stores, coffee chains, food vendors
    Rule {
        category: Category::Food,
        merchant: &["7-eleven", "全家", "萊爾富", "ok mart", "星巴克", "路易莎", "餐飲", "食品"],
        description: &["茶", "咖啡", "便當"],
    },
    // Fuel, rail, metro, coaches, ride hailing
    Rule {
        category: Category::Transport,
        merchant: &["中油", "台亞", "全國加油站", "台鐵", "高鐵", "捷運", "客運", "uber", "車隊"],
        description: &[],
    },
    // Hypermarkets and drugstores count as daily goods
    Rule {
        category: Category::Housing,
        merchant: &["全聯", "家樂福", "大潤發", "好市多", "屈臣氏", "康是美", "寶雅"],
        description: &[],
    },
    Rule {
        category: Category::Shopping,
        merchant: &["新光三越", "sogo", "百貨", "uniqlo", "zara", "服飾"],
        description: &[],
    },
    Rule {
        category: Category::Entertainment,
        merchant: &["電影", "好樂迪", "錢櫃", "netflix", "spotify", "steam"],
        description: &[],
    },
    Rule {
        category: Category::Medical,
        merchant: &["診所", "醫院", "藥局"],
        description: &[],
    },
];

/// Result of scored classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    /// How many rules matched. The winner is still the first by priority.
    pub matched_rules: usize,
}

impl Classification {
    pub fn is_ambiguous(&self) -> bool {
        self.matched_rules > 1
    }
}

/// Classify a merchant/description pair. Falls back to `Other`.
pub fn classify(merchant: &str, description: &str) -> Category {
    let m = merchant.to_lowercase();
    let d = description.to_lowercase();

    RULES
        .iter()
        .find(|r| r.matches(&m, &d))
        .map(|r| r.category)
        .unwrap_or(Category::Other)
}

/// Same answer as [`classify`], plus the number of rules that fired.
pub fn classify_scored(merchant: &str, description: &str) -> Classification {
    let m = merchant.to_lowercase();
    let d = description.to_lowercase();

    let mut hits = RULES.iter().filter(|r| r.matches(&m, &d));
    match hits.next() {
        Some(first) => Classification {
            category: first.category,
            matched_rules: 1 + hits.count(),
        },
        None => Classification {
            category: Category::Other,
            matched_rules: 0,
        },
    }
}
