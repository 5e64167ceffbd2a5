//! Expense record types: the closed category set, drafts, and committed expenses

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Expense categories. Every stored record carries exactly one of these.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    #[serde(rename = "food", alias = "飲食")]
    Food,
    #[serde(rename = "transport", alias = "交通")]
    Transport,
    #[serde(rename = "shopping", alias = "購物")]
    Shopping,
    #[serde(rename = "entertainment", alias = "娛樂")]
    Entertainment,
    #[serde(rename = "housing", alias = "居家")]
    Housing,
    #[serde(rename = "medical", alias = "醫療")]
    Medical,
    #[serde(rename = "education", alias = "教育")]
    Education,
    #[serde(rename = "other", alias = "其他")]
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Entertainment,
        Category::Housing,
        Category::Medical,
        Category::Education,
        Category::Other,
    ];

    /// Wire name, as serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Shopping => "shopping",
            Category::Entertainment => "entertainment",
            Category::Housing => "housing",
            Category::Medical => "medical",
            Category::Education => "education",
            Category::Other => "other",
        }
    }

    /// Traditional Chinese display label
    pub fn label(&self) -> &'static str {
        match self {
            Category::Food => "飲食",
            Category::Transport => "交通",
            Category::Shopping => "購物",
            Category::Entertainment => "娛樂",
            Category::Housing => "居家",
            Category::Medical => "醫療",
            Category::Education => "教育",
            Category::Other => "其他",
        }
    }

    /// Match either the wire name (any case) or the display label.
    pub fn from_label(s: &str) -> Option<Category> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s) || c.label() == s)
    }

    /// Like [`Category::from_label`], but anything unrecognized becomes `Other`.
    /// Used for values coming from model output, which is never trusted.
    pub fn from_label_lenient(s: &str) -> Category {
        Category::from_label(s).unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_label(s).ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Parse a raw amount string. Accepts surrounding whitespace; rejects
/// anything that is not a finite number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Amounts arrive as JSON strings from the extractor and as numbers or
/// strings from the e-invoice API. Keep the raw text either way.
pub fn amount_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// A not-yet-committed expense
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseDraft {
    /// Calendar date (YYYY-MM-DD)
    pub date: String,
    /// Raw amount text; parsed at commit
    #[serde(deserialize_with = "amount_text")]
    pub amount: String,
    pub category: Category,
    pub description: String,
    #[serde(default)]
    pub merchant: String,
}

impl ExpenseDraft {
    pub fn new(
        date: impl Into<String>,
        amount: impl Into<String>,
        category: Category,
        description: impl Into<String>,
        merchant: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            amount: amount.into(),
            category,
            description: description.into(),
            merchant: merchant.into(),
        }
    }

    /// The committed amount, if this draft passes validation.
    /// A draft is committable when the amount is a finite number and the
    /// description is non-blank.
    pub fn committable_amount(&self) -> Option<f64> {
        if self.description.trim().is_empty() {
            return None;
        }
        parse_amount(&self.amount)
    }

    pub fn is_committable(&self) -> bool {
        self.committable_amount().is_some()
    }
}

/// A committed expense
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: String,
    pub date: String,
    pub amount: f64,
    pub category: Category,
    pub description: String,
    #[serde(default)]
    pub merchant: String,
}

impl Expense {
    pub fn from_draft(id: impl Into<String>, draft: ExpenseDraft, amount: f64) -> Self {
        Self {
            id: id.into(),
            date: draft.date,
            amount,
            category: draft.category,
            description: draft.description,
            merchant: draft.merchant,
        }
    }
}
