//! PizzaDraft - フォームが集めるピザ作成ペイロード
//!
//! キュー自体はスキーマを持たない。これは QueuedRecord を組み立てるための型付きヘルパー。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Pizza sizes the server accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PizzaSize {
    Personal,
    Small,
    Medium,
    #[default]
    Large,
    #[serde(rename = "Extra Large")]
    ExtraLarge,
}

impl PizzaSize {
    pub fn as_str(self) -> &'static str {
        match self {
            PizzaSize::Personal => "Personal",
            PizzaSize::Small => "Small",
            PizzaSize::Medium => "Medium",
            PizzaSize::Large => "Large",
            PizzaSize::ExtraLarge => "Extra Large",
        }
    }
}

impl fmt::Display for PizzaSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pizza size: {0}")]
pub struct UnknownSize(pub String);

impl FromStr for PizzaSize {
    type Err = UnknownSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], " ").as_str() {
            "personal" => Ok(PizzaSize::Personal),
            "small" => Ok(PizzaSize::Small),
            "medium" => Ok(PizzaSize::Medium),
            "large" => Ok(PizzaSize::Large),
            "extra large" | "xl" => Ok(PizzaSize::ExtraLarge),
            _ => Err(UnknownSize(s.to_string())),
        }
    }
}

/// PizzaDraft はピザ作成フォームの入力
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PizzaDraft {
    pub pizza_name: String,
    pub created_by: String,
    #[serde(default)]
    pub size: PizzaSize,
    #[serde(default)]
    pub toppings: Vec<String>,
}

impl PizzaDraft {
    pub fn new(pizza_name: impl Into<String>, created_by: impl Into<String>) -> Self {
        Self {
            pizza_name: pizza_name.into(),
            created_by: created_by.into(),
            size: PizzaSize::default(),
            toppings: Vec::new(),
        }
    }

    pub fn with_size(mut self, size: PizzaSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_topping(mut self, topping: impl Into<String>) -> Self {
        self.toppings.push(topping.into());
        self
    }
}
