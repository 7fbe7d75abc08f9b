//! # Card 模块
//!
//! 卡牌数据与稀有度。

use serde::{Deserialize, Serialize};

/// 每包卡牌数量
pub const CARD_COUNT: usize = 5;

/// 稀有度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

/// 牌面数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub hp: u32,
    /// 属性类型（牌面左上角的标签）
    #[serde(default)]
    pub kind: String,
}

impl CardData {
    pub fn new(id: impl Into<String>, name: impl Into<String>, rarity: Rarity) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            subtitle: String::new(),
            rarity,
            hp: 0,
            kind: String::new(),
        }
    }

    fn full(id: &str, name: &str, subtitle: &str, rarity: Rarity, hp: u32, kind: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            subtitle: subtitle.to_string(),
            rarity,
            hp,
            kind: kind.to_string(),
        }
    }
}

/// 默认卡组
pub fn default_deck() -> [CardData; CARD_COUNT] {
    [
        CardData::full("bigflo", "BIGFLO", "Le Lyriciste", Rarity::Legendary, 200, "OR"),
        CardData::full("jul", "JUL", "Le Prolifique", Rarity::Epic, 180, "OVNI"),
        CardData::full("nekfeu", "NEKFEU", "Le Poète", Rarity::Rare, 160, "PLUME"),
        CardData::full("booba", "BOOBA", "Le Duc", Rarity::Legendary, 220, "PIRATE"),
        CardData::full("pnl", "PNL", "Les Aliens", Rarity::Mythic, 250, "QLF"),
    ]
}
