//! # Config 模块
//!
//! 演出参数集中在这里：时序、缓动曲线、拖拽手感、布局。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高，仅 pack-cli）
//! 2. 配置文件（JSON）
//! 3. 默认值（最低）
//!
//! 所有字段都有默认值，配置文件只需写要覆盖的部分。

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::animation::EasingFunction;
use crate::error::{ConfigError, ConfigResult};

/// 开包配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackConfig {
    /// 特效随机种子
    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    pub frame: FrameConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub easing: EasingConfig,

    #[serde(default)]
    pub drag: DragConfig,

    #[serde(default)]
    pub layout: LayoutConfig,
}

/// 帧配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    /// 单帧 dt 上限（秒），卡顿后避免一步跨太远
    #[serde(default = "default_max_dt")]
    pub max_dt: f32,
}

/// 时序（秒）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    // ── 开场 ──
    pub anticipation: f32,
    pub glow: f32,
    pub tension: f32,
    pub top_separation: f32,
    pub emergence_lead: f32,
    pub card_stagger: f32,
    pub settle_buffer: f32,
    pub lightning_stagger: f32,
    pub tear_burst_delay: f32,
    pub top_fade_delay: f32,
    pub bottom_fade_delay: f32,
    /// 上下两半的淡出时长
    pub half_fade: f32,
    pub vibration_interval: f32,
    pub vibration_step: f32,
    pub vibration_max: f32,
    pub tension_vibration: f32,
    pub pack_tilt: f32,
    pub tear_line_fade: f32,
    pub tension_stretch: f32,
    pub rip_settle: f32,
    pub half_flight: f32,

    // ── 揭示 ──
    pub card_flip: f32,
    pub card_scale: f32,
    pub rarity_delay: f32,
    pub card_dismiss: f32,
    pub dismiss_scale: f32,
    pub sparkle_trail_delay: f32,
    pub dismiss_settle: f32,
    pub finale_delay: f32,
}

impl TimingConfig {
    fn entries(&self) -> [(&'static str, f32); 29] {
        [
            ("anticipation", self.anticipation),
            ("glow", self.glow),
            ("tension", self.tension),
            ("top_separation", self.top_separation),
            ("emergence_lead", self.emergence_lead),
            ("card_stagger", self.card_stagger),
            ("settle_buffer", self.settle_buffer),
            ("lightning_stagger", self.lightning_stagger),
            ("tear_burst_delay", self.tear_burst_delay),
            ("top_fade_delay", self.top_fade_delay),
            ("bottom_fade_delay", self.bottom_fade_delay),
            ("half_fade", self.half_fade),
            ("vibration_interval", self.vibration_interval),
            ("vibration_step", self.vibration_step),
            ("vibration_max", self.vibration_max),
            ("tension_vibration", self.tension_vibration),
            ("pack_tilt", self.pack_tilt),
            ("tear_line_fade", self.tear_line_fade),
            ("tension_stretch", self.tension_stretch),
            ("rip_settle", self.rip_settle),
            ("half_flight", self.half_flight),
            ("card_flip", self.card_flip),
            ("card_scale", self.card_scale),
            ("rarity_delay", self.rarity_delay),
            ("card_dismiss", self.card_dismiss),
            ("dismiss_scale", self.dismiss_scale),
            ("sparkle_trail_delay", self.sparkle_trail_delay),
            ("dismiss_settle", self.dismiss_settle),
            ("finale_delay", self.finale_delay),
        ]
    }

    /// 所有卡牌落入牌堆再加缓冲
    pub fn emergence_total(&self, cards: usize) -> f32 {
        cards as f32 * self.card_stagger + self.settle_buffer
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            anticipation: 0.6,
            glow: 0.4,
            tension: 0.4,
            top_separation: 0.3,
            emergence_lead: 0.3,
            card_stagger: 0.18,
            settle_buffer: 0.3,
            lightning_stagger: 0.1,
            tear_burst_delay: 0.1,
            top_fade_delay: 0.4,
            bottom_fade_delay: 0.2,
            half_fade: 0.55,
            vibration_interval: 0.016,
            vibration_step: 0.003,
            vibration_max: 0.08,
            tension_vibration: 0.12,
            pack_tilt: 0.5,
            tear_line_fade: 0.3,
            tension_stretch: 0.3,
            rip_settle: 0.2,
            half_flight: 0.8,
            card_flip: 0.5,
            card_scale: 0.4,
            rarity_delay: 0.35,
            card_dismiss: 0.35,
            dismiss_scale: 0.3,
            sparkle_trail_delay: 0.15,
            dismiss_settle: 0.4,
            finale_delay: 0.3,
        }
    }
}

/// 缓动曲线槽位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EasingConfig {
    /// 平滑减速
    pub smooth: EasingFunction,
    /// 两头慢
    pub in_out: EasingFunction,
    /// 末尾回弹
    pub out_back: EasingFunction,
    /// 起步回拉
    pub in_back: EasingFunction,
}

impl Default for EasingConfig {
    fn default() -> Self {
        Self {
            smooth: EasingFunction::EaseOutQuart,
            in_out: EasingFunction::EaseInOutQuad,
            out_back: EasingFunction::EaseOutBack,
            in_back: EasingFunction::EaseInBack,
        }
    }
}

/// 拖拽手感
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// 每像素旋转弧度
    pub sensitivity: f32,
    /// 松手后每帧速度保留比例
    pub inertia: f32,
    /// 每帧向中心回正比例
    pub return_speed: f32,
    pub card_return_speed: f32,
    pub pile_sensitivity_scale: f32,
    pub pile_inertia: f32,
    pub pile_return_speed: f32,
    /// 卡包/卡牌俯仰角上限
    pub max_pitch: f32,
    pub pile_max_pitch: f32,
    pub pile_max_yaw: f32,
    /// 对象旋转追随倾斜量的插值比例
    pub pack_follow: f32,
    pub card_follow: f32,
    pub pile_follow: f32,
    /// 判定为拖动的最小位移（像素）
    pub move_threshold: f32,
    /// 判定为横扫的最小水平位移（像素）
    pub swipe_threshold: f32,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.008,
            inertia: 0.95,
            return_speed: 0.02,
            card_return_speed: 0.1,
            pile_sensitivity_scale: 1.5,
            pile_inertia: 0.92,
            pile_return_speed: 0.08,
            max_pitch: 1.0,
            pile_max_pitch: 0.8,
            pile_max_yaw: 1.2,
            pack_follow: 0.3,
            card_follow: 0.15,
            pile_follow: 0.1,
            move_threshold: 5.0,
            swipe_threshold: 80.0,
        }
    }
}

/// 布局
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// 撕裂线高度（卡包局部坐标）
    pub tear_line_y: f32,
    pub zoom_distance: f32,
    pub zoom_speed: f32,
    pub reset_zoom_speed: f32,
    /// 翻开的卡牌停在镜头前的位置
    pub focus_position: Vec3,
    pub focus_scale: f32,
    pub pile_position: Vec3,
    /// 牌堆中每张牌的深度间隔
    pub card_spacing: f32,
    pub pile_card_scale: f32,
    /// 卡牌从撕口冒出时的缩放
    pub emerge_scale: f32,
    /// 已翻开的牌每帧上下漂浮的步长
    pub float_step: f32,
    pub float_frequency: f32,
    /// 相邻卡牌的漂浮相位差
    pub float_phase: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            tear_line_y: 0.68,
            zoom_distance: 6.5,
            zoom_speed: 3.0,
            reset_zoom_speed: 2.0,
            focus_position: Vec3::new(0.0, 0.0, 2.5),
            focus_scale: 0.7,
            pile_position: Vec3::new(0.0, 0.0, 1.5),
            card_spacing: 0.03,
            pile_card_scale: 0.7,
            emerge_scale: 0.85,
            float_step: 0.0002,
            float_frequency: 1.2,
            float_phase: 0.8,
        }
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

// 默认值函数
fn default_seed() -> u64 {
    0x5eed
}

fn default_max_dt() -> f32 {
    0.1
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            frame: FrameConfig::default(),
            timing: TimingConfig::default(),
            easing: EasingConfig::default(),
            drag: DragConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_dt: default_max_dt(),
        }
    }
}

impl PackConfig {
    /// 从 JSON 字符串解析并校验
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载并校验
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn to_json_pretty(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> ConfigResult<()> {
        if !is_positive(self.frame.max_dt) {
            return Err(ConfigError::invalid("frame.max_dt", "必须大于 0"));
        }

        for (field, value) in self.timing.entries() {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::invalid(
                    &format!("timing.{field}"),
                    format!("时长不能为负: {value}"),
                ));
            }
        }

        if !is_positive(self.timing.vibration_interval) {
            return Err(ConfigError::invalid(
                "timing.vibration_interval",
                "必须大于 0",
            ));
        }

        let drag = &self.drag;
        let factors = [
            ("drag.inertia", drag.inertia),
            ("drag.return_speed", drag.return_speed),
            ("drag.card_return_speed", drag.card_return_speed),
            ("drag.pile_inertia", drag.pile_inertia),
            ("drag.pile_return_speed", drag.pile_return_speed),
            ("drag.pack_follow", drag.pack_follow),
            ("drag.card_follow", drag.card_follow),
            ("drag.pile_follow", drag.pile_follow),
        ];
        for (field, value) in factors {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(
                    field,
                    format!("必须在 0.0 - 1.0 之间: {value}"),
                ));
            }
        }
        // 惯性为 1 且不回正时倾斜永远不会停下
        if drag.inertia >= 1.0 && drag.return_speed <= 0.0 {
            return Err(ConfigError::invalid(
                "drag.inertia",
                "惯性为 1 时 return_speed 必须大于 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PackConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.frame.max_dt, 0.1);
        assert_eq!(config.layout.tear_line_y, 0.68);
        assert!((config.timing.emergence_total(5) - 1.2).abs() < 1e-5);
    }

    #[test]
    fn test_partial_override() {
        let config = PackConfig::from_json_str(
            r#"{
                "seed": 7,
                "timing": { "card_flip": 0.8 },
                "easing": { "smooth": "ease_out_cubic" },
                "layout": { "pile_position": [0.0, 0.5, 1.0] }
            }"#,
        )
        .unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.timing.card_flip, 0.8);
        assert_eq!(config.timing.card_stagger, 0.18);
        assert_eq!(config.easing.smooth, EasingFunction::EaseOutCubic);
        assert_eq!(config.easing.in_back, EasingFunction::EaseInBack);
        assert_eq!(config.layout.pile_position, Vec3::new(0.0, 0.5, 1.0));
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = PackConfig::from_json_str("{}").unwrap();
        assert_eq!(config, PackConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = PackConfig::from_json_str(r#"{"timing": {"glow": -1.0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "timing.glow"));

        let err = PackConfig::from_json_str(r#"{"frame": {"max_dt": 0.0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = PackConfig::from_json_str(r#"{"drag": {"inertia": 1.5}}"#).unwrap_err();
        assert!(err.to_string().contains("drag.inertia"));

        let err = PackConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = PackConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(PackConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = PackConfig::load("does/not/exist.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
