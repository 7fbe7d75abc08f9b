//! # Easing 模块
//!
//! 缓动函数库，用于补间动画的时间插值。
//!
//! 输入进度会被限制到 `[0, 1]`，输出不做限制：回弹类曲线（`EaseOutBack` /
//! `EaseInBack`）会越过端点，这是曲线本身的形状。所有曲线都满足
//! `apply(0) == 0` 且 `apply(1) == 1`。

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// `EaseOutBack` 的回弹系数
const OUT_BACK_OVERSHOOT: f32 = 1.4;
/// `EaseInBack` 的回弹系数
const IN_BACK_OVERSHOOT: f32 = 1.70158;

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// 线性（匀速）
    Linear,
    /// 二次缓入
    EaseInQuad,
    /// 二次缓出
    EaseOutQuad,
    /// 二次缓入缓出
    EaseInOutQuad,
    /// 三次缓入
    EaseInCubic,
    /// 三次缓出
    EaseOutCubic,
    /// 三次缓入缓出
    #[default]
    EaseInOutCubic,
    /// 四次缓出（开场动画里的 "smooth"）
    EaseOutQuart,
    /// 正弦缓入缓出
    EaseInOutSine,
    /// 回弹缓出：末尾越过目标再回落
    EaseOutBack,
    /// 回弹缓入：起步先反向后退
    EaseInBack,
    /// 弹跳缓出
    EaseOutBounce,
}

impl EasingFunction {
    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度，超出 `[0, 1]` 的部分会被截断
    ///
    /// # 返回
    /// - 缓动后的进度值，回弹曲线可能小于 0 或大于 1
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseInQuad => t * t,
            EasingFunction::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            EasingFunction::EaseInCubic => t * t * t,
            EasingFunction::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            EasingFunction::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            EasingFunction::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            EasingFunction::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            EasingFunction::EaseOutBack => ease_out_back(t),
            EasingFunction::EaseInBack => ease_in_back(t),
            EasingFunction::EaseOutBounce => ease_out_bounce(t),
        }
    }
}

fn ease_out_back(t: f32) -> f32 {
    let c1 = OUT_BACK_OVERSHOOT;
    let c3 = c1 + 1.0;
    let u = t - 1.0;
    1.0 + c3 * u.powi(3) + c1 * u.powi(2)
}

fn ease_in_back(t: f32) -> f32 {
    let c1 = IN_BACK_OVERSHOOT;
    let c3 = c1 + 1.0;
    c3 * t * t * t - c1 * t * t
}

/// 弹跳缓出
fn ease_out_bounce(t: f32) -> f32 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [EasingFunction; 12] = [
        EasingFunction::Linear,
        EasingFunction::EaseInQuad,
        EasingFunction::EaseOutQuad,
        EasingFunction::EaseInOutQuad,
        EasingFunction::EaseInCubic,
        EasingFunction::EaseOutCubic,
        EasingFunction::EaseInOutCubic,
        EasingFunction::EaseOutQuart,
        EasingFunction::EaseInOutSine,
        EasingFunction::EaseOutBack,
        EasingFunction::EaseInBack,
        EasingFunction::EaseOutBounce,
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-5, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-5, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_clamp_input() {
        let easing = EasingFunction::Linear;
        assert_eq!(easing.apply(-0.5), 0.0);
        assert_eq!(easing.apply(1.5), 1.0);
    }

    #[test]
    fn test_out_back_overshoots() {
        let easing = EasingFunction::EaseOutBack;
        let peak = (1..100)
            .map(|i| easing.apply(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_in_back_dips_below_zero() {
        let easing = EasingFunction::EaseInBack;
        assert!(easing.apply(0.2) < 0.0);
    }

    #[test]
    fn test_out_quart_front_loaded() {
        // 前半段就走完了大部分
        assert!(EasingFunction::EaseOutQuart.apply(0.5) > 0.9);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&EasingFunction::EaseOutBack).unwrap();
        assert_eq!(json, "\"ease_out_back\"");
        let parsed: EasingFunction = serde_json::from_str("\"ease_in_out_quad\"").unwrap();
        assert_eq!(parsed, EasingFunction::EaseInOutQuad);
    }
}
