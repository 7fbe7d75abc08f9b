//! # Input 模块
//!
//! 宿主传入的离散意图，以及意图的处理结果。
//!
//! 拾取、手势识别等都在宿主侧完成，核心只接收已经解析好的意图。

use serde::{Deserialize, Serialize};

/// 用户意图
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    /// 开包
    Open,
    /// 翻开下一张（已有翻开的牌时等同于收走）
    Reveal,
    /// 收走当前翻开的牌
    Dismiss,
    DragStart,
    /// 指针位移（像素）
    DragMove { dx: f32, dy: f32 },
    DragEnd,
}

/// 意图被忽略的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IgnoreReason {
    /// 当前阶段不接受该意图
    WrongPhase,
    /// 正在播放动画
    Busy,
    /// 没有翻开的牌
    NothingFocused,
}

/// 意图处理结果
///
/// 无效意图是正常的竞态（快速连点），调用方可以直接丢弃结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IntentOutcome {
    Accepted,
    /// 翻开请求被转成了收走
    Redirected,
    Ignored(IgnoreReason),
}

impl IntentOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted | Self::Redirected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_json_shape() {
        let intent: Intent = serde_json::from_str(r#"{"type":"drag_move","dx":3.0,"dy":-1.5}"#).unwrap();
        assert_eq!(intent, Intent::DragMove { dx: 3.0, dy: -1.5 });

        let open: Intent = serde_json::from_str(r#"{"type":"open"}"#).unwrap();
        assert_eq!(open, Intent::Open);
    }

    #[test]
    fn test_outcome_acceptance() {
        assert!(IntentOutcome::Redirected.is_accepted());
        assert!(!IntentOutcome::Ignored(IgnoreReason::Busy).is_accepted());
    }
}
