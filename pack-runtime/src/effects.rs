//! # Effects 模块
//!
//! 镜头与后处理协作者接口。
//!
//! 核心只发出"触发"命令，效果如何衰减由实现方决定（见 `camera` 模块）。
//! 后处理是可选的：没有后处理时相关调用全部变成空操作，演出照常完成。

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

/// 0xRRGGBB
pub type Color = u32;

/// 霓虹配色
pub mod palette {
    use super::Color;

    pub const PINK: Color = 0xff66aa;
    pub const CYAN: Color = 0x66ddff;
    pub const ORANGE: Color = 0xffaa44;
    pub const PURPLE: Color = 0xaa66ff;
    pub const WHITE: Color = 0xffffff;
    pub const GOLD: Color = 0xffd700;
}

/// 镜头效果
pub trait CameraEffects {
    /// 震屏
    fn trigger_shake(&mut self, intensity: f32, duration: f32);
    /// 推近/拉远到目标距离
    fn trigger_zoom(&mut self, target_distance: f32, speed: f32);
    /// 回到初始距离
    fn reset_zoom(&mut self, speed: f32);
    /// 全屏闪光，`decay` 为每秒衰减量
    fn trigger_flash(&mut self, color: Color, intensity: f32, decay: f32);
}

/// 后处理脉冲
pub trait PostProcessing {
    fn pulse_bloom(&mut self, intensity: f32, duration: f32);
    fn pulse_chromatic_aberration(&mut self, intensity: f32, duration: f32);
    fn pulse_vignette(&mut self, darkness: f32, duration: f32);
}

/// 什么都不做的镜头
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCamera;

impl CameraEffects for NullCamera {
    fn trigger_shake(&mut self, _intensity: f32, _duration: f32) {}
    fn trigger_zoom(&mut self, _target_distance: f32, _speed: f32) {}
    fn reset_zoom(&mut self, _speed: f32) {}
    fn trigger_flash(&mut self, _color: Color, _intensity: f32, _decay: f32) {}
}

/// 效果门面
///
/// 持有镜头与可选的后处理，后处理缺失时跳过调用。
pub struct Effects {
    camera: Box<dyn CameraEffects>,
    post: Option<Box<dyn PostProcessing>>,
}

impl std::fmt::Debug for Effects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effects")
            .field("post", &self.post.is_some())
            .finish()
    }
}

impl Default for Effects {
    fn default() -> Self {
        Self::headless()
    }
}

impl Effects {
    pub fn new(camera: Box<dyn CameraEffects>, post: Option<Box<dyn PostProcessing>>) -> Self {
        Self { camera, post }
    }

    /// 无镜头、无后处理
    pub fn headless() -> Self {
        Self::new(Box::new(NullCamera), None)
    }

    /// 同一个记录器同时充当镜头与后处理
    pub fn recording(recorder: &EffectRecorder) -> Self {
        Self::new(Box::new(recorder.clone()), Some(Box::new(recorder.clone())))
    }

    pub fn has_post_processing(&self) -> bool {
        self.post.is_some()
    }

    pub fn shake(&mut self, intensity: f32, duration: f32) {
        self.camera.trigger_shake(intensity, duration);
    }

    pub fn zoom(&mut self, target_distance: f32, speed: f32) {
        self.camera.trigger_zoom(target_distance, speed);
    }

    pub fn reset_zoom(&mut self, speed: f32) {
        self.camera.reset_zoom(speed);
    }

    pub fn flash(&mut self, color: Color, intensity: f32, decay: f32) {
        self.camera.trigger_flash(color, intensity, decay);
    }

    pub fn bloom(&mut self, intensity: f32, duration: f32) {
        if let Some(post) = self.post.as_mut() {
            post.pulse_bloom(intensity, duration);
        }
    }

    pub fn chromatic_aberration(&mut self, intensity: f32, duration: f32) {
        if let Some(post) = self.post.as_mut() {
            post.pulse_chromatic_aberration(intensity, duration);
        }
    }

    pub fn vignette(&mut self, darkness: f32, duration: f32) {
        if let Some(post) = self.post.as_mut() {
            post.pulse_vignette(darkness, duration);
        }
    }
}

/// 一次效果调用
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectCall {
    Shake { intensity: f32, duration: f32 },
    Zoom { distance: f32, speed: f32 },
    ResetZoom { speed: f32 },
    Flash { color: Color, intensity: f32, decay: f32 },
    Bloom { intensity: f32, duration: f32 },
    ChromaticAberration { intensity: f32, duration: f32 },
    Vignette { darkness: f32, duration: f32 },
}

impl EffectCall {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Shake { .. } => "shake",
            Self::Zoom { .. } => "zoom",
            Self::ResetZoom { .. } => "reset_zoom",
            Self::Flash { .. } => "flash",
            Self::Bloom { .. } => "bloom",
            Self::ChromaticAberration { .. } => "chromatic_aberration",
            Self::Vignette { .. } => "vignette",
        }
    }
}

/// 记录所有效果调用
///
/// 克隆共享同一份记录，测试和宿主都可以拿它来断言"发生了哪些效果"。
#[derive(Debug, Clone, Default)]
pub struct EffectRecorder {
    calls: Rc<RefCell<Vec<EffectCall>>>,
}

impl EffectRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<EffectCall> {
        self.calls.borrow().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.calls.borrow().iter().map(EffectCall::kind).collect()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.kind() == kind).count()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    fn push(&self, call: EffectCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl CameraEffects for EffectRecorder {
    fn trigger_shake(&mut self, intensity: f32, duration: f32) {
        self.push(EffectCall::Shake {
            intensity,
            duration,
        });
    }

    fn trigger_zoom(&mut self, target_distance: f32, speed: f32) {
        self.push(EffectCall::Zoom {
            distance: target_distance,
            speed,
        });
    }

    fn reset_zoom(&mut self, speed: f32) {
        self.push(EffectCall::ResetZoom { speed });
    }

    fn trigger_flash(&mut self, color: Color, intensity: f32, decay: f32) {
        self.push(EffectCall::Flash {
            color,
            intensity,
            decay,
        });
    }
}

impl PostProcessing for EffectRecorder {
    fn pulse_bloom(&mut self, intensity: f32, duration: f32) {
        self.push(EffectCall::Bloom {
            intensity,
            duration,
        });
    }

    fn pulse_chromatic_aberration(&mut self, intensity: f32, duration: f32) {
        self.push(EffectCall::ChromaticAberration {
            intensity,
            duration,
        });
    }

    fn pulse_vignette(&mut self, darkness: f32, duration: f32) {
        self.push(EffectCall::Vignette { darkness, duration });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_post_processing_is_noop() {
        let recorder = EffectRecorder::new();
        let mut effects = Effects::new(Box::new(recorder.clone()), None);

        effects.shake(0.1, 0.2);
        effects.bloom(2.0, 0.5);
        effects.chromatic_aberration(0.01, 0.5);
        effects.vignette(0.6, 0.4);

        assert!(!effects.has_post_processing());
        assert_eq!(recorder.kinds(), vec!["shake"]);
    }

    #[test]
    fn test_recording_captures_both_sides() {
        let recorder = EffectRecorder::new();
        let mut effects = Effects::recording(&recorder);

        effects.zoom(6.5, 3.0);
        effects.flash(palette::PINK, 0.9, 4.0);
        effects.bloom(3.0, 0.6);
        effects.reset_zoom(2.0);

        insta::assert_debug_snapshot!(recorder.kinds(), @r#"
        [
            "zoom",
            "flash",
            "bloom",
            "reset_zoom",
        ]
        "#);
        assert_eq!(recorder.count("flash"), 1);

        recorder.clear();
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn test_call_serializes_with_kind_tag() {
        let json = serde_json::to_value(EffectCall::ResetZoom { speed: 2.0 }).unwrap();
        assert_eq!(json["kind"], "reset_zoom");
        assert_eq!(json["speed"], 2.0);
    }
}
