//! # Camera 模块
//!
//! 镜头与后处理效果的参考实现，由宿主每帧 `update(dt)` 推进。
//!
//! 核心通过 `Effects` 发出触发命令，宿主把 `Rc<RefCell<CameraRig>>` /
//! `Rc<RefCell<PostFxRig>>` 的克隆交给 `Effects`，自己保留一份读取状态去渲染。

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Vec2, Vec3};
use serde::Serialize;

use crate::animation::EasingFunction;
use crate::effects::{CameraEffects, Color, PostProcessing};

/// 默认镜头距离
pub const DEFAULT_CAMERA_Z: f32 = 5.5;

/// 震屏频率
const SHAKE_FREQUENCY: f32 = 30.0;
/// 按 60 帧/秒把时长换算成逐帧衰减
const SHAKE_FRAMES_PER_SECOND: f32 = 60.0;
const SHAKE_EPSILON: f32 = 0.001;
const ZOOM_SNAP: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct Shake {
    intensity: f32,
    decay: f32,
    time: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct Zoom {
    target: f32,
    speed: f32,
}

/// 全屏闪光
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Flash {
    pub color: Color,
    pub intensity: f32,
    /// 每秒衰减量
    pub decay: f32,
}

/// 镜头
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraRig {
    /// 静止位置
    origin: Vec3,
    position: Vec3,
    shake: Shake,
    zoom: Option<Zoom>,
    flash: Option<Flash>,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, DEFAULT_CAMERA_Z))
    }
}

impl CameraRig {
    pub fn new(origin: Vec3) -> Self {
        Self {
            origin,
            position: origin,
            shake: Shake {
                intensity: 0.0,
                decay: 1.0,
                time: 0.0,
            },
            zoom: None,
            flash: None,
        }
    }

    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn flash(&self) -> Option<Flash> {
        self.flash
    }

    pub fn is_shaking(&self) -> bool {
        self.shake.intensity > SHAKE_EPSILON
    }

    pub fn is_zooming(&self) -> bool {
        self.zoom.is_some()
    }

    /// 推进一帧
    pub fn update(&mut self, dt: f32) {
        if self.is_shaking() {
            let shake = &mut self.shake;
            shake.time += dt;
            self.position.x =
                self.origin.x + (shake.time * SHAKE_FREQUENCY).sin() * shake.intensity;
            self.position.y =
                self.origin.y + (shake.time * SHAKE_FREQUENCY * 1.3).cos() * shake.intensity;
            shake.intensity *= shake.decay;
        } else {
            self.position.x = self.origin.x;
            self.position.y = self.origin.y;
        }

        if let Some(zoom) = self.zoom {
            let diff = zoom.target - self.position.z;
            if diff.abs() > ZOOM_SNAP {
                self.position.z += diff * zoom.speed * dt;
            } else {
                self.position.z = zoom.target;
                self.zoom = None;
            }
        }

        if let Some(flash) = self.flash.as_mut() {
            flash.intensity -= flash.decay * dt;
            if flash.intensity <= 0.0 {
                self.flash = None;
            }
        }
    }
}

impl CameraEffects for CameraRig {
    fn trigger_shake(&mut self, intensity: f32, duration: f32) {
        // 在 duration 内衰减到约 1%
        let frames = (duration * SHAKE_FRAMES_PER_SECOND).max(1.0);
        self.shake = Shake {
            intensity,
            decay: 0.01f32.powf(1.0 / frames),
            time: 0.0,
        };
    }

    fn trigger_zoom(&mut self, target_distance: f32, speed: f32) {
        self.zoom = Some(Zoom {
            target: target_distance,
            speed,
        });
    }

    fn reset_zoom(&mut self, speed: f32) {
        self.trigger_zoom(self.origin.z, speed);
    }

    fn trigger_flash(&mut self, color: Color, intensity: f32, decay: f32) {
        self.flash = Some(Flash {
            color,
            intensity,
            decay,
        });
    }
}

impl CameraEffects for Rc<RefCell<CameraRig>> {
    fn trigger_shake(&mut self, intensity: f32, duration: f32) {
        self.borrow_mut().trigger_shake(intensity, duration);
    }

    fn trigger_zoom(&mut self, target_distance: f32, speed: f32) {
        self.borrow_mut().trigger_zoom(target_distance, speed);
    }

    fn reset_zoom(&mut self, speed: f32) {
        self.borrow_mut().reset_zoom(speed);
    }

    fn trigger_flash(&mut self, color: Color, intensity: f32, decay: f32) {
        self.borrow_mut().trigger_flash(color, intensity, decay);
    }
}

/// 从峰值按 out-quart 回落到基准值的脉冲
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pulse {
    base: f32,
    peak: f32,
    duration: f32,
    elapsed: f32,
}

impl Pulse {
    fn idle(base: f32) -> Self {
        Self {
            base,
            peak: base,
            duration: 0.0,
            elapsed: 0.0,
        }
    }

    fn trigger(&mut self, peak: f32, duration: f32) {
        self.peak = peak;
        self.duration = duration;
        self.elapsed = 0.0;
    }

    fn update(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    pub fn value(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.base;
        }
        let t = EasingFunction::EaseOutQuart.apply(self.elapsed / self.duration);
        self.peak + (self.base - self.peak) * t
    }

    pub fn is_active(&self) -> bool {
        self.duration > 0.0 && self.elapsed < self.duration
    }
}

/// 后处理参数
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostFxRig {
    bloom: Pulse,
    chromatic: Pulse,
    vignette: Pulse,
}

impl Default for PostFxRig {
    fn default() -> Self {
        Self {
            bloom: Pulse::idle(0.4),
            chromatic: Pulse::idle(0.001),
            vignette: Pulse::idle(0.4),
        }
    }
}

impl PostFxRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    pub fn bloom(&self) -> f32 {
        self.bloom.value()
    }

    /// 色差偏移，y 分量取一半
    pub fn chromatic_offset(&self) -> Vec2 {
        let value = self.chromatic.value();
        Vec2::new(value, value * 0.5)
    }

    pub fn vignette(&self) -> f32 {
        self.vignette.value()
    }

    pub fn is_active(&self) -> bool {
        self.bloom.is_active() || self.chromatic.is_active() || self.vignette.is_active()
    }

    pub fn update(&mut self, dt: f32) {
        self.bloom.update(dt);
        self.chromatic.update(dt);
        self.vignette.update(dt);
    }
}

impl PostProcessing for PostFxRig {
    fn pulse_bloom(&mut self, intensity: f32, duration: f32) {
        self.bloom.trigger(intensity, duration);
    }

    fn pulse_chromatic_aberration(&mut self, intensity: f32, duration: f32) {
        self.chromatic.trigger(intensity, duration);
    }

    fn pulse_vignette(&mut self, darkness: f32, duration: f32) {
        self.vignette.trigger(darkness, duration);
    }
}

impl PostProcessing for Rc<RefCell<PostFxRig>> {
    fn pulse_bloom(&mut self, intensity: f32, duration: f32) {
        self.borrow_mut().pulse_bloom(intensity, duration);
    }

    fn pulse_chromatic_aberration(&mut self, intensity: f32, duration: f32) {
        self.borrow_mut().pulse_chromatic_aberration(intensity, duration);
    }

    fn pulse_vignette(&mut self, darkness: f32, duration: f32) {
        self.borrow_mut().pulse_vignette(darkness, duration);
    }
}

/// 闪光颜色的 0..1 分量，渲染层直接当作叠加色
pub fn color_rgb(color: Color) -> Vec3 {
    let channel = |shift: u32| ((color >> shift) & 0xff) as f32 / 255.0;
    Vec3::new(channel(16), channel(8), channel(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{Effects, palette};

    #[test]
    fn test_shake_decays_to_rest() {
        let mut rig = CameraRig::default();
        rig.trigger_shake(0.4, 0.6);
        rig.update(1.0 / 60.0);
        assert_ne!(rig.position().x, 0.0);

        // 0.6 秒对应 36 帧衰减到 1%
        for _ in 0..80 {
            rig.update(1.0 / 60.0);
        }
        assert!(!rig.is_shaking());
        rig.update(1.0 / 60.0);
        assert_eq!(rig.position(), Vec3::new(0.0, 0.0, DEFAULT_CAMERA_Z));
    }

    #[test]
    fn test_zoom_and_reset() {
        let mut rig = CameraRig::default();
        rig.trigger_zoom(6.5, 3.0);
        for _ in 0..300 {
            rig.update(1.0 / 60.0);
        }
        assert!(!rig.is_zooming());
        assert_eq!(rig.position().z, 6.5);

        rig.reset_zoom(2.0);
        for _ in 0..400 {
            rig.update(1.0 / 60.0);
        }
        assert_eq!(rig.position().z, DEFAULT_CAMERA_Z);
    }

    #[test]
    fn test_flash_decays_linearly() {
        let mut rig = CameraRig::default();
        rig.trigger_flash(palette::PINK, 0.9, 4.0);
        rig.update(0.1);
        let flash = rig.flash().unwrap();
        assert!((flash.intensity - 0.5).abs() < 1e-5);

        rig.update(0.2);
        assert!(rig.flash().is_none());
    }

    #[test]
    fn test_pulse_returns_to_base() {
        let mut fx = PostFxRig::new();
        assert_eq!(fx.bloom(), 0.4);

        fx.pulse_bloom(3.0, 0.6);
        assert_eq!(fx.bloom(), 3.0);
        fx.update(0.3);
        assert!(fx.bloom() < 3.0 && fx.bloom() > 0.4);
        fx.update(0.35);
        assert!((fx.bloom() - 0.4).abs() < 1e-6);
        assert!(!fx.is_active());

        fx.pulse_chromatic_aberration(0.025, 0.5);
        assert_eq!(fx.chromatic_offset(), Vec2::new(0.025, 0.0125));
    }

    #[test]
    fn test_shared_rigs_behind_effects() {
        let camera = CameraRig::default().shared();
        let post = PostFxRig::new().shared();
        let mut effects = Effects::new(Box::new(camera.clone()), Some(Box::new(post.clone())));

        effects.zoom(6.5, 3.0);
        effects.vignette(0.6, 0.4);
        assert!(camera.borrow().is_zooming());
        assert_eq!(post.borrow().vignette(), 0.6);
    }

    #[test]
    fn test_color_rgb() {
        assert_eq!(color_rgb(palette::WHITE), Vec3::ONE);
        assert_eq!(color_rgb(0xff0000), Vec3::new(1.0, 0.0, 0.0));
    }
}
