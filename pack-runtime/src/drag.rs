//! # Drag 模块
//!
//! 拖拽倾斜：指针位移转换成目标对象的俯仰/偏航，松手后带惯性回正。
//!
//! 倾斜量只有一份，由当前阶段决定它作用在谁身上：
//! 待开包时是卡包，有翻开的牌时是那张牌，否则是整个牌堆。
//! 惯性、回正和追随都按帧计算，与 dt 无关。

use std::f32::consts::PI;

use glam::Vec2;
use serde::Serialize;
use tracing::debug;

use crate::config::DragConfig;
use crate::scene::SceneObject;

/// 倾斜作用的对象
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TiltTarget {
    Pack,
    Card(usize),
    Pile,
}

/// 某类目标的手感参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltProfile {
    /// 乘在基础灵敏度上
    pub sensitivity_scale: f32,
    pub inertia: f32,
    pub return_speed: f32,
    pub follow: f32,
    pub max_pitch: f32,
    pub max_yaw: Option<f32>,
    /// 静止时的偏航角
    pub base_yaw: f32,
}

impl TiltTarget {
    pub fn profile(&self, config: &DragConfig) -> TiltProfile {
        match self {
            Self::Pack => TiltProfile {
                sensitivity_scale: 1.0,
                inertia: config.inertia,
                return_speed: config.return_speed,
                follow: config.pack_follow,
                max_pitch: config.max_pitch,
                max_yaw: None,
                base_yaw: 0.0,
            },
            Self::Card(_) => TiltProfile {
                sensitivity_scale: 1.0,
                inertia: config.inertia,
                return_speed: config.card_return_speed,
                follow: config.card_follow,
                max_pitch: config.max_pitch,
                max_yaw: None,
                base_yaw: 0.0,
            },
            // 牌堆整体背面朝向镜头
            Self::Pile => TiltProfile {
                sensitivity_scale: config.pile_sensitivity_scale,
                inertia: config.pile_inertia,
                return_speed: config.pile_return_speed,
                follow: config.pile_follow,
                max_pitch: config.pile_max_pitch,
                max_yaw: Some(config.pile_max_yaw),
                base_yaw: PI,
            },
        }
    }
}

/// 松手时的手势判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DragRelease {
    /// 位移超过阈值，不算点击
    pub moved: bool,
    /// 水平横扫
    pub swipe: bool,
}

/// 拖拽控制器
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DragController {
    dragging: bool,
    /// x 为俯仰，y 为偏航
    tilt: Vec2,
    velocity: Vec2,
    /// 本次拖拽的累计指针位移（像素）
    travel: Vec2,
    moved: bool,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn tilt(&self) -> Vec2 {
        self.tilt
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn start(&mut self) {
        self.dragging = true;
        self.moved = false;
        self.travel = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
    }

    /// 指针移动 `(dx, dy)` 像素
    ///
    /// 没有可倾斜的目标时只记录位移，供松手时判定手势。
    pub fn drag_move(
        &mut self,
        dx: f32,
        dy: f32,
        target: Option<TiltTarget>,
        config: &DragConfig,
    ) {
        if !self.dragging {
            return;
        }

        self.travel += Vec2::new(dx, dy);
        if self.travel.x.abs() + self.travel.y.abs() > config.move_threshold {
            self.moved = true;
        }

        let Some(target) = target else {
            return;
        };
        let profile = target.profile(config);
        let delta = Vec2::new(dy, dx) * config.sensitivity;

        self.tilt += delta * profile.sensitivity_scale;
        self.clamp(&profile);
        self.velocity = delta;
    }

    /// 清零倾斜量与惯性，拖拽中的手势不受影响
    pub fn reset_tilt(&mut self) {
        self.tilt = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
    }

    /// 松手
    pub fn end(&mut self, config: &DragConfig) -> DragRelease {
        if !self.dragging {
            return DragRelease::default();
        }
        self.dragging = false;

        let release = DragRelease {
            moved: self.moved,
            swipe: self.moved && self.travel.x.abs() > config.swipe_threshold,
        };
        if release.swipe {
            debug!(travel = self.travel.x, "检测到横扫");
        }
        release
    }

    /// 每帧推进：松手后的惯性与回正，再让目标旋转追随倾斜量
    pub fn tick(&mut self, target: TiltTarget, node: &SceneObject, config: &DragConfig) {
        let profile = target.profile(config);

        if !self.dragging {
            self.tilt += self.velocity;
            self.velocity *= profile.inertia;
            self.tilt *= 1.0 - profile.return_speed;
            self.clamp(&profile);
        }

        let mut rotation = node.rotation();
        rotation.x += (self.tilt.x - rotation.x) * profile.follow;
        rotation.y += (profile.base_yaw + self.tilt.y - rotation.y) * profile.follow;
        node.set_rotation(rotation);
    }

    fn clamp(&mut self, profile: &TiltProfile) {
        self.tilt.x = self.tilt.x.clamp(-profile.max_pitch, profile.max_pitch);
        if let Some(max_yaw) = profile.max_yaw {
            self.tilt.y = self.tilt.y.clamp(-max_yaw, max_yaw);
        }
    }
}
