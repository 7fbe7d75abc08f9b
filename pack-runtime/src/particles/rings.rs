//! 能量环与冲击波。

use glam::{Vec2, Vec3};
use serde::Serialize;

use super::{Sprite, life_ratio};
use crate::effects::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RingKind {
    /// 能量爆发中的一环
    Energy,
    /// 冲击波
    Shockwave,
}

/// 扩张环
///
/// 带延迟的环在延迟耗尽前只倒数延迟，寿命不动。
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyRing {
    pub kind: RingKind,
    pub sprite: Sprite,
    pub expand_speed: f32,
    pub delay: f32,
    pub life: f32,
    pub max_life: f32,
}

impl EnergyRing {
    /// 能量爆发的第 `index` 环
    pub(crate) fn burst(position: Vec3, color: Color, index: usize) -> Self {
        let mut sprite = Sprite::new(position, color, Vec2::new(0.1, 0.15));
        sprite.opacity = 0.8;
        Self {
            kind: RingKind::Energy,
            sprite,
            expand_speed: 3.0 + index as f32 * 1.5,
            delay: index as f32 * 0.1,
            life: 1.0,
            max_life: 1.0,
        }
    }

    pub(crate) fn shockwave(position: Vec3, color: Color) -> Self {
        Self {
            kind: RingKind::Shockwave,
            sprite: Sprite::new(position, color, Vec2::new(0.1, 0.3)),
            expand_speed: 12.0,
            delay: 0.0,
            life: 0.6,
            max_life: 0.6,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.delay > 0.0
    }

    pub(crate) fn update(&mut self, dt: f32) -> bool {
        if self.delay > 0.0 {
            self.delay -= dt;
            return true;
        }

        self.life -= dt;
        let ratio = life_ratio(self.life, self.max_life);
        self.sprite.scale = 1.0 + (1.0 - ratio) * self.expand_speed;
        self.sprite.opacity = ratio * 0.8;

        self.life > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::palette;

    #[test]
    fn test_delay_freezes_life() {
        let mut ring = EnergyRing::burst(Vec3::ZERO, palette::PURPLE, 1);
        assert!(ring.is_waiting());

        assert!(ring.update(0.05));
        assert_eq!(ring.life, 1.0);
        assert!(ring.update(0.05));
        // 延迟已耗尽，开始计寿命
        assert!(ring.update(0.1));
        assert!((ring.life - 0.9).abs() < 1e-6);
        assert!(ring.sprite.scale > 1.0);
    }

    #[test]
    fn test_shockwave_expands_to_full_at_death() {
        let mut ring = EnergyRing::shockwave(Vec3::ZERO, palette::WHITE);
        assert!(ring.update(0.3));
        assert!((ring.sprite.scale - 7.0).abs() < 1e-4);

        assert!(!ring.update(0.3));
        // 最后一帧也写入了状态
        assert!((ring.sprite.scale - 13.0).abs() < 1e-4);
        assert!(ring.sprite.opacity.abs() < 1e-4);
    }
}
