//! 蓄能光球：开场时悬在撕裂点上脉动，撕开时移除。

use glam::{Vec2, Vec3};

use super::Sprite;
use crate::effects::Color;

const BASE_SCALE: f32 = 0.1;
const TARGET_SCALE: f32 = 1.0;
const PULSE_SPEED: f32 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct GlowOrb {
    pub sprite: Sprite,
    /// 蓄能程度 0.0 - 1.0
    pub intensity: f32,
    time: f32,
}

impl GlowOrb {
    pub(crate) fn new(position: Vec3, color: Color) -> Self {
        let mut sprite = Sprite::new(position, color, Vec2::splat(0.2));
        sprite.scale = BASE_SCALE;
        sprite.opacity = 0.9;
        Self {
            sprite,
            intensity: 0.0,
            time: 0.0,
        }
    }

    pub(crate) fn update(&mut self, dt: f32) {
        self.time += dt;
        let pulse = (self.time * PULSE_SPEED).sin() * 0.2 + 1.0;
        let scale = BASE_SCALE + (TARGET_SCALE - BASE_SCALE) * self.intensity;
        self.sprite.scale = scale * pulse;
        self.sprite.opacity = 0.5 + self.intensity * 0.5;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::palette;

    #[test]
    fn test_pulse_tracks_intensity() {
        let mut orb = GlowOrb::new(Vec3::ZERO, palette::PINK);
        orb.update(0.1);
        let dim = orb.sprite.scale;
        assert!((orb.sprite.opacity - 0.5).abs() < 1e-6);

        orb.intensity = 1.0;
        orb.update(0.0);
        assert!(orb.sprite.scale > dim * 5.0);
        assert_eq!(orb.sprite.opacity, 1.0);
    }
}
