//! 撕裂时飞出的卡包碎片。

use std::f32::consts::PI;

use glam::{Vec2, Vec3};
use rand::Rng;

use super::{Sprite, jitter, life_ratio};
use crate::effects::palette;

const GRAVITY: f32 = 12.0;
/// 每帧速度衰减，在积分之后施加
const DAMPING: f32 = 0.99;

#[derive(Debug, Clone, PartialEq)]
pub struct DebrisFragment {
    pub sprite: Sprite,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub life: f32,
    pub max_life: f32,
}

impl DebrisFragment {
    pub(crate) fn new(rng: &mut impl Rng, origin: Vec3) -> Self {
        let size = Vec2::new(
            0.1 + rng.r#gen::<f32>() * 0.3,
            0.05 + rng.r#gen::<f32>() * 0.15,
        );
        let color = if rng.r#gen::<bool>() {
            palette::ORANGE
        } else {
            palette::PINK
        };

        let mut sprite = Sprite::new(
            origin + Vec3::new(jitter(rng, 1.0), jitter(rng, 0.25), rng.r#gen::<f32>() * 0.3),
            color,
            size,
        );
        sprite.rotation = Vec3::new(
            rng.r#gen::<f32>() * PI,
            rng.r#gen::<f32>() * PI,
            rng.r#gen::<f32>() * PI,
        );

        let velocity = Vec3::new(
            jitter(rng, 3.0),
            rng.r#gen::<f32>() * 4.0 + 2.0,
            jitter(rng, 2.0) + 2.0,
        );
        let angular_velocity = Vec3::new(jitter(rng, 5.0), jitter(rng, 5.0), jitter(rng, 5.0));
        let life = 1.5 + rng.r#gen::<f32>() * 0.5;

        Self {
            sprite,
            velocity,
            angular_velocity,
            life,
            max_life: life,
        }
    }

    pub(crate) fn update(&mut self, dt: f32) -> bool {
        self.life -= dt;

        self.velocity.y -= GRAVITY * dt;
        self.sprite.position += self.velocity * dt;
        self.sprite.rotation += self.angular_velocity * dt;
        self.sprite.opacity = life_ratio(self.life, self.max_life);
        self.velocity *= DAMPING;

        self.life > 0.0
    }
}
