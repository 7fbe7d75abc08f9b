//! 普通粒子：弹道运动与螺旋汇聚两种运动规律。

use std::f32::consts::PI;

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Sprite, jitter, life_ratio};
use crate::effects::{Color, palette};

/// 粒子尺寸
const SMALL: f32 = 0.03;
const MEDIUM: f32 = 0.06;
const LARGE: f32 = 0.12;

/// 粒子种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleKind {
    /// 撕裂碎屑
    Tear,
    /// 闪光
    Sparkle,
    /// 爆炸
    Explosion,
    /// 能量漂浮
    Energy,
    /// 螺旋汇聚
    Spiral,
}

/// 弹道类粒子的参数
struct KindProfile {
    colors: &'static [Color],
    speed: f32,
    gravity: f32,
    size: f32,
}

impl ParticleKind {
    fn profile(self) -> KindProfile {
        match self {
            ParticleKind::Tear | ParticleKind::Spiral => KindProfile {
                colors: &[palette::GOLD, palette::ORANGE, palette::WHITE],
                speed: 4.0,
                gravity: 9.8,
                size: MEDIUM,
            },
            ParticleKind::Sparkle => KindProfile {
                colors: &[palette::CYAN, palette::PINK, palette::WHITE],
                speed: 2.0,
                gravity: 2.0,
                size: SMALL,
            },
            ParticleKind::Explosion => KindProfile {
                colors: &[palette::PINK, palette::CYAN, palette::ORANGE, palette::PURPLE],
                speed: 8.0,
                gravity: 3.0,
                size: LARGE,
            },
            ParticleKind::Energy => KindProfile {
                colors: &[palette::CYAN, palette::PINK],
                speed: 1.0,
                gravity: 0.0,
                size: SMALL,
            },
        }
    }
}

/// 运动规律
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// 速度 + 重力积分
    Ballistic {
        velocity: Vec3,
        /// 每轴角速度
        spin: Vec3,
        gravity: f32,
    },
    /// 绕固定中心旋转并收缩半径
    Spiral {
        center: Vec3,
        angle: f32,
        radius: f32,
        spiral_speed: f32,
        inward_speed: f32,
    },
}

/// 普通粒子
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientParticle {
    pub kind: ParticleKind,
    pub sprite: Sprite,
    pub motion: Motion,
    pub life: f32,
    pub max_life: f32,
}

impl AmbientParticle {
    /// 弹道类粒子
    pub(crate) fn ballistic(rng: &mut impl Rng, origin: Vec3, kind: ParticleKind) -> Self {
        let profile = kind.profile();

        let position = origin + Vec3::new(jitter(rng, 0.25), jitter(rng, 0.15), jitter(rng, 0.15));
        let angle = rng.r#gen::<f32>() * PI * 2.0;
        let elevation = (rng.r#gen::<f32>() - 0.3) * PI;
        let speed = profile.speed * (0.5 + rng.r#gen::<f32>() * 0.5);
        let velocity = Vec3::new(
            angle.cos() * elevation.cos() * speed,
            elevation.sin() * speed + 2.0,
            angle.sin() * elevation.cos() * speed,
        );
        let spin = Vec3::new(
            rng.r#gen::<f32>() * 15.0,
            rng.r#gen::<f32>() * 15.0,
            rng.r#gen::<f32>() * 15.0,
        );
        let life = 1.0 + rng.r#gen::<f32>() * 0.8;
        let color = profile.colors[rng.gen_range(0..profile.colors.len())];

        Self {
            kind,
            sprite: Sprite::new(position, color, Vec2::splat(profile.size)),
            motion: Motion::Ballistic {
                velocity,
                spin,
                gravity: profile.gravity,
            },
            life,
            max_life: life,
        }
    }

    /// 螺旋粒子，`index / count` 决定起始角度，两圈铺满
    pub(crate) fn spiral(
        rng: &mut impl Rng,
        center: Vec3,
        index: usize,
        count: usize,
        color: Color,
    ) -> Self {
        let angle = index as f32 / count.max(1) as f32 * PI * 4.0;
        let radius = 2.0 + rng.r#gen::<f32>() * 2.0;
        let height = (rng.r#gen::<f32>() - 0.5) * 3.0;
        let color = if rng.r#gen::<bool>() { color } else { palette::PINK };

        let position = Vec3::new(
            center.x + angle.cos() * radius,
            center.y + height,
            center.z + angle.sin() * radius,
        );
        let mut sprite = Sprite::new(position, color, Vec2::splat(SMALL));
        sprite.opacity = 0.8;

        Self {
            kind: ParticleKind::Spiral,
            sprite,
            motion: Motion::Spiral {
                center,
                angle,
                radius,
                spiral_speed: 3.0 + rng.r#gen::<f32>() * 2.0,
                inward_speed: 1.5 + rng.r#gen::<f32>(),
            },
            life: 1.5,
            max_life: 1.5,
        }
    }

    /// 推进一帧，返回是否仍存活
    pub(crate) fn update(&mut self, dt: f32) -> bool {
        self.life -= dt;
        let ratio = life_ratio(self.life, self.max_life);
        let sprite = &mut self.sprite;

        match &mut self.motion {
            Motion::Spiral {
                center,
                angle,
                radius,
                spiral_speed,
                inward_speed,
            } => {
                *angle += *spiral_speed * dt;
                *radius = (*radius - *inward_speed * dt).max(0.1);

                sprite.position.x = center.x + angle.cos() * *radius;
                sprite.position.z = center.z + angle.sin() * *radius;
                sprite.position.y += (center.y - sprite.position.y) * dt * 2.0;
                sprite.opacity = ratio * 0.8;
            }
            Motion::Ballistic {
                velocity,
                spin,
                gravity,
            } => {
                velocity.y -= *gravity * dt;
                sprite.position += *velocity * dt;
                sprite.rotation += *spin * dt;

                if self.kind == ParticleKind::Explosion {
                    sprite.opacity = ratio;
                    sprite.scale = 1.0 + (1.0 - ratio) * 0.5;
                } else {
                    sprite.opacity = (ratio * 2.0).min(1.0);
                }
            }
        }

        self.life > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    #[test]
    fn test_ballistic_falls_under_gravity() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(3);
        let mut p = AmbientParticle::ballistic(&mut rng, Vec3::ZERO, ParticleKind::Tear);
        let Motion::Ballistic { velocity, .. } = p.motion else {
            panic!("tear particles are ballistic");
        };

        p.update(0.1);
        let Motion::Ballistic { velocity: after, .. } = p.motion else {
            unreachable!()
        };
        assert!((velocity.y - after.y - 0.98).abs() < 1e-4);
        assert!(p.life < p.max_life);
    }

    #[test]
    fn test_explosion_grows_as_it_fades() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(5);
        let mut p = AmbientParticle::ballistic(&mut rng, Vec3::ZERO, ParticleKind::Explosion);
        p.update(0.5);
        assert!(p.sprite.scale > 1.0);
        assert!(p.sprite.opacity < 1.0);
        assert_eq!(p.sprite.size, Vec2::splat(LARGE));
    }

    #[test]
    fn test_spiral_converges() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(9);
        let center = Vec3::new(0.0, 0.68, 0.2);
        let mut p = AmbientParticle::spiral(&mut rng, center, 3, 40, palette::CYAN);
        let start = (p.sprite.position - center).length();

        for _ in 0..10 {
            p.update(0.1);
        }
        let end = (p.sprite.position - center).length();
        assert!(end < start);
        assert!(p.sprite.color == palette::CYAN || p.sprite.color == palette::PINK);
    }
}
