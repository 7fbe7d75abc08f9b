//! # Particles 模块
//!
//! 瞬态特效模拟：四个互相独立的池子，统一由 `tick` 推进。
//!
//! - 普通粒子（撕裂、闪光、爆炸、能量、螺旋）
//! - 能量环 / 冲击波
//! - 闪电
//! - 卡包碎片
//!
//! 另外还有一颗可选的蓄能光球。所有生成都是即发即忘，没有完成回调。
//!
//! ## 生命周期
//!
//! 每个实例每帧：`life -= dt`，按 `max(life, 0) / max_life` 写入本帧状态，
//! `life <= 0` 时在同一帧移除。最后一帧的淡出不会被跳过，移除后不会复活。
//! 池子条目拥有自己的 `Sprite`，移除即释放。

mod ambient;
mod debris;
mod lightning;
mod orb;
mod rings;

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use serde::Serialize;
use tracing::debug;

use crate::effects::Color;

pub use ambient::{AmbientParticle, Motion, ParticleKind};
pub use debris::DebrisFragment;
pub use lightning::{LightningBolt, SEGMENTS as LIGHTNING_SEGMENTS};
pub use orb::GlowOrb;
pub use rings::{EnergyRing, RingKind};

/// 可绘制的面片状态，渲染层按此绘制
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub position: Vec3,
    pub rotation: Vec3,
    /// 统一缩放
    pub scale: f32,
    /// 面片宽高
    pub size: Vec2,
    pub opacity: f32,
    pub color: Color,
}

impl Sprite {
    pub fn new(position: Vec3, color: Color, size: Vec2) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale: 1.0,
            size,
            opacity: 1.0,
            color,
        }
    }
}

/// 在 `[-half, half)` 内均匀抖动
pub(crate) fn jitter(rng: &mut impl Rng, half: f32) -> f32 {
    (rng.r#gen::<f32>() - 0.5) * 2.0 * half
}

/// 剩余寿命比例，已死亡时为 0
pub(crate) fn life_ratio(life: f32, max_life: f32) -> f32 {
    if max_life <= 0.0 {
        return 0.0;
    }
    life.max(0.0) / max_life
}

/// 各池子的存活数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolCounts {
    pub particles: usize,
    pub rings: usize,
    pub bolts: usize,
    pub debris: usize,
}

impl PoolCounts {
    pub fn total(&self) -> usize {
        self.particles + self.rings + self.bolts + self.debris
    }
}

/// 特效模拟器
pub struct EffectSimulator {
    rng: Xoshiro256StarStar,
    particles: Vec<AmbientParticle>,
    rings: Vec<EnergyRing>,
    bolts: Vec<LightningBolt>,
    debris: Vec<DebrisFragment>,
    orb: Option<GlowOrb>,
}

impl std::fmt::Debug for EffectSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectSimulator")
            .field("counts", &self.counts())
            .field("orb", &self.orb.is_some())
            .finish()
    }
}

impl EffectSimulator {
    /// 以固定种子创建，同一种子产生完全相同的特效
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256StarStar::seed_from_u64(seed),
            particles: Vec::new(),
            rings: Vec::new(),
            bolts: Vec::new(),
            debris: Vec::new(),
            orb: None,
        }
    }

    // ========== 生成 ==========

    /// 普通粒子爆发
    pub fn spawn_particles(&mut self, position: Vec3, count: usize, kind: ParticleKind) {
        if kind == ParticleKind::Spiral {
            self.spawn_spiral(position, count, crate::effects::palette::CYAN);
            return;
        }
        let rng = &mut self.rng;
        self.particles
            .extend((0..count).map(|_| AmbientParticle::ballistic(rng, position, kind)));
    }

    /// 围绕 `center` 螺旋汇聚的粒子
    pub fn spawn_spiral(&mut self, center: Vec3, count: usize, color: Color) {
        let rng = &mut self.rng;
        self.particles
            .extend((0..count).map(|i| AmbientParticle::spiral(rng, center, i, count, color)));
    }

    /// 依次延迟展开的能量环
    pub fn spawn_energy_burst(&mut self, position: Vec3, color: Color, count: usize) {
        self.rings
            .extend((0..count).map(|i| EnergyRing::burst(position, color, i)));
    }

    pub fn spawn_shockwave(&mut self, position: Vec3, color: Color) {
        self.rings.push(EnergyRing::shockwave(position, color));
    }

    /// 闪电，`branch_depth` 级分支
    pub fn spawn_lightning(&mut self, start: Vec3, end: Vec3, color: Color, branch_depth: u32) {
        let bolts = lightning::strike(&mut self.rng, start, end, color, branch_depth);
        self.bolts.extend(bolts);
    }

    pub fn spawn_debris(&mut self, position: Vec3, count: usize) {
        let rng = &mut self.rng;
        self.debris
            .extend((0..count).map(|_| DebrisFragment::new(rng, position)));
    }

    /// 创建蓄能光球，已有光球会被替换
    pub fn create_orb(&mut self, position: Vec3, color: Color) {
        self.orb = Some(GlowOrb::new(position, color));
    }

    pub fn set_orb_intensity(&mut self, intensity: f32) {
        if let Some(orb) = self.orb.as_mut() {
            orb.intensity = intensity.clamp(0.0, 1.0);
        }
    }

    pub fn remove_orb(&mut self) {
        self.orb = None;
    }

    // ========== 更新 ==========

    /// 推进所有池子
    pub fn tick(&mut self, dt: f32) {
        self.particles.retain_mut(|p| p.update(dt));
        self.rings.retain_mut(|r| r.update(dt));
        self.bolts.retain_mut(|b| b.update(dt));
        self.debris.retain_mut(|d| d.update(dt));
        if let Some(orb) = self.orb.as_mut() {
            orb.update(dt);
        }
    }

    /// 立即释放所有实例
    pub fn clear_all(&mut self) {
        let counts = self.counts();
        self.particles.clear();
        self.rings.clear();
        self.bolts.clear();
        self.debris.clear();
        self.orb = None;
        debug!(freed = counts.total(), "特效池已清空");
    }

    // ========== 查询 ==========

    pub fn counts(&self) -> PoolCounts {
        PoolCounts {
            particles: self.particles.len(),
            rings: self.rings.len(),
            bolts: self.bolts.len(),
            debris: self.debris.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts().total() == 0 && self.orb.is_none()
    }

    pub fn particles(&self) -> &[AmbientParticle] {
        &self.particles
    }

    pub fn rings(&self) -> &[EnergyRing] {
        &self.rings
    }

    pub fn bolts(&self) -> &[LightningBolt] {
        &self.bolts
    }

    pub fn debris(&self) -> &[DebrisFragment] {
        &self.debris
    }

    pub fn orb(&self) -> Option<&GlowOrb> {
        self.orb.as_ref()
    }

    /// 所有池子里的面片，渲染层逐个绘制
    pub fn sprites(&self) -> impl Iterator<Item = &Sprite> {
        self.particles
            .iter()
            .map(|p| &p.sprite)
            .chain(self.rings.iter().map(|r| &r.sprite))
            .chain(self.debris.iter().map(|d| &d.sprite))
            .chain(self.orb.iter().map(|o| &o.sprite))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::palette;

    #[test]
    fn test_lifecycle_decrements_and_removes_on_time() {
        let mut sim = EffectSimulator::new(42);
        sim.spawn_particles(Vec3::ZERO, 30, ParticleKind::Sparkle);
        let dt = 0.05;

        let lives: Vec<f32> = sim.particles().iter().map(|p| p.life).collect();
        // 每个粒子应在 life 首次 <= 0 的那一帧被移除
        let mut expected_death: Vec<usize> = lives
            .iter()
            .map(|&life| {
                let mut remaining = life;
                let mut frames = 0;
                while remaining > 0.0 {
                    remaining -= dt;
                    frames += 1;
                }
                frames
            })
            .collect();
        expected_death.sort_unstable();

        let mut previous = lives.clone();
        for frame in 1..=60 {
            sim.tick(dt);
            let alive = expected_death.iter().filter(|&&d| d > frame).count();
            assert_eq!(sim.counts().particles, alive, "frame {frame}");

            let now: Vec<f32> = sim.particles().iter().map(|p| p.life).collect();
            for life in &now {
                assert!(*life > 0.0);
                assert!(previous.iter().any(|p| (p - dt - life).abs() < 1e-6));
            }
            previous = now;
        }
        assert_eq!(sim.counts().particles, 0);
    }

    #[test]
    fn test_spiral_kind_routes_to_spiral_motion() {
        let mut sim = EffectSimulator::new(1);
        sim.spawn_particles(Vec3::ZERO, 5, ParticleKind::Spiral);
        assert!(
            sim.particles()
                .iter()
                .all(|p| matches!(p.motion, Motion::Spiral { .. }))
        );
    }

    #[test]
    fn test_pools_are_independent() {
        let mut sim = EffectSimulator::new(7);
        sim.spawn_shockwave(Vec3::ZERO, palette::WHITE);
        sim.spawn_lightning(Vec3::ZERO, Vec3::ONE, palette::CYAN, 2);
        sim.spawn_debris(Vec3::ZERO, 20);
        sim.spawn_energy_burst(Vec3::ZERO, palette::PURPLE, 2);

        assert_eq!(
            sim.counts(),
            PoolCounts {
                particles: 0,
                rings: 3,
                bolts: 3,
                debris: 20,
            }
        );

        // 闪电最多活 0.5 秒，冲击波 0.6 秒，碎片至少 1.5 秒
        for _ in 0..13 {
            sim.tick(0.05);
        }
        let counts = sim.counts();
        assert_eq!(counts.bolts, 0);
        assert_eq!(counts.debris, 20);
        assert_eq!(counts.rings, 2);
    }

    #[test]
    fn test_tick_on_empty_pools() {
        let mut sim = EffectSimulator::new(0);
        sim.tick(0.016);
        sim.tick(0.016);
        assert!(sim.is_empty());
    }

    #[test]
    fn test_clear_all() {
        let mut sim = EffectSimulator::new(3);
        sim.spawn_particles(Vec3::ZERO, 60, ParticleKind::Explosion);
        sim.spawn_debris(Vec3::ZERO, 20);
        sim.create_orb(Vec3::ZERO, palette::PINK);
        assert!(sim.sprites().count() > 80);

        sim.clear_all();
        assert!(sim.is_empty());
        assert_eq!(sim.sprites().count(), 0);
    }

    #[test]
    fn test_same_seed_same_effects() {
        let spawn = |seed| {
            let mut sim = EffectSimulator::new(seed);
            sim.spawn_particles(Vec3::ZERO, 10, ParticleKind::Tear);
            sim.tick(0.1);
            sim.particles().to_vec()
        };
        assert_eq!(spawn(99), spawn(99));
        assert_ne!(spawn(99), spawn(100));
    }
}
