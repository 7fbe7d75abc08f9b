//! 闪电：两点之间的抖动折线，带递归分支。

use glam::Vec3;
use rand::Rng;

use super::{jitter, life_ratio};
use crate::effects::Color;

/// 每条闪电的段数
pub const SEGMENTS: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct LightningBolt {
    /// `SEGMENTS + 1` 个点，首尾固定在起点和终点
    pub points: Vec<Vec3>,
    pub color: Color,
    pub opacity: f32,
    pub life: f32,
    pub max_life: f32,
}

impl LightningBolt {
    fn new(rng: &mut impl Rng, start: Vec3, end: Vec3, color: Color) -> Self {
        let points = (0..=SEGMENTS)
            .map(|i| {
                let t = i as f32 / SEGMENTS as f32;
                let point = start.lerp(end, t);
                if i > 0 && i < SEGMENTS {
                    point + Vec3::new(jitter(rng, 0.15), jitter(rng, 0.15), jitter(rng, 0.1))
                } else {
                    point
                }
            })
            .collect();
        let life = 0.3 + rng.r#gen::<f32>() * 0.2;

        Self {
            points,
            color,
            opacity: 1.0,
            life,
            max_life: life,
        }
    }

    pub(crate) fn update(&mut self, dt: f32) -> bool {
        self.life -= dt;
        self.opacity = life_ratio(self.life, self.max_life);
        self.life > 0.0
    }
}

/// 生成主干与逐级分支
///
/// 深度为 `d` 时共生成 `d + 1` 条：每一级从上一条的某个内部点分出一条短闪电。
pub(crate) fn strike(
    rng: &mut impl Rng,
    start: Vec3,
    end: Vec3,
    color: Color,
    branch_depth: u32,
) -> Vec<LightningBolt> {
    let mut bolts = Vec::with_capacity(branch_depth as usize + 1);
    let (mut from, mut to) = (start, end);

    for remaining in (0..=branch_depth).rev() {
        let bolt = LightningBolt::new(rng, from, to, color);
        if remaining > 0 {
            let index = rng.gen_range(1..SEGMENTS - 1);
            from = bolt.points[index];
            to = from + Vec3::new(jitter(rng, 0.5), jitter(rng, 0.5), jitter(rng, 0.25));
        }
        bolts.push(bolt);
    }

    bolts
}
