//! # Stage 模块
//!
//! 一次会话内所有演出子系统的集合，开场导演和揭示状态机都通过它下达命令。
//!
//! 所有延迟都挂在同一条时间线上：会话重置时清空时间线，陈旧的阶段就不可能再触发。

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use crate::animation::TweenEngine;
use crate::config::PackConfig;
use crate::director::DirectorCue;
use crate::effects::Effects;
use crate::particles::EffectSimulator;
use crate::reveal::RevealCue;
use crate::timeline::{TimerId, Timeline};

/// 时间线上的提示
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cue {
    Director(DirectorCue),
    Reveal(RevealCue),
}

impl From<DirectorCue> for Cue {
    fn from(cue: DirectorCue) -> Self {
        Self::Director(cue)
    }
}

impl From<RevealCue> for Cue {
    fn from(cue: RevealCue) -> Self {
        Self::Reveal(cue)
    }
}

/// 演出舞台
pub struct Stage {
    pub config: PackConfig,
    pub tweens: TweenEngine,
    pub particles: EffectSimulator,
    pub effects: Effects,
    pub timeline: Timeline<Cue>,
    /// 振动、闪电起点等编排用的随机源
    pub rng: Xoshiro256StarStar,
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("tweens", &self.tweens)
            .field("particles", &self.particles)
            .field("effects", &self.effects)
            .field("pending_cues", &self.timeline.pending_count())
            .finish()
    }
}

impl Stage {
    pub fn new(config: PackConfig, effects: Effects) -> Self {
        let seed = config.seed;
        Self {
            config,
            tweens: TweenEngine::new(),
            particles: EffectSimulator::new(seed),
            effects,
            timeline: Timeline::new(),
            rng: Xoshiro256StarStar::seed_from_u64(seed.rotate_left(17) ^ 0x9e37_79b9),
        }
    }

    pub fn after(&mut self, delay: f32, cue: impl Into<Cue>) -> TimerId {
        self.timeline.after(delay, cue.into())
    }

    pub fn every(&mut self, interval: f32, cue: impl Into<Cue>) -> TimerId {
        self.timeline.every(interval, cue.into())
    }

    /// 丢弃所有补间、特效与未触发的提示，不触发任何完成回调
    pub fn clear(&mut self) {
        self.tweens.clear();
        self.particles.clear_all();
        self.timeline.clear();
    }

    /// 没有任何在途的补间、特效或提示
    pub fn is_quiet(&self) -> bool {
        self.tweens.is_empty() && self.particles.is_empty() && self.timeline.pending_count() == 0
    }
}
