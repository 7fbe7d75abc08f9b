//! # Reveal 模块
//!
//! 揭示状态机：`Idle → Opening → Revealing → Done`。
//!
//! ## 规则
//!
//! - 只有 `Revealing` 接受翻牌/收牌，`animating` 期间一律忽略
//! - 已有翻开的牌时，翻牌请求转为收牌
//! - 牌堆顶是 `CARD_COUNT - 1 - reveal_index`，`reveal_index` 只在收牌成功时加一
//! - 牌用完后终场演出只排一次，期间 `animating` 保持置位，直到进入 `Done`

use std::f32::consts::PI;

use glam::Vec3;
use serde::Serialize;
use tracing::{debug, info};

use crate::animation::{Axes, TweenSpec};
use crate::card::{CARD_COUNT, Rarity};
use crate::effects::{Color, palette};
use crate::input::{IgnoreReason, IntentOutcome};
use crate::particles::ParticleKind;
use crate::scene::PackScene;
use crate::stage::Stage;

/// 会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealPhase {
    #[default]
    Idle,
    Opening,
    Revealing,
    Done,
}

/// 揭示流程的定时提示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealCue {
    /// 翻牌落定，播放稀有度特效
    FlipSettled { card: usize },
    /// 收牌途中的闪光尾迹
    SparkleTrail { card: usize },
    /// 收牌动画结束，隐藏卡牌
    HideCard { card: usize },
    /// 收牌流程结束
    DismissSettled,
    /// 终场
    Finale,
}

/// 稀有度对应的特效档位
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RarityTier {
    /// (颜色, 强度)，衰减速度固定
    pub flash: Option<(Color, f32)>,
    /// (强度, 时长)
    pub shake: Option<(f32, f32)>,
    pub burst: (ParticleKind, usize),
    pub shockwave: Option<Color>,
    /// 从左右上方各劈一道闪电
    pub lightning: Option<Color>,
    /// (颜色, 环数)
    pub energy_burst: Option<(Color, usize)>,
    pub bloom: Option<(f32, f32)>,
    pub chromatic: Option<(f32, f32)>,
}

const FLASH_DECAY: f32 = 3.0;

impl RarityTier {
    pub fn for_rarity(rarity: Rarity) -> Self {
        let quiet = Self {
            flash: None,
            shake: None,
            burst: (ParticleKind::Sparkle, 8),
            shockwave: None,
            lightning: None,
            energy_burst: None,
            bloom: None,
            chromatic: None,
        };

        match rarity {
            Rarity::Legendary | Rarity::Mythic => Self {
                flash: Some((palette::GOLD, 0.5)),
                shake: Some((0.2, 0.4)),
                burst: (ParticleKind::Explosion, 40),
                shockwave: Some(palette::GOLD),
                lightning: Some(palette::GOLD),
                bloom: Some((2.5, 0.6)),
                chromatic: Some((0.015, 0.5)),
                ..quiet
            },
            Rarity::Epic => Self {
                flash: Some((palette::PURPLE, 0.3)),
                shake: Some((0.12, 0.25)),
                burst: (ParticleKind::Sparkle, 25),
                energy_burst: Some((palette::PURPLE, 2)),
                bloom: Some((1.8, 0.4)),
                ..quiet
            },
            Rarity::Rare => Self {
                shake: Some((0.06, 0.15)),
                burst: (ParticleKind::Sparkle, 15),
                bloom: Some((1.3, 0.3)),
                ..quiet
            },
            Rarity::Common => quiet,
        }
    }

    /// 在 `position` 处播放
    pub fn play(&self, stage: &mut Stage, position: Vec3) {
        if let Some((color, intensity)) = self.flash {
            stage.effects.flash(color, intensity, FLASH_DECAY);
        }
        if let Some((intensity, duration)) = self.shake {
            stage.effects.shake(intensity, duration);
        }
        let (kind, count) = self.burst;
        stage.particles.spawn_particles(position, count, kind);
        if let Some(color) = self.shockwave {
            stage.particles.spawn_shockwave(position, color);
        }
        if let Some(color) = self.lightning {
            for x in [-2.0, 2.0] {
                stage
                    .particles
                    .spawn_lightning(Vec3::new(x, 2.0, 2.0), position, color, 2);
            }
        }
        if let Some((color, rings)) = self.energy_burst {
            stage.particles.spawn_energy_burst(position, color, rings);
        }
        if let Some((intensity, duration)) = self.bloom {
            stage.effects.bloom(intensity, duration);
        }
        if let Some((intensity, duration)) = self.chromatic {
            stage.effects.chromatic_aberration(intensity, duration);
        }
    }
}

/// 揭示状态
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RevealState {
    phase: RevealPhase,
    /// 已收走的牌数
    reveal_index: usize,
    focused: Option<usize>,
    revealed: [bool; CARD_COUNT],
    animating: bool,
    finale_scheduled: bool,
}

impl RevealState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn reveal_index(&self) -> usize {
        self.reveal_index
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn is_revealed(&self, card: usize) -> bool {
        self.revealed.get(card).copied().unwrap_or(false)
    }

    /// 牌堆顶的下标，牌已用完时为 `None`
    pub fn top_index(&self) -> Option<usize> {
        CARD_COUNT.checked_sub(self.reveal_index + 1)
    }

    /// `Idle → Opening`
    pub(crate) fn begin_opening(&mut self) -> IntentOutcome {
        if self.phase != RevealPhase::Idle {
            debug!(phase = ?self.phase, "开包请求被忽略");
            return IntentOutcome::Ignored(IgnoreReason::WrongPhase);
        }
        self.phase = RevealPhase::Opening;
        IntentOutcome::Accepted
    }

    /// `Opening → Revealing`，由开场导演在收尾时调用
    pub(crate) fn finish_opening(&mut self) {
        if self.phase == RevealPhase::Opening {
            self.phase = RevealPhase::Revealing;
        }
    }

    fn guard(&self) -> Option<IgnoreReason> {
        if self.phase != RevealPhase::Revealing {
            Some(IgnoreReason::WrongPhase)
        } else if self.animating {
            Some(IgnoreReason::Busy)
        } else {
            None
        }
    }

    /// 翻开牌堆顶的牌
    pub fn request_reveal(&mut self, stage: &mut Stage, scene: &PackScene) -> IntentOutcome {
        if let Some(reason) = self.guard() {
            debug!(?reason, "翻牌请求被忽略");
            return IntentOutcome::Ignored(reason);
        }

        if self.focused.is_some() {
            return match self.request_dismiss(stage, scene) {
                IntentOutcome::Accepted => IntentOutcome::Redirected,
                other => other,
            };
        }

        let Some(top) = self.top_index() else {
            self.schedule_finale(stage);
            return IntentOutcome::Accepted;
        };

        let timing = &stage.config.timing;
        let layout = &stage.config.layout;
        let easing = &stage.config.easing;
        let card_flip = timing.card_flip;
        let card_scale = timing.card_scale;
        let rarity_delay = timing.rarity_delay;
        let focus_position = layout.focus_position;
        let focus_scale = layout.focus_scale;
        let out_back = easing.out_back;

        self.animating = true;

        // 从牌堆取下，保持世界位置，背面朝向镜头
        let node = &scene.cards[top].node;
        node.detach_keep_world_position();
        node.set_rotation(Vec3::new(0.0, PI, 0.0));

        stage.tweens.schedule(
            node.clone(),
            TweenSpec::new(card_flip)
                .easing(out_back)
                .vector("rotation", Vec3::ZERO)
                .vector("position", focus_position),
        );
        stage.tweens.schedule(
            node.clone(),
            TweenSpec::new(card_scale)
                .easing(out_back)
                .vector("scale", Vec3::splat(focus_scale)),
        );

        self.focused = Some(top);
        self.revealed[top] = true;
        stage.after(rarity_delay, RevealCue::FlipSettled { card: top });

        info!(card = top, rarity = ?scene.cards[top].data.rarity, "翻开卡牌");
        IntentOutcome::Accepted
    }

    /// 收走当前翻开的牌
    pub fn request_dismiss(&mut self, stage: &mut Stage, scene: &PackScene) -> IntentOutcome {
        if let Some(reason) = self.guard() {
            debug!(?reason, "收牌请求被忽略");
            return IntentOutcome::Ignored(reason);
        }
        let Some(card) = self.focused else {
            return IntentOutcome::Ignored(IgnoreReason::NothingFocused);
        };

        let timing = stage.config.timing.clone();
        let easing = stage.config.easing.clone();

        self.animating = true;
        self.focused = None;
        self.reveal_index += 1;

        let node = &scene.cards[card].node;
        let position = node.position();
        stage.tweens.schedule(
            node.clone(),
            TweenSpec::new(timing.card_dismiss)
                .easing(easing.in_back)
                .vector(
                    "position",
                    Vec3::new(4.0, position.y + 0.5, position.z - 1.0),
                ),
        );
        stage.tweens.schedule(
            node.clone(),
            TweenSpec::new(timing.card_dismiss)
                .easing(easing.smooth)
                .axes("rotation", Axes::y(-0.5).with_z(-0.2)),
        );
        stage.tweens.schedule(
            node.clone(),
            TweenSpec::new(timing.dismiss_scale)
                .easing(easing.smooth)
                .vector("scale", Vec3::splat(0.8)),
        );

        stage.after(timing.sparkle_trail_delay, RevealCue::SparkleTrail { card });
        stage.after(timing.card_dismiss, RevealCue::HideCard { card });
        stage.after(timing.dismiss_settle, RevealCue::DismissSettled);

        info!(card, reveal_index = self.reveal_index, "收走卡牌");
        IntentOutcome::Accepted
    }

    /// 处理揭示流程的定时提示
    pub fn on_cue(&mut self, cue: RevealCue, stage: &mut Stage, scene: &PackScene) {
        match cue {
            RevealCue::FlipSettled { card } => {
                let Some(card_ref) = scene.card(card) else {
                    return;
                };
                let tier = RarityTier::for_rarity(card_ref.data.rarity);
                debug!(card, rarity = ?card_ref.data.rarity, "稀有度特效");
                tier.play(stage, card_ref.node.position());
                self.animating = false;
            }
            RevealCue::SparkleTrail { card } => {
                if let Some(card_ref) = scene.card(card) {
                    stage
                        .particles
                        .spawn_particles(card_ref.node.position(), 8, ParticleKind::Sparkle);
                }
            }
            RevealCue::HideCard { card } => {
                if let Some(card_ref) = scene.card(card) {
                    card_ref.node.set_visible(false);
                }
            }
            RevealCue::DismissSettled => {
                self.animating = false;
                if self.top_index().is_none() {
                    self.schedule_finale(stage);
                }
            }
            RevealCue::Finale => {
                let center = Vec3::new(0.0, 0.0, 3.0);
                stage
                    .particles
                    .spawn_particles(center, 50, ParticleKind::Explosion);
                stage.particles.spawn_shockwave(center, palette::ORANGE);
                stage.effects.flash(palette::ORANGE, 0.3, FLASH_DECAY);
                stage.effects.shake(0.15, 0.3);

                self.phase = RevealPhase::Done;
                self.animating = false;
                info!("全部卡牌揭示完毕");
            }
        }
    }

    /// 终场只排一次
    fn schedule_finale(&mut self, stage: &mut Stage) {
        if self.finale_scheduled {
            return;
        }
        self.finale_scheduled = true;
        self.animating = true;
        stage.after(stage.config.timing.finale_delay, RevealCue::Finale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::default_deck;
    use crate::config::PackConfig;
    use crate::effects::{EffectRecorder, Effects};
    use crate::stage::Cue;

    fn revealing() -> (RevealState, Stage, PackScene, EffectRecorder) {
        let recorder = EffectRecorder::new();
        let stage = Stage::new(PackConfig::default(), Effects::recording(&recorder));
        let scene = PackScene::standard(default_deck());
        for card in &scene.cards {
            card.node.attach_to(&scene.pile);
        }
        let mut state = RevealState::new();
        state.begin_opening();
        state.finish_opening();
        (state, stage, scene, recorder)
    }

    /// 推进时间线并派发揭示提示
    fn run(state: &mut RevealState, stage: &mut Stage, scene: &PackScene, seconds: f32) {
        stage.timeline.advance(seconds);
        while let Some(cue) = stage.timeline.pop_due() {
            if let Cue::Reveal(cue) = cue {
                state.on_cue(cue, stage, scene);
            }
        }
        stage.tweens.tick(seconds);
    }

    #[test]
    fn test_phase_guards() {
        let mut stage = Stage::new(PackConfig::default(), Effects::headless());
        let scene = PackScene::standard(default_deck());
        let mut state = RevealState::new();

        assert_eq!(
            state.request_reveal(&mut stage, &scene),
            IntentOutcome::Ignored(IgnoreReason::WrongPhase)
        );
        assert_eq!(state.begin_opening(), IntentOutcome::Accepted);
        assert_eq!(
            state.begin_opening(),
            IntentOutcome::Ignored(IgnoreReason::WrongPhase)
        );
        assert_eq!(state.phase(), RevealPhase::Opening);
    }

    #[test]
    fn test_reveal_takes_top_card() {
        let (mut state, mut stage, scene, _) = revealing();

        assert_eq!(state.request_reveal(&mut stage, &scene), IntentOutcome::Accepted);
        assert_eq!(state.focused(), Some(4));
        assert!(state.is_revealed(4));
        assert!(scene.cards[4].node.parent().is_none());

        // 动画期间忽略
        assert_eq!(
            state.request_reveal(&mut stage, &scene),
            IntentOutcome::Ignored(IgnoreReason::Busy)
        );

        run(&mut state, &mut stage, &scene, 0.5);
        assert!(!state.is_animating());
        assert_eq!(
            scene.cards[4].node.position(),
            stage.config.layout.focus_position
        );
        assert_eq!(scene.cards[4].node.rotation(), Vec3::ZERO);
    }

    #[test]
    fn test_dismiss_without_focus_is_ignored() {
        let (mut state, mut stage, scene, _) = revealing();
        assert_eq!(
            state.request_dismiss(&mut stage, &scene),
            IntentOutcome::Ignored(IgnoreReason::NothingFocused)
        );
        assert_eq!(state.reveal_index(), 0);
    }

    #[test]
    fn test_redirect_matches_direct_dismiss() {
        let outcome = |redirect: bool| {
            let (mut state, mut stage, scene, _) = revealing();
            state.request_reveal(&mut stage, &scene);
            run(&mut state, &mut stage, &scene, 0.5);

            let outcome = if redirect {
                state.request_reveal(&mut stage, &scene)
            } else {
                state.request_dismiss(&mut stage, &scene)
            };
            run(&mut state, &mut stage, &scene, 0.5);
            (
                outcome.is_accepted(),
                state.reveal_index(),
                state.focused(),
                state.is_animating(),
                scene.cards[4].node.is_visible(),
            )
        };

        let redirected = outcome(true);
        assert_eq!(redirected, outcome(false));
        assert_eq!(redirected, (true, 1, None, false, false));
    }

    #[test]
    fn test_rarity_tiers() {
        let legendary = RarityTier::for_rarity(Rarity::Legendary);
        assert_eq!(legendary, RarityTier::for_rarity(Rarity::Mythic));
        assert!(legendary.lightning.is_some() && legendary.shockwave.is_some());
        assert_eq!(legendary.burst, (ParticleKind::Explosion, 40));

        let common = RarityTier::for_rarity(Rarity::Common);
        assert!(common.flash.is_none() && common.shake.is_none() && common.bloom.is_none());
        assert_eq!(common.burst, (ParticleKind::Sparkle, 8));

        let rare = RarityTier::for_rarity(Rarity::Rare);
        assert!(rare.flash.is_none() && rare.shake.is_some());
        assert!(RarityTier::for_rarity(Rarity::Epic).energy_burst.is_some());
    }

    #[test]
    fn test_finale_fires_once() {
        let (mut state, mut stage, scene, recorder) = revealing();

        for _ in 0..CARD_COUNT {
            assert!(state.request_reveal(&mut stage, &scene).is_accepted());
            run(&mut state, &mut stage, &scene, 0.5);
            assert!(state.request_dismiss(&mut stage, &scene).is_accepted());
            run(&mut state, &mut stage, &scene, 0.5);
        }
        // 最后一次收牌结束后终场已排队，此时仍算动画中
        assert_eq!(state.reveal_index(), CARD_COUNT);
        assert_eq!(state.top_index(), None);
        assert!(state.is_animating());
        assert_eq!(
            state.request_reveal(&mut stage, &scene),
            IntentOutcome::Ignored(IgnoreReason::Busy)
        );

        recorder.clear();
        run(&mut state, &mut stage, &scene, 1.0);
        assert_eq!(state.phase(), RevealPhase::Done);
        assert_eq!(recorder.count("flash"), 1);

        run(&mut state, &mut stage, &scene, 1.0);
        assert_eq!(recorder.count("flash"), 1);
        assert_eq!(
            state.request_reveal(&mut stage, &scene),
            IntentOutcome::Ignored(IgnoreReason::WrongPhase)
        );
    }
}
