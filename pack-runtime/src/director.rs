//! # Director 模块
//!
//! 开场演出导演：把开包过程拆成显式的步骤状态机。
//!
//! 每一步执行完自己的命令后，挂起在唯一一个 `DirectorCue::Resume` 定时器上；
//! 步骤内部即发即忘的工作（错开的闪电、振动脉冲、延迟淡出、逐张出牌）
//! 也作为 `DirectorCue` 挂在同一条时间线上。
//!
//! ```text
//! Anticipation → Glow → Tension → Rip → TopSeparation
//!     → CardEmergence → BottomFall → Settle → Finished
//! ```
//!
//! 会话重置时时间线被清空，导演随之丢弃，不会有任何一步在重置后继续。

use std::f32::consts::PI;

use glam::Vec3;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::animation::{Axes, TweenSpec};
use crate::effects::palette;
use crate::particles::ParticleKind;
use crate::scene::{PackScene, fade_out_and_hide};
use crate::stage::Stage;
use crate::timeline::TimerId;

/// 开场步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DirectorStep {
    /// 拉近镜头、蓄能、开始振动
    Anticipation,
    /// 撕裂线亮起
    Glow,
    /// 振动加剧、闪电
    Tension,
    /// 撕开
    Rip,
    /// 上半部分飞走
    TopSeparation,
    /// 卡牌逐张落入牌堆
    CardEmergence,
    /// 下半部分掉落
    BottomFall,
    /// 收尾，进入揭示阶段
    Settle,
    Finished,
}

impl DirectorStep {
    fn next(self) -> Self {
        match self {
            Self::Anticipation => Self::Glow,
            Self::Glow => Self::Tension,
            Self::Tension => Self::Rip,
            Self::Rip => Self::TopSeparation,
            Self::TopSeparation => Self::CardEmergence,
            Self::CardEmergence => Self::BottomFall,
            Self::BottomFall => Self::Settle,
            Self::Settle | Self::Finished => Self::Finished,
        }
    }
}

/// 开场的定时提示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorCue {
    /// 进入下一步
    Resume,
    /// 振动脉冲
    Vibrate,
    Lightning { index: usize },
    TearBurst,
    FadeTopHalf,
    FadeBottomHalf,
    EmergeCard { index: usize },
}

/// 一次提示处理后的导演状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorProgress {
    Running,
    /// 开场结束，可以进入揭示阶段
    Settled,
}

const TENSION_BOLTS: usize = 3;
const SHOCKWAVE_DEBRIS: usize = 20;

/// 开场导演
#[derive(Debug, Clone)]
pub struct Director {
    step: DirectorStep,
    vibration: Option<TimerId>,
    amplitude: f32,
    amplitude_cap: f32,
}

impl Director {
    /// 执行第一步并返回导演
    pub fn start(stage: &mut Stage, scene: &PackScene) -> Self {
        let mut director = Self {
            step: DirectorStep::Anticipation,
            vibration: None,
            amplitude: 0.0,
            amplitude_cap: stage.config.timing.vibration_max,
        };
        director.run_step(stage, scene);
        director
    }

    pub fn step(&self) -> DirectorStep {
        self.step
    }

    pub fn is_vibrating(&self) -> bool {
        self.vibration.is_some()
    }

    pub fn on_cue(
        &mut self,
        cue: DirectorCue,
        stage: &mut Stage,
        scene: &PackScene,
    ) -> DirectorProgress {
        match cue {
            DirectorCue::Resume => {
                self.step = self.step.next();
                self.run_step(stage, scene);
            }
            DirectorCue::Vibrate => self.vibrate(stage, scene),
            DirectorCue::Lightning { index } => {
                let tear_y = stage.config.layout.tear_line_y;
                let start = Vec3::new(
                    (stage.rng.r#gen::<f32>() - 0.5) * 3.0,
                    tear_y + (stage.rng.r#gen::<f32>() - 0.5) * 2.0,
                    1.5,
                );
                let color = if index % 2 == 0 {
                    palette::CYAN
                } else {
                    palette::PINK
                };
                let end = tear_position(stage);
                stage.particles.spawn_lightning(start, end, color, 2);
                stage.effects.shake(0.04, 0.1);
            }
            DirectorCue::TearBurst => {
                let tear_y = stage.config.layout.tear_line_y;
                stage.particles.spawn_particles(
                    Vec3::new(1.0, tear_y + 0.5, 1.0),
                    25,
                    ParticleKind::Tear,
                );
            }
            DirectorCue::FadeTopHalf => {
                fade_out_and_hide(
                    &mut stage.tweens,
                    &scene.pack.top_half,
                    stage.config.timing.half_fade,
                );
            }
            DirectorCue::FadeBottomHalf => {
                fade_out_and_hide(
                    &mut stage.tweens,
                    &scene.pack.bottom_half,
                    stage.config.timing.half_fade,
                );
            }
            DirectorCue::EmergeCard { index } => emerge_card(index, stage, scene),
        }

        if self.step == DirectorStep::Finished {
            DirectorProgress::Settled
        } else {
            DirectorProgress::Running
        }
    }

    fn vibrate(&mut self, stage: &mut Stage, scene: &PackScene) {
        self.amplitude =
            (self.amplitude + stage.config.timing.vibration_step).min(self.amplitude_cap);
        let root = &scene.pack.root;

        let mut position = root.position();
        position.x = (stage.rng.r#gen::<f32>() - 0.5) * self.amplitude;
        root.set_position(position);

        let mut rotation = root.rotation();
        rotation.z = (stage.rng.r#gen::<f32>() - 0.5) * self.amplitude * 0.3;
        root.set_rotation(rotation);
    }

    fn stop_vibration(&mut self, stage: &mut Stage, scene: &PackScene) {
        if let Some(id) = self.vibration.take() {
            stage.timeline.cancel(id);
        }
        let root = &scene.pack.root;
        let mut position = root.position();
        position.x = 0.0;
        root.set_position(position);
        let mut rotation = root.rotation();
        rotation.z = 0.0;
        root.set_rotation(rotation);
    }

    fn run_step(&mut self, stage: &mut Stage, scene: &PackScene) {
        info!(step = ?self.step, "开场步骤");

        let timing = stage.config.timing.clone();
        let easing = stage.config.easing.clone();
        let layout = stage.config.layout.clone();
        let tear = tear_position(stage);
        let pack = &scene.pack;

        let resume_after = match self.step {
            DirectorStep::Anticipation => {
                stage.effects.zoom(layout.zoom_distance, layout.zoom_speed);
                stage.tweens.schedule(
                    pack.root.clone(),
                    TweenSpec::new(timing.pack_tilt)
                        .easing(easing.smooth)
                        .axes("rotation", Axes::x(0.1)),
                );

                stage.particles.create_orb(tear, palette::PINK);
                stage.particles.set_orb_intensity(0.5);
                stage.particles.spawn_spiral(tear, 40, palette::CYAN);

                self.vibration = Some(stage.every(timing.vibration_interval, DirectorCue::Vibrate));
                timing.anticipation
            }
            DirectorStep::Glow => {
                pack.tear_line.set_visible(true);
                pack.tear_line.set_opacity(0.0);
                stage.tweens.schedule(
                    pack.tear_line.clone(),
                    TweenSpec::new(timing.tear_line_fade)
                        .easing(easing.smooth)
                        .scalar("opacity", 1.0),
                );

                stage.effects.bloom(1.2, 0.4);
                stage.effects.vignette(0.6, 0.4);
                timing.glow
            }
            DirectorStep::Tension => {
                self.amplitude = timing.tension_vibration;
                self.amplitude_cap = timing.tension_vibration;
                stage.particles.set_orb_intensity(1.0);

                for index in 0..TENSION_BOLTS {
                    stage.after(
                        index as f32 * timing.lightning_stagger,
                        DirectorCue::Lightning { index },
                    );
                }

                stage.tweens.schedule(
                    pack.root.clone(),
                    TweenSpec::new(timing.tension_stretch)
                        .easing(easing.smooth)
                        .axes("scale", Axes::y(1.03)),
                );
                timing.tension
            }
            DirectorStep::Rip => {
                self.stop_vibration(stage, scene);
                stage.particles.remove_orb();

                stage.effects.flash(palette::PINK, 0.9, 4.0);
                stage.effects.shake(0.4, 0.6);
                stage.effects.chromatic_aberration(0.025, 0.5);
                stage.effects.bloom(3.0, 0.6);

                stage.particles.spawn_shockwave(tear, palette::WHITE);
                stage.particles.spawn_debris(tear, SHOCKWAVE_DEBRIS);
                stage.particles.spawn_particles(tear, 60, ParticleKind::Explosion);

                pack.tear_line.set_visible(false);
                stage.tweens.schedule(
                    pack.root.clone(),
                    TweenSpec::new(timing.rip_settle)
                        .easing(easing.out_back)
                        .vector("scale", Vec3::ONE),
                );
                0.0
            }
            DirectorStep::TopSeparation => {
                stage.tweens.schedule(
                    pack.top_half.clone(),
                    TweenSpec::new(timing.half_flight)
                        .easing(easing.out_back)
                        .vector("position", Vec3::new(2.5, 5.0, 3.0)),
                );
                stage.tweens.schedule(
                    pack.top_half.clone(),
                    TweenSpec::new(timing.half_flight)
                        .easing(easing.smooth)
                        .vector("rotation", Vec3::new(1.2, 0.5, -1.5)),
                );
                stage.after(timing.top_fade_delay, DirectorCue::FadeTopHalf);
                stage.after(timing.tear_burst_delay, DirectorCue::TearBurst);
                timing.top_separation
            }
            DirectorStep::CardEmergence => {
                stage.effects.shake(0.15, 0.25);

                scene.pile.set_visible(true);
                scene.pile.set_position(layout.pile_position);
                scene.pile.set_rotation(Vec3::new(0.0, PI, 0.0));

                // 先摆到撕口处再显示
                for card in &scene.cards {
                    card.node
                        .set_position(Vec3::new(0.0, layout.tear_line_y - 0.2, 0.1));
                    card.node.set_rotation(Vec3::new(0.0, PI, 0.0));
                    card.node.set_scale(Vec3::splat(layout.emerge_scale));
                }
                for index in 0..scene.cards.len() {
                    stage.after(
                        index as f32 * timing.card_stagger,
                        DirectorCue::EmergeCard { index },
                    );
                }
                timing.emergence_lead
            }
            DirectorStep::BottomFall => {
                stage.tweens.schedule(
                    pack.bottom_half.clone(),
                    TweenSpec::new(timing.half_flight)
                        .easing(easing.in_out)
                        .vector("position", Vec3::new(-1.0, -6.0, -3.0)),
                );
                stage.tweens.schedule(
                    pack.bottom_half.clone(),
                    TweenSpec::new(timing.half_flight)
                        .easing(easing.smooth)
                        .axes("rotation", Axes::x(-0.6).with_z(0.3)),
                );
                stage.after(timing.bottom_fade_delay, DirectorCue::FadeBottomHalf);
                timing.emergence_total(scene.cards.len())
            }
            DirectorStep::Settle => {
                pack.root.set_visible(false);
                stage.effects.reset_zoom(layout.reset_zoom_speed);
                self.step = DirectorStep::Finished;
                return;
            }
            DirectorStep::Finished => return,
        };

        stage.after(resume_after, DirectorCue::Resume);
    }
}

/// 撕裂线的世界位置
fn tear_position(stage: &Stage) -> Vec3 {
    Vec3::new(0.0, stage.config.layout.tear_line_y, 0.2)
}

fn emerge_card(index: usize, stage: &mut Stage, scene: &PackScene) {
    let Some(card) = scene.card(index) else {
        return;
    };
    let layout = &stage.config.layout;
    let node = &card.node;

    node.set_visible(true);
    node.attach_to(&scene.pile);
    node.set_position(Vec3::new(0.0, 0.0, index as f32 * layout.card_spacing));
    node.set_rotation(Vec3::ZERO);
    node.set_scale(Vec3::splat(layout.pile_card_scale));

    stage
        .particles
        .spawn_particles(Vec3::new(0.0, 0.0, 2.5), 5, ParticleKind::Sparkle);
    debug!(card = index, "卡牌落入牌堆");
}
