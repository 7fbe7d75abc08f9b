//! # Session 模块
//!
//! 开包会话：唯一的编排者。
//!
//! 持有演出舞台、场景句柄、揭示状态、开场导演与拖拽控制器。宿主只需要：
//!
//! 1. 把意图交给 `handle`（或对应的 `request_*` 方法）
//! 2. 每帧调用一次 `tick(dt)`
//! 3. 通过只读观察者读取状态
//!
//! ## 帧顺序
//!
//! `tick` 先用原始 dt 推进时间线并派发所有到期提示，
//! 再用截断后的 dt 推进补间、特效和拖拽倾斜。

use tracing::{debug, info, trace};

use crate::animation::TweenEngine;
use crate::card::CARD_COUNT;
use crate::config::PackConfig;
use crate::director::{Director, DirectorProgress, DirectorStep};
use crate::drag::{DragController, DragRelease, TiltTarget};
use crate::effects::Effects;
use crate::input::{IgnoreReason, Intent, IntentOutcome};
use crate::particles::EffectSimulator;
use crate::reveal::{RevealPhase, RevealState};
use crate::scene::PackScene;
use crate::stage::{Cue, Stage};

/// 开包会话
#[derive(Debug)]
pub struct Session {
    stage: Stage,
    scene: PackScene,
    reveal: RevealState,
    director: Option<Director>,
    drag: DragController,
    /// 会话内累计的帧时间，驱动漂浮
    clock: f32,
    /// 每次重置加一
    epoch: u64,
}

impl Session {
    pub fn new(config: PackConfig, scene: PackScene, effects: Effects) -> Self {
        Self {
            stage: Stage::new(config, effects),
            scene,
            reveal: RevealState::new(),
            director: None,
            drag: DragController::new(),
            clock: 0.0,
            epoch: 0,
        }
    }

    // ========== 意图 ==========

    pub fn handle(&mut self, intent: Intent) -> IntentOutcome {
        match intent {
            Intent::Open => self.request_open(),
            Intent::Reveal => self.request_reveal(),
            Intent::Dismiss => self.request_dismiss(),
            Intent::DragStart => {
                self.drag_start();
                IntentOutcome::Accepted
            }
            Intent::DragMove { dx, dy } => {
                self.drag_move(dx, dy);
                IntentOutcome::Accepted
            }
            Intent::DragEnd => self.drag_end(),
        }
    }

    /// 开包，只在 `Idle` 生效
    pub fn request_open(&mut self) -> IntentOutcome {
        let outcome = self.reveal.begin_opening();
        if outcome.is_accepted() {
            info!(epoch = self.epoch, "开始开包");
            self.director = Some(Director::start(&mut self.stage, &self.scene));
        }
        outcome
    }

    /// 翻牌，已有翻开的牌时转为收牌
    ///
    /// 新翻开的牌正面朝向镜头，拖拽牌堆残留的倾斜和惯性在这里清零。
    pub fn request_reveal(&mut self) -> IntentOutcome {
        let outcome = self.reveal.request_reveal(&mut self.stage, &self.scene);
        if outcome == IntentOutcome::Accepted && self.reveal.focused().is_some() {
            self.drag.reset_tilt();
        }
        outcome
    }

    pub fn request_dismiss(&mut self) -> IntentOutcome {
        self.reveal.request_dismiss(&mut self.stage, &self.scene)
    }

    pub fn drag_start(&mut self) {
        self.drag.start();
    }

    pub fn drag_move(&mut self, dx: f32, dy: f32) {
        let target = self.tilt_target();
        self.drag.drag_move(dx, dy, target, &self.stage.config.drag);
    }

    /// 松手，翻开的牌上横扫等同于收牌
    pub fn drag_end(&mut self) -> IntentOutcome {
        let DragRelease { swipe, .. } = self.drag.end(&self.stage.config.drag);
        if !swipe {
            return IntentOutcome::Accepted;
        }
        if self.reveal.focused().is_none() {
            return IntentOutcome::Ignored(IgnoreReason::NothingFocused);
        }
        self.request_dismiss()
    }

    // ========== 帧 ==========

    /// 推进一帧
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.max(0.0);

        self.stage.timeline.advance(dt);
        while let Some(cue) = self.stage.timeline.pop_due() {
            self.dispatch(cue);
        }

        let dt = dt.min(self.stage.config.frame.max_dt);
        let finished = self.stage.tweens.tick(dt);
        if finished > 0 {
            trace!(finished, "补间完成");
        }
        self.stage.particles.tick(dt);
        self.clock += dt;
        self.float_revealed_cards();
        self.update_tilt();
    }

    fn dispatch(&mut self, cue: Cue) {
        match cue {
            Cue::Director(cue) => {
                let Some(director) = self.director.as_mut() else {
                    debug!(?cue, "没有开场导演，提示被丢弃");
                    return;
                };
                if director.on_cue(cue, &mut self.stage, &self.scene) == DirectorProgress::Settled {
                    self.reveal.finish_opening();
                    self.director = None;
                    info!(phase = ?self.reveal.phase(), "开场结束");
                }
            }
            Cue::Reveal(cue) => self.reveal.on_cue(cue, &mut self.stage, &self.scene),
        }
    }

    fn tilt_target(&self) -> Option<TiltTarget> {
        match self.reveal.phase() {
            RevealPhase::Idle => Some(TiltTarget::Pack),
            RevealPhase::Revealing => Some(match self.reveal.focused() {
                Some(card) => TiltTarget::Card(card),
                None => TiltTarget::Pile,
            }),
            RevealPhase::Opening | RevealPhase::Done => None,
        }
    }

    fn update_tilt(&mut self) {
        let Some(target) = self.tilt_target() else {
            return;
        };
        let node = match target {
            TiltTarget::Pack => &self.scene.pack.root,
            TiltTarget::Pile => &self.scene.pile,
            TiltTarget::Card(card) => {
                let Some(card) = self.scene.card(card) else {
                    return;
                };
                // 翻牌补间期间不抢旋转
                if self.reveal.is_animating() || self.stage.tweens.is_animating(&card.node) {
                    return;
                }
                &card.node
            }
        };
        self.drag.tick(target, node, &self.stage.config.drag);
    }

    /// 已翻开且可见的牌缓慢上下漂浮，补间驱动期间不写
    fn float_revealed_cards(&self) {
        let layout = &self.stage.config.layout;
        for (index, card) in self.scene.cards.iter().enumerate() {
            if !self.reveal.is_revealed(index)
                || !card.node.is_visible()
                || self.stage.tweens.is_animating(&card.node)
            {
                continue;
            }
            let mut position = card.node.position();
            position.y += (self.clock * layout.float_frequency + index as f32 * layout.float_phase)
                .sin()
                * layout.float_step;
            card.node.set_position(position);
        }
    }

    // ========== 重置 ==========

    /// 从任意阶段回到 `Idle`
    ///
    /// 丢弃所有补间、特效和未触发的提示（不调用完成回调），换上新场景。
    pub fn reset(&mut self, scene: PackScene) {
        self.stage.clear();
        self.scene = scene;
        self.reveal = RevealState::new();
        self.director = None;
        self.drag = DragController::new();
        self.clock = 0.0;
        self.epoch += 1;
        info!(epoch = self.epoch, "会话已重置");
    }

    // ========== 观察者 ==========

    pub fn phase(&self) -> RevealPhase {
        self.reveal.phase()
    }

    pub fn reveal_index(&self) -> usize {
        self.reveal.reveal_index()
    }

    /// 剩余未收走的牌数
    pub fn remaining(&self) -> usize {
        CARD_COUNT - self.reveal.reveal_index()
    }

    pub fn focused_card(&self) -> Option<usize> {
        self.reveal.focused()
    }

    pub fn is_animating(&self) -> bool {
        self.reveal.is_animating()
    }

    pub fn director_step(&self) -> Option<DirectorStep> {
        self.director.as_ref().map(Director::step)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn reveal_state(&self) -> &RevealState {
        &self.reveal
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn tweens(&self) -> &TweenEngine {
        &self.stage.tweens
    }

    pub fn particles(&self) -> &EffectSimulator {
        &self.stage.particles
    }

    pub fn scene(&self) -> &PackScene {
        &self.scene
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn config(&self) -> &PackConfig {
        &self.stage.config
    }
}
