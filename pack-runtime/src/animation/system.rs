//! # System 模块
//!
//! 补间引擎：持有所有活跃补间，每帧推进一次。
//!
//! ```rust,ignore
//! let mut engine = TweenEngine::new();
//! engine.schedule(node.clone(), TweenSpec::new(0.3).scalar("opacity", 0.0));
//! engine.tick(dt);
//! // 值直接写回对象，无需手动查询
//! ```
//!
//! ## 约定
//!
//! - 同一 (对象, 属性, 分量) 同时只有一个补间在写：新补间会从旧补间中摘走重叠的通道，
//!   被摘空的旧补间直接丢弃，不触发完成回调
//! - 一帧内先写完所有补间的值，再移除已完成的补间，最后按调度顺序调用完成回调
//! - 时长 `<= 0` 的补间不进入活跃集合：立即写入终值并同步触发完成回调

use std::rc::Rc;

use tracing::{debug, warn};

use super::traits::{Animatable, PropertyValue, write_channel};
use super::tween::{TargetValue, Track, Tween, TweenCallback, TweenId, TweenSpec};

/// 补间引擎
pub struct TweenEngine {
    tweens: Vec<Tween>,
    next_id: u64,
    /// 正在 tick（包括完成回调阶段）
    ticking: bool,
}

impl Default for TweenEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TweenEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenEngine")
            .field("tweens", &self.tweens.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl TweenEngine {
    pub fn new() -> Self {
        Self {
            tweens: Vec::new(),
            next_id: 1,
            ticking: false,
        }
    }

    fn next_tween_id(&mut self) -> TweenId {
        let id = TweenId(self.next_id);
        self.next_id += 1;
        id
    }

    // ========== 调度 ==========

    /// 调度补间
    ///
    /// # 返回
    /// - `Some(id)`: 补间已进入活跃集合
    /// - `None`: 时长非正或没有可用通道，终值已立即写入、完成回调已触发
    pub fn schedule<T: Animatable>(&mut self, target: Rc<T>, spec: TweenSpec) -> Option<TweenId> {
        let target: Rc<dyn Animatable> = target;
        let TweenSpec {
            duration,
            easing,
            targets,
            on_complete,
        } = spec;

        let tracks = capture_tracks(target.as_ref(), targets);
        self.release_channels(&target, &tracks);

        if duration <= 0.0 || tracks.is_empty() {
            for track in &tracks {
                write_channel(target.as_ref(), track.property_id, track.axis, track.end);
            }
            if let Some(callback) = on_complete {
                callback(self);
            }
            return None;
        }

        let id = self.next_tween_id();
        self.tweens.push(Tween {
            id,
            target,
            tracks,
            duration,
            elapsed: 0.0,
            easing,
            on_complete,
        });
        Some(id)
    }

    /// 从旧补间中摘走与新通道重叠的部分
    fn release_channels(&mut self, target: &Rc<dyn Animatable>, tracks: &[Track]) {
        if tracks.is_empty() {
            return;
        }

        self.tweens.retain_mut(|tween| {
            if !tween.same_target(target) {
                return true;
            }
            tween
                .tracks
                .retain(|old| !tracks.iter().any(|new| new.same_channel(old)));
            if tween.tracks.is_empty() {
                debug!(tween = tween.id.0, "补间的所有通道被新补间接管，丢弃");
                false
            } else {
                true
            }
        });
    }

    // ========== 更新 ==========

    /// 推进所有补间
    ///
    /// # 返回
    /// 本帧完成的补间数
    pub fn tick(&mut self, dt: f32) -> usize {
        if self.ticking {
            warn!("补间回调中重入 tick，已忽略");
            return 0;
        }
        self.ticking = true;

        let mut finished = Vec::new();
        for tween in &mut self.tweens {
            if tween.advance(dt) {
                finished.push(tween.id);
            }
        }

        let mut callbacks: Vec<TweenCallback> = Vec::new();
        if !finished.is_empty() {
            self.tweens.retain_mut(|tween| {
                if !finished.contains(&tween.id) {
                    return true;
                }
                if let Some(callback) = tween.on_complete.take() {
                    callbacks.push(callback);
                }
                false
            });
        }

        for callback in callbacks {
            callback(self);
        }

        self.ticking = false;
        finished.len()
    }

    /// 丢弃所有补间，不触发完成回调
    pub fn clear(&mut self) {
        self.tweens.clear();
    }

    // ========== 查询 ==========

    pub fn active_count(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn is_active(&self, id: TweenId) -> bool {
        self.tweens.iter().any(|t| t.id == id)
    }

    /// 对象是否仍有补间在驱动
    pub fn is_animating<T: Animatable>(&self, target: &Rc<T>) -> bool {
        let target: Rc<dyn Animatable> = target.clone();
        self.tweens.iter().any(|t| t.same_target(&target))
    }
}

/// 在注册时读取起始值
fn capture_tracks(
    target: &dyn Animatable,
    targets: Vec<(&'static str, TargetValue)>,
) -> Vec<Track> {
    let mut tracks = Vec::new();

    for (property_id, value) in targets {
        let Some(current) = target.get_property(property_id) else {
            warn!(property = property_id, "属性不存在，忽略该补间目标");
            continue;
        };

        match (current, value) {
            (PropertyValue::Scalar(start), TargetValue::Scalar(end)) => tracks.push(Track {
                property_id,
                axis: None,
                start,
                end,
            }),
            (PropertyValue::Vector(start), TargetValue::Axes(axes)) => {
                for (axis, end) in axes.iter() {
                    tracks.push(Track {
                        property_id,
                        axis: Some(axis),
                        start: axis.get(start),
                        end,
                    });
                }
            }
            _ => {
                warn!(property = property_id, "目标值与属性形状不匹配，忽略");
            }
        }
    }

    tracks
}

#[cfg(test)]
mod tests {
    use super::super::{Axes, EasingFunction};
    use super::*;
    use glam::Vec3;
    use std::cell::{Cell, RefCell};

    /// 测试用的可动画对象
    struct TestAnimatable {
        alpha: RefCell<f32>,
        offset: RefCell<Vec3>,
    }

    impl TestAnimatable {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                alpha: RefCell::new(1.0),
                offset: RefCell::new(Vec3::ZERO),
            })
        }

        fn alpha(&self) -> f32 {
            *self.alpha.borrow()
        }

        fn offset(&self) -> Vec3 {
            *self.offset.borrow()
        }
    }

    impl Animatable for TestAnimatable {
        fn get_property(&self, property_id: &str) -> Option<PropertyValue> {
            match property_id {
                "alpha" => Some(PropertyValue::Scalar(self.alpha())),
                "offset" => Some(PropertyValue::Vector(self.offset())),
                _ => None,
            }
        }

        fn set_property(&self, property_id: &str, value: PropertyValue) -> bool {
            match (property_id, value) {
                ("alpha", PropertyValue::Scalar(v)) => {
                    *self.alpha.borrow_mut() = v;
                    true
                }
                ("offset", PropertyValue::Vector(v)) => {
                    *self.offset.borrow_mut() = v;
                    true
                }
                _ => false,
            }
        }

        fn property_list(&self) -> &'static [&'static str] {
            &["alpha", "offset"]
        }
    }

    #[test]
    fn test_scalar_endpoints() {
        let mut engine = TweenEngine::new();
        let obj = TestAnimatable::new();

        engine.schedule(obj.clone(), TweenSpec::new(1.0).scalar("alpha", 0.0));
        // 注册时不写值
        assert_eq!(obj.alpha(), 1.0);

        engine.tick(0.5);
        assert!((obj.alpha() - 0.5).abs() < 1e-6);

        engine.tick(0.5);
        assert_eq!(obj.alpha(), 0.0);
        assert!(engine.is_empty());
    }

    #[test]
    fn test_vector_endpoints_with_overshoot() {
        let mut engine = TweenEngine::new();
        let obj = TestAnimatable::new();
        let end = Vec3::new(0.3, -1.7, 2.5);

        engine.schedule(
            obj.clone(),
            TweenSpec::new(0.5)
                .easing(EasingFunction::EaseInBack)
                .vector("offset", end),
        );

        engine.tick(0.1);
        // 回弹缓入先反向移动
        assert!(obj.offset().z < 0.0);

        engine.tick(0.4);
        assert_eq!(obj.offset(), end);
    }

    #[test]
    fn test_start_is_snapshot() {
        let mut engine = TweenEngine::new();
        let obj = TestAnimatable::new();

        engine.schedule(obj.clone(), TweenSpec::new(1.0).axes("offset", Axes::x(2.0)));
        // 外部改动不影响起始值
        *obj.offset.borrow_mut() = Vec3::new(100.0, 5.0, 0.0);

        engine.tick(0.5);
        assert!((obj.offset().x - 1.0).abs() < 1e-6);
        // 未指定的分量保持外部写入的值
        assert_eq!(obj.offset().y, 5.0);
    }

    #[test]
    fn test_distinct_fields_are_order_independent() {
        let run = |alpha_first: bool| {
            let mut engine = TweenEngine::new();
            let obj = TestAnimatable::new();
            let alpha = TweenSpec::new(0.7)
                .easing(EasingFunction::EaseOutQuart)
                .scalar("alpha", 0.0);
            let offset = TweenSpec::new(0.4)
                .easing(EasingFunction::EaseOutBack)
                .axes("offset", Axes::y(3.0));
            if alpha_first {
                engine.schedule(obj.clone(), alpha);
                engine.schedule(obj.clone(), offset);
            } else {
                engine.schedule(obj.clone(), offset);
                engine.schedule(obj.clone(), alpha);
            }
            let mut samples = Vec::new();
            for _ in 0..10 {
                engine.tick(0.1);
                samples.push((obj.alpha(), obj.offset()));
            }
            samples
        };

        assert_eq!(run(true), run(false));
    }

    #[test]
    fn test_non_positive_duration_snaps() {
        let mut engine = TweenEngine::new();
        let obj = TestAnimatable::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();

        let id = engine.schedule(
            obj.clone(),
            TweenSpec::new(0.0)
                .scalar("alpha", 0.25)
                .on_complete(move |_| flag.set(true)),
        );

        assert!(id.is_none());
        assert_eq!(obj.alpha(), 0.25);
        assert!(fired.get());
        assert_eq!(engine.active_count(), 0);
    }

    #[test]
    fn test_completion_fires_once_after_all_writes() {
        let mut engine = TweenEngine::new();
        let a = TestAnimatable::new();
        let b = TestAnimatable::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = seen.clone();
        let b_probe = b.clone();
        engine.schedule(
            a.clone(),
            TweenSpec::new(0.2)
                .scalar("alpha", 0.0)
                .on_complete(move |_| log.borrow_mut().push(b_probe.alpha())),
        );
        engine.schedule(b.clone(), TweenSpec::new(0.4).scalar("alpha", 0.0));

        engine.tick(0.2);
        engine.tick(0.2);
        engine.tick(0.2);

        // 回调看到的是 b 本帧已写入的值
        assert_eq!(seen.borrow().len(), 1);
        assert!((seen.borrow()[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_callback_can_schedule_but_not_tick() {
        let mut engine = TweenEngine::new();
        let obj = TestAnimatable::new();
        let probe = obj.clone();

        engine.schedule(
            obj.clone(),
            TweenSpec::new(0.1)
                .scalar("alpha", 0.0)
                .on_complete(move |engine| {
                    assert_eq!(engine.tick(1.0), 0);
                    engine.schedule(probe, TweenSpec::new(0.1).scalar("alpha", 1.0));
                }),
        );

        assert_eq!(engine.tick(0.1), 1);
        assert_eq!(engine.active_count(), 1);
        assert_eq!(obj.alpha(), 0.0);

        engine.tick(0.1);
        assert_eq!(obj.alpha(), 1.0);
    }

    #[test]
    fn test_overlap_takes_over_channel() {
        let mut engine = TweenEngine::new();
        let obj = TestAnimatable::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();

        let first = engine
            .schedule(
                obj.clone(),
                TweenSpec::new(1.0)
                    .axes("offset", Axes::x(10.0).with_y(10.0))
                    .on_complete(move |_| flag.set(true)),
            )
            .unwrap();
        engine.schedule(obj.clone(), TweenSpec::new(1.0).axes("offset", Axes::x(-1.0)));

        // 旧补间仍驱动 y
        assert!(engine.is_active(first));
        engine.tick(1.0);
        assert_eq!(obj.offset().x, -1.0);
        assert_eq!(obj.offset().y, 10.0);
        assert!(fired.get());

        // 完全覆盖时旧补间被丢弃且不回调
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let old = engine
            .schedule(
                obj.clone(),
                TweenSpec::new(1.0)
                    .scalar("alpha", 0.0)
                    .on_complete(move |_| flag.set(true)),
            )
            .unwrap();
        engine.schedule(obj.clone(), TweenSpec::new(1.0).scalar("alpha", 0.5));
        assert!(!engine.is_active(old));
        engine.tick(1.0);
        assert!(!fired.get());
        assert_eq!(obj.alpha(), 0.5);
    }

    #[test]
    fn test_unknown_property_is_skipped() {
        let mut engine = TweenEngine::new();
        let obj = TestAnimatable::new();

        let id = engine.schedule(
            obj.clone(),
            TweenSpec::new(1.0)
                .scalar("unknown", 1.0)
                .scalar("alpha", 0.0),
        );
        assert!(id.is_some());

        let none = engine.schedule(obj.clone(), TweenSpec::new(1.0).scalar("missing", 1.0));
        assert!(none.is_none());
        assert_eq!(engine.active_count(), 1);
    }

    #[test]
    fn test_clear_discards_without_callbacks() {
        let mut engine = TweenEngine::new();
        let obj = TestAnimatable::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();

        engine.schedule(
            obj.clone(),
            TweenSpec::new(1.0)
                .scalar("alpha", 0.0)
                .on_complete(move |_| flag.set(true)),
        );
        engine.tick(0.5);
        engine.clear();
        engine.tick(1.0);

        assert!(!fired.get());
        assert!(engine.is_empty());
        assert!(!engine.is_animating(&obj));
    }
}
