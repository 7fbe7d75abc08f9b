//! # Tween 模块
//!
//! 单个补间实例及其构建描述。
//!
//! 一个补间可以同时驱动同一对象的多个通道。向量属性按分量拆成独立通道，
//! 未指定的分量不会被写入，因此两个补间可以分别驱动 `rotation.x` 和 `rotation.y`。

use std::rc::Rc;

use glam::Vec3;

use super::traits::{Animatable, Axis, write_channel};
use super::{EasingFunction, TweenEngine};

/// 补间 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(pub u64);

/// 完成回调
///
/// 回调可以调度新的补间，但不能在回调中调用 `tick`。
pub type TweenCallback = Box<dyn FnOnce(&mut TweenEngine)>;

/// 向量属性的分量目标
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Axes {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
}

impl Axes {
    /// 三个分量都有目标值
    pub fn all(v: Vec3) -> Self {
        Self {
            x: Some(v.x),
            y: Some(v.y),
            z: Some(v.z),
        }
    }

    pub fn x(value: f32) -> Self {
        Self::default().with_x(value)
    }

    pub fn y(value: f32) -> Self {
        Self::default().with_y(value)
    }

    pub fn z(value: f32) -> Self {
        Self::default().with_z(value)
    }

    pub fn with_x(mut self, value: f32) -> Self {
        self.x = Some(value);
        self
    }

    pub fn with_y(mut self, value: f32) -> Self {
        self.y = Some(value);
        self
    }

    pub fn with_z(mut self, value: f32) -> Self {
        self.z = Some(value);
        self
    }

    /// 按 x/y/z 顺序列出有目标值的分量
    pub fn iter(&self) -> impl Iterator<Item = (Axis, f32)> {
        [(Axis::X, self.x), (Axis::Y, self.y), (Axis::Z, self.z)]
            .into_iter()
            .filter_map(|(axis, value)| value.map(|v| (axis, v)))
    }
}

/// 单个属性的目标值
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum TargetValue {
    Scalar(f32),
    Axes(Axes),
}

/// 补间描述
///
/// ```rust,ignore
/// engine.schedule(
///     card.clone(),
///     TweenSpec::new(0.5)
///         .easing(EasingFunction::EaseOutBack)
///         .vector("position", Vec3::new(0.0, 0.0, 2.5))
///         .axes("rotation", Axes::y(0.0))
///         .on_complete(|_| { /* ... */ }),
/// );
/// ```
pub struct TweenSpec {
    pub(crate) duration: f32,
    pub(crate) easing: EasingFunction,
    pub(crate) targets: Vec<(&'static str, TargetValue)>,
    pub(crate) on_complete: Option<TweenCallback>,
}

impl TweenSpec {
    /// 创建描述，默认线性缓动
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            easing: EasingFunction::Linear,
            targets: Vec::new(),
            on_complete: None,
        }
    }

    pub fn easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// 标量属性目标
    pub fn scalar(mut self, property_id: &'static str, value: f32) -> Self {
        self.targets.push((property_id, TargetValue::Scalar(value)));
        self
    }

    /// 向量属性的部分分量目标
    pub fn axes(mut self, property_id: &'static str, axes: Axes) -> Self {
        self.targets.push((property_id, TargetValue::Axes(axes)));
        self
    }

    /// 向量属性的完整目标
    pub fn vector(self, property_id: &'static str, value: Vec3) -> Self {
        self.axes(property_id, Axes::all(value))
    }

    pub fn on_complete(mut self, callback: impl FnOnce(&mut TweenEngine) + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}

impl std::fmt::Debug for TweenSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenSpec")
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("targets", &self.targets)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// 单个标量通道
///
/// 起始值在注册时拷贝一次，之后不再重新采样。
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Track {
    pub property_id: &'static str,
    pub axis: Option<Axis>,
    pub start: f32,
    pub end: f32,
}

impl Track {
    pub fn same_channel(&self, other: &Track) -> bool {
        self.property_id == other.property_id && self.axis == other.axis
    }
}

/// 活跃补间
pub(crate) struct Tween {
    pub id: TweenId,
    pub target: Rc<dyn Animatable>,
    pub tracks: Vec<Track>,
    pub duration: f32,
    pub elapsed: f32,
    pub easing: EasingFunction,
    pub on_complete: Option<TweenCallback>,
}

impl Tween {
    /// 推进时间并写回，返回是否已完成
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        let progress = (self.elapsed / self.duration).min(1.0);

        if progress >= 1.0 {
            // 终点直接写目标值，避免浮点误差
            self.write_end();
            return true;
        }

        let eased = self.easing.apply(progress);
        for track in &self.tracks {
            let value = track.start + (track.end - track.start) * eased;
            write_channel(self.target.as_ref(), track.property_id, track.axis, value);
        }
        false
    }

    pub fn write_end(&self) {
        for track in &self.tracks {
            write_channel(
                self.target.as_ref(),
                track.property_id,
                track.axis,
                track.end,
            );
        }
    }

    /// 是否驱动同一对象
    pub fn same_target(&self, target: &Rc<dyn Animatable>) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.target), Rc::as_ptr(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_iter_order() {
        let axes = Axes::z(3.0).with_x(1.0);
        let listed: Vec<_> = axes.iter().collect();
        assert_eq!(listed, vec![(Axis::X, 1.0), (Axis::Z, 3.0)]);
    }

    #[test]
    fn test_spec_builder() {
        let spec = TweenSpec::new(0.5)
            .easing(EasingFunction::EaseOutBack)
            .scalar("opacity", 0.0)
            .vector("position", Vec3::ONE)
            .on_complete(|_| {});

        assert_eq!(spec.duration(), 0.5);
        assert_eq!(spec.targets.len(), 2);
        assert!(spec.on_complete.is_some());
        assert_eq!(
            spec.targets[1],
            ("position", TargetValue::Axes(Axes::all(Vec3::ONE)))
        );
    }
}
