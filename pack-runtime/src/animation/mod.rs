//! # Animation 模块
//!
//! 通用补间系统，负责所有属性插值。
//!
//! ## 核心设计理念
//!
//! 补间系统只负责 **时间轴管理**：
//! - 知道某个属性从 A 到 B 需要在 duration 内变化
//! - 通过 `Animatable` 直接写回对象
//! - **不假设对象类型**，对象自己决定如何使用这些值
//!
//! ## 核心概念
//!
//! - `Animatable`: 可动画对象接口
//! - `TweenSpec`: 补间描述（目标值、时长、缓动、完成回调）
//! - `TweenEngine`: 补间引擎
//! - `EasingFunction`: 缓动函数

mod easing;
mod system;
mod traits;
mod tween;

pub use easing::EasingFunction;
pub use system::TweenEngine;
pub use traits::{Animatable, Axis, PropertyValue};
pub use tween::{Axes, TweenCallback, TweenId, TweenSpec};
