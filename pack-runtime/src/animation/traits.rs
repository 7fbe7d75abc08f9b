//! # Traits 模块
//!
//! 补间系统与场景对象之间的接口。
//!
//! ## 核心概念
//!
//! - `PropertyValue`: 属性值，标量或三维向量
//! - `Axis`: 向量属性的分量
//! - `Animatable`: 可动画对象接口

use glam::Vec3;
use serde::Serialize;

/// 属性值
///
/// 向量属性（位置、旋转、缩放）以 `Vec3` 整体读写，补间系统按分量插值。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Scalar(f32),
    Vector(Vec3),
}

impl PropertyValue {
    pub fn as_vector(&self) -> Option<Vec3> {
        match self {
            Self::Vector(v) => Some(*v),
            Self::Scalar(_) => None,
        }
    }
}

/// 向量分量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// 读取分量
    pub fn get(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    /// 写入分量，其余分量保持不变
    pub fn set(self, v: &mut Vec3, value: f32) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
            Axis::Z => v.z = value,
        }
    }
}

/// 可动画对象接口
///
/// 对象声明自己有哪些属性可以被补间。补间系统在注册时读取一次起始值，
/// 之后每帧只写不读（向量分量写入除外：需要先读出当前向量，只替换目标分量）。
///
/// 实现方通常用 `RefCell` 提供内部可变性，因此 `set_property` 只需要 `&self`。
pub trait Animatable: 'static {
    /// 获取属性的当前值
    ///
    /// # 返回
    /// - `Some(value)`: 属性存在
    /// - `None`: 属性不存在
    fn get_property(&self, property_id: &str) -> Option<PropertyValue>;

    /// 设置属性的新值
    ///
    /// # 返回
    /// - `true`: 设置成功
    /// - `false`: 属性不存在或值的形状不匹配
    fn set_property(&self, property_id: &str, value: PropertyValue) -> bool;

    /// 获取所有可动画属性的列表
    ///
    /// 用于调试和验证。
    fn property_list(&self) -> &'static [&'static str];
}

/// 写入一个标量通道
pub(crate) fn write_channel(
    target: &dyn Animatable,
    property_id: &str,
    axis: Option<Axis>,
    value: f32,
) -> bool {
    match axis {
        None => target.set_property(property_id, PropertyValue::Scalar(value)),
        Some(axis) => {
            let Some(mut current) = target
                .get_property(property_id)
                .and_then(|v| v.as_vector())
            else {
                return false;
            };
            axis.set(&mut current, value);
            target.set_property(property_id, PropertyValue::Vector(current))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct TestAnimatable {
        alpha: RefCell<f32>,
        offset: RefCell<Vec3>,
    }

    impl TestAnimatable {
        fn new() -> Self {
            Self {
                alpha: RefCell::new(1.0),
                offset: RefCell::new(Vec3::new(1.0, 2.0, 3.0)),
            }
        }
    }

    impl Animatable for TestAnimatable {
        fn get_property(&self, property_id: &str) -> Option<PropertyValue> {
            match property_id {
                "alpha" => Some(PropertyValue::Scalar(*self.alpha.borrow())),
                "offset" => Some(PropertyValue::Vector(*self.offset.borrow())),
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
    fn test_axis_write_keeps_other_components() {
        let obj = TestAnimatable::new();
        assert!(write_channel(&obj, "offset", Some(Axis::Z), 9.0));
        assert_eq!(*obj.offset.borrow(), Vec3::new(1.0, 2.0, 9.0));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let obj = TestAnimatable::new();
        assert!(!obj.set_property("alpha", PropertyValue::Vector(Vec3::ONE)));
        assert!(!write_channel(&obj, "alpha", Some(Axis::X), 0.0));
        assert_eq!(obj.property_list(), &["alpha", "offset"]);
    }
}
