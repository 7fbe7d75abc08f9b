//! # Scene 模块
//!
//! 场景对象句柄与卡包/卡牌的场景布局。
//!
//! 核心只关心对象的变换（位置、欧拉旋转、缩放）、可见性与材质透明度，
//! 网格、材质和纹理由外部渲染层负责。场景对象以 `Rc<SceneNode>` 共享，
//! 渲染层每帧读取同一份状态。

use std::cell::RefCell;
use std::rc::Rc;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::animation::{Animatable, PropertyValue, TweenEngine, TweenSpec};
use crate::card::{CARD_COUNT, CardData};

/// 场景对象句柄
pub type SceneObject = Rc<SceneNode>;

/// 对象状态
#[derive(Debug, Clone)]
pub struct ObjectState {
    pub position: Vec3,
    /// 欧拉角（XYZ 顺序，弧度）
    pub rotation: Vec3,
    pub scale: Vec3,
    pub visible: bool,
    /// 材质透明度
    pub opacity: f32,
    pub parent: Option<SceneObject>,
}

impl Default for ObjectState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            visible: true,
            opacity: 1.0,
            parent: None,
        }
    }
}

/// 场景节点
#[derive(Debug)]
pub struct SceneNode {
    name: String,
    state: RefCell<ObjectState>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> SceneObject {
        Rc::new(Self {
            name: name.into(),
            state: RefCell::new(ObjectState::default()),
        })
    }

    /// 以给定初始状态创建
    pub fn with_state(name: impl Into<String>, state: ObjectState) -> SceneObject {
        Rc::new(Self {
            name: name.into(),
            state: RefCell::new(state),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 状态快照
    pub fn snapshot(&self) -> ObjectState {
        self.state.borrow().clone()
    }

    pub fn position(&self) -> Vec3 {
        self.state.borrow().position
    }

    pub fn rotation(&self) -> Vec3 {
        self.state.borrow().rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.state.borrow().scale
    }

    pub fn opacity(&self) -> f32 {
        self.state.borrow().opacity
    }

    pub fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    pub fn parent(&self) -> Option<SceneObject> {
        self.state.borrow().parent.clone()
    }

    pub fn set_position(&self, position: Vec3) {
        self.state.borrow_mut().position = position;
    }

    pub fn set_rotation(&self, rotation: Vec3) {
        self.state.borrow_mut().rotation = rotation;
    }

    pub fn set_scale(&self, scale: Vec3) {
        self.state.borrow_mut().scale = scale;
    }

    pub fn set_opacity(&self, opacity: f32) {
        self.state.borrow_mut().opacity = opacity;
    }

    pub fn set_visible(&self, visible: bool) {
        self.state.borrow_mut().visible = visible;
    }

    /// 挂到父节点下，局部变换保持不变
    pub fn attach_to(&self, parent: &SceneObject) {
        self.state.borrow_mut().parent = Some(parent.clone());
    }

    /// 从父节点上取下，保持世界位置不变
    ///
    /// 旋转和缩放不做换算，调用方随后会重新设定它们。
    pub fn detach_keep_world_position(&self) {
        let world = self.world_position();
        let mut state = self.state.borrow_mut();
        state.parent = None;
        state.position = world;
    }

    /// 局部变换矩阵
    pub fn local_matrix(&self) -> Mat4 {
        let state = self.state.borrow();
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            state.rotation.x,
            state.rotation.y,
            state.rotation.z,
        );
        Mat4::from_scale_rotation_translation(state.scale, rotation, state.position)
    }

    /// 世界变换矩阵
    pub fn world_matrix(&self) -> Mat4 {
        match self.parent() {
            Some(parent) => parent.world_matrix() * self.local_matrix(),
            None => self.local_matrix(),
        }
    }

    pub fn world_position(&self) -> Vec3 {
        let position = self.position();
        match self.parent() {
            Some(parent) => parent.world_matrix().transform_point3(position),
            None => position,
        }
    }
}

impl Animatable for SceneNode {
    fn get_property(&self, property_id: &str) -> Option<PropertyValue> {
        let state = self.state.borrow();
        match property_id {
            "position" => Some(PropertyValue::Vector(state.position)),
            "rotation" => Some(PropertyValue::Vector(state.rotation)),
            "scale" => Some(PropertyValue::Vector(state.scale)),
            "opacity" => Some(PropertyValue::Scalar(state.opacity)),
            _ => None,
        }
    }

    fn set_property(&self, property_id: &str, value: PropertyValue) -> bool {
        let mut state = self.state.borrow_mut();
        match (property_id, value) {
            ("position", PropertyValue::Vector(v)) => state.position = v,
            ("rotation", PropertyValue::Vector(v)) => state.rotation = v,
            ("scale", PropertyValue::Vector(v)) => state.scale = v,
            ("opacity", PropertyValue::Scalar(v)) => state.opacity = v,
            _ => return false,
        }
        true
    }

    fn property_list(&self) -> &'static [&'static str] {
        &["position", "rotation", "scale", "opacity"]
    }
}

/// 透明度线性降到 0，结束后隐藏对象
///
/// 卡包上下两半共用这一个淡出。
pub fn fade_out_and_hide(tweens: &mut TweenEngine, object: &SceneObject, duration: f32) {
    let hidden = object.clone();
    tweens.schedule(
        object.clone(),
        TweenSpec::new(duration)
            .scalar("opacity", 0.0)
            .on_complete(move |_| hidden.set_visible(false)),
    );
}

/// 卡包各部分
#[derive(Debug, Clone)]
pub struct PackParts {
    pub root: SceneObject,
    /// 撕掉的上半部分
    pub top_half: SceneObject,
    /// 留下的下半部分
    pub bottom_half: SceneObject,
    /// 撕裂线发光条
    pub tear_line: SceneObject,
}

/// 卡牌：场景节点加上牌面数据
#[derive(Debug, Clone)]
pub struct Card {
    pub node: SceneObject,
    pub data: CardData,
}

/// 一次开包用到的全部场景对象
#[derive(Debug, Clone)]
pub struct PackScene {
    pub pack: PackParts,
    /// 牌堆顺序：下标越大越靠上，先被揭示
    pub cards: [Card; CARD_COUNT],
    pub pile: SceneObject,
}

impl PackScene {
    /// 标准布局
    ///
    /// 卡包立在原点，撕裂线初始隐藏，卡牌和牌堆在演出中才出现。
    pub fn standard(deck: [CardData; CARD_COUNT]) -> Self {
        let root = SceneNode::new("pack");

        let top_half = SceneNode::new("pack.top");
        top_half.attach_to(&root);
        let bottom_half = SceneNode::new("pack.bottom");
        bottom_half.attach_to(&root);

        let tear_line = SceneNode::with_state(
            "pack.tear_line",
            ObjectState {
                visible: false,
                opacity: 0.0,
                ..ObjectState::default()
            },
        );
        tear_line.attach_to(&root);

        let pile = SceneNode::with_state(
            "pile",
            ObjectState {
                visible: false,
                ..ObjectState::default()
            },
        );

        let cards = deck.map(|data| Card {
            node: SceneNode::with_state(
                format!("card.{}", data.id),
                ObjectState {
                    visible: false,
                    ..ObjectState::default()
                },
            ),
            data,
        });

        Self {
            pack: PackParts {
                root,
                top_half,
                bottom_half,
                tear_line,
            },
            cards,
            pile,
        }
    }

    pub fn card(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }
}
