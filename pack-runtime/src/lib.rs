//! # Pack Runtime
//!
//! 卡包开箱演出的核心运行时库。
//!
//! ## 架构概述
//!
//! `pack-runtime` 不依赖任何渲染引擎或窗口系统。宿主负责拾取、渲染和帧循环，
//! 通过意图驱动会话，每帧读取场景对象与特效池的状态去绘制：
//!
//! ```text
//! Host                              Runtime
//!   │                                  │
//!   │──── Intent ────────────────────►│ handle()
//!   │──── dt ────────────────────────►│ tick()
//!   │◄─── CameraEffects / PostProcessing│
//!   │◄─── SceneNode / Sprite 状态 ─────│
//!   │                                  │
//! ```
//!
//! ## 核心类型
//!
//! - [`Session`]：唯一的编排者
//! - [`TweenEngine`]：属性补间
//! - [`EffectSimulator`]：粒子、能量环、闪电、碎片
//! - [`RevealState`]：揭示状态机
//! - [`Director`]：开场演出导演
//!
//! ## 使用示例
//!
//! ```ignore
//! use pack_runtime::{Effects, PackConfig, PackScene, Session, default_deck};
//!
//! let mut session = Session::new(
//!     PackConfig::default(),
//!     PackScene::standard(default_deck()),
//!     Effects::headless(),
//! );
//! session.request_open();
//! loop {
//!     session.tick(dt);
//!     renderer.draw(session.scene(), session.particles().sprites());
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`animation`]：缓动、可动画属性、补间引擎
//! - [`particles`]：特效模拟
//! - [`timeline`]：定时器
//! - [`scene`]：场景对象与卡包布局
//! - [`reveal`] / [`director`] / [`drag`]：交互与演出
//! - [`session`]：会话编排
//! - [`effects`] / [`camera`]：镜头与后处理协作者
//! - [`config`] / [`error`]：配置

pub mod animation;
pub mod camera;
pub mod card;
pub mod config;
pub mod director;
pub mod drag;
pub mod effects;
pub mod error;
pub mod input;
pub mod particles;
pub mod reveal;
pub mod scene;
pub mod session;
pub mod stage;
pub mod timeline;

// 重导出核心类型
pub use animation::{
    Animatable, Axes, Axis, EasingFunction, PropertyValue, TweenEngine, TweenId, TweenSpec,
};
pub use camera::{CameraRig, PostFxRig};
pub use card::{CARD_COUNT, CardData, Rarity, default_deck};
pub use config::PackConfig;
pub use director::{Director, DirectorStep};
pub use drag::{DragController, TiltTarget};
pub use effects::{CameraEffects, Color, EffectCall, EffectRecorder, Effects, PostProcessing};
pub use error::{ConfigError, ConfigResult};
pub use input::{IgnoreReason, Intent, IntentOutcome};
pub use particles::{EffectSimulator, ParticleKind, PoolCounts, Sprite};
pub use reveal::{RarityTier, RevealPhase, RevealState};
pub use scene::{Card, PackScene, SceneNode, SceneObject};
pub use session::Session;
pub use stage::Stage;
pub use timeline::{TimerId, Timeline};
