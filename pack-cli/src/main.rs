//! # Pack CLI
//!
//! 无窗口地跑完一次完整的开包演出，输出统计摘要。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p pack-cli
//! cargo run -p pack-cli -- --seed 7 --fps 30
//! cargo run -p pack-cli -- --config pack.json --no-post --json
//! cargo run -p pack-cli -- -vv
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};

use pack_runtime::{
    CameraEffects, CameraRig, Color, EffectRecorder, Effects, PackConfig, PackScene, PostFxRig,
    PostProcessing, RevealPhase, Session, default_deck,
};

/// 单段演出的帧数上限
const MAX_FRAMES_PER_PHASE: usize = 60 * 60;
/// 翻开后停留观看的时间
const VIEW_SECONDS: f32 = 0.5;
/// 终场后让特效散尽的时间
const TAIL_SECONDS: f32 = 1.5;

#[derive(Parser)]
#[command(name = "pack-cli")]
#[command(about = "无窗口运行一次卡包开箱演出")]
#[command(version)]
struct Cli {
    /// 配置文件（JSON）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 覆盖特效随机种子
    #[arg(short, long)]
    seed: Option<u64>,

    /// 模拟帧率
    #[arg(long, default_value = "60")]
    fps: u32,

    /// 不挂后处理
    #[arg(long)]
    no_post: bool,

    /// 以 JSON 输出摘要
    #[arg(long)]
    json: bool,

    /// 日志详细程度（-v info，-vv debug，-vvv trace）
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// 同时转发给两个协作者
struct Tee<A, B>(A, B);

impl<A: CameraEffects, B: CameraEffects> CameraEffects for Tee<A, B> {
    fn trigger_shake(&mut self, intensity: f32, duration: f32) {
        self.0.trigger_shake(intensity, duration);
        self.1.trigger_shake(intensity, duration);
    }

    fn trigger_zoom(&mut self, target_distance: f32, speed: f32) {
        self.0.trigger_zoom(target_distance, speed);
        self.1.trigger_zoom(target_distance, speed);
    }

    fn reset_zoom(&mut self, speed: f32) {
        self.0.reset_zoom(speed);
        self.1.reset_zoom(speed);
    }

    fn trigger_flash(&mut self, color: Color, intensity: f32, decay: f32) {
        self.0.trigger_flash(color, intensity, decay);
        self.1.trigger_flash(color, intensity, decay);
    }
}

impl<A: PostProcessing, B: PostProcessing> PostProcessing for Tee<A, B> {
    fn pulse_bloom(&mut self, intensity: f32, duration: f32) {
        self.0.pulse_bloom(intensity, duration);
        self.1.pulse_bloom(intensity, duration);
    }

    fn pulse_chromatic_aberration(&mut self, intensity: f32, duration: f32) {
        self.0.pulse_chromatic_aberration(intensity, duration);
        self.1.pulse_chromatic_aberration(intensity, duration);
    }

    fn pulse_vignette(&mut self, darkness: f32, duration: f32) {
        self.0.pulse_vignette(darkness, duration);
        self.1.pulse_vignette(darkness, duration);
    }
}

/// 运行摘要
#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    fps: u32,
    frames: usize,
    seconds: f32,
    phase: RevealPhase,
    cards_revealed: usize,
    post_processing: bool,
    effect_calls: BTreeMap<&'static str, usize>,
    peak_live_effects: usize,
    camera_z: f32,
}

/// 帧驱动
struct Driver {
    session: Session,
    camera: Rc<RefCell<CameraRig>>,
    post: Option<Rc<RefCell<PostFxRig>>>,
    dt: f32,
    frames: usize,
    peak_live_effects: usize,
}

impl Driver {
    fn frame(&mut self) {
        self.session.tick(self.dt);
        self.camera.borrow_mut().update(self.dt);
        if let Some(post) = &self.post {
            post.borrow_mut().update(self.dt);
        }
        self.frames += 1;
        self.peak_live_effects = self
            .peak_live_effects
            .max(self.session.particles().counts().total());
    }

    fn run_for(&mut self, seconds: f32) {
        let frames = (seconds / self.dt).ceil() as usize;
        for _ in 0..frames {
            self.frame();
        }
    }

    /// 推进到条件成立，超过帧数上限视为卡死
    fn run_until(&mut self, what: &str, done: impl Fn(&Session) -> bool) -> anyhow::Result<()> {
        for _ in 0..MAX_FRAMES_PER_PHASE {
            if done(&self.session) {
                return Ok(());
            }
            self.frame();
        }
        anyhow::bail!("等待 {what} 超时（{MAX_FRAMES_PER_PHASE} 帧）")
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("pack-cli error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => PackConfig::load(path)
            .with_context(|| format!("加载配置失败: {}", path.display()))?,
        None => PackConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config.validate().context("配置校验失败")?;
    if cli.fps == 0 {
        anyhow::bail!("--fps 必须大于 0");
    }

    let recorder = EffectRecorder::new();
    let camera = CameraRig::default().shared();
    let post = (!cli.no_post).then(|| PostFxRig::new().shared());
    let effects = Effects::new(
        Box::new(Tee(recorder.clone(), camera.clone())),
        post.clone()
            .map(|post| Box::new(Tee(recorder.clone(), post)) as Box<dyn PostProcessing>),
    );

    let seed = config.seed;
    let mut driver = Driver {
        session: Session::new(config, PackScene::standard(default_deck()), effects),
        camera,
        post,
        dt: 1.0 / cli.fps as f32,
        frames: 0,
        peak_live_effects: 0,
    };

    info!(seed, fps = cli.fps, "开始演出");
    driver.session.request_open();
    driver.run_until("开场结束", |s| s.phase() == RevealPhase::Revealing)?;

    while driver.session.phase() == RevealPhase::Revealing {
        driver.run_until("动画结束", |s| !s.is_animating())?;
        if driver.session.phase() != RevealPhase::Revealing {
            break;
        }
        // 有翻开的牌时这一下会转成收牌
        let outcome = driver.session.request_reveal();
        debug!(?outcome, focused = ?driver.session.focused_card(), "点击");
        driver.run_for(VIEW_SECONDS);
    }
    driver.run_for(TAIL_SECONDS);

    let mut effect_calls = BTreeMap::new();
    for kind in recorder.kinds() {
        *effect_calls.entry(kind).or_insert(0) += 1;
    }

    let summary = Summary {
        seed,
        fps: cli.fps,
        frames: driver.frames,
        seconds: driver.frames as f32 * driver.dt,
        phase: driver.session.phase(),
        cards_revealed: driver.session.reveal_index(),
        post_processing: driver.post.is_some(),
        effect_calls,
        peak_live_effects: driver.peak_live_effects,
        camera_z: driver.camera.borrow().position().z,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(summary: &Summary) {
    println!("─────────────────────────────────────────────────────");
    println!("种子 {}，{} fps", summary.seed, summary.fps);
    println!(
        "共 {} 帧（{:.2} 秒），阶段 {:?}，收走 {} 张牌",
        summary.frames, summary.seconds, summary.phase, summary.cards_revealed
    );
    println!(
        "后处理: {}",
        if summary.post_processing { "开" } else { "关" }
    );
    println!("同时存活特效峰值: {}", summary.peak_live_effects);
    println!("效果调用:");
    for (kind, count) in &summary.effect_calls {
        println!("  {kind:<22} {count}");
    }
}
