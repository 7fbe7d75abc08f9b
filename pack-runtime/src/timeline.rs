//! # Timeline 模块
//!
//! 基于时间的一次性/周期定时器，开场演出与揭示流程里的所有延迟都挂在这里。
//!
//! ## 使用方式
//!
//! ```rust,ignore
//! timeline.advance(dt);
//! while let Some(cue) = timeline.pop_due() {
//!     dispatch(cue, &mut timeline);
//! }
//! ```
//!
//! `pop_due` 会把内部游标拨到该定时器的到期时刻，所以派发过程中新调度的
//! 定时器以"触发时刻"为起点计时，相对时序与帧长无关。
//!
//! 清空时间线会使所有未触发的 `TimerId` 失效，这是会话重置阻止陈旧阶段的唯一手段。

use tracing::debug;

/// 定时器 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Timer<C> {
    id: TimerId,
    due: f64,
    /// 周期定时器的间隔
    interval: Option<f64>,
    cue: C,
}

/// 时间线
#[derive(Debug, Clone)]
pub struct Timeline<C> {
    timers: Vec<Timer<C>>,
    /// 派发游标
    now: f64,
    /// 本帧推进到的时刻
    horizon: f64,
    next_id: u64,
}

impl<C: Clone> Default for Timeline<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clone> Timeline<C> {
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            now: 0.0,
            horizon: 0.0,
            next_id: 1,
        }
    }

    fn next_timer_id(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// `delay` 秒后触发一次
    pub fn after(&mut self, delay: f32, cue: C) -> TimerId {
        let id = self.next_timer_id();
        self.timers.push(Timer {
            id,
            due: self.now + f64::from(delay.max(0.0)),
            interval: None,
            cue,
        });
        id
    }

    /// 每 `interval` 秒触发一次，直到被取消
    ///
    /// 间隔非正时按一个极小值处理，避免同一时刻无限触发。
    pub fn every(&mut self, interval: f32, cue: C) -> TimerId {
        let interval = f64::from(interval).max(1e-3);
        let id = self.next_timer_id();
        self.timers.push(Timer {
            id,
            due: self.now + interval,
            interval: Some(interval),
            cue,
        });
        id
    }

    /// 取消定时器
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        let removed = before != self.timers.len();
        if removed {
            debug!(timer = id.0, "定时器已取消");
        }
        removed
    }

    /// 推进时间窗口
    pub fn advance(&mut self, dt: f32) {
        self.horizon = self.now.max(self.horizon) + f64::from(dt.max(0.0));
    }

    /// 取出下一个在当前时间窗口内到期的定时器
    ///
    /// 按到期时刻排序，同一时刻按调度顺序。没有到期项时游标移到窗口末尾。
    pub fn pop_due(&mut self) -> Option<C> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= self.horizon)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)))
            .map(|(i, _)| i);

        let Some(index) = index else {
            self.now = self.horizon;
            return None;
        };

        self.now = self.timers[index].due;
        match self.timers[index].interval {
            Some(interval) => {
                let timer = &mut self.timers[index];
                timer.due += interval;
                Some(timer.cue.clone())
            }
            None => Some(self.timers.swap_remove(index).cue),
        }
    }

    /// 丢弃所有定时器
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.timers.len()
    }

    /// 时间线已推进的总时长（秒）
    pub fn elapsed(&self) -> f64 {
        self.now
    }
}
