//! 滑动窗口限速模块
//!
//! 限制对翻译服务的出站请求速率：任意尾随时间窗口内
//! 最多允许`max_requests`个请求，超出的调用方排队等待

// 标准库导入
use std::collections::VecDeque;
use std::time::Duration;

// 第三方crate导入
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

// 本地模块导入
use crate::error::Result;
use crate::translation_error;

/// 滑动窗口限速器
///
/// 窗口状态在进程内所有在途流水线间共享（调用方用`Arc`包装）。
/// 获取逻辑在一个公平互斥锁保护的临界区内排空等待队列：
/// 锁在等待期间保持持有，tokio互斥锁按请求顺序授予，
/// 因此并发调用方严格按到达顺序获得放行。
#[derive(Debug)]
pub struct RateLimiter {
    /// 窗口内最大请求数
    max_requests: usize,
    /// 窗口时长
    window: Duration,
    /// 按时间排序的请求时间戳队列
    timestamps: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// 创建限速器
    ///
    /// 非法参数（窗口或配额为零意味着队列永远无法排空）
    /// 在构造阶段拒绝，而不是等到调用时。
    pub fn new(max_requests: usize, window: Duration) -> Result<Self> {
        if max_requests == 0 {
            return Err(translation_error!(
                config,
                "max_requests_per_window",
                "必须大于0，否则限速队列无法排空"
            ));
        }
        if window.is_zero() {
            return Err(translation_error!(config, "window_duration_ms", "必须大于0"));
        }

        Ok(Self {
            max_requests,
            window,
            timestamps: Mutex::new(VecDeque::new()),
        })
    }

    /// 等待直到窗口允许再发出一个请求，然后记录当前时间并返回
    ///
    /// 过期时间戳在每次放行判定前惰性清除。
    /// 窗口已满时按最老的在窗时间戳计算唤醒时刻。
    pub async fn acquire(&self) {
        let mut timestamps = self.timestamps.lock().await;

        loop {
            let now = Instant::now();

            // 清除滑出窗口的时间戳
            while let Some(&oldest) = timestamps.front() {
                if now.duration_since(oldest) >= self.window {
                    timestamps.pop_front();
                } else {
                    break;
                }
            }

            if timestamps.len() < self.max_requests {
                timestamps.push_back(now);
                return;
            }

            // 窗口已满：等到最老的时间戳滑出窗口再重新判定
            if let Some(&oldest) = timestamps.front() {
                sleep_until(oldest + self.window).await;
            }
        }
    }

    /// 窗口内最大请求数
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// 窗口时长
    pub fn window(&self) -> Duration {
        self.window
    }
}
