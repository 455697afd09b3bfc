//! 配置管理模块
//!
//! 提供CLI参数解析和翻译流水线配置管理功能

// 标准库导入
use std::path::PathBuf;

// 第三方crate导入
use clap::Parser;

// 本地模块导入
use crate::constants::{api_config, service_config};
use crate::error::Result;
use crate::translation_error;

/// 翻译流水线配置结构体
///
/// 覆盖流水线识别的全部配置项：限速窗口、批次并发、重试退避和目标语言。
/// 支持Builder模式进行链式配置。
///
/// # Examples
///
/// ```rust
/// use doc_translator::config::PipelineConfig;
///
/// let config = PipelineConfig::new()
///     .target_language("pa")
///     .with_api_url("http://localhost:5000/translate")
///     .with_batch_size(5)
///     .with_max_retries(3);
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// 目标语言代码 (如: pa, hi, zh)
    target_lang: String,
    /// 翻译API服务地址
    api_url: String,
    /// 滑动窗口内最大请求数
    max_requests_per_window: usize,
    /// 滑动窗口时长（毫秒）
    window_duration_ms: u64,
    /// 批次并发大小（1表示完全串行）
    batch_size: usize,
    /// 批次间延迟（毫秒）
    inter_batch_delay_ms: u64,
    /// 单个片段最大尝试次数
    max_retries: usize,
    /// 退避基数（毫秒），实际退避为 base × 2^attempt + 抖动
    backoff_base_ms: u64,
    /// 同批次内的错峰单位（毫秒）
    stagger_unit_ms: u64,
}

impl PipelineConfig {
    /// 创建具有默认值的配置实例
    pub fn new() -> Self {
        Self {
            target_lang: service_config::DEFAULT_TARGET_LANG.to_string(),
            api_url: api_config::DEFAULT_API_URL.to_string(),
            max_requests_per_window: service_config::DEFAULT_MAX_REQUESTS_PER_WINDOW,
            window_duration_ms: service_config::DEFAULT_WINDOW_DURATION_MS,
            batch_size: service_config::DEFAULT_BATCH_SIZE,
            inter_batch_delay_ms: service_config::DEFAULT_INTER_BATCH_DELAY_MS,
            max_retries: service_config::DEFAULT_MAX_RETRIES,
            backoff_base_ms: service_config::DEFAULT_BACKOFF_BASE_MS,
            stagger_unit_ms: service_config::DEFAULT_STAGGER_UNIT_MS,
        }
    }

    /// 校验配置项
    ///
    /// 窗口与批次参数必须为正，否则限速队列永远无法排空。
    /// 非法配置在构造阶段拒绝，而不是等到调用时。
    pub fn validate(&self) -> Result<()> {
        if self.max_requests_per_window == 0 {
            return Err(translation_error!(
                config,
                "max_requests_per_window",
                "必须大于0，否则限速队列无法排空"
            ));
        }
        if self.window_duration_ms == 0 {
            return Err(translation_error!(
                config,
                "window_duration_ms",
                "必须大于0"
            ));
        }
        if self.batch_size == 0 {
            return Err(translation_error!(config, "batch_size", "必须大于0"));
        }
        if self.max_retries == 0 {
            return Err(translation_error!(config, "max_retries", "必须大于0"));
        }
        Ok(())
    }

    /// 获取目标语言代码
    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }

    /// 获取API地址
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// 获取滑动窗口内最大请求数
    pub fn max_requests_per_window(&self) -> usize {
        self.max_requests_per_window
    }

    /// 获取滑动窗口时长（毫秒）
    pub fn window_duration_ms(&self) -> u64 {
        self.window_duration_ms
    }

    /// 获取批次并发大小
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// 获取批次间延迟（毫秒）
    pub fn inter_batch_delay_ms(&self) -> u64 {
        self.inter_batch_delay_ms
    }

    /// 获取最大尝试次数
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// 获取退避基数（毫秒）
    pub fn backoff_base_ms(&self) -> u64 {
        self.backoff_base_ms
    }

    /// 获取错峰单位（毫秒）
    pub fn stagger_unit_ms(&self) -> u64 {
        self.stagger_unit_ms
    }

    /// 设置目标语言代码
    pub fn target_language(mut self, lang: &str) -> Self {
        self.target_lang = lang.to_string();
        self
    }

    /// 设置API地址
    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = url.to_string();
        self
    }

    /// 设置滑动窗口参数
    pub fn with_rate_window(mut self, max_requests: usize, window_ms: u64) -> Self {
        self.max_requests_per_window = max_requests;
        self.window_duration_ms = window_ms;
        self
    }

    /// 设置批次并发大小
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// 设置批次间延迟（毫秒）
    pub fn with_inter_batch_delay_ms(mut self, delay_ms: u64) -> Self {
        self.inter_batch_delay_ms = delay_ms;
        self
    }

    /// 设置最大尝试次数
    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    /// 设置退避基数（毫秒）
    pub fn with_backoff_base_ms(mut self, base_ms: u64) -> Self {
        self.backoff_base_ms = base_ms;
        self
    }

    /// 设置错峰单位（毫秒）
    pub fn with_stagger_unit_ms(mut self, unit_ms: u64) -> Self {
        self.stagger_unit_ms = unit_ms;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// CLI参数结构
#[derive(Parser)]
#[command(author, version, about = "结构保持的HTML文档翻译工具 - 限速重试调度与原位回写", long_about = None)]
pub struct Cli {
    /// 输入HTML文件路径
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// 输出文件路径 (可选，默认为输入文件名+语言代码)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// 目标语言代码 (如: pa, hi, zh)
    #[arg(short, long, default_value = crate::constants::service_config::DEFAULT_TARGET_LANG)]
    pub lang: String,

    /// 翻译API地址
    #[arg(short, long, default_value = crate::constants::api_config::DEFAULT_API_URL)]
    pub api: String,

    /// 批次并发大小 (1表示完全串行)
    #[arg(long, default_value_t = crate::constants::service_config::DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// 批次间延迟（毫秒）
    #[arg(long, default_value_t = crate::constants::service_config::DEFAULT_INTER_BATCH_DELAY_MS)]
    pub inter_batch_delay_ms: u64,

    /// 单个片段最大尝试次数
    #[arg(long, default_value_t = crate::constants::service_config::DEFAULT_MAX_RETRIES)]
    pub max_retries: usize,

    /// 退避基数（毫秒）
    #[arg(long, default_value_t = crate::constants::service_config::DEFAULT_BACKOFF_BASE_MS)]
    pub backoff_base_ms: u64,

    /// 同批次错峰单位（毫秒）
    #[arg(long, default_value_t = crate::constants::service_config::DEFAULT_STAGGER_UNIT_MS)]
    pub stagger_unit_ms: u64,

    /// 滑动窗口内最大请求数
    #[arg(long, default_value_t = crate::constants::service_config::DEFAULT_MAX_REQUESTS_PER_WINDOW)]
    pub max_requests_per_window: usize,

    /// 滑动窗口时长（毫秒）
    #[arg(long, default_value_t = crate::constants::service_config::DEFAULT_WINDOW_DURATION_MS)]
    pub window_duration_ms: u64,

    /// 详细输出模式
    #[arg(short, long)]
    pub verbose: bool,

    /// 静默模式 (仅输出错误)
    #[arg(short, long)]
    pub quiet: bool,

    /// 显示性能统计
    #[arg(long)]
    pub stats: bool,
}

impl Cli {
    /// 由CLI参数构造流水线配置
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::new()
            .target_language(&self.lang)
            .with_api_url(&self.api)
            .with_rate_window(self.max_requests_per_window, self.window_duration_ms)
            .with_batch_size(self.batch_size)
            .with_inter_batch_delay_ms(self.inter_batch_delay_ms)
            .with_max_retries(self.max_retries)
            .with_backoff_base_ms(self.backoff_base_ms)
            .with_stagger_unit_ms(self.stagger_unit_ms)
    }
}
