//! Doc Translator - 结构保持的HTML文档翻译流水线库
//!
//! 这个库提供了文档树解析、可翻译文本提取、限速重试调度和原位回写等核心功能。

pub mod config;
pub mod constants;
pub mod dom;
pub mod error;
pub mod extractor;
pub mod rate_limiter;
pub mod scheduler;
pub mod stats;
pub mod translator;
pub mod utils;
