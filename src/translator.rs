//! 翻译服务客户端与重试调度模块
//!
//! 封装对远程翻译服务的单次调用，并提供带限速、错峰
//! 和指数退避重试的调度入口

// 标准库导入
use std::sync::Arc;
use std::time::Duration;

// 第三方crate导入
use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde_json::json;
use tokio::time::sleep;
use tracing::{debug, warn};

// 本地模块导入
use crate::config::PipelineConfig;
use crate::constants::{api_config, context_hints};
use crate::error::{Result, TranslationError};
use crate::rate_limiter::RateLimiter;
use crate::translation_error;

/// 翻译请求
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// 待翻译文本
    pub text: String,
    /// 目标语言代码
    pub target_lang: String,
    /// 结构角色对应的上下文提示
    pub context_hint: &'static str,
    /// 是否要求服务保留排版
    pub preserve_formatting: bool,
}

/// 翻译响应
#[derive(Debug, Clone)]
pub struct TranslationResponse {
    /// 译文文本
    pub translated_text: String,
}

/// 翻译后端接口
///
/// 远程HTTP服务是生产实现；测试中可注入进程内桩实现。
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// 执行一次翻译调用
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResponse>;
}

/// 按结构角色选择上下文提示
///
/// 纯函数：标题类角色取标题提示，列表项取列表提示，
/// 强调类取强调提示，其余统一用段落提示。
/// 提示只用于调整译文语域，从不改变本地逻辑。
pub fn context_hint_for_role(role: &str) -> &'static str {
    match role {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => context_hints::HEADING,
        "li" => context_hints::LIST_ITEM,
        "strong" | "b" | "em" | "i" => context_hints::EMPHASIS,
        _ => context_hints::PARAGRAPH,
    }
}

/// 计算第attempt次失败后的退避时长
///
/// 退避 = 基数 × 2^attempt + 随机抖动（0 ~ 基数/4），
/// 期望值随尝试次数单调不减。
pub fn backoff_duration(base: Duration, attempt: usize) -> Duration {
    let exponential = base.saturating_mul(1u32 << attempt.min(10));
    let jitter_cap = (base.as_millis() as u64 / 4).max(1);
    let jitter_ms = rand::thread_rng().gen_range(0..=jitter_cap);

    exponential + Duration::from_millis(jitter_ms)
}

/// 基于reqwest的远程翻译服务客户端
pub struct HttpTranslator {
    client: Client,
    api_url: String,
}

impl HttpTranslator {
    /// 创建HTTP客户端
    pub fn new(api_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(api_config::REQUEST_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| translation_error!(transport, format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
        })
    }
}

#[async_trait]
impl TranslationBackend for HttpTranslator {
    /// 发送一次翻译请求
    ///
    /// 非2xx状态、网络错误和缺失译文字段统一视为可重试失败。
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResponse> {
        let response = self
            .client
            .post(&self.api_url)
            .json(&json!({
                "text": request.text,
                "to": request.target_lang,
                "context": request.context_hint,
                "preserve_formatting": request.preserve_formatting,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(translation_error!(
                transport,
                "翻译API返回错误状态",
                status.as_u16()
            ));
        }

        let body: serde_json::Value = response.json().await?;

        match body.get("translatedText").and_then(|v| v.as_str()) {
            Some(text) if !text.trim().is_empty() => Ok(TranslationResponse {
                translated_text: text.to_string(),
            }),
            Some(_) => Err(translation_error!(invalid_response, "translatedText字段为空")),
            None => Err(translation_error!(
                invalid_response,
                "响应缺少translatedText字段"
            )),
        }
    }
}

/// 重试调度器
///
/// 包装单条文本的翻译调用：先按批内序号错峰，
/// 每次尝试前经过限速器，失败后指数退避重试，
/// 预算耗尽以`TranslationFailed`终结并携带最后的失败原因。
pub struct RetryDispatcher {
    backend: Arc<dyn TranslationBackend>,
    limiter: Arc<RateLimiter>,
    target_lang: String,
    max_retries: usize,
    backoff_base: Duration,
    stagger_unit: Duration,
}

impl RetryDispatcher {
    /// 创建重试调度器
    pub fn new(
        backend: Arc<dyn TranslationBackend>,
        limiter: Arc<RateLimiter>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            backend,
            limiter,
            target_lang: config.target_lang().to_string(),
            max_retries: config.max_retries(),
            backoff_base: Duration::from_millis(config.backoff_base_ms()),
            stagger_unit: Duration::from_millis(config.stagger_unit_ms()),
        }
    }

    /// 带重试地翻译一条文本
    ///
    /// `dispatch_index`是片段在所属批次内的序号，
    /// 首次尝试前睡眠 `dispatch_index × stagger_unit` 以降低突发相关性。
    pub async fn translate_with_retry(
        &self,
        text: &str,
        structural_role: &str,
        dispatch_index: usize,
    ) -> Result<String> {
        if dispatch_index > 0 {
            sleep(self.stagger_unit * dispatch_index as u32).await;
        }

        let request = TranslationRequest {
            text: text.to_string(),
            target_lang: self.target_lang.clone(),
            context_hint: context_hint_for_role(structural_role),
            preserve_formatting: true,
        };

        let mut last_error: Option<TranslationError> = None;

        for attempt in 0..self.max_retries {
            self.limiter.acquire().await;

            let failure = match self.backend.translate(&request).await {
                Ok(response) if !response.translated_text.trim().is_empty() => {
                    debug!(
                        "翻译成功 [{}] 第{}次尝试",
                        structural_role,
                        attempt + 1
                    );
                    return Ok(response.translated_text);
                }
                // 空译文与缺失字段同等对待：无效响应，照常重试
                Ok(_) => translation_error!(invalid_response, "translatedText字段为空"),
                Err(e) => e,
            };

            warn!(
                "翻译尝试 {}/{} 失败 [{}]: {}",
                attempt + 1,
                self.max_retries,
                structural_role,
                failure
            );

            // 不可重试的失败立即终结，不消耗剩余预算
            if !failure.is_retryable() {
                return Err(TranslationError::TranslationFailed {
                    attempts: attempt + 1,
                    last_error: failure.to_string(),
                });
            }

            if attempt + 1 < self.max_retries {
                sleep(backoff_duration(self.backoff_base, attempt)).await;
            }
            last_error = Some(failure);
        }

        Err(TranslationError::TranslationFailed {
            attempts: self.max_retries,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "未知错误".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    struct EchoBackend;

    #[async_trait]
    impl TranslationBackend for EchoBackend {
        async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResponse> {
            Ok(TranslationResponse {
                translated_text: request.text.clone(),
            })
        }
    }

    struct FailingBackend {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl TranslationBackend for FailingBackend {
        async fn translate(&self, _request: &TranslationRequest) -> Result<TranslationResponse> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(translation_error!(transport, "connection refused"))
        }
    }

    struct EmptyResponseBackend;

    #[async_trait]
    impl TranslationBackend for EmptyResponseBackend {
        async fn translate(&self, _request: &TranslationRequest) -> Result<TranslationResponse> {
            Ok(TranslationResponse {
                translated_text: "   ".to_string(),
            })
        }
    }

    fn test_config() -> PipelineConfig {
        PipelineConfig::new()
            .with_rate_window(100, 10)
            .with_max_retries(3)
            .with_backoff_base_ms(10)
            .with_stagger_unit_ms(250)
    }

    fn dispatcher(backend: Arc<dyn TranslationBackend>) -> RetryDispatcher {
        let config = test_config();
        let limiter = Arc::new(
            RateLimiter::new(
                config.max_requests_per_window(),
                Duration::from_millis(config.window_duration_ms()),
            )
            .unwrap(),
        );
        RetryDispatcher::new(backend, limiter, &config)
    }

    #[test]
    fn test_context_hint_selection() {
        assert_eq!(context_hint_for_role("h1"), context_hints::HEADING);
        assert_eq!(context_hint_for_role("h6"), context_hints::HEADING);
        assert_eq!(context_hint_for_role("li"), context_hints::LIST_ITEM);
        assert_eq!(context_hint_for_role("strong"), context_hints::EMPHASIS);
        assert_eq!(context_hint_for_role("em"), context_hints::EMPHASIS);
        assert_eq!(context_hint_for_role("p"), context_hints::PARAGRAPH);
        assert_eq!(context_hint_for_role("td"), context_hints::PARAGRAPH);
    }

    #[test]
    fn test_backoff_is_monotonically_increasing() {
        let base = Duration::from_millis(100);
        let mut previous = Duration::ZERO;

        for attempt in 0..5 {
            let delay = backoff_duration(base, attempt);
            assert!(delay >= base.saturating_mul(1 << attempt));
            assert!(delay > previous);
            previous = delay;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_translation_returned() {
        let dispatcher = dispatcher(Arc::new(EchoBackend));
        let result = dispatcher
            .translate_with_retry("Hello world", "p", 0)
            .await
            .unwrap();

        assert_eq!(result, "Hello world");
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_budget_exhausted() {
        let backend = Arc::new(FailingBackend {
            attempts: AtomicUsize::new(0),
        });
        let dispatcher = dispatcher(backend.clone());

        let err = dispatcher
            .translate_with_retry("Hello world", "p", 0)
            .await
            .unwrap_err();

        assert_eq!(backend.attempts.load(Ordering::SeqCst), 3);
        match err {
            TranslationError::TranslationFailed {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("connection refused"));
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_response_is_retried_then_fails() {
        let dispatcher = dispatcher(Arc::new(EmptyResponseBackend));

        let err = dispatcher
            .translate_with_retry("Hello world", "p", 0)
            .await
            .unwrap_err();

        match err {
            TranslationError::TranslationFailed { last_error, .. } => {
                assert!(last_error.contains("translatedText"));
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_index_staggers_first_attempt() {
        let dispatcher = dispatcher(Arc::new(EchoBackend));
        let start = Instant::now();

        dispatcher
            .translate_with_retry("Hello world", "p", 2)
            .await
            .unwrap();

        // 批内序号2 × 错峰单位250ms
        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
