//! 批次调度与翻译流水线模块
//!
//! 驱动完整的翻译流程：解析 → 提取 → 按优先级排序 →
//! 有界并发批次调度（经限速器和重试调度器）→ 原位回写 → 序列化。
//! 任何片段的失败都不影响其他片段，流水线始终返回尽力而为的结果。

// 标准库导入
use std::cmp::Reverse;
use std::sync::Arc;
use std::time::Duration;

// 第三方crate导入
use futures::future::join_all;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

// 本地模块导入
use crate::config::PipelineConfig;
use crate::dom::DocumentTree;
use crate::error::Result;
use crate::extractor::{extract_fragments, TextFragment};
use crate::rate_limiter::RateLimiter;
use crate::stats::PipelineReport;
use crate::translator::{RetryDispatcher, TranslationBackend};

/// 单个片段的终态
///
/// 片段状态机: Pending → Attempting（最多重入 max_retries−1 次）
/// → {Translated | Failed}。Failed只对该片段终结，不上抛为请求级错误。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentOutcome {
    /// 译文已原位写回
    Translated,
    /// 重试预算耗尽，原文保持不动
    Failed(String),
}

/// 翻译完成的文档
pub struct TranslatedDocument {
    /// 序列化后的译文HTML，结构与输入同构
    pub html: String,
    /// 本次运行的统计报告
    pub report: PipelineReport,
}

/// 翻译流水线
///
/// 文档树由单次调用独占；限速器是进程级共享资源，
/// 由调用方以`Arc`注入，在所有在途流水线间共享窗口状态。
pub struct TranslationPipeline {
    config: PipelineConfig,
    dispatcher: RetryDispatcher,
}

impl TranslationPipeline {
    /// 创建流水线，配置在此处校验
    pub fn new(
        config: PipelineConfig,
        backend: Arc<dyn TranslationBackend>,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self> {
        config.validate()?;
        let dispatcher = RetryDispatcher::new(backend, limiter, &config);

        Ok(Self { config, dispatcher })
    }

    /// 翻译一篇HTML文档
    ///
    /// 只有输入无法解析时才整体失败；片段级失败被捕获、
    /// 记录日志并计入报告，调用方总能拿到完整文档。
    pub async fn translate_html(&self, html: &str) -> Result<TranslatedDocument> {
        let started = Instant::now();

        let tree = DocumentTree::parse(html)?;
        let fragments = extract_fragments(&tree);

        info!("📝 提取到 {} 个可翻译文本片段", fragments.len());

        if fragments.is_empty() {
            let html = tree.serialize()?;
            return Ok(TranslatedDocument {
                html,
                report: PipelineReport::empty(started.elapsed()),
            });
        }

        // 对副本按优先级降序稳定排序：同级片段保持文档顺序。
        // 排序只决定调度顺序，输出顺序由原位回写保证。
        let mut dispatch_order: Vec<usize> = (0..fragments.len()).collect();
        dispatch_order.sort_by_key(|&i| Reverse(fragments[i].priority));

        let mut translated = 0usize;
        let mut failed = 0usize;
        let mut batches = 0usize;

        for (group_index, group) in dispatch_order.chunks(self.config.batch_size()).enumerate() {
            if group_index > 0 {
                sleep(Duration::from_millis(self.config.inter_batch_delay_ms())).await;
            }
            batches += 1;
            debug!("处理批次 {}: {} 个片段", group_index + 1, group.len());

            let outcomes = join_all(group.iter().enumerate().map(
                |(dispatch_index, &fragment_index)| {
                    self.translate_fragment(&tree, &fragments[fragment_index], dispatch_index)
                },
            ))
            .await;

            for outcome in outcomes {
                match outcome {
                    FragmentOutcome::Translated => translated += 1,
                    FragmentOutcome::Failed(_) => failed += 1,
                }
            }
        }

        let html = tree.serialize()?;
        info!(
            "✅ 调度完成: 成功 {} / 失败 {} / 共 {} 个片段",
            translated,
            failed,
            fragments.len()
        );

        Ok(TranslatedDocument {
            html,
            report: PipelineReport {
                fragments_total: fragments.len(),
                translated,
                failed,
                batches,
                elapsed: started.elapsed(),
            },
        })
    }

    /// 翻译单个片段并在成功时立即原位回写
    ///
    /// 失败在片段边界被捕获：原文保持逐字节不动，只记录日志。
    async fn translate_fragment(
        &self,
        tree: &DocumentTree,
        fragment: &TextFragment,
        dispatch_index: usize,
    ) -> FragmentOutcome {
        let result = self
            .dispatcher
            .translate_with_retry(
                &fragment.normalized_text,
                &fragment.structural_role,
                dispatch_index,
            )
            .await;

        match result {
            Ok(translated_text) => {
                // 回写时恢复原始文本的前后空白
                let rebuilt = fragment.with_translation(&translated_text);
                match tree.replace_text(&fragment.path, &rebuilt) {
                    Ok(()) => FragmentOutcome::Translated,
                    Err(e) => {
                        warn!("❌ 片段回写失败 [{}]: {}", fragment.structural_role, e);
                        FragmentOutcome::Failed(e.to_string())
                    }
                }
            }
            Err(e) => {
                warn!("❌ 片段翻译失败 [{}]: {}", fragment.structural_role, e);
                FragmentOutcome::Failed(e.to_string())
            }
        }
    }
}
