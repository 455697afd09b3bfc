use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use doc_translator::config::Cli;
use doc_translator::constants::is_valid_api_url;
use doc_translator::rate_limiter::RateLimiter;
use doc_translator::scheduler::TranslationPipeline;
use doc_translator::stats::{format_duration, print_pipeline_report, PipelineReport};
use doc_translator::translator::HttpTranslator;
use doc_translator::utils::{
    generate_output_path, init_logging, is_valid_language_code, validate_input_file,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志系统
    init_logging(cli.verbose, cli.quiet);

    // 验证输入
    validate_input_file(&cli.input)?;
    if !is_valid_language_code(&cli.lang) {
        anyhow::bail!("无效的目标语言代码: {}", cli.lang);
    }
    if !is_valid_api_url(&cli.api) {
        anyhow::bail!("无效的API地址: {}", cli.api);
    }

    // 生成输出文件路径
    let output_path = generate_output_path(&cli.input, &cli.output, &cli.lang);

    if !cli.quiet {
        info!("🚀 启动文档翻译流水线");
        info!("📂 输入文件: {}", cli.input.display());
        info!("📄 输出文件: {}", output_path.display());
        info!("🌐 目标语言: {}", cli.lang);
    }

    // 开始性能计时
    let total_start = Instant::now();

    // 执行翻译
    match run_pipeline(&cli, &output_path).await {
        Ok((report, input_size, output_size)) => {
            let total_duration = total_start.elapsed();

            if !cli.quiet {
                info!("✅ 翻译完成！总耗时: {}", format_duration(total_duration));
            }

            if report.failed > 0 {
                warn!(
                    "⚠️  {} 个片段翻译失败，输出中保留原文",
                    report.failed
                );
            }

            // 显示统计报告
            if cli.stats || cli.verbose {
                print_pipeline_report(&report, input_size, output_size);
            }
        }
        Err(e) => {
            error!("❌ 翻译失败: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// 执行翻译流水线核心函数
async fn run_pipeline(cli: &Cli, output_path: &PathBuf) -> Result<(PipelineReport, usize, usize)> {
    let config = cli.pipeline_config();

    // 进程级共享限速器：窗口状态跨所有在途流水线生效
    let limiter = Arc::new(RateLimiter::new(
        config.max_requests_per_window(),
        Duration::from_millis(config.window_duration_ms()),
    )?);

    let backend = Arc::new(HttpTranslator::new(config.api_url())?);
    let pipeline = TranslationPipeline::new(config, backend, limiter)?;

    // 读取文件
    let html_content = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("读取文件失败: {}", cli.input.display()))?;

    if cli.verbose {
        info!("📏 文件大小: {} 字节", html_content.len());
    }

    // 执行翻译：始终产出尽力而为的完整文档
    let result = pipeline.translate_html(&html_content).await?;

    // 写入译文；原文与译文作为两份不透明字符串交给持久化协作方
    std::fs::write(output_path, &result.html)
        .with_context(|| format!("写入文件失败: {}", output_path.display()))?;

    Ok((result.report, html_content.len(), result.html.len()))
}
