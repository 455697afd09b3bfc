//! 通用工具模块
//!
//! 提供日志初始化、输入校验和输出路径生成等辅助功能

// 标准库导入
use std::path::PathBuf;
use std::sync::OnceLock;

// 第三方crate导入
use anyhow::Result;
use regex::Regex;
use tracing::warn;

/// 初始化日志系统
pub fn init_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// 验证输入文件
pub fn validate_input_file(path: &PathBuf) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("输入文件不存在: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("输入路径不是文件: {}", path.display());
    }

    if let Some(ext) = path.extension() {
        if ext != "html" && ext != "htm" {
            warn!("⚠️  文件扩展名不是HTML: {}", ext.to_string_lossy());
        }
    }

    Ok(())
}

/// 验证目标语言代码格式（ISO 639小写字母代码）
///
/// 正则模式只编译一次，后续调用复用缓存实例。
pub fn is_valid_language_code(lang: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let regex = PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z]{2,3}$").expect("语言代码正则模式是静态合法的")
    });
    regex.is_match(lang)
}

/// 生成输出文件路径
pub fn generate_output_path(input: &PathBuf, output: &Option<PathBuf>, lang: &str) -> PathBuf {
    if let Some(output_path) = output {
        return output_path.clone();
    }

    // 自动生成输出路径: input_pa.html
    let stem = input.file_stem().unwrap_or_default();
    let extension = input.extension().unwrap_or_default();

    let output_name = format!(
        "{}_{}.{}",
        stem.to_string_lossy(),
        lang,
        extension.to_string_lossy()
    );

    if let Some(parent) = input.parent() {
        parent.join(output_name)
    } else {
        PathBuf::from(output_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_code_validation() {
        assert!(is_valid_language_code("pa"));
        assert!(is_valid_language_code("hi"));
        assert!(is_valid_language_code("zho"));
        assert!(!is_valid_language_code(""));
        assert!(!is_valid_language_code("PA"));
        assert!(!is_valid_language_code("punjabi"));
        assert!(!is_valid_language_code("pa-IN"));
    }

    #[test]
    fn test_language_code_checks_reuse_compiled_pattern() {
        // 重复调用走缓存的正则实例，结果保持一致
        for _ in 0..3 {
            assert!(is_valid_language_code("pa"));
            assert!(!is_valid_language_code("PA"));
        }
    }

    #[test]
    fn test_output_path_generation() {
        let input = PathBuf::from("/tmp/lesson.html");
        let output = generate_output_path(&input, &None, "pa");
        assert_eq!(output, PathBuf::from("/tmp/lesson_pa.html"));

        let explicit = Some(PathBuf::from("/tmp/custom.html"));
        let output = generate_output_path(&input, &explicit, "pa");
        assert_eq!(output, PathBuf::from("/tmp/custom.html"));
    }
}
