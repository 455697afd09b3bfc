//! 流水线统计模块
//!
//! 记录单次翻译运行的成功/失败计数，供观测使用；
//! 片段失败本身不是错误条件

// 标准库导入
use std::time::Duration;

/// 单次流水线运行的统计报告
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// 提取到的片段总数
    pub fragments_total: usize,
    /// 翻译成功的片段数
    pub translated: usize,
    /// 重试预算耗尽的片段数
    pub failed: usize,
    /// 调度的批次数
    pub batches: usize,
    /// 流水线耗时
    pub elapsed: Duration,
}

impl PipelineReport {
    /// 没有可翻译内容时的空报告
    pub fn empty(elapsed: Duration) -> Self {
        Self {
            fragments_total: 0,
            translated: 0,
            failed: 0,
            batches: 0,
            elapsed,
        }
    }

    /// 翻译成功率（百分比）
    pub fn success_rate(&self) -> f64 {
        if self.fragments_total == 0 {
            100.0
        } else {
            self.translated as f64 / self.fragments_total as f64 * 100.0
        }
    }
}

/// 打印流水线统计报告
pub fn print_pipeline_report(report: &PipelineReport, input_size: usize, output_size: usize) {
    println!("\n📊 翻译统计报告:");
    println!("═══════════════════════════════════════");

    // 文件统计
    println!("📏 文件统计:");
    println!(
        "   输入大小: {} 字节 ({:.1} KB)",
        input_size,
        input_size as f64 / 1024.0
    );
    println!(
        "   输出大小: {} 字节 ({:.1} KB)",
        output_size,
        output_size as f64 / 1024.0
    );

    // 翻译统计
    println!("\n🔤 翻译统计:");
    println!("   提取片段: {} 项", report.fragments_total);
    println!("   翻译成功: {} 项", report.translated);
    println!("   翻译失败: {} 项", report.failed);
    println!("   调度批次: {} 个", report.batches);
    println!("   成功率: {:.1}%", report.success_rate());

    // 性能指标
    println!("\n🚀 性能指标:");
    println!("   翻译耗时: {}", format_duration(report.elapsed));
    if report.elapsed.as_secs_f64() > 0.0 {
        println!(
            "   处理速度: {:.1} KB/s",
            input_size as f64 / 1024.0 / report.elapsed.as_secs_f64()
        );
    }
}

/// 格式化持续时间
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.3}s", duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let report = PipelineReport {
            fragments_total: 4,
            translated: 3,
            failed: 1,
            batches: 2,
            elapsed: Duration::from_millis(120),
        };

        assert!((report.success_rate() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_report_counts_as_full_success() {
        let report = PipelineReport::empty(Duration::ZERO);
        assert_eq!(report.fragments_total, 0);
        assert!((report.success_rate() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.500s");
    }
}
