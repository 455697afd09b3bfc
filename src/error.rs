//! 统一错误处理模块
//!
//! 提供文档翻译流水线的统一错误类型定义和处理机制

// 标准库导入
use std::fmt;

// 第三方crate导入
use anyhow::Error as AnyhowError;

/// 文档翻译流水线统一错误类型
///
/// 定义了流水线中可能出现的所有错误类型，提供统一的错误处理接口。
/// 配置错误在构造阶段就会暴露；传输错误和无效响应可以重试；
/// 重试预算耗尽的片段以`TranslationFailed`终结，但不会使整条流水线失败。
#[derive(Debug)]
pub enum TranslationError {
    /// 配置相关错误（构造阶段暴露，致命）
    Configuration {
        /// 配置项名称
        field: String,
        /// 错误原因
        reason: String,
    },

    /// 网络传输相关错误（可重试）
    Transport {
        /// 错误消息
        message: String,
        /// HTTP状态码（如果适用）
        status_code: Option<u16>,
    },

    /// 翻译服务响应格式无效（可重试）
    InvalidResponse {
        /// 具体错误信息
        details: String,
    },

    /// 重试预算耗尽（对单个片段终结，对流水线不致命）
    TranslationFailed {
        /// 已尝试次数
        attempts: usize,
        /// 最后一次失败的底层原因
        last_error: String,
    },

    /// HTML解析相关错误（流水线唯一的致命错误）
    HtmlParse {
        /// 具体错误信息
        details: String,
    },

    /// 文件操作相关错误
    FileOperation {
        /// 文件路径
        path: String,
        /// 操作类型（读取、写入等）
        operation: String,
        /// 底层错误信息
        source: String,
    },

    /// 内部处理错误（包装anyhow::Error）
    Internal {
        /// 包装的错误
        source: AnyhowError,
    },
}

impl TranslationError {
    /// 判断错误是否可重试
    ///
    /// 传输错误和无效响应视为临时故障，统一走重试路径；
    /// 其余错误类型重试没有意义。
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TranslationError::Transport { .. } | TranslationError::InvalidResponse { .. }
        )
    }
}

impl fmt::Display for TranslationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslationError::Configuration { field, reason } => {
                write!(f, "配置错误 [{}]: {}", field, reason)
            }
            TranslationError::Transport {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "网络请求失败 [{}]: {}", code, message)
                } else {
                    write!(f, "网络请求失败: {}", message)
                }
            }
            TranslationError::InvalidResponse { details } => {
                write!(f, "翻译服务响应无效: {}", details)
            }
            TranslationError::TranslationFailed {
                attempts,
                last_error,
            } => {
                write!(f, "翻译失败（已尝试{}次）: {}", attempts, last_error)
            }
            TranslationError::HtmlParse { details } => {
                write!(f, "HTML解析失败: {}", details)
            }
            TranslationError::FileOperation {
                path,
                operation,
                source,
            } => {
                write!(f, "文件{}操作失败 [{}]: {}", operation, path, source)
            }
            TranslationError::Internal { source } => {
                write!(f, "内部处理错误: {}", source)
            }
        }
    }
}

impl std::error::Error for TranslationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TranslationError::Internal { source } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// 文档翻译流水线结果类型别名
pub type Result<T> = std::result::Result<T, TranslationError>;

/// 便捷的错误创建宏
#[macro_export]
macro_rules! translation_error {
    (config, $field:expr, $reason:expr) => {
        $crate::error::TranslationError::Configuration {
            field: $field.to_string(),
            reason: $reason.to_string(),
        }
    };
    (transport, $msg:expr) => {
        $crate::error::TranslationError::Transport {
            message: $msg.to_string(),
            status_code: None,
        }
    };
    (transport, $msg:expr, $code:expr) => {
        $crate::error::TranslationError::Transport {
            message: $msg.to_string(),
            status_code: Some($code),
        }
    };
    (invalid_response, $details:expr) => {
        $crate::error::TranslationError::InvalidResponse {
            details: $details.to_string(),
        }
    };
    (html_parse, $details:expr) => {
        $crate::error::TranslationError::HtmlParse {
            details: $details.to_string(),
        }
    };
    (file_op, $path:expr, $op:expr, $source:expr) => {
        $crate::error::TranslationError::FileOperation {
            path: $path.to_string(),
            operation: $op.to_string(),
            source: $source.to_string(),
        }
    };
}

/// 从anyhow::Error转换为TranslationError
impl From<AnyhowError> for TranslationError {
    fn from(error: AnyhowError) -> Self {
        TranslationError::Internal { source: error }
    }
}

/// 从reqwest::Error转换为TranslationError
impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        let status_code = error.status().map(|s| s.as_u16());
        TranslationError::Transport {
            message: error.to_string(),
            status_code,
        }
    }
}

/// 从std::io::Error转换为TranslationError
impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::FileOperation {
            path: "unknown".to_string(),
            operation: "io".to_string(),
            source: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TranslationError::Transport {
            message: "Connection failed".to_string(),
            status_code: Some(500),
        };

        assert_eq!(format!("{}", err), "网络请求失败 [500]: Connection failed");
    }

    #[test]
    fn test_error_macro() {
        let err = crate::translation_error!(transport, "Test error", 404);
        match err {
            TranslationError::Transport {
                message,
                status_code,
            } => {
                assert_eq!(message, "Test error");
                assert_eq!(status_code, Some(404));
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_retryable_classification() {
        assert!(crate::translation_error!(transport, "timeout").is_retryable());
        assert!(crate::translation_error!(invalid_response, "missing field").is_retryable());
        assert!(!crate::translation_error!(config, "batch_size", "must be positive").is_retryable());
        assert!(!TranslationError::TranslationFailed {
            attempts: 3,
            last_error: "timeout".to_string(),
        }
        .is_retryable());
    }

    #[test]
    fn test_anyhow_conversion() {
        let anyhow_err = anyhow::anyhow!("Test anyhow error");
        let translation_err: TranslationError = anyhow_err.into();

        match translation_err {
            TranslationError::Internal { .. } => {
                // Test passes
            }
            _ => panic!("Wrong error type"),
        }
    }
}
