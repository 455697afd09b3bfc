/// 翻译服务配置常量
///
/// 该文件定义了翻译流水线相关的常量配置，方便统一管理和维护

/// 默认翻译API配置
pub mod api_config {
    /// 默认翻译API地址（本地翻译服务）
    pub const DEFAULT_API_URL: &str = "http://localhost:5000/translate";

    /// 请求超时时间（秒）
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;
}

/// 翻译流水线配置
pub mod service_config {
    /// 默认目标语言（旁遮普语）
    pub const DEFAULT_TARGET_LANG: &str = "pa";

    /// 默认批次并发大小（1表示完全串行）
    pub const DEFAULT_BATCH_SIZE: usize = 5;

    /// 默认批次间延迟（毫秒）
    pub const DEFAULT_INTER_BATCH_DELAY_MS: u64 = 500;

    /// 默认最大尝试次数
    pub const DEFAULT_MAX_RETRIES: usize = 3;

    /// 默认退避基数（毫秒）
    pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;

    /// 默认同批次错峰单位（毫秒）
    pub const DEFAULT_STAGGER_UNIT_MS: u64 = 250;

    /// 滑动窗口内默认最大请求数
    pub const DEFAULT_MAX_REQUESTS_PER_WINDOW: usize = 10;

    /// 默认滑动窗口时长（毫秒）
    pub const DEFAULT_WINDOW_DURATION_MS: u64 = 1_000;
}

/// 结构角色对应的翻译上下文提示
///
/// 提示随请求发送给翻译服务，用于调整译文语域，不影响本地逻辑
pub mod context_hints {
    /// 标题类角色（h1-h6）
    pub const HEADING: &str = "Heading text: translate accurately and keep it concise.";

    /// 列表项角色
    pub const LIST_ITEM: &str = "List item: keep the translation short and parallel in form.";

    /// 强调类角色（strong/b/em/i）
    pub const EMPHASIS: &str = "Emphasized phrase: preserve the emphasis in translation.";

    /// 其余角色的通用段落提示
    pub const PARAGRAPH: &str = "Paragraph text: translate naturally and fluently.";
}

/// 验证API URL是否有效
pub fn is_valid_api_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
