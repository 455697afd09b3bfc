//! 文档树模块
//!
//! 提供HTML解析、节点路径定位、原位文本回写和序列化功能。
//! 文档树由单次翻译请求独占，序列化后销毁。

// 标准库导入
use std::io::Cursor;

// 第三方crate导入
use html5ever::parse_document;
use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

// 本地模块导入
use crate::error::{Result, TranslationError};
use crate::translation_error;

/// 节点路径：从文档根到目标节点的子索引序列
///
/// 替代在树外长期持有的可变节点引用——提取阶段记录路径，
/// 回写阶段重新解析，避免悬挂引用风险。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// 创建节点路径
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// 获取子索引序列
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// 路径深度
    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

/// 解析后的HTML文档树
///
/// 对RcDom的轻量包装，承担翻译流水线需要的全部树操作：
/// 解析、路径解析、文本回写和序列化。
pub struct DocumentTree {
    dom: RcDom,
}

impl DocumentTree {
    /// 解析HTML字符串为文档树
    ///
    /// 解析失败是流水线中唯一的致命错误。
    pub fn parse(html: &str) -> Result<Self> {
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())
            .map_err(|e| translation_error!(html_parse, format!("{:?}", e)))?;

        Ok(Self { dom })
    }

    /// 获取文档根节点
    pub fn root(&self) -> Handle {
        self.dom.document.clone()
    }

    /// 按路径解析节点
    ///
    /// 路径失效（结构不符）时返回None，调用方保持节点原样。
    pub fn resolve(&self, path: &NodePath) -> Option<Handle> {
        let mut node = self.dom.document.clone();
        for &index in path.indices() {
            let child = node.children.borrow().get(index).cloned()?;
            node = child;
        }
        Some(node)
    }

    /// 获取路径处文本节点的内容（主要用于测试验证）
    pub fn text_at(&self, path: &NodePath) -> Option<String> {
        let node = self.resolve(path)?;
        match &node.data {
            NodeData::Text { contents } => Some(contents.borrow().to_string()),
            _ => None,
        }
    }

    /// 将译文原位写回路径处的文本节点
    ///
    /// 只替换文本内容，不触碰任何结构节点和属性。
    pub fn replace_text(&self, path: &NodePath, new_text: &str) -> Result<()> {
        let node = self.resolve(path).ok_or_else(|| TranslationError::Internal {
            source: anyhow::anyhow!("节点路径失效: {:?}", path),
        })?;

        match &node.data {
            NodeData::Text { contents } => {
                let mut content_ref = contents.borrow_mut();
                content_ref.clear();
                content_ref.push_slice(new_text);
                Ok(())
            }
            _ => Err(TranslationError::Internal {
                source: anyhow::anyhow!("路径指向的不是文本节点: {:?}", path),
            }),
        }
    }

    /// 序列化文档树为HTML字符串
    pub fn serialize(&self) -> Result<String> {
        let mut buffer = Vec::new();
        let cursor = Cursor::new(&mut buffer);

        serialize(
            cursor,
            &SerializableHandle::from(self.dom.document.clone()),
            SerializeOpts::default(),
        )
        .map_err(|e| TranslationError::Internal {
            source: anyhow::anyhow!("HTML序列化失败: {:?}", e),
        })?;

        String::from_utf8(buffer).map_err(|e| TranslationError::Internal {
            source: anyhow::anyhow!("UTF-8转换失败: {}", e),
        })
    }
}
