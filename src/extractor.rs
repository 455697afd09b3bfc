//! 文本提取模块
//!
//! 按文档顺序遍历文档树，收集可翻译文本片段，
//! 记录节点路径、结构角色和翻译优先级

// 第三方crate导入
use markup5ever_rcdom::{Handle, NodeData};

// 本地模块导入
use crate::dom::{DocumentTree, NodePath};

/// 不可翻译的容器角色，整棵子树跳过
pub const NON_TRANSLATABLE_CONTAINERS: &[&str] = &["script", "style", "meta", "link"];

/// 可翻译文本片段
///
/// 提取阶段创建；翻译成功后其路径处的文本被替换一次；
/// 翻译失败则保持原样，从不删除。
#[derive(Debug, Clone)]
pub struct TextFragment {
    /// 片段在文档树中的节点路径
    pub path: NodePath,
    /// 原始文本（未裁剪，含前后空白）
    pub original_text: String,
    /// 归一化文本（裁剪后，作为翻译输入）
    pub normalized_text: String,
    /// 结构角色：提取时片段所在容器的标签名
    pub structural_role: String,
    /// 翻译优先级，数值越大越先调度
    pub priority: u8,
}

impl TextFragment {
    /// 用译文替换归一化部分，保留原始文本的前后空白
    ///
    /// 回写时使用，保证文档的空白排版逐字节不变。
    pub fn with_translation(&self, translated: &str) -> String {
        let leading_end = self.original_text.len() - self.original_text.trim_start().len();
        let trailing_start = self.original_text.trim_end().len();

        format!(
            "{}{}{}",
            &self.original_text[..leading_end],
            translated,
            &self.original_text[trailing_start..]
        )
    }
}

/// 按直接容器角色查优先级表
///
/// 优先级只决定翻译调度顺序，不影响输出顺序——
/// 输出顺序始终由回写到原位置保证为文档顺序。
pub fn priority_for_role(role: &str) -> u8 {
    match role {
        "h1" => 5,
        "h2" => 4,
        "h3" => 3,
        "strong" | "b" => 2,
        "li" => 1,
        _ => 0,
    }
}

/// 判断文本是否适合翻译
///
/// 排除裁剪后长度≤1的文本，以及仅由空白、数字和标点组成的文本
/// （如 "42"、"3,14"，不含可翻译内容）
pub fn is_translatable_text(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.chars().count() > 1
        && !trimmed
            .chars()
            .all(|c| c.is_whitespace() || c.is_ascii_punctuation() || c.is_ascii_digit())
}

/// 提取文档树中的全部可翻译文本片段
///
/// 返回顺序为文档遍历顺序（深度优先），与序列化输出顺序一致。
pub fn extract_fragments(tree: &DocumentTree) -> Vec<TextFragment> {
    let mut fragments = Vec::new();
    let mut path = Vec::new();
    collect_fragments(&tree.root(), &mut path, "", &mut fragments);
    fragments
}

/// 递归收集子树中的文本片段
fn collect_fragments(
    node: &Handle,
    path: &mut Vec<usize>,
    container_role: &str,
    fragments: &mut Vec<TextFragment>,
) {
    for (index, child) in node.children.borrow().iter().enumerate() {
        path.push(index);

        match &child.data {
            NodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                if is_translatable_text(&text) {
                    fragments.push(TextFragment {
                        path: NodePath::new(path.clone()),
                        normalized_text: text.trim().to_string(),
                        original_text: text,
                        structural_role: container_role.to_string(),
                        priority: priority_for_role(container_role),
                    });
                }
            }
            NodeData::Element { name, .. } => {
                let tag_name = name.local.as_ref();
                if !NON_TRANSLATABLE_CONTAINERS.contains(&tag_name) {
                    collect_fragments(child, path, tag_name, fragments);
                }
            }
            _ => {}
        }

        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DocumentTree;

    const SAMPLE: &str = "<html><head><title>Lesson One</title>\
        <style>p { color: red; }</style></head><body>\
        <h1>Main Heading</h1>\
        <p>Some paragraph text</p>\
        <ul><li>First item</li></ul>\
        <p><strong>Bold claim</strong></p>\
        <script>var secret = 'do not translate';</script>\
        <p>42</p>\
        <p>3,14</p>\
        <p>A</p>\
        </body></html>";

    fn extract(html: &str) -> Vec<TextFragment> {
        let tree = DocumentTree::parse(html).unwrap();
        extract_fragments(&tree)
    }

    #[test]
    fn test_fragments_in_document_order() {
        let fragments = extract(SAMPLE);
        let texts: Vec<&str> = fragments.iter().map(|f| f.normalized_text.as_str()).collect();

        assert_eq!(
            texts,
            vec![
                "Lesson One",
                "Main Heading",
                "Some paragraph text",
                "First item",
                "Bold claim",
            ]
        );
    }

    #[test]
    fn test_structural_roles_and_priorities() {
        let fragments = extract(SAMPLE);

        let heading = &fragments[1];
        assert_eq!(heading.structural_role, "h1");
        assert_eq!(heading.priority, 5);

        let paragraph = &fragments[2];
        assert_eq!(paragraph.structural_role, "p");
        assert_eq!(paragraph.priority, 0);

        let item = &fragments[3];
        assert_eq!(item.structural_role, "li");
        assert_eq!(item.priority, 1);

        let bold = &fragments[4];
        assert_eq!(bold.structural_role, "strong");
        assert_eq!(bold.priority, 2);
    }

    #[test]
    fn test_script_and_style_content_excluded() {
        let fragments = extract(SAMPLE);

        assert!(fragments
            .iter()
            .all(|f| !f.normalized_text.contains("secret")));
        assert!(fragments.iter().all(|f| !f.normalized_text.contains("color")));
    }

    #[test]
    fn test_numeric_and_short_fragments_excluded() {
        let fragments = extract(SAMPLE);
        let texts: Vec<&str> = fragments.iter().map(|f| f.normalized_text.as_str()).collect();

        assert!(!texts.contains(&"42"));
        assert!(!texts.contains(&"3,14"));
        assert!(!texts.contains(&"A"));
    }

    #[test]
    fn test_paths_resolve_back_to_original_text() {
        let tree = DocumentTree::parse(SAMPLE).unwrap();
        let fragments = extract_fragments(&tree);

        for fragment in &fragments {
            assert_eq!(
                tree.text_at(&fragment.path),
                Some(fragment.original_text.clone())
            );
        }
    }

    #[test]
    fn test_with_translation_preserves_surrounding_whitespace() {
        let fragments = extract("<p>\n  Padded text  \n</p>");
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].normalized_text, "Padded text");

        let rebuilt = fragments[0].with_translation("译文");
        assert_eq!(rebuilt, "\n  译文  \n");
    }

    #[test]
    fn test_is_translatable_text_filter() {
        assert!(is_translatable_text("Hello world"));
        assert!(is_translatable_text("  padded  "));
        assert!(!is_translatable_text(""));
        assert!(!is_translatable_text("   "));
        assert!(!is_translatable_text("x"));
        assert!(!is_translatable_text("42"));
        assert!(!is_translatable_text("3,14"));
        assert!(!is_translatable_text("..."));
        assert!(!is_translatable_text("1.2.3"));
    }
}
