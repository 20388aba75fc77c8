//! 树视图模型
//!
//! 与具体控件无关的投影结果，由 `projection::project` 生成，
//! 交给外部树视图只读渲染。

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectedNode {
    pub label: String,
    pub attribute_summary: String,
    /// 直接文本子节点的内容；多个文本子节点时最后一个生效
    pub inline_text: String,
    pub children: Vec<ProjectedNode>,
}

/// 扁平化后的一行，供列表式树视图使用
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeRow {
    pub depth: u16,
    pub label: String,
    pub attribute_summary: String,
    pub inline_text: String,
    pub has_children: bool,
}

impl ProjectedNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn labels_preorder(&self) -> Vec<&str> {
        let mut labels = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            labels.push(node.label.as_str());
            stack.extend(node.children.iter().rev());
        }
        labels
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    pub fn flatten(&self) -> Vec<TreeRow> {
        let mut result = Vec::new();
        let mut stack: Vec<(&ProjectedNode, u16)> = vec![(self, 0)];

        while let Some((node, depth)) = stack.pop() {
            result.push(TreeRow {
                depth,
                label: node.label.clone(),
                attribute_summary: node.attribute_summary.clone(),
                inline_text: node.inline_text.clone(),
                has_children: !node.children.is_empty(),
            });
            for child in node.children.iter().rev() {
                stack.push((child, depth.saturating_add(1)));
            }
        }

        result
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/projected.rs"]
mod tests;
