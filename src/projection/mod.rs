//! 文档 → 树视图投影
//!
//! 每个元素对应一个 `ProjectedNode`：
//! - `label` 为标签名
//! - `attribute_summary` 按声明顺序拼接 `name="value"`，以 `", "` 分隔
//! - 直接文本子节点写入 `inline_text`，多个文本子节点时最后一个覆盖前面的
//!   （每个元素只有一个内容槽位，这是有意保留的简化）
//! - 注释不参与投影
//!
//! 纯函数，不持有任何状态。

use crate::models::{DocNode, Element, ProjectedNode};
use std::borrow::Cow;
use std::fmt;

pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectOptions {
    /// 根元素深度为 1
    pub max_depth: usize,
}

impl Default for ProjectOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthExceeded {
    pub limit: usize,
    /// 第一个超出限制的元素
    pub label: String,
}

impl fmt::Display for DepthExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "document too deeply nested: <{}> exceeds depth limit {}",
            self.label, self.limit
        )
    }
}

impl std::error::Error for DepthExceeded {}

pub fn project(root: &Element, options: &ProjectOptions) -> Result<ProjectedNode, DepthExceeded> {
    project_element(root, 1, options.max_depth)
}

fn project_element(
    element: &Element,
    depth: usize,
    limit: usize,
) -> Result<ProjectedNode, DepthExceeded> {
    if depth > limit {
        return Err(DepthExceeded {
            limit,
            label: element.tag.to_string(),
        });
    }

    let mut node = ProjectedNode::new(element.tag.as_str());
    node.attribute_summary = attribute_summary(element);

    for child in &element.children {
        match child {
            DocNode::Element(e) => node.children.push(project_element(e, depth + 1, limit)?),
            DocNode::Text(text) => node.inline_text = text.clone(),
            DocNode::Comment(_) => {}
        }
    }

    Ok(node)
}

pub fn attribute_summary(element: &Element) -> String {
    element
        .attributes
        .iter()
        .map(|a| format!("{}=\"{}\"", a.name, escape_attr(&a.value)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 摘要只转义 `&` 和 `"`
fn escape_attr(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '"']) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(value.replace('&', "&amp;").replace('"', "&quot;"))
}

#[cfg(test)]
#[path = "../../tests/unit/projection.rs"]
mod tests;
