//! 解析后的 XML 文档模型
//!
//! 节点所有权严格树状：每个子节点只被父节点的 `children` 持有。

use compact_str::CompactString;

use crate::xml::TextEncoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: CompactString,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<CompactString>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocNode {
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: CompactString,
    /// 保持源文档中的声明顺序
    pub attributes: Vec<Attribute>,
    pub children: Vec<DocNode>,
}

impl Element {
    pub fn new(tag: impl Into<CompactString>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            DocNode::Element(e) => Some(e),
            _ => None,
        })
    }
}

/// 一次成功解析的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
    /// 解码时实际采用的编码
    pub encoding: TextEncoding,
}

impl Document {
    pub fn root(&self) -> &Element {
        &self.root
    }
}
