//! 章节拆分
//!
//! 以行首的 `## ` 二级标题为分隔，把模型回复拆成 标题 → 正文
//!
//! 没有任何标题时整段回复成为一个章节，标题是回复的第一行

use std::sync::OnceLock;

use regex::Regex;

use crate::models::SectionMap;

fn heading_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"(?m)^##[ \t]+").expect("标题正则无效"))
}

/// 拆分模型回复
pub fn split_sections(reply: &str) -> SectionMap {
    let mut sections = SectionMap::new();

    for chunk in heading_marker().split(reply) {
        if chunk.trim().is_empty() {
            continue;
        }
        let mut lines = chunk.lines();
        let title = lines.next().unwrap_or_default();
        let body = lines.collect::<Vec<_>>().join("\n");
        sections.insert(title, body);
    }

    sections
}
