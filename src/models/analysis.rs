//! 分析请求与分析结果模型

/// 发送给模型的一次分析请求
///
/// 固定两条消息：系统指令 + 截断后的合同文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub system_message: String,
    pub user_message: String,
}

/// 模型回复中的一个章节
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub body: String,
}

impl Section {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// 标题包含 "Red Flag"（区分大小写）或警告符号时需要高亮显示
    pub fn is_red_flag(&self) -> bool {
        self.title.contains("Red Flag") || self.title.contains('\u{26A0}')
    }
}

/// 标题 → 正文 的有序映射
///
/// 标题唯一；顺序为标题首次出现的顺序，重复标题覆盖正文但保留原位置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    sections: Vec<Section>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, title: impl Into<String>, body: impl Into<String>) {
        let title = title.into();
        let body = body.into();
        match self.sections.iter_mut().find(|s| s.title == title) {
            Some(existing) => existing.body = body,
            None => self.sections.push(Section { title, body }),
        }
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.title == title)
            .map(|s| s.body.as_str())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.title.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }
}

impl<'a> IntoIterator for &'a SectionMap {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}
