//! 上传文档模型

use std::fmt::Display;

/// 支持的文档类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// PDF
    Pdf,
    /// Word 文档（docx）
    Docx,
}

impl DocumentKind {
    /// 上传控件允许的扩展名
    pub const ACCEPTED_EXTENSIONS: [&'static str; 2] = ["pdf", "docx"];

    /// 从文件名的最后一个扩展名解析类型（不区分大小写）
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// 从扩展名解析类型
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
        }
    }
}

impl Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension().to_ascii_uppercase())
    }
}

/// 一次上传的原始文档
///
/// 只在一次"上传 → 提取"过程中存在
#[derive(Debug, Clone)]
pub struct Document {
    pub filename: String,
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

impl Document {
    /// 根据文件名判断类型，不支持的类型返回 `None`
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Option<Self> {
        let filename = filename.into();
        let kind = DocumentKind::from_filename(&filename)?;
        Some(Self {
            filename,
            kind,
            bytes,
        })
    }
}
