//! 文本提取服务 - 业务能力层
//!
//! 只负责"文档 → 纯文本"能力，按文件类型分派到 PDF / DOCX 两种实现
//!
//! ## 技术栈
//! - `pdf-extract`：逐页提取 PDF 文本层
//! - `docx-rust`：解析 DOCX 段落
//!
//! 只保留阅读顺序的线性文本，不保留版式、表格和样式

use std::io::Cursor;

use docx_rust::document::{BodyContent, Paragraph, ParagraphContent, Run, RunContent};
use docx_rust::DocxFile;
use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::{Document, DocumentKind};

/// 提取文档文本（同步，CPU 密集）
///
/// 提取结果为空白时返回 `ExtractionError::EmptyText`
pub fn extract(document: &Document) -> Result<String, ExtractionError> {
    debug!(
        "开始提取文本: {} ({}, {} 字节)",
        document.filename,
        document.kind,
        document.bytes.len()
    );

    let text = extract_bytes(&document.bytes, document.kind, &document.filename)?;

    if text.trim().is_empty() {
        return Err(ExtractionError::EmptyText {
            filename: document.filename.clone(),
        });
    }

    info!(
        "✓ 文本提取完成: {} ({} 字符)",
        document.filename,
        text.chars().count()
    );

    Ok(text)
}

/// 在阻塞线程池中提取文本，避免解析大文件时占用异步运行时
///
/// 解析库内部 panic 会表现为 `ExtractionError::Join`
pub async fn extract_blocking(document: Document) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || extract(&document)).await?
}

/// 按类型分派提取，不做空白检查
pub fn extract_bytes(
    bytes: &[u8],
    kind: DocumentKind,
    filename: &str,
) -> Result<String, ExtractionError> {
    match kind {
        DocumentKind::Pdf => extract_pdf(bytes).map_err(|message| ExtractionError::Pdf {
            filename: filename.to_string(),
            message,
        }),
        DocumentKind::Docx => extract_docx(bytes).map_err(|message| ExtractionError::Docx {
            filename: filename.to_string(),
            message,
        }),
    }
}

/// 按页顺序拼接每页文本层，页与页之间不额外插入分隔符
fn extract_pdf(bytes: &[u8]) -> Result<String, String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| e.to_string())?;
    debug!("PDF 共 {} 页", pages.len());
    Ok(pages.concat())
}

/// 按文档顺序输出每个正文段落的文本，每段后追加换行
fn extract_docx(bytes: &[u8]) -> Result<String, String> {
    let file = DocxFile::from_reader(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let docx = file.parse().map_err(|e| e.to_string())?;

    let mut text = String::new();
    let mut paragraphs = 0usize;
    for content in &docx.document.body.content {
        if let BodyContent::Paragraph(para) = content {
            text.push_str(&paragraph_text(para));
            text.push('\n');
            paragraphs += 1;
        }
    }
    debug!("DOCX 共 {} 个段落", paragraphs);

    Ok(text)
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();
    for pc in &para.content {
        match pc {
            ParagraphContent::Run(run) => push_run_text(&mut text, run),
            ParagraphContent::Link(link) => {
                if let Some(run) = &link.content {
                    push_run_text(&mut text, run);
                }
            }
            _ => {}
        }
    }
    text
}

fn push_run_text(text: &mut String, run: &Run) {
    for rc in &run.content {
        match rc {
            RunContent::Text(t) => text.push_str(&t.text),
            RunContent::Tab(_) => text.push('\t'),
            RunContent::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}
