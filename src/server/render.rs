//! 页面渲染
//!
//! 服务端拼装完整 HTML：标题、上传表单、原文查看器、分析结果标签页
//!
//! 模型输出经过 markdown 渲染，其中的原始 HTML 一律按文本转义

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};
use pulldown_cmark::{html, Event, Options, Parser};

use crate::models::{DocumentKind, PendingDocument, SectionMap};

pub const PAGE_TITLE: &str = "AI Legal Contract Explainer";

/// 提示条类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

impl NoticeKind {
    fn css_class(self) -> &'static str {
        match self {
            NoticeKind::Success => "notice success",
            NoticeKind::Warning => "notice warning",
            NoticeKind::Error => "notice error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// 渲染一页所需的全部数据
#[derive(Debug, Default)]
pub struct PageView<'a> {
    pub notices: Vec<Notice>,
    pub contracts_used: u32,
    pub limit: u32,
    /// 已提取、等待分析的文档
    pub extracted: Option<&'a PendingDocument>,
    /// 刚完成的分析结果
    pub sections: Option<&'a SectionMap>,
}

impl PageView<'_> {
    fn limit_reached(&self) -> bool {
        self.contracts_used >= self.limit
    }
}

pub const LIMIT_MESSAGE: &str = "🚫 You’ve reached your free contract limit. Upgrade to continue.";

/// 渲染完整页面
pub fn render_page(view: &PageView<'_>) -> String {
    let mut body = String::new();

    let _ = write!(
        body,
        "<h1>📄 {}</h1>\n<p class=\"lead\">Upload a legal contract and get a clear summary of key terms, deadlines, and risks.</p>\n",
        PAGE_TITLE
    );

    for notice in &view.notices {
        body.push_str(&render_notice(notice));
    }

    if view.limit_reached() {
        // 结果页本身仍然展示，之后不再提供上传和分析
        if let Some(sections) = view.sections {
            body.push_str(&render_notice(&Notice::success("✅ Analysis complete!")));
            body.push_str(&render_tabs(sections));
        }
        body.push_str(&render_notice(&Notice::warning(LIMIT_MESSAGE)));
        return wrap_document(&body, view.sections.map_or(0, |s| s.len()));
    }

    body.push_str(&render_upload_form(view.contracts_used, view.limit));

    if let Some(pending) = view.extracted {
        body.push_str(&render_extracted(pending));
    }

    if let Some(sections) = view.sections {
        body.push_str(&render_notice(&Notice::success("✅ Analysis complete!")));
        body.push_str(&render_tabs(sections));
    }

    wrap_document(&body, view.sections.map_or(0, |s| s.len()))
}

fn render_notice(notice: &Notice) -> String {
    format!(
        "<div class=\"{}\">{}</div>\n",
        notice.kind.css_class(),
        encode_text(&notice.message)
    )
}

fn render_upload_form(used: u32, limit: u32) -> String {
    let accept = DocumentKind::ACCEPTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        r#"<form class="upload" action="/upload" method="post" enctype="multipart/form-data">
  <label for="contract">Upload your contract (PDF or DOCX)</label>
  <input type="file" id="contract" name="contract" accept="{}" required>
  <button type="submit">Upload</button>
  <p class="usage">{} of {} free analyses used</p>
</form>
"#,
        accept, used, limit
    )
}

fn render_extracted(pending: &PendingDocument) -> String {
    format!(
        r#"<div class="notice success">✅ Text extracted successfully.</div>
<details>
  <summary>🔍 View contract text</summary>
  <label for="contract-text">Contract Text ({})</label>
  <textarea id="contract-text" readonly rows="15">{}</textarea>
</details>
<form class="analyze" action="/analyze" method="post">
  <button type="submit">🔍 Explain My Contract with AI</button>
</form>
"#,
        encode_text(&pending.filename),
        encode_text(&pending.text)
    )
}

/// 每个章节一个标签页；红旗章节使用高亮样式
pub fn render_tabs(sections: &SectionMap) -> String {
    if sections.is_empty() {
        return String::new();
    }

    let mut out = String::from("<div class=\"tabs\">\n");
    for (i, section) in sections.iter().enumerate() {
        let checked = if i == 0 { " checked" } else { "" };
        let _ = writeln!(
            out,
            "  <input type=\"radio\" name=\"tabs\" id=\"tab-{i}\"{checked}><label for=\"tab-{i}\" title=\"{}\">{}</label>",
            encode_double_quoted_attribute(&section.title),
            encode_text(&section.title)
        );
    }
    for (i, section) in sections.iter().enumerate() {
        let class = if section.is_red_flag() {
            "panel red-flag"
        } else {
            "panel"
        };
        let _ = writeln!(
            out,
            "  <div class=\"{class}\" id=\"panel-{i}\">\n{}  </div>",
            markdown_to_html(&section.body)
        );
    }
    out.push_str("</div>\n");
    out
}

/// markdown → HTML，原始 HTML 按文本输出
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn wrap_document(body: &str, tab_count: usize) -> String {
    let mut tab_rules = String::new();
    for i in 0..tab_count {
        let _ = writeln!(
            tab_rules,
            "#tab-{i}:checked ~ #panel-{i} {{ display: block; }}"
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 46rem; margin: 2rem auto; padding: 0 1rem; color: #262730; }}
.notice {{ padding: 0.75rem 1rem; border-radius: 0.5rem; margin: 0.75rem 0; }}
.notice.success {{ background: #e8f5e9; color: #1b5e20; }}
.notice.warning {{ background: #fff8e1; color: #8a6d00; }}
.notice.error {{ background: #ffebee; color: #b71c1c; }}
form {{ margin: 1rem 0; }}
.usage {{ font-size: 0.85rem; color: #6b6b7b; }}
textarea {{ width: 100%; font-family: monospace; }}
.tabs > input {{ display: none; }}
.tabs > label {{ display: inline-block; padding: 0.5rem 0.9rem; cursor: pointer; border-bottom: 2px solid transparent; }}
.tabs > input:checked + label {{ border-bottom-color: #ff4b4b; }}
.tabs > .panel {{ display: none; padding: 0.5rem 0; border-top: 1px solid #e6e6ea; }}
.tabs > .panel.red-flag {{ color: #d32f2f; }}
{tab_rules}</style>
</head>
<body>
{body}</body>
</html>
"#,
        title = PAGE_TITLE,
        tab_rules = tab_rules,
        body = body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::split_sections;

    #[test]
    fn test_markdown_escapes_raw_html() {
        let html = markdown_to_html("- Clause <script>alert(1)</script> is vague");
        assert!(html.contains("<li>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_red_flag_panel_highlighted() {
        let sections = split_sections("## Summary\nAll good.\n## ⚠️ Red Flags\nClause 4 is vague.");
        let html = render_tabs(&sections);

        assert!(html.contains("<div class=\"panel\" id=\"panel-0\">"));
        assert!(html.contains("<div class=\"panel red-flag\" id=\"panel-1\">"));
        assert!(html.contains(">⚠️ Red Flags</label>"));
        assert!(html.contains("id=\"tab-0\" checked"));
    }

    #[test]
    fn test_limit_page_has_no_upload_form() {
        let view = PageView {
            contracts_used: 3,
            limit: 3,
            ..Default::default()
        };
        let html = render_page(&view);
        assert!(html.contains(LIMIT_MESSAGE));
        assert!(!html.contains("action=\"/upload\""));
    }

    #[test]
    fn test_extracted_text_is_escaped() {
        let pending = PendingDocument {
            filename: "a<b>.pdf".to_string(),
            text: "</textarea><b>bold</b>".to_string(),
        };
        let view = PageView {
            limit: 3,
            extracted: Some(&pending),
            ..Default::default()
        };
        let html = render_page(&view);
        assert!(html.contains("&lt;/textarea&gt;"));
        assert!(html.contains("action=\"/analyze\""));
        assert!(html.contains("action=\"/upload\""));
    }
}
