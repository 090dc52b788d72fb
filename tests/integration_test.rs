use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use contract_explainer::config::Config;
use contract_explainer::server::{self, AppState};
use contract_explainer::utils::logging;
use contract_explainer::{AnalysisRequest, Analyzer, AppResult};
use http_body_util::BodyExt;
use tower::ServiceExt;

const REPLY: &str = "## 📄 Summary\nA supply agreement.\n\n## 📌 Obligations\n- Supplier delivers monthly\n\n## ⏱️ Deadlines\n- Payment within 30 days\n\n## ⚠️ Red Flags\n- Clause 4 is vague.";

/// 不联网的分析桩
struct StubAnalyzer;

impl Analyzer for StubAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest) -> AppResult<String> {
        assert!(request.user_message.chars().count() <= 16_000);
        Ok(REPLY.to_string())
    }
}

fn test_app() -> Router {
    logging::init(false);
    let config = Config {
        llm_api_key: "sk-test".to_string(),
        ..Config::default()
    };
    let state = Arc::new(AppState::new(StubAnalyzer, &config));
    server::router(state, config.max_upload_bytes)
}

fn docx_bytes(paragraphs: &[&'static str]) -> Vec<u8> {
    let mut docx = docx_rust::Docx::default();
    for text in paragraphs {
        docx.document
            .push(docx_rust::document::Paragraph::default().push_text(*text));
    }
    let mut cursor = Cursor::new(Vec::new());
    docx.write(&mut cursor).expect("生成 DOCX 失败");
    cursor.into_inner()
}

fn upload_request(cookie: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "contract-explainer-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"contract\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .unwrap()
}

fn analyze_request(cookie: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

/// 打开首页，返回会话 Cookie（`name=value`）
async fn open_session(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("缺少 Set-Cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_upload_then_analyze() {
    let app = test_app();
    let cookie = open_session(&app).await;

    let docx = docx_bytes(&["Supplier shall deliver monthly.", "Buyer pays in 30 days."]);
    let (status, body) = send(&app, upload_request(&cookie, "supply.docx", &docx)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Text extracted successfully"));
    assert!(body.contains("Supplier shall deliver monthly.\nBuyer pays in 30 days.\n"));
    assert!(body.contains("action=\"/analyze\""));
    // 提取后不会自动分析
    assert!(!body.contains("class=\"tabs\""));

    let (status, body) = send(&app, analyze_request(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Analysis complete!"));
    assert!(body.contains(">📄 Summary</label>"));
    assert!(body.contains(">⚠️ Red Flags</label>"));
    assert_eq!(body.matches("class=\"panel red-flag\"").count(), 1);
    assert_eq!(body.matches("<input type=\"radio\"").count(), 4);
    assert!(body.contains("1 of 3 free analyses used"));
}

#[tokio::test]
async fn test_unsupported_file_type() {
    let app = test_app();
    let cookie = open_session(&app).await;

    let (status, body) = send(&app, upload_request(&cookie, "notes.txt", b"hello")).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body.contains("Unsupported file type."));
    // 上传入口仍然可用
    assert!(body.contains("action=\"/upload\""));
    assert!(!body.contains("action=\"/analyze\""));
}

#[tokio::test]
async fn test_analyze_without_upload() {
    let app = test_app();
    let cookie = open_session(&app).await;

    let (status, body) = send(&app, analyze_request(&cookie)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Upload a contract before asking for an explanation."));
}

#[tokio::test]
async fn test_usage_limit_per_session() {
    let app = test_app();
    let cookie = open_session(&app).await;
    let docx = docx_bytes(&["Clause one."]);

    for _ in 0..3 {
        let (status, _) = send(&app, upload_request(&cookie, "c.docx", &docx)).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, analyze_request(&cookie)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, upload_request(&cookie, "c.docx", &docx)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("You’ve reached your free contract limit"));
    assert!(!body.contains("action=\"/upload\""));

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/usage")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let usage: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(usage["contracts_used"], 3);
    assert_eq!(usage["remaining"], 0);
    assert_eq!(usage["limit_reached"], true);

    // 新会话不受影响
    let other = open_session(&app).await;
    assert_ne!(other, cookie);
    let (status, _) = send(&app, upload_request(&other, "c.docx", &docx)).await;
    assert_eq!(status, StatusCode::OK);
}

/// 使用真实模型完成一次完整流程
///
/// 运行方式：`OPENAI_API_KEY=sk-... cargo test test_live_analysis -- --ignored --nocapture`
#[tokio::test]
#[ignore]
async fn test_live_analysis() {
    logging::init(true);
    let config = Config::load().expect("加载配置失败");
    let state = Arc::new(AppState::new(
        contract_explainer::LlmService::new(&config),
        &config,
    ));
    let app = server::router(state, config.max_upload_bytes);
    let cookie = open_session(&app).await;

    let docx = docx_bytes(&[
        "The Contractor shall deliver the software by 31 December.",
        "The Client may terminate at any time without notice.",
    ]);
    let (status, _) = send(&app, upload_request(&cookie, "live.docx", &docx)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, analyze_request(&cookie)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body.contains("class=\"tabs\""));
}
