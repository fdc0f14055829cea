//! End-to-end workflow over HTTP pages with a scripted model.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;

use assert_fs::TempDir;
use assert_fs::prelude::*;
use httpmock::{Method::GET, MockServer};
use newsfactor::prelude::*;

fn page(title: &str, body: &str) -> String {
    format!("<html><body><h1>{title}</h1><p>{body}</p></body></html>")
}

fn scripted_model(server: &MockServer) -> Arc<MockProvider> {
    let first = server.url("/a/1.html");
    let second = server.url("/a/2.html");
    Arc::new(MockProvider::from_fn(move |req| {
        let text = req.last_user_text().unwrap_or_default();
        let reply = if text.contains("新闻标题：甲公司中标") {
            r#"分析结果：{"summary": "甲公司中标大型项目", "impact": "+1"}"#.to_owned()
        } else if text.contains("新闻标题：乙公司股东减持") {
            r#"{"summary": "乙公司股东计划减持", "impact": -1}"#.to_owned()
        } else if text.contains("快讯列表") {
            format!(
                r#"{{"items": [{{"url": "{first}"}}, {{"url": "{second}"}}, {{"url": ""}}]}}"#
            )
        } else if text.contains("中标") {
            r#"{"items": [{"news_time": "2025-06-05 09:30", "news_title": "甲公司中标", "news_text": "甲公司中标大型项目", "company_involved": "甲公司", "stock_code": "600001", "stock_short_name": "甲股份"}]}"#.to_owned()
        } else if text.contains("减持") {
            r#"{"items": [{"news_time": "2025-06-05 10:00", "news_title": "乙公司股东减持", "news_text": "乙公司股东计划减持", "company_involved": "乙公司", "stock_code": "000002", "stock_short_name": "乙科技"}]}"#.to_owned()
        } else {
            "无法处理".to_owned()
        };
        Ok(ChatResponse::from_message(Message::assistant(reply)))
    }))
}

fn pipeline(server: &MockServer, dir: &TempDir) -> NewsPipeline {
    let provider = scripted_model(server);
    let web = WebCrawler::new(
        Arc::new(HttpFetcher::new().unwrap()),
        LlmExtractor::new(provider.clone()),
    );
    let crawler = NewsCrawler::new(
        web,
        CrawlOptions {
            news_output: Some(dir.child("news.csv").path().to_path_buf()),
            news_header: HeaderStyle::ChineseShort,
            ..CrawlOptions::default()
        },
    );
    NewsPipeline::new(crawler, ImpactAnalyzer::new(provider)).with_config(WorkflowConfig {
        factor_output: dir.child("factor.csv").path().to_path_buf(),
        factor_header: HeaderStyle::Chinese,
    })
}

#[tokio::test]
async fn crawls_scores_and_saves() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/list.html");
        then.status(200).body(page("快讯列表", "两条新闻"));
    });
    server.mock(|when, then| {
        when.method(GET).path("/a/1.html");
        then.status(200).body(page("甲公司中标", "甲公司中标大型项目"));
    });
    server.mock(|when, then| {
        when.method(GET).path("/a/2.html");
        then.status(200).body(page("乙公司股东减持", "乙公司股东计划减持"));
    });

    let dir = TempDir::new().unwrap();
    let state = run_workflow(
        pipeline(&server, &dir),
        AgentState::with_url(server.url("/list.html")),
    )
    .await
    .unwrap();

    assert_eq!(state.news_data.len(), 2);
    let labels: Vec<_> = state.factor_data.iter().map(|f| f.impact_direction).collect();
    assert_eq!(labels, [ImpactLabel::Positive, ImpactLabel::Negative]);
    assert!(state.save_status.unwrap().starts_with("Successfully saved 2 records to "));

    let news = std::fs::read_to_string(dir.child("news.csv").path()).unwrap();
    assert!(news.starts_with("时间,标题,正文,涉及公司,股票代码,股票简称\n"));
    let factor = std::fs::read_to_string(dir.child("factor.csv").path()).unwrap();
    let lines: Vec<_> = factor.lines().collect();
    assert_eq!(lines[0], "公司名称,股票代码,股票简称,新闻时间,新闻标题,影响方向,新闻摘要");
    assert_eq!(lines[1], "甲公司,600001,甲股份,2025-06-05 09:30,甲公司中标,1,甲公司中标大型项目");
    assert_eq!(lines[2], "乙公司,000002,乙科技,2025-06-05 10:00,乙公司股东减持,-1,乙公司股东计划减持");
}

#[tokio::test]
async fn missing_listing_aborts_the_run() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/list.html");
        then.status(500);
    });

    let dir = TempDir::new().unwrap();
    let state = run_workflow(
        pipeline(&server, &dir),
        AgentState::with_url(server.url("/list.html")),
    )
    .await
    .unwrap();

    assert!(state.news_data.is_empty());
    assert!(state.save_status.is_none());
    assert!(!dir.child("news.csv").path().exists());
    assert!(!dir.child("factor.csv").path().exists());
}
