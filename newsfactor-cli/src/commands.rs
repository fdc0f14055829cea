//! Subcommand implementations.

use std::path::PathBuf;

use newsfactor::news::save_records;
use newsfactor::session::{AssistantSession, ChatSession, Drafter, OPENING_MESSAGE};
use newsfactor::workflow::{AgentState, WorkflowConfig, run_workflow};
use tracing::{info, warn};

use crate::cli::{ConfigCommands, CrawlArgs, RunArgs};
use crate::config::{self, AppConfig, IssueLevel};
use crate::console::{confirm, is_exit, read_line};
use crate::error::{CliError, Result};
use crate::providers::{build_crawler, build_pipeline, build_provider, crawl_options};

/// Crawl, score and save once.
pub async fn run(args: RunArgs, config: &AppConfig) -> Result<()> {
    let mut options = crawl_options(config);
    if let Some(path) = args.news_output {
        options.news_output = Some(path);
    }
    let workflow = WorkflowConfig {
        factor_output: args.output.unwrap_or_else(|| config.output.factor_file.clone()),
        factor_header: config.output.factor_header,
    };

    let state = match (args.url, args.query) {
        (Some(url), _) => AgentState::with_url(url),
        (None, Some(query)) => AgentState::from_query(query),
        (None, None) => AgentState::with_url(config.crawler.default_url.clone()),
    };
    let recommend = state.url.is_none();

    let pipeline = build_pipeline(config, options, workflow, recommend)?;
    let state = run_workflow(pipeline, state).await?;

    println!("新闻记录: {}", state.news_data.len());
    println!("影响分析: {}", state.factor_data.len());
    match state.save_status {
        Some(status) => println!("{status}"),
        None => println!("未提取到任何新闻，任务结束。"),
    }
    Ok(())
}

/// Crawl only and save the raw news records.
pub async fn crawl(args: CrawlArgs, config: &AppConfig) -> Result<()> {
    let mut options = crawl_options(config);
    options.strict |= args.strict;
    if args.article_links {
        options = options.with_article_filter();
    }
    let output = args.output.unwrap_or_else(|| config.output.news_file.clone());
    // The snapshot is written once below, to the requested path.
    options.news_output = None;
    let header = options.news_header;

    let crawler = build_crawler(config, options)?;
    let url = args.url.unwrap_or_else(|| config.crawler.default_url.clone());
    let records = crawler.crawl(&url).await;

    println!("{}", save_records(&records, &output, header));
    Ok(())
}

/// Conversational assistant that can launch the workflow.
pub async fn assistant(config: &AppConfig) -> Result<()> {
    let mut session = AssistantSession::new(build_provider(&config.providers.chat)?);
    println!("欢迎使用金融新闻助手！请输入您的问题（输入'exit'退出）：");

    while let Some(input) = read_line("\n用户: ")? {
        if is_exit(&input) {
            break;
        }
        if input.is_empty() {
            continue;
        }

        let reply = match session.send(&input).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Assistant turn failed");
                println!("\n请求失败：{e}");
                continue;
            }
        };
        println!("\n助手: {}", reply.text);

        let Some(url) = reply.first_url() else {
            continue;
        };
        if !confirm("\n检测到新闻URL，是否要执行新闻爬取和分析任务？")? {
            continue;
        }

        println!("\n开始执行新闻爬取和分析任务...");
        let workflow = WorkflowConfig {
            factor_output: config.output.factor_file.clone(),
            factor_header: config.output.factor_header,
        };
        let pipeline = build_pipeline(config, crawl_options(config), workflow, false)?;
        match run_workflow(pipeline, AgentState::with_url(url)).await {
            Ok(state) => println!(
                "\n任务执行完成！{}",
                state.save_status.unwrap_or_else(|| "未提取到任何新闻。".to_owned())
            ),
            Err(e) => println!("\n任务执行失败：{e}"),
        }
    }

    println!("\n感谢使用金融新闻助手！再见！");
    Ok(())
}

/// Plain chat; the transcript is saved on exit.
pub async fn chat(config: &AppConfig) -> Result<()> {
    let mut session = ChatSession::new(build_provider(&config.providers.chat)?);

    while let Some(input) = read_line("Enter: ")? {
        if is_exit(&input) {
            break;
        }
        match session.send(&input).await {
            Ok(reply) => println!("\nAI: {reply}\n"),
            Err(e) => println!("\n请求失败：{e}\n"),
        }
    }

    let path = &config.output.transcript_file;
    session.save_transcript(path).await?;
    println!("对话结束，记录已保存到 {}", path.display());
    Ok(())
}

/// Document drafter; ends once the document is saved.
pub async fn draft(config: &AppConfig) -> Result<()> {
    let provider = build_provider(&config.providers.chat)?;
    let mut drafter = match &config.output.draft_dir {
        Some(dir) => Drafter::with_output_dir(provider, dir.clone()),
        None => Drafter::new(provider),
    };

    println!("\n ===== DRAFTER =====");
    let mut input = OPENING_MESSAGE.to_owned();
    loop {
        let turn = drafter.step(&input).await?;
        if let Some(reply) = &turn.reply {
            println!("\nAI: {reply}");
        }
        for outcome in &turn.tool_results {
            println!("\n工具 {}: {}", outcome.name, outcome.output);
        }
        if drafter.is_finished().await {
            if let Some(path) = turn.saved_to {
                info!(path = %path.display(), "Draft saved");
            }
            break;
        }

        match read_line("\n你想要更新一些什么? ")? {
            Some(next) if !is_exit(&next) => input = next,
            _ => break,
        }
    }
    println!("\n ===== DRAFTER FINISHED =====");
    Ok(())
}

/// Configuration management.
pub async fn config(command: ConfigCommands, path: PathBuf, app_config: &AppConfig) -> Result<()> {
    match command {
        ConfigCommands::Path => println!("{}", path.display()),
        ConfigCommands::Show => print!("{}", config::to_toml(app_config)?),
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                println!("Configuration already exists at: {}", path.display());
                println!("Use --force to overwrite.");
                return Ok(());
            }
            config::save_config_to(&AppConfig::default(), &path).await?;
            println!("Configuration created: {}", path.display());
        }
        ConfigCommands::Validate => {
            let issues = app_config.validate();
            if issues.is_empty() {
                println!("Configuration is valid");
            }
            for issue in &issues {
                let level = match issue.level {
                    IssueLevel::Error => "error",
                    IssueLevel::Warning => "warning",
                };
                println!("{level}: {}: {}", issue.path, issue.message);
            }
            if !app_config.is_valid() {
                return Err(CliError::config("configuration has errors"));
            }
        }
    }
    Ok(())
}
