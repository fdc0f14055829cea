//! Sentiment scoring of news records through a chat model.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{info, warn};

use super::record::{ImpactAnalysis, ImpactRecord, NewsRecord};
use crate::chat::{ChatProvider, ChatRequest};
use crate::error::{Error, Result};

static BARE_PLUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"("impact"\s*:\s*)\+(\d)"#).expect("valid regex"));

/// Prompt asking for a one-sentence summary and a ternary impact label.
#[must_use]
pub fn build_prompt(news: &NewsRecord) -> String {
    format!(
        "请分析以下新闻对公司的影响：\n\n\
         新闻标题：{title}\n\
         新闻正文：{text}\n\
         涉及公司：{company}\n\n\
         请提供：\n\
         1. 一句话新闻摘要\n\
         2. 影响方向：正面影响输出1，负面影响输出-1，中性影响输出0\n\n\
         只返回如下格式的JSON，不要包含其他内容：\n\
         {{\"summary\": \"新闻摘要\", \"impact\": 影响方向数字}}",
        title = news.news_title,
        text = news.news_text,
        company = news.company_involved,
    )
}

/// The span from the first `{` to the last `}`, if there is one.
#[must_use]
pub fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

/// Remove `+` signs that make a model's JSON invalid.
///
/// `"+1"` and `"+0"` become bare numbers, any other `"+` loses its plus, and
/// a bare `+` before the `impact` digit is dropped. A `+` elsewhere inside a
/// string value is kept.
#[must_use]
pub fn normalize_signs(json: &str) -> String {
    let text = json
        .replace("\"+1\"", "1")
        .replace("\"+0\"", "0")
        .replace("\"+", "\"");
    BARE_PLUS_RE.replace_all(&text, "$1$2").into_owned()
}

/// Parse a model reply into an [`ImpactAnalysis`].
///
/// # Errors
///
/// Fails when the reply holds no `{...}` span, the span is not valid JSON,
/// `summary` or `impact` is missing, or `impact` is not a valid label.
pub fn parse_analysis(reply: &str) -> Result<ImpactAnalysis> {
    let json = extract_json_object(reply)
        .ok_or_else(|| Error::analysis(format!("no JSON object in reply: {reply}")))?;
    let normalized = normalize_signs(json);
    serde_json::from_str(&normalized)
        .map_err(|e| Error::analysis(format!("{e} in reply: {normalized}")))
}

/// Scores news records one at a time.
#[derive(Clone)]
pub struct ImpactAnalyzer {
    provider: Arc<dyn ChatProvider>,
    temperature: Option<f32>,
}

impl std::fmt::Debug for ImpactAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImpactAnalyzer")
            .field("provider", &self.provider.provider_name())
            .finish_non_exhaustive()
    }
}

impl ImpactAnalyzer {
    /// Create an analyzer using the provider's default model.
    #[must_use]
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            provider,
            temperature: None,
        }
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Score one record.
    ///
    /// # Errors
    ///
    /// Propagates provider failures and [`parse_analysis`] errors.
    pub async fn analyze(&self, news: &NewsRecord) -> Result<ImpactRecord> {
        let request = ChatRequest::default()
            .user(build_prompt(news))
            .temperature_opt(self.temperature);
        let response = self.provider.chat(&request).await?;
        let analysis = parse_analysis(response.text().unwrap_or_default())?;
        Ok(ImpactRecord::from_analysis(news, analysis))
    }

    /// Score every record in order; failures are logged and skipped.
    pub async fn analyze_all(&self, news: &[NewsRecord]) -> Vec<ImpactRecord> {
        let mut factors = Vec::with_capacity(news.len());
        for record in news {
            match self.analyze(record).await {
                Ok(factor) => {
                    info!(title = %record.news_title, impact = %factor.impact_direction, "Analyzed news");
                    factors.push(factor);
                }
                Err(e) => warn!(title = %record.news_title, error = %e, "Analysis failed"),
            }
        }
        factors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::MockProvider;
    use crate::news::record::ImpactLabel;

    #[test]
    fn slices_first_to_last_brace() {
        assert_eq!(
            extract_json_object("好的：{\"summary\": \"a\", \"impact\": 1} 以上"),
            Some("{\"summary\": \"a\", \"impact\": 1}")
        );
        assert_eq!(extract_json_object("{\"a\": {\"b\": 1}}"), Some("{\"a\": {\"b\": 1}}"));
        assert!(extract_json_object("no json").is_none());
        assert!(extract_json_object("} backwards {").is_none());
    }

    #[test]
    fn normalizes_plus_signs() {
        assert_eq!(normalize_signs(r#"{"impact": "+1"}"#), r#"{"impact": 1}"#);
        assert_eq!(normalize_signs(r#"{"impact": "+0"}"#), r#"{"impact": 0}"#);
        assert_eq!(normalize_signs(r#"{"impact": +1}"#), r#"{"impact": 1}"#);
        assert_eq!(normalize_signs(r#"{"impact":+1}"#), r#"{"impact":1}"#);
        assert_eq!(normalize_signs(r#"{"s": "+5%"}"#), r#"{"s": "5%"}"#);
        assert_eq!(normalize_signs(r#"{"s": "a+b", "impact": -1}"#), r#"{"s": "a+b", "impact": -1}"#);
    }

    #[test]
    fn signs_inside_summary_text() {
        let analysis = parse_analysis(r#"{"summary": "涨幅:+5%", "impact": 1}"#).unwrap();
        assert_eq!(analysis.summary, "涨幅:+5%");

        let analysis = parse_analysis(r#"{"summary": "涨幅: +5%，利好", "impact": +1}"#).unwrap();
        assert_eq!(analysis.summary, "涨幅: +5%，利好");
        assert_eq!(analysis.impact, ImpactLabel::Positive);

        // A leading quoted plus is stripped along with the label's.
        let analysis = parse_analysis(r#"{"summary": "+3% 上涨", "impact": "+1"}"#).unwrap();
        assert_eq!(analysis.summary, "3% 上涨");
        assert_eq!(analysis.impact, ImpactLabel::Positive);
    }

    #[test]
    fn parses_replies() {
        let analysis = parse_analysis("```json\n{\"summary\": \"利好\", \"impact\": +1}\n```").unwrap();
        assert_eq!(analysis.impact, ImpactLabel::Positive);
        assert_eq!(analysis.summary, "利好");

        let analysis = parse_analysis(r#"{"summary": "x", "impact": "-1"}"#).unwrap();
        assert_eq!(analysis.impact, ImpactLabel::Negative);

        assert!(parse_analysis("没有JSON").is_err());
        assert!(parse_analysis(r#"{"summary": "x"}"#).is_err());
        assert!(parse_analysis(r#"{"impact": 0}"#).is_err());
        assert!(parse_analysis(r#"{"summary": "x", "impact": 3}"#).is_err());
    }

    #[test]
    fn prompt_mentions_record_fields() {
        let prompt = build_prompt(&NewsRecord {
            news_title: "标题A".into(),
            news_text: "正文B".into(),
            company_involved: "公司C".into(),
            ..NewsRecord::default()
        });
        assert!(prompt.contains("标题A"));
        assert!(prompt.contains("正文B"));
        assert!(prompt.contains("公司C"));
        assert!(prompt.contains(r#"{"summary""#));
    }

    #[tokio::test]
    async fn analyze_all_skips_failures() {
        let provider = Arc::new(MockProvider::new([
            r#"{"summary": "好", "impact": 1}"#,
            "抱歉，我无法判断",
            r#"{"summary": "中性", "impact": "+0"}"#,
        ]));
        let analyzer = ImpactAnalyzer::new(provider.clone());
        let news: Vec<NewsRecord> = ["a", "b", "c"]
            .into_iter()
            .map(|t| NewsRecord {
                news_title: t.to_owned(),
                company_involved: format!("{t} corp"),
                ..NewsRecord::default()
            })
            .collect();

        let factors = analyzer.analyze_all(&news).await;
        assert_eq!(factors.len(), 2);
        assert_eq!(factors[0].company_name, "a corp");
        assert_eq!(factors[1].news_title, "c");
        assert_eq!(factors[1].impact_direction, ImpactLabel::Neutral);
        assert_eq!(provider.calls(), 3);
    }
}
