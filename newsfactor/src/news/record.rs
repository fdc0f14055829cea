//! News and impact records.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::Value;

/// One listed company mentioned in one article.
///
/// An article naming several companies yields one record per company with
/// identical time, title and text. Missing fields read as empty strings, and
/// scalar values such as a numeric stock code are converted to text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(rename = "NewsContent")]
pub struct NewsRecord {
    /// Publication date and time, e.g. "2025年06月05日 14:11".
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub news_time: String,
    /// The article's full original title, unmodified.
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub news_title: String,
    /// The complete body text of the article.
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub news_text: String,
    /// Full registered name of a listed company mentioned in the article.
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub company_involved: String,
    /// Official security code of that company, e.g. "000001.SZ".
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub stock_code: String,
    /// Exchange short name of that company.
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub stock_short_name: String,
}

/// Extraction schema for article pages.
pub type NewsContent = NewsRecord;

impl NewsRecord {
    /// JSON keys of every field, in column order.
    pub const FIELDS: [&'static str; 6] = [
        "news_time",
        "news_title",
        "news_text",
        "company_involved",
        "stock_code",
        "stock_short_name",
    ];
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}

/// Extraction schema for listing pages: one article link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NewsUrl {
    /// The article link only, without any surrounding text.
    #[serde(default)]
    pub url: String,
}

/// Ternary sentiment of a news item toward a company.
///
/// Serialized as the integer `1`, `-1` or `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImpactLabel {
    /// Favourable news (`+1`).
    Positive,
    /// Unfavourable news (`-1`).
    Negative,
    /// Neutral news (`0`).
    Neutral,
}

impl ImpactLabel {
    /// Integer value of the label.
    #[must_use]
    pub const fn value(self) -> i8 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
            Self::Neutral => 0,
        }
    }

    /// Label for an integer, if it is one of `1`, `-1`, `0`.
    #[must_use]
    pub const fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Positive),
            -1 => Some(Self::Negative),
            0 => Some(Self::Neutral),
            _ => None,
        }
    }

    /// Label for a textual form: `"+1"`, `"1"`, `"-1"`, `"0"` or `"+0"`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "+1" | "1" => Some(Self::Positive),
            "-1" => Some(Self::Negative),
            "0" | "+0" | "-0" => Some(Self::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for ImpactLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl Serialize for ImpactLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.value())
    }
}

impl<'de> Deserialize<'de> for ImpactLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LabelVisitor;

        impl de::Visitor<'_> for LabelVisitor {
            type Value = ImpactLabel;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("one of 1, -1, 0 (as integer or string)")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                ImpactLabel::from_value(v)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Signed(v), &self))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                i64::try_from(v)
                    .ok()
                    .and_then(ImpactLabel::from_value)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                ImpactLabel::parse(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(LabelVisitor)
    }
}

impl JsonSchema for ImpactLabel {
    fn schema_name() -> std::borrow::Cow<'static, str> {
        "ImpactLabel".into()
    }

    fn json_schema(_generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::json_schema!({
            "type": "integer",
            "enum": [1, -1, 0],
            "description": "1 for positive, -1 for negative, 0 for neutral impact"
        })
    }
}

/// The model's verdict on one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImpactAnalysis {
    /// One-sentence summary of the news.
    pub summary: String,
    /// Direction of the impact on the company.
    pub impact: ImpactLabel,
}

/// A scored news item, written to the factor file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactRecord {
    /// Company name, taken from [`NewsRecord::company_involved`].
    pub company_name: String,
    /// Security code.
    pub stock_code: String,
    /// Exchange short name.
    pub stock_short_name: String,
    /// Publication time.
    pub news_time: String,
    /// Article title.
    pub news_title: String,
    /// Sentiment toward the company.
    pub impact_direction: ImpactLabel,
    /// One-sentence summary.
    pub news_summary: String,
}

impl ImpactRecord {
    /// Field names in column order.
    pub const FIELDS: [&'static str; 7] = [
        "company_name",
        "stock_code",
        "stock_short_name",
        "news_time",
        "news_title",
        "impact_direction",
        "news_summary",
    ];

    /// Combine a news record with its analysis.
    #[must_use]
    pub fn from_analysis(news: &NewsRecord, analysis: ImpactAnalysis) -> Self {
        Self {
            company_name: news.company_involved.clone(),
            stock_code: news.stock_code.clone(),
            stock_short_name: news.stock_short_name.clone(),
            news_time: news.news_time.clone(),
            news_title: news.news_title.clone(),
            impact_direction: analysis.impact,
            news_summary: analysis.summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn news_record_fills_missing_and_coerces_scalars() {
        let record: NewsRecord = serde_json::from_value(serde_json::json!({
            "news_title": "锦江酒店拟启动港股IPO",
            "stock_code": 600754,
            "company_involved": null
        }))
        .unwrap();

        assert_eq!(record.news_title, "锦江酒店拟启动港股IPO");
        assert_eq!(record.stock_code, "600754");
        assert_eq!(record.company_involved, "");
        assert_eq!(record.news_text, "");
    }

    #[test]
    fn impact_label_accepts_known_forms() {
        for (raw, expected) in [
            ("1", ImpactLabel::Positive),
            ("-1", ImpactLabel::Negative),
            ("0", ImpactLabel::Neutral),
            (r#""+1""#, ImpactLabel::Positive),
            (r#""1""#, ImpactLabel::Positive),
            (r#""-1""#, ImpactLabel::Negative),
            (r#""0""#, ImpactLabel::Neutral),
            (r#""+0""#, ImpactLabel::Neutral),
        ] {
            let label: ImpactLabel = serde_json::from_str(raw).unwrap();
            assert_eq!(label, expected, "input {raw}");
        }
    }

    #[test]
    fn impact_label_rejects_other_values() {
        for raw in ["2", "-2", "1.0", r#""positive""#, r#""+2""#, "null", "true"] {
            assert!(serde_json::from_str::<ImpactLabel>(raw).is_err(), "input {raw}");
        }
    }

    #[test]
    fn impact_label_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&ImpactLabel::Negative).unwrap(), "-1");
        assert_eq!(ImpactLabel::Positive.to_string(), "1");
    }

    #[test]
    fn impact_record_copies_news_fields() {
        let news = NewsRecord {
            news_time: "2025年06月05日 14:11".into(),
            news_title: "title".into(),
            news_text: "body".into(),
            company_involved: "锦江酒店".into(),
            stock_code: "600754".into(),
            stock_short_name: "锦江酒店".into(),
        };
        let record = ImpactRecord::from_analysis(
            &news,
            ImpactAnalysis {
                summary: "拟赴港上市".into(),
                impact: ImpactLabel::Positive,
            },
        );
        assert_eq!(record.company_name, "锦江酒店");
        assert_eq!(record.impact_direction, ImpactLabel::Positive);
        assert_eq!(record.news_summary, "拟赴港上市");
    }

    #[test]
    fn schemas_carry_descriptions() {
        let (name, schema) = crate::chat::generate_json_schema::<NewsContent>();
        assert_eq!(name, "NewsContent");
        assert!(schema["properties"]["stock_code"]["description"].is_string());

        let (name, _) = crate::chat::generate_json_schema::<NewsUrl>();
        assert_eq!(name, "NewsUrl");
    }
}
