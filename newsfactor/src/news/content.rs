//! Validation of records extracted from article pages.

use serde_json::Value;
use tracing::debug;

use super::record::NewsRecord;

/// Instruction given to the extraction model for article pages.
pub const CONTENT_INSTRUCTION: &str = "\
请从新闻页面提取以下信息：\n\
1. news_time: 新闻发布的具体时间（格式：YYYY年MM月DD日 HH:mm）\n\
2. news_title: 新闻的完整标题\n\
3. news_text: 新闻的完整正文内容\n\
4. company_involved: 新闻中提到的上市公司全称\n\
5. stock_code: 对应的股票代码（如：000001.SZ）\n\
6. stock_short_name: 公司在交易所的简称\n\
如果新闻涉及多家公司，请为每家公司分别创建一条记录，各条记录的时间、标题和正文保持相同。\
找不到的字段返回空字符串。";

fn has_all_fields(item: &serde_json::Map<String, Value>) -> bool {
    NewsRecord::FIELDS.iter().all(|key| item.contains_key(*key))
}

/// Turn extracted content into news records.
///
/// A single object is treated as a one-element list; non-object entries are
/// skipped. In `strict` mode objects missing any of the six fields are
/// dropped and an empty result becomes `None`. Returns `None` for content
/// that is neither an object nor an array.
#[must_use]
pub fn records_from_content(content: &Value, strict: bool) -> Option<Vec<NewsRecord>> {
    let items: Vec<&Value> = match content {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![content],
        _ => return None,
    };

    let records: Vec<NewsRecord> = items
        .into_iter()
        .filter_map(|item| {
            let object = item.as_object()?;
            if strict && !has_all_fields(object) {
                debug!(?object, "Dropping incomplete record");
                return None;
            }
            serde_json::from_value(item.clone()).ok()
        })
        .collect();

    if strict && records.is_empty() {
        return None;
    }
    Some(records)
}
