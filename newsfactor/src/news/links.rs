//! Article-link normalization for listing pages.

use serde_json::Value;

/// Path marker of article pages on the default listing site.
pub const DEFAULT_ARTICLE_FILTER: &str = "/a/";

/// Instruction given to the extraction model for listing pages.
pub const LINK_INSTRUCTION: &str = "\
请提取页面中所有新闻条目的原文链接（url）。每条新闻只返回其全文链接本身，\
不要返回标题、时间或其他内容。例如条目\n\
14:11[**【锦江酒店拟启动港股IPO】** ……[点击查看全文]](https://finance.eastmoney.com/a/202506053422839540.html)\n\
只需返回 https://finance.eastmoney.com/a/202506053422839540.html";

/// Complete a protocol-relative link and drop empty ones.
#[must_use]
pub fn normalize_link(raw: &str) -> Option<String> {
    let link = raw.trim();
    if link.is_empty() {
        return None;
    }
    if link.starts_with("//") {
        return Some(format!("https:{link}"));
    }
    Some(link.to_owned())
}

/// Collect article links from extracted `NewsUrl` items, in page order.
///
/// Items that are not objects or lack a non-empty string `url` are skipped.
/// Duplicates are kept. When `filter` is set, only links containing it are
/// returned.
#[must_use]
pub fn collect_links(items: &[Value], filter: Option<&str>) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item.get("url")?.as_str())
        .filter_map(normalize_link)
        .filter(|link| filter.is_none_or(|f| link.contains(f)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn completes_protocol_relative_links() {
        assert_eq!(
            normalize_link("//finance.eastmoney.com/a/1.html").as_deref(),
            Some("https://finance.eastmoney.com/a/1.html")
        );
        assert_eq!(
            normalize_link(" https://x.com/a/2.html ").as_deref(),
            Some("https://x.com/a/2.html")
        );
        assert!(normalize_link("   ").is_none());
    }

    #[test]
    fn skips_empty_and_malformed_items_keeping_order() {
        let items = vec![
            json!({"url": "https://x.com/a/1.html"}),
            json!({"url": ""}),
            json!({"title": "no url"}),
            json!("https://bare-string.com"),
            json!({"url": 42}),
            json!({"url": "//x.com/a/2.html"}),
            json!({"url": "https://x.com/a/1.html"}),
        ];

        assert_eq!(
            collect_links(&items, None),
            vec![
                "https://x.com/a/1.html",
                "https://x.com/a/2.html",
                "https://x.com/a/1.html",
            ]
        );
    }

    #[test]
    fn optional_path_filter() {
        let items = vec![
            json!({"url": "https://finance.eastmoney.com/a/1.html"}),
            json!({"url": "https://www.eastmoney.com/about.html"}),
        ];
        assert_eq!(
            collect_links(&items, Some(DEFAULT_ARTICLE_FILTER)),
            vec!["https://finance.eastmoney.com/a/1.html"]
        );
    }
}
