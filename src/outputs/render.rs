//! Rendering of ranked news into the Xiaohongshu post text.
//!
//! # Layout
//!
//! ```text
//! 标题：昨日AI圈3大热点
//!
//! 2025年05月06日 AI圈真实热点
//! （来源：多源聚合，已去重）
//!
//! 昨天AI圈发生了什么大事？
//! 我整理了最热资讯
//!
//! 1. 🎯 OpenAI ships o5
//!    来源：AI News Collectors
//!    链接：https://openai.com/index/o5
//!
//! ...
//! ——
//! 新闻来源：多源聚合（已去重）
//! 你最关注哪一条？评论区聊聊
//! 关注我，每天AI热点不错过
//!
//! #AI #人工智能 #科技热点 #OpenAI
//! ```
//!
//! Rendering is pure string substitution: records are written in the order
//! given, with the emoji the ranker assigned.

use chrono::NaiveDate;

use crate::config::{Placeholder, PostFormat};
use crate::models::NewsRecord;

/// Label in front of the post title on the first line.
pub const TITLE_LABEL: &str = "标题：";

const PREFACE: [&str; 5] = [
    "（来源：多源聚合，已去重）",
    "",
    "昨天AI圈发生了什么大事？",
    "我整理了最热资讯",
    "",
];

const FOOTER: [&str; 6] = [
    "——",
    "新闻来源：多源聚合（已去重）",
    "你最关注哪一条？评论区聊聊",
    "关注我，每天AI热点不错过",
    "",
    "#AI #人工智能 #科技热点 #OpenAI",
];

/// Render the post for `date` from already ranked records.
pub fn render(records: &[NewsRecord], format: &PostFormat, date: NaiveDate) -> String {
    let count = records.len();
    let title = format.title_template.template().render(|key| match key {
        Placeholder::Date => date.format("%m月%d日").to_string(),
        Placeholder::Count => count.to_string(),
    });
    let header = format.header.template().render(|key| match key {
        Placeholder::Date => date.format("%Y年%m月%d日").to_string(),
        Placeholder::Count => count.to_string(),
    });

    let mut lines = vec![format!("{TITLE_LABEL}{title}"), String::new(), header];
    lines.extend(PREFACE.iter().map(|l| l.to_string()));

    for (i, record) in records.iter().enumerate() {
        lines.push(format!(
            "{}. {} {}",
            i + 1,
            record.emoji.unwrap_or_default(),
            record.title
        ));
        if let Some(summary) = &record.summary {
            lines.push(format!("   {summary}"));
        }
        lines.push(format!("   来源：{}", record.source));
        lines.push(format!("   链接：{}", record.url));
        lines.push(String::new());
    }

    lines.extend(FOOTER.iter().map(|l| l.to_string()));
    lines.join("\n")
}
