//! Markdown articles: a single-technology deep dive and a side-by-side
//! comparison.

use chrono::NaiveDate;
use std::fmt::Write;

use super::TechDoc;

const NO_SUMMARY: &str = "暂无总结";

/// Rows of the comparison table, filled in by hand before publishing.
pub const COMPARISON_ROWS: [&str; 6] = ["架构", "参数量", "上下文长度", "推理速度", "中文能力", "开源程度"];

/// Cell text for comparison rows with no data yet.
pub const TO_FILL: &str = "待补充";

fn summary(doc: &TechDoc) -> &str {
    let s = doc.summary.trim();
    if s.is_empty() { NO_SUMMARY } else { s }
}

/// Article about one technology.
///
/// Sections: intro, numbered key features, the first code example (only with
/// `include_code`), a benchmark table when there are benchmarks, closing
/// note and follow call.
pub fn markdown(doc: &TechDoc, date: NaiveDate, include_code: bool) -> String {
    let mut md = String::new();
    let _ = write!(
        md,
        "# {name} - 技术解析\n\n\
         > 📅 发布日期: {date}\n\
         > 🏷️ 分类: AI技术 | 大模型\n\n\
         ## 🚀 简介\n\n\
         {summary}\n\n\
         ## ✨ 核心特点\n\n",
        name = doc.name,
        date = date.format("%Y-%m-%d"),
        summary = summary(doc),
    );

    for (i, feature) in doc.key_features.iter().enumerate() {
        let _ = writeln!(md, "{}. **{}**: {}", i + 1, feature.title, feature.description);
    }

    if let Some(code) = doc.code_examples.first().filter(|_| include_code) {
        let _ = write!(md, "\n## 💻 代码示例\n\n```python\n{}\n```\n", code.trim_end());
    }

    if !doc.benchmarks.is_empty() {
        md.push_str("\n## 📊 性能对比\n\n| 指标 | 数值 |\n|------|------|\n");
        for (metric, value) in &doc.benchmarks {
            let _ = writeln!(md, "| {metric} | {value} |");
        }
    }

    let _ = write!(
        md,
        "\n## 🎯 总结\n\n\
         {name} 是一个值得关注的技术...\n\n\
         ---\n\n\
         💡 **想要了解更多 AI 技术？关注我，每天分享最新技术干货！**\n",
        name = doc.name,
    );
    md
}

/// Comparison article over `docs`, in the order given.
///
/// The table lists [`COMPARISON_ROWS`] with every cell set to [`TO_FILL`];
/// each technology then gets its own summary section.
pub fn comparison_markdown(docs: &[TechDoc], date: NaiveDate) -> String {
    let names: Vec<&str> = docs.iter().map(|d| d.name.as_str()).collect();
    let mut md = String::new();
    let _ = write!(
        md,
        "# {title} - 技术对比\n\n\
         > 📅 发布日期: {date}\n\
         > 🏷️ 分类: AI技术对比 | 大模型选型\n\n\
         ## 🚀 概述\n\n\
         今天为大家带来 {count} 款热门技术的深度对比...\n\n\
         ## 📊 对比维度\n\n",
        title = names.join(" vs "),
        date = date.format("%Y-%m-%d"),
        count = docs.len(),
    );

    let _ = writeln!(md, "| 特性 | {} |", names.join(" | "));
    let _ = writeln!(md, "|------|{}|", vec!["------"; names.len()].join("|"));
    for row in COMPARISON_ROWS {
        let _ = writeln!(md, "| {row} |{}", format!(" {TO_FILL} |").repeat(names.len()));
    }

    md.push_str("\n## 🔍 详细解析\n\n");
    for doc in docs {
        let _ = write!(md, "### {}\n\n{}\n\n", doc.name, summary(doc));
    }

    md.push_str(
        "## 🎯 选型建议\n\n\
         - **如果你的需求是 XXX**: 推荐 XXX\n\
         - **如果你的需求是 YYY**: 推荐 YYY\n\n\
         ---\n\n\
         💡 **想要了解更多技术对比？关注我，每周深度对比！**\n",
    );
    md
}
