//! Xiaohongshu-specific shaping of an article: tags, cover prompt and the
//! plain-text post body.

use itertools::Itertools;

use crate::config::ImageStyle;

/// Xiaohongshu accepts at most this many tags per post.
pub const MAX_TAGS: usize = 10;

/// Extra tags added when the technology name contains the keyword
/// (case-insensitive).
static TAG_MAP: [(&str, [&str; 2]); 12] = [
    ("llm", ["LLM", "大语言模型"]),
    ("gpt", ["GPT", "OpenAI"]),
    ("claude", ["Claude", "Anthropic"]),
    ("kimi", ["Kimi", "Moonshot"]),
    ("qwen", ["通义千问", "阿里"]),
    ("transformer", ["Transformer", "注意力机制"]),
    ("moe", ["MoE", "混合专家模型"]),
    ("agent", ["AI Agent", "智能体"]),
    ("rag", ["RAG", "检索增强生成"]),
    ("fine-tuning", ["微调", "Fine-tuning"]),
    ("quantization", ["量化", "模型压缩"]),
    ("deployment", ["模型部署", "MLOps"]),
];

/// Tags for an article about `tech_name`.
///
/// # Arguments
///
/// * `tech_name` - Technology (or several, space-joined) the article covers
/// * `default_tags` - Tags every article starts with
///
/// # Returns
///
/// `default_tags` followed by keyword tags, first occurrence kept, at most
/// [`MAX_TAGS`].
pub fn recommend_tags(tech_name: &str, default_tags: &[String]) -> Vec<String> {
    let lower = tech_name.to_lowercase();
    let keyword_tags = TAG_MAP
        .iter()
        .filter(|(keyword, _)| lower.contains(*keyword))
        .flat_map(|(_, tags)| tags.iter().map(|t| t.to_string()));

    default_tags
        .iter()
        .cloned()
        .chain(keyword_tags)
        .unique()
        .take(MAX_TAGS)
        .collect()
}

/// Single-line cover image prompt for `tech_name` in the configured style.
pub fn image_prompt(tech_name: &str, style: ImageStyle) -> String {
    match style {
        ImageStyle::Default => format!(
            "Create a professional tech blog cover image for \"{tech_name}\". \
             Style: Modern, clean, futuristic. \
             Elements: Neural networks, code snippets, abstract AI visualization. \
             Colors: Blue and purple gradient, glowing effects. \
             Text: Include \"{tech_name}\" in elegant typography. \
             Aspect ratio: 3:4 (for Xiaohongshu)."
        ),
        ImageStyle::Minimal => format!(
            "Minimalist tech illustration for {tech_name}. \
             Clean white background with subtle gradient. \
             Abstract geometric shapes representing AI/ML. \
             Professional and modern aesthetic."
        ),
        ImageStyle::Detailed => format!(
            "Detailed technical illustration showing {tech_name} architecture. \
             Include: Data flow diagrams, neural network layers, performance charts. \
             Style: Infographic meets sci-fi aesthetic. \
             Vibrant colors with professional finish."
        ),
    }
}

/// Plain text for one Markdown line, or `None` when the line carries nothing
/// worth keeping in the post.
fn plain_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('>') || line.starts_with("```") {
        return None;
    }
    // Table separators and horizontal rules.
    if line.chars().all(|c| matches!(c, '-' | '|' | ':' | ' ')) {
        return None;
    }

    let line = line.trim_start_matches('#').trim_start();
    let line = line.replace('*', "");
    let line = if line.starts_with('|') {
        line.split('|').map(str::trim).filter(|c| !c.is_empty()).join(" ")
    } else {
        line
    };
    let line = line.trim();
    (!line.is_empty()).then(|| line.to_string())
}

/// Convert Markdown into the Xiaohongshu post text.
///
/// Headings, emphasis, code fences, quotes, rules and table pipes are
/// removed; the remaining lines are separated by blank lines. The tags follow
/// on the last line as `🏷️ #tag1 #tag2`, with spaces inside a tag dropped so
/// each stays one hashtag.
pub fn format_for_xiaohongshu(markdown: &str, tags: &[String]) -> String {
    let body = markdown.lines().filter_map(plain_line).join("\n\n");
    let hashtags = tags.iter().map(|t| format!("#{}", t.replace(' ', ""))).join(" ");
    format!("{body}\n\n🏷️ {hashtags}")
}
