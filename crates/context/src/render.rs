//! Prompt rendering for knowledge context blocks.

use crate::builder::KnowledgeContextBlock;

const HEADER: &str = "[Knowledge]\n";

/// Render blocks, in order, into the knowledge section of a system prompt.
///
/// An empty slice renders to the empty string so callers can append the
/// result unconditionally.
pub fn render_context(blocks: &[KnowledgeContextBlock]) -> String {
    if blocks.is_empty() {
        return String::new();
    }

    let entries: Vec<String> = blocks.iter().map(render_block).collect();
    format!("{HEADER}{}", entries.join("\n"))
}

fn render_block(block: &KnowledgeContextBlock) -> String {
    let heading = match block.importance {
        Some(importance) => format!(
            "### {} ({}, importance {importance})",
            block.title, block.item_type
        ),
        None => format!("### {} ({})", block.title, block.item_type),
    };

    let mut entry = format!("{heading}\n");
    let content = block.content.trim_end();
    if !content.is_empty() {
        entry.push_str(content);
        entry.push('\n');
    }
    if let Some(instructions) = block.instructions.as_deref() {
        entry.push_str(&format!("Instructions: {}\n", instructions.trim()));
    }
    entry
}
