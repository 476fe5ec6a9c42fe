use crate::model::notion::{plain_text, Block};

/// Top-level block text that marks the start of the description.
pub const DESCRIPTION_LABEL: &str = "beskrivelse";

/// Lines that end the description when a page carries a manual comments section.
const COMMENT_SENTINELS: [&str; 3] = ["kommentarer:", "comments:", "comments"];

/// Render one block as a single line of text (children excluded).
///
/// Numbered items always render as `1.` since the API does not expose the ordinal.
pub fn render_block(block: &Block) -> String {
    let content = block.content();
    let text = plain_text(&content.rich_text);

    let line = match block.kind.as_str() {
        "to_do" => {
            let mark = if content.checked { "[x]" } else { "[ ]" };
            format!("{mark} {text}")
        }
        "bulleted_list_item" => format!("- {text}"),
        "numbered_list_item" => format!("1. {text}"),
        _ => text,
    };
    line.trim().to_string()
}

pub fn is_description_label(block: &Block) -> bool {
    render_block(block)
        .to_lowercase()
        .trim()
        .starts_with(DESCRIPTION_LABEL)
}

pub fn is_comments_sentinel(line: &str) -> bool {
    let line = line.trim().to_lowercase();
    COMMENT_SENTINELS.contains(&line.as_str())
}

pub fn indent(depth: usize, text: &str) -> String {
    format!("{}{}", "  ".repeat(depth), text)
}
