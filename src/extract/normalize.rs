use crate::model::flat_task::FlatTask;
use crate::model::notion::{plain_text, Page, Property};

const TITLE: &str = "Title";

/// Title or rich-text property as plain text.
pub fn as_title(prop: Option<&Property>) -> String {
    match prop {
        Some(Property::Title { title }) => plain_text(title),
        Some(Property::RichText { rich_text }) => plain_text(rich_text),
        _ => String::new(),
    }
}

/// Select or status option name.
pub fn as_select_name(prop: Option<&Property>) -> String {
    let option = match prop {
        Some(Property::Select { select }) => select.as_ref(),
        Some(Property::Status { status }) => status.as_ref(),
        _ => None,
    };
    option
        .and_then(|o| o.name.as_deref())
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Multi-select names joined with ", ". A single select counts as one entry.
pub fn as_multi_select_names(prop: Option<&Property>) -> String {
    match prop {
        Some(Property::MultiSelect { multi_select }) => join_names(
            multi_select.iter().filter_map(|o| o.name.as_deref()),
        ),
        other => as_select_name(other),
    }
}

pub fn as_people_names(prop: Option<&Property>) -> String {
    match prop {
        Some(Property::People { people }) => {
            join_names(people.iter().filter_map(|p| p.name.as_deref()))
        }
        _ => String::new(),
    }
}

/// Start date, or `start..end` for a range spanning different days.
pub fn as_date_text(prop: Option<&Property>) -> String {
    let Some(Property::Date { date: Some(range) }) = prop else {
        return String::new();
    };
    let start = range.start.as_deref().unwrap_or_default().trim();
    let end = range.end.as_deref().unwrap_or_default().trim();
    if !start.is_empty() && !end.is_empty() && end != start {
        format!("{start}..{end}")
    } else {
        start.to_string()
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Title from the `Title` property, falling back to the first title-typed property.
fn page_title(page: &Page) -> String {
    let title = as_title(page.properties.get(TITLE));
    if !title.is_empty() {
        return title;
    }
    page.properties
        .values()
        .find(|p| matches!(p, Property::Title { .. }))
        .map(|p| as_title(Some(p)))
        .unwrap_or_default()
}

/// Flatten a page plus its fetched description and comments.
pub fn normalize_page(page: &Page, description: &str, comments: &str) -> FlatTask {
    let prop = |name: &str| page.properties.get(name);

    FlatTask {
        title: page_title(page),
        status: as_select_name(prop("Status")),
        priority: as_select_name(prop("Prioritet")),
        estimate: as_select_name(prop("Estimater")),
        assignees: as_people_names(prop("Tilordnet")),
        tags: as_multi_select_names(prop("Tags")),
        completed: as_date_text(prop("Ferdigstilt")),
        archived: as_date_text(prop("Arkiveringsdato")),
        codebase: as_multi_select_names(prop("Kodebase / type")),
        description: description.trim().to_string(),
        comments: comments.trim().to_string(),
    }
}
