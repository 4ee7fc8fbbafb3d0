use std::sync::LazyLock;

use regex::Regex;

use clausegraph_core::node::ClauseNode;

/// `1. Title`, `4.2. Title`
static NUMBERED_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)*)\.\s+(.+)$").expect("valid section regex"));

/// `4.2 Title`
static SUBSECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.\d+(?:\.\d+)*)\s+(.+)$").expect("valid subsection regex"));

/// `Article IV: Title`, `ARTICLE 3 Title`
static ARTICLE_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(Article\s+[IVXLCDM\d]+)[:.\s]*(.*)$").expect("valid article regex")
});

struct Section {
    number: String,
    title: String,
    level: u32,
    header_line: u32,
    body: Vec<(u32, String)>,
}

impl Section {
    /// Trimmed body text and the line it starts on.
    fn body_text(&self) -> (String, Option<u32>) {
        let first = self
            .body
            .iter()
            .find(|(_, line)| !line.trim().is_empty())
            .map(|(n, _)| *n);
        let joined = self
            .body
            .iter()
            .map(|(_, line)| line.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        (joined.trim().to_string(), first)
    }
}

/// Split raw document text into an ordered list of clauses.
///
/// Numbered headers (`1.`, `2.1`, `Article IV`) start a new clause; the
/// nesting level is the number of dotted components and articles sit at
/// level 1. Text without any recognised header falls back to one clause per
/// blank-line separated paragraph. Clause ids are `clause_1`, `clause_2`, ...
/// in document order.
pub fn segment_clauses(text: &str) -> Vec<ClauseNode> {
    let sections = split_sections(text);
    let clauses = if sections.is_empty() {
        paragraph_clauses(text)
    } else {
        build_clause_nodes(sections)
    };

    tracing::debug!(clauses = clauses.len(), "Segmented document into clauses");
    clauses
}

fn match_header(line: &str) -> Option<(String, String, u32)> {
    let line = line.trim_end();

    for pattern in [&*NUMBERED_SECTION, &*SUBSECTION] {
        if let Some(caps) = pattern.captures(line) {
            let number = caps[1].to_string();
            let level = number.matches('.').count() as u32 + 1;
            return Some((number, caps[2].trim().to_string(), level));
        }
    }

    ARTICLE_SECTION
        .captures(line)
        .map(|caps| (caps[1].to_string(), caps[2].trim().to_string(), 1))
}

fn split_sections(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<Section> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx as u32 + 1;

        if let Some((number, title, level)) = match_header(line) {
            if let Some(done) = current.take() {
                sections.push(done);
            }
            current = Some(Section {
                number,
                title,
                level,
                header_line: line_no,
                body: Vec::new(),
            });
        } else if let Some(section) = current.as_mut() {
            section.body.push((line_no, line.to_string()));
        }
        // Preamble before the first header is not part of any clause.
    }

    if let Some(done) = current {
        sections.push(done);
    }

    sections
}

fn build_clause_nodes(sections: Vec<Section>) -> Vec<ClauseNode> {
    let mut parents: Vec<(String, u32)> = Vec::new();

    sections
        .into_iter()
        .enumerate()
        .map(|(i, section)| {
            while parents
                .last()
                .is_some_and(|(_, level)| *level >= section.level)
            {
                parents.pop();
            }
            let parent_id = parents.last().map(|(id, _)| id.clone());
            let id = format!("clause_{}", i + 1);
            parents.push((id.clone(), section.level));

            let (body, body_line) = section.body_text();
            let line = if body.is_empty() {
                section.header_line
            } else {
                body_line.unwrap_or(section.header_line)
            };

            ClauseNode::new(id, section.title.clone(), body, section.level, parent_id)
                .with_number(section.number.clone())
                .with_line(line)
        })
        .collect()
}

fn paragraph_clauses(text: &str) -> Vec<ClauseNode> {
    let mut paragraphs: Vec<(u32, Vec<&str>)> = Vec::new();
    let mut current: Option<(u32, Vec<&str>)> = None;

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            if let Some(done) = current.take() {
                paragraphs.push(done);
            }
        } else {
            current
                .get_or_insert_with(|| (idx as u32 + 1, Vec::new()))
                .1
                .push(line);
        }
    }
    if let Some(done) = current {
        paragraphs.push(done);
    }

    paragraphs
        .into_iter()
        .enumerate()
        .map(|(i, (line, lines))| {
            ClauseNode::new(
                format!("clause_{}", i + 1),
                format!("Section {}", i + 1),
                lines.join("\n").trim().to_string(),
                1,
                None,
            )
            .with_line(line)
        })
        .collect()
}
