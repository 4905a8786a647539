//! Implements ReportRenderer over an HTML template file.
//!
//! Template syntax:
//!
//! - `{{NAME}}` inserts a value, HTML-escaped
//! - `{{#GAMES}}..{{/GAMES}}` repeats once per game, in report order
//! - `{{#DATES}}..{{/DATES}}` repeats once per counted night of the current game
//! - `{{#NO_GAMES}}..{{/NO_GAMES}}` renders only when the report is empty
//!
//! Page values: `TITLE`, `SUBTITLE`, `GAME_COUNT`, `SESSION_COUNT`.
//! Game values: `GAME_ID`, `NAME`, `YEAR`, `BGG_URL`, `COUNT`, `NIGHTS`,
//! `IMAGE_SRC`, `IMAGE_WIDTH`, `IMAGE_HEIGHT`. Date values: `DATE`, `DATE_LABEL`.
//!
//! The template is expanded in one pass, so inserted values are never scanned
//! for markers. Output depends only on the report, never on the clock.

use crate::domain::{DomainError, GameEntry, Report, Thumbnail};
use crate::ports::ReportRenderer;
use chrono::NaiveDate;
use std::path::Path;
use tracing::{info, warn};

/// Shipped template, used when the configured file does not exist.
const DEFAULT_TEMPLATE: &str = include_str!("../../../templates/index.html");

const BGG_GAME_URL: &str = "https://boardgamegeek.com/boardgame";

pub struct HtmlTemplateRenderer {
    template: String,
}

impl HtmlTemplateRenderer {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Read the template at `path`, falling back to the built-in one if absent.
    /// A template with unbalanced sections is rejected here, before any fetching.
    pub fn from_file(path: &Path) -> Result<Self, DomainError> {
        let renderer = match std::fs::read_to_string(path) {
            Ok(template) => {
                info!(path = %path.display(), "loaded report template");
                Self::new(template)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "template not found, using built-in template");
                Self::default()
            }
            Err(e) => {
                return Err(DomainError::Render(format!(
                    "read template {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        parse(&renderer.template)?;
        Ok(renderer)
    }
}

impl Default for HtmlTemplateRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl ReportRenderer for HtmlTemplateRenderer {
    fn render(&self, report: &Report) -> Result<String, DomainError> {
        let nodes = parse(&self.template)?;
        let mut out = String::with_capacity(self.template.len());
        expand(&nodes, &mut vec![Scope::Page(report)], &mut out)?;
        Ok(out)
    }
}

enum Node<'t> {
    Text(&'t str),
    Value(&'t str),
    Section(&'t str, Vec<Node<'t>>),
}

fn parse(template: &str) -> Result<Vec<Node<'_>>, DomainError> {
    let (nodes, _) = parse_nodes(template, None)?;
    Ok(nodes)
}

/// Parse up to the closing tag of `open` (or the end). Returns the nodes and
/// the text after the closing tag.
fn parse_nodes<'t>(
    mut src: &'t str,
    open: Option<&str>,
) -> Result<(Vec<Node<'t>>, &'t str), DomainError> {
    let mut nodes = Vec::new();
    loop {
        let Some(start) = src.find("{{") else {
            if let Some(name) = open {
                return Err(DomainError::Render(format!(
                    "template section {} is never closed",
                    name
                )));
            }
            if !src.is_empty() {
                nodes.push(Node::Text(src));
            }
            return Ok((nodes, ""));
        };
        if start > 0 {
            nodes.push(Node::Text(&src[..start]));
        }
        let tag_src = &src[start + 2..];
        let end = tag_src
            .find("}}")
            .ok_or_else(|| DomainError::Render("unterminated template tag".to_string()))?;
        let tag = tag_src[..end].trim();
        src = &tag_src[end + 2..];

        if let Some(name) = tag.strip_prefix('#') {
            let (children, rest) = parse_nodes(src, Some(name))?;
            nodes.push(Node::Section(name, children));
            src = rest;
        } else if let Some(name) = tag.strip_prefix('/') {
            return match open {
                Some(open) if open == name => Ok((nodes, src)),
                _ => Err(DomainError::Render(format!(
                    "template closes section {} that is not open",
                    name
                ))),
            };
        } else {
            nodes.push(Node::Value(tag));
        }
    }
}

#[derive(Clone, Copy)]
enum Scope<'r> {
    Page(&'r Report),
    Game(&'r GameEntry, &'r Thumbnail),
    Date(NaiveDate),
}

impl Scope<'_> {
    fn value(&self, name: &str) -> Option<String> {
        let raw = match (self, name) {
            (Scope::Page(r), "TITLE") => r.title.clone(),
            (Scope::Page(r), "SUBTITLE") => r.subtitle.clone(),
            (Scope::Page(r), "GAME_COUNT") => r.entries.len().to_string(),
            (Scope::Page(r), "SESSION_COUNT") => r.session_count().to_string(),
            (Scope::Game(e, _), "GAME_ID") => e.game_id.to_string(),
            (Scope::Game(e, _), "NAME") => e.game.name.clone(),
            (Scope::Game(e, _), "YEAR") => e
                .game
                .year_published
                .map(|y| y.to_string())
                .unwrap_or_default(),
            (Scope::Game(e, _), "BGG_URL") => format!("{}/{}", BGG_GAME_URL, e.game_id),
            (Scope::Game(e, _), "COUNT") => e.count.to_string(),
            (Scope::Game(e, _), "NIGHTS") => match e.count {
                1 => "1 night".to_string(),
                n => format!("{} nights", n),
            },
            (Scope::Game(_, t), "IMAGE_SRC") => t.href.clone(),
            (Scope::Game(_, t), "IMAGE_WIDTH") => t.width.to_string(),
            (Scope::Game(_, t), "IMAGE_HEIGHT") => t.height.to_string(),
            (Scope::Date(d), "DATE") => d.format("%Y-%m-%d").to_string(),
            (Scope::Date(d), "DATE_LABEL") => d.format("%-d %b %Y").to_string(),
            _ => return None,
        };
        Some(escape_html(&raw))
    }
}

fn expand<'r>(
    nodes: &[Node<'_>],
    scopes: &mut Vec<Scope<'r>>,
    out: &mut String,
) -> Result<(), DomainError> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Value(name) => {
                let value = scopes
                    .iter()
                    .rev()
                    .find_map(|s| s.value(name))
                    .ok_or_else(|| {
                        DomainError::Render(format!("unknown template value {}", name))
                    })?;
                out.push_str(&value);
            }
            Node::Section(name, children) => expand_section(name, children, scopes, out)?,
        }
    }
    Ok(())
}

fn expand_section<'r>(
    name: &str,
    children: &[Node<'_>],
    scopes: &mut Vec<Scope<'r>>,
    out: &mut String,
) -> Result<(), DomainError> {
    let report = scopes.iter().find_map(|s| match s {
        Scope::Page(r) => Some(*r),
        _ => None,
    });
    let game = scopes.iter().rev().find_map(|s| match s {
        Scope::Game(e, _) => Some(*e),
        _ => None,
    });

    match (name, report, game) {
        ("GAMES", Some(report), None) => {
            for entry in &report.entries {
                let thumb = report.thumbnails.get(&entry.game_id).ok_or_else(|| {
                    DomainError::Render(format!("no thumbnail for game {}", entry.game_id))
                })?;
                scopes.push(Scope::Game(entry, thumb));
                let expanded = expand(children, scopes, out);
                scopes.pop();
                expanded?;
            }
            Ok(())
        }
        ("NO_GAMES", Some(report), None) => {
            if report.entries.is_empty() {
                expand(children, scopes, out)?;
            }
            Ok(())
        }
        ("DATES", _, Some(entry)) => {
            for date in entry.dates() {
                scopes.push(Scope::Date(date));
                let expanded = expand(children, scopes, out);
                scopes.pop();
                expanded?;
            }
            Ok(())
        }
        _ => Err(DomainError::Render(format!(
            "template section {} is unknown or misplaced",
            name
        ))),
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
