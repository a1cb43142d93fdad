//! CLI presentation: text and json formatters.

use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;

/// One row of the environment status table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EnvironmentRow {
    pub authid: String,
    pub active: bool,
}

pub fn format_lines_text(lines: &[String]) -> String {
    lines.join("\n")
}

pub fn format_lines_json(lines: &[String]) -> String {
    serde_json::to_string_pretty(lines).unwrap_or_else(|_| "[]".to_string())
}

/// Environment table with the active one marked.
pub fn format_environments_text(rows: &[EnvironmentRow]) -> String {
    let mut out = format!("{}\n\n", "Environments".bold());
    if rows.is_empty() {
        out.push_str("No environments. Run `sdfkit authenticate`.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Authid", "Active"]);
    for row in rows {
        let marker = if row.active { "*" } else { "" };
        table.add_row(vec![row.authid.clone(), marker.to_string()]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

pub fn format_environments_json(rows: &[EnvironmentRow]) -> String {
    let active = rows.iter().find(|r| r.active).map(|r| r.authid.clone());
    let value = serde_json::json!({
        "environments": rows,
        "active": active,
    });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
}
