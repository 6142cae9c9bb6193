use std::fmt::Display;

use serde::Serialize;
use tracing::error;

/// How views are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Outcome of loading a view. Failures are rendered inline instead of aborting.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loaded(T),
    Failed(String),
}

impl<T> ViewState<T> {
    /// Log a failed fetch and keep `message` for display
    pub fn from_result<E: Display>(result: Result<T, E>, message: &str) -> Self {
        match result {
            Ok(value) => ViewState::Loaded(value),
            Err(e) => {
                error!("{}: {}", message, e);
                ViewState::Failed(message.to_string())
            }
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(value) => Some(value),
            ViewState::Failed(_) => None,
        }
    }

    pub fn loaded_mut(&mut self) -> Option<&mut T> {
        match self {
            ViewState::Loaded(value) => Some(value),
            ViewState::Failed(_) => None,
        }
    }
}

impl<T: Serialize> ViewState<T> {
    pub fn to_json(&self) -> String {
        let value = match self {
            ViewState::Loaded(value) => serde_json::to_value(value),
            ViewState::Failed(message) => Ok(serde_json::json!({ "error": message })),
        };
        value
            .and_then(|value| serde_json::to_string_pretty(&value))
            .unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// Left-aligned text table with a header rule
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}", width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers.to_vec())];
    out.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}
