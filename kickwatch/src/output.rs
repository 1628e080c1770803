use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use colored::*;
use kickwatch::domain::ChannelSnapshot;
use kickwatch::view::{ViewSummary, humanize_since};
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;

/// Renders the filtered channel list.
pub struct OutputManager {
    colored: bool,
}

#[derive(Serialize)]
struct JsonView<'a> {
    checked_at: DateTime<Utc>,
    stale_error: Option<&'a str>,
    summary: ViewSummary,
    channels: &'a [&'a ChannelSnapshot],
}

impl OutputManager {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn format_view(
        &self,
        view: &[&ChannelSnapshot],
        checked_at: DateTime<Utc>,
        stale_error: Option<&str>,
        format: OutputFormat,
    ) -> anyhow::Result<String> {
        let summary = ViewSummary::of(view);
        match format {
            OutputFormat::Pretty => Ok(self.format_pretty(view, &summary, checked_at, stale_error)),
            OutputFormat::Table => Ok(self.format_table(view, &summary, checked_at, stale_error)),
            OutputFormat::Json => {
                let payload = JsonView {
                    checked_at,
                    stale_error,
                    summary,
                    channels: view,
                };
                Ok(serde_json::to_string_pretty(&payload)?)
            }
        }
    }

    fn header(
        &self,
        summary: &ViewSummary,
        checked_at: DateTime<Utc>,
        stale_error: Option<&str>,
    ) -> String {
        let mut output = format!(
            "{} {}  {} {} offline  (checked {})\n",
            self.colorize("●", Color::Green, true),
            self.colorize(&format!("{} live", summary.live), Color::Green, true),
            self.colorize("○", Color::Dim, false),
            summary.offline,
            humanize_since(Some(checked_at), Utc::now()),
        );
        if let Some(error) = stale_error {
            output.push_str(&self.colorize(
                &format!("Showing stale data, last refresh failed: {error}"),
                Color::Red,
                true,
            ));
            output.push('\n');
        }
        output
    }

    fn format_pretty(
        &self,
        view: &[&ChannelSnapshot],
        summary: &ViewSummary,
        checked_at: DateTime<Utc>,
        stale_error: Option<&str>,
    ) -> String {
        let mut output = self.header(summary, checked_at, stale_error);
        if view.is_empty() {
            output.push_str("No streamers match the current filters.\n");
            return output;
        }

        let now = Utc::now();
        for channel in view {
            output.push('\n');
            let name = match channel.primary_character() {
                Some(character) => format!("{} ({})", channel.display_name, character),
                None => channel.display_name.clone(),
            };

            if channel.is_live {
                output.push_str(&format!(
                    "{} {}  {} viewers  live {}\n",
                    self.colorize("LIVE", Color::Green, true),
                    self.colorize(&name, Color::Cyan, true),
                    channel.viewer_count.unwrap_or(0),
                    humanize_since(channel.live_since, now),
                ));
                if let Some(title) = &channel.live_title {
                    output.push_str(&format!("     {}\n", title));
                }
                if let Some(category) = &channel.live_category {
                    output.push_str(&format!(
                        "     {}\n",
                        self.colorize(category, Color::Yellow, false)
                    ));
                }
                output.push_str(&format!(
                    "     {}\n",
                    self.colorize(&channel.live_url, Color::Blue, false)
                ));
            } else if channel.error {
                output.push_str(&format!(
                    "{} {}  could not be checked\n",
                    self.colorize("ERR ", Color::Red, true),
                    self.colorize(&name, Color::Cyan, true),
                ));
            } else {
                output.push_str(&format!(
                    "{} {}  last stream {}\n",
                    self.colorize("OFF ", Color::Dim, false),
                    self.colorize(&name, Color::Cyan, true),
                    humanize_since(channel.last_stream_start_time, now),
                ));
            }

            if !channel.tags.is_empty() {
                let tags: Vec<&str> = channel.tags.iter().map(String::as_str).collect();
                output.push_str(&format!("     #{}\n", tags.join(" #")));
            }
        }
        output
    }

    fn format_table(
        &self,
        view: &[&ChannelSnapshot],
        summary: &ViewSummary,
        checked_at: DateTime<Utc>,
        stale_error: Option<&str>,
    ) -> String {
        #[derive(Tabled)]
        struct ChannelRow<'a> {
            status: &'a str,
            streamer: &'a str,
            character: &'a str,
            viewers: Cow<'a, str>,
            since: String,
            category: &'a str,
            title: &'a str,
        }

        let now = Utc::now();
        let rows: Vec<ChannelRow<'_>> = view
            .iter()
            .map(|c| ChannelRow {
                status: match (c.is_live, c.error) {
                    (true, _) => "live",
                    (false, true) => "error",
                    (false, false) => "offline",
                },
                streamer: &c.display_name,
                character: c.primary_character().unwrap_or(""),
                viewers: c
                    .viewer_count
                    .map(|v| Cow::Owned(v.to_string()))
                    .unwrap_or(Cow::Borrowed("")),
                since: if c.is_live {
                    humanize_since(c.live_since, now)
                } else {
                    humanize_since(c.last_stream_start_time, now)
                },
                category: c.live_category.as_deref().unwrap_or(""),
                title: c.live_title.as_deref().unwrap_or(""),
            })
            .collect();

        let mut output = self.header(summary, checked_at, stale_error);
        output.push_str(&Table::new(rows).with(Style::modern()).to_string());
        output.push('\n');
        output
    }

    pub fn format_tags(&self, counts: &BTreeMap<String, usize>, all_tags: &[String]) -> String {
        let mut output = String::new();
        for tag in all_tags {
            output.push_str(&format!(
                "{}  {}\n",
                self.colorize(&format!("#{tag}"), Color::Yellow, false),
                counts.get(tag).copied().unwrap_or(0)
            ));
        }
        output
    }

    fn colorize(&self, text: &str, color: Color, bold: bool) -> String {
        if !self.colored {
            return text.to_string();
        }
        let colored_text = match color {
            Color::Green => text.green(),
            Color::Yellow => text.yellow(),
            Color::Blue => text.blue(),
            Color::Cyan => text.cyan(),
            Color::Red => text.red(),
            Color::Dim => text.dimmed(),
        };
        if bold {
            colored_text.bold().to_string()
        } else {
            colored_text.to_string()
        }
    }
}

#[derive(Clone, Copy)]
enum Color {
    Green,
    Yellow,
    Blue,
    Cyan,
    Red,
    Dim,
}
