//! Terminal rendering for appliances, controls and notifications.
//!
//! Each command builds one [`Output`] from the global flags and hands it
//! its data. Tables come from the commands' `Tabled` row structs, the
//! structured formats serialize the domain values directly, and `plain`
//! prints one identifier per line so results can be piped into the next
//! `smartdevice` invocation.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};

/// How a status cell should read at a glance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Online appliance, switched-on toggle.
    Active,
    /// Open door, pending reminder.
    Attention,
    /// Offline appliance, alarm notification.
    Alarm,
    /// Unknown or vanished state.
    Inactive,
}

/// Output settings for one invocation.
#[derive(Debug, Clone)]
pub struct Output {
    format: OutputFormat,
    color: bool,
    quiet: bool,
}

impl Output {
    pub fn new(global: &GlobalOpts) -> Self {
        let color = match global.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        };
        Self {
            format: global.output.clone(),
            color,
            quiet: global.quiet,
        }
    }

    /// Color `text` for `status` when color is enabled.
    pub fn paint(&self, text: &str, status: Status) -> String {
        if !self.color {
            return text.to_owned();
        }
        match status {
            Status::Active => text.green().to_string(),
            Status::Attention => text.yellow().to_string(),
            Status::Alarm => text.red().bold().to_string(),
            Status::Inactive => text.dimmed().to_string(),
        }
    }

    /// Render a collection: one table row per item, or one id per line.
    pub fn list<T, R>(
        &self,
        items: &[T],
        to_row: impl Fn(&T) -> R,
        id: impl Fn(&T) -> String,
    ) -> String
    where
        T: Serialize,
        R: Tabled,
    {
        match self.format {
            OutputFormat::Table => {
                let rows: Vec<R> = items.iter().map(to_row).collect();
                Table::new(rows).with(Style::rounded()).to_string()
            }
            OutputFormat::Plain => items.iter().map(id).collect::<Vec<_>>().join("\n"),
            _ => self.structured(items),
        }
    }

    /// Render one item; the table format shows its key/value detail view.
    pub fn single<T: Serialize>(
        &self,
        item: &T,
        detail: impl Fn(&T) -> String,
        id: impl Fn(&T) -> String,
    ) -> String {
        match self.format {
            OutputFormat::Table => detail(item),
            OutputFormat::Plain => id(item),
            _ => self.structured(item),
        }
    }

    /// Render one streamed event as a single line: compact JSON for the
    /// JSON formats, `human` otherwise.
    pub fn event<T: Serialize>(&self, item: &T, human: impl FnOnce() -> String) -> String {
        match self.format {
            OutputFormat::Json | OutputFormat::JsonCompact => {
                serde_json::to_string(item).expect("domain values serialize")
            }
            _ => human(),
        }
    }

    /// Write rendered output to stdout unless `--quiet`.
    pub fn emit(&self, rendered: &str) {
        if self.quiet || rendered.is_empty() {
            return;
        }
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{rendered}");
    }

    fn structured<T: Serialize + ?Sized>(&self, data: &T) -> String {
        let rendered = match self.format {
            OutputFormat::JsonCompact => serde_json::to_string(data).map_err(|e| e.to_string()),
            OutputFormat::Yaml => serde_yaml::to_string(data).map_err(|e| e.to_string()),
            _ => serde_json::to_string_pretty(data).map_err(|e| e.to_string()),
        };
        rendered.expect("domain values serialize")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Fridge {
        device_id: &'static str,
    }

    #[derive(Tabled)]
    struct FridgeRow {
        #[tabled(rename = "ID")]
        id: String,
    }

    fn output(format: OutputFormat) -> Output {
        Output {
            format,
            color: false,
            quiet: false,
        }
    }

    fn render(format: OutputFormat) -> String {
        let fridges = [Fridge { device_id: "A" }, Fridge { device_id: "B" }];
        output(format).list(
            &fridges,
            |f| FridgeRow {
                id: f.device_id.into(),
            },
            |f| f.device_id.to_owned(),
        )
    }

    #[test]
    fn plain_emits_one_id_per_line() {
        assert_eq!(render(OutputFormat::Plain), "A\nB");
    }

    #[test]
    fn compact_json_is_single_line() {
        assert_eq!(
            render(OutputFormat::JsonCompact),
            r#"[{"device_id":"A"},{"device_id":"B"}]"#
        );
    }

    #[test]
    fn table_has_header_and_rows() {
        let out = render(OutputFormat::Table);
        assert!(out.contains("ID"));
        assert!(out.contains('A') && out.contains('B'));
    }

    #[test]
    fn yaml_lists_every_item() {
        let out = render(OutputFormat::Yaml);
        assert!(out.contains("device_id: A") && out.contains("device_id: B"));
    }

    #[test]
    fn events_are_json_lines_or_text() {
        let fridge = Fridge { device_id: "A" };
        assert_eq!(
            output(OutputFormat::Json).event(&fridge, || "text".into()),
            r#"{"device_id":"A"}"#
        );
        assert_eq!(output(OutputFormat::Table).event(&fridge, || "text".into()), "text");
    }

    #[test]
    fn paint_is_identity_without_color() {
        assert_eq!(output(OutputFormat::Table).paint("open", Status::Alarm), "open");
    }
}
