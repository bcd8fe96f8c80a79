use std::io::{self, IsTerminal, Write};

use taskboard_shared::{Category, Priority, Task};
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::notice::{Level, Notice};
use crate::view::Summary;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color = cfg.get_bool("color")?.unwrap_or(true);
        Ok(Self { color })
    }

    #[tracing::instrument(skip(self, tasks), fields(count = tasks.len()))]
    pub fn print_task_table(&mut self, tasks: &[&Task]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        if tasks.is_empty() {
            writeln!(out, "No todos found")?;
            return Ok(());
        }

        let headers = vec![
            "ID".to_string(),
            "Done".to_string(),
            "Priority".to_string(),
            "Category".to_string(),
            "Text".to_string(),
        ];

        let rows = tasks
            .iter()
            .map(|task| {
                vec![
                    self.paint(&task.id.to_string(), "33"),
                    if task.completed { "[x]" } else { "[ ]" }.to_string(),
                    self.paint(task.priority.label(), priority_color(task.priority)),
                    self.paint(task.category.label(), category_color(task.category)),
                    task.text.clone(),
                ]
            })
            .collect();

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    pub fn print_task(&mut self, task: &Task) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "id        {}", task.id)?;
        writeln!(out, "text      {}", task.text)?;
        writeln!(out, "priority  {}", task.priority.label())?;
        writeln!(out, "category  {}", task.category.label())?;
        writeln!(out, "completed {}", task.completed)?;
        Ok(())
    }

    pub fn print_summary(&mut self, summary: Summary) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", summary_line(summary))?;
        Ok(())
    }

    pub fn print_notice(&mut self, notice: &Notice) -> anyhow::Result<()> {
        let line = match notice.icon {
            Some(icon) => format!("{icon} {}", notice.message),
            None => notice.message.clone(),
        };

        if notice.level == Level::Error {
            let mut err = io::stderr().lock();
            writeln!(err, "{}", self.paint(&line, "31"))?;
        } else {
            let mut out = io::stdout().lock();
            let code = if notice.level == Level::Success { "32" } else { "36" };
            writeln!(out, "{}", self.paint(&line, code))?;
        }
        Ok(())
    }

    pub fn print_config(&mut self, cfg: &Config) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let mut entries = cfg.iter().collect::<Vec<_>>();
        entries.sort();
        for (key, value) in entries {
            writeln!(out, "{key}={value}")?;
        }
        for file in &cfg.loaded_files {
            writeln!(out, "# loaded {}", file.display())?;
        }
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

pub fn summary_line(summary: Summary) -> String {
    format!(
        "Total Tasks: {}   Incomplete: {} | Completed: {}",
        summary.total, summary.incomplete, summary.completed
    )
}

fn priority_color(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "32",
        Priority::Medium => "33",
        Priority::High => "31",
    }
}

fn category_color(category: Category) -> &'static str {
    match category {
        Category::Work => "34",
        Category::Personal => "35",
        Category::Shopping => "95",
        Category::Health => "32",
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for (header, &width) in headers.iter().zip(&widths) {
        write!(writer, "{header:width$} ")?;
    }
    writeln!(writer)?;

    for &width in &widths {
        write!(writer, "{:-<width$} ", "")?;
    }
    writeln!(writer)?;

    for row in rows {
        for (cell, &width) in row.iter().zip(&widths) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = width.saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
