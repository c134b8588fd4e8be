//! Terminal reporting for snatic commands.
//!
//! Everything goes to stderr. Build and upload summaries are assembled as
//! plain lines first and only styled when written.

use std::path::Path;

use console::{Style, Term};
use snatic_deploy::UploadReport;
use snatic_site::{BuildReport, RouteEntry};

/// A report line and how it should be styled.
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Plain(String),
    Warning(String),
    Success(String),
}

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
    dim: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
            dim: Style::new().dim(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Start of a pipeline stage (cyan bold).
    pub(crate) fn step(&self, msg: &str) {
        let _ = self
            .term
            .write_line(&self.cyan_bold.apply_to(msg).to_string());
    }

    /// Routes served by the new front controller and the build totals.
    pub(crate) fn build_report(&self, report: &BuildReport) {
        for route in &report.routes {
            let _ = self
                .term
                .write_line(&self.dim.apply_to(route_line(route)).to_string());
        }
        self.info(&build_summary(report));
    }

    /// Skipped entries and transfer totals of a finished mirror.
    pub(crate) fn upload_report(&self, report: &UploadReport) {
        for line in upload_lines(report) {
            match line {
                Line::Plain(text) => self.info(&text),
                Line::Warning(text) => self.warning(&text),
                Line::Success(text) => self.success(&text),
            }
        }
    }
}

fn route_line(route: &RouteEntry) -> String {
    format!("  [ROUTE] /{} -> html/{}", route.slug, route.filename)
}

fn build_summary(report: &BuildReport) -> String {
    format!(
        "Built {} {}, {} asset {}",
        report.pages.len(),
        plural(report.pages.len(), "page", "pages"),
        report.assets,
        plural(report.assets, "file", "files"),
    )
}

fn upload_lines(report: &UploadReport) -> Vec<Line> {
    let mut lines = vec![Line::Plain(format!(
        "Removed {} remote {}",
        report.removed,
        plural(report.removed, "entry", "entries"),
    ))];
    lines.extend(
        report
            .skipped
            .iter()
            .map(|path| Line::Warning(format!("  [SKIPPED] {}", display_name(path)))),
    );
    lines.push(Line::Success(format!(
        "Uploaded {} {} in {} {} ({} bytes)",
        report.files,
        plural(report.files, "file", "files"),
        report.directories,
        plural(report.directories, "directory", "directories"),
        report.bytes,
    )));
    lines
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 { one } else { many }
}
