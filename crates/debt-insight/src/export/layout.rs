use super::backend::{ExportEncoding, Latin1Backend, LineBackend, LineError, Utf8Backend};
use super::wrap::{wrap, MonospaceMeasure};
use crate::assessment::domain::{HelpCategory, HelpDirectory};
use crate::assessment::report::{AssessmentOutcome, ComposedReport, NO_RISK_MESSAGE};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

pub const DOCUMENT_TITLE: &str = "Financial Behavior Self-Assessment";

const INDENT: &str = "  ";
// Wide enough for the page header.
const MIN_LINE_WIDTH: usize = 60;
// Header line plus the blank line under it.
const HEADER_LINES: usize = 2;
const PAGE_SEPARATOR: &str = "\u{c}\n";

/// Fixed-width page geometry and target encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportLayout {
    pub line_width: usize,
    pub lines_per_page: usize,
    pub encoding: ExportEncoding,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            line_width: 90,
            lines_per_page: 54,
            encoding: ExportEncoding::Utf8,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("invalid report layout: {0}")]
    InvalidLayout(String),
    #[error("crisis resources replace the report and cannot be exported")]
    CrisisOverride,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub number: usize,
    pub lines: Vec<String>,
}

/// A line the backend refused, kept so callers can surface it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFailure {
    pub page: usize,
    pub line: usize,
    pub text: String,
    pub error: LineError,
}

#[derive(Debug, Clone)]
pub struct ExportedReport {
    pub pages: Vec<Page>,
    pub failures: Vec<LineFailure>,
    pub encoding: ExportEncoding,
}

impl ExportedReport {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Pages joined with form feeds.
    pub fn to_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| {
                let mut text = page.lines.join("\n");
                text.push('\n');
                text
            })
            .collect::<Vec<_>>()
            .join(PAGE_SEPARATOR)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.encoding.encode(&self.to_text())
    }

    pub fn file_name(date: NaiveDate) -> String {
        format!("self-assessment-{}.txt", date.format("%Y-%m-%d"))
    }
}

/// Lays out a composed report as a paginated fixed-width document.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportExporter {
    layout: ReportLayout,
}

impl ReportExporter {
    pub fn new(layout: ReportLayout) -> Result<Self, ExportError> {
        if layout.line_width < MIN_LINE_WIDTH {
            return Err(ExportError::InvalidLayout(format!(
                "line width {} is below the minimum of {MIN_LINE_WIDTH}",
                layout.line_width
            )));
        }
        if layout.lines_per_page <= HEADER_LINES {
            return Err(ExportError::InvalidLayout(format!(
                "{} lines per page leaves no room below the page header",
                layout.lines_per_page
            )));
        }
        Ok(Self { layout })
    }

    pub fn layout(&self) -> ReportLayout {
        self.layout
    }

    /// Export with the backend matching the configured encoding.
    pub fn export(
        &self,
        outcome: &AssessmentOutcome,
        help: &HelpDirectory,
        date: NaiveDate,
    ) -> Result<ExportedReport, ExportError> {
        match self.layout.encoding {
            ExportEncoding::Utf8 => self.export_with(&Utf8Backend, outcome, help, date),
            ExportEncoding::Latin1 => self.export_with(&Latin1Backend, outcome, help, date),
        }
    }

    pub fn export_with<B: LineBackend>(
        &self,
        backend: &B,
        outcome: &AssessmentOutcome,
        help: &HelpDirectory,
        date: NaiveDate,
    ) -> Result<ExportedReport, ExportError> {
        let body = match outcome {
            AssessmentOutcome::Crisis(_) => return Err(ExportError::CrisisOverride),
            AssessmentOutcome::NoRisk => self.body_lines(None, help, date),
            AssessmentOutcome::Report(report) => self.body_lines(Some(report), help, date),
        };

        let body_per_page = self.layout.lines_per_page - HEADER_LINES;
        let chunks: Vec<&[String]> = body.chunks(body_per_page).collect();
        let total = chunks.len();

        let mut pages = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for (index, chunk) in chunks.into_iter().enumerate() {
            let number = index + 1;
            let header = format!("{DOCUMENT_TITLE} | page {number}/{total}");
            let blank = String::new();
            let mut lines = Vec::with_capacity(chunk.len() + HEADER_LINES);

            for (offset, text) in std::iter::once(&header)
                .chain(std::iter::once(&blank))
                .chain(chunk.iter())
                .enumerate()
            {
                match backend.render_line(text) {
                    Ok(rendered) => lines.push(rendered),
                    Err(error) => {
                        warn!(page = number, line = offset + 1, %error, "skipping report line");
                        failures.push(LineFailure {
                            page: number,
                            line: offset + 1,
                            text: text.clone(),
                            error,
                        });
                    }
                }
            }

            pages.push(Page { number, lines });
        }

        Ok(ExportedReport {
            pages,
            failures,
            encoding: backend.encoding(),
        })
    }

    fn body_lines(
        &self,
        report: Option<&ComposedReport>,
        help: &HelpDirectory,
        date: NaiveDate,
    ) -> Vec<String> {
        let mut out = Vec::new();
        self.push_wrapped(&mut out, "", &DOCUMENT_TITLE.to_uppercase());
        out.push(format!("Generated: {}", date.format("%Y-%m-%d")));
        out.push(String::new());

        match report {
            Some(report) => {
                out.push(format!("Detected behaviors: {}", report.behavior_count()));
                for (index, section) in report.sections.iter().enumerate() {
                    out.push(String::new());
                    self.push_wrapped(&mut out, "", &format!("{}. {}", index + 1, section.title));
                    self.push_wrapped(&mut out, INDENT, &format!("Description: {}", section.description));
                    self.push_wrapped(&mut out, INDENT, &format!("Symptoms: {}", section.symptoms));
                    self.push_wrapped(&mut out, INDENT, &format!("Solution: {}", section.solution));
                }
                out.push(String::new());
                out.push("RECOMMENDATION".to_string());
                self.push_wrapped(&mut out, INDENT, report.recommendation.message());
            }
            None => {
                out.push("Detected behaviors: 0".to_string());
                out.push(String::new());
                self.push_wrapped(&mut out, "", NO_RISK_MESSAGE);
            }
        }

        out.push(String::new());
        out.push("SUPPORT RESOURCES".to_string());
        for category in HelpCategory::ordered() {
            let contacts = help.contacts(category);
            if contacts.is_empty() {
                continue;
            }
            self.push_wrapped(&mut out, "", category.label());
            for contact in contacts {
                self.push_wrapped(&mut out, INDENT, &format!("- {}", contact.listing()));
            }
        }

        out
    }

    fn push_wrapped(&self, out: &mut Vec<String>, indent: &str, text: &str) {
        let width = self.layout.line_width - indent.len();
        out.extend(wrap(text, width, &MonospaceMeasure).map(|line| format!("{indent}{line}")));
    }
}
