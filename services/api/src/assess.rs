use crate::infra::load_catalogue;
use chrono::{Local, NaiveDate};
use clap::Args;
use debt_insight::assessment::report::views::support_resources;
use debt_insight::assessment::report::{AssessmentOutcome, NO_RISK_MESSAGE};
use debt_insight::assessment::sessions::AssessmentSession;
use debt_insight::assessment::{Catalogue, HelpDirectory, QuestionId};
use debt_insight::config::AppConfig;
use debt_insight::error::AppError;
use debt_insight::export::{ExportedReport, ReportExporter};
use debt_insight::telemetry::{self, LogSink};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct AssessArgs {
    /// Question ids answered "yes" (comma separated or repeated); skips the prompts
    #[arg(long, value_delimiter = ',')]
    pub(crate) yes: Vec<u32>,
    /// Skip the prompts even when no --yes ids are given (everything answered "no")
    #[arg(long)]
    pub(crate) batch: bool,
    /// Write the paginated report to this file
    #[arg(long)]
    pub(crate) export: Option<PathBuf>,
    /// Override the directory holding the catalogue JSON files
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Date printed on the report (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_assessment(args: AssessArgs) -> Result<(), AppError> {
    let AssessArgs {
        yes,
        batch,
        export,
        data_dir,
        today,
    } = args;

    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogSink::Stderr)?;
    let catalogue = load_catalogue(&mut config, data_dir)?;
    let exporter = ReportExporter::new(config.export)?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let mut session = AssessmentSession::new(&catalogue);
    if batch || !yes.is_empty() {
        for id in yes {
            session.answer(QuestionId(id), true)?;
        }
    } else {
        let stdin = io::stdin();
        ask_questions(&catalogue, &mut session, stdin.lock(), io::stdout())?;
    }

    let outcome = session.show_results(&catalogue, &config.catalogue.policy);
    let mut stdout = io::stdout().lock();
    render_outcome(&mut stdout, &outcome, catalogue.help())?;

    if let Some(path) = export {
        if outcome.is_crisis() {
            writeln!(
                stdout,
                "\nThe report is not exported while the emergency notice is shown."
            )?;
            return Ok(());
        }
        let exported = exporter.export(&outcome, catalogue.help(), today)?;
        std::fs::write(&path, exported.to_bytes())?;
        render_export_summary(&mut stdout, &exported, &path.display().to_string())?;
    }

    Ok(())
}

/// Prompt for every question in catalogue order. End of input leaves the
/// remaining questions at "no".
pub(crate) fn ask_questions<R: BufRead, W: Write>(
    catalogue: &Catalogue,
    session: &mut AssessmentSession,
    mut input: R,
    mut output: W,
) -> Result<(), AppError> {
    let total = catalogue.questions().len();
    for (index, question) in catalogue.questions().iter().enumerate() {
        loop {
            write!(output, "[{}/{}] {} (y/N): ", index + 1, total, question.text)?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                return Ok(());
            }
            match parse_answer(&line) {
                Some(answer) => {
                    session.answer(question.id, answer)?;
                    break;
                }
                None => writeln!(output, "Please answer y or n.")?,
            }
        }
    }
    Ok(())
}

fn parse_answer(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "s" | "si" | "sí" => Some(true),
        "" | "n" | "no" => Some(false),
        _ => None,
    }
}

pub(crate) fn render_outcome<W: Write>(
    out: &mut W,
    outcome: &AssessmentOutcome,
    help: &HelpDirectory,
) -> io::Result<()> {
    match outcome {
        AssessmentOutcome::Crisis(notice) => {
            writeln!(out, "IMPORTANT")?;
            writeln!(out, "{}", notice.message)?;
            writeln!(out, "\nEmergency lines")?;
            for contact in &notice.emergency_contacts {
                writeln!(out, "- {}", contact.listing())?;
            }
            return Ok(());
        }
        AssessmentOutcome::NoRisk => {
            writeln!(out, "Results")?;
            writeln!(out, "{NO_RISK_MESSAGE}")?;
        }
        AssessmentOutcome::Report(report) => {
            writeln!(out, "Results")?;
            writeln!(out, "Detected behaviors: {}", report.behavior_count())?;
            for (index, section) in report.sections.iter().enumerate() {
                writeln!(out, "\n{}. {}", index + 1, section.title)?;
                writeln!(out, "  Description: {}", section.description)?;
                writeln!(out, "  Symptoms: {}", section.symptoms)?;
                writeln!(out, "  Solution: {}", section.solution)?;
            }
            writeln!(
                out,
                "\nRecommendation ({}): {}",
                report.recommendation.label(),
                report.recommendation.message()
            )?;
        }
    }

    writeln!(out, "\nSupport resources")?;
    for category in support_resources(help) {
        if category.contacts.is_empty() {
            continue;
        }
        writeln!(out, "{}", category.label)?;
        for contact in &category.contacts {
            writeln!(out, "- {}", contact.listing())?;
        }
    }
    Ok(())
}

fn render_export_summary<W: Write>(
    out: &mut W,
    exported: &ExportedReport,
    destination: &str,
) -> io::Result<()> {
    writeln!(
        out,
        "\nReport written to {destination} ({} pages)",
        exported.page_count()
    )?;
    if !exported.failures.is_empty() {
        writeln!(out, "Skipped {} line(s):", exported.failures.len())?;
        for failure in &exported.failures {
            writeln!(
                out,
                "- page {} line {}: {}",
                failure.page, failure.line, failure.error
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use debt_insight::assessment::{AssessmentPolicy, Behavior, BehaviorId, HelpContact, Question};
    use std::io::Cursor;

    fn catalogue() -> Catalogue {
        let behavior = |title: &str| Behavior {
            id: BehaviorId(0),
            title: title.to_string(),
            description: format!("{title} description"),
            symptoms: format!("{title} symptoms"),
            solution: format!("{title} solution"),
        };
        Catalogue::from_parts(
            vec![
                Question {
                    id: QuestionId(1),
                    text: "Do you buy on impulse?".to_string(),
                },
                Question {
                    id: QuestionId(2),
                    text: "Do you hide purchases?".to_string(),
                },
                Question {
                    id: QuestionId(3),
                    text: "Do you feel hopeless about money?".to_string(),
                },
            ],
            vec![
                (BehaviorId(1), behavior("Impulse buying")),
                (BehaviorId(2), behavior("Secret spending")),
                (BehaviorId(5), behavior("Despair")),
            ],
            vec![
                (QuestionId(1), vec![BehaviorId(1)]),
                (QuestionId(2), vec![BehaviorId(2)]),
                (QuestionId(3), vec![BehaviorId(5)]),
            ],
            HelpDirectory {
                emergency: vec![HelpContact {
                    name: "Lifeline".to_string(),
                    phone: Some("988".to_string()),
                    country: None,
                    url: "https://988lifeline.org".to_string(),
                }],
                financial: Vec::new(),
                therapy: Vec::new(),
            },
        )
        .expect("catalogue builds")
    }

    fn rendered(outcome: &AssessmentOutcome, help: &HelpDirectory) -> String {
        let mut buffer = Vec::new();
        render_outcome(&mut buffer, outcome, help).expect("renders");
        String::from_utf8(buffer).expect("utf8 output")
    }

    #[test]
    fn prompts_record_answers_and_retry_invalid_input() {
        let catalogue = catalogue();
        let mut session = AssessmentSession::new(&catalogue);
        let input = Cursor::new("y\nmaybe\nn\n\n");
        let mut output = Vec::new();

        ask_questions(&catalogue, &mut session, input, &mut output).expect("prompts run");

        assert_eq!(session.answers().get(QuestionId(1)), Some(true));
        assert_eq!(session.answers().get(QuestionId(2)), Some(false));
        assert_eq!(session.answers().get(QuestionId(3)), Some(false));
        let transcript = String::from_utf8(output).expect("utf8 output");
        assert!(transcript.contains("[1/3] Do you buy on impulse? (y/N): "));
        assert!(transcript.contains("Please answer y or n."));
    }

    #[test]
    fn end_of_input_keeps_the_remaining_defaults() {
        let catalogue = catalogue();
        let mut session = AssessmentSession::new(&catalogue);

        ask_questions(&catalogue, &mut session, Cursor::new("si\n"), Vec::new())
            .expect("prompts run");

        assert_eq!(session.answers().yes_count(), 1);
        assert_eq!(session.answers().get(QuestionId(2)), Some(false));
    }

    #[test]
    fn report_lists_sections_recommendation_and_resources() {
        let catalogue = catalogue();
        let mut session = AssessmentSession::new(&catalogue);
        session.answer(QuestionId(1), true).expect("known question");
        session.answer(QuestionId(2), true).expect("known question");
        let outcome = session.show_results(&catalogue, &AssessmentPolicy::default());

        let text = rendered(&outcome, catalogue.help());
        assert!(text.contains("Detected behaviors: 2"));
        assert!(text.contains("1. Impulse buying"));
        assert!(text.contains("2. Secret spending"));
        assert!(text.contains("Recommendation (Small steps)"));
        assert!(text.contains("- Lifeline: 988 - https://988lifeline.org"));
        assert!(!text.contains("Financial counseling"));
    }

    #[test]
    fn crisis_replaces_the_report() {
        let catalogue = catalogue();
        let mut session = AssessmentSession::new(&catalogue);
        session.answer(QuestionId(1), true).expect("known question");
        session.answer(QuestionId(3), true).expect("known question");
        let outcome = session.show_results(&catalogue, &AssessmentPolicy::default());

        let text = rendered(&outcome, catalogue.help());
        assert!(text.starts_with("IMPORTANT"));
        assert!(text.contains("Lifeline"));
        assert!(!text.contains("Detected behaviors"));
        assert!(!text.contains("Support resources"));
    }

    #[test]
    fn no_answers_prints_the_no_risk_message() {
        let catalogue = catalogue();
        let mut session = AssessmentSession::new(&catalogue);
        let outcome = session.show_results(&catalogue, &AssessmentPolicy::default());

        let text = rendered(&outcome, catalogue.help());
        assert!(text.contains(NO_RISK_MESSAGE));
        assert!(text.contains("Emotional emergency lines"));
    }
}
