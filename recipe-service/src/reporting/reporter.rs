// Run Reporter
// Renders a finished run as terminal text, JUnit XML, TAP, or JSON

use crate::error::RunError;
use crate::execution::executor::RunReport;
use crate::runners::{CellOutcome, CellResult};

use std::fmt;

use serde::Serialize;

/// Output format for run reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// JUnit XML format (for CI systems)
    JUnit,
    /// TAP (Test Anything Protocol) format
    Tap,
    /// Machine-readable JSON
    Json,
    /// Human-readable terminal output
    Terminal,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::JUnit => write!(f, "junit"),
            ReportFormat::Tap => write!(f, "tap"),
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Terminal => write!(f, "terminal"),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "junit" | "junit-xml" | "xml" => Ok(ReportFormat::JUnit),
            "tap" => Ok(ReportFormat::Tap),
            "json" => Ok(ReportFormat::Json),
            "terminal" | "text" | "console" => Ok(ReportFormat::Terminal),
            _ => Err(format!(
                "Unknown report format '{}'. Valid formats: junit, tap, json, terminal",
                s
            )),
        }
    }
}

/// Short outcome text, as shown on `.result:` lines
pub fn outcome_summary(outcome: &CellOutcome) -> String {
    match outcome {
        CellOutcome::Succeeded => "OK".to_string(),
        CellOutcome::Failed {
            exit_code: Some(code),
        } => format!("ERR ({})", code),
        CellOutcome::Failed { exit_code: None } => "ERR (signal)".to_string(),
        CellOutcome::TimedOut { limit } => format!("TIMEOUT ({:.0}s)", limit.as_secs_f64()),
        CellOutcome::LaunchFailed { .. } => "LAUNCH FAILED".to_string(),
    }
}

/// Failures that are not tied to an executed cell (catalog problems)
fn non_cell_failures(report: &RunReport) -> impl Iterator<Item = &RunError> {
    report
        .failures
        .iter()
        .filter(|e| matches!(e, RunError::Catalog(_)))
}

/// Run reporter that generates output in various formats
pub struct RunReporter;

impl RunReporter {
    /// Generate a report in the specified format
    pub fn report(report: &RunReport, format: ReportFormat) -> String {
        match format {
            ReportFormat::JUnit => Self::to_junit_xml(report),
            ReportFormat::Tap => Self::to_tap(report),
            ReportFormat::Json => Self::to_json(report),
            ReportFormat::Terminal => Self::to_terminal(report),
        }
    }

    /// Generate JUnit XML output, one test case per executed cell.
    ///
    /// Catalog failures are reported as errored test cases.
    pub fn to_junit_xml(report: &RunReport) -> String {
        let errors: Vec<_> = non_cell_failures(report).collect();
        let total = report.executed() + errors.len();

        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!(
            "<testsuites tests=\"{}\" failures=\"{}\" errors=\"{}\" time=\"{:.3}\">\n",
            total,
            report.failed_cells(),
            errors.len(),
            report.duration.as_secs_f64()
        ));
        xml.push_str(&format!(
            "  <testsuite name=\"recipe-matrix\" tests=\"{}\" failures=\"{}\" errors=\"{}\" time=\"{:.3}\">\n",
            total,
            report.failed_cells(),
            errors.len(),
            report.duration.as_secs_f64()
        ));

        for result in &report.results {
            xml.push_str(&format!(
                "    <testcase classname=\"{}\" name=\"{} {}\" time=\"{:.3}\"",
                xml_escape(&result.cell.reference()),
                result.cell.build_type,
                result.cell.linkage,
                result.duration.as_secs_f64()
            ));

            if result.success() {
                xml.push_str(" />\n");
                continue;
            }

            xml.push_str(">\n");
            let message = result
                .error()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Cell failed".to_string());
            xml.push_str(&format!(
                "      <failure message=\"{}\" type=\"{}\">{}</failure>\n",
                xml_escape(&message),
                xml_escape(&outcome_summary(&result.outcome)),
                xml_escape(&result.command.to_string())
            ));
            xml.push_str(&format!(
                "      <system-out>{}</system-out>\n",
                xml_escape(&result.stdout)
            ));
            xml.push_str(&format!(
                "      <system-err>{}</system-err>\n",
                xml_escape(&result.stderr)
            ));
            xml.push_str("    </testcase>\n");
        }

        for error in errors {
            xml.push_str("    <testcase classname=\"catalog\" name=\"catalog\" time=\"0.000\">\n");
            xml.push_str(&format!(
                "      <error message=\"{}\" />\n",
                xml_escape(&error.to_string())
            ));
            xml.push_str("    </testcase>\n");
        }

        xml.push_str("  </testsuite>\n");
        xml.push_str("</testsuites>\n");
        xml
    }

    /// Generate TAP (Test Anything Protocol) output
    ///
    /// TAP version 13 compatible
    pub fn to_tap(report: &RunReport) -> String {
        let errors: Vec<_> = non_cell_failures(report).collect();
        let mut tap = String::new();
        tap.push_str("TAP version 13\n");
        tap.push_str(&format!("1..{}\n", report.executed() + errors.len()));

        let mut test_num = 0;
        for result in &report.results {
            test_num += 1;
            if result.success() {
                tap.push_str(&format!("ok {} - {}\n", test_num, result.cell.label()));
                continue;
            }

            tap.push_str(&format!("not ok {} - {}\n", test_num, result.cell.label()));
            tap.push_str("  ---\n");
            tap.push_str(&format!("  duration_ms: {}\n", result.duration.as_millis()));
            tap.push_str(&format!(
                "  outcome: \"{}\"\n",
                outcome_summary(&result.outcome)
            ));
            tap.push_str(&format!(
                "  command: \"{}\"\n",
                result.command.to_string().replace('"', "\\\"")
            ));
            tap.push_str("  ...\n");
        }

        for error in errors {
            test_num += 1;
            tap.push_str(&format!("not ok {} - catalog\n", test_num));
            tap.push_str("  ---\n");
            tap.push_str(&format!("  message: \"{}\"\n", error));
            tap.push_str("  ...\n");
        }

        tap.push_str(&format!(
            "# cells {}\n# pass {}\n# fail {}\n# duration {:.3}s\n",
            report.executed(),
            report.executed() - report.failed_cells(),
            report.failures.len(),
            report.duration.as_secs_f64()
        ));

        tap
    }

    /// Generate JSON output
    pub fn to_json(report: &RunReport) -> String {
        let view = JsonReport::from(report);
        serde_json::to_string_pretty(&view).unwrap_or_else(|e| {
            format!("{{\"error\": \"failed to serialize report: {}\"}}", e)
        })
    }

    /// Generate human-readable terminal output
    pub fn to_terminal(report: &RunReport) -> String {
        let mut out = String::new();

        out.push_str(&format!("\nBuild matrix: {}\n", report.packages.join(", ")));
        out.push_str(&"=".repeat(60));
        out.push('\n');

        for result in &report.results {
            let symbol = if result.success() { "+" } else { "x" };
            out.push_str(&format!(
                "  [{}] {:<14} ({:.2}s) {}\n",
                symbol,
                outcome_summary(&result.outcome),
                result.duration.as_secs_f64(),
                result.cell.label(),
            ));
        }

        for error in non_cell_failures(report) {
            out.push_str(&format!("  [x] {}\n", error));
        }

        out.push_str(&"-".repeat(60));
        out.push('\n');

        let status_line = if report.success() {
            format!(
                "  All {} cells passed ({:.2}s)",
                report.executed(),
                report.duration.as_secs_f64()
            )
        } else {
            format!(
                "  {} failure(s), {} of {} cells passed ({:.2}s)",
                report.failures.len(),
                report.executed() - report.failed_cells(),
                report.executed(),
                report.duration.as_secs_f64()
            )
        };
        out.push_str(&status_line);
        out.push('\n');
        out
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    success: bool,
    duration_secs: f64,
    packages: &'a [String],
    cells: Vec<JsonCell<'a>>,
    failures: Vec<JsonFailure>,
}

#[derive(Serialize)]
struct JsonCell<'a> {
    package: &'a str,
    version: &'a str,
    build_type: String,
    linkage: String,
    run_tests: bool,
    command: String,
    outcome: &'a CellOutcome,
    duration_secs: f64,
}

#[derive(Serialize)]
struct JsonFailure {
    kind: &'static str,
    message: String,
}

impl<'a> From<&'a RunReport> for JsonReport<'a> {
    fn from(report: &'a RunReport) -> Self {
        Self {
            success: report.success(),
            duration_secs: report.duration.as_secs_f64(),
            packages: &report.packages,
            cells: report.results.iter().map(JsonCell::from).collect(),
            failures: report
                .failures
                .iter()
                .map(|e| JsonFailure {
                    kind: e.kind(),
                    message: e.to_string(),
                })
                .collect(),
        }
    }
}

impl<'a> From<&'a CellResult> for JsonCell<'a> {
    fn from(result: &'a CellResult) -> Self {
        Self {
            package: &result.cell.package,
            version: &result.cell.version,
            build_type: result.cell.build_type.to_string(),
            linkage: result.cell.linkage.to_string(),
            run_tests: result.cell.run_tests,
            command: result.command.to_string(),
            outcome: &result.outcome,
            duration_secs: result.duration.as_secs_f64(),
        }
    }
}

/// Escape special XML characters
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
