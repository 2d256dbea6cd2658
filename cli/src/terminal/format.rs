use colored::*;
use logsweep_common::models::outcome::DownloadOutcome;
use logsweep_common::models::report::{HostReport, HostStatus};

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn status_to_detail(report: &HostReport) -> Detail {
    let value: ColoredString = match &report.status {
        HostStatus::Collected if report.downloaded() == report.files_listed => {
            "collected".color(colors::SUCCESS)
        }
        HostStatus::Collected => "partial".color(colors::WARNING),
        HostStatus::Skipped(reason) => format!("skipped ({reason})").color(colors::WARNING),
        HostStatus::ListingFailed(reason) => format!("listing failed ({reason})").color(colors::FAILURE),
        HostStatus::Cancelled => "cancelled".color(colors::WARNING),
    };
    (String::from("Status"), value)
}

pub fn files_to_detail(report: &HostReport) -> Option<Detail> {
    if !matches!(report.status, HostStatus::Collected | HostStatus::Cancelled) {
        return None;
    }
    let value: String = format!("{}/{} downloaded", report.downloaded(), report.files_listed);
    Some((String::from("Files"), value.normal()))
}

pub fn outcome_to_detail(outcome: &DownloadOutcome) -> Option<Detail> {
    let reason = outcome.failure()?;
    let name: &str = outcome
        .remote_path
        .rsplit('/')
        .next()
        .unwrap_or(&outcome.remote_path);
    Some((
        String::from("Failed"),
        format!("{name}: {reason}").color(colors::FAILURE),
    ))
}

pub fn host_details(report: &HostReport) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![status_to_detail(report)];
    if let Some(files) = files_to_detail(report) {
        details.push(files);
    }
    details.extend(report.outcomes.iter().filter_map(outcome_to_detail));
    details
}
