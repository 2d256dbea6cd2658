//! Line rendering for the collection output.
//!
//! Everything is rendered to strings first and then emitted on the raw print
//! target, so the progress bar writer can interleave it with log events.

use colored::*;
use logsweep_common::models::host::Host;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;
use crate::terminal::format::Detail;

pub const TOTAL_WIDTH: usize = 64;
pub const PRINT_TARGET: &str = "logsweep::print";

#[macro_export]
macro_rules! lsprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

pub fn print(msg: &str) {
    info!(target: "logsweep::print", raw_msg = msg);
}

fn visible_width(text: &str) -> usize {
    UnicodeWidthStr::width(console::strip_ansi_codes(text).as_ref())
}

/// `═══ title ═══`, padded to [`TOTAL_WIDTH`].
fn titled_rule(title: &str, fill: &str) -> String {
    let dashes: usize = TOTAL_WIDTH.saturating_sub(visible_width(title));
    let left: usize = dashes / 2;
    format!(
        "{}{}{}",
        fill.repeat(left).bright_black(),
        title,
        fill.repeat(dashes - left).bright_black()
    )
}

pub fn banner(no_banner: bool, q_level: u8) {
    if no_banner || q_level > 0 {
        return;
    }
    let title = format!("⟦ LOGSWEEP v{} ⟧ ", env!("CARGO_PKG_VERSION"));
    print(&titled_rule(&title.bright_green().bold().to_string(), "═"));
}

/// Opens a stage of the run, e.g. `resolving hosts`.
pub fn stage(name: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }
    let title = format!("⟦ {} ⟧", name.to_uppercase()).bright_green();
    print(&titled_rule(&title.to_string(), "─"));
}

/// Renders `key....: value` lines with the dots aligned on the longest key.
fn settings_lines(settings: &[(&str, String)]) -> Vec<String> {
    let width: usize = settings.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    settings
        .iter()
        .map(|(key, value)| {
            let dots: String = ".".repeat(width + 1 - key.len());
            format!(
                "{} {}{}{} {}",
                ">".color(colors::SEPARATOR),
                key.color(colors::PRIMARY),
                dots.color(colors::SEPARATOR),
                ":".color(colors::SEPARATOR),
                value.color(colors::TEXT_DEFAULT)
            )
        })
        .collect()
}

pub fn settings(settings: &[(&str, String)]) {
    for line in settings_lines(settings) {
        print(&line);
    }
}

pub fn note(msg: &str) {
    print(&format!(
        "{} {}",
        ">".color(colors::SEPARATOR),
        msg.color(colors::TEXT_DEFAULT)
    ));
}

/// Renders one host as a numbered head with its details as branches.
fn host_tree_lines(idx: usize, host: &Host, details: &[Detail]) -> Vec<String> {
    let head: String = format!(
        "{}{}{} {}",
        "[".color(colors::SEPARATOR),
        idx.to_string().color(colors::ACCENT),
        "]".color(colors::SEPARATOR),
        host.address().color(colors::PRIMARY)
    );

    let width: usize = details.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let branches = details.iter().enumerate().map(|(i, (key, value))| {
        let branch: &str = if i + 1 == details.len() { "└─" } else { "├─" };
        format!(
            " {} {}{}{} {}",
            branch.bright_black(),
            key.color(colors::TEXT_DEFAULT),
            ".".repeat(width + 1 - key.len()).color(colors::SEPARATOR),
            ":".color(colors::SEPARATOR),
            value
        )
    });

    std::iter::once(head).chain(branches).collect()
}

pub fn host_tree(idx: usize, host: &Host, details: &[Detail]) {
    for line in host_tree_lines(idx, host, details) {
        print(&line);
    }
}

/// A heavy rule followed by `msg` centred under it.
pub fn closing_line(msg: &str) {
    print(&"═".repeat(TOTAL_WIDTH).bright_black().to_string());
    let pad: String = " ".repeat(TOTAL_WIDTH.saturating_sub(visible_width(msg)) / 2);
    print(&format!("{pad}{msg}"));
}

const NO_HOSTS: &str = r#"
         _   _  ___    _   _  ___  ____ _____ ____
        | \ | |/ _ \  | | | |/ _ \/ ___|_   _/ ___|
        |  \| | | | | | |_| | | | \___ \ | | \___ \
        | |\  | |_| | |  _  | |_| |___) || |  ___) |
        |_| \_|\___/  |_| |_|\___/|____/ |_| |____/
"#;

pub fn no_hosts() {
    print(&NO_HOSTS.red().bold().to_string());
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
