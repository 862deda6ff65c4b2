// Startup module - banner and per-module activation status
//
// Printed with human replay output and mirrored into the log so captured
// runs carry the same information.

use crate::config::{Config, VERSION};
use crate::orchestrator::{ModuleState, ModuleStatus, StartupReport};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// Print the banner, config source and module table
pub fn print_startup(report: &StartupReport, scenario: &str) {
    use colors::*;

    println!();
    println!("  {BOLD}{CYAN}pagelift{RESET} {DIM}v{VERSION}{RESET}");
    println!("  {DIM}Progressive enhancement engine{RESET}");
    println!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display());
        } else {
            println!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }
    println!();

    let layout = if report.is_mobile { "mobile" } else { "desktop" };
    println!(
        "  {DIM}Enhancing{RESET} {BOLD}{scenario}{RESET} {DIM}({}px, {layout}){RESET}",
        report.viewport_width
    );
    for module in &report.modules {
        print_module_status(module);
    }
    println!();

    println!("  {MAGENTA}▸{RESET} Replay results");
}

fn print_module_status(module: &ModuleStatus) {
    use colors::*;

    let (icon, style) = match module.state {
        ModuleState::Active => (format!("{GREEN}✓{RESET}"), ""),
        ModuleState::Skipped => (format!("{YELLOW}–{RESET}"), DIM),
        ModuleState::Disabled => (format!("{DIM}○{RESET}"), DIM),
    };

    println!(
        "    {icon} {style}{:<16}{RESET} {DIM}{}{RESET}",
        module.name, module.detail
    );
}

fn status_icon(state: ModuleState) -> &'static str {
    match state {
        ModuleState::Active => "✓",
        ModuleState::Skipped => "–",
        ModuleState::Disabled => "○",
    }
}

/// Mirror the startup table into the log
pub fn log_startup(report: &StartupReport) {
    tracing::info!(
        viewport_width = report.viewport_width,
        mobile = report.is_mobile,
        "pagelift v{} starting",
        VERSION
    );
    for module in &report.modules {
        tracing::info!(
            "  {} {} - {}",
            status_icon(module.state),
            module.name,
            module.detail
        );
    }
    let active = report
        .modules
        .iter()
        .filter(|m| m.state == ModuleState::Active)
        .count();
    tracing::info!("{}/{} modules active", active, report.modules.len());
}
