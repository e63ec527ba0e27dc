//! Environment readiness check.

use crate::config::{resolve_load_timeout, LOAD_TIMEOUT_ENV};
use crate::renderer::chromium::{find_chromium, CHROMIUM_PATH_ENV};
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct Report {
    os: &'static str,
    arch: &'static str,
    chromium: Option<PathBuf>,
    load_timeout_ms: u64,
    mode: &'static str,
}

fn report() -> Report {
    let chromium = find_chromium();
    Report {
        os: std::env::consts::OS,
        arch: std::env::consts::ARCH,
        mode: if chromium.is_some() { "chromium" } else { "http-only" },
        chromium,
        load_timeout_ms: resolve_load_timeout(None),
    }
}

/// Check Chromium availability and the effective load timeout.
pub async fn run(json: bool) -> Result<()> {
    let report = report();
    if json {
        return crate::cli::output::print_json(&report);
    }

    println!("webcheck doctor");
    println!("===============");
    println!();
    println!("OS:   {}", report.os);
    println!("Arch: {}", report.arch);
    println!();

    match &report.chromium {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Set {CHROMIUM_PATH_ENV} or install google-chrome/chromium."
        ),
    }
    println!(
        "[OK] Page-load timeout: {}ms (override with {LOAD_TIMEOUT_ENV})",
        report.load_timeout_ms
    );

    println!();
    if report.chromium.is_some() {
        println!("Status: READY");
    } else {
        println!("Status: HTTP-ONLY");
        println!("  Live pages will be fetched without JavaScript rendering.");
    }

    Ok(())
}
