use std::env;
use std::fmt::Write as FmtWrite;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, Utc};
use seolens_core::report::{self, Report};
use seolens_core::{
    AuditConfig, AuditRun, AuditTarget, Auditor, DeviceReport, ModuleDetails, ModuleKind,
    ModuleResult, ScorePolicy,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const APP_NAME: &str = "seolens";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq)]
enum OutputMode {
    Report,
    Json,
}

#[derive(Debug)]
struct CliOptions {
    url: String,
    mode: OutputMode,
    policy: ScorePolicy,
    save_target: Option<PathBuf>,
}

#[derive(Debug)]
enum CliCommand {
    Run(CliOptions),
    Help,
    Version,
}

fn parse_arguments(args: &[String]) -> Result<CliCommand> {
    if args.is_empty() {
        return Ok(CliCommand::Help);
    }

    let mut url: Option<String> = None;
    let mut mode = OutputMode::Report;
    let mut policy = ScorePolicy::IncludeErrors;
    let mut save_target: Option<PathBuf> = None;
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if matches!(arg.as_str(), "-h" | "--help") {
            return Ok(CliCommand::Help);
        }

        if matches!(arg.as_str(), "-v" | "--version") {
            return Ok(CliCommand::Version);
        }

        if matches!(arg.as_str(), "-j" | "--json") {
            mode = OutputMode::Json;
            i += 1;
            continue;
        }

        if matches!(arg.as_str(), "-x" | "--exclude-failed") {
            policy = ScorePolicy::ExcludeErrors;
            i += 1;
            continue;
        }

        if let Some(value) = arg
            .strip_prefix("--save=")
            .or_else(|| arg.strip_prefix("-s="))
        {
            if save_target.is_some() {
                return Err(anyhow!("--save specified multiple times"));
            }
            save_target = Some(if value.is_empty() {
                PathBuf::from(".")
            } else {
                PathBuf::from(value)
            });
            i += 1;
            continue;
        }

        if matches!(arg.as_str(), "-s" | "--save") {
            if save_target.is_some() {
                return Err(anyhow!("--save specified multiple times"));
            }
            let next_is_path = url.is_some()
                && args
                    .get(i + 1)
                    .map(|next| !next.starts_with('-'))
                    .unwrap_or(false);

            if next_is_path {
                save_target = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            } else {
                save_target = Some(PathBuf::from("."));
                i += 1;
            }

            continue;
        }

        if arg.starts_with('-') {
            return Err(anyhow!("unknown flag: {arg}"));
        }

        if url.is_none() {
            url = Some(arg.clone());
        } else {
            return Err(anyhow!("unexpected additional argument: {}", arg));
        }

        i += 1;
    }

    let url = url.ok_or_else(|| anyhow!("missing <url> argument"))?;

    Ok(CliCommand::Run(CliOptions {
        url,
        mode,
        policy,
        save_target,
    }))
}

fn print_help() {
    println!("{APP_NAME} - On-page SEO audit for a single URL");
    println!("Usage: {APP_NAME} [OPTIONS] <URL>\n");
    println!("Options:");
    println!("  -j, --json              Print the full audit run as JSON");
    println!("  -s, --save [PATH]       Export the paginated report (directory or .md file)");
    println!("  -x, --exclude-failed    Leave failed modules out of the overall score");
    println!("  -v, --version           Show version information");
    println!("  -h, --help              Show this help message");
    println!();
    println!("Environment:");
    println!("  PAGESPEED_API_KEY           PageSpeed Insights API key");
    println!("  SEOLENS_PROXIES             Comma-separated proxy templates using {{url}}");
    println!("  SEOLENS_FETCH_TIMEOUT_SECS  Per-attempt fetch timeout (default 15)");
    println!("  SEOLENS_DIRECT_FETCH        Set to 0 to skip fetching the URL directly");
    println!("  RUST_LOG                    Log filter, logs go to stderr");
}

fn print_version() {
    println!("{APP_NAME} {VERSION}");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,seolens=info,seolens_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let raw_args = env::args().skip(1).collect::<Vec<_>>();
    let options = match parse_arguments(&raw_args)? {
        CliCommand::Help => {
            print_help();
            return Ok(());
        }
        CliCommand::Version => {
            print_version();
            return Ok(());
        }
        CliCommand::Run(options) => options,
    };

    // Validation happens before any network activity
    let target = AuditTarget::parse(&options.url)?;

    init_tracing();
    let config = AuditConfig::from_env();
    tracing::debug!(
        proxies = config.proxies.len(),
        direct_fetch = config.direct_fetch,
        timeout_secs = config.fetch_timeout.as_secs(),
        "configuration loaded"
    );
    let auditor = Auditor::from_config(&config).context("failed to set up HTTP clients")?;

    eprintln!("Auditing {target} ...");
    let mut settled = 0;
    let run = auditor
        .run(&target, |module, result| {
            settled += 1;
            eprintln!(
                "  [{settled}/{}] {} {}: {}",
                ModuleKind::ALL.len(),
                module.icon(),
                module.title(),
                progress_label(result)
            );
        })
        .await;

    let output = match options.mode {
        OutputMode::Json => render_json(&run, options.policy)?,
        OutputMode::Report => render_summary(&run, options.policy),
    };
    print!("{output}");

    if let Some(save_base) = options.save_target {
        let today = Utc::now().date_naive();
        let report = report::render_with(&run, options.policy, Utc::now());
        match export_report(&report, &save_base, today) {
            Ok(path) => eprintln!("\nWrote report to {}", path.display()),
            Err(err) => eprintln!("\nExport failed: {err:#}"),
        }
    }

    Ok(())
}

fn progress_label(result: &ModuleResult) -> String {
    if result.is_success() {
        format!("{}/100", result.score)
    } else {
        "failed".to_string()
    }
}

fn render_json(run: &AuditRun, policy: ScorePolicy) -> Result<String> {
    let value = serde_json::json!({
        "run": run,
        "overallScore": run.overall_score_with(policy),
        "excludeFailed": policy == ScorePolicy::ExcludeErrors,
    });
    let mut json = serde_json::to_string_pretty(&value)?;
    json.push('\n');
    Ok(json)
}

const DIVIDER: &str = "─────────────────────────────────────────────────────────────";
const LABEL_WIDTH: usize = 16;

fn push_section_header(buf: &mut String, icon: &str, title: &str) {
    let _ = writeln!(buf, "{DIVIDER}");
    let _ = writeln!(buf, "{icon} {title}");
    let _ = writeln!(buf, "{DIVIDER}");
}

fn push_key_value(buf: &mut String, label: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let _ = writeln!(buf, "• {:<width$} : {}", label, value, width = LABEL_WIDTH);
}

fn push_bullets(buf: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(buf, "{heading}");
    for item in items {
        let _ = writeln!(buf, "   - {item}");
    }
}

fn render_summary(run: &AuditRun, policy: ScorePolicy) -> String {
    let mut output = String::new();

    push_section_header(&mut output, "🔎", &format!("SEO Audit: {}", run.target));
    push_key_value(
        &mut output,
        "Overall Score",
        &format!("{}/100", run.overall_score_with(policy)),
    );
    let failed = run.completed().filter(|r| !r.is_success()).count();
    if failed > 0 {
        let note = match policy {
            ScorePolicy::IncludeErrors => "counted as 0",
            ScorePolicy::ExcludeErrors => "excluded from the overall score",
        };
        push_key_value(&mut output, "Failed Modules", &format!("{failed} ({note})"));
    }
    let _ = writeln!(&mut output);

    for result in run.completed() {
        let module = result.module;
        push_section_header(&mut output, module.icon(), module.title());
        push_key_value(&mut output, "Score", &format!("{}/100", result.score));
        if !result.is_success() {
            push_key_value(&mut output, "Status", "error");
        }
        if let Some(details) = result.details.as_ref() {
            push_details(&mut output, details);
        }
        push_bullets(&mut output, "Issues:", &result.issues);
        push_bullets(&mut output, "Suggestions:", &result.suggestions);
        let _ = writeln!(&mut output);
    }

    output
}

fn push_details(buf: &mut String, details: &ModuleDetails) {
    match details {
        ModuleDetails::PageSpeed(speed) => {
            push_key_value(buf, "Mobile", &device_summary(&speed.mobile));
            push_key_value(buf, "Desktop", &device_summary(&speed.desktop));
            push_key_value(buf, "Mobile LCP", &speed.mobile.metrics.lcp);
            push_key_value(buf, "Mobile CLS", &speed.mobile.metrics.cls);
        }
        ModuleDetails::MetaTags(meta) => {
            push_key_value(
                buf,
                "Title",
                &format!("{} ({} chars)", meta.title.content, meta.title.length),
            );
            if meta.description.length > 0 {
                push_key_value(
                    buf,
                    "Description",
                    &format!("{} chars", meta.description.length),
                );
            }
            push_key_value(buf, "Keywords", &meta.keywords);
            push_key_value(buf, "Viewport", &meta.viewport.content);
        }
        ModuleDetails::Headings(headings) => {
            let s = &headings.structure;
            push_key_value(
                buf,
                "Structure",
                &format!(
                    "H1 {} · H2 {} · H3 {} · H4 {} · H5 {} · H6 {}",
                    s.h1, s.h2, s.h3, s.h4, s.h5, s.h6
                ),
            );
            push_key_value(buf, "Total", &headings.total_headings.to_string());
        }
        ModuleDetails::Images(images) => {
            push_key_value(buf, "Images", &images.total_images.to_string());
            push_key_value(
                buf,
                "With Alt Text",
                &format!(
                    "{} ({}%)",
                    images.images_with_alt, images.alt_text_percentage
                ),
            );
            push_key_value(buf, "Missing Alt Text", &images.images_missing_alt.to_string());
        }
        ModuleDetails::MobileFriendly(mobile) => {
            push_key_value(
                buf,
                "Checks Passed",
                &format!("{}/{}", mobile.passed_checks, mobile.total_checks),
            );
            push_key_value(
                buf,
                "Media Queries",
                if mobile.has_media_queries { "yes" } else { "no" },
            );
        }
        ModuleDetails::KeywordDensity(keywords) => {
            push_key_value(buf, "Word Count", &keywords.word_count.to_string());
            let top: Vec<String> = keywords
                .top_keywords
                .iter()
                .take(5)
                .map(|k| format!("{} ({}%)", k.word, k.density))
                .collect();
            push_key_value(buf, "Top Keywords", &top.join(", "));
            for insight in &keywords.insights {
                push_key_value(buf, "Insight", insight);
            }
        }
    }
}

fn device_summary(report: &DeviceReport) -> String {
    let show = |score: Option<u8>| score.map_or_else(|| "N/A".to_string(), |s| s.to_string());
    format!(
        "performance {} · seo {} · accessibility {} · best practices {}",
        show(report.performance),
        show(report.seo),
        show(report.accessibility),
        show(report.best_practices)
    )
}

fn export_report(report: &Report, base: &Path, date: NaiveDate) -> Result<PathBuf> {
    let output_path = build_output_path(base, date);
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }

    let file = File::create(&output_path)
        .with_context(|| format!("failed to create {}", output_path.display()))?;
    report
        .write_to(BufWriter::new(file))
        .with_context(|| format!("failed to write report to {}", output_path.display()))?;

    Ok(output_path)
}

fn build_output_path(base: &Path, date: NaiveDate) -> PathBuf {
    let has_md_extension = base
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("md"))
        .unwrap_or(false);

    if has_md_extension {
        base.to_path_buf()
    } else {
        base.join(Report::file_name(date))
    }
}
