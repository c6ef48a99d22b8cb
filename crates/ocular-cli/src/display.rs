//! Terminal rendering for diagnosis reports and disease reference cards.

use chrono::{DateTime, Utc};
use ocular_core::diagnosis::MEDICAL_DISCLAIMER;
use ocular_core::{DiagnosisResult, DiseaseInfo, Finding};

const BAR_WIDTH: usize = 30;

// ── Public API ──

/// Print a clinical report for one diagnosed image.
pub fn print_report(source: &str, result: &DiagnosisResult, at: DateTime<Utc>) {
    println!("=== {source} ===");
    println!("{}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!();

    println!("{}", banner(result.finding()));
    println!("  {:<26} {}", "Detected Condition", result.prediction);
    println!("  {:<26} {}", "Confidence", percent(result.confidence));
    println!("  {:<26} {}", "Message", result.message);
    println!();

    println!("Differential Diagnosis");
    for (label, score) in result.scores.iter() {
        println!("  {:<26} {} {}", label, bar(score), percent(score));
    }
    println!();

    if let Some(label) = result.prediction.label() {
        let info = ocular_core::disease_info(label);
        print_list("Recommended Actions", info.treatments);
    }

    println!("{MEDICAL_DISCLAIMER}");
    println!();
}

/// Print a single encyclopedia entry.
pub fn print_disease_card(info: &DiseaseInfo) {
    println!("=== {} ({}) ===", info.name, info.tag);
    println!("{}", info.description);
    println!();

    print_list("Symptoms", info.symptoms);
    print_list("Causes", info.causes);
    print_list("Treatments", info.treatments);
    print_list("Prevention", info.prevention);
}

// ── Formatting ──

fn banner(finding: Finding) -> &'static str {
    match finding {
        Finding::Healthy => "[HEALTHY] No disease detected",
        Finding::Abnormal => "[ABNORMAL] Condition detected, refer for review",
        Finding::Inconclusive => "[INCONCLUSIVE] Low confidence, check the image",
    }
}

fn print_list(header: &str, items: &[&str]) {
    if items.is_empty() {
        return;
    }
    println!("{header}");
    for item in items {
        println!("  - {item}");
    }
    println!();
}

fn percent(score: f32) -> String {
    format!("{:>5.1}%", score * 100.0)
}

/// Fixed-width bar for a score in [0, 1]; out-of-range values are clamped.
fn bar(score: f32) -> String {
    let filled = (score.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}
