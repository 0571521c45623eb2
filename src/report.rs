//! 解析結果の端末表示・保存

use crate::preview::Preview;
use rx_lens_common::render::{HEIC_REMEDIATION_STEPS, NO_MEDICATION_REASONS};
use rx_lens_common::upload::HEIC_TIP;
use rx_lens_common::{Banner, DisplayModel, FailureBlock, MedicationCard, SessionState};
use serde::Serialize;

/// 保存用レポート（1ファイル分）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedReport {
    pub file_name: String,
    pub analyzed_at: String,
    pub state: SessionState,
    pub result: DisplayModel,
}

impl SavedReport {
    pub fn new(file_name: &str, state: SessionState, result: DisplayModel) -> Self {
        Self {
            file_name: file_name.to_string(),
            analyzed_at: chrono::Local::now().to_rfc3339(),
            state,
            result,
        }
    }
}

pub fn print_banner(banner: &Banner) {
    match banner {
        Banner::Error(m) => println!("✖ {}", m),
        Banner::Warning(m) => println!("⚠ {}", m),
        Banner::Info(m) => println!("ℹ {}", m),
    }
}

pub fn print_preview(preview: &Preview, is_heic: bool) {
    print!("✔ プレビュー: {}x{}px", preview.width, preview.height);
    if let Some(date) = &preview.captured_at {
        print!(" (撮影日時: {})", date);
    }
    println!();
    if is_heic {
        println!("ℹ {}", HEIC_TIP);
    }
}

pub fn print_model(model: &DisplayModel) {
    match model {
        DisplayModel::NoMedications => {
            println!("⚠ No Medications Detected");
            println!("  We couldn't identify any medications in this image. This could be due to:");
            for reason in NO_MEDICATION_REASONS {
                println!("  - {}", reason);
            }
            println!("  Try uploading a clearer image or one with better lighting.");
        }
        DisplayModel::Medications { cards } => {
            for (i, card) in cards.iter().enumerate() {
                print_card(i + 1, card);
            }
        }
        DisplayModel::HeicRemediation { message } => {
            println!("⚠ iPhone Image Format Issue");
            println!("  {}", message);
            println!("  Please try one of these options:");
            for (i, step) in HEIC_REMEDIATION_STEPS.iter().enumerate() {
                println!("  {}. {}", i + 1, step);
            }
        }
        DisplayModel::Failure(block) => print_failure(block),
    }
}

fn print_card(index: usize, card: &MedicationCard) {
    println!("[{}] {}  (Match confidence: {})", index, card.name, card.confidence);
    println!("  Description:     {}", card.description);
    println!("  Drug Class:      {}", card.drug_class.join(", "));
    println!("  Strength:        {}", card.strength);
    println!("  Form:            {}", card.form);
    println!("  Detected From:   {}", card.matched_text);
    println!("  Detected Dosage: {}", card.detected_dosage);
    print_section("Indications", &card.indications);
    print_section("Side Effects", &card.side_effects);
    print_section("Interactions", &card.interactions);
    print_section("Warnings", &card.warnings);
    println!();
}

fn print_section(title: &str, items: &[String]) {
    println!("  {}:", title);
    for item in items {
        println!("    - {}", item);
    }
}

fn print_failure(block: &FailureBlock) {
    println!("✖ {}", block.title);
    println!("  {}", block.message);
    if let Some(hint) = &block.hint {
        println!("  {}", hint);
    }
    if let Some(technical) = &block.technical {
        println!("  Technical details: {}", technical);
    }
}
