//! 表示モデルのHTML断片出力
//!
//! 解析サービス由来の文字列はすべてエスケープする

use std::fmt::Write;

use crate::render::{
    DisplayModel, FailureBlock, MedicationCard, HEIC_REMEDIATION_STEPS, NO_MEDICATION_REASONS,
};

/// HTML特殊文字をエスケープ
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// 表示モデルをHTML断片に変換
pub fn to_html(model: &DisplayModel) -> String {
    match model {
        DisplayModel::NoMedications => no_medications_html(),
        DisplayModel::Medications { cards } => cards.iter().map(card_html).collect(),
        DisplayModel::HeicRemediation { message } => heic_remediation_html(message),
        DisplayModel::Failure(block) => failure_html(block),
    }
}

fn list_items(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("<li>{}</li>", escape_html(item)))
        .collect()
}

fn no_medications_html() -> String {
    let reasons: Vec<String> = NO_MEDICATION_REASONS.iter().map(|r| r.to_string()).collect();
    format!(
        r#"<div class="no-medications">
    <div class="warning-icon">⚠️</div>
    <h3>No Medications Detected</h3>
    <p>We couldn't identify any medications in this image. This could be due to:</p>
    <ul>{}</ul>
    <p>Try uploading a clearer image or one with better lighting.</p>
</div>"#,
        list_items(&reasons)
    )
}

fn card_html(card: &MedicationCard) -> String {
    format!(
        r#"<div class="medication-card">
    <div class="medication-header">
        <h3>{name}</h3>
        <span class="confidence">Match confidence: {confidence}</span>
    </div>
    <div class="medication-body">
        <div class="medication-section">
            <h4>Medication Details</h4>
            <p><strong>Description:</strong> {description}</p>
            <p><strong>Drug Class:</strong> {drug_class}</p>
            <p><strong>Strength:</strong> {strength}</p>
            <p><strong>Form:</strong> {form}</p>
            <p><strong>Detected From:</strong> {matched_text}</p>
            <p><strong>Detected Dosage:</strong> {dosage}</p>
        </div>
        <div class="medication-section">
            <h4>Indications</h4>
            <ul>{indications}</ul>
        </div>
        <div class="medication-section">
            <h4>Side Effects</h4>
            <ul>{side_effects}</ul>
        </div>
        <div class="medication-section">
            <h4>Interactions</h4>
            <ul>{interactions}</ul>
        </div>
        <div class="medication-section warnings">
            <h4>Warnings</h4>
            <ul>{warnings}</ul>
        </div>
    </div>
</div>
"#,
        name = escape_html(&card.name),
        confidence = escape_html(&card.confidence),
        description = escape_html(&card.description),
        drug_class = escape_html(&card.drug_class.join(", ")),
        strength = escape_html(&card.strength),
        form = escape_html(&card.form),
        matched_text = escape_html(&card.matched_text),
        dosage = escape_html(&card.detected_dosage),
        indications = list_items(&card.indications),
        side_effects = list_items(&card.side_effects),
        interactions = list_items(&card.interactions),
        warnings = list_items(&card.warnings),
    )
}

fn heic_remediation_html(message: &str) -> String {
    let steps: String = HEIC_REMEDIATION_STEPS
        .iter()
        .map(|step| format!("<li>{}</li>", escape_html(step)))
        .collect();
    format!(
        r#"<div class="error-container">
    <div class="alert alert-warning">
        <h4>iPhone Image Format Issue</h4>
        <p>{}</p>
        <hr>
        <p class="mb-0">Please try one of these options:</p>
        <ol>{}</ol>
    </div>
</div>"#,
        escape_html(message),
        steps
    )
}

fn failure_html(block: &FailureBlock) -> String {
    let mut html = format!(
        "<div class=\"error-container\">\n    <div class=\"alert alert-danger\">\n        <h4>{}</h4>\n        <p>{}</p>\n",
        escape_html(&block.title),
        escape_html(&block.message)
    );
    if let Some(hint) = &block.hint {
        let _ = writeln!(html, "        <p>{}</p>", escape_html(hint));
    }
    if let Some(technical) = &block.technical {
        let _ = writeln!(
            html,
            "        <p class=\"text-muted small\">Technical details: {}</p>",
            escape_html(technical)
        );
    }
    html.push_str("    </div>\n</div>");
    html
}
