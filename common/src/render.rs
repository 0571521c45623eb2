//! 解析結果の表示モデル生成
//!
//! レスポンスの揺れ（欠損・型違い）はすべてここで吸収し、
//! 表示側には常に埋まった `DisplayModel` を渡す。エラーにはしない。

use crate::error::SubmissionError;
use crate::types::{AnalysisResponse, MedicationRecord};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

/// 情報なし
pub const NOT_AVAILABLE: &str = "Information not available";
/// 強度・剤形なし
pub const NOT_SPECIFIED: &str = "Not specified";
/// 信頼度なし
pub const NO_CONFIDENCE: &str = "N/A";
/// 用量なし
pub const NOT_DETECTED: &str = "Not detected";
/// 検出元テキストなし
pub const TEXT_NOT_EXTRACTED: &str = "Text not extracted";
/// 薬剤名なし
pub const UNKNOWN_MEDICATION: &str = "Unknown Medication";

/// 薬剤が検出されなかった場合に挙げる原因
pub const NO_MEDICATION_REASONS: &[&str] = &[
    "The image quality is too low for text recognition",
    "The handwriting is difficult to interpret",
    "The prescription format is not standard",
];

/// iPhone画像の対処手順
pub const HEIC_REMEDIATION_STEPS: &[&str] = &[
    "On your iPhone, go to Settings > Camera > Formats and select \"Most Compatible\"",
    "Email the image to yourself and download it on this device",
    "Use a different image in JPG or PNG format",
];

/// 表示モデル
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayModel {
    /// 薬剤0件（エラーではない）
    NoMedications,
    Medications { cards: Vec<MedicationCard> },
    /// iPhone画像形式の問題
    HeicRemediation { message: String },
    Failure(FailureBlock),
}

impl DisplayModel {
    pub fn is_failure(&self) -> bool {
        matches!(self, DisplayModel::HeicRemediation { .. } | DisplayModel::Failure(_))
    }
}

/// 薬剤カード1枚分
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicationCard {
    pub name: String,
    pub confidence: String,
    pub description: String,
    pub drug_class: Vec<String>,
    pub strength: String,
    pub form: String,
    pub matched_text: String,
    pub detected_dosage: String,
    pub indications: Vec<String>,
    pub side_effects: Vec<String>,
    pub interactions: Vec<String>,
    pub warnings: Vec<String>,
}

impl MedicationCard {
    pub fn from_record(record: &MedicationRecord) -> Self {
        Self {
            name: text(&record.name).unwrap_or_else(|| UNKNOWN_MEDICATION.to_string()),
            confidence: format_confidence(&record.confidence),
            description: text(&record.description).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            drug_class: entries(&record.drug_class)
                .or_else(|| entries(&record.category))
                .unwrap_or_else(fallback_entries),
            strength: text(&record.strength).unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            form: text(&record.form).unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            matched_text: text(&record.matched_text)
                .or_else(|| text(&record.extracted_text))
                .unwrap_or_else(|| TEXT_NOT_EXTRACTED.to_string()),
            detected_dosage: dosage(&record.detected_dosage)
                .or_else(|| dosage(&record.dosage_info))
                .unwrap_or_else(|| NOT_DETECTED.to_string()),
            indications: entries_or_fallback(&record.indications),
            side_effects: entries_or_fallback(&record.side_effects),
            interactions: entries_or_fallback(&record.interactions),
            warnings: entries_or_fallback(&record.warnings),
        }
    }
}

/// エラー表示ブロック
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureBlock {
    pub title: String,
    pub message: String,
    pub hint: Option<String>,
    pub technical: Option<String>,
}

/// 送信結果から表示モデルを生成
///
/// # Arguments
/// * `outcome` - 送信結果（薬剤リストまたはエラー）
/// * `source_is_heic` - 送信したファイルがHEIC/HEIFか
pub fn render(
    outcome: &Result<Vec<MedicationRecord>, SubmissionError>,
    source_is_heic: bool,
) -> DisplayModel {
    match outcome {
        Ok(records) if records.is_empty() => DisplayModel::NoMedications,
        Ok(records) => DisplayModel::Medications {
            cards: records.iter().map(MedicationCard::from_record).collect(),
        },
        Err(err) => render_error(err, source_is_heic),
    }
}

/// パース済みレスポンスから表示モデルを生成
pub fn render_response(response: AnalysisResponse, source_is_heic: bool) -> DisplayModel {
    render(&response.into_outcome(), source_is_heic)
}

fn render_error(err: &SubmissionError, source_is_heic: bool) -> DisplayModel {
    let block = match err {
        SubmissionError::ApplicationError { message } => {
            if source_is_heic && needs_heic_remediation(message) {
                return DisplayModel::HeicRemediation {
                    message: message.clone(),
                };
            }
            FailureBlock {
                title: "Analysis Failed".into(),
                message: message.clone(),
                hint: Some("Please try uploading a clearer image or check your connection.".into()),
                technical: None,
            }
        }
        SubmissionError::Timeout { seconds } => FailureBlock {
            title: "Request Timed Out".into(),
            message: format!(
                "The analysis service did not respond within {} seconds. Please try again.",
                seconds
            ),
            hint: None,
            technical: None,
        },
        SubmissionError::NetworkError { message } => FailureBlock {
            title: "Connection Error".into(),
            message: "Failed to connect to the analysis service. Please check your internet connection and try again.".into(),
            hint: None,
            technical: Some(message.clone()),
        },
        SubmissionError::ServerError { status, detail } => FailureBlock {
            title: "Analysis Failed".into(),
            message: detail
                .clone()
                .unwrap_or_else(|| format!("The analysis service returned status {}.", status)),
            hint: Some("Please try again in a moment.".into()),
            technical: Some(format!("HTTP {}", status)),
        },
        SubmissionError::MalformedResponse { message } => FailureBlock {
            title: "Analysis Failed".into(),
            message: "The analysis service returned an unreadable response.".into(),
            hint: Some("Please try again in a moment.".into()),
            technical: Some(message.clone()),
        },
    };
    DisplayModel::Failure(block)
}

/// エラーメッセージがiPhone画像形式の問題を示すか
pub fn needs_heic_remediation(message: &str) -> bool {
    lazy_static::lazy_static! {
        static ref HEIC_HINT_RE: Regex = Regex::new(r"(?i)heic|iphone|format|decode").unwrap();
    }

    HEIC_HINT_RE.is_match(message)
}

/// 信頼度を `87.0%` 形式に整形
///
/// - 数値で1以下: 割合とみなし100倍
/// - 1より大きい数値・数値文字列: パーセントとみなす
/// - それ以外: `N/A`
pub fn format_confidence(value: &Value) -> String {
    let percent = match value {
        Value::Number(n) => n.as_f64().map(|f| if f <= 1.0 { f * 100.0 } else { f }),
        Value::String(s) => parse_leading_number(s),
        _ => None,
    };

    match percent {
        Some(p) if p.is_finite() => format!("{:.1}%", p),
        _ => NO_CONFIDENCE.to_string(),
    }
}

/// 先頭の数値部分を読む（"87%" → 87.0）
fn parse_leading_number(s: &str) -> Option<f64> {
    lazy_static::lazy_static! {
        static ref NUMBER_RE: Regex =
            Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").unwrap();
    }

    NUMBER_RE
        .captures(s)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// 文字列・配列フィールドを項目リストに正規化
///
/// 空配列・空文字列・その他の型は `None`
pub fn entries(value: &Value) -> Option<Vec<String>> {
    let items: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        Value::String(_) => scalar_text(value).into_iter().collect(),
        _ => Vec::new(),
    };

    (!items.is_empty()).then_some(items)
}

fn entries_or_fallback(value: &Value) -> Vec<String> {
    entries(value).unwrap_or_else(fallback_entries)
}

fn fallback_entries() -> Vec<String> {
    vec![NOT_AVAILABLE.to_string()]
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(_) | Value::Number(_) => scalar_text(value),
        _ => None,
    }
}

/// 用量（文字列、または `{"dose": "500mg"}` のようなオブジェクト）
fn dosage(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .filter_map(|(key, v)| scalar_text(v).map(|t| format!("{}: {}", key, t)))
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => text(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> MedicationRecord {
        serde_json::from_value(value).expect("デシリアライズ失敗")
    }

    fn single_card(model: DisplayModel) -> MedicationCard {
        match model {
            DisplayModel::Medications { mut cards } => {
                assert_eq!(cards.len(), 1);
                cards.remove(0)
            }
            other => panic!("薬剤カードではない: {:?}", other),
        }
    }

    #[test]
    fn test_empty_medications_is_not_error() {
        let response = AnalysisResponse::from_json(r#"{"medications": []}"#).unwrap();
        let model = render_response(response, false);
        assert_eq!(model, DisplayModel::NoMedications);
        assert!(!model.is_failure());

        assert_eq!(render(&Ok(vec![]), true), DisplayModel::NoMedications);
    }

    #[test]
    fn test_confidence_fraction_and_percentage() {
        assert_eq!(format_confidence(&json!(0.87)), "87.0%");
        assert_eq!(format_confidence(&json!(87)), "87.0%");
        assert_eq!(format_confidence(&json!(1)), "100.0%");
        assert_eq!(format_confidence(&json!(0.5)), "50.0%");
        assert_eq!(format_confidence(&json!(92.46)), "92.5%");
    }

    #[test]
    fn test_confidence_strings_are_percentages() {
        assert_eq!(format_confidence(&json!("87")), "87.0%");
        assert_eq!(format_confidence(&json!("87%")), "87.0%");
        assert_eq!(format_confidence(&json!(" 64.3 ")), "64.3%");
    }

    #[test]
    fn test_confidence_not_available() {
        assert_eq!(format_confidence(&Value::Null), "N/A");
        assert_eq!(format_confidence(&json!("high")), "N/A");
        assert_eq!(format_confidence(&json!("")), "N/A");
        assert_eq!(format_confidence(&json!([0.8])), "N/A");
        assert_eq!(format_confidence(&json!({"value": 0.8})), "N/A");
    }

    #[test]
    fn test_render_ibuprofen() {
        let response = AnalysisResponse::from_json(
            r#"{"medications":[{"name":"Ibuprofen","confidence":0.87}]}"#,
        )
        .unwrap();
        let card = single_card(render_response(response, false));
        assert_eq!(card.name, "Ibuprofen");
        assert_eq!(card.confidence, "87.0%");
    }

    #[test]
    fn test_missing_fields_use_fallbacks() {
        let card = MedicationCard::from_record(&MedicationRecord::default());
        assert_eq!(card.name, UNKNOWN_MEDICATION);
        assert_eq!(card.confidence, NO_CONFIDENCE);
        assert_eq!(card.description, NOT_AVAILABLE);
        assert_eq!(card.drug_class, vec![NOT_AVAILABLE]);
        assert_eq!(card.strength, NOT_SPECIFIED);
        assert_eq!(card.form, NOT_SPECIFIED);
        assert_eq!(card.matched_text, TEXT_NOT_EXTRACTED);
        assert_eq!(card.detected_dosage, NOT_DETECTED);
        assert_eq!(card.indications, vec![NOT_AVAILABLE]);
        assert_eq!(card.side_effects, vec![NOT_AVAILABLE]);
        assert_eq!(card.interactions, vec![NOT_AVAILABLE]);
        assert_eq!(card.warnings, vec![NOT_AVAILABLE]);
    }

    #[test]
    fn test_list_or_string_normalization() {
        assert_eq!(
            entries(&json!(["Nausea", "Dizziness"])),
            Some(vec!["Nausea".to_string(), "Dizziness".to_string()])
        );
        assert_eq!(entries(&json!("Nausea")), Some(vec!["Nausea".to_string()]));
        assert_eq!(entries(&json!([])), None);
        assert_eq!(entries(&json!("   ")), None);
        assert_eq!(entries(&json!(42)), None);
        assert_eq!(entries(&json!({"a": 1})), None);
        // 空白・nullの要素は除外
        assert_eq!(entries(&json!(["", null, "Rash"])), Some(vec!["Rash".to_string()]));
        assert_eq!(entries(&json!(["", null])), None);
    }

    #[test]
    fn test_drug_class_falls_back_to_category() {
        let card = MedicationCard::from_record(&record(json!({
            "drug_class": [],
            "category": ["NSAID", "Analgesic"]
        })));
        assert_eq!(card.drug_class, vec!["NSAID", "Analgesic"]);

        let card = MedicationCard::from_record(&record(json!({
            "drug_class": "Antibiotic",
            "category": "ignored"
        })));
        assert_eq!(card.drug_class, vec!["Antibiotic"]);
    }

    #[test]
    fn test_matched_text_and_dosage_fallback_chain() {
        let card = MedicationCard::from_record(&record(json!({
            "extracted_text": "Tab Amoxil 500",
            "dosage_info": {"dose": "500mg", "frequency": "TID", "note": null}
        })));
        assert_eq!(card.matched_text, "Tab Amoxil 500");
        assert_eq!(card.detected_dosage, "dose: 500mg, frequency: TID");

        let card = MedicationCard::from_record(&record(json!({
            "matched_text": "Ibuprofen",
            "extracted_text": "ignored",
            "detected_dosage": "400mg",
            "dosage_info": "ignored"
        })));
        assert_eq!(card.matched_text, "Ibuprofen");
        assert_eq!(card.detected_dosage, "400mg");

        let card = MedicationCard::from_record(&record(json!({"dosage_info": {}})));
        assert_eq!(card.detected_dosage, NOT_DETECTED);
    }

    #[test]
    fn test_heic_error_selects_remediation_only_for_heic_source() {
        let response =
            AnalysisResponse::from_json(r#"{"error":"Could not decode HEIC image"}"#).unwrap();

        let heic = render_response(response.clone(), true);
        assert!(matches!(heic, DisplayModel::HeicRemediation { .. }));

        let plain = render_response(response, false);
        match plain {
            DisplayModel::Failure(block) => {
                assert_eq!(block.title, "Analysis Failed");
                assert_eq!(block.message, "Could not decode HEIC image");
            }
            other => panic!("汎用エラーではない: {:?}", other),
        }
    }

    #[test]
    fn test_heic_keyword_matching() {
        assert!(needs_heic_remediation("Unsupported image FORMAT"));
        assert!(needs_heic_remediation("iPhone photo could not be read"));
        assert!(needs_heic_remediation("decode failed"));
        assert!(!needs_heic_remediation("No text found in image"));
    }

    #[test]
    fn test_transport_errors_render_generic_failure() {
        let model = render(&Err(SubmissionError::Timeout { seconds: 30 }), true);
        match model {
            DisplayModel::Failure(block) => {
                assert_eq!(block.title, "Request Timed Out");
                assert!(block.message.contains("30 seconds"));
            }
            other => panic!("タイムアウト表示ではない: {:?}", other),
        }

        let model = render(
            &Err(SubmissionError::NetworkError {
                message: "connection refused".into(),
            }),
            false,
        );
        match model {
            DisplayModel::Failure(block) => {
                assert_eq!(block.title, "Connection Error");
                assert_eq!(block.technical.as_deref(), Some("connection refused"));
            }
            other => panic!("接続エラー表示ではない: {:?}", other),
        }

        let model = render(
            &Err(SubmissionError::ServerError {
                status: 500,
                detail: Some("Analysis failed: OCR timeout".into()),
            }),
            false,
        );
        match model {
            DisplayModel::Failure(block) => {
                assert_eq!(block.message, "Analysis failed: OCR timeout");
                assert_eq!(block.technical.as_deref(), Some("HTTP 500"));
            }
            other => panic!("サーバーエラー表示ではない: {:?}", other),
        }
    }

    #[test]
    fn test_display_model_serialize_kind() {
        let json = serde_json::to_string(&DisplayModel::NoMedications).unwrap();
        assert_eq!(json, r#"{"kind":"no_medications"}"#);
    }
}
