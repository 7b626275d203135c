use super::*;
use crate::services::diagnosis::Urgency;

fn rust_leaf() -> AnalysisResult {
    AnalysisResult {
        problem_name: "পাতা মরিচা রোগ".into(),
        description: "পাতায় বাদামী দাগ দেখা যাচ্ছে।".into(),
        solution: "1. ছত্রাকনাশক প্রয়োগ করুন\n2. আক্রান্ত পাতা অপসারণ করুন".into(),
        urgency: Urgency::High,
    }
}

// =============================================================================
// split_steps
// =============================================================================

#[test]
fn numbered_lines_become_steps() {
    assert_eq!(split_steps("1. Do X\n2. Do Y"), vec!["Do X", "Do Y"]);
}

#[test]
fn splitting_is_idempotent() {
    for input in ["1. Do X\n2. Do Y", "1. 2. nested\n  3.apply  ", "plain\n\n10. last"] {
        let once = split_steps(input);
        assert_eq!(split_steps(&once.join("\n")), once, "input {input:?}");
    }
}

#[test]
fn blank_lines_dropped() {
    assert_eq!(split_steps("1. A\n\n   \n2. B\n"), vec!["A", "B"]);
}

#[test]
fn crlf_lines_split() {
    assert_eq!(split_steps("1. A\r\n2. B\r\n"), vec!["A", "B"]);
}

#[test]
fn unnumbered_lines_kept_verbatim() {
    assert_eq!(split_steps("water daily\nremove weeds"), vec!["water daily", "remove weeds"]);
}

#[test]
fn marker_without_space_stripped() {
    assert_eq!(split_steps("1.spray\n12.   rest"), vec!["spray", "rest"]);
}

#[test]
fn bengali_ordinals_stripped() {
    assert_eq!(split_steps("১. সেচ দিন\n২. সার দিন"), vec!["সেচ দিন", "সার দিন"]);
}

#[test]
fn decimal_quantity_not_mistaken_for_ordinal() {
    assert_eq!(split_steps("3.5 kg urea per bigha"), vec!["3.5 kg urea per bigha"]);
}

#[test]
fn bare_marker_line_dropped() {
    assert_eq!(split_steps("1.\n2. keep"), vec!["keep"]);
}

#[test]
fn empty_solution_has_no_steps() {
    assert!(split_steps("").is_empty());
    assert!(split_steps("\n \n").is_empty());
}

#[test]
fn special_characters_preserved() {
    let steps = split_steps("1. <b>not bold</b> & \"quoted\"");
    assert_eq!(steps, vec!["<b>not bold</b> & \"quoted\""]);
}

// =============================================================================
// Severity
// =============================================================================

#[test]
fn known_labels_map_to_severity() {
    assert_eq!(Severity::from_label("High"), Severity::High);
    assert_eq!(Severity::from_label("Medium"), Severity::Medium);
    assert_eq!(Severity::from_label("Low"), Severity::Low);
}

#[test]
fn unknown_label_is_neutral() {
    assert_eq!(Severity::from_label("Critical"), Severity::Unknown);
    assert_eq!(Severity::from_label("high"), Severity::Unknown);
    assert_eq!(Severity::Unknown.badge_class(), "text-gray-600 bg-gray-100");
}

#[test]
fn severity_serializes_lowercase() {
    assert_eq!(serde_json::to_value(Severity::Medium).unwrap(), "medium");
}

// =============================================================================
// render
// =============================================================================

#[test]
fn rust_leaf_renders_high_with_two_steps() {
    let view = render(&rust_leaf());
    assert_eq!(view.severity, Severity::High);
    assert_eq!(view.badge_class, "text-red-600 bg-red-100");
    assert_eq!(view.urgency_label, "High");
    assert_eq!(view.problem_name, "পাতা মরিচা রোগ");
    assert_eq!(
        view.steps,
        vec![
            RemedyStep { number: 1, text: "ছত্রাকনাশক প্রয়োগ করুন".into() },
            RemedyStep { number: 2, text: "আক্রান্ত পাতা অপসারণ করুন".into() },
        ]
    );
}

#[test]
fn render_parts_accepts_unknown_urgency() {
    let view = render_parts("Critical", "x", "y", "do it");
    assert_eq!(view.severity, Severity::Unknown);
    assert_eq!(view.urgency_label, "Critical");
    assert_eq!(view.steps.len(), 1);
}

#[test]
fn view_serializes_camel_case() {
    let json = serde_json::to_value(render(&rust_leaf())).unwrap();
    assert_eq!(json["severity"], "high");
    assert_eq!(json["problemName"], "পাতা মরিচা রোগ");
    assert_eq!(json["badgeClass"], "text-red-600 bg-red-100");
    assert_eq!(json["steps"][1]["number"], 2);
}
