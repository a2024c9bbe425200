//! Tests for datasheet text normalization and completion response parsing

use specguard::datasheets::normalize;
use specguard::datasheets::parser::{parse, parse_lines, parse_structured};
use specguard::ResponseShape;

const DATASHEET_PAGE: &str = "DFRobot Gravity: Analog Sound Sensor SKU:DFR0034\n\
\n\
Introduction\n\
• Analog sound sensor for Arduino\n\
\n\
Specification\n\
   o Operating Voltage: 3.3V/5V\n\
   o Interface: Analog\n\
  -  \n\
\u{f0b7} Size: 22x32mm\n\
Board Overview\n";

fn hostile_inputs() -> Vec<String> {
    let mut inputs: Vec<String> = [
        "",
        " ",
        "\n\n\n",
        "{",
        "}",
        "{}",
        "}{",
        "[]",
        "null",
        "{\"Specification\": null, \"notes\": null}",
        "{\"Specification\": {\"a\": {\"nested\": [1, 2]}}, \"notes\": [null, true]}",
        "```json\n{\"Specification\": {\"TX Current\": \"80 mA\"}\n```",
        "Specification:\n: \n::\n- \n•",
        "Plain prose without any structure at all.",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    inputs.push(DATASHEET_PAGE.to_string());
    inputs.push("x".repeat(10_000));
    inputs
}

#[test]
fn test_normalize_datasheet_page() {
    let cleaned = normalize(DATASHEET_PAGE);

    assert!(cleaned.contains("Specification\n- Operating Voltage: 3.3V/5V\n- Interface: Analog\n- Size: 22x32mm"));
    assert!(cleaned.contains("- Analog sound sensor for Arduino"));
    assert!(!cleaned.contains('•'));
    assert!(cleaned.lines().all(|l| l == l.trim() && l != "-"));
}

#[test]
fn test_normalize_is_idempotent() {
    for input in hostile_inputs() {
        let once = normalize(&input);
        assert_eq!(normalize(&once), once);
    }
}

#[test]
fn test_parsers_never_fail() {
    for input in hostile_inputs() {
        for shape in [ResponseShape::Json, ResponseShape::Lines] {
            let parsed = parse(&input, shape);
            for (key, value) in &parsed.spec.specification {
                assert!(!key.trim().is_empty(), "blank key from {:?}", input);
                assert_eq!(key, key.trim());
                assert_eq!(value, value.trim());
            }
        }
    }
}

#[test]
fn test_degraded_parse_preserves_raw_text() {
    for input in ["", "Plain prose.", "{\"Specification\": 5}"] {
        let parsed = parse_structured(input);
        assert!(parsed.is_degraded());
        assert_eq!(parsed.spec.notes, vec![input.to_string()]);
        assert!(parsed.spec.specification.is_empty());
    }
}

#[test]
fn test_nested_values_are_flattened_to_text() {
    let parsed = parse_structured(
        "{\"Specification\": {\"a\": {\"nested\": [1, 2]}}, \"notes\": [null, true]}",
    );
    assert!(!parsed.is_degraded());
    assert_eq!(parsed.spec.specification["a"], "{\"nested\":[1,2]}");
    assert_eq!(parsed.spec.notes, vec!["true"]);
}

#[test]
fn test_normalized_page_through_line_parser() {
    let spec = parse_lines(&normalize(DATASHEET_PAGE));

    assert_eq!(spec.specification["Operating Voltage"], "3.3V/5V");
    assert_eq!(spec.specification["Size"], "22x32mm");
    // First-colon split keeps the rest of the title line as the value
    assert_eq!(
        spec.specification["DFRobot Gravity"],
        "Analog Sound Sensor SKU:DFR0034"
    );
    assert_eq!(
        spec.notes,
        vec![
            "Introduction",
            "Analog sound sensor for Arduino",
            "Specification",
            "Board Overview"
        ]
    );
}
