//! Integration tests for the extraction pipeline and feasibility requests

mod common;

use common::{write_file, ScriptedService};
use specguard::datasheets::DatasheetDirectory;
use specguard::feasibility::FeasibilityEvaluator;
use specguard::prelude::*;
use specguard::StoreDiagnostic;

const SEN0203_RESPONSE: &str = r#"{"Specification": {"Operating Voltage": "5 V", "Current Consumption": "100 mA"}, "notes": ["Gravity interface"]}"#;
const ESP32_RESPONSE: &str = r#"Here you go:
{"Specification": {"Operating Voltage": "3.3 V", "TX Current": "240 mA", "RX Current": "100 mA"}, "notes": []}"#;

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn plan(list: &[&str]) -> Vec<ExecutionPlanEntry> {
    list.iter()
        .map(|id| ExecutionPlanEntry {
            device_id: id.to_string(),
            modules: Default::default(),
        })
        .collect()
}

#[tokio::test]
async fn test_partial_plan_builds_resolvable_devices() {
    let sheets = tempfile::tempdir().unwrap();
    write_file(sheets.path(), "SEN0203.txt", "Specification\nOperating Voltage: 5V");
    write_file(sheets.path(), "esp32.txt", "Specification\nTX Current: 240mA");
    let store_path = sheets.path().join("out").join("device_specs.json");

    let gateway = ScriptedService::new([SEN0203_RESPONSE, ESP32_RESPONSE]);
    let extractor = Extractor::new(&gateway, ResponseShape::Json);
    let store = DeviceSpecStore::build_or_load(
        &store_path,
        &ids(&["SEN0203", "DFR0034", "esp32"]),
        &DatasheetDirectory::new(sheets.path()),
        &extractor,
    )
    .await
    .expect("partial plan should build");

    assert_eq!(store.len(), 2);
    assert_eq!(store.device_ids().collect::<Vec<_>>(), vec!["SEN0203", "esp32"]);
    assert_eq!(store.get("esp32").unwrap().get("TX Current"), Some("240 mA"));
    assert_eq!(
        store.diagnostics(),
        [StoreDiagnostic::MissingSource {
            device_id: "DFR0034".to_string()
        }]
    );
    assert_eq!(gateway.calls(), 2);
    assert!(store_path.exists());
}

#[tokio::test]
async fn test_existing_store_is_never_re_extracted() {
    let sheets = tempfile::tempdir().unwrap();
    write_file(sheets.path(), "SEN0203.txt", "Operating Voltage: 5V");
    let store_path = sheets.path().join("device_specs.json");
    let sources = DatasheetDirectory::new(sheets.path());

    let first = ScriptedService::new([SEN0203_RESPONSE]);
    DeviceSpecStore::build_or_load(
        &store_path,
        &ids(&["SEN0203"]),
        &sources,
        &Extractor::new(&first, ResponseShape::Json),
    )
    .await
    .unwrap();
    let saved = std::fs::read_to_string(&store_path).unwrap();

    // Source changes after the first build are not picked up
    write_file(sheets.path(), "SEN0203.txt", "Operating Voltage: 12V");
    write_file(sheets.path(), "esp32.txt", "TX Current: 240mA");

    let second = ScriptedService::new(Vec::<String>::new());
    let store = DeviceSpecStore::build_or_load(
        &store_path,
        &ids(&["SEN0203", "esp32"]),
        &sources,
        &Extractor::new(&second, ResponseShape::Json),
    )
    .await
    .unwrap();

    assert_eq!(second.calls(), 0);
    assert_eq!(std::fs::read_to_string(&store_path).unwrap(), saved);
    assert_eq!(store.get("SEN0203").unwrap().get("Operating Voltage"), Some("5 V"));
    assert_eq!(
        store.diagnostics(),
        [StoreDiagnostic::NotInStore {
            device_id: "esp32".to_string()
        }]
    );
}

#[tokio::test]
async fn test_malformed_output_becomes_notes_only_record() {
    let sheets = tempfile::tempdir().unwrap();
    write_file(sheets.path(), "DFR0034.txt", "Sound sensor");
    let raw = "I'm sorry, the document does not contain a specification section.";

    let gateway = ScriptedService::new([raw]);
    let store = DeviceSpecStore::build(
        &ids(&["DFR0034"]),
        &DatasheetDirectory::new(sheets.path()),
        &Extractor::new(&gateway, ResponseShape::Json),
    )
    .await
    .unwrap();

    let record = store.get("DFR0034").unwrap();
    assert!(record.specification().is_empty());
    assert_eq!(record.notes(), [raw.to_string()]);
    assert!(matches!(
        store.diagnostics(),
        [StoreDiagnostic::DegradedParse { device_id, .. }] if device_id == "DFR0034"
    ));
}

#[tokio::test]
async fn test_gateway_failure_is_fatal_and_nothing_is_saved() {
    let sheets = tempfile::tempdir().unwrap();
    write_file(sheets.path(), "SEN0203.txt", "Operating Voltage: 5V");
    let store_path = sheets.path().join("device_specs.json");

    let gateway = ScriptedService::new(Vec::<String>::new());
    let result = DeviceSpecStore::build_or_load(
        &store_path,
        &ids(&["SEN0203"]),
        &DatasheetDirectory::new(sheets.path()),
        &Extractor::new(&gateway, ResponseShape::Json),
    )
    .await;

    assert!(matches!(result, Err(SpecGuardError::AI(_))));
    assert!(!store_path.exists());
}

#[tokio::test]
async fn test_prompt_carries_normalized_text() {
    let sheets = tempfile::tempdir().unwrap();
    write_file(
        sheets.path(),
        "SEN0203.txt",
        "Specification\n  • Operating Voltage: 5 V  \n   o TX Current: 80 mA\n-\n",
    );

    let gateway = ScriptedService::new([SEN0203_RESPONSE]);
    DeviceSpecStore::build(
        &ids(&["SEN0203"]),
        &DatasheetDirectory::new(sheets.path()),
        &Extractor::new(&gateway, ResponseShape::Json),
    )
    .await
    .unwrap();

    let prompt = &gateway.prompts()[0];
    assert!(prompt.contains("Specification\n- Operating Voltage: 5 V\n- TX Current: 80 mA"));
    assert!(prompt.contains("\"notes\""));
}

#[tokio::test]
async fn test_convert_skips_existing_outputs() {
    let sheets = tempfile::tempdir().unwrap();
    let specs = tempfile::tempdir().unwrap();
    write_file(sheets.path(), "A.txt", "Operating Voltage: 5V");
    write_file(sheets.path(), "B.txt", "Operating Voltage: 3.3V");
    write_file(sheets.path(), "ignored.md", "not a datasheet");
    let existing = write_file(specs.path(), "A.json", "{\"Specification\": {}, \"notes\": [\"kept\"]}");

    let gateway = ScriptedService::new([SEN0203_RESPONSE]);
    let report = SpecGuardCore::convert_datasheets(
        sheets.path(),
        specs.path(),
        &Extractor::new(&gateway, ResponseShape::Json),
    )
    .await
    .unwrap();

    assert_eq!(gateway.calls(), 1);
    assert_eq!(report.skipped, vec![existing.clone()]);
    assert_eq!(report.converted, vec![specs.path().join("B.json")]);
    assert!(report.degraded.is_empty());
    assert_eq!(
        std::fs::read_to_string(&existing).unwrap(),
        "{\"Specification\": {}, \"notes\": [\"kept\"]}"
    );

    let written: specguard::ExtractedSpec =
        serde_json::from_str(&std::fs::read_to_string(specs.path().join("B.json")).unwrap()).unwrap();
    assert_eq!(written.specification["Operating Voltage"], "5 V");

    // A second run touches nothing
    let idle = ScriptedService::new(Vec::<String>::new());
    let rerun = SpecGuardCore::convert_datasheets(
        sheets.path(),
        specs.path(),
        &Extractor::new(&idle, ResponseShape::Json),
    )
    .await
    .unwrap();
    assert_eq!(idle.calls(), 0);
    assert!(rerun.converted.is_empty());
    assert_eq!(rerun.skipped.len(), 2);
}

#[tokio::test]
async fn test_convert_replaces_partial_leftovers() {
    let sheets = tempfile::tempdir().unwrap();
    let specs = tempfile::tempdir().unwrap();
    write_file(sheets.path(), "B.txt", "Operating Voltage: 3.3V");
    // Truncated write from an interrupted run
    write_file(specs.path(), "B.json.tmp", "{\"Specification\": {\"Oper");

    let gateway = ScriptedService::new([SEN0203_RESPONSE]);
    let report = SpecGuardCore::convert_datasheets(
        sheets.path(),
        specs.path(),
        &Extractor::new(&gateway, ResponseShape::Json),
    )
    .await
    .unwrap();

    assert_eq!(gateway.calls(), 1);
    assert_eq!(report.converted, vec![specs.path().join("B.json")]);
    assert!(!specs.path().join("B.json.tmp").exists());
    let written: specguard::ExtractedSpec =
        serde_json::from_str(&std::fs::read_to_string(specs.path().join("B.json")).unwrap()).unwrap();
    assert_eq!(written.specification["Operating Voltage"], "5 V");
}

#[tokio::test]
async fn test_lines_shape_extraction() {
    let sheets = tempfile::tempdir().unwrap();
    write_file(sheets.path(), "esp32.txt", "raw text");

    let gateway = ScriptedService::new([
        "- Operating Voltage: 3.3 V\n- TX Current: 120 mA\n- TX Current: 240 mA\nWi-Fi 802.11 b/g/n",
    ]);
    let extractor = Extractor::new(&gateway, ResponseShape::Lines);
    let store = DeviceSpecStore::build(&ids(&["esp32"]), &DatasheetDirectory::new(sheets.path()), &extractor)
        .await
        .unwrap();

    let record = store.get("esp32").unwrap();
    assert_eq!(record.get("TX Current"), Some("240 mA"));
    assert_eq!(record.notes(), ["Wi-Fi 802.11 b/g/n".to_string()]);
    assert!(store.diagnostics().is_empty());
    assert!(gateway.prompts()[0].contains("STRICT"));
}

fn sample_store() -> DeviceSpecStore {
    let parsed = specguard::datasheets::parser::parse_structured(SEN0203_RESPONSE);
    DeviceSpecStore::from_records(vec![SpecificationRecord::new("SEN0203", parsed.spec)])
}

const VERDICT: &str = r#"{"energy_feasible": true, "transmission_feasible": false, "reasons": ["Too many cameras on ZigBee"], "recommendations": ["Use Wi-Fi for the camera node"]}"#;

#[tokio::test]
async fn test_stateless_gateway_gets_context_in_one_prompt() {
    let gateway = ScriptedService::new([VERDICT]);
    let outcome = FeasibilityEvaluator::new(&gateway)
        .evaluate(&plan(&["SEN0203", "DFR0034"]), &sample_store())
        .await
        .unwrap();

    let prompts = gateway.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Execution plan devices:"));
    assert!(prompts[0].contains("DFR0034"));
    assert!(prompts[0].contains("\"Operating Voltage\": \"5 V\""));
    assert!(prompts[0].contains("\"energy_feasible\""));

    let verdict = outcome.verdict().expect("structured verdict");
    assert!(verdict.energy_feasible);
    assert!(!verdict.transmission_feasible);
    assert_eq!(verdict.recommendations, vec!["Use Wi-Fi for the camera node"]);
}

#[tokio::test]
async fn test_stateful_gateway_is_primed_first() {
    let gateway = ScriptedService::new(["Acknowledged.", VERDICT]).stateful();
    let outcome = SpecGuardCore::evaluate_plan(&plan(&["SEN0203"]), &sample_store(), &gateway)
        .await
        .unwrap();

    let prompts = gateway.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("Do not output any data."));
    assert!(prompts[0].contains("SEN0203"));
    assert!(prompts[1].contains("already been provided"));
    assert!(!prompts[1].contains("Execution plan devices:"));
    assert!(outcome.verdict().is_some());
}

#[tokio::test]
async fn test_unstructured_verdict_is_surfaced_raw() {
    let gateway = ScriptedService::new(["The plan is probably fine."]);
    let outcome = SpecGuardCore::evaluate_plan(&plan(&["SEN0203"]), &sample_store(), &gateway)
        .await
        .unwrap();

    match outcome {
        FeasibilityOutcome::Raw { text, .. } => assert_eq!(text, "The plan is probably fine."),
        FeasibilityOutcome::Verdict(v) => panic!("unexpected verdict {:?}", v),
    }
}
