//! Prompt builders for every completion round trip in the pipeline.

/// Extraction prompt asking for `{"Specification": {...}, "notes": [...]}`.
pub fn build_json_extraction_prompt(cleaned_text: &str) -> String {
    format!(
        r#"You are an AI agent specialized in extracting IoT device specifications from datasheets.

INSTRUCTIONS:
1. Focus ONLY on the section titled "Specification", "Specifications", or "Technical Specifications".
2. Extract every key-value pair exactly as written.
   - Treat any line with a colon ":" as key-value.
   - If a line does not have a colon, put it in a "notes" list.
3. Output ONLY valid JSON with two keys:
   - "Specification": a dictionary of all key-value pairs.
   - "notes": a list of any additional lines.
4. DO NOT add explanations, extra text, greetings, or markdown code blocks.
5. If you are unsure about a field, include it in "notes" instead of omitting it.
6. Make sure to capture all information in the "Specification" section, do not skip anything.
7. Ignore all other sections like "Features", "Applications", or "Electrical Characteristics".

Document text:
{}
"#,
        cleaned_text
    )
}

/// Extraction prompt asking for the specification block as plain lines.
pub fn build_lines_extraction_prompt(cleaned_text: &str) -> String {
    format!(
        r#"You are a STRICT IoT specification extractor.

TASK:
1. Locate the section that starts with the line "Specification" or "Specifications".
2. Copy every line of that section, one per line, exactly as written.
3. Keep "key: value" lines intact. Lines without a colon are copied as they are.
4. Stop when you reach another section (like Applications, Board Overview, etc.).
5. Output ONLY the copied lines. No JSON, no markdown, no commentary.

Document text:
{}
"#,
        cleaned_text
    )
}

/// Prompt turning a free-form plan description into device/module entries.
pub fn build_plan_parsing_prompt(plan_text: &str) -> String {
    format!(
        r#"You are an AI assistant.
Given the following execution plan, extract all device IDs and the modules being requested.
Output ONLY a JSON array like:
[
  {{"device_id": "esp32-003", "modules": ["Camera"]}}
]
Do NOT include any extra text, explanation, or markdown formatting.

Execution Plan:
{}
"#,
        plan_text
    )
}

/// Context block shared by the priming and judgment prompts.
pub fn build_context_block(plan_json: &str, specs_json: &str) -> String {
    format!(
        r#"Execution plan devices:
{}

Device datasheets (JSON):
{}"#,
        plan_json, specs_json
    )
}

/// Priming prompt for stateful sessions: loads context, expects no output.
pub fn build_priming_prompt(context_block: &str) -> String {
    format!(
        r#"You are an IoT Device Analysis Agent.

{}

Acknowledge internally.
Do not output any data.
"#,
        context_block
    )
}

/// Judgment prompt fixing the verdict shape.
///
/// `context_block` is `None` when a priming call already delivered it.
pub fn build_feasibility_prompt(context_block: Option<&str>) -> String {
    let context = match context_block {
        Some(block) => format!("You are given:\n\n{}\n", block),
        None => "You have already been provided with:\n- The execution plan devices\n- The detailed datasheets of the involved devices\n".to_string(),
    };

    format!(
        r#"You are an Energy and Transmission Modeling Agent for an IoT deployment.

{}
Task:
Evaluate whether the execution plan is VALID with respect to:
1. Energy consumption
2. Network transmission constraints

Consider:
- Number of active devices
- High-power sensors (e.g., cameras)
- Sampling frequency
- Data transmission volume

Output ONLY JSON in the following format:
{{
  "energy_feasible": true | false,
  "transmission_feasible": true | false,
  "reasons": ["..."],
  "recommendations": ["..."]
}}
"#,
        context
    )
}
