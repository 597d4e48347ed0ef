use ddgen_blocks::{BlockGenerator, GeneratedBlock, NameRegistry, OutputOptions};
use ddgen_core::parse;
use ddgen_core::{OperationFilter, SchemaParser, build_block};

const MONITOR_V1: &str = include_str!("fixtures/monitor-v1.yaml");
const EVENTS_V2: &str = include_str!("fixtures/events-v2.yaml");

fn generate(
    generator: &BlockGenerator,
    doc: &str,
    version: &str,
    filter: &OperationFilter,
    registry: NameRegistry,
) -> (Vec<GeneratedBlock>, NameRegistry) {
    let spec = parse::from_yaml(doc).unwrap();
    let definitions = SchemaParser::new(&spec)
        .extract_operations(filter)
        .iter()
        .map(build_block)
        .collect();
    generator.generate_source(definitions, version, registry)
}

fn find<'a>(blocks: &'a [GeneratedBlock], name: &str) -> &'a GeneratedBlock {
    blocks
        .iter()
        .find(|b| b.name == name)
        .unwrap_or_else(|| panic!("no block named {name}"))
}

#[test]
fn get_monitor_block_has_single_path_input() {
    let generator = BlockGenerator::new().unwrap();
    let (blocks, _) = generate(
        &generator,
        MONITOR_V1,
        "V1",
        &OperationFilter::default(),
        NameRegistry::new(),
    );

    let block = find(&blocks, "GetMonitorV1");
    assert_eq!(block.file_name, "GetMonitorV1.ts");
    assert_eq!(block.definition.inputs.len(), 1);
    let input = &block.definition.inputs[0];
    assert_eq!(input.key, "monitorId");
    assert!(input.required);
    assert!(block.content.contains("export const GetMonitorV1: AppBlock = {"));
    assert!(block.content.contains("const url = `${baseUrl}/api/v1/monitor/${monitorId}`;"));
    assert!(block.content.contains("as { monitorId: number };"));
    assert!(!block.content.contains("queryParams"));
    assert!(!block.content.contains("requestPayload"));
}

#[test]
fn list_block_joins_array_query_values() {
    let generator = BlockGenerator::new().unwrap();
    let (blocks, _) = generate(
        &generator,
        MONITOR_V1,
        "V1",
        &OperationFilter::default(),
        NameRegistry::new(),
    );
    let block = find(&blocks, "ListMonitorsV1");
    assert!(block.content.contains(
        r#"queryParams.append("monitor_tags", Array.isArray(monitorTags) ? monitorTags.join(",") : String(monitorTags));"#
    ));
    assert!(block.content.contains(r#"queryParams.append("page_size", String(pageSize));"#));

    let delete = find(&blocks, "DeleteMonitorV1");
    assert!(delete.content.contains("response.status === 204 ? { deleted: true }"));
}

#[test]
fn create_event_assigns_required_fields_unconditionally() {
    let generator = BlockGenerator::new().unwrap();
    let (blocks, _) = generate(
        &generator,
        EVENTS_V2,
        "V2",
        &OperationFilter::default(),
        NameRegistry::new(),
    );
    let block = find(&blocks, "CreateEventV2");
    let required: Vec<(&str, bool)> = block
        .definition
        .inputs
        .iter()
        .map(|f| (f.key.as_str(), f.required))
        .collect();
    assert_eq!(
        required,
        vec![
            ("title", true),
            ("text", true),
            ("alertType", false),
            ("tags", false)
        ]
    );
    assert!(block.content.contains("        requestPayload[\"title\"] = title;\n"));
    assert!(block.content.contains("        requestPayload[\"text\"] = text;\n"));
    assert!(block.content.contains(
        "if (alertType !== undefined) requestPayload[\"alert_type\"] = alertType;"
    ));
    assert!(block.content.contains("if (tags !== undefined) requestPayload[\"tags\"] = tags;"));
}

#[test]
fn resource_filter_excludes_other_paths() {
    let generator = BlockGenerator::new().unwrap();
    let filter = OperationFilter {
        resources: vec!["monitor".to_string()],
        ..Default::default()
    };
    let (blocks, _) = generate(&generator, EVENTS_V2, "V2", &filter, NameRegistry::new());
    assert!(!blocks.is_empty());
    assert!(blocks.iter().all(|b| !b.path.contains("/events")));
}

#[test]
fn colliding_names_get_counter_suffix() {
    let generator = BlockGenerator::new().unwrap();
    let (v1, registry) = generate(
        &generator,
        MONITOR_V1,
        "V1",
        &OperationFilter::default(),
        NameRegistry::new(),
    );
    let (v2, registry) = generate(
        &generator,
        EVENTS_V2,
        "V2",
        &OperationFilter::default(),
        registry,
    );

    let names: Vec<&str> = v1.iter().chain(&v2).map(|b| b.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "ListMonitorsV1",
            "GetMonitorV1",
            "DeleteMonitorV1",
            "CreateEventV2",
            "GetMonitorV2",
            "GetMonitorV21",
        ]
    );
    assert_eq!(registry.len(), 6);

    let renamed = find(&v2, "GetMonitorV21");
    assert_eq!(renamed.file_name, "GetMonitorV21.ts");
    assert!(renamed.content.contains("export const GetMonitorV21: AppBlock"));
    assert_eq!(renamed.path, "/api/v2/monitor/{monitor_id}/policy");
}

#[test]
fn output_files_and_index() {
    let generator = BlockGenerator::new().unwrap();
    let (blocks, _) = generate(
        &generator,
        MONITOR_V1,
        "V1",
        &OperationFilter::default(),
        NameRegistry::new(),
    );
    let files = generator
        .emit_output(
            &blocks,
            OutputOptions {
                report: true,
                manifest: true,
            },
        )
        .unwrap();
    let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "ListMonitorsV1.ts",
            "GetMonitorV1.ts",
            "DeleteMonitorV1.ts",
            "index.ts",
            "generation-report.md",
            "blocks.manifest.json",
        ]
    );

    let index = &files[3].content;
    assert!(index.contains("import { GetMonitorV1 } from \"./GetMonitorV1.js\";"));
    assert!(index.contains("export { ListMonitorsV1, GetMonitorV1, DeleteMonitorV1 };"));

    let report = &files[4].content;
    assert!(report.contains("Total blocks: 3"));
    assert!(report.contains("### Monitor (3 blocks)"));
    assert!(report.contains("### GET (2 blocks)"));
    assert!(report.contains("### DELETE (1 blocks)"));
    assert!(report.contains("- **GetMonitorV1** (`GET /api/v1/monitor/{monitor_id}`) - Monitor"));

    let manifest: serde_json::Value = serde_json::from_str(&files[5].content).unwrap();
    assert_eq!(manifest["blocks"][1]["name"], "GetMonitorV1");
    assert_eq!(manifest["blocks"][1]["request"]["method"], "GET");
}

#[test]
fn optional_outputs_can_be_disabled() {
    let generator = BlockGenerator::new().unwrap();
    let (blocks, _) = generate(
        &generator,
        MONITOR_V1,
        "V1",
        &OperationFilter::default(),
        NameRegistry::new(),
    );
    let files = generator
        .emit_output(
            &blocks,
            OutputOptions {
                report: false,
                manifest: false,
            },
        )
        .unwrap();
    assert_eq!(files.len(), 4);
    assert_eq!(files.last().unwrap().path, "index.ts");
}

#[test]
fn regeneration_is_byte_identical() {
    let run = || {
        let generator = BlockGenerator::new().unwrap();
        let (blocks, _) = generate(
            &generator,
            MONITOR_V1,
            "V1",
            &OperationFilter::default(),
            NameRegistry::new(),
        );
        generator
            .emit_output(&blocks, OutputOptions::default())
            .unwrap()
    };
    assert_eq!(run(), run());
}
