use ddgen_core::ir::{HttpMethod, SchemaKind};
use ddgen_core::parse::{self, DocumentFormat};
use ddgen_core::transform::{OperationFilter, SchemaParser};

const MONITORS_V1: &str = include_str!("fixtures/datadog-monitors-v1.yaml");
const INCIDENTS_V2: &str = include_str!("fixtures/datadog-incidents-v2.yaml");
const MALFORMED_V1: &str = include_str!("fixtures/datadog-monitors-malformed.yaml");

fn default_filter() -> OperationFilter {
    OperationFilter {
        resources: vec!["monitor".to_string(), "events".to_string()],
        ..Default::default()
    }
}

#[test]
fn parse_datadog_fixture() {
    let spec = parse::from_yaml(MONITORS_V1).unwrap();
    assert_eq!(spec.info.title, "Datadog API V1 Collection");
    assert_eq!(spec.paths.len(), 5);
    assert_eq!(spec.tags.len(), 3);
}

#[test]
fn parse_json_roundtrip_of_yaml_document() {
    let spec = parse::from_yaml(MONITORS_V1).unwrap();
    let json = serde_json::to_string(&spec).unwrap();
    let reparsed = parse::from_str(&json, DocumentFormat::Json).unwrap();
    assert_eq!(spec, reparsed);
}

#[test]
fn extract_in_path_then_method_order() {
    let spec = parse::from_yaml(MONITORS_V1).unwrap();
    let configs = SchemaParser::new(&spec).extract_operations(&default_filter());
    let summary: Vec<_> = configs
        .iter()
        .map(|c| (c.method, c.operation_id.as_deref().unwrap_or_default()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (HttpMethod::Get, "ListMonitors"),
            (HttpMethod::Post, "CreateMonitor"),
            (HttpMethod::Get, "GetMonitor"),
            (HttpMethod::Delete, "DeleteMonitor"),
            (HttpMethod::Post, "MuteMonitor"),
            (HttpMethod::Post, "CreateEvent"),
        ]
    );
}

#[test]
fn extract_resource_names() {
    let spec = parse::from_yaml(MONITORS_V1).unwrap();
    let configs = SchemaParser::new(&spec).extract_operations(&default_filter());
    let names: Vec<_> = configs.iter().map(|c| c.resource_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Monitors", "Monitor", "Monitor", "Monitor", "Monitor", "Event"]
    );
}

#[test]
fn extract_resolves_component_parameter_and_body() {
    let spec = parse::from_yaml(MONITORS_V1).unwrap();
    let configs = SchemaParser::new(&spec).extract_operations(&OperationFilter {
        operations: vec!["getmonitor".to_string(), "createmonitor".to_string()],
        ..Default::default()
    });
    assert_eq!(configs.len(), 2);

    let create = &configs[0];
    let body = create.request_body.as_ref().unwrap();
    let props = body.properties().unwrap();
    assert!(props.contains_key("options"));
    assert!(body.is_required("query"));

    let get = &configs[1];
    assert_eq!(get.path_params.len(), 1);
    assert_eq!(
        get.path_params[0].description.as_deref(),
        Some("The ID of the monitor.")
    );
    assert!(matches!(
        get.path_params[0].schema.kind,
        SchemaKind::Number { integer: true, .. }
    ));
    assert!(get.header_params.is_empty());
}

#[test]
fn extract_with_tag_filter_only() {
    let spec = parse::from_yaml(MONITORS_V1).unwrap();
    let configs = SchemaParser::new(&spec).extract_operations(&OperationFilter {
        tags: vec!["host".to_string()],
        ..Default::default()
    });
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].resource_name, "Hosts");
    assert!(configs[0].response.is_none());
}

#[test]
fn extract_follows_request_body_and_response_refs() {
    let spec = parse::from_yaml(INCIDENTS_V2).unwrap();
    let configs = SchemaParser::new(&spec).extract_operations(&OperationFilter::default());
    assert_eq!(configs.len(), 3);
    let create = &configs[0];
    assert!(create.request_body.is_some());
    assert!(create.response.is_some());
}

#[test]
fn filter_matching_nothing_reports_available_values() {
    let spec = parse::from_yaml(MONITORS_V1).unwrap();
    let parser = SchemaParser::new(&spec);
    let configs = parser.extract_operations(&OperationFilter {
        tags: vec!["nope".to_string()],
        ..Default::default()
    });
    assert!(configs.is_empty());
    assert_eq!(parser.available_tags(), vec!["Events", "Hosts", "Monitors"]);
    assert_eq!(parser.available_operation_ids().len(), 7);
}

#[test]
fn malformed_operations_are_dropped_individually() {
    let spec = parse::from_yaml(MALFORMED_V1).unwrap();
    let parser = SchemaParser::new(&spec);
    let configs = parser.extract_operations(&default_filter());
    let ids: Vec<_> = configs
        .iter()
        .map(|c| c.operation_id.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(ids, vec!["GetMonitor", "ListMonitors"]);
    assert_eq!(
        parser.available_operation_ids(),
        vec!["GetBrokenMonitor", "GetMonitor", "ListMonitors"]
    );
}

#[test]
fn malformed_response_properties_degrade_to_objects() {
    let spec = parse::from_yaml(MALFORMED_V1).unwrap();
    let configs = SchemaParser::new(&spec).extract_operations(&OperationFilter {
        operations: vec!["getmonitor".to_string()],
        ..Default::default()
    });
    let response = configs[0].response.as_ref().unwrap();
    let props = response.properties().unwrap();
    assert!(matches!(props["id"].kind, SchemaKind::Number { integer: true, .. }));
    assert!(props["attachment"].properties().is_some_and(|p| p.is_empty()));
    let options = props["options"].properties().unwrap();
    assert!(options["silenced"].properties().is_some_and(|p| p.is_empty()));
}
