//! Integration tests: the built-in catalogue, end to end through the
//! validator, the normalizer and the JSON Schema export.

use devstate_schema::shapes::{self, CONTAINER, DEVFILE_CONTENT, RESOURCE_POST_REQUEST, VOLUME_POST_REQUEST};
use devstate_schema::{
    export_json_schema, Normalizer, NormalizerConfig, ValidatedRecord, ValidationError, Validator,
    ValidatorConfig,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn container(name: &str) -> Value {
    json!({
        "name": name,
        "image": "registry.example.com/app:latest",
        "command": ["npm"],
        "args": ["start"],
        "memoryRequest": "256Mi",
        "memoryLimit": "512Mi",
        "cpuRequest": "250m",
        "cpuLimit": "1",
        "volumeMounts": [{"name": "cache", "path": "/cache"}],
        "annotation": {"deployment": {}, "service": {}},
        "endpoints": [{"name": "http", "targetPort": 3000}],
        "env": [{"name": "PORT", "value": "3000"}],
        "configureSources": true,
        "mountSources": true,
        "sourceMapping": "/projects"
    })
}

fn devfile() -> Value {
    json!({
        "content": "",
        "version": "2.2.0",
        "commands": [
            {"name": "run", "group": "run", "default": true,
             "exec": {"component": "app", "commandLine": "npm start"}}
        ],
        "containers": [container("app")],
        "images": [],
        "resources": [{"name": "svc", "uri": "https://example.com/svc.yaml"}],
        "volumes": [{"name": "cache", "size": "1Gi"}],
        "events": {"postStart": ["run"]},
        "metadata": {"name": "demo"}
    })
}

fn validator() -> Validator<'static> {
    Validator::new(shapes::shared(), ValidatorConfig::strict())
}

fn normalizer() -> Normalizer<'static> {
    Normalizer::new(shapes::shared(), NormalizerConfig::default())
}

#[test]
fn test_missing_required_field_is_named() {
    let mut raw = container("app");
    raw.as_object_mut().unwrap().remove("image");
    let errors = validator().validate(CONTAINER, &raw).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors.errors()[0],
        ValidationError::MissingField { field, shape, .. } if field == "image" && shape == "Container"
    ));
}

#[test]
fn test_resource_request_with_both_sources_conflicts() {
    let raw = json!({"inlined": "kind: Service", "uri": "https://example.com/svc.yaml"});
    let errors = validator().validate(RESOURCE_POST_REQUEST, &raw).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::ConflictingFields { .. })));
}

#[test]
fn test_resource_request_with_no_source_is_missing_field() {
    let errors = validator()
        .validate(RESOURCE_POST_REQUEST, &json!({"name": "svc"}))
        .unwrap_err();
    assert!(matches!(&errors.errors()[0], ValidationError::MissingField { .. }));
}

#[test]
fn test_resource_request_invalid_policy() {
    let raw = json!({"uri": "x", "deployByDefault": "sometimes"});
    let errors = validator().validate(RESOURCE_POST_REQUEST, &raw).unwrap_err();
    assert!(matches!(
        &errors.errors()[0],
        ValidationError::InvalidEnumValue { value, .. } if value == "sometimes"
    ));
}

#[test]
fn test_volume_request_without_name() {
    let raw = json!({"size": "1Gi", "ephemeral": true});
    let record = validator().validate(VOLUME_POST_REQUEST, &raw).unwrap();
    let normalized = normalizer().normalize(&record);
    let value = normalized.as_value();
    assert_eq!(value["size"], "1Gi");
    assert_eq!(value["ephemeral"], true);
    let name = value["name"].as_str().unwrap();
    assert!(name.starts_with("volume-"));

    let request: devstate_core::VolumePostRequest = normalized.decode().unwrap();
    let volume = request.into_volume().unwrap();
    assert_eq!(volume.name, name);
}

#[test]
fn test_devfile_content_normalizes_and_decodes() {
    let record = validator().validate(DEVFILE_CONTENT, &devfile()).unwrap();
    let normalized = normalizer().normalize(&record);
    let value = normalized.as_value();
    assert_eq!(value["resources"][0]["deployByDefault"], "undefined");
    assert_eq!(value["containers"][0]["endpoints"][0]["protocol"], "http");
    assert_eq!(value["events"]["preStop"], json!([]));
    assert_eq!(value["metadata"]["globalMemoryLimit"], "");

    let parts: devstate_core::DevfileParts = normalized.decode().unwrap();
    assert_eq!(parts.containers[0].name, "app");
    assert_eq!(parts.events.post_start, vec!["run".to_string()]);
}

#[test]
fn test_nested_errors_collected_with_paths() {
    let mut raw = devfile();
    raw["containers"][0]["endpoints"][0]["targetPort"] = json!(0);
    raw["commands"][0]["apply"] = json!({"component": "svc"});
    raw["volumes"][0]["size"] = json!("lots");
    let errors = validator().validate(DEVFILE_CONTENT, &raw).unwrap_err();
    let paths: Vec<&str> = errors.iter().map(|e| e.path()).collect();
    assert_eq!(
        paths,
        vec!["/commands/0", "/containers/0/endpoints/0/targetPort", "/volumes/0/size"]
    );
}

#[test]
fn test_lenient_mode_drops_unknown_fields() {
    let mut raw = container("app");
    raw["colour"] = json!("blue");
    assert!(validator().validate(CONTAINER, &raw).is_err());
    let record = Validator::new(shapes::shared(), ValidatorConfig::lenient())
        .validate(CONTAINER, &raw)
        .unwrap();
    assert!(record.get("colour").is_none());
}

#[test]
fn test_exported_schema_agrees_with_validator() {
    let schema = export_json_schema(shapes::shared(), DEVFILE_CONTENT, true).unwrap();
    let compiled = jsonschema::options()
        .with_draft(jsonschema::Draft::Draft202012)
        .build(&schema)
        .unwrap();

    let good = devfile();
    assert!(compiled.is_valid(&good));

    let mut bad = devfile();
    bad["resources"][0]["inlined"] = json!("kind: Service");
    assert!(!compiled.is_valid(&bad));
    assert!(validator().validate(DEVFILE_CONTENT, &bad).is_err());

    let mut unknown = devfile();
    unknown["metadata"]["colour"] = json!("blue");
    assert!(!compiled.is_valid(&unknown));
}

fn volume_request() -> impl Strategy<Value = Value> {
    (
        proptest::option::of("[a-z][a-z0-9-]{0,12}"),
        proptest::option::of(prop_oneof![
            (1u32..4096).prop_map(|n| format!("{n}Mi")),
            (1u32..64).prop_map(|n| format!("{n}Gi")),
            (1u32..1000).prop_map(|n| n.to_string()),
        ]),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(name, size, ephemeral)| {
            let mut object = serde_json::Map::new();
            if let Some(name) = name {
                object.insert("name".into(), json!(name));
            }
            if let Some(size) = size {
                object.insert("size".into(), json!(size));
            }
            if let Some(ephemeral) = ephemeral {
                object.insert("ephemeral".into(), json!(ephemeral));
            }
            Value::Object(object)
        })
}

fn resource_request() -> impl Strategy<Value = Value> {
    let source = prop_oneof![
        "[a-z: ]{1,24}".prop_map(|text| ("inlined", text)),
        "[a-z]{1,12}".prop_map(|host| ("uri", format!("https://{host}.example.com/svc.yaml"))),
    ];
    (
        proptest::option::of("[a-z][a-z0-9-]{0,11}"),
        source,
        proptest::option::of(prop_oneof![
            Just("never"),
            Just("undefined"),
            Just("always"),
        ]),
    )
        .prop_map(|(name, (source_field, source), policy)| {
            let mut object = serde_json::Map::new();
            if let Some(name) = name {
                object.insert("name".into(), json!(name));
            }
            object.insert(source_field.into(), json!(source));
            if let Some(policy) = policy {
                object.insert("deployByDefault".into(), json!(policy));
            }
            Value::Object(object)
        })
}

fn small_devfile() -> impl Strategy<Value = Value> {
    (
        1usize..4,
        proptest::collection::vec(proptest::option::of(prop_oneof![Just("1Gi"), Just("512Mi")]), 0..4),
        any::<bool>(),
        proptest::option::of("[a-z ]{0,16}"),
    )
        .prop_map(|(containers, volumes, with_events, description)| {
            let mut raw = devfile();
            raw["containers"] = Value::Array(
                (0..containers).map(|i| container(&format!("app{i}"))).collect(),
            );
            raw["volumes"] = Value::Array(
                volumes
                    .iter()
                    .enumerate()
                    .map(|(i, size)| match size {
                        Some(size) => json!({"name": format!("vol{i}"), "size": size}),
                        None => json!({"name": format!("vol{i}")}),
                    })
                    .collect(),
            );
            raw["commands"][0]["exec"]["component"] = json!("app0");
            if !with_events {
                raw["events"] = json!({});
            }
            if let Some(description) = description {
                raw["metadata"]["description"] = json!(description);
            }
            raw
        })
}

proptest! {
    #[test]
    fn normalize_is_total_and_idempotent(raw in volume_request()) {
        let record = validator().validate(VOLUME_POST_REQUEST, &raw).unwrap();
        let once = normalizer().normalize(&record);
        let twice = normalizer().normalize(&ValidatedRecord::from(once.clone()));
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.get("name").is_some());
        prop_assert!(once.get("size").is_some());
    }

    #[test]
    fn normalized_record_revalidates(raw in volume_request()) {
        let record = validator().validate(VOLUME_POST_REQUEST, &raw).unwrap();
        let normalized = normalizer().normalize(&record);
        prop_assert!(validator().validate(VOLUME_POST_REQUEST, normalized.as_value()).is_ok());
    }

    #[test]
    fn resource_request_normalizes_idempotently(raw in resource_request()) {
        let record = validator().validate(RESOURCE_POST_REQUEST, &raw).unwrap();
        let once = normalizer().normalize(&record);
        let twice = normalizer().normalize(&ValidatedRecord::from(once.clone()));
        prop_assert_eq!(&once, &twice);

        let name = once.get("name").and_then(Value::as_str).unwrap();
        match raw.get("name").and_then(Value::as_str) {
            Some(given) => prop_assert_eq!(name, given),
            None => prop_assert!(name.starts_with("resource-")),
        }
        let expected_policy = raw.get("deployByDefault").cloned().unwrap_or(json!("undefined"));
        prop_assert_eq!(once.get("deployByDefault"), Some(&expected_policy));
        prop_assert!(validator().validate(RESOURCE_POST_REQUEST, once.as_value()).is_ok());
    }

    #[test]
    fn devfile_content_normalizes_idempotently(raw in small_devfile()) {
        let record = validator().validate(DEVFILE_CONTENT, &raw).unwrap();
        let once = normalizer().normalize(&record);
        let twice = normalizer().normalize(&ValidatedRecord::from(once.clone()));
        prop_assert_eq!(&once, &twice);

        for volume in once.get("volumes").and_then(Value::as_array).unwrap() {
            prop_assert!(volume.get("size").and_then(Value::as_str).is_some());
        }
        for phase in ["preStart", "postStart", "preStop", "postStop"] {
            prop_assert!(once.get("events").and_then(|e| e.get(phase)).is_some_and(Value::is_array));
        }
        prop_assert!(validator().validate(DEVFILE_CONTENT, once.as_value()).is_ok());
    }
}
