use pretty_assertions::assert_eq;
use sceneref_engine::{commands, DiagnosticKind, EngineConfig, RefEngine};
use sceneref_model::AttachmentRef;
use sceneref_model::{FieldValue, Reference};
use sceneref_scene::{Manifest, MemoryScene};
use sceneref_test_utils::init_test_logging;
use std::sync::Arc;

const VEHICLE: &str = r#"
types:
  - name: Rigidbody
  - name: Wheel
  - name: IDriveable
    kind: interface
  - name: Engine
    implements: [IDriveable]
  - name: Suspension
    fields:
      - { name: body, type: Rigidbody, strategy: parent, flags: [exclude_self] }
  - name: Chassis
    fields:
      - { name: wheels, type: Wheel, shape: array, strategy: child, flags: [exclude_self] }
      - { name: drive, type: IDriveable, interface: true, strategy: self }
scene:
  - name: Car
    attachments:
      - type: Chassis
      - type: Rigidbody
      - type: Engine
    children:
      - name: FrontAxle
        attachments:
          - type: Rigidbody
          - type: Suspension
          - type: Wheel
      - name: RearAxle
        attachments:
          - type: Suspension
          - type: Wheel
"#;

fn load() -> (RefEngine, MemoryScene) {
    init_test_logging();
    let (registry, scene) = Manifest::from_yaml_str(VEHICLE).unwrap().build().unwrap();
    let engine = RefEngine::new(Arc::new(registry), EngineConfig::new().with_log_diagnostics(false));
    (engine, scene)
}

fn on(scene: &MemoryScene, path: &str, ty: &str) -> AttachmentRef {
    scene.attachment_of(scene.node_by_path(path).unwrap(), ty).unwrap()
}

#[test]
fn test_parent_exclude_self_binds_ancestor() {
    let (engine, mut scene) = load();

    let outcome = engine.validate_all(&mut scene).unwrap();

    assert!(outcome.is_success(), "{:?}", outcome.diagnostics());
    let car_body = Reference::from(on(&scene, "Car", "Rigidbody"));
    let front = on(&scene, "Car/FrontAxle", "Suspension");
    let rear = on(&scene, "Car/RearAxle", "Suspension");
    assert_eq!(scene.field(&front, "body"), FieldValue::Ref(car_body.clone()));
    assert_eq!(scene.field(&rear, "body"), FieldValue::Ref(car_body));
}

#[test]
fn test_child_exclude_self_collects_every_wheel() {
    let (engine, mut scene) = load();
    let chassis = on(&scene, "Car", "Chassis");

    engine.validate(&mut scene, &chassis, false).unwrap();

    let wheels = scene.field(&chassis, "wheels");
    assert_eq!(
        wheels.references(),
        vec![
            Some(&Reference::from(on(&scene, "Car/FrontAxle", "Wheel"))),
            Some(&Reference::from(on(&scene, "Car/RearAxle", "Wheel"))),
        ]
    );
    let FieldValue::Interface(drive) = scene.field(&chassis, "drive") else {
        panic!("expected interface reference");
    };
    assert_eq!(drive.backing(), Some(&Reference::from(on(&scene, "Car", "Engine"))));
}

#[test]
fn test_second_run_is_silent() {
    let (engine, mut scene) = load();

    assert!(commands::validate_all(&engine, &mut scene));
    let writes = scene.writes();
    assert!(commands::validate_all(&engine, &mut scene));

    assert_eq!(scene.writes(), writes);
}

#[test]
fn test_lookup_miss_keeps_stale_reference() {
    let (engine, mut scene) = load();
    engine.validate_all(&mut scene).unwrap();

    let car_body = on(&scene, "Car", "Rigidbody");
    scene.detach(&car_body).unwrap();
    let outcome = engine.validate_all(&mut scene).unwrap();

    let rear = on(&scene, "Car/RearAxle", "Suspension");
    assert_eq!(scene.field(&rear, "body"), FieldValue::Ref(car_body.into()));
    assert_eq!(outcome.count(DiagnosticKind::WrongLocation), 0);
    assert!(outcome.is_success());
}
