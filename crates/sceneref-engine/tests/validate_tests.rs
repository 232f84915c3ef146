use pretty_assertions::assert_eq;
use sceneref_engine::{DiagnosticKind, FieldDecl, RefAttr, Severity, TypeDecl};
use sceneref_model::{AssetRef, Element, FieldValue, RefFlags, Reference};
use sceneref_test_utils::{quiet_engine, registry_with, Rig};

fn owner(field: FieldDecl) -> TypeDecl {
    TypeDecl::behavior("Owner").field(field)
}

#[test]
fn test_optional_empty_passes() {
    let engine = quiet_engine(registry_with([owner(FieldDecl::scalar(
        "body",
        "Rigidbody",
        RefAttr::on_self().with_flags(RefFlags::OPTIONAL),
    ))]));
    let mut rig = Rig::new();
    let instance = rig.attach(rig.player, "Owner");

    let outcome = engine.validate(&mut rig.scene, &instance, false).unwrap();

    assert!(outcome.is_success());
    assert!(outcome.diagnostics().is_empty());
}

#[test]
fn test_required_empty_reports_once() {
    let engine = quiet_engine(registry_with([owner(FieldDecl::scalar("body", "Rigidbody", RefAttr::on_self()))]));
    let mut rig = Rig::new();
    let instance = rig.attach(rig.player, "Owner");

    let outcome = engine.validate(&mut rig.scene, &instance, false).unwrap();

    assert!(!outcome.is_success());
    assert_eq!(outcome.diagnostics().len(), 1);
    let diagnostic = &outcome.diagnostics()[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::MissingRequired);
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(diagnostic.instance.as_ref(), Some(&instance));
    assert_eq!(diagnostic.message, "Owner missing required Rigidbody ref 'body'");
}

#[test]
fn test_required_empty_collection_names_array_type() {
    let engine = quiet_engine(registry_with([owner(FieldDecl::array("bodies", "Rigidbody", RefAttr::child()))]));
    let mut rig = Rig::new();
    let instance = rig.attach(rig.player, "Owner");

    let outcome = engine.validate(&mut rig.scene, &instance, false).unwrap();

    assert_eq!(outcome.diagnostics().len(), 1);
    assert_eq!(
        outcome.diagnostics()[0].message,
        "Owner missing required Rigidbody[] ref 'bodies'"
    );
}

#[test]
fn test_missing_elements_each_reported() {
    let engine = quiet_engine(registry_with([owner(FieldDecl::array("bodies", "Rigidbody", RefAttr::anywhere()))]));
    let mut rig = Rig::new();
    let instance = rig.attach(rig.player, "Owner");
    let body = rig.attach(rig.weapon, "Rigidbody");
    rig.scene
        .assign(
            &instance,
            "bodies",
            FieldValue::array([Element::Direct(None), Element::from(Reference::from(body)), Element::Direct(None)]),
        )
        .unwrap();

    let outcome = engine.validate(&mut rig.scene, &instance, false).unwrap();

    assert_eq!(outcome.count(DiagnosticKind::MissingElement), 2);
    assert_eq!(
        outcome.diagnostics()[0].message,
        "Owner missing required element ref in array 'bodies'"
    );
}

#[test]
fn test_exclude_self_fails_under_any_strategy() {
    let engine = quiet_engine(registry_with([owner(FieldDecl::scalar(
        "body",
        "Rigidbody",
        RefAttr::anywhere().with_flags(RefFlags::EXCLUDE_SELF),
    ))]));
    let mut rig = Rig::new();
    let instance = rig.attach(rig.player, "Owner");
    let own = rig.attach(rig.player, "Rigidbody");
    rig.scene.assign(&instance, "body", FieldValue::Ref(own.into())).unwrap();

    let outcome = engine.validate(&mut rig.scene, &instance, false).unwrap();

    assert!(!outcome.is_success());
    assert_eq!(outcome.count(DiagnosticKind::ExcludedSelf), 1);
    assert_eq!(
        outcome.diagnostics()[0].message,
        "Owner Rigidbody ref 'body' cannot be on the same node"
    );
}

#[test]
fn test_parent_location_is_checked() {
    let engine = quiet_engine(registry_with([owner(FieldDecl::scalar(
        "health",
        "Health",
        RefAttr::parent().with_flags(RefFlags::EDITABLE),
    ))]));
    let mut rig = Rig::new();
    let instance = rig.attach(rig.player, "Owner");
    let below = rig.attach(rig.weapon, "Health");
    rig.scene.assign(&instance, "health", FieldValue::Ref(below.into())).unwrap();

    let outcome = engine.validate(&mut rig.scene, &instance, false).unwrap();

    assert_eq!(outcome.count(DiagnosticKind::WrongLocation), 1);
    assert_eq!(
        outcome.diagnostics()[0].message,
        "Owner requires Health ref 'health' to be on a Parent"
    );
}

#[test]
fn test_child_location_is_checked() {
    let engine = quiet_engine(registry_with([owner(FieldDecl::scalar(
        "health",
        "Health",
        RefAttr::child().with_flags(RefFlags::EDITABLE),
    ))]));
    let mut rig = Rig::new();
    let instance = rig.attach(rig.player, "Owner");
    let above = rig.attach(rig.world, "Health");
    rig.scene.assign(&instance, "health", FieldValue::Ref(above.into())).unwrap();

    let outcome = engine.validate(&mut rig.scene, &instance, false).unwrap();

    assert_eq!(
        outcome.diagnostics()[0].message,
        "Owner requires Health ref 'health' to be on a Child"
    );
}

#[test]
fn test_every_element_is_checked() {
    let engine = quiet_engine(registry_with([owner(FieldDecl::list(
        "healths",
        "Health",
        RefAttr::child().with_flags(RefFlags::EDITABLE),
    ))]));
    let mut rig = Rig::new();
    let instance = rig.attach(rig.player, "Owner");
    let above = rig.attach(rig.world, "Health");
    let below = rig.attach(rig.weapon, "Health");
    rig.scene
        .assign(
            &instance,
            "healths",
            FieldValue::list([
                Element::from(Reference::from(above.clone())),
                Element::from(Reference::from(below)),
                Element::from(Reference::from(above)),
            ]),
        )
        .unwrap();

    let outcome = engine.validate(&mut rig.scene, &instance, false).unwrap();

    assert_eq!(outcome.count(DiagnosticKind::WrongLocation), 2);
}

#[test]
fn test_standalone_needs_scene_or_anywhere() {
    let engine = quiet_engine(registry_with([
        owner(FieldDecl::scalar(
            "palette",
            "Palette",
            RefAttr::on_self().with_flags(RefFlags::EDITABLE),
        )),
        TypeDecl::behavior("Painter").field(FieldDecl::scalar("palette", "Palette", RefAttr::anywhere())),
    ]));
    let mut rig = Rig::new();
    let palette = Reference::from(AssetRef::new("Palette", "warm"));
    let instance = rig.attach(rig.player, "Owner");
    let painter = rig.attach(rig.player, "Painter");
    rig.scene.assign(&instance, "palette", FieldValue::Ref(palette.clone())).unwrap();
    rig.scene.assign(&painter, "palette", FieldValue::Ref(palette)).unwrap();

    let rejected = engine.validate(&mut rig.scene, &instance, false).unwrap();
    let accepted = engine.validate(&mut rig.scene, &painter, false).unwrap();

    assert_eq!(rejected.count(DiagnosticKind::NotAttachable), 1);
    assert!(accepted.is_success());
}

#[test]
fn test_node_reference_checked_by_its_node() {
    let engine = quiet_engine(registry_with([owner(FieldDecl::scalar(
        "anchor",
        "Health",
        RefAttr::parent().with_flags(RefFlags::EDITABLE),
    ))]));
    let mut rig = Rig::new();
    let instance = rig.attach(rig.player, "Owner");
    rig.scene
        .assign(&instance, "anchor", FieldValue::Ref(Reference::node(rig.world)))
        .unwrap();

    let outcome = engine.validate(&mut rig.scene, &instance, false).unwrap();

    assert!(outcome.is_success());
}

#[test]
fn test_editable_anywhere_skips_structure() {
    let engine = quiet_engine(registry_with([owner(FieldDecl::array(
        "bodies",
        "Rigidbody",
        RefAttr::on_self().with_flags(RefFlags::EDITABLE_ANYWHERE),
    ))]));
    let mut rig = Rig::new();
    let instance = rig.attach(rig.player, "Owner");
    let far = rig.attach(rig.weapon, "Rigidbody");
    rig.scene
        .assign(
            &instance,
            "bodies",
            FieldValue::array([Element::from(Reference::from(far)), Element::Direct(None)]),
        )
        .unwrap();

    let outcome = engine.validate(&mut rig.scene, &instance, false).unwrap();

    assert_eq!(outcome.count(DiagnosticKind::WrongLocation), 0);
    assert_eq!(outcome.count(DiagnosticKind::MissingElement), 1);
    assert_eq!(rig.scene.writes(), 0);
}

#[test]
fn test_all_fields_are_reported() {
    let engine = quiet_engine(registry_with([TypeDecl::behavior("Owner")
        .field(FieldDecl::scalar("body", "Rigidbody", RefAttr::on_self()))
        .field(FieldDecl::scalar("camera", "Camera", RefAttr::scene()))
        .field(FieldDecl::scalar("health", "Health", RefAttr::parent()))]));
    let mut rig = Rig::new();
    let instance = rig.attach(rig.player, "Owner");

    let outcome = engine.validate(&mut rig.scene, &instance, false).unwrap();

    let fields: Vec<&str> = outcome.diagnostics().iter().map(|d| d.field.as_str()).collect();
    assert_eq!(fields, vec!["body", "camera", "health"]);
}

#[test]
fn test_scene_exclude_self_resolves_then_reports_own_node() {
    let engine = quiet_engine(registry_with([owner(FieldDecl::scalar(
        "body",
        "Rigidbody",
        RefAttr::scene().with_flags(RefFlags::EXCLUDE_SELF),
    ))]));
    let mut rig = Rig::new();
    let instance = rig.attach(rig.player, "Owner");
    let own = rig.attach(rig.player, "Rigidbody");

    let outcome = engine.validate(&mut rig.scene, &instance, false).unwrap();

    assert_eq!(rig.scene.field(&instance, "body"), FieldValue::Ref(own.into()));
    assert_eq!(outcome.count(DiagnosticKind::ExcludedSelf), 1);
    assert_eq!(outcome.diagnostics().len(), 1);
    assert!(!outcome.is_success());
}
