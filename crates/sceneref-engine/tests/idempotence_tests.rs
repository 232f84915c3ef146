use proptest::prelude::*;
use proptest::sample::Index;
use sceneref_engine::{FieldDecl, RefAttr, TypeDecl, TypeFilter};
use sceneref_model::{NodeId, RefFlags};
use sceneref_scene::MemoryScene;
use sceneref_test_utils::{init_test_logging, quiet_engine, registry_with};

const COMPONENTS: [&str; 6] = ["Rigidbody", "BoxCollider", "SphereCollider", "Health", "Shield", "Camera"];

fn sentinel() -> TypeDecl {
    TypeDecl::behavior("Sentinel")
        .field(FieldDecl::scalar("body", "Rigidbody", RefAttr::on_self()))
        .field(FieldDecl::scalar(
            "health",
            "Health",
            RefAttr::parent().with_flags(RefFlags::EXCLUDE_SELF | RefFlags::OPTIONAL),
        ))
        .field(FieldDecl::array("colliders", "Collider", RefAttr::child()))
        .field(FieldDecl::scalar(
            "collider",
            "Collider",
            RefAttr::child().with_filter(TypeFilter::except("SphereCollider")),
        ))
        .field(FieldDecl::list("targets", "IDamageable", RefAttr::scene()).indirect())
        .field(
            FieldDecl::scalar("guard", "IDamageable", RefAttr::child().with_flags(RefFlags::INCLUDE_INACTIVE))
                .indirect(),
        )
        .field(FieldDecl::scalar("camera", "Camera", RefAttr::anywhere().with_flags(RefFlags::OPTIONAL)))
}

/// (parent pick, components, active, carries a sentinel)
type NodePlan = (Index, Vec<usize>, bool, bool);

fn plans() -> impl Strategy<Value = Vec<NodePlan>> {
    prop::collection::vec(
        (
            any::<Index>(),
            prop::collection::vec(0..COMPONENTS.len(), 0..3),
            prop::bool::weighted(0.8),
            any::<bool>(),
        ),
        1..12,
    )
}

fn build(plans: &[NodePlan]) -> MemoryScene {
    let mut scene = MemoryScene::new();
    let mut nodes: Vec<NodeId> = Vec::new();

    for (i, (parent, components, active, sentinel)) in plans.iter().enumerate() {
        let node = if i == 0 {
            scene.add_root("Root")
        } else {
            scene.add_child(nodes[parent.index(i)], format!("Node{i}")).unwrap()
        };
        scene.set_active(node, *active).unwrap();
        if *sentinel {
            scene.attach(node, "Sentinel").unwrap();
        }
        for component in components {
            scene.attach(node, COMPONENTS[*component]).unwrap();
        }
        nodes.push(node);
    }
    scene
}

proptest! {
    #[test]
    fn prop_second_pass_writes_nothing(plans in plans()) {
        init_test_logging();
        let engine = quiet_engine(registry_with([sentinel()]));
        let mut scene = build(&plans);

        let first = engine.validate_all(&mut scene).unwrap();
        let writes = scene.writes();
        scene.take_dirty();

        let second = engine.validate_all(&mut scene).unwrap();

        prop_assert_eq!(scene.writes(), writes);
        prop_assert!(scene.dirty().is_empty());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_clean_validate_converges(plans in plans()) {
        init_test_logging();
        let engine = quiet_engine(registry_with([sentinel()]));
        let mut scene = build(&plans);
        let instances: Vec<_> = scene.all_attachments().filter(|a| a.ty.name() == "Sentinel").cloned().collect();

        for instance in &instances {
            engine.clean_validate(&mut scene, instance, false).unwrap();
        }
        let writes = scene.writes();
        for instance in &instances {
            engine.validate(&mut scene, instance, false).unwrap();
        }

        prop_assert_eq!(scene.writes(), writes);
    }
}

