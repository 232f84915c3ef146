//! Testing utilities for the sceneref workspace
//!
//! Shared type declarations, scene rigs and engine setup.

#![allow(missing_docs)]

use sceneref_engine::{DescriptorRegistry, EngineConfig, RefEngine, RegistryBuilder, TypeDecl};
use sceneref_model::{AttachmentRef, NodeId};
use sceneref_scene::MemoryScene;
use std::sync::Arc;

/// Behavior and asset types most tests refer to
///
/// `BoxCollider` and `SphereCollider` extend `Collider`; `Health` and
/// `Shield` implement `IDamageable`; `Palette` is an asset.
pub fn base_types() -> RegistryBuilder {
    RegistryBuilder::new()
        .declare(TypeDecl::behavior("Rigidbody"))
        .declare(TypeDecl::behavior("Collider"))
        .declare(TypeDecl::behavior("BoxCollider").extends("Collider"))
        .declare(TypeDecl::behavior("SphereCollider").extends("Collider"))
        .declare(TypeDecl::interface("IDamageable"))
        .declare(TypeDecl::behavior("Health").implements("IDamageable"))
        .declare(TypeDecl::behavior("Shield").implements("IDamageable"))
        .declare(TypeDecl::behavior("Camera"))
        .declare(TypeDecl::asset("Palette"))
}

/// Base types plus the given declarations
pub fn registry_with(decls: impl IntoIterator<Item = TypeDecl>) -> Arc<DescriptorRegistry> {
    let builder = decls.into_iter().fold(base_types(), RegistryBuilder::declare);
    Arc::new(builder.build().unwrap())
}

/// Engine with diagnostic logging off
pub fn quiet_engine(registry: Arc<DescriptorRegistry>) -> RefEngine {
    RefEngine::new(registry, EngineConfig::new().with_log_diagnostics(false))
}

/// World -> Player -> Weapon, no attachments
#[derive(Debug, Clone)]
pub struct Rig {
    pub scene: MemoryScene,
    pub world: NodeId,
    pub player: NodeId,
    pub weapon: NodeId,
}

impl Rig {
    pub fn new() -> Self {
        let mut scene = MemoryScene::new();
        let world = scene.add_root("World");
        let player = scene.add_child(world, "Player").unwrap();
        let weapon = scene.add_child(player, "Weapon").unwrap();
        Self {
            scene,
            world,
            player,
            weapon,
        }
    }

    pub fn attach(&mut self, node: NodeId, ty: &str) -> AttachmentRef {
        self.scene.attach(node, ty).unwrap()
    }
}

impl Default for Rig {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a test-writer subscriber once; later calls are no-ops
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
