use tracing::info;

use crate::config::DiagramSettings;
use crate::node::{NodeId, ValueNodeRegistry};
use crate::scene::{DisplayMode, DrawBatch, KeyGenerator};
use crate::snapshot::{EnvironmentIndex, RuntimeSnapshot};

/// One diagram build: a registry of value nodes derived from a snapshot,
/// ready to be drawn any number of times. Rebuilding means constructing a new
/// builder; there is no incremental update.
#[derive(Debug)]
pub struct DiagramBuilder {
    env_index: EnvironmentIndex,
    registry: ValueNodeRegistry,
    sequence: u64,
}

impl DiagramBuilder {
    pub fn build(snapshot: &RuntimeSnapshot, settings: &DiagramSettings) -> Self {
        let env_index = EnvironmentIndex::from_snapshot(snapshot);
        let mut registry = ValueNodeRegistry::new();

        for function in &snapshot.functions {
            registry.register(
                function.value.clone(),
                &function.references,
                &env_index,
                settings,
            );
        }

        info!(
            revision = snapshot.revision,
            functions = snapshot.functions.len(),
            nodes = registry.len(),
            "built environment diagram"
        );

        Self {
            env_index,
            registry,
            sequence: snapshot.revision,
        }
    }

    pub fn env_index(&self) -> &EnvironmentIndex {
        &self.env_index
    }

    pub fn registry(&self) -> &ValueNodeRegistry {
        &self.registry
    }

    /// Mutable access for the host's pointer-event dispatch.
    pub fn registry_mut(&mut self) -> &mut ValueNodeRegistry {
        &mut self.registry
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        0..self.registry.len()
    }

    /// Draws every node with a fresh key generator so identical builds and
    /// modes produce identical batches across redraws.
    pub fn draw(&self, mode: DisplayMode) -> DrawBatch {
        let mut keys = KeyGenerator::new();
        let mut elements = Vec::new();
        for node in self.registry.nodes() {
            elements.extend(node.draw(mode, &mut keys));
        }

        DrawBatch {
            sequence: self.sequence,
            elements,
        }
    }
}
