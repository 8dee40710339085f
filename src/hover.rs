use crate::scene::{MeshId, Scene};
use serde_json::{json, Value};

pub const HIGHLIGHT_COLOR: u32 = 0xff0000;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Hovered {
    mesh: MeshId,
    saved_emissive: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HoverChange {
    Unchanged,
    Entered(MeshId),
    Left(MeshId),
    Moved { from: MeshId, to: MeshId },
}

impl HoverChange {
    /// Log fields for a transition; `None` when nothing changed.
    pub fn fields(self) -> Option<Value> {
        let (from, to) = match self {
            Self::Unchanged => return None,
            Self::Entered(to) => (None, Some(to)),
            Self::Left(from) => (Some(from), None),
            Self::Moved { from, to } => (Some(from), Some(to)),
        };
        Some(json!({
            "from": from.map(MeshId::index),
            "to": to.map(MeshId::index),
        }))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverHighlight {
    highlight: u32,
    current: Option<Hovered>,
}

impl Default for HoverHighlight {
    fn default() -> Self {
        Self::new(HIGHLIGHT_COLOR)
    }
}

impl HoverHighlight {
    pub fn new(highlight: u32) -> Self {
        Self {
            highlight,
            current: None,
        }
    }

    pub fn hovered(&self) -> Option<MeshId> {
        self.current.map(|hovered| hovered.mesh)
    }

    /// Applies this frame's nearest hit.
    pub fn update(&mut self, scene: &mut Scene, nearest: Option<MeshId>) -> HoverChange {
        let previous = self.hovered();
        if previous == nearest {
            return HoverChange::Unchanged;
        }

        self.restore(scene);

        let Some(mesh) = nearest else {
            return match previous {
                Some(left) => HoverChange::Left(left),
                None => HoverChange::Unchanged,
            };
        };

        if let Some(saved_emissive) = scene.emissive_of(mesh) {
            scene.set_emissive(mesh, self.highlight);
            self.current = Some(Hovered {
                mesh,
                saved_emissive,
            });
        }

        match (previous, self.hovered()) {
            (Some(from), Some(to)) => HoverChange::Moved { from, to },
            (None, Some(to)) => HoverChange::Entered(to),
            (Some(from), None) => HoverChange::Left(from),
            (None, None) => HoverChange::Unchanged,
        }
    }

    pub fn restore(&mut self, scene: &mut Scene) {
        if let Some(hovered) = self.current.take() {
            scene.set_emissive(hovered.mesh, hovered.saved_emissive);
        }
    }

    /// Drops the reference without touching the scene; used at teardown once
    /// the scene's materials are gone.
    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Geometry, Material, Mesh, Shading};

    fn scene_with(emissives: &[u32]) -> (Scene, Vec<MeshId>) {
        let mut scene = Scene::new(None);
        let geometry = scene.add_geometry(Geometry::cuboid(1.0, 1.0, 1.0));
        let ids = emissives
            .iter()
            .map(|emissive| {
                let mut material = Material::new(Shading::Lambert);
                material.emissive = *emissive;
                let material = scene.add_material(material);
                scene.add_mesh(Mesh::new(geometry, material))
            })
            .collect();
        (scene, ids)
    }

    #[test]
    fn transitions_log_the_meshes_on_either_side() {
        let (a, b) = (MeshId::from_index(3), MeshId::from_index(8));
        assert_eq!(HoverChange::Unchanged.fields(), None);
        assert_eq!(HoverChange::Entered(a).fields(), Some(json!({ "from": null, "to": 3 })));
        assert_eq!(HoverChange::Left(b).fields(), Some(json!({ "from": 8, "to": null })));
        assert_eq!(
            HoverChange::Moved { from: a, to: b }.fields(),
            Some(json!({ "from": 3, "to": 8 }))
        );
    }

    fn highlighted(scene: &Scene, ids: &[MeshId]) -> usize {
        ids.iter()
            .filter(|id| scene.emissive_of(**id) == Some(HIGHLIGHT_COLOR))
            .count()
    }

    #[test]
    fn entering_then_leaving_restores_the_original_emissive() {
        let (mut scene, ids) = scene_with(&[0x123456]);
        let mut hover = HoverHighlight::default();

        assert_eq!(hover.update(&mut scene, Some(ids[0])), HoverChange::Entered(ids[0]));
        assert_eq!(scene.emissive_of(ids[0]), Some(HIGHLIGHT_COLOR));
        assert_eq!(hover.hovered(), Some(ids[0]));

        assert_eq!(hover.update(&mut scene, None), HoverChange::Left(ids[0]));
        assert_eq!(scene.emissive_of(ids[0]), Some(0x123456));
        assert_eq!(hover.hovered(), None);
    }

    #[test]
    fn staying_on_the_same_mesh_changes_nothing() {
        let (mut scene, ids) = scene_with(&[0x000000]);
        let mut hover = HoverHighlight::default();

        hover.update(&mut scene, Some(ids[0]));
        assert_eq!(hover.update(&mut scene, Some(ids[0])), HoverChange::Unchanged);
        assert_eq!(scene.emissive_of(ids[0]), Some(HIGHLIGHT_COLOR));

        hover.update(&mut scene, None);
        assert_eq!(scene.emissive_of(ids[0]), Some(0x000000));
    }

    #[test]
    fn moving_between_meshes_keeps_exactly_one_highlight() {
        let (mut scene, ids) = scene_with(&[0x000001, 0x000002, 0x000003]);
        let mut hover = HoverHighlight::default();

        for target in [ids[0], ids[1], ids[2], ids[0]] {
            hover.update(&mut scene, Some(target));
            assert_eq!(highlighted(&scene, &ids), 1);
            assert_eq!(hover.hovered(), Some(target));
        }

        assert_eq!(
            hover.update(&mut scene, Some(ids[1])),
            HoverChange::Moved {
                from: ids[0],
                to: ids[1]
            }
        );
        hover.update(&mut scene, None);
        assert_eq!(highlighted(&scene, &ids), 0);
        assert_eq!(scene.emissive_of(ids[0]), Some(0x000001));
        assert_eq!(scene.emissive_of(ids[1]), Some(0x000002));
        assert_eq!(scene.emissive_of(ids[2]), Some(0x000003));
    }

    #[test]
    fn empty_space_with_nothing_hovered_is_a_no_op() {
        let (mut scene, ids) = scene_with(&[0x000000]);
        let mut hover = HoverHighlight::default();
        assert_eq!(hover.update(&mut scene, None), HoverChange::Unchanged);
        assert_eq!(scene.emissive_of(ids[0]), Some(0x000000));
    }

    #[test]
    fn unknown_mesh_is_not_tracked() {
        let (mut scene, ids) = scene_with(&[0x000000]);
        let mut hover = HoverHighlight::default();
        hover.update(&mut scene, Some(ids[0]));

        let change = hover.update(&mut scene, Some(MeshId::from_index(42)));
        assert_eq!(change, HoverChange::Left(ids[0]));
        assert_eq!(hover.hovered(), None);
        assert_eq!(scene.emissive_of(ids[0]), Some(0x000000));
    }
}
