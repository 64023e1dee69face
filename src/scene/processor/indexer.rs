use std::collections::HashMap;

use crate::scene::{
  RechorMesh,
  RechorMeshRaw,
  RechorVertex,
};
use crate::scene::vertex::{
  RechorVertexKey,
  DEFAULT_BONE_INDICES,
  DEFAULT_BONE_WEIGHTS,
  DEFAULT_COLOR,
};

/// The deduplication cache of one mesh.
/// Maps each distinct vertex to the index it was first emitted at.
#[derive(Debug, Default)]
pub struct RechorAttributeCache {
  lookup: HashMap<RechorVertexKey, u32>,
  len: u32,
}

/// The implementation of the attribute cache.
impl RechorAttributeCache {

  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      lookup: HashMap::with_capacity(capacity),
      len: 0,
    }
  }

  /// Get the number of distinct vertices emitted so far.
  pub fn len(&self) -> usize {
    self.len as usize
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Look up a vertex, reserving the next index if it is new.
  /// param vertex: The vertex.
  /// return: The index and whether the vertex was inserted.
  pub fn insert(&mut self, vertex: &RechorVertex) -> (u32, bool) {
    let index = self.len;
    let Some(key) = vertex.key() else {
      // NaN never matches an earlier vertex and never needs to be found again.
      self.len += 1;
      return (index, true);
    };
    match self.lookup.entry(key) {
      std::collections::hash_map::Entry::Occupied(entry) => (*entry.get(), false),
      std::collections::hash_map::Entry::Vacant(entry) => {
        entry.insert(index);
        self.len += 1;
        (index, true)
      },
    }
  }

}

/// Turns per-corner raw meshes into indexed meshes.
pub struct RechorMeshIndexer;

/// The implementation of the mesh indexer.
impl RechorMeshIndexer {

  /// Index a raw mesh with a fresh cache.
  /// param raw: The raw mesh.
  /// return: The indexed mesh.
  pub fn index(raw: &RechorMeshRaw) -> RechorMesh {
    let mut cache = RechorAttributeCache::with_capacity(raw.indices.len());
    Self::index_with_cache(raw, &mut cache)
  }

  /// Index a raw mesh with the given cache.
  /// The cache must be empty or belong to the same mesh.
  /// param raw: The raw mesh.
  /// param cache: The cache.
  /// return: The indexed mesh.
  pub fn index_with_cache(raw: &RechorMeshRaw, cache: &mut RechorAttributeCache) -> RechorMesh {
    let num_of_corners = raw.indices.len();
    assert_eq!(num_of_corners % 3, 0, "raw mesh \"{}\" is not a triangle list", raw.node_name);
    assert_eq!(raw.vertices.len(), num_of_corners, "raw mesh \"{}\" vertex count", raw.node_name);
    assert_eq!(raw.normals.len(), num_of_corners, "raw mesh \"{}\" normal count", raw.node_name);
    assert_eq!(raw.uvs.len(), num_of_corners, "raw mesh \"{}\" uv count", raw.node_name);
    assert!(raw.colors.is_empty() || raw.colors.len() == num_of_corners, "raw mesh \"{}\" color count", raw.node_name);
    assert!(raw.bone_indices.is_empty() || raw.bone_indices.len() == num_of_corners, "raw mesh \"{}\" bone index count", raw.node_name);
    assert!(raw.bone_weights.is_empty() || raw.bone_weights.len() == num_of_corners, "raw mesh \"{}\" bone weight count", raw.node_name);

    let has_bone_indices = !raw.bone_indices.is_empty();
    let has_bone_weights = !raw.bone_weights.is_empty();

    let mut mesh = RechorMesh {
      vertices: Vec::with_capacity(num_of_corners * 3),
      normals: Vec::with_capacity(num_of_corners * 3),
      indices: Vec::with_capacity(num_of_corners),
      colors: Vec::with_capacity(num_of_corners * 4),
      uvs: Vec::with_capacity(num_of_corners * 2),
      texture: raw.texture.clone(),
      bone_indices: Vec::with_capacity(if has_bone_indices { num_of_corners * 4 } else { 0 }),
      bone_weights: Vec::with_capacity(if has_bone_weights { num_of_corners * 4 } else { 0 }),
    };

    for i in 0..num_of_corners {
      let vertex = RechorVertex {
        position: raw.vertices[i],
        normal: raw.normals[i],
        color: raw.colors.get(i).copied().unwrap_or(DEFAULT_COLOR),
        tex_coord: raw.uvs[i],
        bone_indices: raw.bone_indices.get(i).copied().unwrap_or(DEFAULT_BONE_INDICES),
        bone_weights: raw.bone_weights.get(i).copied().unwrap_or(DEFAULT_BONE_WEIGHTS),
      };

      let (index, inserted) = cache.insert(&vertex);
      if inserted {
        mesh.vertices.extend_from_slice(&vertex.position);
        mesh.normals.extend_from_slice(&vertex.normal);
        mesh.colors.extend_from_slice(&vertex.color);
        mesh.uvs.extend_from_slice(&vertex.tex_coord);
        if has_bone_indices {
          mesh.bone_indices.extend_from_slice(&vertex.bone_indices);
        }
        if has_bone_weights {
          mesh.bone_weights.extend_from_slice(&vertex.bone_weights);
        }
      }
      mesh.indices.push(index);
    }
    debug_assert_eq!(mesh.vertex_count(), cache.len());

    log::debug!(
      "Indexed mesh \"{}\": {} corners -> {} vertices.",
      raw.node_name,
      num_of_corners,
      mesh.vertex_count(),
    );
    mesh
  }

}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  fn raw_from_positions(positions: &[[f32; 3]]) -> RechorMeshRaw {
    let n = positions.len();
    RechorMeshRaw {
      node_name: String::from("mesh"),
      indices: (0..n as u32).collect(),
      vertices: positions.to_vec(),
      normals: vec![[0.0, 0.0, 1.0]; n],
      uvs: vec![[0.5, 0.5]; n],
      texture: String::from("diffuse.png"),
      ..Default::default()
    }
  }

  #[test]
  fn distinct_corners_keep_their_order() {
    let positions: Vec<[f32; 3]> = (0..6).map(|i| [i as f32, 0.0, 0.0]).collect();
    let mesh = RechorMeshIndexer::index(&raw_from_positions(&positions));
    assert_eq!(mesh.vertex_count(), 6);
    assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(mesh.texture, "diffuse.png");
  }

  #[test]
  fn identical_corners_collapse_to_one_vertex() {
    let mesh = RechorMeshIndexer::index(&raw_from_positions(&[[1.0, 2.0, 3.0]; 9]));
    assert_eq!(mesh.vertex_count(), 1);
    assert_eq!(mesh.indices, vec![0; 9]);
    assert_eq!(mesh.vertices, vec![1.0, 2.0, 3.0]);
  }

  #[test]
  fn shared_corners_reuse_first_index() {
    // Two triangles of a quad sharing an edge.
    let a = [0.0, 0.0, 0.0];
    let b = [1.0, 0.0, 0.0];
    let c = [1.0, 1.0, 0.0];
    let d = [0.0, 1.0, 0.0];
    let mesh = RechorMeshIndexer::index(&raw_from_positions(&[a, b, c, a, c, d]));
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
  }

  #[test]
  fn missing_colors_default_to_white() {
    let mesh = RechorMeshIndexer::index(&raw_from_positions(&[[0.0; 3], [1.0; 3], [2.0; 3]]));
    assert_eq!(mesh.colors, vec![1.0; 12]);
    assert!(!mesh.has_skin());
    assert!(mesh.bone_weights.is_empty());
  }

  #[test]
  fn differing_normal_splits_vertex() {
    let mut raw = raw_from_positions(&[[0.0; 3]; 3]);
    raw.normals[2] = [0.0, 1.0, 0.0];
    let mesh = RechorMeshIndexer::index(&raw);
    assert_eq!(mesh.vertex_count(), 2);
    assert_eq!(mesh.indices, vec![0, 0, 1]);
  }

  #[test]
  fn negative_zero_matches_positive_zero() {
    let mesh = RechorMeshIndexer::index(&raw_from_positions(&[[0.0, 0.0, 0.0], [-0.0, 0.0, 0.0], [0.0, -0.0, 0.0]]));
    assert_eq!(mesh.vertex_count(), 1);
    // The first inserted tuple is the one emitted.
    assert!(mesh.vertices.iter().all(|v| v.to_bits() == 0));
  }

  #[test]
  fn nan_corners_are_never_merged() {
    let mesh = RechorMeshIndexer::index(&raw_from_positions(&[[f32::NAN, 0.0, 0.0]; 3]));
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.indices, vec![0, 1, 2]);
  }

  #[test]
  fn skin_attributes_are_carried_per_vertex() {
    let mut raw = raw_from_positions(&[[0.0; 3], [0.0; 3], [1.0; 3]]);
    raw.bone_indices = vec![[1, 0, 0, 0], [2, 0, 0, 0], [1, 0, 0, 0]];
    raw.bone_weights = vec![[1.0, 0.0, 0.0, 0.0]; 3];
    let mesh = RechorMeshIndexer::index(&raw);
    // Same position but different bones: two vertices.
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.bone_indices, vec![1, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0]);
    assert_eq!(mesh.bone_weights.len(), 12);
    assert!(mesh.validate().is_ok());
  }

  #[test]
  fn cache_reports_insertions() {
    let mut cache = RechorAttributeCache::default();
    let vertex = RechorVertex {
      position: [0.0; 3],
      normal: [0.0; 3],
      color: DEFAULT_COLOR,
      tex_coord: [0.0; 2],
      bone_indices: DEFAULT_BONE_INDICES,
      bone_weights: DEFAULT_BONE_WEIGHTS,
    };
    assert_eq!(cache.insert(&vertex), (0, true));
    assert_eq!(cache.insert(&vertex), (0, false));
    assert_eq!(cache.len(), 1);
  }

  #[test]
  #[should_panic(expected = "not a triangle list")]
  fn partial_triangle_is_a_contract_violation() {
    RechorMeshIndexer::index(&raw_from_positions(&[[0.0; 3]; 4]));
  }

  fn small_position() -> impl Strategy<Value = [f32; 3]> {
    // A tiny value space so duplicates are common.
    (0u8..3, 0u8..3, 0u8..2).prop_map(|(x, y, z)| [x as f32, y as f32, z as f32])
  }

  proptest! {
    #[test]
    fn indices_are_valid_and_reproduce_corners(
      positions in prop::collection::vec(small_position(), 0..20).prop_map(|mut v| {
        v.truncate(v.len() / 3 * 3);
        v
      })
    ) {
      let raw = raw_from_positions(&positions);
      let mesh = RechorMeshIndexer::index(&raw);

      prop_assert_eq!(mesh.indices.len(), raw.indices.len());
      prop_assert_eq!(mesh.indices.len() % 3, 0);
      prop_assert!(mesh.validate().is_ok());
      for (corner, &index) in mesh.indices.iter().enumerate() {
        let i = index as usize;
        prop_assert!(i < mesh.vertex_count());
        prop_assert_eq!(&mesh.vertices[i * 3..i * 3 + 3], &positions[corner][..]);
      }
    }

    #[test]
    fn distinct_corners_are_identity_indexed(n in 1usize..10) {
      let positions: Vec<[f32; 3]> = (0..n * 3).map(|i| [i as f32, 0.5, -1.0]).collect();
      let mesh = RechorMeshIndexer::index(&raw_from_positions(&positions));
      prop_assert_eq!(mesh.vertex_count(), n * 3);
      prop_assert_eq!(mesh.indices, (0..(n * 3) as u32).collect::<Vec<_>>());
    }
  }
}
