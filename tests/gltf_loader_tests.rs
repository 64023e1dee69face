use std::path::PathBuf;

use rechor::prelude::*;

const SKINNED_TRIANGLE: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [{ "nodes": [0, 1] }],
  "nodes": [
    { "name": "Body", "mesh": 0, "skin": 0, "translation": [1.0, 0.0, 0.0] },
    { "name": "Bone" }
  ],
  "meshes": [{
    "name": "BodyMesh",
    "primitives": [{
      "attributes": { "POSITION": 0, "NORMAL": 1, "TEXCOORD_0": 2, "JOINTS_0": 4, "WEIGHTS_0": 5 },
      "indices": 3,
      "material": 0
    }]
  }],
  "skins": [{ "joints": [1] }],
  "materials": [{ "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } } }],
  "textures": [{ "source": 0 }],
  "images": [{ "uri": "textures/skin_diffuse.png" }],
  "animations": [{
    "name": "Walk",
    "channels": [{ "sampler": 0, "target": { "node": 0, "path": "translation" } }],
    "samplers": [{ "input": 6, "output": 7, "interpolation": "LINEAR" }]
  }],
  "buffers": [{ "uri": "skinned_triangle.bin", "byteLength": 212 }],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 36 },
    { "buffer": 0, "byteOffset": 72, "byteLength": 24 },
    { "buffer": 0, "byteOffset": 96, "byteLength": 12 },
    { "buffer": 0, "byteOffset": 108, "byteLength": 24 },
    { "buffer": 0, "byteOffset": 132, "byteLength": 48 },
    { "buffer": 0, "byteOffset": 180, "byteLength": 8 },
    { "buffer": 0, "byteOffset": 188, "byteLength": 24 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
    { "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC3" },
    { "bufferView": 2, "componentType": 5126, "count": 3, "type": "VEC2" },
    { "bufferView": 3, "componentType": 5125, "count": 3, "type": "SCALAR" },
    { "bufferView": 4, "componentType": 5123, "count": 3, "type": "VEC4" },
    { "bufferView": 5, "componentType": 5126, "count": 3, "type": "VEC4" },
    { "bufferView": 6, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [1.0] },
    { "bufferView": 7, "componentType": 5126, "count": 2, "type": "VEC3" }
  ]
}"#;

fn push_f32s(buffer: &mut Vec<u8>, values: &[f32]) {
  for value in values {
    buffer.extend_from_slice(&value.to_le_bytes());
  }
}

fn skinned_triangle_bin() -> Vec<u8> {
  let mut buffer = Vec::new();
  // Positions, normals, uvs.
  push_f32s(&mut buffer, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
  push_f32s(&mut buffer, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
  push_f32s(&mut buffer, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
  // Indices.
  for index in [0u32, 1, 2] {
    buffer.extend_from_slice(&index.to_le_bytes());
  }
  // Joints.
  for _ in 0..12 {
    buffer.extend_from_slice(&0u16.to_le_bytes());
  }
  // Weights: full, half, none.
  push_f32s(&mut buffer, &[1.0, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
  // Walk: x goes from 0 to 6 in one second.
  push_f32s(&mut buffer, &[0.0, 1.0]);
  push_f32s(&mut buffer, &[0.0, 0.0, 0.0, 6.0, 0.0, 0.0]);
  assert_eq!(buffer.len(), 212);
  buffer
}

fn fixture_dir(name: &str) -> PathBuf {
  let dir = std::env::temp_dir().join(format!("rechor_gltf_{}_{}", name, std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  dir
}

fn write_skinned_triangle(name: &str) -> PathBuf {
  let dir = fixture_dir(name);
  std::fs::write(dir.join("skinned_triangle.bin"), skinned_triangle_bin()).unwrap();
  let path = dir.join("skinned_triangle.gltf");
  std::fs::write(&path, SKINNED_TRIANGLE).unwrap();
  path
}

#[test]
fn loads_mesh_material_skin_and_clip() {
  let path = write_skinned_triangle("all");
  let mut importer = RechorImporter::new();
  let mut scene = RechorScene::default();
  importer.load_into(&path, &mut scene, RechorImportOptions::ALL).unwrap();

  assert_eq!(scene.meshes.len(), 1);
  let mesh = &scene.meshes[0];
  assert_eq!(mesh.vertex_count(), 3);
  assert_eq!(mesh.indices, vec![0, 1, 2]);
  assert_eq!(mesh.texture, "skin_diffuse.png");
  assert_eq!(mesh.colors, vec![1.0; 12]);
  assert_eq!(mesh.bone_indices, vec![0; 12]);
  assert_eq!(
    mesh.bone_weights,
    vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
  );

  assert_eq!(importer.raw().anims.len(), 1);
  assert_eq!(importer.raw().anims[0].name, "Walk");
  assert_eq!(scene.anims.len(), 1);
  let frame_set = &scene.anims[0].meshes[0];
  assert_eq!(frame_set.mesh_matrices.len(), 59);
  assert_eq!(frame_set.bone_matrices.len(), 59);

  // Frame 1: animated x = 0.1, bound at x = 1.
  assert!((frame_set.mesh_matrices[0][12] + 0.9).abs() < 1e-5);
  let identity = glam::Mat4::IDENTITY.to_cols_array();
  for matrices in frame_set.bone_matrices.iter() {
    assert_eq!(matrices.len(), 16);
    for (a, b) in matrices.iter().zip(identity.iter()) {
      assert!((a - b).abs() < 1e-6);
    }
  }
}

#[test]
fn motion_file_is_baked_against_earlier_meshes() {
  let path = write_skinned_triangle("split");
  let mut importer = RechorImporter::new();
  importer.load(&path, RechorImportOptions::MESH | RechorImportOptions::BONE_WEIGHT).unwrap();
  assert!(importer.raw().anims.is_empty());
  importer.load(&path, RechorImportOptions::ANIM).unwrap();

  let mut scene = RechorScene::default();
  importer.process(&mut scene);
  assert_eq!(scene.meshes.len(), 1);
  assert_eq!(scene.anims.len(), 1);
  assert_eq!(scene.anims[0].meshes.len(), 1);
  assert_eq!(scene.anims[0].meshes[0].frame_count(), 59);
}

#[test]
fn frame_rate_scales_the_span() {
  let path = write_skinned_triangle("rate");
  let source = RechorGltfLoader::load_raw(&path, RechorImportOptions::ANIM, 30.0).unwrap();
  let clip = source.clip.unwrap();
  assert_eq!(clip.span.start, 0);
  assert_eq!(clip.span.end, 30);
  assert!(source.meshes.is_empty());
}

#[test]
fn mesh_only_load_has_no_skin() {
  let path = write_skinned_triangle("mesh_only");
  let source = RechorGltfLoader::load_raw(&path, RechorImportOptions::MESH, 60.0).unwrap();
  assert!(source.clip.is_none());
  assert_eq!(source.nodes.len(), 2);
  assert_eq!(source.meshes.len(), 1);

  let raw = &source.meshes[0];
  assert_eq!(raw.node_name, "Body");
  assert_eq!(raw.vertices.len(), 3);
  assert_eq!(raw.texture, "skin_diffuse.png");
  assert!(raw.bone_indices.is_empty());
  assert!(raw.bone_node_names.is_empty());
  assert!((raw.inv_mesh_bind_pose.w_axis.x + 1.0).abs() < 1e-6);
}

#[test]
fn bone_weights_require_polygons() {
  let path = write_skinned_triangle("bad_options");
  let err = RechorGltfLoader::load_raw(&path, RechorImportOptions::BONE_WEIGHT, 60.0).unwrap_err();
  assert_eq!(err.kind(), RechorErrorKind::InvalidOptions);
}

#[test]
fn missing_file_is_reported() {
  let path = fixture_dir("missing").join("nothing_here.gltf");
  let err = RechorImporter::new().load(&path, RechorImportOptions::ALL).unwrap_err();
  assert_eq!(err.kind(), RechorErrorKind::FileNotFound);
}

#[test]
fn malformed_file_is_a_parse_error() {
  let path = fixture_dir("malformed").join("broken.gltf");
  std::fs::write(&path, "{ not gltf").unwrap();
  let err = RechorImporter::new().load(&path, RechorImportOptions::ALL).unwrap_err();
  assert_eq!(err.kind(), RechorErrorKind::SourceParseFailed);
}

#[test]
fn clip_is_required_when_loading_anims() {
  let dir = fixture_dir("no_anim");
  std::fs::write(dir.join("skinned_triangle.bin"), skinned_triangle_bin()).unwrap();
  let mut document: serde_json::Value = serde_json::from_str(SKINNED_TRIANGLE).unwrap();
  document.as_object_mut().unwrap().remove("animations");
  let path = dir.join("static.gltf");
  std::fs::write(&path, serde_json::to_vec(&document).unwrap()).unwrap();

  let err = RechorGltfLoader::load_raw(&path, RechorImportOptions::ANIM, 60.0).unwrap_err();
  assert_eq!(err.kind(), RechorErrorKind::SourceParseFailed);
  assert!(RechorGltfLoader::load_raw(&path, RechorImportOptions::MESH, 60.0).is_ok());
}

/// Write the fixture buffer next to an edited copy of the fixture document.
fn write_variant(name: &str, edit: impl FnOnce(&mut serde_json::Value)) -> PathBuf {
  let dir = fixture_dir(name);
  std::fs::write(dir.join("skinned_triangle.bin"), skinned_triangle_bin()).unwrap();
  let mut document: serde_json::Value = serde_json::from_str(SKINNED_TRIANGLE).unwrap();
  edit(&mut document);
  let path = dir.join(format!("{}.gltf", name));
  std::fs::write(&path, serde_json::to_vec(&document).unwrap()).unwrap();
  path
}

#[test]
fn channels_follow_node_identity_not_name() {
  let path = write_variant("unnamed_targets", |document| {
    let root = document.as_object_mut().unwrap();
    for key in ["meshes", "skins", "materials", "textures", "images"] {
      root.remove(key);
    }
    root["nodes"] = serde_json::json!([{}, {}]);
    root["animations"][0]["channels"][0]["target"]["node"] = serde_json::json!(1);
  });

  let source = RechorGltfLoader::load_raw(&path, RechorImportOptions::ANIM, 60.0).unwrap();
  let nodes = source.nodes.nodes();
  assert_eq!(nodes.len(), 2);
  assert_eq!(nodes[0].name, nodes[1].name);
  assert!(nodes[0].track.is_empty());
  assert!(nodes[1].track.translation.is_some());
}

#[test]
fn unnamed_joints_are_rejected() {
  let path = write_variant("unnamed_joints", |document| {
    let root = document.as_object_mut().unwrap();
    root["scenes"][0]["nodes"] = serde_json::json!([0, 1, 2]);
    root["nodes"] = serde_json::json!([
      { "name": "Body", "mesh": 0, "skin": 0 },
      {},
      {}
    ]);
    root["skins"][0]["joints"] = serde_json::json!([1, 2]);
  });

  let options = RechorImportOptions::MESH | RechorImportOptions::BONE_WEIGHT;
  let err = RechorGltfLoader::load_raw(&path, options, 60.0).unwrap_err();
  assert_eq!(err.kind(), RechorErrorKind::SourceParseFailed);
  // Without skins the same file loads.
  assert!(RechorGltfLoader::load_raw(&path, RechorImportOptions::MESH, 60.0).is_ok());
}

#[test]
fn clip_times_beyond_the_frame_range_are_rejected() {
  let path = write_variant("far_times", |document| {
    document["accessors"][6]["max"] = serde_json::json!([4.0e7]);
  });
  // The second key time lives in the buffer.
  let mut bin = skinned_triangle_bin();
  bin[184..188].copy_from_slice(&4.0e7f32.to_le_bytes());
  std::fs::write(path.with_file_name("skinned_triangle.bin"), bin).unwrap();

  let err = RechorGltfLoader::load_raw(&path, RechorImportOptions::ANIM, 60.0).unwrap_err();
  assert_eq!(err.kind(), RechorErrorKind::SourceParseFailed);
}
