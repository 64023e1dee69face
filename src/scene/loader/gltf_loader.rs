use std::path::Path;
use std::collections::VecDeque;

use glam::{
  Mat4,
  Quat,
  Vec3,
};

use crate::error::{
  RechorError,
  RechorErrorKind,
};
use crate::options::RechorImportOptions;
use crate::scene::{
  RechorAnimClip,
  RechorAnimSpan,
  RechorMeshRaw,
  RechorSourceRaw,
};
use crate::scene::node::{
  RechorChannel,
  RechorInterpolation,
  RechorKeyframe,
  RechorNode,
  RechorNodeTable,
};
use crate::scene::processor::{
  RechorBoneInfluence,
  RechorSkinWeightReducer,
};

/// The name given to nodes without one.
pub const UNNAMED: &str = "<Unnamed>";

/// The glTF loader.
pub struct RechorGltfLoader;

/// Build a parse error.
fn parse_error(msg: &str) -> RechorError {
  RechorError::new(RechorErrorKind::SourceParseFailed, msg, None)
}

/// Strip everything up to the last path separator of either kind.
fn file_name(uri: &str) -> &str {
  let name = uri.rsplit('/').next().unwrap_or(uri);
  name.rsplit('\\').next().unwrap_or(name)
}

/// Convert a key time to a whole frame.
/// param time: The time in seconds.
/// param frame_rate: The frames per second.
/// return: The frame, truncated toward zero.
fn frame_of(time: f32, frame_rate: f32) -> Result<i32, RechorError> {
  let frame = time * frame_rate;
  // i32::MAX as f32 rounds up to 2^31.
  if !frame.is_finite() || frame < i32::MIN as f32 || frame >= i32::MAX as f32 {
    return Err(parse_error(&format!("Key time {} is out of range at {} fps.", time, frame_rate)));
  }
  Ok(frame as i32)
}

/// The implementation of the glTF loader.
impl RechorGltfLoader {
  /// Load the raw data of a glTF file.
  /// param path: The path of the glTF file.
  /// param options: What to load.
  /// param frame_rate: The frame rate used to express the clip span in frames.
  /// return: The raw data.
  pub fn load_raw<P: AsRef<Path>>(
    path: P,
    options: RechorImportOptions,
    frame_rate: f32,
  ) -> Result<RechorSourceRaw, RechorError> {
    let path = path.as_ref();
    if options.contains(RechorImportOptions::BONE_WEIGHT) && !options.contains(RechorImportOptions::POLYGON) {
      return Err(RechorError::new(
        RechorErrorKind::InvalidOptions,
        "Loading bone weights requires loading polygons.",
        None,
      ));
    }
    log::info!("parse \"{}\" ...", path.to_string_lossy());

    let bytes = std::fs::read(path).map_err(|err| RechorError::from_read(path, err))?;
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(&bytes)
      .map_err(|err| RechorError::new(
        RechorErrorKind::SourceParseFailed,
        &format!("Parse glTF file \"{}\" failed.", path.to_string_lossy()),
        Some(Box::new(err)),
      ))?;
    let buffers = gltf::import_buffers(&document, path.parent(), blob)
      .map_err(|err| RechorError::new(
        RechorErrorKind::FileUnreadable,
        &format!("Load buffers of glTF file \"{}\" failed.", path.to_string_lossy()),
        Some(Box::new(err)),
      ))?;

    // Load all nodes.
    let (mut nodes, gltf_nodes) = Self::load_nodes(&document, path)?;
    let mut node_map = vec![None; document.nodes().len()];
    for (index, gltf_node) in gltf_nodes.iter().enumerate() {
      node_map[gltf_node.index()].get_or_insert(index as u32);
    }

    // Load all meshes.
    let mut meshes = Vec::new();
    if options.intersects(RechorImportOptions::MESH | RechorImportOptions::BONE_WEIGHT) {
      for (index, gltf_node) in gltf_nodes.iter().enumerate() {
        if let Some(mesh) = gltf_node.mesh() {
          Self::load_mesh(&mesh, gltf_node, index as u32, &nodes, &node_map, &buffers, options, &mut meshes)?;
        }
      }
    }

    // Load the animation clip.
    let clip = if options.contains(RechorImportOptions::ANIM) {
      Some(Self::load_clip(&document, &mut nodes, &node_map, &buffers, frame_rate)?)
    } else {
      None
    };

    Ok(RechorSourceRaw {
      meshes,
      nodes,
      clip,
    })
  }

  /// Load the node hierarchy of the default scene, breadth first.
  /// param document: The glTF document.
  /// param path: The file path, for messages.
  /// return: The node table and the glTF node behind each table entry.
  fn load_nodes<'a>(
    document: &'a gltf::Document,
    path: &Path,
  ) -> Result<(RechorNodeTable, Vec<gltf::Node<'a>>), RechorError> {
    if document.scenes().len() > 1 {
      log::warn!("More than one scene in glTF file \"{:?}\". Only the default scene will be loaded.", path);
    }
    let scene = document.default_scene()
      .or_else(|| document.scenes().next())
      .ok_or_else(|| parse_error(&format!("No scene in glTF file \"{:?}\".", path)))?;
    log::debug!("Loading scene \"{}\".", scene.name().unwrap_or(UNNAMED));

    let mut loaded_nodes = Vec::new();
    let mut gltf_nodes = Vec::new();
    let mut node_queue = VecDeque::new();
    node_queue.extend(scene.nodes().map(|node| (None, node)));

    while let Some((parent, node)) = node_queue.pop_front() {
      let current_index = loaded_nodes.len() as u32;
      let name = node.name().unwrap_or(UNNAMED);
      let (translation, rotation, scale) = node.transform().decomposed();
      log::debug!("Loading node \"{}\".", name);

      loaded_nodes.push(RechorNode::new(
        name,
        parent,
        Vec3::from(translation),
        Quat::from_array(rotation),
        Vec3::from(scale),
      ));
      node_queue.extend(node.children().map(|child| (Some(current_index), child)));
      gltf_nodes.push(node);
    }

    Ok((RechorNodeTable::new(loaded_nodes), gltf_nodes))
  }

  /// Load every primitive of a mesh as one raw mesh.
  /// param mesh: The glTF mesh.
  /// param gltf_node: The node referencing the mesh.
  /// param node_index: The node's index in the node table.
  /// param nodes: The node table.
  /// param node_map: The table index of each glTF node.
  /// param buffers: The glTF buffers.
  /// param options: What to load.
  /// param meshes: The output list.
  #[allow(clippy::too_many_arguments)]
  fn load_mesh(
    mesh: &gltf::Mesh,
    gltf_node: &gltf::Node,
    node_index: u32,
    nodes: &RechorNodeTable,
    node_map: &[Option<u32>],
    buffers: &[gltf::buffer::Data],
    options: RechorImportOptions,
    meshes: &mut Vec<RechorMeshRaw>,
  ) -> Result<(), RechorError> {
    let node = &nodes.nodes()[node_index as usize];
    let mesh_name = mesh.name().unwrap_or(UNNAMED);
    log::debug!("Loading mesh \"{}\" of node \"{}\".", mesh_name, node.name);
    if nodes.find(&node.name) != Some(node_index) {
      log::warn!("Mesh node name \"{}\" is not unique, anims will follow the first node with it.", node.name);
    }

    for primitive in mesh.primitives() {
      log::debug!("Loading primitive {} from mesh \"{}\".", primitive.index(), mesh_name);
      let mut loaded_mesh = RechorMeshRaw {
        node_name: node.name.clone(),
        inv_mesh_bind_pose: node.world_transform.inverse(),
        ..Default::default()
      };

      let mut num_of_control_points = 0;
      if options.contains(RechorImportOptions::POLYGON) {
        num_of_control_points = Self::load_polygon(&primitive, buffers, mesh_name, &mut loaded_mesh)?;
      }
      if options.contains(RechorImportOptions::MATERIAL) {
        loaded_mesh.texture = Self::load_texture_name(&primitive.material());
      }
      if options.contains(RechorImportOptions::BONE_WEIGHT) {
        if let Some(skin) = gltf_node.skin() {
          Self::load_skin(&skin, &primitive, buffers, nodes, node_map, num_of_control_points, &mut loaded_mesh)?;
        }
      }

      meshes.push(loaded_mesh);
    }
    Ok(())
  }

  /// Load the triangle corners of a primitive.
  /// param primitive: The glTF primitive.
  /// param buffers: The glTF buffers.
  /// param mesh_name: The mesh name, for messages.
  /// param mesh: The raw mesh to fill.
  /// return: The number of control points.
  fn load_polygon(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    mesh_name: &str,
    mesh: &mut RechorMeshRaw,
  ) -> Result<usize, RechorError> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
      return Err(parse_error(&format!(
        "Mesh \"{}\" has a non-triangulated polygon ({:?}).",
        mesh_name,
        primitive.mode(),
      )));
    }
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions = reader.read_positions()
      .ok_or_else(|| parse_error(&format!("Read positions from mesh \"{}\" failed.", mesh_name)))?
      .collect::<Vec<_>>();
    let num_of_control_points = positions.len();
    let indices = match reader.read_indices() {
      Some(indices) => indices.into_u32().collect::<Vec<_>>(),
      None => (0..num_of_control_points as u32).collect::<Vec<_>>(),
    };
    if indices.len() % 3 != 0 {
      return Err(parse_error(&format!("Mesh \"{}\" has {} indices, not a triangle list.", mesh_name, indices.len())));
    }
    if let Some(index) = indices.iter().find(|&&index| index as usize >= num_of_control_points) {
      return Err(parse_error(&format!("Mesh \"{}\" index {} is out of range.", mesh_name, index)));
    }

    let normals = reader.read_normals()
      .ok_or_else(|| parse_error(&format!("Read normals from mesh \"{}\" failed.", mesh_name)))?
      .collect::<Vec<_>>();
    let tex_coords = reader.read_tex_coords(0)
      .ok_or_else(|| parse_error(&format!("Read tex_coords from mesh \"{}\" failed.", mesh_name)))?
      .into_f32()
      .collect::<Vec<_>>();
    let colors = reader.read_colors(0)
      .map(|colors| colors.into_rgba_f32().collect::<Vec<_>>())
      .unwrap_or_default();
    let counts = [("normals", normals.len()), ("tex_coords", tex_coords.len())];
    for (name, count) in counts {
      if count != num_of_control_points {
        return Err(parse_error(&format!("Mesh \"{}\" has {} {} for {} positions.", mesh_name, count, name, num_of_control_points)));
      }
    }
    if !colors.is_empty() && colors.len() != num_of_control_points {
      return Err(parse_error(&format!("Mesh \"{}\" has {} colors for {} positions.", mesh_name, colors.len(), num_of_control_points)));
    }

    // Expand by corner.
    mesh.vertices = indices.iter().map(|&i| positions[i as usize]).collect();
    mesh.normals = indices.iter().map(|&i| normals[i as usize]).collect();
    mesh.uvs = indices.iter().map(|&i| tex_coords[i as usize]).collect();
    if !colors.is_empty() {
      mesh.colors = indices.iter().map(|&i| colors[i as usize]).collect();
    }
    mesh.indices = indices;

    Ok(num_of_control_points)
  }

  /// Get the file name of the base color texture.
  /// param material: The glTF material.
  /// return: The texture name, or empty if the material has none.
  fn load_texture_name(material: &gltf::Material) -> String {
    log::debug!("Loading material \"{}\".", material.name().unwrap_or(UNNAMED));
    let Some(info) = material.pbr_metallic_roughness().base_color_texture() else {
      return String::new();
    };
    let image = info.texture().source();
    match image.source() {
      gltf::image::Source::Uri { uri, .. } if !uri.starts_with("data:") => file_name(uri).to_owned(),
      _ => image.name().unwrap_or_default().to_owned(),
    }
  }

  /// Load the skin of a primitive.
  /// param skin: The glTF skin.
  /// param primitive: The glTF primitive.
  /// param buffers: The glTF buffers.
  /// param nodes: The node table.
  /// param node_map: The table index of each glTF node.
  /// param num_of_control_points: The number of control points of the primitive.
  /// param mesh: The raw mesh to fill.
  fn load_skin(
    skin: &gltf::Skin,
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    nodes: &RechorNodeTable,
    node_map: &[Option<u32>],
    num_of_control_points: usize,
    mesh: &mut RechorMeshRaw,
  ) -> Result<(), RechorError> {
    log::debug!("Loading skin \"{}\" of mesh \"{}\".", skin.name().unwrap_or(UNNAMED), mesh.node_name);
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    // By control point.
    let mut influences: Vec<Vec<RechorBoneInfluence>> = vec![Vec::new(); num_of_control_points];
    let mut set = 0;
    while let (Some(joints), Some(weights)) = (reader.read_joints(set), reader.read_weights(set)) {
      for (control_point, (joint, weight)) in joints.into_u16().zip(weights.into_f32()).enumerate() {
        let slot = influences.get_mut(control_point)
          .ok_or_else(|| parse_error(&format!("Mesh \"{}\" has more skin weights than positions.", mesh.node_name)))?;
        for k in 0..4 {
          // Zero weights are padding.
          if weight[k] != 0.0 {
            slot.push(RechorBoneInfluence {
              bone: joint[k] as u32,
              weight: weight[k],
            });
          }
        }
      }
      set += 1;
    }
    if set == 0 {
      log::warn!("Skinned mesh \"{}\" has no JOINTS_0/WEIGHTS_0, skin ignored.", mesh.node_name);
      return Ok(());
    }

    let joints = skin.joints().collect::<Vec<_>>();
    if let Some(influence) = influences.iter().flatten().find(|influence| influence.bone as usize >= joints.len()) {
      return Err(parse_error(&format!(
        "Mesh \"{}\" references joint {} of a skin with {} joints.",
        mesh.node_name,
        influence.bone,
        joints.len(),
      )));
    }

    // Save bone node names.
    // Bones are baked by name, so each joint's name must lead back to that joint.
    let mut joint_nodes = Vec::with_capacity(joints.len());
    for joint in joints.iter() {
      let index = node_map[joint.index()].ok_or_else(|| parse_error(&format!(
        "Joint {} \"{}\" is not part of the loaded scene.",
        joint.index(),
        joint.name().unwrap_or(UNNAMED),
      )))?;
      let joint_node = &nodes.nodes()[index as usize];
      if joint.name().is_none() || nodes.find(&joint_node.name) != Some(index) {
        return Err(parse_error(&format!(
          "Joint {} of mesh \"{}\" has no unique name (\"{}\").",
          joint.index(),
          mesh.node_name,
          joint_node.name,
        )));
      }
      joint_nodes.push(joint_node);
    }
    let joint_names = joint_nodes.iter().map(|node| node.name.clone()).collect::<Vec<_>>();

    // Inverse matrices of the bind pose.
    let inv_bind_poses = match skin.reader(|buffer| Some(&buffers[buffer.index()])).read_inverse_bind_matrices() {
      Some(matrices) => matrices.map(|m| Mat4::from_cols_array_2d(&m)).collect::<Vec<_>>(),
      None => joint_nodes.iter()
        .map(|node| node.world_transform.inverse())
        .collect::<Vec<_>>(),
    };
    if inv_bind_poses.len() != joint_names.len() {
      return Err(parse_error(&format!(
        "Skin of mesh \"{}\" has {} inverse bind matrices for {} joints.",
        mesh.node_name,
        inv_bind_poses.len(),
        joint_names.len(),
      )));
    }

    // Extend by index.
    let bindings = RechorSkinWeightReducer::reduce(&influences);
    let (bone_indices, bone_weights) = RechorSkinWeightReducer::expand(&bindings, &mesh.indices);
    mesh.bone_indices = bone_indices;
    mesh.bone_weights = bone_weights;
    mesh.bone_node_names = joint_names;
    mesh.inv_bone_bind_poses = inv_bind_poses;
    Ok(())
  }

  /// Build a channel after checking its key and value counts.
  fn channel<T: RechorKeyframe>(
    interpolation: RechorInterpolation,
    times: Vec<f32>,
    values: Vec<T>,
  ) -> Result<RechorChannel<T>, RechorError> {
    let stride = if interpolation == RechorInterpolation::CubicSpline { 3 } else { 1 };
    if times.len() * stride != values.len() {
      return Err(parse_error(&format!("Animation channel has {} keys but {} values.", times.len(), values.len())));
    }
    Ok(RechorChannel::new(interpolation, times, values))
  }

  /// Load the single animation clip and attach its channels to the nodes.
  /// param document: The glTF document.
  /// param nodes: The node table.
  /// param buffers: The glTF buffers.
  /// param frame_rate: The frame rate.
  /// return: The clip.
  fn load_clip(
    document: &gltf::Document,
    nodes: &mut RechorNodeTable,
    node_map: &[Option<u32>],
    buffers: &[gltf::buffer::Data],
    frame_rate: f32,
  ) -> Result<RechorAnimClip, RechorError> {
    let animations = document.animations().collect::<Vec<_>>();
    let animation = match animations.as_slice() {
      [animation] => animation,
      [] => return Err(parse_error("The file has no animation.")),
      _ => return Err(parse_error(&format!("The file has {} animations, only one take is supported.", animations.len()))),
    };
    let name = animation.name().unwrap_or(UNNAMED).to_owned();
    log::debug!("Loading animation \"{}\".", name);

    let mut min_time = f32::INFINITY;
    let mut max_time = f32::NEG_INFINITY;
    for channel in animation.channels() {
      let target = channel.target();
      let target_name = target.node().name().unwrap_or(UNNAMED);
      let Some(node_index) = node_map[target.node().index()] else {
        log::warn!("Animation target {} \"{}\" is not part of the loaded scene.", target.node().index(), target_name);
        continue;
      };

      let interpolation = match channel.sampler().interpolation() {
        gltf::animation::Interpolation::Step => RechorInterpolation::Step,
        gltf::animation::Interpolation::Linear => RechorInterpolation::Linear,
        gltf::animation::Interpolation::CubicSpline => RechorInterpolation::CubicSpline,
      };
      let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
      let times = reader.read_inputs()
        .ok_or_else(|| parse_error(&format!("Read key times of \"{}\" failed.", target_name)))?
        .collect::<Vec<f32>>();
      if let Some(time) = times.iter().find(|time| !time.is_finite()) {
        return Err(parse_error(&format!("Key time {} of \"{}\" is not finite.", time, target_name)));
      }
      let outputs = reader.read_outputs()
        .ok_or_else(|| parse_error(&format!("Read key values of \"{}\" failed.", target_name)))?;
      for &time in times.iter() {
        min_time = min_time.min(time);
        max_time = max_time.max(time);
      }

      let track = &mut nodes.node_mut(node_index).track;
      match outputs {
        gltf::animation::util::ReadOutputs::Translations(values) => {
          track.translation = Some(Self::channel(interpolation, times, values.map(Vec3::from).collect())?);
        },
        gltf::animation::util::ReadOutputs::Rotations(values) => {
          track.rotation = Some(Self::channel(interpolation, times, values.into_f32().map(Quat::from_array).collect())?);
        },
        gltf::animation::util::ReadOutputs::Scales(values) => {
          track.scale = Some(Self::channel(interpolation, times, values.map(Vec3::from).collect())?);
        },
        gltf::animation::util::ReadOutputs::MorphTargetWeights(_) => {
          log::warn!("Morph target weights of \"{}\" are not supported, channel skipped.", target_name);
        },
      }
    }

    let span = if min_time <= max_time {
      RechorAnimSpan {
        start: frame_of(min_time, frame_rate)?,
        end: frame_of(max_time, frame_rate)?,
      }
    } else {
      RechorAnimSpan { start: 0, end: 0 }
    };
    log::debug!("Animation \"{}\" spans frames {}..{}.", name, span.start, span.end);

    Ok(RechorAnimClip {
      name,
      span,
    })
  }
}
