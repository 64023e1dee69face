use std::collections::HashMap;

use glam::{
  Mat4,
  Quat,
  Vec3,
  Vec4,
};

/// The interpolation between two keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RechorInterpolation {
  Step,
  Linear,
  /// Values are stored as (in-tangent, value, out-tangent) triples.
  CubicSpline,
}

/// A value which can be keyframed.
pub trait RechorKeyframe: Copy {
  /// Interpolate linearly between two keys.
  fn interpolate(a: Self, b: Self, t: f32) -> Self;

  /// Evaluate the Hermite spline between two keys.
  /// param v0: The value at the first key.
  /// param out0: The out-tangent of the first key.
  /// param in1: The in-tangent of the second key.
  /// param v1: The value at the second key.
  /// param t: The normalized position between the keys.
  /// param dt: The time between the keys.
  fn hermite(v0: Self, out0: Self, in1: Self, v1: Self, t: f32, dt: f32) -> Self;
}

/// Get the four Hermite basis weights at t.
fn hermite_basis(t: f32) -> (f32, f32, f32, f32) {
  let t2 = t * t;
  let t3 = t2 * t;
  (
    2.0 * t3 - 3.0 * t2 + 1.0,
    t3 - 2.0 * t2 + t,
    -2.0 * t3 + 3.0 * t2,
    t3 - t2,
  )
}

impl RechorKeyframe for Vec3 {
  fn interpolate(a: Self, b: Self, t: f32) -> Self {
    a.lerp(b, t)
  }

  fn hermite(v0: Self, out0: Self, in1: Self, v1: Self, t: f32, dt: f32) -> Self {
    let (h00, h10, h01, h11) = hermite_basis(t);
    v0 * h00 + out0 * (h10 * dt) + v1 * h01 + in1 * (h11 * dt)
  }
}

impl RechorKeyframe for Quat {
  fn interpolate(a: Self, b: Self, t: f32) -> Self {
    a.slerp(b, t)
  }

  fn hermite(v0: Self, out0: Self, in1: Self, v1: Self, t: f32, dt: f32) -> Self {
    let (h00, h10, h01, h11) = hermite_basis(t);
    let v = Vec4::from(v0) * h00 + Vec4::from(out0) * (h10 * dt) + Vec4::from(v1) * h01 + Vec4::from(in1) * (h11 * dt);
    Quat::from_vec4(v).normalize()
  }
}

/// A keyframed property of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct RechorChannel<T: RechorKeyframe> {
  pub interpolation: RechorInterpolation,
  pub times: Vec<f32>,
  pub values: Vec<T>,
}

/// The implementation of the channel.
impl<T: RechorKeyframe> RechorChannel<T> {

  /// Create a new channel.
  /// param interpolation: The interpolation mode.
  /// param times: The ascending key times in seconds.
  /// param values: One value per key, or three per key for cubic splines.
  /// return: The channel.
  pub fn new(interpolation: RechorInterpolation, times: Vec<f32>, values: Vec<T>) -> Self {
    let stride = if interpolation == RechorInterpolation::CubicSpline { 3 } else { 1 };
    assert_eq!(times.len() * stride, values.len(), "channel key and value counts disagree");
    Self {
      interpolation,
      times,
      values,
    }
  }

  /// Get the value of key i.
  fn value(&self, i: usize) -> T {
    match self.interpolation {
      RechorInterpolation::CubicSpline => self.values[i * 3 + 1],
      _ => self.values[i],
    }
  }

  /// Sample the channel, holding the first and last keys outside their range.
  /// param time: The time in seconds.
  /// return: The value, or None if the channel has no keys.
  pub fn sample(&self, time: f32) -> Option<T> {
    let last = self.times.len().checked_sub(1)?;
    if time <= self.times[0] {
      return Some(self.value(0));
    }
    if time >= self.times[last] {
      return Some(self.value(last));
    }

    // times[k] <= time < times[k + 1]
    let k = self.times.partition_point(|&t| t <= time) - 1;
    let dt = self.times[k + 1] - self.times[k];
    let t = if dt > 0.0 { (time - self.times[k]) / dt } else { 0.0 };
    let value = match self.interpolation {
      RechorInterpolation::Step => self.value(k),
      RechorInterpolation::Linear => T::interpolate(self.value(k), self.value(k + 1), t),
      RechorInterpolation::CubicSpline => T::hermite(
        self.value(k),
        self.values[k * 3 + 2],
        self.values[(k + 1) * 3],
        self.value(k + 1),
        t,
        dt,
      ),
    };
    Some(value)
  }

}

/// The animated properties of one node. Missing channels keep the rest value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RechorNodeTrack {
  pub translation: Option<RechorChannel<Vec3>>,
  pub rotation: Option<RechorChannel<Quat>>,
  pub scale: Option<RechorChannel<Vec3>>,
}

impl RechorNodeTrack {
  pub fn is_empty(&self) -> bool {
    self.translation.is_none() && self.rotation.is_none() && self.scale.is_none()
  }
}

/// A node is a named transform with a parent link and an optional track.
#[derive(Debug, Clone, PartialEq)]
pub struct RechorNode {
  pub name: String,
  pub parent: Option<u32>,
  pub children: Vec<u32>,
  pub translation: Vec3,
  pub rotation: Quat,
  pub scale: Vec3,
  pub local_transform: Mat4,
  pub world_transform: Mat4,
  pub track: RechorNodeTrack,
}

/// The default implementation of the node.
impl Default for RechorNode {
  fn default() -> Self {
    Self {
      name: String::new(),
      parent: None,
      children: Vec::new(),
      translation: Vec3::ZERO,
      rotation: Quat::IDENTITY,
      scale: Vec3::ONE,
      local_transform: Mat4::IDENTITY,
      world_transform: Mat4::IDENTITY,
      track: RechorNodeTrack::default(),
    }
  }
}

/// The implementation of the node.
impl RechorNode {

  /// Create a node at rest with the given local TRS.
  /// param name: The node name.
  /// param parent: The parent index, which must precede this node in the table.
  /// param translation: The rest translation.
  /// param rotation: The rest rotation.
  /// param scale: The rest scale.
  /// return: The node.
  pub fn new(name: &str, parent: Option<u32>, translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
    Self {
      name: name.to_owned(),
      parent,
      translation,
      rotation,
      scale,
      local_transform: Mat4::from_scale_rotation_translation(scale, rotation, translation),
      ..Default::default()
    }
  }

  /// Get the local transform at the given time.
  /// param time: The time in seconds.
  /// return: The local transform.
  pub fn local_transform_at(&self, time: f32) -> Mat4 {
    if self.track.is_empty() {
      return self.local_transform;
    }
    let sample_vec3 = |channel: &Option<RechorChannel<Vec3>>, rest: Vec3| {
      channel.as_ref().and_then(|c| c.sample(time)).unwrap_or(rest)
    };
    let translation = sample_vec3(&self.track.translation, self.translation);
    let scale = sample_vec3(&self.track.scale, self.scale);
    let rotation = self.track.rotation.as_ref()
      .and_then(|c| c.sample(time))
      .unwrap_or(self.rotation);
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
  }

}

/// The node hierarchy of one source file, searchable by node name.
#[derive(Debug, Clone, Default)]
pub struct RechorNodeTable {
  nodes: Vec<RechorNode>,
  by_name: HashMap<String, u32>,
}

/// The implementation of the node table.
impl RechorNodeTable {

  /// Create a node table.
  /// Set the children and world transform of each node.
  /// param nodes: The nodes, parents before children.
  /// return: The node table.
  pub fn new(mut nodes: Vec<RechorNode>) -> Self {
    let mut temp_children = vec![vec![]; nodes.len()];
    let mut temp_world_transforms = vec![Mat4::IDENTITY; nodes.len()];
    for (idx, node) in nodes.iter().enumerate() {
      if let Some(parent_idx) = node.parent {
        assert!((parent_idx as usize) < idx, "node \"{}\" precedes its parent", node.name);
        temp_children[parent_idx as usize].push(idx as u32);
        temp_world_transforms[idx] = temp_world_transforms[parent_idx as usize] * node.local_transform;
      } else {
        temp_world_transforms[idx] = node.local_transform;
      }
    }

    let mut by_name = HashMap::with_capacity(nodes.len());
    for (idx, node) in nodes.iter_mut().enumerate() {
      node.children = std::mem::take(&mut temp_children[idx]);
      node.world_transform = temp_world_transforms[idx];
      if by_name.contains_key(&node.name) {
        log::warn!("Duplicate node name \"{}\", only the first one can be looked up.", node.name);
      } else {
        by_name.insert(node.name.clone(), idx as u32);
      }
    }

    Self {
      nodes,
      by_name,
    }
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  pub fn nodes(&self) -> &[RechorNode] {
    &self.nodes
  }

  /// Get mutable access to the node at index, e.g. to attach a track.
  pub fn node_mut(&mut self, index: u32) -> &mut RechorNode {
    &mut self.nodes[index as usize]
  }

  /// Find the first node with the given name.
  /// param name: The node name.
  /// return: The node index or None.
  pub fn find(&self, name: &str) -> Option<u32> {
    self.by_name.get(name).copied()
  }

  /// Get the local transform of a node at the given time.
  pub fn local_transform_at(&self, index: u32, time: f32) -> Mat4 {
    self.nodes[index as usize].local_transform_at(time)
  }

  /// Get the global transform of a node at the given time.
  /// param index: The node index.
  /// param time: The time in seconds.
  /// return: The product of all ancestors' local transforms and the node's own.
  pub fn global_transform_at(&self, index: u32, time: f32) -> Mat4 {
    let mut transform = self.local_transform_at(index, time);
    let mut parent = self.nodes[index as usize].parent;
    while let Some(parent_idx) = parent {
      transform = self.local_transform_at(parent_idx, time) * transform;
      parent = self.nodes[parent_idx as usize].parent;
    }
    transform
  }

  /// Get the global transform of a named node at the given time.
  pub fn global_transform(&self, name: &str, time: f32) -> Option<Mat4> {
    self.find(name).map(|index| self.global_transform_at(index, time))
  }

  /// Get the rest world transform of a named node.
  pub fn rest_global_transform(&self, name: &str) -> Option<Mat4> {
    self.find(name).map(|index| self.nodes[index as usize].world_transform)
  }

}
