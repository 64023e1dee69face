/// The number of influences kept per vertex.
pub const MAX_INFLUENCES: usize = 4;

/// One bone's pull on a control point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RechorBoneInfluence {
  pub bone: u32,
  pub weight: f32,
}

/// The reduced, normalized skin binding of one control point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RechorSkinBinding {
  pub indices: [u32; MAX_INFLUENCES],
  pub weights: [f32; MAX_INFLUENCES],
}

/// Reduces arbitrary influence sets to the four strongest, normalized.
pub struct RechorSkinWeightReducer;

/// The implementation of the skin weight reducer.
impl RechorSkinWeightReducer {

  /// Reduce the influences of every control point.
  /// param influences: The influences, indexed by control point.
  /// return: One binding per control point.
  pub fn reduce(influences: &[Vec<RechorBoneInfluence>]) -> Vec<RechorSkinBinding> {
    influences.iter()
      .map(|influences| Self::reduce_one(influences))
      .collect()
  }

  /// Reduce the influences of one control point.
  /// Influences are ordered by descending weight (ties keep their input order),
  /// truncated to four, padded with (0, 0) and divided by their sum.
  /// A zero sum yields all-zero weights.
  /// param influences: The influences.
  /// return: The binding.
  pub fn reduce_one(influences: &[RechorBoneInfluence]) -> RechorSkinBinding {
    let mut sorted = influences.to_vec();
    // slice::sort_by is stable.
    sorted.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    let mut binding = RechorSkinBinding::default();
    for (slot, influence) in sorted.iter().take(MAX_INFLUENCES).enumerate() {
      binding.indices[slot] = influence.bone;
      binding.weights[slot] = influence.weight;
    }

    let total: f32 = binding.weights.iter().sum();
    if total == 0.0 {
      binding.weights = [0.0; MAX_INFLUENCES];
    } else {
      for weight in binding.weights.iter_mut() {
        *weight /= total;
      }
    }
    binding
  }

  /// Expand per-control-point bindings to per-corner arrays.
  /// param bindings: The bindings, indexed by control point.
  /// param indices: The control point of each triangle corner.
  /// return: The bone indices and bone weights of each corner.
  pub fn expand(bindings: &[RechorSkinBinding], indices: &[u32]) -> (Vec<[u32; 4]>, Vec<[f32; 4]>) {
    let mut bone_indices = Vec::with_capacity(indices.len());
    let mut bone_weights = Vec::with_capacity(indices.len());
    for &index in indices {
      let binding = &bindings[index as usize];
      bone_indices.push(binding.indices);
      bone_weights.push(binding.weights);
    }
    (bone_indices, bone_weights)
  }

}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;
  use rstest::rstest;

  fn influences(pairs: &[(u32, f32)]) -> Vec<RechorBoneInfluence> {
    pairs.iter().map(|&(bone, weight)| RechorBoneInfluence { bone, weight }).collect()
  }

  #[rstest]
  #[case::single(&[(3, 0.5)], [3, 0, 0, 0], [1.0, 0.0, 0.0, 0.0])]
  #[case::sorted(&[(1, 0.1), (2, 0.6), (3, 0.3)], [2, 3, 1, 0], [0.6, 0.3, 0.1, 0.0])]
  #[case::truncated(&[(0, 0.1), (1, 0.2), (2, 0.3), (3, 0.4), (4, 0.5)], [4, 3, 2, 1], [0.5 / 1.4, 0.4 / 1.4, 0.3 / 1.4, 0.2 / 1.4])]
  #[case::ties_keep_order(&[(7, 0.25), (5, 0.25), (6, 0.5)], [6, 7, 5, 0], [0.5, 0.25, 0.25, 0.0])]
  fn reduce_one_cases(#[case] pairs: &[(u32, f32)], #[case] indices: [u32; 4], #[case] weights: [f32; 4]) {
    let binding = RechorSkinWeightReducer::reduce_one(&influences(pairs));
    assert_eq!(binding.indices, indices);
    for (actual, expected) in binding.weights.iter().zip(weights.iter()) {
      assert!((actual - expected).abs() < 1e-6, "{:?} != {:?}", binding.weights, weights);
    }
  }

  #[test]
  fn unbound_control_point_has_zero_weights() {
    let binding = RechorSkinWeightReducer::reduce_one(&[]);
    assert_eq!(binding, RechorSkinBinding::default());
  }

  #[test]
  fn zero_weight_influences_do_not_divide_by_zero() {
    let binding = RechorSkinWeightReducer::reduce_one(&influences(&[(2, 0.0), (9, 0.0)]));
    assert_eq!(binding.indices, [2, 9, 0, 0]);
    assert_eq!(binding.weights, [0.0; 4]);
  }

  #[test]
  fn expand_follows_corner_indices() {
    let bindings = RechorSkinWeightReducer::reduce(&[
      influences(&[(1, 1.0)]),
      influences(&[(2, 1.0)]),
    ]);
    let (bone_indices, bone_weights) = RechorSkinWeightReducer::expand(&bindings, &[1, 0, 1]);
    assert_eq!(bone_indices, vec![[2, 0, 0, 0], [1, 0, 0, 0], [2, 0, 0, 0]]);
    assert_eq!(bone_weights, vec![[1.0, 0.0, 0.0, 0.0]; 3]);
  }

  #[test]
  #[should_panic]
  fn expand_rejects_unknown_control_point() {
    RechorSkinWeightReducer::expand(&[RechorSkinBinding::default()], &[0, 1, 0]);
  }

  proptest! {
    #[test]
    fn weights_are_normalized_and_descending(
      pairs in prop::collection::vec((0u32..64, 0.0f32..1.0), 1..10)
    ) {
      let input = influences(&pairs);
      let binding = RechorSkinWeightReducer::reduce_one(&input);

      let kept: f32 = {
        let mut weights: Vec<f32> = pairs.iter().map(|p| p.1).collect();
        weights.sort_by(|a, b| b.total_cmp(a));
        weights.iter().take(4).sum()
      };
      let sum: f32 = binding.weights.iter().sum();
      if kept == 0.0 {
        prop_assert_eq!(binding.weights, [0.0; 4]);
      } else {
        prop_assert!((sum - 1.0).abs() < 1e-5, "sum {}", sum);
      }
      for pair in binding.weights.windows(2) {
        prop_assert!(pair[0] >= pair[1]);
      }
      for slot in pairs.len()..4 {
        prop_assert_eq!(binding.indices[slot], 0);
        prop_assert_eq!(binding.weights[slot], 0.0);
      }
    }
  }
}
