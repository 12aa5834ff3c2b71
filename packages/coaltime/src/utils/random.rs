use crate::constants::SECTION_SEED_STRIDE;
use rand::{Rng, RngCore, SeedableRng};
use rand_isaac::Isaac64Rng;

pub fn get_random_number_generator(seed: Option<u64>) -> Isaac64Rng {
  match seed {
    None => Isaac64Rng::from_entropy(),
    Some(seed) => Isaac64Rng::seed_from_u64(seed),
  }
}

/// Seed of a genome section, derived from the pipeline seed and the position of the section.
///
/// Steps a generator seeded with the pipeline seed `chunk_index + SECTION_SEED_STRIDE * section` times, so that every
/// (chunk, section) pair gets its own reproducible stream regardless of which worker processes it.
///
/// Seeds are only distinct while `chunk_index < SECTION_SEED_STRIDE`: chunk 100 of section 0 and chunk 0 of section 1
/// share a seed.
pub fn section_seed(pipeline_seed: u64, chunk_index: usize, section: usize) -> u64 {
  let mut rng = Isaac64Rng::seed_from_u64(pipeline_seed);
  let steps = chunk_index + SECTION_SEED_STRIDE * section;
  let mut seed = rng.next_u64();
  for _ in 0..steps {
    seed = rng.next_u64();
  }
  seed
}

/// Draw one seed per tree, in tree order.
///
/// Seeds are drawn up front, so that trees can then be processed in any order or in parallel with identical results.
pub fn draw_seeds(rng: &mut impl Rng, count: usize) -> Vec<u64> {
  (0..count).map(|_| rng.gen()).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  #[rstest]
  fn section_seed_is_reproducible() {
    assert_eq!(section_seed(7, 2, 3), section_seed(7, 2, 3));
  }

  #[rstest]
  #[case(0, 0, 0, 1)]
  #[case(0, 1, 1, 0)]
  #[case(5, 0, 0, 1)]
  fn section_seed_differs_between_sections(
    #[case] chunk_a: usize,
    #[case] section_a: usize,
    #[case] chunk_b: usize,
    #[case] section_b: usize,
  ) {
    assert_ne!(section_seed(42, chunk_a, section_a), section_seed(42, chunk_b, section_b));
  }

  #[rstest]
  fn section_seed_repeats_past_chunk_stride() {
    assert_eq!(section_seed(42, SECTION_SEED_STRIDE, 0), section_seed(42, 0, 1));
  }

  #[rstest]
  fn draws_same_seeds_from_same_generator() {
    let first = draw_seeds(&mut get_random_number_generator(Some(11)), 5);
    let second = draw_seeds(&mut get_random_number_generator(Some(11)), 5);
    assert_eq!(first, second);
    assert_eq!(first.len(), 5);
  }
}
