//! Per-export color allocation for panoptic labels.
//!
//! Every thing category gets a color close to its base color that no other
//! allocation in the same export has used. Stuff categories always keep
//! their fixed color.

use std::collections::{BTreeMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{rgb_to_id, Rgb};
use crate::error::ExportError;
use crate::ir::{Category, CategoryId};

/// Largest per-channel offset applied when a base color is already taken.
const MAX_CHANNEL_OFFSET: i16 = 30;

/// Hands out unique colors (and their packed ids) for categories.
///
/// The registry of taken colors starts with black and every stuff color,
/// and only grows. One generator should live for a whole export so colors
/// are unique across samples.
#[derive(Debug)]
pub struct IdGenerator {
    taken_colors: HashSet<Rgb>,
    categories: BTreeMap<CategoryId, Category>,
    rng: StdRng,
    max_attempts: Option<u64>,
}

impl IdGenerator {
    /// Creates a generator seeded from the operating system.
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        Self::with_rng(categories, StdRng::from_os_rng())
    }

    /// Creates a generator whose perturbations are reproducible.
    pub fn with_seed(categories: impl IntoIterator<Item = Category>, seed: u64) -> Self {
        Self::with_rng(categories, StdRng::seed_from_u64(seed))
    }

    fn with_rng(categories: impl IntoIterator<Item = Category>, rng: StdRng) -> Self {
        let categories: BTreeMap<CategoryId, Category> =
            categories.into_iter().map(|cat| (cat.id, cat)).collect();

        let mut taken_colors = HashSet::new();
        taken_colors.insert([0, 0, 0]);
        for category in categories.values().filter(|cat| !cat.isthing) {
            taken_colors.insert(category.color);
        }

        Self {
            taken_colors,
            categories,
            rng,
            max_attempts: None,
        }
    }

    /// Caps the number of perturbation attempts per allocation.
    ///
    /// Without a cap a saturated neighbourhood around a base color makes
    /// [`get_color`](Self::get_color) loop forever.
    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Returns the color for the next object of `category_id`.
    ///
    /// Stuff categories always get their fixed color. A thing category gets
    /// its base color the first time, then random colors within
    /// ±30 per channel of it that no earlier allocation has used.
    pub fn get_color(&mut self, category_id: CategoryId) -> Result<Rgb, ExportError> {
        let category = self
            .categories
            .get(&category_id)
            .ok_or(ExportError::UnknownCategory(category_id))?;

        if !category.isthing {
            return Ok(category.color);
        }

        let base = category.color;
        if self.taken_colors.insert(base) {
            return Ok(base);
        }

        let mut attempts: u64 = 0;
        loop {
            if let Some(limit) = self.max_attempts {
                if attempts >= limit {
                    return Err(ExportError::ColorSpaceExhausted {
                        category_id,
                        attempts,
                    });
                }
            }
            attempts += 1;

            let candidate = perturb(&mut self.rng, base);
            if self.taken_colors.insert(candidate) {
                return Ok(candidate);
            }
        }
    }

    /// Returns the packed id of the next color for `category_id`.
    pub fn get_id(&mut self, category_id: CategoryId) -> Result<u32, ExportError> {
        self.get_color(category_id).map(rgb_to_id)
    }

    /// Returns both the packed id and the color for `category_id`.
    pub fn get_id_and_color(&mut self, category_id: CategoryId) -> Result<(u32, Rgb), ExportError> {
        let color = self.get_color(category_id)?;
        Ok((rgb_to_id(color), color))
    }

    /// True if `color` is reserved or already handed out.
    pub fn is_taken(&self, color: Rgb) -> bool {
        self.taken_colors.contains(&color)
    }

    /// Number of reserved or allocated colors.
    pub fn taken_count(&self) -> usize {
        self.taken_colors.len()
    }

    /// The categories this generator allocates for, by id.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }
}

fn perturb<R: Rng + ?Sized>(rng: &mut R, base: Rgb) -> Rgb {
    let mut out = [0u8; 3];
    for (channel, &value) in out.iter_mut().zip(base.iter()) {
        let offset = rng.random_range(-MAX_CHANNEL_OFFSET..=MAX_CHANNEL_OFFSET);
        *channel = (value as i16 + offset).clamp(0, 255) as u8;
    }
    out
}
