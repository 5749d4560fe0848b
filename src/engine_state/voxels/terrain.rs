//! # Terrain Generator
//!
//! Deterministic procedural fill for newly created chunks. Two fractal noise fields are
//! layered:
//!
//! - a 2D height field gives the highest block of every world column,
//! - a 3D density field carves caves and overhangs below that height.
//!
//! Each column is walked top-down. The first solid cell at or above world `y = 0` becomes
//! grass, the next few solid cells become dirt, everything deeper is stone. When the cell
//! just above the chunk is solid terrain, the surface started in the chunk above and the
//! whole column is stone.
//!
//! A chunk depends only on the seed, the config and its coordinate. Neighboring chunks are
//! never read, so a chunk that is evicted and generated again comes back identical.

use log::debug;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use web_time::Instant;

use crate::engine_state::{
    config::TerrainConfig,
    voxels::{
        block::BlockKind,
        chunk::{Chunk, ChunkCoordinate, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH},
    },
};

/// Fills chunks from seeded noise. Equal seeds and configs give equal chunks.
pub struct TerrainGenerator {
    config: TerrainConfig,
    height_noise: Fbm<Perlin>,
    density_noise: Fbm<Perlin>,
}

impl TerrainGenerator {
    /// Creates a generator for `seed`.
    pub fn new(seed: u32, config: TerrainConfig) -> Self {
        let height_noise = Fbm::<Perlin>::new(seed).set_octaves(config.height_octaves);
        let density_noise = Fbm::<Perlin>::new(seed).set_octaves(config.density_octaves);

        Self {
            config,
            height_noise,
            density_noise,
        }
    }

    /// The terrain parameters.
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Height of the terrain surface of the world column at `(world_x, world_z)`.
    pub fn height_at(&self, world_x: i32, world_z: i32) -> i32 {
        let frequency = self.config.height_frequency;
        let sample = unit(
            self.height_noise
                .get([world_x as f64 / frequency, world_z as f64 / frequency]),
        );

        (sample.powf(self.config.height_exponent) * self.config.max_height as f64).floor() as i32
    }

    /// Whether the density field places matter at a world cell.
    pub fn is_dense(&self, world_x: i32, world_y: i32, world_z: i32) -> bool {
        let frequency = self.config.density_frequency;
        let sample = unit(self.density_noise.get([
            world_x as f64 / frequency,
            world_y as f64 / frequency,
            world_z as f64 / frequency,
        ]));

        sample < self.config.density_threshold
    }

    /// Whether a freshly generated chunk holds a solid block at this world cell.
    pub fn is_solid_at(&self, world_x: i32, world_y: i32, world_z: i32) -> bool {
        world_y <= self.height_at(world_x, world_z) && self.is_dense(world_x, world_y, world_z)
    }

    /// Builds the chunk at `coordinate`.
    ///
    /// # Returns
    /// A new, dirty chunk with no neighbor links.
    pub fn generate_chunk(&self, coordinate: ChunkCoordinate) -> Chunk {
        let start = Instant::now();
        let mut chunk = Chunk::new(coordinate);
        let origin = coordinate.to_world_origin();
        let above_y = origin.y + CHUNK_HEIGHT as i32;

        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_DEPTH {
                let world_x = origin.x + x as i32;
                let world_z = origin.z + z as i32;

                let height = self.height_at(world_x, world_z);
                let top = if height >= above_y {
                    CHUNK_HEIGHT as i32 - 1
                } else {
                    height - origin.y
                };

                // Same test as the bottom cell of the chunk above would get.
                let covered = height >= above_y && self.is_dense(world_x, above_y, world_z);
                let mut surface = covered.then_some(i32::MAX);

                for y in (0..=top).rev() {
                    let world_y = origin.y + y;
                    if !self.is_dense(world_x, world_y, world_z) {
                        continue;
                    }

                    let kind = match surface {
                        None if world_y >= 0 => {
                            surface = Some(y);
                            BlockKind::Grass
                        }
                        Some(first) if y > first.saturating_sub(self.config.dirt_depth) => {
                            BlockKind::Dirt
                        }
                        _ => BlockKind::Stone,
                    };
                    chunk.set(x, y as usize, z, kind);
                }
            }
        }

        debug!(
            "Generated chunk {:?} in {:?} ({} solid blocks)",
            coordinate,
            start.elapsed(),
            chunk.solid_count()
        );

        chunk
    }
}

/// Maps a noise sample from roughly `[-1, 1]` onto `[0, 1]`.
fn unit(sample: f64) -> f64 {
    (sample * 0.5 + 0.5).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::CHUNK_LAYER_SIZE;

    fn generator(seed: u32) -> TerrainGenerator {
        TerrainGenerator::new(seed, TerrainConfig::default())
    }

    fn cells(chunk: &Chunk) -> Vec<BlockKind> {
        let mut cells = Vec::with_capacity(CHUNK_LAYER_SIZE * CHUNK_HEIGHT);
        for y in 0..CHUNK_HEIGHT {
            for z in 0..CHUNK_DEPTH {
                for x in 0..CHUNK_WIDTH {
                    cells.push(chunk.get(x, y, z));
                }
            }
        }
        cells
    }

    #[test]
    fn same_seed_generates_same_chunk() {
        let coordinate = ChunkCoordinate::new(3, 0, -2);
        let a = generator(7).generate_chunk(coordinate);
        let b = generator(7).generate_chunk(coordinate);

        assert_eq!(cells(&a), cells(&b));
    }

    #[test]
    fn heights_stay_within_max_height() {
        let generator = generator(fastrand::u32(..));
        for _ in 0..500 {
            let height = generator.height_at(
                fastrand::i32(-100_000..100_000),
                fastrand::i32(-100_000..100_000),
            );
            assert!((0..=generator.config().max_height).contains(&height), "{height}");
        }
    }

    #[test]
    fn chunk_above_max_height_is_empty() {
        let chunk = generator(1).generate_chunk(ChunkCoordinate::new(0, 2, 0));
        assert_eq!(chunk.solid_count(), 0);
    }

    #[test]
    fn grass_is_never_covered_within_a_chunk() {
        let chunk = generator(3).generate_chunk(ChunkCoordinate::new(0, 0, 0));

        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_DEPTH {
                for y in 0..CHUNK_HEIGHT - 1 {
                    if chunk.get(x, y, z) == BlockKind::Grass {
                        assert_eq!(chunk.get(x, y + 1, z), BlockKind::Air, "({x}, {y}, {z})");
                    }
                }
            }
        }
    }

    fn tall_generator(seed: u32) -> TerrainGenerator {
        TerrainGenerator::new(
            seed,
            TerrainConfig {
                max_height: 400,
                height_exponent: 0.5,
                ..TerrainConfig::default()
            },
        )
    }

    #[test]
    fn is_solid_at_matches_generated_cells() {
        let generator = tall_generator(4);
        let coordinate = ChunkCoordinate::new(-1, 1, 2);
        let chunk = generator.generate_chunk(coordinate);
        let origin = coordinate.to_world_origin();

        for _ in 0..500 {
            let (x, y, z) = (
                fastrand::usize(..CHUNK_WIDTH),
                fastrand::usize(..CHUNK_HEIGHT),
                fastrand::usize(..CHUNK_DEPTH),
            );
            let expected = generator.is_solid_at(
                origin.x + x as i32,
                origin.y + y as i32,
                origin.z + z as i32,
            );
            assert_eq!(chunk.get(x, y, z).is_solid(), expected, "({x}, {y}, {z})");
        }
    }

    #[test]
    fn covered_columns_agree_with_the_chunk_above() {
        let generator = tall_generator(5);
        let below = generator.generate_chunk(ChunkCoordinate::new(1, 0, 1));
        let above = generator.generate_chunk(ChunkCoordinate::new(1, 1, 1));
        let layer = above.bottom_layer_solidity();
        let mut covered_columns = 0;

        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_DEPTH {
                let column: Vec<BlockKind> = (0..CHUNK_HEIGHT).map(|y| below.get(x, y, z)).collect();
                if layer[x + z * CHUNK_WIDTH] {
                    covered_columns += 1;
                    assert!(column
                        .iter()
                        .all(|kind| *kind == BlockKind::Air || *kind == BlockKind::Stone));
                } else if column[CHUNK_HEIGHT - 1].is_solid() {
                    assert_eq!(column[CHUNK_HEIGHT - 1], BlockKind::Grass, "({x}, {z})");
                }
            }
        }

        assert!(covered_columns > 0);
    }

    #[test]
    fn chunks_below_zero_never_start_a_surface() {
        let chunk = generator(9).generate_chunk(ChunkCoordinate::new(0, -1, 0));

        assert!(cells(&chunk)
            .into_iter()
            .all(|kind| kind == BlockKind::Air || kind == BlockKind::Stone));
    }

    #[test]
    fn surface_layer_is_grass_then_dirt() {
        let generator = generator(11);
        let chunk = generator.generate_chunk(ChunkCoordinate::new(0, 0, 0));
        let depth = generator.config().dirt_depth as usize;

        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_DEPTH {
                let Some(grass) = (0..CHUNK_HEIGHT).find(|&y| chunk.get(x, y, z) == BlockKind::Grass)
                else {
                    continue;
                };
                for y in grass.saturating_sub(depth - 1)..grass {
                    let kind = chunk.get(x, y, z);
                    assert!(kind == BlockKind::Dirt || kind == BlockKind::Air, "{kind:?}");
                }
            }
        }
    }
}
