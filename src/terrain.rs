use crate::loader::Loader;
use crate::models::RawModel;
use crate::obj::ModelData;
use crate::texture::{TerrainTexture, TerrainTexturePack};

/// World-space edge length of one terrain tile.
pub const SIZE: f32 = 800.0;
/// Vertices along one edge of a tile's grid.
const VERTEX_COUNT: usize = 128;

/// One flat terrain tile, anchored on an integer grid scaled by [`SIZE`].
/// Tiles never rotate or scale; their transform is purely the grid
/// translation. Surface detail comes from four tiled textures weighted by
/// the blend map.
#[derive(Debug, Clone, Copy)]
pub struct Terrain {
    pub x: f32,
    pub z: f32,
    pub model: RawModel,
    pub texture_pack: TerrainTexturePack,
    pub blend_map: TerrainTexture,
}

impl Terrain {
    pub fn new(
        grid_x: i32,
        grid_z: i32,
        gl: &glow::Context,
        loader: &mut Loader,
        texture_pack: TerrainTexturePack,
        blend_map: TerrainTexture,
    ) -> Self {
        let data = generate_terrain_data();
        let model = loader.load_model(gl, &data);
        Self {
            x: grid_x as f32 * SIZE,
            z: grid_z as f32 * SIZE,
            model,
            texture_pack,
            blend_map,
        }
    }
}

/// Builds the tile's flat grid: `VERTEX_COUNT` squared vertices spanning
/// `SIZE` world units, all normals up, texture coordinates covering the tile
/// once (the fragment shader re-tiles them), two triangles per grid cell.
fn generate_terrain_data() -> ModelData {
    let count = VERTEX_COUNT * VERTEX_COUNT;
    let mut vertices = Vec::with_capacity(count * 3);
    let mut normals = Vec::with_capacity(count * 3);
    let mut texture_coords = Vec::with_capacity(count * 2);

    for i in 0..VERTEX_COUNT {
        for j in 0..VERTEX_COUNT {
            let step = (VERTEX_COUNT - 1) as f32;
            vertices.push(j as f32 / step * SIZE);
            vertices.push(0.0);
            vertices.push(i as f32 / step * SIZE);
            normals.push(0.0);
            normals.push(1.0);
            normals.push(0.0);
            texture_coords.push(j as f32 / step);
            texture_coords.push(i as f32 / step);
        }
    }

    let mut indices = Vec::with_capacity(6 * (VERTEX_COUNT - 1) * (VERTEX_COUNT - 1));
    for gz in 0..VERTEX_COUNT - 1 {
        for gx in 0..VERTEX_COUNT - 1 {
            let top_left = (gz * VERTEX_COUNT + gx) as u32;
            let top_right = top_left + 1;
            let bottom_left = ((gz + 1) * VERTEX_COUNT + gx) as u32;
            let bottom_right = bottom_left + 1;
            indices.extend_from_slice(&[
                top_left,
                bottom_left,
                top_right,
                top_right,
                bottom_left,
                bottom_right,
            ]);
        }
    }

    ModelData {
        vertices,
        texture_coords,
        normals,
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_expected_array_lengths() {
        let data = generate_terrain_data();
        let count = VERTEX_COUNT * VERTEX_COUNT;

        assert_eq!(data.vertices.len(), 3 * count);
        assert_eq!(data.normals.len(), 3 * count);
        assert_eq!(data.texture_coords.len(), 2 * count);
        assert_eq!(data.indices.len(), 6 * (VERTEX_COUNT - 1) * (VERTEX_COUNT - 1));
    }

    #[test]
    fn every_index_addresses_a_grid_vertex() {
        let data = generate_terrain_data();
        let count = (VERTEX_COUNT * VERTEX_COUNT) as u32;

        assert!(data.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn grid_spans_the_tile_and_stays_flat() {
        let data = generate_terrain_data();

        let xs: Vec<f32> = data.vertices.iter().copied().step_by(3).collect();
        let ys: Vec<f32> = data.vertices.iter().copied().skip(1).step_by(3).collect();

        assert_eq!(xs.first(), Some(&0.0));
        assert_eq!(xs.last(), Some(&SIZE));
        assert!(ys.iter().all(|&y| y == 0.0));
    }

    #[test]
    fn normals_all_point_up() {
        let data = generate_terrain_data();

        for normal in data.normals.chunks_exact(3) {
            assert_eq!(normal, &[0.0, 1.0, 0.0]);
        }
    }
}
