use std::hash::{Hash, Hasher};

use crate::texture::ModelTexture;

/// Handle to a mesh that lives on the GPU: the vertex array that holds its
/// attribute and index buffers, and how many indices to draw. Created by the
/// [`Loader`](crate::loader::Loader), which stays the owner of the underlying
/// GL objects; the handle itself is freely copyable.
#[derive(Debug, Clone, Copy)]
pub struct RawModel {
    pub vao: glow::VertexArray,
    pub vertex_count: i32,
}

impl RawModel {
    pub fn new(vao: glow::VertexArray, vertex_count: i32) -> Self {
        Self { vao, vertex_count }
    }
}

/// A mesh paired with the texture it is drawn with. This is the unit of GPU
/// state the entity renderer binds once per batch, so equality and hashing
/// look at the two handles only: two `TexturedModel`s with the same VAO and
/// texture id land in the same batch no matter what material parameters the
/// texture carries.
#[derive(Debug, Clone, Copy)]
pub struct TexturedModel {
    pub raw_model: RawModel,
    pub texture: ModelTexture,
}

impl TexturedModel {
    pub fn new(raw_model: RawModel, texture: ModelTexture) -> Self {
        Self { raw_model, texture }
    }
}

impl PartialEq for TexturedModel {
    fn eq(&self, other: &Self) -> bool {
        self.raw_model.vao == other.raw_model.vao && self.texture.id == other.texture.id
    }
}

impl Eq for TexturedModel {}

impl Hash for TexturedModel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw_model.vao.hash(state);
        self.texture.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::num::NonZeroU32;

    use super::*;

    fn model(vao: u32, tex: u32) -> TexturedModel {
        TexturedModel::new(
            RawModel::new(glow::NativeVertexArray(NonZeroU32::new(vao).unwrap()), 6),
            ModelTexture::new(glow::NativeTexture(NonZeroU32::new(tex).unwrap())),
        )
    }

    #[test]
    fn equality_ignores_material_parameters() {
        let a = model(1, 1);
        let mut b = model(1, 1);
        b.texture.set_shine_damper(10.0);
        b.texture.set_reflectivity(1.0);
        b.texture.set_has_transparency(true);

        assert_eq!(a, b);
    }

    #[test]
    fn differing_handles_are_distinct_keys() {
        let mut map: HashMap<TexturedModel, u32> = HashMap::new();
        map.insert(model(1, 1), 0);
        map.insert(model(1, 2), 0);
        map.insert(model(2, 1), 0);
        map.insert(model(1, 1), 1);

        assert_eq!(map.len(), 3);
        assert_eq!(map[&model(1, 1)], 1);
    }
}
