/// Texture handle plus the material parameters the static shader reads every
/// time a batch using it is prepared. The two flags and the specular pair are
/// meant to be configured right after loading, before the texture is first
/// drawn; the renderer reads them each frame but nothing mutates them after
/// scene assembly.
#[derive(Debug, Clone, Copy)]
pub struct ModelTexture {
    pub id: glow::Texture,

    pub shine_damper: f32,
    pub reflectivity: f32,

    pub has_transparency: bool,
    pub use_fake_lighting: bool,
}

impl ModelTexture {
    pub fn new(id: glow::Texture) -> Self {
        Self {
            id,
            shine_damper: 1.0,
            reflectivity: 0.0,
            has_transparency: false,
            use_fake_lighting: false,
        }
    }

    /// Disables back-face culling for every batch drawn with this texture.
    pub fn set_has_transparency(&mut self, has_transparency: bool) {
        self.has_transparency = has_transparency;
    }

    /// Makes the shader ignore surface normals so flat billboard geometry
    /// (grass, ferns) reads as uniformly lit.
    pub fn set_use_fake_lighting(&mut self, use_fake_lighting: bool) {
        self.use_fake_lighting = use_fake_lighting;
    }

    pub fn set_shine_damper(&mut self, shine_damper: f32) {
        self.shine_damper = shine_damper;
    }

    pub fn set_reflectivity(&mut self, reflectivity: f32) {
        self.reflectivity = reflectivity;
    }
}

/// One of the surface textures a terrain tile blends between.
#[derive(Debug, Clone, Copy)]
pub struct TerrainTexture {
    pub id: glow::Texture,
}

impl TerrainTexture {
    pub fn new(id: glow::Texture) -> Self {
        Self { id }
    }
}

/// The four surface textures of a terrain tile. Which one shows through at a
/// given point is decided by the blend map's red/green/blue channels, with
/// the background texture filling whatever weight is left.
#[derive(Debug, Clone, Copy)]
pub struct TerrainTexturePack {
    pub background_texture: TerrainTexture,
    pub r_texture: TerrainTexture,
    pub g_texture: TerrainTexture,
    pub b_texture: TerrainTexture,
}

impl TerrainTexturePack {
    pub fn new(
        background_texture: TerrainTexture,
        r_texture: TerrainTexture,
        g_texture: TerrainTexture,
        b_texture: TerrainTexture,
    ) -> Self {
        Self {
            background_texture,
            r_texture,
            g_texture,
            b_texture,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;

    #[test]
    fn new_texture_defaults_to_opaque_real_lighting() {
        let texture = ModelTexture::new(glow::NativeTexture(NonZeroU32::new(7).unwrap()));

        assert!(!texture.has_transparency);
        assert!(!texture.use_fake_lighting);
        assert_eq!(texture.shine_damper, 1.0);
        assert_eq!(texture.reflectivity, 0.0);
    }

    #[test]
    fn setters_configure_material_parameters() {
        let mut texture = ModelTexture::new(glow::NativeTexture(NonZeroU32::new(7).unwrap()));
        texture.set_has_transparency(true);
        texture.set_use_fake_lighting(true);
        texture.set_shine_damper(10.0);
        texture.set_reflectivity(0.5);

        assert!(texture.has_transparency);
        assert!(texture.use_fake_lighting);
        assert_eq!(texture.shine_damper, 10.0);
        assert_eq!(texture.reflectivity, 0.5);
    }
}
