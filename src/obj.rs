use std::fs;
use std::path::Path;

use log::debug;

use crate::error::EngineError;

/// Flat, position-indexed attribute arrays ready for
/// [`Loader::load_to_vao`](crate::loader::Loader::load_to_vao). For a mesh
/// with `V` positions and `F` triangular faces: `vertices` is `3 * V` floats,
/// `texture_coords` is `2 * V`, `normals` is `3 * V` and `indices` is
/// `3 * F` entries, each in `[0, V)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    pub vertices: Vec<f32>,
    pub texture_coords: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
}

impl ModelData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// Reads a Wavefront `.obj` file from disk and ingests it.
pub fn load_obj_file(path: &Path) -> Result<ModelData, EngineError> {
    let source = fs::read_to_string(path).map_err(|e| EngineError::asset_load(path, e))?;
    let data = load_obj(&source)?;
    debug!(
        "ingested {:?}: {} vertices, {} indices",
        path,
        data.vertex_count(),
        data.indices.len()
    );
    Ok(data)
}

/// Ingests a Wavefront-style mesh description.
///
/// The file stores texture-coordinate and normal references per face corner,
/// in index spaces of their own, but the GPU wants one attribute set per
/// vertex. The position index is used as the shared vertex index: texture
/// coordinates and normals are scattered into slots addressed by the
/// position index of the corner that references them. A position referenced
/// by corners with differing texture or normal indices keeps whichever data
/// the last corner wrote; the format gets no vertex splitting, so meshes
/// with per-face discontinuities must be authored with duplicated positions.
///
/// Only `v`, `vt`, `vn` and triangular `f` records are interpreted; anything
/// else is skipped. `v`/`vt`/`vn` records after the first face are ignored,
/// matching the single-pass layout the format ships in.
pub fn load_obj(source: &str) -> Result<ModelData, EngineError> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut raw_texture_coords: Vec<[f32; 2]> = Vec::new();
    let mut raw_normals: Vec<[f32; 3]> = Vec::new();

    let mut indices: Vec<u32> = Vec::new();
    let mut texture_coords: Vec<f32> = Vec::new();
    let mut normals: Vec<f32> = Vec::new();
    let mut in_faces = false;

    for (line_index, line) in source.lines().enumerate() {
        let line_no = line_index + 1;
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("v") if !in_faces => positions.push(parse_floats(&mut fields, line_no)?),
            Some("vt") if !in_faces => raw_texture_coords.push(parse_floats(&mut fields, line_no)?),
            Some("vn") if !in_faces => raw_normals.push(parse_floats(&mut fields, line_no)?),
            Some("f") => {
                if !in_faces {
                    // From here on the position index doubles as the vertex
                    // index, so both scatter targets are sized off the
                    // position count.
                    in_faces = true;
                    texture_coords = vec![0.0; positions.len() * 2];
                    normals = vec![0.0; positions.len() * 3];
                }
                let mut corners = 0;
                for corner in fields.by_ref() {
                    process_corner(
                        corner,
                        line_no,
                        positions.len(),
                        &raw_texture_coords,
                        &raw_normals,
                        &mut indices,
                        &mut texture_coords,
                        &mut normals,
                    )?;
                    corners += 1;
                }
                if corners != 3 {
                    return Err(EngineError::Parse {
                        line: line_no,
                        message: format!("face has {corners} corners, expected a triangle"),
                    });
                }
            }
            _ => {}
        }
    }

    let mut vertices = Vec::with_capacity(positions.len() * 3);
    for position in &positions {
        vertices.extend_from_slice(position);
    }

    Ok(ModelData {
        vertices,
        texture_coords,
        normals,
        indices,
    })
}

/// One `pos/tex/norm` face corner: records the position index and scatters
/// the referenced texture coordinate and normal into the slots that position
/// owns. The `1 - v` flip moves the texture coordinate from the format's
/// bottom-left origin to the sampler's top-left origin.
#[allow(clippy::too_many_arguments)]
fn process_corner(
    corner: &str,
    line_no: usize,
    vertex_count: usize,
    raw_texture_coords: &[[f32; 2]],
    raw_normals: &[[f32; 3]],
    indices: &mut Vec<u32>,
    texture_coords: &mut [f32],
    normals: &mut [f32],
) -> Result<(), EngineError> {
    let mut refs = corner.split('/');
    let position_index = parse_index(refs.next(), corner, line_no)?;
    let texture_index = parse_index(refs.next(), corner, line_no)?;
    let normal_index = parse_index(refs.next(), corner, line_no)?;

    if position_index >= vertex_count {
        return Err(EngineError::MissingFaceData {
            line: line_no,
            message: format!(
                "position index {} out of range ({} positions)",
                position_index + 1,
                vertex_count
            ),
        });
    }
    indices.push(position_index as u32);

    let uv = raw_texture_coords
        .get(texture_index)
        .ok_or_else(|| EngineError::MissingFaceData {
            line: line_no,
            message: format!(
                "texture coordinate index {} out of range ({} accumulated)",
                texture_index + 1,
                raw_texture_coords.len()
            ),
        })?;
    texture_coords[position_index * 2] = uv[0];
    texture_coords[position_index * 2 + 1] = 1.0 - uv[1];

    let normal = raw_normals
        .get(normal_index)
        .ok_or_else(|| EngineError::MissingFaceData {
            line: line_no,
            message: format!(
                "normal index {} out of range ({} accumulated)",
                normal_index + 1,
                raw_normals.len()
            ),
        })?;
    normals[position_index * 3..position_index * 3 + 3].copy_from_slice(normal);

    Ok(())
}

/// Parses one 1-based face reference and converts it to 0-based.
fn parse_index(field: Option<&str>, corner: &str, line_no: usize) -> Result<usize, EngineError> {
    let field = field.filter(|f| !f.is_empty()).ok_or_else(|| EngineError::Parse {
        line: line_no,
        message: format!("face corner {corner:?} is not of the form pos/tex/norm"),
    })?;
    let index: usize = field.parse().map_err(|_| EngineError::Parse {
        line: line_no,
        message: format!("invalid index {field:?} in face corner {corner:?}"),
    })?;
    index.checked_sub(1).ok_or_else(|| EngineError::Parse {
        line: line_no,
        message: format!("index 0 in face corner {corner:?}; indices are 1-based"),
    })
}

fn parse_floats<'a, const N: usize>(
    fields: &mut impl Iterator<Item = &'a str>,
    line_no: usize,
) -> Result<[f32; N], EngineError> {
    let mut out = [0.0; N];
    for slot in &mut out {
        let field = fields.next().ok_or_else(|| EngineError::Parse {
            line: line_no,
            message: format!("record has fewer than {N} components"),
        })?;
        *slot = field.parse().map_err(|_| EngineError::Parse {
            line: line_no,
            message: format!("invalid number {field:?}"),
        })?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const SQUARE: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
";

    #[test]
    fn square_ingests_to_expected_arrays() {
        let data = load_obj(SQUARE).unwrap();

        assert_eq!(data.vertices.len(), 12);
        assert_eq!(data.texture_coords.len(), 8);
        assert_eq!(data.normals.len(), 12);
        assert_eq!(data.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(
            data.vertices,
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn array_lengths_follow_position_and_face_counts() {
        let data = load_obj(SQUARE).unwrap();
        let v = data.vertex_count();

        assert_eq!(v, 4);
        assert_eq!(data.texture_coords.len(), 2 * v);
        assert_eq!(data.normals.len(), 3 * v);
        assert_eq!(data.indices.len(), 3 * 2);
        assert!(data.indices.iter().all(|&i| (i as usize) < v));
    }

    #[test]
    fn texture_v_component_is_flipped() {
        // Corner 2 references vt 2 = (1, 0): u lands untouched, v flipped.
        let data = load_obj(SQUARE).unwrap();

        assert_relative_eq!(data.texture_coords[2], 1.0);
        assert_relative_eq!(data.texture_coords[3], 1.0);
        // vt 3 = (1, 1) lands at position 3 as (1, 0).
        assert_relative_eq!(data.texture_coords[4], 1.0);
        assert_relative_eq!(data.texture_coords[5], 0.0);
    }

    #[test]
    fn normals_scatter_to_position_slots() {
        let source = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vn 0.0 0.0 1.0
f 1/1/1 2/1/1 3/1/1
";
        let data = load_obj(source).unwrap();

        assert_eq!(data.normals, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn shared_position_keeps_last_corner_written() {
        // Position 1 is referenced twice with different texture coordinates;
        // the second reference wins. That is the format's accepted
        // limitation, kept bit-for-bit for compatibility.
        let source = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0.25 0
vt 0.75 0
vn 0 0 1
f 1/1/1 2/1/1 3/1/1
f 1/2/1 2/1/1 3/1/1
";
        let data = load_obj(source).unwrap();

        assert_relative_eq!(data.texture_coords[0], 0.75);
    }

    #[test]
    fn unrecognized_records_are_skipped() {
        let source = format!("# comment\no square\ns off\n{SQUARE}usemtl leaf\n");
        let data = load_obj(&source).unwrap();

        assert_eq!(data.indices.len(), 6);
    }

    #[test]
    fn malformed_number_is_a_parse_error() {
        let source = "v 0 zero 0\n";
        match load_obj(source) {
            Err(EngineError::Parse { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn truncated_position_record_is_a_parse_error() {
        let source = "v 0 0\n";
        assert!(matches!(load_obj(source), Err(EngineError::Parse { .. })));
    }

    #[test]
    fn non_triangular_face_is_a_parse_error() {
        let source = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vn 0 0 1
f 1/1/1 2/1/1 3/1/1 4/1/1
";
        assert!(matches!(load_obj(source), Err(EngineError::Parse { .. })));
    }

    #[test]
    fn out_of_range_texture_reference_is_missing_face_data() {
        let source = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vn 0 0 1
f 1/1/1 2/2/1 3/1/1
";
        match load_obj(source) {
            Err(EngineError::MissingFaceData { line, .. }) => assert_eq!(line, 6),
            other => panic!("expected missing face data error, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_normal_reference_is_missing_face_data() {
        let source = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vn 0 0 1
f 1/1/1 2/1/2 3/1/1
";
        assert!(matches!(
            load_obj(source),
            Err(EngineError::MissingFaceData { .. })
        ));
    }

    #[test]
    fn corner_without_normal_reference_is_a_parse_error() {
        let source = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
f 1/1 2/1 3/1
";
        assert!(matches!(load_obj(source), Err(EngineError::Parse { .. })));
    }
}
