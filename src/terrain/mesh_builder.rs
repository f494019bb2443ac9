use glam::{Vec2, Vec3};

use crate::terrain::height_curve::HeightCurve;
use crate::terrain::height_field::HeightField;

/// Inputs to mesh construction that do not vary per LOD.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshParams {
    pub height_multiplier: f32,
    pub height_curve: HeightCurve,
    pub flat_shading: bool,
}

impl Default for MeshParams {
    fn default() -> Self {
        MeshParams {
            height_multiplier: 30.0,
            height_curve: HeightCurve::linear(),
            flat_shading: false,
        }
    }
}

/// Renderable geometry for one (tile, LOD). Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainMesh {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
    pub normals: Vec<Vec3>,
}

impl TerrainMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Simplification step for a LOD level: every `stride`-th sample survives.
pub fn lod_stride(lod: u32) -> usize {
    if lod == 0 {
        1
    } else {
        2 * lod as usize
    }
}

// A vertex lives in one of two arenas. Interior vertices are part of the
// drawn surface; border vertices come from the outermost ring of the bordered
// grid and only ever feed normal accumulation, so interior vertices on a
// tile's edge see the same neighborhood the adjacent tile computes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VertexRef {
    Interior(u32),
    Border(u32),
}

struct MeshScratch {
    positions: Vec<Vec3>,
    uvs: Vec<Vec2>,
    border_positions: Vec<Vec3>,
    // Triangles whose corners are all interior; these become the index list.
    triangles: Vec<[u32; 3]>,
    // Triangles touching the border ring; normals only.
    border_triangles: Vec<[VertexRef; 3]>,
}

impl MeshScratch {
    fn with_capacity(verts_per_line: usize) -> MeshScratch {
        let interior = verts_per_line * verts_per_line;
        MeshScratch {
            positions: vec![Vec3::ZERO; interior],
            uvs: vec![Vec2::ZERO; interior],
            border_positions: vec![Vec3::ZERO; verts_per_line * 4 + 4],
            triangles: Vec::with_capacity((verts_per_line - 1) * (verts_per_line - 1) * 2),
            border_triangles: Vec::with_capacity(verts_per_line * 8),
        }
    }

    fn add_vertex(&mut self, vref: VertexRef, position: Vec3, uv: Vec2) {
        match vref {
            VertexRef::Interior(i) => {
                self.positions[i as usize] = position;
                self.uvs[i as usize] = uv;
            }
            VertexRef::Border(i) => {
                self.border_positions[i as usize] = position;
            }
        }
    }

    fn add_triangle(&mut self, a: VertexRef, b: VertexRef, c: VertexRef) {
        match (a, b, c) {
            (VertexRef::Interior(a), VertexRef::Interior(b), VertexRef::Interior(c)) => {
                self.triangles.push([a, b, c]);
            }
            _ => self.border_triangles.push([a, b, c]),
        }
    }

    fn position(&self, vref: VertexRef) -> Vec3 {
        match vref {
            VertexRef::Interior(i) => self.positions[i as usize],
            VertexRef::Border(i) => self.border_positions[i as usize],
        }
    }

    // Accumulate every triangle's face normal into its interior corners,
    // border triangles included, then normalize. Border vertices contribute
    // but never receive a normal of their own.
    fn smooth_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in &self.triangles {
            let normal = face_normal(
                self.positions[tri[0] as usize],
                self.positions[tri[1] as usize],
                self.positions[tri[2] as usize],
            );
            for &corner in tri {
                normals[corner as usize] += normal;
            }
        }
        for tri in &self.border_triangles {
            let normal = face_normal(
                self.position(tri[0]),
                self.position(tri[1]),
                self.position(tri[2]),
            );
            for &corner in tri {
                if let VertexRef::Interior(i) = corner {
                    normals[i as usize] += normal;
                }
            }
        }
        for normal in &mut normals {
            *normal = normal.normalize_or_zero();
            if *normal == Vec3::ZERO {
                *normal = Vec3::Y;
            }
        }
        normals
    }

    fn into_smooth_mesh(self) -> TerrainMesh {
        let normals = self.smooth_normals();
        let mut indices = Vec::with_capacity(self.triangles.len() * 3);
        for tri in &self.triangles {
            indices.extend_from_slice(tri);
        }
        TerrainMesh {
            positions: self.positions,
            uvs: self.uvs,
            indices,
            normals,
        }
    }

    // Flat shading duplicates every triangle's corners so each triangle gets
    // its own face normal; border triangles are dropped since shared-edge
    // normal continuity no longer applies.
    fn into_flat_mesh(self) -> TerrainMesh {
        let count = self.triangles.len() * 3;
        let mut positions = Vec::with_capacity(count);
        let mut uvs = Vec::with_capacity(count);
        let mut normals = Vec::with_capacity(count);
        let mut indices = Vec::with_capacity(count);
        for tri in &self.triangles {
            let a = self.positions[tri[0] as usize];
            let b = self.positions[tri[1] as usize];
            let c = self.positions[tri[2] as usize];
            let normal = face_normal(a, b, c);
            for (&corner, position) in tri.iter().zip([a, b, c]) {
                indices.push(positions.len() as u32);
                positions.push(position);
                uvs.push(self.uvs[corner as usize]);
                normals.push(normal);
            }
        }
        TerrainMesh {
            positions,
            uvs,
            indices,
            normals,
        }
    }
}

fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

/// Build the simplified mesh for one LOD of a tile.
///
/// The bordered grid is walked at the LOD stride; the outermost ring becomes
/// border vertices, everything else is densely indexed interior. Quads are
/// split along a fixed diagonal, `(a,d,c)` and `(d,a,b)` with the corners in
/// row-major order, so winding matches across every LOD. The caller is
/// responsible for having validated that the stride divides the grid (config
/// validation does this); an uneven stride would drop the far border ring.
pub fn build_terrain_mesh(field: &HeightField, params: &MeshParams, lod: u32) -> TerrainMesh {
    let stride = lod_stride(lod);
    let bordered = field.bordered_size();
    let mesh_size = bordered - 2 * stride;
    let mesh_size_unsimplified = bordered - 2;
    let top_left_x = (mesh_size_unsimplified - 1) as f32 / -2.0;
    let top_left_z = (mesh_size_unsimplified - 1) as f32 / 2.0;
    let verts_per_line = (mesh_size - 1) / stride + 1;

    // First pass: assign every visited grid point to an arena slot.
    let mut index_map: Vec<Option<VertexRef>> = vec![None; bordered * bordered];
    let mut interior_index = 0u32;
    let mut border_index = 0u32;
    for y in (0..bordered).step_by(stride) {
        for x in (0..bordered).step_by(stride) {
            let is_border = x == 0 || y == 0 || x == bordered - 1 || y == bordered - 1;
            let vref = if is_border {
                let v = VertexRef::Border(border_index);
                border_index += 1;
                v
            } else {
                let v = VertexRef::Interior(interior_index);
                interior_index += 1;
                v
            };
            index_map[y * bordered + x] = Some(vref);
        }
    }

    let mut scratch = MeshScratch::with_capacity(verts_per_line);
    let at = |map: &[Option<VertexRef>], x: usize, y: usize| -> VertexRef {
        // Only visited points are ever read; the stride walk guarantees that.
        map[y * bordered + x].unwrap_or(VertexRef::Border(0))
    };

    // Second pass: place vertices and emit the two triangles of each quad.
    for y in (0..bordered).step_by(stride) {
        for x in (0..bordered).step_by(stride) {
            let vref = at(&index_map, x, y);

            let percent = Vec2::new(
                (x as f32 - stride as f32) / mesh_size as f32,
                (y as f32 - stride as f32) / mesh_size as f32,
            );
            let height = params.height_curve.evaluate(field.sample(x, y)) * params.height_multiplier;
            let position = Vec3::new(
                top_left_x + percent.x * mesh_size_unsimplified as f32,
                height,
                top_left_z - percent.y * mesh_size_unsimplified as f32,
            );
            scratch.add_vertex(vref, position, percent);

            if x < bordered - 1 && y < bordered - 1 {
                let a = at(&index_map, x, y);
                let b = at(&index_map, x + stride, y);
                let c = at(&index_map, x, y + stride);
                let d = at(&index_map, x + stride, y + stride);
                scratch.add_triangle(a, d, c);
                scratch.add_triangle(d, a, b);
            }
        }
    }

    if params.flat_shading {
        scratch.into_flat_mesh()
    } else {
        scratch.into_smooth_mesh()
    }
}
