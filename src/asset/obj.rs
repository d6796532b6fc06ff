use std::collections::HashMap;

use glam::Vec3;
use itertools::Itertools;

use crate::{
    asset::{mtl::MaterialLibrary, parse_floats},
    mesh::{MeshData, Vertex},
};

const DEFAULT_OBJECT_NAME: &str = "Default";

#[derive(Debug, Clone)]
pub struct ObjObject {
    pub name: String,
    /// One mesh per material run inside the object.
    pub meshes: Vec<MeshData>,
}

#[derive(Debug, Clone)]
pub struct ObjModel {
    pub objects: Vec<ObjObject>,
}

impl ObjModel {
    pub fn mesh_count(&self) -> usize {
        self.objects.iter().map(|object| object.meshes.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.objects
            .iter()
            .flat_map(|object| object.meshes.iter())
            .map(MeshData::triangle_count)
            .sum()
    }

    pub fn parse(source: &str, materials: &MaterialLibrary) -> anyhow::Result<Self> {
        let mut parser = ObjParser::new(materials);

        for (index, line) in source.lines().enumerate() {
            let line_number = index + 1;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let Some(statement) = tokens.next() else {
                continue;
            };

            match statement {
                "v" => {
                    let position = parse_floats::<3>(tokens, line_number, "v")?;
                    parser.positions.push(position.into());
                }
                "vn" => {
                    let normal = parse_floats::<3>(tokens, line_number, "vn")?;
                    parser.normals.push(Vec3::from(normal).normalize_or_zero());
                }
                "f" => parser.add_face(tokens, line_number)?,
                "o" | "g" => parser.start_object(tokens.join(" ")),
                "usemtl" => parser.use_material(tokens.join(" ")),
                // Texture coordinates, smoothing groups and library references
                // don't affect the solid-color model.
                "vt" | "s" | "mtllib" | "l" | "p" => {}
                other => log::debug!("Line {line_number}: ignoring unknown statement {other}"),
            }
        }

        parser.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CornerKey {
    position: usize,
    normal: Option<usize>,
}

struct MeshBuilder {
    material: Option<String>,
    color: Vec3,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    lookup: HashMap<CornerKey, u32>,
}

impl MeshBuilder {
    fn new(material: Option<String>, color: Vec3) -> Self {
        Self {
            material,
            color,
            vertices: Vec::new(),
            indices: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn shared_vertex(&mut self, key: CornerKey, position: Vec3, normal: Vec3) -> u32 {
        if let Some(&index) = self.lookup.get(&key) {
            return index;
        }

        let index = self.push_vertex(position, normal);
        self.lookup.insert(key, index);
        index
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(Vertex {
            position,
            normal,
            color: self.color,
        });
        index
    }

    fn build(self, object_name: &str) -> MeshData {
        let name = match self.material {
            Some(material) => format!("{object_name} ({material})"),
            None => object_name.to_string(),
        };

        MeshData {
            name,
            vertices: self.vertices,
            indices: self.indices,
        }
    }
}

struct ObjectBuilder {
    name: String,
    meshes: Vec<MeshBuilder>,
}

impl ObjectBuilder {
    fn has_geometry(&self) -> bool {
        self.meshes.iter().any(|mesh| !mesh.is_empty())
    }
}

struct ObjParser<'a> {
    materials: &'a MaterialLibrary,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    objects: Vec<ObjectBuilder>,
}

impl<'a> ObjParser<'a> {
    fn new(materials: &'a MaterialLibrary) -> Self {
        Self {
            materials,
            positions: Vec::new(),
            normals: Vec::new(),
            objects: vec![ObjectBuilder {
                name: DEFAULT_OBJECT_NAME.to_string(),
                meshes: vec![MeshBuilder::new(None, Vec3::ONE)],
            }],
        }
    }

    fn current_object(&mut self) -> &mut ObjectBuilder {
        // The object list is never empty, see `new`.
        let last = self.objects.len() - 1;
        &mut self.objects[last]
    }

    fn current_mesh(&mut self) -> &mut MeshBuilder {
        let object = self.current_object();
        let last = object.meshes.len() - 1;
        &mut object.meshes[last]
    }

    fn material_color(&self, name: &str) -> Vec3 {
        match self.materials.get(name) {
            Some(material) => material.linear_diffuse(),
            None => {
                log::warn!("Material {name} not found in the material library");
                Vec3::ONE
            }
        }
    }

    fn start_object(&mut self, name: String) {
        let name = if name.is_empty() {
            DEFAULT_OBJECT_NAME.to_string()
        } else {
            name
        };

        // Objects keep using the active material until the next usemtl.
        let (material, color) = {
            let mesh = self.current_mesh();
            (mesh.material.clone(), mesh.color)
        };

        let object = self.current_object();
        if !object.has_geometry() {
            object.name = name;
            return;
        }

        self.objects.push(ObjectBuilder {
            name,
            meshes: vec![MeshBuilder::new(material, color)],
        });
    }

    fn use_material(&mut self, name: String) {
        let color = self.material_color(&name);
        let object = self.current_object();

        if object.meshes.last().is_some_and(MeshBuilder::is_empty) {
            if let Some(mesh) = object.meshes.last_mut() {
                mesh.material = Some(name);
                mesh.color = color;
            }
        } else {
            object.meshes.push(MeshBuilder::new(Some(name), color));
        }
    }

    fn resolve(index: &str, len: usize, line_number: usize) -> anyhow::Result<usize> {
        let value: i64 = index
            .parse()
            .map_err(|_| anyhow::anyhow!("Line {line_number}: invalid index {index:?}"))?;

        let resolved = match value {
            0 => None,
            v if v > 0 => Some(v as usize - 1),
            v => (len as i64 + v).try_into().ok(),
        };

        match resolved {
            Some(resolved) if resolved < len => Ok(resolved),
            _ => Err(anyhow::anyhow!(
                "Line {line_number}: index {value} out of range (have {len})"
            )),
        }
    }

    fn parse_corner(&self, token: &str, line_number: usize) -> anyhow::Result<CornerKey> {
        let mut parts = token.split('/');
        let position = parts
            .next()
            .ok_or_else(|| anyhow::anyhow!("Line {line_number}: empty face corner"))?;
        let position = Self::resolve(position, self.positions.len(), line_number)?;

        // Texture coordinates are skipped.
        let _ = parts.next();

        let normal = match parts.next() {
            Some(normal) if !normal.is_empty() => {
                Some(Self::resolve(normal, self.normals.len(), line_number)?)
            }
            _ => None,
        };

        Ok(CornerKey { position, normal })
    }

    fn add_face<'t>(
        &mut self,
        tokens: impl Iterator<Item = &'t str>,
        line_number: usize,
    ) -> anyhow::Result<()> {
        let corners = tokens
            .map(|token| self.parse_corner(token, line_number))
            .collect::<anyhow::Result<Vec<_>>>()?;

        if corners.len() < 3 {
            return Err(anyhow::anyhow!(
                "Line {line_number}: face needs at least 3 corners, got {}",
                corners.len()
            ));
        }

        let first = corners[0];
        for (second, third) in corners[1..].iter().copied().tuple_windows() {
            self.add_triangle([first, second, third]);
        }

        Ok(())
    }

    fn add_triangle(&mut self, corners: [CornerKey; 3]) {
        let positions = corners.map(|corner| self.positions[corner.position]);
        let face_normal = (positions[1] - positions[0])
            .cross(positions[2] - positions[0])
            .normalize_or_zero();

        let smooth = corners.iter().all(|corner| corner.normal.is_some());
        let normals = corners.map(|corner| {
            corner
                .normal
                .map(|index| self.normals[index])
                .unwrap_or(face_normal)
        });

        let mesh = self.current_mesh();
        for ((corner, position), normal) in corners.into_iter().zip(positions).zip(normals) {
            // Corners without normals get a flat face normal and can't be shared.
            let index = if smooth {
                mesh.shared_vertex(corner, position, normal)
            } else {
                mesh.push_vertex(position, normal)
            };
            mesh.indices.push(index);
        }
    }

    fn finish(self) -> anyhow::Result<ObjModel> {
        let objects = self
            .objects
            .into_iter()
            .filter(ObjectBuilder::has_geometry)
            .map(|object| {
                let name = object.name;
                let meshes = object
                    .meshes
                    .into_iter()
                    .filter(|mesh| !mesh.is_empty())
                    .map(|mesh| mesh.build(&name))
                    .collect();
                ObjObject { name, meshes }
            })
            .collect::<Vec<_>>();

        if objects.is_empty() {
            return Err(anyhow::anyhow!("OBJ file contains no faces"));
        }

        Ok(ObjModel { objects })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> MaterialLibrary {
        MaterialLibrary::parse("newmtl Red\nKd 1 0 0\nnewmtl Blue\nKd 0 0 1\n").unwrap()
    }

    #[test]
    fn triangulates_polygons_as_fans() {
        let source = "
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v -1 1 0
f 1 2 3 4 5
";
        let model = ObjModel::parse(source, &MaterialLibrary::default()).unwrap();

        assert_eq!(model.objects.len(), 1);
        let mesh = &model.objects[0].meshes[0];
        assert_eq!(mesh.triangle_count(), 3);
        assert_eq!(mesh.vertices[mesh.indices[3] as usize].position, Vec3::ZERO);
        // Flat normals for a face in the XY plane point along +Z
        assert!(mesh
            .vertices
            .iter()
            .all(|vertex| vertex.normal.abs_diff_eq(Vec3::Z, 1e-6)));
    }

    #[test]
    fn resolves_negative_indices_and_shares_smooth_vertices() {
        let source = "
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
f -4//1 -3//1 -2//1
f 1//-1 3//-1 4//-1
";
        let model = ObjModel::parse(source, &MaterialLibrary::default()).unwrap();
        let mesh = &model.objects[0].meshes[0];

        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertices.len(), 4);
    }

    #[test]
    fn splits_meshes_by_material_and_objects() {
        let source = "
mtllib model.mtl
o Body
v 0 0 0
v 1 0 0
v 0 1 0
usemtl Red
f 1 2 3
usemtl Blue
f 3 2 1
o Tail
f 1 3 2
";
        let model = ObjModel::parse(source, &library()).unwrap();

        assert_eq!(model.objects.len(), 2);
        assert_eq!(model.objects[0].name, "Body");
        assert_eq!(model.objects[0].meshes.len(), 2);
        assert!(model.objects[0].meshes[0].vertices[0].color.abs_diff_eq(Vec3::X, 1e-5));
        assert!(model.objects[0].meshes[1].vertices[0].color.abs_diff_eq(Vec3::Z, 1e-5));

        // The tail inherits the last active material
        assert_eq!(model.objects[1].name, "Tail");
        assert!(model.objects[1].meshes[0].vertices[0].color.abs_diff_eq(Vec3::Z, 1e-5));
        assert_eq!(model.mesh_count(), 3);
        assert_eq!(model.triangle_count(), 3);
    }

    #[test]
    fn unknown_material_falls_back_to_white() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl Missing\nf 1 2 3\n";
        let model = ObjModel::parse(source, &library()).unwrap();
        assert_eq!(model.objects[0].meshes[0].vertices[0].color, Vec3::ONE);
    }

    #[test]
    fn rejects_out_of_range_index() {
        let error = ObjModel::parse("v 0 0 0\nf 1 2 3\n", &MaterialLibrary::default()).unwrap_err();
        assert!(error.to_string().contains("Line 2"), "{error}");
    }

    #[test]
    fn rejects_models_without_faces() {
        assert!(ObjModel::parse("v 0 0 0\n", &MaterialLibrary::default()).is_err());
    }
}
