use std::collections::HashMap;

use glam::Vec3;

use crate::{asset::parse_floats, math::color::srgb_to_linear};

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    /// `Kd`, as written in the file (sRGB).
    pub diffuse: Vec3,
    pub ambient: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
    pub opacity: f32,
    pub diffuse_map: Option<String>,
}

impl Material {
    fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diffuse: Vec3::ONE,
            ambient: Vec3::ZERO,
            specular: Vec3::ZERO,
            shininess: 30.0,
            opacity: 1.0,
            diffuse_map: None,
        }
    }

    pub fn linear_diffuse(&self) -> Vec3 {
        Vec3::new(
            srgb_to_linear(self.diffuse.x),
            srgb_to_linear(self.diffuse.y),
            srgb_to_linear(self.diffuse.z),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    materials: HashMap<String, Material>,
}

impl MaterialLibrary {
    pub fn parse(source: &str) -> anyhow::Result<Self> {
        let mut materials = HashMap::new();
        let mut current: Option<Material> = None;

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

            if statement == "newmtl" {
                let name = tokens.collect::<Vec<_>>().join(" ");
                if name.is_empty() {
                    return Err(anyhow::anyhow!("Line {line_number}: newmtl without a name"));
                }

                if let Some(previous) = current.replace(Material::named(name)) {
                    materials.insert(previous.name.clone(), previous);
                }
                continue;
            }

            let Some(material) = current.as_mut() else {
                log::warn!("Line {line_number}: {statement} outside of a material, ignoring");
                continue;
            };

            match statement {
                "Kd" => material.diffuse = parse_floats::<3>(tokens, line_number, "Kd")?.into(),
                "Ka" => material.ambient = parse_floats::<3>(tokens, line_number, "Ka")?.into(),
                "Ks" => material.specular = parse_floats::<3>(tokens, line_number, "Ks")?.into(),
                "Ns" => material.shininess = parse_floats::<1>(tokens, line_number, "Ns")?[0],
                "d" => material.opacity = parse_floats::<1>(tokens, line_number, "d")?[0],
                "Tr" => material.opacity = 1.0 - parse_floats::<1>(tokens, line_number, "Tr")?[0],
                "map_Kd" => material.diffuse_map = tokens.last().map(String::from),
                _ => {}
            }
        }

        if let Some(last) = current {
            materials.insert(last.name.clone(), last);
        }

        Ok(Self { materials })
    }

    /// Prepares the library for binding: materials are forced opaque, the
    /// model is always drawn as a solid.
    pub fn preload(&mut self) {
        for material in self.materials.values_mut() {
            if material.opacity < 1.0 {
                log::debug!("Forcing material {} to be opaque", material.name);
                material.opacity = 1.0;
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = "
# two materials
newmtl Fur
Ka 0.1 0.1 0.1
Kd 0.8 0.5 0.2
Ks 0 0 0
Ns 10
d 0.5
map_Kd textures/fur.png

newmtl Eyes
Kd 0 0 0
";

    #[test]
    fn parses_materials() {
        let library = MaterialLibrary::parse(LIBRARY).unwrap();

        assert_eq!(library.len(), 2);

        let fur = library.get("Fur").unwrap();
        assert_eq!(fur.diffuse, Vec3::new(0.8, 0.5, 0.2));
        assert_eq!(fur.ambient, Vec3::splat(0.1));
        assert_eq!(fur.shininess, 10.0);
        assert_eq!(fur.opacity, 0.5);
        assert_eq!(fur.diffuse_map.as_deref(), Some("textures/fur.png"));

        assert_eq!(library.get("Eyes").unwrap().diffuse, Vec3::ZERO);
    }

    #[test]
    fn preload_makes_materials_opaque() {
        let mut library = MaterialLibrary::parse(LIBRARY).unwrap();
        library.preload();
        assert_eq!(library.get("Fur").unwrap().opacity, 1.0);
    }

    #[test]
    fn reports_line_of_bad_number() {
        let error = MaterialLibrary::parse("newmtl A\nKd 1 x 1\n").unwrap_err();
        assert!(error.to_string().contains("Line 2"), "{error}");
    }

    #[test]
    fn reports_missing_components() {
        assert!(MaterialLibrary::parse("newmtl A\nKd 1 1\n").is_err());
    }
}
