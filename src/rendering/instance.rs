use std::mem::offset_of;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use wgpu::BufferUsages;

use crate::{background::Particle, scene_graph::MeshInstance};

/// Per-marker data for the particle field.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleInstance {
    pub model: Mat4,
    pub color: Vec4,
}

impl From<&Particle> for ParticleInstance {
    fn from(particle: &Particle) -> Self {
        Self {
            model: particle.model_matrix(),
            color: particle.color.extend(1.0),
        }
    }
}

/// Per-node data for the model viewer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MeshInstanceData {
    pub model: Mat4,
    /// x: receives shadows
    pub flags: Vec4,
}

impl From<&MeshInstance> for MeshInstanceData {
    fn from(instance: &MeshInstance) -> Self {
        let receive_shadow = if instance.receive_shadow { 1.0 } else { 0.0 };

        Self {
            model: instance.world_matrix,
            flags: Vec4::new(receive_shadow, 0.0, 0.0, 0.0),
        }
    }
}

// Both instance types put the model matrix in locations 5-8 and one extra
// vec4 in location 9.
const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    5 => Float32x4,
    6 => Float32x4,
    7 => Float32x4,
    8 => Float32x4,
    9 => Float32x4
];

const _: () = assert!(offset_of!(ParticleInstance, color) == 64);
const _: () = assert!(offset_of!(MeshInstanceData, flags) == 64);

pub const PARTICLE_INSTANCE_VBL: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<ParticleInstance>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &INSTANCE_ATTRIBUTES,
};

pub const MESH_INSTANCE_VBL: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<MeshInstanceData>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &INSTANCE_ATTRIBUTES,
};

/// Vertex buffer of `T` instances that grows when more are written than fit.
pub struct InstanceBuffer<T> {
    buffer: wgpu::Buffer,
    capacity: usize,
    len: usize,
    label: &'static str,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Pod> InstanceBuffer<T> {
    pub fn new(device: &wgpu::Device, label: &'static str, capacity: usize) -> Self {
        let capacity = capacity.max(1);

        Self {
            buffer: Self::create_buffer(device, label, capacity),
            capacity,
            len: 0,
            label,
            _marker: std::marker::PhantomData,
        }
    }

    fn create_buffer(device: &wgpu::Device, label: &str, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (std::mem::size_of::<T>() * capacity) as u64,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &[T]) {
        if instances.len() > self.capacity {
            self.capacity = instances.len().next_power_of_two();
            self.buffer = Self::create_buffer(device, self.label, self.capacity);
            log::debug!("Grew {} to {} instances", self.label, self.capacity);
        }

        self.len = instances.len();

        if !instances.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(instances));
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(1, self.buffer.slice(..));
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::*;
    use crate::scene_graph::{Object3D, Scene, SceneMesh};

    #[test]
    fn mesh_instance_carries_world_matrix_and_shadow_flag() {
        let mut scene = Scene::new();
        let mesh_id = scene.add_mesh(SceneMesh::new(crate::mesh::MeshData::uv_sphere(1.0, 3, 2)));
        let object_id = scene.add_object(Object3D::mesh("Sphere", mesh_id));
        {
            let object = scene.get_object_mut(object_id).unwrap();
            object.receive_shadow = true;
            object.transform.set_translation(Vec3::new(1.0, 2.0, 3.0));
            object.transform.set_rotation(Quat::IDENTITY);
        }
        scene.update_world_matrices();

        let instance = scene.mesh_instances().next().unwrap();
        let data = MeshInstanceData::from(&instance);

        assert_eq!(data.flags.x, 1.0);
        assert_eq!(data.model.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn instance_layouts_match_struct_sizes() {
        assert_eq!(PARTICLE_INSTANCE_VBL.array_stride, 80);
        assert_eq!(MESH_INSTANCE_VBL.array_stride, 80);
    }
}
