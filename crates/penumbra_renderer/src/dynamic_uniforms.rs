use std::marker::PhantomData;

use bytemuck::Pod;

pub fn align_to(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

/// Smallest power-of-two multiple of `current` that holds `required` slots.
pub fn grown_capacity(current: u32, required: u32) -> u32 {
    let mut capacity = current.max(1);
    while capacity < required {
        capacity = capacity.saturating_mul(2);
    }
    capacity
}

/// One uniform buffer holding many `T` slots, each selected at draw time by a
/// dynamic offset. Values are staged on the CPU and uploaded in one write, so
/// a pass never overwrites a slot an earlier draw still reads.
pub struct DynamicUniformBuffer<T: Pod> {
    label: &'static str,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u32,
    capacity: u32,
    staging: Vec<u8>,
    marker: PhantomData<T>,
}

impl<T: Pod> DynamicUniformBuffer<T> {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &'static str,
    ) -> Self {
        let min_alignment = device.limits().min_uniform_buffer_offset_alignment.max(1);
        let stride = align_to(size_of::<T>() as u32, min_alignment);
        let capacity = 1;
        let buffer = Self::create_buffer(device, label, stride, capacity);
        let bind_group = Self::create_bind_group(device, layout, label, &buffer);

        Self {
            label,
            buffer,
            bind_group,
            stride,
            capacity,
            staging: Vec::new(),
            marker: PhantomData,
        }
    }

    fn create_buffer(device: &wgpu::Device, label: &str, stride: u32, capacity: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: u64::from(stride) * u64::from(capacity),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size_of::<T>() as u64),
                }),
            }],
        })
    }

    pub fn clear(&mut self) {
        self.staging.clear();
    }

    /// Stages `value` and returns the dynamic offset to bind it with.
    pub fn push(&mut self, value: &T) -> u32 {
        let offset = self.staging.len() as u32;
        self.staging.extend_from_slice(bytemuck::bytes_of(value));
        self.staging.resize((offset + self.stride) as usize, 0);
        offset
    }

    pub fn len(&self) -> u32 {
        self.staging.len() as u32 / self.stride
    }

    pub fn is_empty(&self) -> bool {
        self.staging.is_empty()
    }

    /// Grows the GPU buffer if needed and writes every staged slot.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, layout: &wgpu::BindGroupLayout) {
        let required = self.len();
        if required > self.capacity {
            self.capacity = grown_capacity(self.capacity, required);
            self.buffer = Self::create_buffer(device, self.label, self.stride, self.capacity);
            self.bind_group = Self::create_bind_group(device, layout, self.label, &self.buffer);
            log::debug!("{} grown to {} slots", self.label, self.capacity);
        }

        if !self.staging.is_empty() {
            queue.write_buffer(&self.buffer, 0, &self.staging);
        }
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_rounds_up() {
        assert_eq!(align_to(128, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(80, 16), 80);
    }

    #[test]
    fn capacity_doubles() {
        assert_eq!(grown_capacity(1, 1), 1);
        assert_eq!(grown_capacity(1, 7), 8);
        assert_eq!(grown_capacity(8, 9), 16);
        assert_eq!(grown_capacity(0, 3), 4);
    }
}
