// src/wgpu_utils/uniform_buffer.rs
//! GPU uniform buffers filled from raw bytes

/// Rounds `size` up to the next multiple of `alignment`.
pub fn align_to(size: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return size;
    }
    size.div_ceil(alignment) * alignment
}

/// Fixed-size uniform buffer
pub struct UniformBuffer {
    buffer: wgpu::Buffer,
    previous_content: Vec<u8>,
}

impl UniformBuffer {
    pub fn new(device: &wgpu::Device, size: u64, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("UniformBuffer: {label}")),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        UniformBuffer {
            buffer,
            previous_content: Vec::new(),
        }
    }

    /// Update buffer content (skips the write when nothing changed)
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: &[u8]) {
        if self.previous_content == content {
            return;
        }
        queue.write_buffer(&self.buffer, 0, content);
        self.previous_content.clear();
        self.previous_content.extend_from_slice(content);
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn size(&self) -> u64 {
        self.buffer.size()
    }
}

/// Uniform buffer holding one block per draw at a fixed stride. Draws select
/// their block with a dynamic offset.
pub struct DynamicUniformBuffer {
    buffer: wgpu::Buffer,
    label: String,
    stride: u64,
    capacity: usize,
}

impl DynamicUniformBuffer {
    pub fn new(device: &wgpu::Device, stride: u64, capacity: usize, label: &str) -> Self {
        let capacity = capacity.max(1);
        DynamicUniformBuffer {
            buffer: Self::create_buffer(device, stride, capacity, label),
            label: label.to_string(),
            stride,
            capacity,
        }
    }

    fn create_buffer(device: &wgpu::Device, stride: u64, capacity: usize, label: &str) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("DynamicUniformBuffer: {label}")),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Writes `content` from the start of the buffer. Returns true when the
    /// buffer had to be recreated, which invalidates bind groups over it.
    pub fn update_content(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, content: &[u8]) -> bool {
        let needed = (content.len() as u64).div_ceil(self.stride.max(1)) as usize;
        let grown = needed > self.capacity;
        if grown {
            self.capacity = needed.next_power_of_two();
            log::debug!(
                "growing {} to {} blocks of {} bytes",
                self.label,
                self.capacity,
                self.stride
            );
            self.buffer = Self::create_buffer(device, self.stride, self.capacity, &self.label);
        }
        if !content.is_empty() {
            queue.write_buffer(&self.buffer, 0, content);
        }
        grown
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_to() {
        assert_eq!(align_to(96, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
        assert_eq!(align_to(96, 0), 96);
    }
}
