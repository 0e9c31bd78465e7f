//! Patch vertex format.

/// One terrain vertex, 16 bytes.
///
/// Layout:
///   - `[0..12]`  position `[f32; 3]`, world space
///   - `[12..16]` colour `[u8; 4]`, RGBA
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PatchVertex {
    pub position: [f32; 3],
    pub color: [u8; 4],
}

static_assertions::assert_eq_size!(PatchVertex, [u8; 16]);

impl PatchVertex {
    pub fn new(position: glam::Vec3, color: [u8; 4]) -> Self {
        Self {
            position: position.to_array(),
            color,
        }
    }

    pub fn position(&self) -> glam::Vec3 {
        glam::Vec3::from_array(self.position)
    }
}
