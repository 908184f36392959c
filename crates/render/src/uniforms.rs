use glam::{Mat4, Vec3, Vec4};
use std::collections::HashSet;

/// Round `value` up to the next multiple of `alignment` (a power of two).
pub const fn align_to(value: usize, alignment: usize) -> usize {
    (value + alignment - 1) & !(alignment - 1)
}

/// Value types a uniform field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformType {
    Float,
    Vec3,
    Vec4,
    Mat4,
}

impl UniformType {
    /// Byte size in the uniform address space.
    pub const fn size(self) -> usize {
        match self {
            Self::Float => 4,
            Self::Vec3 => 12,
            Self::Vec4 => 16,
            Self::Mat4 => 64,
        }
    }

    /// Required byte alignment in the uniform address space.
    pub const fn align(self) -> usize {
        match self {
            Self::Float => 4,
            Self::Vec3 | Self::Vec4 | Self::Mat4 => 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformField {
    pub name: String,
    pub ty: UniformType,
    pub offset: usize,
}

/// Named fields of one uniform struct, laid out with WGSL alignment rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformLayout {
    fields: Vec<UniformField>,
    size: usize,
}

impl UniformLayout {
    /// Lay out fields in declaration order, matching the shader's struct.
    pub fn new(fields: &[(&str, UniformType)]) -> Self {
        let mut cursor = 0;
        let fields = fields
            .iter()
            .map(|&(name, ty)| {
                let offset = align_to(cursor, ty.align());
                cursor = offset + ty.size();
                UniformField {
                    name: name.to_owned(),
                    ty,
                    offset,
                }
            })
            .collect();
        Self {
            fields,
            size: align_to(cursor.max(1), 16),
        }
    }

    /// `projection`, `view`, `model` and `normal`, as declared by the
    /// model-loading shader.
    pub fn model_loading() -> Self {
        Self::new(&[
            ("projection", UniformType::Mat4),
            ("view", UniformType::Mat4),
            ("model", UniformType::Mat4),
            ("normal", UniformType::Mat4),
        ])
    }

    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    /// Struct size in bytes, padded to 16.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// CPU copy of a uniform struct, written field by field through its layout.
///
/// Writes to unknown names or with the wrong type are ignored; each offending
/// name is logged once.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    layout: UniformLayout,
    bytes: Vec<u8>,
    warned: HashSet<String>,
}

impl UniformBlock {
    pub fn new(layout: UniformLayout) -> Self {
        let bytes = vec![0; layout.size()];
        Self {
            layout,
            bytes,
            warned: HashSet::new(),
        }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.write(name, UniformType::Float, bytemuck::bytes_of(&value));
    }

    pub fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.write(name, UniformType::Vec3, bytemuck::cast_slice(&value.to_array()));
    }

    pub fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.write(name, UniformType::Vec4, bytemuck::cast_slice(&value.to_array()));
    }

    pub fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.write(
            name,
            UniformType::Mat4,
            bytemuck::cast_slice(&value.to_cols_array()),
        );
    }

    /// Read a matrix back, column-major.
    pub fn get_mat4(&self, name: &str) -> Option<Mat4> {
        let field = self.layout.field(name)?;
        if field.ty != UniformType::Mat4 {
            return None;
        }
        let raw = &self.bytes[field.offset..field.offset + UniformType::Mat4.size()];
        let cols: [f32; 16] = bytemuck::pod_read_unaligned(raw);
        Some(Mat4::from_cols_array(&cols))
    }

    pub fn get_float(&self, name: &str) -> Option<f32> {
        let field = self.layout.field(name)?;
        if field.ty != UniformType::Float {
            return None;
        }
        Some(bytemuck::pod_read_unaligned(
            &self.bytes[field.offset..field.offset + 4],
        ))
    }

    fn write(&mut self, name: &str, ty: UniformType, data: &[u8]) {
        let Some(field) = self.layout.field(name) else {
            self.warn_once(name, || format!("no uniform named '{name}'"));
            return;
        };
        if field.ty != ty {
            let expected = field.ty;
            self.warn_once(name, || {
                format!("uniform '{name}' is {expected:?}, ignoring {ty:?} write")
            });
            return;
        }
        let offset = field.offset;
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
    }

    fn warn_once(&mut self, name: &str, message: impl FnOnce() -> String) {
        if self.warned.insert(name.to_owned()) {
            tracing::warn!("{}", message());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_rounds_up() {
        assert_eq!(align_to(0, 16), 0);
        assert_eq!(align_to(1, 16), 16);
        assert_eq!(align_to(192, 256), 256);
        assert_eq!(align_to(256, 256), 256);
    }

    #[test]
    fn matrices_pack_back_to_back() {
        let layout = UniformLayout::model_loading();
        let offsets: Vec<_> = layout.fields().iter().map(|f| f.offset).collect();
        assert_eq!(offsets, [0, 64, 128, 192]);
        assert_eq!(layout.size(), 256);
    }

    #[test]
    fn scalar_fills_vec3_padding() {
        let layout = UniformLayout::new(&[
            ("a", UniformType::Float),
            ("b", UniformType::Vec3),
            ("c", UniformType::Float),
            ("d", UniformType::Vec4),
        ]);
        let offsets: Vec<_> = layout.fields().iter().map(|f| f.offset).collect();
        assert_eq!(offsets, [0, 16, 28, 32]);
        assert_eq!(layout.size(), 48);
    }

    #[test]
    fn trailing_scalar_pads_struct() {
        let layout = UniformLayout::new(&[("t", UniformType::Float)]);
        assert_eq!(layout.size(), 16);
    }

    #[test]
    fn set_and_read_back_matrix() {
        let mut block = UniformBlock::new(UniformLayout::model_loading());
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        block.set_mat4("view", m);
        assert_eq!(block.get_mat4("view"), Some(m));
        assert_eq!(block.get_mat4("projection"), Some(Mat4::ZERO));
        let raw = &block.as_bytes()[64 + 48..64 + 60];
        assert_eq!(bytemuck::pod_read_unaligned::<[f32; 3]>(raw), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn unknown_name_is_ignored() {
        let mut block = UniformBlock::new(UniformLayout::model_loading());
        let before = block.as_bytes().to_vec();
        block.set_mat4("normal_matrix", Mat4::IDENTITY);
        block.set_mat4("normal_matrix", Mat4::IDENTITY);
        assert_eq!(block.as_bytes(), &before[..]);
        assert_eq!(block.warned.len(), 1);
    }

    #[test]
    fn type_mismatch_is_ignored() {
        let mut block = UniformBlock::new(UniformLayout::new(&[
            ("time", UniformType::Float),
            ("tint", UniformType::Vec4),
        ]));
        block.set_vec3("time", Vec3::ONE);
        assert_eq!(block.get_float("time"), Some(0.0));
        block.set_float("time", 2.5);
        assert_eq!(block.get_float("time"), Some(2.5));
        block.set_vec4("tint", Vec4::new(1.0, 0.5, 0.25, 1.0));
        assert_eq!(
            bytemuck::pod_read_unaligned::<[f32; 4]>(&block.as_bytes()[16..32]),
            [1.0, 0.5, 0.25, 1.0]
        );
    }
}
