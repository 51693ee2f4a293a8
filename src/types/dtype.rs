//! Element types for typed arrays

/// Element type of an ndarray
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ElementType {
    U8 = 0x01,
    I8 = 0x02,
    U16 = 0x03,
    I16 = 0x04,
    U32 = 0x05,
    I32 = 0x06,
    U64 = 0x07,
    I64 = 0x08,
    F32 = 0x09,
    F64 = 0x0A,
    Complex64 = 0x0B,
    Complex128 = 0x0C,
    Bool8 = 0x0D,
}

impl ElementType {
    pub const ALL: [ElementType; 13] = [
        ElementType::Bool8,
        ElementType::I8,
        ElementType::I16,
        ElementType::I32,
        ElementType::I64,
        ElementType::U8,
        ElementType::U16,
        ElementType::U32,
        ElementType::U64,
        ElementType::F32,
        ElementType::F64,
        ElementType::Complex64,
        ElementType::Complex128,
    ];

    /// Size in bytes of a single element
    pub fn element_size(self) -> usize {
        match self {
            ElementType::U8 | ElementType::I8 | ElementType::Bool8 => 1,
            ElementType::U16 | ElementType::I16 => 2,
            ElementType::U32 | ElementType::I32 | ElementType::F32 => 4,
            ElementType::U64 | ElementType::I64 | ElementType::F64 | ElementType::Complex64 => 8,
            ElementType::Complex128 => 16,
        }
    }

    /// Size in bytes of one scalar component; complex types have two
    pub fn component_size(self) -> usize {
        match self {
            ElementType::Complex64 | ElementType::Complex128 => self.element_size() / 2,
            _ => self.element_size(),
        }
    }

    /// Try to convert from u8 tag
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(ElementType::U8),
            0x02 => Some(ElementType::I8),
            0x03 => Some(ElementType::U16),
            0x04 => Some(ElementType::I16),
            0x05 => Some(ElementType::U32),
            0x06 => Some(ElementType::I32),
            0x07 => Some(ElementType::U64),
            0x08 => Some(ElementType::I64),
            0x09 => Some(ElementType::F32),
            0x0A => Some(ElementType::F64),
            0x0B => Some(ElementType::Complex64),
            0x0C => Some(ElementType::Complex128),
            0x0D => Some(ElementType::Bool8),
            _ => None,
        }
    }

    /// Name used for the `datatype` key of ndarray descriptors
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Bool8 => "bool8",
            ElementType::I8 => "int8",
            ElementType::I16 => "int16",
            ElementType::I32 => "int32",
            ElementType::I64 => "int64",
            ElementType::U8 => "uint8",
            ElementType::U16 => "uint16",
            ElementType::U32 => "uint32",
            ElementType::U64 => "uint64",
            ElementType::F32 => "float32",
            ElementType::F64 => "float64",
            ElementType::Complex64 => "complex64",
            ElementType::Complex128 => "complex128",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ElementType::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_and_names_are_bijective() {
        for t in ElementType::ALL {
            assert_eq!(ElementType::from_u8(t as u8), Some(t));
            assert_eq!(ElementType::from_name(t.name()), Some(t));
        }
        assert_eq!(ElementType::from_u8(0x00), None);
        assert_eq!(ElementType::from_name("float16"), None);
    }

    #[test]
    fn complex_is_twice_its_float_width() {
        assert_eq!(
            ElementType::Complex64.element_size(),
            2 * ElementType::F32.element_size()
        );
        assert_eq!(
            ElementType::Complex128.element_size(),
            2 * ElementType::F64.element_size()
        );
    }

    #[test]
    fn complex_components_are_floats() {
        assert_eq!(ElementType::Complex64.component_size(), 4);
        assert_eq!(ElementType::Complex128.component_size(), 8);
        assert_eq!(ElementType::I16.component_size(), 2);
    }
}
