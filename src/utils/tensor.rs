//! Tensor marshalling for the analysis engine.
//!
//! Decoded images are handed to the engine as a generic n-dimensional array:
//! a shape, an element type tag and a buffer. The buffer either borrows the
//! decoder's memory or owns a contiguous copy of it.
//!
//! Marshalling only accepts [`TensorElement`] sample types, so an image built
//! here always carries a known element type. Engine backends read the type
//! back from the context metadata with [`ElementType::from_str`], which is
//! where an unknown name surfaces as `ScanError::UnsupportedElementType`.

use crate::core::constants::NDARRAY_FORMAT;
use crate::core::errors::{ScanError, ScanResult};
use image::RgbImage;
use ndarray::ArrayView3;
use serde_json::json;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Element types the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    U8,
    I8,
    U16,
    I16,
    I32,
    F32,
    F64,
}

impl ElementType {
    /// Returns the engine name of the element type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::U8 => "uint8_t",
            ElementType::I8 => "int8_t",
            ElementType::U16 => "uint16_t",
            ElementType::I16 => "int16_t",
            ElementType::I32 => "int32_t",
            ElementType::F32 => "float",
            ElementType::F64 => "double",
        }
    }

    /// Size of one element in bytes.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            ElementType::U8 | ElementType::I8 => 1,
            ElementType::U16 | ElementType::I16 => 2,
            ElementType::I32 | ElementType::F32 => 4,
            ElementType::F64 => 8,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uint8_t" => Ok(ElementType::U8),
            "int8_t" => Ok(ElementType::I8),
            "uint16_t" => Ok(ElementType::U16),
            "int16_t" => Ok(ElementType::I16),
            "int32_t" => Ok(ElementType::I32),
            "float" => Ok(ElementType::F32),
            "double" => Ok(ElementType::F64),
            other => Err(ScanError::unsupported_element_type(other)),
        }
    }
}

/// Typed tensor storage, borrowed or owned.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData<'a> {
    U8(Cow<'a, [u8]>),
    I8(Cow<'a, [i8]>),
    U16(Cow<'a, [u16]>),
    I16(Cow<'a, [i16]>),
    I32(Cow<'a, [i32]>),
    F32(Cow<'a, [f32]>),
    F64(Cow<'a, [f64]>),
}

macro_rules! for_each_variant {
    ($data:expr, $buf:ident => $body:expr) => {
        match $data {
            TensorData::U8($buf) => $body,
            TensorData::I8($buf) => $body,
            TensorData::U16($buf) => $body,
            TensorData::I16($buf) => $body,
            TensorData::I32($buf) => $body,
            TensorData::F32($buf) => $body,
            TensorData::F64($buf) => $body,
        }
    };
}

impl TensorData<'_> {
    /// Returns the element type tag.
    pub fn element_type(&self) -> ElementType {
        match self {
            TensorData::U8(_) => ElementType::U8,
            TensorData::I8(_) => ElementType::I8,
            TensorData::U16(_) => ElementType::U16,
            TensorData::I16(_) => ElementType::I16,
            TensorData::I32(_) => ElementType::I32,
            TensorData::F32(_) => ElementType::F32,
            TensorData::F64(_) => ElementType::F64,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        for_each_variant!(self, buf => buf.len())
    }

    /// Returns true when the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true when the buffer references memory owned elsewhere.
    pub fn is_borrowed(&self) -> bool {
        for_each_variant!(self, buf => matches!(buf, Cow::Borrowed(_)))
    }
}

/// Sample types with a tensor element mapping.
pub trait TensorElement: Copy + 'static {
    /// Tag of the element type.
    const ELEMENT_TYPE: ElementType;

    /// Wraps a buffer of this element type.
    fn wrap(data: Cow<'_, [Self]>) -> TensorData<'_>;
}

macro_rules! impl_tensor_element {
    ($ty:ty, $variant:ident) => {
        impl TensorElement for $ty {
            const ELEMENT_TYPE: ElementType = ElementType::$variant;

            fn wrap(data: Cow<'_, [Self]>) -> TensorData<'_> {
                TensorData::$variant(data)
            }
        }
    };
}

impl_tensor_element!(u8, U8);
impl_tensor_element!(i8, I8);
impl_tensor_element!(u16, U16);
impl_tensor_element!(i16, I16);
impl_tensor_element!(i32, I32);
impl_tensor_element!(f32, F32);
impl_tensor_element!(f64, F64);

/// A shape, element type and buffer describing one image.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorDescriptor<'a> {
    shape: Vec<usize>,
    data: TensorData<'a>,
}

impl<'a> TensorDescriptor<'a> {
    /// Dimension sizes, spatial dimensions first and channels last.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Element type tag.
    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    /// The underlying buffer.
    pub fn data(&self) -> &TensorData<'a> {
        &self.data
    }

    /// Returns true when the descriptor shares the source buffer.
    pub fn is_borrowed(&self) -> bool {
        self.data.is_borrowed()
    }

    /// Buffer size in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len() * self.element_type().size_in_bytes()
    }

    /// Describes the tensor the way the engine context expects it.
    pub fn metadata(&self) -> serde_json::Value {
        json!({
            "format": NDARRAY_FORMAT,
            "dtype": self.element_type().as_str(),
            "shape": self.shape,
        })
    }
}

/// Marshals a `(rows, cols, channels)` pixel view into a tensor descriptor.
///
/// Contiguous views are borrowed unless `force_copy` is set; non-contiguous
/// views are always copied into a fresh row-major buffer.
pub fn to_tensor<T: TensorElement>(
    image: ArrayView3<'_, T>,
    force_copy: bool,
) -> TensorDescriptor<'_> {
    let (rows, cols, channels) = image.dim();
    let shape = vec![rows, cols, channels];

    let data = match image.to_slice() {
        Some(slice) if !force_copy => Cow::Borrowed(slice),
        _ => Cow::Owned(image.iter().copied().collect()),
    };

    TensorDescriptor {
        shape,
        data: T::wrap(data),
    }
}

/// Returns a `(height, width, 3)` view over an RGB image buffer.
pub fn rgb_view(image: &RgbImage) -> ScanResult<ArrayView3<'_, u8>> {
    let (width, height) = image.dimensions();
    let view = ArrayView3::from_shape(
        (height as usize, width as usize, 3),
        image.as_raw().as_slice(),
    )?;
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use ndarray::{Array3, s};

    #[test]
    fn test_rgb_image_shape_and_dtype() {
        let img = RgbImage::from_pixel(5, 4, Rgb([1, 2, 3]));
        let view = rgb_view(&img).unwrap();
        let tensor = to_tensor(view, false);

        assert_eq!(tensor.shape(), &[4, 5, 3]);
        assert_eq!(tensor.element_type(), ElementType::U8);
        assert_eq!(tensor.byte_len(), 60);
    }

    #[test]
    fn test_contiguous_buffer_is_shared() {
        let img = RgbImage::from_pixel(3, 2, Rgb([9, 8, 7]));
        let view = rgb_view(&img).unwrap();
        let tensor = to_tensor(view, false);

        assert!(tensor.is_borrowed());
        match tensor.data() {
            TensorData::U8(buf) => assert_eq!(buf.as_ptr(), img.as_raw().as_ptr()),
            other => panic!("unexpected buffer {other:?}"),
        }
    }

    #[test]
    fn test_force_copy_owns_buffer() {
        let img = RgbImage::from_pixel(3, 2, Rgb([9, 8, 7]));
        let view = rgb_view(&img).unwrap();
        let tensor = to_tensor(view, true);

        assert!(!tensor.is_borrowed());
        assert_eq!(tensor.data(), &TensorData::U8(Cow::Borrowed(img.as_raw().as_slice())));
    }

    #[test]
    fn test_non_contiguous_view_is_copied() {
        let source = Array3::from_shape_fn((4, 4, 1), |(r, c, _)| (r * 4 + c) as u16);
        let strided = source.slice(s![.., ..;2, ..]);
        let tensor = to_tensor(strided, false);

        assert!(!tensor.is_borrowed());
        assert_eq!(tensor.shape(), &[4, 2, 1]);
        assert_eq!(tensor.element_type(), ElementType::U16);
        let expected: Vec<u16> = vec![0, 2, 4, 6, 8, 10, 12, 14];
        assert_eq!(tensor.data(), &TensorData::U16(Cow::Owned(expected)));
    }

    #[test]
    fn test_float_buffer_tag() {
        let source = Array3::<f32>::zeros((2, 2, 3));
        let tensor = to_tensor(source.view(), false);
        assert_eq!(tensor.element_type(), ElementType::F32);
        assert_eq!(tensor.metadata()["dtype"], "float");
    }

    #[test]
    fn test_metadata_layout() {
        let img = RgbImage::new(2, 1);
        let tensor = to_tensor(rgb_view(&img).unwrap(), false);
        let meta = tensor.metadata();
        assert_eq!(meta["format"], "NDARRAY");
        assert_eq!(meta["dtype"], "uint8_t");
        assert_eq!(meta["shape"], json!([1, 2, 3]));
    }

    #[test]
    fn test_unknown_element_type_is_rejected() {
        assert_eq!("int16_t".parse::<ElementType>().unwrap(), ElementType::I16);
        let err = "uint64_t".parse::<ElementType>().unwrap_err();
        assert!(matches!(err, ScanError::UnsupportedElementType { dtype } if dtype == "uint64_t"));
    }
}
