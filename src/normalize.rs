//! Frame normalization: crop, square-pad, resize, scale.

use crate::config::{Normalization, ResizeFilter, TensorLayout, VariantConfig};
use crate::constants::{CHANNELS, imagenet};
use crate::error::FrameError;
use crate::frame::Frame;
use crate::localize::BoundingBox;
use image::RgbImage;
use image::imageops::{self, FilterType};

/// Fixed-shape float tensor ready for the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor {
    layout: TensorLayout,
    size: usize,
    data: Vec<f32>,
}

impl NormalizedTensor {
    /// Build a tensor from raw parts, checking the element count.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Normalization`] if `data` does not hold
    /// exactly `size * size * 3` values.
    pub fn from_parts(
        layout: TensorLayout,
        size: usize,
        data: Vec<f32>,
    ) -> Result<Self, FrameError> {
        let expected = size * size * CHANNELS;
        if data.len() != expected {
            return Err(FrameError::Normalization {
                reason: format!("tensor holds {} values, expected {expected}", data.len()),
            });
        }
        Ok(Self { layout, size, data })
    }

    /// Batch-of-one shape in the tensor's layout.
    pub fn shape(&self) -> [usize; 4] {
        match self.layout {
            TensorLayout::Nhwc => [1, self.size, self.size, CHANNELS],
            TensorLayout::Nchw => [1, CHANNELS, self.size, self.size],
        }
    }

    /// Memory layout.
    pub fn layout(&self) -> TensorLayout {
        self.layout
    }

    /// Flat tensor values.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Consume the tensor, returning its values.
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }
}

/// The preprocessing contract of one classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Square output resolution.
    pub input_size: u32,
    /// Pixel scaling.
    pub normalization: Normalization,
    /// Output memory layout.
    pub layout: TensorLayout,
    /// Resize filter.
    pub filter: ResizeFilter,
}

impl NormalizeOptions {
    /// Take the preprocessing contract from a variant.
    pub fn from_variant(variant: &VariantConfig) -> Self {
        Self {
            input_size: variant.input_size,
            normalization: variant.normalization,
            layout: variant.layout,
            filter: variant.resize_filter,
        }
    }

    /// Shape the classifier receives.
    pub fn tensor_shape(&self) -> [usize; 4] {
        let size = self.input_size as usize;
        match self.layout {
            TensorLayout::Nhwc => [1, size, size, CHANNELS],
            TensorLayout::Nchw => [1, CHANNELS, size, size],
        }
    }
}

/// Normalize a frame, optionally cropped to a hand box.
///
/// # Errors
///
/// Returns [`FrameError::Normalization`] when the crop is empty or the
/// resulting tensor does not match `options.input_size`.
pub fn normalize(
    frame: &Frame,
    bbox: Option<BoundingBox>,
    options: &NormalizeOptions,
) -> Result<NormalizedTensor, FrameError> {
    let cropped = match bbox {
        Some(bbox) => crop_to_box(frame.image(), bbox)?,
        None => frame.image().clone(),
    };
    let square = squarify(&cropped);
    let resized = resize_square(square, options.input_size, options.filter);

    if resized.dimensions() != (options.input_size, options.input_size) {
        return Err(FrameError::Normalization {
            reason: format!(
                "resized to {:?}, expected {}x{}",
                resized.dimensions(),
                options.input_size,
                options.input_size
            ),
        });
    }

    let data = scale_pixels(&resized, options.normalization, options.layout);
    NormalizedTensor::from_parts(options.layout, options.input_size as usize, data)
}

/// Crop an image to a bounding box.
fn crop_to_box(image: &RgbImage, bbox: BoundingBox) -> Result<RgbImage, FrameError> {
    let bbox = bbox.clamp_to(image.width(), image.height());
    if bbox.is_empty() {
        return Err(FrameError::Normalization {
            reason: format!("empty crop {bbox:?}"),
        });
    }
    Ok(imageops::crop_imm(image, bbox.xmin, bbox.ymin, bbox.width(), bbox.height()).to_image())
}

/// Center an image on a black square canvas sized to its longer side.
///
/// Square inputs come back unchanged.
pub fn squarify(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == height {
        return image.clone();
    }

    let side = width.max(height);
    let mut canvas = RgbImage::new(side, side);
    let x = (side - width) / 2;
    let y = (side - height) / 2;
    imageops::overlay(&mut canvas, image, i64::from(x), i64::from(y));
    canvas
}

fn resize_square(image: RgbImage, size: u32, filter: ResizeFilter) -> RgbImage {
    if image.dimensions() == (size, size) {
        return image;
    }
    imageops::resize(&image, size, size, filter_type(filter))
}

fn filter_type(filter: ResizeFilter) -> FilterType {
    match filter {
        ResizeFilter::Nearest => FilterType::Nearest,
        ResizeFilter::Triangle => FilterType::Triangle,
        ResizeFilter::CatmullRom => FilterType::CatmullRom,
        ResizeFilter::Lanczos3 => FilterType::Lanczos3,
    }
}

/// Scale 8-bit pixels into floats and lay them out.
fn scale_pixels(image: &RgbImage, normalization: Normalization, layout: TensorLayout) -> Vec<f32> {
    let (width, height) = image.dimensions();
    let plane = width as usize * height as usize;
    let mut data = vec![0.0f32; plane * CHANNELS];

    for (x, y, pixel) in image.enumerate_pixels() {
        let offset = y as usize * width as usize + x as usize;
        for (c, &value) in pixel.0.iter().enumerate() {
            let scaled = f32::from(value) / 255.0;
            let scaled = match normalization {
                Normalization::Unit => scaled,
                Normalization::Imagenet => (scaled - imagenet::MEAN[c]) / imagenet::STD[c],
            };
            let index = match layout {
                TensorLayout::Nhwc => offset * CHANNELS + c,
                TensorLayout::Nchw => c * plane + offset,
            };
            data[index] = scaled;
        }
    }

    data
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use image::Rgb;

    fn options(size: u32, normalization: Normalization, layout: TensorLayout) -> NormalizeOptions {
        NormalizeOptions {
            input_size: size,
            normalization,
            layout,
            filter: ResizeFilter::Triangle,
        }
    }

    #[test]
    fn test_squarify_square_is_noop() {
        let img = RgbImage::from_fn(5, 5, |x, y| Rgb([x as u8, y as u8, 7]));
        assert_eq!(squarify(&img), img);
    }

    #[test]
    fn test_squarify_wide_image_pads_top_and_bottom() {
        let img = RgbImage::from_pixel(6, 2, Rgb([255, 255, 255]));
        let square = squarify(&img);
        assert_eq!(square.dimensions(), (6, 6));
        // (6 - 2) / 2 = 2 rows of black above.
        assert_eq!(square.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(square.get_pixel(0, 1), &Rgb([0, 0, 0]));
        assert_eq!(square.get_pixel(0, 2), &Rgb([255, 255, 255]));
        assert_eq!(square.get_pixel(5, 3), &Rgb([255, 255, 255]));
        assert_eq!(square.get_pixel(0, 4), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_squarify_tall_odd_padding() {
        let img = RgbImage::from_pixel(2, 5, Rgb([9, 9, 9]));
        let square = squarify(&img);
        assert_eq!(square.dimensions(), (5, 5));
        // (5 - 2) / 2 = 1 column on the left, 2 on the right.
        assert_eq!(square.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(square.get_pixel(1, 0), &Rgb([9, 9, 9]));
        assert_eq!(square.get_pixel(2, 4), &Rgb([9, 9, 9]));
        assert_eq!(square.get_pixel(3, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_output_shape_independent_of_aspect_ratio() {
        let opts = options(32, Normalization::Unit, TensorLayout::Nhwc);
        for (w, h) in [(32, 32), (100, 10), (7, 90), (1, 1), (229, 229)] {
            let frame = Frame::new(RgbImage::new(w, h));
            let tensor = normalize(&frame, None, &opts).unwrap();
            assert_eq!(tensor.shape(), [1, 32, 32, 3]);
            assert_eq!(tensor.data().len(), 32 * 32 * 3);
        }
    }

    #[test]
    fn test_unit_scaling_range() {
        let frame = Frame::new(RgbImage::from_pixel(4, 4, Rgb([255, 0, 51])));
        let tensor = normalize(
            &frame,
            None,
            &options(4, Normalization::Unit, TensorLayout::Nhwc),
        )
        .unwrap();
        assert_eq!(&tensor.data()[..3], &[1.0, 0.0, 0.2]);
    }

    #[test]
    fn test_imagenet_standardization() {
        let frame = Frame::new(RgbImage::new(2, 2));
        let tensor = normalize(
            &frame,
            None,
            &options(2, Normalization::Imagenet, TensorLayout::Nhwc),
        )
        .unwrap();
        let expected = -imagenet::MEAN[0] / imagenet::STD[0];
        assert!((tensor.data()[0] - expected).abs() < 1e-6);
        let expected_blue = -imagenet::MEAN[2] / imagenet::STD[2];
        assert!((tensor.data()[2] - expected_blue).abs() < 1e-6);
    }

    #[test]
    fn test_nchw_layout_groups_channels() {
        let frame = Frame::new(RgbImage::from_pixel(2, 2, Rgb([255, 0, 0])));
        let tensor = normalize(
            &frame,
            None,
            &options(2, Normalization::Unit, TensorLayout::Nchw),
        )
        .unwrap();
        assert_eq!(tensor.shape(), [1, 3, 2, 2]);
        assert_eq!(&tensor.data()[..4], &[1.0; 4]);
        assert_eq!(&tensor.data()[4..], &[0.0; 8]);
    }

    #[test]
    fn test_crop_to_box() {
        let mut img = RgbImage::new(10, 10);
        img.put_pixel(6, 3, Rgb([200, 100, 50]));
        let frame = Frame::new(img);
        let bbox = BoundingBox {
            xmin: 6,
            ymin: 3,
            xmax: 7,
            ymax: 4,
        };
        let tensor = normalize(
            &frame,
            Some(bbox),
            &options(1, Normalization::Unit, TensorLayout::Nhwc),
        )
        .unwrap();
        assert!((tensor.data()[0] - 200.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_crop_is_normalization_error() {
        let frame = Frame::new(RgbImage::new(10, 10));
        let bbox = BoundingBox {
            xmin: 10,
            ymin: 0,
            xmax: 10,
            ymax: 5,
        };
        let err = normalize(
            &frame,
            Some(bbox),
            &options(4, Normalization::Unit, TensorLayout::Nhwc),
        )
        .unwrap_err();
        assert!(matches!(err, FrameError::Normalization { .. }));
    }

    #[test]
    fn test_from_parts_rejects_wrong_length() {
        let err = NormalizedTensor::from_parts(TensorLayout::Nhwc, 2, vec![0.0; 5]);
        assert!(err.is_err());
    }

    #[test]
    fn test_options_tensor_shape() {
        let opts = options(64, Normalization::Unit, TensorLayout::Nchw);
        assert_eq!(opts.tensor_shape(), [1, 3, 64, 64]);
    }
}
