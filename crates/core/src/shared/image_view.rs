use ndarray::ArrayView3;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("image dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
    #[error("unsupported channel count {0} (expected 1, 3 or 4)")]
    UnsupportedChannels(i32),
    #[error("image of {width}x{height}x{channels} bytes does not fit in memory")]
    TooLarge { width: u32, height: u32, channels: u8 },
    #[error("buffer holds {actual} bytes but {width}x{height}x{channels} needs {expected}")]
    LengthMismatch {
        width: u32,
        height: u32,
        channels: u8,
        expected: usize,
        actual: usize,
    },
}

/// A caller-owned raw image, borrowed for the duration of one detect call.
///
/// Pixels are interleaved, row-major, one byte per channel. Gray (1), RGB (3)
/// and RGBA (4) layouts are accepted.
#[derive(Clone, Copy, Debug)]
pub struct ImageView<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    channels: u8,
}

impl<'a> ImageView<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32, channels: u8) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::ZeroDimension { width, height });
        }
        if !matches!(channels, 1 | 3 | 4) {
            return Err(ImageError::UnsupportedChannels(channels.into()));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels as usize))
            .ok_or(ImageError::TooLarge {
                width,
                height,
                channels,
            })?;
        if data.len() != expected {
            return Err(ImageError::LengthMismatch {
                width,
                height,
                channels,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Validates signed dimensions as they arrive from a native caller.
    pub fn from_raw_parts(
        data: &'a [u8],
        width: i32,
        height: i32,
        channels: i32,
    ) -> Result<Self, ImageError> {
        let w = u32::try_from(width).unwrap_or(0);
        let h = u32::try_from(height).unwrap_or(0);
        if w == 0 || h == 0 {
            return Err(ImageError::ZeroDimension {
                width: w,
                height: h,
            });
        }
        let c = u8::try_from(channels).map_err(|_| ImageError::UnsupportedChannels(channels))?;
        Self::new(data, w, h, c)
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn as_ndarray(&self) -> ArrayView3<'a, u8> {
        // Length was checked in the constructor.
        ArrayView3::from_shape(
            (
                self.height as usize,
                self.width as usize,
                self.channels as usize,
            ),
            self.data,
        )
        .expect("ImageView data length must match dimensions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 2 * 3 * 4];
        let image = ImageView::new(&data, 3, 2, 4).unwrap();
        assert_eq!(image.width(), 3);
        assert_eq!(image.height(), 2);
        assert_eq!(image.channels(), 4);
        assert_eq!(image.data().len(), 24);
    }

    #[test]
    fn test_mismatched_length_is_rejected() {
        let data = vec![0u8; 10];
        let err = ImageView::new(&data, 2, 2, 3).unwrap_err();
        assert_eq!(
            err,
            ImageError::LengthMismatch {
                width: 2,
                height: 2,
                channels: 3,
                expected: 12,
                actual: 10,
            }
        );
    }

    #[rstest]
    #[case::zero_width(0, 4)]
    #[case::zero_height(4, 0)]
    fn test_zero_dimension_is_rejected(#[case] width: u32, #[case] height: u32) {
        let err = ImageView::new(&[], width, height, 3).unwrap_err();
        assert!(matches!(err, ImageError::ZeroDimension { .. }));
    }

    #[rstest]
    #[case(0)]
    #[case(2)]
    #[case(5)]
    fn test_unsupported_channels(#[case] channels: u8) {
        let data = vec![0u8; 4 * channels as usize];
        let err = ImageView::new(&data, 2, 2, channels).unwrap_err();
        assert_eq!(err, ImageError::UnsupportedChannels(channels.into()));
    }

    #[test]
    fn test_oversized_channel_count_is_reported_as_given() {
        let data = vec![0u8; 12];
        let err = ImageView::from_raw_parts(&data, 2, 2, 300).unwrap_err();
        assert_eq!(err, ImageError::UnsupportedChannels(300));
    }

    #[test]
    fn test_size_overflow_is_rejected() {
        let err = ImageView::new(&[], u32::MAX, u32::MAX, 4).unwrap_err();
        assert_eq!(
            err,
            ImageError::TooLarge {
                width: u32::MAX,
                height: u32::MAX,
                channels: 4,
            }
        );
    }

    #[rstest]
    #[case::wraps_on_32_bit(65536, 65536, 1)]
    #[case::wraps_on_64_bit(i32::MAX, i32::MAX, 4)]
    fn test_huge_dimensions_never_accept_empty_buffer(
        #[case] width: i32,
        #[case] height: i32,
        #[case] channels: i32,
    ) {
        let err = ImageView::from_raw_parts(&[], width, height, channels).unwrap_err();
        assert!(matches!(
            err,
            ImageError::TooLarge { .. } | ImageError::LengthMismatch { .. }
        ));
    }

    #[rstest]
    #[case::negative_width(-1, 2, 3)]
    #[case::negative_height(2, -5, 3)]
    #[case::negative_channels(2, 2, -3)]
    fn test_from_raw_parts_rejects_negative(
        #[case] width: i32,
        #[case] height: i32,
        #[case] channels: i32,
    ) {
        let data = vec![0u8; 12];
        assert!(ImageView::from_raw_parts(&data, width, height, channels).is_err());
    }

    #[test]
    fn test_from_raw_parts_accepts_valid() {
        let data = vec![0u8; 2 * 2 * 4];
        let image = ImageView::from_raw_parts(&data, 2, 2, 4).unwrap();
        assert_eq!(image.channels(), 4);
    }

    #[test]
    fn test_as_ndarray_shape() {
        let data = vec![0u8; 24];
        let image = ImageView::new(&data, 4, 2, 3).unwrap();
        assert_eq!(image.as_ndarray().shape(), &[2, 4, 3]);
    }
}
