use serde::Serialize;

/// Integers emitted per face in a flat detection result.
pub const FACE_ENCODING_LEN: usize = 4;

/// A detected face in pixel coordinates of the input image.
///
/// Corners are clamped to the image: `0 <= left <= right <= width` and
/// `0 <= top <= bottom <= height`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FaceBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub score: f32,
}

impl FaceBox {
    /// Flat `[left, top, right, bottom, ...]` layout, one group per face.
    pub fn encode(faces: &[FaceBox]) -> Vec<i32> {
        let mut out = Vec::with_capacity(faces.len() * FACE_ENCODING_LEN);
        for f in faces {
            out.extend_from_slice(&[f.left, f.top, f.right, f.bottom]);
        }
        out
    }

    /// Layout read by the Android `FaceSDKNative` callers: the face count
    /// followed by the flat boxes, so no faces encodes as `[0]`.
    pub fn encode_count_prefixed(faces: &[FaceBox]) -> Vec<i32> {
        let mut out = Vec::with_capacity(1 + faces.len() * FACE_ENCODING_LEN);
        out.push(faces.len() as i32);
        out.extend(Self::encode(faces));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(left: i32, top: i32, right: i32, bottom: i32) -> FaceBox {
        FaceBox {
            left,
            top,
            right,
            bottom,
            score: 0.9,
        }
    }

    #[test]
    fn test_encode_empty() {
        assert!(FaceBox::encode(&[]).is_empty());
    }

    #[test]
    fn test_encode_is_corner_order() {
        let flat = FaceBox::encode(&[face(1, 2, 3, 4), face(5, 6, 7, 8)]);
        assert_eq!(flat, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(flat.len() % FACE_ENCODING_LEN, 0);
    }

    #[test]
    fn test_encode_count_prefixed_empty() {
        assert_eq!(FaceBox::encode_count_prefixed(&[]), vec![0]);
    }

    #[test]
    fn test_encode_count_prefixed() {
        let flat = FaceBox::encode_count_prefixed(&[face(1, 2, 3, 4), face(5, 6, 7, 8)]);
        assert_eq!(flat, vec![2, 1, 2, 3, 4, 5, 6, 7, 8]);
    }
}
