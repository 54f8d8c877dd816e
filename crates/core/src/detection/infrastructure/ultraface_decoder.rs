//! Decoding of Ultra-Light (RFB / slim) detector outputs.
//!
//! The model emits, for every prior box, a two-class score pair
//! (background, face) and four box values. Depending on how the model was
//! exported those box values are either normalized corners or regression
//! offsets against the prior.

use crate::shared::engine_config::BoxFormat;
use crate::shared::face_box::FaceBox;

const STRIDES: [f32; 4] = [8.0, 16.0, 32.0, 64.0];
const MIN_BOXES: [&[f32]; 4] = [
    &[10.0, 16.0, 24.0],
    &[32.0, 48.0],
    &[64.0, 96.0],
    &[128.0, 192.0, 256.0],
];
const CENTER_VARIANCE: f32 = 0.1;
const SIZE_VARIANCE: f32 = 0.2;

/// Prior box in center form, normalized to [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prior {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
}

/// Face candidate in normalized corner form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub score: f32,
}

impl Candidate {
    /// Scale to pixel coordinates of a `width` x `height` image, clamped.
    pub fn to_face_box(&self, width: u32, height: u32) -> FaceBox {
        let w = width as f32;
        let h = height as f32;
        FaceBox {
            left: (clip(self.x1) * w) as i32,
            top: (clip(self.y1) * h) as i32,
            right: (clip(self.x2) * w) as i32,
            bottom: (clip(self.y2) * h) as i32,
            score: self.score,
        }
    }
}

/// Generate the prior boxes for an `input_width` x `input_height` model.
///
/// Feature maps are `ceil(size / stride)` per axis; each cell gets one prior
/// per min box of its level, ordered row-major.
pub fn generate_priors(input_width: u32, input_height: u32) -> Vec<Prior> {
    let in_w = input_width as f32;
    let in_h = input_height as f32;
    let mut priors = Vec::new();

    for (stride, min_boxes) in STRIDES.iter().zip(MIN_BOXES.iter()) {
        let fm_w = (in_w / stride).ceil() as usize;
        let fm_h = (in_h / stride).ceil() as usize;
        let scale_w = in_w / stride;
        let scale_h = in_h / stride;

        for j in 0..fm_h {
            for i in 0..fm_w {
                let cx = (i as f32 + 0.5) / scale_w;
                let cy = (j as f32 + 0.5) / scale_h;
                for &k in min_boxes.iter() {
                    priors.push(Prior {
                        cx: clip(cx),
                        cy: clip(cy),
                        w: clip(k / in_w),
                        h: clip(k / in_h),
                    });
                }
            }
        }
    }

    priors
}

/// Collect candidates whose face score exceeds `score_threshold`.
///
/// `scores` is `[N, 2]` flattened, `boxes` is `[N, 4]` flattened. `priors`
/// is only consulted for [`BoxFormat::PriorOffsets`].
pub fn decode(
    scores: &[f32],
    boxes: &[f32],
    priors: &[Prior],
    format: BoxFormat,
    score_threshold: f32,
) -> Vec<Candidate> {
    let count = (scores.len() / 2).min(boxes.len() / 4);
    let mut out = Vec::new();

    for i in 0..count {
        let score = scores[i * 2 + 1];
        if score <= score_threshold {
            continue;
        }
        let b = &boxes[i * 4..i * 4 + 4];
        let candidate = match format {
            BoxFormat::Corner => Candidate {
                x1: clip(b[0]),
                y1: clip(b[1]),
                x2: clip(b[2]),
                y2: clip(b[3]),
                score,
            },
            BoxFormat::PriorOffsets => {
                let Some(p) = priors.get(i) else {
                    break;
                };
                let cx = b[0] * CENTER_VARIANCE * p.w + p.cx;
                let cy = b[1] * CENTER_VARIANCE * p.h + p.cy;
                let w = (b[2] * SIZE_VARIANCE).exp() * p.w;
                let h = (b[3] * SIZE_VARIANCE).exp() * p.h;
                Candidate {
                    x1: clip(cx - w / 2.0),
                    y1: clip(cy - h / 2.0),
                    x2: clip(cx + w / 2.0),
                    y2: clip(cy + h / 2.0),
                    score,
                }
            }
        };
        out.push(candidate);
    }

    out
}

/// Greedy hard NMS. Output is sorted by descending score; a negative
/// `top_k` keeps every survivor.
pub fn hard_nms(mut candidates: Vec<Candidate>, iou_thresh: f32, top_k: i32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<Candidate> = Vec::new();
    let mut suppressed = vec![false; candidates.len()];

    for i in 0..candidates.len() {
        if suppressed[i] {
            continue;
        }
        if top_k >= 0 && keep.len() >= top_k as usize {
            break;
        }
        keep.push(candidates[i]);
        for j in (i + 1)..candidates.len() {
            if !suppressed[j] && iou(&candidates[i], &candidates[j]) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}

fn iou(a: &Candidate, b: &Candidate) -> f32 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a.x2 - a.x1) * (a.y2 - a.y1);
    let area_b = (b.x2 - b.x1) * (b.y2 - b.y1);
    inter / (area_a + area_b - inter)
}

fn clip(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}
