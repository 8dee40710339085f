use crate::scene::TextureId;

pub const FACE_SIZE: u32 = 512;
const FACE_CENTER: f64 = FACE_SIZE as f64 / 2.0;
const TEXT_COLOR: &str = "#ffffff";
const STATIC_FONT: &str = "bold 60px Arial";
const TYPING_FONT: &str = "bold 80px Arial";
const TYPING_BACKGROUND: &str = "#1a1a3e";
const CARET_GAP: f64 = 10.0;
const CARET_WIDTH: f64 = 4.0;
const CARET_HEIGHT: f64 = 60.0;

#[derive(Clone, Debug, PartialEq)]
pub struct FaceContent {
    pub background: String,
    pub text: String,
    pub font: &'static str,
    pub color: &'static str,
    pub caret_alpha: Option<f64>,
}

pub fn static_face(label: &str, background: &str) -> FaceContent {
    FaceContent {
        background: background.to_string(),
        text: label.to_string(),
        font: STATIC_FONT,
        color: TEXT_COLOR,
        caret_alpha: None,
    }
}

/// A face part way through typing `word`; `progress` runs from 0 to 1.
pub fn typing_face(word: &str, progress: f64) -> FaceContent {
    let len = word.chars().count();
    let shown = ((progress * len as f64).ceil().max(0.0) as usize).min(len);
    let text: String = word.chars().take(shown).collect();
    let caret_alpha = (progress < 1.0 && shown < len).then(|| (progress * 20.0).sin() * 0.5 + 0.5);

    FaceContent {
        background: TYPING_BACKGROUND.to_string(),
        text,
        font: TYPING_FONT,
        color: TEXT_COLOR,
        caret_alpha,
    }
}

pub trait FaceCanvas {
    fn fill_rect(&mut self, style: &str, x: f64, y: f64, width: f64, height: f64, alpha: f64);
    fn fill_text_centered(&mut self, text: &str, font: &str, style: &str, x: f64, y: f64);
    fn measure_text(&mut self, text: &str, font: &str) -> f64;
}

pub trait FacePainter {
    fn paint(&mut self, texture: TextureId, content: &FaceContent);
}

pub fn paint_face<C: FaceCanvas + ?Sized>(canvas: &mut C, content: &FaceContent) {
    let size = f64::from(FACE_SIZE);
    canvas.fill_rect(&content.background, 0.0, 0.0, size, size, 1.0);
    canvas.fill_text_centered(&content.text, content.font, content.color, FACE_CENTER, FACE_CENTER);

    if let Some(alpha) = content.caret_alpha {
        let text_width = canvas.measure_text(&content.text, content.font);
        canvas.fill_rect(
            content.color,
            FACE_CENTER + text_width / 2.0 + CARET_GAP,
            FACE_CENTER - CARET_HEIGHT / 2.0,
            CARET_WIDTH,
            CARET_HEIGHT,
            alpha,
        );
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{CanvasOp, RecordingCanvas};
    use super::*;

    #[test]
    fn typing_shows_a_ceiling_share_of_the_word() {
        assert_eq!(typing_face("Python", 0.0).text, "");
        assert_eq!(typing_face("Python", 0.01).text, "P");
        assert_eq!(typing_face("Python", 0.5).text, "Pyt");
        assert_eq!(typing_face("Python", 0.51).text, "Pyth");
        assert_eq!(typing_face("Python", 1.0).text, "Python");
        assert_eq!(typing_face("Python", 1.5).text, "Python");
    }

    #[test]
    fn caret_blinks_only_while_characters_remain() {
        let start = typing_face("AI", 0.0);
        assert_eq!(start.caret_alpha, Some(0.5));

        let half = typing_face("AI", 0.4);
        let expected = (0.4f64 * 20.0).sin() * 0.5 + 0.5;
        assert_eq!(half.caret_alpha, Some(expected));

        assert_eq!(typing_face("AI", 0.6).caret_alpha, None);
        assert_eq!(typing_face("AI", 1.0).caret_alpha, None);
    }

    #[test]
    fn static_faces_have_no_caret() {
        let face = static_face("React", "#61DAFB");
        assert_eq!(face.background, "#61DAFB");
        assert_eq!(face.font, "bold 60px Arial");
        assert_eq!(face.caret_alpha, None);
    }

    #[test]
    fn painting_fills_background_then_text_then_caret() {
        let mut canvas = RecordingCanvas::default();
        paint_face(&mut canvas, &typing_face("SQL", 0.3));

        assert_eq!(canvas.ops.len(), 3);
        assert!(matches!(&canvas.ops[0], CanvasOp::Rect { style, width, .. } if style == "#1a1a3e" && *width == 512.0));
        assert_eq!(
            canvas.ops[1],
            CanvasOp::Text {
                text: "S".to_string(),
                font: "bold 80px Arial".to_string()
            }
        );
        match &canvas.ops[2] {
            CanvasOp::Rect {
                x, y, width, height, ..
            } => {
                assert_eq!(*x, 256.0 + 20.0 + 10.0);
                assert_eq!(*y, 226.0);
                assert_eq!((*width, *height), (4.0, 60.0));
            }
            other => panic!("expected caret, got {other:?}"),
        }
    }

    #[test]
    fn finished_faces_paint_without_measuring() {
        let mut canvas = RecordingCanvas::default();
        paint_face(&mut canvas, &static_face("Java", "#5382a1"));
        assert_eq!(canvas.ops.len(), 2);
    }
}
