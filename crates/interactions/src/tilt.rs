use std::rc::Rc;

use foundation::{NodeId, Point, Rect};

use crate::config::PageConfig;
use crate::page::{Dom, EventKind, EventTarget, Page, PageEvent};

pub const NEUTRAL_TRANSFORM: &str = "rotateX(0deg) rotateY(0deg) translateZ(0)";

/// Card orientation for one pointer position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TiltPose {
    /// Degrees; positive tips the top edge away from the viewer.
    pub rotate_x: f64,
    pub rotate_y: f64,
    /// Pointer position across the card, in percent (highlight origin).
    pub mx: f64,
    pub my: f64,
}

impl TiltPose {
    /// Pose for a pointer at client coordinates `pointer` over `rect`.
    ///
    /// Rotation grows linearly from zero at the center to `max_tilt_deg` at the
    /// edges and keeps growing past them. `None` for a box with no area.
    pub fn from_pointer(rect: Rect, pointer: Point, max_tilt_deg: f64) -> Option<Self> {
        if rect.is_degenerate() {
            return None;
        }
        let local = rect.local(pointer);
        let mid_x = rect.width / 2.0;
        let mid_y = rect.height / 2.0;
        Some(Self {
            rotate_x: ((mid_y - local.y) / mid_y) * max_tilt_deg,
            rotate_y: ((local.x - mid_x) / mid_x) * max_tilt_deg,
            mx: (local.x / rect.width) * 100.0,
            my: (local.y / rect.height) * 100.0,
        })
    }

    pub fn transform(&self, depth_px: f64) -> String {
        format!(
            "rotateX({}deg) rotateY({}deg) translateZ({}px)",
            fixed2(self.rotate_x),
            fixed2(self.rotate_y),
            depth_px
        )
    }
}

/// Two-decimal rendering matching `Number.prototype.toFixed(2)`: exact ties
/// round away from zero, where `format!("{:.2}")` rounds them to even.
///
/// A binary double sits exactly halfway between two hundredths only when it
/// is an odd multiple of 1/8, so those are the only values bumped.
pub fn fixed2(v: f64) -> String {
    let magnitude = v.abs();
    let eighths = magnitude * 8.0;
    let digits = if eighths.fract() == 0.0 && eighths % 2.0 == 1.0 {
        format!("{:.2}", (magnitude * 100.0 + 0.5).floor() / 100.0)
    } else {
        format!("{magnitude:.2}")
    };
    if v < 0.0 { format!("-{digits}") } else { digits }
}

fn percent(v: f64) -> String {
    format!("{v}%")
}

pub fn handle_move<P: Dom + ?Sized>(
    page: &P,
    config: &PageConfig,
    card: NodeId,
    pointer: Point,
) -> Option<TiltPose> {
    let pose = TiltPose::from_pointer(page.bounding_rect(card), pointer, config.max_tilt_deg)?;
    page.set_style(card, "--mx", &percent(pose.mx));
    page.set_style(card, "--my", &percent(pose.my));
    page.set_style(card, "transform", &pose.transform(config.tilt_depth_px));
    page.add_class(card, &config.tilting_class);
    Some(pose)
}

pub fn handle_leave<P: Dom + ?Sized>(page: &P, config: &PageConfig, card: NodeId) {
    page.set_style(card, "transform", NEUTRAL_TRANSFORM);
    page.remove_class(card, &config.tilting_class);
}

/// Attaches pointer move/leave listeners to every tilt card. Returns the
/// number of cards wired.
pub fn install<P: Page + 'static>(page: &Rc<P>, config: &Rc<PageConfig>) -> usize {
    let cards = page.query_all(&config.selectors.tilt_cards);
    for &card in &cards {
        let p = page.clone();
        let cfg = config.clone();
        page.listen(
            EventTarget::Node(card),
            EventKind::PointerMove,
            Rc::new(move |e: &PageEvent| {
                if let Some(pointer) = e.pointer() {
                    handle_move(&*p, &cfg, card, pointer);
                }
            }),
        );

        let p = page.clone();
        let cfg = config.clone();
        page.listen(
            EventTarget::Node(card),
            EventKind::PointerLeave,
            Rc::new(move |_: &PageEvent| handle_leave(&*p, &cfg, card)),
        );
    }
    cards.len()
}
