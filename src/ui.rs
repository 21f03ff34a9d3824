//! Presentation and audio collaborators, plus the OLED views.
//!
//! This module provides:
//! - The `Presenter` and `Audio` traits the session loop calls into
//! - `OledView`, an embedded-graphics renderer for 128x64 monochrome panels
//! - `fit_line`, which squeezes an answer onto one 21-column text line
//!
//! (0,0) is the top-left corner. Text positions are baselines.

use core::f32::consts::PI;

use embedded_graphics::{
    draw_target::DrawTarget,
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::{Point, Primitive},
    primitives::{Circle, Line, PrimitiveStyle},
    text::{Alignment, Text},
    Drawable,
};

use crate::app::InputMode;

// Display configuration
pub const WIDTH: i32 = 128;
pub const HEIGHT: i32 = 64;
pub const CENTER_X: i32 = WIDTH / 2;

// 6x10 font on a 128 px wide panel
pub const MAX_LINE_CHARS: usize = 21;
const ELLIPSIS: &str = "...";
const PULSE_PERIOD_MS: u64 = 2000;

// 21 chars of up to 4 UTF-8 bytes each, plus room for the ellipsis
pub type Line21 = heapless::String<{ MAX_LINE_CHARS * 4 + 4 }>;

/// Receives the session's visible transitions. No result is observed.
pub trait Presenter {
    fn show_response(&mut self, text: &str);
    fn show_idle(&mut self, now_ms: u64, mode: InputMode);
}

// Headless when the panel failed to come up
impl<P: Presenter> Presenter for Option<P> {
    fn show_response(&mut self, text: &str) {
        if let Some(p) = self.as_mut() {
            p.show_response(text);
        }
    }

    fn show_idle(&mut self, now_ms: u64, mode: InputMode) {
        if let Some(p) = self.as_mut() {
            p.show_idle(now_ms, mode);
        }
    }
}

/// Best-effort sound on an accepted event.
pub trait Audio {
    fn play_random_clip(&mut self);
}

/// Stand-in for boards without a sound module.
pub struct NoAudio;

impl Audio for NoAudio {
    fn play_random_clip(&mut self) {}
}

/// A monochrome panel that buffers draws until `flush`.
pub trait Panel: DrawTarget<Color = BinaryColor> {
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Cut `text` to one line. Longer answers break at the last space when that
/// leaves room for "...", otherwise they are hard cut at the column limit.
pub fn fit_line(text: &str) -> Line21 {
    let mut out = Line21::new();

    let cut = match text.char_indices().nth(MAX_LINE_CHARS) {
        Some((idx, _)) => idx,
        None => {
            let _ = out.push_str(text);
            return out;
        }
    };

    let line = &text[..cut];
    match line.rfind(' ') {
        Some(space) if space > 0 && space < MAX_LINE_CHARS - ELLIPSIS.len() => {
            let _ = out.push_str(&line[..space]);
            let _ = out.push_str(ELLIPSIS);
        }
        _ => {
            let _ = out.push_str(line);
        }
    }
    out
}

// 2 s cycle, +/-2 px
fn pulse_offset(now_ms: u64) -> i32 {
    let phase = (now_ms % PULSE_PERIOD_MS) as f32 / PULSE_PERIOD_MS as f32 * 2.0 * PI;
    (2.0 * libm::sinf(phase)) as i32
}

pub struct OledView<D> {
    panel: D,
}

impl<D> OledView<D>
where
    D: Panel,
{
    pub fn new(panel: D) -> Self {
        Self { panel }
    }

    pub fn panel(&self) -> &D {
        &self.panel
    }

    pub fn into_inner(self) -> D {
        self.panel
    }

    // Outline ball with the "8" window and a highlight stroke
    fn draw_ball(&mut self, center: Point, radius: i32) {
        let stroke = PrimitiveStyle::with_stroke(BinaryColor::On, 1);
        let text_style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);

        for r in [radius, radius - 1] {
            Circle::with_center(center, (2 * r + 1) as u32)
                .into_styled(stroke)
                .draw(&mut self.panel)
                .ok();
        }

        let window = Point::new(center.x, center.y - radius / 3);
        Circle::with_center(window, (2 * (radius / 3) + 1) as u32)
            .into_styled(stroke)
            .draw(&mut self.panel)
            .ok();
        Text::with_alignment("8", window + Point::new(0, 3), text_style, Alignment::Center)
            .draw(&mut self.panel)
            .ok();

        Line::new(
            center - Point::new(radius / 2, radius / 2),
            center - Point::new(radius / 3, radius / 3),
        )
        .into_styled(stroke)
        .draw(&mut self.panel)
        .ok();
    }

    fn draw_centered(&mut self, text: &str, baseline_y: i32) {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        Text::with_alignment(text, Point::new(CENTER_X, baseline_y), style, Alignment::Center)
            .draw(&mut self.panel)
            .ok();
    }

    fn finish(&mut self) {
        if self.panel.flush().is_err() {
            log::warn!("display flush failed");
        }
    }
}

impl<D> Presenter for OledView<D>
where
    D: Panel,
{
    fn show_response(&mut self, text: &str) {
        self.panel.clear(BinaryColor::Off).ok();
        self.draw_ball(Point::new(CENTER_X, 30), 18);
        let line = fit_line(text);
        self.draw_centered(&line, 58);
        self.finish();
    }

    fn show_idle(&mut self, now_ms: u64, mode: InputMode) {
        self.panel.clear(BinaryColor::Off).ok();
        self.draw_ball(Point::new(CENTER_X, 22), 16 + pulse_offset(now_ms));
        self.draw_centered("MAGIC 8-BALL", 45);
        let prompt = match mode {
            InputMode::Motion => "Shake to ask!",
            InputMode::Button => "Press to ask!",
        };
        self.draw_centered(prompt, 58);
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_graphics::{prelude::OriginDimensions, prelude::Size, Pixel};

    #[test]
    fn short_answers_are_untouched() {
        assert_eq!(fit_line("Yes").as_str(), "Yes");
        assert_eq!(fit_line("Reply hazy, try again").as_str(), "Reply hazy, try again");
    }

    #[test]
    fn long_answer_breaks_at_early_space() {
        assert_eq!(fit_line("Absolutely, positively yes").as_str(), "Absolutely,...");
    }

    #[test]
    fn late_space_falls_back_to_hard_cut() {
        // last space inside the first 21 chars is at column 19
        assert_eq!(fit_line("Concentrate and ask again").as_str(), "Concentrate and ask a");
        assert_eq!(fit_line("Better not tell you now").as_str(), "Better not tell you n");
    }

    #[test]
    fn multibyte_answers_are_kept() {
        let short = "Ça sera oui ééééé";
        assert_eq!(fit_line(short).as_str(), short);

        let accented = "éééééééééééééééééééééé";
        assert_eq!(accented.chars().count(), 22);
        let line = fit_line(accented);
        assert_eq!(line.chars().count(), MAX_LINE_CHARS);
        assert!(line.chars().all(|c| c == 'é'));

        let exact = "ééééééééééééééééééééé";
        assert_eq!(fit_line(exact).as_str(), exact);
    }

    #[test]
    fn no_space_is_a_hard_cut() {
        let line = fit_line("Supercalifragilisticexpialidocious");
        assert_eq!(line.len(), MAX_LINE_CHARS);
    }

    #[test]
    fn pulse_stays_within_two_pixels() {
        for t in (0..4000).step_by(50) {
            assert!(pulse_offset(t).abs() <= 2);
        }
        assert_eq!(pulse_offset(0), 0);
        assert!(pulse_offset(500) >= 1);
        assert!(pulse_offset(1500) <= -1);
    }

    // 128x64 bit-per-byte framebuffer that counts flushes
    struct FakePanel {
        lit: Vec<bool>,
        flushes: usize,
    }

    impl FakePanel {
        fn new() -> Self {
            Self { lit: vec![false; (WIDTH * HEIGHT) as usize], flushes: 0 }
        }

        fn lit_count(&self) -> usize {
            self.lit.iter().filter(|p| **p).count()
        }
    }

    impl OriginDimensions for FakePanel {
        fn size(&self) -> Size {
            Size::new(WIDTH as u32, HEIGHT as u32)
        }
    }

    impl DrawTarget for FakePanel {
        type Color = BinaryColor;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(p, c) in pixels {
                if (0..WIDTH).contains(&p.x) && (0..HEIGHT).contains(&p.y) {
                    self.lit[(p.y * WIDTH + p.x) as usize] = c.is_on();
                }
            }
            Ok(())
        }
    }

    impl Panel for FakePanel {
        fn flush(&mut self) -> Result<(), Self::Error> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn each_view_draws_and_flushes_once() {
        let mut view = OledView::new(FakePanel::new());

        view.show_idle(0, InputMode::Motion);
        assert_eq!(view.panel().flushes, 1);
        let idle_pixels = view.panel().lit_count();
        assert!(idle_pixels > 0);

        view.show_response("It is certain");
        assert_eq!(view.panel().flushes, 2);
        assert!(view.panel().lit_count() > 0);
    }

    #[test]
    fn missing_panel_is_a_silent_presenter() {
        let mut headless: Option<OledView<FakePanel>> = None;
        headless.show_idle(0, InputMode::Button);
        headless.show_response("Yes");

        let mut present = Some(OledView::new(FakePanel::new()));
        present.show_response("Yes");
        assert_eq!(present.map(|v| v.into_inner().flushes), Some(1));
    }

    #[test]
    fn prompt_depends_on_input_mode() {
        let mut motion = OledView::new(FakePanel::new());
        let mut button = OledView::new(FakePanel::new());
        motion.show_idle(0, InputMode::Motion);
        button.show_idle(0, InputMode::Button);
        assert_ne!(motion.panel().lit, button.panel().lit);
    }
}
