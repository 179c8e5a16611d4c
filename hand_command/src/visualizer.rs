//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────┬──────────────────┐
//! │                                          │  GESTURE         │
//! │   camera view                            │  V_SIGN          │
//! │   (hand skeleton overlay)                │                  │
//! │                                          │  COMMAND         │
//! │                                          │  Back            │
//! │                                          │                  │
//! │                                          │  thumb  [ ]      │
//! │                                          │  index  [x] ...  │
//! ├──────────────────────────────────────────┴──────────────────┤
//! │  status bar / key legend                                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;

use gesture_classifier::{GestureLabel, PINCH_THRESHOLD};
use gesture_commands::NO_COMMAND;
use hand_pose::presets::Preset;
use hand_pose::Finger;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::app::{AppError, AppState};
use crate::overlay::{
    label_color, HandOverlay, Viewport, CURLED_COLOR, EXTENDED_COLOR,
};
use crate::source::SimKey;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:    usize = 960;
pub const WIN_H:    usize = 540;
const CAM_W:        usize = 640;
const CAM_H:        usize = 480;
const PANEL_X:      usize = CAM_W;
const PANEL_W:      usize = WIN_W - CAM_W;
const STATUS_Y:     usize = CAM_H;
const BG_COLOR:     u32   = 0xFF1A1A2E;
const CAM_BG:       u32   = 0xFF101018;
const PANEL_BG:     u32   = 0xFF16213E;
const TEXT_BG:      u32   = 0xFF0F3460;
const TEXT_COLOR:   u32   = 0xFFEEEEEE;
const DIM_COLOR:    u32   = 0xFF888888;
const HEAD_COLOR:   u32   = 0xFFFFD700;

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    sim_tx: Sender<SimKey>,
    view:   Viewport,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimKey>, mirror: bool) -> Result<Self, AppError> {
        let mut window = Window::new(
            "Hand Command — gesture to text",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| AppError::Window(e.to_string()))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            view: Viewport { x: 0, y: 0, w: CAM_W, h: CAM_H, mirror },
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard inputs and translate to SimKey events.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        // Keys that trigger on first press only
        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        // Keys that repeat while held
        let held     = |k: Key| self.window.is_key_pressed(k, KeyRepeat::Yes);

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            let _ = self.sim_tx.send(SimKey::Quit);
            return false;
        }

        let presets = [
            (Key::Key1, Preset::OpenPalm),
            (Key::Key2, Preset::Fist),
            (Key::Key3, Preset::VSign),
            (Key::Key4, Preset::ThumbUp),
            (Key::Key5, Preset::Pinch),
            (Key::Key6, Preset::Pointing),
        ];
        for (key, preset) in presets {
            if one_shot(key) {
                let _ = self.sim_tx.send(SimKey::Show(preset));
            }
        }

        let toggles = [
            (Key::Key0, SimKey::HideHand),
            (Key::M,    SimKey::Mirror),
            (Key::R,    SimKey::Record),
        ];
        for (key, sim) in toggles {
            if one_shot(key) {
                let _ = self.sim_tx.send(sim);
            }
        }

        let arrows = [
            (Key::Left,  SimKey::Left),
            (Key::Right, SimKey::Right),
            (Key::Up,    SimKey::Up),
            (Key::Down,  SimKey::Down),
        ];
        for (key, sim) in arrows {
            if held(key) {
                let _ = self.sim_tx.send(sim);
            }
        }

        true
    }

    /// Render one frame.
    pub fn render(&mut self, app: &AppState) {
        self.buf.fill(BG_COLOR);

        // ── Camera view + hand overlay ────────────────────────────────────
        self.fill_rect(0, 0, CAM_W, CAM_H, CAM_BG);
        match (app.pose(), app.classification()) {
            (Some(pose), Some(c)) => {
                let overlay = HandOverlay::build(pose, &c.fingers, &self.view);
                for bone in &overlay.bones {
                    self.draw_line(bone.from, bone.to, bone.color);
                }
                for dot in &overlay.dots {
                    self.fill_circle(dot.at, dot.radius, dot.color);
                }
            }
            _ => self.draw_text("NO HAND", CAM_W / 2 - 42, CAM_H / 2, 3, DIM_COLOR),
        }

        // ── Side panel ────────────────────────────────────────────────────
        self.fill_rect(PANEL_X, 0, PANEL_W, CAM_H, PANEL_BG);
        self.draw_panel(app);

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, TEXT_BG);
        self.draw_text(&app.status, 10, STATUS_Y + 12, 2, TEXT_COLOR);

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_text(
            "1-6=pose  0=hide  M=mirror  arrows=move  R=record  Q=quit",
            10, WIN_H - 14, 1, DIM_COLOR,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    fn draw_panel(&mut self, app: &AppState) {
        let x = PANEL_X + 16;
        let label = app.label();

        // Flash the label box when the gesture changes.
        let accent = label.map_or(DIM_COLOR, label_color);
        let box_color = match app.flash() {
            Some(f) => blend(PANEL_BG, accent, 0.6 * f.intensity()),
            None    => PANEL_BG,
        };
        self.fill_rect(PANEL_X + 8, 40, PANEL_W - 16, 36, box_color);

        self.draw_text("GESTURE", x, 20, 2, HEAD_COLOR);
        let name = label.map_or("-", GestureLabel::name);
        self.draw_text(name, x, 48, 4, accent);

        self.draw_text("COMMAND", x, 100, 2, HEAD_COLOR);
        let command = if label.is_some() { app.command_text() } else { NO_COMMAND };
        self.draw_text(command, x, 124, 3, TEXT_COLOR);

        // ── Finger extension indicators ───────────────────────────────────
        self.draw_text("FINGERS", x, 176, 2, HEAD_COLOR);
        for (i, finger) in Finger::ALL.iter().enumerate() {
            let y = 200 + i * 22;
            let extended = app.classification().map(|c| c.fingers.is_extended(*finger));
            let color = match extended {
                Some(true)  => EXTENDED_COLOR,
                Some(false) => CURLED_COLOR,
                None        => DIM_COLOR,
            };
            self.fill_rect(x, y, 14, 14, color);
            self.draw_text(finger.name(), x + 24, y + 2, 2, TEXT_COLOR);
        }

        // ── Pinch distance bar ────────────────────────────────────────────
        self.draw_text("PINCH", x, 320, 2, HEAD_COLOR);
        if let Some(c) = app.classification() {
            // Full bar at 4x the threshold; the tick marks the threshold.
            let full = PANEL_W - 40;
            let frac = (c.pinch_distance / (4.0 * PINCH_THRESHOLD)).clamp(0.0, 1.0);
            let color = if c.pinch_distance < PINCH_THRESHOLD { HEAD_COLOR } else { CURLED_COLOR };
            self.fill_rect(x, 344, (full as f32 * frac) as usize, 10, color);
            self.fill_rect(x + full / 4, 340, 2, 18, TEXT_COLOR);
            self.draw_text(&format!("{:.3}", c.pinch_distance), x, 362, 2, TEXT_COLOR);
        }

        // ── Samples / thumb rule ──────────────────────────────────────────
        let samples = format!("samples: {}", app.samples().len());
        self.draw_text(&samples, x, 410, 2, DIM_COLOR);
        let rule = format!("thumb: {}", app.thumb_rule().name());
        self.draw_text(&rule, x, 432, 2, DIM_COLOR);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < WIN_W && (y as usize) < WIN_H {
            self.buf[y as usize * WIN_W + x as usize] = color;
        }
    }

    /// Bresenham line, two pixels thick.
    fn draw_line(&mut self, from: (isize, isize), to: (isize, isize), color: u32) {
        let (mut x, mut y) = from;
        let dx =  (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_pixel(x, y, color);
            self.set_pixel(x + 1, y, color);
            if x == to.0 && y == to.1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    fn fill_circle(&mut self, center: (isize, isize), r: usize, color: u32) {
        let r = r as isize;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set_pixel(center.0 + dx, center.1 + dy, color);
                }
            }
        }
    }

    /// Minimal bitmap font — 3×5 glyphs, each pixel drawn `scale`×`scale`.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W { break; }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' | '—' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
    }

    #[test]
    fn label_glyphs_are_not_fallback() {
        let fallback = char_glyph('\u{1}');
        for l in GestureLabel::ALL {
            for ch in l.name().chars() {
                assert_ne!(char_glyph(ch), fallback, "no glyph for {:?}", ch);
            }
        }
    }
}
