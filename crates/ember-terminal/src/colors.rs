//! Color resolution from parser colors to packed `0xAARRGGBB`.
//!
//! The parser reports cell colors as named, palette-indexed, or direct RGB.
//! The wire format carries explicit RGB only, so indexed colors are resolved
//! here: runtime palette overrides (OSC 4/10/11) take precedence, then the
//! built-in xterm table.

use alacritty_terminal::term::color::Colors;
use alacritty_terminal::vte::ansi::{Color, NamedColor, Rgb};

/// Default foreground: opaque white.
pub const DEFAULT_FG: u32 = 0xFFFF_FFFF;
/// Default background: opaque black.
pub const DEFAULT_BG: u32 = 0xFF00_0000;

// Standard xterm 16-color table.
const BLACK: u32 = 0x000000;
const RED: u32 = 0xCD0000;
const GREEN: u32 = 0x00CD00;
const YELLOW: u32 = 0xCDCD00;
const BLUE: u32 = 0x0000EE;
const MAGENTA: u32 = 0xCD00CD;
const CYAN: u32 = 0x00CDCD;
const WHITE: u32 = 0xE5E5E5;
const BRIGHT_BLACK: u32 = 0x7F7F7F;
const BRIGHT_RED: u32 = 0xFF0000;
const BRIGHT_GREEN: u32 = 0x00FF00;
const BRIGHT_YELLOW: u32 = 0xFFFF00;
const BRIGHT_BLUE: u32 = 0x5C5CFF;
const BRIGHT_MAGENTA: u32 = 0xFF00FF;
const BRIGHT_CYAN: u32 = 0x00FFFF;
const BRIGHT_WHITE: u32 = 0xFFFFFF;

/// Compose an opaque ARGB word from 8-bit channels.
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    (0xFF << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Resolve a parser color to opaque ARGB.
pub fn resolve(color: Color, palette: &Colors) -> u32 {
    match color {
        Color::Spec(rgb) => pack_rgb(rgb.r, rgb.g, rgb.b),
        Color::Named(named) => named_to_argb(named, palette),
        Color::Indexed(idx) => indexed_to_argb(idx, palette),
    }
}

fn rgb_to_argb(rgb: Rgb) -> u32 {
    pack_rgb(rgb.r, rgb.g, rgb.b)
}

fn opaque(hex: u32) -> u32 {
    0xFF00_0000 | hex
}

fn named_to_argb(named: NamedColor, palette: &Colors) -> u32 {
    if let Some(rgb) = palette[named as usize] {
        return rgb_to_argb(rgb);
    }
    match named {
        NamedColor::Black => opaque(BLACK),
        NamedColor::Red => opaque(RED),
        NamedColor::Green => opaque(GREEN),
        NamedColor::Yellow => opaque(YELLOW),
        NamedColor::Blue => opaque(BLUE),
        NamedColor::Magenta => opaque(MAGENTA),
        NamedColor::Cyan => opaque(CYAN),
        NamedColor::White => opaque(WHITE),
        NamedColor::BrightBlack => opaque(BRIGHT_BLACK),
        NamedColor::BrightRed => opaque(BRIGHT_RED),
        NamedColor::BrightGreen => opaque(BRIGHT_GREEN),
        NamedColor::BrightYellow => opaque(BRIGHT_YELLOW),
        NamedColor::BrightBlue => opaque(BRIGHT_BLUE),
        NamedColor::BrightMagenta => opaque(BRIGHT_MAGENTA),
        NamedColor::BrightCyan => opaque(BRIGHT_CYAN),
        NamedColor::BrightWhite => opaque(BRIGHT_WHITE),
        NamedColor::Background => DEFAULT_BG,
        NamedColor::Foreground | NamedColor::BrightForeground | NamedColor::DimForeground => {
            DEFAULT_FG
        }
        NamedColor::Cursor => DEFAULT_FG,
        _ => DEFAULT_FG,
    }
}

fn indexed_to_argb(idx: u8, palette: &Colors) -> u32 {
    if let Some(rgb) = palette[idx as usize] {
        return rgb_to_argb(rgb);
    }
    match idx {
        // Standard 16 colors share the named table.
        0 => opaque(BLACK),
        1 => opaque(RED),
        2 => opaque(GREEN),
        3 => opaque(YELLOW),
        4 => opaque(BLUE),
        5 => opaque(MAGENTA),
        6 => opaque(CYAN),
        7 => opaque(WHITE),
        8 => opaque(BRIGHT_BLACK),
        9 => opaque(BRIGHT_RED),
        10 => opaque(BRIGHT_GREEN),
        11 => opaque(BRIGHT_YELLOW),
        12 => opaque(BRIGHT_BLUE),
        13 => opaque(BRIGHT_MAGENTA),
        14 => opaque(BRIGHT_CYAN),
        15 => opaque(BRIGHT_WHITE),
        // 216-entry color cube (indices 16..=231).
        16..=231 => {
            let idx = idx - 16;
            let r_idx = idx / 36;
            let g_idx = (idx % 36) / 6;
            let b_idx = idx % 6;
            let r = if r_idx == 0 { 0 } else { 55 + 40 * r_idx };
            let g = if g_idx == 0 { 0 } else { 55 + 40 * g_idx };
            let b = if b_idx == 0 { 0 } else { 55 + 40 * b_idx };
            pack_rgb(r, g, b)
        }
        // Grayscale ramp (indices 232..=255).
        232..=255 => {
            let v = 8 + 10 * (idx - 232);
            pack_rgb(v, v, v)
        }
    }
}
