// src/formats.rs

//! Stock pixel formats.
//!
//! These cover the encodings small display controllers actually speak:
//! 1-bit monochrome panels, 8-bit grayscale, 16-bit RGB (5/6/5), the
//! 18-bit RGB (6/6/6) mode that is deliberately not byte-aligned, 24-bit
//! RGB, and 32-bit RGBA for compositing sources. `Indexed8` stands in for
//! palette formats whose color mapping lives outside the crate; it packs
//! and copies like any 8-bit format but refuses cross-format conversion.
//!
//! Narrow channels scale to 8 bits by bit replication so full scale maps
//! to full scale (`0b11111` becomes `0xFF`, not `0xF8`).

use crate::format::{ColorRgba, PixelFormat};

#[inline]
fn scale5(v: u32) -> u8 {
    ((v << 3) | (v >> 2)) as u8
}

#[inline]
fn scale6(v: u32) -> u8 {
    ((v << 2) | (v >> 4)) as u8
}

/// 1-bit monochrome: 0 is black, 1 is white.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mono1;

impl PixelFormat for Mono1 {
    const BIT_DEPTH: usize = 1;

    fn decode(raw: u32) -> Option<ColorRgba> {
        let v = if raw & 1 != 0 { u8::MAX } else { 0 };
        Some(ColorRgba::opaque(v, v, v))
    }

    fn encode(color: ColorRgba) -> Option<u32> {
        Some((color.luma() >= 0x80) as u32)
    }
}

/// 8-bit grayscale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gray8;

impl PixelFormat for Gray8 {
    const BIT_DEPTH: usize = 8;

    fn decode(raw: u32) -> Option<ColorRgba> {
        let v = (raw & 0xFF) as u8;
        Some(ColorRgba::opaque(v, v, v))
    }

    fn encode(color: ColorRgba) -> Option<u32> {
        Some(color.luma() as u32)
    }
}

/// 16-bit RGB, 5/6/5 channel split. The native format of most small TFTs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb565;

impl PixelFormat for Rgb565 {
    const BIT_DEPTH: usize = 16;

    fn decode(raw: u32) -> Option<ColorRgba> {
        Some(ColorRgba::opaque(
            scale5((raw >> 11) & 0x1F),
            scale6((raw >> 5) & 0x3F),
            scale5(raw & 0x1F),
        ))
    }

    fn encode(color: ColorRgba) -> Option<u32> {
        Some(
            ((color.r as u32 >> 3) << 11) | ((color.g as u32 >> 2) << 5) | (color.b as u32 >> 3),
        )
    }
}

/// 18-bit RGB, 6 bits per channel. Not byte-aligned: three pixels straddle
/// seven bytes, which is exactly what the bit-merge store paths exist for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb666;

impl PixelFormat for Rgb666 {
    const BIT_DEPTH: usize = 18;

    fn decode(raw: u32) -> Option<ColorRgba> {
        Some(ColorRgba::opaque(
            scale6((raw >> 12) & 0x3F),
            scale6((raw >> 6) & 0x3F),
            scale6(raw & 0x3F),
        ))
    }

    fn encode(color: ColorRgba) -> Option<u32> {
        Some(
            ((color.r as u32 >> 2) << 12) | ((color.g as u32 >> 2) << 6) | (color.b as u32 >> 2),
        )
    }
}

/// 24-bit RGB, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb888;

impl PixelFormat for Rgb888 {
    const BIT_DEPTH: usize = 24;

    fn decode(raw: u32) -> Option<ColorRgba> {
        Some(ColorRgba::opaque(
            ((raw >> 16) & 0xFF) as u8,
            ((raw >> 8) & 0xFF) as u8,
            (raw & 0xFF) as u8,
        ))
    }

    fn encode(color: ColorRgba) -> Option<u32> {
        Some(((color.r as u32) << 16) | ((color.g as u32) << 8) | color.b as u32)
    }
}

/// 32-bit RGBA with straight alpha, R in the top byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba8888;

impl PixelFormat for Rgba8888 {
    const BIT_DEPTH: usize = 32;
    const HAS_ALPHA: bool = true;

    fn decode(raw: u32) -> Option<ColorRgba> {
        Some(ColorRgba::new(
            (raw >> 24) as u8,
            ((raw >> 16) & 0xFF) as u8,
            ((raw >> 8) & 0xFF) as u8,
            (raw & 0xFF) as u8,
        ))
    }

    fn encode(color: ColorRgba) -> Option<u32> {
        Some(
            ((color.r as u32) << 24)
                | ((color.g as u32) << 16)
                | ((color.b as u32) << 8)
                | color.a as u32,
        )
    }
}

/// 8-bit palette index. The palette lives with the display driver, so the
/// format stores and copies to itself but has no defined color conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Indexed8;

impl PixelFormat for Indexed8 {
    const BIT_DEPTH: usize = 8;

    fn decode(_raw: u32) -> Option<ColorRgba> {
        None
    }

    fn encode(_color: ColorRgba) -> Option<u32> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{convert, convert_over, same_format};

    #[test]
    fn packing_constants() {
        assert_eq!(Mono1::PACKED_SIZE, 1);
        assert!(!Mono1::BYTE_ALIGNED);
        assert_eq!(Rgb565::PACKED_SIZE, 2);
        assert!(Rgb565::BYTE_ALIGNED);
        assert_eq!(Rgb666::PACKED_SIZE, 3);
        assert!(!Rgb666::BYTE_ALIGNED);
        assert_eq!(Rgb666::PAD_BITS, 6);
        assert_eq!(Rgb888::MASK, 0x00FF_FFFF);
        assert_eq!(Rgba8888::MASK, u32::MAX);
        assert_eq!(Mono1::MASK, 1);
    }

    #[test]
    fn full_scale_maps_to_full_scale() {
        assert_eq!(Rgb565::decode(0xFFFF), Some(ColorRgba::opaque(255, 255, 255)));
        assert_eq!(Rgb666::decode(0x3_FFFF), Some(ColorRgba::opaque(255, 255, 255)));
        assert_eq!(Rgb565::encode(ColorRgba::opaque(255, 255, 255)), Some(0xFFFF));
    }

    #[test]
    fn rgb565_channel_placement() {
        // Pure red / green / blue land in their own bit groups.
        assert_eq!(Rgb565::encode(ColorRgba::opaque(255, 0, 0)), Some(0xF800));
        assert_eq!(Rgb565::encode(ColorRgba::opaque(0, 255, 0)), Some(0x07E0));
        assert_eq!(Rgb565::encode(ColorRgba::opaque(0, 0, 255)), Some(0x001F));
    }

    #[test]
    fn cross_format_conversion() {
        // Full red survives 565 -> 888 exactly thanks to bit replication.
        assert_eq!(convert::<Rgb565, Rgb888>(0xF800), Some(0xFF_0000));
        assert_eq!(convert::<Rgb888, Rgb565>(0x00_FF00), Some(0x07E0));
    }

    #[test]
    fn indexed_converts_only_to_itself() {
        assert_eq!(convert::<Indexed8, Indexed8>(0x42), Some(0x42));
        assert_eq!(convert::<Indexed8, Rgb565>(0x42), None);
        assert_eq!(convert::<Rgb565, Indexed8>(0xF800), None);
        assert!(same_format::<Indexed8, Indexed8>());
        assert!(!same_format::<Indexed8, Gray8>());
    }

    #[test]
    fn alpha_blend_half_over_black() {
        let src = Rgba8888::encode(ColorRgba::new(200, 100, 50, 128)).unwrap();
        let bg = Rgba8888::encode(ColorRgba::opaque(0, 0, 0)).unwrap();
        let out = Rgba8888::blend(src, bg).unwrap();
        let c = Rgba8888::decode(out).unwrap();
        assert_eq!(c.a, 255);
        // 200 * 128/255 rounds to 100.
        assert_eq!(c.r, 100);
    }

    #[test]
    fn alpha_source_composites_into_rgb_destination() {
        let src = Rgba8888::encode(ColorRgba::new(255, 255, 255, 128)).unwrap();
        let bg = Rgb888::encode(ColorRgba::opaque(0, 0, 0)).unwrap();
        let out = convert_over::<Rgba8888, Rgb888>(src, bg).unwrap();
        let c = Rgb888::decode(out).unwrap();
        assert_eq!((c.r, c.g, c.b), (128, 128, 128));
    }

    #[test]
    fn opacity_checks() {
        assert!(Rgb565::is_opaque(0x1234));
        assert!(Rgba8888::is_opaque(0x1234_56FF));
        assert!(!Rgba8888::is_opaque(0x1234_5680));
    }
}
