// src/bitmap.rs

//! The packed, bit-addressable in-memory bitmap.
//!
//! A `Bitmap<F>` owns a contiguous byte buffer holding `width * height`
//! pixels at `F::BIT_DEPTH` bits each, packed row-major with no per-row
//! padding: pixel `(x, y)` starts at bit offset
//! `(y * width + x) * BIT_DEPTH`. The buffer is always exactly
//! [`Bitmap::buffer_size`] bytes; external allocators size against that
//! value, so it is never rounded up further.
//!
//! Out-of-bounds access is defined, not an error: reads yield the default
//! (all-zero) pixel and writes are silent no-ops, so callers can draw
//! partially off-canvas shapes without pre-clipping. The only hard failure
//! a healthy bitmap produces is `OutOfMemory` on the uninitialized state
//! (no backing buffer).

use crate::bits;
use crate::error::{BlitError, BlitResult};
use crate::format::PixelFormat;
use crate::geometry::{Point, Rect, Size};
use crate::target::{BlitTarget, Caps};
use std::marker::PhantomData;


/// An owned, packed pixel buffer addressed at bit granularity.
///
/// Created either with its own zeroed storage ([`new`](Bitmap::new)), by
/// adopting a caller-supplied buffer ([`with_buffer`](Bitmap::with_buffer)),
/// or without storage at all ([`uninit`](Bitmap::uninit)) to model a failed
/// allocation. Adopted buffers are handed back by
/// [`into_buffer`](Bitmap::into_buffer); dropping the bitmap releases owned
/// storage. Not `Clone`: two bitmaps never alias one buffer.
#[derive(Debug)]
pub struct Bitmap<F: PixelFormat> {
    dims: Size,
    buf: Option<Box<[u8]>>,
    _format: PhantomData<F>,
}

impl<F: PixelFormat> Bitmap<F> {
    /// Minimum buffer size in bytes for `size` pixels of this format.
    ///
    /// Exact, never padded: `ceil(width * height * BIT_DEPTH / 8)`.
    pub fn buffer_size(size: Size) -> usize {
        (size.pixels() * F::BIT_DEPTH + 7) / 8
    }

    /// Creates a bitmap with freshly allocated, zeroed storage.
    pub fn new(dims: Size) -> Self {
        let buf = vec![0u8; Self::buffer_size(dims)].into_boxed_slice();
        Self {
            dims,
            buf: Some(buf),
            _format: PhantomData,
        }
    }

    /// Creates a bitmap over a caller-supplied buffer, taking ownership.
    ///
    /// # Panics
    /// Panics if `buffer.len()` differs from [`buffer_size`](Self::buffer_size).
    pub fn with_buffer(dims: Size, buffer: Box<[u8]>) -> Self {
        assert_eq!(
            buffer.len(),
            Self::buffer_size(dims),
            "buffer length must match the packed size exactly"
        );
        Self {
            dims,
            buf: Some(buffer),
            _format: PhantomData,
        }
    }

    /// Creates a bitmap with no backing buffer.
    ///
    /// Every pixel operation on it fails with
    /// [`OutOfMemory`](BlitError::OutOfMemory); this is the state a failed
    /// allocation leaves behind.
    pub fn uninit(dims: Size) -> Self {
        Self {
            dims,
            buf: None,
            _format: PhantomData,
        }
    }

    /// True when the bitmap has a backing buffer.
    #[inline]
    pub fn initialized(&self) -> bool {
        self.buf.is_some()
    }

    /// The bitmap's extent.
    #[inline]
    pub fn dimensions(&self) -> Size {
        self.dims
    }

    /// Bounding rectangle anchored at the origin.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.dims)
    }

    /// Number of pixels.
    #[inline]
    pub fn size_pixels(&self) -> usize {
        self.dims.pixels()
    }

    /// Packed storage size in bytes.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        Self::buffer_size(self.dims)
    }

    /// The raw packed bytes, if a buffer is present.
    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.buf.as_deref()
    }

    /// Mutable raw packed bytes, if a buffer is present.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> Option<&mut [u8]> {
        self.buf.as_deref_mut()
    }

    /// Releases the backing buffer to the caller, leaving nothing behind.
    pub fn into_buffer(self) -> Option<Box<[u8]>> {
        self.buf
    }

    #[inline]
    fn bit_offset(&self, location: Point) -> usize {
        (location.y as usize * self.dims.width as usize + location.x as usize) * F::BIT_DEPTH
    }

    /// Reads the pixel at `location`.
    ///
    /// Out-of-bounds locations yield the default (all-zero) pixel and
    /// succeed. The result always satisfies `v & F::MASK == v`.
    pub fn pixel(&self, location: Point) -> BlitResult<u32> {
        let buf = self.buf.as_deref().ok_or(BlitError::OutOfMemory)?;
        if !self.bounds().contains(location) {
            return Ok(0);
        }
        Ok(bits::read_field(
            buf,
            self.bit_offset(location),
            F::BIT_DEPTH,
        ))
    }

    /// Writes the pixel at `location`. Out of bounds is a silent no-op.
    ///
    /// For alpha-bearing formats the incoming value is composited over the
    /// pixel already stored there; a channel set that cannot composite
    /// fails with [`NotSupported`](BlitError::NotSupported). The store
    /// itself merges into the buffer at the exact bit offset, leaving
    /// neighboring pixels that share a byte untouched.
    pub fn set_pixel(&mut self, location: Point, raw: u32) -> BlitResult<()> {
        if self.buf.is_none() {
            return Err(BlitError::OutOfMemory);
        }
        if !self.bounds().contains(location) {
            return Ok(());
        }
        let mut value = raw & F::MASK;
        if F::HAS_ALPHA {
            let bg = self.pixel(location)?;
            value = F::blend(value, bg).ok_or(BlitError::NotSupported)?;
        }
        self.store(location, value)
    }

    /// Merges `value` into the buffer at `location` with no compositing.
    fn store(&mut self, location: Point, value: u32) -> BlitResult<()> {
        let off = self.bit_offset(location);
        let buf = self.buf.as_deref_mut().ok_or(BlitError::OutOfMemory)?;
        bits::write_field(buf, off, F::BIT_DEPTH, value);
        Ok(())
    }

    /// Fills a rectangle with one pixel value.
    ///
    /// The rectangle is cropped to the bitmap; an empty crop succeeds.
    /// A non-opaque fill on an alpha format is content-dependent and
    /// degrades to a per-pixel composite loop. Opaque fills take a bulk
    /// path: whole-byte stores per row when the format is byte-aligned, a
    /// per-phase bit template otherwise, and a straight bit-range set for
    /// 1-bit formats. On failure, rows already filled stay filled.
    pub fn fill(&mut self, rect: Rect, raw: u32) -> BlitResult<()> {
        let r = rect.crop(&self.bounds());
        if r.is_empty() {
            return Ok(());
        }
        let raw = raw & F::MASK;
        if F::HAS_ALPHA && !F::is_opaque(raw) {
            return self.fill_composited(r, raw);
        }
        let width = self.dims.width as usize;
        let buf = self.buf.as_deref_mut().ok_or(BlitError::OutOfMemory)?;
        if F::BYTE_ALIGNED {
            let packed = raw.to_be_bytes();
            let packed = &packed[4 - F::PACKED_SIZE..];
            for dy in 0..r.height as usize {
                let row = (r.y as usize + dy) * width + r.x as usize;
                let mut at = row * F::PACKED_SIZE;
                for _ in 0..r.width as usize {
                    buf[at..at + F::PACKED_SIZE].copy_from_slice(packed);
                    at += F::PACKED_SIZE;
                }
            }
        } else if F::BIT_DEPTH == 1 {
            let set = raw != 0;
            for dy in 0..r.height as usize {
                let off = (r.y as usize + dy) * width + r.x as usize;
                bits::fill_bits(buf, off, r.width as usize, set);
            }
        } else {
            // One pre-shifted template per distinct bit phase; the phase
            // only changes when the running offset modulo 8 does.
            let mut tmpl = [0u8; 8];
            let mut tmpl_len = 0usize;
            let mut last_phase = usize::MAX;
            for dy in 0..r.height as usize {
                for dx in 0..r.width as usize {
                    let off =
                        ((r.y as usize + dy) * width + r.x as usize + dx) * F::BIT_DEPTH;
                    let phase = off % 8;
                    if phase != last_phase {
                        tmpl_len = (phase + F::BIT_DEPTH + 7) / 8;
                        let aligned =
                            (raw as u64) << (tmpl_len * 8 - phase - F::BIT_DEPTH);
                        tmpl[..tmpl_len]
                            .copy_from_slice(&aligned.to_be_bytes()[8 - tmpl_len..]);
                        last_phase = phase;
                    }
                    let first = off / 8;
                    bits::merge_bits(
                        &mut buf[first..first + tmpl_len],
                        phase,
                        F::BIT_DEPTH,
                        &tmpl[..tmpl_len],
                    );
                }
            }
        }
        Ok(())
    }

    /// Per-pixel fill for non-opaque colors: read, composite, store.
    fn fill_composited(&mut self, r: Rect, raw: u32) -> BlitResult<()> {
        for dy in 0..r.height {
            for dx in 0..r.width {
                let p = Point::new(r.x + dx, r.y + dy);
                let bg = self.pixel(p)?;
                let value = F::blend(raw, bg).ok_or(BlitError::NotSupported)?;
                self.store(p, value)?;
            }
        }
        Ok(())
    }

    /// Clears a rectangle to the zero-valued pixel.
    #[inline]
    pub fn clear(&mut self, rect: Rect) -> BlitResult<()> {
        self.fill(rect, 0)
    }

    /// Copies a rectangle of this bitmap into `dst` at `location`.
    ///
    /// Both rectangles are cropped to their bounds and kept equal in
    /// extent; see the [`copy`](crate::copy) module for path selection.
    pub fn copy_to<D: BlitTarget>(
        &self,
        src_rect: Rect,
        dst: &mut D,
        location: Point,
    ) -> BlitResult<()> {
        crate::copy::copy_bitmap(self, src_rect, dst, location)
    }
}

impl<F: PixelFormat> BlitTarget for Bitmap<F> {
    type Format = F;

    fn caps(&self) -> Caps {
        Caps::RAW_BLIT | Caps::READABLE
    }

    fn dimensions(&self) -> Size {
        self.dims
    }

    fn set_pixel(&mut self, location: Point, raw: u32) -> BlitResult<()> {
        Bitmap::set_pixel(self, location, raw)
    }

    fn pixel(&self, location: Point) -> BlitResult<u32> {
        Bitmap::pixel(self, location)
    }

    fn raw_buffer_mut(&mut self) -> Option<&mut [u8]> {
        self.buf.as_deref_mut()
    }
}
