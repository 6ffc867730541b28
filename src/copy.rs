// src/copy.rs

//! The generic rectangular copy/blit engine.
//!
//! One algorithm moves a rectangle of pixels from a [`Bitmap`] source into
//! any [`BlitTarget`]. Both rectangles are cropped to their bounds and
//! equalized in extent, then the engine picks a path:
//!
//! - **Fast path**: identical pixel formats, no alpha channel, and a
//!   destination exposing raw storage: rows are copied as contiguous byte
//!   ranges, or (for formats that are not byte-aligned) as bounded bit
//!   blocks realigned through a scratch buffer and merged in place.
//! - **Slow path**: everything else: per-pixel read, convert (compositing
//!   against the destination's current content when the source carries
//!   alpha), write. A batching destination gets the full rectangle up
//!   front and a row-major pixel stream.
//!
//! Protocol guarantees regardless of outcome: a suspended destination is
//! always resumed, an opened batch is always committed, and an `ASYNC`
//! destination is waited on before the first write. The first failing
//! pixel aborts the operation; pixels already written stay written.

use crate::bitmap::Bitmap;
use crate::bits;
use crate::error::{BlitError, BlitResult};
use crate::format::{self, PixelFormat};
use crate::geometry::{Point, Rect};
use crate::target::{BlitTarget, Caps};
use log::{debug, trace};

/// Cap on the per-block scratch used by the unaligned fast path, so a
/// copy never needs storage proportional to the row length.
const MAX_BLOCK_BITS: usize = 1024;

/// Block bytes plus one byte of shift spill on either side of the copy.
const SCRATCH_BYTES: usize = MAX_BLOCK_BITS / 8 + 2;

/// Copies `src_rect` of `src` into `dst` with its corner at `location`.
///
/// Cropping comes first: the source rectangle is clamped to the source
/// bounds and the destination rectangle (placed at `location` with the
/// cropped extent) to the destination bounds; whichever is smaller then
/// shrinks the other so both cover the same extent. An empty result is a
/// clean success, like every other out-of-bounds case in this crate.
pub fn copy_bitmap<S: PixelFormat, D: BlitTarget>(
    src: &Bitmap<S>,
    src_rect: Rect,
    dst: &mut D,
    location: Point,
) -> BlitResult<()> {
    if !src.initialized() {
        return Err(BlitError::OutOfMemory);
    }
    let srcr = src_rect.crop(&src.bounds());
    if srcr.is_empty() {
        return Ok(());
    }
    let dstr = Rect::at(location, srcr.size()).crop(&dst.bounds());
    let width = srcr.width.min(dstr.width);
    let height = srcr.height.min(dstr.height);
    if width == 0 || height == 0 {
        return Ok(());
    }
    let srcr = Rect::new(srcr.x, srcr.y, width, height);
    let dstr = Rect::new(dstr.x, dstr.y, width, height);

    let caps = dst.caps();
    trace!(
        "copy {width}x{height}: src ({},{}) -> dst ({},{}), caps {caps:?}",
        srcr.x,
        srcr.y,
        dstr.x,
        dstr.y
    );
    if caps.contains(Caps::ASYNC) {
        // Never race an in-flight transfer the destination issued earlier.
        dst.wait()?;
    }
    if !caps.contains(Caps::SUSPEND) {
        return copy_rect(src, srcr, dst, dstr, caps);
    }
    dst.suspend()?;
    let result = copy_rect(src, srcr, dst, dstr, caps);
    // Resume on every exit path; the copy's own failure wins.
    let resumed = dst.resume();
    result.and(resumed)
}

fn copy_rect<S: PixelFormat, D: BlitTarget>(
    src: &Bitmap<S>,
    srcr: Rect,
    dst: &mut D,
    dstr: Rect,
    caps: Caps,
) -> BlitResult<()> {
    if format::same_format::<S, D::Format>() && !S::HAS_ALPHA && caps.contains(Caps::RAW_BLIT) {
        let src_width = src.dimensions().width as usize;
        let dst_width = dst.dimensions().width as usize;
        let src_bytes = src.as_bytes().ok_or(BlitError::OutOfMemory)?;
        if let Some(dst_bytes) = dst.raw_buffer_mut() {
            debug!("raw blit path, byte_aligned={}", S::BYTE_ALIGNED);
            blit_raw::<S>(src_bytes, src_width, srcr, dst_bytes, dst_width, dstr);
            return Ok(());
        }
        debug!("RAW_BLIT advertised but no buffer produced; using pixel path");
    }
    copy_pixels(src, srcr, dst, dstr, caps)
}

/// Raw-range copy between two packed buffers of the same format.
fn blit_raw<F: PixelFormat>(
    src: &[u8],
    src_width: usize,
    srcr: Rect,
    dst: &mut [u8],
    dst_width: usize,
    dstr: Rect,
) {
    let width = dstr.width as usize;
    let height = dstr.height as usize;
    if F::BYTE_ALIGNED {
        let row_bytes = width * F::PACKED_SIZE;
        for dy in 0..height {
            let s = ((srcr.y as usize + dy) * src_width + srcr.x as usize) * F::PACKED_SIZE;
            let d = ((dstr.y as usize + dy) * dst_width + dstr.x as usize) * F::PACKED_SIZE;
            dst[d..d + row_bytes].copy_from_slice(&src[s..s + row_bytes]);
        }
        return;
    }
    // Unaligned: realign per block through a bounded scratch buffer. The
    // same shift-and-merge as a single-pixel store, batched for throughput.
    let block_pixels = (MAX_BLOCK_BITS / F::BIT_DEPTH).max(1).min(width);
    let mut scratch = [0u8; SCRATCH_BYTES];
    for dy in 0..height {
        let mut dx = 0usize;
        while dx < width {
            let pixels = block_pixels.min(width - dx);
            let bit_len = pixels * F::BIT_DEPTH;
            let src_off =
                ((srcr.y as usize + dy) * src_width + srcr.x as usize + dx) * F::BIT_DEPTH;
            let dst_off =
                ((dstr.y as usize + dy) * dst_width + dstr.x as usize + dx) * F::BIT_DEPTH;
            let sp = src_off % 8;
            let dp = dst_off % 8;
            let src_span = (sp + bit_len + 7) / 8;
            let dst_span = (dp + bit_len + 7) / 8;
            let work = src_span.max(dst_span) + 1;
            scratch[..src_span].copy_from_slice(&src[src_off / 8..src_off / 8 + src_span]);
            scratch[src_span..work].fill(0);
            if dp > sp {
                bits::shift_bytes_right(&mut scratch[..work], dp - sp);
            } else if sp > dp {
                bits::shift_bytes_left(&mut scratch[..work], sp - dp);
            }
            let d0 = dst_off / 8;
            bits::merge_bits(&mut dst[d0..d0 + dst_span], dp, bit_len, &scratch[..dst_span]);
            dx += pixels;
        }
    }
}

/// Per-pixel convert/compose path, batched when the destination allows.
fn copy_pixels<S: PixelFormat, D: BlitTarget>(
    src: &Bitmap<S>,
    srcr: Rect,
    dst: &mut D,
    dstr: Rect,
    caps: Caps,
) -> BlitResult<()> {
    let batched = caps.contains(Caps::BATCH);
    debug!("pixel path, batched={batched}, alpha={}", S::HAS_ALPHA);
    if batched {
        dst.begin_batch(dstr)?;
    }
    let result = stream_pixels(src, srcr, dst, dstr, caps, batched);
    if batched {
        // Close the batch on every exit so the destination stays
        // consistent; the stream's own failure wins.
        let committed = dst.commit_batch();
        result.and(committed)
    } else {
        result
    }
}

fn stream_pixels<S: PixelFormat, D: BlitTarget>(
    src: &Bitmap<S>,
    srcr: Rect,
    dst: &mut D,
    dstr: Rect,
    caps: Caps,
    batched: bool,
) -> BlitResult<()> {
    for dy in 0..dstr.height {
        for dx in 0..dstr.width {
            let sloc = Point::new(srcr.x + dx, srcr.y + dy);
            let dloc = Point::new(dstr.x + dx, dstr.y + dy);
            let spx = src.pixel(sloc)?;
            let out = if S::HAS_ALPHA {
                if !caps.contains(Caps::READABLE) {
                    return Err(BlitError::NotSupported);
                }
                let bg = dst.pixel(dloc)?;
                format::convert_over::<S, D::Format>(spx, bg)
                    .ok_or(BlitError::InvalidFormat)?
            } else {
                format::convert::<S, D::Format>(spx).ok_or(BlitError::InvalidFormat)?
            };
            if batched {
                dst.write_batch(out)?;
            } else {
                dst.set_pixel(dloc, out)?;
            }
        }
    }
    Ok(())
}
