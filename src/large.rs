// src/large.rs

//! The segmented "large bitmap": one logical image, many bounded buffers.
//!
//! Allocators on small devices often cannot produce one contiguous block
//! for a tall image. `LargeBitmap` splits the image into row bands of
//! `segment_height` rows, each an independently allocated [`Bitmap`], so
//! no single allocation exceeds `width * segment_height` pixels. The
//! address space looks like a single bitmap; every operation translates
//! the global row to a segment and delegates.
//!
//! Allocation is eager and atomic: if any segment fails, everything
//! already allocated is released through the same allocator and the
//! object is left uninitialized. There is no partially usable state and
//! no leak. Large bitmaps are not clonable (that would mean deep-copying
//! many independent allocations); they move.

use crate::bitmap::Bitmap;
use crate::error::{BlitError, BlitResult};
use crate::format::PixelFormat;
use crate::geometry::{Point, Rect, Size};
use log::warn;


/// Supplies and reclaims segment buffers for [`LargeBitmap`].
///
/// Every buffer obtained from `allocate` is returned through `release`
/// exactly once, on construction failure or when the large bitmap is
/// dropped. The default [`HeapAllocator`] uses the process heap.
pub trait SegmentAllocator {
    /// Allocates a zeroed buffer of exactly `len` bytes, or `None` when
    /// the allocation cannot be satisfied.
    fn allocate(&self, len: usize) -> Option<Box<[u8]>>;

    /// Reclaims a buffer previously produced by `allocate`.
    fn release(&self, buffer: Box<[u8]>);
}

/// The default allocator: plain heap boxes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapAllocator;

impl SegmentAllocator for HeapAllocator {
    fn allocate(&self, len: usize) -> Option<Box<[u8]>> {
        Some(vec![0u8; len].into_boxed_slice())
    }

    fn release(&self, buffer: Box<[u8]>) {
        drop(buffer);
    }
}

/// A tall bitmap stored as independently allocated row bands.
///
/// Segment `i` covers global rows `[i * segment_height,
/// i * segment_height + segment_i.height)`; every segment except possibly
/// the last is exactly `segment_height` rows.
#[derive(Debug)]
pub struct LargeBitmap<F: PixelFormat, A: SegmentAllocator = HeapAllocator> {
    dims: Size,
    segment_height: u16,
    segments: Vec<Bitmap<F>>,
    alloc: A,
}

impl<F: PixelFormat> LargeBitmap<F, HeapAllocator> {
    /// Creates a large bitmap backed by the process heap.
    pub fn new(dims: Size, segment_height: u16) -> Self {
        Self::with_allocator(dims, segment_height, HeapAllocator)
    }
}

impl<F: PixelFormat, A: SegmentAllocator> LargeBitmap<F, A> {
    /// Creates a large bitmap, allocating every segment eagerly through
    /// `alloc`.
    ///
    /// `segment_height` is clamped to `1..=height`. On any allocation
    /// failure the constructor releases everything it obtained and
    /// returns an uninitialized object ([`initialized`](Self::initialized)
    /// is `false`; operations fail with `OutOfMemory`).
    pub fn with_allocator(dims: Size, segment_height: u16, alloc: A) -> Self {
        let segment_height = segment_height.max(1).min(dims.height);
        let uninit = |alloc| Self {
            dims,
            segment_height,
            segments: Vec::new(),
            alloc,
        };
        if dims.is_empty() {
            return uninit(alloc);
        }
        let count = (dims.height as usize).div_ceil(segment_height as usize);
        let mut segments = Vec::with_capacity(count);
        for i in 0..count {
            let top = i as u32 * segment_height as u32;
            let band = (dims.height as u32 - top).min(segment_height as u32) as u16;
            let seg_dims = Size::new(dims.width, band);
            match alloc.allocate(Bitmap::<F>::buffer_size(seg_dims)) {
                Some(buffer) => segments.push(Bitmap::with_buffer(seg_dims, buffer)),
                None => {
                    warn!(
                        "segment {i} of {count} failed to allocate; releasing {} segment(s)",
                        segments.len()
                    );
                    for seg in segments {
                        if let Some(buffer) = seg.into_buffer() {
                            alloc.release(buffer);
                        }
                    }
                    return uninit(alloc);
                }
            }
        }
        Self {
            dims,
            segment_height,
            segments,
            alloc,
        }
    }

    /// True when every segment was allocated.
    #[inline]
    pub fn initialized(&self) -> bool {
        !self.segments.is_empty()
    }

    /// The full logical extent.
    #[inline]
    pub fn dimensions(&self) -> Size {
        self.dims
    }

    /// Bounding rectangle anchored at the origin.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.dims)
    }

    /// Rows per segment (the last segment may be shorter).
    #[inline]
    pub fn segment_height(&self) -> u16 {
        self.segment_height
    }

    /// Number of segments.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    fn locate(&self, y: u16) -> (usize, u16) {
        (
            (y / self.segment_height) as usize,
            y % self.segment_height,
        )
    }

    /// Reads the pixel at `location`; out of bounds yields the default
    /// pixel, exactly as on [`Bitmap`].
    pub fn pixel(&self, location: Point) -> BlitResult<u32> {
        if self.segments.is_empty() {
            return Err(BlitError::OutOfMemory);
        }
        if !self.bounds().contains(location) {
            return Ok(0);
        }
        let (seg, local_y) = self.locate(location.y);
        self.segments[seg].pixel(Point::new(location.x, local_y))
    }

    /// Writes the pixel at `location`; out of bounds is a silent no-op.
    pub fn set_pixel(&mut self, location: Point, raw: u32) -> BlitResult<()> {
        if self.segments.is_empty() {
            return Err(BlitError::OutOfMemory);
        }
        if !self.bounds().contains(location) {
            return Ok(());
        }
        let (seg, local_y) = self.locate(location.y);
        self.segments[seg].set_pixel(Point::new(location.x, local_y), raw)
    }

    /// Fills a rectangle, decomposing it into one sub-rectangle per
    /// intersected segment.
    ///
    /// The first and last intersected segments receive partial bands,
    /// interior segments full ones; each sub-rectangle is expressed in
    /// that segment's local rows. A segment failure aborts immediately:
    /// segments not yet reached stay unmodified, completed ones are not
    /// rolled back.
    pub fn fill(&mut self, rect: Rect, raw: u32) -> BlitResult<()> {
        if self.segments.is_empty() {
            return Err(BlitError::OutOfMemory);
        }
        let r = rect.crop(&self.bounds());
        if r.is_empty() {
            return Ok(());
        }
        let sh = self.segment_height as u32;
        let top = r.y as u32;
        let bottom = r.bottom(); // exclusive
        let first_seg = (top / sh) as usize;
        let last_seg = ((bottom - 1) / sh) as usize;
        for seg_index in first_seg..=last_seg {
            let seg_top = seg_index as u32 * sh;
            let local_top = top.max(seg_top) - seg_top;
            let seg_height = self.segments[seg_index].dimensions().height as u32;
            let local_bottom = bottom.min(seg_top + seg_height) - seg_top;
            let band = Rect::new(
                r.x,
                local_top as u16,
                r.width,
                (local_bottom - local_top) as u16,
            );
            self.segments[seg_index].fill(band, raw)?;
        }
        Ok(())
    }

    /// Clears a rectangle to the zero-valued pixel.
    #[inline]
    pub fn clear(&mut self, rect: Rect) -> BlitResult<()> {
        self.fill(rect, 0)
    }
}

impl<F: PixelFormat, A: SegmentAllocator> Drop for LargeBitmap<F, A> {
    fn drop(&mut self) {
        for seg in std::mem::take(&mut self.segments) {
            if let Some(buffer) = seg.into_buffer() {
                self.alloc.release(buffer);
            }
        }
    }
}
