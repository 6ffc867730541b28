// src/target.rs

//! The `BlitTarget` trait: the destination side of the copy engine.
//!
//! One generic copy algorithm drives wildly different sinks: an in-memory
//! `Bitmap`, or a streaming display controller that wants an addressing
//! window opened before pixels arrive. The destination describes what it
//! can do through [`Caps`], discovered once per copy; everything optional
//! has a default no-op so a plain memory buffer implements exactly two
//! methods.
//!
//! ## Protocol obligations
//!
//! - `suspend`/`resume` are paired: if the engine suspends a destination it
//!   resumes it on every exit path, success or failure. Destinations use
//!   this to pause unrelated background activity (an autonomous refresh
//!   cycle, say) for the duration of a bulk transfer.
//! - `begin_batch` receives the full target rectangle up front so the
//!   destination can prepare addressing; `write_batch` then streams pixels
//!   in row-major order; `commit_batch` is always called, including after
//!   a mid-batch failure, so the destination is left consistent.
//! - `wait` is called before any operation that could race an in-flight
//!   asynchronous transfer the destination issued earlier.

use crate::error::{BlitError, BlitResult};
use crate::format::PixelFormat;
use crate::geometry::{Point, Rect, Size};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Capability descriptor a destination reports at compose time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct Caps: u8 {
        /// `suspend`/`resume` bracket bulk transfers.
        const SUSPEND = 1 << 0;
        /// The batch protocol (`begin_batch`/`write_batch`/`commit_batch`).
        const BATCH = 1 << 1;
        /// Raw byte-range access; enables the no-conversion fast path.
        const RAW_BLIT = 1 << 2;
        /// Pixels can be read back (required to composite alpha sources).
        const READABLE = 1 << 3;
        /// The destination may have asynchronous transfers in flight.
        const ASYNC = 1 << 4;
    }
}

/// A destination the copy engine can write a rectangle of pixels into.
pub trait BlitTarget {
    /// The pixel format this destination stores.
    type Format: PixelFormat;

    /// Capabilities of this destination. Defaults to none.
    fn caps(&self) -> Caps {
        Caps::empty()
    }

    /// Extent of the addressable area.
    fn dimensions(&self) -> Size;

    /// Bounding rectangle, anchored at the origin.
    fn bounds(&self) -> Rect {
        Rect::from_size(self.dimensions())
    }

    /// Writes one pixel. Out-of-bounds locations are a silent success.
    fn set_pixel(&mut self, location: Point, raw: u32) -> BlitResult<()>;

    /// Reads one pixel; only meaningful when [`Caps::READABLE`] is set.
    ///
    /// Out-of-bounds locations return the default (all-zero) pixel.
    fn pixel(&self, location: Point) -> BlitResult<u32> {
        let _ = location;
        Err(BlitError::NotSupported)
    }

    /// Pauses background activity ahead of a bulk transfer.
    fn suspend(&mut self) -> BlitResult<()> {
        Ok(())
    }

    /// Resumes after [`suspend`](Self::suspend). Always paired.
    fn resume(&mut self) -> BlitResult<()> {
        Ok(())
    }

    /// Opens a batch targeting `rect`.
    fn begin_batch(&mut self, rect: Rect) -> BlitResult<()> {
        let _ = rect;
        Ok(())
    }

    /// Streams the next pixel of an open batch, row-major.
    fn write_batch(&mut self, raw: u32) -> BlitResult<()> {
        let _ = raw;
        Err(BlitError::NotSupported)
    }

    /// Finalizes the current batch. Called on every exit from a batched
    /// copy, including failure.
    fn commit_batch(&mut self) -> BlitResult<()> {
        Ok(())
    }

    /// Raw packed storage; only meaningful when [`Caps::RAW_BLIT`] is set.
    fn raw_buffer_mut(&mut self) -> Option<&mut [u8]> {
        None
    }

    /// Blocks until any outstanding asynchronous transfer completes.
    fn wait(&mut self) -> BlitResult<()> {
        Ok(())
    }
}
