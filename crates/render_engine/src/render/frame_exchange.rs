//! Lock-protected frame handoff between the render loop and the display
//!
//! One slot of pixel data, sized once to the maximum supported resolution and
//! never reallocated mid-run, is shared between the producing render-loop
//! thread and a consuming display thread. Every access from either side goes
//! through the same mutex, held only for the duration of a copy, so the
//! consumer can never observe a frame mid-write and never stalls the producer
//! for longer than one copy.

use bytemuck::{Pod, Zeroable};
use std::sync::Mutex;

/// One linear RGB sample
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RgbSample {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
}

/// Metadata returned with a consumed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,

    /// 1-based iteration number for human-readable labeling
    ///
    /// Internal bookkeeping is 0-based; the offset is purely a presentation
    /// convention for the consumer.
    pub display_iteration: u64,
}

struct FrameSlot {
    pixels: Vec<RgbSample>,
    width: u32,
    height: u32,
    // 0-based index of the iteration whose pixels are in the slot
    valid_iteration: Option<u64>,
    // 0-based index of the most recently completed iteration, displayed or not
    last_completed: Option<u64>,
}

/// Double-buffered frame handoff shared by producer and consumer
pub struct FrameExchange {
    slot: Mutex<FrameSlot>,
    max_width: u32,
    max_height: u32,
}

impl FrameExchange {
    /// Allocate an exchange able to hold up to `max_width * max_height` pixels
    pub fn new(max_width: u32, max_height: u32) -> Self {
        let capacity = max_width as usize * max_height as usize;
        Self {
            slot: Mutex::new(FrameSlot {
                pixels: vec![RgbSample::zeroed(); capacity],
                width: 0,
                height: 0,
                valid_iteration: None,
                last_completed: None,
            }),
            max_width,
            max_height,
        }
    }

    /// Maximum frame dimensions this exchange can hold
    pub fn max_dimensions(&self) -> (u32, u32) {
        (self.max_width, self.max_height)
    }

    /// Record that iteration `iteration` completed without publishing pixels
    pub fn mark_completed(&self, iteration: u64) {
        let mut slot = self.slot.lock().unwrap();
        slot.last_completed = Some(iteration);
    }

    /// Publish the pixels of a display iteration
    ///
    /// `fill` writes interleaved RGB samples for a `width * height` frame into
    /// the slot while the lock is held; the lock is released before the caller
    /// notifies any consumer. If `fill` fails the slot keeps its previous
    /// frame and iteration label.
    pub fn publish_with<E>(
        &self,
        iteration: u64,
        width: u32,
        height: u32,
        fill: impl FnOnce(&mut [f32]) -> Result<(), E>,
    ) -> Result<(), E> {
        assert!(width <= self.max_width && height <= self.max_height);
        let mut slot = self.slot.lock().unwrap();
        slot.last_completed = Some(iteration);
        let samples = width as usize * height as usize;
        let dest = bytemuck::cast_slice_mut::<RgbSample, f32>(&mut slot.pixels[..samples]);
        fill(dest)?;
        slot.width = width;
        slot.height = height;
        slot.valid_iteration = Some(iteration);
        Ok(())
    }

    /// Publish a frame from an already-filled source buffer
    pub fn publish(&self, iteration: u64, width: u32, height: u32, source: &[f32]) {
        let samples = width as usize * height as usize * 3;
        self.publish_with::<std::convert::Infallible>(iteration, width, height, |dest| {
            dest.copy_from_slice(&source[..samples]);
            Ok(())
        })
        .unwrap();
    }

    /// Copy the latest published frame out for display
    ///
    /// Returns `None` when no frame has been published yet. The lock is held
    /// only for the duration of the copy into `destination`, which is resized
    /// to exactly `width * height * 3` samples.
    pub fn consume_into(&self, destination: &mut Vec<f32>) -> Option<FrameInfo> {
        let slot = self.slot.lock().unwrap();
        let iteration = slot.valid_iteration?;
        let samples = slot.width as usize * slot.height as usize;
        destination.resize(samples * 3, 0.0);
        destination.copy_from_slice(bytemuck::cast_slice(&slot.pixels[..samples]));
        Some(FrameInfo {
            width: slot.width,
            height: slot.height,
            display_iteration: iteration + 1,
        })
    }

    /// 0-based index of the most recently completed iteration, if any
    pub fn last_completed(&self) -> Option<u64> {
        self.slot.lock().unwrap().last_completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_consume_before_any_publish_returns_none() {
        let exchange = FrameExchange::new(4, 4);
        let mut buffer = Vec::new();
        assert!(exchange.consume_into(&mut buffer).is_none());
    }

    #[test]
    fn test_publish_then_consume_round_trips() {
        let exchange = FrameExchange::new(4, 4);
        let source = vec![0.5_f32; 2 * 2 * 3];
        exchange.publish(7, 2, 2, &source);

        let mut buffer = Vec::new();
        let info = exchange.consume_into(&mut buffer).expect("frame published");
        assert_eq!(info.width, 2);
        assert_eq!(info.height, 2);
        assert_eq!(info.display_iteration, 8); // 1-based for display
        assert_eq!(buffer, source);
    }

    #[test]
    fn test_mark_completed_does_not_publish() {
        let exchange = FrameExchange::new(4, 4);
        exchange.mark_completed(3);
        assert_eq!(exchange.last_completed(), Some(3));
        let mut buffer = Vec::new();
        assert!(exchange.consume_into(&mut buffer).is_none());
    }

    #[test]
    fn test_failed_fill_keeps_previous_frame() {
        let exchange = FrameExchange::new(2, 2);
        exchange.publish(0, 2, 2, &vec![1.0; 12]);
        let result = exchange.publish_with(1, 2, 2, |_dest| Err("device lost"));
        assert!(result.is_err());

        let mut buffer = Vec::new();
        let info = exchange.consume_into(&mut buffer).expect("previous frame");
        assert_eq!(info.display_iteration, 1);
        assert!(buffer.iter().all(|&v| (v - 1.0).abs() < f32::EPSILON));
    }

    #[test]
    fn test_concurrent_publish_and_consume_never_tear() {
        // One writer publishes frames whose pixels all equal the iteration
        // number; readers must only ever observe uniform frames.
        const WIDTH: u32 = 64;
        const HEIGHT: u32 = 64;
        const ITERATIONS: u64 = 200;
        const READERS: usize = 4;

        let exchange = Arc::new(FrameExchange::new(WIDTH, HEIGHT));
        let stop = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..READERS)
            .map(|_| {
                let exchange = Arc::clone(&exchange);
                let stop = Arc::clone(&stop);
                thread::spawn(move || {
                    let mut buffer = Vec::new();
                    let mut last_seen = 0;
                    while !stop.load(Ordering::Relaxed) {
                        if let Some(info) = exchange.consume_into(&mut buffer) {
                            let first = buffer[0];
                            assert!(
                                buffer.iter().all(|&v| v == first),
                                "observed a torn frame at display iteration {}",
                                info.display_iteration
                            );
                            // Frames may repeat but never go backwards.
                            assert!(info.display_iteration >= last_seen);
                            last_seen = info.display_iteration;
                        }
                    }
                })
            })
            .collect();

        let mut source = vec![0.0_f32; WIDTH as usize * HEIGHT as usize * 3];
        for iteration in 0..ITERATIONS {
            #[allow(clippy::cast_precision_loss)]
            source.fill(iteration as f32);
            exchange.publish(iteration, WIDTH, HEIGHT, &source);
        }
        stop.store(true, Ordering::Relaxed);
        for reader in readers {
            reader.join().expect("reader panicked");
        }
    }
}
