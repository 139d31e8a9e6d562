//! Presentation of the cached filtered frame.
//!
//! `redraw` is written against `PresentTarget` so the ordering and skip rules
//! hold for any surface: the wgpu one in `gpu::surface_target` and the
//! recording mock in the tests below.

use crate::filter::FilteredFrame;

/// Uniform scale and offset placing the image on the drawable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitTransform {
    pub scale: f32,
    /// Top-left of the scaled image in drawable pixels. Negative when cropped.
    pub offset: [f32; 2],
}

impl FitTransform {
    /// `scale = max(dw / fw, dh / fh)`: the image covers the drawable and the
    /// overflow on the longer axis is cropped evenly on both sides.
    pub fn compute(frame: (u32, u32), drawable: (u32, u32)) -> Self {
        let fw = frame.0.max(1) as f32;
        let fh = frame.1.max(1) as f32;
        let dw = drawable.0 as f32;
        let dh = drawable.1 as f32;
        let scale = (dw / fw).max(dh / fh);
        Self {
            scale,
            offset: [(dw - fw * scale) * 0.5, (dh - fh * scale) * 0.5],
        }
    }

    /// Map a drawable pixel position to image coordinates.
    #[cfg(test)]
    pub fn to_image(&self, x: f32, y: f32) -> [f32; 2] {
        [(x - self.offset[0]) / self.scale, (y - self.offset[1]) / self.scale]
    }
}

/// Result of one redraw tick. Everything but `Presented` issued no submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawOutcome {
    Presented,
    NoCommandBuffer,
    NoFilteredFrame,
    /// The surface withheld its drawable (previous present still in flight).
    NoDrawable,
}

/// A GPU surface with a command queue.
pub trait PresentTarget {
    type Commands;
    type Drawable;

    fn command_buffer(&mut self) -> Option<Self::Commands>;
    fn next_drawable(&mut self) -> Option<Self::Drawable>;
    fn drawable_size(&self, drawable: &Self::Drawable) -> (u32, u32);

    /// Record rendering of `image` into the drawable's full extent.
    fn encode(
        &mut self,
        commands: &mut Self::Commands,
        drawable: &Self::Drawable,
        image: &FilteredFrame,
        fit: &FitTransform,
    );

    /// Schedule presentation of the drawable as part of `commands`.
    fn present(&mut self, commands: &mut Self::Commands, drawable: Self::Drawable);

    fn submit(&mut self, commands: Self::Commands);
}

/// Render `frame` into the target's current drawable and present it.
pub fn redraw<T: PresentTarget>(target: &mut T, frame: Option<&FilteredFrame>) -> RedrawOutcome {
    let Some(mut commands) = target.command_buffer() else {
        return RedrawOutcome::NoCommandBuffer;
    };
    let Some(image) = frame else {
        return RedrawOutcome::NoFilteredFrame;
    };
    let Some(drawable) = target.next_drawable() else {
        return RedrawOutcome::NoDrawable;
    };

    let fit = FitTransform::compute(image.extent(), target.drawable_size(&drawable));
    target.encode(&mut commands, &drawable, image, &fit);
    target.present(&mut commands, drawable);
    target.submit(commands);
    RedrawOutcome::Presented
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Call {
        CommandBuffer,
        NextDrawable,
        Encode,
        Present,
        Submit,
    }

    /// Records calls; drawable and command buffer availability are switchable.
    pub struct MockTarget {
        pub size: (u32, u32),
        pub drawable_available: bool,
        pub queue_available: bool,
        pub calls: Vec<Call>,
        pub last_fit: Option<FitTransform>,
    }

    impl MockTarget {
        pub fn new(size: (u32, u32)) -> Self {
            Self {
                size,
                drawable_available: true,
                queue_available: true,
                calls: Vec::new(),
                last_fit: None,
            }
        }

        pub fn count(&self, call: Call) -> usize {
            self.calls.iter().filter(|c| **c == call).count()
        }
    }

    impl PresentTarget for MockTarget {
        type Commands = ();
        type Drawable = (u32, u32);

        fn command_buffer(&mut self) -> Option<()> {
            self.calls.push(Call::CommandBuffer);
            self.queue_available.then_some(())
        }

        fn next_drawable(&mut self) -> Option<(u32, u32)> {
            self.calls.push(Call::NextDrawable);
            self.drawable_available.then_some(self.size)
        }

        fn drawable_size(&self, drawable: &(u32, u32)) -> (u32, u32) {
            *drawable
        }

        fn encode(&mut self, _: &mut (), _: &(u32, u32), _: &FilteredFrame, fit: &FitTransform) {
            self.calls.push(Call::Encode);
            self.last_fit = Some(*fit);
        }

        fn present(&mut self, _: &mut (), _: (u32, u32)) {
            self.calls.push(Call::Present);
        }

        fn submit(&mut self, (): ()) {
            self.calls.push(Call::Submit);
        }
    }
}
