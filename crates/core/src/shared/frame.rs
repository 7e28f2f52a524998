use ndarray::ArrayView3;

use super::geometry::Dimensions;

/// A single captured video sample: contiguous RGB bytes in row-major order.
///
/// Capture sources hand frames out as `Arc<Frame>`; the loop only ever
/// holds the latest one for the duration of a cycle.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// Blank RGB frame, mostly useful for stubs.
    pub fn black(width: u32, height: u32, index: usize) -> Self {
        Self::new(
            vec![0u8; width as usize * height as usize * 3],
            width,
            height,
            3,
            index,
        )
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Native pixel dimensions of the sample.
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Sample index assigned by the capture source, increasing per decoded frame.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
