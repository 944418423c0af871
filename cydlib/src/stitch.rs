/// Value of erased flash, used for every byte no segment covers.
pub const FILL_BYTE: u8 = 0xFF;

/// A contiguous run of bytes placed at a fixed flash offset.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Segment {
    pub offset: usize,
    pub data: Vec<u8>,
}

impl Segment {
    pub fn new(offset: usize, data: Vec<u8>) -> Self {
        Self { offset, data }
    }

    pub fn new_cloned(offset: usize, data: &[u8]) -> Self {
        Self::new(offset, data.to_owned())
    }

    /// One past the last flash byte this segment covers.
    pub fn end(&self) -> usize {
        self.offset + self.data.len()
    }
}

/// A flat flash image, starting at address 0.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Default)]
pub struct FlashImage {
    data: Vec<u8>,
}

impl FlashImage {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl std::ops::Deref for FlashImage {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

/// Stitch segments into one image padded with [`FILL_BYTE`].
///
/// The image is exactly as long as the furthest segment end. Segments are
/// written in the order given, so where two overlap the later one wins.
///
/// This is only a byte-level placement: unlike a vendor merge tool it
/// applies no image framing or checksums of its own.
pub fn stitch(segments: &[Segment]) -> FlashImage {
    let end = segments.iter().map(Segment::end).max().unwrap_or(0);

    let mut image = vec![FILL_BYTE; end];
    for segment in segments {
        image[segment.offset..segment.end()].copy_from_slice(&segment.data);
    }

    FlashImage::new(image)
}
