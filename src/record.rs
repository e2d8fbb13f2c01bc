use crate::error::RecordError;
use crate::surface::DotCanvas;
use gif::{Encoder, Frame, Repeat};
use log::info;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Frame delay in hundredths of a second (~50 fps playback)
const FRAME_DELAY_CS: u16 = 2;

/// Hits on a single dot needed for full white
const SATURATION_HITS: f32 = 4.0;

/// Writes rendered frames into an animated grayscale GIF
pub struct GifRecorder<W: Write> {
    encoder: Encoder<W>,
    width: u16,
    height: u16,
    frames: usize,
}

impl GifRecorder<BufWriter<File>> {
    pub fn create(path: &Path, width: usize, height: usize) -> Result<Self, RecordError> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file), width, height)
    }
}

impl<W: Write> GifRecorder<W> {
    pub fn new(writer: W, width: usize, height: usize) -> Result<Self, RecordError> {
        let (w, h) = match (u16::try_from(width), u16::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
            _ => return Err(RecordError::FrameTooLarge { width, height }),
        };

        let palette: Vec<u8> = (0..=255u8).flat_map(|v| [v, v, v]).collect();
        let mut encoder = Encoder::new(writer, w, h, &palette)?;
        encoder.set_repeat(Repeat::Infinite)?;

        Ok(Self {
            encoder,
            width: w,
            height: h,
            frames: 0,
        })
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width as usize, self.height as usize)
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Append one frame; the dot canvas must match the recorder's dimensions
    pub fn capture(&mut self, dots: &DotCanvas, brightness: f32) -> Result<(), RecordError> {
        let (w, h) = self.dimensions();
        let brightness = brightness.clamp(0.0, 1.0);
        let mut pixels = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                let hits = dots.hits(x, y) as f32;
                let level = (hits / SATURATION_HITS).min(1.0) * brightness * 255.0;
                pixels.push(level.round() as u8);
            }
        }

        let mut frame = Frame::default();
        frame.width = self.width;
        frame.height = self.height;
        frame.delay = FRAME_DELAY_CS;
        frame.buffer = Cow::Owned(pixels);
        self.encoder.write_frame(&frame)?;
        self.frames += 1;
        Ok(())
    }

    /// Write the trailer and hand back the writer
    pub fn finish(self) -> Result<W, RecordError> {
        info!("recorded {} frames", self.frames());
        Ok(self.encoder.into_inner()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_decodable_frames() {
        let mut recorder = GifRecorder::new(Vec::new(), 8, 4).unwrap();
        let mut dots = DotCanvas::new(8, 4);
        dots.plot(2.0, 1.0, 0);
        recorder.capture(&dots, 1.0).unwrap();
        recorder.capture(&DotCanvas::new(8, 4), 1.0).unwrap();
        assert_eq!(recorder.frames(), 2);
        let bytes = recorder.finish().unwrap();

        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::Indexed);
        let mut decoder = options.read_info(bytes.as_slice()).unwrap();
        assert_eq!((decoder.width(), decoder.height()), (8, 4));

        let first = decoder.read_next_frame().unwrap().unwrap();
        // One hit out of four for saturation
        assert_eq!(first.buffer[1 * 8 + 2], 64);
        assert_eq!(first.buffer[0], 0);
        assert!(decoder.read_next_frame().unwrap().is_some());
        assert!(decoder.read_next_frame().unwrap().is_none());
    }

    #[test]
    fn test_rejects_oversized_frames() {
        assert!(matches!(
            GifRecorder::new(Vec::new(), 70_000, 10),
            Err(RecordError::FrameTooLarge { .. })
        ));
        assert!(GifRecorder::new(Vec::new(), 0, 10).is_err());
    }

    #[test]
    fn test_create_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gif");
        let mut recorder = GifRecorder::create(&path, 4, 4).unwrap();
        recorder.capture(&DotCanvas::new(4, 4), 1.0).unwrap();
        recorder.finish().unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
