use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Texture, WindowCanvas};

use ocho_core::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, FRAME_PITCH};
use ocho_core::state::FrameBuffer;

/// # Display
/// An SDL2 sink for the interpreter's 64x32 monochrome frame buffer.
///
/// The buffer's cells are already all-bits-set or all-bits-clear 32-bit
/// values, so a frame maps straight onto an ARGB8888 streaming texture
/// blitted with `FRAME_PITCH` bytes per row. The texture is created once
/// at construction and reused for every frame; the `unsafe_textures`
/// feature lets it live alongside the canvas it belongs to.
pub struct Display {
    canvas: WindowCanvas,
    texture: Texture,
}

impl Display {
    /// Creates a window scaled up from the native 64x32 resolution.
    ///
    /// # Arguments
    /// * `sdl` an sdl2 context with which to draw
    /// * `scale` the size multiplier for each pixel
    pub fn new(sdl: &sdl2::Sdl, scale: u32) -> Result<Self, String> {
        let video = sdl.video()?;
        let window = video
            .window(
                "ocho",
                DISPLAY_WIDTH as u32 * scale,
                DISPLAY_HEIGHT as u32 * scale,
            )
            .position_centered()
            .opengl()
            .build()
            .map_err(|e| e.to_string())?;
        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture = canvas
            .texture_creator()
            .create_texture_streaming(
                PixelFormatEnum::ARGB8888,
                DISPLAY_WIDTH as u32,
                DISPLAY_HEIGHT as u32,
            )
            .map_err(|e| e.to_string())?;
        Ok(Display { canvas, texture })
    }

    /// Expands frame buffer cells into the byte layout of an ARGB8888
    /// texture: the native-endian encoding of each cell.
    fn frame_to_texture(frame: &FrameBuffer) -> Vec<u8> {
        frame.iter().flat_map(|cell| cell.to_ne_bytes()).collect()
    }

    /// Uploads the frame to the streaming texture and presents it.
    pub fn render(&mut self, frame: &FrameBuffer) -> Result<(), String> {
        self.texture
            .update(None, &Display::frame_to_texture(frame), FRAME_PITCH)
            .map_err(|e| e.to_string())?;
        self.canvas.copy(&self.texture, None, None)?;
        self.canvas.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocho_core::constants::{PIXEL_OFF, PIXEL_ON};

    #[test]
    fn test_frame_to_texture() {
        let mut frame: FrameBuffer = [PIXEL_OFF; DISPLAY_WIDTH * DISPLAY_HEIGHT];
        frame[1] = PIXEL_ON;
        let bytes = Display::frame_to_texture(&frame);

        assert_eq!(bytes.len(), FRAME_PITCH * DISPLAY_HEIGHT);
        assert_eq!(bytes[0..4], [0x00; 4]);
        assert_eq!(bytes[4..8], [0xFF; 4]);
    }
}
