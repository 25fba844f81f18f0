use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::error;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use ocho_core::Chip8;
use ocho_display::Display;

use crate::keymap::keymap;

pub fn run(scale: u32, cycle_delay: Duration, rom: PathBuf) -> Result<(), String> {
    let mut chip8 = Chip8::new();

    // Load ROM
    let bytes =
        fs::read(&rom).map_err(|e| format!("unable to read {}: {}", rom.display(), e))?;
    chip8.load_rom(&bytes).map_err(|e| e.to_string())?;

    // Get SDL2 context
    let sdl = sdl2::init()?;
    let mut display = Display::new(&sdl, scale)?;
    let mut events = sdl.event_pump()?;

    let mut last_cycle = Instant::now();

    // Whether or not the configured cycle delay should be respected
    let mut fast_forward = false;
    // Whether the machine should be cycled forwards or backwards
    let mut rewind = false;

    'event: loop {
        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. } => break 'event,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => chip8.key_press(kc),
                    (Keycode::Space, _) => fast_forward = true,
                    (Keycode::Escape, _) => rewind = true,
                    _ => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => chip8.key_release(kc),
                    (Keycode::Space, _) => fast_forward = false,
                    (Keycode::Escape, _) => rewind = false,
                    _ => continue,
                },
                _ => continue,
            };
        }

        // Update state; a failed cycle is logged and the loop keeps going
        if rewind {
            chip8.reverse_cycle();
        } else if let Err(e) = chip8.cycle() {
            error!("{}", e);
        }

        // If the draw flag was set, render the frame that cleared it
        if let Some(frame) = chip8.take_frame() {
            display.render(&frame)?;
        }

        // Handle timing
        let elapsed = last_cycle.elapsed();
        if !fast_forward && cycle_delay > elapsed {
            std::thread::sleep(cycle_delay - elapsed);
        }
        last_cycle = Instant::now();
    }

    Ok(())
}
