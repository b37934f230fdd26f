use std::error::Error;
use std::fs::File;
use std::time::{Duration, Instant};

use log::info;

use vip8::display::{Display, MonoTermDisplay};
use vip8::input::{Input, StdinInput};
use vip8::interpreter::Chip8Interpreter;
use vip8::sound::{Mute, SimpleBeep, Sound};

/// frame cadence of the machine's display and timer refresh (60 Hz)
const FRAME: Duration = Duration::from_micros(16_667);

fn get_cli_config<'a>() -> clap::ArgMatches<'a> {
    clap::App::new("vip8")
        .version("0.1")
        .about("CHIP-8 virtual machine for the terminal")
        .arg(
            clap::Arg::with_name("rom")
                .help("program image to run")
                .required(true)
                .index(1),
        )
        .arg(
            clap::Arg::with_name("hz")
                .long("hz")
                .takes_value(true)
                .default_value("720")
                .help("CPU steps per second"),
        )
        .arg(
            clap::Arg::with_name("mute")
                .long("mute")
                .help("silence the beeper"),
        )
        .get_matches()
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let matches = get_cli_config();
    let hz: u32 = matches.value_of("hz").unwrap().parse()?;
    // the machine has no clock of its own; the driver spreads the requested
    // step rate over 60 frames per second
    let steps_per_frame = (hz / 60).max(1);

    // initialise the collaborators, then the machine
    let mut display = MonoTermDisplay::new(64, 32)?;
    let mut input = StdinInput::new();
    let mut sound: Box<dyn Sound> = if matches.is_present("mute") {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };
    let mut interpreter = Chip8Interpreter::new();

    let rom = matches.value_of("rom").unwrap();
    interpreter.load_program(&mut File::open(rom)?)?;
    info!("running {} at {} steps/s", rom, hz);

    while !input.quit_requested() {
        let frame_start = Instant::now();

        interpreter.set_keys(input.keypad()?);
        for _ in 0..steps_per_frame {
            interpreter.step()?;
        }
        display.draw(interpreter.framebuffer())?;
        if interpreter.sound_active() {
            sound.beep()?;
        } else {
            sound.stop()?;
        }
        input.flush_keys()?;

        let spent = frame_start.elapsed();
        if spent < FRAME {
            spin_sleep::sleep(FRAME - spent);
        }
    }
    sound.stop()?;

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..12 {
        println!();
    }
    Ok(())
}
