#[cfg(feature = "cli")]
use std::{
    env,
    error::Error,
    ffi::OsString,
    fs::File,
    io::{BufWriter, Write},
};

#[cfg(feature = "cli")]
use marker_lzss::*;

#[cfg(feature = "cli")]
fn parse_arg(args: &[OsString], idx: usize, default: u8) -> Result<u8, Box<dyn Error>> {
    match args.get(idx).and_then(|a| a.to_str()) {
        None => Ok(default),
        Some(a) => match a.strip_prefix("0x") {
            Some(hex) => Ok(u8::from_str_radix(hex, 16)?),
            None => Ok(a.parse()?),
        },
    }
}

#[cfg(feature = "cli")]
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<OsString> = env::args_os().collect();

    if args.len() < 4 {
        println!(
            "Usage: {} c|d input output [symbol] [address-bytes] [length-bytes]",
            args[0].to_string_lossy()
        );
        return Ok(());
    }

    let mode = &args[1];
    let inp_fn = &args[2];
    let outp_fn = &args[3];

    let settings = Settings::new(parse_arg(&args, 4, 0)?)
        .with_widths(parse_arg(&args, 5, 2)?, parse_arg(&args, 6, 1)?);

    let inp = std::fs::read(inp_fn)?;
    let outp = match mode.to_str() {
        Some("c") => Compressor::with_calldata_gas(settings).compress_to_vec(&inp)?,
        Some("d") => decompress_to_vec(&inp, &settings, None)?,
        _ => {
            println!("Invalid mode {}", mode.to_string_lossy());
            return Ok(());
        }
    };

    let mut outp_f = BufWriter::new(File::create(outp_fn)?);
    outp_f.write_all(&outp)?;
    outp_f.flush()?;

    tracing::info!(
        input_len = inp.len(),
        output_len = outp.len(),
        "wrote {}",
        outp_fn.to_string_lossy()
    );

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    println!("Demo requires cli feature");
}
