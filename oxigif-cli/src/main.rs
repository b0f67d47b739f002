//! OxiGIF CLI - Pure Rust GIF tooling
//!
//! Inspect, extract, and create GIF files without leaving the terminal.

mod utils;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use oxigif_codec::{decode, encode_animation, encode_static, read_info, AnimationOptions, EncodeOptions};
use utils::{create_progress_bar, read_ppm, write_ppm};

#[derive(Parser)]
#[command(name = "oxigif")]
#[command(author, version, about = "Pure Rust GIF inspector, extractor, and encoder")]
#[command(long_about = "
OxiGIF is a pure Rust GIF89a codec.

Examples:
  oxigif info animation.gif
  oxigif extract animation.gif --output frames/
  oxigif create out.gif frame1.ppm frame2.ppm --delay 40
  oxigif create out.gif single.ppm
  oxigif check suspicious.gif
  oxigif detect mystery.bin
")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show stream metadata without decoding pixels
    #[command(alias = "i")]
    Info {
        /// GIF file to inspect
        file: PathBuf,
    },

    /// Extract frames as binary PPM files
    #[command(alias = "x")]
    Extract {
        /// GIF file to extract
        file: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Show progress bar
        #[arg(short = 'P', long, default_value = "true")]
        progress: bool,
    },

    /// Create a GIF from one or more PPM frames
    #[command(alias = "c")]
    Create {
        /// Output GIF file
        output: PathBuf,

        /// Input frames (binary PPM), one per frame
        frames: Vec<PathBuf>,

        /// Frame delay in milliseconds (animations)
        #[arg(short, long, default_value = "100")]
        delay: u32,

        /// Loop count, 0 = forever (animations)
        #[arg(short, long, default_value = "0")]
        loops: u16,

        /// Palette size ceiling
        #[arg(short, long, default_value = "256")]
        max_colors: usize,
    },

    /// Decode every frame and report corruption
    #[command(alias = "t")]
    Check {
        /// GIF file to check
        file: PathBuf,
    },

    /// Identify a file from its magic bytes
    Detect {
        /// File to identify
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
            .init();
    }

    let result = match cli.command {
        Commands::Info { file } => cmd_info(&file),
        Commands::Extract {
            file,
            output,
            progress,
        } => cmd_extract(&file, &output, progress),
        Commands::Create {
            output,
            frames,
            delay,
            loops,
            max_colors,
        } => cmd_create(&output, &frames, delay, loops, max_colors),
        Commands::Check { file } => cmd_check(&file),
        Commands::Detect { file } => cmd_detect(&file),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_info(file: &PathBuf) -> Result<(), Box<dyn Error>> {
    let data = std::fs::read(file)?;
    let info = read_info(&data)?;

    println!("GIF Information");
    println!("===============");
    println!("File: {}", file.display());
    println!("Version: GIF{}", info.version);
    println!("Canvas: {}x{}", info.width, info.height);
    println!("Frames: {}", info.frame_count);
    if info.frame_count > 1 {
        println!("Duration: {} ms", info.duration_ms);
        match info.loop_count {
            Some(0) => println!("Loops: forever"),
            Some(n) => println!("Loops: {}", n),
            None => println!("Loops: not specified"),
        }
    }
    match info.global_palette_len {
        Some(len) => println!("Global palette: {} colors", len),
        None => println!("Global palette: none"),
    }
    println!("Background index: {}", info.background_index);
    if info.pixel_aspect != 0 {
        println!("Pixel aspect byte: {}", info.pixel_aspect);
    }
    if !info.extensions.is_empty() {
        println!("Extensions: {}", info.extensions.join(", "));
    }
    for comment in &info.comments {
        println!("Comment: {}", comment);
    }
    if let Some(xmp) = &info.xmp {
        println!("XMP: {} bytes", xmp.len());
    }

    Ok(())
}

fn cmd_extract(file: &PathBuf, output: &PathBuf, progress: bool) -> Result<(), Box<dyn Error>> {
    let data = std::fs::read(file)?;
    let decoded = decode(&data)?;
    std::fs::create_dir_all(output)?;

    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());

    println!(
        "Extracting {} frames from {} to {}",
        decoded.frames.len(),
        file.display(),
        output.display()
    );

    let pb = create_progress_bar(decoded.frames.len() as u64, progress);
    pb.set_message("frames");
    for (index, frame) in decoded.frames.iter().enumerate() {
        let path = output.join(format!("{stem}-{index:03}.ppm"));
        write_ppm(&path, &frame.image)?;
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    Ok(())
}

fn cmd_create(
    output: &PathBuf,
    frames: &[PathBuf],
    delay: u32,
    loops: u16,
    max_colors: usize,
) -> Result<(), Box<dyn Error>> {
    if frames.is_empty() {
        return Err("No input frames specified".into());
    }

    let images = frames
        .iter()
        .map(|path| read_ppm(path))
        .collect::<Result<Vec<_>, _>>()?;

    let bytes = if images.len() == 1 {
        let options = EncodeOptions::default().max_colors(max_colors);
        encode_static(&images[0], &options)?
    } else {
        let options = AnimationOptions::default()
            .max_colors(max_colors)
            .delay_ms(delay)
            .loops(loops);
        encode_animation(&images, &options)?
    };

    std::fs::write(output, &bytes)?;
    println!(
        "Created {} ({} frames, {} bytes)",
        output.display(),
        images.len(),
        bytes.len()
    );

    Ok(())
}

fn cmd_check(file: &PathBuf) -> Result<(), Box<dyn Error>> {
    let data = std::fs::read(file)?;
    let decoded = decode(&data)?;

    println!("Checking {}", file.display());
    println!("  Frames: {}", decoded.frames.len());
    println!(
        "  OK: {}",
        decoded.frames.len() - decoded.diagnostics.len()
    );
    println!("  Corrupt: {}", decoded.diagnostics.len());

    if !decoded.diagnostics.is_empty() {
        println!();
        println!("Problems:");
        for entry in &decoded.diagnostics {
            println!("  {}", entry);
        }
        std::process::exit(2);
    }

    println!();
    println!("All frames OK");
    Ok(())
}

fn cmd_detect(file: &PathBuf) -> Result<(), Box<dyn Error>> {
    let data = std::fs::read(file)?;

    let kind = if data.starts_with(b"GIF89a") {
        "GIF (89a)"
    } else if data.starts_with(b"GIF87a") {
        "GIF (87a)"
    } else if data.len() >= 4 && &data[1..4] == b"PNG" {
        "PNG"
    } else if data.starts_with(&[0xFF, 0xD8]) {
        "JPEG"
    } else if data.first() == Some(&b'<') {
        "XML or HTML"
    } else {
        "unknown"
    };

    println!("File: {}", file.display());
    println!("Format: {}", kind);
    println!(
        "Magic bytes: {:02X?}",
        &data[..data.len().min(16)]
    );

    if kind.starts_with("GIF") {
        let info = read_info(&data)?;
        println!("Canvas: {}x{}", info.width, info.height);
        println!("Frames: {}", info.frame_count);
    }

    Ok(())
}
