//! Check external tools.

use shortsmith_common::config::AppConfig;
use shortsmith_common::process::command_exists;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Shortsmith System Check");
    println!("{}", "=".repeat(50));

    let tools = [
        ("ffmpeg", "rendering", true),
        ("ffprobe", "asset probing", true),
        (config.tts.command.as_str(), "narration", false),
    ];

    let mut all_required_ok = true;
    for (binary, purpose, required) in tools {
        let available = command_exists(binary);
        let tag = match (available, required) {
            (true, _) => "[OK]",
            (false, true) => "[MISSING]",
            (false, false) => "[WARN]",
        };
        println!("{tag} {binary} ({purpose})");
        if !available && required {
            all_required_ok = false;
        }
    }

    println!();
    println!("Output directory: {}", config.output_dir.display());
    println!("Working directory: {}", config.temp_dir.display());
    println!();
    if all_required_ok {
        println!("All required tools are available. Shortsmith is ready.");
    } else {
        println!("Some required tools are missing. Install them and run check again.");
    }
    Ok(())
}
