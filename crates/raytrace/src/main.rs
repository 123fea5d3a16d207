mod canvas;
mod cli;
mod input;
mod paths;
mod run;
mod status;

use anyhow::Result;
use cli::Command;
use scenes::SceneKind;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Scenes) => {
            list_scenes();
            Ok(())
        }
        Some(Command::Where) => run_where(),
        None => run::run(cli.run),
    }
}

fn list_scenes() {
    println!("Built-in scenes:");
    for kind in SceneKind::ALL {
        println!("  {:<6} {}", kind.name(), kind.description());
    }
}

fn run_where() -> Result<()> {
    let paths = paths::AppPaths::discover()?;
    let config_file = paths.config_file();
    println!("Configuration:");
    println!("  dir:   {}", paths.config_dir().display());
    println!(
        "  file:  {} ({})",
        config_file.display(),
        if config_file.exists() {
            "present"
        } else {
            "missing"
        }
    );
    Ok(())
}
