use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use lottie_data::{compress, ContainerFormat, LayerKind};
use lottie_edit::color::ColorEditor;
use lottie_edit::normalize::{ensure_text_layer_defaults, normalize};
use lottie_edit::visibility::is_hidden;
use lottie_engine::{decode, DecodedAnimation};

#[derive(Parser)]
#[command(
    name = "lottie-engine",
    about = "Inspect and transform Lottie animation documents",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that a file is a structurally valid animation document
    Validate { file: PathBuf },
    /// Print the document header and layer table
    Inspect { file: PathBuf },
    /// List the distinct colors used by the animation
    Colors { file: PathBuf },
    /// Convert between .json and .lottie containers
    Convert {
        file: PathBuf,
        /// Output path; its extension selects the target container
        #[arg(long)]
        out: PathBuf,
    },
    /// Repair missing keyframe discriminators and text-layer defaults
    Normalize {
        file: PathBuf,
        /// Output path; defaults to rewriting the input file
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Validate { file } => validate(&file),
        Command::Inspect { file } => inspect(&file),
        Command::Colors { file } => colors(&file),
        Command::Convert { file, out } => convert(&file, &out),
        Command::Normalize { file, out } => normalize_file(&file, out.as_deref()),
    }
}

fn load(file: &Path) -> anyhow::Result<DecodedAnimation> {
    let bytes = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let name = file.file_name().and_then(|n| n.to_str());
    match decode(&bytes, name) {
        Ok(decoded) => Ok(decoded),
        Err(err) => {
            eprintln!("invalid animation [{}]: {}", err.code(), err);
            std::process::exit(1);
        }
    }
}

fn validate(file: &Path) -> anyhow::Result<()> {
    let decoded = load(file)?;
    let doc = &decoded.document;
    println!(
        "valid {} animation: v{}, {}x{} @ {} fps, {} layers, {} assets",
        decoded.format.extension(),
        doc.version().unwrap_or_else(|| "?".to_string()),
        doc.width(),
        doc.height(),
        doc.frame_rate(),
        doc.layers().len(),
        doc.assets().len(),
    );
    Ok(())
}

fn inspect(file: &Path) -> anyhow::Result<()> {
    let decoded = load(file)?;
    let doc = &decoded.document;
    println!(
        "{} ({}x{} @ {} fps, frames {}..{})",
        doc.name().unwrap_or("unnamed animation"),
        doc.width(),
        doc.height(),
        doc.frame_rate(),
        doc.in_point(),
        doc.out_point(),
    );
    let out_point = doc.out_point();
    for (index, layer) in doc.layers().iter().enumerate() {
        let kind = LayerKind::of_layer(layer);
        let name = layer
            .get("nm")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("-");
        let marker = if is_hidden(layer, out_point) { " (hidden)" } else { "" };
        println!("  [{index}] {:<8} {name}{marker}", kind.label());
    }
    Ok(())
}

fn colors(file: &Path) -> anyhow::Result<()> {
    let decoded = load(file)?;
    let mut editor = ColorEditor::new();
    let found = editor.extract_colors(&decoded.document);
    if found.is_empty() {
        println!("no editable colors found");
        return Ok(());
    }
    for hex in found {
        println!("{hex}");
    }
    Ok(())
}

fn convert(file: &Path, out: &Path) -> anyhow::Result<()> {
    let decoded = load(file)?;
    let target = out
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ContainerFormat::from_extension)
        .unwrap_or(ContainerFormat::Plain);

    let json = decoded.document.to_bytes()?;
    let bytes = match target {
        ContainerFormat::Compressed => compress(&json)?,
        ContainerFormat::Plain => json,
    };
    fs::write(out, &bytes).with_context(|| format!("writing {}", out.display()))?;
    println!(
        "wrote {} ({} -> {})",
        out.display(),
        decoded.format.extension(),
        target.extension()
    );
    Ok(())
}

fn normalize_file(file: &Path, out: Option<&Path>) -> anyhow::Result<()> {
    let mut decoded = load(file)?;
    let repairs = normalize(&mut decoded.document);
    let text_layers = ensure_text_layer_defaults(&mut decoded.document);

    let out = out.unwrap_or(file);
    let target = out
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ContainerFormat::from_extension)
        .unwrap_or(decoded.format);
    let json = decoded.document.to_bytes()?;
    let bytes = match target {
        ContainerFormat::Compressed => compress(&json)?,
        ContainerFormat::Plain => json,
    };
    fs::write(out, &bytes).with_context(|| format!("writing {}", out.display()))?;
    println!(
        "repaired {repairs} properties, {text_layers} text layers -> {}",
        out.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture_bytes() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "v": "5.9.6", "fr": 30, "w": 512, "h": 512,
            "layers": [{"ty": 4, "shapes": [{"ty": "fl", "c": {"k": [1, 0, 0, 1]}}]}]
        }))
        .unwrap()
    }

    #[test]
    fn convert_produces_a_compressed_container() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("anim.json");
        let output = dir.path().join("anim.lottie");
        fs::write(&input, fixture_bytes()).unwrap();

        convert(&input, &output).unwrap();
        let bytes = fs::read(&output).unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
        assert!(load(&output).is_ok());
    }

    #[test]
    fn normalize_repairs_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("anim.json");
        fs::write(&input, fixture_bytes()).unwrap();

        normalize_file(&input, None).unwrap();
        let saved: serde_json::Value =
            serde_json::from_slice(&fs::read(&input).unwrap()).unwrap();
        assert_eq!(saved.pointer("/layers/0/shapes/0/c/a"), Some(&json!(0)));
    }
}

