use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use futures::executor::block_on;

#[derive(Parser, Debug)]
#[command(name = "placard", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a scene document over a base image.
    Init(InitArgs),
    /// Export a scene document as a PNG.
    Render(RenderArgs),
    /// Print the live visual tree of a scene document as JSON.
    Tree(TreeArgs),
}

#[derive(Parser, Debug)]
struct InitArgs {
    /// Base image, relative to the output document's directory.
    #[arg(long)]
    base: String,

    /// Accessible description of the base image.
    #[arg(long, default_value = "")]
    alt: String,

    /// Add a default text element.
    #[arg(long)]
    with_text: bool,

    /// Output scene JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON. Relative image paths resolve against its directory.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path; defaults to the configured export name next to the scene.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Editor config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra font directory (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Print which font face each text element resolves to.
    #[arg(long)]
    dump_fonts: bool,
}

#[derive(Parser, Debug)]
struct TreeArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Element to mark as selected.
    #[arg(long)]
    select: Option<String>,

    /// Editor config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Init(args) => cmd_init(args),
        Command::Render(args) => cmd_render(args),
        Command::Tree(args) => cmd_tree(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<placard::EditorConfig> {
    let cfg = match path {
        Some(p) => placard::EditorConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => placard::EditorConfig::default(),
    };
    Ok(cfg.with_env_overrides())
}

fn assets_root(scene_path: &Path) -> PathBuf {
    scene_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf()
}

fn open_editor(
    scene_path: &Path,
    config: placard::EditorConfig,
    fonts: placard::FontBook,
) -> anyhow::Result<placard::Editor> {
    let doc = placard::SceneDocument::from_path(scene_path)?;
    let scene = doc.into_scene()?;
    let loader = placard::FileImageLoader::new(assets_root(scene_path));
    Ok(placard::Editor::with_fonts(
        scene,
        Box::new(loader),
        config,
        fonts,
    ))
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    let root = assets_root(&args.out);
    let loader = placard::FileImageLoader::new(&root);
    let source = placard::ImageRef::new(args.base);
    let mut editor = block_on(placard::Editor::open(
        source,
        args.alt,
        Box::new(loader),
        placard::EditorConfig::default(),
    ))?;
    if args.with_text {
        editor.add_text_element();
    }

    placard::SceneDocument::from_scene(editor.scene())
        .save(&args.out)
        .with_context(|| format!("write scene '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    config.font_dirs.extend(args.font_dirs);

    let mut fonts = placard::FontBook::with_system_fonts();
    for dir in &config.font_dirs {
        fonts.load_font_dir(dir);
    }

    let mut editor = open_editor(&args.in_path, config, fonts)?;

    if args.dump_fonts {
        dump_font_diagnostics(&mut editor)?;
    }

    let exported = block_on(editor.export_composition())?;
    let out = args
        .out
        .unwrap_or_else(|| assets_root(&args.in_path).join(&exported.file_name));
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    exported.save_as(&out)?;

    eprintln!(
        "wrote {} ({}x{})",
        out.display(),
        exported.width,
        exported.height
    );
    Ok(())
}

fn cmd_tree(args: TreeArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut editor = open_editor(&args.in_path, config, placard::FontBook::empty())?;

    if let Some(raw) = args.select {
        let id = editor
            .elements()
            .iter()
            .map(|e| e.id)
            .find(|id| id.to_string() == raw)
            .with_context(|| format!("no element with id '{raw}'"))?;
        editor.select(Some(id));
    }

    let tree = editor.visual_tree();
    println!(
        "{}",
        serde_json::to_string_pretty(&tree).context("serialize visual tree")?
    );
    Ok(())
}

fn dump_font_diagnostics(editor: &mut placard::Editor) -> anyhow::Result<()> {
    let families: Vec<(placard::ElementId, String)> = editor
        .elements()
        .iter()
        .filter_map(|e| e.as_text().map(|t| (e.id, t.font_family.clone())))
        .collect();

    eprintln!("text font diagnostics:");
    for (id, family) in families {
        let face = editor
            .fonts_mut()
            .resolve(&family)
            .with_context(|| format!("resolve font for element {id}"))?;
        eprintln!("  {id}:");
        eprintln!("    font_family: {family}");
        eprintln!("    resolved:    {} (index {})", face.family, face.index);
        eprintln!("    bytes:       {}", face.bytes.len());
    }
    Ok(())
}
