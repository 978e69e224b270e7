use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tigroup::{
    Container, ContentGateway, Content, Platform, TiFiles, TigOptions, Category,
};

#[derive(Parser)]
#[command(name = "tig", about = "Read, write and list TiGroup (.tig) files")]
struct Cli {
    /// Directory for staged entry files (default: system temp dir)
    #[arg(long, global = true)]
    staging_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List archive entries
    List {
        input: PathBuf,
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show group metadata
    Info {
        input: PathBuf,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Extract the TI files of a group
    Unpack {
        input: PathBuf,
        #[arg(short = 'C', long, default_value = ".")]
        output_dir: PathBuf,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Bundle TI files into a group
    Pack {
        #[arg(short, long)]
        output: PathBuf,
        /// Target platform, e.g. TI89 or 83+ (default: detected from inputs)
        #[arg(long)]
        platform: Option<Platform>,
        /// Archive comment
        #[arg(long)]
        comment: Option<String>,
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut opts = TigOptions::default();
    if let Some(dir) = &cli.staging_dir {
        opts = opts.with_staging_dir(dir);
    }

    match cli.command {

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { input, json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&tigroup::list(&input)?)?);
            } else {
                println!("Archive: {}", input.display());
                tigroup::display(&input)?;
            }
        }

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { input, password } => {
            if let Some(pwd) = password { opts = opts.with_password(pwd); }
            let group: Container = Container::open(&input, &TiFiles, &opts)?;

            println!("── TiGroup ──────────────────────────────────────────────");
            println!("  Path           {}", input.display());
            println!("  Platform       {}", group.platform);
            println!("  Comment        {}", group.comment);
            println!("  Regular files  {}", group.regular_count());
            for e in group.regular() {
                println!("    {:<24} {}", e.name, e.content.comment);
            }
            println!("  Flash files    {}", group.flash_count());
            for e in group.flash() {
                println!("    {:<24} {} v{}.{}", e.name, e.content.name, e.content.revision.0, e.content.revision.1);
            }
            group.destroy(&TiFiles);
        }

        // ── Unpack ───────────────────────────────────────────────────────────
        Commands::Unpack { input, output_dir, password } => {
            if let Some(pwd) = password { opts = opts.with_password(pwd); }
            let group: Container = Container::open(&input, &TiFiles, &opts)?;
            fs::create_dir_all(&output_dir)?;
            for e in group.regular() {
                let dest = output_dir.join(file_name(&e.name));
                TiFiles.write_regular(&e.content, &dest)?;
                println!("  unpacked  {}", dest.display());
            }
            for e in group.flash() {
                let dest = output_dir.join(file_name(&e.name));
                TiFiles.write_flash(&e.content, &dest)?;
                println!("  unpacked  {}", dest.display());
            }
            group.destroy(&TiFiles);
        }

        // ── Pack ─────────────────────────────────────────────────────────────
        Commands::Pack { output, platform, comment, input } => {
            let mut group = Container::new(platform.unwrap_or_default());
            if let Some(c) = comment { group.comment = c; }
            for path in &input {
                let name = path.file_name()
                    .ok_or_else(|| format!("not a file: {}", path.display()))?
                    .to_string_lossy()
                    .into_owned();
                let content = match TiFiles.classify(path) {
                    Category::Regular      => Content::Regular(TiFiles.read_regular(path)?),
                    Category::Flash        => Content::Flash(TiFiles.read_flash(path)?),
                    Category::Unrecognized => {
                        eprintln!("  skipped   {} (not a TI file)", path.display());
                        continue;
                    }
                };
                if group.platform == Platform::None {
                    group.platform = TiFiles.platform(path);
                }
                group.append(name, content)?;
                println!("  packed    {}", path.display());
            }
            group.save(&output, &TiFiles, &opts)?;
            println!("Created: {}", output.display());
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

/// Last path component of an internal name, so entries cannot escape the
/// output directory.
fn file_name(internal: &str) -> PathBuf {
    let base = internal.rsplit(['/', '\\']).next().unwrap_or(internal);
    PathBuf::from(if base.is_empty() || base == ".." { "unnamed" } else { base })
}
