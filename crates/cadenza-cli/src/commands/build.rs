use anyhow::Result;
use cadenza_etl::{build_artifacts, BuildOptions, Config};
use std::path::PathBuf;

pub fn run_build(config: &Config, out_dir: Option<PathBuf>, dense: bool, gzip: bool) -> Result<()> {
    log::info!("Starting artifact build");

    let options = BuildOptions {
        out_dir,
        dense,
        gzip,
    };
    let report = build_artifacts(config, &options)?;

    println!("\n✓ Build complete\n");
    println!("  Songs: {}", report.songs);
    if report.unique_titles < report.songs {
        println!(
            "  Unique titles: {} ({} duplicates use their first occurrence)",
            report.unique_titles,
            report.songs - report.unique_titles
        );
    }
    println!("  Text columns: {}", report.text_columns.join(", "));
    println!("  Vocabulary: {} terms", report.vocabulary);
    println!("  Index table: {}", report.index_path.display());
    println!("  Similarity ({}): {}", report.kind, report.similarity_path.display());

    if options.out_dir.is_some() || options.gzip {
        println!("\n  Point index_path and similarity_path at these files to use them:");
        println!("    cadenza config set index_path {}", report.index_path.display());
        println!(
            "    cadenza config set similarity_path {}",
            report.similarity_path.display()
        );
    }

    Ok(())
}
