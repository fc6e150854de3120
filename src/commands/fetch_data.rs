use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::{Cli, FetchDataArgs};
use crate::common::{download_file, ensure_dir_exists, extract_zip};
use crate::sector::{state_code_to_name, state_name_to_code};

/// IBGE census-sector shapefile archives, one per federative unit.
const SECTOR_SHAPE_BASE: &str = "https://geoftp.ibge.gov.br/organizacao_do_territorio/malhas_territoriais/malhas_de_setores_censitarios__divisoes_intramunicipais/censo_2010/setores_censitarios_shp";

pub fn run(cli: &Cli, args: &FetchDataArgs) -> Result<()> {
    let code = state_name_to_code(&args.state)
        .with_context(|| format!("Unknown state: {}", args.state))?;

    let out_dir = args.output.clone().unwrap_or_else(|| PathBuf::from("data/sectors"));
    ensure_dir_exists(&out_dir)?;

    let file_url = format!("{SECTOR_SHAPE_BASE}/{code}/{code}_setores_censitarios.zip");
    let zip_path = out_dir.join(format!("{code}_setores_censitarios.zip"));
    let state_dir = out_dir.join(code.as_str());

    if cli.verbose > 0 {
        eprintln!("[download] {file_url} -> {}", zip_path.display());
    }
    download_file(&file_url, &zip_path, args.force)?;

    if cli.verbose > 0 {
        eprintln!("[extract] {} -> {}", zip_path.display(), state_dir.display());
    }
    extract_zip(&zip_path, &state_dir, true)?;

    println!(
        "Downloaded census sectors for {} into {}",
        state_code_to_name(code),
        state_dir.display()
    );
    Ok(())
}
