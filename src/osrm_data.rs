//! OSRM dataset preparation: download a Geofabrik extract and preprocess it
//! with the `osrm/osrm-backend` image so an `osrm-routed` container can serve
//! truck routes from it.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use crate::error::DatasetError;

const OSRM_IMAGE: &str = "osrm/osrm-backend";

#[derive(Debug, Clone)]
pub struct GeofabrikRegion {
    /// Geofabrik region path, e.g. "north-america/us/nevada".
    pub path: String,
}

impl GeofabrikRegion {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("region")
    }

    pub fn url(&self) -> String {
        format!("https://download.geofabrik.de/{}-latest.osm.pbf", self.path)
    }
}

#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub region: GeofabrikRegion,
    pub data_root: PathBuf,
    /// Lua profile inside the image. The stock image ships `car`, `bicycle`
    /// and `foot`; a truck profile can be mounted alongside the data.
    pub profile_script: String,
}

impl DatasetConfig {
    pub fn new(region: GeofabrikRegion, data_root: impl Into<PathBuf>) -> Self {
        Self {
            region,
            data_root: data_root.into(),
            profile_script: "/opt/car.lua".to_string(),
        }
    }

    pub fn with_profile_script(mut self, script: impl Into<String>) -> Self {
        self.profile_script = script.into();
        self
    }
}

/// A preprocessed (MLD) dataset ready for `osrm-routed --algorithm mld`.
#[derive(Debug, Clone)]
pub struct OsrmDataset {
    pub data_dir: PathBuf,
    pub osrm_base: PathBuf,
    pub pbf_path: PathBuf,
}

impl OsrmDataset {
    /// Downloads and preprocesses whatever is missing; existing files are reused.
    pub fn ensure(config: &DatasetConfig) -> Result<Self, DatasetError> {
        let region_name = config.region.name();
        let data_root = if config.data_root.is_absolute() {
            config.data_root.clone()
        } else {
            std::env::current_dir()?.join(&config.data_root)
        };
        let data_dir = data_root.join(region_name);
        fs::create_dir_all(&data_dir)?;

        let pbf_path = data_dir.join(format!("{region_name}-latest.osm.pbf"));
        if !pbf_path.exists() {
            info!(url = %config.region.url(), "downloading OSM extract");
            download(&config.region.url(), &pbf_path)?;
        }

        let osrm_base = data_dir.join(format!("{region_name}-latest.osrm"));
        if !osrm_base.exists() {
            let input = container_path(&pbf_path);
            run_step(&data_dir, &["osrm-extract", "-p", &config.profile_script, &input])?;
        }
        if !mld_ready(&osrm_base) {
            let base = container_path(&osrm_base);
            run_step(&data_dir, &["osrm-partition", &base])?;
            run_step(&data_dir, &["osrm-customize", &base])?;
        }

        Ok(Self {
            data_dir,
            osrm_base,
            pbf_path,
        })
    }

    /// File name of the `.osrm` base as seen from inside the container.
    pub fn container_base(&self) -> String {
        container_path(&self.osrm_base)
    }
}

fn download(url: &str, dest: &Path) -> Result<(), DatasetError> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    let tmp_path = dest.with_extension("tmp");
    let mut writer = BufWriter::new(File::create(&tmp_path)?);
    writer.write_all(&response.bytes()?)?;
    writer.flush()?;
    fs::rename(tmp_path, dest)?;
    Ok(())
}

fn mld_ready(osrm_base: &Path) -> bool {
    ["osrm.partition", "osrm.mldgr", "osrm.cells"]
        .iter()
        .all(|extension| osrm_base.with_extension(extension).exists())
}

fn run_step(data_dir: &Path, args: &[&str]) -> Result<(), DatasetError> {
    let step = args.first().copied().unwrap_or("osrm").to_string();
    info!(%step, dir = %data_dir.display(), "running OSRM preprocessing step");

    let status = Command::new("docker")
        .args(["run", "--rm", "-t", "-v"])
        .arg(format!("{}:/data", data_dir.display()))
        .arg(OSRM_IMAGE)
        .args(args)
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(DatasetError::ProcessFailure {
            step,
            status: status.to_string(),
        })
    }
}

fn container_path(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    format!("/data/{name}")
}
