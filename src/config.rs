use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use object_store::gcp::GoogleCloudStorageBuilder;

use crate::storage::{Layout, LocalBackend, ObjectBackend, StorageBackend};
use crate::store::DEFAULT_CATEGORIES;

/// Directory searched for CSV files by the local backends.
pub const DEFAULT_BASE_DIR: &str = "./data-storage";

/// Key prefix under which the object-store backend looks for data types.
pub const DEFAULT_OBJECT_PREFIX: &str = "clicka-data";

pub const DEFAULT_PORT: u16 = 5000;

/// Where CSV files are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// `<base-dir>/<data_type>/<file>.csv`
    Local,
    /// `<base-dir>/<file>.csv`, no data types
    Flat,
    /// `gs://<bucket>/<prefix>/<data_type>/<file>.csv`
    Gcs,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "data-plotter")]
#[command(about = "Serve CSV files, their columns and column values over HTTP")]
#[command(version)]
pub struct Config {
    /// Storage backend holding the CSV files
    #[arg(long, value_enum, default_value = "local", env = "DATA_PLOTTER_BACKEND")]
    pub backend: BackendKind,

    /// Base directory for the local backends
    #[arg(long, default_value = DEFAULT_BASE_DIR, env = "DATA_PLOTTER_BASE_DIR")]
    pub base_dir: PathBuf,

    /// Bucket for the gcs backend
    #[arg(long, env = "DATA_PLOTTER_BUCKET", required_if_eq("backend", "gcs"))]
    pub bucket: Option<String>,

    /// Key prefix inside the bucket
    #[arg(long, default_value = DEFAULT_OBJECT_PREFIX, env = "DATA_PLOTTER_PREFIX")]
    pub prefix: String,

    /// Data types advertised by /api/data-types
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = DEFAULT_CATEGORIES.map(String::from).to_vec(),
        env = "DATA_PLOTTER_DATA_TYPES"
    )]
    pub data_types: Vec<String>,

    /// Address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST), env = "DATA_PLOTTER_HOST")]
    pub host: IpAddr,

    /// Port for web server
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "DATA_PLOTTER_PORT")]
    pub port: u16,
}

impl Config {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Construct the storage backend this configuration names.
    pub fn build_backend(&self) -> Result<Arc<dyn StorageBackend>> {
        let backend: Arc<dyn StorageBackend> = match self.backend {
            BackendKind::Local => Arc::new(LocalBackend::new(&self.base_dir, Layout::PerCategory)),
            BackendKind::Flat => Arc::new(LocalBackend::new(&self.base_dir, Layout::Flat)),
            BackendKind::Gcs => {
                let bucket = self
                    .bucket
                    .as_deref()
                    .context("--bucket is required for the gcs backend")?;
                let store = GoogleCloudStorageBuilder::from_env()
                    .with_bucket_name(bucket)
                    .build()
                    .with_context(|| format!("configuring GCS bucket {bucket}"))?;
                Arc::new(ObjectBackend::new(
                    Arc::new(store),
                    &self.prefix,
                    Layout::PerCategory,
                ))
            }
        };
        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["data-plotter"]).unwrap();
        assert_eq!(config.backend, BackendKind::Local);
        assert_eq!(config.base_dir, PathBuf::from(DEFAULT_BASE_DIR));
        assert_eq!(config.data_types, vec!["telem", "fpga"]);
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:5000");
    }

    #[test]
    fn data_types_are_comma_separated() {
        let config =
            Config::try_parse_from(["data-plotter", "--data-types", "telem,fpga,power"]).unwrap();
        assert_eq!(config.data_types, vec!["telem", "fpga", "power"]);
    }

    #[test]
    fn gcs_requires_a_bucket() {
        assert!(Config::try_parse_from(["data-plotter", "--backend", "gcs"]).is_err());
    }

    #[test]
    fn flat_backend_has_flat_layout() {
        let config = Config::try_parse_from(["data-plotter", "--backend", "flat"]).unwrap();
        assert_eq!(config.build_backend().unwrap().layout(), Layout::Flat);
    }
}
